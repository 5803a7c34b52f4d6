//! Common functionality for running two-party protocols.
//!
//! A party owns a [`Channel`] to its peer and tracks its [`ProtocolState`].
//! Protocols in this workspace are synchronous: every party runs on its own
//! thread and blocks on [`Channel::recv`].

#![deny(unsafe_code, unused_must_use, clippy::all)]
#![warn(missing_docs, unreachable_pub, unused_imports)]

mod channel;
mod lifecycle;

pub use channel::{memory_duplex, Channel, IoChannel, MemoryChannel, DEFAULT_MAX_MESSAGE_BYTES};
pub use lifecycle::{Lifecycle, ProtocolState, StateError};
