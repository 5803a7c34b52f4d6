//! IO-free protocol logic for silent correlation generation.
//!
//! This crate holds the state machines of the expansion round and the
//! correlation conversions. It never touches a channel; the messages it
//! produces and consumes are plain serializable structs. Use the
//! `pcgz-silent` crate to run the protocols between two parties.
//!
//! # Warning
//!
//! Some state machines assume their caller feeds them correlations of the
//! right shape. Lengths are checked, but the order of calls is only checked
//! where a mistake cannot be caught by the type system.

#![deny(unused_must_use, clippy::all)]
#![warn(missing_docs, unreachable_pub, unused_imports)]

pub mod batch;
pub mod convert;
pub mod expansion;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;
pub mod spcot;
#[cfg(any(test, feature = "test-utils"))]
pub mod test;

/// Computational security parameter, in bits.
///
/// Also the number of COTs consumed by every SPCOT consistency check.
pub const CSP: usize = 128;
