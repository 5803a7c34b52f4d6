//! Core primitives for silent correlation generation.

#![deny(unused_must_use, clippy::all)]
#![warn(missing_docs, unreachable_pub, unused_imports)]

pub mod aes;
mod block;
pub mod ggm_tree;
pub mod hash;
pub mod lpn;
pub mod prg;

pub use block::Block;
