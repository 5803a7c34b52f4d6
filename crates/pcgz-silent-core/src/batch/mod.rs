//! Batches of correlated randomness.
//!
//! A batch is an owned, fixed-shape container. Batches shrink by
//! [`split`](CorrelationBatch::split) and [`reduce`](CorrelationBatch::reduce)
//! and grow by [`merge`](CorrelationBatch::merge). Every backing array of a
//! batch always holds exactly [`num`](CorrelationBatch::num) elements; a
//! violation of this is a bug and panics.

mod cot;
mod rot;
mod triple;

pub use cot::{CotReceiverBatch, CotSenderBatch};
pub use rot::{RotReceiverBatch, RotSenderBatch};
pub use triple::{BitTripleBatch, Gf2, Z2k, Z2kTripleBatch};

use std::fmt::Debug;

/// Errors produced by batch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// The requested length is not in `1..=num`.
    #[error("invalid length {requested} for a batch of {num} elements")]
    InvalidSplit {
        /// The requested length.
        requested: usize,
        /// The length of the batch.
        num: usize,
    },
    /// The batches carry different tags.
    #[error("tag mismatch: {0}")]
    TagMismatch(String),
    /// The modulus is not supported.
    #[error("unsupported modulus 2^{0}, expected 1..=64 bits")]
    InvalidModulus(u32),
}

/// A batch of correlations sharing a field, modulus or global key.
pub trait CorrelationBatch: Sized {
    /// Identifies which batches may be merged.
    type Tag: Copy + PartialEq + Debug;

    /// Creates an empty batch with the given tag.
    fn create_empty(tag: Self::Tag) -> Self;

    /// Returns the tag of the batch.
    fn tag(&self) -> Self::Tag;

    /// Returns the number of correlations in the batch.
    fn num(&self) -> usize;

    /// Returns `true` if the batch is empty.
    fn is_empty(&self) -> bool {
        self.num() == 0
    }

    /// Splits the batch into its first `m` correlations and the rest.
    ///
    /// Requires `0 < m <= num`.
    fn split(self, m: usize) -> Result<(Self, Self), BatchError>;

    /// Truncates the batch to its first `m` correlations.
    ///
    /// Requires `0 < m <= num`.
    fn reduce(&mut self, m: usize) -> Result<(), BatchError>;

    /// Appends `other` to the batch.
    ///
    /// Requires equal tags.
    fn merge(&mut self, other: Self) -> Result<(), BatchError>;

    /// Removes and returns the first `m` correlations, keeping the rest.
    ///
    /// Requires `0 < m <= num`.
    fn split_prefix(&mut self, m: usize) -> Result<Self, BatchError> {
        check_len(m, self.num())?;

        let tag = self.tag();
        let this = std::mem::replace(self, Self::create_empty(tag));
        let (prefix, suffix) = this.split(m)?;
        *self = suffix;

        Ok(prefix)
    }
}

/// Checks `0 < m <= num`.
pub(crate) fn check_len(m: usize, num: usize) -> Result<(), BatchError> {
    if m == 0 || m > num {
        return Err(BatchError::InvalidSplit { requested: m, num });
    }
    Ok(())
}

pub(crate) fn check_tag<T: PartialEq + Debug>(this: T, other: T) -> Result<(), BatchError> {
    if this != other {
        return Err(BatchError::TagMismatch(format!("{this:?} != {other:?}")));
    }
    Ok(())
}

/// Splits `v` into its first `m` elements and the rest.
#[inline]
pub(crate) fn split_vec<T>(mut v: Vec<T>, m: usize) -> (Vec<T>, Vec<T>) {
    let suffix = v.split_off(m);
    (v, suffix)
}
