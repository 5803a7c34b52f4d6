//! Silent correlation generation between two parties.
//!
//! A [`CorrelationCache`] serves correlations of arbitrary batch sizes from
//! an [`Expandable`] engine, which produces a fixed number of them per round
//! over a [`Channel`](pcgz_common::Channel). The engines in this crate expand
//! a small number of base COTs from a [`CorrelationSource`] into a stream of
//! COTs, random OTs and multiplication triples.
//!
//! Execution is blocking, each party runs on its own thread and owns its
//! channel.

#![deny(unused_must_use, clippy::all)]
#![warn(missing_docs, unreachable_pub, unused_imports)]

mod cache;
mod config;
pub mod cot;
mod error;
pub mod generator;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;

pub use cache::CorrelationCache;
pub use config::{
    CacheConfig, CacheConfigBuilder, ExpansionConfig, ExpansionConfigBuilder, Z2kConfig,
    Z2kConfigBuilder,
};
pub use error::{ErrorKind, PcgError};

use pcgz_common::Channel;
use pcgz_silent_core::batch::CorrelationBatch;

/// A source of correlations.
pub trait CorrelationSource {
    /// The correlations produced by the source.
    type Output: CorrelationBatch;

    /// Returns exactly `count` correlations.
    fn request(&mut self, count: usize) -> Result<Self::Output, PcgError>;
}

impl<S: CorrelationSource + ?Sized> CorrelationSource for &mut S {
    type Output = S::Output;

    fn request(&mut self, count: usize) -> Result<Self::Output, PcgError> {
        (**self).request(count)
    }
}

/// A two-party protocol producing correlations in rounds.
pub trait Expandable<Ch: Channel> {
    /// The correlations produced by a round.
    type Output: CorrelationBatch;

    /// Runs the one-time setup, for rounds of about `round_size` correlations.
    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError>;

    /// Returns the tag of the produced batches.
    ///
    /// Available after setup.
    fn tag(&self) -> Result<<Self::Output as CorrelationBatch>::Tag, PcgError>;

    /// Runs one round.
    fn expand(&mut self, ch: &mut Ch) -> Result<Self::Output, PcgError>;
}

/// Requests exactly `count` correlations from `source`, aborting on a
/// short or long answer.
pub(crate) fn request_exact<S: CorrelationSource>(
    source: &mut S,
    count: usize,
) -> Result<S::Output, PcgError> {
    let batch = source.request(count)?;
    if batch.num() != count {
        return Err(PcgError::abort(format!(
            "correlation source returned {} correlations, expected {count}",
            batch.num()
        )));
    }
    Ok(batch)
}
