//! Ideal correlation sources.
//!
//! A trusted dealer stands in for a base COT protocol: both parties derive
//! the same correlations from a shared seed and keep their own half.

use pcgz_core::Block;
use pcgz_silent_core::{
    batch::{CotReceiverBatch, CotSenderBatch},
    ideal::IdealCot,
};

use crate::{CorrelationSource, PcgError};

/// Returns a pair of ideal COT sources dealing from `seed`.
pub fn ideal_cot_sources(seed: Block) -> (IdealCotSenderSource, IdealCotReceiverSource) {
    (
        IdealCotSenderSource {
            cot: IdealCot::new(seed),
        },
        IdealCotReceiverSource {
            cot: IdealCot::new(seed),
        },
    )
}

/// The sender's half of an ideal COT source.
#[derive(Debug)]
pub struct IdealCotSenderSource {
    cot: IdealCot,
}

impl IdealCotSenderSource {
    /// Returns the global correlation.
    pub fn delta(&self) -> Block {
        self.cot.delta()
    }
}

impl CorrelationSource for IdealCotSenderSource {
    type Output = CotSenderBatch;

    fn request(&mut self, count: usize) -> Result<CotSenderBatch, PcgError> {
        Ok(self.cot.random_correlated(count).0)
    }
}

/// The receiver's half of an ideal COT source.
#[derive(Debug)]
pub struct IdealCotReceiverSource {
    cot: IdealCot,
}

impl CorrelationSource for IdealCotReceiverSource {
    type Output = CotReceiverBatch;

    fn request(&mut self, count: usize) -> Result<CotReceiverBatch, PcgError> {
        Ok(self.cot.random_correlated(count).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcgz_silent_core::test::assert_cot;

    #[test]
    fn test_ideal_sources_agree() {
        let (mut sender, mut receiver) = ideal_cot_sources(Block::ONE);

        for count in [1, 10, 300] {
            let s = sender.request(count).unwrap();
            let r = receiver.request(count).unwrap();
            assert_eq!(s.delta(), sender.delta());
            assert_cot(&s, &r);
        }
    }
}
