//! Ideal correlated OT functionality.

use pcgz_core::{prg::Prg, Block};
use rand::SeedableRng;

use crate::batch::{CotReceiverBatch, CotSenderBatch};

/// The ideal COT functionality.
///
/// Deals random correlated OTs under a fixed global correlation to both
/// parties.
#[derive(Debug)]
pub struct IdealCot {
    delta: Block,
    counter: usize,
    prg: Prg,
}

impl IdealCot {
    /// Creates a new functionality, sampling delta from `seed`.
    pub fn new(seed: Block) -> Self {
        let mut prg = Prg::from_seed(seed);
        let delta = prg.random_block();

        Self {
            delta,
            counter: 0,
            prg,
        }
    }

    /// Creates a new functionality with the given correlation.
    pub fn with_delta(seed: Block, delta: Block) -> Self {
        Self {
            delta,
            counter: 0,
            prg: Prg::from_seed(seed),
        }
    }

    /// Returns the correlation, delta.
    pub fn delta(&self) -> Block {
        self.delta
    }

    /// Returns the number of COTs dealt.
    pub fn count(&self) -> usize {
        self.counter
    }

    /// Deals `count` random correlated OTs.
    pub fn random_correlated(&mut self, count: usize) -> (CotSenderBatch, CotReceiverBatch) {
        let mut msgs = vec![Block::ZERO; count];
        let mut choices = vec![false; count];

        self.prg.random_blocks(&mut msgs);
        self.prg.random_bools(&mut choices);

        let chosen: Vec<Block> = msgs
            .iter()
            .zip(&choices)
            .map(|(&q, &r)| if r { q ^ self.delta } else { q })
            .collect();

        self.counter += count;

        (
            CotSenderBatch::new(self.delta, msgs),
            CotReceiverBatch::new(choices, chosen),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_cot;

    #[test]
    fn test_ideal_cot() {
        let mut cot = IdealCot::new(Block::ZERO);
        let (sender, receiver) = cot.random_correlated(100);

        assert_eq!(cot.count(), 100);
        assert_cot(&sender, &receiver);
    }

    #[test]
    fn test_ideal_cot_is_deterministic() {
        let (a, _) = IdealCot::new(Block::ONE).random_correlated(10);
        let (b, _) = IdealCot::new(Block::ONE).random_correlated(10);

        assert_eq!(a, b);
    }
}
