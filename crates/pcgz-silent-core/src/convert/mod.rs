//! Conversions from correlated OTs to other correlations.
//!
//! Every conversion hashes COT messages with a [`CrHash`] under a fresh
//! tweak. Each converter keeps a running counter, so the sender and
//! receiver side of a conversion stay in sync as long as they consume the
//! same COTs in the same order.

mod bit_triple;
pub mod msgs;
mod rot;
mod z2k;

pub use bit_triple::{BitTripleReceiver, BitTripleSender};
pub use rot::{RotReceiver, RotSender};
pub use z2k::{PendingZ2kTriples, Z2kTripleReceiver, Z2kTripleSender};

use pcgz_core::{hash::CrHash, Block};

/// Errors produced by the conversions.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ConvertError {
    #[error("invalid length: {0}")]
    InvalidLength(String),
}

/// Domain separator of each conversion, the high word of every tweak.
#[derive(Debug, Clone, Copy)]
#[repr(u64)]
enum Domain {
    Rot = 1,
    BitTriple = 2,
    Z2kTriple = 3,
}

/// A running tweak counter.
#[derive(Debug)]
struct Tweaks {
    domain: Domain,
    counter: u64,
}

impl Tweaks {
    fn new(domain: Domain) -> Self {
        Self { domain, counter: 0 }
    }

    /// Returns the tweaks of the next `count` COTs.
    fn next(&mut self, count: usize) -> Vec<Block> {
        let start = self.counter;
        self.counter += count as u64;
        (start..self.counter)
            .map(|j| bytemuck::cast([j, self.domain as u64]))
            .collect()
    }
}

/// Hashes every block under the tweak at the same position.
fn hash_all<H: CrHash>(hasher: &H, tweaks: &[Block], blocks: &[Block]) -> Vec<Block> {
    let mut hashed = blocks.to_vec();
    hasher.hash_many(tweaks, &mut hashed);
    hashed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweaks_are_fresh() {
        let mut tweaks = Tweaks::new(Domain::Rot);
        let first = tweaks.next(3);
        let second = tweaks.next(2);

        let mut all = [first, second].concat();
        all.sort_by_key(|b| b.to_bytes());
        all.dedup();
        assert_eq!(all.len(), 5);

        let other = Tweaks::new(Domain::BitTriple).next(1);
        assert_ne!(other[0], Tweaks::new(Domain::Rot).next(1)[0]);
    }
}
