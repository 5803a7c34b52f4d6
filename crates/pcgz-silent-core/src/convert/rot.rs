use pcgz_core::hash::CrHash;

use crate::batch::{CotReceiverBatch, CotSenderBatch, RotReceiverBatch, RotSenderBatch};

use super::{hash_all, Domain, Tweaks};

/// Converts the sender's COTs into random OTs.
#[derive(Debug)]
pub struct RotSender<H> {
    hasher: H,
    tweaks: Tweaks,
}

impl<H: CrHash> RotSender<H> {
    /// Creates a new converter.
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            tweaks: Tweaks::new(Domain::Rot),
        }
    }

    /// Outputs `(H(j, q_j), H(j, q_j ^ delta))` for every COT.
    pub fn convert(&mut self, cots: CotSenderBatch) -> RotSenderBatch {
        let delta = cots.delta();
        let qs = cots.into_msgs();
        let tweaks = self.tweaks.next(qs.len());

        let q_deltas: Vec<_> = qs.iter().map(|&q| q ^ delta).collect();
        let m0 = hash_all(&self.hasher, &tweaks, &qs);
        let m1 = hash_all(&self.hasher, &tweaks, &q_deltas);

        RotSenderBatch::new(m0.into_iter().zip(m1).map(|(a, b)| [a, b]).collect())
    }
}

/// Converts the receiver's COTs into random OTs.
#[derive(Debug)]
pub struct RotReceiver<H> {
    hasher: H,
    tweaks: Tweaks,
}

impl<H: CrHash> RotReceiver<H> {
    /// Creates a new converter.
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            tweaks: Tweaks::new(Domain::Rot),
        }
    }

    /// Outputs `(c_j, H(j, r_j))` for every COT.
    pub fn convert(&mut self, cots: CotReceiverBatch) -> RotReceiverBatch {
        let (choices, rs) = cots.into_parts();
        let tweaks = self.tweaks.next(rs.len());

        RotReceiverBatch::new(choices, hash_all(&self.hasher, &tweaks, &rs))
    }
}
