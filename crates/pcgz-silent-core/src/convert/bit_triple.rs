use pcgz_core::hash::CrHash;

use crate::batch::{BitTripleBatch, CorrelationBatch, CotReceiverBatch, CotSenderBatch};

use super::{hash_all, ConvertError, Domain, Tweaks};

fn check_even(num: usize) -> Result<(), ConvertError> {
    if num % 2 != 0 {
        return Err(ConvertError::InvalidLength(format!(
            "bit triples consume two COTs each, got {num}"
        )));
    }
    Ok(())
}

/// Converts the sender's COTs into shares of bit triples.
///
/// The least significant bit of the hashed messages gives a random bit OT.
/// Two random bit OTs in opposite directions make one triple.
#[derive(Debug)]
pub struct BitTripleSender<H> {
    hasher: H,
    tweaks: Tweaks,
}

impl<H: CrHash> BitTripleSender<H> {
    /// Creates a new converter.
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            tweaks: Tweaks::new(Domain::BitTriple),
        }
    }

    /// Converts `2 * m` COTs into `m` triples.
    pub fn convert(&mut self, cots: CotSenderBatch) -> Result<BitTripleBatch, ConvertError> {
        check_even(cots.num())?;

        let delta = cots.delta();
        let qs = cots.into_msgs();
        let tweaks = self.tweaks.next(qs.len());

        let q_deltas: Vec<_> = qs.iter().map(|&q| q ^ delta).collect();
        let s0: Vec<bool> = hash_all(&self.hasher, &tweaks, &qs)
            .iter()
            .map(|b| b.lsb())
            .collect();
        let s1: Vec<bool> = hash_all(&self.hasher, &tweaks, &q_deltas)
            .iter()
            .map(|b| b.lsb())
            .collect();

        let m = qs.len() / 2;
        let (mut a, mut b, mut c) = (
            Vec::with_capacity(m),
            Vec::with_capacity(m),
            Vec::with_capacity(m),
        );
        for (s0, s1) in s0.chunks_exact(2).zip(s1.chunks_exact(2)) {
            let d0 = s0[0] ^ s1[0];
            let d1 = s0[1] ^ s1[1];

            a.push(d1);
            b.push(d0);
            c.push((d0 & d1) ^ s0[0] ^ s0[1]);
        }

        Ok(BitTripleBatch::new(a, b, c))
    }
}

/// Converts the receiver's COTs into shares of bit triples.
#[derive(Debug)]
pub struct BitTripleReceiver<H> {
    hasher: H,
    tweaks: Tweaks,
}

impl<H: CrHash> BitTripleReceiver<H> {
    /// Creates a new converter.
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            tweaks: Tweaks::new(Domain::BitTriple),
        }
    }

    /// Converts `2 * m` COTs into `m` triples.
    pub fn convert(&mut self, cots: CotReceiverBatch) -> Result<BitTripleBatch, ConvertError> {
        check_even(cots.num())?;

        let (choices, rs) = cots.into_parts();
        let tweaks = self.tweaks.next(rs.len());

        let r: Vec<bool> = hash_all(&self.hasher, &tweaks, &rs)
            .iter()
            .map(|b| b.lsb())
            .collect();

        let m = rs.len() / 2;
        let (mut a, mut b, mut c) = (
            Vec::with_capacity(m),
            Vec::with_capacity(m),
            Vec::with_capacity(m),
        );
        for (bs, r) in choices.chunks_exact(2).zip(r.chunks_exact(2)) {
            a.push(bs[0]);
            b.push(bs[1]);
            c.push((bs[0] & bs[1]) ^ r[0] ^ r[1]);
        }

        Ok(BitTripleBatch::new(a, b, c))
    }
}
