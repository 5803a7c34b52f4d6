use pcgz_core::{hash::CrHash, prg::Prg, Block};
use rand::{Rng, SeedableRng};

use crate::batch::{CorrelationBatch, CotReceiverBatch, CotSenderBatch, Z2k, Z2kTripleBatch};

use super::{
    hash_all,
    msgs::{ChoiceCorrections, Corrections},
    ConvertError, Domain, Tweaks,
};

fn triple_count(ring: Z2k, num: usize) -> Result<usize, ConvertError> {
    let per_triple = 2 * ring.bits() as usize;
    if num % per_triple != 0 {
        return Err(ConvertError::InvalidLength(format!(
            "triples over Z_2^{} consume {per_triple} COTs each, got {num}",
            ring.bits()
        )));
    }
    Ok(num / per_triple)
}

fn check_count(what: &str, expected: usize, actual: usize) -> Result<(), ConvertError> {
    if expected != actual {
        return Err(ConvertError::InvalidLength(format!(
            "expected {expected} {what}, got {actual}"
        )));
    }
    Ok(())
}

#[inline]
fn bits_of(x: u64, l: usize) -> impl Iterator<Item = bool> {
    (0..l).map(move |i| (x >> i) & 1 == 1)
}

/// The sender of the `Z_{2^l}` triple conversion.
///
/// Each triple multiplies the peer's shares into this party's shares with
/// two Gilboa multiplications over `l` COTs each.
#[derive(Debug)]
pub struct Z2kTripleSender<H> {
    ring: Z2k,
    hasher: H,
    tweaks: Tweaks,
    prg: Prg,
}

impl<H: CrHash> Z2kTripleSender<H> {
    /// Creates a new converter.
    pub fn new(ring: Z2k, hasher: H, seed: Block) -> Self {
        Self {
            ring,
            hasher,
            tweaks: Tweaks::new(Domain::Z2kTriple),
            prg: Prg::from_seed(seed),
        }
    }

    /// Returns the ring of the triples.
    pub fn ring(&self) -> Z2k {
        self.ring
    }

    /// Converts `2 * l * m` COTs into `m` triples, given the receiver's
    /// choice corrections.
    ///
    /// Returns this party's shares and the corrections for the receiver.
    pub fn convert(
        &mut self,
        cots: CotSenderBatch,
        corrections: ChoiceCorrections,
    ) -> Result<(Z2kTripleBatch, Corrections), ConvertError> {
        let ring = self.ring;
        let l = ring.bits() as usize;
        let m = triple_count(ring, cots.num())?;
        check_count("choice corrections", cots.num(), corrections.d.len())?;

        let a: Vec<u64> = (0..m).map(|_| ring.reduce(self.prg.gen())).collect();
        let b: Vec<u64> = (0..m).map(|_| ring.reduce(self.prg.gen())).collect();

        let delta = cots.delta();
        let qs = cots.into_msgs();
        let tweaks = self.tweaks.next(qs.len());

        // k0 = H(q ^ d * delta), k1 = H(q ^ !d * delta)
        let (x0, x1): (Vec<Block>, Vec<Block>) = qs
            .iter()
            .zip(&corrections.d)
            .map(|(&q, &d)| if d { (q ^ delta, q) } else { (q, q ^ delta) })
            .unzip();
        let k0 = hash_all(&self.hasher, &tweaks, &x0);
        let k1 = hash_all(&self.hasher, &tweaks, &x1);

        let mut c = Vec::with_capacity(m);
        let mut tau = Vec::with_capacity(qs.len());
        for (i, (k0, k1)) in k0.chunks_exact(2 * l).zip(k1.chunks_exact(2 * l)).enumerate() {
            let mut share = ring.mul(a[i], b[i]);
            // The peer's first l choices are the bits of its a, multiplied
            // with our b. The next l are the bits of its b, multiplied with
            // our a.
            for (k0, k1, y) in [(&k0[..l], &k1[..l], b[i]), (&k0[l..], &k1[l..], a[i])] {
                for (j, (k0, k1)) in k0.iter().zip(k1).enumerate() {
                    let k0 = ring.reduce(k0.low_u64());
                    let k1 = ring.reduce(k1.low_u64());

                    share = ring.sub(share, ring.mul(k0, 1u64 << j));
                    tau.push(ring.add(ring.sub(k0, k1), y));
                }
            }
            c.push(share);
        }

        Ok((Z2kTripleBatch::new(ring, a, b, c), Corrections { tau }))
    }
}

/// The receiver of the `Z_{2^l}` triple conversion.
#[derive(Debug)]
pub struct Z2kTripleReceiver<H> {
    ring: Z2k,
    hasher: H,
    tweaks: Tweaks,
    prg: Prg,
}

impl<H: CrHash> Z2kTripleReceiver<H> {
    /// Creates a new converter.
    pub fn new(ring: Z2k, hasher: H, seed: Block) -> Self {
        Self {
            ring,
            hasher,
            tweaks: Tweaks::new(Domain::Z2kTriple),
            prg: Prg::from_seed(seed),
        }
    }

    /// Returns the ring of the triples.
    pub fn ring(&self) -> Z2k {
        self.ring
    }

    /// Samples the shares of `m` triples from `2 * l * m` COTs, returning the
    /// choice corrections for the sender.
    pub fn convert(
        &mut self,
        cots: CotReceiverBatch,
    ) -> Result<(PendingZ2kTriples, ChoiceCorrections), ConvertError> {
        let ring = self.ring;
        let l = ring.bits() as usize;
        let m = triple_count(ring, cots.num())?;

        let a: Vec<u64> = (0..m).map(|_| ring.reduce(self.prg.gen())).collect();
        let b: Vec<u64> = (0..m).map(|_| ring.reduce(self.prg.gen())).collect();

        let xs: Vec<bool> = a
            .iter()
            .zip(&b)
            .flat_map(|(&a, &b)| bits_of(a, l).chain(bits_of(b, l)))
            .collect();

        let (choices, rs) = cots.into_parts();
        let tweaks = self.tweaks.next(rs.len());

        let d = xs.iter().zip(&choices).map(|(&x, &c)| x ^ c).collect();
        let ks = hash_all(&self.hasher, &tweaks, &rs)
            .iter()
            .map(|k| ring.reduce(k.low_u64()))
            .collect();

        Ok((
            PendingZ2kTriples { ring, a, b, xs, ks },
            ChoiceCorrections { d },
        ))
    }
}

/// Receiver triples awaiting the sender's corrections.
#[derive(Debug)]
pub struct PendingZ2kTriples {
    ring: Z2k,
    a: Vec<u64>,
    b: Vec<u64>,
    xs: Vec<bool>,
    ks: Vec<u64>,
}

impl PendingZ2kTriples {
    /// Returns the number of pending triples.
    pub fn num(&self) -> usize {
        self.a.len()
    }

    /// Applies the sender's corrections, returning this party's shares.
    pub fn finish(self, corrections: Corrections) -> Result<Z2kTripleBatch, ConvertError> {
        let Self { ring, a, b, xs, ks } = self;
        let l = ring.bits() as usize;
        check_count("corrections", xs.len(), corrections.tau.len())?;

        let c = xs
            .chunks_exact(2 * l)
            .zip(ks.chunks_exact(2 * l))
            .zip(corrections.tau.chunks_exact(2 * l))
            .enumerate()
            .map(|(i, ((xs, ks), tau))| {
                let init = ring.mul(a[i], b[i]);
                xs.iter()
                    .zip(ks)
                    .zip(tau)
                    .enumerate()
                    .fold(init, |acc, (j, ((&x, &k), &tau))| {
                        let t = if x { ring.add(k, tau) } else { k };
                        ring.add(acc, ring.mul(t, 1u64 << (j % l)))
                    })
            })
            .collect();

        Ok(Z2kTripleBatch::new(ring, a, b, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ideal::IdealCot, test::assert_z2k_triples};
    use pcgz_core::aes::FIXED_KEY_AES;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(8)]
    #[case(32)]
    #[case(64)]
    fn test_z2k_triples(#[case] bits: u32) {
        let ring = Z2k::new(bits).unwrap();
        let mut cot = IdealCot::new(Block::from(u128::from(bits)));
        let mut sender = Z2kTripleSender::new(ring, &*FIXED_KEY_AES, Block::ONE);
        let mut receiver = Z2kTripleReceiver::new(ring, &*FIXED_KEY_AES, Block::ZERO);

        for m in [1, 10] {
            let (s, r) = cot.random_correlated(2 * bits as usize * m);

            let (pending, choices) = receiver.convert(r).unwrap();
            assert_eq!(pending.num(), m);
            let (s, corrections) = sender.convert(s, choices).unwrap();
            let r = pending.finish(corrections).unwrap();

            assert_eq!(s.num(), m);
            assert_z2k_triples(&s, &r);
        }
    }

    #[test]
    fn test_z2k_rejects_wrong_counts() {
        let ring = Z2k::new(16).unwrap();
        let mut cot = IdealCot::new(Block::ZERO);
        let mut sender = Z2kTripleSender::new(ring, &*FIXED_KEY_AES, Block::ONE);
        let mut receiver = Z2kTripleReceiver::new(ring, &*FIXED_KEY_AES, Block::ZERO);

        let (_, r) = cot.random_correlated(33);
        assert!(receiver.convert(r).is_err());

        let (s, r) = cot.random_correlated(64);
        let (pending, mut choices) = receiver.convert(r).unwrap();
        choices.d.pop();
        assert!(sender.convert(s.clone(), choices).is_err());

        let (_, corrections) = sender
            .convert(s, ChoiceCorrections { d: vec![false; 64] })
            .unwrap();
        let mut short = corrections;
        short.tau.pop();
        assert!(pending.finish(short).is_err());
    }
}
