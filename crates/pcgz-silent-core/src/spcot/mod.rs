//! Batched single-point correlated OT from GGM trees.
//!
//! Each execution produces, for a batch of trees of depth `h`, a vector `v`
//! of length `2^h` for the sender and a vector `w` for the receiver that
//! differ only at a receiver-chosen position `alpha`, where
//! `w[alpha] = v[alpha] ^ delta`. The receiver verifies the outputs with a
//! random linear check in GF(2^128) seeded by the protocol transcript.
//!
//! See <https://eprint.iacr.org/2020/924.pdf>, Figure 6.

pub mod error;
pub mod msgs;
pub mod receiver;
pub mod sender;

use pcgz_core::{prg::Prg, Block};
use rand::SeedableRng;

pub(crate) fn transcript_bits(hasher: &mut blake3::Hasher, bss: &[Vec<bool>]) {
    for bs in bss {
        let bytes: Vec<u8> = bs.iter().map(|&b| b as u8).collect();
        hasher.update(&bytes);
    }
}

pub(crate) fn transcript_blocks<'a>(
    hasher: &mut blake3::Hasher,
    blocks: impl IntoIterator<Item = &'a Block>,
) {
    for block in blocks {
        hasher.update(block.as_bytes());
    }
}

/// Returns the PRG for the check challenges, seeded from the transcript.
pub(crate) fn challenge_prg(hasher: &blake3::Hasher) -> Prg {
    let digest = hasher.finalize();
    let mut seed = [0u8; 16];
    seed.copy_from_slice(&digest.as_bytes()[..16]);
    Prg::from_seed(Block::new(seed))
}

/// Returns the tweak for level `level` of tree number `tree`.
#[inline]
pub(crate) fn tweak(level: usize, tree: usize) -> Block {
    bytemuck::cast([level as u64, tree as u64])
}

#[cfg(test)]
mod tests {
    use super::{msgs::CheckFromSender, receiver::Receiver, sender::Sender, *};
    use crate::{ideal::IdealCot, spcot::error::ReceiverError, CSP};
    use rstest::rstest;

    fn run(
        h: usize,
        alphas: &[u32],
        tamper: bool,
    ) -> Result<(Block, Vec<Block>, Vec<Block>), ReceiverError> {
        let mut cot = IdealCot::new(Block::from(11u128));
        let delta = cot.delta();

        let mut sender = Sender::new().setup(delta, Block::from(12u128));
        let mut receiver = Receiver::new().setup();

        let (base_s, base_r) = cot.random_correlated(alphas.len() * h);
        let (rs, ts) = base_r.into_parts();

        let masks = receiver.extend_mask_bits(h, alphas, &rs).unwrap();
        let extend = sender.extend(h, base_s.msgs(), &masks).unwrap();
        receiver.extend(h, alphas, &ts, &extend)?;

        let (check_s, check_r) = cot.random_correlated(CSP);
        let (x_star, z_star) = check_r.into_parts();

        let check = receiver.check_pre(&x_star)?;
        let (vs, CheckFromSender { mut hashed_v }) =
            sender.check(check_s.msgs(), check).unwrap();

        if tamper {
            hashed_v = pcgz_core::hash::blake3(b"forged");
        }

        let ws = receiver.check(&z_star, CheckFromSender { hashed_v })?;
        Ok((delta, vs, ws))
    }

    #[rstest]
    #[case(1, vec![1])]
    #[case(4, vec![0, 15, 7])]
    #[case(8, vec![200, 3, 255, 128, 0])]
    fn test_spcot(#[case] h: usize, #[case] alphas: Vec<u32>) {
        let (delta, vs, ws) = run(h, &alphas, false).unwrap();

        assert_eq!(vs.len(), alphas.len() << h);
        assert_eq!(ws.len(), vs.len());

        for (tree, &alpha) in alphas.iter().enumerate() {
            let offset = tree << h;
            for i in 0..1usize << h {
                let (v, w) = (vs[offset + i], ws[offset + i]);
                if i == alpha as usize {
                    assert_eq!(w, v ^ delta);
                } else {
                    assert_eq!(w, v);
                }
            }
        }
    }

    #[test]
    fn test_spcot_forged_check_fails() {
        assert!(matches!(
            run(4, &[3, 9], true),
            Err(ReceiverError::ConsistencyCheckFailed)
        ));
    }
}
