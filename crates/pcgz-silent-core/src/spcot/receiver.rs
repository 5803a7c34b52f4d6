//! SPCOT receiver.

use itybity::ToBits;
use pcgz_core::{aes::FIXED_KEY_AES, ggm_tree::GgmTree, hash::blake3, Block};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    spcot::{
        challenge_prg,
        error::ReceiverError,
        msgs::{CheckFromReceiver, CheckFromSender, ExtendFromSender, MaskBits},
        transcript_bits, transcript_blocks, tweak,
    },
    CSP,
};

/// SPCOT receiver.
#[derive(Debug, Default)]
pub struct Receiver<T: state::State = state::Initialized> {
    state: T,
}

impl Receiver {
    /// Creates a new Receiver.
    pub fn new() -> Self {
        Receiver {
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    pub fn setup(self) -> Receiver<state::Extension> {
        Receiver {
            state: state::Extension {
                unchecked_ws: Vec::new(),
                chis: Vec::new(),
                alphas_and_length: Vec::new(),
                exec_counter: 0,
                hasher: blake3::Hasher::new(),
            },
        }
    }
}

/// The `h` low bits of `alpha`, most significant first.
fn path_bits(alpha: u32, h: usize) -> Vec<bool> {
    alpha.iter_msb0().skip(32 - h).collect()
}

fn check_alphas(h: usize, alphas: &[u32]) -> Result<(), ReceiverError> {
    if h == 0 || h > 31 {
        return Err(ReceiverError::InvalidInput(format!(
            "unsupported tree depth {h}"
        )));
    }

    if alphas.iter().any(|&alpha| alpha >= (1 << h)) {
        return Err(ReceiverError::InvalidInput(
            "the input pos should be no more than 2^h-1".to_string(),
        ));
    }

    Ok(())
}

impl Receiver<state::Extension> {
    /// Computes the mask bits for a batch of trees.
    ///
    /// See step 4 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `h` - The depth of the GGM trees.
    /// * `alphas` - The chosen positions, one per tree.
    /// * `rs` - The receiver's COT choice bits, `h` for every tree.
    pub fn extend_mask_bits(
        &mut self,
        h: usize,
        alphas: &[u32],
        rs: &[bool],
    ) -> Result<Vec<MaskBits>, ReceiverError> {
        check_alphas(h, alphas)?;

        if rs.len() != alphas.len() * h {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} choice bits, got {}",
                alphas.len() * h,
                rs.len()
            )));
        }

        let bss: Vec<Vec<bool>> = alphas
            .iter()
            .zip(rs.chunks_exact(h))
            .map(|(&alpha, rs)| {
                // alpha_i XOR r_i XOR 1
                path_bits(alpha, h)
                    .into_iter()
                    .zip(rs)
                    .map(|(alpha, &r)| alpha == r)
                    .collect()
            })
            .collect();

        transcript_bits(&mut self.state.hasher, &bss);

        Ok(bss.into_iter().map(|bs| MaskBits { bs }).collect())
    }

    /// Reconstructs the GGM trees from the sender's messages.
    ///
    /// May be called several times before checking.
    ///
    /// See step 5 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `h` - The depth of the GGM trees.
    /// * `alphas` - The chosen positions, one per tree.
    /// * `ts` - The receiver's COT messages, `h` for every tree.
    /// * `extends` - The sender's messages, one per tree.
    pub fn extend(
        &mut self,
        h: usize,
        alphas: &[u32],
        ts: &[Block],
        extends: &[ExtendFromSender],
    ) -> Result<(), ReceiverError> {
        check_alphas(h, alphas)?;

        if ts.len() != alphas.len() * h {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} COT messages, got {}",
                alphas.len() * h,
                ts.len()
            )));
        }

        if extends.len() != alphas.len() {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {} tree messages, got {}",
                alphas.len(),
                extends.len()
            )));
        }

        if let Some(extend) = extends.iter().find(|e| e.ms.len() != h) {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {h} level sums, got {}",
                extend.ms.len()
            )));
        }

        for extend in extends {
            transcript_blocks(&mut self.state.hasher, extend.ms.iter().flatten());
            transcript_blocks(&mut self.state.hasher, [&extend.sum]);
        }

        let exec_counter = self.state.exec_counter;
        let ggm_tree = GgmTree::new(h);

        let rebuild = |index: usize, alpha: u32, ts: &[Block], extend: &ExtendFromSender| {
            let alpha_bar: Vec<bool> = path_bits(alpha, h).into_iter().map(|a| !a).collect();

            let k: Vec<Block> = extend
                .ms
                .iter()
                .zip(ts)
                .zip(&alpha_bar)
                .enumerate()
                .map(|(level, ((&[m0, m1], &t), &b))| {
                    let hashed = FIXED_KEY_AES.tccr(tweak(level, exec_counter + index), t);
                    if b {
                        hashed ^ m1
                    } else {
                        hashed ^ m0
                    }
                })
                .collect();

            let mut tree = vec![Block::ZERO; 1 << h];
            ggm_tree.reconstruct(&mut tree, &k, &alpha_bar);

            // The missing leaf completes the sum to `delta ^ v[alpha]`.
            tree[alpha as usize] = tree.iter().fold(extend.sum, |acc, &x| acc ^ x);
            tree
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let trees: Vec<Vec<Block>> = alphas
                    .par_iter()
                    .zip(ts.par_chunks_exact(h))
                    .zip(extends.par_iter())
                    .enumerate()
                    .map(|(index, ((&alpha, ts), extend))| rebuild(index, alpha, ts, extend))
                    .collect();
            } else {
                let trees: Vec<Vec<Block>> = alphas
                    .iter()
                    .zip(ts.chunks_exact(h))
                    .zip(extends.iter())
                    .enumerate()
                    .map(|(index, ((&alpha, ts), extend))| rebuild(index, alpha, ts, extend))
                    .collect();
            }
        }

        for (tree, &alpha) in trees.iter().zip(alphas) {
            self.state.unchecked_ws.extend_from_slice(tree);
            self.state.alphas_and_length.push((alpha, 1 << h));
        }

        self.state.exec_counter += alphas.len();

        Ok(())
    }

    /// Computes the receiver's check message.
    ///
    /// See step 7 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `x_star` - The receiver's COT choice bits reserved for the check.
    pub fn check_pre(&mut self, x_star: &[bool]) -> Result<CheckFromReceiver, ReceiverError> {
        if x_star.len() != CSP {
            return Err(ReceiverError::InvalidLength(format!(
                "the length of x* should be {CSP}"
            )));
        }

        if self.state.unchecked_ws.is_empty() {
            return Err(ReceiverError::InvalidState(
                "no extension to check".to_string(),
            ));
        }

        let mut prg = challenge_prg(&self.state.hasher);

        let mut sum_chi_alpha = Block::ZERO;
        let mut chis = Vec::with_capacity(self.state.unchecked_ws.len());
        for &(alpha, n) in &self.state.alphas_and_length {
            let tree_chis = prg.random_block_vec(n);
            sum_chi_alpha ^= tree_chis[alpha as usize];
            chis.extend_from_slice(&tree_chis);
        }
        self.state.chis = chis;

        let x_prime = sum_chi_alpha
            .iter_lsb0()
            .zip(x_star)
            .map(|(x, &x_star)| x != x_star)
            .collect();

        Ok(CheckFromReceiver { x_prime })
    }

    /// Verifies the sender's check message and returns the checked outputs of
    /// all extensions since the last check, concatenated.
    ///
    /// See step 9 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `z_star` - The receiver's COT messages reserved for the check.
    /// * `check` - The sender's check message.
    pub fn check(
        &mut self,
        z_star: &[Block],
        check: CheckFromSender,
    ) -> Result<Vec<Block>, ReceiverError> {
        let CheckFromSender { hashed_v } = check;

        if z_star.len() != CSP {
            return Err(ReceiverError::InvalidLength(format!(
                "the length of z* should be {CSP}"
            )));
        }

        if self.state.chis.len() != self.state.unchecked_ws.len() {
            return Err(ReceiverError::InvalidState(
                "check_pre must be called before check".to_string(),
            ));
        }

        let base: Vec<Block> = (0..CSP).map(Block::monomial).collect();
        let mut w = Block::inn_prdt_red(z_star, &base);
        w ^= Block::inn_prdt_red(&self.state.chis, &self.state.unchecked_ws);

        if hashed_v != blake3(w.as_bytes()) {
            return Err(ReceiverError::ConsistencyCheckFailed);
        }

        self.state.hasher = blake3::Hasher::new();
        self.state.alphas_and_length.clear();
        self.state.chis.clear();

        Ok(std::mem::take(&mut self.state.unchecked_ws))
    }
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state after the setup phase.
    pub struct Extension {
        /// Outputs awaiting the consistency check.
        pub(super) unchecked_ws: Vec<Block>,
        /// Check challenges.
        pub(super) chis: Vec<Block>,
        /// The chosen position and length of every unchecked tree.
        pub(super) alphas_and_length: Vec<(u32, usize)>,
        /// Number of trees reconstructed so far.
        pub(super) exec_counter: usize,
        /// Transcript hasher seeding the check challenges.
        pub(super) hasher: blake3::Hasher,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
