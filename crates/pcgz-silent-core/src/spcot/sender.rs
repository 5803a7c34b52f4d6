//! SPCOT sender.

use pcgz_core::{aes::FIXED_KEY_AES, ggm_tree::GgmTree, hash::blake3, prg::Prg, Block};
use rand::SeedableRng;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    spcot::{
        challenge_prg,
        error::SenderError,
        msgs::{CheckFromReceiver, CheckFromSender, ExtendFromSender, MaskBits},
        transcript_bits, transcript_blocks, tweak,
    },
    CSP,
};

/// SPCOT sender.
#[derive(Debug, Default)]
pub struct Sender<T: state::State = state::Initialized> {
    state: T,
}

impl Sender {
    /// Creates a new Sender.
    pub fn new() -> Self {
        Sender {
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `delta` - The sender's global secret.
    /// * `seed` - The seed of the PRG sampling the GGM tree roots.
    pub fn setup(self, delta: Block, seed: Block) -> Sender<state::Extension> {
        Sender {
            state: state::Extension {
                delta,
                prg: Prg::from_seed(seed),
                unchecked_vs: Vec::new(),
                exec_counter: 0,
                hasher: blake3::Hasher::new(),
            },
        }
    }
}

impl Sender<state::Extension> {
    /// Returns the sender's global secret.
    pub fn delta(&self) -> Block {
        self.state.delta
    }

    /// Performs a batch of SPCOT extensions with trees of depth `h`.
    ///
    /// See Step 1-5 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `h` - The depth of the GGM trees.
    /// * `qs` - The sender's COT messages, `h` for every tree.
    /// * `masks` - The mask bits sent by the receiver, one per tree.
    pub fn extend(
        &mut self,
        h: usize,
        qs: &[Block],
        masks: &[MaskBits],
    ) -> Result<Vec<ExtendFromSender>, SenderError> {
        if h == 0 {
            return Err(SenderError::InvalidLength(
                "tree depth must be positive".to_string(),
            ));
        }

        if qs.len() != masks.len() * h {
            return Err(SenderError::InvalidLength(format!(
                "expected {} COTs for {} trees, got {}",
                masks.len() * h,
                masks.len(),
                qs.len()
            )));
        }

        if let Some(mask) = masks.iter().find(|m| m.bs.len() != h) {
            return Err(SenderError::InvalidLength(format!(
                "expected {h} mask bits, got {}",
                mask.bs.len()
            )));
        }

        let bss: Vec<Vec<bool>> = masks.iter().map(|m| m.bs.clone()).collect();
        transcript_bits(&mut self.state.hasher, &bss);

        let delta = self.state.delta;
        let exec_counter = self.state.exec_counter;
        let seeds = self.state.prg.random_block_vec(masks.len());
        let ggm_tree = GgmTree::new(h);

        let expand = |index: usize, seed: Block, qs: &[Block], bs: &[bool]| {
            let mut tree = vec![Block::ZERO; 1 << h];
            let mut k0 = vec![Block::ZERO; h];
            let mut k1 = vec![Block::ZERO; h];
            ggm_tree.gen(seed, &mut tree, &mut k0, &mut k1);

            let sum = tree.iter().fold(delta, |acc, &x| acc ^ x);

            let ms = qs
                .iter()
                .zip(bs)
                .zip(k0.into_iter().zip(k1))
                .enumerate()
                .map(|(level, ((&q, &b), (k0, k1)))| {
                    let mut m = if b { [q ^ delta, q] } else { [q, q ^ delta] };
                    let tweak = tweak(level, exec_counter + index);
                    FIXED_KEY_AES.tccr_many(&[tweak, tweak], &mut m);
                    m[0] ^= k0;
                    m[1] ^= k1;
                    m
                })
                .collect::<Vec<_>>();

            (tree, ExtendFromSender { ms, sum })
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let outputs: Vec<_> = seeds
                    .par_iter()
                    .zip(qs.par_chunks_exact(h))
                    .zip(bss.par_iter())
                    .enumerate()
                    .map(|(index, ((&seed, qs), bs))| expand(index, seed, qs, bs))
                    .collect();
            } else {
                let outputs: Vec<_> = seeds
                    .iter()
                    .zip(qs.chunks_exact(h))
                    .zip(bss.iter())
                    .enumerate()
                    .map(|(index, ((&seed, qs), bs))| expand(index, seed, qs, bs))
                    .collect();
            }
        }

        let mut msgs = Vec::with_capacity(outputs.len());
        for (tree, msg) in outputs {
            self.state.unchecked_vs.extend_from_slice(&tree);
            msgs.push(msg);
        }

        for msg in &msgs {
            transcript_blocks(&mut self.state.hasher, msg.ms.iter().flatten());
            transcript_blocks(&mut self.state.hasher, [&msg.sum]);
        }

        self.state.exec_counter += masks.len();

        Ok(msgs)
    }

    /// Performs the consistency check and returns the checked outputs of all
    /// extensions since the last check, concatenated.
    ///
    /// See Step 6-9 in Figure 6.
    ///
    /// # Arguments
    ///
    /// * `y_star` - The sender's COT messages reserved for the check.
    /// * `check` - The receiver's check message.
    pub fn check(
        &mut self,
        y_star: &[Block],
        check: CheckFromReceiver,
    ) -> Result<(Vec<Block>, CheckFromSender), SenderError> {
        let CheckFromReceiver { x_prime } = check;

        if y_star.len() != CSP {
            return Err(SenderError::InvalidLength(format!(
                "the length of y* should be {CSP}"
            )));
        }

        if x_prime.len() != CSP {
            return Err(SenderError::InvalidLength(format!(
                "the length of x' should be {CSP}"
            )));
        }

        let delta = self.state.delta;

        // y = y* + x' * delta
        let y: Vec<Block> = y_star
            .iter()
            .zip(&x_prime)
            .map(|(&y, &x)| if x { y ^ delta } else { y })
            .collect();

        let base: Vec<Block> = (0..CSP).map(Block::monomial).collect();
        let mut v = Block::inn_prdt_red(&y, &base);

        let mut prg = challenge_prg(&self.state.hasher);
        let chis = prg.random_block_vec(self.state.unchecked_vs.len());
        v ^= Block::inn_prdt_red(&chis, &self.state.unchecked_vs);

        let hashed_v = blake3(v.as_bytes());

        self.state.hasher = blake3::Hasher::new();
        let vs = std::mem::take(&mut self.state.unchecked_vs);

        Ok((vs, CheckFromSender { hashed_v }))
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender's state after the setup phase.
    pub struct Extension {
        /// Sender's global secret.
        pub(super) delta: Block,
        /// PRG sampling the tree roots.
        pub(super) prg: Prg,
        /// Outputs awaiting the consistency check.
        pub(super) unchecked_vs: Vec<Block>,
        /// Number of trees expanded so far.
        pub(super) exec_counter: usize,
        /// Transcript hasher seeding the check challenges.
        pub(super) hasher: blake3::Hasher,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
