//! Expansion receiver.

use pcgz_core::{
    lpn::{LpnEncoderConfig, LpnParams, SparseLpnEncoder},
    prg::Prg,
    Block,
};
use rand::{Rng, SeedableRng};

use crate::{
    batch::{CorrelationBatch, CotReceiverBatch},
    expansion::{base_len, error::ReceiverError, msgs::ExpansionSetup},
    spcot::{
        self,
        msgs::{CheckFromReceiver, CheckFromSender, ExtendFromSender, MaskBits},
    },
    CSP,
};

/// Expansion receiver.
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

    /// Completes the setup phase of the protocol, returning the setup message
    /// for the sender.
    ///
    /// See step 1 and 2 in Figure 9.
    ///
    /// # Arguments
    ///
    /// * `params` - The LPN parameters.
    /// * `encoder_config` - The LPN encoder configuration.
    /// * `seed` - The seed of the receiver's PRG.
    /// * `base` - The base COTs, `k + t * h + CSP` of them.
    pub fn setup(
        self,
        params: LpnParams,
        encoder_config: LpnEncoderConfig,
        seed: Block,
        base: CotReceiverBatch,
    ) -> Result<(Receiver<state::Extension>, ExpansionSetup), ReceiverError> {
        let (Some(h), Some(base_len)) = (params.regular_depth(), base_len(&params)) else {
            return Err(ReceiverError::InvalidParams(format!(
                "{params:?} do not support regular noise"
            )));
        };

        if base.num() != base_len {
            return Err(ReceiverError::InvalidLength(format!(
                "expected {base_len} base COTs, got {}",
                base.num()
            )));
        }

        let mut prg = Prg::from_seed(seed);
        let matrix_seed = prg.random_block();

        let k = params.k() as usize;
        let (mut u, mut w) = base.into_parts();
        let reserve_choices = u.split_off(k);
        let reserve_msgs = w.split_off(k);

        let receiver = Receiver {
            state: state::Extension {
                params,
                h,
                encoder: SparseLpnEncoder::from_params(encoder_config, matrix_seed, &params),
                spcot: spcot::receiver::Receiver::new().setup(),
                prg,
                u,
                w,
                reserve_choices,
                reserve_msgs,
                phase: state::Phase::Idle,
                rounds: 0,
            },
        };

        Ok((
            receiver,
            ExpansionSetup {
                params,
                seed: matrix_seed,
            },
        ))
    }
}

impl Receiver<state::Extension> {
    /// Returns the LPN parameters.
    pub fn params(&self) -> &LpnParams {
        &self.state.params
    }

    /// Returns the number of completed rounds.
    pub fn rounds(&self) -> usize {
        self.state.rounds
    }

    /// Starts a round, sampling the noise positions and masking them.
    ///
    /// See step 3 and 4 in Figure 9.
    pub fn extend_mask_bits(&mut self) -> Result<Vec<MaskBits>, ReceiverError> {
        self.state.expect_phase(state::Phase::Idle, "extend_mask_bits")?;

        let t = self.state.params.t() as usize;
        let h = self.state.h;

        let alphas: Vec<u32> = (0..t)
            .map(|_| self.state.prg.gen_range(0..1u32 << h))
            .collect();

        let rs = &self.state.reserve_choices[..t * h];
        let masks = self.state.spcot.extend_mask_bits(h, &alphas, rs)?;

        self.state.phase = state::Phase::Masked { alphas };

        Ok(masks)
    }

    /// Reconstructs the GGM trees, returning the consistency check message.
    pub fn extend(
        &mut self,
        extends: &[ExtendFromSender],
    ) -> Result<CheckFromReceiver, ReceiverError> {
        let state::Phase::Masked { alphas } = &self.state.phase else {
            return Err(self.state.unexpected_phase("extend"));
        };

        let t = self.state.params.t() as usize;
        let h = self.state.h;

        let ts = &self.state.reserve_msgs[..t * h];
        self.state.spcot.extend(h, alphas, ts, extends)?;

        let x_star = &self.state.reserve_choices[t * h..t * h + CSP];
        let check = self.state.spcot.check_pre(x_star)?;

        let alphas = alphas.clone();
        self.state.phase = state::Phase::Extended { alphas };

        Ok(check)
    }

    /// Verifies the sender's check message.
    ///
    /// Returns the sparse vector `r` and the noise vector `e` to expand.
    pub fn check(
        &mut self,
        check: CheckFromSender,
    ) -> Result<(Vec<Block>, Vec<bool>), ReceiverError> {
        let state::Phase::Extended { alphas } = &self.state.phase else {
            return Err(self.state.unexpected_phase("check"));
        };

        let offset = self.state.params.t() as usize * self.state.h;
        let z_star = &self.state.reserve_msgs[offset..offset + CSP];
        let r = self.state.spcot.check(z_star, check)?;

        let chunk = 1usize << self.state.h;
        let mut e = vec![false; self.state.params.n() as usize];
        for (tree, &alpha) in alphas.iter().enumerate() {
            e[tree * chunk + alpha as usize] = true;
        }

        self.state.phase = state::Phase::Checked;

        Ok((r, e))
    }

    /// Expands the sparse vectors `r` and `e`, returning the round's output.
    ///
    /// Computes `z = A * w + r` and `x = A * u + e`, keeping the prefixes as
    /// the next base.
    ///
    /// See step 5 and 6 in Figure 9.
    pub fn expand(
        &mut self,
        r: Vec<Block>,
        e: Vec<bool>,
    ) -> Result<CotReceiverBatch, ReceiverError> {
        self.state.expect_phase(state::Phase::Checked, "expand")?;

        let n = self.state.params.n() as usize;
        if r.len() != n || e.len() != n {
            return Err(ReceiverError::InvalidLength(format!(
                "the length of r and e should be {n}, got {} and {}",
                r.len(),
                e.len()
            )));
        }

        let mut z = r;
        let mut x = e;
        self.state.encoder.encode_into(&mut z, &self.state.w)?;
        self.state.encoder.encode_into(&mut x, &self.state.u)?;

        let k = self.state.params.k() as usize;
        let reserve_len = self.state.reserve_msgs.len();

        let mut reserve_msgs = z.split_off(k);
        let msgs = reserve_msgs.split_off(reserve_len);
        let mut reserve_choices = x.split_off(k);
        let choices = reserve_choices.split_off(reserve_len);

        self.state.w = z;
        self.state.u = x;
        self.state.reserve_msgs = reserve_msgs;
        self.state.reserve_choices = reserve_choices;
        self.state.phase = state::Phase::Idle;
        self.state.rounds += 1;

        Ok(CotReceiverBatch::new(choices, msgs))
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

    #[derive(Debug, PartialEq, Eq)]
    pub(super) enum Phase {
        Idle,
        Masked { alphas: Vec<u32> },
        Extended { alphas: Vec<u32> },
        Checked,
    }

    /// The receiver's state after the setup phase.
    ///
    /// In this state the receiver performs expansion rounds.
    pub struct Extension {
        pub(super) params: LpnParams,
        /// Tree depth.
        pub(super) h: usize,
        pub(super) encoder: SparseLpnEncoder,
        pub(super) spcot: spcot::receiver::Receiver<spcot::receiver::state::Extension>,
        /// Samples the noise positions.
        pub(super) prg: Prg,

        /// Choice bits of the `k` COTs encoded by the next round.
        pub(super) u: Vec<bool>,
        /// Messages of the `k` COTs encoded by the next round.
        pub(super) w: Vec<Block>,
        /// Choice bits of the `t * h + CSP` COTs consumed by SPCOT.
        pub(super) reserve_choices: Vec<bool>,
        /// Messages of the `t * h + CSP` COTs consumed by SPCOT.
        pub(super) reserve_msgs: Vec<Block>,

        pub(super) phase: Phase,
        pub(super) rounds: usize,
    }

    impl Extension {
        pub(super) fn unexpected_phase(&self, operation: &str) -> ReceiverError {
            let phase = match self.phase {
                Phase::Idle => "idle",
                Phase::Masked { .. } => "masked",
                Phase::Extended { .. } => "extended",
                Phase::Checked => "checked",
            };
            ReceiverError::InvalidState(format!("{operation} called in phase {phase}"))
        }

        pub(super) fn expect_phase(
            &self,
            expected: Phase,
            operation: &str,
        ) -> Result<(), ReceiverError> {
            if self.phase != expected {
                return Err(self.unexpected_phase(operation));
            }
            Ok(())
        }
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
