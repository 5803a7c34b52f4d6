//! Expansion sender.

use pcgz_core::{
    lpn::{LpnEncoderConfig, LpnParams, SparseLpnEncoder},
    Block,
};

use crate::{
    batch::{CorrelationBatch, CotSenderBatch},
    expansion::{base_len, error::SenderError, msgs::ExpansionSetup},
    spcot::{
        self,
        msgs::{CheckFromReceiver, CheckFromSender, ExtendFromSender, MaskBits},
    },
    CSP,
};

/// Expansion sender.
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
    /// See step 1 and 2 in Figure 9.
    ///
    /// # Arguments
    ///
    /// * `params` - The sender's LPN parameters.
    /// * `encoder_config` - The LPN encoder configuration.
    /// * `seed` - The seed of the sender's PRG.
    /// * `setup` - The receiver's setup message.
    /// * `base` - The base COTs, `k + t * h + CSP` of them.
    pub fn setup(
        self,
        params: LpnParams,
        encoder_config: LpnEncoderConfig,
        seed: Block,
        setup: ExpansionSetup,
        base: CotSenderBatch,
    ) -> Result<Sender<state::Extension>, SenderError> {
        if setup.params != params {
            return Err(SenderError::InvalidParams(format!(
                "receiver chose {:?}, expected {:?}",
                setup.params, params
            )));
        }

        let (Some(h), Some(base_len)) = (params.regular_depth(), base_len(&params)) else {
            return Err(SenderError::InvalidParams(format!(
                "{params:?} do not support regular noise"
            )));
        };

        if base.num() != base_len {
            return Err(SenderError::InvalidLength(format!(
                "expected {base_len} base COTs, got {}",
                base.num()
            )));
        }

        let delta = base.delta();
        let mut v = base.into_msgs();
        let reserve = v.split_off(params.k() as usize);

        Ok(Sender {
            state: state::Extension {
                params,
                h,
                encoder: SparseLpnEncoder::from_params(encoder_config, setup.seed, &params),
                spcot: spcot::sender::Sender::new().setup(delta, seed),
                v,
                reserve,
                phase: state::Phase::Idle,
                rounds: 0,
            },
        })
    }
}

impl Sender<state::Extension> {
    /// Returns the delta correlation.
    pub fn delta(&self) -> Block {
        self.state.spcot.delta()
    }

    /// Returns the LPN parameters.
    pub fn params(&self) -> &LpnParams {
        &self.state.params
    }

    /// Returns the number of completed rounds.
    pub fn rounds(&self) -> usize {
        self.state.rounds
    }

    /// Builds the GGM trees of a round from the receiver's mask bits.
    ///
    /// See step 3 and 4 in Figure 9.
    pub fn extend(&mut self, masks: &[MaskBits]) -> Result<Vec<ExtendFromSender>, SenderError> {
        self.state.expect_phase(state::Phase::Idle, "extend")?;

        let t = self.state.params.t() as usize;
        if masks.len() != t {
            return Err(SenderError::InvalidLength(format!(
                "expected {t} mask bit vectors, got {}",
                masks.len()
            )));
        }

        let h = self.state.h;
        let qs = &self.state.reserve[..t * h];
        let msgs = self.state.spcot.extend(h, qs, masks)?;

        self.state.phase = state::Phase::Extended;

        Ok(msgs)
    }

    /// Answers the receiver's consistency check.
    ///
    /// Returns the sparse vector `s` to expand, along with the message for the
    /// receiver.
    pub fn check(
        &mut self,
        check: CheckFromReceiver,
    ) -> Result<(Vec<Block>, CheckFromSender), SenderError> {
        self.state.expect_phase(state::Phase::Extended, "check")?;

        let offset = self.state.params.t() as usize * self.state.h;
        let y_star = &self.state.reserve[offset..offset + CSP];
        let (s, msg) = self.state.spcot.check(y_star, check)?;

        self.state.phase = state::Phase::Checked;

        Ok((s, msg))
    }

    /// Expands the sparse vector `s`, returning the round's output.
    ///
    /// Computes `y = A * v + s`, keeping the prefix of `y` as the next base.
    ///
    /// See step 5 and 6 in Figure 9.
    pub fn expand(&mut self, s: Vec<Block>) -> Result<CotSenderBatch, SenderError> {
        self.state.expect_phase(state::Phase::Checked, "expand")?;

        let n = self.state.params.n() as usize;
        if s.len() != n {
            return Err(SenderError::InvalidLength(format!(
                "the length of s should be {n}, got {}",
                s.len()
            )));
        }

        let mut y = s;
        self.state.encoder.encode_into(&mut y, &self.state.v)?;

        let k = self.state.params.k() as usize;
        let reserve_len = self.state.reserve.len();

        let mut reserve = y.split_off(k);
        let output = reserve.split_off(reserve_len);

        self.state.v = y;
        self.state.reserve = reserve;
        self.state.phase = state::Phase::Idle;
        self.state.rounds += 1;

        Ok(CotSenderBatch::new(self.delta(), output))
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

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Phase {
        Idle,
        Extended,
        Checked,
    }

    /// The sender's state after the setup phase.
    ///
    /// In this state the sender performs expansion rounds.
    pub struct Extension {
        pub(super) params: LpnParams,
        /// Tree depth.
        pub(super) h: usize,
        pub(super) encoder: SparseLpnEncoder,
        pub(super) spcot: spcot::sender::Sender<spcot::sender::state::Extension>,

        /// The `k` COTs encoded by the next round.
        pub(super) v: Vec<Block>,
        /// The `t * h + CSP` COTs consumed by SPCOT in the next round.
        pub(super) reserve: Vec<Block>,

        pub(super) phase: Phase,
        pub(super) rounds: usize,
    }

    impl Extension {
        pub(super) fn expect_phase(
            &self,
            expected: Phase,
            operation: &str,
        ) -> Result<(), SenderError> {
            if self.phase != expected {
                return Err(SenderError::InvalidState(format!(
                    "{operation} called in phase {:?}, expected {expected:?}",
                    self.phase
                )));
            }
            Ok(())
        }
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);
}
