use pcgz_common::Channel;
use pcgz_core::Block;
use pcgz_silent_core::{
    batch::{CorrelationBatch, CotSenderBatch},
    expansion::{
        msgs::ExpansionSetup,
        sender::{state, Sender as SenderCore},
    },
    spcot::msgs::{CheckFromReceiver, MaskBits},
};
use tracing::{debug, instrument};

use crate::{
    cot::{party_seed, round_params},
    request_exact, CorrelationSource, ExpansionConfig, Expandable, PcgError,
};

#[derive(Debug)]
enum State {
    Initialized(SenderCore<state::Initialized>),
    Extension(SenderCore<state::Extension>),
    Error,
}

impl State {
    fn take(&mut self) -> Self {
        std::mem::replace(self, State::Error)
    }
}

/// Silent COT sender.
///
/// Holds the global correlation `delta` of its base COTs.
#[derive(Debug)]
pub struct SilentCotSender<S> {
    state: State,
    config: ExpansionConfig,
    source: S,
}

impl<S> SilentCotSender<S>
where
    S: CorrelationSource<Output = CotSenderBatch>,
{
    /// Creates a new sender drawing its base COTs from `source`.
    pub fn new(config: ExpansionConfig, source: S) -> Self {
        Self {
            state: State::Initialized(SenderCore::new()),
            config,
            source,
        }
    }

    /// Returns the global correlation, available after setup.
    pub fn delta(&self) -> Option<Block> {
        match &self.state {
            State::Extension(sender) => Some(sender.delta()),
            _ => None,
        }
    }
}

impl<S, Ch> Expandable<Ch> for SilentCotSender<S>
where
    S: CorrelationSource<Output = CotSenderBatch>,
    Ch: Channel,
{
    type Output = CotSenderBatch;

    #[instrument(level = "debug", skip_all, err)]
    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        if !matches!(self.state, State::Initialized(_)) {
            return Err(PcgError::state("sender not in initialized state"));
        }

        let (params, base_len) = round_params(&self.config, round_size)?;

        let State::Initialized(sender) = self.state.take() else {
            return Err(PcgError::state("sender not in initialized state"));
        };
        let base = request_exact(&mut self.source, base_len)?;

        let setup: ExpansionSetup = ch.recv()?;
        if setup.params != params {
            return Err(PcgError::abort(format!(
                "receiver chose {:?}, expected {params:?}",
                setup.params
            )));
        }

        let sender = sender.setup(
            params,
            self.config.encoder(),
            party_seed(&self.config),
            setup,
            base,
        )?;

        debug!(?params, "sender setup complete");

        self.state = State::Extension(sender);

        Ok(())
    }

    fn tag(&self) -> Result<Block, PcgError> {
        self.delta()
            .ok_or_else(|| PcgError::state("sender not in extension state"))
    }

    #[instrument(level = "debug", skip_all, err)]
    fn expand(&mut self, ch: &mut Ch) -> Result<CotSenderBatch, PcgError> {
        let State::Extension(mut sender) = self.state.take() else {
            return Err(PcgError::state("sender not in extension state"));
        };

        let masks: Vec<MaskBits> = ch.recv()?;
        let extend = sender.extend(&masks)?;
        ch.send(&extend)?;

        let check: CheckFromReceiver = ch.recv()?;
        let (s, check) = sender.check(check)?;
        ch.send(&check)?;

        let output = sender.expand(s)?;

        debug!(round = sender.rounds(), num = output.num(), "sender round complete");

        self.state = State::Extension(sender);

        Ok(output)
    }
}
