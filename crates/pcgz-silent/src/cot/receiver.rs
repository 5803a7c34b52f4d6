use pcgz_common::Channel;
use pcgz_silent_core::{
    batch::{CorrelationBatch, CotReceiverBatch},
    expansion::receiver::{state, Receiver as ReceiverCore},
    spcot::msgs::{CheckFromSender, ExtendFromSender},
};
use tracing::{debug, instrument};

use crate::{
    cot::{party_seed, round_params},
    request_exact, CorrelationSource, ExpansionConfig, Expandable, PcgError,
};

#[derive(Debug)]
enum State {
    Initialized(ReceiverCore<state::Initialized>),
    Extension(ReceiverCore<state::Extension>),
    Error,
}

impl State {
    fn take(&mut self) -> Self {
        std::mem::replace(self, State::Error)
    }
}

/// Silent COT receiver.
///
/// Chooses the LPN matrix and the noise positions of every round.
#[derive(Debug)]
pub struct SilentCotReceiver<S> {
    state: State,
    config: ExpansionConfig,
    source: S,
}

impl<S> SilentCotReceiver<S>
where
    S: CorrelationSource<Output = CotReceiverBatch>,
{
    /// Creates a new receiver drawing its base COTs from `source`.
    pub fn new(config: ExpansionConfig, source: S) -> Self {
        Self {
            state: State::Initialized(ReceiverCore::new()),
            config,
            source,
        }
    }
}

impl<S, Ch> Expandable<Ch> for SilentCotReceiver<S>
where
    S: CorrelationSource<Output = CotReceiverBatch>,
    Ch: Channel,
{
    type Output = CotReceiverBatch;

    #[instrument(level = "debug", skip_all, err)]
    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        if !matches!(self.state, State::Initialized(_)) {
            return Err(PcgError::state("receiver not in initialized state"));
        }

        let (params, base_len) = round_params(&self.config, round_size)?;

        let State::Initialized(receiver) = self.state.take() else {
            return Err(PcgError::state("receiver not in initialized state"));
        };
        let base = request_exact(&mut self.source, base_len)?;

        let (receiver, setup) = receiver.setup(
            params,
            self.config.encoder(),
            party_seed(&self.config),
            base,
        )?;
        ch.send(&setup)?;

        debug!(?params, "receiver setup complete");

        self.state = State::Extension(receiver);

        Ok(())
    }

    fn tag(&self) -> Result<(), PcgError> {
        match self.state {
            State::Extension(_) => Ok(()),
            _ => Err(PcgError::state("receiver not in extension state")),
        }
    }

    #[instrument(level = "debug", skip_all, err)]
    fn expand(&mut self, ch: &mut Ch) -> Result<CotReceiverBatch, PcgError> {
        let State::Extension(mut receiver) = self.state.take() else {
            return Err(PcgError::state("receiver not in extension state"));
        };

        let masks = receiver.extend_mask_bits()?;
        ch.send(&masks)?;

        let extend: Vec<ExtendFromSender> = ch.recv()?;
        let check = receiver.extend(&extend)?;
        ch.send(&check)?;

        let check: CheckFromSender = ch.recv()?;
        let (r, e) = receiver.check(check)?;

        let output = receiver.expand(r, e)?;

        debug!(round = receiver.rounds(), num = output.num(), "receiver round complete");

        self.state = State::Extension(receiver);

        Ok(output)
    }
}
