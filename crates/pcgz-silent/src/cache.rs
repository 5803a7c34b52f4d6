use std::fmt;

use pcgz_common::{Channel, Lifecycle, ProtocolState};
use pcgz_silent_core::batch::CorrelationBatch;
use tracing::{debug, error, instrument};

use crate::{CacheConfig, CorrelationSource, Expandable, PcgError};

/// Serves correlations of arbitrary batch sizes from an engine producing
/// them in fixed-size rounds.
///
/// Surplus correlations of a round are kept for later requests. An aborted
/// protocol run destroys the cache.
pub struct CorrelationCache<E, Ch>
where
    E: Expandable<Ch>,
    Ch: Channel,
{
    config: CacheConfig,
    engine: E,
    channel: Ch,
    state: ProtocolState,
    buffer: Option<E::Output>,
    rounds: usize,
    round_size: usize,
    round_count: u64,
}

impl<E, Ch> fmt::Debug for CorrelationCache<E, Ch>
where
    E: Expandable<Ch>,
    Ch: Channel,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationCache")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("buffered", &self.buffered())
            .field("rounds", &self.rounds)
            .field("round_size", &self.round_size)
            .field("round_count", &self.round_count)
            .finish_non_exhaustive()
    }
}

impl<E, Ch> CorrelationCache<E, Ch>
where
    E: Expandable<Ch>,
    Ch: Channel,
{
    /// Creates a new, uninitialized cache.
    pub fn new(config: CacheConfig, engine: E, channel: Ch) -> Self {
        Self {
            config,
            engine,
            channel,
            state: ProtocolState::Uninitialized,
            buffer: None,
            rounds: 0,
            round_size: 0,
            round_count: 0,
        }
    }

    /// Returns the number of buffered correlations.
    pub fn buffered(&self) -> usize {
        self.buffer.as_ref().map_or(0, CorrelationBatch::num)
    }

    /// Returns the number of expansion rounds run so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Returns the round size chosen on initialization.
    pub fn round_size(&self) -> usize {
        self.round_size
    }

    /// Returns the number of rounds expected to serve the announced total.
    pub fn round_count(&self) -> u64 {
        self.round_count
    }

    /// Returns the channel to the peer.
    pub fn channel(&self) -> &Ch {
        &self.channel
    }

    /// Initializes the cache for about `expected_total_num` correlations,
    /// running the engine's setup.
    #[instrument(level = "debug", skip(self), err)]
    pub fn init(&mut self, expected_total_num: u64) -> Result<(), PcgError> {
        self.state.check(ProtocolState::Uninitialized, "init")?;

        if expected_total_num == 0 {
            return Err(PcgError::config(
                "expected total number of correlations must be positive",
            ));
        }

        let max_round_size = self.config.max_round_size();
        if max_round_size == 0 {
            return Err(PcgError::config("maximum round size must be positive"));
        }

        let round_size = usize::try_from(expected_total_num)
            .map_or(max_round_size, |total| total.min(max_round_size));
        let round_count = expected_total_num.div_ceil(round_size as u64);

        let res = self.engine.setup(&mut self.channel, round_size);
        self.guard(res)?;

        let tag = self.engine.tag()?;
        self.buffer = Some(<E::Output as CorrelationBatch>::create_empty(tag));
        self.round_size = round_size;
        self.round_count = round_count;
        self.state.initialize()?;

        debug!(round_size, round_count, "cache initialized");

        Ok(())
    }

    /// Returns exactly `num` correlations, running as many rounds as needed.
    #[instrument(level = "debug", skip(self), err)]
    pub fn generate(&mut self, num: u32) -> Result<E::Output, PcgError> {
        self.state.check(ProtocolState::Initialized, "generate")?;

        if num == 0 {
            return Err(PcgError::config("requested zero correlations"));
        }

        if num > self.config.max_generate_num() {
            return Err(PcgError::exhausted(format!(
                "requested {num} correlations, at most {} allowed",
                self.config.max_generate_num()
            )));
        }

        let num = num as usize;
        while self.buffered() < num {
            let res = self.engine.expand(&mut self.channel);
            let output = self.guard(res)?;

            let Some(buffer) = self.buffer.as_mut() else {
                return Err(PcgError::state("cache buffer missing"));
            };
            buffer.merge(output)?;
            self.rounds += 1;

            debug!(round = self.rounds, buffered = buffer.num(), "round merged");
        }

        let Some(buffer) = self.buffer.as_mut() else {
            return Err(PcgError::state("cache buffer missing"));
        };

        Ok(buffer.split_prefix(num)?)
    }

    /// Destroys the cache on an abort.
    fn guard<T>(&mut self, res: Result<T, PcgError>) -> Result<T, PcgError> {
        if let Err(err) = &res {
            if err.is_abort() {
                error!(%err, "protocol aborted");
                Lifecycle::destroy(self);
            }
        }
        res
    }
}

impl<E, Ch> Lifecycle for CorrelationCache<E, Ch>
where
    E: Expandable<Ch>,
    Ch: Channel,
{
    fn state(&self) -> ProtocolState {
        self.state
    }

    fn destroy(&mut self) {
        if self.state.destroy() {
            self.buffer = None;
        }
    }
}

impl<E, Ch> CorrelationSource for CorrelationCache<E, Ch>
where
    E: Expandable<Ch>,
    Ch: Channel,
{
    type Output = E::Output;

    fn request(&mut self, count: usize) -> Result<E::Output, PcgError> {
        let num = u32::try_from(count).map_err(|_| {
            PcgError::exhausted(format!(
                "requested {count} correlations, at most {} allowed",
                u32::MAX
            ))
        })?;
        self.generate(num)
    }
}
