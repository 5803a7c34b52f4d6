//! Generators of OTs and triples on top of a silent COT engine.
//!
//! A generator wraps an [`Expandable`](crate::Expandable) COT engine and
//! converts the COTs of every round. COTs that do not fill a whole output
//! unit are carried over to the next round.

mod bit_triple;
mod rot;
mod z2k;

pub use bit_triple::{BitTripleReceiver, BitTripleSender};
pub use rot::{RotReceiver, RotSender};
pub use z2k::{Z2kTripleReceiver, Z2kTripleSender};

use pcgz_silent_core::batch::CorrelationBatch;

use crate::PcgError;

/// Appends `fresh` to `leftover`, then splits off the longest prefix made of
/// whole units of `unit` correlations.
fn take_units<B: CorrelationBatch>(
    leftover: &mut B,
    fresh: B,
    unit: usize,
) -> Result<Option<B>, PcgError> {
    leftover.merge(fresh)?;

    let usable = leftover.num() - leftover.num() % unit;
    if usable == 0 {
        return Ok(None);
    }

    Ok(Some(leftover.split_prefix(usable)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcgz_core::Block;
    use pcgz_silent_core::batch::CotSenderBatch;

    #[test]
    fn test_take_units() {
        let batch = |n| CotSenderBatch::new(Block::ONE, vec![Block::ZERO; n]);
        let mut leftover = CotSenderBatch::create_empty(Block::ONE);

        assert!(take_units(&mut leftover, batch(3), 4).unwrap().is_none());
        assert_eq!(leftover.num(), 3);

        let taken = take_units(&mut leftover, batch(10), 4).unwrap().unwrap();
        assert_eq!(taken.num(), 12);
        assert_eq!(leftover.num(), 1);

        assert!(take_units(&mut leftover, batch(1), 4)
            .unwrap()
            .is_none());
        assert!(take_units(&mut leftover, CotSenderBatch::create_empty(Block::ZERO), 4).is_err());
    }

    pub(crate) mod parties {
        //! Runs generator pairs over an in-memory channel.

        use pcgz_common::{memory_duplex, MemoryChannel};
        use pcgz_core::{lpn::LpnParams, Block};

        use crate::{
            cot::{SilentCotReceiver, SilentCotSender},
            ideal::{ideal_cot_sources, IdealCotReceiverSource, IdealCotSenderSource},
            Expandable, ExpansionConfig,
        };

        pub(crate) const PARAMS: LpnParams = LpnParams::new_unchecked(4096, 600, 64);

        pub(crate) fn engines() -> (
            SilentCotSender<IdealCotSenderSource>,
            SilentCotReceiver<IdealCotReceiverSource>,
        ) {
            let config = |seed: u128| {
                ExpansionConfig::builder()
                    .lpn_params(PARAMS)
                    .seed(Block::from(seed))
                    .build()
                    .unwrap()
            };
            let (source_s, source_r) = ideal_cot_sources(Block::from(5u128));

            (
                SilentCotSender::new(config(6), source_s),
                SilentCotReceiver::new(config(7), source_r),
            )
        }

        /// Runs setup and `rounds` rounds on both generators.
        pub(crate) fn run<S, R>(
            mut sender: S,
            mut receiver: R,
            rounds: usize,
        ) -> (Vec<S::Output>, Vec<R::Output>)
        where
            S: Expandable<MemoryChannel> + Send + 'static,
            S::Output: Send + 'static,
            R: Expandable<MemoryChannel>,
        {
            let (mut ch_s, mut ch_r) = memory_duplex();

            let handle = std::thread::spawn(move || {
                sender.setup(&mut ch_s, 1000).unwrap();
                (0..rounds)
                    .map(|_| sender.expand(&mut ch_s).unwrap())
                    .collect::<Vec<_>>()
            });

            receiver.setup(&mut ch_r, 1000).unwrap();
            let received = (0..rounds)
                .map(|_| receiver.expand(&mut ch_r).unwrap())
                .collect();

            (handle.join().unwrap(), received)
        }
    }
}
