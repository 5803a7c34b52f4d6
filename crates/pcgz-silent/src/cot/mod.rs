//! Silent COT expansion over a channel.

mod receiver;
mod sender;

pub use receiver::SilentCotReceiver;
pub use sender::SilentCotSender;

use pcgz_core::{lpn::LpnParams, Block};
use pcgz_silent_core::expansion::{base_len, round_output, select_params};

use crate::{ExpansionConfig, PcgError};

/// Returns the parameters of the rounds and the number of base COTs they
/// need.
fn round_params(
    config: &ExpansionConfig,
    round_size: usize,
) -> Result<(LpnParams, usize), PcgError> {
    let params = config
        .lpn_params()
        .unwrap_or_else(|| select_params(round_size));

    match (round_output(&params), base_len(&params)) {
        (Some(_), Some(base_len)) => Ok((params, base_len)),
        _ => Err(PcgError::config(format!(
            "{params:?} do not support silent expansion"
        ))),
    }
}

fn party_seed(config: &ExpansionConfig) -> Block {
    config.seed().unwrap_or_else(rand::random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcgz_common::{memory_duplex, MemoryChannel};
    use pcgz_silent_core::{
        batch::{CorrelationBatch, CotReceiverBatch, CotSenderBatch},
        test::assert_cot,
    };

    use crate::{ideal::ideal_cot_sources, Expandable};

    const PARAMS: LpnParams = LpnParams::new_unchecked(4096, 600, 64);

    fn config(seed: u128) -> ExpansionConfig {
        ExpansionConfig::builder()
            .lpn_params(PARAMS)
            .seed(Block::from(seed))
            .build()
            .unwrap()
    }

    fn run_rounds(rounds: usize) -> (Vec<CotSenderBatch>, Vec<CotReceiverBatch>) {
        let (source_s, source_r) = ideal_cot_sources(Block::from(99u128));
        let (mut ch_s, mut ch_r): (MemoryChannel, MemoryChannel) = memory_duplex();

        let handle = std::thread::spawn(move || {
            let mut sender = SilentCotSender::new(config(1), source_s);
            sender.setup(&mut ch_s, 1000).unwrap();
            (0..rounds)
                .map(|_| sender.expand(&mut ch_s).unwrap())
                .collect::<Vec<_>>()
        });

        let mut receiver = SilentCotReceiver::new(config(2), source_r);
        receiver.setup(&mut ch_r, 1000).unwrap();
        let received = (0..rounds)
            .map(|_| receiver.expand(&mut ch_r).unwrap())
            .collect();

        (handle.join().unwrap(), received)
    }

    #[test]
    fn test_silent_cot() {
        let (sent, received) = run_rounds(3);

        for (s, r) in sent.iter().zip(&received) {
            assert_eq!(s.num(), round_output(&PARAMS).unwrap());
            assert_cot(s, r);
        }
    }

    #[test]
    fn test_silent_cot_is_deterministic() {
        let (a, _) = run_rounds(1);
        let (b, _) = run_rounds(1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_params() {
        let (params, base_len) = round_params(&ExpansionConfig::default(), 100).unwrap();
        assert_eq!(params, LpnParams::PRESETS[0]);
        assert_eq!(base_len, 8864 + 256 * 7 + 128);

        let irregular = ExpansionConfig::builder()
            .lpn_params(LpnParams::new_unchecked(10_000, 600, 50))
            .build()
            .unwrap();
        assert_eq!(
            round_params(&irregular, 100).unwrap_err().kind(),
            crate::ErrorKind::Config
        );
    }

    #[test]
    fn test_setup_config_error_keeps_engine_usable() {
        let irregular = ExpansionConfig::builder()
            .lpn_params(LpnParams::new_unchecked(10_000, 600, 50))
            .build()
            .unwrap();
        let (source_s, source_r) = ideal_cot_sources(Block::ONE);
        let (mut ch_s, mut ch_r): (MemoryChannel, MemoryChannel) = memory_duplex();

        let mut sender = SilentCotSender::new(irregular.clone(), source_s);
        let mut receiver = SilentCotReceiver::new(irregular, source_r);

        for _ in 0..2 {
            let err = sender.setup(&mut ch_s, 100).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Config);

            let err = receiver.setup(&mut ch_r, 100).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Config);
        }

        assert!(sender.delta().is_none());
    }
}
