use pcgz_common::Channel;
use pcgz_core::hash::CrHash;
use pcgz_silent_core::{
    batch::{CorrelationBatch, CotReceiverBatch, CotSenderBatch, Z2k, Z2kTripleBatch},
    convert::{
        msgs::{ChoiceCorrections, Corrections},
        Z2kTripleReceiver as ReceiverCore, Z2kTripleSender as SenderCore,
    },
};
use tracing::debug;

use crate::{generator::take_units, Expandable, PcgError, Z2kConfig};

fn cots_per_triple(ring: Z2k) -> usize {
    2 * ring.bits() as usize
}

/// `Z_{2^l}` triple generator on the COT sender's side.
#[derive(Debug)]
pub struct Z2kTripleSender<E, H> {
    engine: E,
    converter: SenderCore<H>,
    leftover: Option<CotSenderBatch>,
}

impl<E, H: CrHash> Z2kTripleSender<E, H> {
    /// Creates a new generator on top of a COT sender engine.
    pub fn new(config: Z2kConfig, engine: E, hasher: H) -> Result<Self, PcgError> {
        let ring = config.ring()?;
        let seed = config.seed().unwrap_or_else(rand::random);

        Ok(Self {
            engine,
            converter: SenderCore::new(ring, hasher, seed),
            leftover: None,
        })
    }
}

impl<E, H, Ch> Expandable<Ch> for Z2kTripleSender<E, H>
where
    E: Expandable<Ch, Output = CotSenderBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = Z2kTripleBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        let per_triple = cots_per_triple(self.converter.ring());
        self.engine.setup(ch, round_size.saturating_mul(per_triple))?;
        self.leftover = Some(CotSenderBatch::create_empty(self.engine.tag()?));
        Ok(())
    }

    fn tag(&self) -> Result<Z2k, PcgError> {
        Ok(self.converter.ring())
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<Z2kTripleBatch, PcgError> {
        let Some(leftover) = self.leftover.as_mut() else {
            return Err(PcgError::state("z2k triple sender not set up"));
        };

        let ring = self.converter.ring();
        let cots = self.engine.expand(ch)?;
        let Some(cots) = take_units(leftover, cots, cots_per_triple(ring))? else {
            return Ok(Z2kTripleBatch::create_empty(ring));
        };

        let choices: ChoiceCorrections = ch.recv()?;
        let (triples, corrections) = self.converter.convert(cots, choices)?;
        ch.send(&corrections)?;

        debug!(num = triples.num(), leftover = leftover.num(), "z2k triples generated");

        Ok(triples)
    }
}

/// `Z_{2^l}` triple generator on the COT receiver's side.
#[derive(Debug)]
pub struct Z2kTripleReceiver<E, H> {
    engine: E,
    converter: ReceiverCore<H>,
    leftover: Option<CotReceiverBatch>,
}

impl<E, H: CrHash> Z2kTripleReceiver<E, H> {
    /// Creates a new generator on top of a COT receiver engine.
    pub fn new(config: Z2kConfig, engine: E, hasher: H) -> Result<Self, PcgError> {
        let ring = config.ring()?;
        let seed = config.seed().unwrap_or_else(rand::random);

        Ok(Self {
            engine,
            converter: ReceiverCore::new(ring, hasher, seed),
            leftover: None,
        })
    }
}

impl<E, H, Ch> Expandable<Ch> for Z2kTripleReceiver<E, H>
where
    E: Expandable<Ch, Output = CotReceiverBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = Z2kTripleBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        let per_triple = cots_per_triple(self.converter.ring());
        self.engine.setup(ch, round_size.saturating_mul(per_triple))?;
        self.leftover = Some(CotReceiverBatch::create_empty(()));
        Ok(())
    }

    fn tag(&self) -> Result<Z2k, PcgError> {
        Ok(self.converter.ring())
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<Z2kTripleBatch, PcgError> {
        let Some(leftover) = self.leftover.as_mut() else {
            return Err(PcgError::state("z2k triple receiver not set up"));
        };

        let ring = self.converter.ring();
        let cots = self.engine.expand(ch)?;
        let Some(cots) = take_units(leftover, cots, cots_per_triple(ring))? else {
            return Ok(Z2kTripleBatch::create_empty(ring));
        };

        let (pending, choices) = self.converter.convert(cots)?;
        ch.send(&choices)?;

        let corrections: Corrections = ch.recv()?;
        let triples = pending.finish(corrections)?;

        Ok(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::parties::{engines, run, PARAMS};
    use pcgz_core::{aes::FIXED_KEY_AES, Block};
    use pcgz_silent_core::{expansion::round_output, test::assert_z2k_triples};
    use rstest::rstest;

    fn config(bits: u32, seed: u128) -> Z2kConfig {
        Z2kConfig::builder()
            .bits(bits)
            .seed(Block::from(seed))
            .build()
            .unwrap()
    }

    #[rstest]
    #[case(8)]
    #[case(64)]
    fn test_z2k_generator(#[case] bits: u32) {
        let (engine_s, engine_r) = engines();
        let rounds = 3;
        let (sent, received) = run(
            Z2kTripleSender::new(config(bits, 1), engine_s, &*FIXED_KEY_AES).unwrap(),
            Z2kTripleReceiver::new(config(bits, 2), engine_r, &*FIXED_KEY_AES).unwrap(),
            rounds,
        );

        let per_triple = 2 * bits as usize;
        let total: usize = sent.iter().map(|s| s.num()).sum();
        assert_eq!(
            total,
            rounds * round_output(&PARAMS).unwrap() / per_triple
        );

        for (s, r) in sent.iter().zip(&received) {
            assert_eq!(s.ring().bits(), bits);
            assert_z2k_triples(s, r);
        }
    }

    #[test]
    fn test_z2k_generator_rejects_bad_ring() {
        let (engine_s, _) = engines();
        let config = Z2kConfig {
            bits: 0,
            seed: None,
        };

        let err = Z2kTripleSender::new(config, engine_s, &*FIXED_KEY_AES).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }
}
