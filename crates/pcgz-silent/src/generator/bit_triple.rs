use pcgz_common::Channel;
use pcgz_core::hash::CrHash;
use pcgz_silent_core::{
    batch::{BitTripleBatch, CorrelationBatch, CotReceiverBatch, CotSenderBatch, Gf2},
    convert::{BitTripleReceiver as ReceiverCore, BitTripleSender as SenderCore},
};
use tracing::debug;

use crate::{generator::take_units, Expandable, PcgError};

/// COTs per triple.
const COTS_PER_TRIPLE: usize = 2;

/// Bit triple generator on the COT sender's side.
#[derive(Debug)]
pub struct BitTripleSender<E, H> {
    engine: E,
    converter: SenderCore<H>,
    leftover: Option<CotSenderBatch>,
}

impl<E, H: CrHash> BitTripleSender<E, H> {
    /// Creates a new generator on top of a COT sender engine.
    pub fn new(engine: E, hasher: H) -> Self {
        Self {
            engine,
            converter: SenderCore::new(hasher),
            leftover: None,
        }
    }
}

impl<E, H, Ch> Expandable<Ch> for BitTripleSender<E, H>
where
    E: Expandable<Ch, Output = CotSenderBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = BitTripleBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        self.engine
            .setup(ch, round_size.saturating_mul(COTS_PER_TRIPLE))?;
        self.leftover = Some(CotSenderBatch::create_empty(self.engine.tag()?));
        Ok(())
    }

    fn tag(&self) -> Result<Gf2, PcgError> {
        self.engine.tag().map(|_| Gf2)
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<BitTripleBatch, PcgError> {
        let Some(leftover) = self.leftover.as_mut() else {
            return Err(PcgError::state("bit triple sender not set up"));
        };

        let cots = self.engine.expand(ch)?;
        match take_units(leftover, cots, COTS_PER_TRIPLE)? {
            Some(cots) => Ok(self.converter.convert(cots)?),
            None => Ok(BitTripleBatch::create_empty(Gf2)),
        }
    }
}

/// Bit triple generator on the COT receiver's side.
#[derive(Debug)]
pub struct BitTripleReceiver<E, H> {
    engine: E,
    converter: ReceiverCore<H>,
    leftover: Option<CotReceiverBatch>,
}

impl<E, H: CrHash> BitTripleReceiver<E, H> {
    /// Creates a new generator on top of a COT receiver engine.
    pub fn new(engine: E, hasher: H) -> Self {
        Self {
            engine,
            converter: ReceiverCore::new(hasher),
            leftover: None,
        }
    }
}

impl<E, H, Ch> Expandable<Ch> for BitTripleReceiver<E, H>
where
    E: Expandable<Ch, Output = CotReceiverBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = BitTripleBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        self.engine
            .setup(ch, round_size.saturating_mul(COTS_PER_TRIPLE))?;
        self.leftover = Some(CotReceiverBatch::create_empty(()));
        Ok(())
    }

    fn tag(&self) -> Result<Gf2, PcgError> {
        self.engine.tag().map(|_| Gf2)
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<BitTripleBatch, PcgError> {
        let Some(leftover) = self.leftover.as_mut() else {
            return Err(PcgError::state("bit triple receiver not set up"));
        };

        let cots = self.engine.expand(ch)?;
        let triples = match take_units(leftover, cots, COTS_PER_TRIPLE)? {
            Some(cots) => self.converter.convert(cots)?,
            None => BitTripleBatch::create_empty(Gf2),
        };

        debug!(num = triples.num(), leftover = leftover.num(), "bit triples generated");

        Ok(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::parties::{engines, run, PARAMS};
    use pcgz_core::aes::FIXED_KEY_AES;
    use pcgz_silent_core::{expansion::round_output, test::assert_bit_triples};

    #[test]
    fn test_bit_triple_generator() {
        let (engine_s, engine_r) = engines();
        let (sent, received) = run(
            BitTripleSender::new(engine_s, &*FIXED_KEY_AES),
            BitTripleReceiver::new(engine_r, &*FIXED_KEY_AES),
            3,
        );

        let cots = round_output(&PARAMS).unwrap();
        let total: usize = sent.iter().map(|s| s.num()).sum();
        assert_eq!(total, 3 * cots / COTS_PER_TRIPLE);

        for (s, r) in sent.iter().zip(&received) {
            assert_bit_triples(s, r);
        }
    }
}
