use pcgz_common::Channel;
use pcgz_core::hash::CrHash;
use pcgz_silent_core::{
    batch::{CotReceiverBatch, CotSenderBatch, RotReceiverBatch, RotSenderBatch},
    convert::{RotReceiver as RotReceiverCore, RotSender as RotSenderCore},
};

use crate::{Expandable, PcgError};

/// Random OT sender.
#[derive(Debug)]
pub struct RotSender<E, H> {
    engine: E,
    converter: RotSenderCore<H>,
}

impl<E, H: CrHash> RotSender<E, H> {
    /// Creates a new sender on top of a COT sender engine.
    pub fn new(engine: E, hasher: H) -> Self {
        Self {
            engine,
            converter: RotSenderCore::new(hasher),
        }
    }
}

impl<E, H, Ch> Expandable<Ch> for RotSender<E, H>
where
    E: Expandable<Ch, Output = CotSenderBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = RotSenderBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        self.engine.setup(ch, round_size)
    }

    fn tag(&self) -> Result<(), PcgError> {
        self.engine.tag().map(|_| ())
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<RotSenderBatch, PcgError> {
        let cots = self.engine.expand(ch)?;
        Ok(self.converter.convert(cots))
    }
}

/// Random OT receiver.
#[derive(Debug)]
pub struct RotReceiver<E, H> {
    engine: E,
    converter: RotReceiverCore<H>,
}

impl<E, H: CrHash> RotReceiver<E, H> {
    /// Creates a new receiver on top of a COT receiver engine.
    pub fn new(engine: E, hasher: H) -> Self {
        Self {
            engine,
            converter: RotReceiverCore::new(hasher),
        }
    }
}

impl<E, H, Ch> Expandable<Ch> for RotReceiver<E, H>
where
    E: Expandable<Ch, Output = CotReceiverBatch>,
    H: CrHash,
    Ch: Channel,
{
    type Output = RotReceiverBatch;

    fn setup(&mut self, ch: &mut Ch, round_size: usize) -> Result<(), PcgError> {
        self.engine.setup(ch, round_size)
    }

    fn tag(&self) -> Result<(), PcgError> {
        self.engine.tag()
    }

    fn expand(&mut self, ch: &mut Ch) -> Result<RotReceiverBatch, PcgError> {
        let cots = self.engine.expand(ch)?;
        Ok(self.converter.convert(cots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::parties::{engines, run};
    use pcgz_core::hash::Blake3CrHash;
    use pcgz_silent_core::{batch::CorrelationBatch, test::assert_rot};

    #[test]
    fn test_rot_generator() {
        let (engine_s, engine_r) = engines();
        let (sent, received) = run(
            RotSender::new(engine_s, Blake3CrHash),
            RotReceiver::new(engine_r, Blake3CrHash),
            2,
        );

        for (s, r) in sent.iter().zip(&received) {
            assert!(!s.is_empty());
            assert_rot(s, r);
        }
    }
}
