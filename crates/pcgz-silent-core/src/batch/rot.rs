use pcgz_core::Block;
use serde::{Deserialize, Serialize};

use super::{check_len, split_vec, BatchError, CorrelationBatch};

/// The sender's half of a batch of random OTs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotSenderBatch {
    msgs: Vec<[Block; 2]>,
}

impl RotSenderBatch {
    /// Creates a new batch.
    pub fn new(msgs: Vec<[Block; 2]>) -> Self {
        Self { msgs }
    }

    /// Returns the message pairs.
    pub fn msgs(&self) -> &[[Block; 2]] {
        &self.msgs
    }
}

impl CorrelationBatch for RotSenderBatch {
    type Tag = ();

    fn create_empty(_: ()) -> Self {
        Self::new(Vec::new())
    }

    fn tag(&self) {}

    fn num(&self) -> usize {
        self.msgs.len()
    }

    fn split(self, m: usize) -> Result<(Self, Self), BatchError> {
        check_len(m, self.num())?;

        let (prefix, suffix) = split_vec(self.msgs, m);
        Ok((Self::new(prefix), Self::new(suffix)))
    }

    fn reduce(&mut self, m: usize) -> Result<(), BatchError> {
        check_len(m, self.num())?;
        self.msgs.truncate(m);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<(), BatchError> {
        self.msgs.extend(other.msgs);
        Ok(())
    }
}

/// The receiver's half of a batch of random OTs.
///
/// For every `i`, `msgs[i] == sender.msgs[i][choices[i]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotReceiverBatch {
    choices: Vec<bool>,
    msgs: Vec<Block>,
}

impl RotReceiverBatch {
    /// Creates a new batch.
    ///
    /// # Panics
    ///
    /// Panics if `choices` and `msgs` have different lengths.
    pub fn new(choices: Vec<bool>, msgs: Vec<Block>) -> Self {
        let batch = Self { choices, msgs };
        batch.assert_valid();
        batch
    }

    #[inline]
    fn assert_valid(&self) {
        assert_eq!(
            self.choices.len(),
            self.msgs.len(),
            "rot receiver batch arrays out of sync"
        );
    }

    /// Returns the choice bits.
    pub fn choices(&self) -> &[bool] {
        &self.choices
    }

    /// Returns the chosen messages.
    pub fn msgs(&self) -> &[Block] {
        &self.msgs
    }
}

impl CorrelationBatch for RotReceiverBatch {
    type Tag = ();

    fn create_empty(_: ()) -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    fn tag(&self) {}

    fn num(&self) -> usize {
        self.assert_valid();
        self.msgs.len()
    }

    fn split(self, m: usize) -> Result<(Self, Self), BatchError> {
        check_len(m, self.num())?;

        let (choices, choices_rest) = split_vec(self.choices, m);
        let (msgs, msgs_rest) = split_vec(self.msgs, m);
        Ok((Self::new(choices, msgs), Self::new(choices_rest, msgs_rest)))
    }

    fn reduce(&mut self, m: usize) -> Result<(), BatchError> {
        check_len(m, self.num())?;
        self.choices.truncate(m);
        self.msgs.truncate(m);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<(), BatchError> {
        other.assert_valid();
        self.choices.extend(other.choices);
        self.msgs.extend(other.msgs);
        self.assert_valid();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::check_batch_laws;

    #[test]
    fn test_rot_batch_laws() {
        let msgs: Vec<_> = (0..6u128)
            .map(|i| [Block::from(i), Block::from(i + 100)])
            .collect();
        check_batch_laws(RotSenderBatch::new(msgs));

        let choices = vec![true, false, false, true, true, false];
        let msgs = (0..6u128).map(Block::from).collect();
        check_batch_laws(RotReceiverBatch::new(choices, msgs));
    }
}
