use pcgz_core::Block;
use serde::{Deserialize, Serialize};

use super::{check_len, check_tag, split_vec, BatchError, CorrelationBatch};

/// The sender's half of a batch of correlated OTs.
///
/// For every `i`, the receiver holds `msgs_r[i] = msgs[i] ^ choices[i] * delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CotSenderBatch {
    delta: Block,
    msgs: Vec<Block>,
}

impl CotSenderBatch {
    /// Creates a new batch.
    pub fn new(delta: Block, msgs: Vec<Block>) -> Self {
        Self { delta, msgs }
    }

    /// Returns the global correlation.
    pub fn delta(&self) -> Block {
        self.delta
    }

    /// Returns the `0`-messages.
    pub fn msgs(&self) -> &[Block] {
        &self.msgs
    }

    /// Returns the `0`-messages, consuming the batch.
    pub fn into_msgs(self) -> Vec<Block> {
        self.msgs
    }
}

impl CorrelationBatch for CotSenderBatch {
    type Tag = Block;

    fn create_empty(delta: Block) -> Self {
        Self::new(delta, Vec::new())
    }

    fn tag(&self) -> Block {
        self.delta
    }

    fn num(&self) -> usize {
        self.msgs.len()
    }

    fn split(self, m: usize) -> Result<(Self, Self), BatchError> {
        check_len(m, self.num())?;

        let (prefix, suffix) = split_vec(self.msgs, m);
        Ok((Self::new(self.delta, prefix), Self::new(self.delta, suffix)))
    }

    fn reduce(&mut self, m: usize) -> Result<(), BatchError> {
        check_len(m, self.num())?;
        self.msgs.truncate(m);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<(), BatchError> {
        check_tag(self.delta, other.delta)?;
        self.msgs.extend(other.msgs);
        Ok(())
    }
}

/// The receiver's half of a batch of correlated OTs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CotReceiverBatch {
    choices: Vec<bool>,
    msgs: Vec<Block>,
}

impl CotReceiverBatch {
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
            "cot receiver batch arrays out of sync"
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

    /// Returns the choice bits and chosen messages, consuming the batch.
    pub fn into_parts(self) -> (Vec<bool>, Vec<Block>) {
        (self.choices, self.msgs)
    }
}

impl CorrelationBatch for CotReceiverBatch {
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
