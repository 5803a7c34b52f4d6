//! Messages for the SPCOT protocol.

use pcgz_core::{hash::Hash, Block};
use serde::{Deserialize, Serialize};

/// The masked bits of one noise position, sent by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskBits {
    /// One bit per tree level.
    pub bs: Vec<bool>,
}

/// The sender's message for one GGM tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendFromSender {
    /// The masked level sums, one pair per tree level.
    pub ms: Vec<[Block; 2]>,
    /// The sum of all leaves and delta.
    pub sum: Block,
}

/// The receiver's consistency check message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFromReceiver {
    /// The corrected choice bits of the check COTs.
    pub x_prime: Vec<bool>,
}

/// The sender's consistency check message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFromSender {
    /// The hash of the sender's check value.
    pub hashed_v: Hash,
}
