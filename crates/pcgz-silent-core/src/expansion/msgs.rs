//! Expansion protocol messages.

use pcgz_core::{lpn::LpnParams, Block};
use serde::{Deserialize, Serialize};

/// The receiver's setup message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSetup {
    /// The parameters chosen by the receiver.
    pub params: LpnParams,
    /// The seed of the LPN matrix.
    pub seed: Block,
}
