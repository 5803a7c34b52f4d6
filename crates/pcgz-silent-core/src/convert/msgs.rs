//! Messages of the `Z_{2^l}` triple conversion.

use serde::{Deserialize, Serialize};

/// The receiver's choice corrections, `2 * l` bits per triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCorrections {
    /// `d_j = x_j ^ c_j`, where `x_j` is the wanted choice and `c_j` the
    /// random choice of COT `j`.
    pub d: Vec<bool>,
}

/// The sender's corrections, `2 * l` words per triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    /// `tau_j = k0_j - k1_j + y_j` in the ring.
    pub tau: Vec<u64>,
}
