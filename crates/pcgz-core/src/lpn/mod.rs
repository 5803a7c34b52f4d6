//! Learning parity with noise: parameters, security estimates and the sparse encoder.

mod encoder;
mod params;
mod security;

pub use encoder::{LpnEncoderConfig, LpnValue, SparseLpnEncoder, DEFAULT_DEGREE};
pub use params::LpnParams;
pub use security::{LpnCosts, LpnSecurity, DEFAULT_SECURITY_BITS};

/// Errors produced when constructing [`LpnParams`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LpnParamsError {
    /// The parameters violate a structural invariant.
    #[error("invalid lpn parameters (n={n}, k={k}, t={t}): {reason}")]
    Structure {
        /// Output length.
        n: u32,
        /// Message length.
        k: u32,
        /// Noise weight.
        t: u32,
        /// The violated invariant.
        reason: &'static str,
    },
    /// At least one attack costs less than the security level.
    #[error("insecure lpn parameters (n={n}, k={k}, t={t}): {costs}, required {required} bits")]
    Insecure {
        /// Output length.
        n: u32,
        /// Message length.
        k: u32,
        /// Noise weight.
        t: u32,
        /// All three attack costs.
        costs: LpnCosts,
        /// The required security level.
        required: u32,
    },
}

/// Errors produced by the LPN encoder.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum LpnError {
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
