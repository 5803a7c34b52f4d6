//! Silent COT expansion with regular noise.
//!
//! A round turns `k + t * h + CSP` base COTs into `n` fresh COTs, where
//! `n = t * 2^h`. The first `k + t * h + CSP` outputs are kept back as the
//! base of the next round, so rounds bootstrap each other and only the first
//! one consumes externally produced correlations.
//!
//! A round runs in four messages:
//!
//! 1. The receiver samples one noise position per tree and sends
//!    [`MaskBits`](crate::spcot::msgs::MaskBits), one per tree.
//! 2. The sender answers with the GGM tree messages.
//! 3. The receiver reconstructs the trees and sends its check message.
//! 4. The sender answers with its check hash.
//!
//! Both parties then expand the sparse vectors with the LPN encoder.
//!
//! See <https://eprint.iacr.org/2020/924.pdf>, Figure 9.

mod error;
pub mod msgs;
pub mod receiver;
pub mod sender;

pub use error::{ReceiverError, SenderError};

use pcgz_core::lpn::LpnParams;

use crate::CSP;

/// Returns the tree depth of `params`, if they support regular noise.
#[inline]
pub fn depth(params: &LpnParams) -> Option<usize> {
    params.regular_depth()
}

/// Returns the number of base COTs a round with `params` consumes.
///
/// Returns `None` if the parameters do not support regular noise.
pub fn base_len(params: &LpnParams) -> Option<usize> {
    let h = depth(params)?;
    Some(params.k() as usize + params.t() as usize * h + CSP)
}

/// Returns the number of COTs a round with `params` outputs.
///
/// Returns `None` if the parameters do not support regular noise or leave
/// nothing to output.
pub fn round_output(params: &LpnParams) -> Option<usize> {
    let base_len = base_len(params)?;
    (params.n() as usize)
        .checked_sub(base_len)
        .filter(|&out| out > 0)
}

/// Selects the smallest preset whose round output covers `round_size`,
/// falling back to the largest preset.
pub fn select_params(round_size: usize) -> LpnParams {
    let largest = LpnParams::PRESETS[LpnParams::PRESETS.len() - 1];

    LpnParams::PRESETS
        .into_iter()
        .find(|params| round_output(params).is_some_and(|out| out >= round_size))
        .unwrap_or(largest)
}
