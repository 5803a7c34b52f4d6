use serde::{Deserialize, Serialize};

use super::{LpnParamsError, LpnSecurity};

/// LPN parameters.
///
/// * `n` - the output length.
/// * `k` - the message length.
/// * `t` - the noise weight.
///
/// Invariants: `k > 0`, `n > k + 1` and `0 < t < n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LpnParams {
    n: u32,
    k: u32,
    t: u32,
}

impl LpnParams {
    /// Regular-noise parameter sets with `n = t * 2^h`, each valid at 128 bits.
    ///
    /// Ordered by increasing `n`.
    pub const PRESETS: [LpnParams; 5] = [
        LpnParams::new_unchecked(1 << 15, 8_864, 256),
        LpnParams::new_unchecked(1 << 17, 18_912, 512),
        LpnParams::new_unchecked(768 << 10, 76_240, 768),
        LpnParams::new_unchecked(1 << 22, 303_456, 1024),
        LpnParams::new_unchecked(1319 << 13, 606_496, 1319),
    ];

    /// Creates parameters without checking their security.
    ///
    /// Intended for parameters that are known to be safe, such as [`LpnParams::PRESETS`],
    /// and for tests.
    ///
    /// # Panics
    ///
    /// Panics if the structural invariants do not hold.
    pub const fn new_unchecked(n: u32, k: u32, t: u32) -> Self {
        assert!(k > 0, "lpn parameters require k > 0");
        assert!(n as u64 > k as u64 + 1, "lpn parameters require n > k + 1");
        assert!(t > 0 && t < n, "lpn parameters require 0 < t < n");
        Self { n, k, t }
    }

    /// Creates parameters, checking them against the default security level.
    pub fn new(n: u32, k: u32, t: u32) -> Result<Self, LpnParamsError> {
        Self::with_security(n, k, t, &LpnSecurity::default())
    }

    /// Creates parameters, checking them against `security`.
    pub fn with_security(
        n: u32,
        k: u32,
        t: u32,
        security: &LpnSecurity,
    ) -> Result<Self, LpnParamsError> {
        let structure = |reason| LpnParamsError::Structure { n, k, t, reason };

        if k == 0 {
            return Err(structure("k must be positive"));
        }
        if u64::from(n) <= u64::from(k) + 1 {
            return Err(structure("n must exceed k + 1"));
        }
        if t == 0 || t >= n {
            return Err(structure("t must be in (0, n)"));
        }

        security.check(n, k, t)?;

        Ok(Self { n, k, t })
    }

    /// Returns the output length.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Returns the message length.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Returns the noise weight.
    pub fn t(&self) -> u32 {
        self.t
    }

    /// Returns `h` if the parameters support regular noise, i.e. `n = t * 2^h` with `h >= 1`.
    pub fn regular_depth(&self) -> Option<usize> {
        if self.n % self.t != 0 {
            return None;
        }

        let chunk = self.n / self.t;
        (chunk >= 2 && chunk.is_power_of_two()).then(|| chunk.trailing_zeros() as usize)
    }
}
