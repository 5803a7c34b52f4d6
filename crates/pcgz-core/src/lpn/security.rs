//! Attack cost estimates for LPN parameters.

use serde::{Deserialize, Serialize};

use super::LpnParamsError;

/// The default target security level in bits.
pub const DEFAULT_SECURITY_BITS: u32 = 128;

/// Exponent of the matrix multiplication cost used by the estimates.
const OMEGA: f64 = 2.8;

/// The estimated costs of the known attacks, as floored base-2 logarithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpnCosts {
    /// Gaussian elimination attack.
    pub gaussian: i64,
    /// Low-weight parity-check attack.
    pub parity_check: i64,
    /// Information set decoding attack.
    pub isd: i64,
}

impl LpnCosts {
    /// Returns the smallest of the three costs.
    pub fn min(&self) -> i64 {
        self.gaussian.min(self.parity_check).min(self.isd)
    }
}

impl std::fmt::Display for LpnCosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gaussian: {}, parity-check: {}, isd: {}",
            self.gaussian, self.parity_check, self.isd
        )
    }
}

/// Validates LPN parameters against a target security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpnSecurity {
    security_bits: u32,
}

impl Default for LpnSecurity {
    fn default() -> Self {
        Self::new(DEFAULT_SECURITY_BITS)
    }
}

impl LpnSecurity {
    /// Creates a validator for `security_bits` bits of security.
    pub const fn new(security_bits: u32) -> Self {
        Self { security_bits }
    }

    /// Returns the target security level in bits.
    pub fn security_bits(&self) -> u32 {
        self.security_bits
    }

    /// Cost of the Gaussian elimination attack, `log2(k^2.8 * (1/(1 - t/n))^k)`.
    pub fn gaussian_cost(n: u32, k: u32, t: u32) -> i64 {
        let (n, k, t) = (f64::from(n), f64::from(k), f64::from(t));
        let cost = OMEGA * k.log2() - k * (1.0 - t / n).log2();
        cost.floor() as i64
    }

    /// Cost of the low-weight parity-check attack, `log2((k + 1) * (n/(n - k - 1))^t)`.
    pub fn parity_check_cost(n: u32, k: u32, t: u32) -> i64 {
        let (n, k, t) = (f64::from(n), f64::from(k), f64::from(t));
        let cost = (k + 1.0).log2() + t * (n / (n - k - 1.0)).log2();
        cost.floor() as i64
    }

    /// Cost of information set decoding, `log2(C(n, t)/C(n - k, t) * (n - k)^2.8)`.
    ///
    /// The binomial ratio is accumulated term by term in the log domain. If
    /// `t > n - k` no information set exists and the cost saturates.
    pub fn isd_cost(n: u32, k: u32, t: u32) -> i64 {
        let (n, k, t) = (u64::from(n), u64::from(k), u64::from(t));
        if t > n - k {
            return i64::MAX;
        }

        let ratio: f64 = (1..=t)
            .map(|i| ((n + 1 - i) as f64 / (n - k + 1 - i) as f64).log2())
            .sum();
        let cost = ratio + OMEGA * ((n - k) as f64).log2();
        cost.floor() as i64
    }

    /// Computes all three costs.
    pub fn costs(n: u32, k: u32, t: u32) -> LpnCosts {
        LpnCosts {
            gaussian: Self::gaussian_cost(n, k, t),
            parity_check: Self::parity_check_cost(n, k, t),
            isd: Self::isd_cost(n, k, t),
        }
    }

    /// Returns `true` if every cost reaches the security level.
    pub fn valid(&self, n: u32, k: u32, t: u32) -> bool {
        self.check(n, k, t).is_ok()
    }

    /// Checks the parameters, returning the costs or an error reporting all of them.
    ///
    /// The parameters must already satisfy the structural invariants of
    /// [`LpnParams`](super::LpnParams).
    pub fn check(&self, n: u32, k: u32, t: u32) -> Result<LpnCosts, LpnParamsError> {
        let costs = Self::costs(n, k, t);
        if costs.min() >= i64::from(self.security_bits) {
            Ok(costs)
        } else {
            Err(LpnParamsError::Insecure {
                n,
                k,
                t,
                costs,
                required: self.security_bits,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lpn::LpnParams;
    use rstest::rstest;

    #[test]
    fn test_costs_of_small_params() {
        let costs = LpnSecurity::costs(10_000, 600, 50);

        assert_eq!(
            costs,
            LpnCosts {
                gaussian: 30,
                parity_check: 13,
                isd: 41
            }
        );
        assert!(!LpnSecurity::default().valid(10_000, 600, 50));
    }

    #[test]
    fn test_costs_of_large_reference_params() {
        let costs = LpnSecurity::costs(10_805_248, 589_760, 1319);

        assert_eq!(costs.gaussian, 157);
        assert!(costs.isd >= 128);
        assert_eq!(costs.parity_check, 125);
        assert!(LpnParams::new(10_805_248, 589_760, 1319).is_err());
        assert!(LpnSecurity::new(125).valid(10_805_248, 589_760, 1319));
        assert!(!LpnSecurity::default().valid(10_805_248, 589_760, 1319));
    }

    #[test]
    fn test_setup_reference_params_are_valid() {
        let costs = LpnSecurity::default()
            .check(642_048, 19_870, 2508)
            .unwrap();

        assert_eq!(costs.gaussian, 152);
        assert_eq!(costs.parity_check, 128);
        assert_eq!(costs.isd, 167);
    }

    #[rstest]
    #[case(1 << 15, 8864)]
    #[case(1 << 17, 18912)]
    #[case(1 << 20, 76240)]
    fn test_costs_grow_with_noise(#[case] n: u32, #[case] k: u32) {
        let mut prev = LpnSecurity::costs(n, k, 16);
        for t in (32..=1024).step_by(16) {
            let costs = LpnSecurity::costs(n, k, t);
            assert!(costs.gaussian >= prev.gaussian);
            assert!(costs.parity_check >= prev.parity_check);
            assert!(costs.isd >= prev.isd);
            prev = costs;
        }
    }

    #[test]
    fn test_costs_with_fixed_noise_do_not_grow_with_length() {
        let (k, t) = (8864, 256);
        let mut prev = LpnSecurity::costs(1 << 14, k, t);
        for n in ((1 << 14) + 4096..=1 << 20).step_by(4096) {
            let costs = LpnSecurity::costs(n, k, t);
            assert!(costs.gaussian <= prev.gaussian);
            assert!(costs.parity_check <= prev.parity_check);
            prev = costs;
        }

        let (short, long) = (
            LpnSecurity::costs(1 << 14, k, t),
            LpnSecurity::costs(1 << 20, k, t),
        );
        assert_eq!((short.gaussian, short.parity_check), (238, 300));
        assert_eq!((long.gaussian, long.parity_check), (39, 16));
    }

    #[test]
    fn test_valid_implies_costs_reach_level() {
        let security = LpnSecurity::new(80);
        for (n, k, t) in [
            (1 << 15, 8864, 256),
            (1 << 14, 4000, 128),
            (10_000, 600, 50),
            (1 << 12, 1000, 64),
        ] {
            if security.valid(n, k, t) {
                assert!(LpnSecurity::costs(n, k, t).min() >= 80);
            }
        }
    }

    #[test]
    fn test_isd_saturates() {
        assert_eq!(LpnSecurity::isd_cost(100, 90, 20), i64::MAX);
    }
}
