use derive_builder::Builder;
use pcgz_core::{
    lpn::{LpnEncoderConfig, LpnParams},
    Block,
};
use pcgz_silent_core::batch::{BatchError, Z2k};

/// Silent COT expansion configuration.
#[derive(Debug, Clone, Builder)]
pub struct ExpansionConfig {
    /// LPN parameters, overriding the selection by round size.
    #[builder(default, setter(strip_option))]
    pub(crate) lpn_params: Option<LpnParams>,
    /// LPN encoder configuration.
    #[builder(default)]
    pub(crate) encoder: LpnEncoderConfig,
    /// Seed of the party's PRG.
    ///
    /// If not set, a random seed is sampled on setup.
    #[builder(default, setter(strip_option))]
    pub(crate) seed: Option<Block>,
}

impl ExpansionConfig {
    /// Creates a new builder for the expansion configuration.
    pub fn builder() -> ExpansionConfigBuilder {
        ExpansionConfigBuilder::default()
    }

    /// Returns the configured LPN parameters.
    pub fn lpn_params(&self) -> Option<LpnParams> {
        self.lpn_params
    }

    /// Returns the LPN encoder configuration.
    pub fn encoder(&self) -> LpnEncoderConfig {
        self.encoder
    }

    /// Returns the configured seed.
    pub fn seed(&self) -> Option<Block> {
        self.seed
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            lpn_params: None,
            encoder: LpnEncoderConfig::default(),
            seed: None,
        }
    }
}

/// Correlation cache configuration.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CacheConfig {
    /// Upper bound on the number of correlations a round targets.
    #[builder(default = "1 << 20")]
    pub(crate) max_round_size: usize,
    /// Upper bound on the number of correlations of a single request.
    #[builder(default = "u32::MAX")]
    pub(crate) max_generate_num: u32,
}

impl CacheConfig {
    /// Creates a new builder for the cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Returns the maximum round size.
    pub fn max_round_size(&self) -> usize {
        self.max_round_size
    }

    /// Returns the maximum number of correlations per request.
    pub fn max_generate_num(&self) -> u32 {
        self.max_generate_num
    }
}

impl CacheConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_round_size == Some(0) {
            return Err("maximum round size must be positive".to_string());
        }
        if self.max_generate_num == Some(0) {
            return Err("maximum request size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_round_size: 1 << 20,
            max_generate_num: u32::MAX,
        }
    }
}

/// Configuration of the `Z_{2^l}` triple generators.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Z2kConfig {
    /// Bit length `l` of the ring, in `1..=64`.
    #[builder(default = "64")]
    pub(crate) bits: u32,
    /// Seed of the PRG sampling this party's shares.
    ///
    /// If not set, a random seed is sampled.
    #[builder(default, setter(strip_option))]
    pub(crate) seed: Option<Block>,
}

impl Z2kConfig {
    /// Creates a new builder for the triple configuration.
    pub fn builder() -> Z2kConfigBuilder {
        Z2kConfigBuilder::default()
    }

    /// Returns the ring of the triples.
    pub fn ring(&self) -> Result<Z2k, BatchError> {
        Z2k::new(self.bits)
    }

    /// Returns the configured seed.
    pub fn seed(&self) -> Option<Block> {
        self.seed
    }
}

impl Z2kConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.bits {
            Some(bits) if !(1..=64).contains(&bits) => {
                Err(format!("ring bit length must be in 1..=64, got {bits}"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::builder().build().unwrap();
        assert_eq!(config.max_round_size(), 1 << 20);
        assert_eq!(config.max_generate_num(), u32::MAX);
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    fn test_cache_config_rejects_zero(
        #[case] max_round_size: Option<usize>,
        #[case] max_generate_num: Option<u32>,
    ) {
        let mut builder = CacheConfig::builder();
        if let Some(max_round_size) = max_round_size {
            builder.max_round_size(max_round_size);
        }
        if let Some(max_generate_num) = max_generate_num {
            builder.max_generate_num(max_generate_num);
        }

        assert!(builder.build().is_err());
    }

    #[test]
    fn test_expansion_config() {
        let params = LpnParams::PRESETS[0];
        let config = ExpansionConfig::builder()
            .lpn_params(params)
            .seed(Block::ONE)
            .build()
            .unwrap();

        assert_eq!(config.lpn_params(), Some(params));
        assert_eq!(config.seed(), Some(Block::ONE));
        assert_eq!(config.encoder(), LpnEncoderConfig::default());
    }

    #[rstest]
    #[case(1, true)]
    #[case(64, true)]
    #[case(0, false)]
    #[case(65, false)]
    fn test_z2k_config_bits(#[case] bits: u32, #[case] valid: bool) {
        let config = Z2kConfig::builder().bits(bits).build();
        assert_eq!(config.is_ok(), valid);

        if let Ok(config) = config {
            assert_eq!(config.ring().unwrap().bits(), bits);
        }
    }
}
