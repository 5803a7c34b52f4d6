use crate::{aes::AesEncryptor, Block};

use super::{LpnError, LpnParams};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// The default number of non-zero entries per row.
pub const DEFAULT_DEGREE: usize = 10;

/// Bytes per derived column index.
const INDEX_BYTES: usize = 4;

/// Configuration of a [`SparseLpnEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpnEncoderConfig {
    /// Number of column indices per row.
    pub degree: usize,
    /// Whether rows are computed in parallel.
    ///
    /// Has no effect without the `rayon` feature.
    pub parallel: bool,
}

impl Default for LpnEncoderConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            parallel: true,
        }
    }
}

/// A value that can be encoded by the LPN matrix.
pub trait LpnValue: Copy + Send + Sync {
    /// The additive identity.
    const ZERO: Self;

    /// Adds `rhs` to `self`.
    fn add(self, rhs: Self) -> Self;
}

impl LpnValue for bool {
    const ZERO: Self = false;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self ^ rhs
    }
}

impl LpnValue for Block {
    const ZERO: Self = Block::ZERO;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self ^ rhs
    }
}

impl LpnValue for u64 {
    const ZERO: Self = 0;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

/// Encoder for a sparse `n x k` LPN matrix.
///
/// Row `i` holds `degree` column indices derived by encrypting the blocks
/// `(i, 0), (i, 1), ..` under AES keyed with the seed. The permuted bytes are
/// read as little-endian `i32` words and each word is reduced to `|w| mod k`.
/// Rows are recomputed on every call and never stored.
pub struct SparseLpnEncoder {
    config: LpnEncoderConfig,
    seed: Block,
    k: u32,
    n: u32,
    prp: AesEncryptor,
    blocks_per_row: usize,
}

opaque_debug::implement!(SparseLpnEncoder);

impl SparseLpnEncoder {
    /// Creates a new encoder.
    ///
    /// # Panics
    ///
    /// Panics if `k` or `config.degree` is zero.
    pub fn new(config: LpnEncoderConfig, seed: Block, k: u32, n: u32) -> Self {
        assert!(k > 0, "lpn encoder requires k > 0");
        assert!(config.degree > 0, "lpn encoder requires a positive degree");

        Self {
            config,
            seed,
            k,
            n,
            prp: AesEncryptor::new(seed),
            blocks_per_row: (config.degree * INDEX_BYTES).div_ceil(Block::LEN),
        }
    }

    /// Creates an encoder for `params`.
    pub fn from_params(config: LpnEncoderConfig, seed: Block, params: &LpnParams) -> Self {
        Self::new(config, seed, params.k(), params.n())
    }

    /// Returns the seed of the matrix.
    pub fn seed(&self) -> Block {
        self.seed
    }

    /// Returns the message length.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Returns the output length.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &LpnEncoderConfig {
        &self.config
    }

    #[inline]
    fn permute_row(&self, row: usize, buf: &mut [Block]) {
        for (j, block) in buf.iter_mut().enumerate() {
            let mut bytes = [0u8; 16];
            bytes[..8].copy_from_slice(&(row as u64).to_le_bytes());
            bytes[8..].copy_from_slice(&(j as u64).to_le_bytes());
            *block = Block::new(bytes);
        }
        self.prp.encrypt_blocks(buf);
    }

    #[inline]
    fn indices<'a>(&'a self, buf: &'a [Block]) -> impl Iterator<Item = usize> + 'a {
        let bytes: &[u8] = bytemuck::cast_slice(buf);
        bytes
            .chunks_exact(INDEX_BYTES)
            .take(self.config.degree)
            .map(move |w| {
                let word = i32::from_le_bytes([w[0], w[1], w[2], w[3]]);
                (word.unsigned_abs() % self.k) as usize
            })
    }

    /// Returns the column indices of row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n`.
    pub fn row(&self, i: u32) -> Vec<u32> {
        assert!(i < self.n, "row {i} out of range for n = {}", self.n);

        let mut buf = vec![Block::ZERO; self.blocks_per_row];
        self.permute_row(i as usize, &mut buf);
        self.indices(&buf).map(|idx| idx as u32).collect()
    }

    #[inline]
    fn row_sum<T: LpnValue>(&self, row: usize, buf: &mut [Block], e: &[T]) -> T {
        self.permute_row(row, buf);
        self.indices(buf).fold(T::ZERO, |acc, idx| acc.add(e[idx]))
    }

    /// Computes `A * e`.
    pub fn encode<T: LpnValue>(&self, e: &[T]) -> Result<Vec<T>, LpnError> {
        let mut y = vec![T::ZERO; self.n as usize];
        self.encode_into(&mut y, e)?;
        Ok(y)
    }

    /// Computes `y = A * e + y` in place.
    pub fn encode_into<T: LpnValue>(&self, y: &mut [T], e: &[T]) -> Result<(), LpnError> {
        if e.len() != self.k as usize {
            return Err(LpnError::InvalidLength {
                expected: self.k as usize,
                actual: e.len(),
            });
        }

        if y.len() != self.n as usize {
            return Err(LpnError::InvalidLength {
                expected: self.n as usize,
                actual: y.len(),
            });
        }

        let blocks_per_row = self.blocks_per_row;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                if self.config.parallel {
                    y.par_iter_mut().enumerate().for_each_init(
                        || vec![Block::ZERO; blocks_per_row],
                        |buf, (i, y)| *y = y.add(self.row_sum(i, buf, e)),
                    );
                    return Ok(());
                }
            }
        }

        let mut buf = vec![Block::ZERO; blocks_per_row];
        for (i, y) in y.iter_mut().enumerate() {
            *y = y.add(self.row_sum(i, &mut buf, e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prg::Prg;
    use rand::{RngCore, SeedableRng};
    use rstest::{fixture, rstest};

    #[fixture]
    fn seed() -> Block {
        Block::from(0x5eed_u128)
    }

    fn sequential() -> LpnEncoderConfig {
        LpnEncoderConfig {
            parallel: false,
            ..Default::default()
        }
    }

    #[rstest]
    fn test_rows_are_deterministic(seed: Block) {
        let a = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 1000, 64);
        let b = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 1000, 64);

        for i in 0..64 {
            let row = a.row(i);
            assert_eq!(row.len(), DEFAULT_DEGREE);
            assert!(row.iter().all(|&idx| idx < 1000));
            assert_eq!(row, b.row(i));
        }
    }

    #[rstest]
    fn test_small_all_ones_scenario(seed: Block) {
        let ones = vec![true; 20];
        let encoder = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 20, 5);

        let first = encoder.encode(&ones).unwrap();
        let second = encoder.encode(&ones).unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        // Every row sums `degree` ones.
        assert!(first.iter().all(|&bit| bit == (DEFAULT_DEGREE % 2 == 1)));

        let other = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed ^ Block::ONE, 20, 5);
        let rows: Vec<_> = (0..5).map(|i| encoder.row(i)).collect();
        let other_rows: Vec<_> = (0..5).map(|i| other.row(i)).collect();
        assert_ne!(rows, other_rows);
    }

    #[rstest]
    fn test_encode_matches_rows(seed: Block) {
        let mut prg = Prg::from_seed(Block::ONE);
        let e: Vec<u64> = (0..300).map(|_| prg.next_u64()).collect();
        let encoder = SparseLpnEncoder::new(sequential(), seed, 300, 128);

        let y = encoder.encode(&e).unwrap();

        for (i, &y) in y.iter().enumerate() {
            let expected = encoder
                .row(i as u32)
                .into_iter()
                .fold(0u64, |acc, idx| acc.wrapping_add(e[idx as usize]));
            assert_eq!(y, expected);
        }
    }

    #[rstest]
    fn test_parallel_matches_sequential(seed: Block) {
        let mut prg = Prg::from_seed(Block::ONE);
        let e = prg.random_block_vec(500);
        let mut y = prg.random_block_vec(2000);
        let mut y_seq = y.clone();

        SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 500, 2000)
            .encode_into(&mut y, &e)
            .unwrap();
        SparseLpnEncoder::new(sequential(), seed, 500, 2000)
            .encode_into(&mut y_seq, &e)
            .unwrap();

        assert_eq!(y, y_seq);
    }

    #[rstest]
    fn test_encode_is_linear(seed: Block) {
        let mut prg = Prg::from_seed(Block::ZERO);
        let mut a = vec![false; 256];
        let mut b = vec![false; 256];
        prg.random_bools(&mut a);
        prg.random_bools(&mut b);
        let sum: Vec<bool> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();

        let encoder = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 256, 1024);
        let ya = encoder.encode(&a).unwrap();
        let yb = encoder.encode(&b).unwrap();
        let ysum = encoder.encode(&sum).unwrap();

        assert!(ya.iter().zip(&yb).zip(&ysum).all(|((x, y), z)| (x ^ y) == *z));
    }

    #[rstest]
    fn test_custom_degree(seed: Block) {
        let config = LpnEncoderConfig {
            degree: 5,
            parallel: false,
        };
        let encoder = SparseLpnEncoder::new(config, seed, 100, 10);
        assert_eq!(encoder.row(3).len(), 5);
    }

    #[rstest]
    fn test_rejects_wrong_length(seed: Block) {
        let encoder = SparseLpnEncoder::new(LpnEncoderConfig::default(), seed, 20, 5);

        assert!(matches!(
            encoder.encode(&[true; 19]),
            Err(LpnError::InvalidLength {
                expected: 20,
                actual: 19
            })
        ));

        let mut y = vec![false; 4];
        assert!(encoder.encode_into(&mut y, &[true; 20]).is_err());
    }
}
