//! AES-CTR pseudorandom generator.

use rand::Rng;
use rand_core::{
    block::{BlockRng, BlockRngCore},
    CryptoRng, RngCore, SeedableRng,
};

use crate::{aes::AesEncryptor, Block};

#[derive(Clone)]
struct PrgCore {
    aes: AesEncryptor,
    stream_id: u64,
    counter: u64,
}

impl BlockRngCore for PrgCore {
    type Item = u32;
    type Results = [u32; 4 * AesEncryptor::AES_BLOCK_COUNT];

    #[inline]
    fn generate(&mut self, results: &mut Self::Results) {
        let mut states = [Block::ZERO; AesEncryptor::AES_BLOCK_COUNT];
        for state in states.iter_mut() {
            *state = counter_block(self.counter, self.stream_id);
            self.counter += 1;
        }
        self.aes.encrypt_many_blocks(&mut states);
        *results = bytemuck::cast(states);
    }
}

#[inline]
fn counter_block(counter: u64, stream_id: u64) -> Block {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&counter.to_le_bytes());
    bytes[8..].copy_from_slice(&stream_id.to_le_bytes());
    Block::new(bytes)
}

impl SeedableRng for PrgCore {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            aes: AesEncryptor::new(seed),
            stream_id: 0,
            counter: 0,
        }
    }
}

impl CryptoRng for PrgCore {}

/// AES-based PRG.
///
/// AES-128 keyed with the seed, run in counter mode. A seed can drive several
/// independent streams, see [`Prg::from_seed_with_stream`].
#[derive(Clone)]
pub struct Prg(BlockRng<PrgCore>);

opaque_debug::implement!(Prg);

impl RngCore for Prg {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for Prg {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        Prg(BlockRng::<PrgCore>::from_seed(seed))
    }
}

impl CryptoRng for Prg {}

impl Prg {
    /// Creates a PRG with a random seed.
    pub fn new() -> Self {
        Prg::from_seed(rand::random::<Block>())
    }

    /// Creates a PRG for stream `stream_id` of `seed`.
    ///
    /// Streams of the same seed never overlap.
    pub fn from_seed_with_stream(seed: Block, stream_id: u64) -> Self {
        let mut core = PrgCore::from_seed(seed);
        core.stream_id = stream_id;
        Prg(BlockRng::new(core))
    }

    /// Returns the stream id.
    pub fn stream_id(&self) -> u64 {
        self.0.core.stream_id
    }

    /// Returns the number of counter blocks consumed so far.
    pub fn counter(&self) -> u64 {
        self.0.core.counter
    }

    /// Generates a random bool.
    #[inline]
    pub fn random_bool(&mut self) -> bool {
        self.gen()
    }

    /// Fills a slice with random bools.
    #[inline]
    pub fn random_bools(&mut self, buf: &mut [bool]) {
        self.fill(buf);
    }

    /// Generates a random block.
    #[inline]
    pub fn random_block(&mut self) -> Block {
        self.gen()
    }

    /// Fills a slice with random blocks.
    #[inline]
    pub fn random_blocks(&mut self, buf: &mut [Block]) {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(buf);
        self.fill_bytes(bytes);
    }

    /// Generates a vector of `n` random blocks.
    pub fn random_block_vec(&mut self, n: usize) -> Vec<Block> {
        let mut blocks = vec![Block::ZERO; n];
        self.random_blocks(&mut blocks);
        blocks
    }
}

impl Default for Prg {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prg_ne() {
        let mut prg = Prg::new();
        let x = prg.random_block_vec(2);
        assert_ne!(x[0], x[1]);
    }

    #[test]
    fn test_prg_is_deterministic() {
        let seed = Block::from(5u128);
        let mut a = Prg::from_seed(seed);
        let mut b = Prg::from_seed(seed);

        assert_eq!(a.random_block_vec(17), b.random_block_vec(17));
        assert_eq!(a.counter(), b.counter());
    }

    #[test]
    fn test_prg_streams_are_distinct() {
        let mut a = Prg::from_seed_with_stream(Block::ZERO, 0);
        let mut b = Prg::from_seed_with_stream(Block::ZERO, 1);

        assert_eq!(b.stream_id(), 1);
        assert_ne!(a.random_block(), b.random_block());
    }

    #[test]
    fn test_prg_seed_from_u64() {
        let mut a = Prg::seed_from_u64(42);
        let mut b = Prg::seed_from_u64(42);
        let mut c = Prg::seed_from_u64(43);

        let x = a.random_block();
        assert_eq!(x, b.random_block());
        assert_ne!(x, c.random_block());
    }
}
