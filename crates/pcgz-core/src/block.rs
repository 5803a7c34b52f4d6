//! A 128-bit block.

use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign};

use bytemuck::{Pod, Zeroable};
use rand::{distributions::Standard, prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};

/// A block of 128 bits.
///
/// Bit `i` of a block is bit `i` of its little-endian `u128` value.
#[repr(transparent)]
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Block([u8; 16]);

impl Block {
    /// The length of a block in bytes.
    pub const LEN: usize = 16;
    /// A zero block.
    pub const ZERO: Self = Self([0; 16]);
    /// A block with every bit set.
    pub const ONES: Self = Self([0xff; 16]);
    /// A block with only the least significant bit set.
    pub const ONE: Self = Self([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    /// Creates a new block.
    #[inline]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the byte representation of the block.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a reference to the bytes of the block.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the least significant bit of the block.
    #[inline]
    pub fn lsb(&self) -> bool {
        self.0[0] & 1 == 1
    }

    /// Returns the bit at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 128`.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        assert!(i < 128, "bit index out of range: {i}");
        (self.0[i / 8] >> (i % 8)) & 1 == 1
    }

    /// Returns an iterator over the bits of the block, least significant first.
    pub fn iter_lsb0(&self) -> impl Iterator<Item = bool> + '_ {
        (0..128).map(|i| self.bit(i))
    }

    /// Returns the block with only bit `i` set, i.e. `X^i` in GF(2^128).
    #[inline]
    pub fn monomial(i: usize) -> Self {
        Self::from(1u128 << i)
    }

    /// Returns the low 64 bits of the block.
    #[inline]
    pub fn low_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Multiplies two blocks in GF(2^128) modulo `X^128 + X^7 + X^2 + X + 1`.
    #[inline]
    pub fn gfmul(self, other: Self) -> Self {
        let (lo, hi) = clmul(self.into(), other.into());
        Self::from(reduce(lo, hi))
    }

    /// Computes the inner product of two slices of blocks in GF(2^128).
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    pub fn inn_prdt_red(a: &[Block], b: &[Block]) -> Block {
        assert_eq!(a.len(), b.len(), "inner product of unequal lengths");

        let (lo, hi) = a
            .iter()
            .zip(b)
            .fold((0u128, 0u128), |(lo, hi), (&x, &y)| {
                let (l, h) = clmul(x.into(), y.into());
                (lo ^ l, hi ^ h)
            });

        Self::from(reduce(lo, hi))
    }
}

/// Carry-less multiplication of two 128-bit values, returning `(low, high)`.
#[inline]
fn clmul(a: u128, b: u128) -> (u128, u128) {
    let mut lo = 0u128;
    let mut hi = 0u128;
    for i in 0..128 {
        if (b >> i) & 1 == 1 {
            lo ^= a << i;
            if i > 0 {
                hi ^= a >> (128 - i);
            }
        }
    }
    (lo, hi)
}

/// Reduces a 256-bit product modulo `X^128 + X^7 + X^2 + X + 1`.
#[inline]
fn reduce(lo: u128, hi: u128) -> u128 {
    let folded = hi ^ (hi << 1) ^ (hi << 2) ^ (hi << 7);
    let overflow = (hi >> 127) ^ (hi >> 126) ^ (hi >> 121);
    lo ^ folded ^ overflow ^ (overflow << 1) ^ (overflow << 2) ^ (overflow << 7)
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block(")?;
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(block: Block) -> Self {
        block.0
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(value: u128) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(block: Block) -> Self {
        u128::from_le_bytes(block.0)
    }
}

impl<'a> TryFrom<&'a [u8]> for Block {
    type Error = std::array::TryFromSliceError;

    #[inline]
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(value).map(Self)
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block(rng.gen())
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self::from(u128::from(self) ^ u128::from(rhs))
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from(u128::from(self) & u128::from(rhs))
    }
}

impl BitAndAssign for Block {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_block_as_mut() {
        let mut block = Block::ZERO;
        block.as_mut()[0] = 1;
        block.as_mut()[15] = 0x80;

        assert_eq!(block, Block::from(1u128 | (1 << 127)));
        assert_eq!(block.as_ref(), &block.to_bytes());
    }

    #[test]
    fn test_block_bits() {
        let block = Block::from(0b1011u128 | (1 << 127));
        let bits: Vec<bool> = block.iter_lsb0().collect();

        assert_eq!(bits.len(), 128);
        assert!(bits[0] && bits[1] && !bits[2] && bits[3]);
        assert!(bits[127]);
        assert!(block.lsb());
        assert_eq!(Block::monomial(3), Block::from(8u128));
    }

    #[test]
    fn test_gfmul_identity_and_commutativity() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let a: Block = rng.gen();
        let b: Block = rng.gen();

        assert_eq!(a.gfmul(Block::ONE), a);
        assert_eq!(a.gfmul(Block::ZERO), Block::ZERO);
        assert_eq!(a.gfmul(b), b.gfmul(a));
    }

    #[test]
    fn test_gfmul_reduction() {
        // X^127 * X = X^128 = X^7 + X^2 + X + 1
        let x127 = Block::monomial(127);
        let x = Block::monomial(1);

        assert_eq!(x127.gfmul(x), Block::from(0b1000_0111u128));
    }

    #[test]
    fn test_inn_prdt_red_is_sum_of_products() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let a: Vec<Block> = (0..16).map(|_| rng.gen()).collect();
        let b: Vec<Block> = (0..16).map(|_| rng.gen()).collect();

        let expected = a
            .iter()
            .zip(&b)
            .fold(Block::ZERO, |acc, (&x, &y)| acc ^ x.gfmul(y));

        assert_eq!(Block::inn_prdt_red(&a, &b), expected);
    }
}
