//! Fixed-key and keyed AES-128.

use aes::Aes128;
use cipher::{BlockEncrypt, KeyInit};
use generic_array::GenericArray;
use once_cell::sync::Lazy;

use crate::Block;

/// A fixed AES key (arbitrarily chosen).
pub const FIXED_KEY: [u8; 16] = [
    69, 42, 69, 42, 69, 42, 69, 42, 69, 42, 69, 42, 69, 42, 69, 42,
];

/// Fixed-key AES cipher.
pub static FIXED_KEY_AES: Lazy<FixedKeyAes> = Lazy::new(|| FixedKeyAes {
    aes: Aes128::new(GenericArray::from_slice(&FIXED_KEY)),
});

/// Fixed-key AES cipher, used as a random permutation `π`.
pub struct FixedKeyAes {
    aes: Aes128,
}

opaque_debug::implement!(FixedKeyAes);

impl FixedKeyAes {
    /// Applies the permutation to a block.
    #[inline]
    pub fn permute(&self, block: Block) -> Block {
        encrypt(&self.aes, block)
    }

    /// Tweakable circular correlation-robust hash function instantiated
    /// using fixed-key AES.
    ///
    /// See <https://eprint.iacr.org/2019/074> (Section 7.4)
    ///
    /// `π(π(x) ⊕ i) ⊕ π(x)`, where `π` is instantiated using fixed-key AES.
    #[inline]
    pub fn tccr(&self, tweak: Block, block: Block) -> Block {
        let h1 = self.permute(block);
        let h2 = self.permute(h1 ^ tweak);
        h1 ^ h2
    }

    /// Tweakable circular correlation-robust hash function applied to many
    /// blocks in place.
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    #[inline]
    pub fn tccr_many(&self, tweaks: &[Block], blocks: &mut [Block]) {
        assert_eq!(tweaks.len(), blocks.len());
        for (block, &tweak) in blocks.iter_mut().zip(tweaks) {
            *block = self.tccr(tweak, *block);
        }
    }
}

/// A keyed AES-128 encryptor.
#[derive(Clone)]
pub struct AesEncryptor(Aes128);

opaque_debug::implement!(AesEncryptor);

impl AesEncryptor {
    /// Number of blocks encrypted per batch.
    pub const AES_BLOCK_COUNT: usize = 8;

    /// Creates a new encryptor keyed with `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key: [u8; 16] = key.into();
        Self(Aes128::new(GenericArray::from_slice(&key)))
    }

    /// Encrypts a single block.
    #[inline]
    pub fn encrypt_block(&self, block: Block) -> Block {
        encrypt(&self.0, block)
    }

    /// Encrypts a batch of blocks in place.
    #[inline]
    pub fn encrypt_many_blocks<const N: usize>(&self, blocks: &mut [Block; N]) {
        self.encrypt_blocks(blocks)
    }

    /// Encrypts a slice of blocks in place.
    #[inline]
    pub fn encrypt_blocks(&self, blocks: &mut [Block]) {
        for block in blocks.iter_mut() {
            *block = encrypt(&self.0, *block);
        }
    }
}

#[inline]
fn encrypt(aes: &Aes128, block: Block) -> Block {
    let mut buf = GenericArray::clone_from_slice(block.as_bytes());
    aes.encrypt_block(&mut buf);

    let mut out = [0u8; 16];
    out.copy_from_slice(&buf);
    Block::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_encryptor_is_deterministic() {
        let aes = AesEncryptor::new(Block::from(7u128));
        let mut blocks = [Block::ZERO, Block::ONE];
        aes.encrypt_many_blocks(&mut blocks);

        assert_eq!(blocks[0], aes.encrypt_block(Block::ZERO));
        assert_eq!(blocks[1], aes.encrypt_block(Block::ONE));
        assert_ne!(blocks[0], blocks[1]);
    }

    #[test]
    fn test_tccr_depends_on_tweak() {
        let x = Block::from(42u128);

        assert_ne!(
            FIXED_KEY_AES.tccr(Block::ZERO, x),
            FIXED_KEY_AES.tccr(Block::ONE, x)
        );
    }
}
