//! Hash functions.
//!
//! Correlation conversions only rely on the [`CrHash`] trait, so any
//! implementation can be plugged in. All implementations here are pure Rust.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{aes::FixedKeyAes, Block};

/// A 32-byte digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Computes the blake3 digest of `data`.
pub fn blake3(data: &[u8]) -> Hash {
    Hash(*::blake3::hash(data).as_bytes())
}

/// A tweakable correlation-robust hash function on blocks.
pub trait CrHash: Send + Sync {
    /// Hashes `block` under `tweak`.
    fn hash(&self, tweak: Block, block: Block) -> Block;

    /// Hashes every block under the tweak at the same position.
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    fn hash_many(&self, tweaks: &[Block], blocks: &mut [Block]) {
        assert_eq!(tweaks.len(), blocks.len());
        for (block, &tweak) in blocks.iter_mut().zip(tweaks) {
            *block = self.hash(tweak, *block);
        }
    }
}

impl CrHash for FixedKeyAes {
    #[inline]
    fn hash(&self, tweak: Block, block: Block) -> Block {
        self.tccr(tweak, block)
    }
}

impl<H: CrHash + ?Sized> CrHash for &H {
    #[inline]
    fn hash(&self, tweak: Block, block: Block) -> Block {
        (**self).hash(tweak, block)
    }
}

/// Correlation-robust hash from blake3 in keyed-derivation mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3CrHash;

impl CrHash for Blake3CrHash {
    fn hash(&self, tweak: Block, block: Block) -> Block {
        let mut hasher = ::blake3::Hasher::new_derive_key("pcgz 2024 correlation-robust hash");
        hasher.update(tweak.as_bytes());
        hasher.update(block.as_bytes());

        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
        Block::new(out)
    }
}

/// Correlation-robust hash from SHA-256, truncated to a block.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256CrHash;

impl CrHash for Sha256CrHash {
    fn hash(&self, tweak: Block, block: Block) -> Block {
        let digest = Sha256::new()
            .chain_update(tweak.as_bytes())
            .chain_update(block.as_bytes())
            .finalize();

        let mut out = [0u8; 16];
        out.copy_from_slice(&digest[..16]);
        Block::new(out)
    }
}
