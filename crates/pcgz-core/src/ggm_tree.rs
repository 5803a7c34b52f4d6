//! GGM trees built from a two-key PRG.

use crate::{aes::AesEncryptor, Block};

const LEFT_KEY: Block = Block::new([
    0x6c, 0x65, 0x66, 0x74, 0x2d, 0x63, 0x68, 0x69, 0x6c, 0x64, 0x2d, 0x6b, 0x65, 0x79, 0x00, 0x00,
]);
const RIGHT_KEY: Block = Block::new([
    0x72, 0x69, 0x67, 0x68, 0x74, 0x2d, 0x63, 0x68, 0x69, 0x6c, 0x64, 0x2d, 0x6b, 0x65, 0x79, 0x00,
]);

/// A GGM tree of a fixed depth.
///
/// Node `j` of a level has children `2j` and `2j + 1` on the next level, so
/// the path to leaf `i` is given by the bits of `i`, most significant first.
pub struct GgmTree {
    depth: usize,
    left: AesEncryptor,
    right: AesEncryptor,
}

opaque_debug::implement!(GgmTree);

impl GgmTree {
    /// Creates a GGM tree with `depth` levels below the root.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        assert!(depth >= 1, "GGM tree depth must be at least 1");
        Self {
            depth,
            left: AesEncryptor::new(LEFT_KEY),
            right: AesEncryptor::new(RIGHT_KEY),
        }
    }

    /// Returns the depth of the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn children(&self, node: Block) -> (Block, Block) {
        (
            self.left.encrypt_block(node) ^ node,
            self.right.encrypt_block(node) ^ node,
        )
    }

    /// Expands `seed` into the `2^depth` leaves of the tree.
    ///
    /// `k0[i]` and `k1[i]` receive the XOR of all left, respectively right,
    /// children at level `i + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `tree.len() != 2^depth` or if `k0`, `k1` do not have length `depth`.
    pub fn gen(&self, seed: Block, tree: &mut [Block], k0: &mut [Block], k1: &mut [Block]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k0.len(), self.depth);
        assert_eq!(k1.len(), self.depth);

        tree[0] = seed;
        for level in 0..self.depth {
            // Walk backwards so a parent is read before its slot is overwritten.
            for j in (0..1usize << level).rev() {
                let (l, r) = self.children(tree[j]);
                tree[2 * j] = l;
                tree[2 * j + 1] = r;
            }

            let width = 1usize << (level + 1);
            k0[level] = tree[..width].iter().step_by(2).fold(Block::ZERO, |a, &x| a ^ x);
            k1[level] = tree[1..width].iter().step_by(2).fold(Block::ZERO, |a, &x| a ^ x);
        }
    }

    /// Reconstructs every leaf except the one on the path `!alpha_bar`.
    ///
    /// `k[i]` is the XOR of the children at level `i + 1` on side `alpha_bar[i]`.
    /// The unknown leaf is left as [`Block::ZERO`].
    ///
    /// # Panics
    ///
    /// Panics if the slice lengths do not match the depth.
    pub fn reconstruct(&self, tree: &mut [Block], k: &[Block], alpha_bar: &[bool]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k.len(), self.depth);
        assert_eq!(alpha_bar.len(), self.depth);

        // Position of the unknown node on the current level.
        let mut pos = usize::from(!alpha_bar[0]);
        tree[pos] = Block::ZERO;
        tree[pos ^ 1] = k[0];

        for level in 1..self.depth {
            for j in (0..1usize << level).rev() {
                if j == pos {
                    tree[2 * j] = Block::ZERO;
                    tree[2 * j + 1] = Block::ZERO;
                } else {
                    let (l, r) = self.children(tree[j]);
                    tree[2 * j] = l;
                    tree[2 * j + 1] = r;
                }
            }

            let side = usize::from(alpha_bar[level]);
            let width = 1usize << (level + 1);
            let known = tree[side..width]
                .iter()
                .step_by(2)
                .fold(Block::ZERO, |a, &x| a ^ x);

            tree[2 * pos + side] = k[level] ^ known;
            pos = 2 * pos + (side ^ 1);
        }
    }
}
