use serde::{Deserialize, Serialize};

use super::{check_len, check_tag, split_vec, BatchError, CorrelationBatch};

/// Tag of batches over GF(2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gf2;

/// The ring of integers modulo `2^bits`, with `1 <= bits <= 64`.
///
/// Elements are represented as `u64` values below the modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Z2k {
    bits: u32,
}

impl Z2k {
    /// Creates the ring `Z_{2^bits}`.
    pub fn new(bits: u32) -> Result<Self, BatchError> {
        if !(1..=64).contains(&bits) {
            return Err(BatchError::InvalidModulus(bits));
        }
        Ok(Self { bits })
    }

    /// Returns the bit length of the modulus.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Reduces `x` modulo `2^bits`.
    #[inline]
    pub fn reduce(&self, x: u64) -> u64 {
        if self.bits == 64 {
            x
        } else {
            x & ((1u64 << self.bits) - 1)
        }
    }

    /// Returns `a + b`.
    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        self.reduce(a.wrapping_add(b))
    }

    /// Returns `a - b`.
    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        self.reduce(a.wrapping_sub(b))
    }

    /// Returns `a * b`.
    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.reduce(a.wrapping_mul(b))
    }

    /// Returns `-a`.
    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        self.reduce(a.wrapping_neg())
    }
}

/// One party's shares of a batch of Beaver triples over GF(2).
///
/// Combined with the peer's shares, `c[i] = a[i] & b[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitTripleBatch {
    a: Vec<bool>,
    b: Vec<bool>,
    c: Vec<bool>,
}

impl BitTripleBatch {
    /// Creates a new batch.
    ///
    /// # Panics
    ///
    /// Panics if the share vectors have different lengths.
    pub fn new(a: Vec<bool>, b: Vec<bool>, c: Vec<bool>) -> Self {
        let batch = Self { a, b, c };
        batch.assert_valid();
        batch
    }

    #[inline]
    fn assert_valid(&self) {
        assert!(
            self.a.len() == self.b.len() && self.b.len() == self.c.len(),
            "bit triple batch arrays out of sync"
        );
    }

    /// Returns the shares of `a`.
    pub fn a(&self) -> &[bool] {
        &self.a
    }

    /// Returns the shares of `b`.
    pub fn b(&self) -> &[bool] {
        &self.b
    }

    /// Returns the shares of `c`.
    pub fn c(&self) -> &[bool] {
        &self.c
    }
}

impl CorrelationBatch for BitTripleBatch {
    type Tag = Gf2;

    fn create_empty(_: Gf2) -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    fn tag(&self) -> Gf2 {
        Gf2
    }

    fn num(&self) -> usize {
        self.assert_valid();
        self.a.len()
    }

    fn split(self, m: usize) -> Result<(Self, Self), BatchError> {
        check_len(m, self.num())?;

        let (a, a_rest) = split_vec(self.a, m);
        let (b, b_rest) = split_vec(self.b, m);
        let (c, c_rest) = split_vec(self.c, m);
        Ok((Self::new(a, b, c), Self::new(a_rest, b_rest, c_rest)))
    }

    fn reduce(&mut self, m: usize) -> Result<(), BatchError> {
        check_len(m, self.num())?;
        self.a.truncate(m);
        self.b.truncate(m);
        self.c.truncate(m);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<(), BatchError> {
        other.assert_valid();
        self.a.extend(other.a);
        self.b.extend(other.b);
        self.c.extend(other.c);
        self.assert_valid();
        Ok(())
    }
}

/// One party's shares of a batch of Beaver triples over `Z_{2^bits}`.
///
/// Combined with the peer's shares, `c[i] = a[i] * b[i] mod 2^bits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Z2kTripleBatch {
    ring: Z2k,
    a: Vec<u64>,
    b: Vec<u64>,
    c: Vec<u64>,
}

impl Z2kTripleBatch {
    /// Creates a new batch.
    ///
    /// # Panics
    ///
    /// Panics if the share vectors have different lengths or hold values
    /// outside of the ring.
    pub fn new(ring: Z2k, a: Vec<u64>, b: Vec<u64>, c: Vec<u64>) -> Self {
        let batch = Self { ring, a, b, c };
        batch.assert_valid();
        assert!(
            batch
                .a
                .iter()
                .chain(&batch.b)
                .chain(&batch.c)
                .all(|&x| ring.reduce(x) == x),
            "z2k triple share out of range"
        );
        batch
    }

    #[inline]
    fn assert_valid(&self) {
        assert!(
            self.a.len() == self.b.len() && self.b.len() == self.c.len(),
            "z2k triple batch arrays out of sync"
        );
    }

    /// Returns the ring of the shares.
    pub fn ring(&self) -> Z2k {
        self.ring
    }

    /// Returns the shares of `a`.
    pub fn a(&self) -> &[u64] {
        &self.a
    }

    /// Returns the shares of `b`.
    pub fn b(&self) -> &[u64] {
        &self.b
    }

    /// Returns the shares of `c`.
    pub fn c(&self) -> &[u64] {
        &self.c
    }
}

impl CorrelationBatch for Z2kTripleBatch {
    type Tag = Z2k;

    fn create_empty(ring: Z2k) -> Self {
        Self::new(ring, Vec::new(), Vec::new(), Vec::new())
    }

    fn tag(&self) -> Z2k {
        self.ring
    }

    fn num(&self) -> usize {
        self.assert_valid();
        self.a.len()
    }

    fn split(self, m: usize) -> Result<(Self, Self), BatchError> {
        check_len(m, self.num())?;

        let (a, a_rest) = split_vec(self.a, m);
        let (b, b_rest) = split_vec(self.b, m);
        let (c, c_rest) = split_vec(self.c, m);
        Ok((
            Self {
                ring: self.ring,
                a,
                b,
                c,
            },
            Self {
                ring: self.ring,
                a: a_rest,
                b: b_rest,
                c: c_rest,
            },
        ))
    }

    fn reduce(&mut self, m: usize) -> Result<(), BatchError> {
        check_len(m, self.num())?;
        self.a.truncate(m);
        self.b.truncate(m);
        self.c.truncate(m);
        Ok(())
    }

    fn merge(&mut self, other: Self) -> Result<(), BatchError> {
        check_tag(self.ring, other.ring)?;
        other.assert_valid();
        self.a.extend(other.a);
        self.b.extend(other.b);
        self.c.extend(other.c);
        self.assert_valid();
        Ok(())
    }
}
