//! Fast, seedable noise source for the render thread.
//!
//! `XorShift32` is a plain 32-bit xorshift (13/17/5). It is not
//! cryptographic and does not need to be: it only has to be cheap, branch
//! light and allocation free. It implements `rand`'s `RngCore` and
//! `SeedableRng`, so generators are written against `rand::Rng` and tests can
//! swap in any other seeded generator.

use rand::{RngCore, SeedableRng};

/// Substitute for the all-zero state, which xorshift can never leave.
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    #[inline]
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
        Self { state }
    }

    /// Seed from the thread RNG. Control context only.
    pub fn from_entropy_seed() -> Self {
        Self::new(rand::random())
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(ZERO_SEED_REPLACEMENT)
    }
}

impl RngCore for XorShift32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.step());
        let hi = u64::from(self.step());
        (hi << 32) | lo
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
