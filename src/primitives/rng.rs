//! Cryptographically secure random number generator and range sampling.

use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, CryptoRngCore, OsRng, RngCore};

use crate::{Error, Result};

/// Cryptographically secure random number generator.
///
/// Thin wrapper around `OsRng`. Every secret in the crate (private keys,
/// encryption randomness, blinding factors, signing nonces) is drawn through a
/// `CryptoRngCore`, so a seeded generator can be injected in tests instead.
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

/// Draws an integer uniformly from the inclusive range `[lo, hi]`.
pub fn uniform_inclusive<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    lo: &BigUint,
    hi: &BigUint,
) -> Result<BigUint> {
    if lo > hi {
        return Err(Error::InvalidScalar(format!("empty range [{lo}, {hi}]")));
    }
    let hi_exclusive = hi + 1u32;
    Ok(rng.gen_biguint_range(lo, &hi_exclusive))
}
