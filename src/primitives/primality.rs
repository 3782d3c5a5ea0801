//! Primality testing.
//!
//! [`is_prime`] is exact trial division for the small values used to build the
//! sieve table. [`miller_rabin`] is the probabilistic test applied to
//! multi-hundred-bit candidates, with a false-positive probability of at most
//! `4^-rounds`.

use core::fmt;
use core::ops::Deref;

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand_core::CryptoRngCore;

use super::field::pow_mod;
use crate::{Error, Result};

/// Default number of Miller-Rabin rounds.
pub const DEFAULT_ROUNDS: usize = 10;

/// Returns true if `n` is prime, by trial division up to `floor(sqrt(n))`.
///
/// `O(sqrt(n))`; intended for bootstrap values only.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    let mut x = 2u64;
    while x <= n / x {
        if n % x == 0 {
            return false;
        }
        x += 1;
    }
    true
}

/// Miller-Rabin probabilistic primality test.
///
/// Writes `p - 1 = 2^s * d` with `d` odd, then runs `rounds` independent
/// trials with witnesses drawn uniformly from `[2, p - 1]`. Returns `false` as
/// soon as a witness proves `p` composite.
pub fn miller_rabin<R: CryptoRngCore + ?Sized>(p: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *p < two {
        return false;
    }
    if *p == two || *p == BigUint::from(3u32) {
        return true;
    }
    if !p.bit(0) {
        return false;
    }

    let p_minus_one = p - 1u32;
    let s = p_minus_one.trailing_zeros().unwrap_or(0);
    let d = &p_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, p);
        let mut x = pow_mod(&a, &d, p);

        if x.is_one() || x == p_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % p;
            if x == p_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// An integer that has passed primality testing.
///
/// Operations whose correctness depends on a prime modulus (negative
/// exponents, modular inversion) take a `Prime`, so handing them a composite
/// requires going through [`Prime::new`] first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prime(BigUint);

impl Prime {
    /// Checks `n` with `rounds` Miller-Rabin trials and wraps it on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPrime`] if `n` is found to be composite.
    pub fn new<R: CryptoRngCore + ?Sized>(n: BigUint, rounds: usize, rng: &mut R) -> Result<Self> {
        if miller_rabin(&n, rounds, rng) {
            Ok(Self(n))
        } else {
            Err(Error::NotPrime(n.to_string()))
        }
    }

    /// Wraps a value the caller has already confirmed to be prime.
    pub(crate) fn new_unchecked(n: BigUint) -> Self {
        Self(n)
    }

    /// Returns the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consumes the wrapper and returns the integer.
    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl Deref for Prime {
    type Target = BigUint;

    fn deref(&self) -> &BigUint {
        &self.0
    }
}

impl AsRef<BigUint> for Prime {
    fn as_ref(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Display for Prime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn first_primes(count: usize) -> Vec<u64> {
        (2u64..).filter(|&n| is_prime(n)).take(count).collect()
    }

    #[test]
    fn trial_division_small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(65_521));
        assert!(!is_prime(65_523));
        assert!(!is_prime(7919 * 7927));
    }

    #[test]
    fn trial_division_prime_count_below_10000() {
        assert_eq!((0..10_000u64).filter(|&n| is_prime(n)).count(), 1229);
    }

    #[test]
    fn miller_rabin_accepts_first_thousand_primes() {
        let mut rng = StdRng::seed_from_u64(1);
        let primes = first_primes(1000);
        assert_eq!(primes[999], 7919);
        for p in primes {
            assert!(miller_rabin(&BigUint::from(p), DEFAULT_ROUNDS, &mut rng), "{p}");
        }
    }

    #[test]
    fn miller_rabin_rejects_composites() {
        let mut rng = StdRng::seed_from_u64(2);
        for n in 0u64..8000 {
            if !is_prime(n) {
                assert!(!miller_rabin(&BigUint::from(n), DEFAULT_ROUNDS, &mut rng), "{n}");
            }
        }
    }

    #[test]
    fn miller_rabin_rejects_carmichael_numbers() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41041, 825_265] {
            assert!(!miller_rabin(&BigUint::from(n), DEFAULT_ROUNDS, &mut rng), "{n}");
        }
    }

    #[test]
    fn miller_rabin_large_values() {
        let mut rng = StdRng::seed_from_u64(4);
        let mersenne_127 = (BigUint::one() << 127u32) - 1u32;
        assert!(miller_rabin(&mersenne_127, DEFAULT_ROUNDS, &mut rng));

        let composite = &mersenne_127 * BigUint::from(1_000_003u32);
        assert!(!miller_rabin(&composite, DEFAULT_ROUNDS, &mut rng));

        let mersenne_128 = (BigUint::one() << 128u32) - 1u32;
        assert!(!miller_rabin(&mersenne_128, DEFAULT_ROUNDS, &mut rng));
    }

    #[test]
    fn prime_wrapper_validates() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = Prime::new(BigUint::from(23u32), DEFAULT_ROUNDS, &mut rng).unwrap();
        assert_eq!(*p, BigUint::from(23u32));

        let err = Prime::new(BigUint::from(21u32), DEFAULT_ROUNDS, &mut rng).unwrap_err();
        assert!(matches!(err, Error::NotPrime(_)));
    }
}
