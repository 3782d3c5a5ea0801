//! Safe-prime group parameters.
//!
//! All schemes in the crate work in the order-`q` subgroup of quadratic
//! residues modulo a safe prime `p = 2q + 1`.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::encoding::{Decoder, Encoder};
use crate::primitives::field::{mod_exp_signed, pow_mod};
use crate::primitives::primality::{Prime, DEFAULT_ROUNDS};
use crate::primitives::rng::{uniform_inclusive, SecureRng};
use crate::primitives::sieve::{PrimeSearch, SafePrime};
use crate::{Error, Result};

/// Generator tried first for freshly generated groups.
///
/// `4 = 2^2` is a quadratic residue modulo every prime above 3.
pub const DEFAULT_GENERATOR: u32 = 4;

const MAX_GENERATOR_ATTEMPTS: usize = 64;

/// Smallest safe prime whose subgroup order is odd.
const MIN_MODULUS: u32 = 7;

/// Public parameters `(p, q, g)` of a safe-prime group.
///
/// Invariants: `p = 2q + 1`, both `p` and `q` passed primality testing,
/// `1 < g < p` and `g^q mod p = 1`, so `g` generates the subgroup of order `q`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupParameters", into = "RawGroupParameters")]
pub struct GroupParameters {
    p: Prime,
    q: Prime,
    g: BigUint,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawGroupParameters {
    p: BigUint,
    g: BigUint,
}

impl TryFrom<RawGroupParameters> for GroupParameters {
    type Error = Error;

    fn try_from(raw: RawGroupParameters) -> Result<Self> {
        Self::new(raw.p, raw.g, DEFAULT_ROUNDS, &mut SecureRng::new())
    }
}

impl From<GroupParameters> for RawGroupParameters {
    fn from(params: GroupParameters) -> Self {
        Self {
            p: params.p.into_inner(),
            g: params.g,
        }
    }
}

impl GroupParameters {
    /// Validates a safe prime `p` and generator `g`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] if `p` is even or below 7 (so that `q` is odd)
    /// - [`Error::NotPrime`] if `p` or `(p - 1) / 2` fails Miller-Rabin
    /// - [`Error::InvalidGroupElement`] if `g` does not generate the order-`q` subgroup
    pub fn new<R: CryptoRngCore + ?Sized>(
        p: BigUint,
        g: BigUint,
        rounds: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_modulus(&p)?;

        let q = Prime::new(&p >> 1u32, rounds, rng)?;
        let p = Prime::new(p, rounds, rng)?;
        let params = Self {
            p,
            q,
            g: BigUint::zero(),
        };
        params.check_generator(&g)?;

        Ok(Self { g, ..params })
    }

    /// Generates a group whose subgroup order `q` lies at or above `n`.
    ///
    /// Searches for a safe prime near `2n`, then uses [`DEFAULT_GENERATOR`].
    pub fn generate<R: CryptoRngCore + ?Sized>(
        n: &BigUint,
        search: &PrimeSearch,
        rng: &mut R,
    ) -> Result<Self> {
        let safe = search.safe_prime_near(&(n << 1u32), rng)?;
        Self::from_safe_prime(safe, rng)
    }

    /// Builds a group from a safe prime found by [`PrimeSearch`].
    ///
    /// Tries `g = 4` first and checks it. Falls back to the square of a random
    /// element if that check fails.
    pub fn from_safe_prime<R: CryptoRngCore + ?Sized>(safe: SafePrime, rng: &mut R) -> Result<Self> {
        let (p, q) = safe.into_parts();
        check_modulus(&p)?;
        let mut params = Self {
            p,
            q,
            g: BigUint::zero(),
        };

        let default_g = BigUint::from(DEFAULT_GENERATOR);
        if params.check_generator(&default_g).is_ok() {
            params.g = default_g;
            debug!(bits = params.p.bits(), "group parameters ready");
            return Ok(params);
        }

        warn!(p = %params.p, "default generator rejected, squaring a random element");
        let two = BigUint::from(2u32);
        let upper = params.p.as_biguint() - 2u32;
        for _ in 0..MAX_GENERATOR_ATTEMPTS {
            let r = uniform_inclusive(rng, &two, &upper)?;
            let candidate = pow_mod(&r, &two, &params.p);
            if params.check_generator(&candidate).is_ok() {
                params.g = candidate;
                return Ok(params);
            }
        }

        Err(Error::InvalidParams(format!(
            "no generator found for p = {}",
            params.p
        )))
    }

    /// The safe prime modulus `p`.
    pub fn p(&self) -> &Prime {
        &self.p
    }

    /// The subgroup order `q = (p - 1) / 2`.
    pub fn q(&self) -> &Prime {
        &self.q
    }

    /// The subgroup generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Computes `base^exp mod p`.
    pub fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        pow_mod(base, exp, &self.p)
    }

    /// Computes `base^exp mod p` for a possibly negative exponent.
    pub fn pow_signed(&self, base: &BigUint, exp: &BigInt) -> Result<BigUint> {
        mod_exp_signed(base, exp, &self.p)
    }

    /// Computes `a * b mod p`.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % self.p.as_biguint()
    }

    /// Computes `g^exp mod p`.
    pub fn g_pow(&self, exp: &BigUint) -> BigUint {
        self.pow(&self.g, exp)
    }

    /// Draws an exponent uniformly from `[1, q - 1]`.
    pub fn random_exponent<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        uniform_inclusive(rng, &BigUint::one(), &(self.q.as_biguint() - 1u32))
    }

    /// Checks that `e` lies in `[1, q - 1]`.
    pub fn validate_exponent(&self, e: &BigUint) -> Result<()> {
        if e.is_zero() || e >= self.q.as_biguint() {
            return Err(Error::InvalidScalar(format!(
                "exponent must lie in [1, {}]",
                self.q.as_biguint() - 1u32
            )));
        }
        Ok(())
    }

    /// Returns true if `e` is an element of the order-`q` subgroup.
    pub fn contains(&self, e: &BigUint) -> bool {
        self.validate_element(e).is_ok()
    }

    /// Validates that `e` is in `[1, p - 1]` and in the quadratic-residue subgroup.
    pub fn validate_element(&self, e: &BigUint) -> Result<()> {
        if e.is_zero() || e >= self.p.as_biguint() {
            return Err(Error::InvalidGroupElement(
                "element must lie in [1, p - 1]".to_string(),
            ));
        }
        if !self.pow(e, &self.q).is_one() {
            return Err(Error::InvalidGroupElement(
                "element is not in the quadratic-residue subgroup".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializes `(p, g)`. `q` is implied by `p`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.put(&self.p);
        encoder.put(&self.g);
        encoder.finish()
    }

    /// Deserializes and re-validates group parameters.
    pub fn from_bytes<R: CryptoRngCore + ?Sized>(bytes: &[u8], rng: &mut R) -> Result<Self> {
        let mut decoder = Decoder::new(bytes)?;
        let p = decoder.take()?;
        let g = decoder.take()?;
        decoder.finish()?;
        Self::new(p, g, DEFAULT_ROUNDS, rng)
    }

    fn check_generator(&self, g: &BigUint) -> Result<()> {
        if g <= &BigUint::one() || g >= self.p.as_biguint() {
            return Err(Error::InvalidGroupElement(
                "generator must lie in (1, p)".to_string(),
            ));
        }
        if !self.pow(g, &self.q).is_one() {
            return Err(Error::InvalidGroupElement(
                "generator does not have order q".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects moduli whose subgroup order `q = (p - 1) / 2` would be even.
///
/// With `p = 5` the plaintext encoding `m^(q+1)` leaves the subgroup.
fn check_modulus(p: &BigUint) -> Result<()> {
    if p < &BigUint::from(MIN_MODULUS) || !p.bit(0) {
        return Err(Error::InvalidParams(format!(
            "{p} is not an odd modulus of at least {MIN_MODULUS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::SearchConfig;

    fn toy_group() -> GroupParameters {
        let mut rng = StdRng::seed_from_u64(0);
        GroupParameters::new(
            BigUint::from(23u32),
            BigUint::from(4u32),
            DEFAULT_ROUNDS,
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn toy_group_is_valid() {
        let params = toy_group();
        assert_eq!(params.p().as_biguint(), &BigUint::from(23u32));
        assert_eq!(params.q().as_biguint(), &BigUint::from(11u32));
        assert_eq!(params.g(), &BigUint::from(4u32));
    }

    #[test]
    fn subgroup_membership() {
        let params = toy_group();
        let residues = [1u32, 2, 3, 4, 6, 8, 9, 12, 13, 16, 18];
        for e in 1u32..23 {
            assert_eq!(
                params.contains(&BigUint::from(e)),
                residues.contains(&e),
                "{e}"
            );
        }
        assert!(!params.contains(&BigUint::zero()));
        assert!(!params.contains(&BigUint::from(23u32)));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        let four = BigUint::from(4u32);

        let not_safe = GroupParameters::new(BigUint::from(29u32), four.clone(), 10, &mut rng);
        assert!(matches!(not_safe, Err(Error::NotPrime(_))));

        let composite = GroupParameters::new(BigUint::from(27u32), four.clone(), 10, &mut rng);
        assert!(matches!(composite, Err(Error::NotPrime(_))));

        let even = GroupParameters::new(BigUint::from(22u32), four, 10, &mut rng);
        assert!(matches!(even, Err(Error::InvalidParams(_))));

        let non_residue = GroupParameters::new(BigUint::from(23u32), BigUint::from(5u32), 10, &mut rng);
        assert!(matches!(non_residue, Err(Error::InvalidGroupElement(_))));

        let one = GroupParameters::new(BigUint::from(23u32), BigUint::one(), 10, &mut rng);
        assert!(matches!(one, Err(Error::InvalidGroupElement(_))));
    }

    #[test]
    fn generated_group_satisfies_invariants() {
        let mut rng = StdRng::seed_from_u64(2);
        let search = PrimeSearch::new(SearchConfig::default()).unwrap();
        let n = BigUint::one() << 64u32;

        let params = GroupParameters::generate(&n, &search, &mut rng).unwrap();
        assert!(params.q().as_biguint() >= &n);
        assert_eq!(
            params.p().as_biguint(),
            &((params.q().as_biguint() << 1u32) + 1u32)
        );
        assert!(params.contains(params.g()));
        assert!(!params.g().is_one());
    }

    #[test]
    fn random_exponent_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = toy_group();
        for _ in 0..100 {
            let e = params.random_exponent(&mut rng).unwrap();
            assert!(params.validate_exponent(&e).is_ok());
        }
        assert!(params.validate_exponent(&BigUint::zero()).is_err());
        assert!(params.validate_exponent(&BigUint::from(11u32)).is_err());
    }

    #[test]
    fn byte_encoding_revalidates() {
        let mut rng = StdRng::seed_from_u64(4);
        let params = toy_group();
        let decoded = GroupParameters::from_bytes(&params.to_bytes(), &mut rng).unwrap();
        assert_eq!(decoded, params);

        let mut encoder = Encoder::new();
        encoder.put(&BigUint::from(23u32));
        encoder.put(&BigUint::from(5u32));
        assert!(GroupParameters::from_bytes(&encoder.finish(), &mut rng).is_err());
    }

    #[test]
    fn rejects_modulus_with_even_subgroup_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let five = GroupParameters::new(BigUint::from(5u32), BigUint::from(4u32), 10, &mut rng);
        assert!(matches!(five, Err(Error::InvalidParams(_))));

        let seven = GroupParameters::new(BigUint::from(7u32), BigUint::from(4u32), 10, &mut rng)
            .unwrap();
        assert_eq!(seven.q().as_biguint(), &BigUint::from(3u32));
    }

    #[test]
    fn smallest_generated_group_has_odd_order() {
        let mut rng = StdRng::seed_from_u64(6);
        let search = PrimeSearch::new(SearchConfig::default()).unwrap();
        let params = GroupParameters::generate(&BigUint::one(), &search, &mut rng).unwrap();
        assert_eq!(params.p().as_biguint(), &BigUint::from(7u32));
        assert!(params.q().as_biguint().bit(0));
    }

    #[test]
    fn serde_round_trip() {
        use figment::providers::Serialized;
        use figment::Figment;

        let params = toy_group();
        let decoded: GroupParameters = Figment::from(Serialized::defaults(&params))
            .extract()
            .unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn serde_revalidates() {
        use figment::providers::{Format, Toml};
        use figment::Figment;

        let good: GroupParameters = Figment::from(Toml::string("p = [23]\ng = [4]"))
            .extract()
            .unwrap();
        assert_eq!(good, toy_group());

        // 29 is prime but 14 is not.
        let not_safe = Figment::from(Toml::string("p = [29]\ng = [4]")).extract::<GroupParameters>();
        assert!(not_safe.is_err());

        let non_residue =
            Figment::from(Toml::string("p = [23]\ng = [5]")).extract::<GroupParameters>();
        assert!(non_residue.is_err());
    }
}
