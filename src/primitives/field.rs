use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::primality::Prime;
use crate::{Error, Result};

/// Performs modular exponentiation by square-and-multiply.
///
/// Computes `base^exp mod modulus` with `O(log exp)` multiplications. The
/// exponent is scanned from its least significant bit while a ladder of
/// repeated squares of the base is built alongside. `exp = 0` yields
/// `1 mod modulus`.
///
/// Not constant-time.
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }
    Ok(pow_mod(base, exp, modulus))
}

/// Modular exponentiation with a possibly negative exponent.
///
/// A negative exponent is resolved through Fermat's little theorem:
/// `a^-n = a^((p-2)*n mod (p-1)) mod p`. That identity only holds for a prime
/// modulus, which is why the modulus is a [`Prime`] here.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] for a negative exponent when `base` is
/// divisible by the modulus, since zero has no inverse.
pub fn mod_exp_signed(base: &BigUint, exp: &BigInt, modulus: &Prime) -> Result<BigUint> {
    let p = modulus.as_biguint();
    let magnitude = exp.magnitude();

    if exp.sign() != Sign::Minus {
        return Ok(pow_mod(base, magnitude, p));
    }

    if (base % p).is_zero() {
        return Err(Error::InvalidScalar(format!(
            "{base} has no inverse modulo {p}"
        )));
    }

    let p_minus_one = p - 1u32;
    let inverse_exp = if p_minus_one.is_one() {
        BigUint::zero()
    } else {
        ((p - 2u32) * magnitude) % &p_minus_one
    };
    Ok(pow_mod(base, &inverse_exp, p))
}

/// Computes the multiplicative inverse of `a` modulo a prime.
pub fn mod_inverse(a: &BigUint, modulus: &Prime) -> Result<BigUint> {
    mod_exp_signed(a, &BigInt::from(-1), modulus)
}

/// Square-and-multiply over a modulus already known to be non-zero.
pub(crate) fn pow_mod(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    let mut result = BigUint::one() % modulus;
    let mut square = base % modulus;
    let bits = exp.bits();

    for i in 0..bits {
        if exp.bit(i) {
            result = (result * &square) % modulus;
        }
        if i + 1 < bits {
            square = (&square * &square) % modulus;
        }
    }

    result
}
