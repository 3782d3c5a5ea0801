//! ElGamal encryption over the quadratic-residue subgroup.
//!
//! Plaintexts are integers in `[1, q]`. Encryption maps `m` into the subgroup
//! as `M = m^(q+1) mod p`, which is whichever of `m` and `p - m` is a
//! quadratic residue. Decryption recovers `M` and folds values above `q` back
//! with `p - M`.

use core::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::{Decoder, Encoder};
use crate::group::GroupParameters;
use crate::primitives::sieve::PrimeSearch;
use crate::{Error, Result};

/// Public half of an ElGamal key: the group and `h = g^x mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPublicKey", into = "RawPublicKey")]
pub struct PublicKey {
    params: GroupParameters,
    h: BigUint,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawPublicKey {
    params: GroupParameters,
    h: BigUint,
}

impl TryFrom<RawPublicKey> for PublicKey {
    type Error = Error;

    fn try_from(raw: RawPublicKey) -> Result<Self> {
        Self::new(raw.params, raw.h)
    }
}

impl From<PublicKey> for RawPublicKey {
    fn from(key: PublicKey) -> Self {
        Self {
            params: key.params,
            h: key.h,
        }
    }
}

impl PublicKey {
    /// Wraps a public value `h`, checking that it lies in the subgroup.
    pub fn new(params: GroupParameters, h: BigUint) -> Result<Self> {
        params.validate_element(&h)?;
        Ok(Self { params, h })
    }

    /// The group parameters.
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    /// The public value `h = g^x mod p`.
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Serializes `(p, g, h)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.put(self.params.p());
        encoder.put(self.params.g());
        encoder.put(&self.h);
        encoder.finish()
    }

    /// Deserializes and re-validates a public key.
    pub fn from_bytes<R: CryptoRngCore + ?Sized>(bytes: &[u8], rng: &mut R) -> Result<Self> {
        let mut decoder = Decoder::new(bytes)?;
        let p = decoder.take()?;
        let g = decoder.take()?;
        let h = decoder.take()?;
        decoder.finish()?;

        let params = GroupParameters::new(
            p,
            g,
            crate::primitives::primality::DEFAULT_ROUNDS,
            rng,
        )?;
        Self::new(params, h)
    }
}

/// Secret exponent `x` in `[1, q - 1]`.
///
/// Deliberately not serializable; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    x: BigUint,
}

impl PrivateKey {
    /// Wraps a secret exponent, checking it lies in `[1, q - 1]`.
    pub fn new(params: &GroupParameters, x: BigUint) -> Result<Self> {
        params.validate_exponent(&x)?;
        Ok(Self { x })
    }

    /// Returns the secret exponent.
    pub fn expose_secret(&self) -> &BigUint {
        &self.x
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A matching public and private key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Derives the key pair for a known secret exponent.
    pub fn from_private(params: GroupParameters, x: BigUint) -> Result<Self> {
        let private = PrivateKey::new(&params, x)?;
        let h = params.g_pow(&private.x);
        Ok(Self {
            public: PublicKey { params, h },
            private,
        })
    }

    /// Draws a fresh secret exponent for existing group parameters.
    pub fn generate<R: CryptoRngCore + ?Sized>(params: GroupParameters, rng: &mut R) -> Result<Self> {
        let x = params.random_exponent(rng)?;
        Self::from_private(params, x)
    }

    /// The public key.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The private key.
    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    /// Splits into public and private halves.
    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public, self.private)
    }
}

/// An ElGamal ciphertext `(c1, c2)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    c1: BigUint,
    c2: BigUint,
}

impl Ciphertext {
    /// Creates a ciphertext from its components.
    pub fn new(c1: BigUint, c2: BigUint) -> Self {
        Self { c1, c2 }
    }

    /// The first component `g^y mod p`.
    pub fn c1(&self) -> &BigUint {
        &self.c1
    }

    /// The second component `M * h^y mod p`.
    pub fn c2(&self) -> &BigUint {
        &self.c2
    }

    /// Serializes `(c1, c2)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.put(&self.c1);
        encoder.put(&self.c2);
        encoder.finish()
    }

    /// Deserializes a ciphertext. Component ranges are not checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes)?;
        let c1 = decoder.take()?;
        let c2 = decoder.take()?;
        decoder.finish()?;
        Ok(Self { c1, c2 })
    }
}

/// ElGamal cipher bound to one public key.
#[derive(Clone, Debug)]
pub struct ElGamal {
    public: PublicKey,
}

impl ElGamal {
    /// Creates a cipher for the given public key.
    pub fn new(public: PublicKey) -> Self {
        Self { public }
    }

    /// Generates a fresh group with `q` at or above `n` and a key pair in it.
    pub fn key_generation<R: CryptoRngCore + ?Sized>(
        n: &BigUint,
        search: &PrimeSearch,
        rng: &mut R,
    ) -> Result<KeyPair> {
        let params = GroupParameters::generate(n, search, rng)?;
        let pair = KeyPair::generate(params, rng)?;
        debug!(bits = pair.public.params.p().bits(), "generated ElGamal key pair");
        Ok(pair)
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Encrypts `m` in `[1, q]` with fresh randomness.
    pub fn encrypt<R: CryptoRngCore + ?Sized>(&self, m: &BigUint, rng: &mut R) -> Result<Ciphertext> {
        let y = self.public.params.random_exponent(rng)?;
        self.encrypt_with_randomness(m, &y)
    }

    /// Encrypts `m` with caller-supplied randomness `y` in `[1, q - 1]`.
    ///
    /// Reusing `y` across messages leaks their ratio; only supply it for
    /// reproducible tests.
    pub fn encrypt_with_randomness(&self, m: &BigUint, y: &BigUint) -> Result<Ciphertext> {
        let params = &self.public.params;
        let q = params.q().as_biguint();

        if m.is_zero() || m > q {
            return Err(Error::MessageOutOfRange {
                message: m.clone(),
                max: q.clone(),
            });
        }
        params.validate_exponent(y)?;

        let encoded = params.pow(m, &(q + 1u32));
        let c1 = params.g_pow(y);
        let c2 = params.mul(&encoded, &params.pow(&self.public.h, y));
        Ok(Ciphertext { c1, c2 })
    }

    /// Decrypts a ciphertext with the private key matching this public key.
    ///
    /// A malformed ciphertext decrypts to an unrelated value rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScalar`] if `c1` is a multiple of `p`.
    pub fn decrypt(&self, ciphertext: &Ciphertext, private: &PrivateKey) -> Result<BigUint> {
        let params = &self.public.params;
        let neg_x = -BigInt::from(private.x.clone());
        let mask_inverse = params.pow_signed(&ciphertext.c1, &neg_x)?;
        let encoded = params.mul(&ciphertext.c2, &mask_inverse);

        if &encoded > params.q().as_biguint() {
            Ok(params.p().as_biguint() - encoded)
        } else {
            Ok(encoded)
        }
    }

    /// Multiplies two ciphertexts component-wise.
    ///
    /// The result decrypts to `m_a * m_b` when that product does not exceed `q`.
    pub fn combine(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        let params = &self.public.params;
        Ciphertext {
            c1: params.mul(&a.c1, &b.c1),
            c2: params.mul(&a.c2, &b.c2),
        }
    }

    /// Re-encrypts a ciphertext under fresh randomness without changing its plaintext.
    pub fn rerandomize<R: CryptoRngCore + ?Sized>(
        &self,
        ciphertext: &Ciphertext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let one = self.encrypt(&BigUint::one(), rng)?;
        Ok(self.combine(ciphertext, &one))
    }
}
