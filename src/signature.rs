//! Schnorr-style signatures over the quadratic-residue subgroup.
//!
//! Signing draws an ephemeral `k`, sets `r = (g^k mod p) mod q` and
//! `s = k^-1 * (H(m) + x*r) mod q`. The digest `H` is a type parameter so
//! signer and verifier are forced to agree on it.

use core::fmt;
use core::marker::PhantomData;

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::elgamal::{PrivateKey, PublicKey};
use crate::encoding::{Decoder, Encoder};
use crate::primitives::digest::hash_to_int;
use crate::primitives::field::mod_inverse;
use crate::{Error, Result};

/// Signing attempts before giving up on degenerate `r = 0` or `s = 0` results.
const MAX_SIGNING_ATTEMPTS: usize = 64;

/// A signature `(r, s)` with both components in `[1, q - 1]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Creates a signature from its components.
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// The commitment component `r`.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// The response component `s`.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Serializes `(r, s)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.put(&self.r);
        encoder.put(&self.s);
        encoder.finish()
    }

    /// Deserializes a signature. Component ranges are checked at verification.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes)?;
        let r = decoder.take()?;
        let s = decoder.take()?;
        decoder.finish()?;
        Ok(Self { r, s })
    }
}

/// Signs and verifies integer messages under one public key.
///
/// `D` is the message digest, SHA-256 by default.
pub struct Signer<D = Sha256> {
    public: PublicKey,
    _digest: PhantomData<fn() -> D>,
}

impl<D> Clone for Signer<D> {
    fn clone(&self) -> Self {
        Self {
            public: self.public.clone(),
            _digest: PhantomData,
        }
    }
}

impl<D> fmt::Debug for Signer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl<D: Digest> Signer<D> {
    /// Creates a signer/verifier for the given public key.
    pub fn new(public: PublicKey) -> Self {
        Self {
            public,
            _digest: PhantomData,
        }
    }

    /// The public key signatures are checked against.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Signs `m` with fresh ephemeral randomness.
    ///
    /// Retries with a new nonce whenever `r` or `s` comes out zero.
    pub fn sign<R: CryptoRngCore + ?Sized>(
        &self,
        m: &BigUint,
        private: &PrivateKey,
        rng: &mut R,
    ) -> Result<Signature> {
        let params = self.public.params();
        for attempt in 0..MAX_SIGNING_ATTEMPTS {
            let k = params.random_exponent(rng)?;
            match self.sign_with_nonce(m, private, &k) {
                Err(Error::DegenerateSignature) => {
                    trace!(attempt, "degenerate signature, drawing a new nonce");
                }
                result => return result,
            }
        }
        Err(Error::DegenerateSignature)
    }

    /// Signs `m` with a caller-supplied nonce `k` in `[1, q - 1]`.
    ///
    /// Reusing `k` for two messages reveals the private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSignature`] if `r` or `s` is zero for this `k`.
    pub fn sign_with_nonce(
        &self,
        m: &BigUint,
        private: &PrivateKey,
        k: &BigUint,
    ) -> Result<Signature> {
        let params = self.public.params();
        let q = params.q();
        params.validate_exponent(k)?;

        let r = params.g_pow(k) % q.as_biguint();
        if r.is_zero() {
            return Err(Error::DegenerateSignature);
        }

        let digest = hash_to_int::<D>(m);
        let k_inverse = mod_inverse(k, q)?;
        let s = (k_inverse * (digest + private.expose_secret() * &r)) % q.as_biguint();
        if s.is_zero() {
            return Err(Error::DegenerateSignature);
        }

        Ok(Signature { r, s })
    }

    /// Returns true if `signature` is valid for `m` under this public key.
    pub fn check(&self, m: &BigUint, signature: &Signature) -> bool {
        let params = self.public.params();
        let q = params.q();
        let Signature { r, s } = signature;

        if r.is_zero() || r >= q.as_biguint() || s.is_zero() || s >= q.as_biguint() {
            return false;
        }

        let Ok(w) = mod_inverse(s, q) else {
            return false;
        };
        let digest = hash_to_int::<D>(m);
        let u1 = (digest * &w) % q.as_biguint();
        let u2 = (r * &w) % q.as_biguint();
        let v = params.mul(&params.g_pow(&u1), &params.pow(self.public.h(), &u2)) % q.as_biguint();

        &v == r
    }
}
