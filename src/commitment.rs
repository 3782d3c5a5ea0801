//! Pedersen commitments.
//!
//! `commit(s) = g^s * h^t mod p` for a random blinding factor `t`. The
//! commitment can be published immediately; the opening `(s, t)` is withheld
//! until the reveal phase. Hiding and binding hold as long as nobody knows
//! `log_g h`.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::encoding::{Decoder, Encoder};
use crate::group::GroupParameters;
use crate::primitives::rng::uniform_inclusive;
use crate::{Error, Result};

/// Domain separation tag for deriving the second generator.
const GENERATOR_DST: &[u8] = b"evote-primitives/pedersen-h/v1";

const MAX_DERIVE_ATTEMPTS: u32 = 256;

/// A published commitment value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment {
    value: BigUint,
}

impl Commitment {
    /// Wraps a commitment value received from another party.
    pub fn new(value: BigUint) -> Self {
        Self { value }
    }

    /// The commitment value `g^s * h^t mod p`.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Serializes the commitment value.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.put(&self.value);
        encoder.finish()
    }

    /// Deserializes a commitment value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes)?;
        let value = decoder.take()?;
        decoder.finish()?;
        Ok(Self { value })
    }
}

/// The secret and blinding factor that open a commitment.
///
/// Keep private until the reveal phase, then disclose both together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    s: BigUint,
    t: BigUint,
}

impl Opening {
    /// Creates an opening from its parts.
    pub fn new(s: BigUint, t: BigUint) -> Self {
        Self { s, t }
    }

    /// The committed value.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// The blinding factor.
    pub fn t(&self) -> &BigUint {
        &self.t
    }
}

/// Pedersen commitment scheme over two independent generators `g` and `h`.
#[derive(Clone, Debug)]
pub struct Pedersen {
    params: GroupParameters,
    h: BigUint,
}

impl Pedersen {
    /// Creates a scheme with an explicit second generator.
    ///
    /// The caller must ensure no one knows `log_g h`.
    ///
    /// # Errors
    ///
    /// Returns an error if `h` is outside the subgroup, is the identity, or equals `g`.
    pub fn new(params: GroupParameters, h: BigUint) -> Result<Self> {
        params.validate_element(&h)?;
        if h.is_one() {
            return Err(Error::InvalidParams(
                "generator h cannot be identity".to_string(),
            ));
        }
        if &h == params.g() {
            return Err(Error::InvalidParams(
                "generators g and h must be different".to_string(),
            ));
        }
        Ok(Self { params, h })
    }

    /// Derives `h` by hashing a domain tag with the group parameters and squaring
    /// the result into the subgroup.
    ///
    /// Nobody learns `log_g h` this way, and anyone can recompute `h`.
    pub fn derive(params: GroupParameters) -> Result<Self> {
        let p = params.p().as_biguint();
        let wanted_bytes = (p.bits() as usize).div_ceil(8) + 16;

        for counter in 0..MAX_DERIVE_ATTEMPTS {
            let mut expanded = Vec::with_capacity(wanted_bytes + 32);
            let mut block = 0u32;
            while expanded.len() < wanted_bytes {
                let digest = Sha256::new()
                    .chain_update(GENERATOR_DST)
                    .chain_update(p.to_bytes_be())
                    .chain_update(params.g().to_bytes_be())
                    .chain_update(counter.to_be_bytes())
                    .chain_update(block.to_be_bytes())
                    .finalize();
                expanded.extend_from_slice(&digest);
                block += 1;
            }

            let u = BigUint::from_bytes_be(&expanded) % p;
            let h = params.pow(&u, &BigUint::from(2u32));
            if !h.is_zero() && !h.is_one() && &h != params.g() {
                debug!(counter, "derived second commitment generator");
                return Ok(Self { params, h });
            }
        }

        Err(Error::InvalidParams(
            "could not derive a second generator".to_string(),
        ))
    }

    /// The group parameters.
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    /// The second generator `h`.
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Commits to `s` with a blinding factor drawn uniformly from `[0, q]`.
    pub fn commit<R: CryptoRngCore + ?Sized>(
        &self,
        s: &BigUint,
        rng: &mut R,
    ) -> Result<(Commitment, Opening)> {
        let t = uniform_inclusive(rng, &BigUint::zero(), self.params.q())?;
        Ok(self.commit_with_blinding(s, &t))
    }

    /// Commits to `s` with a caller-supplied blinding factor.
    pub fn commit_with_blinding(&self, s: &BigUint, t: &BigUint) -> (Commitment, Opening) {
        let value = self.evaluate(s, t);
        (Commitment { value }, Opening::new(s.clone(), t.clone()))
    }

    /// Returns true if `(s, t)` opens `commitment`.
    pub fn check(&self, commitment: &Commitment, s: &BigUint, t: &BigUint) -> bool {
        self.evaluate(s, t) == commitment.value
    }

    /// Returns true if `opening` opens `commitment`.
    pub fn verify_opening(&self, commitment: &Commitment, opening: &Opening) -> bool {
        self.check(commitment, &opening.s, &opening.t)
    }

    fn evaluate(&self, s: &BigUint, t: &BigUint) -> BigUint {
        self.params
            .mul(&self.params.g_pow(s), &self.params.pow(&self.h, t))
    }
}
