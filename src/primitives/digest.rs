//! Hash-to-integer reduction.
//!
//! Signing and verification must agree on the digest, so both go through
//! [`hash_to_int`] with the same `D`.

use num_bigint::BigUint;
use sha2::Digest;

/// Hashes the big-endian encoding of `m` and reads the digest as a big-endian integer.
///
/// Zero encodes as the single byte `0x00`.
pub fn hash_to_int<D: Digest>(m: &BigUint) -> BigUint {
    hash_bytes_to_int::<D>(&m.to_bytes_be())
}

/// Hashes raw bytes and reads the digest as a big-endian integer.
pub fn hash_bytes_to_int<D: Digest>(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&D::digest(bytes))
}
