//! Error types for the e-voting primitives.

use num_bigint::BigUint;

/// Main error types for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid group parameters or search configuration were provided.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// An exponent, nonce or blinding factor is out of range, or has no inverse.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// A group element is out of range or not in the quadratic-residue subgroup.
    #[error("Invalid group element: {0}")]
    InvalidGroupElement(String),

    /// A value that must be prime failed the primality test.
    #[error("Not a prime: {0}")]
    NotPrime(String),

    /// An ElGamal plaintext lies outside `[1, q]`.
    #[error("Message {message} is outside the plaintext range [1, {max}]")]
    MessageOutOfRange {
        /// The rejected plaintext.
        message: BigUint,
        /// The subgroup order `q`.
        max: BigUint,
    },

    /// No prime survived in the sampled search window. Retry with a new window.
    #[error("Prime search exhausted the window [{lo}, {hi})")]
    SearchExhausted {
        /// Inclusive lower bound of the window.
        lo: BigUint,
        /// Exclusive upper bound of the window.
        hi: BigUint,
    },

    /// Signing produced `r = 0` or `s = 0` and could not retry.
    #[error("Degenerate signature: r or s is zero")]
    DegenerateSignature,

    /// Byte encoding or decoding failed.
    #[error("Encoding error: {0}")]
    Encoding(String),
}
