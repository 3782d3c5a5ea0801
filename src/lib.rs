//! Cryptographic primitives for a verifiable e-voting scheme.
//!
//! Everything works over a safe-prime group `p = 2q + 1`:
//!
//! - [`primitives`]: modular exponentiation, Miller-Rabin, the small-prime
//!   sieve and safe-prime search
//! - [`ElGamal`]: encryption of ballots in `[1, q]` inside the
//!   quadratic-residue subgroup
//! - [`Pedersen`]: commitments opened in a later reveal phase
//! - [`Signer`]: Schnorr-style signatures over integer messages
//!
//! Arithmetic is not constant-time.
//!
//! ```rust
//! use evote_primitives::{ElGamal, PrimeSearch, SearchConfig, SecureRng};
//! use num_bigint::BigUint;
//!
//! let mut rng = SecureRng::new();
//! let search = PrimeSearch::new(SearchConfig::default()).unwrap();
//! let pair = ElGamal::key_generation(&(BigUint::from(1u32) << 64u32), &search, &mut rng).unwrap();
//!
//! let cipher = ElGamal::new(pair.public().clone());
//! let ballot = BigUint::from(3u32);
//! let ct = cipher.encrypt(&ballot, &mut rng).unwrap();
//! assert_eq!(cipher.decrypt(&ct, pair.private()).unwrap(), ballot);
//! ```

/// Pedersen commitments.
pub mod commitment;
/// Prime search configuration.
pub mod config;
/// ElGamal encryption.
pub mod elgamal;
/// Versioned byte encoding.
pub mod encoding;
/// Error types.
pub mod error;
/// Safe-prime group parameters.
pub mod group;
/// Modular arithmetic, primality and randomness.
pub mod primitives;
/// Schnorr-style signatures.
pub mod signature;

pub use commitment::{Commitment, Opening, Pedersen};
pub use config::SearchConfig;
pub use elgamal::{Ciphertext, ElGamal, KeyPair, PrivateKey, PublicKey};
pub use error::Error;
pub use group::GroupParameters;
pub use primitives::sieve::SafePrime;
pub use primitives::{
    hash_to_int, is_prime, miller_rabin, mod_exp, mod_exp_signed, mod_inverse, Prime, PrimeSearch,
    SecureRng, SmallPrimes,
};
pub use signature::{Signature, Signer};

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
