//! Leaf arithmetic shared by every scheme in the crate.
//!
//! - **field**: modular exponentiation and inversion
//! - **primality**: trial division, Miller-Rabin and the [`Prime`] witness type
//! - **sieve**: the small-prime table and windowed prime search
//! - **rng**: cryptographically secure randomness and uniform range sampling
//! - **digest**: hash-to-integer reduction

/// Hash-to-integer reduction.
pub mod digest;
/// Modular exponentiation and inversion.
pub mod field;
/// Primality testing.
pub mod primality;
/// Cryptographically secure random number generation.
pub mod rng;
/// Small-prime sieve and prime search.
pub mod sieve;

pub use digest::hash_to_int;
pub use field::{mod_exp, mod_exp_signed, mod_inverse};
pub use primality::{is_prime, miller_rabin, Prime};
pub use rng::SecureRng;
pub use sieve::{PrimeSearch, SmallPrimes};
