//! Common test utilities shared across integration tests.

use evote_primitives::{GroupParameters, KeyPair, PrimeSearch, SearchConfig};
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Initialize test tracing (call once at the beginning of tests).
///
/// Shows `debug` events from the library. Subsequent calls are ignored.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("evote_primitives=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Seeded generator for reproducible tests.
#[allow(dead_code)]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// The toy group `p = 23, q = 11, g = 4`.
#[allow(dead_code)]
pub fn toy_params() -> GroupParameters {
    GroupParameters::new(BigUint::from(23u32), BigUint::from(4u32), 10, &mut rng(0))
        .expect("23 is a safe prime and 4 generates its residues")
}

/// A generated group whose subgroup order has `bits` bits.
#[allow(dead_code)]
pub fn generated_params(bits: u32, seed: u64) -> GroupParameters {
    let search = PrimeSearch::new(SearchConfig::default()).expect("default config is valid");
    let n = BigUint::from(1u32) << (bits - 1);
    GroupParameters::generate(&n, &search, &mut rng(seed)).expect("safe prime search succeeds")
}

/// A key pair in a generated group.
#[allow(dead_code)]
pub fn generated_pair(bits: u32, seed: u64) -> KeyPair {
    KeyPair::generate(generated_params(bits, seed), &mut rng(seed + 1))
        .expect("key generation succeeds")
}
