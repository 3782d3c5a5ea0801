mod common;

use common::{generated_pair, generated_params, init_tracing, rng, toy_params};
use evote_primitives::{
    miller_rabin, Ciphertext, ElGamal, Error, KeyPair, Pedersen, PrimeSearch, SearchConfig,
    Signature, Signer,
};
use num_bigint::BigUint;
use sha2::Sha256;

#[test]
fn toy_group_elgamal_scenario() {
    init_tracing();

    let params = toy_params();
    let pair = KeyPair::from_private(params, BigUint::from(3u32)).unwrap();
    assert_eq!(pair.public().h(), &BigUint::from(18u32));

    let cipher = ElGamal::new(pair.public().clone());
    let ct = cipher
        .encrypt_with_randomness(&BigUint::from(5u32), &BigUint::from(2u32))
        .unwrap();
    assert_eq!(ct, Ciphertext::new(BigUint::from(16u32), BigUint::from(13u32)));
    assert_eq!(cipher.decrypt(&ct, pair.private()).unwrap(), BigUint::from(5u32));
}

#[test]
fn full_key_generation_and_encryption() {
    init_tracing();

    let mut rng = rng(100);
    let search = PrimeSearch::new(SearchConfig::default()).unwrap();
    let n = BigUint::from(1u32) << 127u32;
    let pair = ElGamal::key_generation(&n, &search, &mut rng).unwrap();

    let params = pair.public().params();
    assert!(params.q().as_biguint() >= &n);
    assert!(miller_rabin(params.p(), 20, &mut rng));
    assert!(miller_rabin(params.q(), 20, &mut rng));
    assert_eq!(params.g(), &BigUint::from(4u32));

    let cipher = ElGamal::new(pair.public().clone());
    for ballot in [1u32, 2, 3, 17, 1_000_000] {
        let ballot = BigUint::from(ballot);
        let ct = cipher.encrypt(&ballot, &mut rng).unwrap();
        assert_eq!(cipher.decrypt(&ct, pair.private()).unwrap(), ballot);
    }

    let q = params.q().as_biguint().clone();
    let ct = cipher.encrypt(&q, &mut rng).unwrap();
    assert_eq!(cipher.decrypt(&ct, pair.private()).unwrap(), q);
}

#[test]
fn voting_round_with_commit_reveal_and_signature() {
    init_tracing();

    let mut rng = rng(200);
    let authority = generated_pair(96, 201);
    let voter = KeyPair::generate(authority.public().params().clone(), &mut rng).unwrap();

    let cipher = ElGamal::new(authority.public().clone());
    let pedersen = Pedersen::derive(authority.public().params().clone()).unwrap();
    let signer = Signer::<Sha256>::new(voter.public().clone());

    let ballot = BigUint::from(2u32);
    let ct = cipher.encrypt(&ballot, &mut rng).unwrap();
    let (commitment, opening) = pedersen.commit(&ballot, &mut rng).unwrap();

    let message = BigUint::from_bytes_be(&[ct.to_bytes(), commitment.to_bytes()].concat());
    let sig = signer.sign(&message, voter.private(), &mut rng).unwrap();

    let received_sig = Signature::from_bytes(&sig.to_bytes()).unwrap();
    assert!(signer.check(&message, &received_sig));

    assert!(pedersen.verify_opening(&commitment, &opening));
    assert_eq!(cipher.decrypt(&ct, authority.private()).unwrap(), ballot);
}

#[test]
fn tallying_by_homomorphic_product() {
    let mut rng = rng(300);
    let pair = generated_pair(64, 301);
    let cipher = ElGamal::new(pair.public().clone());

    let votes = [2u32, 3, 5, 7];
    let mut product = cipher.encrypt(&BigUint::from(1u32), &mut rng).unwrap();
    for v in votes {
        let ct = cipher.encrypt(&BigUint::from(v), &mut rng).unwrap();
        product = cipher.combine(&product, &ct);
    }
    product = cipher.rerandomize(&product, &mut rng).unwrap();

    assert_eq!(
        cipher.decrypt(&product, pair.private()).unwrap(),
        BigUint::from(210u32)
    );
}

#[test]
fn safe_prime_window_bounds() {
    let mut rng = rng(400);
    let search = PrimeSearch::new(SearchConfig::default()).unwrap();
    let n = (BigUint::from(1u32) << 100u32) + 12_345u32;

    let safe = search.find_safe_prime(&n, &mut rng).unwrap();
    let half = &n >> 1u32;
    let q = safe.q().as_biguint();
    assert!(q >= &half);
    assert!(q < &(&half + (1u64 << 15)));
    assert!(miller_rabin(safe.p(), 10, &mut rng));
    assert!(miller_rabin(&((safe.p().as_biguint() - 1u32) >> 1u32), 10, &mut rng));
}

#[test]
fn search_exhaustion_is_recoverable() {
    let mut rng = rng(500);
    let narrow = PrimeSearch::new(SearchConfig {
        window: 2,
        ..SearchConfig::default()
    })
    .unwrap();

    // 114 and 115 are both composite
    let err = narrow
        .find_prime_in_window(&BigUint::from(114u32), &mut rng)
        .unwrap_err();
    assert!(matches!(err, Error::SearchExhausted { .. }));

    let p = narrow
        .find_prime_in_window(&BigUint::from(126u32), &mut rng)
        .unwrap();
    assert_eq!(p.as_biguint(), &BigUint::from(127u32));
}

#[test]
fn generated_group_has_requested_size() {
    let params = generated_params(48, 600);
    let q = params.q().as_biguint();
    assert!(q.bits() >= 48);
    assert!(params.contains(params.g()));
}
