use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use ringsig::{
  export_pem, import_pem, ring_sign_with_rng, ring_verify, Point, PrivateKey,
  PublicKey, RingSignature, Scalar,
};

fn make_ring(rng: &mut StdRng, size: usize) -> (Vec<PrivateKey>, Vec<PublicKey>) {
  let keys: Vec<PrivateKey> = (0..size).map(|_| PrivateKey::generate_with(rng)).collect();
  let ring = keys.iter().map(|key| key.public_key()).collect();
  (keys, ring)
}

#[test]
fn round_trip_for_various_ring_sizes() {
  let mut rng = StdRng::seed_from_u64(30);
  for size in [1, 2, 3, 100] {
    let (keys, ring) = make_ring(&mut rng, size);
    let signer = rng.gen_range(0..size);
    let message = b"attack at dawn";
    let signature = ring_sign_with_rng(&mut rng, message, &ring, &keys[signer], signer);

    assert_eq!(signature.ring_size(), size);
    assert_eq!(signature.c.len(), size);
    assert_eq!(signature.r.len(), size);
    assert!(ring_verify(message, &signature));
  }
}

#[test]
fn tampering_invalidates_the_signature() {
  let mut rng = StdRng::seed_from_u64(31);
  for size in [1, 2, 3, 100] {
    let (keys, ring) = make_ring(&mut rng, size);
    let message = b"transfer 10 coins";
    let signature = ring_sign_with_rng(&mut rng, message, &ring, &keys[0], 0);

    // One flipped message byte.
    assert!(!ring_verify(b"transfer 10 coinz", &signature));

    // Ring order is part of the transcript.
    if size > 1 {
      let mut reversed = signature.clone();
      reversed.public_keys.reverse();
      assert!(!ring_verify(message, &reversed));
    }

    // Doubled key image.
    let mut doubled = signature.clone();
    doubled.key_image = &Scalar::from(2u64) * &signature.key_image;
    assert!(!ring_verify(message, &doubled));

    // Any incremented challenge or response.
    for i in [0, size - 1] {
      let mut tweaked = signature.clone();
      tweaked.c[i] = &tweaked.c[i] + &Scalar::ONE;
      assert!(!ring_verify(message, &tweaked));

      let mut tweaked = signature.clone();
      tweaked.r[i] = &tweaked.r[i] + &Scalar::ONE;
      assert!(!ring_verify(message, &tweaked));
    }
  }
}

#[test]
fn structural_defects_verify_false() {
  let mut rng = StdRng::seed_from_u64(32);
  let (keys, ring) = make_ring(&mut rng, 3);
  let signature = ring_sign_with_rng(&mut rng, b"m", &ring, &keys[1], 1);

  let mut short_c = signature.clone();
  short_c.c.pop();
  assert!(!ring_verify(b"m", &short_c));

  let mut empty = signature;
  empty.public_keys.clear();
  empty.c.clear();
  empty.r.clear();
  assert!(!ring_verify(b"m", &empty));
}

#[test]
fn mismatched_key_and_index_verify_false() {
  let mut rng = StdRng::seed_from_u64(33);
  let (keys, ring) = make_ring(&mut rng, 4);
  // Signer claims slot 2 but owns the key in slot 0.
  let signature = ring_sign_with_rng(&mut rng, b"m", &ring, &keys[0], 2);
  assert!(!ring_verify(b"m", &signature));
}

#[test]
fn key_images_link_signatures_by_the_same_key() {
  let mut rng = StdRng::seed_from_u64(34);
  let signer = PrivateKey::generate_with(&mut rng);

  let (_, mut first_ring) = make_ring(&mut rng, 5);
  first_ring[0] = signer.public_key();
  let (_, mut second_ring) = make_ring(&mut rng, 8);
  second_ring[3] = signer.public_key();

  let s1 = ring_sign_with_rng(&mut rng, b"first", &first_ring, &signer, 0);
  let s2 = ring_sign_with_rng(&mut rng, b"second", &second_ring, &signer, 3);
  assert!(ring_verify(b"first", &s1));
  assert!(ring_verify(b"second", &s2));

  assert_eq!(s1.key_image, s2.key_image);
  assert!(s1.links_to(&s2));
  assert_ne!(s1.c, s2.c);
  assert_ne!(s1.r, s2.r);

  // A different key in the same ring produces a different image.
  let other = PrivateKey::generate_with(&mut rng);
  let mut third_ring = first_ring.clone();
  third_ring[1] = other.public_key();
  let s3 = ring_sign_with_rng(&mut rng, b"first", &third_ring, &other, 1);
  assert_ne!(s1.key_image, s3.key_image);
  assert!(!s1.links_to(&s3));
}

// Not a cryptographic argument, just a sanity check that the published
// scalars carry no gross bias toward the signer's slot: the byte
// distributions of (c, r) should look the same wherever the signer sits.
#[test]
fn challenge_response_distributions_are_position_independent() {
  fn mean_scalar_byte(signatures: &[RingSignature]) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for signature in signatures {
      for scalar in signature.c.iter().chain(signature.r.iter()) {
        for &byte in scalar.as_bytes() {
          sum += u64::from(byte);
          count += 1;
        }
      }
    }
    sum as f64 / count as f64
  }

  let mut rng = StdRng::seed_from_u64(35);
  let (keys, ring) = make_ring(&mut rng, 10);

  let mut at_zero = Vec::new();
  let mut at_five = Vec::new();
  for trial in 0..200u32 {
    let message = trial.to_le_bytes();
    at_zero.push(ring_sign_with_rng(&mut rng, &message, &ring, &keys[0], 0));
    at_five.push(ring_sign_with_rng(&mut rng, &message, &ring, &keys[5], 5));
  }

  let difference = (mean_scalar_byte(&at_zero) - mean_scalar_byte(&at_five)).abs();
  assert!(difference < 3.0, "byte means diverge by {difference}");
}

#[test]
fn single_member_ring() {
  let mut rng = StdRng::seed_from_u64(36);
  let (keys, ring) = make_ring(&mut rng, 1);
  let signature = ring_sign_with_rng(&mut rng, b"hello", &ring, &keys[0], 0);
  assert!(ring_verify(b"hello", &signature));

  let mut flipped = signature;
  let mut bytes = flipped.c[0].to_bytes();
  bytes[31] ^= 0x01;
  flipped.c[0] = Scalar::from_bytes(bytes);
  assert!(!ring_verify(b"hello", &flipped));
}

#[test]
fn empty_message_ring_of_three() {
  let mut rng = StdRng::seed_from_u64(37);
  let (keys, ring) = make_ring(&mut rng, 3);
  let signature = ring_sign_with_rng(&mut rng, b"", &ring, &keys[1], 1);
  assert!(ring_verify(b"", &signature));

  let mut reversed = signature;
  reversed.public_keys.reverse();
  assert!(!ring_verify(b"", &reversed));
}

#[test]
fn large_ring_survives_pem_round_trip() {
  let mut rng = StdRng::seed_from_u64(38);
  let (keys, ring) = make_ring(&mut rng, 100);
  let mut message = vec![0u8; 500];
  rng.fill_bytes(&mut message);

  let signature = ring_sign_with_rng(&mut rng, &message, &ring, &keys[0], 0);
  assert!(ring_verify(&message, &signature));

  let pem = export_pem(&signature).unwrap();
  let imported = import_pem(&pem).unwrap();
  assert_eq!(imported, signature);
  assert!(ring_verify(&message, &imported));
}

#[test]
fn invalid_ring_member_fails_verification() {
  let mut bad_bytes = [0u8; 32];
  bad_bytes[31] = 0x80;
  let bad_point = Point::from_bytes(bad_bytes);
  assert!(!bad_point.is_valid());

  let mut rng = StdRng::seed_from_u64(39);
  let (keys, ring) = make_ring(&mut rng, 3);
  let message = b"ring with a hole";
  let mut signature = ring_sign_with_rng(&mut rng, message, &ring, &keys[0], 0);
  assert!(ring_verify(message, &signature));

  signature.public_keys[1] = bad_point;
  assert!(!ring_verify(message, &signature));
}

#[test]
fn key_derivation_is_deterministic() {
  let mut rng = StdRng::seed_from_u64(40);
  let key = PrivateKey::generate_with(&mut rng);
  assert!(key.public_key().point().is_valid());
  assert_eq!(key.key_image(), key.key_image());

  let copy = PrivateKey::from_private_bytes(key.scalar().to_bytes());
  assert_eq!(copy.public_key(), key.public_key());
  assert_eq!(copy.key_image(), key.key_image());
}
