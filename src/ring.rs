//! Ring signing and verification, following the notation of the CryptoNote
//! white paper, section 4.4.

use log::debug;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::keys::{PrivateKey, PublicKey};
use crate::point::{hash_to_scalar, Point};
use crate::scalar::Scalar;

/// A traceable ring signature: the ring of public points, the signer's key
/// image, and the challenge/response lists. The signer's index is not
/// recorded anywhere in the structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSignature {
  pub public_keys: Vec<Point>,
  pub key_image: Point,
  pub c: Vec<Scalar>,
  pub r: Vec<Scalar>,
}

impl RingSignature {
  pub fn ring_size(&self) -> usize {
    self.public_keys.len()
  }

  /// Whether both signatures were produced by the same secret key. Rings
  /// and messages may differ; the key image alone links them.
  pub fn links_to(&self, other: &RingSignature) -> bool {
    self.key_image == other.key_image
  }
}

/// Signs `message` against the ring `public_keys`, using the operating
/// system CSPRNG.
///
/// `key_index` locates the signer's own key in the ring and must satisfy
/// `public_keys[key_index] == private_key.public_key()`; a mismatched
/// secret is not detected here and yields a signature that fails to
/// verify. The ring order is hashed as given; shuffle it beforehand if
/// the signer's position is predictable.
pub fn ring_sign(
  message: &[u8],
  public_keys: &[PublicKey],
  private_key: &PrivateKey,
  key_index: usize,
) -> RingSignature {
  ring_sign_with_rng(&mut OsRng, message, public_keys, private_key, key_index)
}

/// [`ring_sign`] with a caller-supplied CSPRNG.
pub fn ring_sign_with_rng<R: RngCore + CryptoRng>(
  rng: &mut R,
  message: &[u8],
  public_keys: &[PublicKey],
  private_key: &PrivateKey,
  key_index: usize,
) -> RingSignature {
  debug_assert!(key_index < public_keys.len());

  let key_image = private_key.key_image();

  let mut transcript = Vec::with_capacity(message.len() + 64 * public_keys.len());
  transcript.extend_from_slice(message);

  // c and r carry the decoy tuples (w_i, q_i) in ring order; the signer's
  // own pair is inserted at key_index once the shared challenge is known.
  let mut c = Vec::with_capacity(public_keys.len());
  let mut r = Vec::with_capacity(public_keys.len());
  let mut nonce = Scalar::ZERO;

  for (i, public_key) in public_keys.iter().enumerate() {
    let point = public_key.point();
    let hashed = point.hash_to_point();
    if i == key_index {
      nonce = Scalar::random(rng);
      transcript.extend_from_slice(Point::mul_base(&nonce).as_bytes());
      transcript.extend_from_slice((&nonce * &hashed).as_bytes());
    } else {
      let q_i = Scalar::random(rng);
      let w_i = Scalar::random(rng);
      transcript
        .extend_from_slice((&Point::mul_base(&q_i) + &(&w_i * point)).as_bytes());
      transcript
        .extend_from_slice((&(&q_i * &hashed) + &(&w_i * &key_image)).as_bytes());
      c.push(w_i);
      r.push(q_i);
    }
  }

  let decoy_sum = c.iter().fold(Scalar::ZERO, |sum, w_i| &sum + w_i);
  let challenge = &hash_to_scalar(&transcript) - &decoy_sum;
  let response = &nonce - &(&challenge * private_key.scalar());
  nonce.zeroize();
  // An out-of-range index never took the signer branch above, so bounding
  // the insert still yields a signature; it simply fails to verify.
  let position = key_index.min(c.len());
  c.insert(position, challenge);
  r.insert(position, response);

  debug!(
    "signed {} byte message under a ring of {} with key image {}",
    message.len(),
    public_keys.len(),
    hex::encode(key_image.as_bytes())
  );

  RingSignature {
    public_keys: public_keys.iter().map(|key| *key.point()).collect(),
    key_image,
    c,
    r,
  }
}

/// Verifies a ring signature over `message`.
///
/// Returns `false` for any tampering of the message, ring, key image or
/// scalar lists, and for structurally malformed signatures (empty ring,
/// mismatched list lengths). Never fails for cryptographic reasons.
pub fn ring_verify(message: &[u8], signature: &RingSignature) -> bool {
  let members = signature.public_keys.len();
  if members == 0 || signature.c.len() != members || signature.r.len() != members {
    return false;
  }

  let mut transcript = Vec::with_capacity(message.len() + 64 * members);
  transcript.extend_from_slice(message);

  for (i, point) in signature.public_keys.iter().enumerate() {
    let c_i = &signature.c[i];
    let r_i = &signature.r[i];
    let hashed = point.hash_to_point();
    transcript.extend_from_slice(
      Point::double_scalar_mul_basepoint(c_i, point, r_i).as_bytes(),
    );
    transcript.extend_from_slice(
      (&(r_i * &hashed) + &(c_i * &signature.key_image)).as_bytes(),
    );
  }

  let challenge_sum = signature
    .c
    .iter()
    .fold(Scalar::ZERO, |sum, c_i| &sum + c_i);
  &hash_to_scalar(&transcript) - &challenge_sum == Scalar::ZERO
}
