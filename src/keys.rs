//! Key pairs for the ring protocol.
//!
//! Derivation is plain `P = x * G` on the raw secret scalar. The RFC 8032
//! seed-hash-and-clamp step is intentionally absent: the ring equations
//! need `x * G` to stay linear in `x`.

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::point::Point;
use crate::scalar::Scalar;

/// A secret scalar. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
  scalar: Scalar,
}

impl PrivateKey {
  /// Samples a fresh key from the operating system CSPRNG.
  pub fn generate() -> PrivateKey {
    PrivateKey::generate_with(&mut OsRng)
  }

  pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> PrivateKey {
    PrivateKey {
      scalar: Scalar::random(rng),
    }
  }

  /// Wraps 32 raw little-endian bytes as the secret scalar, verbatim.
  pub fn from_private_bytes(bytes: [u8; 32]) -> PrivateKey {
    PrivateKey {
      scalar: Scalar::from_bytes(bytes),
    }
  }

  pub fn scalar(&self) -> &Scalar {
    &self.scalar
  }

  pub fn public_key(&self) -> PublicKey {
    PublicKey {
      point: Point::mul_base(&self.scalar),
    }
  }

  /// The key image `I = x * H_p(x * G)`: deterministic for a given secret,
  /// identical across every signature made with it.
  pub fn key_image(&self) -> Point {
    &self.scalar * &self.public_key().point.hash_to_point()
  }
}

/// A ring member's public point `P = x * G`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
  point: Point,
}

impl PublicKey {
  pub fn new(point: Point) -> PublicKey {
    PublicKey { point }
  }

  pub fn point(&self) -> &Point {
    &self.point
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    self.point.as_bytes()
  }
}
