//! Traceable one-time ring signatures over Ed25519, as introduced in section
//! 4.4 of the CryptoNote white paper.
//!
//! A signer holding one secret key out of a ring of `N` public keys produces
//! a signature proving that *some* ring member signed the message, without
//! revealing which one. Every signature carries a key image
//! `I = x * H_p(x * G)`, a deterministic tag of the secret `x`: two
//! signatures by the same key share the same image and can be linked, while
//! the signer stays anonymous within each ring.
//!
//! # Not EdDSA
//!
//! Key derivation here is deliberately NOT RFC 8032: the public key is
//! `x * G` for the raw secret scalar `x`, with no seed hashing and no bit
//! clamping. The ring construction depends on scalar multiplication being
//! linear in `x`; the EdDSA clamp destroys that. Do not feed keys from an
//! EdDSA library into this crate, and do not reuse keys generated here with
//! one.
//!
//! ```
//! use ringsig::{ring_sign, ring_verify, PrivateKey};
//!
//! let keys: Vec<PrivateKey> = (0..4).map(|_| PrivateKey::generate()).collect();
//! let ring: Vec<_> = keys.iter().map(|k| k.public_key()).collect();
//!
//! let signature = ring_sign(b"message", &ring, &keys[2], 2);
//! assert!(ring_verify(b"message", &signature));
//! ```

use thiserror::Error;

#[macro_use]
mod macros;

pub mod encoding;
pub mod keys;
pub mod point;
pub mod ring;
pub mod scalar;

pub use encoding::{export_pem, import_pem};
pub use keys::{PrivateKey, PublicKey};
pub use point::{hash_to_scalar, hash_to_scalar_with, Point, G, O};
pub use ring::{ring_sign, ring_sign_with_rng, ring_verify, RingSignature};
pub use scalar::Scalar;

#[derive(Debug, Error)]
pub enum RingSigError {
  #[error("expected {expected} bytes, got {actual}")]
  InvalidLength { expected: usize, actual: usize },
  #[error("digest output of {0} bytes cannot be mapped to a point")]
  UnsupportedDigestLength(usize),
  #[error("the zero scalar has no inverse")]
  ZeroInversion,
  #[error("invalid PEM encapsulation")]
  InvalidEncapsulation,
  #[error("invalid base64 in PEM body: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("invalid DER structure: {0}")]
  Der(#[from] der::Error),
  #[error("unrecognized algorithm identifier")]
  UnknownAlgorithm,
  #[error("signature contains no ring members")]
  EmptyRing,
  #[error("ring, challenge and response lengths are inconsistent")]
  MismatchedRing,
}

pub type RingSigResult<T> = Result<T, RingSigError>;
