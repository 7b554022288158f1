//! Ed25519 group operations on compressed 32-byte encodings.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::traits::IsIdentity;
use digest::Digest;
use hex_literal::hex;
use serde::{Deserialize, Serialize};
use sha3::Sha3_512;
use subtle::ConstantTimeEq;

use crate::scalar::Scalar;
use crate::{RingSigError, RingSigResult};

/// Little-endian encoding of the field prime Q = 2^255 - 19.
pub const FIELD_ORDER: [u8; 32] =
  hex!("edffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f");

/// A point on Ed25519, stored as its 32-byte compressed encoding: the
/// y-coordinate in little-endian with the sign of x in the top bit.
///
/// Construction performs no validation, so a `Point` may hold an encoding
/// that is off-curve or outside the prime-order subgroup; [`Point::is_valid`]
/// decides. Group operations on an operand that does not decode yield the
/// identity encoding, mirroring the untouched output buffer of the
/// underlying primitive. Equality compares raw bytes in constant time.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Point {
  bytes: [u8; 32],
}

/// The identity element (encoding of 1).
pub const O: Point = Point {
  bytes: hex!("0100000000000000000000000000000000000000000000000000000000000000"),
};

/// The base point, (x, 4/5) with the low bit of x unset.
pub const G: Point = Point {
  bytes: hex!("5866666666666666666666666666666666666666666666666666666666666666"),
};

impl Point {
  /// Wraps 32 bytes without checking that they encode a curve point.
  pub fn from_bytes(bytes: [u8; 32]) -> Point {
    Point { bytes }
  }

  /// Deterministically maps 32 uniform bytes to a point in the prime-order
  /// subgroup.
  ///
  /// Decompresses the candidate encoding, stepping the first byte until a
  /// curve point is found, then clears the cofactor. Not constant-time;
  /// only ever applied to public data.
  pub fn from_uniform(seed: &[u8; 32]) -> Point {
    let mut candidate = *seed;
    for attempt in 0..=255u8 {
      candidate[0] = seed[0].wrapping_add(attempt);
      if let Some(point) = CompressedEdwardsY(candidate).decompress() {
        let cleared = point.mul_by_cofactor();
        if !cleared.is_identity() {
          return Point::from_edwards(&cleared);
        }
      }
    }
    // Unreachable for any input: each candidate decompresses with
    // probability about one half.
    O
  }

  /// Maps a 64-byte hash output to a point by reducing it modulo the field
  /// prime and applying [`Point::from_uniform`].
  pub fn from_hash(wide: &[u8; 64]) -> Point {
    Point::from_uniform(&reduce512_mod_q(wide))
  }

  /// Whether the encoding is a canonical point on the curve, inside the
  /// prime-order subgroup and not of small order.
  pub fn is_valid(&self) -> bool {
    match self.decompress() {
      Some(point) => {
        let canonical = point.compress().to_bytes();
        bool::from(canonical[..].ct_eq(&self.bytes[..]))
          && !point.is_small_order()
          && point.is_torsion_free()
      }
      None => false,
    }
  }

  /// Hashes the point's encoding and maps the digest back onto the curve,
  /// using the default SHA3-512.
  pub fn hash_to_point(&self) -> Point {
    self
      .hash_to_point_with::<Sha3_512>()
      .expect("a 64-byte digest always maps to a point")
  }

  /// [`Point::hash_to_point`] with a caller-chosen digest. A 64-byte digest
  /// goes through [`Point::from_hash`], a 32-byte digest through
  /// [`Point::from_uniform`]; other widths are rejected.
  pub fn hash_to_point_with<D: Digest>(&self) -> RingSigResult<Point> {
    let digest = D::digest(self.bytes);
    let digest = digest.as_slice();
    match digest.len() {
      64 => {
        let mut wide = [0u8; 64];
        wide.copy_from_slice(digest);
        Ok(Point::from_hash(&wide))
      }
      32 => {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(digest);
        Ok(Point::from_uniform(&seed))
      }
      other => Err(RingSigError::UnsupportedDigestLength(other)),
    }
  }

  /// Multiplies the base point by a scalar using the precomputed table.
  /// Agrees with generic multiplication of [`G`].
  pub fn mul_base(scalar: &Scalar) -> Point {
    Point::from_edwards(&EdwardsPoint::mul_base(&scalar.reduced()))
  }

  /// Computes `a * point + b * G` in variable time. Verification only.
  pub fn double_scalar_mul_basepoint(a: &Scalar, point: &Point, b: &Scalar) -> Point {
    match point.decompress() {
      Some(p) => Point::from_edwards(&EdwardsPoint::vartime_double_scalar_mul_basepoint(
        &a.reduced(),
        &p,
        &b.reduced(),
      )),
      None => Point::mul_base(b),
    }
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.bytes
  }

  pub fn to_bytes(self) -> [u8; 32] {
    self.bytes
  }

  pub(crate) fn decompress(&self) -> Option<EdwardsPoint> {
    CompressedEdwardsY(self.bytes).decompress()
  }

  pub(crate) fn from_edwards(point: &EdwardsPoint) -> Point {
    Point {
      bytes: point.compress().to_bytes(),
    }
  }
}

impl TryFrom<&[u8]> for Point {
  type Error = RingSigError;

  fn try_from(bytes: &[u8]) -> RingSigResult<Point> {
    let bytes: [u8; 32] =
      bytes.try_into().map_err(|_| RingSigError::InvalidLength {
        expected: 32,
        actual: bytes.len(),
      })?;
    Ok(Point { bytes })
  }
}

impl PartialEq for Point {
  fn eq(&self, other: &Point) -> bool {
    bool::from(self.bytes[..].ct_eq(&other.bytes[..]))
  }
}

impl Eq for Point {}

impl fmt::Debug for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Point({})", hex::encode(self.bytes))
  }
}

impl<'a, 'b> Add<&'b Point> for &'a Point {
  type Output = Point;

  fn add(self, rhs: &'b Point) -> Point {
    match (self.decompress(), rhs.decompress()) {
      (Some(a), Some(b)) => Point::from_edwards(&(a + b)),
      _ => O,
    }
  }
}

impl<'a, 'b> Sub<&'b Point> for &'a Point {
  type Output = Point;

  fn sub(self, rhs: &'b Point) -> Point {
    match (self.decompress(), rhs.decompress()) {
      (Some(a), Some(b)) => Point::from_edwards(&(a - b)),
      _ => O,
    }
  }
}

impl<'a, 'b> Mul<&'b Point> for &'a Scalar {
  type Output = Point;

  fn mul(self, rhs: &'b Point) -> Point {
    match rhs.decompress() {
      Some(point) => Point::from_edwards(&(self.reduced() * point)),
      None => O,
    }
  }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Point {
  type Output = Point;

  fn mul(self, rhs: &'b Scalar) -> Point {
    rhs * self
  }
}

define_binop_variants!(Add, add, Point, Point, Point);
define_binop_variants!(Sub, sub, Point, Point, Point);
define_binop_variants!(Mul, mul, Scalar, Point, Point);
define_binop_variants!(Mul, mul, Point, Scalar, Point);

/// Hashes arbitrary bytes to an integer modulo Q = 2^255 - 19 with the
/// default SHA3-512, returned as raw little-endian scalar bytes.
///
/// The reduction is modulo the field prime, not the subgroup order; both
/// sides of the ring protocol use the same function, so verification is
/// unaffected, and the behavior is kept for wire compatibility.
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
  hash_to_scalar_with::<Sha3_512>(data)
}

/// [`hash_to_scalar`] with a caller-chosen digest of any output width.
pub fn hash_to_scalar_with<D: Digest>(data: &[u8]) -> Scalar {
  let digest = D::digest(data);
  Scalar::from_bytes(reduce_le_mod_q(digest.as_slice()))
}

const Q_LIMBS: [u64; 4] = [
  0xffff_ffff_ffff_ffed,
  0xffff_ffff_ffff_ffff,
  0xffff_ffff_ffff_ffff,
  0x7fff_ffff_ffff_ffff,
];

/// Reduces a little-endian integer of any width modulo Q by folding it in
/// 256-bit chunks, most significant first.
fn reduce_le_mod_q(bytes: &[u8]) -> [u8; 32] {
  let mut acc = [0u8; 32];
  for chunk in bytes.chunks(32).rev() {
    let mut wide = [0u8; 64];
    wide[..chunk.len()].copy_from_slice(chunk);
    wide[32..].copy_from_slice(&acc);
    acc = reduce512_mod_q(&wide);
  }
  acc
}

/// Reduces a 512-bit little-endian integer modulo Q = 2^255 - 19.
///
/// Uses 2^256 = 38 (mod Q) to fold the high half, then at most two
/// conditional subtractions of Q. Branch-free in the input value.
fn reduce512_mod_q(wide: &[u8; 64]) -> [u8; 32] {
  let mut limbs = [0u64; 8];
  for (limb, chunk) in limbs.iter_mut().zip(wide.chunks_exact(8)) {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(chunk);
    *limb = u64::from_le_bytes(raw);
  }

  // acc = lo + 38 * hi, at most 2^262.
  let mut acc = [0u64; 4];
  let mut carry: u128 = 0;
  for i in 0..4 {
    let v = carry + limbs[i] as u128 + 38 * limbs[i + 4] as u128;
    acc[i] = v as u64;
    carry = v >> 64;
  }

  // Fold the carry limb back in twice; the second pass absorbs any
  // overflow of the first and always terminates with no carry left.
  let mut extra = carry as u64;
  for _ in 0..2 {
    let mut c: u128 = extra as u128 * 38;
    for limb in acc.iter_mut() {
      let v = *limb as u128 + (c as u64) as u128;
      *limb = v as u64;
      c = (c >> 64) + (v >> 64);
    }
    extra = c as u64;
  }

  // acc < 2^256 < 3Q, so two conditional subtractions reach [0, Q).
  for _ in 0..2 {
    let mut diff = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
      let (d1, b1) = acc[i].overflowing_sub(Q_LIMBS[i]);
      let (d2, b2) = d1.overflowing_sub(borrow);
      diff[i] = d2;
      borrow = (b1 | b2) as u64;
    }
    let keep_diff = borrow.wrapping_sub(1);
    for i in 0..4 {
      acc[i] = (diff[i] & keep_diff) | (acc[i] & !keep_diff);
    }
  }

  let mut out = [0u8; 32];
  for (chunk, limb) in out.chunks_exact_mut(8).zip(acc.iter()) {
    chunk.copy_from_slice(&limb.to_le_bytes());
  }
  out
}
