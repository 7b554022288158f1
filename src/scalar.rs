//! Arithmetic modulo the order of the Ed25519 prime-order subgroup.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use curve25519_dalek::scalar::Scalar as DalekScalar;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{RingSigError, RingSigResult};

/// Little-endian encoding of the subgroup order
/// L = 2^252 + 27742317777372353535851937790883648493.
pub const ORDER: [u8; 32] = [
  0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2,
  0xde, 0xf9, 0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
  0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// An element of Z/LZ, stored as a 32-byte little-endian integer.
///
/// A scalar built from raw bytes is kept verbatim and may encode a value
/// >= L; every scalar produced by an arithmetic operation is canonical.
/// Raw values survive round-trips through [`Scalar::to_bytes`] untouched,
/// which matters when re-encoding imported signatures. Equality compares
/// the raw bytes in constant time.
#[derive(Clone, Copy, Serialize, Deserialize, Zeroize)]
pub struct Scalar {
  bytes: [u8; 32],
}

impl Scalar {
  pub const ZERO: Scalar = Scalar { bytes: [0u8; 32] };

  pub const ONE: Scalar = Scalar {
    bytes: [
      1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
      0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
  };

  /// Wraps 32 little-endian bytes without reducing them.
  pub fn from_bytes(bytes: [u8; 32]) -> Scalar {
    Scalar { bytes }
  }

  /// Reduces a 64-byte little-endian integer modulo L.
  pub fn from_unreduced(wide: &[u8; 64]) -> Scalar {
    Scalar {
      bytes: DalekScalar::from_bytes_mod_order_wide(wide).to_bytes(),
    }
  }

  /// Samples a uniform scalar from [1, L - 1]. Never returns zero.
  pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
      let candidate = DalekScalar::random(rng);
      if candidate != DalekScalar::ZERO {
        return Scalar {
          bytes: candidate.to_bytes(),
        };
      }
    }
  }

  /// The multiplicative inverse, or [`RingSigError::ZeroInversion`] if the
  /// scalar reduces to zero.
  pub fn invert(&self) -> RingSigResult<Scalar> {
    let reduced = self.reduced();
    if reduced == DalekScalar::ZERO {
      return Err(RingSigError::ZeroInversion);
    }
    Ok(Scalar {
      bytes: reduced.invert().to_bytes(),
    })
  }

  /// Division as multiplication by the inverse; fails when `divisor`
  /// reduces to zero.
  pub fn div(&self, divisor: &Scalar) -> RingSigResult<Scalar> {
    Ok(self * &divisor.invert()?)
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.bytes
  }

  pub fn to_bytes(self) -> [u8; 32] {
    self.bytes
  }

  pub(crate) fn reduced(&self) -> DalekScalar {
    DalekScalar::from_bytes_mod_order(self.bytes)
  }

  pub(crate) fn from_dalek(scalar: DalekScalar) -> Scalar {
    Scalar {
      bytes: scalar.to_bytes(),
    }
  }
}

impl From<u64> for Scalar {
  fn from(n: u64) -> Scalar {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    Scalar { bytes }
  }
}

impl TryFrom<&[u8]> for Scalar {
  type Error = RingSigError;

  fn try_from(bytes: &[u8]) -> RingSigResult<Scalar> {
    let bytes: [u8; 32] =
      bytes.try_into().map_err(|_| RingSigError::InvalidLength {
        expected: 32,
        actual: bytes.len(),
      })?;
    Ok(Scalar { bytes })
  }
}

impl PartialEq for Scalar {
  fn eq(&self, other: &Scalar) -> bool {
    bool::from(self.bytes[..].ct_eq(&other.bytes[..]))
  }
}

impl Eq for Scalar {}

impl fmt::Debug for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Scalar({})", hex::encode(self.bytes))
  }
}

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
  type Output = Scalar;

  fn add(self, rhs: &'b Scalar) -> Scalar {
    Scalar::from_dalek(self.reduced() + rhs.reduced())
  }
}

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
  type Output = Scalar;

  fn sub(self, rhs: &'b Scalar) -> Scalar {
    Scalar::from_dalek(self.reduced() - rhs.reduced())
  }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
  type Output = Scalar;

  fn mul(self, rhs: &'b Scalar) -> Scalar {
    Scalar::from_dalek(self.reduced() * rhs.reduced())
  }
}

impl<'a> Neg for &'a Scalar {
  type Output = Scalar;

  fn neg(self) -> Scalar {
    Scalar::from_dalek(-self.reduced())
  }
}

impl Neg for Scalar {
  type Output = Scalar;

  fn neg(self) -> Scalar {
    -&self
  }
}

define_binop_variants!(Add, add, Scalar, Scalar, Scalar);
define_binop_variants!(Sub, sub, Scalar, Scalar, Scalar);
define_binop_variants!(Mul, mul, Scalar, Scalar, Scalar);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_bytes_survive_round_trips() {
    let mut above_order = ORDER;
    above_order[0] += 1;
    let raw = Scalar::from_bytes(above_order);
    assert_eq!(raw.to_bytes(), above_order);
    assert_eq!(raw, Scalar::from_bytes(above_order));
    assert_ne!(raw, Scalar::ONE);
  }

  #[test]
  fn arithmetic_canonicalizes() {
    let mut above_order = ORDER;
    above_order[0] += 1;
    let raw = Scalar::from_bytes(above_order);
    assert_eq!(&raw + &Scalar::ZERO, Scalar::ONE);
  }
}
