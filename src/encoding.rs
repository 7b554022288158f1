//! DER and PEM encoding of ring signatures.
//!
//! A signature serializes as an ASN.1 SEQUENCE of an algorithm identifier
//! followed by the key image, ring, challenge and response lists, each
//! element a 32-byte OCTET STRING. The identifier follows Recommendation
//! ITU-T X.667: the arc `2.25` with the 16 bytes of the UUID
//! `3b5e61af-c4ec-496e-95e9-4b64bccdc809` appended as individual
//! sub-identifiers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use der::asn1::{ObjectIdentifier, OctetString};
use der::{Decode, Encode, Sequence};
use log::debug;

use crate::point::Point;
use crate::ring::RingSignature;
use crate::scalar::Scalar;
use crate::{RingSigError, RingSigResult};

const PEM_OPENING: &str = "-----BEGIN RING SIGNATURE-----";
const PEM_CLOSING: &str = "-----END RING SIGNATURE-----";
const PEM_WIDTH: usize = 64;

const ALGORITHM_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap(
  "2.25.59.94.97.175.196.236.73.110.149.233.75.100.188.205.200.9",
);

#[derive(Sequence)]
struct RingSignatureDer {
  algorithm: ObjectIdentifier,
  key_image: OctetString,
  public_keys: Vec<OctetString>,
  c: Vec<OctetString>,
  r: Vec<OctetString>,
}

/// Exports a ring signature as a PEM block with the DER body base64-wrapped
/// at 64 columns. No validation is performed on the signature itself.
pub fn export_pem(signature: &RingSignature) -> RingSigResult<String> {
  let der = RingSignatureDer {
    algorithm: ALGORITHM_OID,
    key_image: OctetString::new(signature.key_image.as_bytes().to_vec())?,
    public_keys: octet_strings(signature.public_keys.iter().map(Point::as_bytes))?,
    c: octet_strings(signature.c.iter().map(Scalar::as_bytes))?,
    r: octet_strings(signature.r.iter().map(Scalar::as_bytes))?,
  }
  .to_der()?;

  let body = BASE64.encode(&der);
  let mut pem =
    String::with_capacity(PEM_OPENING.len() + PEM_CLOSING.len() + body.len() + body.len() / PEM_WIDTH + 2);
  pem.push_str(PEM_OPENING);
  let mut rest = body.as_str();
  while !rest.is_empty() {
    let (line, tail) = rest.split_at(rest.len().min(PEM_WIDTH));
    pem.push('\n');
    pem.push_str(line);
    rest = tail;
  }
  pem.push('\n');
  pem.push_str(PEM_CLOSING);
  Ok(pem)
}

/// Parses a PEM block produced by [`export_pem`].
///
/// Rejects mismatched markers, non-whitespace outside the markers, invalid
/// base64, trailing bytes after the DER structure, an unknown algorithm
/// identifier, octet strings that are not 32 bytes, and rings whose
/// component lists disagree in length or are empty.
pub fn import_pem(pem: &str) -> RingSigResult<RingSignature> {
  let trimmed = pem.trim();
  if trimmed.len() < PEM_OPENING.len() + PEM_CLOSING.len()
    || !trimmed.starts_with(PEM_OPENING)
    || !trimmed.ends_with(PEM_CLOSING)
  {
    return Err(RingSigError::InvalidEncapsulation);
  }
  let body: String = trimmed[PEM_OPENING.len()..trimmed.len() - PEM_CLOSING.len()]
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();

  let der = BASE64.decode(body.as_bytes())?;
  let decoded = RingSignatureDer::from_der(&der)?;
  if decoded.algorithm != ALGORITHM_OID {
    return Err(RingSigError::UnknownAlgorithm);
  }

  let key_image = Point::try_from(decoded.key_image.as_bytes())?;
  let public_keys = decoded
    .public_keys
    .iter()
    .map(|bytes| Point::try_from(bytes.as_bytes()))
    .collect::<RingSigResult<Vec<Point>>>()?;
  let c = decoded
    .c
    .iter()
    .map(|bytes| Scalar::try_from(bytes.as_bytes()))
    .collect::<RingSigResult<Vec<Scalar>>>()?;
  let r = decoded
    .r
    .iter()
    .map(|bytes| Scalar::try_from(bytes.as_bytes()))
    .collect::<RingSigResult<Vec<Scalar>>>()?;

  if public_keys.is_empty() {
    return Err(RingSigError::EmptyRing);
  }
  if c.len() != r.len() || c.len() != public_keys.len() {
    return Err(RingSigError::MismatchedRing);
  }

  debug!(
    "imported ring signature with {} members, key image {}",
    public_keys.len(),
    hex::encode(key_image.as_bytes())
  );

  Ok(RingSignature {
    public_keys,
    key_image,
    c,
    r,
  })
}

fn octet_strings<'a, I>(items: I) -> RingSigResult<Vec<OctetString>>
where
  I: Iterator<Item = &'a [u8; 32]>,
{
  items
    .map(|bytes| OctetString::new(bytes.to_vec()).map_err(RingSigError::from))
    .collect()
}
