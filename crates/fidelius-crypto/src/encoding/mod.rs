//! Wire encodings for scalars, points and byte fields
//!
//! All byte-valued fields cross the API boundary as standard, padded
//! base64. Public keys come in two encodings, told apart purely by their
//! decoded length (`w` is the curve's field width in bytes):
//!
//! | Encoding                        | Layout                        | Length        |
//! |---------------------------------|-------------------------------|---------------|
//! | [`PublicKeyEncoding::Uncompressed`] | `04 \|\| X \|\| Y`            | `1 + 2w`      |
//! | [`PublicKeyEncoding::X509`]         | `spki_prefix \|\| X \|\| Y`   | `prefix + 2w` |
//!
//! For BC25519 that is 65 and 309 bytes. If a future curve made the two
//! lengths collide, [`PublicKeyEncoding::detect`] is the single place that
//! would have to change.

pub mod spki;

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::{curve::Curve, error::CryptoError, point::Point};

/// Marker byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_MARKER: u8 = 0x04;

/// Public-key encodings accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyEncoding {
    /// `04 || X || Y`
    Uncompressed,
    /// DER SubjectPublicKeyInfo with explicit curve parameters
    X509,
}

impl PublicKeyEncoding {
    /// Pick the encoding from a decoded key length.
    pub fn detect(curve: &Curve, length: usize) -> Option<Self> {
        let coordinates = 2 * curve.field_width();
        if length == 1 + coordinates {
            Some(Self::Uncompressed)
        } else if length == curve.spki_prefix().len() + coordinates {
            Some(Self::X509)
        } else {
            None
        }
    }
}

/// Decode a standard base64 field, naming it in the error.
pub fn decode_base64(field: &'static str, data: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD.decode(data).map_err(|source| CryptoError::Decode { field, source })
}

/// Encode bytes as standard, padded base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Big-endian bytes of `value`, left-padded with zeros to `width`.
///
/// Values wider than `width` are returned unpadded; callers only pass
/// values reduced below a modulus of that width.
pub(crate) fn to_fixed_width(value: &BigUint, width: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= width {
        return bytes;
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Parse a public key in either accepted encoding into a validated point.
///
/// # Errors
///
/// - `UnrecognizedKeyLength`: length matches no row of the table above
/// - `MalformedPublicKey`: missing `04` marker or wrong SPKI header
/// - `PointNotOnCurve`: coordinates fail the curve equation
pub fn decode_public_key(curve: &Arc<Curve>, bytes: &[u8]) -> Result<Point, CryptoError> {
    let encoding = PublicKeyEncoding::detect(curve, bytes.len())
        .ok_or(CryptoError::UnrecognizedKeyLength { length: bytes.len() })?;

    let coordinates = match encoding {
        PublicKeyEncoding::Uncompressed => match bytes.split_first() {
            Some((&UNCOMPRESSED_MARKER, rest)) => rest,
            _ => return Err(CryptoError::MalformedPublicKey { reason: "missing 0x04 marker" }),
        },
        PublicKeyEncoding::X509 => bytes
            .strip_prefix(curve.spki_prefix())
            .ok_or(CryptoError::MalformedPublicKey { reason: "SPKI header does not match curve" })?,
    };
    tracing::debug!(curve = curve.name(), ?encoding, "decoded public key");

    let (x, y) = coordinates.split_at(curve.field_width());
    Point::new(BigUint::from_bytes_be(x), BigUint::from_bytes_be(y), curve)
}

/// `04 || X || Y` with fixed-width coordinates.
///
/// # Errors
///
/// - `MalformedPublicKey`: the identity has no affine encoding
pub fn encode_uncompressed(point: &Point) -> Result<Vec<u8>, CryptoError> {
    let (x, y, curve) = affine_parts(point)?;
    let width = curve.field_width();

    let mut out = Vec::with_capacity(1 + 2 * width);
    out.push(UNCOMPRESSED_MARKER);
    out.extend_from_slice(&to_fixed_width(x, width));
    out.extend_from_slice(&to_fixed_width(y, width));
    Ok(out)
}

/// SubjectPublicKeyInfo wrapping of the same coordinates.
///
/// # Errors
///
/// - `MalformedPublicKey`: the identity has no affine encoding
pub fn encode_x509(point: &Point) -> Result<Vec<u8>, CryptoError> {
    let (x, y, curve) = affine_parts(point)?;
    let width = curve.field_width();

    let mut out = Vec::with_capacity(curve.spki_prefix().len() + 2 * width);
    out.extend_from_slice(curve.spki_prefix());
    out.extend_from_slice(&to_fixed_width(x, width));
    out.extend_from_slice(&to_fixed_width(y, width));
    Ok(out)
}

fn affine_parts(point: &Point) -> Result<(&BigUint, &BigUint, &Arc<Curve>), CryptoError> {
    match point {
        Point::Affine(affine) => Ok((affine.x(), affine.y(), affine.curve())),
        Point::Identity => {
            Err(CryptoError::MalformedPublicKey { reason: "point at infinity has no encoding" })
        }
    }
}

/// Interpret big-endian bytes as a private scalar in `[1, q-1]`.
///
/// Any byte length is accepted; only the numeric range matters.
pub fn decode_private_key(curve: &Curve, bytes: &[u8]) -> Result<BigUint, CryptoError> {
    let scalar = BigUint::from_bytes_be(bytes);
    if !curve.is_valid_scalar(&scalar) {
        return Err(CryptoError::PrivateKeyOutOfRange);
    }
    Ok(scalar)
}

/// Private scalar as big-endian bytes padded to the order width.
pub fn encode_private_key(curve: &Curve, scalar: &BigUint) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(to_fixed_width(scalar, curve.scalar_width()))
}
