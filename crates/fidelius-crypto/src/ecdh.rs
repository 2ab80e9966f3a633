//! Elliptic-curve Diffie-Hellman
//!
//! The shared secret is the X coordinate of `d_local * Q_peer` as minimal
//! big-endian bytes, with leading zero bytes stripped. Peers feed exactly
//! those bytes to HKDF, so about one secret in 256 is shorter than the
//! field width. Both sides arrive at the same point because scalar
//! multiplication commutes: `a(bG) = b(aG)`.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::{
    curve::Curve,
    encoding::{decode_base64, decode_private_key, decode_public_key, encode_base64},
    error::CryptoError,
};

/// Compute the base64 shared secret from a base64 private key and a base64
/// public key in either accepted encoding.
///
/// # Errors
///
/// - `Decode`: either argument is not base64
/// - `PrivateKeyOutOfRange`: scalar outside `[1, q-1]`
/// - `UnrecognizedKeyLength`, `MalformedPublicKey`, `PointNotOnCurve`:
///   the public key does not decode to a curve point
/// - `MalformedPublicKey`: the product is the point at infinity
pub fn compute_shared_secret(
    curve: &Arc<Curve>,
    private_key: &str,
    public_key: &str,
) -> Result<String, CryptoError> {
    let private_bytes = Zeroizing::new(decode_base64("privateKey", private_key)?);
    let public_bytes = decode_base64("publicKey", public_key)?;
    let secret = shared_secret_bytes(curve, &private_bytes, &public_bytes)?;
    Ok(encode_base64(&secret))
}

/// Raw shared secret from raw private and public key bytes.
///
/// The peer point is validated against the curve before any
/// multiplication happens. The result is not padded: an X coordinate below
/// `2^248` yields fewer than 32 bytes.
///
/// # Errors
///
/// Same as [`compute_shared_secret`], minus base64 decoding.
pub fn shared_secret_bytes(
    curve: &Arc<Curve>,
    private_key: &[u8],
    public_key: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let scalar = decode_private_key(curve, private_key)?;
    let peer = decode_public_key(curve, public_key)?;

    // A peer point with a small-order component can land on the identity
    let shared = peer.scalar_mul(&scalar);
    let Some(x) = shared.x() else {
        return Err(CryptoError::MalformedPublicKey { reason: "shared point is at infinity" });
    };

    Ok(Zeroizing::new(x.to_bytes_be()))
}
