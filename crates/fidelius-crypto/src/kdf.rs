//! Key derivation using HKDF-SHA-256 (RFC 5869)
//!
//! The shared secret is stretched with the 20-byte salt taken from the
//! combined nonces. No `info` context is mixed in.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// SHA-256 output size.
const HASH_LEN: usize = 32;

/// RFC 5869 ceiling on HKDF output: 255 blocks of `HashLen`.
pub const MAX_OUTPUT_LEN: usize = 255 * HASH_LEN;

/// Derive `output_length` bytes of key material.
///
/// Extract: `PRK = HMAC(salt, secret)`. Expand: `T(i) = HMAC(PRK, T(i-1) ||
/// i)` from `T(0) = ""`, concatenated and truncated to `output_length`.
///
/// # Errors
///
/// - `DerivationLength`: `output_length` exceeds [`MAX_OUTPUT_LEN`]
pub fn derive_key(
    salt: &[u8],
    secret: &[u8],
    output_length: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let too_long =
        || CryptoError::DerivationLength { requested: output_length, maximum: MAX_OUTPUT_LEN };
    if output_length > MAX_OUTPUT_LEN {
        return Err(too_long());
    }

    let hkdf = Hkdf::<Sha256>::new(Some(salt), secret);
    let mut okm = Zeroizing::new(vec![0u8; output_length]);
    hkdf.expand(&[], &mut okm).map_err(|_| too_long())?;

    Ok(okm)
}
