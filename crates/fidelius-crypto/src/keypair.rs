//! Key-pair generation
//!
//! A key pair is a private scalar `d` drawn uniformly from `[1, q-1]` and
//! the public point `dG`. Each generation also produces a fresh, independent
//! 32-byte nonce for the caller's next exchange.

use std::{fmt, sync::Arc};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    config::FideliusConfig,
    curve::{Curve, CurveRegistry},
    encoding::{
        decode_base64, decode_private_key, encode_base64, encode_private_key, encode_uncompressed,
        encode_x509,
    },
    entropy::RandomSource,
    error::CryptoError,
    nonce::NONCE_SIZE,
    point::Point,
};

/// Rejection-sampling budget for drawing a private scalar.
///
/// Each draw succeeds with probability above 1/2 for BC25519, so hitting
/// this limit means the random source is broken.
const MAX_SCALAR_ATTEMPTS: usize = 64;

/// Freshly generated key material, base64-encoded for transport.
///
/// Serializes as `{"privateKey", "publicKey", "x509PublicKey", "nonce"}`.
/// The private key string is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterial {
    /// Private scalar, big-endian, padded to the order width
    pub private_key: String,
    /// Public point, uncompressed `04 || X || Y`
    pub public_key: String,
    /// Public point wrapped in a DER SubjectPublicKeyInfo
    pub x509_public_key: String,
    /// 32 random bytes for the next exchange
    pub nonce: String,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("x509_public_key", &self.x509_public_key)
            .field("nonce", &self.nonce)
            .finish()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Generates key pairs on a fixed curve.
#[derive(Debug, Clone)]
pub struct KeyPairGenerator {
    curve: Arc<Curve>,
}

impl KeyPairGenerator {
    /// Generator for `curve`.
    pub fn new(curve: Arc<Curve>) -> Self {
        Self { curve }
    }

    /// Generator for the curve selected by `config`.
    pub fn from_config(
        registry: &CurveRegistry,
        config: &FideliusConfig,
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(registry.resolve(config)?))
    }

    /// Curve keys are generated on.
    pub fn curve(&self) -> &Arc<Curve> {
        &self.curve
    }

    /// Draw a fresh private scalar and derive its key material.
    ///
    /// # Errors
    ///
    /// - `Entropy`: the random source failed or kept producing out-of-range
    ///   candidates
    pub fn generate<R: RandomSource + ?Sized>(&self, rng: &R) -> Result<KeyMaterial, CryptoError> {
        let scalar = random_scalar(&self.curve, rng)?;
        self.key_material(&scalar, rng)
    }

    /// Derive key material for a caller-supplied private key.
    ///
    /// Only the nonce is random; the key pair is fully determined by
    /// `private_key`.
    ///
    /// # Errors
    ///
    /// - `Decode`: `private_key` is not base64
    /// - `PrivateKeyOutOfRange`: scalar outside `[1, q-1]`
    /// - `Entropy`: nonce generation failed
    pub fn generate_for_private_key<R: RandomSource + ?Sized>(
        &self,
        private_key: &str,
        rng: &R,
    ) -> Result<KeyMaterial, CryptoError> {
        let bytes = Zeroizing::new(decode_base64("privateKey", private_key)?);
        let scalar = decode_private_key(&self.curve, &bytes)?;
        self.key_material(&scalar, rng)
    }

    fn key_material<R: RandomSource + ?Sized>(
        &self,
        scalar: &BigUint,
        rng: &R,
    ) -> Result<KeyMaterial, CryptoError> {
        let public = Point::base(&self.curve).scalar_mul(scalar);
        let private_bytes = encode_private_key(&self.curve, scalar);

        Ok(KeyMaterial {
            private_key: encode_base64(&private_bytes),
            public_key: encode_base64(&encode_uncompressed(&public)?),
            x509_public_key: encode_base64(&encode_x509(&public)?),
            nonce: generate_nonce(rng)?,
        })
    }
}

/// 32 random bytes, base64-encoded.
pub fn generate_nonce<R: RandomSource + ?Sized>(rng: &R) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce)?;
    Ok(encode_base64(&nonce))
}

/// Uniform scalar in `[1, q-1]` by masked rejection sampling.
///
/// Candidates are `scalar_width` random bytes with the bits above the order's
/// bit length cleared, so each draw lands in range with probability
/// `(q - 1) / 2^bits(q)`.
fn random_scalar<R: RandomSource + ?Sized>(
    curve: &Curve,
    rng: &R,
) -> Result<BigUint, CryptoError> {
    let width = curve.scalar_width();
    let excess_bits = width * 8 - curve.order().bits() as usize;
    let top_mask = 0xffu8 >> excess_bits;

    let mut candidate = Zeroizing::new(vec![0u8; width]);
    for _ in 0..MAX_SCALAR_ATTEMPTS {
        rng.fill_bytes(&mut candidate)?;
        candidate[0] &= top_mask;

        let scalar = BigUint::from_bytes_be(&candidate);
        if curve.is_valid_scalar(&scalar) {
            return Ok(scalar);
        }
    }

    Err(CryptoError::Entropy {
        reason: format!("no valid scalar after {MAX_SCALAR_ATTEMPTS} draws"),
    })
}
