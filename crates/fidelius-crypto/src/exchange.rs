//! Encrypt and decrypt requests between two key holders
//!
//! The sender seals a string for the requester; the requester opens it.
//! Each side contributes a nonce and both sides see both nonces, so the
//! salt and IV never travel with the ciphertext.
//!
//! ```text
//! sender:    combine(nS, nR) ─┐
//!            ECDH(dS, QR) ────┼─> HKDF ─> AES-256-GCM seal
//! requester: combine(nR, nS) ─┐
//!            ECDH(dR, QS) ────┼─> HKDF ─> AES-256-GCM open
//! ```

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    cipher::{self, KEY_SIZE, SymmetricKey},
    config::FideliusConfig,
    curve::{Curve, CurveRegistry},
    ecdh::shared_secret_bytes,
    encoding::{decode_base64, encode_base64},
    error::CryptoError,
    kdf::derive_key,
    nonce::{self, SaltAndIv},
};

/// Request to seal a string for a peer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionRequest {
    /// UTF-8 payload
    pub string_to_encrypt: String,
    /// Sender's 32-byte nonce, base64
    pub sender_nonce: String,
    /// Requester's 32-byte nonce, base64
    pub requester_nonce: String,
    /// Sender's private scalar, base64
    pub sender_private_key: String,
    /// Requester's public key in either accepted encoding, base64
    pub requester_public_key: String,
}

/// Sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionResponse {
    /// `ciphertext || tag`, base64
    pub encrypted_data: String,
}

/// Request to open a payload sealed by a peer.
///
/// Roles are the mirror of [`EncryptionRequest`]: the private key is the
/// requester's and the public key is the sender's.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    /// `ciphertext || tag`, base64
    pub encrypted_data: String,
    /// Requester's 32-byte nonce, base64
    pub requester_nonce: String,
    /// Sender's 32-byte nonce, base64
    pub sender_nonce: String,
    /// Requester's private scalar, base64
    pub requester_private_key: String,
    /// Sender's public key in either accepted encoding, base64
    pub sender_public_key: String,
}

/// Opened payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionResponse {
    /// Authenticated UTF-8 plaintext
    pub decrypted_data: String,
}

impl fmt::Debug for EncryptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionRequest")
            .field("string_to_encrypt", &format_args!("<{} bytes>", self.string_to_encrypt.len()))
            .field("sender_nonce", &self.sender_nonce)
            .field("requester_nonce", &self.requester_nonce)
            .field("sender_private_key", &"<redacted>")
            .field("requester_public_key", &self.requester_public_key)
            .finish()
    }
}

impl fmt::Debug for DecryptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionRequest")
            .field("encrypted_data", &self.encrypted_data)
            .field("requester_nonce", &self.requester_nonce)
            .field("sender_nonce", &self.sender_nonce)
            .field("requester_private_key", &"<redacted>")
            .field("sender_public_key", &self.sender_public_key)
            .finish()
    }
}

impl Drop for EncryptionRequest {
    fn drop(&mut self) {
        self.sender_private_key.zeroize();
    }
}

impl Drop for DecryptionRequest {
    fn drop(&mut self) {
        self.requester_private_key.zeroize();
    }
}

/// Seals strings for a peer.
#[derive(Debug, Clone)]
pub struct EncryptionHandler {
    curve: Arc<Curve>,
}

impl EncryptionHandler {
    /// Handler operating on `curve`.
    pub fn new(curve: Arc<Curve>) -> Self {
        Self { curve }
    }

    /// Handler for the curve selected by `config`.
    pub fn from_config(
        registry: &CurveRegistry,
        config: &FideliusConfig,
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(registry.resolve(config)?))
    }

    /// Seal `request.string_to_encrypt` for the requester.
    ///
    /// # Errors
    ///
    /// - `Decode`: any base64 field is malformed
    /// - `NonceLengthMismatch`: a nonce is not 32 bytes
    /// - Any ECDH validation error for the key pair
    /// - `EncryptionFailed`: plaintext exceeds the GCM limit
    pub fn encrypt(&self, request: &EncryptionRequest) -> Result<EncryptionResponse, CryptoError> {
        let sender_nonce = decode_base64("senderNonce", &request.sender_nonce)?;
        let requester_nonce = decode_base64("requesterNonce", &request.requester_nonce)?;
        let SaltAndIv { salt, iv } = nonce::combine(&sender_nonce, &requester_nonce)?;

        let private_key =
            Zeroizing::new(decode_base64("senderPrivateKey", &request.sender_private_key)?);
        let public_key = decode_base64("requesterPublicKey", &request.requester_public_key)?;
        let key = session_key(&self.curve, &salt, &private_key, &public_key)?;

        let sealed = cipher::seal(&key, &iv, request.string_to_encrypt.as_bytes())?;
        tracing::debug!(
            curve = self.curve.name(),
            plaintext_len = request.string_to_encrypt.len(),
            sealed_len = sealed.len(),
            "sealed payload"
        );

        Ok(EncryptionResponse { encrypted_data: encode_base64(&sealed) })
    }
}

/// Opens payloads sealed by a peer.
#[derive(Debug, Clone)]
pub struct DecryptionHandler {
    curve: Arc<Curve>,
}

impl DecryptionHandler {
    /// Handler operating on `curve`.
    pub fn new(curve: Arc<Curve>) -> Self {
        Self { curve }
    }

    /// Handler for the curve selected by `config`.
    pub fn from_config(
        registry: &CurveRegistry,
        config: &FideliusConfig,
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(registry.resolve(config)?))
    }

    /// Authenticate and decrypt `request.encrypted_data`.
    ///
    /// # Errors
    ///
    /// - `Decode`: any base64 field is malformed
    /// - `NonceLengthMismatch`: a nonce is not 32 bytes
    /// - Any ECDH validation error for the key pair
    /// - `CiphertextTooShort`: payload shorter than the tag
    /// - `AuthenticationFailed`: wrong keys, swapped roles or tampering
    /// - `NonUtf8Plaintext`: authenticated payload is not UTF-8
    pub fn decrypt(&self, request: &DecryptionRequest) -> Result<DecryptionResponse, CryptoError> {
        let sealed = decode_base64("encryptedData", &request.encrypted_data)?;
        let requester_nonce = decode_base64("requesterNonce", &request.requester_nonce)?;
        let sender_nonce = decode_base64("senderNonce", &request.sender_nonce)?;
        let SaltAndIv { salt, iv } = nonce::combine(&requester_nonce, &sender_nonce)?;

        let private_key =
            Zeroizing::new(decode_base64("requesterPrivateKey", &request.requester_private_key)?);
        let public_key = decode_base64("senderPublicKey", &request.sender_public_key)?;
        let key = session_key(&self.curve, &salt, &private_key, &public_key)?;

        let plaintext = cipher::open(&key, &iv, &sealed).inspect_err(|err| {
            tracing::warn!(curve = self.curve.name(), sealed_len = sealed.len(), %err, "open failed");
        })?;
        tracing::debug!(curve = self.curve.name(), plaintext_len = plaintext.len(), "opened payload");

        let decrypted_data =
            String::from_utf8(plaintext).map_err(|_| CryptoError::NonUtf8Plaintext)?;
        Ok(DecryptionResponse { decrypted_data })
    }
}

/// ECDH followed by HKDF down to an AES-256 key.
fn session_key(
    curve: &Arc<Curve>,
    salt: &[u8],
    private_key: &[u8],
    public_key: &[u8],
) -> Result<SymmetricKey, CryptoError> {
    let secret = shared_secret_bytes(curve, private_key, public_key)?;
    let derived = derive_key(salt, &secret, KEY_SIZE)?;
    SymmetricKey::from_slice(&derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entropy::OsRandom, keypair::KeyPairGenerator};

    const ENCRYPTED_DATA: &str = "pzMvVZNNVtJzqPkkxcCbBUWgDEBy/mBXIeT2dJWI16ZAQnnXUb9lI+S4k8XK6mgZSKKSRIHkcNvJpllnBg548wUgavBa0vCRRwdL6kY6Yw==";
    const REQUESTER_NONCE: &str = "6uj1RdDUbcpI3lVMZvijkMC8Te20O4Bcyz0SyivX8Eg=";
    const SENDER_NONCE: &str = "lmXgblZwotx+DfBgKJF0lZXtAXgBEYr5khh79Zytr2Y=";
    const REQUESTER_PRIVATE_KEY: &str = "DMxHPri8d7IT23KgLk281zZenMfVHSdeamq0RhwlIBk=";
    const SENDER_PUBLIC_KEY: &str =
        "BABVt+mpRLMXiQpIfEq6bj8hlXsdtXIxLsspmMgLNI1SR5mHgDVbjHO2A+U4QlMddGzqyEidzm1AkhtSxSO2Ahg=";

    fn curve() -> Arc<Curve> {
        Arc::new(Curve::bc25519())
    }

    fn reference_request() -> DecryptionRequest {
        DecryptionRequest {
            encrypted_data: ENCRYPTED_DATA.to_string(),
            requester_nonce: REQUESTER_NONCE.to_string(),
            sender_nonce: SENDER_NONCE.to_string(),
            requester_private_key: REQUESTER_PRIVATE_KEY.to_string(),
            sender_public_key: SENDER_PUBLIC_KEY.to_string(),
        }
    }

    #[test]
    fn decrypts_reference_payload() {
        let response = DecryptionHandler::new(curve()).decrypt(&reference_request()).unwrap();
        assert_eq!(
            response.decrypted_data,
            "Wormtail should never have been Potter cottage's secret keeper."
        );
    }

    #[test]
    fn swapped_nonce_roles_still_decrypt() {
        // XOR is commutative, so nonce order does not affect salt or IV
        let mut request = reference_request();
        std::mem::swap(&mut request.requester_nonce, &mut request.sender_nonce);

        assert!(DecryptionHandler::new(curve()).decrypt(&request).is_ok());
    }

    #[test]
    fn roundtrip_between_generated_parties() {
        let curve = curve();
        let generator = KeyPairGenerator::new(Arc::clone(&curve));
        let sender = generator.generate(&OsRandom).unwrap();
        let requester = generator.generate(&OsRandom).unwrap();

        let sealed = EncryptionHandler::new(Arc::clone(&curve))
            .encrypt(&EncryptionRequest {
                string_to_encrypt: "Hello, World!".to_string(),
                sender_nonce: sender.nonce.clone(),
                requester_nonce: requester.nonce.clone(),
                sender_private_key: sender.private_key.clone(),
                requester_public_key: requester.x509_public_key.clone(),
            })
            .unwrap();

        let opened = DecryptionHandler::new(curve)
            .decrypt(&DecryptionRequest {
                encrypted_data: sealed.encrypted_data,
                requester_nonce: requester.nonce.clone(),
                sender_nonce: sender.nonce.clone(),
                requester_private_key: requester.private_key.clone(),
                sender_public_key: sender.public_key.clone(),
            })
            .unwrap();

        assert_eq!(opened.decrypted_data, "Hello, World!");
    }

    // ECDH(21, G) has a 31-byte X coordinate. Sealed under HKDF of those 31
    // bytes with nonces 0x11.. and 0x22..
    const SHORT_SECRET_PRIVATE_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABU=";
    const BASE_POINT_PUBLIC_KEY: &str =
        "BCqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqrSRaIK4ZobighrTgHt0sd0jRTJI9TX5tfGGyKenFon7O09k=";
    const SHORT_SECRET_SEALED: &str = "ewSA5l8SegInmnl2dQ3D6rZevnqj7jGvSMy03Dw=";
    const NONCE_11: &str = "ERERERERERERERERERERERERERERERERERERERERERE=";
    const NONCE_22: &str = "IiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiI=";

    #[test]
    fn short_shared_secret_derives_from_unpadded_bytes() {
        let opened = DecryptionHandler::new(curve())
            .decrypt(&DecryptionRequest {
                encrypted_data: SHORT_SECRET_SEALED.to_string(),
                requester_nonce: NONCE_22.to_string(),
                sender_nonce: NONCE_11.to_string(),
                requester_private_key: SHORT_SECRET_PRIVATE_KEY.to_string(),
                sender_public_key: BASE_POINT_PUBLIC_KEY.to_string(),
            })
            .unwrap();
        assert_eq!(opened.decrypted_data, "Hello, World!");

        let sealed = EncryptionHandler::new(curve())
            .encrypt(&EncryptionRequest {
                string_to_encrypt: "Hello, World!".to_string(),
                sender_nonce: NONCE_11.to_string(),
                requester_nonce: NONCE_22.to_string(),
                sender_private_key: SHORT_SECRET_PRIVATE_KEY.to_string(),
                requester_public_key: BASE_POINT_PUBLIC_KEY.to_string(),
            })
            .unwrap();
        assert_eq!(sealed.encrypted_data, SHORT_SECRET_SEALED);
    }

    #[test]
    fn tampered_payload_fails_authentication() {
        let mut sealed = decode_base64("encryptedData", ENCRYPTED_DATA).unwrap();
        sealed[3] ^= 0x10;

        let mut request = reference_request();
        request.encrypted_data = encode_base64(&sealed);

        let result = DecryptionHandler::new(curve()).decrypt(&request);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn wrong_nonce_fails_authentication() {
        let mut request = reference_request();
        request.sender_nonce = encode_base64(&[0u8; 32]);

        let result = DecryptionHandler::new(curve()).decrypt(&request);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn short_nonce_rejected() {
        let mut request = reference_request();
        request.requester_nonce = encode_base64(&[0u8; 16]);

        let result = DecryptionHandler::new(curve()).decrypt(&request);
        assert!(matches!(
            result,
            Err(CryptoError::NonceLengthMismatch { left: 16, right: 32, expected: 32 })
        ));
    }

    #[test]
    fn short_ciphertext_rejected() {
        let mut request = reference_request();
        request.encrypted_data = encode_base64(&[0u8; 8]);

        let result = DecryptionHandler::new(curve()).decrypt(&request);
        assert!(matches!(result, Err(CryptoError::CiphertextTooShort { length: 8, .. })));
    }

    #[test]
    fn non_utf8_plaintext_reported_after_authentication() {
        let curve = curve();
        let requester_private = decode_base64("k", REQUESTER_PRIVATE_KEY).unwrap();
        let sender_public = decode_base64("k", SENDER_PUBLIC_KEY).unwrap();
        let requester_nonce = decode_base64("n", REQUESTER_NONCE).unwrap();
        let sender_nonce = decode_base64("n", SENDER_NONCE).unwrap();

        let SaltAndIv { salt, iv } = nonce::combine(&sender_nonce, &requester_nonce).unwrap();
        let key = session_key(&curve, &salt, &requester_private, &sender_public).unwrap();
        let sealed = cipher::seal(&key, &iv, &[0xff, 0xfe, 0xfd]).unwrap();

        let mut request = reference_request();
        request.encrypted_data = encode_base64(&sealed);

        let result = DecryptionHandler::new(curve).decrypt(&request);
        assert!(matches!(result, Err(CryptoError::NonUtf8Plaintext)));
    }

    #[test]
    fn requests_use_camel_case_json() {
        let request: EncryptionRequest = serde_json::from_str(
            r#"{
                "stringToEncrypt": "hi",
                "senderNonce": "a",
                "requesterNonce": "b",
                "senderPrivateKey": "c",
                "requesterPublicKey": "d"
            }"#,
        )
        .unwrap();
        assert_eq!(request.string_to_encrypt, "hi");
        assert_eq!(request.requester_public_key, "d");

        let response = serde_json::to_value(DecryptionResponse { decrypted_data: "x".into() }).unwrap();
        assert_eq!(response, serde_json::json!({ "decryptedData": "x" }));
    }

    #[test]
    fn debug_redacts_private_keys() {
        let rendered = format!("{:?}", reference_request());
        assert!(!rendered.contains(REQUESTER_PRIVATE_KEY));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn handler_from_default_config() {
        let handler =
            DecryptionHandler::from_config(&CurveRegistry::default(), &FideliusConfig::default())
                .unwrap();
        assert!(handler.decrypt(&reference_request()).is_ok());
    }
}
