//! Message sealing using AES-256-GCM
//!
//! Output layout is `ciphertext || tag` with a 16-byte tag and no
//! additional authenticated data. The IV comes from the combined nonces and
//! is never generated here.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroize;

use crate::{error::CryptoError, nonce::IV_SIZE};

/// AES-256 key size.
pub const KEY_SIZE: usize = 32;

/// GCM authentication tag size.
pub const TAG_SIZE: usize = 16;

/// A 32-byte AES-256 key, zeroized on drop.
#[derive(Clone)]
pub struct SymmetricKey {
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Wrap a key of exactly [`KEY_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: `bytes` is not 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: bytes.len() }
        })?;
        Ok(Self { key })
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl From<[u8; KEY_SIZE]> for SymmetricKey {
    fn from(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Encrypt `plaintext`, returning `ciphertext || tag`.
///
/// The result is always `plaintext.len() + TAG_SIZE` bytes. Empty
/// plaintext yields just the tag.
///
/// # Errors
///
/// - `EncryptionFailed`: plaintext exceeds the GCM length limit
pub fn seal(
    key: &SymmetricKey,
    iv: &[u8; IV_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher.encrypt(Nonce::from_slice(iv), plaintext).map_err(|_| CryptoError::EncryptionFailed)
}

/// Verify and decrypt `ciphertext || tag`.
///
/// No plaintext is released unless the tag verifies.
///
/// # Errors
///
/// - `CiphertextTooShort`: fewer than [`TAG_SIZE`] bytes
/// - `AuthenticationFailed`: wrong key, wrong IV or tampered data
pub fn open(
    key: &SymmetricKey,
    iv: &[u8; IV_SIZE],
    sealed: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < TAG_SIZE {
        return Err(CryptoError::CiphertextTooShort { length: sealed.len(), minimum: TAG_SIZE });
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher.decrypt(Nonce::from_slice(iv), sealed).map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_key() -> SymmetricKey {
        let bytes =
            hex::decode("c1e1aa56e80509ac195d4baa4d8df060b639f6b1b8b560af6a4e80b884810d97").unwrap();
        SymmetricKey::from_slice(&bytes).unwrap()
    }

    fn reference_iv() -> [u8; IV_SIZE] {
        let bytes = hex::decode("b52a0aa55925693fb77a5f2e").unwrap();
        bytes.try_into().unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = SymmetricKey::from([0x42; KEY_SIZE]);
        let iv = [7u8; IV_SIZE];
        let plaintext = b"Hello, World!";

        let sealed = seal(&key, &iv, plaintext).unwrap();
        assert_eq!(sealed.len(), plaintext.len() + TAG_SIZE);
        assert_eq!(open(&key, &iv, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn seal_matches_known_vector() {
        let sealed = seal(&reference_key(), &reference_iv(), b"Hello, World!").unwrap();

        assert_eq!(
            crate::encoding::encode_base64(&sealed),
            "uDkxVIgAH+k8qf0vkQAf0ML3FhwTfoFSuRRWUH0="
        );
    }

    #[test]
    fn empty_plaintext_is_tag_only() {
        let key = SymmetricKey::from([1; KEY_SIZE]);
        let iv = [0u8; IV_SIZE];

        let sealed = seal(&key, &iv, b"").unwrap();
        assert_eq!(sealed.len(), TAG_SIZE);
        assert!(open(&key, &iv, &sealed).unwrap().is_empty());
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let key = SymmetricKey::from([3; KEY_SIZE]);
        let iv = [9u8; IV_SIZE];
        let mut sealed = seal(&key, &iv, b"attack at dawn").unwrap();

        sealed[0] ^= 0x01;
        assert!(matches!(open(&key, &iv, &sealed), Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn tampered_tag_rejected() {
        let key = SymmetricKey::from([3; KEY_SIZE]);
        let iv = [9u8; IV_SIZE];
        let mut sealed = seal(&key, &iv, b"attack at dawn").unwrap();

        let last = sealed.len() - 1;
        sealed[last] ^= 0x80;
        assert!(matches!(open(&key, &iv, &sealed), Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn wrong_key_rejected() {
        let iv = [0u8; IV_SIZE];
        let sealed = seal(&SymmetricKey::from([1; KEY_SIZE]), &iv, b"secret").unwrap();

        let result = open(&SymmetricKey::from([2; KEY_SIZE]), &iv, &sealed);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn wrong_iv_rejected() {
        let key = SymmetricKey::from([1; KEY_SIZE]);
        let sealed = seal(&key, &[0u8; IV_SIZE], b"secret").unwrap();

        let result = open(&key, &[1u8; IV_SIZE], &sealed);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn short_ciphertext_rejected() {
        let key = SymmetricKey::from([1; KEY_SIZE]);
        let result = open(&key, &[0u8; IV_SIZE], &[0u8; TAG_SIZE - 1]);

        assert!(matches!(
            result,
            Err(CryptoError::CiphertextTooShort { length: 15, minimum: TAG_SIZE })
        ));
    }

    #[test]
    fn key_length_checked() {
        assert!(matches!(
            SymmetricKey::from_slice(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", SymmetricKey::from([0xaa; KEY_SIZE]));
        assert!(!rendered.contains("170"));
        assert!(rendered.contains("redacted"));
    }
}
