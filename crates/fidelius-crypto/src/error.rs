//! Error types for the handshake-and-encrypt pipeline

use thiserror::Error;

/// Pipeline stage an error originated from.
///
/// Lets callers tell which step of a request failed without exposing
/// anything that could turn a failed decryption into an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Base64 or other wire decoding of caller input
    Decode,
    /// Range, length and curve-membership checks
    Validate,
    /// HKDF key derivation
    Derive,
    /// AEAD seal/open
    Cipher,
    /// Secure random source
    Entropy,
}

/// Errors from key generation, key agreement, derivation and the AEAD.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A base64 field could not be decoded
    #[error("invalid base64 in {field}")]
    Decode {
        /// Name of the offending request field
        field: &'static str,
        /// Underlying decoder error
        #[source]
        source: base64::DecodeError,
    },

    /// Private scalar is zero or not below the subgroup order
    #[error("private key is outside [1, q-1]")]
    PrivateKeyOutOfRange,

    /// Decoded public key length matches no known encoding
    #[error("unrecognized public key length: {length} bytes")]
    UnrecognizedKeyLength {
        /// Decoded length in bytes
        length: usize,
    },

    /// Public key has a known length but a malformed header
    #[error("malformed public key: {reason}")]
    MalformedPublicKey {
        /// What was wrong with the header
        reason: &'static str,
    },

    /// Coordinates do not satisfy the curve equation
    #[error("point is not on curve {curve}")]
    PointNotOnCurve {
        /// Curve the point was checked against
        curve: String,
    },

    /// Points from two different curves were combined
    #[error("tried to combine points on different curves <{left}> and <{right}>")]
    CurveMismatch {
        /// Curve of the left operand
        left: String,
        /// Curve of the right operand
        right: String,
    },

    /// Curve parameters failed validation at construction
    #[error("invalid curve parameters: {reason}")]
    InvalidCurve {
        /// Which parameter check failed
        reason: &'static str,
    },

    /// No curve registered under the requested name or OID
    #[error("unknown curve: {name}")]
    UnknownCurve {
        /// Name or hex OID that was looked up
        name: String,
    },

    /// Two curves registered under the same name or OID
    #[error("curve {name} is already registered")]
    DuplicateCurve {
        /// Name of the second registration
        name: String,
    },

    /// Nonces are not both exactly the protocol nonce size
    #[error("nonce length mismatch: {left} and {right} bytes, expected {expected}")]
    NonceLengthMismatch {
        /// Length of the first nonce
        left: usize,
        /// Length of the second nonce
        right: usize,
        /// Required length for both
        expected: usize,
    },

    /// Sealed buffer is shorter than the authentication tag
    #[error("ciphertext too short: {length} bytes, need at least {minimum}")]
    CiphertextTooShort {
        /// Decoded ciphertext length
        length: usize,
        /// Tag length
        minimum: usize,
    },

    /// Requested HKDF output exceeds 255 * `HashLen`
    #[error("requested {requested} bytes of key material, maximum is {maximum}")]
    DerivationLength {
        /// Requested output length
        requested: usize,
        /// RFC 5869 ceiling
        maximum: usize,
    },

    /// Derived key has the wrong size for the cipher
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length
        expected: usize,
        /// Actual key length
        actual: usize,
    },

    /// AEAD seal failed
    #[error("encryption failed")]
    EncryptionFailed,

    /// AEAD tag did not verify
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Authenticated plaintext is not valid UTF-8
    #[error("decrypted payload is not valid UTF-8")]
    NonUtf8Plaintext,

    /// Secure random source failed
    #[error("random source failure: {reason}")]
    Entropy {
        /// Description from the random source
        reason: String,
    },
}

impl CryptoError {
    /// Stage of the pipeline this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Decode { .. } | Self::NonUtf8Plaintext => Stage::Decode,

            Self::PrivateKeyOutOfRange
            | Self::UnrecognizedKeyLength { .. }
            | Self::MalformedPublicKey { .. }
            | Self::PointNotOnCurve { .. }
            | Self::CurveMismatch { .. }
            | Self::InvalidCurve { .. }
            | Self::UnknownCurve { .. }
            | Self::DuplicateCurve { .. }
            | Self::NonceLengthMismatch { .. }
            | Self::CiphertextTooShort { .. } => Stage::Validate,

            Self::DerivationLength { .. } => Stage::Derive,

            Self::InvalidKeyLength { .. }
            | Self::EncryptionFailed
            | Self::AuthenticationFailed => Stage::Cipher,

            Self::Entropy { .. } => Stage::Entropy,
        }
    }

    /// Returns true if retrying the same call can succeed.
    ///
    /// Every input is caller-supplied and the pipeline is deterministic, so
    /// only a transient random-source failure qualifies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Entropy { .. })
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::*;

    #[test]
    fn authentication_failure_is_cipher_stage() {
        assert_eq!(CryptoError::AuthenticationFailed.stage(), Stage::Cipher);
    }

    #[test]
    fn decode_error_carries_field_name() {
        let source = STANDARD.decode("not base64!").unwrap_err();
        let err = CryptoError::Decode { field: "senderNonce", source };

        assert_eq!(err.stage(), Stage::Decode);
        assert_eq!(err.to_string(), "invalid base64 in senderNonce");
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = CryptoError::NonceLengthMismatch { left: 31, right: 32, expected: 32 };
        assert_eq!(err.stage(), Stage::Validate);
        assert!(!err.is_retryable());
    }

    #[test]
    fn entropy_failure_is_retryable() {
        let err = CryptoError::Entropy { reason: "unavailable".to_string() };
        assert!(err.is_retryable());
    }

    #[test]
    fn authentication_failure_reveals_nothing() {
        assert_eq!(CryptoError::AuthenticationFailed.to_string(), "authentication failed");
    }

    #[test]
    fn error_display() {
        let err = CryptoError::CiphertextTooShort { length: 3, minimum: 16 };
        assert_eq!(err.to_string(), "ciphertext too short: 3 bytes, need at least 16");
    }
}
