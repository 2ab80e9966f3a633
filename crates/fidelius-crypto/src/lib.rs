//! Fidelius Cryptographic Core
//!
//! Pairwise handshake-and-encrypt between two holders of elliptic-curve key
//! pairs. Interoperates byte-for-byte with peers using BC25519 (the short
//! Weierstrass form of Curve25519), HKDF-SHA-256 and AES-256-GCM.
//!
//! # Protocol
//!
//! ```text
//! senderNonce ⊕ requesterNonce
//!        │
//!        ├─ bytes [0, 20)  → salt ─┐
//!        └─ bytes [20, 32) → IV    │
//!                                  ▼
//! ECDH(d_self, Q_peer).x ──► HKDF-SHA-256(salt) → 32-byte key
//!                                  │
//!                                  ▼
//!                   AES-256-GCM(key, IV) → ciphertext || tag
//! ```
//!
//! Both parties compute the same shared point because `a(bG) = b(aG)`, and
//! the same salt and IV because XOR is commutative. The IV is never
//! transmitted.
//!
//! # Boundary
//!
//! All byte-valued inputs and outputs are standard padded base64. Curve and
//! point types are available for callers who need them, but the request
//! handlers in [`exchange`], [`KeyPairGenerator`] and
//! [`compute_shared_secret`] only take and return strings.
//!
//! # Security
//!
//! - Every externally supplied point is checked against the curve equation
//!   before it is multiplied
//! - Private scalars are range-checked to `[1, q-1]`
//! - AEAD failures surface as one generic error, with no partial plaintext
//! - Entropy and derivation failures are returned, never panicked on
//! - Private key material is zeroized when dropped

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod config;
pub mod curve;
pub mod ecdh;
pub mod encoding;
pub mod entropy;
pub mod error;
pub mod exchange;
pub mod kdf;
pub mod keypair;
pub mod nonce;
pub mod point;

pub use cipher::{SymmetricKey, TAG_SIZE, open, seal};
pub use config::FideliusConfig;
pub use curve::{BC25519, Curve, CurveRegistry};
pub use ecdh::{compute_shared_secret, shared_secret_bytes};
pub use encoding::{PublicKeyEncoding, decode_public_key, encode_uncompressed, encode_x509};
pub use entropy::{OsRandom, RandomSource};
pub use error::{CryptoError, Stage};
pub use exchange::{
    DecryptionHandler, DecryptionRequest, DecryptionResponse, EncryptionHandler,
    EncryptionRequest, EncryptionResponse,
};
pub use kdf::derive_key;
pub use keypair::{KeyMaterial, KeyPairGenerator, generate_nonce};
pub use nonce::{IV_SIZE, NONCE_SIZE, SALT_SIZE, SaltAndIv, combine, xor_bytes};
pub use point::{AffinePoint, Point};
