//! Fuzz target for the decryption path
//!
//! Valid keys with arbitrary ciphertext and nonces. Without the sealing key
//! an attacker-chosen payload must never authenticate.
//!
//! # Invariants
//!
//! - Decryption never panics
//! - Arbitrary payloads fail with a decode, validation or authentication
//!   error, never with a plaintext

#![no_main]

use std::sync::{Arc, LazyLock};

use arbitrary::Arbitrary;
use fidelius_crypto::{
    Curve, DecryptionHandler, DecryptionRequest, encoding::encode_base64,
};
use libfuzzer_sys::fuzz_target;

const REQUESTER_PRIVATE_KEY: &str = "DMxHPri8d7IT23KgLk281zZenMfVHSdeamq0RhwlIBk=";
const SENDER_PUBLIC_KEY: &str =
    "BABVt+mpRLMXiQpIfEq6bj8hlXsdtXIxLsspmMgLNI1SR5mHgDVbjHO2A+U4QlMddGzqyEidzm1AkhtSxSO2Ahg=";

static HANDLER: LazyLock<DecryptionHandler> =
    LazyLock::new(|| DecryptionHandler::new(Arc::new(Curve::bc25519())));

#[derive(Debug, Arbitrary)]
struct Envelope {
    ciphertext: Vec<u8>,
    requester_nonce: NonceInput,
    sender_nonce: NonceInput,
}

#[derive(Debug, Arbitrary)]
enum NonceInput {
    Exact([u8; 32]),
    Any(Vec<u8>),
}

impl NonceInput {
    fn encode(&self) -> String {
        match self {
            NonceInput::Exact(bytes) => encode_base64(bytes),
            NonceInput::Any(bytes) => encode_base64(bytes),
        }
    }
}

fuzz_target!(|envelope: Envelope| {
    let result = HANDLER.decrypt(&DecryptionRequest {
        encrypted_data: encode_base64(&envelope.ciphertext),
        requester_nonce: envelope.requester_nonce.encode(),
        sender_nonce: envelope.sender_nonce.encode(),
        requester_private_key: REQUESTER_PRIVATE_KEY.to_string(),
        sender_public_key: SENDER_PUBLIC_KEY.to_string(),
    });

    assert!(result.is_err(), "forged payload authenticated");
});
