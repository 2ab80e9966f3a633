//! Fuzz target for public key decoding
//!
//! Feeds arbitrary bytes to the public key decoder, both raw and shaped to
//! the two accepted lengths so the coordinate checks get exercised.
//!
//! # Invariants
//!
//! - Decoding never panics
//! - Any accepted key is a point on the curve
//! - An accepted key re-encodes to the bytes it was decoded from

#![no_main]

use std::sync::{Arc, LazyLock};

use arbitrary::Arbitrary;
use fidelius_crypto::{Curve, Point, decode_public_key, encode_uncompressed, encode_x509};
use libfuzzer_sys::fuzz_target;

static CURVE: LazyLock<Arc<Curve>> = LazyLock::new(|| Arc::new(Curve::bc25519()));

#[derive(Debug, Arbitrary)]
enum KeyInput {
    /// Bytes exactly as given
    Raw(Vec<u8>),
    /// `04 || X || Y` with arbitrary coordinates
    Uncompressed([u8; 32], [u8; 32]),
    /// Correct SPKI header with arbitrary coordinates
    Wrapped([u8; 32], [u8; 32]),
}

impl KeyInput {
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            KeyInput::Raw(bytes) => bytes.clone(),
            KeyInput::Uncompressed(x, y) => [&[0x04][..], x, y].concat(),
            KeyInput::Wrapped(x, y) => [CURVE.spki_prefix(), x, y].concat(),
        }
    }
}

fuzz_target!(|input: KeyInput| {
    let bytes = input.to_bytes();

    let Ok(point) = decode_public_key(&CURVE, &bytes) else {
        return;
    };

    let Point::Affine(affine) = &point else {
        panic!("decoder produced the identity");
    };
    assert!(CURVE.is_point_on_curve(affine.x(), affine.y()), "accepted off-curve point");

    let reencoded = match bytes.len() {
        65 => encode_uncompressed(&point),
        _ => encode_x509(&point),
    };
    assert_eq!(reencoded.ok().as_deref(), Some(bytes.as_slice()), "encoding not canonical");
});
