//! DER header for the wrapped (X.509 SubjectPublicKeyInfo) public key
//!
//! The wrapped encoding spells out the curve with explicit `ECParameters`
//! instead of a named-curve OID:
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm SEQUENCE {
//!         id-ecPublicKey OBJECT IDENTIFIER,
//!         ECParameters SEQUENCE {
//!             version INTEGER (1),
//!             fieldID SEQUENCE { prime-field OBJECT IDENTIFIER, p INTEGER },
//!             curve SEQUENCE { a OCTET STRING, b OCTET STRING },
//!             base OCTET STRING (04 || Gx || Gy),
//!             order INTEGER,
//!             cofactor INTEGER } },
//!     subjectPublicKey BIT STRING (00 || 04 || X || Y) }
//! ```
//!
//! Everything up to and including the `04` marker depends only on the
//! curve, so it is computed once per curve and stored as a prefix.

use num_bigint::BigUint;

use super::to_fixed_width;
use crate::curve::Curve;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

/// 1.2.840.10045.2.1
const ID_EC_PUBLIC_KEY: [u8; 7] = [0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];

/// 1.2.840.10045.1.1
const PRIME_FIELD: [u8; 7] = [0x2a, 0x86, 0x48, 0xce, 0x3d, 0x01, 0x01];

const UNCOMPRESSED: u8 = 0x04;

/// Compute the SubjectPublicKeyInfo header for `curve`.
///
/// The returned bytes followed by the fixed-width `X || Y` coordinates form
/// a complete DER document.
pub(crate) fn prefix(curve: &Curve) -> Vec<u8> {
    let width = curve.field_width();
    let (gx, gy) = curve.base_point();

    let mut base = Vec::with_capacity(1 + 2 * width);
    base.push(UNCOMPRESSED);
    base.extend_from_slice(&to_fixed_width(gx, width));
    base.extend_from_slice(&to_fixed_width(gy, width));

    let parameters = sequence(&[
        integer(&BigUint::from(1u8)),
        sequence(&[tlv(TAG_OID, &PRIME_FIELD), integer(curve.p())]),
        sequence(&[
            tlv(TAG_OCTET_STRING, &to_fixed_width(curve.a(), width)),
            tlv(TAG_OCTET_STRING, &to_fixed_width(curve.b(), width)),
        ]),
        tlv(TAG_OCTET_STRING, &base),
        integer(curve.order()),
        integer(&BigUint::from(curve.cofactor())),
    ]);
    let algorithm = sequence(&[tlv(TAG_OID, &ID_EC_PUBLIC_KEY), parameters]);

    // Encode with an all-zero point, then cut the coordinates off.
    let mut key_bits = vec![0u8; 2 + 2 * width];
    key_bits[1] = UNCOMPRESSED;
    let mut document = sequence(&[algorithm, tlv(TAG_BIT_STRING, &key_bits)]);
    document.truncate(document.len() - 2 * width);
    document
}

fn sequence(items: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &items.concat())
}

/// Unsigned INTEGER, with a leading zero when the high bit is set.
fn integer(value: &BigUint) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    tlv(TAG_INTEGER, &bytes)
}

fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 4);
    out.push(tag);
    encode_length(value.len(), &mut out);
    out.extend_from_slice(value);
    out
}

/// Definite-length encoding: short form below 128, long form otherwise.
fn encode_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&byte| byte == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}
