//! Nonce combination into the per-message salt and IV
//!
//! Both parties contribute a 32-byte nonce. The XOR of the two is split at
//! a fixed offset:
//!
//! ```text
//!  0                    20           32
//!  ├────────── salt ─────┼──── IV ────┤
//! ```
//!
//! XOR is commutative, so the result does not depend on which party's
//! nonce is passed first.

use crate::error::CryptoError;

/// Size of each party's nonce.
pub const NONCE_SIZE: usize = 32;

/// HKDF salt length (leading bytes of the combined nonce).
pub const SALT_SIZE: usize = 20;

/// AES-GCM IV length (trailing bytes of the combined nonce).
pub const IV_SIZE: usize = NONCE_SIZE - SALT_SIZE;

/// Salt and IV derived from a nonce pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltAndIv {
    /// HKDF salt
    pub salt: [u8; SALT_SIZE],
    /// AES-GCM initialization vector
    pub iv: [u8; IV_SIZE],
}

/// Position-wise XOR of two equal-length byte strings.
///
/// # Errors
///
/// - `NonceLengthMismatch`: the inputs differ in length
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if a.len() != b.len() {
        return Err(CryptoError::NonceLengthMismatch {
            left: a.len(),
            right: b.len(),
            expected: a.len().max(b.len()),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}

/// Combine two nonces into a salt and IV.
///
/// # Errors
///
/// - `NonceLengthMismatch`: either nonce is not exactly [`NONCE_SIZE`]
///   bytes. Inputs are never truncated or padded.
pub fn combine(nonce_a: &[u8], nonce_b: &[u8]) -> Result<SaltAndIv, CryptoError> {
    if nonce_a.len() != NONCE_SIZE || nonce_b.len() != NONCE_SIZE {
        return Err(CryptoError::NonceLengthMismatch {
            left: nonce_a.len(),
            right: nonce_b.len(),
            expected: NONCE_SIZE,
        });
    }

    let mixed = xor_bytes(nonce_a, nonce_b)?;
    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; IV_SIZE];
    salt.copy_from_slice(&mixed[..SALT_SIZE]);
    iv.copy_from_slice(&mixed[SALT_SIZE..]);

    Ok(SaltAndIv { salt, iv })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_twenty_and_twelve() {
        assert_eq!(SALT_SIZE, 20);
        assert_eq!(IV_SIZE, 12);
    }

    #[test]
    fn combine_splits_xor() {
        let a: Vec<u8> = (0..32).collect();
        let b = [0xffu8; 32];

        let derived = combine(&a, &b).unwrap();

        let expected: Vec<u8> = (0..32u8).map(|byte| byte ^ 0xff).collect();
        assert_eq!(derived.salt.as_slice(), &expected[..20]);
        assert_eq!(derived.iv.as_slice(), &expected[20..]);
    }

    #[test]
    fn combine_is_commutative() {
        let a = [0x5au8; 32];
        let b: Vec<u8> = (100..132).collect();

        assert_eq!(combine(&a, &b).unwrap(), combine(&b, &a).unwrap());
    }

    #[test]
    fn identical_nonces_cancel() {
        let a = [0x42u8; 32];
        let derived = combine(&a, &a).unwrap();

        assert_eq!(derived.salt, [0u8; SALT_SIZE]);
        assert_eq!(derived.iv, [0u8; IV_SIZE]);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let result = combine(&[0u8; 31], &[0u8; 32]);
        assert!(matches!(
            result,
            Err(CryptoError::NonceLengthMismatch { left: 31, right: 32, expected: 32 })
        ));
    }

    #[test]
    fn equal_but_wrong_lengths_rejected() {
        let result = combine(&[0u8; 16], &[0u8; 16]);
        assert!(matches!(result, Err(CryptoError::NonceLengthMismatch { .. })));
    }

    #[test]
    fn xor_is_self_inverse() {
        let a = [0x13u8, 0x37, 0xc0, 0xde];
        let b = [0xfeu8, 0xed, 0xfa, 0xce];

        let mixed = xor_bytes(&a, &b).unwrap();
        assert_eq!(xor_bytes(&mixed, &a).unwrap(), b);
    }
}
