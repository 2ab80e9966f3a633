//! Randomness abstraction for deterministic testing.
//!
//! Key generation is the only consumer of entropy. Production code uses
//! [`OsRandom`]; tests plug in a seeded source so generated key material is
//! reproducible.

use crate::error::CryptoError;

/// Source of cryptographically secure random bytes.
///
/// # Invariants
///
/// - Production implementations MUST use a CSPRNG
/// - Failure is reported, never papered over with weaker randomness
pub trait RandomSource: Send + Sync {
    /// Fill `buffer` completely with random bytes.
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError>;
}

/// Operating-system CSPRNG via getrandom.
///
/// Uses `getrandom(2)` on Linux, `BCryptGenRandom` on Windows, and the
/// platform equivalent elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    #[allow(clippy::disallowed_methods)]
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::fill(buffer).map_err(|err| CryptoError::Entropy { reason: err.to_string() })
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill_bytes(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that always reports failure, standing in for an exhausted OS RNG.
    struct Unavailable;

    impl RandomSource for Unavailable {
        fn fill_bytes(&self, _buffer: &mut [u8]) -> Result<(), CryptoError> {
            Err(CryptoError::Entropy { reason: "no entropy".to_string() })
        }
    }

    fn draw<R: RandomSource + ?Sized>(rng: &R, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut buffer = vec![0u8; len];
        rng.fill_bytes(&mut buffer)?;
        Ok(buffer)
    }

    #[test]
    fn nonce_sized_draws_are_independent() {
        let first = draw(&OsRandom, 32).unwrap();
        let second = draw(&OsRandom, 32).unwrap();

        // 2^-256 chance of a false failure
        assert_ne!(first, second);
        assert_ne!(first, vec![0u8; 32]);
    }

    #[test]
    fn empty_and_odd_sized_buffers_accepted() {
        assert!(draw(&OsRandom, 0).unwrap().is_empty());
        assert_eq!(draw(&OsRandom, 33).unwrap().len(), 33);
    }

    #[test]
    fn works_through_references_and_trait_objects() {
        let dynamic: &dyn RandomSource = &OsRandom;
        assert_eq!(draw(&dynamic, 16).unwrap().len(), 16);
        assert_eq!(draw(dynamic, 16).unwrap().len(), 16);
    }

    #[test]
    fn failure_surfaces_as_retryable_entropy_error() {
        let err = draw(&Unavailable, 32).unwrap_err();

        assert!(matches!(err, CryptoError::Entropy { .. }));
        assert!(err.is_retryable());
    }
}
