//! Library configuration

use serde::{Deserialize, Serialize};

use crate::curve::BC25519;

/// Configuration for key generation and the exchange handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FideliusConfig {
    /// Name of the curve to operate on, looked up in a `CurveRegistry`
    pub curve: String,
}

impl Default for FideliusConfig {
    fn default() -> Self {
        Self { curve: BC25519.to_string() }
    }
}
