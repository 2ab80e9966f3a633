//! Short Weierstrass curves over prime fields and the curve registry
//!
//! A [`Curve`] is immutable once built. Curves are shared through `Arc` and
//! looked up by name or object identifier in a [`CurveRegistry`], which is
//! constructed explicitly and never mutated afterwards.

use std::{collections::HashMap, fmt, sync::Arc};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{config::FideliusConfig, encoding::spki, error::CryptoError};

/// Name of the only curve supported in production.
pub const BC25519: &str = "BC25519";

// Weierstrass form of Curve25519, as exported by Bouncy Castle.
const BC25519_P: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xed,
];
const BC25519_A: [u8; 32] = [
    0x2a, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0x98, 0x49, 0x14, 0xa1, 0x44,
];
const BC25519_B: [u8; 32] = [
    0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4, 0x25, 0xed,
    0x09, 0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4, 0x25,
    0xed, 0x09, 0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4,
    0x26, 0x0b, 0x5e, 0x9c, 0x77, 0x10, 0xc8, 0x64,
];
const BC25519_ORDER: [u8; 32] = [
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0xde, 0xf9, 0xde, 0xa2, 0xf7, 0x9c, 0xd6,
    0x58, 0x12, 0x63, 0x1a, 0x5c, 0xf5, 0xd3, 0xed,
];
const BC25519_GX: [u8; 32] = [
    0x2a, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xad, 0x24, 0x5a,
];
const BC25519_GY: [u8; 32] = [
    0x20, 0xae, 0x19, 0xa1, 0xb8, 0xa0, 0x86, 0xb4,
    0xe0, 0x1e, 0xdd, 0x2c, 0x77, 0x48, 0xd1, 0x4c,
    0x92, 0x3d, 0x4d, 0x7e, 0x6d, 0x7c, 0x61, 0xb2,
    0x29, 0xe9, 0xc5, 0xa2, 0x7e, 0xce, 0xd3, 0xd9,
];
const BC25519_COFACTOR: u32 = 8;
const BC25519_OID: [u8; 10] = [0x01, 0x03, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x05, 0x01];

/// Parameters of a curve `y^2 = x^3 + ax + b (mod p)`.
///
/// # Invariants
///
/// - `a`, `b`, `gx`, `gy` are reduced modulo `p`
/// - The base point satisfies the curve equation
/// - `field_width` is the byte length of `p`, `scalar_width` that of `order`
#[derive(Clone, PartialEq, Eq)]
pub struct Curve {
    name: String,
    p: BigUint,
    a: BigUint,
    b: BigUint,
    order: BigUint,
    gx: BigUint,
    gy: BigUint,
    cofactor: u32,
    oid: Vec<u8>,
    field_width: usize,
    scalar_width: usize,
    spki_prefix: Vec<u8>,
}

impl Curve {
    /// Build a curve from raw parameters, validating them.
    ///
    /// # Errors
    ///
    /// - `InvalidCurve`: modulus too small, unreduced coefficients, singular
    ///   curve, trivial order, or a base point off the curve
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        p: BigUint,
        a: BigUint,
        b: BigUint,
        order: BigUint,
        gx: BigUint,
        gy: BigUint,
        cofactor: u32,
        oid: Vec<u8>,
    ) -> Result<Self, CryptoError> {
        if p <= BigUint::from(3u8) {
            return Err(CryptoError::InvalidCurve { reason: "field modulus must exceed 3" });
        }
        if a >= p || b >= p || gx >= p || gy >= p {
            return Err(CryptoError::InvalidCurve { reason: "parameters must be reduced mod p" });
        }
        if order <= BigUint::one() {
            return Err(CryptoError::InvalidCurve { reason: "subgroup order must exceed 1" });
        }
        if cofactor == 0 {
            return Err(CryptoError::InvalidCurve { reason: "cofactor must be non-zero" });
        }

        let curve = Self::from_parts(name.into(), p, a, b, order, gx, gy, cofactor, oid);

        // 4a^3 + 27b^2 != 0 (mod p)
        let four_a3 = BigUint::from(4u8) * curve.a.modpow(&BigUint::from(3u8), &curve.p);
        let twenty_seven_b2 = BigUint::from(27u8) * curve.b.modpow(&BigUint::from(2u8), &curve.p);
        if ((four_a3 + twenty_seven_b2) % &curve.p).is_zero() {
            return Err(CryptoError::InvalidCurve { reason: "curve is singular" });
        }
        if !curve.is_point_on_curve(&curve.gx, &curve.gy) {
            return Err(CryptoError::InvalidCurve { reason: "base point is not on the curve" });
        }

        Ok(curve)
    }

    /// The BC25519 curve (Curve25519 in short Weierstrass form).
    pub fn bc25519() -> Self {
        Self::from_parts(
            BC25519.to_string(),
            BigUint::from_bytes_be(&BC25519_P),
            BigUint::from_bytes_be(&BC25519_A),
            BigUint::from_bytes_be(&BC25519_B),
            BigUint::from_bytes_be(&BC25519_ORDER),
            BigUint::from_bytes_be(&BC25519_GX),
            BigUint::from_bytes_be(&BC25519_GY),
            BC25519_COFACTOR,
            BC25519_OID.to_vec(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        name: String,
        p: BigUint,
        a: BigUint,
        b: BigUint,
        order: BigUint,
        gx: BigUint,
        gy: BigUint,
        cofactor: u32,
        oid: Vec<u8>,
    ) -> Self {
        let field_width = byte_width(&p);
        let scalar_width = byte_width(&order);
        let mut curve = Self {
            name,
            p,
            a,
            b,
            order,
            gx,
            gy,
            cofactor,
            oid,
            field_width,
            scalar_width,
            spki_prefix: Vec::new(),
        };
        curve.spki_prefix = spki::prefix(&curve);
        curve
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field prime `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Coefficient `a`.
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    /// Coefficient `b`.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Order `q` of the base-point subgroup.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Base point coordinates `(Gx, Gy)`.
    pub fn base_point(&self) -> (&BigUint, &BigUint) {
        (&self.gx, &self.gy)
    }

    /// Cofactor `h`.
    pub fn cofactor(&self) -> u32 {
        self.cofactor
    }

    /// Object identifier bytes used as registry key.
    pub fn oid(&self) -> &[u8] {
        &self.oid
    }

    /// Bytes needed for one field element.
    pub fn field_width(&self) -> usize {
        self.field_width
    }

    /// Bytes needed for one scalar.
    pub fn scalar_width(&self) -> usize {
        self.scalar_width
    }

    /// DER SubjectPublicKeyInfo header preceding `X || Y` in the wrapped
    /// public-key encoding.
    pub fn spki_prefix(&self) -> &[u8] {
        &self.spki_prefix
    }

    /// Returns true if `(x, y)` are canonical field elements satisfying the
    /// curve equation.
    pub fn is_point_on_curve(&self, x: &BigUint, y: &BigUint) -> bool {
        if x >= &self.p || y >= &self.p {
            return false;
        }
        let left = y.modpow(&BigUint::from(2u8), &self.p);
        left == self.evaluate(x)
    }

    /// Evaluate `x^3 + ax + b (mod p)`.
    pub fn evaluate(&self, x: &BigUint) -> BigUint {
        let cube = x.modpow(&BigUint::from(3u8), &self.p);
        (cube + &self.a * x + &self.b) % &self.p
    }

    pub(crate) fn reduce(&self, value: &BigUint) -> BigUint {
        value % &self.p
    }

    /// `(lhs - rhs) mod p` without leaving the unsigned domain.
    pub(crate) fn sub_mod(&self, lhs: &BigUint, rhs: &BigUint) -> BigUint {
        (lhs + &self.p - self.reduce(rhs)) % &self.p
    }

    /// Multiplicative inverse via Fermat: `v^(p-2) mod p`.
    ///
    /// `p` is prime, so this is defined for every non-zero `v`. Callers
    /// rule out zero before dividing.
    pub(crate) fn inv_mod(&self, value: &BigUint) -> BigUint {
        let exponent = &self.p - BigUint::from(2u8);
        value.modpow(&exponent, &self.p)
    }

    /// Returns true if `k` is a valid private scalar, i.e. in `[1, q-1]`.
    pub fn is_valid_scalar(&self, k: &BigUint) -> bool {
        !k.is_zero() && k < &self.order
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve")
            .field("name", &self.name)
            .field("p", &format_args!("{:x}", self.p))
            .field("order", &format_args!("{:x}", self.order))
            .field("cofactor", &self.cofactor)
            .finish_non_exhaustive()
    }
}

fn byte_width(value: &BigUint) -> usize {
    value.bits().div_ceil(8) as usize
}

/// Immutable lookup table from curve name and OID to curve definition.
///
/// Built once (typically at startup) and shared read-only afterwards; there
/// is no way to add curves to an existing registry.
#[derive(Debug, Clone)]
pub struct CurveRegistry {
    by_name: HashMap<String, Arc<Curve>>,
    by_oid: HashMap<Vec<u8>, Arc<Curve>>,
}

impl CurveRegistry {
    /// Build a registry from a fixed set of curves.
    ///
    /// # Errors
    ///
    /// - `DuplicateCurve`: two curves share a name or a non-empty OID
    pub fn new(curves: impl IntoIterator<Item = Curve>) -> Result<Self, CryptoError> {
        let mut by_name = HashMap::new();
        let mut by_oid = HashMap::new();

        for curve in curves {
            let curve = Arc::new(curve);
            if by_name.contains_key(curve.name())
                || (!curve.oid().is_empty() && by_oid.contains_key(curve.oid()))
            {
                return Err(CryptoError::DuplicateCurve { name: curve.name().to_string() });
            }
            if !curve.oid().is_empty() {
                by_oid.insert(curve.oid().to_vec(), Arc::clone(&curve));
            }
            by_name.insert(curve.name().to_string(), curve);
        }

        Ok(Self { by_name, by_oid })
    }

    /// Look up a curve by name.
    pub fn by_name(&self, name: &str) -> Result<Arc<Curve>, CryptoError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| CryptoError::UnknownCurve { name: name.to_string() })
    }

    /// Look up a curve by object identifier.
    pub fn by_oid(&self, oid: &[u8]) -> Result<Arc<Curve>, CryptoError> {
        self.by_oid.get(oid).cloned().ok_or_else(|| CryptoError::UnknownCurve {
            name: oid.iter().map(|byte| format!("{byte:02x}")).collect(),
        })
    }

    /// Resolve the curve selected by a configuration.
    pub fn resolve(&self, config: &FideliusConfig) -> Result<Arc<Curve>, CryptoError> {
        self.by_name(&config.curve)
    }

    /// Number of registered curves.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if no curves are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for CurveRegistry {
    /// Registry holding BC25519 only.
    fn default() -> Self {
        let curve = Arc::new(Curve::bc25519());
        let by_oid = HashMap::from([(curve.oid().to_vec(), Arc::clone(&curve))]);
        let by_name = HashMap::from([(curve.name().to_string(), curve)]);
        Self { by_name, by_oid }
    }
}
