//! Group elements and affine point arithmetic
//!
//! Points are either the identity (point at infinity) or an affine
//! coordinate pair bound to its curve. Affine points can only be built
//! through [`Point::new`], which checks the curve equation, so every
//! [`AffinePoint`] in existence lies on its curve.

use std::{fmt, sync::Arc};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{curve::Curve, error::CryptoError};

/// An element of the elliptic-curve group.
#[derive(Clone, PartialEq, Eq)]
pub enum Point {
    /// Neutral element of point addition
    Identity,
    /// A finite point on a specific curve
    Affine(AffinePoint),
}

/// Finite curve point with canonical coordinates.
#[derive(Clone, PartialEq, Eq)]
pub struct AffinePoint {
    x: BigUint,
    y: BigUint,
    curve: Arc<Curve>,
}

impl AffinePoint {
    /// X coordinate.
    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// Curve this point belongs to.
    pub fn curve(&self) -> &Arc<Curve> {
        &self.curve
    }
}

impl Point {
    /// Build a point from externally supplied coordinates.
    ///
    /// # Errors
    ///
    /// - `PointNotOnCurve`: coordinates are unreduced or fail
    ///   `y^2 = x^3 + ax + b (mod p)`
    pub fn new(x: BigUint, y: BigUint, curve: &Arc<Curve>) -> Result<Self, CryptoError> {
        if !curve.is_point_on_curve(&x, &y) {
            return Err(CryptoError::PointNotOnCurve { curve: curve.name().to_string() });
        }
        Ok(Self::Affine(AffinePoint { x, y, curve: Arc::clone(curve) }))
    }

    /// The curve's base point `G`.
    pub fn base(curve: &Arc<Curve>) -> Self {
        let (gx, gy) = curve.base_point();
        Self::Affine(AffinePoint { x: gx.clone(), y: gy.clone(), curve: Arc::clone(curve) })
    }

    /// Returns true for the point at infinity.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// X coordinate, or `None` for the identity.
    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Self::Affine(affine) => Some(affine.x()),
            Self::Identity => None,
        }
    }

    /// Group addition.
    ///
    /// # Errors
    ///
    /// - `CurveMismatch`: the operands live on different curves
    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        if let (Self::Affine(lhs), Self::Affine(rhs)) = (self, other) {
            if !Arc::ptr_eq(&lhs.curve, &rhs.curve) && lhs.curve != rhs.curve {
                return Err(CryptoError::CurveMismatch {
                    left: lhs.curve.name().to_string(),
                    right: rhs.curve.name().to_string(),
                });
            }
        }
        Ok(self.add_same_curve(other))
    }

    /// Reflection across the x-axis.
    pub fn negate(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Affine(affine) => Self::Affine(AffinePoint {
                x: affine.x.clone(),
                y: affine.curve.sub_mod(&BigUint::zero(), &affine.y),
                curve: Arc::clone(&affine.curve),
            }),
        }
    }

    /// `2P`.
    pub fn double(&self) -> Self {
        self.add_same_curve(self)
    }

    /// `kP` by double-and-add, most significant bit first.
    pub fn scalar_mul(&self, k: &BigUint) -> Self {
        let mut acc = Self::Identity;
        for bit in (0..k.bits()).rev() {
            acc = acc.double();
            if k.bit(bit) {
                acc = acc.add_same_curve(self);
            }
        }
        acc
    }

    /// Affine addition for operands known to share a curve.
    fn add_same_curve(&self, other: &Self) -> Self {
        let (p, q) = match (self, other) {
            (Self::Identity, _) => return other.clone(),
            (_, Self::Identity) => return self.clone(),
            (Self::Affine(p), Self::Affine(q)) => (p, q),
        };
        let curve = &p.curve;

        // Q = -P, including the doubling of a point with y = 0
        if p.x == q.x && curve.reduce(&(&p.y + &q.y)).is_zero() {
            return Self::Identity;
        }

        let slope = if p.x == q.x {
            // Tangent: (3x^2 + a) / 2y
            let numerator = BigUint::from(3u8) * &p.x * &p.x + curve.a();
            let denominator = curve.reduce(&(&p.y + &p.y));
            curve.reduce(&(numerator * curve.inv_mod(&denominator)))
        } else {
            // Chord: (y2 - y1) / (x2 - x1)
            let numerator = curve.sub_mod(&q.y, &p.y);
            let denominator = curve.sub_mod(&q.x, &p.x);
            curve.reduce(&(numerator * curve.inv_mod(&denominator)))
        };

        let x3 = curve.sub_mod(&curve.reduce(&(&slope * &slope)), &curve.reduce(&(&p.x + &q.x)));
        let y3 = curve.sub_mod(&(slope * curve.sub_mod(&p.x, &x3)), &p.y);

        debug_assert!(curve.is_point_on_curve(&x3, &y3), "group law left the curve");
        Self::Affine(AffinePoint { x: x3, y: y3, curve: Arc::clone(curve) })
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Affine(affine) => write!(
                f,
                "Affine({}: x={:x}, y={:x})",
                affine.curve.name(),
                affine.x,
                affine.y
            ),
        }
    }
}

impl fmt::Debug for AffinePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:x}, {:x})", self.x, self.y)
    }
}
