//! Projective point arithmetic in homogeneous coordinates.
//!
//! Points live in (x : y : z) form with the identity at (0 : 1 : 0); the
//! on-curve predicate is `y²z ≡ x³ + axz² + bz³ (mod p)`. All coordinates
//! are kept as Montgomery residues of the curve's base field.

use crate::curve::WeierstrassCurve;
use crate::field::{self, Residue};
use crate::{Error, Result, U512};
use crypto_bigint::Encoding;

/// Point on a short Weierstrass curve in homogeneous projective form.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: Residue,
    pub(crate) y: Residue,
    pub(crate) z: Residue,
}

/// Base-field constants a point operation works with.
struct CurveArith {
    a: Residue,
    b: Residue,
}

impl CurveArith {
    fn new(curve: &WeierstrassCurve) -> Self {
        let fp = curve.fp();
        CurveArith {
            a: Residue::new(&curve.a, fp),
            b: Residue::new(&curve.b, fp),
        }
    }
}

impl ProjectivePoint {
    /// The additive identity (point at infinity), (0 : 1 : 0).
    pub fn identity(curve: &WeierstrassCurve) -> Self {
        let fp = curve.fp();
        ProjectivePoint {
            x: Residue::zero(fp),
            y: Residue::one(fp),
            z: Residue::zero(fp),
        }
    }

    /// The generator of the prime-order subgroup, in affine form (z = 1).
    pub fn generator(curve: &WeierstrassCurve) -> Self {
        let fp = curve.fp();
        ProjectivePoint {
            x: Residue::new(&curve.x, fp),
            y: Residue::new(&curve.y, fp),
            z: Residue::one(fp),
        }
    }

    /// Build an affine point from plain-form coordinates, without any
    /// curve membership check.
    pub(crate) fn from_affine(curve: &WeierstrassCurve, x: &U512, y: &U512) -> Self {
        let fp = curve.fp();
        ProjectivePoint {
            x: Residue::new(x, fp),
            y: Residue::new(y, fp),
            z: Residue::one(fp),
        }
    }

    /// Build an affine point from little-endian coordinate octets and
    /// verify it lies on `curve` and has order `q`.
    pub fn from_le_coordinates(
        curve: &WeierstrassCurve,
        x: &[u8],
        y: &[u8],
    ) -> Result<Self> {
        if x.len() != curve.field_octets() || y.len() != curve.field_octets() {
            return Err(Error::WrongKeyLength);
        }
        let point = ProjectivePoint::from_affine(
            curve,
            &field::uint_from_le_slice(x)?,
            &field::uint_from_le_slice(y)?,
        );
        if !point.is_on_curve(curve) {
            return Err(Error::CurvePoint);
        }
        if !point.check_order(curve) {
            return Err(Error::CurvePointOrder);
        }
        Ok(point)
    }

    /// Whether this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.z.retrieve() == U512::ZERO
    }

    /// Verify `y²z ≡ x³ + axz² + bz³`; the identity is accepted.
    pub fn is_on_curve(&self, curve: &WeierstrassCurve) -> bool {
        if self.is_identity() {
            return true;
        }
        let arith = CurveArith::new(curve);
        let z2 = self.z.square();
        let left = self.y.square() * self.z;
        let right =
            self.x.square() * self.x + arith.a * self.x * z2 + arith.b * z2 * self.z;
        left.retrieve() == right.retrieve()
    }

    /// Whether `[q]P` is the identity while `P` itself is not.
    pub fn check_order(&self, curve: &WeierstrassCurve) -> bool {
        if self.is_identity() {
            return false;
        }
        self.scalar_mul(&curve.q, curve).is_identity()
    }

    /// Point negation: (x : −y : z).
    pub fn neg(&self) -> Self {
        ProjectivePoint {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    /// Point doubling.
    pub fn double(&self, curve: &WeierstrassCurve) -> Self {
        self.double_with(&CurveArith::new(curve), curve)
    }

    fn double_with(&self, arith: &CurveArith, curve: &WeierstrassCurve) -> Self {
        if self.is_identity() {
            return *self;
        }
        // w = a·z² + 3·x²; s = y·z; v = x·y·s; h = w² − 8·v
        let x2 = self.x.square();
        let w = arith.a * self.z.square() + x2 + x2 + x2;
        let s = self.y * self.z;
        let v = self.x * self.y * s;
        let v8 = {
            let v2 = v + v;
            let v4 = v2 + v2;
            v4 + v4
        };
        let h = w.square() - v8;

        let s2 = s.square();
        let x3 = (h * s) + (h * s);
        let four_v = {
            let v2 = v + v;
            v2 + v2
        };
        let y2s2 = self.y.square() * s2;
        let eight_y2s2 = {
            let t2 = y2s2 + y2s2;
            let t4 = t2 + t2;
            t4 + t4
        };
        let y3 = w * (four_v - h) - eight_y2s2;
        let z3 = {
            let s3 = s2 * s;
            let t2 = s3 + s3;
            let t4 = t2 + t2;
            t4 + t4
        };
        let point = ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        };
        // doubling a 2-torsion point (y = 0) lands on the identity
        if point.z.retrieve() == U512::ZERO {
            ProjectivePoint::identity(curve)
        } else {
            point
        }
    }

    /// Point addition; `P + P` dispatches to [`ProjectivePoint::double`]
    /// and `P + (−P)` yields the identity.
    pub fn add(&self, other: &Self, curve: &WeierstrassCurve) -> Self {
        self.add_with(other, &CurveArith::new(curve), curve)
    }

    fn add_with(&self, other: &Self, arith: &CurveArith, curve: &WeierstrassCurve) -> Self {
        if self.is_identity() {
            return *other;
        }
        if other.is_identity() {
            return *self;
        }
        let u1 = other.y * self.z;
        let u2 = self.y * other.z;
        let v1 = other.x * self.z;
        let v2 = self.x * other.z;
        if v1.retrieve() == v2.retrieve() {
            if u1.retrieve() != u2.retrieve() {
                return ProjectivePoint::identity(curve);
            }
            return self.double_with(arith, curve);
        }
        let u = u1 - u2;
        let v = v1 - v2;
        let w = self.z * other.z;
        let v2sq = v.square();
        let v3 = v2sq * v;
        let a = u.square() * w - v3 - (v2sq * v2) - (v2sq * v2);
        ProjectivePoint {
            x: v * a,
            y: u * (v2sq * v2 - a) - v3 * u2,
            z: v3 * w,
        }
    }

    /// Point subtraction, implemented as addition of the negated point.
    pub fn sub(&self, other: &Self, curve: &WeierstrassCurve) -> Self {
        self.add(&other.neg(), curve)
    }

    /// `[k]P` via a left-to-right binary ladder over the curve's scalar
    /// width; `k` is taken in plain form.
    pub fn scalar_mul(&self, k: &U512, curve: &WeierstrassCurve) -> Self {
        let arith = CurveArith::new(curve);
        let bits = curve.size * 64;
        let bytes = k.to_le_bytes();
        let mut acc = ProjectivePoint::identity(curve);
        for i in (0..bits).rev() {
            acc = acc.double_with(&arith, curve);
            if bytes[i / 8] >> (i % 8) & 1 == 1 {
                acc = acc.add_with(self, &arith, curve);
            }
        }
        acc
    }

    /// Normalize to affine form (z = 1) by multiplying through `z⁻¹`,
    /// computed by Fermat's little theorem. The identity stays put.
    pub fn reduce(&self, curve: &WeierstrassCurve) -> Self {
        if self.is_identity() {
            return ProjectivePoint::identity(curve);
        }
        let z_inv = field::invert(&self.z, &curve.p);
        ProjectivePoint {
            x: self.x * z_inv,
            y: self.y * z_inv,
            z: Residue::one(curve.fp()),
        }
    }

    /// Plain-form affine coordinates; the point is normalized first.
    pub fn to_affine_uints(&self, curve: &WeierstrassCurve) -> (U512, U512) {
        let reduced = self.reduce(curve);
        (reduced.x.retrieve(), reduced.y.retrieve())
    }

    /// Little-endian affine coordinate octets, each `curve.field_octets()`
    /// wide.
    pub fn to_le_coordinates(&self, curve: &WeierstrassCurve) -> Result<(Vec<u8>, Vec<u8>)> {
        let (x, y) = self.to_affine_uints(curve);
        Ok((
            field::uint_to_le_bytes(&x, curve.field_octets())?,
            field::uint_to_le_bytes(&y, curve.field_octets())?,
        ))
    }

    /// Projective equality: `x₁z₂ = x₂z₁` and `y₁z₂ = y₂z₁`.
    pub fn eq_point(&self, other: &Self) -> bool {
        let both_identity = self.is_identity() && other.is_identity();
        both_identity
            || ((self.x * other.z).retrieve() == (other.x * self.z).retrieve()
                && (self.y * other.z).retrieve() == (other.y * self.z).retrieve()
                && !self.is_identity()
                && !other.is_identity())
    }
}
