//! GOST R 34.10-2012 verifying (public) keys.

use crate::curve::WeierstrassCurve;
use crate::field::{self, Residue};
use crate::hash::streebog256_chunks;
use crate::point::ProjectivePoint;
use crate::signing::SigningKey;
use crate::{Error, HashFunction, Result, U512};
use zeroize::Zeroizing;

/// Public key: a point of order `q` on one of the registered curves.
#[derive(Clone, Debug)]
pub struct VerifyingKey {
    curve: &'static WeierstrassCurve,
    point: ProjectivePoint,
    number: [u8; 32],
    hash: HashFunction,
}

/// 32-octet key fingerprint: Streebog-256 over the algorithm identifier
/// and the little-endian serializations of `p`, `q`, `Q.x` and `Q.y`.
///
/// The fingerprint only depends on public data, so it can be recomputed
/// for any imported key and drives the `SubjectKeyIdentifier` extension.
pub(crate) fn fingerprint(
    curve: &WeierstrassCurve,
    point: &ProjectivePoint,
) -> Result<[u8; 32]> {
    let octets = curve.field_octets();
    let oid = match curve.size() {
        4 => crate::OID_GOST_3410_2012_256,
        _ => crate::OID_GOST_3410_2012_512,
    };
    let (x, y) = point.to_le_coordinates(curve)?;
    let p = field::uint_to_le_bytes(curve.p(), octets)?;
    let q = field::uint_to_le_bytes(curve.q(), octets)?;
    Ok(streebog256_chunks(&[oid.as_bytes(), &p, &q, &x, &y]))
}

impl VerifyingKey {
    /// Derive the public key of a signing key.
    pub fn from_signing_key(signing_key: &SigningKey) -> Result<Self> {
        signing_key.check_icode()?;
        let curve = signing_key.curve();
        let d = Zeroizing::new(field::uint_from_le_slice(
            &signing_key.unmasked_le_bytes()?,
        )?);
        let point = ProjectivePoint::generator(curve).scalar_mul(&d, curve);
        Self::from_point(curve, point)
    }

    /// Build a key from a curve point, checking curve membership and
    /// order.
    pub fn from_point(curve: &'static WeierstrassCurve, point: ProjectivePoint) -> Result<Self> {
        let point = point.reduce(curve);
        if !point.is_on_curve(curve) {
            return Err(Error::CurvePoint);
        }
        if !point.check_order(curve) {
            return Err(Error::CurvePointOrder);
        }
        Ok(VerifyingKey {
            curve,
            point,
            number: fingerprint(curve, &point)?,
            hash: HashFunction::for_curve_size(curve.size())?,
        })
    }

    /// Build a key from little-endian affine coordinates.
    pub fn from_le_coordinates(
        curve: &'static WeierstrassCurve,
        x: &[u8],
        y: &[u8],
    ) -> Result<Self> {
        let point = ProjectivePoint::from_le_coordinates(curve, x, y)?;
        Self::from_point(curve, point)
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let digest = self.hash.digest(message);
        self.verify_hash(&digest, signature)
    }

    /// Verify a signature over a precomputed digest.
    ///
    /// The signature is `s ‖ r` (fixed-width big-endian halves) and both
    /// values must lie in `[1, q − 1]`.
    pub fn verify_hash(&self, hash: &[u8], signature: &[u8]) -> Result<()> {
        let curve = self.curve;
        let octets = curve.field_octets();
        if hash.len() != octets {
            return Err(Error::InvalidLength);
        }
        if signature.len() != curve.signature_octets() {
            return Err(Error::InvalidLength);
        }

        let s = field::uint_from_be_slice(&signature[..octets])?;
        let r = field::uint_from_be_slice(&signature[octets..])?;
        if s == U512::ZERO || r == U512::ZERO || s >= curve.q || r >= curve.q {
            return Err(Error::Signature);
        }

        let fq = curve.fq();
        let mut e = field::reduce(&field::uint_from_le_slice(hash)?, &curve.q);
        if e == U512::ZERO {
            e = U512::ONE;
        }
        let v = field::invert(&Residue::new(&e, fq), &curve.q);
        let z1 = (Residue::new(&s, fq) * v).retrieve();
        let z2 = ((-Residue::new(&r, fq)) * v).retrieve();

        let generator = ProjectivePoint::generator(curve);
        let sum = generator
            .scalar_mul(&z1, curve)
            .add(&self.point.scalar_mul(&z2, curve), curve);
        if sum.is_identity() {
            return Err(Error::NotEqualData);
        }
        let (x, _) = sum.to_affine_uints(curve);
        if field::reduce(&x, &curve.q) == r {
            Ok(())
        } else {
            Err(Error::NotEqualData)
        }
    }

    /// Curve the key lives on.
    pub fn curve(&self) -> &'static WeierstrassCurve {
        self.curve
    }

    /// OID of the signature algorithm bound to the key.
    pub fn algorithm_oid(&self) -> &'static str {
        match self.hash {
            HashFunction::Streebog256 => crate::OID_GOST_3410_2012_256,
            HashFunction::Streebog512 => crate::OID_GOST_3410_2012_512,
        }
    }

    /// Hash function bound to the key.
    pub fn hash_function(&self) -> HashFunction {
        self.hash
    }

    /// The public point.
    pub fn point(&self) -> &ProjectivePoint {
        &self.point
    }

    /// Key fingerprint (`SubjectKeyIdentifier` value).
    pub fn number(&self) -> &[u8; 32] {
        &self.number
    }

    /// Little-endian affine coordinates of the public point.
    pub fn to_le_coordinates(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        self.point.to_le_coordinates(self.curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{
        RFC4357_GOST_3410_2001_PARAM_SET_A as CRYPTOPRO_A,
        TC26_GOST_3410_2012_256_PARAM_SET_TEST as TEST_256,
    };
    use rand_core::OsRng;

    #[test]
    fn coordinate_roundtrip() {
        let key = SigningKey::random(&CRYPTOPRO_A, &mut OsRng).unwrap();
        let public = VerifyingKey::from_signing_key(&key).unwrap();
        let (x, y) = public.to_le_coordinates().unwrap();
        let restored = VerifyingKey::from_le_coordinates(&CRYPTOPRO_A, &x, &y).unwrap();
        assert_eq!(restored.number(), public.number());
    }

    #[test]
    fn off_curve_point_rejected() {
        let octets = TEST_256.field_octets();
        let x = vec![5u8; octets];
        let y = vec![7u8; octets];
        assert!(matches!(
            VerifyingKey::from_le_coordinates(&TEST_256, &x, &y),
            Err(Error::CurvePoint)
        ));
    }

    #[test]
    fn wrong_message_rejected() {
        let mut key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        let public = VerifyingKey::from_signing_key(&key).unwrap();
        let signature = key.sign(&mut OsRng, b"message").unwrap();
        assert_eq!(
            public.verify(b"other message", &signature),
            Err(Error::NotEqualData)
        );
    }

    #[test]
    fn signature_range_enforced() {
        let mut key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        let public = VerifyingKey::from_signing_key(&key).unwrap();
        let signature = key.sign(&mut OsRng, b"message").unwrap();

        let zeroed = vec![0u8; signature.len()];
        assert_eq!(public.verify(b"message", &zeroed), Err(Error::Signature));

        let mut oversized = signature;
        for b in oversized.iter_mut().take(TEST_256.field_octets()) {
            *b = 0xff;
        }
        assert_eq!(public.verify(b"message", &oversized), Err(Error::Signature));
    }
}
