//! GOST R 34.10-2012 signing keys.
//!
//! The secret scalar is never stored in the clear: the key slot holds
//! `d·m mod q` and the mask slot holds `m⁻¹ mod q` for a random `m`,
//! both as Montgomery residues. Signing recovers `r·d` through two
//! Montgomery products without the scalar ever leaving the masked
//! domain, and the mask is replaced after every signature.

use crate::curve::WeierstrassCurve;
use crate::field::{self, Residue};
use crate::hash::streebog256_chunks;
use crate::point::ProjectivePoint;
use crate::verifying::fingerprint;
use crate::{Error, HashFunction, Resource, Result, U512};
use crypto_bigint::Encoding;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use zeroize::Zeroizing;

/// Bound on nonce resampling when `r` or `s` comes out zero.
const MAX_SIGN_ATTEMPTS: usize = 8;

/// Secret key of the GOST R 34.10-2012 signature scheme.
pub struct SigningKey {
    curve: &'static WeierstrassCurve,
    /// Masked scalar `d·m mod q`, Montgomery form.
    key: Residue,
    /// Stored mask `m⁻¹ mod q`, Montgomery form.
    mask: Residue,
    /// Integrity code over the masked pair.
    icode: [u8; 32],
    number: [u8; 32],
    verifykey_number: [u8; 32],
    label: Option<String>,
    resource: Resource,
    hash: HashFunction,
}

impl SigningKey {
    /// Generate a fresh key on `curve`.
    pub fn random(
        curve: &'static WeierstrassCurve,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self> {
        let d = Zeroizing::new(field::random_nonzero_mod(rng, &curve.q));
        Self::from_scalar(curve, &d, rng)
    }

    /// Build a key from a little-endian scalar of `curve.field_octets()`
    /// octets. The value is reduced modulo `q` and must not vanish.
    pub fn from_le_bytes(
        curve: &'static WeierstrassCurve,
        bytes: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self> {
        if bytes.len() != curve.field_octets() {
            return Err(Error::WrongKeyLength);
        }
        let d = Zeroizing::new(field::reduce(
            &field::uint_from_le_slice(bytes)?,
            &curve.q,
        ));
        Self::from_scalar(curve, &d, rng)
    }

    /// Install the first mask over a plain scalar and derive the paired
    /// verifier's fingerprint.
    fn from_scalar(
        curve: &'static WeierstrassCurve,
        d: &U512,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self> {
        if *d == U512::ZERO {
            return Err(Error::KeyValue);
        }
        let fq = curve.fq();

        let m = Residue::new(&field::random_nonzero_mod(rng, &curve.q), fq);
        let key = Residue::new(d, fq) * m;
        let mask = field::invert(&m, &curve.q);

        let public = ProjectivePoint::generator(curve).scalar_mul(d, curve);
        let hash = HashFunction::for_curve_size(curve.size())?;
        let verifykey_number = fingerprint(curve, &public)?;

        let mut number = [0u8; 32];
        rng.fill_bytes(&mut number);

        let mut signing_key = SigningKey {
            curve,
            key,
            mask,
            icode: [0u8; 32],
            number,
            verifykey_number,
            label: None,
            resource: Resource::signatures_from(OffsetDateTime::now_utc()),
            hash,
        };
        signing_key.set_icode();
        Ok(signing_key)
    }

    /// Rebuild a key from the serialized masked pair of a container.
    /// Both halves are little-endian values of `curve.field_octets()`
    /// octets; `key` holds `d·m mod q` and `mask` holds `m⁻¹ mod q`.
    pub fn from_masked_pair_le(
        curve: &'static WeierstrassCurve,
        key: &[u8],
        mask: &[u8],
    ) -> Result<Self> {
        if key.len() != curve.field_octets() || mask.len() != curve.field_octets() {
            return Err(Error::WrongKeyLength);
        }
        let key_value = field::uint_from_le_slice(key)?;
        let mask_value = field::uint_from_le_slice(mask)?;
        if key_value >= curve.q
            || mask_value >= curve.q
            || key_value == U512::ZERO
            || mask_value == U512::ZERO
        {
            return Err(Error::KeyValue);
        }
        let fq = curve.fq();
        let mut signing_key = SigningKey {
            curve,
            key: Residue::new(&key_value, fq),
            mask: Residue::new(&mask_value, fq),
            icode: [0u8; 32],
            number: [0u8; 32],
            verifykey_number: [0u8; 32],
            label: None,
            resource: Resource::signatures_from(OffsetDateTime::now_utc()),
            hash: HashFunction::for_curve_size(curve.size())?,
        };
        signing_key.set_icode();
        Ok(signing_key)
    }

    /// Serialize the stored masked pair as little-endian octet strings
    /// (key half, mask half). The scalar stays masked.
    pub fn masked_pair_le(&self) -> Result<(Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>)> {
        let octets = self.curve.field_octets();
        Ok((
            Zeroizing::new(field::uint_to_le_bytes(&self.key.retrieve(), octets)?),
            Zeroizing::new(field::uint_to_le_bytes(&self.mask.retrieve(), octets)?),
        ))
    }

    /// Explicitly unmask the scalar for serialization; the in-memory key
    /// stays masked.
    pub fn unmasked_le_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        let d = Zeroizing::new((self.key * self.mask).retrieve());
        Ok(Zeroizing::new(field::uint_to_le_bytes(
            &d,
            self.curve.field_octets(),
        )?))
    }

    /// Replace the mask: multiply the key slot by a fresh `ζ` and the
    /// mask slot by `ζ⁻¹`.
    pub fn refresh_mask(&mut self, rng: &mut impl CryptoRngCore) {
        let zeta = Residue::new(&field::random_nonzero_mod(rng, &self.curve.q), self.curve.fq());
        self.key = self.key * zeta;
        self.mask = self.mask * field::invert(&zeta, &self.curve.q);
        self.set_icode();
    }

    /// Recompute the integrity code over the stored masked pair.
    fn set_icode(&mut self) {
        self.icode = self.compute_icode();
    }

    fn compute_icode(&self) -> [u8; 32] {
        let key = self.key.retrieve().to_le_bytes();
        let mask = self.mask.retrieve().to_le_bytes();
        streebog256_chunks(&[&key, &mask])
    }

    /// Verify the integrity code before using the key.
    pub fn check_icode(&self) -> Result<()> {
        if self.compute_icode().ct_eq(&self.icode).into() {
            Ok(())
        } else {
            Err(Error::KeyValue)
        }
    }

    /// Sign a message: hash with the bound Streebog variant, then sign
    /// the digest.
    pub fn sign(&mut self, rng: &mut impl CryptoRngCore, message: &[u8]) -> Result<Vec<u8>> {
        let digest = Zeroizing::new(self.hash.digest(message));
        self.sign_hash(rng, &digest)
    }

    /// Sign a precomputed digest of `curve.field_octets()` octets.
    ///
    /// The digest octets are interpreted as a little-endian integer. The
    /// nonce is resampled on the rare `r = 0` / `s = 0` branches, a small
    /// bounded number of times.
    pub fn sign_hash(&mut self, rng: &mut impl CryptoRngCore, hash: &[u8]) -> Result<Vec<u8>> {
        if hash.len() != self.curve.field_octets() {
            return Err(Error::InvalidLength);
        }
        self.check_icode()?;
        self.resource.spend(OffsetDateTime::now_utc())?;

        let e = field::uint_from_le_slice(hash)?;
        let mut outcome = Err(Error::Signature);
        for _ in 0..MAX_SIGN_ATTEMPTS {
            let k = Zeroizing::new(field::random_nonzero_mod(rng, &self.curve.q));
            match self.sign_raw(&k, &e) {
                Err(Error::Signature) => continue,
                other => {
                    outcome = other;
                    break;
                }
            }
        }
        self.refresh_mask(rng);
        outcome
    }

    /// Sign with explicit nonce and digest values, as integers. This is
    /// the entry point exercised by the standard's appendix examples;
    /// the mask is still refreshed afterwards.
    pub fn sign_with_values(
        &mut self,
        rng: &mut impl CryptoRngCore,
        k: &U512,
        e: &U512,
    ) -> Result<Vec<u8>> {
        self.check_icode()?;
        let outcome = self.sign_raw(k, e);
        self.refresh_mask(rng);
        outcome
    }

    /// One signing attempt. The output is `s ‖ r`, both halves fixed-width
    /// big-endian.
    fn sign_raw(&self, k: &U512, e: &U512) -> Result<Vec<u8>> {
        let curve = self.curve;
        let fq = curve.fq();

        // r = ([k]P).x mod q
        let c = ProjectivePoint::generator(curve).scalar_mul(k, curve);
        let (cx, _) = c.to_affine_uints(curve);
        let r = field::reduce(&cx, &curve.q);
        if r == U512::ZERO {
            return Err(Error::Signature);
        }

        // s = r·d + k·e mod q; the product r·d runs over the masked pair
        let rd = Residue::new(&r, fq) * self.key * self.mask;
        let mut e_norm = field::reduce(e, &curve.q);
        if e_norm == U512::ZERO {
            e_norm = U512::ONE;
        }
        let ke = Residue::new(k, fq) * Residue::new(&e_norm, fq);
        let s = (rd + ke).retrieve();
        if s == U512::ZERO {
            return Err(Error::Signature);
        }

        let octets = curve.field_octets();
        let mut out = field::uint_to_be_bytes(&s, octets)?;
        out.extend_from_slice(&field::uint_to_be_bytes(&r, octets)?);
        Ok(out)
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

    /// Unique 32-octet key number.
    pub fn number(&self) -> &[u8; 32] {
        &self.number
    }

    /// Assign the key number (container import).
    pub fn set_number(&mut self, number: [u8; 32]) {
        self.number = number;
    }

    /// Fingerprint of the paired verifying key.
    pub fn verifykey_number(&self) -> &[u8; 32] {
        &self.verifykey_number
    }

    /// Assign the paired verifier's fingerprint (container import).
    pub fn set_verifykey_number(&mut self, number: [u8; 32]) {
        self.verifykey_number = number;
    }

    /// Human-readable label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Assign the label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Usage resource.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Replace the usage resource.
    pub fn set_resource(&mut self, resource: Resource) {
        self.resource = resource;
    }

    /// Restrict the validity window.
    pub fn set_validity(&mut self, not_before: OffsetDateTime, not_after: OffsetDateTime) {
        self.resource.not_before = not_before;
        self.resource.not_after = not_after;
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        let fq = self.curve.fq();
        self.key = Residue::zero(fq);
        self.mask = Residue::zero(fq);
        self.icode = [0u8; 32];
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey")
            .field("curve", &self.curve.name())
            .field("number", &self.number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST as TEST_256;
    use crate::VerifyingKey;
    use rand_core::OsRng;

    #[test]
    fn masked_pair_roundtrip_recovers_scalar() {
        let key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        let plain = key.unmasked_le_bytes().unwrap();

        let (masked, mask) = key.masked_pair_le().unwrap();
        let restored = SigningKey::from_masked_pair_le(&TEST_256, &masked, &mask).unwrap();
        assert_eq!(&*restored.unmasked_le_bytes().unwrap(), &*plain);
    }

    #[test]
    fn refresh_preserves_scalar_and_signatures() {
        let mut key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        let before = key.unmasked_le_bytes().unwrap();
        let (masked_before, _) = key.masked_pair_le().unwrap();

        key.refresh_mask(&mut OsRng);
        let (masked_after, _) = key.masked_pair_le().unwrap();
        assert_ne!(&*masked_before, &*masked_after, "mask refresh must change the stored form");
        assert_eq!(&*key.unmasked_le_bytes().unwrap(), &*before);

        let public = VerifyingKey::from_signing_key(&key).unwrap();
        let signature = key.sign(&mut OsRng, b"after refresh").unwrap();
        public.verify(b"after refresh", &signature).unwrap();
    }

    #[test]
    fn icode_detects_tampering() {
        let mut key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        key.check_icode().unwrap();
        key.icode[0] ^= 1;
        assert_eq!(key.check_icode(), Err(Error::KeyValue));
        assert!(key.sign(&mut OsRng, b"x").is_err());
    }

    #[test]
    fn exhausted_resource_refuses_to_sign() {
        let mut key = SigningKey::random(&TEST_256, &mut OsRng).unwrap();
        let mut resource = *key.resource();
        resource.counter = 1;
        key.set_resource(resource);
        assert!(key.sign(&mut OsRng, b"first").is_ok());
        assert_eq!(key.sign(&mut OsRng, b"second"), Err(Error::LowKeyResource));
    }

    #[test]
    fn zero_scalar_rejected() {
        let zeros = vec![0u8; TEST_256.field_octets()];
        assert_eq!(
            SigningKey::from_le_bytes(&TEST_256, &zeros, &mut OsRng).err(),
            Some(Error::KeyValue)
        );
    }
}
