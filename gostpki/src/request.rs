//! PKCS#10-shaped certificate signing requests.
//!
//! ```text
//! CertificationRequest ::= SEQUENCE {
//!    certificationRequestInfo SEQUENCE {
//!       version INTEGER (0),
//!       subject Name,
//!       subjectPKInfo SubjectPublicKeyInfo,
//!       attributes [0] IMPLICIT SET OF Attribute  -- empty
//!    },
//!    signatureAlgorithm AlgorithmIdentifier,
//!    signature BIT STRING
//! }
//! ```

use crate::{pubkey, Error, Result};
use gost3410::{SigningKey, VerifyingKey};
use gostasn1::{Asn1, BitString, ContentType, Format, Tag, Tlv};
use rand_core::CryptoRngCore;
use std::path::Path;
use subtle::ConstantTimeEq;

/// A certificate signing request: the subject's public key and name in a
/// self-signed envelope.
#[derive(Debug)]
pub struct CertificateRequest {
    /// The requested public key.
    pub vkey: VerifyingKey,
    /// Subject distinguished name.
    pub subject: Tlv<'static>,
    /// Raw signature octets.
    pub signature: Vec<u8>,
    /// Whether the self-signature verified on import. A freshly built
    /// request is trivially verified; an imported request with a broken
    /// signature is still populated for inspection, with this flag
    /// cleared.
    pub verified: bool,
}

impl CertificateRequest {
    /// Build and sign a request for the public key paired with
    /// `signing_key`.
    pub fn new(
        signing_key: &mut SigningKey,
        subject: Tlv<'static>,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self> {
        let vkey = VerifyingKey::from_signing_key(signing_key)?;
        if signing_key
            .verifykey_number()
            .ct_eq(vkey.number())
            .unwrap_u8()
            == 0
        {
            return Err(Error::NotEqualData);
        }
        let mut request = CertificateRequest {
            vkey,
            subject,
            signature: Vec::new(),
            verified: true,
        };
        // the signature is produced as a side effect of the export
        request.export_to_asn1(signing_key, rng)?;
        Ok(request)
    }

    fn build_tbs(&self) -> Result<Tlv<'static>> {
        let mut tbs = Asn1::new();
        tbs.add_u32(0)?;
        tbs.add_tlv(self.subject.clone());
        tbs.add_tlv(pubkey::encode(&self.vkey)?);
        tbs.add_asn1(Tag::context_constructed(0), Asn1::new())?;
        Ok(Tlv::constructed(Tag::SEQUENCE, tbs)?)
    }

    /// Re-sign and serialize the request as an ASN.1 tree.
    pub fn export_to_asn1(
        &mut self,
        signing_key: &mut SigningKey,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Asn1<'static>> {
        let tbs = self.build_tbs()?;
        let tbs_der = tbs.to_der()?;
        let signature = signing_key.sign(rng, &tbs_der)?;

        let mut level = Asn1::new();
        level.add_tlv(tbs);
        level.add_algorithm_identifier(signing_key.algorithm_oid(), None)?;
        level.add_bit_string(&BitString::new(0, signature.clone())?)?;

        let mut root = Asn1::new();
        root.add_sequence(level)?;
        self.signature = signature;
        Ok(root)
    }

    /// Re-sign and serialize to DER.
    pub fn export_to_der(
        &mut self,
        signing_key: &mut SigningKey,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>> {
        Ok(self.export_to_asn1(signing_key, rng)?.to_der()?)
    }

    /// Re-sign and write to a file in the requested format.
    pub fn export_to_file(
        &mut self,
        signing_key: &mut SigningKey,
        rng: &mut impl CryptoRngCore,
        path: impl AsRef<Path>,
        format: Format,
    ) -> Result<()> {
        let asn1 = self.export_to_asn1(signing_key, rng)?;
        asn1.export_to_file(path, format, ContentType::CertificateRequest)?;
        Ok(())
    }

    /// Parse a request tree and verify the self-signature over the exact
    /// encoded request-info octets.
    ///
    /// A failed signature does not abort the import: the subject and key
    /// are still extracted, and [`CertificateRequest::verified`] is
    /// cleared so a caller can inspect the invalid request.
    pub fn import_from_asn1(root: &Asn1<'_>) -> Result<Self> {
        let level = root
            .get(0)
            .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
            .expect_constructed(Tag::SEQUENCE)?;
        if level.len() != 3 {
            return Err(Error::Asn1(gostasn1::Error::InvalidCount));
        }

        let tbs_node = &level.nodes()[0];
        let tbs = tbs_node.expect_constructed(Tag::SEQUENCE)?;
        if tbs.len() != 4 {
            return Err(Error::Asn1(gostasn1::Error::InvalidCount));
        }
        if tbs.nodes()[0].as_u32()? != 0 {
            return Err(Error::InvalidValue);
        }
        tbs.nodes()[1].expect_constructed(Tag::SEQUENCE)?;
        let subject = tbs.nodes()[1].clone().into_owned();
        let vkey = pubkey::decode(&tbs.nodes()[2])?;

        let (algorithm, _) = level.nodes()[1].as_algorithm_identifier()?;
        if algorithm != vkey.algorithm_oid() {
            return Err(Error::OidEngine);
        }

        let bits = level.nodes()[2].as_bit_string()?;
        if bits.unused != 0 {
            return Err(Error::InvalidValue);
        }
        let signature = bits.value.to_vec();

        let tbs_der = tbs_node.to_der()?;
        let verified = vkey.verify(&tbs_der, &signature).is_ok();

        Ok(CertificateRequest {
            vkey,
            subject,
            signature,
            verified,
        })
    }

    /// Parse DER octets.
    pub fn import_from_der(der: &[u8]) -> Result<Self> {
        let root = Asn1::from_der(der)?;
        Self::import_from_asn1(&root)
    }

    /// Read a request from a DER or PEM file.
    pub fn import_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let (root, _) = Asn1::import_from_file(path)?;
        Self::import_from_asn1(&root)
    }
}
