//! X.509 v3 style public-key certificates.
//!
//! Certificates are built and parsed through the ASN.1 tree model; the
//! `TBSCertificate` layout, the serial-number derivation and the
//! extension set follow R 1323565.1.023-2018.

use crate::{oids, pubkey, Error, Result};
use gost3410::{SigningKey, VerifyingKey};
use gostasn1::{Asn1, BitString, Class, ContentType, Format, Tag, Tlv};
use rand_core::CryptoRngCore;
use std::path::Path;
use time::{Duration, OffsetDateTime};

/// `digitalSignature` flag of the KeyUsage extension.
pub const KEY_USAGE_DIGITAL_SIGNATURE: u32 = 256;
/// `contentCommitment` flag of the KeyUsage extension.
pub const KEY_USAGE_CONTENT_COMMITMENT: u32 = 128;
/// `keyEncipherment` flag of the KeyUsage extension.
pub const KEY_USAGE_KEY_ENCIPHERMENT: u32 = 64;
/// `dataEncipherment` flag of the KeyUsage extension.
pub const KEY_USAGE_DATA_ENCIPHERMENT: u32 = 32;
/// `keyAgreement` flag of the KeyUsage extension.
pub const KEY_USAGE_KEY_AGREEMENT: u32 = 16;
/// `keyCertSign` flag of the KeyUsage extension.
pub const KEY_USAGE_KEY_CERT_SIGN: u32 = 8;
/// `cRLSign` flag of the KeyUsage extension.
pub const KEY_USAGE_CRL_SIGN: u32 = 4;
/// `encipherOnly` flag of the KeyUsage extension.
pub const KEY_USAGE_ENCIPHER_ONLY: u32 = 2;
/// `decipherOnly` flag of the KeyUsage extension.
pub const KEY_USAGE_DECIPHER_ONLY: u32 = 1;

/// BasicConstraints extension value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BasicConstraints {
    /// Whether the certified key belongs to a certificate authority.
    pub ca: bool,
    /// Maximum number of intermediate certificates below this one;
    /// serialized only for CA certificates.
    pub path_len: Option<u32>,
}

/// Options controlling certificate creation, and the fields recovered on
/// import.
#[derive(Clone, Debug)]
pub struct CertificateOpts {
    /// Subject distinguished name.
    pub subject: Tlv<'static>,
    /// Start of the validity interval (UTC).
    pub not_before: OffsetDateTime,
    /// End of the validity interval (UTC).
    pub not_after: OffsetDateTime,
    /// Requested width of the derived serial number in octets (at most
    /// the issuer's digest width).
    pub serial_length: usize,
    /// BasicConstraints extension, if present.
    pub basic_constraints: Option<BasicConstraints>,
    /// KeyUsage extension bit mask, if present.
    pub key_usage: Option<u32>,
    /// Whether AuthorityKeyIdentifier carries the issuer name.
    pub include_issuer_name: bool,
    /// SecretKeyNumber extension value, if present.
    pub secret_key_number: Option<[u8; 32]>,
}

impl CertificateOpts {
    /// Options with a one-year validity starting now and no optional
    /// extensions.
    pub fn new(subject: Tlv<'static>) -> Self {
        let now = OffsetDateTime::now_utc();
        CertificateOpts {
            subject,
            not_before: now,
            not_after: now + Duration::days(365),
            serial_length: 32,
            basic_constraints: None,
            key_usage: None,
            include_issuer_name: false,
            secret_key_number: None,
        }
    }
}

/// Who signs a certificate.
pub enum Issuer<'a> {
    /// The certificate signs itself; the subject acts as its own issuer.
    SelfSigned,
    /// An external certificate-authority certificate.
    External(&'a Certificate),
}

/// Outcome of the validation phase of an import.
#[derive(Debug)]
pub enum ImportVerdict {
    /// The signature chain verified.
    Verified,
    /// The certificate materialized, but validation failed with the
    /// carried error.
    Unverified(Error),
}

impl ImportVerdict {
    /// Whether validation passed.
    pub fn is_verified(&self) -> bool {
        matches!(self, ImportVerdict::Verified)
    }
}

/// Import failure: the error, plus the materialized certificate when the
/// structure was sound enough to keep for inspection.
#[derive(Debug)]
pub struct CertificateImportError {
    /// What went wrong.
    pub error: Error,
    /// The partially validated certificate, for diagnostics.
    pub certificate: Option<Box<Certificate>>,
}

impl core::fmt::Display for CertificateImportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for CertificateImportError {}

impl From<Error> for CertificateImportError {
    fn from(error: Error) -> Self {
        CertificateImportError {
            error,
            certificate: None,
        }
    }
}

impl From<gostasn1::Error> for CertificateImportError {
    fn from(error: gostasn1::Error) -> Self {
        Error::from(error).into()
    }
}

impl From<gost3410::Error> for CertificateImportError {
    fn from(error: gost3410::Error) -> Self {
        Error::from(error).into()
    }
}

/// Parsing progress of the certificate importer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ImportState {
    AwaitTopSequence,
    AwaitTbs,
    AwaitExtensions,
    Done,
}

/// A public-key certificate: the certified key, its attributes, and the
/// issuer binding recovered from or written into the wire form.
#[derive(Debug)]
pub struct Certificate {
    /// The certified public key.
    pub vkey: VerifyingKey,
    /// Creation options / recovered attributes.
    pub opts: CertificateOpts,
    /// Serial number (derived on export, read on import).
    pub serial: Vec<u8>,
    /// Issuer distinguished name.
    pub issuer_subject: Option<Tlv<'static>>,
    /// Issuer serial number from AuthorityKeyIdentifier, if present.
    pub issuer_serial: Option<Vec<u8>>,
    /// Issuer key fingerprint from AuthorityKeyIdentifier, if present.
    pub authority_key_id: Option<Vec<u8>>,
    /// Raw signature octets of the outer envelope.
    pub signature: Vec<u8>,
    /// Validation outcome.
    pub verdict: ImportVerdict,
}

/// Serial number bound to the (subject key, issuer key) pair:
/// the issuer-hash of `subject_key_number ‖ issuer_key_number`, truncated
/// to `length` octets.
pub fn derive_serial(
    issuer_key: &SigningKey,
    subject_key_number: &[u8; 32],
    length: usize,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(subject_key_number);
    data.extend_from_slice(issuer_key.number());
    let digest = issuer_key.hash_function().digest(&data);
    let length = length.min(digest.len()).max(1);
    // canonical INTEGER magnitude, so the stored serial matches its
    // encoding octet for octet
    let serial = &digest[..length];
    let skip = serial.iter().take_while(|&&b| b == 0).count();
    serial[skip.min(length - 1)..].to_vec()
}

//
// Extension builders. Every value is an OCTET STRING holding the DER of
// the inner structure.
//

fn extension(oid: &str, critical: Option<bool>, inner: &Tlv<'_>) -> Result<Tlv<'static>> {
    let mut seq = Asn1::new();
    seq.add_oid(oid)?;
    if let Some(critical) = critical {
        seq.add_bool(critical)?;
    }
    seq.add_octet_string(&inner.to_der()?)?;
    Ok(Tlv::constructed(Tag::SEQUENCE, seq)?)
}

/// SubjectKeyIdentifier (2.5.29.14).
fn ext_subject_key_identifier(number: &[u8]) -> Result<Tlv<'static>> {
    let inner = Tlv::primitive(Tag::OCTET_STRING, number.to_vec())?;
    extension(oids::EXT_SUBJECT_KEY_IDENTIFIER, None, &inner)
}

/// BasicConstraints (2.5.29.19), critical.
fn ext_basic_constraints(value: &BasicConstraints) -> Result<Tlv<'static>> {
    let mut seq = Asn1::new();
    seq.add_bool(value.ca)?;
    if value.ca {
        if let Some(path_len) = value.path_len {
            seq.add_u32(path_len)?;
        }
    }
    let inner = Tlv::constructed(Tag::SEQUENCE, seq)?;
    extension(oids::EXT_BASIC_CONSTRAINTS, Some(true), &inner)
}

/// KeyUsage (2.5.29.15); `bits` is the 9-flag mask.
fn ext_key_usage(bits: u32) -> Result<Tlv<'static>> {
    if bits == 0 || bits > 0x1ff {
        return Err(Error::InvalidValue);
    }
    let first = ((bits >> 1) & 0xff) as u8;
    let data = if bits & KEY_USAGE_DECIPHER_ONLY != 0 {
        vec![7u8, first, 0x80]
    } else {
        vec![0u8, first]
    };
    let inner = Tlv::primitive(Tag::BIT_STRING, data)?;
    extension(oids::EXT_KEY_USAGE, None, &inner)
}

/// AuthorityKeyIdentifier (2.5.29.35).
fn ext_authority_key_identifier(
    issuer_key_id: &[u8],
    issuer_name: Option<&Tlv<'static>>,
    issuer_serial: Option<&[u8]>,
) -> Result<Tlv<'static>> {
    let mut seq = Asn1::new();
    seq.add_tlv(Tlv::primitive(Tag::context(0), issuer_key_id.to_vec())?);
    if let Some(name) = issuer_name {
        let mut names = Asn1::new();
        names.add_tlv(name.clone());
        let mut wrapper = Asn1::new();
        wrapper.add_asn1(Tag::context_constructed(4), names)?;
        seq.add_asn1(Tag::context_constructed(1), wrapper)?;
    }
    if let Some(serial) = issuer_serial {
        seq.add_tlv(Tlv::primitive(Tag::context(2), serial.to_vec())?);
    }
    let inner = Tlv::constructed(Tag::SEQUENCE, seq)?;
    extension(oids::EXT_AUTHORITY_KEY_IDENTIFIER, None, &inner)
}

/// SecretKeyNumber (1.2.643.2.52.1.98.1), library-private.
fn ext_secret_key_number(number: &[u8]) -> Result<Tlv<'static>> {
    let inner = Tlv::primitive(Tag::OCTET_STRING, number.to_vec())?;
    extension(oids::EXT_SECRET_KEY_NUMBER, None, &inner)
}

impl Certificate {
    /// An unsigned certificate object for `vkey` with the given options.
    pub fn new(vkey: VerifyingKey, opts: CertificateOpts) -> Self {
        Certificate {
            vkey,
            opts,
            serial: Vec::new(),
            issuer_subject: None,
            issuer_serial: None,
            authority_key_id: None,
            signature: Vec::new(),
            verdict: ImportVerdict::Verified,
        }
    }

    /// Subject distinguished name.
    pub fn subject(&self) -> &Tlv<'static> {
        &self.opts.subject
    }

    /// Whether BasicConstraints marks the certificate as a CA one.
    pub fn is_ca(&self) -> bool {
        self.opts
            .basic_constraints
            .map(|value| value.ca)
            .unwrap_or(false)
    }

    /// Whether AuthorityKeyIdentifier points back at the certificate's
    /// own key.
    pub fn is_self_signed(&self) -> bool {
        self.authority_key_id
            .as_deref()
            .map(|id| id == self.vkey.number())
            .unwrap_or(false)
    }

    fn build_tbs(
        &self,
        issuer_key: &SigningKey,
        issuer_subject: &Tlv<'static>,
        issuer_key_id: &[u8; 32],
        serial: &[u8],
        aki_serial: Option<&[u8]>,
    ) -> Result<Tlv<'static>> {
        let mut tbs = Asn1::new();

        // [0] { INTEGER 2 } — certificates of the third version
        let mut version = Asn1::new();
        version.add_u32(2)?;
        tbs.add_asn1(Tag::context_constructed(0), version)?;

        tbs.add_uint(serial)?;
        tbs.add_algorithm_identifier(issuer_key.algorithm_oid(), None)?;
        tbs.add_tlv(issuer_subject.clone());
        tbs.add_validity(self.opts.not_before, self.opts.not_after)?;
        tbs.add_tlv(self.opts.subject.clone());
        tbs.add_tlv(pubkey::encode(&self.vkey)?);

        let mut extensions = Asn1::new();
        extensions.add_tlv(ext_subject_key_identifier(self.vkey.number())?);
        if let Some(value) = &self.opts.basic_constraints {
            extensions.add_tlv(ext_basic_constraints(value)?);
        }
        if let Some(bits) = self.opts.key_usage {
            extensions.add_tlv(ext_key_usage(bits)?);
        }
        extensions.add_tlv(ext_authority_key_identifier(
            issuer_key_id,
            self.opts.include_issuer_name.then_some(issuer_subject),
            aki_serial,
        )?);
        if let Some(number) = &self.opts.secret_key_number {
            extensions.add_tlv(ext_secret_key_number(number)?);
        }

        let mut wrapper = Asn1::new();
        wrapper.add_sequence(extensions)?;
        tbs.add_asn1(Tag::context_constructed(3), wrapper)?;

        Ok(Tlv::constructed(Tag::SEQUENCE, tbs)?)
    }

    /// Sign the certificate and produce its ASN.1 tree.
    ///
    /// Pre-conditions: an external issuer must be a CA certificate whose
    /// validity covers the current moment, and `issuer_key` must belong
    /// to the issuer certificate's public key.
    pub fn export_to_asn1(
        &mut self,
        issuer_key: &mut SigningKey,
        issuer: Issuer<'_>,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Asn1<'static>> {
        let now = OffsetDateTime::now_utc();

        let (issuer_subject, issuer_key_id, issuer_serial, window) = match issuer {
            Issuer::SelfSigned => (
                self.opts.subject.clone(),
                *self.vkey.number(),
                None,
                (self.opts.not_before, self.opts.not_after),
            ),
            Issuer::External(cert) => {
                if !cert.is_ca() {
                    return Err(Error::CertificateCa);
                }
                (
                    cert.opts.subject.clone(),
                    *cert.vkey.number(),
                    Some(cert.serial.clone()),
                    (cert.opts.not_before, cert.opts.not_after),
                )
            }
        };

        if now < window.0 || now > window.1 {
            return Err(Error::CertificateValidity);
        }
        if issuer_key.verifykey_number() != &issuer_key_id {
            return Err(Error::CertificateVerifyKey);
        }

        let serial = derive_serial(issuer_key, self.vkey.number(), self.opts.serial_length);
        let aki_serial = issuer_serial.clone().unwrap_or_else(|| serial.clone());
        let tbs = self.build_tbs(
            issuer_key,
            &issuer_subject,
            &issuer_key_id,
            &serial,
            Some(&aki_serial),
        )?;

        let tbs_der = tbs.to_der()?;
        let signature = issuer_key.sign(rng, &tbs_der)?;

        let mut level = Asn1::new();
        level.add_tlv(tbs);
        level.add_algorithm_identifier(issuer_key.algorithm_oid(), None)?;
        level.add_bit_string(&BitString::new(0, signature.clone())?)?;

        let mut root = Asn1::new();
        root.add_sequence(level)?;

        self.serial = serial;
        self.signature = signature;
        self.issuer_subject = Some(issuer_subject);
        self.issuer_serial = Some(aki_serial);
        self.authority_key_id = Some(issuer_key_id.to_vec());
        self.verdict = ImportVerdict::Verified;
        Ok(root)
    }

    /// Sign and serialize to DER.
    pub fn export_to_der(
        &mut self,
        issuer_key: &mut SigningKey,
        issuer: Issuer<'_>,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>> {
        Ok(self.export_to_asn1(issuer_key, issuer, rng)?.to_der()?)
    }

    /// Sign and write to a file in the requested format.
    pub fn export_to_file(
        &mut self,
        issuer_key: &mut SigningKey,
        issuer: Issuer<'_>,
        rng: &mut impl CryptoRngCore,
        path: impl AsRef<Path>,
        format: Format,
    ) -> Result<()> {
        let asn1 = self.export_to_asn1(issuer_key, issuer, rng)?;
        asn1.export_to_file(path, format, ContentType::Certificate)?;
        Ok(())
    }

    /// Parse and validate a certificate tree.
    ///
    /// Structural and semantic failures abort the import. Validation
    /// failures (unknown issuer, name mismatch, expired window, bad
    /// signature) still materialize the certificate: it is returned with
    /// an [`ImportVerdict::Unverified`] verdict inside the error so the
    /// caller can inspect subject, issuer, validity and signature bytes.
    pub fn import_from_asn1(
        root: &Asn1<'_>,
        issuer: Option<&Certificate>,
    ) -> core::result::Result<Certificate, CertificateImportError> {
        let mut state = ImportState::AwaitTopSequence;

        let level = root
            .get(0)
            .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
            .expect_constructed(Tag::SEQUENCE)?;
        if level.len() != 3 {
            return Err(Error::Asn1(gostasn1::Error::InvalidCount).into());
        }
        debug_assert_eq!(state, ImportState::AwaitTopSequence);
        state = ImportState::AwaitTbs;

        let tbs_node = &level.nodes()[0];
        let tbs = tbs_node.expect_constructed(Tag::SEQUENCE)?;
        if tbs.len() < 7 {
            return Err(Error::Asn1(gostasn1::Error::InvalidCount).into());
        }
        let fields = tbs.nodes();

        // [0] { INTEGER 2 }
        let version = fields[0]
            .expect_constructed(Tag::context_constructed(0))?
            .get(0)
            .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
            .as_u32()?;
        if version != 2 {
            return Err(Error::InvalidValue.into());
        }

        let serial = fields[1].as_uint(64)?.to_vec();

        let (algorithm, _) = fields[2].as_algorithm_identifier()?;
        if algorithm != gost3410::OID_GOST_3410_2012_256
            && algorithm != gost3410::OID_GOST_3410_2012_512
        {
            return Err(Error::OidEngine.into());
        }

        fields[3].expect_constructed(Tag::SEQUENCE)?;
        let issuer_subject = fields[3].clone().into_owned();
        let (not_before, not_after) = fields[4].as_validity()?;
        fields[5].expect_constructed(Tag::SEQUENCE)?;
        let subject = fields[5].clone().into_owned();
        let vkey = pubkey::decode(&fields[6])?;

        debug_assert_eq!(state, ImportState::AwaitTbs);
        state = ImportState::AwaitExtensions;
        let mut basic_constraints = None;
        let mut key_usage = None;
        let mut secret_key_number = None;
        let mut subject_key_id: Option<Vec<u8>> = None;
        let mut authority_key_id: Option<Vec<u8>> = None;
        let mut issuer_serial: Option<Vec<u8>> = None;
        let mut include_issuer_name = false;

        if let Some(wrapper) = fields.get(7) {
            let list = wrapper
                .expect_constructed(Tag::context_constructed(3))?
                .get(0)
                .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
                .expect_constructed(Tag::SEQUENCE)?;
            for item in list.iter() {
                let ext = item.expect_constructed(Tag::SEQUENCE)?;
                if ext.is_empty() {
                    return Err(Error::Asn1(gostasn1::Error::InvalidCount).into());
                }
                let oid = ext.nodes()[0].as_oid()?;
                // an optional criticality BOOLEAN may sit before the value
                let value_node = ext
                    .nodes()
                    .iter()
                    .skip(1)
                    .find(|node| node.tag() == Tag::OCTET_STRING)
                    .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?;
                let value = Asn1::from_der(value_node.as_octet_string()?)?;
                let inner = value
                    .get(0)
                    .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?;

                match oid.as_str() {
                    oids::EXT_SUBJECT_KEY_IDENTIFIER => {
                        subject_key_id = Some(inner.as_octet_string()?.to_vec());
                    }
                    oids::EXT_BASIC_CONSTRAINTS => {
                        let seq = inner.expect_constructed(Tag::SEQUENCE)?;
                        let ca = seq.get(0).map(|node| node.as_bool()).transpose()?.unwrap_or(false);
                        let path_len = match seq.get(1) {
                            Some(node) => Some(node.as_u32()?),
                            None => None,
                        };
                        basic_constraints = Some(BasicConstraints { ca, path_len });
                    }
                    oids::EXT_KEY_USAGE => {
                        let bits = inner.as_bit_string()?;
                        let mut mask = u32::from(*bits.value.first().unwrap_or(&0)) << 1;
                        if bits.value.len() > 1 && bits.value[1] & 0x80 != 0 {
                            mask |= KEY_USAGE_DECIPHER_ONLY;
                        }
                        key_usage = Some(mask);
                    }
                    oids::EXT_AUTHORITY_KEY_IDENTIFIER => {
                        let seq = inner.expect_constructed(Tag::SEQUENCE)?;
                        for part in seq.iter() {
                            if part.tag().class() != Class::ContextSpecific {
                                continue;
                            }
                            match (part.tag().number(), part.tag().is_constructed()) {
                                (0, false) => {
                                    if let gostasn1::Content::Primitive(data) = part.content() {
                                        authority_key_id = Some(data.to_vec());
                                    }
                                }
                                (1, true) => include_issuer_name = true,
                                (2, false) => {
                                    if let gostasn1::Content::Primitive(data) = part.content() {
                                        issuer_serial = Some(data.to_vec());
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    oids::EXT_SECRET_KEY_NUMBER => {
                        let bytes = inner.as_octet_string()?;
                        secret_key_number =
                            Some(bytes.try_into().map_err(|_| Error::WrongLength)?);
                    }
                    _ => {}
                }
            }
        }
        debug_assert_eq!(state, ImportState::AwaitExtensions);
        state = ImportState::Done;
        debug_assert_eq!(state, ImportState::Done);

        let bits = level.nodes()[2].as_bit_string()?;
        if bits.unused != 0 {
            return Err(Error::InvalidValue.into());
        }
        let signature = bits.value.to_vec();

        let mut certificate = Certificate {
            vkey,
            opts: CertificateOpts {
                subject,
                not_before,
                not_after,
                serial_length: serial.len(),
                basic_constraints,
                key_usage,
                include_issuer_name,
                secret_key_number,
            },
            serial,
            issuer_subject: Some(issuer_subject),
            issuer_serial,
            authority_key_id,
            signature,
            verdict: ImportVerdict::Verified,
        };

        let tbs_der = tbs_node.to_der()?;
        let verdict = validate(&certificate, &subject_key_id, &tbs_der, issuer);
        match verdict {
            ImportVerdict::Verified => {
                certificate.verdict = ImportVerdict::Verified;
                Ok(certificate)
            }
            ImportVerdict::Unverified(error) => {
                let error_copy = clone_validation_error(&error);
                certificate.verdict = ImportVerdict::Unverified(error);
                Err(CertificateImportError {
                    error: error_copy,
                    certificate: Some(Box::new(certificate)),
                })
            }
        }
    }

    /// Parse and validate DER octets.
    pub fn import_from_der(
        der: &[u8],
        issuer: Option<&Certificate>,
    ) -> core::result::Result<Certificate, CertificateImportError> {
        let root = Asn1::from_der(der).map_err(Error::from)?;
        Certificate::import_from_asn1(&root, issuer)
    }

    /// Read a certificate from a DER or PEM file.
    pub fn import_from_file(
        path: impl AsRef<Path>,
        issuer: Option<&Certificate>,
    ) -> core::result::Result<Certificate, CertificateImportError> {
        let (root, _) = Asn1::import_from_file(path).map_err(Error::from)?;
        Certificate::import_from_asn1(&root, issuer)
    }
}

/// Validation phase of the importer.
fn validate(
    certificate: &Certificate,
    subject_key_id: &Option<Vec<u8>>,
    tbs_der: &[u8],
    issuer: Option<&Certificate>,
) -> ImportVerdict {
    let now = OffsetDateTime::now_utc();
    if now < certificate.opts.not_before || now > certificate.opts.not_after {
        return ImportVerdict::Unverified(Error::CertificateValidity);
    }

    // self-signed detection: AuthorityKeyIdentifier[0] equals the
    // just-decoded SubjectKeyIdentifier
    let own_id = subject_key_id
        .as_deref()
        .unwrap_or_else(|| certificate.vkey.number().as_slice());
    let self_signed = certificate
        .authority_key_id
        .as_deref()
        .map(|id| id == own_id)
        .unwrap_or(false);

    let issuer_vkey = if self_signed {
        &certificate.vkey
    } else {
        match issuer {
            Some(parent) => {
                let matches = match (&certificate.issuer_subject, parent.subject().to_der()) {
                    (Some(child_issuer), Ok(parent_der)) => child_issuer
                        .to_der()
                        .map(|child_der| child_der == parent_der)
                        .unwrap_or(false),
                    _ => false,
                };
                if !matches {
                    return ImportVerdict::Unverified(Error::CertificateVerifyNames);
                }
                &parent.vkey
            }
            None => return ImportVerdict::Unverified(Error::CertificateVerifyKey),
        }
    };

    match issuer_vkey.verify(tbs_der, &certificate.signature) {
        Ok(()) => ImportVerdict::Verified,
        Err(_) => ImportVerdict::Unverified(Error::CertificateSignature),
    }
}

/// Validation errors are plain variants, so a structural copy is enough
/// to surface the same code twice (verdict and import error).
fn clone_validation_error(error: &Error) -> Error {
    match error {
        Error::CertificateValidity => Error::CertificateValidity,
        Error::CertificateVerifyNames => Error::CertificateVerifyNames,
        Error::CertificateVerifyKey => Error::CertificateVerifyKey,
        Error::CertificateSignature => Error::CertificateSignature,
        Error::CertificateCa => Error::CertificateCa,
        _ => Error::NotEqualData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_usage_single_octet_encoding() {
        let node = ext_key_usage(KEY_USAGE_KEY_CERT_SIGN | KEY_USAGE_CRL_SIGN).unwrap();
        let seq = node.children().unwrap();
        let value = Asn1::from_der(seq.nodes()[1].as_octet_string().unwrap()).unwrap();
        let bits = value.get(0).unwrap().as_bit_string().unwrap();
        assert_eq!(bits.unused, 0);
        assert_eq!(&bits.value[..], [0x06]);
    }

    #[test]
    fn key_usage_decipher_only_needs_second_octet() {
        let node = ext_key_usage(KEY_USAGE_DIGITAL_SIGNATURE | KEY_USAGE_DECIPHER_ONLY).unwrap();
        let seq = node.children().unwrap();
        let value = Asn1::from_der(seq.nodes()[1].as_octet_string().unwrap()).unwrap();
        let bits = value.get(0).unwrap().as_bit_string().unwrap();
        assert_eq!(bits.unused, 7);
        assert_eq!(&bits.value[..], [0x80, 0x80]);
    }

    #[test]
    fn key_usage_rejects_out_of_range_masks() {
        assert!(ext_key_usage(0).is_err());
        assert!(ext_key_usage(0x200).is_err());
    }

    #[test]
    fn basic_constraints_is_critical() {
        let node = ext_basic_constraints(&BasicConstraints {
            ca: true,
            path_len: Some(0),
        })
        .unwrap();
        let seq = node.children().unwrap();
        assert_eq!(seq.nodes()[0].as_oid().unwrap(), oids::EXT_BASIC_CONSTRAINTS);
        assert!(seq.nodes()[1].as_bool().unwrap());
        let value = Asn1::from_der(seq.nodes()[2].as_octet_string().unwrap()).unwrap();
        let inner = value.get(0).unwrap().children().unwrap();
        assert!(inner.nodes()[0].as_bool().unwrap());
        assert_eq!(inner.nodes()[1].as_u32().unwrap(), 0);
    }
}
