//! Certificate build, parse and validation paths.

use gost3410::{curve, SigningKey, VerifyingKey};
use gostasn1::name;
use gostpki::certificate::{
    KEY_USAGE_CRL_SIGN, KEY_USAGE_DIGITAL_SIGNATURE, KEY_USAGE_KEY_CERT_SIGN,
};
use gostpki::{BasicConstraints, Certificate, CertificateOpts, Error, Issuer};
use rand_core::OsRng;
use time::{Duration, OffsetDateTime};

fn subject(cn: &str) -> gostasn1::Tlv<'static> {
    let mut subject = name::new();
    name::add_component(&mut subject, "cn", cn).expect("cn");
    name::add_component(&mut subject, "ct", "RU").expect("country");
    name::add_component(&mut subject, "or", "Example Org").expect("org");
    subject
}

fn ca_opts(cn: &str) -> CertificateOpts {
    let mut opts = CertificateOpts::new(subject(cn));
    opts.basic_constraints = Some(BasicConstraints {
        ca: true,
        path_len: Some(0),
    });
    opts.key_usage = Some(KEY_USAGE_KEY_CERT_SIGN | KEY_USAGE_CRL_SIGN);
    opts.include_issuer_name = true;
    opts
}

fn make_ca(cn: &str) -> (SigningKey, Certificate, Vec<u8>) {
    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let public = VerifyingKey::from_signing_key(&key).expect("public");
    let mut certificate = Certificate::new(public, ca_opts(cn));
    let der = certificate
        .export_to_der(&mut key, Issuer::SelfSigned, &mut OsRng)
        .expect("export");
    (key, certificate, der)
}

#[test]
fn self_signed_ca_roundtrip() {
    let (_key, original, der) = make_ca("Example Root CA");

    let imported = Certificate::import_from_der(&der, None).expect("import");
    assert!(imported.verdict.is_verified());
    assert!(imported.is_self_signed());
    assert!(imported.is_ca());

    // extension values survive
    assert_eq!(
        imported.opts.basic_constraints,
        Some(BasicConstraints {
            ca: true,
            path_len: Some(0)
        })
    );
    assert_eq!(
        imported.opts.key_usage,
        Some(KEY_USAGE_KEY_CERT_SIGN | KEY_USAGE_CRL_SIGN)
    );

    // subject equals issuer, and the key fingerprint survives
    assert!(name::equal(
        imported.subject(),
        imported.issuer_subject.as_ref().expect("issuer name")
    ));
    assert_eq!(imported.vkey.number(), original.vkey.number());
    assert_eq!(imported.serial, original.serial);
    assert_eq!(
        imported.authority_key_id.as_deref(),
        Some(original.vkey.number().as_slice())
    );
}

#[test]
fn issued_certificate_verifies_against_its_ca() {
    let (mut ca_key, ca_cert, _der) = make_ca("Example Root CA");

    let mut subject_key =
        SigningKey::random(&curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST, &mut OsRng)
            .expect("keygen");
    let subject_public = VerifyingKey::from_signing_key(&subject_key).expect("public");

    let mut opts = CertificateOpts::new(subject("Leaf"));
    opts.key_usage = Some(KEY_USAGE_DIGITAL_SIGNATURE);
    opts.secret_key_number = Some(*subject_key.number());
    let mut leaf = Certificate::new(subject_public, opts);
    let der = leaf
        .export_to_der(&mut ca_key, Issuer::External(&ca_cert), &mut OsRng)
        .expect("export");

    let imported = Certificate::import_from_der(&der, Some(&ca_cert)).expect("import");
    assert!(imported.verdict.is_verified());
    assert!(!imported.is_self_signed());
    assert_eq!(
        imported.opts.secret_key_number.as_ref(),
        Some(subject_key.number())
    );
    assert_eq!(imported.issuer_serial.as_deref(), Some(&ca_cert.serial[..]));

    // the serial is reproducible from the two key numbers
    let expected =
        gostpki::certificate::derive_serial(&ca_key, imported.vkey.number(), 32);
    assert_eq!(imported.serial, expected);

    drop(subject_key);
}

#[test]
fn import_without_issuer_materializes_unverified() {
    let (mut ca_key, ca_cert, _der) = make_ca("Example Root CA");
    let subject_key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let subject_public = VerifyingKey::from_signing_key(&subject_key).expect("public");

    let mut leaf = Certificate::new(subject_public, CertificateOpts::new(subject("Leaf")));
    let der = leaf
        .export_to_der(&mut ca_key, Issuer::External(&ca_cert), &mut OsRng)
        .expect("export");

    let failure = Certificate::import_from_der(&der, None).unwrap_err();
    assert_eq!(failure.error, Error::CertificateVerifyKey);
    let partial = failure.certificate.expect("materialized certificate");
    assert!(!partial.verdict.is_verified());
    assert!(name::equal(partial.subject(), &subject("Leaf")));
    assert!(!partial.signature.is_empty());
}

#[test]
fn issuer_name_mismatch_is_flagged() {
    let (mut ca_key, ca_cert, _der) = make_ca("Example Root CA");
    let (_other_key, other_cert, _other_der) = make_ca("Another CA");

    let subject_key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let subject_public = VerifyingKey::from_signing_key(&subject_key).expect("public");
    let mut leaf = Certificate::new(subject_public, CertificateOpts::new(subject("Leaf")));
    let der = leaf
        .export_to_der(&mut ca_key, Issuer::External(&ca_cert), &mut OsRng)
        .expect("export");

    let failure = Certificate::import_from_der(&der, Some(&other_cert)).unwrap_err();
    assert_eq!(failure.error, Error::CertificateVerifyNames);
}

#[test]
fn tampered_signature_is_flagged() {
    let (_key, _cert, mut der) = make_ca("Example Root CA");
    let last = der.len() - 1;
    der[last] ^= 0x40;

    let failure = Certificate::import_from_der(&der, None).unwrap_err();
    assert_eq!(failure.error, Error::CertificateSignature);
    assert!(failure.certificate.is_some());
}

#[test]
fn non_ca_issuer_is_refused_at_export() {
    let (mut ca_key, _ca_cert, _der) = make_ca("Example Root CA");

    // a certificate without BasicConstraints cannot issue
    let plain_key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let plain_public = VerifyingKey::from_signing_key(&plain_key).expect("public");
    let plain_cert = Certificate::new(plain_public, CertificateOpts::new(subject("Plain")));

    let subject_key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let subject_public = VerifyingKey::from_signing_key(&subject_key).expect("public");
    let mut leaf = Certificate::new(subject_public, CertificateOpts::new(subject("Leaf")));

    assert_eq!(
        leaf.export_to_der(&mut ca_key, Issuer::External(&plain_cert), &mut OsRng)
            .unwrap_err(),
        Error::CertificateCa
    );
}

#[test]
fn expired_issuer_is_refused_at_export() {
    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let public = VerifyingKey::from_signing_key(&key).expect("public");

    let mut opts = ca_opts("Expired CA");
    opts.not_before = OffsetDateTime::now_utc() - Duration::days(730);
    opts.not_after = OffsetDateTime::now_utc() - Duration::days(365);
    let mut certificate = Certificate::new(public, opts);

    assert_eq!(
        certificate
            .export_to_der(&mut key, Issuer::SelfSigned, &mut OsRng)
            .unwrap_err(),
        Error::CertificateValidity
    );
}

#[test]
fn foreign_signing_key_is_refused_at_export() {
    let (_ca_key, ca_cert, _der) = make_ca("Example Root CA");
    let mut unrelated =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");

    let subject_key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let subject_public = VerifyingKey::from_signing_key(&subject_key).expect("public");
    let mut leaf = Certificate::new(subject_public, CertificateOpts::new(subject("Leaf")));

    assert_eq!(
        leaf.export_to_der(&mut unrelated, Issuer::External(&ca_cert), &mut OsRng)
            .unwrap_err(),
        Error::CertificateVerifyKey
    );
}

#[test]
fn pem_certificate_file_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("root.crt");

    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let public = VerifyingKey::from_signing_key(&key).expect("public");
    let mut certificate = Certificate::new(public, ca_opts("PEM Root"));
    certificate
        .export_to_file(
            &mut key,
            Issuer::SelfSigned,
            &mut OsRng,
            &path,
            gostpki::Format::Pem,
        )
        .expect("export");

    let text = std::fs::read_to_string(&path).expect("read");
    assert!(text.starts_with("-----BEGIN CERTIFICATE-----"));

    let imported = Certificate::import_from_file(&path, None).expect("import");
    assert!(imported.verdict.is_verified());
    assert_eq!(imported.serial, certificate.serial);
}
