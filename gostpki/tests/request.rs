//! Certificate-request round trips.

use gost3410::{curve, SigningKey};
use gostasn1::name;
use gostpki::CertificateRequest;
use rand_core::OsRng;

fn subject() -> gostasn1::Tlv<'static> {
    let mut subject = name::new();
    name::add_component(&mut subject, "cn", "Requesting Party").expect("cn");
    name::add_component(&mut subject, "email", "party@example.ru").expect("email");
    subject
}

#[test]
fn request_roundtrip() {
    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let mut request = CertificateRequest::new(&mut key, subject(), &mut OsRng).expect("request");
    let der = request.export_to_der(&mut key, &mut OsRng).expect("export");

    let imported = CertificateRequest::import_from_der(&der).expect("import");
    assert!(imported.verified);
    assert!(name::equal(&imported.subject, &subject()));
    assert_eq!(imported.vkey.number(), request.vkey.number());
    assert_eq!(
        name::component(&imported.subject, "1.2.840.113549.1.9.1"),
        Some("party@example.ru")
    );
}

#[test]
fn request_roundtrip_512() {
    let mut key =
        SigningKey::random(&curve::TC26_GOST_3410_2012_512_PARAM_SET_B, &mut OsRng).expect("keygen");
    let mut request = CertificateRequest::new(&mut key, subject(), &mut OsRng).expect("request");
    let der = request.export_to_der(&mut key, &mut OsRng).expect("export");

    let imported = CertificateRequest::import_from_der(&der).expect("import");
    assert!(imported.verified);
    assert_eq!(imported.signature.len(), 128);
}

#[test]
fn tampered_request_still_surfaces_its_fields() {
    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let mut request = CertificateRequest::new(&mut key, subject(), &mut OsRng).expect("request");
    let mut der = request.export_to_der(&mut key, &mut OsRng).expect("export");

    // flip one bit inside the trailing signature BIT STRING
    let last = der.len() - 1;
    der[last] ^= 0x01;

    let imported = CertificateRequest::import_from_der(&der).expect("import");
    assert!(!imported.verified, "broken signature must clear the flag");
    assert!(name::equal(&imported.subject, &subject()));
    assert_eq!(imported.vkey.number(), request.vkey.number());
}

#[test]
fn request_pem_file_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("request.csr");

    let mut key =
        SigningKey::random(&curve::RFC4357_GOST_3410_2001_PARAM_SET_A, &mut OsRng).expect("keygen");
    let mut request = CertificateRequest::new(&mut key, subject(), &mut OsRng).expect("request");
    request
        .export_to_file(&mut key, &mut OsRng, &path, gostpki::Format::Pem)
        .expect("export");

    let text = std::fs::read_to_string(&path).expect("read");
    assert!(text.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));

    let imported = CertificateRequest::import_from_file(&path).expect("import");
    assert!(imported.verified);
}
