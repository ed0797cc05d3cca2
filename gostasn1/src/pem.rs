//! PEM framing: base64-wrapped DER with `-----BEGIN …-----` markers.

use crate::{Error, Result};
use base64ct::{Base64, Encoding};

/// Width of the base64 body lines.
const LINE_WIDTH: usize = 64;

/// Content carried by an exported tree, selecting the PEM label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    /// Public-key certificate.
    Certificate,
    /// Certificate signing request.
    CertificateRequest,
    /// Secret-key container.
    PrivateKey,
    /// Wrapped symmetric key.
    EncryptedSymmetricKey,
    /// Encrypted payload.
    EncryptedData,
    /// Unencrypted payload.
    PlainData,
    /// PKCS#7 certificate bundle.
    Pkcs7,
}

impl ContentType {
    /// PEM label used between the BEGIN/END markers.
    pub const fn label(self) -> &'static str {
        match self {
            ContentType::Certificate => "CERTIFICATE",
            ContentType::CertificateRequest => "CERTIFICATE REQUEST",
            ContentType::PrivateKey => "PRIVATE KEY",
            ContentType::EncryptedSymmetricKey => "ENCRYPTED SYMMETRIC KEY",
            ContentType::EncryptedData => "ENCRYPTED DATA",
            ContentType::PlainData => "PLAIN DATA",
            ContentType::Pkcs7 => "PKCS7",
        }
    }
}

/// Wrap DER octets into a PEM document with the given label.
pub fn encode(der: &[u8], content: ContentType) -> String {
    let body = Base64::encode_string(der);
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 64);
    out.push_str("-----BEGIN ");
    out.push_str(content.label());
    out.push_str("-----\n");
    for chunk in body.as_bytes().chunks(LINE_WIDTH) {
        // chunks of an ASCII string stay ASCII
        out.push_str(core::str::from_utf8(chunk).expect("base64 output is ASCII"));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(content.label());
    out.push_str("-----\n");
    out
}

/// Extract the DER octets from a PEM document; the label is not checked
/// against any expectation, only the framing.
pub fn decode(text: &[u8]) -> Result<Vec<u8>> {
    let text = core::str::from_utf8(text).map_err(|_| Error::Pem)?;
    let mut body = String::new();
    let mut inside = false;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("-----BEGIN ") && line.ends_with("-----") {
            inside = true;
            continue;
        }
        if line.starts_with("-----END ") {
            if !inside {
                return Err(Error::Pem);
            }
            return Base64::decode_vec(&body).map_err(|_| Error::Pem);
        }
        if inside && !line.is_empty() {
            body.push_str(line);
        }
    }
    Err(Error::Pem)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, ContentType};

    #[test]
    fn roundtrip_with_line_wrapping() {
        let der: Vec<u8> = (0u8..=255).cycle().take(300).collect();
        let pem = encode(&der, ContentType::Certificate);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(pem.lines().all(|line| line.len() <= 64));
        assert_eq!(decode(pem.as_bytes()).unwrap(), der);
    }

    #[test]
    fn labels() {
        assert_eq!(ContentType::CertificateRequest.label(), "CERTIFICATE REQUEST");
        assert_eq!(ContentType::EncryptedSymmetricKey.label(), "ENCRYPTED SYMMETRIC KEY");
        assert_eq!(ContentType::Pkcs7.label(), "PKCS7");
    }

    #[test]
    fn missing_framing_rejected() {
        assert!(decode(b"AQIDBA==").is_err());
        assert!(decode(b"-----END CERTIFICATE-----").is_err());
    }
}
