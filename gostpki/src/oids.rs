//! Object identifier registry.

/// Marker of a secret-key container.
pub const CONTAINER: &str = "1.2.643.2.52.1.127.1.1";

/// BasicKeyMetaData method: derived keys come from a password via PBKDF2.
pub const PBKDF2_BASIC_KEY: &str = "1.2.643.2.52.1.127.2.1";

/// BasicKeyMetaData method: fixed derived keys (development only).
pub const NO_BASIC_KEY: &str = "1.2.643.2.52.1.127.2.2";

/// Content marker: wrapped symmetric key.
pub const SYMMETRIC_KEY_CONTENT: &str = "1.2.643.2.52.1.127.3.1";

/// Content marker: wrapped signature key.
pub const SECRET_KEY_CONTENT: &str = "1.2.643.2.52.1.127.3.2";

/// HMAC over Streebog-512 (R 50.1.113-2016).
pub const HMAC_STREEBOG_512: &str = "1.2.643.7.1.1.4.2";

/// Kuznyechik block cipher (GOST R 34.12-2015).
pub const KUZNYECHIK: &str = "1.2.643.7.1.1.5.2";

/// Magma block cipher (GOST R 34.12-2015).
pub const MAGMA: &str = "1.2.643.7.1.1.5.1";

/// X.509 SubjectKeyIdentifier extension.
pub const EXT_SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";

/// X.509 KeyUsage extension.
pub const EXT_KEY_USAGE: &str = "2.5.29.15";

/// X.509 BasicConstraints extension.
pub const EXT_BASIC_CONSTRAINTS: &str = "2.5.29.19";

/// X.509 AuthorityKeyIdentifier extension.
pub const EXT_AUTHORITY_KEY_IDENTIFIER: &str = "2.5.29.35";

/// Library-private extension carrying the number of the secret key paired
/// with the certified public key.
pub const EXT_SECRET_KEY_NUMBER: &str = "1.2.643.2.52.1.98.1";

/// Symbolic names resolvable through [`find_by_name`].
const NAMES: &[(&str, &str)] = &[
    ("container", CONTAINER),
    ("pbkdf2-basic-key", PBKDF2_BASIC_KEY),
    ("no-basic-key", NO_BASIC_KEY),
    ("symmetric-key-content", SYMMETRIC_KEY_CONTENT),
    ("secret-key-content", SECRET_KEY_CONTENT),
    ("hmac-streebog512", HMAC_STREEBOG_512),
    ("kuznechik", KUZNYECHIK),
    ("magma", MAGMA),
    ("subject-key-identifier", EXT_SUBJECT_KEY_IDENTIFIER),
    ("key-usage", EXT_KEY_USAGE),
    ("basic-constraints", EXT_BASIC_CONSTRAINTS),
    ("authority-key-identifier", EXT_AUTHORITY_KEY_IDENTIFIER),
    ("secret-key-number", EXT_SECRET_KEY_NUMBER),
    ("sign256", gost3410::OID_GOST_3410_2012_256),
    ("sign512", gost3410::OID_GOST_3410_2012_512),
    ("streebog256", gost3410::OID_STREEBOG_256),
    ("streebog512", gost3410::OID_STREEBOG_512),
];

/// Resolve a symbolic algorithm or marker name to its identifier.
pub fn find_by_name(name: &str) -> Option<&'static str> {
    NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, oid)| *oid)
}
