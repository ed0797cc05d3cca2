//! Error types.

use core::fmt;

/// Result type with the `gostpki` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Container, certificate and repository errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// ASN.1 layer failure.
    Asn1(gostasn1::Error),

    /// Curve, key or signature failure.
    Sign(gost3410::Error),

    /// A value does not satisfy its constraints.
    InvalidValue,

    /// A length field does not match its content.
    WrongLength,

    /// An object identifier is unknown to the registry.
    WrongOid,

    /// The named algorithm does not fit the requested operation.
    OidEngine,

    /// Computed and expected data differ (wrong password, broken
    /// integrity tag, failed comparison).
    NotEqualData,

    /// No verifying key of the issuer is available.
    CertificateVerifyKey,

    /// Issuer name of the child does not match the subject name of the
    /// parent.
    CertificateVerifyNames,

    /// Current time is outside the certificate's validity interval.
    CertificateValidity,

    /// The issuer's certificate is not a certificate-authority one.
    CertificateCa,

    /// The certificate's signature does not verify.
    CertificateSignature,

    /// File i/o failure.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Asn1(err) => write!(f, "asn1 failure: {}", err),
            Error::Sign(err) => write!(f, "cryptographic failure: {}", err),
            Error::InvalidValue => f.write_str("invalid value"),
            Error::WrongLength => f.write_str("wrong length"),
            Error::WrongOid => f.write_str("unknown object identifier"),
            Error::OidEngine => f.write_str("algorithm does not fit the operation"),
            Error::NotEqualData => f.write_str("computed and expected data differ"),
            Error::CertificateVerifyKey => {
                f.write_str("issuer's verifying key is not available")
            }
            Error::CertificateVerifyNames => {
                f.write_str("issuer name does not match the subject name of the parent")
            }
            Error::CertificateValidity => {
                f.write_str("current time is outside the certificate validity interval")
            }
            Error::CertificateCa => {
                f.write_str("issuer's certificate does not belong to a certificate authority")
            }
            Error::CertificateSignature => {
                f.write_str("certificate signature verification failed")
            }
            Error::Io(err) => write!(f, "i/o failure: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Asn1(err) => Some(err),
            Error::Sign(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<gostasn1::Error> for Error {
    fn from(err: gostasn1::Error) -> Error {
        Error::Asn1(err)
    }
}

impl From<gost3410::Error> for Error {
    fn from(err: gost3410::Error) -> Error {
        Error::Sign(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        use Error::*;
        match (self, other) {
            (Asn1(a), Asn1(b)) => a == b,
            (Sign(a), Sign(b)) => a == b,
            (InvalidValue, InvalidValue)
            | (WrongLength, WrongLength)
            | (WrongOid, WrongOid)
            | (OidEngine, OidEngine)
            | (NotEqualData, NotEqualData)
            | (CertificateVerifyKey, CertificateVerifyKey)
            | (CertificateVerifyNames, CertificateVerifyNames)
            | (CertificateValidity, CertificateValidity)
            | (CertificateCa, CertificateCa)
            | (CertificateSignature, CertificateSignature) => true,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
