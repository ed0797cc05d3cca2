//! Error types.

use core::fmt;

/// Result type with the `gost3410` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Curve, key and signature errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// No registered curve matches the requested identifier.
    CurveNotSupported,

    /// Point does not satisfy the curve equation.
    CurvePoint,

    /// Point does not generate the prime-order subgroup.
    CurvePointOrder,

    /// Curve discriminant is zero.
    CurveDiscriminant,

    /// Inconsistent curve parameters.
    CurveParameters,

    /// Scalar key value is out of range or its integrity code does not
    /// match.
    KeyValue,

    /// Serialized key material has the wrong length.
    WrongKeyLength,

    /// Hash or signature length does not match the curve.
    InvalidLength,

    /// Computed and expected values differ (failed verification).
    NotEqualData,

    /// The requested algorithm engine does not fit the object.
    OidEngine,

    /// Malformed signature value.
    Signature,

    /// The key's usage counter is exhausted.
    LowKeyResource,

    /// The key is used outside its validity window.
    KeyValidity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::CurveNotSupported => "unsupported elliptic curve",
            Error::CurvePoint => "point is not on the curve",
            Error::CurvePointOrder => "point has wrong order",
            Error::CurveDiscriminant => "curve discriminant is zero",
            Error::CurveParameters => "inconsistent curve parameters",
            Error::KeyValue => "invalid secret key value",
            Error::WrongKeyLength => "wrong secret key length",
            Error::InvalidLength => "wrong hash or signature length",
            Error::NotEqualData => "computed and expected data differ",
            Error::OidEngine => "algorithm identifier does not fit the object",
            Error::Signature => "malformed signature value",
            Error::LowKeyResource => "key usage resource is exhausted",
            Error::KeyValidity => "key used outside its validity interval",
        };
        f.write_str(text)
    }
}

impl std::error::Error for Error {}
