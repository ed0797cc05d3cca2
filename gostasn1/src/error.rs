//! Error types.

use core::fmt;

/// Result type with the `gostasn1` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// ASN.1 errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Tag octet uses the high-tag-number form or does not match the
    /// requested operation.
    InvalidTag(u8),

    /// Length octets are malformed, exceed four octets, or describe a range
    /// that overflows the enclosing buffer.
    InvalidLength,

    /// Payload octets violate the constraints of the requested type.
    InvalidContent,

    /// A composite structure holds the wrong number of elements.
    InvalidCount,

    /// Malformed dotted-decimal object identifier.
    WrongOid,

    /// The encoder could not serialize the tree.
    Encode,

    /// The decoder could not reconstruct a tree from the given octets.
    Decode,

    /// Output buffer too small; carries the required capacity in octets.
    BufferTooSmall(usize),

    /// PEM framing is missing or the base64 body is malformed.
    Pem,

    /// File import/export failure.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTag(tag) => write!(f, "invalid ASN.1 tag octet 0x{:02x}", tag),
            Error::InvalidLength => f.write_str("invalid ASN.1 length"),
            Error::InvalidContent => f.write_str("invalid ASN.1 content"),
            Error::InvalidCount => f.write_str("invalid number of ASN.1 elements"),
            Error::WrongOid => f.write_str("malformed object identifier"),
            Error::Encode => f.write_str("ASN.1 encoding failure"),
            Error::Decode => f.write_str("ASN.1 decoding failure"),
            Error::BufferTooSmall(needed) => {
                write!(f, "output buffer too small, {} octets required", needed)
            }
            Error::Pem => f.write_str("malformed PEM framing"),
            Error::Io(err) => write!(f, "i/o failure: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
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
            (InvalidTag(a), InvalidTag(b)) => a == b,
            (InvalidLength, InvalidLength)
            | (InvalidContent, InvalidContent)
            | (InvalidCount, InvalidCount)
            | (WrongOid, WrongOid)
            | (Encode, Encode)
            | (Decode, Decode)
            | (Pem, Pem) => true,
            (BufferTooSmall(a), BufferTooSmall(b)) => a == b,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
