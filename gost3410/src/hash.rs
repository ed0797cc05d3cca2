//! Streebog hash dispatch.

use crate::{Error, Result, OID_STREEBOG_256, OID_STREEBOG_512};
use digest::Digest;
use streebog::{Streebog256, Streebog512};

/// Hash function bound to a signing algorithm: Streebog-256 for 256-bit
/// curves, Streebog-512 for 512-bit curves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashFunction {
    /// GOST R 34.11-2012 with a 256-bit digest.
    Streebog256,
    /// GOST R 34.11-2012 with a 512-bit digest.
    Streebog512,
}

impl HashFunction {
    /// Hash function matching a curve's residue width in 64-bit words.
    pub fn for_curve_size(size: usize) -> Result<Self> {
        match size {
            4 => Ok(HashFunction::Streebog256),
            8 => Ok(HashFunction::Streebog512),
            _ => Err(Error::OidEngine),
        }
    }

    /// Hash function named by `oid`.
    pub fn from_oid(oid: &str) -> Result<Self> {
        match oid {
            OID_STREEBOG_256 => Ok(HashFunction::Streebog256),
            OID_STREEBOG_512 => Ok(HashFunction::Streebog512),
            _ => Err(Error::OidEngine),
        }
    }

    /// Object identifier of the hash function.
    pub const fn oid(self) -> &'static str {
        match self {
            HashFunction::Streebog256 => OID_STREEBOG_256,
            HashFunction::Streebog512 => OID_STREEBOG_512,
        }
    }

    /// Digest width in octets.
    pub const fn output_size(self) -> usize {
        match self {
            HashFunction::Streebog256 => 32,
            HashFunction::Streebog512 => 64,
        }
    }

    /// One-shot digest.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Streebog256 => Streebog256::digest(data).to_vec(),
            HashFunction::Streebog512 => Streebog512::digest(data).to_vec(),
        }
    }
}

/// One-shot Streebog-256, used for key fingerprints and integrity codes.
pub(crate) fn streebog256_chunks(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Streebog256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::HashFunction;

    #[test]
    fn digest_widths() {
        assert_eq!(HashFunction::Streebog256.digest(b"x").len(), 32);
        assert_eq!(HashFunction::Streebog512.digest(b"x").len(), 64);
    }

    #[test]
    fn curve_binding() {
        assert_eq!(
            HashFunction::for_curve_size(4).unwrap(),
            HashFunction::Streebog256
        );
        assert_eq!(
            HashFunction::for_curve_size(8).unwrap(),
            HashFunction::Streebog512
        );
        assert!(HashFunction::for_curve_size(6).is_err());
    }
}
