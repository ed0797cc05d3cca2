//! File-system repository of trusted CA certificates.
//!
//! Certificates are stored as DER files named
//! `<lowercase-hex-of-serial>.cer` inside a single directory. The
//! default directory comes from [`Settings`]; every handle can override
//! it.

use crate::{Certificate, CertificateImportError, Error, Result, Settings};
use gostasn1::Asn1;
use std::path::{Path, PathBuf};

/// A directory of trusted issuer certificates indexed by serial number.
#[derive(Clone, Debug)]
pub struct CaRepository {
    path: PathBuf,
}

impl CaRepository {
    /// Repository at the process-wide default path.
    pub fn open_default() -> Self {
        CaRepository {
            path: Settings::get().ca_repository_path,
        }
    }

    /// Repository at an explicit directory.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        CaRepository { path: path.into() }
    }

    /// The repository directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the certificate with the given serial number.
    pub fn certificate_path(&self, serial: &[u8]) -> PathBuf {
        self.path.join(format!("{}.cer", hex::encode(serial)))
    }

    /// Validate a certificate tree and store it; certificates that fail
    /// validation are refused.
    pub fn add_from_asn1(&self, root: &Asn1<'_>) -> Result<PathBuf> {
        let certificate = Certificate::import_from_asn1(root, None)
            .map_err(|failure| failure.error)?;
        if certificate.serial.is_empty() {
            return Err(Error::InvalidValue);
        }
        std::fs::create_dir_all(&self.path)?;
        let path = self.certificate_path(&certificate.serial);
        std::fs::write(&path, root.to_der()?)?;
        Ok(path)
    }

    /// Validate DER octets and store them.
    pub fn add_from_der(&self, der: &[u8]) -> Result<PathBuf> {
        let root = Asn1::from_der(der)?;
        self.add_from_asn1(&root)
    }

    /// Validate a certificate file (DER or PEM) and store its DER form.
    pub fn add_from_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let (root, _) = Asn1::import_from_file(path)?;
        self.add_from_asn1(&root)
    }

    /// Look up a certificate by serial number, importing it as its own
    /// issuer (repository entries are trusted roots).
    pub fn find_by_serial(
        &self,
        serial: &[u8],
    ) -> core::result::Result<Certificate, CertificateImportError> {
        let path = self.certificate_path(serial);
        let certificate = Certificate::import_from_file(path, None)?;
        if certificate.serial != serial {
            return Err(Error::NotEqualData.into());
        }
        Ok(certificate)
    }

    /// Whether a certificate with the given serial number is stored.
    pub fn contains(&self, serial: &[u8]) -> bool {
        self.certificate_path(serial).is_file()
    }
}
