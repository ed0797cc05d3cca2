//! Key containers, certificates and certificate requests for the GOST
//! cryptographic suite.
//!
//! The crate binds the ASN.1 engine (`gostasn1`) and the signature core
//! (`gost3410`) into serializable objects:
//!
//! * [`container`] — password-protected secret-key containers using
//!   PBKDF2-HMAC-Streebog512 key derivation and the KExp15 authenticated
//!   wrap under Kuznyechik;
//! * [`Certificate`] — X.509 v3 style public-key certificates with the
//!   extension set used by the container format;
//! * [`CertificateRequest`] — PKCS#10-shaped certificate signing
//!   requests;
//! * [`CaRepository`] — a directory of trusted CA certificates indexed by
//!   serial number.

#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

pub mod certificate;
pub mod container;
mod error;
pub mod oids;
mod pubkey;
pub mod repository;
pub mod request;
mod settings;

pub use certificate::{
    BasicConstraints, Certificate, CertificateImportError, CertificateOpts, ImportVerdict, Issuer,
};
pub use container::{ContainerContent, Protection, SymmetricKey};
pub use error::{Error, Result};
pub use repository::CaRepository;
pub use request::CertificateRequest;
pub use settings::Settings;

pub use gostasn1::{Asn1, ContentType, Format, Tlv};
pub use gost3410::{HashFunction, Resource, ResourceKind, SigningKey, VerifyingKey};
