//! ASN.1 BER/DER engine used by the GOST key-container and certificate
//! layers.
//!
//! The central type is [`Asn1`], an ordered list of [`Tlv`] nodes with a
//! cursor, mirroring the levels of an ASN.1 tree. Primitive nodes either
//! borrow their payload from the decode buffer (zero-copy) or own it;
//! constructed nodes own a nested [`Asn1`] level.
//!
//! Only DER with definite lengths is supported: single-octet tags
//! (numbers 0..=30), lengths of at most four length octets, no indefinite
//! form.
//!
//! ```
//! use gostasn1::{Asn1, Tag};
//!
//! let mut asn1 = Asn1::new();
//! asn1.add_oid("1.2.643.7.1.1.1.1").unwrap();
//! asn1.add_u32(2).unwrap();
//!
//! let der = asn1.to_der().unwrap();
//! let back = Asn1::from_der(&der).unwrap();
//! assert_eq!(back.len(), 2);
//! assert_eq!(back.get(1).unwrap().as_u32().unwrap(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

mod display;
mod error;
pub mod name;
pub mod pem;
mod tag;
mod tlv;

pub use error::{Error, Result};
pub use pem::ContentType;
pub use tag::{Class, Tag};
pub use tlv::{Asn1, BitString, Content, Tlv};

/// Serialization format of an exported ASN.1 tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// Raw DER octets.
    Der,
    /// Base64-wrapped DER with `-----BEGIN …-----` framing.
    Pem,
}
