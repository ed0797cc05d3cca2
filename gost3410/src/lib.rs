//! GOST R 34.10-2012 digital signatures over short Weierstrass curves.
//!
//! The crate provides runtime-parameterized curve arithmetic for the
//! 256- and 512-bit parameter sets registered for GOST R 34.10-2012,
//! signing keys with a multiplicative masking discipline, and signature
//! generation/verification bound to the Streebog hash family
//! (GOST R 34.11-2012).
//!
//! ```
//! use gost3410::{curve, SigningKey, VerifyingKey};
//! use rand_core::OsRng;
//!
//! let mut key = SigningKey::random(&curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST, &mut OsRng)
//!     .expect("keygen");
//! let public = VerifyingKey::from_signing_key(&key).expect("public key");
//!
//! let signature = key.sign(&mut OsRng, b"document").expect("sign");
//! public.verify(b"document", &signature).expect("verify");
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

pub mod curve;
mod error;
mod field;
mod hash;
mod point;
mod resource;
mod signing;
mod verifying;

pub use crypto_bigint::U512;
pub use curve::WeierstrassCurve;
pub use error::{Error, Result};
pub use hash::HashFunction;
pub use point::ProjectivePoint;
pub use resource::{Resource, ResourceKind};
pub use signing::SigningKey;
pub use verifying::VerifyingKey;

/// OID of the GOST R 34.10-2012 signature algorithm with 256-bit keys.
pub const OID_GOST_3410_2012_256: &str = "1.2.643.7.1.1.1.1";

/// OID of the GOST R 34.10-2012 signature algorithm with 512-bit keys.
pub const OID_GOST_3410_2012_512: &str = "1.2.643.7.1.1.1.2";

/// OID of the Streebog-256 hash function.
pub const OID_STREEBOG_256: &str = "1.2.643.7.1.1.2.2";

/// OID of the Streebog-512 hash function.
pub const OID_STREEBOG_512: &str = "1.2.643.7.1.1.2.3";
