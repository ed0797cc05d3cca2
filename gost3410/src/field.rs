//! Residue arithmetic helpers over a uniform 512-bit backing integer.
//!
//! Both 256- and 512-bit curves share the same scratch width; the curve's
//! `size` (number of serialized 64-bit words) selects how many octets take
//! part in serialization, exactly as the 512-bit scratch residues of the
//! reference arithmetic do.

use crate::{Error, Result};
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, NonZero, RandomMod, U512};
use rand_core::CryptoRngCore;

/// Limb count of the backing integer.
pub(crate) const LIMBS: usize = U512::LIMBS;

/// Montgomery-form residue modulo a runtime modulus.
pub(crate) type Residue = DynResidue<LIMBS>;

/// Montgomery parameters (modulus, r², −m⁻¹ mod 2^64) of a runtime field.
pub(crate) type ResidueParams = DynResidueParams<LIMBS>;

/// Montgomery parameters for `modulus`.
pub(crate) fn params(modulus: &U512) -> ResidueParams {
    DynResidueParams::new(modulus)
}

pub(crate) fn nonzero(value: &U512) -> NonZero<U512> {
    Option::from(NonZero::new(*value)).expect("curve moduli are nonzero")
}

/// `value mod modulus`.
pub(crate) fn reduce(value: &U512, modulus: &U512) -> U512 {
    value.rem(&nonzero(modulus))
}

/// Uniform sample from `[1, modulus - 1]`.
pub(crate) fn random_nonzero_mod(rng: &mut impl CryptoRngCore, modulus: &U512) -> U512 {
    let bound = nonzero(&modulus.wrapping_sub(&U512::ONE));
    U512::random_mod(rng, &bound).wrapping_add(&U512::ONE)
}

/// Fermat inversion in the Montgomery domain: `value^(modulus - 2)`.
pub(crate) fn invert(value: &Residue, modulus: &U512) -> Residue {
    value.pow(&modulus.wrapping_sub(&U512::from_u64(2)))
}

/// Read at most 64 little-endian octets into a `U512`.
pub(crate) fn uint_from_le_slice(bytes: &[u8]) -> Result<U512> {
    if bytes.len() > U512::BYTES {
        return Err(Error::InvalidLength);
    }
    let mut buf = [0u8; U512::BYTES];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(U512::from_le_bytes(buf))
}

/// Read at most 64 big-endian octets into a `U512`.
pub(crate) fn uint_from_be_slice(bytes: &[u8]) -> Result<U512> {
    if bytes.len() > U512::BYTES {
        return Err(Error::InvalidLength);
    }
    let mut buf = [0u8; U512::BYTES];
    buf[U512::BYTES - bytes.len()..].copy_from_slice(bytes);
    Ok(U512::from_be_bytes(buf))
}

/// Serialize the low `octets` of `value` in little-endian order; the
/// discarded high part must be zero.
pub(crate) fn uint_to_le_bytes(value: &U512, octets: usize) -> Result<Vec<u8>> {
    let full = value.to_le_bytes();
    if full[octets..].iter().any(|&b| b != 0) {
        return Err(Error::InvalidLength);
    }
    Ok(full[..octets].to_vec())
}

/// Serialize the low `octets` of `value` in big-endian order; the
/// discarded high part must be zero.
pub(crate) fn uint_to_be_bytes(value: &U512, octets: usize) -> Result<Vec<u8>> {
    let full = value.to_be_bytes();
    if full[..U512::BYTES - octets].iter().any(|&b| b != 0) {
        return Err(Error::InvalidLength);
    }
    Ok(full[U512::BYTES - octets..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_io_roundtrip() {
        let v = uint_from_be_slice(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(uint_to_be_bytes(&v, 4).unwrap(), [0x00, 0x01, 0x02, 0x03]);
        assert_eq!(uint_to_le_bytes(&v, 4).unwrap(), [0x03, 0x02, 0x01, 0x00]);
        assert!(uint_to_be_bytes(&v, 2).is_err());
    }

    #[test]
    fn fermat_inversion() {
        let q = U512::from_u64(65537);
        let fq = params(&q);
        let x = Residue::new(&U512::from_u64(1234), fq);
        let prod = x * invert(&x, &q);
        assert_eq!(prod.retrieve(), U512::ONE);
    }

    #[test]
    fn random_sample_in_range() {
        let q = U512::from_u64(7);
        let mut rng = rand_core::OsRng;
        for _ in 0..50 {
            let k = random_nonzero_mod(&mut rng, &q);
            assert!(k >= U512::ONE && k < q);
        }
    }
}
