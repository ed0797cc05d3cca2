//! SubjectPublicKeyInfo codec for GOST verifying keys.
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!    algorithm SEQUENCE {
//!       algorithm OBJECT IDENTIFIER,
//!       parameters SEQUENCE { curve OID, hash OID }
//!    },
//!    subjectPublicKey BIT STRING  -- DER of OCTET STRING (Q.x ‖ Q.y, LE)
//! }
//! ```

use crate::{Error, Result};
use gost3410::{curve, HashFunction, VerifyingKey};
use gostasn1::{Asn1, BitString, Tag, Tlv};

/// Encode a verifying key as a SubjectPublicKeyInfo node.
pub(crate) fn encode(key: &VerifyingKey) -> Result<Tlv<'static>> {
    let mut parameters = Asn1::new();
    parameters.add_oid(key.curve().oid())?;
    parameters.add_oid(key.hash_function().oid())?;

    let mut algorithm = Asn1::new();
    algorithm.add_oid(key.algorithm_oid())?;
    algorithm.add_sequence(parameters)?;

    let (x, y) = key.to_le_coordinates()?;
    let mut point = Vec::with_capacity(x.len() * 2);
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);
    let octet_string = Tlv::primitive(Tag::OCTET_STRING, point)?;

    let mut spki = Asn1::new();
    spki.add_sequence(algorithm)?;
    spki.add_bit_string(&BitString::new(0, octet_string.to_der()?)?)?;
    Ok(Tlv::constructed(Tag::SEQUENCE, spki)?)
}

/// Decode a SubjectPublicKeyInfo node into a verifying key, checking the
/// algorithm engine, curve support and point validity.
pub(crate) fn decode(node: &Tlv<'_>) -> Result<VerifyingKey> {
    let spki = node.expect_constructed(Tag::SEQUENCE)?;
    if spki.len() != 2 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }

    let algorithm = spki.nodes()[0].expect_constructed(Tag::SEQUENCE)?;
    if algorithm.len() != 2 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let algorithm_oid = algorithm.nodes()[0].as_oid()?;
    if algorithm_oid != gost3410::OID_GOST_3410_2012_256
        && algorithm_oid != gost3410::OID_GOST_3410_2012_512
    {
        return Err(Error::OidEngine);
    }

    let parameters = algorithm.nodes()[1].expect_constructed(Tag::SEQUENCE)?;
    if parameters.len() != 2 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let params = curve::find_by_oid(&parameters.nodes()[0].as_oid()?)?;
    let hash = HashFunction::from_oid(&parameters.nodes()[1].as_oid()?)?;
    if hash != HashFunction::for_curve_size(params.size())? {
        return Err(Error::OidEngine);
    }

    let bits = spki.nodes()[1].as_bit_string()?;
    if bits.unused != 0 {
        return Err(Error::InvalidValue);
    }
    let octet_string = Tlv::from_der(&bits.value)?;
    let point = octet_string.as_octet_string()?;
    let width = params.field_octets();
    if point.len() != 2 * width {
        return Err(Error::WrongLength);
    }

    let key = VerifyingKey::from_le_coordinates(params, &point[..width], &point[width..])?;
    if key.algorithm_oid() != algorithm_oid {
        return Err(Error::OidEngine);
    }
    Ok(key)
}
