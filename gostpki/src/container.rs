//! Secret-key containers.
//!
//! A container is the ASN.1 structure
//!
//! ```text
//! Container ::= SEQUENCE {
//!    id OBJECT IDENTIFIER,      -- container marker
//!    basicKey BasicKeyMetaData, -- recovery parameters for derived keys
//!    content SEQUENCE { contentOid, contentBody }
//! }
//! ```
//!
//! The encryption (KEK) and integrity (KIM) keys are derived from a
//! password with PBKDF2-HMAC-Streebog512 (R 50.1.111-2016), and the key
//! material itself is protected by the KExp15 transform of
//! R 1323565.1.017-2018: a CMAC over `iv ‖ body` is appended to the body
//! and the tail is encrypted with Kuznyechik in counter mode under the
//! half-block `iv`.

use crate::{oids, Error, Result, Settings};
use cipher::{KeyIvInit, StreamCipher};
use cmac::{Cmac, Mac};
use gost3410::{curve, Resource, ResourceKind, SigningKey};
use gostasn1::{Asn1, ContentType, Format, Tag, Tlv};
use kuznyechik::Kuznyechik;
use pbkdf2::pbkdf2_hmac;
use rand_core::CryptoRngCore;
use std::path::Path;
use streebog::digest::Digest;
use streebog::Streebog512;
use zeroize::{Zeroize, Zeroizing};

type KuznyechikCtr = ctr::Ctr128BE<Kuznyechik>;

/// Kuznyechik block width in octets.
const BLOCK: usize = 16;

/// KExp15 initialization vector width: half a block.
const HALF_BLOCK: usize = BLOCK / 2;

/// Marker of present key data inside `EncryptedContent`.
const DATA_PRESENT_STORAGE: u32 = 1;

/// Iteration count of the unencrypted development path.
const UNENCRYPTED_ITERATIONS: u32 = 2000;

/// How the container's derived keys are obtained.
#[derive(Clone, Copy, Debug)]
pub enum Protection<'a> {
    /// Derive KEK/KIM from a password and a random salt.
    Password(&'a str),
    /// Fixed derived keys; offers no secrecy and exists for development
    /// workflows only, behind this explicit opt-in.
    Unencrypted,
}

/// A wrapped symmetric key recovered from a container.
#[derive(Debug)]
pub struct SymmetricKey {
    /// Algorithm the key is intended for.
    pub algorithm_oid: String,
    /// Unique 32-octet key number.
    pub number: [u8; 32],
    /// Human-readable label.
    pub label: Option<String>,
    /// Usage resource.
    pub resource: Resource,
    /// The key octets.
    pub key: Zeroizing<Vec<u8>>,
}

/// What a container holds.
#[derive(Debug)]
pub enum ContainerContent {
    /// A GOST R 34.10-2012 signing key.
    Signing(SigningKey),
    /// A symmetric cipher or MAC key.
    Symmetric(SymmetricKey),
}

/// Derived encryption and integrity keys.
struct DerivedKeys {
    kek: Zeroizing<[u8; 32]>,
    kim: Zeroizing<[u8; 32]>,
}

/// `KEK ‖ KIM = PBKDF2-HMAC-Streebog512(password, salt, iterations, 64)`.
fn derive_key_pair(password: &[u8], salt: &[u8], iterations: u32) -> DerivedKeys {
    let mut basic = Zeroizing::new([0u8; 64]);
    pbkdf2_hmac::<Streebog512>(password, salt, iterations, &mut basic[..]);
    let mut kek = [0u8; 32];
    let mut kim = [0u8; 32];
    kek.copy_from_slice(&basic[..32]);
    kim.copy_from_slice(&basic[32..]);
    DerivedKeys {
        kek: Zeroizing::new(kek),
        kim: Zeroizing::new(kim),
    }
}

/// Fixed keys of the unencrypted path, derived from the container seed
/// string.
fn derive_unencrypted() -> DerivedKeys {
    let digest = Streebog512::digest(b"libakrypt-container");
    let mut seed = Zeroizing::new([0u8; 64]);
    seed.copy_from_slice(&digest);
    derive_key_pair(&seed[..40], &seed[42..58], UNENCRYPTED_ITERATIONS)
}

//
// KExp15.
//

/// `iv ‖ CTR(KEK, body ‖ CMAC(KIM, iv ‖ body), iv)`.
fn kexp15_wrap(
    keys: &DerivedKeys,
    body: &[u8],
    rng: &mut (impl CryptoRngCore + ?Sized),
) -> Result<Vec<u8>> {
    let mut iv = [0u8; HALF_BLOCK];
    rng.fill_bytes(&mut iv);

    let mut mac =
        Cmac::<Kuznyechik>::new_from_slice(&keys.kim[..]).map_err(|_| Error::InvalidValue)?;
    mac.update(&iv);
    mac.update(body);
    let tag = mac.finalize().into_bytes();

    let mut out = Vec::with_capacity(HALF_BLOCK + body.len() + BLOCK);
    out.extend_from_slice(&iv);
    out.extend_from_slice(body);
    out.extend_from_slice(&tag);

    let mut nonce = [0u8; BLOCK];
    nonce[..HALF_BLOCK].copy_from_slice(&iv);
    let mut cipher = KuznyechikCtr::new_from_slices(&keys.kek[..], &nonce)
        .map_err(|_| Error::InvalidValue)?;
    cipher.apply_keystream(&mut out[HALF_BLOCK..]);
    Ok(out)
}

/// Reverse of [`kexp15_wrap`]; a CMAC mismatch yields
/// [`Error::NotEqualData`].
fn kexp15_unwrap(keys: &DerivedKeys, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if data.len() < HALF_BLOCK + BLOCK {
        return Err(Error::WrongLength);
    }
    let (iv, tail) = data.split_at(HALF_BLOCK);
    let mut tail = Zeroizing::new(tail.to_vec());

    let mut nonce = [0u8; BLOCK];
    nonce[..HALF_BLOCK].copy_from_slice(iv);
    let mut cipher = KuznyechikCtr::new_from_slices(&keys.kek[..], &nonce)
        .map_err(|_| Error::InvalidValue)?;
    cipher.apply_keystream(&mut tail);

    let body_len = tail.len() - BLOCK;
    let mut mac =
        Cmac::<Kuznyechik>::new_from_slice(&keys.kim[..]).map_err(|_| Error::InvalidValue)?;
    mac.update(iv);
    mac.update(&tail[..body_len]);
    mac.verify_slice(&tail[body_len..])
        .map_err(|_| Error::NotEqualData)?;

    tail.truncate(body_len);
    Ok(tail)
}

//
// Shared pieces of the content bodies.
//

/// `KeyParameters ::= SEQUENCE { type, counter, Validity }`.
fn add_resource(level: &mut Asn1<'static>, resource: &Resource) -> Result<()> {
    let mut seq = Asn1::new();
    seq.add_u32(resource.kind.code())?;
    seq.add_uint(&resource.counter.max(0).to_be_bytes())?;
    seq.add_validity(resource.not_before, resource.not_after)?;
    level.add_sequence(seq)?;
    Ok(())
}

fn read_resource(node: &Tlv<'_>) -> Result<Resource> {
    let seq = node.expect_constructed(Tag::SEQUENCE)?;
    if seq.len() != 3 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let kind = ResourceKind::from_code(seq.nodes()[0].as_u32()?)?;
    let counter = seq.nodes()[1]
        .as_uint(8)?
        .iter()
        .fold(0i64, |acc, &b| (acc << 8) | i64::from(b));
    let (not_before, not_after) = seq.nodes()[2].as_validity()?;
    Ok(Resource {
        kind,
        counter,
        not_before,
        not_after,
    })
}

/// `EncryptedContent ::= SEQUENCE { dataStorage, compatibility,
/// encryptedKey OCTET STRING }`.
fn add_encrypted_content(
    level: &mut Asn1<'static>,
    keys: &DerivedKeys,
    body: &[u8],
    compat: bool,
    rng: &mut (impl CryptoRngCore + ?Sized),
) -> Result<()> {
    let mut seq = Asn1::new();
    seq.add_u32(DATA_PRESENT_STORAGE)?;
    seq.add_u32(u32::from(compat))?;
    seq.add_octet_string(&kexp15_wrap(keys, body, rng)?)?;
    level.add_sequence(seq)?;
    Ok(())
}

/// Decrypt an `EncryptedContent` node, returning the body and the
/// compatibility flag the container was written with.
fn read_encrypted_content(
    node: &Tlv<'_>,
    keys: &DerivedKeys,
) -> Result<(Zeroizing<Vec<u8>>, bool)> {
    let seq = node.expect_constructed(Tag::SEQUENCE)?;
    if seq.len() != 3 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    if seq.nodes()[0].as_u32()? != DATA_PRESENT_STORAGE {
        return Err(Error::InvalidValue);
    }
    let compat = seq.nodes()[1].as_u32()? != 0;
    let body = kexp15_unwrap(keys, seq.nodes()[2].as_octet_string()?)?;
    Ok((body, compat))
}

/// The label CHOICE is a UTF8String or NULL.
fn add_label(level: &mut Asn1<'static>, label: Option<&str>) -> Result<()> {
    match label {
        Some(label) => level.add_utf8_string(label)?,
        None => level.add_null()?,
    }
    Ok(())
}

fn read_label(node: &Tlv<'_>) -> Result<Option<String>> {
    if node.tag() == Tag::NULL {
        node.as_null()?;
        Ok(None)
    } else {
        Ok(Some(node.as_utf8_string()?.to_string()))
    }
}

fn read_number(node: &Tlv<'_>) -> Result<[u8; 32]> {
    let bytes = node.as_octet_string()?;
    bytes.try_into().map_err(|_| Error::WrongLength)
}

//
// Content bodies.
//

fn add_signing_key_content(
    level: &mut Asn1<'static>,
    key: &SigningKey,
    keys: &DerivedKeys,
    compat: bool,
    rng: &mut (impl CryptoRngCore + ?Sized),
) -> Result<()> {
    level.add_oid(oids::SECRET_KEY_CONTENT)?;

    let mut body = Asn1::new();
    body.add_oid(key.algorithm_oid())?;
    body.add_octet_string(key.number())?;
    add_label(&mut body, key.label())?;
    add_resource(&mut body, key.resource())?;
    body.add_oid(key.curve().oid())?;
    if key.verifykey_number().iter().all(|&b| b == 0) {
        body.add_null()?;
    } else {
        body.add_octet_string(key.verifykey_number())?;
    }

    let (masked, mask) = key.masked_pair_le()?;
    let mut pair = Zeroizing::new(Vec::with_capacity(masked.len() * 2));
    pair.extend_from_slice(&masked);
    pair.extend_from_slice(&mask);
    if compat {
        let half = masked.len();
        pair[..half].reverse();
        pair[half..].reverse();
    }
    add_encrypted_content(&mut body, keys, &pair, compat, rng)?;

    level.add_sequence(body)?;
    Ok(())
}

fn read_signing_key_content(body: &Asn1<'_>, keys: &DerivedKeys) -> Result<SigningKey> {
    if body.len() != 7 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let algorithm = body.nodes()[0].as_oid()?;
    let number = read_number(&body.nodes()[1])?;
    let label = read_label(&body.nodes()[2])?;
    let resource = read_resource(&body.nodes()[3])?;
    let curve = curve::find_by_oid(&body.nodes()[4].as_oid()?)?;
    let verifykey_number = if body.nodes()[5].tag() == Tag::NULL {
        [0u8; 32]
    } else {
        read_number(&body.nodes()[5])?
    };

    let (mut pair, compat) = read_encrypted_content(&body.nodes()[6], keys)?;
    let half = curve.field_octets();
    if pair.len() != 2 * half {
        return Err(Error::WrongLength);
    }
    if compat {
        pair[..half].reverse();
        pair[half..].reverse();
    }
    let mut key = SigningKey::from_masked_pair_le(curve, &pair[..half], &pair[half..])?;
    if key.algorithm_oid() != algorithm {
        return Err(Error::OidEngine);
    }
    key.set_number(number);
    key.set_label(label);
    key.set_resource(resource);
    key.set_verifykey_number(verifykey_number);
    Ok(key)
}

fn add_symmetric_key_content(
    level: &mut Asn1<'static>,
    key: &SymmetricKey,
    keys: &DerivedKeys,
    compat: bool,
    rng: &mut (impl CryptoRngCore + ?Sized),
) -> Result<()> {
    level.add_oid(oids::SYMMETRIC_KEY_CONTENT)?;

    let mut body = Asn1::new();
    body.add_oid(&key.algorithm_oid)?;
    body.add_octet_string(&key.number)?;
    add_label(&mut body, key.label.as_deref())?;
    add_resource(&mut body, &key.resource)?;

    // additive masking: the wrapped pair is (key ⊕ mask) ‖ mask
    let mut mask = Zeroizing::new(vec![0u8; key.key.len()]);
    rng.fill_bytes(&mut mask);
    let mut pair = Zeroizing::new(Vec::with_capacity(key.key.len() * 2));
    pair.extend(key.key.iter().zip(mask.iter()).map(|(k, m)| k ^ m));
    pair.extend_from_slice(&mask);
    add_encrypted_content(&mut body, keys, &pair, compat, rng)?;

    level.add_sequence(body)?;
    Ok(())
}

fn read_symmetric_key_content(body: &Asn1<'_>, keys: &DerivedKeys) -> Result<SymmetricKey> {
    if body.len() != 5 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let algorithm_oid = body.nodes()[0].as_oid()?;
    let number = read_number(&body.nodes()[1])?;
    let label = read_label(&body.nodes()[2])?;
    let resource = read_resource(&body.nodes()[3])?;

    let (pair, _) = read_encrypted_content(&body.nodes()[4], keys)?;
    if pair.len() % 2 != 0 || pair.is_empty() {
        return Err(Error::WrongLength);
    }
    let half = pair.len() / 2;
    let key = Zeroizing::new(
        pair[..half]
            .iter()
            .zip(pair[half..].iter())
            .map(|(a, b)| a ^ b)
            .collect(),
    );
    Ok(SymmetricKey {
        algorithm_oid,
        number,
        label,
        resource,
        key,
    })
}

//
// BasicKeyMetaData.
//

fn add_basic_key_meta(
    container: &mut Asn1<'static>,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<DerivedKeys> {
    let mut meta = Asn1::new();
    let keys = match protection {
        Protection::Password(password) => {
            let settings = Settings::get();
            let mut salt = [0u8; 32];
            rng.fill_bytes(&mut salt);
            let keys = derive_key_pair(
                password.as_bytes(),
                &salt,
                settings.pbkdf2_iteration_count,
            );

            let mut parameters = Asn1::new();
            parameters.add_oid(oids::HMAC_STREEBOG_512)?;
            parameters.add_octet_string(&salt)?;
            parameters.add_u32(settings.pbkdf2_iteration_count)?;

            let mut basic = Asn1::new();
            basic.add_oid(oids::KUZNYECHIK)?;
            basic.add_sequence(parameters)?;

            meta.add_oid(oids::PBKDF2_BASIC_KEY)?;
            meta.add_sequence(basic)?;
            keys
        }
        Protection::Unencrypted => {
            meta.add_oid(oids::NO_BASIC_KEY)?;
            derive_unencrypted()
        }
    };
    container.add_sequence(meta)?;
    Ok(keys)
}

fn read_basic_key_meta(node: &Tlv<'_>, password: Option<&str>) -> Result<DerivedKeys> {
    let meta = node.expect_constructed(Tag::SEQUENCE)?;
    let method = meta.nodes().first().ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?.as_oid()?;
    match method.as_str() {
        oids::PBKDF2_BASIC_KEY => {
            let basic = meta
                .get(1)
                .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
                .expect_constructed(Tag::SEQUENCE)?;
            if basic.len() != 2 {
                return Err(Error::Asn1(gostasn1::Error::InvalidCount));
            }
            if basic.nodes()[0].as_oid()? != oids::KUZNYECHIK {
                return Err(Error::OidEngine);
            }
            let parameters = basic.nodes()[1].expect_constructed(Tag::SEQUENCE)?;
            if parameters.len() != 3 {
                return Err(Error::Asn1(gostasn1::Error::InvalidCount));
            }
            if parameters.nodes()[0].as_oid()? != oids::HMAC_STREEBOG_512 {
                return Err(Error::OidEngine);
            }
            let salt = parameters.nodes()[1].as_octet_string()?;
            let iterations = parameters.nodes()[2].as_u32()?;
            let password = password.ok_or(Error::InvalidValue)?;
            Ok(derive_key_pair(password.as_bytes(), salt, iterations))
        }
        oids::NO_BASIC_KEY => Ok(derive_unencrypted()),
        _ => Err(Error::WrongOid),
    }
}

//
// Container assembly.
//

fn export_to_asn1(
    build: impl FnOnce(&mut Asn1<'static>, &DerivedKeys, &mut dyn CryptoRngCore) -> Result<()>,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<Asn1<'static>> {
    let mut container = Asn1::new();
    container.add_oid(oids::CONTAINER)?;
    let keys = add_basic_key_meta(&mut container, protection, rng)?;

    let mut content = Asn1::new();
    build(&mut content, &keys, rng)?;
    container.add_sequence(content)?;

    let mut root = Asn1::new();
    root.add_sequence(container)?;
    Ok(root)
}

/// Serialize a signing key into a password-protected container tree.
pub fn export_signing_key_to_asn1(
    key: &SigningKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<Asn1<'static>> {
    let compat = Settings::get().openssl_compat;
    export_to_asn1(
        |content, keys, rng| add_signing_key_content(content, key, keys, compat, rng),
        protection,
        rng,
    )
}

/// Serialize a signing key container to DER octets.
pub fn export_signing_key_to_der(
    key: &SigningKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<Vec<u8>> {
    Ok(export_signing_key_to_asn1(key, protection, rng)?.to_der()?)
}

/// Write a signing key container to a file in the requested format.
pub fn export_signing_key_to_file(
    key: &SigningKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
    path: impl AsRef<Path>,
    format: Format,
) -> Result<()> {
    let asn1 = export_signing_key_to_asn1(key, protection, rng)?;
    asn1.export_to_file(path, format, ContentType::PrivateKey)?;
    Ok(())
}

/// Serialize a symmetric key into a container tree.
pub fn export_symmetric_key_to_asn1(
    key: &SymmetricKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<Asn1<'static>> {
    let compat = Settings::get().openssl_compat;
    export_to_asn1(
        |content, keys, rng| add_symmetric_key_content(content, key, keys, compat, rng),
        protection,
        rng,
    )
}

/// Serialize a symmetric key container to DER octets.
pub fn export_symmetric_key_to_der(
    key: &SymmetricKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
) -> Result<Vec<u8>> {
    Ok(export_symmetric_key_to_asn1(key, protection, rng)?.to_der()?)
}

/// Write a symmetric key container to a file in the requested format.
pub fn export_symmetric_key_to_file(
    key: &SymmetricKey,
    protection: Protection<'_>,
    rng: &mut impl CryptoRngCore,
    path: impl AsRef<Path>,
    format: Format,
) -> Result<()> {
    let asn1 = export_symmetric_key_to_asn1(key, protection, rng)?;
    asn1.export_to_file(path, format, ContentType::EncryptedSymmetricKey)?;
    Ok(())
}

/// Recover the content of a container from its ASN.1 tree.
///
/// `password` is required for password-protected containers and ignored
/// by the unencrypted development path. The wrap's byte-order
/// compatibility flag is taken from the container itself.
pub fn import_from_asn1(root: &Asn1<'_>, password: Option<&str>) -> Result<ContainerContent> {
    let container = root
        .get(0)
        .ok_or(Error::Asn1(gostasn1::Error::InvalidCount))?
        .expect_constructed(Tag::SEQUENCE)?;
    if container.len() != 3 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    if container.nodes()[0].as_oid()? != oids::CONTAINER {
        return Err(Error::WrongOid);
    }
    let keys = read_basic_key_meta(&container.nodes()[1], password)?;

    let content = container.nodes()[2].expect_constructed(Tag::SEQUENCE)?;
    if content.len() != 2 {
        return Err(Error::Asn1(gostasn1::Error::InvalidCount));
    }
    let content_oid = content.nodes()[0].as_oid()?;
    let body = content.nodes()[1].expect_constructed(Tag::SEQUENCE)?;
    match content_oid.as_str() {
        oids::SECRET_KEY_CONTENT => {
            Ok(ContainerContent::Signing(read_signing_key_content(body, &keys)?))
        }
        oids::SYMMETRIC_KEY_CONTENT => Ok(ContainerContent::Symmetric(
            read_symmetric_key_content(body, &keys)?,
        )),
        _ => Err(Error::WrongOid),
    }
}

/// Recover the content of a container from DER octets.
pub fn import_from_der(der: &[u8], password: Option<&str>) -> Result<ContainerContent> {
    let root = Asn1::from_der(der)?;
    import_from_asn1(&root, password)
}

/// Read a container from a DER or PEM file.
pub fn import_from_file(
    path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<ContainerContent> {
    let (root, _) = Asn1::import_from_file(path)?;
    import_from_asn1(&root, password)
}

/// Default file name for a serialized key: the key number in hexadecimal
/// plus a format-specific extension.
pub fn default_file_name(number: &[u8], format: Format) -> String {
    let extension = match format {
        Format::Der => "key",
        Format::Pem => "pem",
    };
    format!("{}.{}", hex::encode(number), extension)
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.number.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;
    use time::OffsetDateTime;

    fn derived() -> DerivedKeys {
        derive_key_pair(b"password", b"salt", 16)
    }

    #[test]
    fn kexp15_roundtrip() {
        let keys = derived();
        let body = [0x42u8; 64];
        let wrapped = kexp15_wrap(&keys, &body, &mut OsRng).unwrap();
        assert_eq!(wrapped.len(), HALF_BLOCK + body.len() + BLOCK);
        let unwrapped = kexp15_unwrap(&keys, &wrapped).unwrap();
        assert_eq!(&unwrapped[..], body);
    }

    #[test]
    fn kexp15_detects_ciphertext_tampering() {
        let keys = derived();
        let wrapped = kexp15_wrap(&keys, &[7u8; 32], &mut OsRng).unwrap();
        for index in [0, HALF_BLOCK, wrapped.len() - 1] {
            let mut tampered = wrapped.clone();
            tampered[index] ^= 0x01;
            assert_eq!(
                kexp15_unwrap(&keys, &tampered).unwrap_err(),
                Error::NotEqualData
            );
        }
    }

    #[test]
    fn kexp15_rejects_short_input() {
        assert_eq!(
            kexp15_unwrap(&derived(), &[0u8; 16]).unwrap_err(),
            Error::WrongLength
        );
    }

    #[test]
    fn resource_roundtrip() {
        let resource = Resource {
            kind: ResourceKind::KeyUsingCounter,
            counter: 12345,
            not_before: OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap(),
            not_after: OffsetDateTime::from_unix_timestamp(1_780_000_000).unwrap(),
        };
        let mut level = Asn1::new();
        add_resource(&mut level, &resource).unwrap();
        let der = level.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        assert_eq!(read_resource(back.get(0).unwrap()).unwrap(), resource);
    }
}
