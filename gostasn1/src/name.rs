//! X.500-style distinguished names.
//!
//! A name is a `SEQUENCE` of `SET { SEQUENCE { OID, string } }` components.
//! Components are addressed either by keyword (`cn`, `o`, …) or by dotted
//! object identifier.

use crate::{Asn1, Error, Result, Tag, Tlv};

/// String flavour a name component is encoded with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StringKind {
    Utf8,
    Printable,
    Ia5,
}

/// Recognized name components: keyword, object identifier, string flavour.
const COMPONENTS: &[(&str, &str, StringKind)] = &[
    ("cn", "2.5.4.3", StringKind::Utf8),
    ("su", "2.5.4.4", StringKind::Utf8),
    ("sn", "2.5.4.5", StringKind::Printable),
    ("ct", "2.5.4.6", StringKind::Printable),
    ("ln", "2.5.4.7", StringKind::Utf8),
    ("st", "2.5.4.8", StringKind::Utf8),
    ("sa", "2.5.4.9", StringKind::Utf8),
    ("or", "2.5.4.10", StringKind::Utf8),
    ("ou", "2.5.4.11", StringKind::Utf8),
    ("email", "1.2.840.113549.1.9.1", StringKind::Ia5),
];

/// Create an empty name.
pub fn new() -> Tlv<'static> {
    Tlv::sequence()
}

/// Append a component given by `keyword` (see the module table) or by a
/// dotted object identifier, in which case the value is stored as a
/// UTF8String.
pub fn add_component<'t>(name: &mut Tlv<'t>, keyword: &str, value: &str) -> Result<()> {
    let (oid, kind) = match COMPONENTS.iter().find(|(kw, _, _)| *kw == keyword) {
        Some((_, oid, kind)) => (*oid, *kind),
        None if keyword.contains('.') => (keyword, StringKind::Utf8),
        None => return Err(Error::WrongOid),
    };

    let mut attribute = Asn1::new();
    attribute.add_oid(oid)?;
    match kind {
        StringKind::Utf8 => attribute.add_utf8_string(value)?,
        StringKind::Printable => attribute.add_printable_string(value)?,
        StringKind::Ia5 => attribute.add_ia5_string(value)?,
    }

    let mut set = Asn1::new();
    set.add_sequence(attribute)?;
    name.children_mut()?.add_asn1(Tag::SET, set)?;
    Ok(())
}

/// Look up the value of the component carrying `oid` (dotted form).
pub fn component<'a>(name: &'a Tlv<'_>, oid: &str) -> Option<&'a str> {
    for set in name.children().ok()?.iter() {
        let set = set.expect_constructed(Tag::SET).ok()?;
        for attribute in set.iter() {
            let attribute = attribute.expect_constructed(Tag::SEQUENCE).ok()?;
            if attribute.get(0)?.as_oid().ok()? != oid {
                continue;
            }
            let value = attribute.get(1)?;
            return value
                .as_utf8_string()
                .or_else(|_| value.as_printable_string())
                .or_else(|_| value.as_ia5_string())
                .or_else(|_| value.as_numeric_string())
                .ok();
        }
    }
    None
}

/// Render the name as a `keyword=value` list; unknown components print
/// their object identifier.
pub fn to_text(name: &Tlv<'_>) -> String {
    let mut out = String::new();
    let Ok(children) = name.children() else {
        return out;
    };
    for set in children.iter() {
        let Ok(set) = set.expect_constructed(Tag::SET) else {
            continue;
        };
        for attribute in set.iter() {
            let Ok(attribute) = attribute.expect_constructed(Tag::SEQUENCE) else {
                continue;
            };
            let (Some(oid_node), Some(value)) = (attribute.get(0), attribute.get(1)) else {
                continue;
            };
            let Ok(oid) = oid_node.as_oid() else { continue };
            let keyword = COMPONENTS
                .iter()
                .find(|(_, o, _)| *o == oid)
                .map(|(kw, _, _)| (*kw).to_string())
                .unwrap_or(oid);
            let text = value
                .as_utf8_string()
                .or_else(|_| value.as_printable_string())
                .or_else(|_| value.as_ia5_string())
                .or_else(|_| value.as_numeric_string())
                .unwrap_or("?");
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&keyword);
            out.push('=');
            out.push_str(text);
        }
    }
    out
}

/// Structural equality of two names: their DER encodings match octet for
/// octet.
pub fn equal(left: &Tlv<'_>, right: &Tlv<'_>) -> bool {
    match (left.to_der(), right.to_der()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tlv<'static> {
        let mut name = new();
        add_component(&mut name, "cn", "Example Root CA").unwrap();
        add_component(&mut name, "ct", "RU").unwrap();
        add_component(&mut name, "or", "Example Org").unwrap();
        name
    }

    #[test]
    fn lookup_by_oid() {
        let name = sample();
        assert_eq!(component(&name, "2.5.4.3"), Some("Example Root CA"));
        assert_eq!(component(&name, "2.5.4.6"), Some("RU"));
        assert_eq!(component(&name, "2.5.4.11"), None);
    }

    #[test]
    fn text_rendering() {
        assert_eq!(to_text(&sample()), "cn=Example Root CA, ct=RU, or=Example Org");
    }

    #[test]
    fn structural_equality_survives_roundtrip() {
        let name = sample();
        let der = name.to_der().unwrap();
        let back = Tlv::from_der(&der).unwrap();
        assert!(equal(&name, &back));
        assert!(!equal(&name, &new()));
    }

    #[test]
    fn unknown_keyword_needs_dotted_oid() {
        let mut name = new();
        assert!(add_component(&mut name, "bogus", "x").is_err());
        assert!(add_component(&mut name, "2.5.4.12", "Title").is_ok());
        assert_eq!(component(&name, "2.5.4.12"), Some("Title"));
    }
}
