//! Encode/decode round-trip laws.

use gostasn1::{Asn1, BitString, Tag, Tlv};
use proptest::prelude::*;
use time::{Date, Month, PrimitiveDateTime, Time};

fn roundtrip_both_modes(asn1: &Asn1<'_>) {
    let der = asn1.to_der().expect("encode");

    let borrowed = Asn1::from_der(&der).expect("borrowing decode");
    assert_eq!(&borrowed, asn1);
    assert_eq!(borrowed.to_der().expect("re-encode"), der);

    let owned = Asn1::from_der_owned(&der).expect("owning decode");
    assert_eq!(&owned, asn1);
}

#[test]
fn handcrafted_certificate_like_tree() {
    let mut alg = Asn1::new();
    alg.add_oid("1.2.643.7.1.1.1.1").unwrap();

    let mut tbs = Asn1::new();
    tbs.add_u32(2).unwrap();
    tbs.add_uint(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
    tbs.add_sequence(alg).unwrap();
    tbs.add_octet_string(&[0u8; 32]).unwrap();
    tbs.add_bit_string(&BitString::new(0, vec![1, 2, 3]).unwrap())
        .unwrap();

    let mut top = Asn1::new();
    top.add_sequence(tbs).unwrap();
    roundtrip_both_modes(&top);
}

#[test]
fn context_specific_tags_roundtrip() {
    let mut version = Asn1::new();
    version.add_u32(2).unwrap();

    let mut top = Asn1::new();
    top.add_asn1(Tag::context_constructed(0), version).unwrap();
    top.add_tlv(Tlv::primitive(Tag::context(2), vec![0xaa; 16]).unwrap());
    roundtrip_both_modes(&top);

    let der = top.to_der().unwrap();
    assert_eq!(der[0], 0xa0);
    let back = Asn1::from_der(&der).unwrap();
    assert_eq!(back.get(1).unwrap().tag(), Tag::context(2));
}

proptest! {
    #[test]
    fn octet_strings(data in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut asn1 = Asn1::new();
        asn1.add_octet_string(&data).unwrap();
        roundtrip_both_modes(&asn1);
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_octet_string().unwrap(), &data[..]);
    }

    #[test]
    fn integers(value in any::<u32>()) {
        let mut asn1 = Asn1::new();
        asn1.add_u32(value).unwrap();
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_u32().unwrap(), value);
    }

    #[test]
    fn object_identifiers(
        first in 0u32..=2,
        second in 0u32..=32,
        rest in proptest::collection::vec(any::<u32>(), 0..8),
    ) {
        let mut oid = format!("{}.{}", first, second);
        for arc in &rest {
            oid.push('.');
            oid.push_str(&arc.to_string());
        }
        let mut asn1 = Asn1::new();
        asn1.add_oid(&oid).unwrap();
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_oid().unwrap(), oid);
    }

    // the 2.x tree alone admits second arcs above 32 in the leading octet
    #[test]
    fn object_identifiers_in_the_joint_iso_tree(
        second in 33u32..=39,
        rest in proptest::collection::vec(any::<u32>(), 0..8),
    ) {
        let mut oid = format!("2.{}", second);
        for arc in &rest {
            oid.push('.');
            oid.push_str(&arc.to_string());
        }
        let mut asn1 = Asn1::new();
        asn1.add_oid(&oid).unwrap();
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_oid().unwrap(), oid);
    }

    #[test]
    fn utc_times(
        year in 2000i32..=2099,
        month in 1u8..=12,
        day in 1u8..=28,
        hour in 0u8..=23,
        minute in 0u8..=59,
        second in 0u8..=59,
    ) {
        let date = Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap();
        let at = PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
            .assume_utc();
        let mut asn1 = Asn1::new();
        asn1.add_utc_time(at).unwrap();
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_utc_time().unwrap(), at);
    }

    #[test]
    fn utf8_strings(value in "\\PC{0,80}") {
        let mut asn1 = Asn1::new();
        asn1.add_utf8_string(&value).unwrap();
        let der = asn1.to_der().unwrap();
        let back = Asn1::from_der(&der).unwrap();
        prop_assert_eq!(back.get(0).unwrap().as_utf8_string().unwrap(), value);
    }
}
