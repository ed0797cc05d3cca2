//! Signature examples from GOST R 34.10-2012 appendix A.

use gost3410::{curve, SigningKey, VerifyingKey, U512};
use hex_literal::hex;
use rand_core::OsRng;

/// Appendix A.1: 256-bit test curve.
#[test]
fn appendix_a1_256() {
    let curve = &curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST;

    let d = hex!("7A929ADE789BB9BE10ED359DD39A72C11B60961F49397EEE1D19CE9891EC3B28");
    let mut d_le = d;
    d_le.reverse();
    let mut key = SigningKey::from_le_bytes(curve, &d_le, &mut OsRng).expect("secret key");

    let k = U512::from_be_hex(
        "0000000000000000000000000000000000000000000000000000000000000000\
         77105C9B20BCD3122823C8CF6FCC7B956DE33814E95B7FE64FED924594DCEAB3",
    );
    let e = U512::from_be_hex(
        "0000000000000000000000000000000000000000000000000000000000000000\
         2DFBC1B372D89A1188C09C52E0EEC61FCE52032AB1022E8E67ECE6672B043EE5",
    );

    let signature = key.sign_with_values(&mut OsRng, &k, &e).expect("sign");
    assert_eq!(signature.len(), 64);

    // the output is s ‖ r, fixed-width big-endian halves
    let expected_s = hex!("01456C64BA4642A1653C235A98A60249BCD6D3F746B631DF928014F6C5BF9C40");
    let expected_r = hex!("41AA28D2F1AB148280CD9ED56FEDA41974053554A42767B83AD043FD39DC0493");
    assert_eq!(&signature[..32], expected_s);
    assert_eq!(&signature[32..], expected_r);

    // the derived public key matches the appendix
    let public = VerifyingKey::from_signing_key(&key).expect("public key");
    let (x, y) = public.to_le_coordinates().unwrap();
    let mut expected_x =
        hex!("7F2B49E270DB6D90D8595BEC458B50C58585BA1D4E9B788F6689DBD8E56FD80B");
    let mut expected_y =
        hex!("26F1B489D6701DD185C8413A977B3CBBAF64D1C593D26627DFFB101A87FF77DA");
    expected_x.reverse();
    expected_y.reverse();
    assert_eq!(x, expected_x);
    assert_eq!(y, expected_y);

    // verification accepts the digest value of the appendix
    let mut digest = [0u8; 32];
    let e_bytes = hex!("2DFBC1B372D89A1188C09C52E0EEC61FCE52032AB1022E8E67ECE6672B043EE5");
    digest.copy_from_slice(&e_bytes);
    digest.reverse();
    public.verify_hash(&digest, &signature).expect("verify");
}

/// Appendix A.2: 512-bit test curve.
#[test]
fn appendix_a2_512() {
    let curve = &curve::TC26_GOST_3410_2012_512_PARAM_SET_TEST;

    let d = hex!(
        "0BA6048AADAE241BA40936D47756D7C93091A0E8514669700EE7508E508B1020"
        "72E8123B2200A0563322DAD2827E2714A2636B7BFD18AADFC62967821FA18DD4"
    );
    let mut d_le = d;
    d_le.reverse();
    let mut key = SigningKey::from_le_bytes(curve, &d_le, &mut OsRng).expect("secret key");

    let k = U512::from_be_hex(
        "0359E7F4B1410FEACC570456C6801496946312120B39D019D455986E364F3658\
         86748ED7A44B3E794434006011842286212273A6D14CF70EA3AF71BB1AE679F1",
    );
    let e = U512::from_be_hex(
        "3754F3CFACC9E0615C4F4A7C4D8DAB531B09B6F9C170C533A71D147035B0C591\
         7184EE536593F4414339976C647C5D5A407ADEDB1D560C4FC6777D2972075B8C",
    );

    let signature = key.sign_with_values(&mut OsRng, &k, &e).expect("sign");
    assert_eq!(signature.len(), 128);

    let expected_s = hex!(
        "1081B394696FFE8E6585E7A9362D26B6325F56778AADBC081C0BFBE933D52FF5"
        "823CE288E8C4F362526080DF7F70CE406A6EEB1F56919CB92A9853BDE73E5B4A"
    );
    let expected_r = hex!(
        "2F86FA60A081091A23DD795E1E3C689EE512A3C82EE0DCC2643C78EEA8FCACD3"
        "5492558486B20F1C9EC197C90699850260C93BCBCD9C5C3317E19344E173AE36"
    );
    assert_eq!(&signature[..64], expected_s);
    assert_eq!(&signature[64..], expected_r);

    let public = VerifyingKey::from_signing_key(&key).expect("public key");
    let (x, y) = public.to_le_coordinates().unwrap();
    let mut expected_x = hex!(
        "115DC5BC96760C7B48598D8AB9E740D4C4A85A65BE33C1815B5C320C854621DD"
        "5A515856D13314AF69BC5B924C8B4DDFF75C45415C1D9DD9DD33612CD530EFE1"
    );
    let mut expected_y = hex!(
        "37C7C90CD40B0F5621DC3AC1B751CFA0E2634FA0503B3D52639F5D7FB72AFD61"
        "EA199441D943FFE7F0C70A2759A3CDB84C114E1F9339FDF27F35ECA93677BEEC"
    );
    expected_x.reverse();
    expected_y.reverse();
    assert_eq!(x, expected_x);
    assert_eq!(y, expected_y);

    let mut digest = [0u8; 64];
    let e_bytes = hex!(
        "3754F3CFACC9E0615C4F4A7C4D8DAB531B09B6F9C170C533A71D147035B0C591"
        "7184EE536593F4414339976C647C5D5A407ADEDB1D560C4FC6777D2972075B8C"
    );
    digest.copy_from_slice(&e_bytes);
    digest.reverse();
    public.verify_hash(&digest, &signature).expect("verify");
}

/// Flipping any single bit of an appendix A.1 signature must break it.
#[test]
fn appendix_a1_bit_flips_are_rejected() {
    let curve = &curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST;

    let d = hex!("7A929ADE789BB9BE10ED359DD39A72C11B60961F49397EEE1D19CE9891EC3B28");
    let mut d_le = d;
    d_le.reverse();
    let mut key = SigningKey::from_le_bytes(curve, &d_le, &mut OsRng).unwrap();
    let public = VerifyingKey::from_signing_key(&key).unwrap();

    let k = U512::from_be_hex(
        "0000000000000000000000000000000000000000000000000000000000000000\
         77105C9B20BCD3122823C8CF6FCC7B956DE33814E95B7FE64FED924594DCEAB3",
    );
    let e = U512::from_be_hex(
        "0000000000000000000000000000000000000000000000000000000000000000\
         2DFBC1B372D89A1188C09C52E0EEC61FCE52032AB1022E8E67ECE6672B043EE5",
    );
    let signature = key.sign_with_values(&mut OsRng, &k, &e).unwrap();

    let mut digest = hex!("2DFBC1B372D89A1188C09C52E0EEC61FCE52032AB1022E8E67ECE6672B043EE5");
    digest.reverse();

    for byte in 0..signature.len() {
        for bit in 0..8 {
            let mut tampered = signature.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                public.verify_hash(&digest, &tampered).is_err(),
                "bit {} of byte {} survived tampering",
                bit,
                byte
            );
        }
    }
}
