//! Randomized sign/verify cycles over every registered curve.

use gost3410::{curve, Error, SigningKey, VerifyingKey};
use rand_core::OsRng;

#[test]
fn lifecycle_on_every_curve() {
    for params in curve::CURVES {
        let mut key = SigningKey::random(params, &mut OsRng)
            .unwrap_or_else(|err| panic!("keygen on {}: {}", params.name(), err));
        let public = VerifyingKey::from_signing_key(&key).expect("public key");

        let message = format!("message signed on {}", params.name());
        let signature = key.sign(&mut OsRng, message.as_bytes()).expect("sign");
        assert_eq!(signature.len(), params.signature_octets());
        public
            .verify(message.as_bytes(), &signature)
            .unwrap_or_else(|err| panic!("verify on {}: {}", params.name(), err));

        assert_eq!(
            public.verify(b"different message", &signature),
            Err(Error::NotEqualData)
        );
    }
}

#[test]
fn signatures_are_randomized_but_stable() {
    let params = &curve::RFC4357_GOST_3410_2001_PARAM_SET_A;
    let mut key = SigningKey::random(params, &mut OsRng).unwrap();
    let public = VerifyingKey::from_signing_key(&key).unwrap();

    let first = key.sign(&mut OsRng, b"payload").unwrap();
    let second = key.sign(&mut OsRng, b"payload").unwrap();
    assert_ne!(first, second, "nonces must differ between signatures");
    public.verify(b"payload", &first).unwrap();
    public.verify(b"payload", &second).unwrap();
}

#[test]
fn wrong_length_signature_rejected() {
    let params = &curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST;
    let mut key = SigningKey::random(params, &mut OsRng).unwrap();
    let public = VerifyingKey::from_signing_key(&key).unwrap();
    let signature = key.sign(&mut OsRng, b"m").unwrap();

    assert_eq!(
        public.verify(b"m", &signature[..63]),
        Err(Error::InvalidLength)
    );
    let mut oversize = signature.clone();
    oversize.push(0);
    assert_eq!(public.verify(b"m", &oversize), Err(Error::InvalidLength));
}

#[test]
fn cross_curve_keys_do_not_verify() {
    let mut key256 =
        SigningKey::random(&curve::TC26_GOST_3410_2012_256_PARAM_SET_TEST, &mut OsRng).unwrap();
    let public512 = VerifyingKey::from_signing_key(
        &SigningKey::random(&curve::TC26_GOST_3410_2012_512_PARAM_SET_TEST, &mut OsRng).unwrap(),
    )
    .unwrap();

    let signature = key256.sign(&mut OsRng, b"m").unwrap();
    assert!(public512.verify(b"m", &signature).is_err());
}
