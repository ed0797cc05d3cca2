//! Registered curve parameter sets for GOST R 34.10-2012.
//!
//! Every curve is a short Weierstrass curve `y² = x³ + ax + b` over a
//! prime field, described in plain (non-Montgomery) form; the arithmetic
//! layer derives Montgomery parameters from the stored moduli on demand.

use crate::field::{self, Residue, ResidueParams};
use crate::point::ProjectivePoint;
use crate::{Error, Result, U512};

/// Short Weierstrass curve parameters: coefficients, field and group
/// moduli, and the generator of the prime-order subgroup.
pub struct WeierstrassCurve {
    pub(crate) name: &'static str,
    pub(crate) oid: &'static str,
    pub(crate) oid_aliases: &'static [&'static str],
    /// Number of serialized 64-bit words of a residue: 4 or 8.
    pub(crate) size: usize,
    pub(crate) cofactor: u64,
    pub(crate) a: U512,
    pub(crate) b: U512,
    pub(crate) p: U512,
    pub(crate) q: U512,
    pub(crate) x: U512,
    pub(crate) y: U512,
}

impl WeierstrassCurve {
    /// Human-readable parameter-set name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Object identifier of the parameter set.
    pub const fn oid(&self) -> &'static str {
        self.oid
    }

    /// Number of 64-bit words in a serialized residue (4 or 8).
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Width of a serialized field element or scalar in octets.
    pub const fn field_octets(&self) -> usize {
        self.size * 8
    }

    /// Width of a signature in octets.
    pub const fn signature_octets(&self) -> usize {
        2 * self.field_octets()
    }

    /// Subgroup cofactor.
    pub const fn cofactor(&self) -> u64 {
        self.cofactor
    }

    /// Prime field modulus.
    pub const fn p(&self) -> &U512 {
        &self.p
    }

    /// Order of the generator subgroup.
    pub const fn q(&self) -> &U512 {
        &self.q
    }

    /// Montgomery parameters of the base field.
    pub(crate) fn fp(&self) -> ResidueParams {
        field::params(&self.p)
    }

    /// Montgomery parameters of the scalar field.
    pub(crate) fn fq(&self) -> ResidueParams {
        field::params(&self.q)
    }

    /// Whether `4a³ + 27b² ≢ 0 (mod p)`.
    pub fn discriminant_is_ok(&self) -> bool {
        let fp = self.fp();
        let a = Residue::new(&self.a, fp);
        let b = Residue::new(&self.b, fp);
        let four_a3 = {
            let a3 = a.square() * a;
            a3 + a3 + a3 + a3
        };
        let b2 = b.square();
        let mut twenty_seven_b2 = b2;
        for _ in 1..27 {
            twenty_seven_b2 = twenty_seven_b2 + b2;
        }
        (four_a3 + twenty_seven_b2).retrieve() != U512::ZERO
    }

    /// Run the whole construction-time battery: discriminant, generator
    /// membership and generator order.
    pub fn check_parameters(&self) -> Result<()> {
        if self.size != 4 && self.size != 8 {
            return Err(Error::CurveParameters);
        }
        if !self.discriminant_is_ok() {
            return Err(Error::CurveDiscriminant);
        }
        let generator = ProjectivePoint::generator(self);
        if !generator.is_on_curve(self) {
            return Err(Error::CurvePoint);
        }
        if !generator.check_order(self) {
            return Err(Error::CurvePointOrder);
        }
        Ok(())
    }
}

impl core::fmt::Debug for WeierstrassCurve {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeierstrassCurve")
            .field("name", &self.name)
            .field("oid", &self.oid)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl PartialEq for WeierstrassCurve {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for WeierstrassCurve {}

/// Test curve from GOST R 34.10-2012 appendix A.1 (256 bit).
pub static TC26_GOST_3410_2012_256_PARAM_SET_TEST: WeierstrassCurve = WeierstrassCurve {
    name: "id-tc26-gost-3410-2012-256-paramSetTest",
    oid: "1.2.643.7.1.2.1.1.0",
    oid_aliases: &[],
    size: 4,
    cofactor: 1,
    a: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000007"),
    b: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000005FBFF498AA938CE739B8E022FBAFEF40563F6E6A3472FC2A514C0CE9DAE23B7E"),
    p: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000008000000000000000000000000000000000000000000000000000000000000431"),
    q: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000008000000000000000000000000000000150FE8A1892976154C59CFC193ACCF5B3"),
    x: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000002"),
    y: U512::from_be_hex("000000000000000000000000000000000000000000000000000000000000000008E2A8A0E65147D4BD6316030E16D19C85C97F0A9CA267122B96ABBCEA7E8FC8"),
};

/// CryptoPro-A parameter set (RFC 4357), also registered as
/// id-tc26-gost-3410-2012-256-paramSetB.
pub static RFC4357_GOST_3410_2001_PARAM_SET_A: WeierstrassCurve = WeierstrassCurve {
    name: "id-rfc4357-gost-3410-2001-paramSetA",
    oid: "1.2.643.2.2.35.1",
    oid_aliases: &["1.2.643.7.1.2.1.1.2"],
    size: 4,
    cofactor: 1,
    a: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD94"),
    b: U512::from_be_hex("000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000A6"),
    p: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD97"),
    q: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF6C611070995AD10045841B09B761B893"),
    x: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000001"),
    y: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000008D91E471E0989CDA27DF505A453F2B7635294F2DDF23E3B122ACC99C9E9F1E14"),
};

/// id-tc26-gost-3410-2012-256-paramSetA (cofactor 4).
pub static TC26_GOST_3410_2012_256_PARAM_SET_A: WeierstrassCurve = WeierstrassCurve {
    name: "id-tc26-gost-3410-2012-256-paramSetA",
    oid: "1.2.643.7.1.2.1.1.1",
    oid_aliases: &[],
    size: 4,
    cofactor: 4,
    a: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000C2173F1513981673AF4892C23035A27CE25E2013BF95AA33B22C656F277E7335"),
    b: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000295F9BAE7428ED9CCC20E7C359A9D41A22FCCD9108E17BF7BA9337A6F8AE9513"),
    p: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD97"),
    q: U512::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000400000000000000000000000000000000FD8CDDFC87B6635C115AF556C360C67"),
    x: U512::from_be_hex("000000000000000000000000000000000000000000000000000000000000000091E38443A5E82C0D880923425712B2BB658B9196932E02C78B2582FE742DAA28"),
    y: U512::from_be_hex("000000000000000000000000000000000000000000000000000000000000000032879423AB1A0375895786C4BB46E9565FDE0B5344766740AF268ADB32322E5C"),
};

/// Test curve from GOST R 34.10-2012 appendix A.2 (512 bit).
pub static TC26_GOST_3410_2012_512_PARAM_SET_TEST: WeierstrassCurve = WeierstrassCurve {
    name: "id-tc26-gost-3410-2012-512-paramSetTest",
    oid: "1.2.643.7.1.2.1.2.0",
    oid_aliases: &[],
    size: 8,
    cofactor: 1,
    a: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000007"),
    b: U512::from_be_hex("1CFF0806A31116DA29D8CFA54E57EB748BC5F377E49400FDD788B649ECA1AC4361834013B2AD7322480A89CA58E0CF74BC9E540C2ADD6897FAD0A3084F302ADC"),
    p: U512::from_be_hex("4531ACD1FE0023C7550D267B6B2FEE80922B14B2FFB90F04D4EB7C09B5D2D15DF1D852741AF4704A0458047E80E4546D35B8336FAC224DD81664BBF528BE6373"),
    q: U512::from_be_hex("4531ACD1FE0023C7550D267B6B2FEE80922B14B2FFB90F04D4EB7C09B5D2D15DA82F2D7ECB1DBAC719905C5EECC423F1D86E25EDBE23C595D644AAF187E6E6DF"),
    x: U512::from_be_hex("24D19CC64572EE30F396BF6EBBFD7A6C5213B3B3D7057CC825F91093A68CD762FD60611262CD838DC6B60AA7EEE804E28BC849977FAC33B4B530F1B120248A9A"),
    y: U512::from_be_hex("2BB312A43BD2CE6E0D020613C857ACDDCFBF061E91E5F2C3F32447C259F39B2C83AB156D77F1496BF7EB3351E1EE4E43DC1A18B91B24640B6DBB92CB1ADD371E"),
};

/// id-tc26-gost-3410-2012-512-paramSetA.
pub static TC26_GOST_3410_2012_512_PARAM_SET_A: WeierstrassCurve = WeierstrassCurve {
    name: "id-tc26-gost-3410-2012-512-paramSetA",
    oid: "1.2.643.7.1.2.1.2.1",
    oid_aliases: &[],
    size: 8,
    cofactor: 1,
    a: U512::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFDC4"),
    b: U512::from_be_hex("E8C2505DEDFC86DDC1BD0B2B6667F1DA34B82574761CB0E879BD081CFD0B6265EE3CB090F30D27614CB4574010DA90DD862EF9D4EBEE4761503190785A71C760"),
    p: U512::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFDC7"),
    q: U512::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF27E69532F48D89116FF22B8D4E0560609B4B38ABFAD2B85DCACDB1411F10B275"),
    x: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000003"),
    y: U512::from_be_hex("7503CFE87A836AE3A61B8816E25450E6CE5E1C93ACF1ABC1778064FDCBEFA921DF1626BE4FD036E93D75E6A50E3A41E98028FE5FC235F5B889A589CB5215F2A4"),
};

/// id-tc26-gost-3410-2012-512-paramSetB.
pub static TC26_GOST_3410_2012_512_PARAM_SET_B: WeierstrassCurve = WeierstrassCurve {
    name: "id-tc26-gost-3410-2012-512-paramSetB",
    oid: "1.2.643.7.1.2.1.2.2",
    oid_aliases: &[],
    size: 8,
    cofactor: 1,
    a: U512::from_be_hex("8000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000006C"),
    b: U512::from_be_hex("687D1B459DC841457E3E06CF6F5E2517B97C7D614AF138BCBF85DC806C4B289F3E965D2DB1416D217F8B276FAD1AB69C50F78BEE1FA3106EFB8CCBC7C5140116"),
    p: U512::from_be_hex("8000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000006F"),
    q: U512::from_be_hex("800000000000000000000000000000000000000000000000000000000000000149A1EC142565A545ACFDB77BD9D40CFA8B996712101BEA0EC6346C54374F25BD"),
    x: U512::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000002"),
    y: U512::from_be_hex("1A8F7EDA389B094C2C071E3647A8940F3C123B697578C213BE6DD9E6C8EC7335DCB228FD1EDF4A39152CBCAAF8C0398828041055F94CEEEC7E21340780FE41BD"),
};

/// All registered parameter sets.
pub static CURVES: &[&WeierstrassCurve] = &[
    &TC26_GOST_3410_2012_256_PARAM_SET_TEST,
    &RFC4357_GOST_3410_2001_PARAM_SET_A,
    &TC26_GOST_3410_2012_256_PARAM_SET_A,
    &TC26_GOST_3410_2012_512_PARAM_SET_TEST,
    &TC26_GOST_3410_2012_512_PARAM_SET_A,
    &TC26_GOST_3410_2012_512_PARAM_SET_B,
];

/// Look up a parameter set by object identifier, alias identifiers
/// included.
pub fn find_by_oid(oid: &str) -> Result<&'static WeierstrassCurve> {
    CURVES
        .iter()
        .copied()
        .find(|curve| curve.oid == oid || curve.oid_aliases.contains(&oid))
        .ok_or(Error::CurveNotSupported)
}

/// Look up a parameter set by its symbolic name.
pub fn find_by_name(name: &str) -> Result<&'static WeierstrassCurve> {
    CURVES
        .iter()
        .copied()
        .find(|curve| curve.name == name)
        .ok_or(Error::CurveNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_curve_passes_the_battery() {
        for curve in CURVES {
            curve.check_parameters().unwrap_or_else(|err| {
                panic!("curve {} failed self-test: {}", curve.name(), err)
            });
        }
    }

    #[test]
    fn lookup_by_oid_and_alias() {
        let direct = find_by_oid("1.2.643.2.2.35.1").unwrap();
        let alias = find_by_oid("1.2.643.7.1.2.1.1.2").unwrap();
        assert_eq!(direct, alias);
        assert!(find_by_oid("1.2.3.4").is_err());
    }

    #[test]
    fn lookup_by_name() {
        let curve = find_by_name("id-tc26-gost-3410-2012-512-paramSetA").unwrap();
        assert_eq!(curve.size(), 8);
        assert_eq!(curve.signature_octets(), 128);
    }
}
