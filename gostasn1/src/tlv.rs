//! TLV nodes, tree levels with cursor navigation, and the DER codec.

use crate::{pem, ContentType, Error, Format, Result, Tag};
use std::borrow::Cow;
use std::path::Path;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Maximum number of long-form length octets understood by the codec.
const MAX_LENGTH_OCTETS: usize = 4;

/// A BIT STRING value: payload octets plus the number of unused trailing
/// bits in the last octet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString<'a> {
    /// Number of unused bits in the final octet, `0..=7`.
    pub unused: u8,
    /// Payload octets.
    pub value: Cow<'a, [u8]>,
}

impl<'a> BitString<'a> {
    /// Create a bit string, validating the unused-bit count.
    ///
    /// An empty value or an `unused` count above 7 is rejected.
    pub fn new(unused: u8, value: impl Into<Cow<'a, [u8]>>) -> Result<Self> {
        let value = value.into();
        if unused > 7 || value.is_empty() {
            return Err(Error::InvalidContent);
        }
        Ok(BitString { unused, value })
    }
}

/// Payload of a [`Tlv`] node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Content<'a> {
    /// Primitive payload; borrows the decode buffer in zero-copy mode.
    Primitive(Cow<'a, [u8]>),
    /// Constructed payload: a nested tree level.
    Constructed(Asn1<'a>),
}

/// One node of an ASN.1 tree: a tag plus primitive octets or a nested
/// level of child nodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tlv<'a> {
    tag: Tag,
    content: Content<'a>,
}

/// An ordered level of [`Tlv`] nodes with a current-position cursor.
#[derive(Clone, Debug, Default)]
pub struct Asn1<'a> {
    nodes: Vec<Tlv<'a>>,
    pos: usize,
}

impl Eq for Asn1<'_> {}

/// Equality over the node list only; the cursor position does not take
/// part, so an encode/decode round trip compares equal.
impl PartialEq for Asn1<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<'a> Tlv<'a> {
    /// Create a primitive node. The tag must not carry the constructed bit.
    pub fn primitive(tag: Tag, data: impl Into<Cow<'a, [u8]>>) -> Result<Self> {
        if tag.is_constructed() {
            return Err(Error::InvalidTag(tag.octet()));
        }
        Ok(Tlv {
            tag,
            content: Content::Primitive(data.into()),
        })
    }

    /// Create a constructed node holding `level`. The tag must carry the
    /// constructed bit.
    pub fn constructed(tag: Tag, level: Asn1<'a>) -> Result<Self> {
        if !tag.is_constructed() {
            return Err(Error::InvalidTag(tag.octet()));
        }
        Ok(Tlv {
            tag,
            content: Content::Constructed(level),
        })
    }

    /// Create an empty SEQUENCE node.
    pub fn sequence() -> Tlv<'static> {
        Tlv {
            tag: Tag::SEQUENCE,
            content: Content::Constructed(Asn1::new()),
        }
    }

    /// The node's tag.
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// The node's payload.
    pub const fn content(&self) -> &Content<'a> {
        &self.content
    }

    /// Deep-copy every borrowed payload, producing a tree independent of
    /// the decode buffer.
    pub fn into_owned(self) -> Tlv<'static> {
        let content = match self.content {
            Content::Primitive(data) => Content::Primitive(Cow::Owned(data.into_owned())),
            Content::Constructed(level) => Content::Constructed(level.into_owned()),
        };
        Tlv {
            tag: self.tag,
            content,
        }
    }

    /// Primitive payload octets, after checking the node carries `tag`.
    pub fn expect_primitive(&self, tag: Tag) -> Result<&[u8]> {
        if self.tag != tag {
            return Err(Error::InvalidTag(self.tag.octet()));
        }
        match &self.content {
            Content::Primitive(data) => Ok(data),
            Content::Constructed(_) => Err(Error::InvalidTag(self.tag.octet())),
        }
    }

    /// Child level of a constructed node, after checking it carries `tag`.
    pub fn expect_constructed(&self, tag: Tag) -> Result<&Asn1<'a>> {
        if self.tag != tag {
            return Err(Error::InvalidTag(self.tag.octet()));
        }
        self.children()
    }

    /// Child level of a constructed node.
    pub fn children(&self) -> Result<&Asn1<'a>> {
        match &self.content {
            Content::Constructed(level) => Ok(level),
            Content::Primitive(_) => Err(Error::InvalidTag(self.tag.octet())),
        }
    }

    /// Mutable child level of a constructed node.
    pub fn children_mut(&mut self) -> Result<&mut Asn1<'a>> {
        match &mut self.content {
            Content::Constructed(level) => Ok(level),
            Content::Primitive(_) => Err(Error::InvalidTag(self.tag.octet())),
        }
    }

    //
    // Typed accessors. Each validates the tag and form before conversion.
    //

    /// BOOLEAN value: `0x00` is false, anything else is true.
    pub fn as_bool(&self) -> Result<bool> {
        let data = self.expect_primitive(Tag::BOOLEAN)?;
        match data {
            [] => Err(Error::InvalidLength),
            [0x00] => Ok(false),
            [_] => Ok(true),
            _ => Err(Error::InvalidLength),
        }
    }

    /// Non-negative INTEGER value fitting an `u32`.
    ///
    /// Five-octet encodings are accepted only with a leading zero sign
    /// octet; negative values are rejected.
    pub fn as_u32(&self) -> Result<u32> {
        let data = self.expect_primitive(Tag::INTEGER)?;
        let magnitude = match data.len() {
            0 => return Err(Error::InvalidLength),
            1..=4 => {
                if data[0] & 0x80 != 0 {
                    return Err(Error::InvalidContent);
                }
                data
            }
            5 => {
                if data[0] != 0 {
                    return Err(Error::InvalidLength);
                }
                &data[1..]
            }
            _ => return Err(Error::InvalidLength),
        };
        Ok(magnitude.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }

    /// Non-negative INTEGER magnitude of at most `max_octets` octets,
    /// big-endian, with the optional leading zero sign octet stripped.
    pub fn as_uint(&self, max_octets: usize) -> Result<&[u8]> {
        let data = self.expect_primitive(Tag::INTEGER)?;
        if data.is_empty() {
            return Err(Error::InvalidLength);
        }
        let magnitude = if data[0] == 0 && data.len() > 1 {
            &data[1..]
        } else {
            data
        };
        if data[0] & 0x80 != 0 {
            return Err(Error::InvalidContent);
        }
        if magnitude.len() > max_octets {
            return Err(Error::InvalidLength);
        }
        Ok(magnitude)
    }

    /// OCTET STRING payload (zero-copy view).
    pub fn as_octet_string(&self) -> Result<&[u8]> {
        self.expect_primitive(Tag::OCTET_STRING)
    }

    /// NULL, yielding nothing.
    pub fn as_null(&self) -> Result<()> {
        let data = self.expect_primitive(Tag::NULL)?;
        if data.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidLength)
        }
    }

    /// UTF8String payload.
    pub fn as_utf8_string(&self) -> Result<&str> {
        let data = self.expect_primitive(Tag::UTF8_STRING)?;
        core::str::from_utf8(data).map_err(|_| Error::InvalidContent)
    }

    /// IA5String payload; every octet must be 7-bit.
    pub fn as_ia5_string(&self) -> Result<&str> {
        let data = self.expect_primitive(Tag::IA5_STRING)?;
        if data.iter().any(|&b| b > 127) {
            return Err(Error::InvalidContent);
        }
        Ok(core::str::from_utf8(data).map_err(|_| Error::InvalidContent)?)
    }

    /// PrintableString payload, restricted to the X.680 printable set.
    pub fn as_printable_string(&self) -> Result<&str> {
        let data = self.expect_primitive(Tag::PRINTABLE_STRING)?;
        if !data.iter().all(|&b| is_printable(b)) {
            return Err(Error::InvalidContent);
        }
        Ok(core::str::from_utf8(data).map_err(|_| Error::InvalidContent)?)
    }

    /// NumericString payload: digits and space only.
    pub fn as_numeric_string(&self) -> Result<&str> {
        let data = self.expect_primitive(Tag::NUMERIC_STRING)?;
        if !data.iter().all(|&b| b.is_ascii_digit() || b == b' ') {
            return Err(Error::InvalidContent);
        }
        Ok(core::str::from_utf8(data).map_err(|_| Error::InvalidContent)?)
    }

    /// BIT STRING payload.
    pub fn as_bit_string(&self) -> Result<BitString<'_>> {
        let data = self.expect_primitive(Tag::BIT_STRING)?;
        let (&unused, value) = data.split_first().ok_or(Error::InvalidLength)?;
        if unused > 7 {
            return Err(Error::InvalidContent);
        }
        Ok(BitString {
            unused,
            value: Cow::Borrowed(value),
        })
    }

    /// OBJECT IDENTIFIER as a dotted-decimal string.
    pub fn as_oid(&self) -> Result<String> {
        let data = self.expect_primitive(Tag::OBJECT_IDENTIFIER)?;
        let (&first, rest) = data.split_first().ok_or(Error::InvalidLength)?;
        // the second-arc bound applies to the 0.x and 1.x trees only
        if first / 40 > 2 || (first / 40 <= 1 && first % 40 > 32) {
            return Err(Error::Decode);
        }
        let mut out = format!("{}.{}", first / 40, first % 40);
        let mut value: u32 = 0;
        for (i, &b) in rest.iter().enumerate() {
            value = value
                .checked_shl(7)
                .filter(|_| value >> 25 == 0)
                .ok_or(Error::Decode)?
                | u32::from(b & 0x7f);
            if b & 0x80 == 0 {
                out.push('.');
                out.push_str(&value.to_string());
                value = 0;
            } else if i + 1 == rest.len() {
                // continuation bit on the final octet
                return Err(Error::Decode);
            }
        }
        Ok(out)
    }

    /// UTCTime (`YYMMDDhhmmssZ`) as a UTC timestamp; the two-digit year is
    /// interpreted as `2000 + YY`.
    pub fn as_utc_time(&self) -> Result<OffsetDateTime> {
        let data = self.expect_primitive(Tag::UTC_TIME)?;
        if data.len() < 13 || !data.last().map(|b| b.eq_ignore_ascii_case(&b'Z')).unwrap_or(false) {
            return Err(Error::Decode);
        }
        let year = 2000 + i32::from(two_digits(&data[0..2])?);
        datetime_from_fields(year, &data[2..12])
    }

    /// GeneralizedTime (`YYYYMMDDhhmmssZ`) as a UTC timestamp.
    pub fn as_generalized_time(&self) -> Result<OffsetDateTime> {
        let data = self.expect_primitive(Tag::GENERALIZED_TIME)?;
        if data.len() < 15 || !data.last().map(|b| b.eq_ignore_ascii_case(&b'Z')).unwrap_or(false) {
            return Err(Error::Decode);
        }
        let year =
            i32::from(two_digits(&data[0..2])?) * 100 + i32::from(two_digits(&data[2..4])?);
        datetime_from_fields(year, &data[4..14])
    }

    /// UTCTime or GeneralizedTime, whichever the node carries.
    pub fn as_time(&self) -> Result<OffsetDateTime> {
        match self.tag {
            Tag::UTC_TIME => self.as_utc_time(),
            Tag::GENERALIZED_TIME => self.as_generalized_time(),
            other => Err(Error::InvalidTag(other.octet())),
        }
    }

    /// `Validity ::= SEQUENCE { notBefore Time, notAfter Time }`.
    pub fn as_validity(&self) -> Result<(OffsetDateTime, OffsetDateTime)> {
        let seq = self.expect_constructed(Tag::SEQUENCE)?;
        if seq.len() != 2 {
            return Err(Error::InvalidCount);
        }
        Ok((seq.nodes[0].as_time()?, seq.nodes[1].as_time()?))
    }

    /// `AlgorithmIdentifier ::= SEQUENCE { OID, parameters OID OPTIONAL }`.
    pub fn as_algorithm_identifier(&self) -> Result<(String, Option<String>)> {
        let seq = self.expect_constructed(Tag::SEQUENCE)?;
        let algorithm = seq.nodes.first().ok_or(Error::InvalidCount)?.as_oid()?;
        let parameters = match seq.nodes.get(1) {
            Some(node) if node.tag() == Tag::OBJECT_IDENTIFIER => Some(node.as_oid()?),
            _ => None,
        };
        Ok((algorithm, parameters))
    }

    //
    // DER codec.
    //

    /// Total encoded length of the node, including tag and length octets.
    pub fn encoded_len(&self) -> Result<usize> {
        let payload = self.payload_len()?;
        Ok(1 + length_of_length(payload)? + payload)
    }

    fn payload_len(&self) -> Result<usize> {
        match &self.content {
            Content::Primitive(data) => Ok(data.len()),
            Content::Constructed(level) => level.encoded_len(),
        }
    }

    /// Encode into `buf`. On success the number of octets written is
    /// returned; if the buffer is too small, [`Error::BufferTooSmall`]
    /// carries the required capacity.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len()?;
        if buf.len() < needed {
            return Err(Error::BufferTooSmall(needed));
        }
        let written = self.encode_unchecked(buf)?;
        debug_assert_eq!(written, needed);
        Ok(written)
    }

    fn encode_unchecked(&self, buf: &mut [u8]) -> Result<usize> {
        let payload = self.payload_len()?;
        buf[0] = self.tag.octet();
        let mut at = 1 + put_length(&mut buf[1..], payload)?;
        match &self.content {
            Content::Primitive(data) => {
                buf[at..at + data.len()].copy_from_slice(data);
                at += data.len();
            }
            Content::Constructed(level) => {
                for node in &level.nodes {
                    at += node.encode_unchecked(&mut buf[at..])?;
                }
            }
        }
        Ok(at)
    }

    /// Encode into a freshly allocated vector.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()?];
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode exactly one node from `bytes`; trailing octets are an error.
    pub fn from_der(bytes: &'a [u8]) -> Result<Tlv<'a>> {
        let mut input = bytes;
        let tlv = parse_tlv(&mut input)?;
        if !input.is_empty() {
            return Err(Error::InvalidLength);
        }
        Ok(tlv)
    }
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
        )
}

fn two_digits(data: &[u8]) -> Result<u8> {
    if data.len() != 2 || !data.iter().all(u8::is_ascii_digit) {
        return Err(Error::Decode);
    }
    Ok((data[0] - b'0') * 10 + (data[1] - b'0'))
}

/// Assemble a UTC timestamp from `MMDDhhmmss` digit pairs.
fn datetime_from_fields(year: i32, fields: &[u8]) -> Result<OffsetDateTime> {
    let month = Month::try_from(two_digits(&fields[0..2])?).map_err(|_| Error::Decode)?;
    let date =
        Date::from_calendar_date(year, month, two_digits(&fields[2..4])?).map_err(|_| Error::Decode)?;
    let time = Time::from_hms(
        two_digits(&fields[4..6])?,
        two_digits(&fields[6..8])?,
        two_digits(&fields[8..10])?,
    )
    .map_err(|_| Error::Decode)?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Number of octets needed to encode `len` as a DER length.
fn length_of_length(len: usize) -> Result<usize> {
    if len < 0x80 {
        Ok(1)
    } else if len <= 0xff {
        Ok(2)
    } else if len <= 0xffff {
        Ok(3)
    } else if len <= 0xff_ffff {
        Ok(4)
    } else if u32::try_from(len).is_ok() {
        Ok(5)
    } else {
        Err(Error::InvalidLength)
    }
}

/// Write the minimal definite-length encoding of `len`.
fn put_length(buf: &mut [u8], len: usize) -> Result<usize> {
    let total = length_of_length(len)?;
    if total == 1 {
        buf[0] = len as u8;
    } else {
        let count = total - 1;
        buf[0] = 0x80 | count as u8;
        for i in 0..count {
            buf[count - i] = (len >> (8 * i)) as u8;
        }
    }
    Ok(total)
}

/// Consume a definite length from the head of `input`.
fn parse_length(input: &mut &[u8]) -> Result<usize> {
    let (&first, rest) = input.split_first().ok_or(Error::InvalidLength)?;
    *input = rest;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }
    let count = (first & 0x7f) as usize;
    if count == 0 || count > MAX_LENGTH_OCTETS || input.len() < count {
        return Err(Error::InvalidLength);
    }
    let mut len = 0usize;
    for &b in &input[..count] {
        len = (len << 8) | b as usize;
    }
    *input = &input[count..];
    Ok(len)
}

fn parse_tlv<'a>(input: &mut &'a [u8]) -> Result<Tlv<'a>> {
    let (&octet, rest) = input.split_first().ok_or(Error::InvalidLength)?;
    *input = rest;
    let tag = Tag::from_octet(octet)?;
    let len = parse_length(input)?;
    if input.len() < len {
        return Err(Error::InvalidLength);
    }
    let (payload, rest) = input.split_at(len);
    *input = rest;
    if tag.is_constructed() {
        Ok(Tlv {
            tag,
            content: Content::Constructed(Asn1::from_der(payload)?),
        })
    } else {
        Ok(Tlv {
            tag,
            content: Content::Primitive(Cow::Borrowed(payload)),
        })
    }
}

impl<'a> Asn1<'a> {
    /// Create an empty level.
    pub fn new() -> Self {
        Asn1 {
            nodes: Vec::new(),
            pos: 0,
        }
    }

    /// Number of nodes on this level.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the level holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of this level, in insertion order.
    pub fn nodes(&self) -> &[Tlv<'a>] {
        &self.nodes
    }

    /// Iterate over the nodes in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Tlv<'a>> {
        self.nodes.iter()
    }

    /// Node at `index`.
    pub fn get(&self, index: usize) -> Option<&Tlv<'a>> {
        self.nodes.get(index)
    }

    /// Mutable node at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tlv<'a>> {
        self.nodes.get_mut(index)
    }

    //
    // Cursor navigation.
    //

    /// Node under the cursor.
    pub fn current(&self) -> Option<&Tlv<'a>> {
        self.nodes.get(self.pos)
    }

    /// Mutable node under the cursor.
    pub fn current_mut(&mut self) -> Option<&mut Tlv<'a>> {
        self.nodes.get_mut(self.pos)
    }

    /// Move the cursor to the first node.
    pub fn first(&mut self) -> bool {
        self.pos = 0;
        !self.nodes.is_empty()
    }

    /// Move the cursor to the last node.
    pub fn last(&mut self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.pos = self.nodes.len() - 1;
        true
    }

    /// Advance the cursor.
    pub fn next(&mut self) -> bool {
        if self.pos + 1 < self.nodes.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Step the cursor back.
    pub fn prev(&mut self) -> bool {
        if self.pos > 0 && !self.nodes.is_empty() {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Remove the node under the cursor, dropping it.
    pub fn remove(&mut self) -> bool {
        self.exclude().is_some()
    }

    /// Detach and return the node under the cursor.
    pub fn exclude(&mut self) -> Option<Tlv<'a>> {
        if self.pos >= self.nodes.len() {
            return None;
        }
        let node = self.nodes.remove(self.pos);
        if self.pos >= self.nodes.len() && self.pos > 0 {
            self.pos -= 1;
        }
        Some(node)
    }

    /// Deep-copy every borrowed payload.
    pub fn into_owned(self) -> Asn1<'static> {
        Asn1 {
            nodes: self.nodes.into_iter().map(Tlv::into_owned).collect(),
            pos: self.pos,
        }
    }

    //
    // Builders. Each appends at the end of the level and leaves the cursor
    // on the new node.
    //

    /// Append a prebuilt node.
    pub fn add_tlv(&mut self, tlv: Tlv<'a>) {
        self.nodes.push(tlv);
        self.pos = self.nodes.len() - 1;
    }

    /// Append a BOOLEAN.
    pub fn add_bool(&mut self, value: bool) -> Result<()> {
        let octet = if value { 0xffu8 } else { 0x00 };
        self.add_tlv(Tlv::primitive(Tag::BOOLEAN, vec![octet])?);
        Ok(())
    }

    /// Append a non-negative INTEGER.
    pub fn add_u32(&mut self, value: u32) -> Result<()> {
        let be = value.to_be_bytes();
        let skip = be.iter().take_while(|&&b| b == 0).count().min(3);
        let mut data = Vec::with_capacity(5);
        if be[skip] & 0x80 != 0 {
            data.push(0x00);
        }
        data.extend_from_slice(&be[skip..]);
        self.add_tlv(Tlv::primitive(Tag::INTEGER, data)?);
        Ok(())
    }

    /// Append a non-negative INTEGER from a big-endian magnitude.
    pub fn add_uint(&mut self, magnitude: &[u8]) -> Result<()> {
        let skip = magnitude.iter().take_while(|&&b| b == 0).count();
        let trimmed = &magnitude[skip.min(magnitude.len().saturating_sub(1))..];
        let mut data = Vec::with_capacity(trimmed.len() + 1);
        if trimmed.first().map(|&b| b & 0x80 != 0).unwrap_or(false) {
            data.push(0x00);
        }
        if trimmed.is_empty() {
            data.push(0x00);
        } else {
            data.extend_from_slice(trimmed);
        }
        self.add_tlv(Tlv::primitive(Tag::INTEGER, data)?);
        Ok(())
    }

    /// Append an OCTET STRING.
    pub fn add_octet_string(&mut self, data: &[u8]) -> Result<()> {
        self.add_tlv(Tlv::primitive(Tag::OCTET_STRING, data.to_vec())?);
        Ok(())
    }

    /// Append a NULL.
    pub fn add_null(&mut self) -> Result<()> {
        self.add_tlv(Tlv::primitive(Tag::NULL, Vec::new())?);
        Ok(())
    }

    /// Append a UTF8String.
    pub fn add_utf8_string(&mut self, value: &str) -> Result<()> {
        self.add_tlv(Tlv::primitive(Tag::UTF8_STRING, value.as_bytes().to_vec())?);
        Ok(())
    }

    /// Append an IA5String; the value must be 7-bit.
    pub fn add_ia5_string(&mut self, value: &str) -> Result<()> {
        if !value.is_ascii() {
            return Err(Error::InvalidContent);
        }
        self.add_tlv(Tlv::primitive(Tag::IA5_STRING, value.as_bytes().to_vec())?);
        Ok(())
    }

    /// Append a PrintableString.
    pub fn add_printable_string(&mut self, value: &str) -> Result<()> {
        if !value.bytes().all(is_printable) {
            return Err(Error::InvalidContent);
        }
        self.add_tlv(Tlv::primitive(
            Tag::PRINTABLE_STRING,
            value.as_bytes().to_vec(),
        )?);
        Ok(())
    }

    /// Append a NumericString: digits and spaces only.
    pub fn add_numeric_string(&mut self, value: &str) -> Result<()> {
        if !value.bytes().all(|b| b.is_ascii_digit() || b == b' ') {
            return Err(Error::InvalidContent);
        }
        self.add_tlv(Tlv::primitive(
            Tag::NUMERIC_STRING,
            value.as_bytes().to_vec(),
        )?);
        Ok(())
    }

    /// Append a BIT STRING.
    pub fn add_bit_string(&mut self, bs: &BitString<'_>) -> Result<()> {
        if bs.unused > 7 || bs.value.is_empty() {
            return Err(Error::InvalidContent);
        }
        let mut data = Vec::with_capacity(bs.value.len() + 1);
        data.push(bs.unused);
        data.extend_from_slice(&bs.value);
        self.add_tlv(Tlv::primitive(Tag::BIT_STRING, data)?);
        Ok(())
    }

    /// Append an OBJECT IDENTIFIER given in dotted-decimal form.
    pub fn add_oid(&mut self, oid: &str) -> Result<()> {
        self.add_tlv(Tlv::primitive(Tag::OBJECT_IDENTIFIER, encode_oid(oid)?)?);
        Ok(())
    }

    /// Append a UTCTime (`YYMMDDhhmmssZ`); the timestamp is taken as UTC
    /// and the year must fall in `2000..=2099`.
    pub fn add_utc_time(&mut self, at: OffsetDateTime) -> Result<()> {
        let at = at.to_offset(time::UtcOffset::UTC);
        if !(2000..=2099).contains(&at.year()) {
            return Err(Error::InvalidContent);
        }
        let text = format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            at.year() % 100,
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        );
        self.add_tlv(Tlv::primitive(Tag::UTC_TIME, text.into_bytes())?);
        Ok(())
    }

    /// Append a GeneralizedTime (`YYYYMMDDhhmmssZ`).
    pub fn add_generalized_time(&mut self, at: OffsetDateTime) -> Result<()> {
        let at = at.to_offset(time::UtcOffset::UTC);
        let text = format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            at.year(),
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        );
        self.add_tlv(Tlv::primitive(Tag::GENERALIZED_TIME, text.into_bytes())?);
        Ok(())
    }

    /// Append `Validity ::= SEQUENCE { notBefore, notAfter }` as UTCTime.
    pub fn add_validity(
        &mut self,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<()> {
        let mut validity = Asn1::new();
        validity.add_utc_time(not_before)?;
        validity.add_utc_time(not_after)?;
        self.add_tlv(Tlv::constructed(Tag::SEQUENCE, validity)?);
        Ok(())
    }

    /// Append `AlgorithmIdentifier ::= SEQUENCE { OID, OID OPTIONAL }`.
    pub fn add_algorithm_identifier(&mut self, algorithm: &str, parameters: Option<&str>) -> Result<()> {
        let mut seq = Asn1::new();
        seq.add_oid(algorithm)?;
        if let Some(parameters) = parameters {
            seq.add_oid(parameters)?;
        }
        self.add_tlv(Tlv::constructed(Tag::SEQUENCE, seq)?);
        Ok(())
    }

    /// Append a constructed node with the given tag and child level.
    pub fn add_asn1(&mut self, tag: Tag, level: Asn1<'a>) -> Result<()> {
        self.add_tlv(Tlv::constructed(tag, level)?);
        Ok(())
    }

    /// Append a SEQUENCE with the given child level.
    pub fn add_sequence(&mut self, level: Asn1<'a>) -> Result<()> {
        self.add_asn1(Tag::SEQUENCE, level)
    }

    //
    // DER codec.
    //

    /// Total encoded length of all nodes on this level.
    pub fn encoded_len(&self) -> Result<usize> {
        self.nodes.iter().try_fold(0usize, |acc, node| {
            acc.checked_add(node.encoded_len()?).ok_or(Error::InvalidLength)
        })
    }

    /// Encode every node into `buf`, returning the number of octets
    /// written; [`Error::BufferTooSmall`] carries the required capacity.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len()?;
        if buf.len() < needed {
            return Err(Error::BufferTooSmall(needed));
        }
        let mut at = 0;
        for node in &self.nodes {
            at += node.encode_unchecked(&mut buf[at..])?;
        }
        debug_assert_eq!(at, needed);
        Ok(at)
    }

    /// Encode into a freshly allocated vector.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()?];
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode a level from DER octets, borrowing primitive payloads from
    /// `bytes` (the buffer must outlive the tree).
    pub fn from_der(bytes: &'a [u8]) -> Result<Asn1<'a>> {
        let mut nodes = Vec::new();
        let mut input = bytes;
        while !input.is_empty() {
            nodes.push(parse_tlv(&mut input)?);
        }
        Ok(Asn1 { nodes, pos: 0 })
    }

    /// Decode a level from DER octets, copying every payload.
    pub fn from_der_owned(bytes: &[u8]) -> Result<Asn1<'static>> {
        Ok(Asn1::from_der(bytes)?.into_owned())
    }

    //
    // File import/export.
    //

    /// Write the encoded tree to `path` in the requested format.
    pub fn export_to_file(
        &self,
        path: impl AsRef<Path>,
        format: Format,
        content: ContentType,
    ) -> Result<()> {
        let der = self.to_der()?;
        match format {
            Format::Der => std::fs::write(path, der)?,
            Format::Pem => std::fs::write(path, pem::encode(&der, content))?,
        }
        Ok(())
    }

    /// Read a tree from `path`, accepting raw DER and falling back to PEM.
    pub fn import_from_file(path: impl AsRef<Path>) -> Result<(Asn1<'static>, Format)> {
        let raw = std::fs::read(path)?;
        match Asn1::from_der_owned(&raw) {
            Ok(asn1) => Ok((asn1, Format::Der)),
            Err(_) => {
                let der = pem::decode(&raw)?;
                Ok((Asn1::from_der_owned(&der)?, Format::Pem))
            }
        }
    }
}

impl<'a> IntoIterator for Asn1<'a> {
    type Item = Tlv<'a>;
    type IntoIter = std::vec::IntoIter<Tlv<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Asn1<'a> {
    type Item = &'b Tlv<'a>;
    type IntoIter = core::slice::Iter<'b, Tlv<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Encode a dotted-decimal object identifier to its DER payload.
fn encode_oid(oid: &str) -> Result<Vec<u8>> {
    let mut arcs = oid.split('.').map(|part| {
        part.parse::<u32>().map_err(|_| Error::WrongOid)
    });
    let first = arcs.next().ok_or(Error::WrongOid)??;
    let second = arcs.next().ok_or(Error::WrongOid)??;
    // under the 0.x and 1.x trees the second arc is bounded at 32; under
    // 2.x it only has to keep the leading octet (80 + second) in range
    if first > 2 || (first < 2 && second > 32) || (first == 2 && second > 175) {
        return Err(Error::WrongOid);
    }
    let mut out = vec![(first * 40 + second) as u8];
    for arc in arcs {
        let arc = arc?;
        let mut chunk = [0u8; 5];
        let mut at = chunk.len();
        let mut rest = arc;
        loop {
            at -= 1;
            chunk[at] = (rest & 0x7f) as u8;
            rest >>= 7;
            if rest == 0 {
                break;
            }
        }
        for (i, &b) in chunk[at..].iter().enumerate() {
            let last = i == chunk.len() - at - 1;
            out.push(if last { b } else { b | 0x80 });
        }
    }
    Ok(out)
}
