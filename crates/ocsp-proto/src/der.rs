//! DER encoding helpers and a sequence reader
//!
//! The writer half builds Tag-Length-Value triples directly. The reader half
//! walks the elements of a constructed value one TLV at a time using the
//! `asn1-rs` `Any` parser, so every field of an OCSP structure can be checked
//! against the identifier octet the schema expects.

use crate::error::{DecodeError, EncodeError};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use der_parser::asn1_rs::{Any, FromDer, Oid};
use num_bigint::BigInt;
use std::borrow::Cow;

// Identifier octets used by the OCSP schema
pub(crate) const TAG_BOOLEAN: u8 = 0x01;
pub(crate) const TAG_INTEGER: u8 = 0x02;
pub(crate) const TAG_BIT_STRING: u8 = 0x03;
pub(crate) const TAG_OCTET_STRING: u8 = 0x04;
pub(crate) const TAG_NULL: u8 = 0x05;
pub(crate) const TAG_OID: u8 = 0x06;
pub(crate) const TAG_ENUMERATED: u8 = 0x0A;
pub(crate) const TAG_GENERALIZED_TIME: u8 = 0x18;
pub(crate) const TAG_SEQUENCE: u8 = 0x30;

/// Context-specific, constructed tag `[n]` (explicit tagging, or implicit
/// tagging of a constructed type)
pub(crate) const fn context_constructed(tag: u8) -> u8 {
    0xA0 | tag
}

/// Context-specific, primitive tag `[n]` (implicit tagging of a primitive type)
pub(crate) const fn context_primitive(tag: u8) -> u8 {
    0x80 | tag
}

// ============================================================================
// DER Encoding Helpers
// ============================================================================

/// Encode Tag-Length-Value
pub(crate) fn der_tlv(tag: u8, contents: &[u8]) -> Vec<u8> {
    let length = der_length(contents.len());
    let mut out = Vec::with_capacity(1 + length.len() + contents.len());
    out.push(tag);
    out.extend_from_slice(&length);
    out.extend_from_slice(contents);
    out
}

/// Encode a definite length in the shortest form
pub(crate) fn der_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let mut out = vec![0x80 | (bytes.len() - skip) as u8];
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Encode a SEQUENCE
pub(crate) fn der_sequence(contents: &[u8]) -> Vec<u8> {
    der_tlv(TAG_SEQUENCE, contents)
}

/// Encode an OCTET STRING
pub(crate) fn der_octet_string(contents: &[u8]) -> Vec<u8> {
    der_tlv(TAG_OCTET_STRING, contents)
}

/// Encode context-specific explicit tag around an already encoded value
pub(crate) fn der_explicit_context(tag: u8, contents: &[u8]) -> Vec<u8> {
    der_tlv(context_constructed(tag), contents)
}

/// Encode an INTEGER (minimal two's complement)
pub(crate) fn der_integer(value: &BigInt) -> Vec<u8> {
    der_tlv(TAG_INTEGER, &value.to_signed_bytes_be())
}

/// Encode an unsigned INTEGER
pub(crate) fn der_unsigned(value: u32) -> Vec<u8> {
    der_integer(&BigInt::from(value))
}

/// Encode an ENUMERATED
pub(crate) fn der_enumerated(value: u8) -> Vec<u8> {
    der_tlv(TAG_ENUMERATED, &BigInt::from(value).to_signed_bytes_be())
}

/// Encode a BOOLEAN
pub(crate) fn der_boolean(value: bool) -> Vec<u8> {
    der_tlv(TAG_BOOLEAN, &[if value { 0xFF } else { 0x00 }])
}

/// Encode a BIT STRING from its unused-bit count and content bytes
pub(crate) fn der_bit_string(unused_bits: u8, bytes: &[u8]) -> Result<Vec<u8>, EncodeError> {
    if unused_bits > 7 || (bytes.is_empty() && unused_bits != 0) {
        return Err(EncodeError::InvalidValue(format!(
            "BIT STRING with {} unused bits over {} bytes",
            unused_bits,
            bytes.len()
        )));
    }
    let mut contents = Vec::with_capacity(bytes.len() + 1);
    contents.push(unused_bits);
    contents.extend_from_slice(bytes);
    Ok(der_tlv(TAG_BIT_STRING, &contents))
}

/// Encode an OBJECT IDENTIFIER
pub(crate) fn der_oid(oid: &Oid) -> Result<Vec<u8>, EncodeError> {
    let content = oid.as_bytes();
    if !valid_oid_content(content) {
        return Err(EncodeError::InvalidValue(format!(
            "OBJECT IDENTIFIER content {:02x?}",
            content
        )));
    }
    Ok(der_tlv(TAG_OID, content))
}

/// Encode a GeneralizedTime
///
/// Sub-second precision is written only when non-zero, with trailing zeros
/// removed, as DER requires.
pub(crate) fn der_generalized_time(time: &DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    if !(0..=9999).contains(&time.year()) {
        return Err(EncodeError::InvalidValue(format!(
            "GeneralizedTime year {} outside 0000-9999",
            time.year()
        )));
    }
    let mut text = time.format("%Y%m%d%H%M%S").to_string();
    let nanos = time.nanosecond();
    if nanos >= 1_000_000_000 {
        return Err(EncodeError::InvalidValue(
            "GeneralizedTime leap second".to_string(),
        ));
    }
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text.push('Z');
    Ok(der_tlv(TAG_GENERALIZED_TIME, text.as_bytes()))
}

/// Check that `raw` holds exactly one complete TLV, as required for fields
/// carried as pre-encoded DER
pub(crate) fn check_raw_tlv(raw: &[u8], what: &str) -> Result<(), EncodeError> {
    let mut reader = DerReader::new(raw);
    reader
        .read_raw(what)
        .and_then(|_| reader.finish(what))
        .map_err(|e| EncodeError::InvalidValue(format!("{} is not a single DER value: {}", what, e)))
}

// ============================================================================
// DER Decoding Helpers
// ============================================================================

/// Cursor over the elements of a DER constructed value
#[derive(Debug, Clone, Copy)]
pub(crate) struct DerReader<'a> {
    remaining: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        DerReader { remaining: data }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub(crate) fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    /// Identifier octet of the next element, if any
    pub(crate) fn peek_tag(&self) -> Option<u8> {
        self.remaining.first().copied()
    }

    /// Read the next TLV, returning its identifier octet and content
    fn read_any(&mut self, what: &str) -> Result<(u8, &'a [u8]), DecodeError> {
        let tag = self
            .peek_tag()
            .ok_or_else(|| DecodeError::malformed(format!("missing {}", what)))?;
        let (rest, any) = Any::from_der(self.remaining)
            .map_err(|e| DecodeError::malformed(format!("invalid {}: {:?}", what, e)))?;
        self.remaining = rest;
        Ok((tag, any.data))
    }

    /// Read the next TLV and return its complete encoding (tag, length and content)
    pub(crate) fn read_raw(&mut self, what: &str) -> Result<&'a [u8], DecodeError> {
        let before = self.remaining;
        self.read_any(what)?;
        let consumed = before.len() - self.remaining.len();
        Ok(&before[..consumed])
    }

    /// Read the next TLV, requiring the given identifier octet; returns its content
    pub(crate) fn read_expected(&mut self, tag: u8, what: &str) -> Result<&'a [u8], DecodeError> {
        let (found, data) = self.read_any(what)?;
        if found != tag {
            return Err(DecodeError::malformed(format!(
                "{}: expected tag 0x{:02X}, found 0x{:02X}",
                what, tag, found
            )));
        }
        Ok(data)
    }

    /// Read the next TLV only if it carries the given identifier octet
    pub(crate) fn read_optional(
        &mut self,
        tag: u8,
        what: &str,
    ) -> Result<Option<&'a [u8]>, DecodeError> {
        if self.peek_tag() == Some(tag) {
            self.read_expected(tag, what).map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn read_sequence(&mut self, what: &str) -> Result<DerReader<'a>, DecodeError> {
        self.read_expected(TAG_SEQUENCE, what).map(DerReader::new)
    }

    /// Read `[tag] EXPLICIT` if present and return a reader over the wrapped value
    pub(crate) fn read_optional_explicit(
        &mut self,
        tag: u8,
        what: &str,
    ) -> Result<Option<DerReader<'a>>, DecodeError> {
        Ok(self
            .read_optional(context_constructed(tag), what)?
            .map(DerReader::new))
    }

    pub(crate) fn read_octet_string(&mut self, what: &str) -> Result<&'a [u8], DecodeError> {
        self.read_expected(TAG_OCTET_STRING, what)
    }

    pub(crate) fn read_integer(&mut self, what: &str) -> Result<BigInt, DecodeError> {
        let data = self.read_expected(TAG_INTEGER, what)?;
        parse_integer(data, what)
    }

    /// Read an INTEGER that must fit a non-negative u32
    pub(crate) fn read_unsigned(&mut self, what: &str) -> Result<u32, DecodeError> {
        let value = self.read_integer(what)?;
        u32::try_from(value)
            .map_err(|_| DecodeError::malformed(format!("{} out of range", what)))
    }

    pub(crate) fn read_enumerated(&mut self, what: &str) -> Result<u8, DecodeError> {
        let data = self.read_expected(TAG_ENUMERATED, what)?;
        let value = parse_integer(data, what)?;
        u8::try_from(value).map_err(|_| DecodeError::malformed(format!("{} out of range", what)))
    }

    pub(crate) fn read_boolean(&mut self, what: &str) -> Result<bool, DecodeError> {
        match self.read_expected(TAG_BOOLEAN, what)? {
            [0x00] => Ok(false),
            [0xFF] => Ok(true),
            other => Err(DecodeError::malformed(format!(
                "{}: invalid BOOLEAN content {:02x?}",
                what, other
            ))),
        }
    }

    pub(crate) fn read_oid(&mut self, what: &str) -> Result<Oid<'static>, DecodeError> {
        let data = self.read_expected(TAG_OID, what)?;
        parse_oid(data, what)
    }

    pub(crate) fn read_bit_string(&mut self, what: &str) -> Result<(u8, Vec<u8>), DecodeError> {
        let data = self.read_expected(TAG_BIT_STRING, what)?;
        let (&unused_bits, bytes) = data
            .split_first()
            .ok_or_else(|| DecodeError::malformed(format!("{}: empty BIT STRING", what)))?;
        if unused_bits > 7 || (bytes.is_empty() && unused_bits != 0) {
            return Err(DecodeError::malformed(format!(
                "{}: invalid unused bit count {}",
                what, unused_bits
            )));
        }
        Ok((unused_bits, bytes.to_vec()))
    }

    pub(crate) fn read_generalized_time(
        &mut self,
        what: &str,
    ) -> Result<DateTime<Utc>, DecodeError> {
        let data = self.read_expected(TAG_GENERALIZED_TIME, what)?;
        parse_generalized_time(data, what)
    }

    /// Require that every element has been consumed
    pub(crate) fn finish(self, what: &str) -> Result<(), DecodeError> {
        if self.remaining.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::malformed(format!(
                "{}: {} unexpected bytes after last field",
                what,
                self.remaining.len()
            )))
        }
    }
}

/// Parse INTEGER content, rejecting non-minimal encodings
fn parse_integer(data: &[u8], what: &str) -> Result<BigInt, DecodeError> {
    match data {
        [] => Err(DecodeError::malformed(format!("{}: empty INTEGER", what))),
        [0x00, next, ..] if next & 0x80 == 0 => Err(DecodeError::malformed(format!(
            "{}: non-minimal INTEGER",
            what
        ))),
        [0xFF, next, ..] if next & 0x80 != 0 => Err(DecodeError::malformed(format!(
            "{}: non-minimal INTEGER",
            what
        ))),
        _ => Ok(BigInt::from_signed_bytes_be(data)),
    }
}

/// OID content must be non-empty base-128 groups, each ending with a byte
/// whose high bit is clear and none starting with the 0x80 padding byte
fn valid_oid_content(content: &[u8]) -> bool {
    if content.is_empty() || content[content.len() - 1] & 0x80 != 0 {
        return false;
    }
    let mut group_start = true;
    for &byte in content {
        if group_start && byte == 0x80 {
            return false;
        }
        group_start = byte & 0x80 == 0;
    }
    true
}

fn parse_oid(data: &[u8], what: &str) -> Result<Oid<'static>, DecodeError> {
    if !valid_oid_content(data) {
        return Err(DecodeError::malformed(format!(
            "{}: invalid OBJECT IDENTIFIER",
            what
        )));
    }
    Ok(Oid::new(Cow::Owned(data.to_vec())))
}

/// Parse ASN.1 GeneralizedTime
///
/// GeneralizedTime format: YYYYMMDDHHMMSS[.fff]Z
fn parse_generalized_time(data: &[u8], what: &str) -> Result<DateTime<Utc>, DecodeError> {
    let invalid = || DecodeError::malformed(format!("{}: invalid GeneralizedTime", what));

    let text = std::str::from_utf8(data).map_err(|_| invalid())?;
    if !text.is_ascii() || text.len() < 15 || !text.as_bytes()[..14].iter().all(u8::is_ascii_digit)
    {
        return Err(invalid());
    }
    let fraction = &text[14..text.len() - 1];
    if !fraction.is_empty()
        && (fraction.len() < 2
            || !fraction.starts_with('.')
            || fraction.len() > 10
            || !fraction[1..].bytes().all(|b| b.is_ascii_digit())
            || fraction.ends_with('0'))
    {
        return Err(invalid());
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y%m%d%H%M%S%.fZ").map_err(|e| {
        DecodeError::malformed(format!(
            "{}: failed to parse GeneralizedTime '{}': {}",
            what, text, e
        ))
    })?;
    // chrono folds a leap second into the nanoseconds, which cannot be re-encoded
    if naive.nanosecond() >= 1_000_000_000 {
        return Err(invalid());
    }
    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der_length_forms() {
        assert_eq!(der_length(0), vec![0x00]);
        assert_eq!(der_length(127), vec![0x7F]);
        assert_eq!(der_length(128), vec![0x81, 0x80]);
        assert_eq!(der_length(300), vec![0x82, 0x01, 0x2C]);
    }

    #[test]
    fn test_integer_encoding_is_minimal() {
        assert_eq!(der_unsigned(0), vec![0x02, 0x01, 0x00]);
        assert_eq!(der_unsigned(127), vec![0x02, 0x01, 0x7F]);
        assert_eq!(der_unsigned(128), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(der_integer(&BigInt::from(-1)), vec![0x02, 0x01, 0xFF]);
    }

    #[test]
    fn test_non_minimal_integer_rejected() {
        let bytes = [0x02, 0x02, 0x00, 0x01];
        let mut reader = DerReader::new(&bytes);
        assert!(reader.read_integer("serial").unwrap_err().is_malformed());
    }

    #[test]
    fn test_generalized_time_encoding() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 45).unwrap();
        let encoded = der_generalized_time(&t).unwrap();
        assert_eq!(encoded[0], TAG_GENERALIZED_TIME);
        assert_eq!(&encoded[2..], b"20240315123045Z");

        let mut reader = DerReader::new(&encoded);
        assert_eq!(reader.read_generalized_time("time").unwrap(), t);
    }

    #[test]
    fn test_generalized_time_fraction() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(250);
        let encoded = der_generalized_time(&t).unwrap();
        assert_eq!(&encoded[2..], b"20240315123045.25Z");

        let mut reader = DerReader::new(&encoded);
        assert_eq!(reader.read_generalized_time("time").unwrap(), t);
    }

    #[test]
    fn test_generalized_time_rejects_local_time() {
        let bytes = der_tlv(TAG_GENERALIZED_TIME, b"20240315123045");
        let mut reader = DerReader::new(&bytes);
        assert!(reader.read_generalized_time("time").is_err());
    }

    #[test]
    fn test_generalized_time_nanosecond_fraction() {
        let bytes = der_tlv(TAG_GENERALIZED_TIME, b"20240101000000.123456789Z");
        let mut reader = DerReader::new(&bytes);
        let t = reader.read_generalized_time("time").unwrap();
        assert_eq!(t.nanosecond(), 123_456_789);
        assert_eq!(der_generalized_time(&t).unwrap(), bytes);
    }

    #[test]
    fn test_generalized_time_rejects_sub_nanosecond_fraction() {
        let bytes = der_tlv(TAG_GENERALIZED_TIME, b"20240101000000.1234567891Z");
        let mut reader = DerReader::new(&bytes);
        assert!(reader.read_generalized_time("time").unwrap_err().is_malformed());
    }

    #[test]
    fn test_generalized_time_rejects_leap_second() {
        let bytes = der_tlv(TAG_GENERALIZED_TIME, b"20241231235960Z");
        let mut reader = DerReader::new(&bytes);
        assert!(reader.read_generalized_time("time").unwrap_err().is_malformed());

        let bytes = der_tlv(TAG_GENERALIZED_TIME, b"20241231235960.5Z");
        let mut reader = DerReader::new(&bytes);
        assert!(reader.read_generalized_time("time").unwrap_err().is_malformed());
    }

    #[test]
    fn test_reader_tag_mismatch() {
        let bytes = der_octet_string(b"abc");
        let mut reader = DerReader::new(&bytes);
        let err = reader.read_sequence("CertID").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_read_raw_returns_whole_tlv() {
        let mut bytes = der_sequence(&der_octet_string(b"x"));
        bytes.extend_from_slice(&[0x05, 0x00]);
        let mut reader = DerReader::new(&bytes);
        assert_eq!(reader.read_raw("first").unwrap(), &bytes[..5]);
        assert_eq!(reader.peek_tag(), Some(TAG_NULL));
    }

    #[test]
    fn test_oid_validation() {
        assert!(valid_oid_content(&[0x2B, 0x06, 0x01]));
        assert!(!valid_oid_content(&[]));
        assert!(!valid_oid_content(&[0x2B, 0x86]));
        assert!(!valid_oid_content(&[0x2B, 0x80, 0x01]));
    }
}
