//! X.509 building blocks shared by OCSP requests and responses
//!
//! ```asn1
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm       OBJECT IDENTIFIER,
//!     parameters      ANY DEFINED BY algorithm OPTIONAL
//! }
//!
//! Extension ::= SEQUENCE {
//!     extnID      OBJECT IDENTIFIER,
//!     critical    BOOLEAN DEFAULT FALSE,
//!     extnValue   OCTET STRING
//! }
//! ```

use crate::der::{
    check_raw_tlv, der_bit_string, der_boolean, der_octet_string, der_oid, der_sequence,
    DerReader, TAG_BOOLEAN, TAG_NULL,
};
use crate::error::{DecodeError, EncodeError};
use der_parser::asn1_rs::{oid, Oid};

/// OCSP nonce extension
pub const OID_OCSP_NONCE: Oid<'static> = oid!(1.3.6.1.5.5.7.48.1.2);

/// Basic OCSP response type
pub const OID_OCSP_BASIC: Oid<'static> = oid!(1.3.6.1.5.5.7.48.1.1);

/// id-sha256
pub const OID_SHA256: Oid<'static> = oid!(2.16.840.1.101.3.4.2.1);

/// id-sha384
pub const OID_SHA384: Oid<'static> = oid!(2.16.840.1.101.3.4.2.2);

/// id-sha512
pub const OID_SHA512: Oid<'static> = oid!(2.16.840.1.101.3.4.2.3);

/// Encoded ASN.1 NULL, the usual parameters of a digest algorithm
pub(crate) const DER_NULL: [u8; 2] = [TAG_NULL, 0x00];

/// Algorithm identifier with optional raw DER parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgorithmIdentifier {
    pub algorithm: Oid<'static>,
    /// Complete DER encoding (tag, length, content) of the parameters
    pub parameters: Option<Vec<u8>>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: Oid<'static>) -> Self {
        AlgorithmIdentifier {
            algorithm,
            parameters: None,
        }
    }

    /// Algorithm identifier whose parameters are an explicit NULL
    pub fn with_null_parameters(algorithm: Oid<'static>) -> Self {
        AlgorithmIdentifier {
            algorithm,
            parameters: Some(DER_NULL.to_vec()),
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = der_oid(&self.algorithm)?;
        if let Some(ref params) = self.parameters {
            check_raw_tlv(params, "AlgorithmIdentifier.parameters")?;
            content.extend_from_slice(params);
        }
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("AlgorithmIdentifier")?;
        let algorithm = seq.read_oid("AlgorithmIdentifier.algorithm")?;
        let parameters = if seq.is_empty() {
            None
        } else {
            Some(seq.read_raw("AlgorithmIdentifier.parameters")?.to_vec())
        };
        seq.finish("AlgorithmIdentifier")?;
        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
        })
    }
}

/// BIT STRING value, as used for signatures
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    /// Number of unused bits in the final byte (0-7)
    pub unused_bits: u8,
    pub bytes: Vec<u8>,
}

impl BitString {
    /// Bit string made of whole bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        BitString {
            unused_bits: 0,
            bytes: bytes.into(),
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        der_bit_string(self.unused_bits, &self.bytes)
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>, what: &str) -> Result<Self, DecodeError> {
        let (unused_bits, bytes) = reader.read_bit_string(what)?;
        Ok(BitString { unused_bits, bytes })
    }
}

/// X.509 extension with an opaque value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    pub id: Oid<'static>,
    pub critical: bool,
    /// Contents of the `extnValue` OCTET STRING
    pub value: Vec<u8>,
}

impl Extension {
    pub fn new(id: Oid<'static>, critical: bool, value: impl Into<Vec<u8>>) -> Self {
        Extension {
            id,
            critical,
            value: value.into(),
        }
    }

    /// Non-critical nonce extension carrying `value`
    pub fn nonce(value: impl Into<Vec<u8>>) -> Self {
        Self::new(OID_OCSP_NONCE, false, value)
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = der_oid(&self.id)?;
        // critical: omitted when FALSE (DEFAULT)
        if self.critical {
            content.extend_from_slice(&der_boolean(true));
        }
        content.extend_from_slice(&der_octet_string(&self.value));
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("Extension")?;
        let id = seq.read_oid("Extension.extnID")?;
        let critical = if seq.peek_tag() == Some(TAG_BOOLEAN) {
            seq.read_boolean("Extension.critical")?
        } else {
            false
        };
        let value = seq.read_octet_string("Extension.extnValue")?.to_vec();
        seq.finish("Extension")?;
        Ok(Extension {
            id,
            critical,
            value,
        })
    }
}

/// Encode `Extensions ::= SEQUENCE OF Extension`
pub(crate) fn encode_extensions(extensions: &[Extension]) -> Result<Vec<u8>, EncodeError> {
    let mut content = Vec::new();
    for extension in extensions {
        content.extend_from_slice(&extension.encode()?);
    }
    Ok(der_sequence(&content))
}

/// Decode `Extensions ::= SEQUENCE OF Extension` from the reader of an
/// explicit tag, requiring nothing after the sequence
pub(crate) fn decode_extensions(
    mut tagged: DerReader<'_>,
    what: &str,
) -> Result<Vec<Extension>, DecodeError> {
    let mut seq = tagged.read_sequence(what)?;
    tagged.finish(what)?;
    let mut extensions = Vec::new();
    while !seq.is_empty() {
        extensions.push(Extension::decode(&mut seq)?);
    }
    Ok(extensions)
}

/// Encode `SEQUENCE OF Certificate` from raw certificate encodings
pub(crate) fn encode_certificates(certs: &[Vec<u8>]) -> Result<Vec<u8>, EncodeError> {
    for cert in certs {
        check_raw_tlv(cert, "Certificate")?;
    }
    Ok(der_sequence(&certs.concat()))
}

/// Decode `SEQUENCE OF Certificate` from the reader of an explicit tag,
/// keeping each certificate as its raw DER encoding
pub(crate) fn decode_certificates(
    mut tagged: DerReader<'_>,
    what: &str,
) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut seq = tagged.read_sequence(what)?;
    tagged.finish(what)?;
    let mut certs = Vec::new();
    while !seq.is_empty() {
        certs.push(seq.read_raw("Certificate")?.to_vec());
    }
    Ok(certs)
}

/// Value of the first extension with the nonce OID
pub(crate) fn find_nonce(extensions: &[Extension]) -> Option<&[u8]> {
    extensions
        .iter()
        .find(|ext| ext.id == OID_OCSP_NONCE)
        .map(|ext| ext.value.as_slice())
}

/// Replace the value of the existing nonce extension, or append a new
/// non-critical one
pub(crate) fn upsert_nonce(extensions: &mut Vec<Extension>, nonce: &[u8]) {
    match extensions.iter_mut().find(|ext| ext.id == OID_OCSP_NONCE) {
        Some(ext) => ext.value = nonce.to_vec(),
        None => extensions.push(Extension::nonce(nonce)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_constants() {
        assert_eq!(OID_OCSP_NONCE.to_id_string(), "1.3.6.1.5.5.7.48.1.2");
        assert_eq!(OID_OCSP_BASIC.to_id_string(), "1.3.6.1.5.5.7.48.1.1");
        assert_eq!(OID_SHA256.to_id_string(), "2.16.840.1.101.3.4.2.1");
        assert_eq!(
            OID_SHA512.as_bytes(),
            &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03]
        );
    }

    #[test]
    fn test_extension_critical_default_omitted() {
        let ext = Extension::nonce(vec![1, 2, 3]);
        let encoded = ext.encode().unwrap();
        // SEQUENCE { OID (11 bytes), OCTET STRING (5 bytes) }
        assert_eq!(encoded.len(), 2 + 11 + 5);

        let mut reader = DerReader::new(&encoded);
        assert_eq!(Extension::decode(&mut reader).unwrap(), ext);
    }

    #[test]
    fn test_critical_extension_roundtrip() {
        let ext = Extension::new(OID_SHA256, true, vec![0xAB]);
        let encoded = ext.encode().unwrap();
        let mut reader = DerReader::new(&encoded);
        let decoded = Extension::decode(&mut reader).unwrap();
        assert!(decoded.critical);
        assert_eq!(decoded, ext);
    }

    #[test]
    fn test_algorithm_identifier_preserves_parameters() {
        let alg = AlgorithmIdentifier::with_null_parameters(OID_SHA256);
        let encoded = alg.encode().unwrap();
        let mut reader = DerReader::new(&encoded);
        assert_eq!(AlgorithmIdentifier::decode(&mut reader).unwrap(), alg);

        let bare = AlgorithmIdentifier::new(OID_SHA256);
        let encoded = bare.encode().unwrap();
        let mut reader = DerReader::new(&encoded);
        assert_eq!(
            AlgorithmIdentifier::decode(&mut reader).unwrap().parameters,
            None
        );
    }

    #[test]
    fn test_upsert_nonce_replaces() {
        let mut exts = vec![Extension::new(OID_SHA256, false, vec![9])];
        upsert_nonce(&mut exts, b"first");
        upsert_nonce(&mut exts, b"second");
        assert_eq!(exts.len(), 2);
        assert_eq!(find_nonce(&exts), Some(&b"second"[..]));
    }
}
