//! OCSP request codec - RFC 6960 Section 4.1
//!
//! ```asn1
//! OCSPRequest ::= SEQUENCE {
//!     tbsRequest          TBSRequest,
//!     optionalSignature   [0] EXPLICIT Signature OPTIONAL
//! }
//!
//! TBSRequest ::= SEQUENCE {
//!     version             [0] EXPLICIT Version DEFAULT v1,
//!     requestorName       [1] EXPLICIT GeneralName OPTIONAL,
//!     requestList         SEQUENCE OF Request,
//!     requestExtensions   [2] EXPLICIT Extensions OPTIONAL
//! }
//!
//! Signature ::= SEQUENCE {
//!     signatureAlgorithm  AlgorithmIdentifier,
//!     signature           BIT STRING,
//!     certs               [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL
//! }
//!
//! Request ::= SEQUENCE {
//!     reqCert                     CertID,
//!     singleRequestExtensions     [0] EXPLICIT Extensions OPTIONAL
//! }
//! ```

use crate::cert_id::CertId;
use crate::codec::OcspCodec;
use crate::der::{check_raw_tlv, der_explicit_context, der_sequence, der_unsigned, DerReader};
use crate::error::{DecodeError, EncodeError};
use crate::types::{
    decode_certificates, decode_extensions, encode_certificates, encode_extensions, find_nonce,
    upsert_nonce, AlgorithmIdentifier, BitString, Extension,
};

/// OCSP request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcspRequest {
    pub tbs_request: TbsRequest,
    pub optional_signature: Option<Signature>,
}

/// The signed portion of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TbsRequest {
    /// Protocol version; 0 (v1) is omitted on the wire
    pub version: u32,
    /// Complete DER encoding of the requestor GeneralName
    pub requestor_name: Option<Vec<u8>>,
    pub request_list: Vec<Request>,
    /// Empty when the request carries no extensions
    pub request_extensions: Vec<Extension>,
}

/// Status query for a single certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub req_cert: CertId,
    pub single_request_extensions: Vec<Extension>,
}

/// Optional request signature block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
    /// Raw DER certificates; empty when absent
    pub certs: Vec<Vec<u8>>,
}

impl Request {
    pub fn new(req_cert: CertId) -> Self {
        Request {
            req_cert,
            single_request_extensions: Vec::new(),
        }
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = self.req_cert.encode()?;
        if !self.single_request_extensions.is_empty() {
            let exts = encode_extensions(&self.single_request_extensions)?;
            content.extend_from_slice(&der_explicit_context(0, &exts));
        }
        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("Request")?;
        let req_cert = CertId::decode(&mut seq)?;
        let single_request_extensions = match seq
            .read_optional_explicit(0, "Request.singleRequestExtensions")?
        {
            Some(tagged) => decode_extensions(tagged, "Request.singleRequestExtensions")?,
            None => Vec::new(),
        };
        seq.finish("Request")?;
        Ok(Request {
            req_cert,
            single_request_extensions,
        })
    }
}

impl Signature {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = self.signature_algorithm.encode()?;
        content.extend_from_slice(&self.signature.encode()?);
        if !self.certs.is_empty() {
            let certs = encode_certificates(&self.certs)?;
            content.extend_from_slice(&der_explicit_context(0, &certs));
        }
        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("Signature")?;
        let signature_algorithm = AlgorithmIdentifier::decode(&mut seq)?;
        let signature = BitString::decode(&mut seq, "Signature.signature")?;
        let certs = match seq.read_optional_explicit(0, "Signature.certs")? {
            Some(tagged) => decode_certificates(tagged, "Signature.certs")?,
            None => Vec::new(),
        };
        seq.finish("Signature")?;
        Ok(Signature {
            signature_algorithm,
            signature,
            certs,
        })
    }
}

impl TbsRequest {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = Vec::new();

        // version: omitted when v1 (DEFAULT)
        if self.version != 0 {
            content.extend_from_slice(&der_explicit_context(0, &der_unsigned(self.version)));
        }

        if let Some(ref name) = self.requestor_name {
            check_raw_tlv(name, "TBSRequest.requestorName")?;
            content.extend_from_slice(&der_explicit_context(1, name));
        }

        let mut list = Vec::new();
        for request in &self.request_list {
            list.extend_from_slice(&request.encode()?);
        }
        content.extend_from_slice(&der_sequence(&list));

        if !self.request_extensions.is_empty() {
            let exts = encode_extensions(&self.request_extensions)?;
            content.extend_from_slice(&der_explicit_context(2, &exts));
        }

        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("TBSRequest")?;

        let version = match seq.read_optional_explicit(0, "TBSRequest.version")? {
            Some(mut tagged) => {
                let version = tagged.read_unsigned("TBSRequest.version")?;
                tagged.finish("TBSRequest.version")?;
                version
            }
            None => 0,
        };

        let requestor_name = match seq.read_optional_explicit(1, "TBSRequest.requestorName")? {
            Some(mut tagged) => {
                let name = tagged.read_raw("TBSRequest.requestorName")?.to_vec();
                tagged.finish("TBSRequest.requestorName")?;
                Some(name)
            }
            None => None,
        };

        let mut list = seq.read_sequence("TBSRequest.requestList")?;
        let mut request_list = Vec::new();
        while !list.is_empty() {
            request_list.push(Request::decode(&mut list)?);
        }

        let request_extensions =
            match seq.read_optional_explicit(2, "TBSRequest.requestExtensions")? {
                Some(tagged) => decode_extensions(tagged, "TBSRequest.requestExtensions")?,
                None => Vec::new(),
            };

        seq.finish("TBSRequest")?;
        Ok(TbsRequest {
            version,
            requestor_name,
            request_list,
            request_extensions,
        })
    }
}

impl OcspRequest {
    /// Create an unsigned request for the given certificates, in order
    pub fn new(cert_ids: impl IntoIterator<Item = CertId>) -> Self {
        OcspRequest {
            tbs_request: TbsRequest {
                request_list: cert_ids.into_iter().map(Request::new).collect(),
                ..TbsRequest::default()
            },
            optional_signature: None,
        }
    }

    /// Add a nonce for replay protection
    pub fn with_nonce(mut self, nonce: impl AsRef<[u8]>) -> Self {
        self.set_nonce(nonce.as_ref());
        self
    }

    /// Value of the nonce extension in the request extensions, if present
    pub fn nonce(&self) -> Option<&[u8]> {
        find_nonce(&self.tbs_request.request_extensions)
    }

    /// Replace the request nonce, or add one if the request has none
    pub fn set_nonce(&mut self, nonce: &[u8]) {
        upsert_nonce(&mut self.tbs_request.request_extensions, nonce);
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = self.tbs_request.encode()?;
        if let Some(ref signature) = self.optional_signature {
            content.extend_from_slice(&der_explicit_context(0, &signature.encode()?));
        }
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("OCSPRequest")?;
        let tbs_request = TbsRequest::decode(&mut seq)?;
        let optional_signature = match seq.read_optional_explicit(0, "OCSPRequest.signature")? {
            Some(mut tagged) => {
                let signature = Signature::decode(&mut tagged)?;
                tagged.finish("OCSPRequest.signature")?;
                Some(signature)
            }
            None => None,
        };
        seq.finish("OCSPRequest")?;
        Ok(OcspRequest {
            tbs_request,
            optional_signature,
        })
    }
}

/// Decode a DER-encoded OCSP request
pub fn decode_request(bytes: &[u8]) -> Result<OcspRequest, DecodeError> {
    OcspCodec::default().decode_request(bytes)
}

/// Encode an OCSP request to DER
pub fn encode_request(request: &OcspRequest) -> Result<Vec<u8>, EncodeError> {
    OcspCodec::default().encode_request(request)
}

/// Nonce carried in the request extensions, if any
pub fn nonce(request: &OcspRequest) -> Option<&[u8]> {
    request.nonce()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert_id::HashAlgorithm;
    use crate::types::OID_SHA256;
    use num_bigint::BigInt;

    fn cert_id(serial: i64) -> CertId {
        CertId::from_issuer(
            HashAlgorithm::Sha256,
            b"CN=Test Issuer",
            b"issuer public key",
            BigInt::from(serial),
        )
    }

    #[test]
    fn test_minimal_request_roundtrip() {
        let request = OcspRequest::new([cert_id(1)]);
        let bytes = encode_request(&request).unwrap();
        assert_eq!(decode_request(&bytes).unwrap(), request);
    }

    #[test]
    fn test_request_order_preserved() {
        let request = OcspRequest::new([cert_id(3), cert_id(1), cert_id(2)]);
        let decoded = decode_request(&encode_request(&request).unwrap()).unwrap();
        let serials: Vec<_> = decoded
            .tbs_request
            .request_list
            .iter()
            .map(|r| r.req_cert.serial_number.clone())
            .collect();
        assert_eq!(
            serials,
            vec![BigInt::from(3), BigInt::from(1), BigInt::from(2)]
        );
    }

    #[test]
    fn test_full_request_roundtrip() {
        let mut request =
            OcspRequest::new([cert_id(10), cert_id(11)]).with_nonce(b"0123456789abcdef");
        request.tbs_request.version = 1;
        // [4] directoryName-style GeneralName carried as raw DER
        request.tbs_request.requestor_name = Some(vec![0xA4, 0x02, 0x30, 0x00]);
        request.tbs_request.request_list[1]
            .single_request_extensions
            .push(Extension::new(OID_SHA256, true, vec![0x05, 0x00]));
        request.optional_signature = Some(Signature {
            signature_algorithm: AlgorithmIdentifier::with_null_parameters(OID_SHA256),
            signature: BitString::from_bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            certs: vec![vec![0x30, 0x03, 0x02, 0x01, 0x07]],
        });

        let bytes = encode_request(&request).unwrap();
        let decoded = decode_request(&bytes).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.nonce(), Some(&b"0123456789abcdef"[..]));
    }

    #[test]
    fn test_nonce_absent() {
        let request = OcspRequest::new([cert_id(1)]);
        assert_eq!(nonce(&request), None);
    }

    #[test]
    fn test_set_nonce_replaces() {
        let mut request = OcspRequest::new([cert_id(1)]).with_nonce(b"one");
        request.set_nonce(b"two");
        assert_eq!(request.tbs_request.request_extensions.len(), 1);
        assert_eq!(request.nonce(), Some(&b"two"[..]));
    }

    #[test]
    fn test_trailing_data_rejected() {
        let mut bytes = encode_request(&OcspRequest::new([cert_id(1)])).unwrap();
        bytes.push(0x00);
        let err = decode_request(&bytes).unwrap_err();
        assert!(err.is_trailing_data());
    }

    #[test]
    fn test_wrong_outer_tag_rejected() {
        let mut bytes = encode_request(&OcspRequest::new([cert_id(1)])).unwrap();
        bytes[0] = 0x31; // SET instead of SEQUENCE
        assert!(decode_request(&bytes).unwrap_err().is_malformed());
    }

    #[test]
    fn test_invalid_requestor_name_rejected_on_encode() {
        let mut request = OcspRequest::new([cert_id(1)]);
        request.tbs_request.requestor_name = Some(vec![0x30, 0x05, 0x00]);
        assert!(encode_request(&request).is_err());
    }
}
