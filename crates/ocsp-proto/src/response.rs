//! OCSP response codec - RFC 6960 Section 4.2
//!
//! ```asn1
//! OCSPResponse ::= SEQUENCE {
//!     responseStatus      OCSPResponseStatus,
//!     responseBytes       [0] EXPLICIT ResponseBytes OPTIONAL
//! }
//!
//! ResponseBytes ::= SEQUENCE {
//!     responseType        OBJECT IDENTIFIER,
//!     response            OCTET STRING
//! }
//!
//! BasicOCSPResponse ::= SEQUENCE {
//!     tbsResponseData     ResponseData,
//!     signatureAlgorithm  AlgorithmIdentifier,
//!     signature           BIT STRING,
//!     certs               [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL
//! }
//!
//! ResponseData ::= SEQUENCE {
//!     version             [0] EXPLICIT Version DEFAULT v1,
//!     responderID         ResponderID,
//!     producedAt          GeneralizedTime,
//!     responses           SEQUENCE OF SingleResponse,
//!     responseExtensions  [1] EXPLICIT Extensions OPTIONAL
//! }
//!
//! ResponderID ::= CHOICE {
//!     byName              [1] Name,
//!     byKey               [2] KeyHash
//! }
//!
//! SingleResponse ::= SEQUENCE {
//!     certID              CertID,
//!     certStatus          CertStatus,
//!     thisUpdate          GeneralizedTime,
//!     nextUpdate          [0] EXPLICIT GeneralizedTime OPTIONAL,
//!     singleExtensions    [1] EXPLICIT Extensions OPTIONAL
//! }
//!
//! CertStatus ::= CHOICE {
//!     good                [0] IMPLICIT NULL,
//!     revoked             [1] IMPLICIT RevokedInfo,
//!     unknown             [2] IMPLICIT UnknownInfo
//! }
//!
//! RevokedInfo ::= SEQUENCE {
//!     revocationTime      GeneralizedTime,
//!     revocationReason    [0] EXPLICIT CRLReason OPTIONAL
//! }
//! ```

use crate::cert_id::CertId;
use crate::codec::OcspCodec;
use crate::der::{
    check_raw_tlv, context_constructed, context_primitive, der_enumerated, der_explicit_context,
    der_generalized_time, der_octet_string, der_oid, der_sequence, der_tlv, der_unsigned,
    DerReader, TAG_SEQUENCE,
};
use crate::error::{DecodeError, EncodeError};
use crate::types::{
    decode_certificates, decode_extensions, encode_certificates, encode_extensions,
    AlgorithmIdentifier, BitString, Extension, OID_OCSP_BASIC,
};
use chrono::{DateTime, Utc};
use der_parser::asn1_rs::Oid;

/// OCSP response status (RFC 6960 Section 2.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseStatus {
    /// Response has valid confirmations
    Successful = 0,
    /// Illegal confirmation request
    MalformedRequest = 1,
    /// Internal error in issuer
    InternalError = 2,
    /// Try again later
    TryLater = 3,
    // (4) is not used
    /// Must sign the request
    SigRequired = 5,
    /// Request unauthorized
    Unauthorized = 6,
}

impl ResponseStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Successful),
            1 => Some(Self::MalformedRequest),
            2 => Some(Self::InternalError),
            3 => Some(Self::TryLater),
            5 => Some(Self::SigRequired),
            6 => Some(Self::Unauthorized),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Revocation reason codes (RFC 5280 Section 5.3.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CrlReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // (7) is not used
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl CrlReason {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::KeyCompromise),
            2 => Some(Self::CaCompromise),
            3 => Some(Self::AffiliationChanged),
            4 => Some(Self::Superseded),
            5 => Some(Self::CessationOfOperation),
            6 => Some(Self::CertificateHold),
            8 => Some(Self::RemoveFromCrl),
            9 => Some(Self::PrivilegeWithdrawn),
            10 => Some(Self::AaCompromise),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Payload of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBytes {
    pub response_type: Oid<'static>,
    /// Contents of the `response` OCTET STRING (DER of the typed response)
    pub response: Vec<u8>,
}

impl ResponseBytes {
    /// Response bytes wrapping an encoded basic response
    pub fn basic(response: Vec<u8>) -> Self {
        ResponseBytes {
            response_type: OID_OCSP_BASIC,
            response,
        }
    }

    pub fn is_basic(&self) -> bool {
        self.response_type == OID_OCSP_BASIC
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = der_oid(&self.response_type)?;
        content.extend_from_slice(&der_octet_string(&self.response));
        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("ResponseBytes")?;
        let response_type = seq.read_oid("ResponseBytes.responseType")?;
        let response = seq.read_octet_string("ResponseBytes.response")?.to_vec();
        seq.finish("ResponseBytes")?;
        Ok(ResponseBytes {
            response_type,
            response,
        })
    }
}

/// OCSP response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcspResponse {
    pub response_status: ResponseStatus,
    /// Present only when the status is successful
    pub response_bytes: Option<ResponseBytes>,
}

impl OcspResponse {
    /// Successful envelope around an encoded basic response
    pub fn from_basic_der(basic_der: Vec<u8>) -> Self {
        OcspResponse {
            response_status: ResponseStatus::Successful,
            response_bytes: Some(ResponseBytes::basic(basic_der)),
        }
    }

    /// Unsuccessful envelope, which carries no response bytes
    pub fn error(status: ResponseStatus) -> Self {
        OcspResponse {
            response_status: status,
            response_bytes: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.response_status == ResponseStatus::Successful
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if !self.is_successful() && self.response_bytes.is_some() {
            return Err(EncodeError::InvalidValue(format!(
                "response status {:?} cannot carry responseBytes",
                self.response_status
            )));
        }
        let mut content = der_enumerated(self.response_status.as_u8());
        if let Some(ref bytes) = self.response_bytes {
            content.extend_from_slice(&der_explicit_context(0, &bytes.encode()?));
        }
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("OCSPResponse")?;
        let status = seq.read_enumerated("OCSPResponse.responseStatus")?;
        let response_status = ResponseStatus::from_u8(status).ok_or_else(|| {
            DecodeError::malformed(format!("Unknown OCSP response status: {}", status))
        })?;
        let response_bytes = match seq.read_optional_explicit(0, "OCSPResponse.responseBytes")? {
            Some(mut tagged) => {
                let bytes = ResponseBytes::decode(&mut tagged)?;
                tagged.finish("OCSPResponse.responseBytes")?;
                Some(bytes)
            }
            None => None,
        };
        seq.finish("OCSPResponse")?;
        Ok(OcspResponse {
            response_status,
            response_bytes,
        })
    }
}

/// Identity of the responder that produced a basic response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponderId {
    /// Complete DER encoding of the responder's Name (a SEQUENCE)
    ByName(Vec<u8>),
    /// SHA-1 hash of the responder's public key
    ByKey(Vec<u8>),
}

impl ResponderId {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            ResponderId::ByName(name) => {
                check_raw_tlv(name, "ResponderID.byName")?;
                if name.first() != Some(&TAG_SEQUENCE) {
                    return Err(EncodeError::InvalidValue(
                        "ResponderID.byName is not a Name SEQUENCE".to_string(),
                    ));
                }
                Ok(der_explicit_context(1, name))
            }
            ResponderId::ByKey(hash) => Ok(der_explicit_context(2, &der_octet_string(hash))),
        }
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        if let Some(mut tagged) = reader.read_optional_explicit(1, "ResponderID.byName")? {
            let name = tagged.read_raw("ResponderID.byName")?;
            tagged.finish("ResponderID.byName")?;
            if name.first() != Some(&TAG_SEQUENCE) {
                return Err(DecodeError::malformed(
                    "ResponderID.byName is not a Name SEQUENCE",
                ));
            }
            return Ok(ResponderId::ByName(name.to_vec()));
        }
        if let Some(mut tagged) = reader.read_optional_explicit(2, "ResponderID.byKey")? {
            let hash = tagged.read_octet_string("ResponderID.byKey")?.to_vec();
            tagged.finish("ResponderID.byKey")?;
            return Ok(ResponderId::ByKey(hash));
        }
        Err(DecodeError::malformed(match reader.peek_tag() {
            Some(tag) => format!("ResponderID: unexpected tag 0x{:02X}", tag),
            None => "missing ResponderID".to_string(),
        }))
    }
}

/// Revocation details of a revoked certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevokedInfo {
    pub revocation_time: DateTime<Utc>,
    pub revocation_reason: Option<CrlReason>,
}

impl RevokedInfo {
    pub fn new(revocation_time: DateTime<Utc>, revocation_reason: Option<CrlReason>) -> Self {
        RevokedInfo {
            revocation_time,
            revocation_reason,
        }
    }

    /// Implicitly tagged `[1] RevokedInfo`
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = der_generalized_time(&self.revocation_time)?;
        if let Some(reason) = self.revocation_reason {
            content.extend_from_slice(&der_explicit_context(0, &der_enumerated(reason.as_u8())));
        }
        Ok(der_tlv(context_constructed(1), &content))
    }

    /// Decode from the content of the implicit `[1]` tag
    fn decode(content: &[u8]) -> Result<Self, DecodeError> {
        let mut seq = DerReader::new(content);
        let revocation_time = seq.read_generalized_time("RevokedInfo.revocationTime")?;
        let revocation_reason =
            match seq.read_optional_explicit(0, "RevokedInfo.revocationReason")? {
                Some(mut tagged) => {
                    let value = tagged.read_enumerated("RevokedInfo.revocationReason")?;
                    tagged.finish("RevokedInfo.revocationReason")?;
                    Some(CrlReason::from_u8(value).ok_or_else(|| {
                        DecodeError::malformed(format!("Unknown CRL reason: {}", value))
                    })?)
                }
                None => None,
            };
        seq.finish("RevokedInfo")?;
        Ok(RevokedInfo {
            revocation_time,
            revocation_reason,
        })
    }
}

/// Status report for one certificate
///
/// The certificate status is held as the three CHOICE alternatives side by
/// side. A well-formed value has exactly one of them set; see
/// [`SingleResponse::status`] for the typed view and
/// [`SingleResponse::normalize`] for the rules applied before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleResponse {
    pub cert_id: CertId,
    pub good: bool,
    /// `None` is the empty (unset) revocation
    pub revoked: Option<RevokedInfo>,
    pub unknown: bool,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
    pub single_extensions: Vec<Extension>,
}

impl SingleResponse {
    /// Single response with no status set
    pub fn new(cert_id: CertId, this_update: DateTime<Utc>) -> Self {
        SingleResponse {
            cert_id,
            good: false,
            revoked: None,
            unknown: false,
            this_update,
            next_update: None,
            single_extensions: Vec::new(),
        }
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let set = [self.good, self.revoked.is_some(), self.unknown]
            .iter()
            .filter(|slot| **slot)
            .count();
        if set != 1 {
            return Err(EncodeError::InvalidValue(format!(
                "SingleResponse for serial {} has {} certStatus alternatives set",
                self.cert_id.serial_number, set
            )));
        }

        let mut content = self.cert_id.encode()?;
        if self.good {
            content.extend_from_slice(&der_tlv(context_primitive(0), &[]));
        }
        if let Some(ref revoked) = self.revoked {
            content.extend_from_slice(&revoked.encode()?);
        }
        if self.unknown {
            content.extend_from_slice(&der_tlv(context_primitive(2), &[]));
        }
        content.extend_from_slice(&der_generalized_time(&self.this_update)?);
        if let Some(ref next_update) = self.next_update {
            content.extend_from_slice(&der_explicit_context(
                0,
                &der_generalized_time(next_update)?,
            ));
        }
        if !self.single_extensions.is_empty() {
            let exts = encode_extensions(&self.single_extensions)?;
            content.extend_from_slice(&der_explicit_context(1, &exts));
        }
        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("SingleResponse")?;
        let cert_id = CertId::decode(&mut seq)?;

        // Each alternative is read independently so that a response carrying
        // several of them is reported as-is rather than truncated.
        let good = match seq.read_optional(context_primitive(0), "CertStatus.good")? {
            Some([]) => true,
            Some(_) => return Err(DecodeError::malformed("CertStatus.good is not NULL")),
            None => false,
        };
        let revoked = seq
            .read_optional(context_constructed(1), "CertStatus.revoked")?
            .map(RevokedInfo::decode)
            .transpose()?;
        let unknown = match seq.read_optional(context_primitive(2), "CertStatus.unknown")? {
            Some([]) => true,
            Some(_) => return Err(DecodeError::malformed("CertStatus.unknown is not NULL")),
            None => false,
        };

        let this_update = seq.read_generalized_time("SingleResponse.thisUpdate")?;
        let next_update = match seq.read_optional_explicit(0, "SingleResponse.nextUpdate")? {
            Some(mut tagged) => {
                let time = tagged.read_generalized_time("SingleResponse.nextUpdate")?;
                tagged.finish("SingleResponse.nextUpdate")?;
                Some(time)
            }
            None => None,
        };
        let single_extensions =
            match seq.read_optional_explicit(1, "SingleResponse.singleExtensions")? {
                Some(tagged) => decode_extensions(tagged, "SingleResponse.singleExtensions")?,
                None => Vec::new(),
            };
        seq.finish("SingleResponse")?;

        Ok(SingleResponse {
            cert_id,
            good,
            revoked,
            unknown,
            this_update,
            next_update,
            single_extensions,
        })
    }
}

/// The signed portion of a basic response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    /// Protocol version; 0 (v1) is omitted on the wire
    pub version: u32,
    pub responder_id: ResponderId,
    pub produced_at: DateTime<Utc>,
    pub responses: Vec<SingleResponse>,
    pub response_extensions: Vec<Extension>,
}

impl ResponseData {
    pub fn new(
        responder_id: ResponderId,
        produced_at: DateTime<Utc>,
        responses: Vec<SingleResponse>,
    ) -> Self {
        ResponseData {
            version: 0,
            responder_id,
            produced_at,
            responses,
            response_extensions: Vec::new(),
        }
    }

    /// DER encoding of this value exactly as it appears inside the basic
    /// response; this is the input an external signer signs
    pub fn to_der(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode()
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = Vec::new();

        // version: omitted when v1 (DEFAULT)
        if self.version != 0 {
            content.extend_from_slice(&der_explicit_context(0, &der_unsigned(self.version)));
        }
        content.extend_from_slice(&self.responder_id.encode()?);
        content.extend_from_slice(&der_generalized_time(&self.produced_at)?);

        let mut responses = Vec::new();
        for single in &self.responses {
            responses.extend_from_slice(&single.encode()?);
        }
        content.extend_from_slice(&der_sequence(&responses));

        if !self.response_extensions.is_empty() {
            let exts = encode_extensions(&self.response_extensions)?;
            content.extend_from_slice(&der_explicit_context(1, &exts));
        }
        Ok(der_sequence(&content))
    }

    fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("ResponseData")?;

        let version = match seq.read_optional_explicit(0, "ResponseData.version")? {
            Some(mut tagged) => {
                let version = tagged.read_unsigned("ResponseData.version")?;
                tagged.finish("ResponseData.version")?;
                version
            }
            None => 0,
        };
        let responder_id = ResponderId::decode(&mut seq)?;
        let produced_at = seq.read_generalized_time("ResponseData.producedAt")?;

        let mut list = seq.read_sequence("ResponseData.responses")?;
        let mut responses = Vec::new();
        while !list.is_empty() {
            responses.push(SingleResponse::decode(&mut list)?);
        }

        let response_extensions =
            match seq.read_optional_explicit(1, "ResponseData.responseExtensions")? {
                Some(tagged) => decode_extensions(tagged, "ResponseData.responseExtensions")?,
                None => Vec::new(),
            };
        seq.finish("ResponseData")?;

        Ok(ResponseData {
            version,
            responder_id,
            produced_at,
            responses,
            response_extensions,
        })
    }
}

/// Basic OCSP response (id-pkix-ocsp-basic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicResponse {
    pub tbs_response_data: ResponseData,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
    /// Raw DER certificates; empty when absent
    pub certs: Vec<Vec<u8>>,
}

impl BasicResponse {
    pub fn new(
        tbs_response_data: ResponseData,
        signature_algorithm: AlgorithmIdentifier,
        signature: BitString,
    ) -> Self {
        BasicResponse {
            tbs_response_data,
            signature_algorithm,
            signature,
            certs: Vec::new(),
        }
    }

    pub fn responses(&self) -> &[SingleResponse] {
        &self.tbs_response_data.responses
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = self.tbs_response_data.encode()?;
        content.extend_from_slice(&self.signature_algorithm.encode()?);
        content.extend_from_slice(&self.signature.encode()?);
        if !self.certs.is_empty() {
            let certs = encode_certificates(&self.certs)?;
            content.extend_from_slice(&der_explicit_context(0, &certs));
        }
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("BasicOCSPResponse")?;
        let tbs_response_data = ResponseData::decode(&mut seq)?;
        let signature_algorithm = AlgorithmIdentifier::decode(&mut seq)?;
        let signature = BitString::decode(&mut seq, "BasicOCSPResponse.signature")?;
        let certs = match seq.read_optional_explicit(0, "BasicOCSPResponse.certs")? {
            Some(tagged) => decode_certificates(tagged, "BasicOCSPResponse.certs")?,
            None => Vec::new(),
        };
        seq.finish("BasicOCSPResponse")?;
        Ok(BasicResponse {
            tbs_response_data,
            signature_algorithm,
            signature,
            certs,
        })
    }
}

/// Decode a DER-encoded OCSP response envelope
pub fn decode_response(bytes: &[u8]) -> Result<OcspResponse, DecodeError> {
    OcspCodec::default().decode_response(bytes)
}

/// Decode an OCSP response envelope and the basic response it carries
pub fn decode_response_as_basic(bytes: &[u8]) -> Result<BasicResponse, DecodeError> {
    OcspCodec::default().decode_response_as_basic(bytes)
}

/// Decode a DER-encoded basic response
pub fn decode_basic_response(bytes: &[u8]) -> Result<BasicResponse, DecodeError> {
    OcspCodec::default().decode_basic_response(bytes)
}

/// Encode an OCSP response envelope to DER
pub fn encode_response(response: &OcspResponse) -> Result<Vec<u8>, EncodeError> {
    OcspCodec::default().encode_response(response)
}

/// Normalize, encode and wrap a basic response in a successful envelope
pub fn encode_response_from_basic(basic: &BasicResponse) -> Result<Vec<u8>, EncodeError> {
    OcspCodec::default().encode_response_from_basic(basic)
}

/// Normalize and encode a basic response without an envelope
pub fn encode_basic_response(basic: &BasicResponse) -> Result<Vec<u8>, EncodeError> {
    OcspCodec::default().encode_basic_response(basic)
}
