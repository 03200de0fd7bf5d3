//! OCSP Protocol Implementation
//!
//! This crate provides DER encoding and decoding of Online Certificate
//! Status Protocol messages as defined in RFC 6960.
//!
//! # Features
//!
//! - OCSP request encoding and decoding, with optional signature
//! - OCSP response envelope and basic response encoding and decoding
//! - CertID construction from issuer data (SHA-256/384/512)
//! - Nonce extension access on requests and single responses
//! - Certificate status normalization before encoding
//! - Lenient or strict status validation while decoding
//!
//! Signature creation and verification are left to the caller: the codec
//! exposes [`ResponseData::to_der`] for signing and carries the signature
//! bytes through untouched.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use num_bigint::BigInt;
//! use ocsp_proto::{
//!     decode_request, decode_response_as_basic, encode_request, encode_response_from_basic,
//!     AlgorithmIdentifier, BasicResponse, BitString, CertId, CertStatus, HashAlgorithm,
//!     OcspRequest, ResponderId, ResponseData, SingleResponse, OID_SHA256,
//! };
//!
//! let cert_id = CertId::from_issuer(HashAlgorithm::Sha256, b"issuer", b"key", BigInt::from(42));
//!
//! // Client side: build a request with a nonce
//! let request = OcspRequest::new([cert_id]).with_nonce(b"0123456789abcdef");
//! let request_der = encode_request(&request).unwrap();
//!
//! // Responder side: answer every requested certificate
//! let request = decode_request(&request_der).unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let responses = request
//!     .tbs_request
//!     .request_list
//!     .iter()
//!     .map(|r| {
//!         let mut single = SingleResponse::new(r.req_cert.clone(), now);
//!         single.set_status(CertStatus::Good);
//!         single
//!     })
//!     .collect();
//! let mut basic = BasicResponse::new(
//!     ResponseData::new(ResponderId::ByKey(vec![0; 20]), now, responses),
//!     AlgorithmIdentifier::new(OID_SHA256),
//!     BitString::from_bytes(vec![0; 64]),
//! );
//! if let Some(nonce) = request.nonce() {
//!     basic.set_response_nonce(nonce);
//! }
//! let response_der = encode_response_from_basic(&basic).unwrap();
//!
//! let decoded = decode_response_as_basic(&response_der).unwrap();
//! assert_eq!(decoded.responses()[0].status(), Some(CertStatus::Good));
//! assert_eq!(decoded.nonce(), Some(&b"0123456789abcdef"[..]));
//! ```

pub mod cert_id;
pub mod codec;
pub mod config;
pub(crate) mod der;
pub mod error;
pub mod request;
pub mod response;
pub mod status;
pub mod types;

pub use cert_id::{CertId, HashAlgorithm};
pub use codec::OcspCodec;
pub use config::{CodecConfig, ValidationMode};
pub use error::{AccessError, DecodeError, EncodeError};
pub use request::{decode_request, encode_request, OcspRequest, Request, Signature, TbsRequest};
pub use response::{
    decode_basic_response, decode_response, decode_response_as_basic, encode_basic_response,
    encode_response, encode_response_from_basic, BasicResponse, CrlReason, OcspResponse,
    ResponderId, ResponseBytes, ResponseData, ResponseStatus, RevokedInfo, SingleResponse,
};
pub use status::CertStatus;
pub use types::{
    AlgorithmIdentifier, BitString, Extension, OID_OCSP_BASIC, OID_OCSP_NONCE, OID_SHA256,
    OID_SHA384, OID_SHA512,
};
