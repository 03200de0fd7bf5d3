//! Configurable entry points for every encode and decode operation
//!
//! The free functions in [`crate::request`] and [`crate::response`] use a
//! codec with the default [`CodecConfig`].

use crate::config::{CodecConfig, ValidationMode};
use crate::der::DerReader;
use crate::error::{DecodeError, EncodeError};
use crate::request::OcspRequest;
use crate::response::{BasicResponse, OcspResponse};
use tracing::{debug, trace};

/// OCSP message codec
#[derive(Debug, Clone, Default)]
pub struct OcspCodec {
    config: CodecConfig,
}

impl OcspCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode one top-level value and require that it spans all of `bytes`
    fn decode_top_level<T>(
        &self,
        bytes: &[u8],
        context: &'static str,
        decode: impl FnOnce(&mut DerReader<'_>) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if bytes.len() > self.config.max_message_size {
            debug!(
                context,
                size = bytes.len(),
                max = self.config.max_message_size,
                "Rejecting oversized OCSP message"
            );
            return Err(DecodeError::malformed(format!(
                "{} of {} bytes exceeds maximum {} bytes",
                context,
                bytes.len(),
                self.config.max_message_size
            )));
        }

        let mut reader = DerReader::new(bytes);
        let value = decode(&mut reader).map_err(|e| {
            debug!(context, error = %e, "Failed to decode OCSP message");
            e
        })?;

        if !reader.is_empty() {
            let remaining = reader.remaining_len();
            debug!(context, remaining, "Trailing data after OCSP message");
            return Err(DecodeError::TrailingData { context, remaining });
        }

        trace!(context, size = bytes.len(), "Decoded OCSP message");
        Ok(value)
    }

    fn check_status_slots(&self, basic: &BasicResponse) -> Result<(), DecodeError> {
        if self.config.validation_mode != ValidationMode::Strict {
            return Ok(());
        }
        match basic.first_invalid_status() {
            Some(index) => {
                debug!(index, "SingleResponse certStatus is not a single alternative");
                Err(DecodeError::malformed(format!(
                    "SingleResponse {} does not carry exactly one certStatus",
                    index
                )))
            }
            None => Ok(()),
        }
    }

    pub fn decode_request(&self, bytes: &[u8]) -> Result<OcspRequest, DecodeError> {
        self.decode_top_level(bytes, "OCSP request", OcspRequest::decode)
    }

    pub fn encode_request(&self, request: &OcspRequest) -> Result<Vec<u8>, EncodeError> {
        let bytes = request.encode()?;
        trace!(
            size = bytes.len(),
            requests = request.tbs_request.request_list.len(),
            "Encoded OCSP request"
        );
        Ok(bytes)
    }

    pub fn decode_response(&self, bytes: &[u8]) -> Result<OcspResponse, DecodeError> {
        self.decode_top_level(bytes, "OCSP response", OcspResponse::decode)
    }

    pub fn decode_basic_response(&self, bytes: &[u8]) -> Result<BasicResponse, DecodeError> {
        let basic = self.decode_top_level(bytes, "OCSP basic response", BasicResponse::decode)?;
        self.check_status_slots(&basic)?;
        Ok(basic)
    }

    /// Decode the envelope, then the basic response inside its response bytes
    pub fn decode_response_as_basic(&self, bytes: &[u8]) -> Result<BasicResponse, DecodeError> {
        let response = self.decode_response(bytes)?;
        let response_bytes = response.response_bytes.ok_or_else(|| {
            DecodeError::malformed(format!(
                "OCSP response with status {:?} carries no responseBytes",
                response.response_status
            ))
        })?;
        if !response_bytes.is_basic() {
            return Err(DecodeError::malformed(format!(
                "Unsupported OCSP response type: {}",
                response_bytes.response_type
            )));
        }
        self.decode_basic_response(&response_bytes.response)
    }

    pub fn encode_response(&self, response: &OcspResponse) -> Result<Vec<u8>, EncodeError> {
        let bytes = response.encode()?;
        trace!(
            size = bytes.len(),
            status = ?response.response_status,
            "Encoded OCSP response"
        );
        Ok(bytes)
    }

    /// Encode the normalized form of `basic`; `basic` itself is not modified
    pub fn encode_basic_response(&self, basic: &BasicResponse) -> Result<Vec<u8>, EncodeError> {
        let bytes = basic.normalized().encode()?;
        trace!(
            size = bytes.len(),
            responses = basic.tbs_response_data.responses.len(),
            "Encoded OCSP basic response"
        );
        Ok(bytes)
    }

    /// Encode the normalized form of `basic` inside a successful envelope
    pub fn encode_response_from_basic(
        &self,
        basic: &BasicResponse,
    ) -> Result<Vec<u8>, EncodeError> {
        let inner = self.encode_basic_response(basic)?;
        self.encode_response(&OcspResponse::from_basic_der(inner))
    }
}
