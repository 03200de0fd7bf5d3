//! Error types for the OCSP codec
//!
//! Decoding reports exactly two kinds of failure: the bytes do not match the
//! RFC 6960 schema, or bytes were left over after the top-level value.

use thiserror::Error;

/// Errors that can occur while decoding DER bytes into OCSP structures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Bytes do not conform to the expected schema (wrong tag, missing
    /// required field, invalid value for a typed field)
    #[error("Malformed OCSP data: {0}")]
    Malformed(String),

    /// The top-level value was parsed but unconsumed bytes remain
    #[error("Trailing data in {context}: {remaining} bytes")]
    TrailingData {
        /// Which structure was being decoded
        context: &'static str,
        /// Number of unconsumed bytes
        remaining: usize,
    },
}

impl DecodeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        DecodeError::Malformed(message.into())
    }

    pub fn is_trailing_data(&self) -> bool {
        matches!(self, DecodeError::TrailingData { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DecodeError::Malformed(_))
    }
}

/// Errors that can occur while encoding OCSP structures to DER
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A field holds a value the wire format cannot represent
    #[error("Invalid value for encoding: {0}")]
    InvalidValue(String),
}

/// Errors returned by index-based accessors on a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No SingleResponse exists at the requested position
    #[error("SingleResponse index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of single responses present
        len: usize,
    },
}
