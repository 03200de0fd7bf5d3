//! Codec configuration
//!
//! Decoding can run in one of two validation modes:
//!
//! - **Lenient Mode** (default): decoded values are returned as they appear on
//!   the wire. A `SingleResponse` whose status slots are in a combination the
//!   CHOICE does not allow is accepted, so callers can inspect and report it.
//! - **Strict Mode**: such a `SingleResponse` is rejected as malformed.

use serde::{Deserialize, Serialize};

/// Validation mode applied while decoding responses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept any combination of status slots
    #[default]
    Lenient,
    /// Require exactly one of good / revoked / unknown per SingleResponse
    Strict,
}

/// OCSP codec configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecConfig {
    #[serde(default)]
    pub validation_mode: ValidationMode,

    /// Largest input accepted by any decode operation, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl CodecConfig {
    pub fn strict() -> Self {
        Self {
            validation_mode: ValidationMode::Strict,
            ..Self::default()
        }
    }

    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_max_message_size() -> usize {
    1024 * 1024 // 1 MiB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.validation_mode, ValidationMode::Lenient);
        assert_eq!(config.max_message_size, 1024 * 1024);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());

        let config: CodecConfig =
            serde_json::from_str(r#"{"validation_mode":"strict","max_message_size":4096}"#)
                .unwrap();
        assert_eq!(config.validation_mode, ValidationMode::Strict);
        assert_eq!(config.max_message_size, 4096);
    }
}
