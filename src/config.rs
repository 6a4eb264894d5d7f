//! Runtime settings for stream writers and readers
//!
//! `CodecConfig` derives serde traits so applications can embed it in their
//! own configuration files. Every field has a default, so a partial table is
//! enough:
//!
//! ```
//! use cryptoinfra::CodecConfig;
//!
//! let config: CodecConfig = serde_json::from_str(r#"{ "max_chunk_len": 65536 }"#).unwrap();
//! assert_eq!(config.max_chunk_len, 65536);
//! assert_eq!(config.associated_data_len, 0);
//! ```

use crate::error::StreamError;
use cryptoinfra_protocol::{DecodeLimits, DEFAULT_MAX_FIELD_LEN};
use serde::{Deserialize, Serialize};

/// Largest plaintext carried by one chunk record (1 MiB)
pub const DEFAULT_MAX_CHUNK_LEN: usize = 1024 * 1024;

/// Transport buffer size used by the writer (8 KiB)
pub const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 8 * 1024;

/// Most a chunk's data field can exceed its plaintext by
///
/// Covers a 16-byte AEAD tag and the round-up to a 16-byte cipher block.
pub const MAX_CHUNK_OVERHEAD: usize = 16;

/// Longest per-chunk nonce of a built-in AEAD (XChaCha20-Poly1305)
pub const MAX_NONCE_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Longest byte or string field the reader accepts
    pub max_field_len: usize,
    /// Longest plaintext the writer puts in a single chunk
    pub max_chunk_len: usize,
    /// Bytes appended to every AEAD nonce and authenticated as associated data
    pub associated_data_len: usize,
    /// Capacity of the writer's transport buffer
    pub write_buffer_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_field_len: DEFAULT_MAX_FIELD_LEN,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            associated_data_len: 0,
            write_buffer_capacity: DEFAULT_WRITE_BUFFER_CAPACITY,
        }
    }
}

impl CodecConfig {
    pub fn with_max_chunk_len(mut self, len: usize) -> Self {
        self.max_chunk_len = len;
        self
    }

    pub fn with_associated_data_len(mut self, len: usize) -> Self {
        self.associated_data_len = len;
        self
    }

    pub fn with_max_field_len(mut self, len: usize) -> Self {
        self.max_field_len = len;
        self
    }

    /// Reject settings no stream could work with
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.max_chunk_len == 0 {
            return Err(StreamError::InvalidConfig("max_chunk_len must be positive"));
        }
        if self.max_field_len == 0 {
            return Err(StreamError::InvalidConfig("max_field_len must be positive"));
        }
        // A reader sharing this config must accept everything the writer emits
        if self.max_chunk_len.saturating_add(MAX_CHUNK_OVERHEAD) > self.max_field_len {
            return Err(StreamError::InvalidConfig(
                "max_field_len must cover max_chunk_len plus the cipher overhead",
            ));
        }
        if MAX_NONCE_LEN.saturating_add(self.associated_data_len) > self.max_field_len {
            return Err(StreamError::InvalidConfig(
                "max_field_len must cover the AEAD nonce plus associated data",
            ));
        }
        Ok(())
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits::new(self.max_field_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_field_len, 16 * 1024 * 1024);
        assert_eq!(config.max_chunk_len, 1024 * 1024);
        assert_eq!(config.associated_data_len, 0);
        assert!(config.validate().is_ok());
        assert_eq!(config.decode_limits().max_field_len, config.max_field_len);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = CodecConfig::default().with_max_chunk_len(0);
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));

        let config = CodecConfig::default()
            .with_max_field_len(1024)
            .with_max_chunk_len(4096);
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_leaves_room_for_overhead() {
        let config = CodecConfig::default()
            .with_max_field_len(512)
            .with_max_chunk_len(512);
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
        assert!(config.with_max_chunk_len(512 - MAX_CHUNK_OVERHEAD).validate().is_ok());

        let config = CodecConfig::default()
            .with_max_field_len(64)
            .with_max_chunk_len(16)
            .with_associated_data_len(41);
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
        assert!(config.with_associated_data_len(40).validate().is_ok());

        let config = CodecConfig::default().with_max_chunk_len(usize::MAX);
        assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_deserialize() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"associated_data_len": 4, "write_buffer_capacity": 512}"#)
                .unwrap();
        assert_eq!(config.associated_data_len, 4);
        assert_eq!(config.write_buffer_capacity, 512);
        assert_eq!(config.max_chunk_len, DEFAULT_MAX_CHUNK_LEN);
    }
}
