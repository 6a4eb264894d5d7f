//! Binary serialization infrastructure for container records
//!
//! Records are encoded as MessagePack arrays (see [`msgpack`]). This module
//! holds the record traits, the decoding limits applied to untrusted input,
//! and the raw read helpers the framing builds on.

use std::io::{self, Read};

pub mod msgpack;
pub mod traits;

pub use traits::{BinaryRead, BinaryWrite};

/// Default upper bound for a single decoded byte or string field (16 MiB)
pub const DEFAULT_MAX_FIELD_LEN: usize = 16 * 1024 * 1024;

/// Limits applied while decoding untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest byte or string field accepted, in bytes
    pub max_field_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

impl DecodeLimits {
    /// Create limits with a custom field bound
    pub fn new(max_field_len: usize) -> Self {
        Self { max_field_len }
    }
}

/// Read a u8, returning `None` if the reader is already at end of input
pub fn try_read_u8<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Read exactly n bytes from a reader
pub fn read_bytes<R: Read>(reader: &mut R, n: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_try_read_u8_at_end() {
        let mut cursor = Cursor::new(vec![0x42]);
        assert_eq!(try_read_u8(&mut cursor).unwrap(), Some(0x42));
        assert_eq!(try_read_u8(&mut cursor).unwrap(), None);
    }

    #[test]
    fn test_read_bytes_short_input() {
        let mut cursor = Cursor::new(vec![0x01, 0x02]);
        let err = read_bytes(&mut cursor, 3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(DecodeLimits::default().max_field_len, DEFAULT_MAX_FIELD_LEN);
        assert_eq!(DecodeLimits::new(10).max_field_len, 10);
    }
}
