//! Wire decoding and encoding errors

use rmp::decode::{MarkerReadError, ValueReadError};
use rmp::encode::ValueWriteError;
use std::io;
use thiserror::Error;

/// Errors raised while reading or writing container records
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected marker 0x{found:02x} while decoding {expected}")]
    UnexpectedMarker { expected: &'static str, found: u8 },

    #[error("record has {got} fields, expected {expected}")]
    ArrayLength { expected: usize, got: usize },

    #[error("field of {len} bytes exceeds the limit of {max} bytes")]
    FieldTooLarge { len: usize, max: usize },

    #[error("field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("field of {0} bytes cannot be encoded")]
    Unencodable(usize),
}

impl From<MarkerReadError> for WireError {
    fn from(err: MarkerReadError) -> Self {
        WireError::Io(err.0)
    }
}

impl From<ValueReadError> for WireError {
    fn from(err: ValueReadError) -> Self {
        match err {
            ValueReadError::InvalidMarkerRead(e) | ValueReadError::InvalidDataRead(e) => {
                WireError::Io(e)
            }
            ValueReadError::TypeMismatch(marker) => WireError::UnexpectedMarker {
                expected: "value",
                found: marker.to_u8(),
            },
        }
    }
}

impl From<ValueWriteError> for WireError {
    fn from(err: ValueWriteError) -> Self {
        match err {
            ValueWriteError::InvalidMarkerWrite(e) | ValueWriteError::InvalidDataWrite(e) => {
                WireError::Io(e)
            }
        }
    }
}

impl WireError {
    /// Returns true if the input ended in the middle of a record
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}
