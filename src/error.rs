//! Error types for the streaming codec and the unified public error
//!
//! Sessions report [`StreamError`]. Through `std::io::Read` / `Write` the
//! same error travels inside an `io::Error`; [`StreamError::from_io`] gets it
//! back out.
//!
//! # Example
//!
//! ```no_run
//! use cryptoinfra::CryptoInfraError;
//!
//! fn open_container() -> Result<(), CryptoInfraError> {
//!     // Domain errors convert automatically
//!     Ok(())
//! }
//! ```

use cryptoinfra_crypto::{CipherError, SuiteError};
use cryptoinfra_protocol::WireError;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a stream writer or reader
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Suite error: {0}")]
    Suite(#[from] SuiteError),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("Wire format error: {0}")]
    Wire(WireError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("stream ended before the final chunk")]
    Truncated,

    #[error("stream is closed")]
    Closed,

    #[error("invalid codec configuration: {0}")]
    InvalidConfig(&'static str),
}

impl From<WireError> for StreamError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Io(e) => StreamError::Io(e),
            other => StreamError::Wire(other),
        }
    }
}

impl StreamError {
    /// Recover the stream error carried by an `io::Error`, if any
    pub fn from_io(err: &io::Error) -> Option<&StreamError> {
        let inner = err.get_ref()?;
        if let Some(shared) = inner.downcast_ref::<Arc<StreamError>>() {
            return Some(shared.as_ref());
        }
        inner.downcast_ref::<StreamError>()
    }

    /// The error a session latched, looking through its `io::Error` wrapping
    pub fn innermost(&self) -> &StreamError {
        match self {
            Self::Io(e) => Self::from_io(e).map_or(self, StreamError::innermost),
            _ => self,
        }
    }

    /// Returns true when the data failed an integrity or framing check
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self.innermost(),
            Self::Cipher(_)
                | Self::Wire(_)
                | Self::Truncated
                | Self::Suite(SuiteError::MalformedEncryptedKey(_))
        )
    }

    pub(crate) fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::Io(e) => e.kind(),
            Self::Truncated => io::ErrorKind::UnexpectedEof,
            Self::Closed => io::ErrorKind::BrokenPipe,
            Self::InvalidConfig(_) => io::ErrorKind::InvalidInput,
            Self::Suite(_) | Self::Cipher(_) | Self::Wire(_) => io::ErrorKind::InvalidData,
        }
    }

    /// Wrap a shared error for return through `std::io`
    pub(crate) fn to_io(shared: &Arc<StreamError>) -> io::Error {
        io::Error::new(shared.io_kind(), Arc::clone(shared))
    }
}

/// Unified error type for all cryptoinfra operations
///
/// # Error Categories
///
/// - **Suite**: unknown algorithms, bad keys, failed key exchange
/// - **Cipher**: authentication, alignment or nonce failures on a chunk
/// - **Wire**: malformed container records
/// - **Stream**: session state (truncation, use after close) and transport errors
#[derive(Debug, Error)]
pub enum CryptoInfraError {
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// A session error shared with the reader or writer that latched it
    #[error("Stream error: {0}")]
    Latched(Arc<StreamError>),

    #[error("Algorithm suite error: {0}")]
    Suite(#[from] SuiteError),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("Wire format error: {0}")]
    Wire(#[from] WireError),
}

impl From<io::Error> for CryptoInfraError {
    fn from(err: io::Error) -> Self {
        if StreamError::from_io(&err).is_none() {
            return Self::Stream(StreamError::Io(err));
        }
        let kind = err.kind();
        let Some(inner) = err.into_inner() else {
            return Self::Stream(StreamError::Io(kind.into()));
        };
        match inner.downcast::<Arc<StreamError>>() {
            Ok(shared) => Self::Latched(*shared),
            Err(inner) => match inner.downcast::<StreamError>() {
                Ok(owned) => Self::Stream(*owned),
                Err(other) => Self::Stream(StreamError::Io(io::Error::new(kind, other))),
            },
        }
    }
}

impl CryptoInfraError {
    fn suite(&self) -> Option<&SuiteError> {
        match self {
            Self::Suite(e) => Some(e),
            _ => match self.stream()? {
                StreamError::Suite(e) => Some(e),
                _ => None,
            },
        }
    }

    fn stream(&self) -> Option<&StreamError> {
        match self {
            Self::Stream(e) => Some(e.innermost()),
            Self::Latched(e) => Some(e.innermost()),
            _ => None,
        }
    }

    /// Returns true for unknown algorithm identifiers
    pub fn is_unknown_algorithm(&self) -> bool {
        self.suite().is_some_and(SuiteError::is_unknown_algorithm)
    }

    /// Returns true for key-related failures
    pub fn is_key_error(&self) -> bool {
        self.suite().is_some_and(SuiteError::is_key_error)
    }

    /// Returns true if this is an algorithm suite error
    pub fn is_suite_error(&self) -> bool {
        self.suite().is_some()
    }

    /// Returns true when the container was tampered with, truncated or malformed
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Self::Cipher(_) | Self::Wire(_) => true,
            _ => self.stream().is_some_and(StreamError::is_integrity_error),
        }
    }

    /// Returns a suggestion for resolving this error
    pub fn suggestion(&self) -> Option<&str> {
        if let Some(suite) = self.suite() {
            return match suite {
                SuiteError::UnknownCipher(_) | SuiteError::UnknownPkAlgorithm(_) => {
                    Some("Check the identifier and the enabled cargo features")
                }
                SuiteError::NoPrivateKey { .. } => {
                    Some("Add a private key for this algorithm to the key-ring")
                }
                SuiteError::InvalidKeyObject(_) => {
                    Some("Load the key through the same algorithm used for the session")
                }
                _ => None,
            };
        }
        if self.is_integrity_error() {
            return Some("The container is corrupted or was encrypted for a different key");
        }
        match self.stream() {
            Some(StreamError::Closed) => Some("Create a new writer for each container"),
            _ => None,
        }
    }
}
