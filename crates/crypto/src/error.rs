//! Error types for algorithm suites and keyed ciphers

use thiserror::Error;

/// Errors raised by the registry, the adapters and the hybrid sessions
///
/// Every variant is terminal for the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuiteError {
    #[error("Unknown Cipher Algorithm: {0}")]
    UnknownCipher(String),

    #[error("Unknown Public Key Algorithm: {0}")]
    UnknownPkAlgorithm(String),

    #[error("Invalid Private/Public Key Object: {0}")]
    InvalidKeyObject(String),

    #[error("Malformed Private/Public Key: {0}")]
    MalformedKey(String),

    #[error("Malformed Encrypted Key: {0}")]
    MalformedEncryptedKey(String),

    #[error("algorithm {0:?} is already registered")]
    DuplicateAlgorithm(String),

    #[error("no private key available for {pk_algo}")]
    NoPrivateKey { pk_algo: String },

    #[error("key exchange failed: {0}")]
    KeyExchangeFailed(String),

    #[error("cipher initialization failed: {0}")]
    CipherInit(String),
}

impl SuiteError {
    /// Returns true for lookups of identifiers that are not registered
    pub fn is_unknown_algorithm(&self) -> bool {
        matches!(self, Self::UnknownCipher(_) | Self::UnknownPkAlgorithm(_))
    }

    /// Returns true for key bytes or key objects the adapter rejected
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyObject(_)
                | Self::MalformedKey(_)
                | Self::MalformedEncryptedKey(_)
                | Self::NoPrivateKey { .. }
        )
    }
}

/// Errors raised by keyed cipher objects while processing chunks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("Block Alignment Error: {len} bytes is not a multiple of the {block_size}-byte block")]
    BlockAlignment { len: usize, block_size: usize },

    #[error("Nonce Error: expected at least {expected} bytes, got {got}")]
    Nonce { expected: usize, got: usize },

    #[error("message authentication failed")]
    Authentication,

    #[error("encryption failed")]
    Encryption,
}
