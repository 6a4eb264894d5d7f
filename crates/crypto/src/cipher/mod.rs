//! Symmetric cipher adapters
//!
//! A [`CipherDriver`] describes one named cipher: how large its key and IV
//! are, and how to turn filled key material into a [`KeyedCipher`]. The
//! keyed cipher is a closed sum over the three mode families the stream
//! codec knows how to frame.

pub mod aead;
#[cfg(feature = "aes-modes")]
pub mod aes;
#[cfg(feature = "chacha")]
pub mod chacha;

use crate::error::{CipherError, SuiteError};
use crate::types::CipherBuffer;
use std::fmt;

/// Which way a keyed cipher object will be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Chained block-mode cipher (e.g. CBC)
///
/// State carries over between calls, so consecutive calls behave like one
/// call over the concatenated input.
pub trait BlockModeCipher: Send {
    fn block_size(&self) -> usize;

    /// Encrypt or decrypt whole blocks in place
    fn crypt_blocks(&mut self, data: &mut [u8]) -> Result<(), CipherError>;
}

/// Keystream cipher (e.g. CTR, OFB)
pub trait StreamModeCipher: Send {
    /// XOR the next keystream bytes into `data`
    fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CipherError>;
}

/// Authenticated cipher with a per-message nonce
pub trait AeadModeCipher: Send {
    fn nonce_size(&self) -> usize;

    /// Bytes added to every sealed message
    fn overhead(&self) -> usize;

    /// Encrypt and authenticate `plaintext` under `nonce[..nonce_size]`
    fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Verify and decrypt `ciphertext` under `nonce[..nonce_size]`
    fn open(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// A cipher instantiated with key material, ready to process chunks
pub enum KeyedCipher {
    Block(Box<dyn BlockModeCipher>),
    Stream(Box<dyn StreamModeCipher>),
    Aead(Box<dyn AeadModeCipher>),
}

impl KeyedCipher {
    /// Name of the mode family, for logging
    pub fn family(&self) -> &'static str {
        match self {
            KeyedCipher::Block(_) => "block",
            KeyedCipher::Stream(_) => "stream",
            KeyedCipher::Aead(_) => "aead",
        }
    }
}

impl fmt::Debug for KeyedCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyedCipher::Block(c) => f
                .debug_struct("Block")
                .field("block_size", &c.block_size())
                .finish_non_exhaustive(),
            KeyedCipher::Stream(_) => f.debug_struct("Stream").finish_non_exhaustive(),
            KeyedCipher::Aead(c) => f
                .debug_struct("Aead")
                .field("nonce_size", &c.nonce_size())
                .field("overhead", &c.overhead())
                .finish_non_exhaustive(),
        }
    }
}

/// Adapter for one named symmetric cipher
pub trait CipherDriver: Send + Sync {
    /// Empty key material of the lengths this cipher needs
    fn key_buffer(&self) -> CipherBuffer;

    /// Build a keyed cipher object from filled key material
    fn instantiate(
        &self,
        buffer: &CipherBuffer,
        direction: Direction,
    ) -> Result<KeyedCipher, SuiteError>;
}

pub(crate) fn check_block_alignment(len: usize, block_size: usize) -> Result<(), CipherError> {
    if block_size == 0 || len % block_size != 0 {
        return Err(CipherError::BlockAlignment { len, block_size });
    }
    Ok(())
}

pub(crate) fn check_nonce(nonce: &[u8], expected: usize) -> Result<(), CipherError> {
    if nonce.len() < expected {
        return Err(CipherError::Nonce {
            expected,
            got: nonce.len(),
        });
    }
    Ok(())
}
