//! Generic adapter for RustCrypto AEAD ciphers
//!
//! AEAD ciphers take no IV from the key material; the nonce arrives with
//! every chunk.

#![allow(deprecated)] // GenericArray::from_slice

use super::{check_nonce, AeadModeCipher, CipherDriver, Direction, KeyedCipher};
use crate::error::{CipherError, SuiteError};
use crate::types::CipherBuffer;
use aead::generic_array::typenum::Unsigned;
use aead::{Aead, AeadCore, KeyInit, Nonce, Payload};
use std::marker::PhantomData;

/// Keyed AEAD cipher object
pub struct AeadCipher<A>(A);

impl<A> AeadModeCipher for AeadCipher<A>
where
    A: Aead + AeadCore + Send,
{
    fn nonce_size(&self) -> usize {
        A::NonceSize::USIZE
    }

    fn overhead(&self) -> usize {
        A::TagSize::USIZE
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
        let size = self.nonce_size();
        check_nonce(nonce, size)?;
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        self.0
            .encrypt(Nonce::<A>::from_slice(&nonce[..size]), payload)
            .map_err(|_| CipherError::Encryption)
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
        let size = self.nonce_size();
        check_nonce(nonce, size)?;
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        self.0
            .decrypt(Nonce::<A>::from_slice(&nonce[..size]), payload)
            .map_err(|_| CipherError::Authentication)
    }
}

/// Driver for any AEAD implementing the RustCrypto `aead` traits
pub struct AeadDriver<A> {
    _cipher: PhantomData<fn() -> A>,
}

impl<A> AeadDriver<A> {
    pub fn new() -> Self {
        AeadDriver {
            _cipher: PhantomData,
        }
    }
}

impl<A> Default for AeadDriver<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> CipherDriver for AeadDriver<A>
where
    A: Aead + AeadCore + KeyInit + Send + 'static,
{
    fn key_buffer(&self) -> CipherBuffer {
        CipherBuffer::new(A::key_size(), 0)
    }

    fn instantiate(
        &self,
        buffer: &CipherBuffer,
        _direction: Direction,
    ) -> Result<KeyedCipher, SuiteError> {
        let cipher = A::new_from_slice(buffer.key())
            .map_err(|e| SuiteError::CipherInit(e.to_string()))?;
        Ok(KeyedCipher::Aead(Box::new(AeadCipher(cipher))))
    }
}
