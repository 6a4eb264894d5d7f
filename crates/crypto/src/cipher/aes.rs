//! AES in CBC, CFB, CTR, OFB and GCM modes
//!
//! Identifiers follow the `aes-<bits>/<mode>` pattern. CBC is a block mode
//! with a 16-byte IV. CFB, CTR and OFB are stream modes with a 16-byte IV.
//! GCM is an AEAD with a 12-byte per-chunk nonce.

use super::aead::AeadDriver;
use super::{
    check_block_alignment, BlockModeCipher, CipherDriver, Direction, KeyedCipher,
    StreamModeCipher,
};
use crate::error::{CipherError, SuiteError};
use crate::registry::RegistryBuilder;
use crate::types::CipherBuffer;
use ::aes::cipher::generic_array::GenericArray;
use ::aes::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher,
};
use ::aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::AesGcm;
use std::marker::PhantomData;

fn init_error(e: impl std::fmt::Display) -> SuiteError {
    SuiteError::CipherInit(e.to_string())
}

struct CbcEncrypt<C: BlockEncryptMut + BlockCipher>(cbc::Encryptor<C>);

impl<C> BlockModeCipher for CbcEncrypt<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn block_size(&self) -> usize {
        C::block_size()
    }

    fn crypt_blocks(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        let size = C::block_size();
        check_block_alignment(data.len(), size)?;
        for block in data.chunks_exact_mut(size) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }
}

struct CbcDecrypt<C: BlockDecryptMut + BlockCipher>(cbc::Decryptor<C>);

impl<C> BlockModeCipher for CbcDecrypt<C>
where
    C: BlockDecryptMut + BlockCipher + Send,
{
    fn block_size(&self) -> usize {
        C::block_size()
    }

    fn crypt_blocks(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        let size = C::block_size();
        check_block_alignment(data.len(), size)?;
        for block in data.chunks_exact_mut(size) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }
}

/// CBC over a 128-bit block cipher
pub struct CbcDriver<C> {
    _cipher: PhantomData<fn() -> C>,
}

impl<C> CbcDriver<C> {
    pub fn new() -> Self {
        CbcDriver {
            _cipher: PhantomData,
        }
    }
}

impl<C> Default for CbcDriver<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CipherDriver for CbcDriver<C>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut + KeyInit + Send + 'static,
{
    fn key_buffer(&self) -> CipherBuffer {
        CipherBuffer::new(C::key_size(), C::block_size())
    }

    fn instantiate(
        &self,
        buffer: &CipherBuffer,
        direction: Direction,
    ) -> Result<KeyedCipher, SuiteError> {
        let mode: Box<dyn BlockModeCipher> = match direction {
            Direction::Encrypt => Box::new(CbcEncrypt(
                cbc::Encryptor::<C>::new_from_slices(buffer.key(), buffer.iv())
                    .map_err(init_error)?,
            )),
            Direction::Decrypt => Box::new(CbcDecrypt(
                cbc::Decryptor::<C>::new_from_slices(buffer.key(), buffer.iv())
                    .map_err(init_error)?,
            )),
        };
        Ok(KeyedCipher::Block(mode))
    }
}

struct Keystream<S>(S);

impl<S: StreamCipher + Send> StreamModeCipher for Keystream<S> {
    fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        self.0
            .try_apply_keystream(data)
            .map_err(|_| CipherError::Encryption)
    }
}

/// Any keystream mode constructed from a key and an IV
pub struct StreamDriver<S> {
    _cipher: PhantomData<fn() -> S>,
}

impl<S> StreamDriver<S> {
    pub fn new() -> Self {
        StreamDriver {
            _cipher: PhantomData,
        }
    }
}

impl<S> Default for StreamDriver<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CipherDriver for StreamDriver<S>
where
    S: KeyIvInit + StreamCipher + Send + 'static,
{
    fn key_buffer(&self) -> CipherBuffer {
        CipherBuffer::new(S::key_size(), S::iv_size())
    }

    fn instantiate(
        &self,
        buffer: &CipherBuffer,
        _direction: Direction,
    ) -> Result<KeyedCipher, SuiteError> {
        let cipher = S::new_from_slices(buffer.key(), buffer.iv()).map_err(init_error)?;
        Ok(KeyedCipher::Stream(Box::new(Keystream(cipher))))
    }
}

struct CfbEncrypt<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufEncryptor<C>);

impl<C: BlockEncryptMut + BlockCipher + Send> StreamModeCipher for CfbEncrypt<C> {
    fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        self.0.encrypt(data);
        Ok(())
    }
}

struct CfbDecrypt<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufDecryptor<C>);

impl<C: BlockEncryptMut + BlockCipher + Send> StreamModeCipher for CfbDecrypt<C> {
    fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        self.0.decrypt(data);
        Ok(())
    }
}

/// Full-block CFB over a 128-bit block cipher
///
/// Unlike CTR and OFB the two directions differ, so the keyed object keeps
/// the direction it was created for.
pub struct CfbDriver<C> {
    _cipher: PhantomData<fn() -> C>,
}

impl<C> CfbDriver<C> {
    pub fn new() -> Self {
        CfbDriver {
            _cipher: PhantomData,
        }
    }
}

impl<C> Default for CfbDriver<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CipherDriver for CfbDriver<C>
where
    C: BlockCipher + BlockEncryptMut + KeyInit + Send + 'static,
{
    fn key_buffer(&self) -> CipherBuffer {
        CipherBuffer::new(C::key_size(), C::block_size())
    }

    fn instantiate(
        &self,
        buffer: &CipherBuffer,
        direction: Direction,
    ) -> Result<KeyedCipher, SuiteError> {
        let mode: Box<dyn StreamModeCipher> = match direction {
            Direction::Encrypt => Box::new(CfbEncrypt(
                cfb_mode::BufEncryptor::<C>::new_from_slices(buffer.key(), buffer.iv())
                    .map_err(init_error)?,
            )),
            Direction::Decrypt => Box::new(CfbDecrypt(
                cfb_mode::BufDecryptor::<C>::new_from_slices(buffer.key(), buffer.iv())
                    .map_err(init_error)?,
            )),
        };
        Ok(KeyedCipher::Stream(mode))
    }
}

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes192Ctr = ctr::Ctr128BE<Aes192>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Register every AES adapter
pub fn register(builder: &mut RegistryBuilder) -> Result<(), SuiteError> {
    builder.register_cipher("aes-128/cbc", CbcDriver::<Aes128>::new())?;
    builder.register_cipher("aes-192/cbc", CbcDriver::<Aes192>::new())?;
    builder.register_cipher("aes-256/cbc", CbcDriver::<Aes256>::new())?;

    builder.register_cipher("aes-128/cfb", CfbDriver::<Aes128>::new())?;
    builder.register_cipher("aes-192/cfb", CfbDriver::<Aes192>::new())?;
    builder.register_cipher("aes-256/cfb", CfbDriver::<Aes256>::new())?;

    builder.register_cipher("aes-128/ctr", StreamDriver::<Aes128Ctr>::new())?;
    builder.register_cipher("aes-192/ctr", StreamDriver::<Aes192Ctr>::new())?;
    builder.register_cipher("aes-256/ctr", StreamDriver::<Aes256Ctr>::new())?;

    builder.register_cipher("aes-128/ofb", StreamDriver::<ofb::Ofb<Aes128>>::new())?;
    builder.register_cipher("aes-192/ofb", StreamDriver::<ofb::Ofb<Aes192>>::new())?;
    builder.register_cipher("aes-256/ofb", StreamDriver::<ofb::Ofb<Aes256>>::new())?;

    builder.register_cipher("aes-128/gcm", AeadDriver::<AesGcm<Aes128, U12>>::new())?;
    builder.register_cipher("aes-192/gcm", AeadDriver::<AesGcm<Aes192, U12>>::new())?;
    builder.register_cipher("aes-256/gcm", AeadDriver::<AesGcm<Aes256, U12>>::new())?;
    Ok(())
}
