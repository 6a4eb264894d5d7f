//! Hybrid encryption sessions
//!
//! An encryption session picks a public-key algorithm and a cipher from the
//! registry, runs the key exchange against the recipient's public key and
//! returns the [`Preamble`] to transmit plus a keyed cipher for the payload.
//! A decryption session reverses this from a received preamble, asking a
//! key-ring for the matching private key.
//!
//! Derived key material never outlives the session start: the buffer is
//! wiped as soon as the keyed cipher has been built.

use crate::cipher::{Direction, KeyedCipher};
use crate::error::SuiteError;
use crate::registry::{builtin_registry, Registry};
use crate::types::{PrivateKey, PublicKey};
use cryptoinfra_protocol::Preamble;
use rand_core::CryptoRngCore;
use std::collections::HashMap;
use tracing::debug;

/// Source of keyed ciphers for writing a container
pub trait Encrypter {
    fn start_encryption(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_algo: &str,
        cipher: &str,
        public: &PublicKey,
    ) -> Result<(Preamble, KeyedCipher), SuiteError>;
}

/// Source of keyed ciphers for reading a container
pub trait Decrypter {
    fn start_decryption(&self, preamble: &Preamble) -> Result<KeyedCipher, SuiteError>;
}

/// Finds the private key for a received key exchange
pub trait KeyRing: Send + Sync {
    fn get_key(&self, opaque: &[u8], pk_algo: &str) -> Result<PrivateKey, SuiteError>;
}

/// Key-ring that may also rewrite the opaque value before decryption
///
/// Useful when the transmitted value is itself wrapped, e.g. a key id that
/// the ring resolves to the real ephemeral key.
pub trait WrappedKeyRing: Send + Sync {
    fn get_key_wrapped(
        &self,
        opaque: &[u8],
        pk_algo: &str,
    ) -> Result<(Vec<u8>, PrivateKey), SuiteError>;
}

impl<K: KeyRing + ?Sized> WrappedKeyRing for K {
    fn get_key_wrapped(
        &self,
        opaque: &[u8],
        pk_algo: &str,
    ) -> Result<(Vec<u8>, PrivateKey), SuiteError> {
        Ok((opaque.to_vec(), self.get_key(opaque, pk_algo)?))
    }
}

/// Key-ring that always answers with the same private key
#[derive(Debug, Clone)]
pub struct SingleKeyRing(pub PrivateKey);

impl KeyRing for SingleKeyRing {
    fn get_key(&self, _opaque: &[u8], _pk_algo: &str) -> Result<PrivateKey, SuiteError> {
        Ok(self.0.clone())
    }
}

/// Key-ring holding one private key per public-key algorithm
#[derive(Debug, Clone, Default)]
pub struct AlgorithmKeyRing {
    keys: HashMap<String, PrivateKey>,
}

impl AlgorithmKeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key under the algorithm it was loaded for, replacing any previous one
    pub fn insert(&mut self, key: PrivateKey) -> Option<PrivateKey> {
        self.keys.insert(key.algorithm().to_string(), key)
    }

    pub fn with_key(mut self, key: PrivateKey) -> Self {
        self.insert(key);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyRing for AlgorithmKeyRing {
    fn get_key(&self, _opaque: &[u8], pk_algo: &str) -> Result<PrivateKey, SuiteError> {
        self.keys
            .get(pk_algo)
            .cloned()
            .ok_or_else(|| SuiteError::NoPrivateKey {
                pk_algo: pk_algo.to_string(),
            })
    }
}

/// Starts encryption sessions against a registry
#[derive(Debug, Clone, Copy)]
pub struct EncryptionContext<'r> {
    registry: &'r Registry,
}

impl<'r> EncryptionContext<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }
}

impl Default for EncryptionContext<'static> {
    fn default() -> Self {
        Self::new(builtin_registry())
    }
}

impl Encrypter for EncryptionContext<'_> {
    fn start_encryption(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_algo: &str,
        cipher: &str,
        public: &PublicKey,
    ) -> Result<(Preamble, KeyedCipher), SuiteError> {
        let cipher_driver = self.registry.cipher(cipher)?;
        let pka = self.registry.pk_algorithm(pk_algo)?;

        let mut buffer = cipher_driver.key_buffer();
        let opaque = pka.encrypt_key(rng, public, &mut buffer)?;
        let keyed = cipher_driver.instantiate(&buffer, Direction::Encrypt);
        buffer.wipe();
        let keyed = keyed?;

        debug!(
            pk_algo,
            cipher,
            family = keyed.family(),
            opaque_len = opaque.len(),
            "encryption session started"
        );
        Ok((Preamble::new(opaque, pk_algo, cipher), keyed))
    }
}

/// Starts decryption sessions against a registry and a key-ring
#[derive(Debug, Clone)]
pub struct DecryptionContext<'r, K> {
    registry: &'r Registry,
    key_ring: K,
}

impl<'r, K: WrappedKeyRing> DecryptionContext<'r, K> {
    pub fn new(registry: &'r Registry, key_ring: K) -> Self {
        Self { registry, key_ring }
    }

    pub fn key_ring(&self) -> &K {
        &self.key_ring
    }
}

impl<K: WrappedKeyRing> DecryptionContext<'static, K> {
    /// Decryption against the built-in registry
    pub fn with_builtins(key_ring: K) -> Self {
        Self::new(builtin_registry(), key_ring)
    }
}

impl<K: WrappedKeyRing> Decrypter for DecryptionContext<'_, K> {
    fn start_decryption(&self, preamble: &Preamble) -> Result<KeyedCipher, SuiteError> {
        let cipher_driver = self.registry.cipher(&preamble.encoding)?;
        let pka = self.registry.pk_algorithm(&preamble.pk_algo)?;
        let (opaque, private) = self
            .key_ring
            .get_key_wrapped(&preamble.opaque, &preamble.pk_algo)?;

        let mut buffer = cipher_driver.key_buffer();
        pka.decrypt_key(&opaque, &private, &mut buffer)?;
        let keyed = cipher_driver.instantiate(&buffer, Direction::Decrypt);
        buffer.wipe();
        let keyed = keyed?;

        debug!(
            pk_algo = %preamble.pk_algo,
            cipher = %preamble.encoding,
            family = keyed.family(),
            "decryption session started"
        );
        Ok(keyed)
    }
}
