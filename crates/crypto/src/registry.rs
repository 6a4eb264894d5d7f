//! Algorithm registry
//!
//! Cipher and key-exchange adapters are registered by name on a
//! [`RegistryBuilder`], then frozen into an immutable [`Registry`] that can be
//! shared freely between threads.

use crate::cipher::CipherDriver;
use crate::error::SuiteError;
use crate::kem::PkaDriver;
use crate::types::{KeyPair, PrivateKey, PublicKey};
use lazy_static::lazy_static;
use rand_core::CryptoRngCore;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Collects adapters before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    ciphers: BTreeMap<String, Arc<dyn CipherDriver>>,
    pk_algorithms: BTreeMap<String, Arc<dyn PkaDriver>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated with every adapter compiled into this crate
    pub fn with_builtins() -> Result<Self, SuiteError> {
        let mut builder = Self::new();
        #[cfg(feature = "aes-modes")]
        crate::cipher::aes::register(&mut builder)?;
        #[cfg(feature = "chacha")]
        crate::cipher::chacha::register(&mut builder)?;
        #[cfg(feature = "kem-x25519")]
        builder.register_pk_algorithm(crate::kem::x25519::ALGORITHM, crate::kem::x25519::X25519Kem)?;
        #[cfg(feature = "kem-ec")]
        crate::kem::ec::register(&mut builder)?;
        Ok(builder)
    }

    /// Register a symmetric cipher; names must be unique
    pub fn register_cipher<D>(&mut self, name: &str, driver: D) -> Result<&mut Self, SuiteError>
    where
        D: CipherDriver + 'static,
    {
        if self.ciphers.contains_key(name) {
            return Err(SuiteError::DuplicateAlgorithm(name.to_string()));
        }
        self.ciphers.insert(name.to_string(), Arc::new(driver));
        Ok(self)
    }

    /// Register a public-key algorithm; names must be unique
    pub fn register_pk_algorithm<D>(
        &mut self,
        name: &str,
        driver: D,
    ) -> Result<&mut Self, SuiteError>
    where
        D: PkaDriver + 'static,
    {
        if self.pk_algorithms.contains_key(name) {
            return Err(SuiteError::DuplicateAlgorithm(name.to_string()));
        }
        self.pk_algorithms.insert(name.to_string(), Arc::new(driver));
        Ok(self)
    }

    /// Freeze the registered adapters
    pub fn build(self) -> Registry {
        debug!(
            ciphers = self.ciphers.len(),
            pk_algorithms = self.pk_algorithms.len(),
            "registry built"
        );
        Registry {
            ciphers: self.ciphers,
            pk_algorithms: self.pk_algorithms,
        }
    }
}

/// Immutable name-to-adapter maps
#[derive(Clone)]
pub struct Registry {
    ciphers: BTreeMap<String, Arc<dyn CipherDriver>>,
    pk_algorithms: BTreeMap<String, Arc<dyn PkaDriver>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up a symmetric cipher by identifier
    pub fn cipher(&self, name: &str) -> Result<&dyn CipherDriver, SuiteError> {
        self.ciphers
            .get(name)
            .map(|d| d.as_ref())
            .ok_or_else(|| SuiteError::UnknownCipher(name.to_string()))
    }

    /// Look up a public-key algorithm by identifier
    pub fn pk_algorithm(&self, name: &str) -> Result<&dyn PkaDriver, SuiteError> {
        self.pk_algorithms
            .get(name)
            .map(|d| d.as_ref())
            .ok_or_else(|| SuiteError::UnknownPkAlgorithm(name.to_string()))
    }

    /// Registered cipher identifiers in sorted order
    pub fn cipher_names(&self) -> impl Iterator<Item = &str> {
        self.ciphers.keys().map(String::as_str)
    }

    /// Registered public-key algorithm identifiers in sorted order
    pub fn pk_algorithm_names(&self) -> impl Iterator<Item = &str> {
        self.pk_algorithms.keys().map(String::as_str)
    }

    pub fn generate_key_pair(
        &self,
        pk_algo: &str,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<KeyPair, SuiteError> {
        self.pk_algorithm(pk_algo)?.generate_key_pair(rng)
    }

    pub fn load_public_key(&self, pk_algo: &str, bytes: &[u8]) -> Result<PublicKey, SuiteError> {
        self.pk_algorithm(pk_algo)?.load_public(bytes)
    }

    pub fn load_private_key(&self, pk_algo: &str, bytes: &[u8]) -> Result<PrivateKey, SuiteError> {
        self.pk_algorithm(pk_algo)?.load_private(bytes)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ciphers", &self.ciphers.keys().collect::<Vec<_>>())
            .field("pk_algorithms", &self.pk_algorithms.keys().collect::<Vec<_>>())
            .finish()
    }
}

lazy_static! {
    static ref BUILTIN: Registry = RegistryBuilder::with_builtins()
        .expect("built-in algorithm names are unique")
        .build();
}

/// Process-wide registry holding every built-in adapter
pub fn builtin_registry() -> &'static Registry {
    &BUILTIN
}
