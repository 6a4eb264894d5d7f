//! Zeroizing key material and type-erased key handles
//!
//! Derived key bytes live in a [`CipherBuffer`] that clears its memory on
//! drop. Public and private keys travel as [`PublicKey`] / [`PrivateKey`]
//! handles tagged with the algorithm that produced them, so the registry can
//! pass them around without knowing the concrete key types.

use crate::error::SuiteError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

/// Key and IV buffers sized for one symmetric cipher
///
/// Produced empty by a cipher adapter, filled by a key-exchange adapter and
/// consumed once when the keyed cipher object is built.
pub struct CipherBuffer {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
}

impl CipherBuffer {
    /// Allocate zeroed buffers of the given lengths
    pub fn new(key_len: usize, iv_len: usize) -> Self {
        CipherBuffer {
            key: Zeroizing::new(vec![0u8; key_len]),
            iv: Zeroizing::new(vec![0u8; iv_len]),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn key_mut(&mut self) -> &mut [u8] {
        &mut self.key
    }

    pub fn iv_mut(&mut self) -> &mut [u8] {
        &mut self.iv
    }

    /// Split borrow of both buffers
    pub fn parts_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.key, &mut self.iv)
    }

    /// Combined length of key and IV
    pub fn total_len(&self) -> usize {
        self.key.len() + self.iv.len()
    }

    /// Take ownership of the key and IV
    pub fn into_parts(self) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
        (self.key, self.iv)
    }

    /// Overwrite both buffers with zeros, keeping their lengths
    pub fn wipe(&mut self) {
        self.key.as_mut_slice().zeroize();
        self.iv.as_mut_slice().zeroize();
    }
}

impl fmt::Debug for CipherBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherBuffer")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// Serialized key pair returned by key generation
pub struct KeyPair {
    pub public: Vec<u8>,
    pub private: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    pub fn new(public: Vec<u8>, private: Vec<u8>) -> Self {
        KeyPair {
            public,
            private: Zeroizing::new(private),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.len())
            .field("private", &"[REDACTED]")
            .finish()
    }
}

type Erased = Arc<dyn Any + Send + Sync>;

fn downcast_erased<'a, T: Any>(
    inner: &'a Erased,
    algorithm: &str,
    role: &str,
) -> Result<&'a T, SuiteError> {
    inner.downcast_ref::<T>().ok_or_else(|| {
        SuiteError::InvalidKeyObject(format!("{role} key is not a {algorithm} key"))
    })
}

/// Public key handle
#[derive(Clone)]
pub struct PublicKey {
    algorithm: String,
    inner: Erased,
}

impl PublicKey {
    pub fn new<T: Any + Send + Sync>(algorithm: impl Into<String>, key: T) -> Self {
        PublicKey {
            algorithm: algorithm.into(),
            inner: Arc::new(key),
        }
    }

    /// Identifier of the algorithm that loaded this key
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Borrow the concrete key, or fail with `InvalidKeyObject`
    pub fn downcast<T: Any>(&self, expected: &str) -> Result<&T, SuiteError> {
        downcast_erased(&self.inner, expected, "public")
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Private key handle
///
/// Concrete key types are expected to zeroize themselves on drop.
#[derive(Clone)]
pub struct PrivateKey {
    algorithm: String,
    inner: Erased,
}

impl PrivateKey {
    pub fn new<T: Any + Send + Sync>(algorithm: impl Into<String>, key: T) -> Self {
        PrivateKey {
            algorithm: algorithm.into(),
            inner: Arc::new(key),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Borrow the concrete key, or fail with `InvalidKeyObject`
    pub fn downcast<T: Any>(&self, expected: &str) -> Result<&T, SuiteError> {
        downcast_erased(&self.inner, expected, "private")
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
