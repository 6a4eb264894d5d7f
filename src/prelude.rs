//! cryptoinfra Prelude
//!
//! The prelude module provides a convenient way to import commonly used types and traits.
//!
//! # Example
//!
//! ```rust
//! use cryptoinfra::prelude::*;
//!
//! let registry = builtin_registry();
//! assert!(registry.cipher("aes-256/gcm").is_ok());
//! let _ctx = EncryptionContext::new(registry);
//! ```

// Streaming codec
pub use crate::config::CodecConfig;
pub use crate::error::{CryptoInfraError, StreamError};
pub use crate::reader::StreamReader;
pub use crate::writer::StreamWriter;

// Wire records
pub use cryptoinfra_protocol::{BinaryRead, BinaryWrite, ChunkRecord, Preamble, WireError};

// Sessions and key-rings
pub use cryptoinfra_crypto::{
    builtin_registry, AlgorithmKeyRing, Decrypter, DecryptionContext, Encrypter,
    EncryptionContext, KeyRing, Registry, RegistryBuilder, SingleKeyRing, WrappedKeyRing,
};

// Keys, adapters and their errors
pub use cryptoinfra_crypto::{
    CipherDriver, CipherError, KeyPair, KeyedCipher, PkaDriver, PrivateKey, PublicKey, SuiteError,
};
