//! cryptoinfra Cryptographic Operations
//!
//! This crate binds key-exchange algorithms to symmetric ciphers:
//! - A key stretcher that turns any shared secret into exact key/IV lengths
//! - Adapter traits for ciphers ([`CipherDriver`]) and key exchange ([`PkaDriver`])
//! - A frozen, thread-safe [`Registry`] of named adapters
//! - Encryption/decryption sessions producing keyed cipher objects
//!
//! # Security Features
//!
//! - **Zeroization**: derived key material lives in zeroizing buffers and is
//!   wiped as soon as the keyed cipher exists
//! - **Pluggable**: adapters are registered by name, the built-in set is
//!   selected with Cargo features
//!
//! # Example
//!
//! ```
//! use cryptoinfra_crypto::{builtin_registry, Decrypter, DecryptionContext, Encrypter,
//!     EncryptionContext, KeyedCipher, SingleKeyRing};
//! use rand::rngs::OsRng;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = builtin_registry();
//! let pair = registry.generate_key_pair("curve25519", &mut OsRng)?;
//! let public = registry.load_public_key("curve25519", &pair.public)?;
//!
//! let (preamble, _cipher) = EncryptionContext::new(registry)
//!     .start_encryption(&mut OsRng, "curve25519", "aes-256/gcm", &public)?;
//!
//! let private = registry.load_private_key("curve25519", &pair.private)?;
//! let cipher = DecryptionContext::new(registry, SingleKeyRing(private))
//!     .start_decryption(&preamble)?;
//! assert!(matches!(cipher, KeyedCipher::Aead(_)));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod cipher;
pub mod error;
pub mod kem;
pub mod registry;
pub mod session;
pub mod stretch;
pub mod types;

// Re-export commonly used types
pub use cipher::{
    AeadModeCipher, BlockModeCipher, CipherDriver, Direction, KeyedCipher, StreamModeCipher,
};
pub use error::{CipherError, SuiteError};
pub use kem::PkaDriver;
pub use registry::{builtin_registry, Registry, RegistryBuilder};
pub use session::{
    AlgorithmKeyRing, Decrypter, DecryptionContext, Encrypter, EncryptionContext, KeyRing,
    SingleKeyRing, WrappedKeyRing,
};
pub use stretch::{derive_key, derive_key_hash, stretch, stretch_hashed};
pub use types::{CipherBuffer, KeyPair, PrivateKey, PublicKey};

#[cfg(feature = "kem-x25519")]
pub use kem::x25519::X25519Kem;

#[cfg(feature = "kem-ec")]
pub use kem::ec::EcdhKem;

// Re-export the RNG traits adapters are written against
pub use rand_core;
