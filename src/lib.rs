//! Streaming hybrid-encryption containers
//!
//! A container is a preamble naming the key-exchange and cipher algorithms,
//! followed by chunk records of ciphertext. [`StreamWriter`] produces one from
//! any `std::io::Write`, [`StreamReader`] decrypts one from any
//! `std::io::Read`.
//!
//! # Example
//!
//! ```
//! use cryptoinfra::prelude::*;
//! use rand::rngs::OsRng;
//! use std::io::{Read, Write};
//!
//! # fn example() -> Result<(), CryptoInfraError> {
//! let registry = builtin_registry();
//! let pair = registry.generate_key_pair("fips_p256", &mut OsRng)?;
//! let public = registry.load_public_key("fips_p256", &pair.public)?;
//! let private = registry.load_private_key("fips_p256", &pair.private)?;
//!
//! let ctx = EncryptionContext::new(registry);
//! let mut writer = StreamWriter::new(Vec::new(), &ctx, "fips_p256", "aes-128/cbc", &public)?;
//! writer.write_all(b"hello, container")?;
//! let container = writer.finish()?;
//!
//! let ctx = DecryptionContext::new(registry, SingleKeyRing(private));
//! let mut reader = StreamReader::new(container.as_slice(), &ctx)?;
//! let mut plaintext = Vec::new();
//! reader.read_to_end(&mut plaintext)?;
//! assert_eq!(plaintext, b"hello, container");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod nonce;
pub mod padding;
pub mod prelude;
pub mod reader;
pub mod writer;

pub use config::CodecConfig;
pub use error::{CryptoInfraError, StreamError};
pub use reader::StreamReader;
pub use writer::StreamWriter;

// Re-export the layers below
pub use cryptoinfra_crypto::{
    builtin_registry, AlgorithmKeyRing, Decrypter, DecryptionContext, Encrypter,
    EncryptionContext, KeyRing, PrivateKey, PublicKey, Registry, RegistryBuilder, SingleKeyRing,
    WrappedKeyRing,
};
pub use cryptoinfra_protocol::{ChunkRecord, Preamble};

pub use cryptoinfra_crypto as crypto;
pub use cryptoinfra_protocol as protocol;
