//! Common test utilities for cryptoinfra integration tests
//!
//! This module provides shared helper functions to reduce code duplication
//! across integration test files.

#![allow(dead_code)]

use std::io::{self, Cursor, Read, Write};
use std::sync::Once;

// Re-export commonly used types
pub use cryptoinfra::prelude::*;
pub use cryptoinfra::protocol::DecodeLimits;
use rand::rngs::OsRng;

/// Every built-in public-key algorithm
pub const PK_ALGORITHMS: &[&str] = &["curve25519", "fips_p256", "fips_p384", "fips_p521"];

/// Every built-in cipher, grouped by mode family
pub const BLOCK_CIPHERS: &[&str] = &["aes-128/cbc", "aes-192/cbc", "aes-256/cbc"];
pub const STREAM_CIPHERS: &[&str] = &[
    "aes-128/cfb",
    "aes-192/cfb",
    "aes-256/cfb",
    "aes-128/ctr",
    "aes-192/ctr",
    "aes-256/ctr",
    "aes-128/ofb",
    "aes-192/ofb",
    "aes-256/ofb",
];
pub const AEAD_CIPHERS: &[&str] = &[
    "aes-128/gcm",
    "aes-192/gcm",
    "aes-256/gcm",
    "chacha20-poly1305",
    "xchacha20-poly1305",
];

/// Test data for encryption/decryption
pub const TEST_PLAINTEXT: &[u8] = b"Hello, cryptoinfra! This is test data for encryption.";

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn all_ciphers() -> impl Iterator<Item = &'static str> {
    BLOCK_CIPHERS
        .iter()
        .chain(STREAM_CIPHERS)
        .chain(AEAD_CIPHERS)
        .copied()
}

/// A recipient key pair loaded from the built-in registry
pub struct Recipient {
    pub pk_algo: &'static str,
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl Recipient {
    pub fn generate(pk_algo: &'static str) -> Self {
        let registry = builtin_registry();
        let pair = registry.generate_key_pair(pk_algo, &mut OsRng).unwrap();
        Self {
            pk_algo,
            public: registry.load_public_key(pk_algo, &pair.public).unwrap(),
            private: registry.load_private_key(pk_algo, &pair.private).unwrap(),
        }
    }

    pub fn decrypter(&self) -> DecryptionContext<'static, SingleKeyRing> {
        DecryptionContext::with_builtins(SingleKeyRing(self.private.clone()))
    }
}

/// Encrypt `plaintext` in writes of at most `write_len` bytes
pub fn encrypt_with(
    recipient: &Recipient,
    cipher: &str,
    plaintext: &[u8],
    write_len: usize,
    config: &CodecConfig,
) -> Vec<u8> {
    let ctx = EncryptionContext::default();
    let mut writer = StreamWriter::with_config(
        Vec::new(),
        &ctx,
        recipient.pk_algo,
        cipher,
        &recipient.public,
        config,
    )
    .unwrap();
    for piece in plaintext.chunks(write_len.max(1)) {
        writer.write_all(piece).unwrap();
    }
    writer.finish().unwrap()
}

pub fn encrypt(recipient: &Recipient, cipher: &str, plaintext: &[u8]) -> Vec<u8> {
    encrypt_with(recipient, cipher, plaintext, usize::MAX, &CodecConfig::default())
}

/// Decrypt a whole container
pub fn decrypt(recipient: &Recipient, container: &[u8]) -> io::Result<Vec<u8>> {
    let mut reader = StreamReader::new(container, &recipient.decrypter())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut plaintext = Vec::new();
    reader.read_to_end(&mut plaintext)?;
    Ok(plaintext)
}

/// Split a container into its preamble and chunk records
pub fn parse_container(container: &[u8]) -> (Preamble, Vec<ChunkRecord>) {
    let limits = DecodeLimits::default();
    let mut cursor = Cursor::new(container);
    let preamble = Preamble::read_from(&mut cursor, &limits).unwrap();
    let mut records = Vec::new();
    while let Some(record) = ChunkRecord::read_next(&mut cursor, &limits).unwrap() {
        records.push(record);
    }
    (preamble, records)
}

/// Re-encode a container from its parts
pub fn build_container(preamble: &Preamble, records: &[ChunkRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    preamble.write_to(&mut out).unwrap();
    for record in records {
        record.write_to(&mut out).unwrap();
    }
    out
}

/// Deterministic, non-repeating sample data
pub fn sample_plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// The stream error behind an `io::Error` returned by a reader or writer
pub fn stream_error(err: &io::Error) -> &StreamError {
    StreamError::from_io(err)
        .expect("io error should carry a stream error")
        .innermost()
}
