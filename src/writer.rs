//! Streaming encryption into a chunked container
//!
//! A [`StreamWriter`] writes the preamble as soon as the encryption session
//! starts, then frames ciphertext into chunk records as data arrives. Call
//! [`StreamWriter::close`] or [`StreamWriter::finish`] to emit the terminal
//! chunk; dropping an open writer leaves the container truncated.
//!
//! # Example
//!
//! ```
//! use cryptoinfra::{builtin_registry, EncryptionContext, StreamWriter};
//! use rand::rngs::OsRng;
//! use std::io::Write;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = builtin_registry();
//! let pair = registry.generate_key_pair("curve25519", &mut OsRng)?;
//! let public = registry.load_public_key("curve25519", &pair.public)?;
//!
//! let ctx = EncryptionContext::new(registry);
//! let mut writer = StreamWriter::new(Vec::new(), &ctx, "curve25519", "aes-256/gcm", &public)?;
//! writer.write_all(b"attack at dawn")?;
//! let container = writer.finish()?;
//! assert!(!container.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::config::CodecConfig;
use crate::error::StreamError;
use crate::nonce::NonceSequence;
use crate::padding::pad;
use cryptoinfra_crypto::rand_core::CryptoRngCore;
use cryptoinfra_crypto::{
    AeadModeCipher, BlockModeCipher, Encrypter, KeyedCipher, PublicKey, StreamModeCipher,
};
use cryptoinfra_protocol::{write_chunk, BinaryWrite, Preamble};
use rand::rngs::OsRng;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace};
use zeroize::Zeroizing;

enum Encoder {
    Block(Box<dyn BlockModeCipher>),
    Stream(Box<dyn StreamModeCipher>),
    Aead {
        cipher: Box<dyn AeadModeCipher>,
        nonces: NonceSequence,
    },
}

enum State {
    Open,
    Closed,
    Failed(Arc<StreamError>),
}

/// Encrypting writer producing a preamble and chunk records
pub struct StreamWriter<W: Write> {
    inner: BufWriter<W>,
    encoder: Encoder,
    pending: Zeroizing<Vec<u8>>,
    max_chunk_len: usize,
    state: State,
    chunks: u64,
    plaintext_len: u64,
}

impl<W: Write> StreamWriter<W> {
    /// Start an encryption session and write the preamble
    pub fn new(
        inner: W,
        encrypter: &dyn Encrypter,
        pk_algo: &str,
        cipher: &str,
        public: &PublicKey,
    ) -> Result<Self, StreamError> {
        Self::with_config(inner, encrypter, pk_algo, cipher, public, &CodecConfig::default())
    }

    pub fn with_config(
        inner: W,
        encrypter: &dyn Encrypter,
        pk_algo: &str,
        cipher: &str,
        public: &PublicKey,
        config: &CodecConfig,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let (preamble, keyed) = encrypter.start_encryption(&mut OsRng, pk_algo, cipher, public)?;
        Self::from_session(inner, &preamble, keyed, config, &mut OsRng)
    }

    /// Wrap an already started session
    ///
    /// `rng` seeds the AEAD nonce sequence and is unused by other modes.
    pub fn from_session(
        inner: W,
        preamble: &Preamble,
        keyed: KeyedCipher,
        config: &CodecConfig,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let encoder = match keyed {
            KeyedCipher::Block(cipher) => Encoder::Block(cipher),
            KeyedCipher::Stream(cipher) => Encoder::Stream(cipher),
            KeyedCipher::Aead(cipher) => {
                let nonces =
                    NonceSequence::new(cipher.nonce_size(), config.associated_data_len, rng);
                Encoder::Aead { cipher, nonces }
            }
        };

        let mut inner = BufWriter::with_capacity(config.write_buffer_capacity, inner);
        preamble.write_to(&mut inner)?;
        debug!(
            pk_algo = %preamble.pk_algo,
            cipher = %preamble.encoding,
            "stream writer opened"
        );

        Ok(Self {
            inner,
            encoder,
            pending: Zeroizing::new(Vec::new()),
            max_chunk_len: config.max_chunk_len,
            state: State::Open,
            chunks: 0,
            plaintext_len: 0,
        })
    }

    /// Emit the terminal chunk and flush the transport
    pub fn close(&mut self) -> Result<(), StreamError> {
        self.check_open()?;
        let mut result = self.encode(true);
        if result.is_ok() {
            result = self.inner.flush().map_err(StreamError::Io);
        }
        match result {
            Ok(()) => {
                self.state = State::Closed;
                debug!(
                    chunks = self.chunks,
                    plaintext_len = self.plaintext_len,
                    "stream writer closed"
                );
                Ok(())
            }
            Err(err) => Err(self.latch(err)),
        }
    }

    /// Close if still open and hand back the transport
    pub fn finish(mut self) -> Result<W, StreamError> {
        if matches!(self.state, State::Open) {
            self.close()?;
        }
        if let State::Failed(err) = &self.state {
            return Err(StreamError::Io(StreamError::to_io(err)));
        }
        self.inner
            .into_inner()
            .map_err(|e| StreamError::Io(e.into_error()))
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Number of chunk records emitted so far
    pub fn chunks_written(&self) -> u64 {
        self.chunks
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    fn check_open(&self) -> Result<(), StreamError> {
        match &self.state {
            State::Open => Ok(()),
            State::Closed => Err(StreamError::Closed),
            State::Failed(err) => Err(StreamError::Io(StreamError::to_io(err))),
        }
    }

    fn latch(&mut self, err: StreamError) -> StreamError {
        let shared = Arc::new(err);
        let returned = StreamError::Io(StreamError::to_io(&shared));
        self.state = State::Failed(shared);
        returned
    }

    fn encode(&mut self, last: bool) -> Result<(), StreamError> {
        let Self {
            inner,
            encoder,
            pending,
            max_chunk_len,
            chunks,
            ..
        } = self;

        match encoder {
            Encoder::Block(cipher) => {
                let block_size = cipher.block_size();
                let whole = pending.len() - pending.len() % block_size;
                let step = (*max_chunk_len - *max_chunk_len % block_size).max(block_size);
                for range in split(whole, step, false) {
                    cipher.crypt_blocks(&mut pending[range.clone()])?;
                    write_chunk(inner, false, &[], &pending[range])?;
                    *chunks += 1;
                }
                pending.drain(..whole);

                if last {
                    let remainder = pending.len();
                    let mut block = Zeroizing::new(vec![0u8; block_size]);
                    block[..remainder].copy_from_slice(&pending[..]);
                    pad(&mut block[remainder..]);
                    cipher.crypt_blocks(&mut block)?;
                    write_chunk(inner, true, &[], &block)?;
                    *chunks += 1;
                    pending.clear();
                }
            }
            Encoder::Stream(cipher) => {
                let ranges = split(pending.len(), *max_chunk_len, last);
                let count = ranges.len();
                for (i, range) in ranges.into_iter().enumerate() {
                    cipher.apply_keystream(&mut pending[range.clone()])?;
                    write_chunk(inner, last && i + 1 == count, &[], &pending[range])?;
                    *chunks += 1;
                }
                pending.clear();
            }
            Encoder::Aead { cipher, nonces } => {
                let ranges = split(pending.len(), *max_chunk_len, last);
                let count = ranges.len();
                for (i, range) in ranges.into_iter().enumerate() {
                    nonces.advance();
                    let sealed =
                        cipher.seal(nonces.nonce(), &pending[range], nonces.associated_data())?;
                    write_chunk(inner, last && i + 1 == count, nonces.as_bytes(), &sealed)?;
                    *chunks += 1;
                }
                pending.clear();
            }
        }
        trace!(chunks = *chunks, last, "chunks encoded");
        Ok(())
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(err) = self.check_open() {
            return Err(io_error(err));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        append(&mut self.pending, buf);
        self.plaintext_len += buf.len() as u64;
        if let Err(err) = self.encode(false) {
            return Err(io_error(self.latch(err)));
        }
        Ok(buf.len())
    }

    /// Flushes the transport; buffered partial blocks stay pending
    fn flush(&mut self) -> io::Result<()> {
        if let Err(err) = self.check_open() {
            return Err(io_error(err));
        }
        self.inner.flush()
    }
}

/// Unwrap errors that already carry an `io::Error`
fn io_error(err: StreamError) -> io::Error {
    match err {
        StreamError::Io(e) => e,
        other => io::Error::new(other.io_kind(), other),
    }
}

/// Append plaintext without leaving an unwiped copy behind when the buffer grows
fn append(pending: &mut Zeroizing<Vec<u8>>, data: &[u8]) {
    let needed = pending.len() + data.len();
    if needed > pending.capacity() {
        let mut grown = Zeroizing::new(Vec::with_capacity(needed.max(2 * pending.capacity())));
        grown.extend_from_slice(&pending[..]);
        // The old allocation is wiped when it drops here
        *pending = grown;
    }
    pending.extend_from_slice(data);
}

/// Split `len` bytes into consecutive pieces of at most `step` bytes
///
/// With `keep_empty` an empty input still yields one empty piece.
fn split(len: usize, step: usize, keep_empty: bool) -> Vec<Range<usize>> {
    if len == 0 {
        return if keep_empty { vec![0..0] } else { Vec::new() };
    }
    (0..len)
        .step_by(step)
        .map(|start| start..(start + step).min(len))
        .collect()
}
