//! Streaming decryption of a chunked container
//!
//! [`StreamReader`] decodes the preamble on construction, starts a
//! decryption session from it, and then decrypts chunk records lazily as the
//! caller reads. Errors are latched: plaintext decrypted before a failure is
//! still delivered, after which every read returns the same error.

use crate::config::CodecConfig;
use crate::error::StreamError;
use crate::padding::unpad;
use cryptoinfra_crypto::{
    AeadModeCipher, BlockModeCipher, CipherError, Decrypter, KeyedCipher, StreamModeCipher,
};
use cryptoinfra_protocol::{BinaryRead, ChunkRecord, DecodeLimits, Preamble};
use std::io::{self, BufReader, Read};
use std::sync::Arc;
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

enum Decoder {
    Block(Box<dyn BlockModeCipher>),
    Stream(Box<dyn StreamModeCipher>),
    Aead(Box<dyn AeadModeCipher>),
}

impl From<KeyedCipher> for Decoder {
    fn from(keyed: KeyedCipher) -> Self {
        match keyed {
            KeyedCipher::Block(c) => Decoder::Block(c),
            KeyedCipher::Stream(c) => Decoder::Stream(c),
            KeyedCipher::Aead(c) => Decoder::Aead(c),
        }
    }
}

impl Decoder {
    /// Decrypt one record, appending its plaintext to `out`
    fn decode(&mut self, record: &mut ChunkRecord, out: &mut Vec<u8>) -> Result<(), StreamError> {
        match self {
            Decoder::Block(cipher) => {
                let block_size = cipher.block_size();
                let data = &mut record.data;
                if block_size == 0 || data.len() % block_size != 0 {
                    return Err(CipherError::BlockAlignment {
                        len: data.len(),
                        block_size,
                    }
                    .into());
                }
                cipher.crypt_blocks(data)?;
                let mut keep = data.len();
                if record.last && keep > 0 {
                    let tail = keep - block_size;
                    keep = tail + unpad(&data[tail..]);
                }
                out.extend_from_slice(&data[..keep]);
            }
            Decoder::Stream(cipher) => {
                cipher.apply_keystream(&mut record.data)?;
                out.extend_from_slice(&record.data);
            }
            Decoder::Aead(cipher) => {
                let nonce_size = cipher.nonce_size();
                if record.nonce.len() < nonce_size {
                    return Err(CipherError::Nonce {
                        expected: nonce_size,
                        got: record.nonce.len(),
                    }
                    .into());
                }
                let (nonce, aad) = record.nonce.split_at(nonce_size);
                let plaintext = Zeroizing::new(cipher.open(nonce, &record.data, aad)?);
                out.extend_from_slice(&plaintext);
            }
        }
        Ok(())
    }
}

enum State {
    Streaming,
    Finished,
    Failed(Arc<StreamError>),
}

/// Decrypting reader over a chunked container
pub struct StreamReader<R: Read> {
    inner: BufReader<R>,
    decoder: Decoder,
    preamble: Preamble,
    limits: DecodeLimits,
    plaintext: Zeroizing<Vec<u8>>,
    pos: usize,
    state: State,
    chunks: u64,
}

impl<R: Read> StreamReader<R> {
    /// Read the preamble and start a decryption session for it
    pub fn new(inner: R, decrypter: &dyn Decrypter) -> Result<Self, StreamError> {
        Self::with_config(inner, decrypter, &CodecConfig::default())
    }

    pub fn with_config(
        inner: R,
        decrypter: &dyn Decrypter,
        config: &CodecConfig,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let limits = config.decode_limits();
        let mut inner = BufReader::new(inner);
        let preamble = Preamble::read_from(&mut inner, &limits).map_err(|e| {
            if e.is_eof() {
                StreamError::Truncated
            } else {
                e.into()
            }
        })?;
        let decoder = decrypter.start_decryption(&preamble)?.into();
        debug!(
            pk_algo = %preamble.pk_algo,
            cipher = %preamble.encoding,
            "stream reader opened"
        );

        Ok(Self {
            inner,
            decoder,
            preamble,
            limits,
            plaintext: Zeroizing::new(Vec::new()),
            pos: 0,
            state: State::Streaming,
            chunks: 0,
        })
    }

    /// The preamble this stream was opened with
    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// True once the final chunk has been decoded
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    pub fn chunks_read(&self) -> u64 {
        self.chunks
    }

    /// Hand back the transport, dropping any bytes buffered past the last record read
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Decode the next record into the plaintext buffer
    fn decode_next(&mut self) -> Result<(), StreamError> {
        let mut record = match ChunkRecord::read_next(&mut self.inner, &self.limits) {
            Ok(Some(record)) => record,
            Ok(None) => return Err(StreamError::Truncated),
            Err(e) if e.is_eof() => return Err(StreamError::Truncated),
            Err(e) => return Err(e.into()),
        };

        self.plaintext.zeroize();
        self.pos = 0;
        let result = self.decoder.decode(&mut record, &mut self.plaintext);
        record.data.zeroize();
        result?;

        self.chunks += 1;
        trace!(
            chunk = self.chunks,
            last = record.last,
            len = self.plaintext.len(),
            "chunk decoded"
        );
        if record.last {
            self.state = State::Finished;
            debug!(chunks = self.chunks, "stream reader finished");
        }
        Ok(())
    }
}

impl<R: Read> Read for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            if self.pos < self.plaintext.len() {
                let take = (self.plaintext.len() - self.pos).min(buf.len() - filled);
                buf[filled..filled + take]
                    .copy_from_slice(&self.plaintext[self.pos..self.pos + take]);
                self.pos += take;
                filled += take;
                continue;
            }
            match self.state {
                State::Finished => break,
                State::Failed(ref err) => {
                    if filled > 0 {
                        break;
                    }
                    return Err(StreamError::to_io(err));
                }
                State::Streaming => {
                    if let Err(err) = self.decode_next() {
                        debug!(error = %err, "stream reader failed");
                        self.plaintext.zeroize();
                        self.pos = 0;
                        self.state = State::Failed(Arc::new(err));
                    }
                }
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity block cipher with a configurable block size
    struct Plain(usize);

    impl BlockModeCipher for Plain {
        fn block_size(&self) -> usize {
            self.0
        }

        fn crypt_blocks(&mut self, _data: &mut [u8]) -> Result<(), CipherError> {
            Ok(())
        }
    }

    #[test]
    fn test_block_decode_unpads_final_chunk() {
        let mut decoder = Decoder::Block(Box::new(Plain(4)));
        let mut out = Vec::new();

        let mut first = ChunkRecord::new(false, Vec::new(), b"abcd".to_vec());
        decoder.decode(&mut first, &mut out).unwrap();

        let mut last = ChunkRecord::new(true, Vec::new(), vec![b'e', b'f', 0, 1]);
        decoder.decode(&mut last, &mut out).unwrap();
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn test_block_decode_rejects_misaligned_chunk() {
        let mut decoder = Decoder::Block(Box::new(Plain(4)));
        let mut record = ChunkRecord::new(false, Vec::new(), b"abcde".to_vec());
        let err = decoder.decode(&mut record, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            StreamError::Cipher(CipherError::BlockAlignment {
                len: 5,
                block_size: 4
            })
        ));
    }

    #[test]
    fn test_empty_final_block_chunk() {
        let mut decoder = Decoder::Block(Box::new(Plain(4)));
        let mut out = Vec::new();
        let mut record = ChunkRecord::new(true, Vec::new(), Vec::new());
        decoder.decode(&mut record, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
