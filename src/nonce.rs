//! Per-chunk AEAD nonces
//!
//! A session holds one buffer of `nonce_size + associated_data_len` bytes,
//! filled once from the session CSPRNG. Before each chunk the buffer is
//! XORed with output from a small non-cryptographic generator seeded at
//! session start. The leading `nonce_size` bytes are the AEAD nonce and the
//! rest is authenticated as associated data; the whole buffer travels in the
//! chunk record.
//!
//! Nonces are unpredictable only within a session. They are not
//! guaranteed unique the way a counter would be.

use cryptoinfra_crypto::rand_core::CryptoRngCore;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use zeroize::Zeroizing;

pub struct NonceSequence {
    buffer: Zeroizing<Vec<u8>>,
    nonce_size: usize,
    mixer: SmallRng,
}

impl NonceSequence {
    pub fn new(nonce_size: usize, associated_data_len: usize, rng: &mut dyn CryptoRngCore) -> Self {
        let mut buffer = Zeroizing::new(vec![0u8; nonce_size + associated_data_len]);
        rng.fill_bytes(&mut buffer);
        let mixer = SmallRng::seed_from_u64(rng.next_u64());
        Self {
            buffer,
            nonce_size,
            mixer,
        }
    }

    /// Move to the nonce for the next chunk
    pub fn advance(&mut self) {
        let mut draw = 0u64;
        let mut left = 0;
        for byte in self.buffer.iter_mut() {
            if left == 0 {
                draw = (self.mixer.next_u64() >> 1).wrapping_mul(3);
                left = 8;
            }
            *byte ^= draw as u8;
            draw >>= 8;
            left -= 1;
        }
    }

    pub fn nonce(&self) -> &[u8] {
        &self.buffer[..self.nonce_size]
    }

    pub fn associated_data(&self) -> &[u8] {
        &self.buffer[self.nonce_size..]
    }

    /// Nonce followed by associated data, as written to the chunk record
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
