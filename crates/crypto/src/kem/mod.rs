//! Key-exchange (public-key) adapters
//!
//! A [`PkaDriver`] turns a recipient's public key into an opaque
//! key-exchange value plus derived key material, and reconstructs the same
//! material from the opaque value and the matching private key.

use crate::error::SuiteError;
use crate::types::{CipherBuffer, KeyPair, PrivateKey, PublicKey};
use rand_core::CryptoRngCore;

#[cfg(feature = "kem-ec")]
pub mod ec;

#[cfg(feature = "kem-x25519")]
pub mod x25519;

/// Adapter for one named public-key algorithm
///
/// `encrypt_key` and `decrypt_key` must fill the buffer identically for a
/// matching key pair; both go through the key stretcher so the buffer can
/// have any length the cipher asks for.
pub trait PkaDriver: Send + Sync {
    /// Generate a fresh key pair in serialized form
    fn generate_key_pair(&self, rng: &mut dyn CryptoRngCore) -> Result<KeyPair, SuiteError>;

    /// Parse a serialized public key
    fn load_public(&self, bytes: &[u8]) -> Result<PublicKey, SuiteError>;

    /// Parse a serialized private key
    fn load_private(&self, bytes: &[u8]) -> Result<PrivateKey, SuiteError>;

    /// Fill `buffer` with fresh key material and return the opaque value
    /// the recipient needs to reproduce it
    fn encrypt_key(
        &self,
        rng: &mut dyn CryptoRngCore,
        public: &PublicKey,
        buffer: &mut CipherBuffer,
    ) -> Result<Vec<u8>, SuiteError>;

    /// Fill `buffer` with the key material bound to `opaque`
    fn decrypt_key(
        &self,
        opaque: &[u8],
        private: &PrivateKey,
        buffer: &mut CipherBuffer,
    ) -> Result<(), SuiteError>;
}

/// Copy `bytes` into a fixed-size array or report their length
pub(crate) fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], usize> {
    <[u8; N]>::try_from(bytes).map_err(|_| bytes.len())
}
