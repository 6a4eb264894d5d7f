//! X25519 key exchange (`curve25519`)
//!
//! The opaque value is the sender's ephemeral public key. The 32-byte
//! shared secret goes through the plain key stretcher, so a 32-byte cipher
//! key is the shared secret itself.

use super::{fixed, PkaDriver};
use crate::error::SuiteError;
use crate::stretch::derive_key;
use crate::types::{CipherBuffer, KeyPair, PrivateKey, PublicKey};
use rand_core::{CryptoRngCore, RngCore};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::Zeroize;

pub const ALGORITHM: &str = "curve25519";

const KEY_LEN: usize = 32;

/// X25519 adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct X25519Kem;

impl X25519Kem {
    fn random_secret(rng: &mut dyn CryptoRngCore) -> StaticSecret {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill_bytes(&mut bytes);
        bytes[0] &= 248;
        bytes[31] &= 127;
        bytes[31] |= 64;
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();
        secret
    }

    fn derive(
        secret: &StaticSecret,
        peer: &X25519Public,
        buffer: &mut CipherBuffer,
    ) -> Result<(), SuiteError> {
        let shared = secret.diffie_hellman(peer);
        if !shared.was_contributory() {
            return Err(SuiteError::KeyExchangeFailed(
                "low-order curve25519 point".to_string(),
            ));
        }
        derive_key(shared.as_bytes(), buffer);
        Ok(())
    }
}

impl PkaDriver for X25519Kem {
    fn generate_key_pair(&self, rng: &mut dyn CryptoRngCore) -> Result<KeyPair, SuiteError> {
        let secret = Self::random_secret(rng);
        let public = X25519Public::from(&secret);
        Ok(KeyPair::new(
            public.as_bytes().to_vec(),
            secret.to_bytes().to_vec(),
        ))
    }

    fn load_public(&self, bytes: &[u8]) -> Result<PublicKey, SuiteError> {
        let raw = fixed::<KEY_LEN>(bytes).map_err(|len| {
            SuiteError::MalformedKey(format!("curve25519 public key must be 32 bytes, got {len}"))
        })?;
        Ok(PublicKey::new(ALGORITHM, X25519Public::from(raw)))
    }

    fn load_private(&self, bytes: &[u8]) -> Result<PrivateKey, SuiteError> {
        let mut raw = fixed::<KEY_LEN>(bytes).map_err(|len| {
            SuiteError::MalformedKey(format!("curve25519 private key must be 32 bytes, got {len}"))
        })?;
        let secret = StaticSecret::from(raw);
        raw.zeroize();
        Ok(PrivateKey::new(ALGORITHM, secret))
    }

    fn encrypt_key(
        &self,
        rng: &mut dyn CryptoRngCore,
        public: &PublicKey,
        buffer: &mut CipherBuffer,
    ) -> Result<Vec<u8>, SuiteError> {
        let peer = public.downcast::<X25519Public>(ALGORITHM)?;
        let ephemeral = Self::random_secret(rng);
        Self::derive(&ephemeral, peer, buffer)?;
        Ok(X25519Public::from(&ephemeral).as_bytes().to_vec())
    }

    fn decrypt_key(
        &self,
        opaque: &[u8],
        private: &PrivateKey,
        buffer: &mut CipherBuffer,
    ) -> Result<(), SuiteError> {
        let secret = private.downcast::<StaticSecret>(ALGORITHM)?;
        let raw = fixed::<KEY_LEN>(opaque).map_err(|len| {
            SuiteError::MalformedEncryptedKey(format!(
                "curve25519 ephemeral key must be 32 bytes, got {len}"
            ))
        })?;
        Self::derive(secret, &X25519Public::from(raw), buffer)
    }
}
