//! Elliptic-curve key exchange over the NIST prime curves
//!
//! Registered as `fips_p256`, `fips_p384` and `fips_p521`.
//!
//! # Protocol Flow
//!
//! 1. Generate an ephemeral key pair on the recipient's curve
//! 2. Multiply the recipient's public point by the ephemeral scalar
//! 3. Encode the shared point uncompressed (`04 || X || Y`)
//! 4. Stretch the encoded point with whitening into the cipher's key and IV
//! 5. Send the uncompressed ephemeral public point as the opaque value
//!
//! Private keys are the raw big-endian scalar, one field element wide.

use super::PkaDriver;
use crate::error::SuiteError;
use crate::registry::RegistryBuilder;
use crate::stretch::derive_key_hash;
use crate::types::{CipherBuffer, KeyPair, PrivateKey, PublicKey};
use elliptic_curve::generic_array::typenum::Unsigned;
use elliptic_curve::group::Curve as _;
use elliptic_curve::sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint};
use elliptic_curve::{AffinePoint, CurveArithmetic, FieldBytesSize, SecretKey};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rand_core::CryptoRngCore;
use std::fmt;
use std::marker::PhantomData;

type CurvePublic<C> = elliptic_curve::PublicKey<C>;

/// ECDH adapter for one curve
pub struct EcdhKem<C> {
    name: &'static str,
    _curve: PhantomData<fn() -> C>,
}

impl<C> EcdhKem<C> {
    /// Adapter that tags its key handles with `name`
    pub const fn new(name: &'static str) -> Self {
        EcdhKem {
            name,
            _curve: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C> Clone for EcdhKem<C> {
    fn clone(&self) -> Self {
        Self::new(self.name)
    }
}

impl<C> fmt::Debug for EcdhKem<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhKem").field("name", &self.name).finish()
    }
}

impl<C> EcdhKem<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Uncompressed encoding of `secret * peer`, stretched into `buffer`
    fn derive(secret: &SecretKey<C>, peer: &CurvePublic<C>, buffer: &mut CipherBuffer) {
        let shared = (peer.to_projective() * *secret.to_nonzero_scalar()).to_affine();
        let encoded = shared.to_encoded_point(false);
        derive_key_hash(encoded.as_bytes(), buffer);
    }

    fn scalar_len() -> usize {
        FieldBytesSize::<C>::USIZE
    }
}

impl<C> PkaDriver for EcdhKem<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    CurvePublic<C>: Send + Sync,
    SecretKey<C>: Send + Sync,
{
    fn generate_key_pair(&self, mut rng: &mut dyn CryptoRngCore) -> Result<KeyPair, SuiteError> {
        let secret = SecretKey::<C>::random(&mut rng);
        let public = secret.public_key().to_encoded_point(false);
        Ok(KeyPair::new(
            public.as_bytes().to_vec(),
            secret.to_bytes().to_vec(),
        ))
    }

    fn load_public(&self, bytes: &[u8]) -> Result<PublicKey, SuiteError> {
        let point = CurvePublic::<C>::from_sec1_bytes(bytes)
            .map_err(|_| SuiteError::MalformedKey(format!("invalid {} point", self.name)))?;
        Ok(PublicKey::new(self.name, point))
    }

    fn load_private(&self, bytes: &[u8]) -> Result<PrivateKey, SuiteError> {
        let expected = Self::scalar_len();
        if bytes.len() != expected {
            return Err(SuiteError::MalformedKey(format!(
                "{} private key must be {expected} bytes, got {}",
                self.name,
                bytes.len()
            )));
        }
        let secret = SecretKey::<C>::from_slice(bytes)
            .map_err(|_| SuiteError::MalformedKey(format!("{} scalar out of range", self.name)))?;
        Ok(PrivateKey::new(self.name, secret))
    }

    fn encrypt_key(
        &self,
        mut rng: &mut dyn CryptoRngCore,
        public: &PublicKey,
        buffer: &mut CipherBuffer,
    ) -> Result<Vec<u8>, SuiteError> {
        let peer = public.downcast::<CurvePublic<C>>(self.name)?;
        let ephemeral = SecretKey::<C>::random(&mut rng);
        Self::derive(&ephemeral, peer, buffer);
        Ok(ephemeral
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec())
    }

    fn decrypt_key(
        &self,
        opaque: &[u8],
        private: &PrivateKey,
        buffer: &mut CipherBuffer,
    ) -> Result<(), SuiteError> {
        let secret = private.downcast::<SecretKey<C>>(self.name)?;
        let peer = CurvePublic::<C>::from_sec1_bytes(opaque).map_err(|_| {
            SuiteError::MalformedEncryptedKey(format!("invalid {} ephemeral point", self.name))
        })?;
        Self::derive(secret, &peer, buffer);
        Ok(())
    }
}

/// Register every NIST curve adapter
pub fn register(builder: &mut RegistryBuilder) -> Result<(), SuiteError> {
    builder.register_pk_algorithm("fips_p256", EcdhKem::<NistP256>::new("fips_p256"))?;
    builder.register_pk_algorithm("fips_p384", EcdhKem::<NistP384>::new("fips_p384"))?;
    builder.register_pk_algorithm("fips_p521", EcdhKem::<NistP521>::new("fips_p521"))?;
    Ok(())
}
