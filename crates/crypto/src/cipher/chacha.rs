//! ChaCha20-Poly1305 and its extended-nonce variant

use super::aead::AeadDriver;
use crate::error::SuiteError;
use crate::registry::RegistryBuilder;
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};

pub fn register(builder: &mut RegistryBuilder) -> Result<(), SuiteError> {
    builder.register_cipher("chacha20-poly1305", AeadDriver::<ChaCha20Poly1305>::new())?;
    builder.register_cipher("xchacha20-poly1305", AeadDriver::<XChaCha20Poly1305>::new())?;
    Ok(())
}
