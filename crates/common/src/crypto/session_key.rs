//! Ephemeral symmetric keys using ChaCha20-Poly1305
//!
//! A fresh `SessionKey` is minted for every payload the protocols encrypt:
//! one per vault metadata blob and one per item. The same key also
//! encrypts the detached signatures over that payload, so a signature is
//! exactly as confidential as the content it covers.
//!
//! Session keys are never persisted in the clear. They leave a call only
//! in wrapped form (see [`WrappedSessionKey`](super::WrappedSessionKey)).

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::context::{random_bytes, ContextError, CryptoContext};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of a session key in bytes (256 bits)
pub const SESSION_KEY_SIZE: usize = 32;
/// Size of the Poly1305 authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during session encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("session key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("randomness error: {0}")]
    Context(#[from] ContextError),
}

/// A 256-bit symmetric key used to encrypt exactly one payload
///
/// The ciphertext layout is `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
/// Key bytes are wiped when the value is dropped.
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl From<[u8; SESSION_KEY_SIZE]> for SessionKey {
    fn from(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        SessionKey(bytes)
    }
}

impl SessionKey {
    /// Generate a new random session key
    ///
    /// # Errors
    ///
    /// Fails only if the randomness source does.
    pub fn generate(ctx: &dyn CryptoContext) -> Result<Self, SessionKeyError> {
        Ok(Self(random_bytes(ctx)?))
    }

    /// Create a session key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SESSION_KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SessionKeyError> {
        if data.len() != SESSION_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid session key size, expected {}, got {}",
                SESSION_KEY_SIZE,
                data.len()
            )
            .into());
        }
        let mut buff = [0; SESSION_KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the raw key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt `data` under this key with a fresh random nonce.
    pub fn encrypt(
        &self,
        ctx: &dyn CryptoContext,
        data: &[u8],
    ) -> Result<Vec<u8>, SessionKeyError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(self.bytes()));

        let nonce_bytes: [u8; NONCE_SIZE] = random_bytes(ctx)?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| anyhow::anyhow!("encrypt error"))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(ciphertext.as_ref());
        Ok(out)
    }

    /// Decrypt data produced by [`SessionKey::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns an error if the input is too short to hold a nonce and tag, or
    /// if authentication fails (wrong key or tampered data).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SessionKeyError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(anyhow::anyhow!("ciphertext too short").into());
        }

        let cipher = ChaCha20Poly1305::new(Key::from_slice(self.bytes()));
        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        let plaintext = cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|_| anyhow::anyhow!("decrypt error"))?;
        Ok(plaintext)
    }
}
