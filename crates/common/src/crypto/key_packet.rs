//! Wrapping session keys to a recipient public key
//!
//! A session key is wrapped for whoever must decrypt the payload later:
//! the account address key for key passphrases, the vault key for item and
//! vault content. Wrapping combines an ephemeral X25519 Diffie-Hellman
//! exchange with AES Key Wrap (RFC 3394).
//!
//! To wrap:
//! 1. Generate an ephemeral keypair
//! 2. ECDH between the ephemeral secret and the recipient's X25519 key
//! 3. Derive a KEK with BLAKE3 over the shared secret and both public keys
//! 4. AES-KW the session key under the KEK
//!
//! The recipient repeats the exchange with its private key and the
//! ephemeral public key carried at the front of the packet.

use std::fmt;

use aes_kw::KekAes256 as Kek;
use ed25519_dalek::SigningKey;
use zeroize::Zeroizing;

use super::context::{random_bytes, ContextError, CryptoContext};
use super::keys::{KeyError, KeyPair, PublicKey, UnlockedKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
use super::session_key::{SessionKey, SessionKeyError, SESSION_KEY_SIZE};

/// Size of the AES Key Wrap integrity block in bytes
pub const KW_OVERHEAD_SIZE: usize = 8;
/// Total size of a wrapped session key in bytes
///
/// Layout: ephemeral_pubkey (32) || wrapped_session_key (40) = 72 bytes
pub const WRAPPED_SESSION_KEY_SIZE: usize = PUBLIC_KEY_SIZE + SESSION_KEY_SIZE + KW_OVERHEAD_SIZE;

const KEK_CONTEXT: &str = "keyward 2024-06-01 session key wrap v1";

/// Errors that can occur while wrapping or unwrapping
#[derive(Debug, thiserror::Error)]
pub enum KeyPacketError {
    #[error("key packet error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session key error: {0}")]
    Session(#[from] SessionKeyError),
    #[error("randomness error: {0}")]
    Context(#[from] ContextError),
    #[error("recipient key {0} cannot encrypt")]
    NotEncryptionCapable(String),
}

/// A session key wrapped for one recipient
///
/// # Wire Format
///
/// ```text
/// [ ephemeral_pubkey: 32 bytes ][ wrapped_session_key: 40 bytes ]
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrappedSessionKey([u8; WRAPPED_SESSION_KEY_SIZE]);

impl fmt::Debug for WrappedSessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WrappedSessionKey({})", hex::encode(&self.0[..8]))
    }
}

impl TryFrom<&[u8]> for WrappedSessionKey {
    type Error = KeyPacketError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != WRAPPED_SESSION_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid key packet size, expected {}, got {}",
                WRAPPED_SESSION_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let mut buff = [0u8; WRAPPED_SESSION_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(WrappedSessionKey(buff))
    }
}

fn derive_kek(
    shared_secret: &[u8; 32],
    ephemeral: &PublicKey,
    recipient: &PublicKey,
) -> Zeroizing<[u8; 32]> {
    let mut material = Zeroizing::new(Vec::with_capacity(32 + 2 * PUBLIC_KEY_SIZE));
    material.extend_from_slice(shared_secret);
    material.extend_from_slice(&ephemeral.to_bytes());
    material.extend_from_slice(&recipient.to_bytes());
    Zeroizing::new(blake3::derive_key(KEK_CONTEXT, &material))
}

impl WrappedSessionKey {
    /// Wrap `session_key` so only the holder of `recipient`'s private key
    /// can recover it.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient key is not a valid curve point,
    /// is not encryption-capable, or the randomness source fails.
    pub fn wrap(
        ctx: &dyn CryptoContext,
        session_key: &SessionKey,
        recipient: &PublicKey,
    ) -> Result<Self, KeyPacketError> {
        let recipient_x25519 = recipient.to_x25519()?;

        let ephemeral_seed = Zeroizing::new(random_bytes::<PRIVATE_KEY_SIZE>(ctx)?);
        let ephemeral = UnlockedKey::from_signing_key(SigningKey::from_bytes(&ephemeral_seed));
        let ephemeral_public = ephemeral.public();

        let shared_secret = ephemeral.to_x25519().diffie_hellman(&recipient_x25519);
        let kek = Kek::from(*derive_kek(
            shared_secret.as_bytes(),
            &ephemeral_public,
            recipient,
        ));
        let wrapped = kek
            .wrap_vec(session_key.bytes())
            .map_err(|_| anyhow::anyhow!("AES-KW wrap error"))?;

        if PUBLIC_KEY_SIZE + wrapped.len() != WRAPPED_SESSION_KEY_SIZE {
            return Err(anyhow::anyhow!("expected key packet size is incorrect").into());
        }

        let mut packet = [0u8; WRAPPED_SESSION_KEY_SIZE];
        packet[..PUBLIC_KEY_SIZE].copy_from_slice(&ephemeral_public.to_bytes());
        packet[PUBLIC_KEY_SIZE..].copy_from_slice(&wrapped);
        Ok(WrappedSessionKey(packet))
    }

    /// Wrap `session_key` for a keypair, refusing keys that are inactive
    /// or not encryption-capable.
    pub fn wrap_for(
        ctx: &dyn CryptoContext,
        session_key: &SessionKey,
        recipient: &KeyPair,
    ) -> Result<Self, KeyPacketError> {
        let flags = recipient.flags();
        if !(flags.active && flags.can_encrypt) {
            return Err(KeyPacketError::NotEncryptionCapable(
                recipient.fingerprint().to_hex(),
            ));
        }
        Self::wrap(ctx, session_key, recipient.public_key())
    }

    /// Recover the session key with the recipient's unlocked private key
    ///
    /// # Errors
    ///
    /// Fails when the packet was wrapped for a different recipient, or was
    /// corrupted or tampered with.
    pub fn recover(&self, recipient: &UnlockedKey) -> Result<SessionKey, KeyPacketError> {
        let ephemeral_public = PublicKey::try_from(&self.0[..PUBLIC_KEY_SIZE])?;

        let shared_secret = recipient
            .to_x25519()
            .diffie_hellman(&ephemeral_public.to_x25519()?);
        let kek = Kek::from(*derive_kek(
            shared_secret.as_bytes(),
            &ephemeral_public,
            &recipient.public(),
        ));

        let unwrapped = Zeroizing::new(
            kek.unwrap_vec(&self.0[PUBLIC_KEY_SIZE..])
                .map_err(|_| anyhow::anyhow!("AES-KW unwrap error"))?,
        );
        Ok(SessionKey::from_slice(&unwrapped)?)
    }

    /// Get a reference to the raw packet bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
