//! Private-key passphrase wrapping
//!
//! Each generated keypair's passphrase is handed to exactly one recipient
//! key: a fresh session key is wrapped for the recipient, and the
//! passphrase is encrypted under that session key. Which key is the
//! recipient is decided by the calling protocol.

use std::fmt;

use zeroize::Zeroizing;

use super::context::CryptoContext;
use super::key_packet::{KeyPacketError, WrappedSessionKey};
use super::keys::{KeyPair, Passphrase, UnlockedKey};
use super::session_key::SessionKey;

/// A passphrase only the designated recipient can recover
#[derive(Clone, PartialEq, Eq)]
pub struct WrappedPassphrase {
    key_packet: WrappedSessionKey,
    encrypted_passphrase: Vec<u8>,
}

impl fmt::Debug for WrappedPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedPassphrase")
            .field("key_packet", &self.key_packet)
            .field("encrypted_len", &self.encrypted_passphrase.len())
            .finish()
    }
}

impl WrappedPassphrase {
    /// Wrap `passphrase` for `recipient`
    ///
    /// The passphrase is not validated; any byte string is accepted.
    ///
    /// # Errors
    ///
    /// Fails if the recipient cannot receive encrypted data or the
    /// randomness source fails.
    pub fn wrap(
        ctx: &dyn CryptoContext,
        passphrase: &Passphrase,
        recipient: &KeyPair,
    ) -> Result<Self, KeyPacketError> {
        let session_key = SessionKey::generate(ctx)?;
        let key_packet = WrappedSessionKey::wrap_for(ctx, &session_key, recipient)?;
        let encrypted_passphrase = session_key.encrypt(ctx, passphrase.bytes())?;
        Ok(WrappedPassphrase {
            key_packet,
            encrypted_passphrase,
        })
    }

    /// Rebuild from the two halves carried in a request.
    pub fn from_parts(key_packet: WrappedSessionKey, encrypted_passphrase: Vec<u8>) -> Self {
        WrappedPassphrase {
            key_packet,
            encrypted_passphrase,
        }
    }

    /// Recover the passphrase with the recipient's unlocked key.
    pub fn recover(&self, recipient: &UnlockedKey) -> Result<Passphrase, KeyPacketError> {
        let session_key = self.key_packet.recover(recipient)?;
        let bytes = Zeroizing::new(session_key.decrypt(&self.encrypted_passphrase)?);
        Ok(Passphrase::from(bytes.to_vec()))
    }

    pub fn key_packet(&self) -> &WrappedSessionKey {
        &self.key_packet
    }

    pub fn encrypted_passphrase(&self) -> &[u8] {
        &self.encrypted_passphrase
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{KeyFlags, SystemCryptoContext};

    #[test]
    fn test_wrap_and_recover_passphrase() {
        let ctx = SystemCryptoContext;
        let recipient = KeyPair::generate(&ctx).unwrap();
        let passphrase = Passphrase::generate(&ctx).unwrap();

        let wrapped = WrappedPassphrase::wrap(&ctx, &passphrase, &recipient).unwrap();
        assert_ne!(wrapped.encrypted_passphrase(), passphrase.bytes());

        let recovered = wrapped.recover(&recipient.unlock().unwrap()).unwrap();
        assert_eq!(recovered, passphrase);
    }

    #[test]
    fn test_any_passphrase_is_accepted() {
        let ctx = SystemCryptoContext;
        let recipient = KeyPair::generate(&ctx).unwrap();

        for bytes in [vec![], vec![7u8], b"correct horse battery staple".to_vec()] {
            let passphrase = Passphrase::from(bytes);
            let wrapped = WrappedPassphrase::wrap(&ctx, &passphrase, &recipient).unwrap();
            let recovered = wrapped.recover(&recipient.unlock().unwrap()).unwrap();
            assert_eq!(recovered, passphrase);
        }
    }

    #[test]
    fn test_only_recipient_recovers() {
        let ctx = SystemCryptoContext;
        let recipient = KeyPair::generate(&ctx).unwrap();
        let outsider = KeyPair::generate(&ctx).unwrap();
        let passphrase = Passphrase::generate(&ctx).unwrap();

        let wrapped = WrappedPassphrase::wrap(&ctx, &passphrase, &recipient).unwrap();
        assert!(wrapped.recover(&outsider.unlock().unwrap()).is_err());
    }

    #[test]
    fn test_inactive_recipient_rejected() {
        let ctx = SystemCryptoContext;
        let recipient = KeyPair::generate(&ctx).unwrap().with_flags(KeyFlags {
            active: false,
            ..KeyFlags::default()
        });
        let passphrase = Passphrase::generate(&ctx).unwrap();
        assert!(WrappedPassphrase::wrap(&ctx, &passphrase, &recipient).is_err());
    }
}
