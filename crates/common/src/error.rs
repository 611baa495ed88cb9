//! Error types for the vault and item protocols.

use crate::codec::CodecError;
use crate::crypto::{KeyError, KeyPacketError, SessionKeyError, SignatureError};
use crate::keys::RotationId;

/// Failure of a write-path protocol step (vault creation, item create or
/// update). Every variant aborts the whole call; no request is returned.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Entropy or backend failure while creating keys or session keys
    #[error("key generation failed: {0}")]
    KeyGeneration(#[from] KeyError),

    /// A passphrase or session key could not be wrapped or unwrapped
    #[error("wrapping failed: {0}")]
    Wrapping(KeyPacketError),

    /// A signature could not be produced
    #[error("signing failed: {0}")]
    Signing(#[from] SignatureError),

    /// The injected content serializer failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] CodecError),

    /// The supplied key packet was made for another vault key rotation
    #[error("key packet belongs to rotation {found}, vault key is at rotation {expected}")]
    RotationMismatch {
        expected: RotationId,
        found: RotationId,
    },
}

impl From<SessionKeyError> for CryptoError {
    fn from(err: SessionKeyError) -> Self {
        CryptoError::KeyGeneration(KeyError::Session(err))
    }
}

impl From<KeyPacketError> for CryptoError {
    fn from(err: KeyPacketError) -> Self {
        // running out of entropy mid-wrap is still a key generation failure
        match err {
            KeyPacketError::Context(e) => CryptoError::KeyGeneration(KeyError::Context(e)),
            KeyPacketError::Session(SessionKeyError::Context(e)) => {
                CryptoError::KeyGeneration(KeyError::Context(e))
            }
            other => CryptoError::Wrapping(other),
        }
    }
}

/// Failure while reading back a request: decoding, unwrapping,
/// decrypting or verifying.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("base64 decode error: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("key packet error: {0}")]
    KeyPacket(#[from] KeyPacketError),

    #[error("decryption error: {0}")]
    Decryption(#[from] SessionKeyError),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("content decode error: {0}")]
    Codec(#[from] CodecError),

    #[error("key packet belongs to rotation {found}, vault key is at rotation {expected}")]
    RotationMismatch {
        expected: RotationId,
        found: RotationId,
    },
}

/// Result type alias for write-path protocol operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::ContextError;

    #[test]
    fn test_entropy_failure_while_wrapping_is_key_generation() {
        let err: CryptoError = KeyPacketError::Session(SessionKeyError::Context(
            ContextError::Default(anyhow::anyhow!("no entropy")),
        ))
        .into();
        assert!(matches!(err, CryptoError::KeyGeneration(KeyError::Context(_))));

        let err: CryptoError = KeyPacketError::NotEncryptionCapable("ab".into()).into();
        assert!(matches!(err, CryptoError::Wrapping(_)));
    }
}
