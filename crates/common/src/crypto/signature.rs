//! Detached signatures for the trust chain and for encrypted payloads
//!
//! Two shapes are produced:
//!
//! - **Fingerprint signatures**: a signer vouches for another key by
//!   signing its fingerprint. The result is an armored detached signature.
//!   This builds the chain account -> signing key -> vault key / item key.
//! - **Payload signatures**: a signer signs plaintext content, and the
//!   detached signature is then encrypted under the session key that
//!   encrypts the content itself.
//!
//! Each shape signs under its own domain prefix, so a fingerprint
//! signature can never be replayed as a payload signature.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::CryptoContext;
use super::keys::{Fingerprint, KeyError, KeyPair, PublicKey};
use super::session_key::{SessionKey, SessionKeyError};

/// PEM tag used for armored detached signatures
pub const SIGNATURE_PEM_TAG: &str = "SIGNATURE";

const FINGERPRINT_DOMAIN: &[u8] = b"keyward fingerprint v1";
const PAYLOAD_DOMAIN: &[u8] = b"keyward payload v1";

/// Errors that can occur while signing or verifying
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session key error: {0}")]
    Session(#[from] SessionKeyError),
    #[error("key {0} is not allowed to sign")]
    NotSigningCapable(String),
    #[error("signature verification failed: {0}")]
    Verification(#[from] ed25519_dalek::SignatureError),
}

/// A detached signature in PEM armor
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArmoredSignature(String);

impl fmt::Debug for ArmoredSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArmoredSignature").field(&self.0).finish()
    }
}

impl fmt::Display for ArmoredSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArmoredSignature {
    fn from(armored: String) -> Self {
        ArmoredSignature(armored)
    }
}

impl ArmoredSignature {
    fn armor(signature: &ed25519_dalek::Signature) -> Self {
        let pem = pem::Pem::new(SIGNATURE_PEM_TAG, signature.to_bytes().to_vec());
        ArmoredSignature(pem::encode(&pem))
    }

    /// Parse the armor back into a raw signature
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM is malformed, carries the wrong tag, or
    /// does not hold exactly one signature.
    pub fn dearmor(&self) -> Result<ed25519_dalek::Signature, SignatureError> {
        let pem = pem::parse(&self.0).map_err(|e| anyhow::anyhow!("failed to parse PEM: {}", e))?;
        if pem.tag() != SIGNATURE_PEM_TAG {
            return Err(anyhow::anyhow!("invalid PEM tag, expected {}", SIGNATURE_PEM_TAG).into());
        }
        Ok(ed25519_dalek::Signature::from_slice(pem.contents())?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn domain_message(domain: &[u8], body: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(domain.len() + body.len());
    msg.extend_from_slice(domain);
    msg.extend_from_slice(body);
    msg
}

fn sign_with(signer: &KeyPair, msg: &[u8]) -> Result<ed25519_dalek::Signature, SignatureError> {
    if !signer.flags().can_sign() {
        return Err(SignatureError::NotSigningCapable(
            signer.fingerprint().to_hex(),
        ));
    }
    signer.with_private_key(|key| Ok(key.sign(msg)))
}

/// Sign the fingerprint of `key` with `signer`.
pub fn sign_fingerprint(
    key: &PublicKey,
    signer: &KeyPair,
) -> Result<ArmoredSignature, SignatureError> {
    let msg = domain_message(FINGERPRINT_DOMAIN, key.fingerprint().as_bytes());
    let signature = sign_with(signer, &msg)?;
    Ok(ArmoredSignature::armor(&signature))
}

/// Check that `signer` vouched for the key with fingerprint `fingerprint`.
pub fn verify_fingerprint(
    signature: &ArmoredSignature,
    fingerprint: &Fingerprint,
    signer: &PublicKey,
) -> Result<(), SignatureError> {
    let msg = domain_message(FINGERPRINT_DOMAIN, fingerprint.as_bytes());
    signer.verify(&msg, &signature.dearmor()?)?;
    Ok(())
}

/// Sign `payload` with `signer` and encrypt the detached signature under
/// `session_key`.
pub fn sign_payload(
    ctx: &dyn CryptoContext,
    payload: &[u8],
    session_key: &SessionKey,
    signer: &KeyPair,
) -> Result<Vec<u8>, SignatureError> {
    let msg = domain_message(PAYLOAD_DOMAIN, payload);
    let signature = sign_with(signer, &msg)?;
    Ok(session_key.encrypt(ctx, &signature.to_bytes())?)
}

/// Decrypt a payload signature with `session_key` and verify it against
/// `payload` and `signer`.
pub fn verify_payload(
    encrypted_signature: &[u8],
    payload: &[u8],
    session_key: &SessionKey,
    signer: &PublicKey,
) -> Result<(), SignatureError> {
    let raw = session_key.decrypt(encrypted_signature)?;
    let signature = ed25519_dalek::Signature::from_slice(&raw)?;
    let msg = domain_message(PAYLOAD_DOMAIN, payload);
    signer.verify(&msg, &signature)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::session_key::TAG_SIZE;
    use crate::crypto::{KeyFlags, SystemCryptoContext, NONCE_SIZE};

    #[test]
    fn test_fingerprint_signature_chain() {
        let ctx = SystemCryptoContext;
        let account = KeyPair::generate(&ctx).unwrap();
        let signing_key = KeyPair::generate(&ctx).unwrap();

        let signature = sign_fingerprint(signing_key.public_key(), &account).unwrap();
        assert!(signature.as_str().contains(SIGNATURE_PEM_TAG));

        verify_fingerprint(
            &signature,
            &signing_key.fingerprint(),
            account.public_key(),
        )
        .unwrap();

        // wrong signer
        assert!(verify_fingerprint(
            &signature,
            &signing_key.fingerprint(),
            signing_key.public_key()
        )
        .is_err());

        // wrong subject
        assert!(
            verify_fingerprint(&signature, &account.fingerprint(), account.public_key()).is_err()
        );
    }

    #[test]
    fn test_payload_signature_is_encrypted() {
        let ctx = SystemCryptoContext;
        let signer = KeyPair::generate(&ctx).unwrap();
        let session_key = SessionKey::generate(&ctx).unwrap();
        let payload = b"serialized item";

        let encrypted = sign_payload(&ctx, payload, &session_key, &signer).unwrap();
        assert_eq!(
            encrypted.len(),
            NONCE_SIZE + ed25519_dalek::SIGNATURE_LENGTH + TAG_SIZE
        );

        verify_payload(&encrypted, payload, &session_key, signer.public_key()).unwrap();
        assert!(
            verify_payload(&encrypted, b"other item", &session_key, signer.public_key()).is_err()
        );

        let other_session = SessionKey::generate(&ctx).unwrap();
        assert!(verify_payload(&encrypted, payload, &other_session, signer.public_key()).is_err());
    }

    #[test]
    fn test_domains_are_separated() {
        let ctx = SystemCryptoContext;
        let signer = KeyPair::generate(&ctx).unwrap();
        let subject = KeyPair::generate(&ctx).unwrap();
        let session_key = SessionKey::generate(&ctx).unwrap();

        // a payload signature over fingerprint bytes must not pass as a
        // fingerprint signature
        let fingerprint = subject.fingerprint();
        let encrypted = sign_payload(&ctx, fingerprint.as_bytes(), &session_key, &signer).unwrap();
        let raw = session_key.decrypt(&encrypted).unwrap();
        let signature = ed25519_dalek::Signature::from_slice(&raw).unwrap();
        let forged = ArmoredSignature::armor(&signature);
        assert!(verify_fingerprint(&forged, &fingerprint, signer.public_key()).is_err());
    }

    #[test]
    fn test_non_signing_key_rejected() {
        let ctx = SystemCryptoContext;
        let signer = KeyPair::generate(&ctx).unwrap().with_flags(KeyFlags {
            active: false,
            ..KeyFlags::default()
        });
        let subject = KeyPair::generate(&ctx).unwrap();

        let result = sign_fingerprint(subject.public_key(), &signer);
        assert!(matches!(result, Err(SignatureError::NotSigningCapable(_))));
    }

    #[test]
    fn test_dearmor_rejects_wrong_tag() {
        let ctx = SystemCryptoContext;
        let key_pair = KeyPair::generate(&ctx).unwrap();
        let not_a_signature = ArmoredSignature::from(key_pair.to_armored());
        assert!(not_a_signature.dearmor().is_err());
    }
}
