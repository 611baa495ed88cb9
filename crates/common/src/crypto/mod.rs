//! Cryptographic primitives for Keyward
//!
//! This module provides the building blocks of the vault key hierarchy:
//!
//! - **Keypairs**: Ed25519 keypairs whose private half is locked under a
//!   random passphrase ([`KeyPair`]); decrypted only inside a scoped
//!   [`UnlockedKey`]
//! - **Session keys**: ChaCha20-Poly1305 keys minted per payload ([`SessionKey`])
//! - **Key packets**: session keys wrapped to a recipient with X25519 ECDH
//!   and AES-KW ([`WrappedSessionKey`])
//! - **Passphrase wrapping**: a keypair's passphrase sealed for one
//!   recipient ([`WrappedPassphrase`])
//! - **Signatures**: armored fingerprint signatures for the trust chain and
//!   encrypted payload signatures for content
//!
//! # Security Model
//!
//! ## Passphrases
//! Every private key is stored encrypted under its passphrase, and every
//! passphrase is stored encrypted for a recipient key. Neither appears in
//! cleartext outside this crate.
//!
//! ## Session Keys
//! A session key lives for a single call. It leaves that call only wrapped
//! for a recipient public key.
//!
//! ## Randomness
//! All randomness comes from an explicitly passed [`CryptoContext`].

mod context;
mod key_packet;
mod keys;
mod passphrase;
mod session_key;
mod signature;

pub use context::{ContextError, CryptoContext, SystemCryptoContext};
pub use key_packet::{KeyPacketError, WrappedSessionKey, WRAPPED_SESSION_KEY_SIZE};
pub use keys::{
    Fingerprint, KeyError, KeyFlags, KeyPair, Passphrase, PublicKey, UnlockedKey,
    PASSPHRASE_SIZE, PUBLIC_KEY_SIZE,
};
pub use passphrase::WrappedPassphrase;
pub use session_key::{SessionKey, SessionKeyError, NONCE_SIZE, SESSION_KEY_SIZE};
pub use signature::{
    sign_fingerprint, sign_payload, verify_fingerprint, verify_payload, ArmoredSignature,
    SignatureError,
};
