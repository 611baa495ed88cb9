//! # Vault key hierarchy
//!
//! Every vault owns three kinds of keypairs, each a [`KeyPair`] with its own
//! passphrase:
//!
//! - **[`SigningKey`]**: vouches for the vault's other keys by signing their
//!   fingerprints. It is itself vouched for by the creating account.
//! - **[`VaultKey`]**: receives the session keys of vault and item content.
//!   Tagged with a [`RotationId`].
//! - **[`ItemKey`]**: signs item content on behalf of the vault. Bound to one
//!   vault key rotation.
//!
//! The account side is represented by an [`AddressKey`].
//!
//! ## Passphrase Custody
//!
//! ```text
//! AddressKey --wraps--> SigningKey passphrase
//!            --wraps--> VaultKey passphrase --wraps--> ItemKey passphrase
//! ```

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoContext, KeyError, KeyPair, WrappedSessionKey};

/// Rotation assigned to the first vault key of a new vault.
pub const INITIAL_ROTATION_ID: &str = "1";

/// Identifies one generation of a vault key. Opaque and server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationId(String);

impl RotationId {
    pub fn new(id: impl Into<String>) -> Self {
        RotationId(id.into())
    }

    pub fn initial() -> Self {
        RotationId(INITIAL_ROTATION_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vault-scoped key whose only job is signing the other vault keys.
#[derive(Debug)]
pub struct SigningKey(KeyPair);

impl Deref for SigningKey {
    type Target = KeyPair;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<KeyPair> for SigningKey {
    fn from(key: KeyPair) -> Self {
        SigningKey(key)
    }
}

impl SigningKey {
    pub fn generate(ctx: &dyn CryptoContext) -> Result<Self, KeyError> {
        Ok(SigningKey(KeyPair::generate(ctx)?))
    }
}

/// The vault's content-encryption key for one rotation.
#[derive(Debug)]
pub struct VaultKey {
    rotation_id: RotationId,
    key: KeyPair,
}

impl Deref for VaultKey {
    type Target = KeyPair;
    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl VaultKey {
    pub fn generate(ctx: &dyn CryptoContext, rotation_id: RotationId) -> Result<Self, KeyError> {
        Ok(VaultKey {
            rotation_id,
            key: KeyPair::generate(ctx)?,
        })
    }

    pub fn from_parts(rotation_id: RotationId, key: KeyPair) -> Self {
        VaultKey { rotation_id, key }
    }

    pub fn rotation_id(&self) -> &RotationId {
        &self.rotation_id
    }
}

/// Signs item content for the vault; bound to a vault key rotation.
#[derive(Debug)]
pub struct ItemKey {
    rotation_id: RotationId,
    key: KeyPair,
}

impl Deref for ItemKey {
    type Target = KeyPair;
    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl ItemKey {
    /// Generate an item key bound to `vault_key`'s rotation.
    pub fn generate(ctx: &dyn CryptoContext, vault_key: &VaultKey) -> Result<Self, KeyError> {
        Ok(ItemKey {
            rotation_id: vault_key.rotation_id().clone(),
            key: KeyPair::generate(ctx)?,
        })
    }

    pub fn from_parts(rotation_id: RotationId, key: KeyPair) -> Self {
        ItemKey { rotation_id, key }
    }

    pub fn rotation_id(&self) -> &RotationId {
        &self.rotation_id
    }
}

/// An account address keypair, used to sign content on behalf of the user
/// and to receive vault key passphrases.
#[derive(Debug)]
pub struct AddressKey {
    address_id: String,
    key: KeyPair,
}

impl Deref for AddressKey {
    type Target = KeyPair;
    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl AddressKey {
    pub fn new(address_id: impl Into<String>, key: KeyPair) -> Self {
        AddressKey {
            address_id: address_id.into(),
            key,
        }
    }

    pub fn address_id(&self) -> &str {
        &self.address_id
    }
}

/// An item's session key wrapped to the vault key of one rotation
///
/// Issued when the item is created and reused for every update while the
/// vault key rotation stays the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPacket {
    pub rotation_id: RotationId,
    pub key_packet: WrappedSessionKey,
}
