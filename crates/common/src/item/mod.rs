//! Item creation and update
//!
//! Item content is encrypted under a per-item [`SessionKey`] wrapped to the
//! vault key. The plaintext is signed twice, once by the vault's item key
//! and once by the author's address key, and both signatures are encrypted
//! under the same session key:
//!
//! ```text
//! content           = Enc(session_key, serialized)
//! vaultKeyPacket    = Wrap(vault_key.public, session_key)
//! itemKeySignature  = Enc(session_key, Sign(item_key, serialized))
//! userSignature     = Enc(session_key, Sign(address_key, serialized))
//! ```
//!
//! Updates reuse the session key behind the item's existing [`KeyPacket`].

mod create;
mod open;
mod update;

pub use create::create_item;
pub use open::open_item;
pub use update::update_item;

use crate::crypto::{sign_payload, CryptoContext, SessionKey};
use crate::error::{CryptoError, Result};
use crate::keys::{AddressKey, ItemKey, KeyPacket, VaultKey};
use crate::requests::{encode, CreateItemRequest, UpdateItemRequest};

/// The three encrypted fields shared by create and update requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedItem {
    pub content: String,
    pub item_key_signature: String,
    pub user_signature: String,
}

impl From<&CreateItemRequest> for SealedItem {
    fn from(request: &CreateItemRequest) -> Self {
        SealedItem {
            content: request.content.clone(),
            item_key_signature: request.item_key_signature.clone(),
            user_signature: request.user_signature.clone(),
        }
    }
}

impl From<&UpdateItemRequest> for SealedItem {
    fn from(request: &UpdateItemRequest) -> Self {
        SealedItem {
            content: request.content.clone(),
            item_key_signature: request.item_key_signature.clone(),
            user_signature: request.user_signature.clone(),
        }
    }
}

/// Encrypt and doubly sign `serialized` under `session_key`.
fn seal(
    ctx: &dyn CryptoContext,
    session_key: &SessionKey,
    serialized: &[u8],
    item_key: &ItemKey,
    address_key: &AddressKey,
) -> Result<SealedItem> {
    let content = session_key.encrypt(ctx, serialized)?;
    let item_key_signature = sign_payload(ctx, serialized, session_key, item_key)?;
    let user_signature = sign_payload(ctx, serialized, session_key, address_key)?;
    Ok(SealedItem {
        content: encode(&content),
        item_key_signature: encode(&item_key_signature),
        user_signature: encode(&user_signature),
    })
}

/// The item key must belong to the vault key's current rotation.
fn check_item_key_rotation(vault_key: &VaultKey, item_key: &ItemKey) -> Result<()> {
    if item_key.rotation_id() != vault_key.rotation_id() {
        return Err(CryptoError::RotationMismatch {
            expected: vault_key.rotation_id().clone(),
            found: item_key.rotation_id().clone(),
        });
    }
    Ok(())
}

/// An update may only reuse a key packet of the vault key's current rotation.
fn check_key_packet_rotation(vault_key: &VaultKey, key_packet: &KeyPacket) -> Result<()> {
    if &key_packet.rotation_id != vault_key.rotation_id() {
        return Err(CryptoError::RotationMismatch {
            expected: vault_key.rotation_id().clone(),
            found: key_packet.rotation_id.clone(),
        });
    }
    Ok(())
}
