use crate::codec::{ContentCodec, ItemContents};
use crate::crypto::{verify_payload, PublicKey};
use crate::error::OpenError;
use crate::keys::{KeyPacket, VaultKey};
use crate::requests::decode;

use super::SealedItem;

/// Decrypt an item and verify both of its signatures
///
/// `item_key` is the vault's item key for the packet's rotation and
/// `author` the address key of whoever wrote this revision. Content is only
/// decoded once both signatures verify.
pub fn open_item(
    codec: &dyn ContentCodec,
    sealed: &SealedItem,
    key_packet: &KeyPacket,
    vault_key: &VaultKey,
    item_key: &PublicKey,
    author: &PublicKey,
) -> Result<ItemContents, OpenError> {
    if &key_packet.rotation_id != vault_key.rotation_id() {
        return Err(OpenError::RotationMismatch {
            expected: vault_key.rotation_id().clone(),
            found: key_packet.rotation_id.clone(),
        });
    }

    let session_key = vault_key.with_private_key(|key| key_packet.key_packet.recover(key))?;
    let serialized = session_key.decrypt(&decode(&sealed.content)?)?;

    verify_payload(
        &decode(&sealed.item_key_signature)?,
        &serialized,
        &session_key,
        item_key,
    )?;
    verify_payload(
        &decode(&sealed.user_signature)?,
        &serialized,
        &session_key,
        author,
    )?;

    Ok(codec.decode_item(&serialized)?)
}
