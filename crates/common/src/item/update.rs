use crate::codec::{ContentCodec, ItemContents};
use crate::crypto::CryptoContext;
use crate::error::Result;
use crate::keys::{AddressKey, ItemKey, KeyPacket, VaultKey};
use crate::requests::UpdateItemRequest;

use super::{check_item_key_rotation, check_key_packet_rotation, seal};

/// Build the request that replaces an item's content
///
/// The session key is recovered from the item's existing `key_packet`, so
/// the server keeps a single key packet per item and rotation.
/// `last_revision` is echoed untouched; revision tracking belongs to the
/// caller.
///
/// # Errors
///
/// `key_packet` must have been issued for `vault_key`'s rotation. A packet
/// from another rotation fails with
/// [`CryptoError::RotationMismatch`](crate::error::CryptoError::RotationMismatch)
/// rather than being re-wrapped silently; re-keying after a rotation is
/// the caller's decision.
#[allow(clippy::too_many_arguments)]
pub fn update_item(
    ctx: &dyn CryptoContext,
    codec: &dyn ContentCodec,
    vault_key: &VaultKey,
    item_key: &ItemKey,
    address_key: &AddressKey,
    key_packet: &KeyPacket,
    last_revision: u64,
    contents: &ItemContents,
) -> Result<UpdateItemRequest> {
    check_key_packet_rotation(vault_key, key_packet)?;
    check_item_key_rotation(vault_key, item_key)?;

    let session_key = vault_key.with_private_key(|key| key_packet.key_packet.recover(key))?;
    let serialized = codec.encode_item(contents)?;
    let sealed = seal(ctx, &session_key, &serialized, item_key, address_key)?;
    tracing::debug!(
        rotation = %vault_key.rotation_id(),
        last_revision,
        "sealed item update"
    );

    Ok(UpdateItemRequest {
        content: sealed.content,
        item_key_signature: sealed.item_key_signature,
        user_signature: sealed.user_signature,
        rotation_id: vault_key.rotation_id().clone(),
        last_revision,
    })
}
