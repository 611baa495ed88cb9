use crate::codec::{ContentCodec, VaultMetadata};
use crate::crypto::{verify_fingerprint, KeyPacketError, KeyPair, Passphrase, WrappedPassphrase};
use crate::error::OpenError;
use crate::keys::{AddressKey, ItemKey, RotationId, SigningKey, VaultKey};
use crate::requests::{decode, decode_packet, decode_passphrase, CreateVaultRequest};

/// A vault recovered from its creation request, with every key unlocked
/// and the trust chain checked.
#[derive(Debug)]
pub struct OpenedVault {
    pub signing_key: SigningKey,
    pub vault_key: VaultKey,
    pub item_key: ItemKey,
    pub metadata: VaultMetadata,
}

fn recover_passphrase(
    wrapped: &WrappedPassphrase,
    recipient: &KeyPair,
) -> Result<Passphrase, KeyPacketError> {
    recipient.with_private_key(|key| wrapped.recover(key))
}

/// Recover a vault's keys and metadata as seen by `address_key`
///
/// Checks that the account vouched for the signing key, and that the
/// signing key vouched for both the vault key and the item key, before
/// trusting any of them.
pub fn open_vault(
    codec: &dyn ContentCodec,
    request: &CreateVaultRequest,
    address_key: &AddressKey,
    rotation_id: RotationId,
) -> Result<OpenedVault, OpenError> {
    let signing_passphrase = decode_passphrase(
        &request.signing_key_passphrase,
        &request.signing_key_passphrase_key_packet,
    )?;
    let signing_key = SigningKey::from(KeyPair::from_armored(
        &request.signing_key,
        recover_passphrase(&signing_passphrase, address_key)?,
    )?);
    verify_fingerprint(
        &request.acceptance_signature,
        &signing_key.fingerprint(),
        address_key.public_key(),
    )?;

    let vault_passphrase = decode_passphrase(&request.vault_key_passphrase, &request.key_packet)?;
    let vault_key = VaultKey::from_parts(
        rotation_id.clone(),
        KeyPair::from_armored(
            &request.vault_key,
            recover_passphrase(&vault_passphrase, address_key)?,
        )?,
    );
    verify_fingerprint(
        &request.vault_key_signature,
        &vault_key.fingerprint(),
        signing_key.public_key(),
    )?;

    let item_passphrase = decode_passphrase(
        &request.item_key_passphrase,
        &request.item_key_passphrase_key_packet,
    )?;
    let item_key = ItemKey::from_parts(
        rotation_id,
        KeyPair::from_armored(
            &request.item_key,
            recover_passphrase(&item_passphrase, &vault_key)?,
        )?,
    );
    verify_fingerprint(
        &request.item_key_signature,
        &item_key.fingerprint(),
        signing_key.public_key(),
    )?;

    let vault_key_packet = decode_packet(&request.vault_key_packet)?;
    let session_key = vault_key.with_private_key(|key| vault_key_packet.recover(key))?;
    let serialized = session_key.decrypt(&decode(&request.content)?)?;
    let metadata = codec.decode_vault(&serialized)?;

    Ok(OpenedVault {
        signing_key,
        vault_key,
        item_key,
        metadata,
    })
}
