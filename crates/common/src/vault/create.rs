use crate::codec::{ContentCodec, VaultMetadata};
use crate::crypto::{
    sign_fingerprint, CryptoContext, KeyPair, SessionKey, WrappedPassphrase, WrappedSessionKey,
};
use crate::error::Result;
use crate::keys::{AddressKey, ItemKey, RotationId, SigningKey, VaultKey};
use crate::requests::{encode, CreateVaultRequest};

/// A passphrase wrapped for its recipient, split into the two wire fields.
struct WireWrappedPassphrase {
    passphrase: String,
    key_packet: String,
}

fn wrap_for_wire(
    ctx: &dyn CryptoContext,
    key: &KeyPair,
    recipient: &KeyPair,
) -> Result<WireWrappedPassphrase> {
    let wrapped = WrappedPassphrase::wrap(ctx, key.passphrase(), recipient)?;
    Ok(WireWrappedPassphrase {
        passphrase: encode(wrapped.encrypted_passphrase()),
        key_packet: encode(wrapped.key_packet().bytes()),
    })
}

/// Build the request that creates a new vault owned by `address_key`
///
/// Mints a signing key, a vault key at the initial rotation and an item
/// key, hands their passphrases to the right recipients, signs the trust
/// chain and encrypts `metadata` for the vault key.
///
/// # Errors
///
/// Any failing step aborts the call; no partial request is returned.
pub fn create_vault(
    ctx: &dyn CryptoContext,
    codec: &dyn ContentCodec,
    address_key: &AddressKey,
    metadata: &VaultMetadata,
) -> Result<CreateVaultRequest> {
    let signing_key = SigningKey::generate(ctx)?;
    let vault_key = VaultKey::generate(ctx, RotationId::initial())?;
    let item_key = ItemKey::generate(ctx, &vault_key)?;
    tracing::debug!(
        address = address_key.address_id(),
        signing_key = %signing_key.fingerprint(),
        vault_key = %vault_key.fingerprint(),
        item_key = %item_key.fingerprint(),
        "generated vault keys"
    );

    let signing_passphrase = wrap_for_wire(ctx, &signing_key, address_key)?;
    let vault_passphrase = wrap_for_wire(ctx, &vault_key, address_key)?;
    let item_passphrase = wrap_for_wire(ctx, &item_key, &vault_key)?;

    let acceptance_signature = sign_fingerprint(signing_key.public_key(), address_key)?;
    let vault_key_signature = sign_fingerprint(vault_key.public_key(), &signing_key)?;
    let item_key_signature = sign_fingerprint(item_key.public_key(), &signing_key)?;

    let serialized = codec.encode_vault(metadata)?;
    let session_key = SessionKey::generate(ctx)?;
    let vault_key_packet = WrappedSessionKey::wrap_for(ctx, &session_key, &vault_key)?;
    let content = session_key.encrypt(ctx, &serialized)?;
    tracing::debug!(content_len = content.len(), "encrypted vault metadata");

    Ok(CreateVaultRequest {
        signing_key: signing_key.to_armored(),
        signing_key_passphrase: signing_passphrase.passphrase,
        signing_key_passphrase_key_packet: signing_passphrase.key_packet,
        acceptance_signature,
        vault_key: vault_key.to_armored(),
        vault_key_signature,
        vault_key_passphrase: vault_passphrase.passphrase,
        key_packet: vault_passphrase.key_packet,
        item_key: item_key.to_armored(),
        item_key_signature,
        item_key_passphrase: item_passphrase.passphrase,
        item_key_passphrase_key_packet: item_passphrase.key_packet,
        vault_key_packet: encode(vault_key_packet.bytes()),
        content: encode(&content),
    })
}
