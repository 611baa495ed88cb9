use crate::codec::{ContentCodec, ItemContents};
use crate::crypto::{CryptoContext, SessionKey, WrappedSessionKey};
use crate::error::Result;
use crate::keys::{AddressKey, ItemKey, VaultKey};
use crate::requests::{encode, CreateItemRequest, CONTENT_FORMAT_VERSION};

use super::{check_item_key_rotation, seal};

/// Build the request that creates a new item in the vault of `vault_key`
///
/// The item gets a fresh session key wrapped to the vault key; the
/// returned request's `vault_key_packet` is what later updates reuse.
///
/// # Errors
///
/// Fails with [`CryptoError::RotationMismatch`](crate::error::CryptoError::RotationMismatch)
/// if `item_key` belongs to another rotation than `vault_key`. Any other
/// failing step aborts the call with its own error kind.
pub fn create_item(
    ctx: &dyn CryptoContext,
    codec: &dyn ContentCodec,
    vault_key: &VaultKey,
    item_key: &ItemKey,
    address_key: &AddressKey,
    contents: &ItemContents,
) -> Result<CreateItemRequest> {
    check_item_key_rotation(vault_key, item_key)?;
    let serialized = codec.encode_item(contents)?;

    let session_key = SessionKey::generate(ctx)?;
    let vault_key_packet = WrappedSessionKey::wrap_for(ctx, &session_key, vault_key)?;
    let sealed = seal(ctx, &session_key, &serialized, item_key, address_key)?;
    tracing::debug!(
        rotation = %vault_key.rotation_id(),
        item_key = %item_key.fingerprint(),
        address = address_key.address_id(),
        "sealed new item"
    );

    Ok(CreateItemRequest {
        content_format_version: CONTENT_FORMAT_VERSION,
        rotation_id: vault_key.rotation_id().clone(),
        labels: Vec::new(),
        content: sealed.content,
        vault_key_packet: encode(vault_key_packet.bytes()),
        item_key_signature: sealed.item_key_signature,
        user_signature: sealed.user_signature,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::BincodeCodec;
    use crate::crypto::{KeyFlags, KeyPair, SystemCryptoContext};
    use crate::error::CryptoError;
    use crate::keys::RotationId;
    use crate::testkit::{DryContext, FailingCodec};

    fn keys(ctx: &SystemCryptoContext) -> (VaultKey, ItemKey, AddressKey) {
        let vault_key = VaultKey::generate(ctx, RotationId::new("rot-1")).unwrap();
        let item_key = ItemKey::generate(ctx, &vault_key).unwrap();
        let address = AddressKey::new("addr", KeyPair::generate(ctx).unwrap());
        (vault_key, item_key, address)
    }

    #[test]
    fn test_create_item_fields() {
        let ctx = SystemCryptoContext;
        let (vault_key, item_key, address) = keys(&ctx);

        let request = create_item(
            &ctx,
            &BincodeCodec,
            &vault_key,
            &item_key,
            &address,
            &ItemContents::note("T", "N"),
        )
        .unwrap();

        assert_eq!(request.content_format_version, CONTENT_FORMAT_VERSION);
        assert_eq!(&request.rotation_id, vault_key.rotation_id());
        assert!(request.labels.is_empty());
        assert_ne!(request.item_key_signature, request.user_signature);
    }

    #[test]
    fn test_serializer_failure_is_propagated() {
        let ctx = SystemCryptoContext;
        let (vault_key, item_key, address) = keys(&ctx);

        let result = create_item(
            &ctx,
            &FailingCodec::new("schema rejected item"),
            &vault_key,
            &item_key,
            &address,
            &ItemContents::note("T", "N"),
        );
        match result {
            Err(CryptoError::Serialization(err)) => {
                assert!(err.to_string().contains("schema rejected item"));
            }
            other => panic!("expected serialization failure, got {other:?}"),
        }
    }

    #[test]
    fn test_entropy_failure_is_key_generation_error() {
        let ctx = SystemCryptoContext;
        let (vault_key, item_key, address) = keys(&ctx);

        let result = create_item(
            &DryContext,
            &BincodeCodec,
            &vault_key,
            &item_key,
            &address,
            &ItemContents::note("T", "N"),
        );
        assert!(matches!(result, Err(CryptoError::KeyGeneration(_))));
    }

    #[test]
    fn test_inactive_address_key_cannot_sign() {
        let ctx = SystemCryptoContext;
        let (vault_key, item_key, _) = keys(&ctx);
        let address = AddressKey::new(
            "addr",
            KeyPair::generate(&ctx).unwrap().with_flags(KeyFlags {
                active: false,
                ..KeyFlags::default()
            }),
        );

        let result = create_item(
            &ctx,
            &BincodeCodec,
            &vault_key,
            &item_key,
            &address,
            &ItemContents::note("T", "N"),
        );
        assert!(matches!(result, Err(CryptoError::Signing(_))));
    }

    #[test]
    fn test_item_key_from_other_rotation_rejected() {
        let ctx = SystemCryptoContext;
        let (vault_key, _, address) = keys(&ctx);
        let stale_key = KeyPair::generate(&ctx).unwrap();
        let stale = ItemKey::from_parts(RotationId::new("rot-0"), stale_key);

        let result = create_item(
            &ctx,
            &BincodeCodec,
            &vault_key,
            &stale,
            &address,
            &ItemContents::note("T", "N"),
        );
        assert!(matches!(result, Err(CryptoError::RotationMismatch { .. })));
    }
}
