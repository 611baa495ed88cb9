//! Shared test utilities for the vault and item protocol tests
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::crypto::{KeyPair, SessionKey, SystemCryptoContext};
use common::keys::{AddressKey, ItemKey, KeyPacket, RotationId, VaultKey};

/// Everything an item write needs: a vault key, its item key and the
/// author's address key.
pub struct TestVault {
    pub ctx: SystemCryptoContext,
    pub vault_key: VaultKey,
    pub item_key: ItemKey,
    pub address_key: AddressKey,
}

/// Install a fmt subscriber once; honours RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up a fresh vault key, item key and address key at `rotation`
pub fn setup_test_vault(rotation: &str) -> TestVault {
    init_tracing();
    let ctx = SystemCryptoContext;
    let vault_key = VaultKey::generate(&ctx, RotationId::new(rotation)).unwrap();
    let item_key = ItemKey::generate(&ctx, &vault_key).unwrap();
    let address_key = AddressKey::new("address-1", KeyPair::generate(&ctx).unwrap());
    TestVault {
        ctx,
        vault_key,
        item_key,
        address_key,
    }
}

pub fn b64(encoded: &str) -> Vec<u8> {
    STANDARD.decode(encoded).unwrap()
}

/// Recover an item's session key the way a reader holding the vault key would.
pub fn recover_session_key(vault_key: &VaultKey, key_packet: &KeyPacket) -> SessionKey {
    vault_key
        .with_private_key(|key| key_packet.key_packet.recover(key))
        .unwrap()
}
