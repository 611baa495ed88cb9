/**
 * Cryptographic types and operations.
 *  - Passphrase-locked keypairs and per-payload session keys
 *  - Session key and passphrase wrapping
 *  - Fingerprint and payload signatures
 */
pub mod crypto;
/**
 * The serializer seam: item and vault payload schemas
 *  and the codec that turns them into opaque bytes.
 */
pub mod codec;
/**
 * Error types returned by the write and read paths.
 */
pub mod error;
/**
 * The vault key hierarchy: signing, vault, item
 *  and account address keys, plus rotations and key packets.
 */
pub mod keys;
/**
 * Wire request records, already base64 encoded
 *  and ready for the networking layer.
 */
pub mod requests;
/**
 * Item create/update protocols and the matching
 *  decrypt-and-verify read path.
 */
pub mod item;
/**
 * Vault creation protocol and its read path.
 */
pub mod vault;

#[cfg(test)]
pub(crate) mod testkit;

pub mod prelude {
    pub use crate::codec::{BincodeCodec, ContentCodec, ItemContents, VaultMetadata};
    pub use crate::crypto::{CryptoContext, KeyPair, SystemCryptoContext};
    pub use crate::error::{CryptoError, OpenError};
    pub use crate::item::{create_item, open_item, update_item, SealedItem};
    pub use crate::keys::{AddressKey, ItemKey, KeyPacket, RotationId, SigningKey, VaultKey};
    pub use crate::requests::{
        CreateItemRequest, CreateVaultRequest, UpdateItemRequest, CONTENT_FORMAT_VERSION,
    };
    pub use crate::vault::{create_vault, open_vault, OpenedVault};
}
