//! Wire request records
//!
//! Binary fields are standard base64 (padded). Trust-chain signatures are
//! armored; payload signatures are encrypted bytes and therefore base64.
//! Keys travel in their armored locked form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::{ArmoredSignature, WrappedPassphrase, WrappedSessionKey};
use crate::error::OpenError;
use crate::keys::{KeyPacket, RotationId};

/// Content format emitted on every item creation.
pub const CONTENT_FORMAT_VERSION: u32 = 1;

pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode(encoded: &str) -> Result<Vec<u8>, OpenError> {
    Ok(STANDARD.decode(encoded)?)
}

pub(crate) fn decode_packet(encoded: &str) -> Result<WrappedSessionKey, OpenError> {
    Ok(WrappedSessionKey::try_from(decode(encoded)?.as_slice())?)
}

pub(crate) fn decode_passphrase(
    encrypted: &str,
    key_packet: &str,
) -> Result<WrappedPassphrase, OpenError> {
    Ok(WrappedPassphrase::from_parts(
        decode_packet(key_packet)?,
        decode(encrypted)?,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVaultRequest {
    pub signing_key: String,
    pub signing_key_passphrase: String,
    pub signing_key_passphrase_key_packet: String,
    pub acceptance_signature: ArmoredSignature,
    pub vault_key: String,
    pub vault_key_signature: ArmoredSignature,
    pub vault_key_passphrase: String,
    pub key_packet: String,
    pub item_key: String,
    pub item_key_signature: ArmoredSignature,
    pub item_key_passphrase: String,
    pub item_key_passphrase_key_packet: String,
    pub vault_key_packet: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemRequest {
    pub content_format_version: u32,
    pub rotation_id: RotationId,
    pub labels: Vec<String>,
    pub content: String,
    pub vault_key_packet: String,
    pub item_key_signature: String,
    pub user_signature: String,
}

impl CreateItemRequest {
    /// The key packet a later update of this item must reuse.
    pub fn key_packet(&self) -> Result<KeyPacket, OpenError> {
        Ok(KeyPacket {
            rotation_id: self.rotation_id.clone(),
            key_packet: decode_packet(&self.vault_key_packet)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemRequest {
    pub content: String,
    pub item_key_signature: String,
    pub user_signature: String,
    pub rotation_id: RotationId,
    pub last_revision: u64,
}
