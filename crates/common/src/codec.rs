//! Item and vault payload schemas, and the serializer seam
//!
//! The protocols never look inside a payload. They ask a [`ContentCodec`]
//! for opaque bytes and encrypt those. [`BincodeCodec`] is the default
//! implementation; callers owning a richer schema plug in their own.

use serde::{Deserialize, Serialize};

/// Errors raised by a content codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("codec error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Type-tagged item payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemContents {
    Note {
        title: String,
        note: String,
    },
    Login {
        title: String,
        note: String,
        username: String,
        password: String,
        urls: Vec<String>,
    },
    Alias {
        title: String,
        note: String,
        alias_email: String,
    },
}

impl ItemContents {
    pub fn note(title: impl Into<String>, note: impl Into<String>) -> Self {
        ItemContents::Note {
            title: title.into(),
            note: note.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ItemContents::Note { title, .. }
            | ItemContents::Login { title, .. }
            | ItemContents::Alias { title, .. } => title,
        }
    }

    pub fn note_text(&self) -> &str {
        match self {
            ItemContents::Note { note, .. }
            | ItemContents::Login { note, .. }
            | ItemContents::Alias { note, .. } => note,
        }
    }
}

/// Vault metadata encrypted into the vault's `content` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMetadata {
    pub name: String,
    pub description: String,
}

impl VaultMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        VaultMetadata {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Turns item and vault payloads into opaque bytes and back.
pub trait ContentCodec: Send + Sync {
    fn encode_item(&self, contents: &ItemContents) -> Result<Vec<u8>, CodecError>;
    fn decode_item(&self, bytes: &[u8]) -> Result<ItemContents, CodecError>;
    fn encode_vault(&self, metadata: &VaultMetadata) -> Result<Vec<u8>, CodecError>;
    fn decode_vault(&self, bytes: &[u8]) -> Result<VaultMetadata, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl ContentCodec for BincodeCodec {
    fn encode_item(&self, contents: &ItemContents) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(contents)?)
    }

    fn decode_item(&self, bytes: &[u8]) -> Result<ItemContents, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn encode_vault(&self, metadata: &VaultMetadata) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(metadata)?)
    }

    fn decode_vault(&self, bytes: &[u8]) -> Result<VaultMetadata, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_item_variants_survive_codec() {
        let codec = BincodeCodec;
        let items = vec![
            ItemContents::note("T", "N"),
            ItemContents::Login {
                title: "bank".to_string(),
                note: String::new(),
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                urls: vec!["https://bank.example".to_string()],
            },
            ItemContents::Alias {
                title: "newsletter".to_string(),
                note: "spam goes here".to_string(),
                alias_email: "news.x1@alias.example".to_string(),
            },
        ];

        for item in items {
            let bytes = codec.encode_item(&item).unwrap();
            assert_eq!(codec.decode_item(&bytes).unwrap(), item);
        }
    }

    #[test]
    fn test_accessors() {
        let item = ItemContents::note("T", "N");
        assert_eq!(item.title(), "T");
        assert_eq!(item.note_text(), "N");
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let codec = BincodeCodec;
        assert!(codec.decode_vault(&[0xFF; 3]).is_err());
    }
}
