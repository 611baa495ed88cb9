//! Fixtures for exercising protocol failure paths

use crate::codec::{CodecError, ContentCodec, ItemContents, VaultMetadata};
use crate::crypto::{ContextError, CryptoContext};

/// A codec whose every call fails with `message`.
pub(crate) struct FailingCodec {
    pub message: &'static str,
}

impl FailingCodec {
    pub fn new(message: &'static str) -> Self {
        FailingCodec { message }
    }

    fn fail(&self) -> CodecError {
        anyhow::anyhow!(self.message).into()
    }
}

impl ContentCodec for FailingCodec {
    fn encode_item(&self, _: &ItemContents) -> Result<Vec<u8>, CodecError> {
        Err(self.fail())
    }

    fn decode_item(&self, _: &[u8]) -> Result<ItemContents, CodecError> {
        Err(self.fail())
    }

    fn encode_vault(&self, _: &VaultMetadata) -> Result<Vec<u8>, CodecError> {
        Err(self.fail())
    }

    fn decode_vault(&self, _: &[u8]) -> Result<VaultMetadata, CodecError> {
        Err(self.fail())
    }
}

/// A randomness source that has run dry.
pub(crate) struct DryContext;

impl CryptoContext for DryContext {
    fn fill_random(&self, _: &mut [u8]) -> Result<(), ContextError> {
        Err(anyhow::anyhow!("entropy pool exhausted").into())
    }
}
