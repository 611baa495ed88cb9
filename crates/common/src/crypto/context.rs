//! Randomness capability threaded through every key-generating call
//!
//! Nothing in this crate reaches for an ambient RNG. Callers hand a
//! [`CryptoContext`] to each operation that needs fresh key material,
//! nonces or passphrases, which keeps the protocols pure functions of
//! their explicit inputs.

/// Errors raised by a randomness source
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("entropy source failure: {0}")]
    Entropy(#[from] getrandom::Error),
    #[error("context error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A source of cryptographically secure randomness.
///
/// Implementations must be safe to share across threads, since key
/// generation for different vaults may run in parallel.
pub trait CryptoContext: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ContextError>;
}

/// Draws randomness from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCryptoContext;

impl CryptoContext for SystemCryptoContext {
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ContextError> {
        getrandom::getrandom(dest)?;
        Ok(())
    }
}

/// Draw a fixed-size array of random bytes from `ctx`.
pub(crate) fn random_bytes<const N: usize>(
    ctx: &dyn CryptoContext,
) -> Result<[u8; N], ContextError> {
    let mut buff = [0u8; N];
    ctx.fill_random(&mut buff)?;
    Ok(buff)
}
