//! Vault creation
//!
//! A new vault is a single request carrying three locked keypairs, their
//! wrapped passphrases, the trust chain over them and the encrypted vault
//! metadata:
//!
//! ```text
//! account --acceptanceSignature--> signing key
//!                                     |--vaultKeySignature--> vault key
//!                                     `--itemKeySignature---> item key
//! ```
//!
//! [`open_vault`] walks the same chain in reverse to recover the keys.

mod create;
mod open;

pub use create::create_vault;
pub use open::{open_vault, OpenedVault};
