use std::fmt;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::context::{random_bytes, ContextError, CryptoContext};
use super::session_key::{SessionKey, SessionKeyError};

/// Size of Ed25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of Ed25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of a key fingerprint in bytes
pub const FINGERPRINT_SIZE: usize = 32;
/// Size of a freshly generated private-key passphrase in bytes
pub const PASSPHRASE_SIZE: usize = 32;

/// PEM tag used when exporting a locked keypair
pub const LOCKED_KEY_PEM_TAG: &str = "LOCKED PRIVATE KEY";

const FINGERPRINT_VERSION: u8 = 0x01;
const PRIVATE_KEY_LOCK_CONTEXT: &str = "keyward 2024-06-01 private key lock v1";

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("randomness error: {0}")]
    Context(#[from] ContextError),
    #[error("session key error: {0}")]
    Session(#[from] SessionKeyError),
}

/// Public half of an Ed25519 keypair
///
/// Verifies signatures directly, and is converted to X25519 when a
/// session key has to be wrapped for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(VerifyingKey);

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey(key)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid public key size, expected {}, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        let key = VerifyingKey::from_bytes(&buff)
            .map_err(|_| anyhow::anyhow!("public key is not a valid edwards point"))?;
        Ok(PublicKey(key))
    }
}

impl PublicKey {
    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("public key hex decode error"))?;
        PublicKey::try_from(buff.as_slice())
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Convert public key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// SHA-256 fingerprint over a version byte and the public key bytes.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update([FINGERPRINT_VERSION]);
        hasher.update(self.to_bytes());
        Fingerprint(hasher.finalize().into())
    }

    /// Convert the Ed25519 point to its X25519 (Montgomery) form for ECDH
    ///
    /// # Errors
    ///
    /// Returns an error if the Ed25519 point cannot be decompressed.
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_x25519(&self) -> Result<X25519PublicKey, KeyError> {
        let edwards_point = CompressedEdwardsY::from_slice(&self.to_bytes())
            .map_err(|_| anyhow::anyhow!("public key invalid edwards point"))?
            .decompress()
            .ok_or_else(|| anyhow::anyhow!("public key failed to decompress edwards point"))?;
        Ok(X25519PublicKey::from(
            edwards_point.to_montgomery().to_bytes(),
        ))
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &ed25519_dalek::Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        self.0.verify_strict(msg, signature)
    }
}

/// Identifies a public key; this is what the trust chain signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Random bytes protecting a private key at rest
///
/// Any byte string is accepted; freshly generated passphrases are
/// `PASSPHRASE_SIZE` random bytes. The buffer is wiped on drop and never
/// printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(Vec<u8>);

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passphrase({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(bytes: Vec<u8>) -> Self {
        Passphrase(bytes)
    }
}

impl Passphrase {
    /// Generate a new random passphrase
    pub fn generate(ctx: &dyn CryptoContext) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(random_bytes::<PASSPHRASE_SIZE>(ctx)?);
        Ok(Passphrase(bytes.to_vec()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    fn lock_key(&self) -> SessionKey {
        SessionKey::from(blake3::derive_key(PRIVATE_KEY_LOCK_CONTEXT, &self.0))
    }
}

/// Capability flags carried by every keypair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFlags {
    pub active: bool,
    pub can_encrypt: bool,
    pub can_verify: bool,
}

impl Default for KeyFlags {
    fn default() -> Self {
        KeyFlags {
            active: true,
            can_encrypt: true,
            can_verify: true,
        }
    }
}

impl KeyFlags {
    /// A key may produce signatures only while active and verifiable.
    pub fn can_sign(&self) -> bool {
        self.active && self.can_verify
    }
}

/// An Ed25519 keypair whose private half is kept locked under a passphrase
///
/// The decrypted private key only exists inside an [`UnlockedKey`] lent to
/// the closure passed to [`KeyPair::with_private_key`].
///
/// # Examples
///
/// ```ignore
/// let ctx = SystemCryptoContext;
/// let key_pair = KeyPair::generate(&ctx)?;
/// let signature = key_pair.with_private_key(|key| Ok::<_, KeyError>(key.sign(b"msg")))?;
/// key_pair.public_key().verify(b"msg", &signature)?;
/// ```
pub struct KeyPair {
    public: PublicKey,
    locked_private: Vec<u8>,
    passphrase: Passphrase,
    is_primary: bool,
    flags: KeyFlags,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.public.fingerprint().to_hex())
            .field("is_primary", &self.is_primary)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new keypair protected by a fresh random passphrase
    ///
    /// # Errors
    ///
    /// Fails if the randomness source fails; the error is not retried.
    pub fn generate(ctx: &dyn CryptoContext) -> Result<Self, KeyError> {
        let seed = Zeroizing::new(random_bytes::<PRIVATE_KEY_SIZE>(ctx)?);
        let signing_key = SigningKey::from_bytes(&seed);
        let passphrase = Passphrase::generate(ctx)?;
        let locked_private = passphrase.lock_key().encrypt(ctx, seed.as_slice())?;

        Ok(KeyPair {
            public: signing_key.verifying_key().into(),
            locked_private,
            passphrase,
            is_primary: true,
            flags: KeyFlags::default(),
        })
    }

    /// Rebuild a keypair from its armored locked form and its passphrase
    ///
    /// The passphrase is checked by unlocking the key once.
    pub fn from_armored(armored: &str, passphrase: Passphrase) -> Result<Self, KeyError> {
        let pem = pem::parse(armored).map_err(|e| anyhow::anyhow!("failed to parse PEM: {}", e))?;
        if pem.tag() != LOCKED_KEY_PEM_TAG {
            return Err(anyhow::anyhow!("invalid PEM tag, expected {}", LOCKED_KEY_PEM_TAG).into());
        }
        let contents = pem.contents();
        if contents.len() <= PUBLIC_KEY_SIZE {
            return Err(anyhow::anyhow!("locked key too short").into());
        }

        let key_pair = KeyPair {
            public: PublicKey::try_from(&contents[..PUBLIC_KEY_SIZE])?,
            locked_private: contents[PUBLIC_KEY_SIZE..].to_vec(),
            passphrase,
            is_primary: true,
            flags: KeyFlags::default(),
        };
        key_pair.unlock()?;
        Ok(key_pair)
    }

    /// Export the public key and the locked private key as PEM.
    ///
    /// The passphrase is not part of the export.
    pub fn to_armored(&self) -> String {
        let mut contents = Vec::with_capacity(PUBLIC_KEY_SIZE + self.locked_private.len());
        contents.extend_from_slice(&self.public.to_bytes());
        contents.extend_from_slice(&self.locked_private);
        pem::encode(&pem::Pem::new(LOCKED_KEY_PEM_TAG, contents))
    }

    pub fn with_flags(mut self, flags: KeyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.public.fingerprint()
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn flags(&self) -> KeyFlags {
        self.flags
    }

    /// The passphrase never leaves the crate in cleartext; protocols
    /// wrap it before it reaches a request.
    pub(crate) fn passphrase(&self) -> &Passphrase {
        &self.passphrase
    }

    /// Decrypt the private key into a guard that wipes it when dropped.
    ///
    /// Crate-internal; callers outside go through [`KeyPair::with_private_key`].
    ///
    /// # Errors
    ///
    /// Returns an error if the passphrase does not open the locked key, or
    /// the opened key does not match the stored public key.
    pub(crate) fn unlock(&self) -> Result<UnlockedKey, KeyError> {
        let seed = Zeroizing::new(self.passphrase.lock_key().decrypt(&self.locked_private)?);
        if seed.len() != PRIVATE_KEY_SIZE {
            return Err(anyhow::anyhow!("unlocked private key has wrong size").into());
        }
        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        bytes.copy_from_slice(&seed);

        let signing_key = SigningKey::from_bytes(&bytes);
        if PublicKey::from(signing_key.verifying_key()) != self.public {
            return Err(anyhow::anyhow!("private key does not match public key").into());
        }
        Ok(UnlockedKey(signing_key))
    }

    /// Run `block` with the decrypted private key
    ///
    /// This is the only public way to reach the private key. The decrypted
    /// key is dropped, and therefore zeroized, as soon as `block` returns,
    /// whether it succeeds, fails, or unwinds.
    ///
    /// The unlocked key cannot be kept past the call:
    ///
    /// ```compile_fail
    /// use common::crypto::{KeyPair, SystemCryptoContext};
    ///
    /// let key_pair = KeyPair::generate(&SystemCryptoContext).unwrap();
    /// let kept = key_pair.unlock();
    /// ```
    pub fn with_private_key<T, E, F>(&self, block: F) -> Result<T, E>
    where
        F: FnOnce(&UnlockedKey) -> Result<T, E>,
        E: From<KeyError>,
    {
        let unlocked = self.unlock()?;
        block(&unlocked)
    }
}

/// Decrypted private key material, alive only for one scoped operation
pub struct UnlockedKey(SigningKey);

impl fmt::Debug for UnlockedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnlockedKey({})", self.public().fingerprint())
    }
}

impl UnlockedKey {
    pub(crate) fn from_signing_key(signing_key: SigningKey) -> Self {
        UnlockedKey(signing_key)
    }

    pub fn public(&self) -> PublicKey {
        self.0.verifying_key().into()
    }

    /// Sign a message, returning a detached Ed25519 signature.
    pub fn sign(&self, msg: &[u8]) -> ed25519_dalek::Signature {
        self.0.sign(msg)
    }

    /// The Ed25519 scalar reused as an X25519 secret for ECDH.
    pub(crate) fn to_x25519(&self) -> StaticSecret {
        StaticSecret::from(self.0.to_scalar_bytes())
    }
}
