//! Serializable AES-CTR keys and the manager that validates them and turns
//! them into ciphers.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::{AesCtr, MIN_IV_SIZE};
use crate::error::{Error, Result};
use crate::keystream::{AesVariant, BLOCK_SIZE};
use crate::random::{OsRandom, SecureRandom};

/// Highest key version this crate reads and the version it writes.
pub const KEY_VERSION: u32 = 0;

/// Cipher parameters stored alongside the key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct AesCtrParams {
    /// IV length prefixed to each ciphertext.
    pub iv_size: u32,
}

/// Recipe for generating a new key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesCtrKeyFormat {
    /// Cipher parameters for keys created from this format.
    pub params: AesCtrParams,
    /// Key length in bytes (16 or 32).
    pub key_size: u32,
}

impl AesCtrKeyFormat {
    /// AES-128-CTR with a full 16-byte IV.
    pub const fn aes128_ctr() -> Self {
        Self {
            params: AesCtrParams { iv_size: 16 },
            key_size: 16,
        }
    }

    /// AES-256-CTR with a full 16-byte IV.
    pub const fn aes256_ctr() -> Self {
        Self {
            params: AesCtrParams { iv_size: 16 },
            key_size: 32,
        }
    }
}

/// Versioned key material plus parameters. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AesCtrKey {
    /// Format version, at most [`KEY_VERSION`].
    pub version: u32,
    /// Cipher parameters.
    pub params: AesCtrParams,
    /// Raw key bytes.
    pub key_value: Vec<u8>,
}

impl AesCtrKey {
    /// Serializes the key with `bincode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserializes a key with `bincode`. Does not validate it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Variant implied by the key length, if valid.
    pub fn variant(&self) -> Option<AesVariant> {
        AesVariant::for_key_size(self.key_value.len())
    }
}

impl fmt::Debug for AesCtrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCtrKey")
            .field("version", &self.version)
            .field("params", &self.params)
            .field("key_value", &format_args!("<{} bytes>", self.key_value.len()))
            .finish()
    }
}

/// Validates keys and key formats and builds ciphers from them.
#[derive(Clone, Copy, Debug, Default)]
pub struct AesCtrKeyManager;

impl AesCtrKeyManager {
    /// Key version produced by [`AesCtrKeyManager::new_key`].
    pub fn version(&self) -> u32 {
        KEY_VERSION
    }

    /// Checks that a format describes a constructible cipher.
    pub fn validate_key_format(&self, format: &AesCtrKeyFormat) -> Result<()> {
        validate_key_size(format.key_size as usize)?;
        validate_params(&format.params)
    }

    /// Checks version, key length and parameters of a stored key.
    pub fn validate_key(&self, key: &AesCtrKey) -> Result<()> {
        if key.version > KEY_VERSION {
            return Err(Error::UnsupportedKeyVersion {
                found: key.version,
                max: KEY_VERSION,
            });
        }
        validate_key_size(key.key_value.len())?;
        validate_params(&key.params)
    }

    /// Generates fresh key material from the OS random source.
    pub fn new_key(&self, format: &AesCtrKeyFormat) -> Result<AesCtrKey> {
        self.new_key_with(format, &OsRandom)
    }

    /// Generates fresh key material from `random`.
    pub fn new_key_with<R: SecureRandom + ?Sized>(
        &self,
        format: &AesCtrKeyFormat,
        random: &R,
    ) -> Result<AesCtrKey> {
        self.validate_key_format(format)?;
        let key = AesCtrKey {
            version: KEY_VERSION,
            params: format.params,
            key_value: random.bytes(format.key_size as usize)?,
        };
        debug!(
            key_size = format.key_size,
            iv_size = format.params.iv_size,
            "generated aes-ctr key"
        );
        Ok(key)
    }

    /// Validates `key` and builds a cipher drawing IVs from the OS.
    pub fn primitive(&self, key: &AesCtrKey) -> Result<AesCtr> {
        self.validate_key(key)?;
        AesCtr::new(&key.key_value, key.params.iv_size as usize)
    }
}

fn validate_key_size(len: usize) -> Result<()> {
    AesVariant::for_key_size(len)
        .map(|_| ())
        .ok_or(Error::InvalidKeySize(len))
}

fn validate_params(params: &AesCtrParams) -> Result<()> {
    let iv_size = params.iv_size as usize;
    if (MIN_IV_SIZE..=BLOCK_SIZE).contains(&iv_size) {
        Ok(())
    } else {
        Err(Error::InvalidIvSize(iv_size))
    }
}
