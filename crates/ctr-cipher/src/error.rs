//! Error type shared by the cipher, keystream and key-management layers.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures surfaced by construction, encryption, decryption and key handling.
///
/// Every variant is terminal for the call that produced it; nothing is retried
/// and no partial output accompanies an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Key length is neither 16 nor 32 bytes.
    #[error("invalid key size: {0} bytes (expected 16 or 32)")]
    InvalidKeySize(usize),

    /// IV size outside `[MIN_IV_SIZE, BLOCK_SIZE]`.
    #[error("invalid iv size: {0} bytes (expected 12..=16)")]
    InvalidIvSize(usize),

    /// Decrypt input cannot even hold the IV prefix.
    #[error("ciphertext too short: {len} bytes, iv alone needs {iv_size}")]
    CiphertextTooShort {
        /// Length of the rejected input.
        len: usize,
        /// Configured IV size.
        iv_size: usize,
    },

    /// The keystream context could not be created.
    #[error("could not initialize keystream context: {0}")]
    CipherInit(&'static str),

    /// Keystream produced a different number of bytes than the plaintext holds.
    #[error("encryption failed: keystream covered {actual} of {expected} bytes")]
    Encryption {
        /// Plaintext length.
        expected: usize,
        /// Bytes actually transformed.
        actual: usize,
    },

    /// Keystream produced a different number of bytes than the ciphertext body holds.
    #[error("decryption failed: keystream covered {actual} of {expected} bytes")]
    Decryption {
        /// Ciphertext body length.
        expected: usize,
        /// Bytes actually transformed.
        actual: usize,
    },

    /// The secure random source reported an error.
    #[error("secure random source failed: {0}")]
    Randomness(#[from] rand::Error),

    /// Serialized key carries a version newer than this crate understands.
    #[error("unsupported key version {found} (max supported {max})")]
    UnsupportedKeyVersion {
        /// Version found in the key.
        found: u32,
        /// Highest version this crate accepts.
        max: u32,
    },

    /// Serialized key bytes could not be encoded or decoded.
    #[error("key encoding: {0}")]
    KeyEncoding(#[from] bincode::Error),
}
