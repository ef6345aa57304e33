//! Counter-mode keystream engine over the `aes-core` block cipher.
//!
//! The engine takes a full 16-byte counter block as its IV and produces
//! `AES_k(ctr), AES_k(ctr + 1), ...` where the increment is a big-endian add
//! over all 128 bits, wrapping at 2^128. Callers that transmit shorter IVs
//! zero-pad them to a full block before calling [`BlockKeystream::init`].

use core::fmt;

use aes_core::{encrypt_block, expand_key, expand_key_256, Aes128Key, Aes256Key, Block, RoundKeys};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Cipher block size in bytes; also the largest accepted IV.
pub const BLOCK_SIZE: usize = aes_core::BLOCK_SIZE;

/// A call-scoped keystream generator.
///
/// Contexts are stream-oriented: consecutive `process` calls continue the
/// keystream where the previous call stopped.
pub trait KeystreamContext {
    /// XORs keystream into `input`, writing the result to `output`.
    ///
    /// Returns how many bytes were transformed.
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> usize;
}

/// Builds keystream contexts from a key and a full-block IV.
pub trait BlockKeystream {
    /// Context type produced by [`BlockKeystream::init`].
    type Context: KeystreamContext;

    /// Creates a fresh context positioned at the start of the keystream.
    fn init(&self, key: &[u8], iv_block: &Block) -> Result<Self::Context>;
}

/// AES variant, selected purely by key length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AesVariant {
    /// 16-byte key, 10 rounds.
    Aes128,
    /// 32-byte key, 14 rounds.
    Aes256,
}

impl AesVariant {
    /// Maps a key length in bytes to its variant.
    pub const fn for_key_size(len: usize) -> Option<Self> {
        match len {
            16 => Some(Self::Aes128),
            32 => Some(Self::Aes256),
            _ => None,
        }
    }

    /// Key length in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }
}

impl fmt::Display for AesVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes128 => f.write_str("AES-128-CTR"),
            Self::Aes256 => f.write_str("AES-256-CTR"),
        }
    }
}

impl BlockKeystream for AesVariant {
    type Context = AesCtrContext;

    fn init(&self, key: &[u8], iv_block: &Block) -> Result<AesCtrContext> {
        if key.len() != self.key_size() {
            return Err(Error::CipherInit("key length does not match cipher variant"));
        }
        let round_keys = match self {
            Self::Aes128 => {
                let mut k = Aes128Key::from([0u8; 16]);
                k.0.copy_from_slice(key);
                expand_key(&k)
            }
            Self::Aes256 => {
                let mut k = Aes256Key::from([0u8; 32]);
                k.0.copy_from_slice(key);
                expand_key_256(&k)
            }
        };
        Ok(AesCtrContext {
            round_keys,
            counter: *iv_block,
            keystream: [0u8; BLOCK_SIZE],
            used: BLOCK_SIZE,
        })
    }
}

/// Keystream state for one encrypt or decrypt call. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AesCtrContext {
    round_keys: RoundKeys,
    counter: Block,
    keystream: Block,
    used: usize,
}

impl AesCtrContext {
    fn refill(&mut self) {
        self.keystream = encrypt_block(&self.counter, &self.round_keys);
        self.counter = u128::from_be_bytes(self.counter).wrapping_add(1).to_be_bytes();
        self.used = 0;
    }
}

impl KeystreamContext for AesCtrContext {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let len = input.len().min(output.len());
        for (out, &byte) in output[..len].iter_mut().zip(&input[..len]) {
            if self.used == BLOCK_SIZE {
                self.refill();
            }
            *out = byte ^ self.keystream[self.used];
            self.used += 1;
        }
        len
    }
}

impl fmt::Debug for AesCtrContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCtrContext").finish_non_exhaustive()
    }
}
