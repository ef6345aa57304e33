//! Reference AES implementation backing the counter-mode keystream engine.
//!
//! This crate mirrors the FIPS-197 specification and provides:
//! - Key schedules for AES-128 and AES-256.
//! - Single-block encryption and decryption.
//! - Key and block types shared across the workspace.
//!
//! The implementation aims for clarity and testability rather than constant-time
//! guarantees; it should not be treated as side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod key;
mod round;
mod sbox;

pub use crate::block::{Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, expand_key, expand_key_256};
pub use crate::key::{Aes128Key, Aes256Key, RoundKeys};
