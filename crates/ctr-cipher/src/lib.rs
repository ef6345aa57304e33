//! IND-CPA secure AES-CTR encryption.
//!
//! [`AesCtr`] encrypts under AES-128 or AES-256 (chosen by key length) in
//! counter mode. Each ciphertext is a fresh random IV of `iv_size` bytes
//! followed by the keystream-XORed plaintext:
//!
//! ```text
//! ciphertext = iv (iv_size) || body (plaintext.len())
//! ```
//!
//! There is no authentication tag. Callers that need integrity must wrap this
//! primitive in an AEAD construction.
//!
//! ```
//! use ctr_cipher::{AesCtr, IndCpaCipher};
//!
//! let cipher = AesCtr::new(b"YELLOW SUBMARINE", 12)?;
//! let ciphertext = cipher.encrypt(b"attack at dawn")?;
//! assert_eq!(ciphertext.len(), 12 + 14);
//! assert_eq!(cipher.decrypt(&ciphertext)?, b"attack at dawn");
//! # Ok::<(), ctr_cipher::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod error;
mod key;
mod keystream;
mod random;

pub use crate::cipher::{AesCtr, IndCpaCipher, MIN_IV_SIZE};
pub use crate::error::{Error, Result};
pub use crate::key::{AesCtrKey, AesCtrKeyFormat, AesCtrKeyManager, AesCtrParams, KEY_VERSION};
pub use crate::keystream::{
    AesCtrContext, AesVariant, BlockKeystream, KeystreamContext, BLOCK_SIZE,
};
pub use crate::random::{OsRandom, SecureRandom};
