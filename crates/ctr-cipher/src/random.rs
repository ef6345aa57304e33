//! Sources of cryptographically secure random bytes.

use std::sync::{Mutex, PoisonError};

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::Result;

/// Produces unpredictable bytes for IVs and key material.
///
/// Implementations are shared across threads by every cipher built on them,
/// so they take `&self` and must be `Send + Sync`.
pub trait SecureRandom: Send + Sync {
    /// Fills `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;

    /// Returns `len` fresh random bytes.
    fn bytes(&self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.fill(&mut out)?;
        Ok(out)
    }
}

/// The operating system's CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(dest)?;
        Ok(())
    }
}

/// Any user-space CSPRNG behind a lock, e.g. a seeded `ChaCha20Rng` for
/// reproducible runs.
impl<R: RngCore + CryptoRng + Send> SecureRandom for Mutex<R> {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        // A panic while holding the lock cannot leave the generator state torn.
        let mut rng = self.lock().unwrap_or_else(PoisonError::into_inner);
        rng.try_fill_bytes(dest)?;
        Ok(())
    }
}
