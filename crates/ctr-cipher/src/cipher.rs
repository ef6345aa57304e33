//! AES-CTR with a random IV prefix.
//!
//! Ciphertext layout: `iv (iv_size bytes) || body (plaintext.len() bytes)`.
//! The IV is zero-padded on the right to a full block before it seeds the
//! keystream; only the unpadded prefix is ever written out.

use core::fmt;

use aes_core::Block;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::keystream::{AesVariant, BlockKeystream, KeystreamContext, BLOCK_SIZE};
use crate::random::{OsRandom, SecureRandom};

/// Smallest IV accepted; shorter IVs make random collisions under one key too likely.
pub const MIN_IV_SIZE: usize = 12;

/// Symmetric encryption that hides plaintext under chosen-plaintext attack
/// but provides no integrity.
pub trait IndCpaCipher: Send + Sync {
    /// Encrypts `plaintext` under a fresh random IV.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Reverses [`IndCpaCipher::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Immutable AES-CTR cipher bound to one key and IV size.
///
/// Safe to share between threads: every call builds its own keystream context.
/// `K` is the keystream engine; by default the AES variant picked from the key
/// length drives counter mode itself.
pub struct AesCtr<R = OsRandom, K = AesVariant> {
    key: Zeroizing<Vec<u8>>,
    iv_size: usize,
    variant: AesVariant,
    random: R,
    engine: K,
}

impl AesCtr<OsRandom> {
    /// Validates `key` and `iv_size` and builds a cipher drawing IVs from the OS.
    pub fn new(key: &[u8], iv_size: usize) -> Result<Self> {
        Self::with_random(key, iv_size, OsRandom)
    }
}

impl<R: SecureRandom> AesCtr<R> {
    /// Like [`AesCtr::new`] with an explicit random source.
    pub fn with_random(key: &[u8], iv_size: usize, random: R) -> Result<Self> {
        let variant = validate(key, iv_size)?;
        AesCtr::with_engine(key, iv_size, random, variant)
    }
}

impl<R: SecureRandom, K: BlockKeystream> AesCtr<R, K> {
    /// Like [`AesCtr::with_random`] with an explicit keystream engine.
    ///
    /// Key and IV sizes are validated exactly as for the built-in engine.
    pub fn with_engine(key: &[u8], iv_size: usize, random: R, engine: K) -> Result<Self> {
        let variant = validate(key, iv_size)?;
        debug!(%variant, iv_size, "aes-ctr cipher ready");
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            iv_size,
            variant,
            random,
            engine,
        })
    }

    /// IV length prefixed to every ciphertext.
    pub fn iv_size(&self) -> usize {
        self.iv_size
    }

    /// Variant chosen from the key length.
    pub fn variant(&self) -> AesVariant {
        self.variant
    }

    fn padded_iv(&self, iv: &[u8]) -> Block {
        let mut block = [0u8; BLOCK_SIZE];
        block[..self.iv_size].copy_from_slice(iv);
        block
    }
}

fn validate(key: &[u8], iv_size: usize) -> Result<AesVariant> {
    let variant = AesVariant::for_key_size(key.len()).ok_or_else(|| {
        debug!(key_size = key.len(), "rejected key size");
        Error::InvalidKeySize(key.len())
    })?;
    if !(MIN_IV_SIZE..=BLOCK_SIZE).contains(&iv_size) {
        debug!(iv_size, "rejected iv size");
        return Err(Error::InvalidIvSize(iv_size));
    }
    Ok(variant)
}

impl<R, K> IndCpaCipher for AesCtr<R, K>
where
    R: SecureRandom,
    K: BlockKeystream + Send + Sync,
{
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut ciphertext = vec![0u8; self.iv_size + plaintext.len()];
        let (iv, body) = ciphertext.split_at_mut(self.iv_size);
        self.random.fill(iv)?;

        let mut ctx = self.engine.init(&self.key, &self.padded_iv(iv))?;
        let written = ctx.process(plaintext, body);
        if written != plaintext.len() {
            debug!(expected = plaintext.len(), written, "keystream length mismatch");
            return Err(Error::Encryption {
                expected: plaintext.len(),
                actual: written,
            });
        }
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < self.iv_size {
            return Err(Error::CiphertextTooShort {
                len: ciphertext.len(),
                iv_size: self.iv_size,
            });
        }
        let (iv, body) = ciphertext.split_at(self.iv_size);

        let mut ctx = self.engine.init(&self.key, &self.padded_iv(iv))?;
        let mut plaintext = vec![0u8; body.len()];
        let written = ctx.process(body, &mut plaintext);
        if written != body.len() {
            debug!(expected = body.len(), written, "keystream length mismatch");
            return Err(Error::Decryption {
                expected: body.len(),
                actual: written,
            });
        }
        Ok(plaintext)
    }
}

impl<R, K> fmt::Debug for AesCtr<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCtr")
            .field("variant", &self.variant)
            .field("iv_size", &self.iv_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use aes_core::{encrypt_block, expand_key, Aes128Key};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;

    use crate::keystream::AesCtrContext;

    fn seeded(seed: u8) -> Mutex<ChaCha20Rng> {
        Mutex::new(ChaCha20Rng::from_seed([seed; 32]))
    }

    struct EntropyDown;

    impl SecureRandom for EntropyDown {
        fn fill(&self, _dest: &mut [u8]) -> Result<()> {
            Err(Error::Randomness(rand::Error::new("entropy source down")))
        }
    }

    /// Real AES keystream that stops one byte short.
    struct Truncating;

    struct TruncatingContext(AesCtrContext);

    impl KeystreamContext for TruncatingContext {
        fn process(&mut self, input: &[u8], output: &mut [u8]) -> usize {
            let n = input.len().min(output.len()).saturating_sub(1);
            self.0.process(&input[..n], &mut output[..n])
        }
    }

    impl BlockKeystream for Truncating {
        type Context = TruncatingContext;

        fn init(&self, key: &[u8], iv_block: &Block) -> Result<TruncatingContext> {
            let variant =
                AesVariant::for_key_size(key.len()).ok_or(Error::CipherInit("no variant"))?;
            Ok(TruncatingContext(variant.init(key, iv_block)?))
        }
    }

    struct Unavailable;

    impl BlockKeystream for Unavailable {
        type Context = AesCtrContext;

        fn init(&self, _key: &[u8], _iv_block: &Block) -> Result<AesCtrContext> {
            Err(Error::CipherInit("engine unavailable"))
        }
    }

    #[test]
    fn empty_plaintext_yields_bare_iv() {
        let cipher = AesCtr::new(&[0u8; 16], 16).unwrap();
        let ct = cipher.encrypt(b"").unwrap();
        assert_eq!(ct.len(), 16);
        assert!(cipher.decrypt(&ct).unwrap().is_empty());
    }

    #[test]
    fn yellow_submarine_round_trip_with_short_iv() {
        let cipher = AesCtr::new(b"YELLOW SUBMARINE", 12).unwrap();
        let ct = cipher.encrypt(b"YELLOW SUBMARINE").unwrap();
        assert_eq!(ct.len(), 28);
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"YELLOW SUBMARINE");
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let cipher = AesCtr::new(&[3u8; 16], 12).unwrap();
        let err = cipher.decrypt(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            Error::CiphertextTooShort {
                len: 10,
                iv_size: 12
            }
        ));
        // Exactly the IV is a valid empty message.
        assert!(cipher.decrypt(&[0u8; 12]).unwrap().is_empty());
    }

    #[test]
    fn construction_validates_sizes() {
        assert!(matches!(
            AesCtr::new(&[0u8; 15], 16),
            Err(Error::InvalidKeySize(15))
        ));
        assert!(matches!(
            AesCtr::new(&[0u8; 20], 16),
            Err(Error::InvalidKeySize(20))
        ));
        assert!(matches!(
            AesCtr::new(&[0u8; 16], 11),
            Err(Error::InvalidIvSize(11))
        ));
        assert!(matches!(
            AesCtr::new(&[0u8; 16], 17),
            Err(Error::InvalidIvSize(17))
        ));
        // Key size is checked first.
        assert!(matches!(
            AesCtr::new(&[0u8; 20], 40),
            Err(Error::InvalidKeySize(20))
        ));
        for iv_size in MIN_IV_SIZE..=BLOCK_SIZE {
            assert_eq!(AesCtr::new(&[0u8; 32], iv_size).unwrap().iv_size(), iv_size);
        }
    }

    #[test]
    fn variant_follows_key_length() {
        assert_eq!(AesCtr::new(&[0u8; 16], 16).unwrap().variant(), AesVariant::Aes128);
        assert_eq!(AesCtr::new(&[0u8; 32], 16).unwrap().variant(), AesVariant::Aes256);
    }

    #[test]
    fn encrypt_is_randomized() {
        let cipher = AesCtr::new(&[5u8; 32], 16).unwrap();
        let a = cipher.encrypt(b"same message").unwrap();
        let b = cipher.encrypt(b"same message").unwrap();
        assert_ne!(a, b);
        assert_ne!(a[..16], b[..16]);
    }

    #[test]
    fn iv_prefix_comes_from_random_source() {
        let cipher = AesCtr::with_random(&[1u8; 16], 14, seeded(11)).unwrap();
        let mut expected_iv = [0u8; 14];
        ChaCha20Rng::from_seed([11u8; 32]).fill_bytes(&mut expected_iv);

        let ct = cipher.encrypt(b"abc").unwrap();
        assert_eq!(&ct[..14], &expected_iv);
    }

    #[test]
    fn short_iv_is_zero_padded_into_counter_block() {
        let key = *b"YELLOW SUBMARINE";
        let cipher = AesCtr::with_random(&key, 12, seeded(2)).unwrap();
        let ct = cipher.encrypt(&[0u8; 16]).unwrap();

        let mut counter = [0u8; 16];
        counter[..12].copy_from_slice(&ct[..12]);
        let expected = encrypt_block(&counter, &expand_key(&Aes128Key::from(key)));
        assert_eq!(ct[12..], expected);
    }

    #[test]
    fn known_ciphertext_decrypts() {
        // AES-128-CTR, IV 000102030405060708090a0b padded with four zero bytes.
        let cipher = AesCtr::new(b"YELLOW SUBMARINE", 12).unwrap();
        let mut ct = hex::decode("000102030405060708090a0b").unwrap();
        ct.extend(hex::decode("086c046a599d97197b49f4ba08693221").unwrap());
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"YELLOW SUBMARINE");
    }

    #[test]
    fn wrong_key_does_not_recover_plaintext() {
        let ct = AesCtr::new(&[1u8; 16], 16).unwrap().encrypt(b"attack at dawn").unwrap();
        let pt = AesCtr::new(&[2u8; 16], 16).unwrap().decrypt(&ct).unwrap();
        assert_eq!(pt.len(), 14);
        assert_ne!(pt, b"attack at dawn");
    }

    #[test]
    fn shared_across_threads() {
        let cipher = Arc::new(AesCtr::new(&[8u8; 32], 13).unwrap());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let cipher = Arc::clone(&cipher);
                thread::spawn(move || {
                    let msg = vec![i; 100 + i as usize];
                    let ct = cipher.encrypt(&msg).unwrap();
                    assert_eq!(cipher.decrypt(&ct).unwrap(), msg);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn debug_output_hides_key() {
        let cipher = AesCtr::new(b"YELLOW SUBMARINE", 16).unwrap();
        let rendered = format!("{cipher:?}");
        assert!(rendered.contains("Aes128"));
        assert!(!rendered.contains("YELLOW"));
    }

    #[test]
    fn usable_as_trait_object() {
        let cipher: Box<dyn IndCpaCipher> = Box::new(AesCtr::new(&[4u8; 16], 16).unwrap());
        let ct = cipher.encrypt(b"boxed").unwrap();
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"boxed");
    }

    #[test]
    fn explicit_engine_matches_default() {
        let key = [0x33u8; 32];
        let custom = AesCtr::with_engine(&key, 13, OsRandom, AesVariant::Aes256).unwrap();
        let ct = custom.encrypt(b"same keystream").unwrap();
        let default = AesCtr::new(&key, 13).unwrap();
        assert_eq!(default.decrypt(&ct).unwrap(), b"same keystream");
    }

    #[test]
    fn with_engine_still_validates_sizes() {
        assert!(matches!(
            AesCtr::with_engine(&[0u8; 24], 16, OsRandom, Truncating),
            Err(Error::InvalidKeySize(24))
        ));
        assert!(matches!(
            AesCtr::with_engine(&[0u8; 16], 8, OsRandom, Truncating),
            Err(Error::InvalidIvSize(8))
        ));
    }

    #[test]
    fn short_keystream_fails_encryption() {
        let cipher = AesCtr::with_engine(&[1u8; 16], 12, OsRandom, Truncating).unwrap();
        let result = cipher.encrypt(b"sixteen byte msg");
        assert!(matches!(
            result,
            Err(Error::Encryption {
                expected: 16,
                actual: 15
            })
        ));
        // An empty message needs no keystream, so nothing is short.
        assert_eq!(cipher.encrypt(b"").unwrap().len(), 12);
    }

    #[test]
    fn short_keystream_fails_decryption() {
        let key = [1u8; 16];
        let ct = AesCtr::new(&key, 12)
            .unwrap()
            .encrypt(b"sixteen byte msg")
            .unwrap();
        let cipher = AesCtr::with_engine(&key, 12, OsRandom, Truncating).unwrap();
        assert!(matches!(
            cipher.decrypt(&ct),
            Err(Error::Decryption {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn engine_init_failure_is_reported() {
        let cipher = AesCtr::with_engine(&[2u8; 32], 16, OsRandom, Unavailable).unwrap();
        assert!(matches!(cipher.encrypt(b"abc"), Err(Error::CipherInit(_))));
        assert!(matches!(cipher.decrypt(&[0u8; 20]), Err(Error::CipherInit(_))));
        // The length check still comes before the engine is touched.
        assert!(matches!(
            cipher.decrypt(&[0u8; 4]),
            Err(Error::CiphertextTooShort { len: 4, .. })
        ));
    }

    #[test]
    fn random_source_failure_is_reported() {
        let cipher = AesCtr::with_random(&[7u8; 16], 16, EntropyDown).unwrap();
        assert!(matches!(cipher.encrypt(b"abc"), Err(Error::Randomness(_))));
        assert!(matches!(cipher.encrypt(b""), Err(Error::Randomness(_))));
    }
}
