//! Command-line interface for `ctr-cipher`.

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ctr_cipher::{
    AesCtr, AesCtrKey, AesCtrKeyFormat, AesCtrKeyManager, AesCtrParams, IndCpaCipher, SecureRandom,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// AES-CTR CLI.
#[derive(Parser)]
#[command(
    name = "aesctr",
    version,
    author,
    about = "AES-CTR encryption with random IV prefix (no authentication)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key file.
    Keygen {
        /// Key length in bytes: 16 (AES-128) or 32 (AES-256).
        #[arg(long, default_value_t = 16)]
        key_size: u32,
        /// IV length in bytes, 12 to 16.
        #[arg(long, default_value_t = 16)]
        iv_size: u32,
        /// Output path for the serialized key.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Encrypt a file; output is the IV followed by the ciphertext body.
    Enc {
        /// Path to the serialized key.
        #[arg(long, value_name = "FILE")]
        key: PathBuf,
        /// Plaintext input.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Ciphertext output.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Decrypt a file produced by `enc`.
    Dec {
        /// Path to the serialized key.
        #[arg(long, value_name = "FILE")]
        key: PathBuf,
        /// Ciphertext input.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Plaintext output.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Print the parameters of a key file (never the key bytes).
    Inspect {
        /// Path to the serialized key.
        #[arg(long, value_name = "FILE")]
        key: PathBuf,
    },
    /// Run a local demo: generate a key, encrypt random data, decrypt back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen {
            key_size,
            iv_size,
            out,
        } => cmd_keygen(key_size, iv_size, &out),
        Commands::Enc { key, input, output } => cmd_enc(&key, &input, &output),
        Commands::Dec { key, input, output } => cmd_dec(&key, &input, &output),
        Commands::Inspect { key } => {
            println!("{}", cmd_inspect(&key)?);
            Ok(())
        }
        Commands::Demo { seed } => cmd_demo(seed),
    }
}

fn cmd_keygen(key_size: u32, iv_size: u32, out: &Path) -> Result<()> {
    let format = AesCtrKeyFormat {
        params: AesCtrParams { iv_size },
        key_size,
    };
    let key = AesCtrKeyManager.new_key(&format).context("generate key")?;
    let bytes = key.to_bytes().context("serialize key")?;
    fs::write(out, bytes).with_context(|| format!("write {}", out.display()))?;
    info!(path = %out.display(), key_size, iv_size, "wrote key");
    Ok(())
}

fn cmd_enc(key_path: &Path, input_path: &Path, output_path: &Path) -> Result<()> {
    let cipher = load_cipher(key_path)?;
    let plaintext =
        fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    let ciphertext = cipher.encrypt(&plaintext).context("encrypt")?;
    fs::write(output_path, &ciphertext)
        .with_context(|| format!("write {}", output_path.display()))?;
    info!(bytes = ciphertext.len(), "encrypted");
    Ok(())
}

fn cmd_dec(key_path: &Path, input_path: &Path, output_path: &Path) -> Result<()> {
    let cipher = load_cipher(key_path)?;
    let ciphertext =
        fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    let plaintext = cipher.decrypt(&ciphertext).context("decrypt")?;
    fs::write(output_path, &plaintext)
        .with_context(|| format!("write {}", output_path.display()))?;
    info!(bytes = plaintext.len(), "decrypted");
    Ok(())
}

fn cmd_inspect(key_path: &Path) -> Result<String> {
    let key = load_key(key_path)?;
    AesCtrKeyManager.validate_key(&key).context("validate key")?;
    let variant = key
        .variant()
        .context("key length does not map to an AES variant")?;
    Ok(format!(
        "version: {}\nvariant: {}\niv size: {}",
        key.version, variant, key.params.iv_size
    ))
}

fn cmd_demo(seed: Option<u64>) -> Result<()> {
    let random = Mutex::new(seeded_rng(seed));
    let key = AesCtrKeyManager
        .new_key_with(&AesCtrKeyFormat::aes128_ctr(), &random)
        .context("generate key")?;
    let plaintext = random.bytes(32).context("draw plaintext")?;

    let cipher = AesCtr::with_random(&key.key_value, key.params.iv_size as usize, random)
        .context("build cipher")?;
    let ciphertext = cipher.encrypt(&plaintext).context("encrypt")?;
    let decrypted = cipher.decrypt(&ciphertext).context("decrypt")?;

    println!("demo key: {}", hex::encode(&key.key_value));
    println!("plaintext: {}", hex::encode(&plaintext));
    println!("iv: {}", hex::encode(&ciphertext[..cipher.iv_size()]));
    println!("ciphertext: {}", hex::encode(&ciphertext[cipher.iv_size()..]));
    println!("decrypted: {}", hex::encode(&decrypted));
    if decrypted != plaintext {
        bail!("demo roundtrip failed");
    }
    Ok(())
}

fn load_key(path: &Path) -> Result<AesCtrKey> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    AesCtrKey::from_bytes(&bytes).context("deserialize key")
}

fn load_cipher(path: &Path) -> Result<AesCtr> {
    let key = load_key(path)?;
    AesCtrKeyManager
        .primitive(&key)
        .with_context(|| format!("invalid key in {}", path.display()))
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    let mut seed_bytes = [0u8; 32];
    match seed {
        Some(value) => seed_bytes[..8].copy_from_slice(&value.to_le_bytes()),
        None => rand::rngs::OsRng.fill_bytes(&mut seed_bytes),
    }
    ChaCha20Rng::from_seed(seed_bytes)
}
