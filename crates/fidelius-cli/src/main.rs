//! Fidelius command-line front end.
//!
//! Every subcommand prints a single JSON document on stdout. Logs go to
//! stderr.
//!
//! # Usage
//!
//! ```bash
//! # Fresh key pair and nonce
//! fidelius generate
//!
//! # Key material for an existing private key
//! fidelius generate --private-key DMxHPri8d7IT23KgLk281zZenMfVHSdeamq0RhwlIBk=
//!
//! # Seal and open
//! fidelius encrypt --plaintext "hi" --sender-nonce .. --requester-nonce .. \
//!     --sender-private-key .. --requester-public-key ..
//! fidelius decrypt --encrypted-data .. --requester-nonce .. --sender-nonce .. \
//!     --requester-private-key .. --sender-public-key ..
//!
//! # Walk through the whole exchange with fixed peer values
//! fidelius demo
//! ```

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use fidelius_crypto::{
    CurveRegistry, DecryptionHandler, DecryptionRequest, EncryptionHandler, EncryptionRequest,
    FideliusConfig, KeyPairGenerator, OsRandom, compute_shared_secret,
};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Fixed peer values for `demo`
const DEMO_PLAINTEXT: &str = "Hello, World!";
const DEMO_REQUESTER_NONCE: &str = "MUFiMwG88uua0tf6Coh89DAYVDzglO3GV46jBBvw3KI=";
const DEMO_REQUESTER_PUBLIC_KEY: &str =
    "BDKIyX4Dl5mcY2igBWUyJDabZlVcwpBncbZW4sN4WzTEPcRb3VaNWfcjpGICwj6JOdXGPxkwEX6465MJG7X6IC8=";
const DEMO_ENCRYPTED_DATA: &str = "pzMvVZNNVtJzqPkkxcCbBUWgDEBy/mBXIeT2dJWI16ZAQnnXUb9lI+S4k8XK6mgZSKKSRIHkcNvJpllnBg548wUgavBa0vCRRwdL6kY6Yw==";
const DEMO_DECRYPT_REQUESTER_NONCE: &str = "6uj1RdDUbcpI3lVMZvijkMC8Te20O4Bcyz0SyivX8Eg=";
const DEMO_SENDER_NONCE: &str = "lmXgblZwotx+DfBgKJF0lZXtAXgBEYr5khh79Zytr2Y=";
const DEMO_REQUESTER_PRIVATE_KEY: &str = "DMxHPri8d7IT23KgLk281zZenMfVHSdeamq0RhwlIBk=";
const DEMO_SENDER_PUBLIC_KEY: &str =
    "BABVt+mpRLMXiQpIfEq6bj8hlXsdtXIxLsspmMgLNI1SR5mHgDVbjHO2A+U4QlMddGzqyEidzm1AkhtSxSO2Ahg=";

/// ECDH + HKDF + AES-GCM handshake-and-encrypt
#[derive(Parser, Debug)]
#[command(name = "fidelius")]
#[command(about = "Pairwise key agreement and authenticated encryption")]
#[command(version)]
struct Args {
    /// Curve to operate on
    #[arg(long, global = true, default_value = fidelius_crypto::BC25519)]
    curve: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate key material
    Generate {
        /// Derive the public key from this private key instead of a random one
        #[arg(long)]
        private_key: Option<String>,
    },

    /// Compute an ECDH shared secret
    SharedSecret {
        /// Local private key
        #[arg(long)]
        private_key: String,
        /// Peer public key, uncompressed or X.509
        #[arg(long)]
        public_key: String,
    },

    /// Seal a string for a requester
    Encrypt {
        /// String to encrypt
        #[arg(long)]
        plaintext: String,
        /// Sender's nonce
        #[arg(long)]
        sender_nonce: String,
        /// Requester's nonce
        #[arg(long)]
        requester_nonce: String,
        /// Sender's private key
        #[arg(long)]
        sender_private_key: String,
        /// Requester's public key
        #[arg(long)]
        requester_public_key: String,
    },

    /// Open a payload sealed by a sender
    Decrypt {
        /// Sealed payload
        #[arg(long)]
        encrypted_data: String,
        /// Requester's nonce
        #[arg(long)]
        requester_nonce: String,
        /// Sender's nonce
        #[arg(long)]
        sender_nonce: String,
        /// Requester's private key
        #[arg(long)]
        requester_private_key: String,
        /// Sender's public key
        #[arg(long)]
        sender_public_key: String,
    },

    /// Generate keys, seal a greeting and open a fixed payload
    Demo,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let output = run(args)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}

fn run(args: Args) -> Result<Value, Box<dyn std::error::Error>> {
    let registry = CurveRegistry::default();
    let config = FideliusConfig { curve: args.curve };
    tracing::debug!(curve = %config.curve, "resolved configuration");

    let output = match args.command {
        Command::Generate { private_key } => {
            let generator = KeyPairGenerator::from_config(&registry, &config)?;
            let material = match private_key {
                Some(private_key) => generator.generate_for_private_key(&private_key, &OsRandom)?,
                None => generator.generate(&OsRandom)?,
            };
            serde_json::to_value(&material)?
        },

        Command::SharedSecret { private_key, public_key } => {
            let curve = registry.resolve(&config)?;
            let secret = compute_shared_secret(&curve, &private_key, &public_key)?;
            json!({ "sharedSecret": secret })
        },

        Command::Encrypt {
            plaintext,
            sender_nonce,
            requester_nonce,
            sender_private_key,
            requester_public_key,
        } => {
            let handler = EncryptionHandler::from_config(&registry, &config)?;
            let response = handler.encrypt(&EncryptionRequest {
                string_to_encrypt: plaintext,
                sender_nonce,
                requester_nonce,
                sender_private_key,
                requester_public_key,
            })?;
            serde_json::to_value(&response)?
        },

        Command::Decrypt {
            encrypted_data,
            requester_nonce,
            sender_nonce,
            requester_private_key,
            sender_public_key,
        } => {
            let handler = DecryptionHandler::from_config(&registry, &config)?;
            let response = handler.decrypt(&DecryptionRequest {
                encrypted_data,
                requester_nonce,
                sender_nonce,
                requester_private_key,
                sender_public_key,
            })?;
            serde_json::to_value(&response)?
        },

        Command::Demo => demo(&registry, &config)?,
    };

    Ok(output)
}

fn demo(
    registry: &CurveRegistry,
    config: &FideliusConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let material = KeyPairGenerator::from_config(registry, config)?.generate(&OsRandom)?;
    tracing::info!("generated sender key material");

    let encrypted = EncryptionHandler::from_config(registry, config)?.encrypt(&EncryptionRequest {
        string_to_encrypt: DEMO_PLAINTEXT.to_string(),
        sender_nonce: material.nonce.clone(),
        requester_nonce: DEMO_REQUESTER_NONCE.to_string(),
        sender_private_key: material.private_key.clone(),
        requester_public_key: DEMO_REQUESTER_PUBLIC_KEY.to_string(),
    })?;
    tracing::info!("sealed greeting for fixed requester");

    let decrypted = DecryptionHandler::from_config(registry, config)?.decrypt(&DecryptionRequest {
        encrypted_data: DEMO_ENCRYPTED_DATA.to_string(),
        requester_nonce: DEMO_DECRYPT_REQUESTER_NONCE.to_string(),
        sender_nonce: DEMO_SENDER_NONCE.to_string(),
        requester_private_key: DEMO_REQUESTER_PRIVATE_KEY.to_string(),
        sender_public_key: DEMO_SENDER_PUBLIC_KEY.to_string(),
    })?;
    tracing::info!("opened fixed payload");

    Ok(json!({
        "keyMaterial": material,
        "encrypted": encrypted,
        "decrypted": decrypted,
    }))
}
