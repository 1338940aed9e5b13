//! T0-Keygen: provider key management for the T-0 Network

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use t0_request_signing::DEFAULT_FRESHNESS_WINDOW_MS;

use t0_keygen::commands::{self, VerifyRequest};
use t0_keygen::env_file;

/// T0-Keygen: provider key management for the T-0 Network
#[derive(Parser, Debug)]
#[command(name = "t0-keygen")]
#[command(about = "Generate provider keys and sign or verify T-0 requests offline")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new secp256k1 key pair
    Generate {
        /// Write a .env file filled from the template
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// Template for --env-file
        #[arg(long, default_value = ".env.example")]
        template: PathBuf,
    },

    /// Print the public key of a private key
    PublicKey {
        /// Private key hex, `0x` optional
        private_key: String,
    },

    /// Sign a request body and print the three headers
    Sign {
        /// Private key hex, `0x` optional
        #[arg(short, long)]
        key: String,

        /// Request body
        #[arg(short, long)]
        body: String,

        /// Signing time in Unix milliseconds, defaults to now
        #[arg(short, long)]
        timestamp: Option<i64>,
    },

    /// Verify a signed request body
    Verify {
        /// Expected network public key
        #[arg(long)]
        network_key: String,

        /// x-signature header value
        #[arg(long)]
        signature: String,

        /// x-public-key header value
        #[arg(long)]
        public_key: String,

        /// x-signature-timestamp header value
        #[arg(long)]
        timestamp: String,

        /// Request body
        #[arg(long)]
        body: String,

        /// Verification time in Unix milliseconds, defaults to now
        #[arg(long)]
        now: Option<i64>,

        /// Freshness window in milliseconds
        #[arg(long, default_value_t = DEFAULT_FRESHNESS_WINDOW_MS)]
        window_ms: u64,
    },
}

fn main() -> Result<()> {
    t0_keygen::init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Generate { env_file: target, template } => {
            let pair = commands::generate()?;
            match target {
                Some(output) => {
                    env_file::write(&template, &output, &pair.private_key_hex, &pair.public_key_hex)?;
                    println!("Public key: 0x{}", pair.public_key_hex);
                }
                None => {
                    println!("Private key: {}", pair.private_key_hex);
                    println!("Public key: 0x{}", pair.public_key_hex);
                }
            }
        }
        Command::PublicKey { private_key } => {
            println!("{}", commands::public_key(&private_key)?);
        }
        Command::Sign { key, body, timestamp } => {
            let headers = commands::sign(&key, body.as_bytes(), timestamp)?;
            for (name, value) in headers.entries() {
                println!("{name}: {value}");
            }
        }
        Command::Verify {
            network_key,
            signature,
            public_key,
            timestamp,
            body,
            now,
            window_ms,
        } => {
            if window_ms == 0 {
                bail!("--window-ms must be positive");
            }
            let framing = commands::verify(&VerifyRequest {
                network_public_key: &network_key,
                signature: &signature,
                public_key: &public_key,
                timestamp: &timestamp,
                body: body.as_bytes(),
                now_ms: now,
                window_ms,
            })?;
            println!("OK ({framing})");
        }
    }

    Ok(())
}
