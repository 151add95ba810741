// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, Output};
use crate::version;

/// secp256k1 gateway CLI
#[derive(Parser, Debug)]
#[command(name = "secp256k1-cli")]
#[command(version)]
#[command(about = "Sign, verify and derive keys over secp256k1", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to SECP256K1_GATEWAY_* env vars)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the public key for a private key
    PublicKey(commands::PublicKeyArgs),

    /// Sign a 32-byte message digest
    Sign(commands::SignArgs),

    /// Verify a compact signature
    Verify(commands::VerifyArgs),

    /// Recover the signer's public key
    Recover(commands::RecoverArgs),

    /// Derive an ECDH shared secret
    Ecdh(commands::EcdhArgs),

    /// Add or multiply a tweak into a key
    Tweak(commands::TweakArgs),

    /// Convert a compact signature to DER
    SignatureExport(commands::SignatureArgs),

    /// Convert a DER signature to compact
    SignatureImport(commands::SignatureImportArgs),

    /// SHA-256 (or double SHA-256) of hex data
    Hash(commands::HashArgs),

    /// Print version information
    Version,
}

/// Load the gateway configuration the CLI runs with
pub fn load_config(path: Option<&PathBuf>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_toml_file(path),
        None => Ok(GatewayConfig::from_env()),
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = match cli.command {
        Commands::Version => version::get_version_info(),
        command => {
            let config = load_config(cli.config.as_ref())?;
            let gateway = Gateway::new(config)?;
            info!("{}", version::get_version_string());
            run(&gateway, command).await?.to_json()
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(gateway: &Gateway, command: Commands) -> Result<Output> {
    match command {
        Commands::PublicKey(args) => commands::public_key(gateway, args).await,
        Commands::Sign(args) => commands::sign(gateway, args).await,
        Commands::Verify(args) => commands::verify(gateway, args).await,
        Commands::Recover(args) => commands::recover(gateway, args).await,
        Commands::Ecdh(args) => commands::ecdh(gateway, args).await,
        Commands::Tweak(args) => commands::tweak(gateway, args).await,
        Commands::SignatureExport(args) => commands::signature_export(gateway, args).await,
        Commands::SignatureImport(args) => commands::signature_import(gateway, args).await,
        Commands::Hash(args) => commands::hash(gateway, args).await,
        Commands::Version => Err(anyhow!("version takes no gateway")),
    }
}
