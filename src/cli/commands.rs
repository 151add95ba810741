// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use tracing::debug;

use crate::gateway::{Gateway, Operation, Output, Value};

/// Decode a hex argument, tolerating a `0x` prefix
pub fn parse_hex(name: &str, value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim().trim_start_matches("0x");
    hex::decode(trimmed).map_err(|e| anyhow!("--{} is not valid hex: {}", name, e))
}

/// Arguments for public-key command
#[derive(Args, Debug)]
pub struct PublicKeyArgs {
    /// Private key, 32 bytes hex (can also be set via SECP256K1_PRIVATE_KEY env var)
    #[arg(long, env = "SECP256K1_PRIVATE_KEY")]
    pub private_key: String,

    /// Output the 65-byte uncompressed form
    #[arg(long)]
    pub uncompressed: bool,
}

/// Arguments for sign command
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Message digest, 32 bytes hex
    #[arg(long)]
    pub message: String,

    /// Private key, 32 bytes hex
    #[arg(long, env = "SECP256K1_PRIVATE_KEY")]
    pub private_key: String,

    /// Extra nonce entropy, 32 bytes hex
    #[arg(long)]
    pub nonce_data: Option<String>,

    /// Produce a legacy Schnorr signature instead of ECDSA
    #[arg(long)]
    pub schnorr: bool,
}

/// Arguments for verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Message digest, 32 bytes hex
    #[arg(long)]
    pub message: String,

    /// Compact signature, 64 bytes hex
    #[arg(long)]
    pub signature: String,

    /// Public key, 33 or 65 bytes hex
    #[arg(long)]
    pub public_key: String,

    /// Verify as a legacy Schnorr signature
    #[arg(long)]
    pub schnorr: bool,
}

/// Arguments for recover command
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Message digest, 32 bytes hex
    #[arg(long)]
    pub message: String,

    /// Compact signature, 64 bytes hex
    #[arg(long)]
    pub signature: String,

    /// Recovery id (0-3)
    #[arg(long)]
    pub recovery_id: i64,

    /// Output the 65-byte uncompressed form
    #[arg(long)]
    pub uncompressed: bool,
}

/// Arguments for ecdh command
#[derive(Args, Debug)]
pub struct EcdhArgs {
    /// Peer public key, 33 or 65 bytes hex
    #[arg(long)]
    pub public_key: String,

    /// Own private key, 32 bytes hex
    #[arg(long, env = "SECP256K1_PRIVATE_KEY")]
    pub private_key: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweakMode {
    Add,
    Mul,
}

/// Arguments for tweak command
#[derive(Args, Debug)]
pub struct TweakArgs {
    /// Tweak a private key (32 bytes hex)
    #[arg(long, conflicts_with = "public_key", required_unless_present = "public_key")]
    pub private_key: Option<String>,

    /// Tweak a public key (33 or 65 bytes hex)
    #[arg(long, conflicts_with = "private_key")]
    pub public_key: Option<String>,

    /// Tweak, 32 bytes hex
    #[arg(long)]
    pub tweak: String,

    /// Add or multiply
    #[arg(long, value_enum, default_value = "add")]
    pub mode: TweakMode,
}

/// Arguments for signature-export command
#[derive(Args, Debug)]
pub struct SignatureArgs {
    /// Compact signature, 64 bytes hex
    #[arg(long)]
    pub signature: String,
}

/// Arguments for signature-import command
#[derive(Args, Debug)]
pub struct SignatureImportArgs {
    /// DER signature hex
    #[arg(long)]
    pub der: String,

    /// Accept non-strict historical encodings
    #[arg(long)]
    pub lax: bool,
}

/// Arguments for hash command
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Input data hex
    #[arg(long)]
    pub data: String,

    /// Hash twice
    #[arg(long)]
    pub double: bool,
}

async fn call(gateway: &Gateway, operation: Operation, args: Vec<Value>) -> Result<Output> {
    debug!("CLI invoking {}", operation);
    Ok(gateway.call_async(operation, args).await?)
}

pub async fn public_key(gateway: &Gateway, args: PublicKeyArgs) -> Result<Output> {
    let private_key = parse_hex("private-key", &args.private_key)?;
    call(
        gateway,
        Operation::PublicKeyCreate,
        vec![private_key.into(), (!args.uncompressed).into()],
    )
    .await
}

pub async fn sign(gateway: &Gateway, args: SignArgs) -> Result<Output> {
    let message = parse_hex("message", &args.message)?;
    let private_key = parse_hex("private-key", &args.private_key)?;
    let nonce_data = args
        .nonce_data
        .as_deref()
        .map(|data| parse_hex("nonce-data", data))
        .transpose()?;

    let operation = if args.schnorr {
        Operation::SchnorrSign
    } else {
        Operation::Sign
    };
    call(
        gateway,
        operation,
        vec![message.into(), private_key.into(), nonce_data.into()],
    )
    .await
}

pub async fn verify(gateway: &Gateway, args: VerifyArgs) -> Result<Output> {
    let message = parse_hex("message", &args.message)?;
    let signature = parse_hex("signature", &args.signature)?;
    let public_key = parse_hex("public-key", &args.public_key)?;

    let operation = if args.schnorr {
        Operation::SchnorrVerify
    } else {
        Operation::Verify
    };
    call(
        gateway,
        operation,
        vec![message.into(), signature.into(), public_key.into()],
    )
    .await
}

pub async fn recover(gateway: &Gateway, args: RecoverArgs) -> Result<Output> {
    let message = parse_hex("message", &args.message)?;
    let signature = parse_hex("signature", &args.signature)?;
    call(
        gateway,
        Operation::Recover,
        vec![
            message.into(),
            signature.into(),
            args.recovery_id.into(),
            (!args.uncompressed).into(),
        ],
    )
    .await
}

pub async fn ecdh(gateway: &Gateway, args: EcdhArgs) -> Result<Output> {
    let public_key = parse_hex("public-key", &args.public_key)?;
    let private_key = parse_hex("private-key", &args.private_key)?;
    call(
        gateway,
        Operation::Ecdh,
        vec![public_key.into(), private_key.into()],
    )
    .await
}

pub async fn tweak(gateway: &Gateway, args: TweakArgs) -> Result<Output> {
    let tweak = parse_hex("tweak", &args.tweak)?;

    let (operation, key) = match (&args.private_key, &args.public_key, args.mode) {
        (Some(key), _, TweakMode::Add) => (Operation::PrivateKeyTweakAdd, parse_hex("private-key", key)?),
        (Some(key), _, TweakMode::Mul) => (Operation::PrivateKeyTweakMul, parse_hex("private-key", key)?),
        (None, Some(key), TweakMode::Add) => (Operation::PublicKeyTweakAdd, parse_hex("public-key", key)?),
        (None, Some(key), TweakMode::Mul) => (Operation::PublicKeyTweakMul, parse_hex("public-key", key)?),
        (None, None, _) => return Err(anyhow!("either --private-key or --public-key is required")),
    };

    call(gateway, operation, vec![key.into(), tweak.into()]).await
}

pub async fn signature_export(gateway: &Gateway, args: SignatureArgs) -> Result<Output> {
    let signature = parse_hex("signature", &args.signature)?;
    call(gateway, Operation::SignatureExport, vec![signature.into()]).await
}

pub async fn signature_import(gateway: &Gateway, args: SignatureImportArgs) -> Result<Output> {
    let der = parse_hex("der", &args.der)?;
    let operation = if args.lax {
        Operation::SignatureImportLax
    } else {
        Operation::SignatureImport
    };
    call(gateway, operation, vec![der.into()]).await
}

pub async fn hash(gateway: &Gateway, args: HashArgs) -> Result<Output> {
    let data = parse_hex("data", &args.data)?;
    let operation = if args.double {
        Operation::Sha256d
    } else {
        Operation::Sha256
    };
    call(gateway, operation, vec![data.into()]).await
}
