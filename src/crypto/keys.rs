// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Private and Public Key Operations
//!
//! Key derivation, conversion and tweaking. Private keys travel as 32-byte
//! arrays; public keys as `k256::PublicKey`, which can never be the point at
//! infinity, so every operation that could produce infinity reports
//! `OperationFail` instead.

use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, PublicKey};

use super::codec::{
    decode_public_key, encode_public_key, scalar_bytes, secret_scalar, tweak_scalar,
    PublicKeyFormat,
};
use super::context::{Capability, Context};
use super::der;
use super::error::{GatewayError, Result};
use super::validation::Role;

const OP_CREATE: &str = "publicKeyCreate";
const OP_EXPORT: &str = "privateKeyExport";
const OP_NEGATE: &str = "privateKeyNegate";
const OP_PRIV_TWEAK_ADD: &str = "privateKeyTweakAdd";
const OP_PRIV_TWEAK_MUL: &str = "privateKeyTweakMul";
const OP_PUB_NEGATE: &str = "publicKeyNegate";
const OP_PUB_TWEAK_ADD: &str = "publicKeyTweakAdd";
const OP_PUB_TWEAK_MUL: &str = "publicKeyTweakMul";
const OP_COMBINE: &str = "publicKeyCombine";

const CREATE_FAIL: &str = "private key is zero or not below the curve order";
const EXPORT_FAIL: &str = "couldn't export to DER format";
const IMPORT_FAIL: &str = "couldn't import from DER format";
const PRIV_TWEAK_ADD_FAIL: &str = "tweak out of range or resulting private key is invalid";
const PRIV_TWEAK_MUL_FAIL: &str = "tweak out of range";
const PUB_TWEAK_ADD_FAIL: &str = "tweak out of range or resulting public key is invalid";
const PUB_TWEAK_MUL_FAIL: &str = "tweak out of range";
const COMBINE_FAIL: &str = "the sum of the public keys is not valid";

/// True when `private_key` is 32 bytes encoding a scalar in `[1, n)`
///
/// Never fails: wrong lengths are simply not valid keys.
pub fn private_key_verify(private_key: &[u8]) -> bool {
    <&[u8; 32]>::try_from(private_key)
        .ok()
        .and_then(secret_scalar)
        .is_some()
}

/// Derive the public key `d·G`
pub fn public_key_create(ctx: &Context, private_key: &[u8; 32]) -> Result<PublicKey> {
    ctx.require(Capability::Sign, OP_CREATE)?;
    let d = secret_scalar(private_key).ok_or_else(|| GatewayError::operation(OP_CREATE, CREATE_FAIL))?;
    to_public_key(ProjectivePoint::GENERATOR * d, OP_CREATE, CREATE_FAIL)
}

/// True when `public_key` parses as a point on the curve
pub fn public_key_verify(public_key: &[u8]) -> bool {
    decode_public_key(public_key).is_ok()
}

/// `n - d`
pub fn private_key_negate(private_key: &[u8; 32]) -> Result<[u8; 32]> {
    let d = secret_scalar(private_key).ok_or_else(|| GatewayError::operation(OP_NEGATE, CREATE_FAIL))?;
    Ok(scalar_bytes(&-d))
}

/// `(d + t) mod n`; fails if `t ≥ n`, `d` is invalid, or the sum is zero
pub fn private_key_tweak_add(private_key: &[u8; 32], tweak: &[u8; 32]) -> Result<[u8; 32]> {
    let fail = || GatewayError::operation(OP_PRIV_TWEAK_ADD, PRIV_TWEAK_ADD_FAIL);
    let d = secret_scalar(private_key).ok_or_else(fail)?;
    let t = tweak_scalar(tweak).ok_or_else(fail)?;

    let sum = d + t;
    if bool::from(sum.is_zero()) {
        return Err(fail());
    }
    Ok(scalar_bytes(&sum))
}

/// `(d · t) mod n`; the tweak must be in `[1, n)`
pub fn private_key_tweak_mul(private_key: &[u8; 32], tweak: &[u8; 32]) -> Result<[u8; 32]> {
    let fail = || GatewayError::operation(OP_PRIV_TWEAK_MUL, PRIV_TWEAK_MUL_FAIL);
    let d = secret_scalar(private_key).ok_or_else(fail)?;
    let t = secret_scalar(tweak).ok_or_else(fail)?;
    Ok(scalar_bytes(&(d * t)))
}

/// Re-encode a serialized public key
pub fn public_key_convert(public_key: &[u8], format: PublicKeyFormat) -> Result<Vec<u8>> {
    let key = decode_public_key(public_key)?;
    Ok(encode_public_key(&key, format))
}

/// `-P`
pub fn public_key_negate(public_key: &PublicKey) -> Result<PublicKey> {
    to_public_key(-public_key.to_projective(), OP_PUB_NEGATE, "resulting public key is invalid")
}

/// `P + t·G`; a zero tweak leaves the key unchanged
pub fn public_key_tweak_add(
    ctx: &Context,
    public_key: &PublicKey,
    tweak: &[u8; 32],
) -> Result<PublicKey> {
    ctx.require(Capability::Verify, OP_PUB_TWEAK_ADD)?;
    let t = tweak_scalar(tweak)
        .ok_or_else(|| GatewayError::operation(OP_PUB_TWEAK_ADD, PUB_TWEAK_ADD_FAIL))?;
    let point = public_key.to_projective() + ProjectivePoint::GENERATOR * t;
    to_public_key(point, OP_PUB_TWEAK_ADD, PUB_TWEAK_ADD_FAIL)
}

/// `t·P`; the tweak must be in `[1, n)`
pub fn public_key_tweak_mul(
    ctx: &Context,
    public_key: &PublicKey,
    tweak: &[u8; 32],
) -> Result<PublicKey> {
    ctx.require(Capability::Verify, OP_PUB_TWEAK_MUL)?;
    let t = secret_scalar(tweak)
        .ok_or_else(|| GatewayError::operation(OP_PUB_TWEAK_MUL, PUB_TWEAK_MUL_FAIL))?;
    to_public_key(public_key.to_projective() * t, OP_PUB_TWEAK_MUL, PUB_TWEAK_MUL_FAIL)
}

/// Sum of one or more public keys
///
/// # Errors
///
/// - `LengthInvalid` for an empty slice
/// - `OperationFail` when the sum is the point at infinity
pub fn public_key_combine(public_keys: &[PublicKey]) -> Result<PublicKey> {
    super::validation::non_empty_list(Role::PublicKeys, public_keys)?;
    let sum = public_keys
        .iter()
        .fold(ProjectivePoint::IDENTITY, |acc, key| acc + key.to_projective());
    to_public_key(sum, OP_COMBINE, COMBINE_FAIL)
}

/// SEC1 DER export with explicit curve parameters
pub fn private_key_export(
    ctx: &Context,
    private_key: &[u8; 32],
    format: PublicKeyFormat,
) -> Result<Vec<u8>> {
    ctx.require(Capability::Sign, OP_EXPORT)?;
    let public_key = public_key_create(ctx, private_key)
        .map_err(|_| GatewayError::operation(OP_EXPORT, EXPORT_FAIL))?;
    let public_key = encode_public_key(&public_key, format);
    der::export_private_key(private_key, &public_key)
        .ok_or_else(|| GatewayError::operation(OP_EXPORT, EXPORT_FAIL))
}

/// Extract a valid private key from a SEC1 DER document
pub fn private_key_import(input: &[u8]) -> Result<[u8; 32]> {
    der::import_private_key(input)
        .filter(|key| secret_scalar(key).is_some())
        .ok_or_else(|| GatewayError::parse(Role::PrivateKey, IMPORT_FAIL))
}

fn to_public_key(
    point: ProjectivePoint,
    operation: &'static str,
    reason: &'static str,
) -> Result<PublicKey> {
    PublicKey::from_affine(point.to_affine()).map_err(|_| GatewayError::operation(operation, reason))
}
