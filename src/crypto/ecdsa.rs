// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDSA Sign / Verify / Recover
//!
//! Signing drives k256's hazmat `SignPrimitive` with nonces drawn from the
//! nonce hook, one attempt at a time, so custom nonce functions see every
//! retry. The primitive returns the low-S signature together with its
//! recovery id.
//!
//! Verification follows libsecp256k1 and rejects high-S signatures; recovery
//! accepts them.

use k256::ecdsa::hazmat::SignPrimitive;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, VerifyingKey};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::scalar::IsHigh;
use k256::{FieldBytes, PublicKey, Scalar, U256};
use tracing::{debug, warn};

use super::codec::{scalar_bytes, secret_scalar, CompactSignature, RecoverableSignature};
use super::context::{Capability, Context};
use super::error::{GatewayError, Result};
use super::nonce::{NonceRequest, SignOptions};

const OP_SIGN: &str = "sign";
const OP_VERIFY: &str = "verify";
const OP_RECOVER: &str = "recover";

const SIGN_FAIL: &str = "nonce generation function failed or private key is invalid";
const RECOVER_FAIL: &str = "couldn't recover public key from signature";

/// Produce a low-S recoverable signature over a 32-byte digest
///
/// # Arguments
///
/// * `ctx` - Context with the `sign` capability
/// * `message` - Pre-hashed 32-byte digest
/// * `private_key` - Secret scalar, must be in `[1, n)`
/// * `options` - Extra nonce data and/or a custom nonce function
///
/// # Errors
///
/// `OperationFail` if the key is invalid, the nonce function aborts, or the
/// context's nonce attempt cap is reached.
pub fn sign(
    ctx: &Context,
    message: &[u8; 32],
    private_key: &[u8; 32],
    options: &SignOptions,
) -> Result<RecoverableSignature> {
    ctx.require(Capability::Sign, OP_SIGN)?;

    let d = secret_scalar(private_key).ok_or_else(|| GatewayError::operation(OP_SIGN, SIGN_FAIL))?;
    let reduced = scalar_bytes(&<Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*message)));
    let digest = FieldBytes::from(reduced);
    let nonce_function = options.nonce_function();

    for attempt in 0..ctx.max_nonce_attempts() {
        let request = NonceRequest {
            message: &reduced,
            private_key,
            algorithm: None,
            data: options.data.as_ref(),
            attempt,
        };

        let candidate = nonce_function
            .nonce(&request)
            .ok_or_else(|| GatewayError::operation(OP_SIGN, SIGN_FAIL))?;

        // Zero or out-of-range nonces just move on to the next attempt
        let Some(k) = secret_scalar(&candidate) else {
            continue;
        };

        if let Some(signature) = sign_with_nonce(&d, k, &digest) {
            debug!("ECDSA signature produced after {} attempt(s)", attempt + 1);
            return Ok(signature);
        }
    }

    warn!(
        "⚠️ ECDSA signing gave up after {} nonce attempts",
        ctx.max_nonce_attempts()
    );
    Err(GatewayError::operation(OP_SIGN, "nonce attempts exhausted"))
}

/// One signing attempt; `None` when r or s comes out zero
fn sign_with_nonce(d: &Scalar, k: Scalar, digest: &FieldBytes) -> Option<RecoverableSignature> {
    let (signature, recovery_id) = d.try_sign_prehashed(k, digest).ok()?;
    Some(RecoverableSignature::new(signature, recovery_id?))
}

/// Check a compact signature against a digest and public key
///
/// Returns `Ok(false)` for any mismatch, including high-S signatures and
/// signatures with a zero half.
pub fn verify(
    ctx: &Context,
    message: &[u8; 32],
    signature: &CompactSignature,
    public_key: &PublicKey,
) -> Result<bool> {
    ctx.require(Capability::Verify, OP_VERIFY)?;

    if bool::from(signature.s().is_high()) {
        return Ok(false);
    }
    let Some(signature) = signature.to_signature() else {
        return Ok(false);
    };

    let verifying_key = VerifyingKey::from(*public_key);
    Ok(verifying_key.verify_prehash(message, &signature).is_ok())
}

/// Recover the signer's public key from a digest and recoverable signature
pub fn recover(
    ctx: &Context,
    message: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<PublicKey> {
    ctx.require(Capability::Verify, OP_RECOVER)?;

    let mut plain = *signature.signature();
    let mut recovery_id = signature.recovery_id();

    // Negating s is matched by negating R, which flips its y parity
    if let Some(low) = plain.normalize_s() {
        plain = low;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let verifying_key = VerifyingKey::recover_from_prehash(message, &plain, recovery_id)
        .map_err(|_| GatewayError::operation(OP_RECOVER, RECOVER_FAIL))?;
    Ok(PublicKey::from(&verifying_key))
}

/// Map a signature to its low-S representative; zero halves pass through
pub fn normalize(signature: &CompactSignature) -> CompactSignature {
    let s = signature.s();
    if bool::from(s.is_high()) {
        CompactSignature::from_scalars(signature.r(), -s)
    } else {
        *signature
    }
}
