// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Legacy secp256k1 Schnorr Signatures
//!
//! The pre-BIP-340 scheme from libsecp256k1's experimental `schnorr` module,
//! kept for wire compatibility with signatures produced by older nodes.
//! It is *not* BIP-340: public keys are full SEC1 points and the challenge is
//! an untagged hash.
//!
//! ```text
//! sign:     R = k·G (k negated so R.y is even)   h = SHA256(R.x ‖ m)   s = k - h·x
//! verify:   R' = h·P + s·G, require R' ≠ O, R'.y even, R'.x = r
//! recover:  R = lift_x(r, even)                  P = h⁻¹ (R - s·G)
//! ```
//!
//! Signatures are 64 bytes `R.x ‖ s`.

use k256::elliptic_curve::point::{AffineCoordinates, DecompressPoint};
use k256::elliptic_curve::{Field, Group, PrimeField};
use k256::{AffinePoint, FieldBytes, ProjectivePoint, PublicKey, Scalar};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::codec::secret_scalar;
use super::context::{Capability, Context};
use super::error::{GatewayError, Result};
use super::nonce::{NonceRequest, SignOptions, SCHNORR_SHA256_ALGO16};

const OP_SIGN: &str = "schnorrSign";
const OP_VERIFY: &str = "schnorrVerify";
const OP_RECOVER: &str = "schnorrRecover";

const SIGN_FAIL: &str = "nonce generation function failed or private key is invalid";
const RECOVER_FAIL: &str = "couldn't recover public key from signature";

/// Challenge scalar `SHA256(r ‖ m)`; `None` if it is zero or overflows
fn challenge(r: &[u8; 32], message: &[u8; 32]) -> Option<Scalar> {
    let digest = Sha256::new().chain_update(r).chain_update(message).finalize();
    let h = Option::<Scalar>::from(Scalar::from_repr(digest))?;
    (!bool::from(h.is_zero())).then_some(h)
}

fn split(signature: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[..32]);
    s.copy_from_slice(&signature[32..]);
    (r, s)
}

/// Sign a 32-byte digest
///
/// Nonce functions receive the `"Schnorr+SHA256  "` algorithm tag, so the
/// default RFC 6979 nonce differs from the one ECDSA would use for the same
/// key and message.
pub fn sign(
    ctx: &Context,
    message: &[u8; 32],
    private_key: &[u8; 32],
    options: &SignOptions,
) -> Result<[u8; 64]> {
    ctx.require(Capability::Sign, OP_SIGN)?;

    let x = secret_scalar(private_key).ok_or_else(|| GatewayError::operation(OP_SIGN, SIGN_FAIL))?;
    let nonce_function = options.nonce_function();

    for attempt in 0..ctx.max_nonce_attempts() {
        let request = NonceRequest {
            message,
            private_key,
            algorithm: Some(&SCHNORR_SHA256_ALGO16),
            data: options.data.as_ref(),
            attempt,
        };

        let candidate = nonce_function
            .nonce(&request)
            .ok_or_else(|| GatewayError::operation(OP_SIGN, SIGN_FAIL))?;
        let Some(k) = secret_scalar(&candidate) else {
            continue;
        };

        if let Some(signature) = sign_with_nonce(&x, k, message) {
            debug!("Schnorr signature produced after {} attempt(s)", attempt + 1);
            return Ok(signature);
        }
    }

    Err(GatewayError::operation(OP_SIGN, "nonce attempts exhausted"))
}

fn sign_with_nonce(x: &Scalar, mut k: Scalar, message: &[u8; 32]) -> Option<[u8; 64]> {
    let big_r = (ProjectivePoint::GENERATOR * k).to_affine();
    if bool::from(big_r.y_is_odd()) {
        k = -k;
    }

    let r: [u8; 32] = big_r.x().into();
    let h = challenge(&r, message)?;
    let s = k - h * x;
    if bool::from(s.is_zero()) {
        return None;
    }

    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&r);
    out[32..].copy_from_slice(&s.to_bytes());
    Some(out)
}

/// Verify a signature; malformed signatures are simply invalid
pub fn verify(
    ctx: &Context,
    message: &[u8; 32],
    signature: &[u8; 64],
    public_key: &PublicKey,
) -> Result<bool> {
    ctx.require(Capability::Verify, OP_VERIFY)?;

    let (r, s) = split(signature);
    let Some(s) = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(s))) else {
        return Ok(false);
    };
    let Some(h) = challenge(&r, message) else {
        return Ok(false);
    };

    let candidate = public_key.to_projective() * h + ProjectivePoint::GENERATOR * s;
    if bool::from(candidate.is_identity()) {
        return Ok(false);
    }

    let candidate = candidate.to_affine();
    Ok(!bool::from(candidate.y_is_odd()) && candidate.x() == FieldBytes::from(r))
}

/// Recover the public key that produced a signature
pub fn recover(ctx: &Context, message: &[u8; 32], signature: &[u8; 64]) -> Result<PublicKey> {
    ctx.require(Capability::Verify, OP_RECOVER)?;
    let fail = || GatewayError::operation(OP_RECOVER, RECOVER_FAIL);

    let (r, s) = split(signature);
    let big_r = Option::<AffinePoint>::from(AffinePoint::decompress(
        &FieldBytes::from(r),
        0u8.into(),
    ))
    .ok_or_else(fail)?;
    let s = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(s))).ok_or_else(fail)?;
    let h = challenge(&r, message).ok_or_else(fail)?;
    let h_inv = Option::<Scalar>::from(h.invert()).ok_or_else(fail)?;

    let point = (ProjectivePoint::from(big_r) - ProjectivePoint::GENERATOR * s) * h_inv;
    PublicKey::from_affine(point.to_affine()).map_err(|_| fail())
}
