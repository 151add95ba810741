// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDH Shared Secrets
//!
//! Two variants over the same shared point `S = d·P`:
//!
//! - [`ecdh`]: SHA-256 of the compressed encoding of `S` (32 bytes), the
//!   libsecp256k1 default
//! - [`ecdh_unsafe`]: `S` itself, for protocols that run their own KDF
//!
//! Both are symmetric: `ecdh(pub(a), b) == ecdh(pub(b), a)`.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, PublicKey};
use sha2::{Digest, Sha256};

use super::codec::secret_scalar;
use super::error::{GatewayError, Result};

const OP_ECDH: &str = "ecdh";
const ECDH_FAIL: &str = "scalar was invalid (zero or overflow)";

fn shared_point(public_key: &PublicKey, private_key: &[u8; 32]) -> Result<ProjectivePoint> {
    let d = secret_scalar(private_key).ok_or_else(|| GatewayError::operation(OP_ECDH, ECDH_FAIL))?;
    Ok(public_key.to_projective() * d)
}

/// SHA-256 of the compressed shared point
///
/// # Example
///
/// ```ignore
/// let alice = ecdh(&bob_public, &alice_secret)?;
/// let bob = ecdh(&alice_public, &bob_secret)?;
/// assert_eq!(alice, bob);
/// ```
pub fn ecdh(public_key: &PublicKey, private_key: &[u8; 32]) -> Result<[u8; 32]> {
    let shared = shared_point(public_key, private_key)?;
    let encoded = shared.to_affine().to_encoded_point(true);
    Ok(Sha256::digest(encoded.as_bytes()).into())
}

/// The shared point itself, unhashed
pub fn ecdh_unsafe(public_key: &PublicKey, private_key: &[u8; 32]) -> Result<PublicKey> {
    let shared = shared_point(public_key, private_key)?;
    // d is nonzero and the group has prime order, so S is never infinity
    PublicKey::from_affine(shared.to_affine())
        .map_err(|_| GatewayError::operation(OP_ECDH, "shared point is at infinity"))
}
