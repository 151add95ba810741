// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Nonce Customization Hook
//!
//! Signing asks a [`NonceFunction`] for candidate nonces, one attempt at a
//! time, until a candidate produces a valid signature. Any closure of the
//! right shape is a nonce function; [`Rfc6979`] is the default.
//!
//! The request mirrors libsecp256k1's `noncefp(msg32, key32, algo16, data, attempt)`:
//! returning `None` aborts the signature, returning a scalar that is zero,
//! too large, or leads to `r = 0`/`s = 0` triggers the next attempt.
//!
//! Hooks are shared as `Arc<dyn NonceFunction>`, so they cross onto worker
//! threads without copying and must be `Send + Sync`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag the Schnorr signer passes to nonce functions
pub const SCHNORR_SHA256_ALGO16: [u8; 16] = *b"Schnorr+SHA256  ";

/// Inputs handed to a nonce function for one attempt
#[derive(Debug, Clone, Copy)]
pub struct NonceRequest<'a> {
    /// 32-byte message digest, reduced modulo the curve order
    pub message: &'a [u8; 32],
    pub private_key: &'a [u8; 32],
    /// Algorithm tag; `None` for ECDSA
    pub algorithm: Option<&'a [u8; 16]>,
    /// Caller supplied extra entropy
    pub data: Option<&'a [u8; 32]>,
    /// Zero on the first call, incremented on every retry
    pub attempt: u32,
}

/// Source of signing nonces
pub trait NonceFunction: Send + Sync {
    /// Produce the nonce for this attempt, or `None` to abort signing
    fn nonce(&self, request: &NonceRequest<'_>) -> Option<[u8; 32]>;
}

impl<F> NonceFunction for F
where
    F: Fn(&NonceRequest<'_>) -> Option<[u8; 32]> + Send + Sync,
{
    fn nonce(&self, request: &NonceRequest<'_>) -> Option<[u8; 32]> {
        self(request)
    }
}

/// Wrap a closure as a shareable nonce function
///
/// ```ignore
/// let fixed = nonce::from_fn(|_req| Some([0x01; 32]));
/// let options = SignOptions::with_nonce_function(fixed);
/// ```
pub fn from_fn<F>(f: F) -> Arc<dyn NonceFunction>
where
    F: Fn(&NonceRequest<'_>) -> Option<[u8; 32]> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Optional nonce material for a single sign call
#[derive(Clone, Default)]
pub struct SignOptions {
    /// Extra entropy mixed into the nonce
    pub data: Option<[u8; 32]>,
    /// Replacement for the RFC 6979 default
    pub nonce_function: Option<Arc<dyn NonceFunction>>,
}

impl SignOptions {
    pub fn with_data(data: [u8; 32]) -> Self {
        Self {
            data: Some(data),
            nonce_function: None,
        }
    }

    pub fn with_nonce_function(nonce_function: Arc<dyn NonceFunction>) -> Self {
        Self {
            data: None,
            nonce_function: Some(nonce_function),
        }
    }

    /// The configured hook, or RFC 6979
    pub fn nonce_function(&self) -> &dyn NonceFunction {
        match &self.nonce_function {
            Some(f) => f.as_ref(),
            None => &Rfc6979,
        }
    }
}

impl fmt::Debug for SignOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignOptions")
            .field("data", &self.data.map(hex::encode))
            .field("nonce_function", &self.nonce_function.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Deterministic nonces per RFC 6979 (HMAC-SHA256 DRBG)
///
/// Seeded with `key ‖ message ‖ data? ‖ algorithm?`. Attempt `n` returns the
/// `n + 1`-th DRBG output, so with no extra data the first attempt matches
/// plain RFC 6979 ECDSA.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc6979;

impl NonceFunction for Rfc6979 {
    fn nonce(&self, request: &NonceRequest<'_>) -> Option<[u8; 32]> {
        let mut seed = Vec::with_capacity(112);
        seed.extend_from_slice(request.private_key);
        seed.extend_from_slice(request.message);
        if let Some(data) = request.data {
            seed.extend_from_slice(data);
        }
        if let Some(algorithm) = request.algorithm {
            seed.extend_from_slice(algorithm);
        }

        let mut drbg = HmacDrbg::new(&seed)?;
        let mut nonce = drbg.generate()?;
        for _ in 0..request.attempt {
            nonce = drbg.generate()?;
        }
        Some(nonce)
    }
}

/// HMAC-SHA256 DRBG restricted to 32-byte outputs
struct HmacDrbg {
    k: [u8; 32],
    v: [u8; 32],
    retry: bool,
}

impl HmacDrbg {
    fn new(seed: &[u8]) -> Option<Self> {
        let mut k = [0u8; 32];
        let mut v = [1u8; 32];

        k = hmac(&k, &[&v[..], &[0x00u8], seed])?;
        v = hmac(&k, &[&v[..]])?;
        k = hmac(&k, &[&v[..], &[0x01u8], seed])?;
        v = hmac(&k, &[&v[..]])?;

        Some(Self { k, v, retry: false })
    }

    fn generate(&mut self) -> Option<[u8; 32]> {
        if self.retry {
            self.k = hmac(&self.k, &[&self.v[..], &[0x00u8]])?;
            self.v = hmac(&self.k, &[&self.v[..]])?;
        }
        self.v = hmac(&self.k, &[&self.v[..]])?;
        self.retry = true;
        Some(self.v)
    }
}

fn hmac(key: &[u8; 32], parts: &[&[u8]]) -> Option<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    for part in parts {
        mac.update(part);
    }
    Some(mac.finalize().into_bytes().into())
}
