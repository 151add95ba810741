// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wire Format Codec
//!
//! Converts between wire bytes and the primitive library's in-memory types:
//!
//! | Wire form | In memory |
//! |---|---|
//! | 33/65-byte SEC1 public key | `k256::PublicKey` |
//! | 64-byte compact `r ‖ s` | [`CompactSignature`] |
//! | DER (strict or lax) | `k256::ecdsa::Signature` |
//! | compact + recovery id | [`RecoverableSignature`] |
//!
//! Formats are tagged variants ([`PublicKeyFormat`], [`SignatureEncoding`],
//! [`DerParsing`]) instead of boolean flags.

use k256::ecdsa::{RecoveryId, Signature};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, PublicKey, Scalar};

use super::der;
use super::error::{GatewayError, Result};
use super::validation::Role;

const PUBLIC_KEY_PARSE_FAIL: &str = "the public key could not be parsed or is invalid";
const SIGNATURE_PARSE_FAIL: &str = "r or s is zero or not below the curve order";
const SIGNATURE_OVERFLOW: &str = "r or s is not below the curve order";

const OP_RECOVER: &str = "recover";
const RECOVER_FAIL: &str = "couldn't recover public key from signature";

/// Serialized public key layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicKeyFormat {
    /// 33 bytes, `0x02`/`0x03` prefix
    #[default]
    Compressed,
    /// 65 bytes, `0x04` prefix
    Uncompressed,
}

impl PublicKeyFormat {
    pub fn from_compressed(compressed: bool) -> Self {
        if compressed {
            PublicKeyFormat::Compressed
        } else {
            PublicKeyFormat::Uncompressed
        }
    }

    pub fn is_compressed(self) -> bool {
        self == PublicKeyFormat::Compressed
    }

    /// Serialized length in bytes
    pub fn len(self) -> usize {
        match self {
            PublicKeyFormat::Compressed => 33,
            PublicKeyFormat::Uncompressed => 65,
        }
    }
}

/// Output encoding for a plain ECDSA signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEncoding {
    Compact,
    Der,
}

/// How forgiving DER decoding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerParsing {
    /// Minimal-length ASN.1, no trailing bytes
    #[default]
    Strict,
    /// Accepts historical non-conformant encoders
    Lax,
}

/// ECDSA signature plus the recovery id naming the signer's key candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    pub fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Decode 64 compact bytes plus a recovery id in `[0, 3]`
    ///
    /// An overflowing half is a `ParseFail`; a zero half names no key, so it
    /// fails the recovery itself with `OperationFail`.
    pub fn decode(bytes: &[u8; 64], recovery_id: u8) -> Result<Self> {
        let signature = decode_signature_compact(bytes)?
            .to_signature()
            .ok_or_else(|| GatewayError::operation(OP_RECOVER, RECOVER_FAIL))?;
        let recovery_id = RecoveryId::from_byte(recovery_id)
            .ok_or_else(|| GatewayError::parse(Role::RecoveryId, "recovery id out of range"))?;
        Ok(Self::new(signature, recovery_id))
    }

    /// Compact bytes and the recovery id as a byte
    pub fn encode(&self) -> ([u8; 64], u8) {
        (encode_signature_compact(&self.signature), self.recovery_id.to_byte())
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn recovery_id(&self) -> RecoveryId {
        self.recovery_id
    }
}

/// Drop the recovery id
pub fn convert_recoverable_to_plain(signature: &RecoverableSignature) -> Signature {
    signature.signature
}

/// Decode a compressed or uncompressed SEC1 public key
pub fn decode_public_key(bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| GatewayError::parse(Role::PublicKey, PUBLIC_KEY_PARSE_FAIL))
}

/// Serialize a public key; 33 or 65 bytes depending on `format`
pub fn encode_public_key(key: &PublicKey, format: PublicKeyFormat) -> Vec<u8> {
    key.to_encoded_point(format.is_compressed())
        .as_bytes()
        .to_vec()
}

/// Compact `r ‖ s` as it arrives on the wire
///
/// Both halves are below the curve order, but either may be zero. A zero half
/// survives normalization and export unchanged and never verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSignature {
    r: Scalar,
    s: Scalar,
}

impl CompactSignature {
    pub(crate) fn from_scalars(r: Scalar, s: Scalar) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> Scalar {
        self.r
    }

    pub fn s(&self) -> Scalar {
        self.s
    }

    pub fn encode(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// The primitive library's signature; `None` when r or s is zero
    pub fn to_signature(&self) -> Option<Signature> {
        Signature::from_scalars(self.r.to_bytes(), self.s.to_bytes()).ok()
    }
}

impl From<&Signature> for CompactSignature {
    fn from(signature: &Signature) -> Self {
        Self {
            r: *signature.r().as_ref(),
            s: *signature.s().as_ref(),
        }
    }
}

/// Decode 64-byte `r ‖ s`; fails only when a half is not below the order
pub fn decode_signature_compact(bytes: &[u8; 64]) -> Result<CompactSignature> {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    match (tweak_scalar(&r), tweak_scalar(&s)) {
        (Some(r), Some(s)) => Ok(CompactSignature { r, s }),
        _ => Err(GatewayError::parse(Role::Signature, SIGNATURE_OVERFLOW)),
    }
}

pub fn encode_signature_compact(signature: &Signature) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&signature.to_bytes());
    out
}

/// Decode a DER signature in the requested parsing mode
pub fn decode_signature_der(bytes: &[u8], parsing: DerParsing) -> Result<Signature> {
    let parts = match parsing {
        DerParsing::Strict => der::parse_signature_strict(bytes),
        DerParsing::Lax => der::parse_signature_lax(bytes),
    };
    let (r, s) = parts.ok_or_else(|| GatewayError::parse(Role::Signature, der::PARSE_DER_FAIL))?;
    signature_from_parts(&r, &s)
}

pub fn encode_signature(signature: &CompactSignature, encoding: SignatureEncoding) -> Vec<u8> {
    match encoding {
        SignatureEncoding::Compact => signature.encode().to_vec(),
        SignatureEncoding::Der => der::serialize_signature(signature),
    }
}

pub(crate) fn signature_from_parts(r: &[u8; 32], s: &[u8; 32]) -> Result<Signature> {
    Signature::from_scalars(FieldBytes::from(*r), FieldBytes::from(*s))
        .map_err(|_| GatewayError::parse(Role::Signature, SIGNATURE_PARSE_FAIL))
}

/// Scalar in `[1, n)`, the range of valid private keys
pub(crate) fn secret_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    tweak_scalar(bytes).filter(|k| !bool::from(k.is_zero()))
}

/// Scalar in `[0, n)`
pub(crate) fn tweak_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
}

pub(crate) fn scalar_bytes(scalar: &Scalar) -> [u8; 32] {
    scalar.to_bytes().into()
}
