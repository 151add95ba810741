// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request and Response Types
//!
//! The dynamic surface of the gateway: an [`Operation`] plus a positional
//! list of [`Value`]s in, an [`Output`] out. Values own their bytes, so a
//! request can be moved onto a worker thread as-is.

use serde_json::json;
use std::fmt;
use std::sync::Arc;

use crate::crypto::nonce::NonceFunction;

/// Named gateway operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `[private_key]` → bool
    PrivateKeyVerify,
    /// `[private_key, compressed?]` → DER
    PrivateKeyExport,
    /// `[der]` → private key
    PrivateKeyImport,
    /// `[private_key]` → private key
    PrivateKeyNegate,
    /// `[private_key, tweak]` → private key
    PrivateKeyTweakAdd,
    /// `[private_key, tweak]` → private key
    PrivateKeyTweakMul,
    /// `[private_key, compressed?]` → public key
    PublicKeyCreate,
    /// `[public_key, compressed?]` → public key
    PublicKeyConvert,
    /// `[public_key]` → bool
    PublicKeyVerify,
    /// `[public_key, compressed?]` → public key
    PublicKeyNegate,
    /// `[public_key, tweak, compressed?]` → public key
    PublicKeyTweakAdd,
    /// `[public_key, tweak, compressed?]` → public key
    PublicKeyTweakMul,
    /// `[[public_key, ...], compressed?]` → public key
    PublicKeyCombine,
    /// `[signature]` → signature
    SignatureNormalize,
    /// `[signature]` → DER
    SignatureExport,
    /// `[der]` → signature
    SignatureImport,
    /// `[der]` → signature
    SignatureImportLax,
    /// `[message, private_key, nonce_data?, nonce_function?]` → signature + recovery id
    Sign,
    /// `[message, signature, public_key]` → bool
    Verify,
    /// `[message, signature, recovery_id, compressed?]` → public key
    Recover,
    /// `[public_key, private_key]` → 32-byte secret
    Ecdh,
    /// `[public_key, private_key, compressed?]` → shared point
    EcdhUnsafe,
    /// `[message, private_key, nonce_data?, nonce_function?]` → signature
    SchnorrSign,
    /// `[message, signature, public_key]` → bool
    SchnorrVerify,
    /// `[message, signature, compressed?]` → public key
    SchnorrRecover,
    /// `[data]` → digest
    Sha256,
    /// `[data]` → digest
    Sha256d,
}

impl Operation {
    /// Name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Operation::PrivateKeyVerify => "privateKeyVerify",
            Operation::PrivateKeyExport => "privateKeyExport",
            Operation::PrivateKeyImport => "privateKeyImport",
            Operation::PrivateKeyNegate => "privateKeyNegate",
            Operation::PrivateKeyTweakAdd => "privateKeyTweakAdd",
            Operation::PrivateKeyTweakMul => "privateKeyTweakMul",
            Operation::PublicKeyCreate => "publicKeyCreate",
            Operation::PublicKeyConvert => "publicKeyConvert",
            Operation::PublicKeyVerify => "publicKeyVerify",
            Operation::PublicKeyNegate => "publicKeyNegate",
            Operation::PublicKeyTweakAdd => "publicKeyTweakAdd",
            Operation::PublicKeyTweakMul => "publicKeyTweakMul",
            Operation::PublicKeyCombine => "publicKeyCombine",
            Operation::SignatureNormalize => "signatureNormalize",
            Operation::SignatureExport => "signatureExport",
            Operation::SignatureImport => "signatureImport",
            Operation::SignatureImportLax => "signatureImportLax",
            Operation::Sign => "sign",
            Operation::Verify => "verify",
            Operation::Recover => "recover",
            Operation::Ecdh => "ecdh",
            Operation::EcdhUnsafe => "ecdhUnsafe",
            Operation::SchnorrSign => "schnorrSign",
            Operation::SchnorrVerify => "schnorrVerify",
            Operation::SchnorrRecover => "schnorrRecover",
            Operation::Sha256 => "sha256",
            Operation::Sha256d => "sha256d",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One positional argument
#[derive(Clone)]
pub enum Value {
    /// Absent optional argument
    Null,
    Bool(bool),
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    NonceFunction(Arc<dyn NonceFunction>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            // Length only: arguments may be secret keys
            Value::Bytes(bytes) => write!(f, "Bytes(<{} bytes>)", bytes.len()),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::NonceFunction(_) => f.write_str("NonceFunction(..)"),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Arc<dyn NonceFunction>> for Value {
    fn from(f: Arc<dyn NonceFunction>) -> Self {
        Value::NonceFunction(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Result of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Bytes(Vec<u8>),
    Bool(bool),
    /// Compact signature and recovery id from `sign`
    Signature { signature: Vec<u8>, recovery_id: u8 },
}

impl Output {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Output::Bytes(bytes) => Some(bytes),
            Output::Signature { signature, .. } => Some(signature),
            Output::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Output::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn recovery_id(&self) -> Option<u8> {
        match self {
            Output::Signature { recovery_id, .. } => Some(*recovery_id),
            _ => None,
        }
    }

    /// JSON rendering with hex-encoded bytes
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Output::Bytes(bytes) => json!(hex::encode(bytes)),
            Output::Bool(b) => json!(b),
            Output::Signature {
                signature,
                recovery_id,
            } => json!({
                "signature": hex::encode(signature),
                "recoveryId": recovery_id,
            }),
        }
    }
}
