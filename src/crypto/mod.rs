// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! secp256k1 Operation Core
//!
//! Typed building blocks the gateway dispatches to. Everything here works on
//! already-sized inputs (`[u8; 32]`, `k256::PublicKey`, ...); byte-length and
//! type checks happen one layer up in [`crate::gateway`].
//!
//! - **ECDSA**: recoverable low-S signing with a pluggable nonce hook, verify, recover
//! - **Keys**: create, verify, negate, tweak add/mul, combine, SEC1 DER export/import
//! - **ECDH**: hashed shared secret and raw shared point
//! - **Schnorr**: legacy libsecp256k1 Schnorr sign/verify/recover
//! - **Codec / DER**: compressed/uncompressed keys, compact/DER/lax DER signatures
//!
//! ## Security Considerations
//!
//! - Curve arithmetic is delegated to `k256` (constant-time scalar and point ops)
//! - Key material is never logged and never outlives a single call
//! - The shared [`Context`] is immutable after construction
//!
//! ## Pipeline
//!
//! 1. Validate argument shapes and lengths (`validation`)
//! 2. Decode wire bytes (`codec`, `der`)
//! 3. Run the curve operation (`ecdsa`, `keys`, `ecdh`, `schnorr`)
//! 4. Encode the result (`codec`)

pub mod codec;
pub mod context;
pub mod der;
pub mod ecdh;
pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod keys;
pub mod nonce;
pub mod schnorr;
pub mod validation;

pub use codec::{
    convert_recoverable_to_plain, decode_public_key, decode_signature_compact,
    decode_signature_der, encode_public_key, encode_signature, encode_signature_compact,
    CompactSignature, DerParsing, PublicKeyFormat, RecoverableSignature, SignatureEncoding,
};
pub use context::{Capability, Context, ContextFlags};
pub use error::{ErrorKind, GatewayError, Result};
pub use hash::{sha256, sha256d};
pub use nonce::{NonceFunction, NonceRequest, Rfc6979, SignOptions};
pub use validation::{Bytes, Integer, LengthRule, Role, ValueType};
