// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed Synchronous Operations
//!
//! Each method is one validate → decode → operate → encode pipeline over
//! caller-supplied byte slices. Length checks happen here, before anything
//! is handed to `crate::crypto`.

use crate::crypto::codec::{
    self, decode_public_key, decode_signature_compact, encode_public_key, encode_signature,
    DerParsing, PublicKeyFormat, RecoverableSignature, SignatureEncoding,
};
use crate::crypto::error::Result;
use crate::crypto::nonce::SignOptions;
use crate::crypto::validation::{self, Bytes, Role};
use crate::crypto::{ecdh, ecdsa, hash, keys, schnorr};

use super::Gateway;

/// Compact signature plus recovery id, as returned by [`Gateway::sign`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureOutput {
    pub signature: [u8; 64],
    pub recovery_id: u8,
}

impl From<&RecoverableSignature> for SignatureOutput {
    fn from(signature: &RecoverableSignature) -> Self {
        let (signature, recovery_id) = signature.encode();
        Self {
            signature,
            recovery_id,
        }
    }
}

impl Gateway {
    // ---- private keys ----

    /// True for a 32-byte scalar in `[1, n)`; false for anything else
    pub fn private_key_verify(&self, private_key: &[u8]) -> bool {
        keys::private_key_verify(private_key)
    }

    /// SEC1 DER export (214 bytes compressed, 279 uncompressed)
    pub fn private_key_export(&self, private_key: &[u8], format: PublicKeyFormat) -> Result<Vec<u8>> {
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        keys::private_key_export(&self.context, &private_key, format)
    }

    pub fn private_key_import(&self, der: &[u8]) -> Result<[u8; 32]> {
        let der = Bytes::new(Role::PrivateKey, der).non_empty()?;
        keys::private_key_import(der)
    }

    pub fn private_key_negate(&self, private_key: &[u8]) -> Result<[u8; 32]> {
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        keys::private_key_negate(&private_key)
    }

    pub fn private_key_tweak_add(&self, private_key: &[u8], tweak: &[u8]) -> Result<[u8; 32]> {
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        let tweak = Bytes::new(Role::Tweak, tweak).exact()?;
        keys::private_key_tweak_add(&private_key, &tweak)
    }

    pub fn private_key_tweak_mul(&self, private_key: &[u8], tweak: &[u8]) -> Result<[u8; 32]> {
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        let tweak = Bytes::new(Role::Tweak, tweak).exact()?;
        keys::private_key_tweak_mul(&private_key, &tweak)
    }

    // ---- public keys ----

    pub fn public_key_create(&self, private_key: &[u8], format: PublicKeyFormat) -> Result<Vec<u8>> {
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        let public_key = keys::public_key_create(&self.context, &private_key)?;
        Ok(encode_public_key(&public_key, format))
    }

    pub fn public_key_convert(&self, public_key: &[u8], format: PublicKeyFormat) -> Result<Vec<u8>> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        keys::public_key_convert(public_key, format)
    }

    /// True when the bytes parse as a curve point; any length is accepted
    pub fn public_key_verify(&self, public_key: &[u8]) -> bool {
        keys::public_key_verify(public_key)
    }

    pub fn public_key_negate(&self, public_key: &[u8], format: PublicKeyFormat) -> Result<Vec<u8>> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        let negated = keys::public_key_negate(&decode_public_key(public_key)?)?;
        Ok(encode_public_key(&negated, format))
    }

    pub fn public_key_tweak_add(
        &self,
        public_key: &[u8],
        tweak: &[u8],
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        let tweak = Bytes::new(Role::Tweak, tweak).exact()?;
        let tweaked = keys::public_key_tweak_add(&self.context, &decode_public_key(public_key)?, &tweak)?;
        Ok(encode_public_key(&tweaked, format))
    }

    pub fn public_key_tweak_mul(
        &self,
        public_key: &[u8],
        tweak: &[u8],
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        let tweak = Bytes::new(Role::Tweak, tweak).exact()?;
        let tweaked = keys::public_key_tweak_mul(&self.context, &decode_public_key(public_key)?, &tweak)?;
        Ok(encode_public_key(&tweaked, format))
    }

    /// Sum of the given public keys
    ///
    /// # Errors
    ///
    /// - `LengthInvalid` for an empty list or a key that is not 33/65 bytes
    /// - `ParseFail` when any key is not on the curve
    /// - `OperationFail` when the sum is the point at infinity
    pub fn public_key_combine<K: AsRef<[u8]>>(
        &self,
        public_keys: &[K],
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        validation::non_empty_list(Role::PublicKeys, public_keys)?;
        let decoded = public_keys
            .iter()
            .map(|key| decode_public_key(Bytes::new(Role::PublicKey, key.as_ref()).public_key()?))
            .collect::<Result<Vec<_>>>()?;
        let combined = keys::public_key_combine(&decoded)?;
        Ok(encode_public_key(&combined, format))
    }

    // ---- signature formats ----

    /// Low-S form of a compact signature
    pub fn signature_normalize(&self, signature: &[u8]) -> Result<[u8; 64]> {
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let normalized = ecdsa::normalize(&decode_signature_compact(&signature)?);
        Ok(normalized.encode())
    }

    /// Compact to strict DER
    pub fn signature_export(&self, signature: &[u8]) -> Result<Vec<u8>> {
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let signature = decode_signature_compact(&signature)?;
        Ok(encode_signature(&signature, SignatureEncoding::Der))
    }

    /// Strict DER to compact
    pub fn signature_import(&self, der: &[u8]) -> Result<[u8; 64]> {
        self.import_der(der, DerParsing::Strict)
    }

    /// Lax DER to compact
    pub fn signature_import_lax(&self, der: &[u8]) -> Result<[u8; 64]> {
        self.import_der(der, DerParsing::Lax)
    }

    fn import_der(&self, der: &[u8], parsing: DerParsing) -> Result<[u8; 64]> {
        let der = Bytes::new(Role::Signature, der).non_empty()?;
        let signature = codec::decode_signature_der(der, parsing)?;
        Ok(codec::encode_signature_compact(&signature))
    }

    // ---- ECDSA ----

    /// Sign a 32-byte digest, returning a low-S signature and recovery id
    pub fn sign(
        &self,
        message: &[u8],
        private_key: &[u8],
        options: &SignOptions,
    ) -> Result<SignatureOutput> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        let signature = ecdsa::sign(&self.context, &message, &private_key, options)?;
        Ok(SignatureOutput::from(&signature))
    }

    /// Verify a compact signature; `Ok(false)` on mismatch
    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;

        let signature = decode_signature_compact(&signature)?;
        let public_key = decode_public_key(public_key)?;
        ecdsa::verify(&self.context, &message, &signature, &public_key)
    }

    /// Recover the signer's public key; `recovery_id` must be in `[0, 3]`
    pub fn recover(
        &self,
        message: &[u8],
        signature: &[u8],
        recovery_id: i64,
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let recovery_id = validation::recovery_id(recovery_id)?;

        let signature = RecoverableSignature::decode(&signature, recovery_id)?;
        let public_key = ecdsa::recover(&self.context, &message, &signature)?;
        Ok(encode_public_key(&public_key, format))
    }

    // ---- ECDH ----

    /// SHA-256 of the compressed shared point
    pub fn ecdh(&self, public_key: &[u8], private_key: &[u8]) -> Result<[u8; 32]> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        ecdh::ecdh(&decode_public_key(public_key)?, &private_key)
    }

    /// The serialized shared point, unhashed
    pub fn ecdh_unsafe(
        &self,
        public_key: &[u8],
        private_key: &[u8],
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        let shared = ecdh::ecdh_unsafe(&decode_public_key(public_key)?, &private_key)?;
        Ok(encode_public_key(&shared, format))
    }

    // ---- Schnorr ----

    pub fn schnorr_sign(
        &self,
        message: &[u8],
        private_key: &[u8],
        options: &SignOptions,
    ) -> Result<[u8; 64]> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let private_key = Bytes::new(Role::PrivateKey, private_key).exact()?;
        schnorr::sign(&self.context, &message, &private_key, options)
    }

    pub fn schnorr_verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let public_key = Bytes::new(Role::PublicKey, public_key).public_key()?;
        schnorr::verify(&self.context, &message, &signature, &decode_public_key(public_key)?)
    }

    pub fn schnorr_recover(
        &self,
        message: &[u8],
        signature: &[u8],
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let message = Bytes::new(Role::Message, message).exact()?;
        let signature = Bytes::new(Role::Signature, signature).exact()?;
        let public_key = schnorr::recover(&self.context, &message, &signature)?;
        Ok(encode_public_key(&public_key, format))
    }

    // ---- hashing ----

    pub fn sha256(&self, data: &[u8]) -> [u8; 32] {
        hash::sha256(data)
    }

    pub fn sha256d(&self, data: &[u8]) -> [u8; 32] {
        hash::sha256d(data)
    }
}
