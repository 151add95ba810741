// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Positional-Argument Dispatcher
//!
//! Maps an [`Operation`] and its `[Value]` arguments onto the typed gateway
//! methods. This layer owns the *type* stage of validation (bytes vs integer
//! vs flag vs list vs nonce function); lengths and ranges are checked by the
//! typed methods it calls.
//!
//! Missing trailing arguments and [`Value::Null`] both mean "absent".

use std::sync::Arc;
use tracing::debug;

use crate::crypto::codec::PublicKeyFormat;
use crate::crypto::error::{GatewayError, Result};
use crate::crypto::nonce::{NonceFunction, SignOptions};
use crate::crypto::validation::{Bytes, Role, ValueType};

use super::request::{Operation, Output, Value};
use super::Gateway;

/// Typed view over positional arguments
pub(crate) struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    fn get(&self, index: usize) -> Option<&'a Value> {
        match self.values.get(index) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn type_error(role: Role, expected: ValueType) -> GatewayError {
        GatewayError::TypeInvalid { role, expected }
    }

    /// Required byte buffer
    pub(crate) fn bytes(&self, index: usize, role: Role) -> Result<&'a [u8]> {
        match self.get(index) {
            Some(Value::Bytes(bytes)) => Ok(bytes),
            _ => Err(Self::type_error(role, ValueType::Bytes)),
        }
    }

    /// Optional byte buffer
    pub(crate) fn optional_bytes(&self, index: usize, role: Role) -> Result<Option<&'a [u8]>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Bytes(bytes)) => Ok(Some(bytes)),
            Some(_) => Err(Self::type_error(role, ValueType::Bytes)),
        }
    }

    pub(crate) fn integer(&self, index: usize, role: Role) -> Result<i64> {
        match self.get(index) {
            Some(Value::Int(i)) => Ok(*i),
            _ => Err(Self::type_error(role, ValueType::Integer)),
        }
    }

    /// Optional boolean with a default
    pub(crate) fn flag(&self, index: usize, role: Role, default: bool) -> Result<bool> {
        match self.get(index) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(Self::type_error(role, ValueType::Boolean)),
        }
    }

    pub(crate) fn list(&self, index: usize, role: Role) -> Result<&'a [Value]> {
        match self.get(index) {
            Some(Value::List(items)) => Ok(items),
            _ => Err(Self::type_error(role, ValueType::List)),
        }
    }

    pub(crate) fn nonce_function(&self, index: usize) -> Result<Option<Arc<dyn NonceFunction>>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::NonceFunction(f)) => Ok(Some(f.clone())),
            Some(_) => Err(Self::type_error(Role::NonceFunction, ValueType::NonceFunction)),
        }
    }
}

/// Execute one operation synchronously
///
/// Shared by [`Gateway::call`] and the worker jobs behind
/// [`Gateway::call_async`], so both paths behave identically.
pub(crate) fn execute(gateway: &Gateway, operation: Operation, values: &[Value]) -> Result<Output> {
    debug!("Dispatching {} with {} argument(s)", operation, values.len());
    let args = Args::new(values);

    let format = |index: usize| -> Result<PublicKeyFormat> {
        let default = gateway.default_format().is_compressed();
        args.flag(index, Role::Compressed, default)
            .map(PublicKeyFormat::from_compressed)
    };

    let output = match operation {
        Operation::PrivateKeyVerify => {
            Output::Bool(gateway.private_key_verify(args.bytes(0, Role::PrivateKey)?))
        }
        Operation::PrivateKeyExport => {
            let key = args.bytes(0, Role::PrivateKey)?;
            Output::Bytes(gateway.private_key_export(key, format(1)?)?)
        }
        Operation::PrivateKeyImport => {
            let der = args.bytes(0, Role::PrivateKey)?;
            Output::Bytes(gateway.private_key_import(der)?.to_vec())
        }
        Operation::PrivateKeyNegate => {
            let key = args.bytes(0, Role::PrivateKey)?;
            Output::Bytes(gateway.private_key_negate(key)?.to_vec())
        }
        Operation::PrivateKeyTweakAdd => {
            let key = args.bytes(0, Role::PrivateKey)?;
            let tweak = args.bytes(1, Role::Tweak)?;
            Output::Bytes(gateway.private_key_tweak_add(key, tweak)?.to_vec())
        }
        Operation::PrivateKeyTweakMul => {
            let key = args.bytes(0, Role::PrivateKey)?;
            let tweak = args.bytes(1, Role::Tweak)?;
            Output::Bytes(gateway.private_key_tweak_mul(key, tweak)?.to_vec())
        }
        Operation::PublicKeyCreate => {
            let key = args.bytes(0, Role::PrivateKey)?;
            Output::Bytes(gateway.public_key_create(key, format(1)?)?)
        }
        Operation::PublicKeyConvert => {
            let key = args.bytes(0, Role::PublicKey)?;
            Output::Bytes(gateway.public_key_convert(key, format(1)?)?)
        }
        Operation::PublicKeyVerify => {
            Output::Bool(gateway.public_key_verify(args.bytes(0, Role::PublicKey)?))
        }
        Operation::PublicKeyNegate => {
            let key = args.bytes(0, Role::PublicKey)?;
            Output::Bytes(gateway.public_key_negate(key, format(1)?)?)
        }
        Operation::PublicKeyTweakAdd => {
            let key = args.bytes(0, Role::PublicKey)?;
            let tweak = args.bytes(1, Role::Tweak)?;
            Output::Bytes(gateway.public_key_tweak_add(key, tweak, format(2)?)?)
        }
        Operation::PublicKeyTweakMul => {
            let key = args.bytes(0, Role::PublicKey)?;
            let tweak = args.bytes(1, Role::Tweak)?;
            Output::Bytes(gateway.public_key_tweak_mul(key, tweak, format(2)?)?)
        }
        Operation::PublicKeyCombine => {
            let items = args.list(0, Role::PublicKeys)?;
            let keys = Args::new(items);
            let keys = (0..items.len())
                .map(|i| keys.bytes(i, Role::PublicKey))
                .collect::<Result<Vec<_>>>()?;
            Output::Bytes(gateway.public_key_combine(&keys, format(1)?)?)
        }
        Operation::SignatureNormalize => {
            let signature = args.bytes(0, Role::Signature)?;
            Output::Bytes(gateway.signature_normalize(signature)?.to_vec())
        }
        Operation::SignatureExport => {
            let signature = args.bytes(0, Role::Signature)?;
            Output::Bytes(gateway.signature_export(signature)?)
        }
        Operation::SignatureImport => {
            let der = args.bytes(0, Role::Signature)?;
            Output::Bytes(gateway.signature_import(der)?.to_vec())
        }
        Operation::SignatureImportLax => {
            let der = args.bytes(0, Role::Signature)?;
            Output::Bytes(gateway.signature_import_lax(der)?.to_vec())
        }
        Operation::Sign => {
            let message = args.bytes(0, Role::Message)?;
            let key = args.bytes(1, Role::PrivateKey)?;
            let options = sign_options(&args, 2)?;
            let signed = gateway.sign(message, key, &options)?;
            Output::Signature {
                signature: signed.signature.to_vec(),
                recovery_id: signed.recovery_id,
            }
        }
        Operation::Verify => {
            let message = args.bytes(0, Role::Message)?;
            let signature = args.bytes(1, Role::Signature)?;
            let key = args.bytes(2, Role::PublicKey)?;
            Output::Bool(gateway.verify(message, signature, key)?)
        }
        Operation::Recover => {
            let message = args.bytes(0, Role::Message)?;
            let signature = args.bytes(1, Role::Signature)?;
            let recovery_id = args.integer(2, Role::RecoveryId)?;
            Output::Bytes(gateway.recover(message, signature, recovery_id, format(3)?)?)
        }
        Operation::Ecdh => {
            let public_key = args.bytes(0, Role::PublicKey)?;
            let private_key = args.bytes(1, Role::PrivateKey)?;
            Output::Bytes(gateway.ecdh(public_key, private_key)?.to_vec())
        }
        Operation::EcdhUnsafe => {
            let public_key = args.bytes(0, Role::PublicKey)?;
            let private_key = args.bytes(1, Role::PrivateKey)?;
            Output::Bytes(gateway.ecdh_unsafe(public_key, private_key, format(2)?)?)
        }
        Operation::SchnorrSign => {
            let message = args.bytes(0, Role::Message)?;
            let key = args.bytes(1, Role::PrivateKey)?;
            let options = sign_options(&args, 2)?;
            Output::Bytes(gateway.schnorr_sign(message, key, &options)?.to_vec())
        }
        Operation::SchnorrVerify => {
            let message = args.bytes(0, Role::Message)?;
            let signature = args.bytes(1, Role::Signature)?;
            let key = args.bytes(2, Role::PublicKey)?;
            Output::Bool(gateway.schnorr_verify(message, signature, key)?)
        }
        Operation::SchnorrRecover => {
            let message = args.bytes(0, Role::Message)?;
            let signature = args.bytes(1, Role::Signature)?;
            Output::Bytes(gateway.schnorr_recover(message, signature, format(2)?)?)
        }
        Operation::Sha256 => Output::Bytes(gateway.sha256(args.bytes(0, Role::Data)?).to_vec()),
        Operation::Sha256d => Output::Bytes(gateway.sha256d(args.bytes(0, Role::Data)?).to_vec()),
    };

    Ok(output)
}

/// `[.., nonce_data?, nonce_function?]` starting at `index`
fn sign_options(args: &Args<'_>, index: usize) -> Result<SignOptions> {
    let data = args
        .optional_bytes(index, Role::NonceData)?
        .map(|data| Bytes::new(Role::NonceData, data).exact::<32>())
        .transpose()?;
    let nonce_function = args.nonce_function(index + 1)?;
    Ok(SignOptions {
        data,
        nonce_function,
    })
}
