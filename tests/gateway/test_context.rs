// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for context capabilities and gateway configuration

use secp256k1_gateway::crypto::{Context, ContextFlags, ErrorKind, PublicKeyFormat, SignOptions};
use secp256k1_gateway::{Gateway, GatewayConfig, Operation, Value};
use std::io::Write;
use std::sync::Arc;

const KEY: [u8; 32] = [0x21; 32];

fn gateway_with(flags: ContextFlags) -> Gateway {
    Gateway::new(GatewayConfig {
        context: flags,
        worker_threads: 1,
        ..GatewayConfig::default()
    })
    .unwrap()
}

#[test]
fn test_verify_only_context() {
    let signer = gateway_with(ContextFlags::ALL);
    let verifier = gateway_with(ContextFlags::VERIFY);

    let message = [5u8; 32];
    let signed = signer.sign(&message, &KEY, &SignOptions::default()).unwrap();
    let public = signer.public_key_create(&KEY, PublicKeyFormat::Compressed).unwrap();

    assert!(verifier.verify(&message, &signed.signature, &public).unwrap());
    assert_eq!(
        verifier
            .recover(&message, &signed.signature, signed.recovery_id as i64, PublicKeyFormat::Compressed)
            .unwrap(),
        public
    );

    for err in [
        verifier.sign(&message, &KEY, &SignOptions::default()).unwrap_err(),
        verifier.public_key_create(&KEY, PublicKeyFormat::Compressed).unwrap_err(),
        verifier.schnorr_sign(&message, &KEY, &SignOptions::default()).unwrap_err(),
        verifier.private_key_export(&KEY, PublicKeyFormat::Compressed).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::OperationFail);
    }
}

#[test]
fn test_sign_only_context() {
    let signer = gateway_with(ContextFlags::SIGN);
    let message = [6u8; 32];
    let signed = signer.sign(&message, &KEY, &SignOptions::default()).unwrap();
    let public = signer.public_key_create(&KEY, PublicKeyFormat::Compressed).unwrap();

    let err = signer.verify(&message, &signed.signature, &public).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);

    let err = signer
        .public_key_tweak_add(&public, &[1u8; 32], PublicKeyFormat::Compressed)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);

    // Capability-free operations still work
    assert!(signer.private_key_tweak_add(&KEY, &[1u8; 32]).is_ok());
    assert!(signer.ecdh(&public, &KEY).is_ok());
}

#[test]
fn test_shared_context_across_gateways() {
    let context = Context::global();
    let a = Gateway::with_context(context.clone(), 1);
    let b = Gateway::with_context(Context::global(), 1);
    assert!(Arc::ptr_eq(a.context(), b.context()));
    assert_eq!(a.context().flags(), ContextFlags::ALL);
}

#[test]
fn test_nonce_attempt_cap_from_config() {
    let gw = Gateway::new(GatewayConfig {
        max_nonce_attempts: 3,
        worker_threads: 1,
        ..GatewayConfig::default()
    })
    .unwrap();
    assert_eq!(gw.context().max_nonce_attempts(), 3);

    // Always-zero nonces are retried until the cap is reached
    let zero = secp256k1_gateway::crypto::nonce::from_fn(|_req| Some([0u8; 32]));
    let err = gw
        .sign(&[1u8; 32], &KEY, &SignOptions::with_nonce_function(zero))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);
    assert!(err.to_string().contains("exhausted"));
}

#[test]
fn test_invalid_config_rejected() {
    let result = Gateway::new(GatewayConfig {
        worker_threads: 0,
        ..GatewayConfig::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_config_file_sets_default_format() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "compressed = false").unwrap();
    writeln!(file, "worker_threads = 2").unwrap();

    let config = GatewayConfig::from_toml_file(file.path()).unwrap();
    let gw = Gateway::new(config).unwrap();
    assert_eq!(gw.default_format(), PublicKeyFormat::Uncompressed);
    assert_eq!(gw.pool().size(), 2);

    let out = gw
        .call(Operation::PublicKeyCreate, &[Value::from(KEY)])
        .unwrap();
    assert_eq!(out.as_bytes().unwrap().len(), 65);

    // An explicit flag still wins
    let out = gw
        .call(Operation::PublicKeyCreate, &[Value::from(KEY), Value::Bool(true)])
        .unwrap();
    assert_eq!(out.as_bytes().unwrap().len(), 33);
}

#[test]
fn test_oversized_worker_count() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "worker_threads = 2305843009213693952").unwrap();

    let config = GatewayConfig::from_toml_file(file.path()).unwrap();
    let err = Gateway::new(config).unwrap_err();
    assert!(err.to_string().contains("worker_threads"));

    // Bypassing validation still yields a usable pool
    let gw = Gateway::with_context(Arc::new(Context::new(ContextFlags::ALL)), usize::MAX);
    assert!(gw.pool().size() >= 1);
    assert!(gw.public_key_create(&KEY, PublicKeyFormat::Compressed).is_ok());
}
