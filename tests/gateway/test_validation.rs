// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for argument validation through the dynamic call surface

use secp256k1_gateway::crypto::{Context, ContextFlags, ErrorKind};
use secp256k1_gateway::{Gateway, Operation, Value};
use std::sync::Arc;

fn gateway() -> Gateway {
    Gateway::with_context(Arc::new(Context::new(ContextFlags::ALL)), 1)
}

fn kind(gw: &Gateway, operation: Operation, args: Vec<Value>) -> ErrorKind {
    gw.call(operation, &args).unwrap_err().kind()
}

#[test]
fn test_public_key_length_checked_before_parsing() {
    let gw = gateway();
    for len in [32usize, 66] {
        // Valid prefixes, wrong lengths
        for prefix in [0x02u8, 0x04] {
            let mut key = vec![0u8; len];
            key[0] = prefix;

            assert_eq!(
                kind(&gw, Operation::PublicKeyConvert, vec![key.clone().into()]),
                ErrorKind::LengthInvalid
            );
            assert_eq!(
                kind(
                    &gw,
                    Operation::Verify,
                    vec![[0u8; 32].into(), [1u8; 64].into(), key.clone().into()]
                ),
                ErrorKind::LengthInvalid
            );
            assert_eq!(
                kind(&gw, Operation::Ecdh, vec![key.into(), [1u8; 32].into()]),
                ErrorKind::LengthInvalid
            );
        }
    }
}

#[test]
fn test_public_key_verify_never_errors() {
    let gw = gateway();
    for len in [0usize, 32, 33, 65, 66] {
        let out = gw
            .call(Operation::PublicKeyVerify, &[Value::from(vec![0x02u8; len])])
            .unwrap();
        assert_eq!(out.as_bool(), Some(false));
    }
}

#[test]
fn test_type_checked_before_length() {
    let gw = gateway();
    assert_eq!(
        kind(&gw, Operation::Sign, vec![Value::Bool(true), [1u8; 32].into()]),
        ErrorKind::TypeInvalid
    );
    assert_eq!(
        kind(&gw, Operation::Sign, vec![[0u8; 3].into(), Value::Int(1)]),
        ErrorKind::TypeInvalid
    );
    assert_eq!(
        kind(
            &gw,
            Operation::Sign,
            vec![[0u8; 32].into(), [1u8; 32].into(), Value::Null, Value::Int(3)]
        ),
        ErrorKind::TypeInvalid
    );
    assert_eq!(
        kind(&gw, Operation::PublicKeyCombine, vec![Value::List(vec![Value::Int(1)])]),
        ErrorKind::TypeInvalid
    );
}

#[test]
fn test_length_errors() {
    let gw = gateway();
    assert_eq!(
        kind(&gw, Operation::Sign, vec![[0u8; 31].into(), [1u8; 32].into()]),
        ErrorKind::LengthInvalid
    );
    assert_eq!(
        kind(&gw, Operation::PrivateKeyTweakAdd, vec![[1u8; 32].into(), [1u8; 33].into()]),
        ErrorKind::LengthInvalid
    );
    assert_eq!(
        kind(&gw, Operation::SignatureExport, vec![[1u8; 65].into()]),
        ErrorKind::LengthInvalid
    );
    assert_eq!(
        kind(&gw, Operation::PublicKeyCombine, vec![Value::List(vec![])]),
        ErrorKind::LengthInvalid
    );
}

#[test]
fn test_recovery_id_range() {
    let gw = gateway();
    for id in [-1i64, 4, i64::MAX] {
        assert_eq!(
            kind(
                &gw,
                Operation::Recover,
                vec![[0u8; 32].into(), [1u8; 64].into(), id.into()]
            ),
            ErrorKind::RangeInvalid
        );
    }
}

#[test]
fn test_error_messages_name_the_argument() {
    let gw = gateway();
    let err = gw
        .call(Operation::Ecdh, &[Value::from([2u8; 33]), Value::from([1u8; 16])])
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("private key"), "{}", message);
    assert!(message.contains("32"), "{}", message);
}

#[test]
fn test_output_shapes() {
    let gw = gateway();
    let public = gw
        .call(Operation::PublicKeyCreate, &[Value::from([1u8; 32])])
        .unwrap();
    assert_eq!(public.to_json().as_str().unwrap().len(), 66);

    let signed = gw
        .call(Operation::Sign, &[Value::from([0u8; 32]), Value::from([1u8; 32])])
        .unwrap();
    let json = signed.to_json();
    assert_eq!(json["signature"].as_str().unwrap().len(), 128);
    assert!(json["recoveryId"].as_u64().unwrap() <= 3);

    let verified = gw
        .call(
            Operation::Verify,
            &[
                Value::from([0u8; 32]),
                Value::from(signed.as_bytes().unwrap()),
                public.as_bytes().unwrap().into(),
            ],
        )
        .unwrap();
    assert_eq!(verified.as_bool(), Some(true));
}
