// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the async worker path and callback delivery

use futures::future::join_all;
use secp256k1_gateway::crypto::nonce;
use secp256k1_gateway::crypto::{
    Context, ContextFlags, ErrorKind, NonceFunction, PublicKeyFormat, SignOptions,
};
use secp256k1_gateway::{Gateway, Operation, Output, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const KEY: [u8; 32] = [0x42; 32];

fn gateway(workers: usize) -> Gateway {
    Gateway::with_context(Arc::new(Context::new(ContextFlags::ALL)), workers)
}

fn fixed_nonce() -> Arc<dyn NonceFunction> {
    nonce::from_fn(|_req| Some([0x24; 32]))
}

fn sign_args() -> Vec<Value> {
    vec![
        Value::from([0u8; 32]),
        Value::from(KEY),
        Value::Null,
        Value::from(fixed_nonce()),
    ]
}

#[tokio::test]
async fn test_zero_digest_identical_across_paths() {
    let gw = gateway(2);

    let typed = gw
        .sign(&[0u8; 32], &KEY, &SignOptions::with_nonce_function(fixed_nonce()))
        .unwrap();
    let sync = gw.call(Operation::Sign, &sign_args()).unwrap();
    let queued = gw.call_async(Operation::Sign, sign_args()).await.unwrap();
    let typed_async = gw
        .sign_async(
            vec![0u8; 32],
            KEY.to_vec(),
            SignOptions::with_nonce_function(fixed_nonce()),
        )
        .await
        .unwrap();

    let (tx, rx) = oneshot::channel();
    gw.call_with_callback(Operation::Sign, sign_args(), move |result| {
        let _ = tx.send(result);
    });
    let via_callback = rx.await.unwrap().unwrap();

    let expected = Output::Signature {
        signature: typed.signature.to_vec(),
        recovery_id: typed.recovery_id,
    };
    assert_eq!(sync, expected);
    assert_eq!(queued, expected);
    assert_eq!(via_callback, expected);
    assert_eq!(typed_async, typed);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let gw = gateway(4);

    let jobs = (0..32u8).map(|i| {
        let gw = gw.clone();
        async move {
            let message = gw.sha256(&[i]);
            let key = gw.sha256(&[i, 0xaa]);
            let signed = gw
                .sign_async(message.to_vec(), key.to_vec(), SignOptions::default())
                .await?;
            let public = gw.public_key_create(&key, PublicKeyFormat::Compressed)?;
            gw.verify_async(message.to_vec(), signed.signature.to_vec(), public)
                .await
        }
    });

    let results = join_all(jobs).await;
    assert_eq!(results.len(), 32);
    assert!(results.into_iter().all(|r| r.unwrap()));
    assert_eq!(gw.pool().idle(), 4);
}

#[tokio::test]
async fn test_async_errors_keep_their_kind() {
    let gw = gateway(1);

    let err = gw
        .call_async(Operation::PublicKeyCreate, vec![Value::from([0u8; 31])])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthInvalid);

    let err = gw
        .call_async(Operation::PublicKeyCreate, vec![Value::from([0u8; 32])])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);

    let err = gw
        .recover_async(vec![0u8; 32], vec![1u8; 64], 7, PublicKeyFormat::Compressed)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RangeInvalid);

    // Failures leave the gateway usable
    let ok = gw
        .call_async(Operation::Sha256, vec![Value::from(b"abc".to_vec())])
        .await
        .unwrap();
    assert_eq!(ok.as_bytes().unwrap().len(), 32);
}

#[tokio::test]
async fn test_callback_fires_exactly_once() {
    let gw = gateway(2);
    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();

    let counter = fired.clone();
    gw.call_with_callback(
        Operation::PublicKeyCreate,
        vec![Value::from([1u8; 32])],
        move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(result);
        },
    );

    let result = rx.await.unwrap().unwrap();
    assert_eq!(result.as_bytes().unwrap().len(), 33);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_callback_receives_errors() {
    let gw = gateway(1);
    let (tx, rx) = oneshot::channel();
    gw.call_with_callback(Operation::Verify, vec![Value::Int(1)], move |result| {
        let _ = tx.send(result);
    });
    let err = rx.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeInvalid);
}

#[test]
fn test_callback_without_runtime() {
    let gw = gateway(1);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();

    gw.call_with_callback(Operation::Sha256, vec![Value::from(vec![1u8])], move |result| {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::OperationFail);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_caller_buffers_are_copied() {
    let gw = gateway(1);
    let mut message = vec![7u8; 32];
    let args = vec![Value::from(message.as_slice()), Value::from(KEY)];
    let pending = gw.call_async(Operation::Sign, args);

    // Mutating the caller's buffer cannot affect the queued request
    message.fill(0);
    let signed = pending.await.unwrap();

    let expected = gw.sign(&[7u8; 32], &KEY, &SignOptions::default()).unwrap();
    assert_eq!(signed.as_bytes().unwrap(), &expected.signature[..]);
}

#[tokio::test]
async fn test_ecdh_async_matches_sync() {
    let gw = gateway(2);
    let peer = gw
        .public_key_create(&[3u8; 32], PublicKeyFormat::Compressed)
        .unwrap();
    let sync = gw.ecdh(&peer, &KEY).unwrap();
    let queued = gw.ecdh_async(peer, KEY.to_vec()).await.unwrap();
    assert_eq!(sync, queued);
}

#[test]
fn test_block_on_current_thread_runtime() {
    let gw = gateway(1);
    let out = tokio_test::block_on(
        gw.call_async(Operation::Sha256d, vec![Value::from(Vec::<u8>::new())]),
    )
    .unwrap();
    assert_eq!(
        hex::encode(out.as_bytes().unwrap()),
        "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
    );
}
