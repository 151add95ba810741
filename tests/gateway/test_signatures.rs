// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for ECDSA signing, verification, recovery and signature encodings

use k256::ecdsa::{Signature, SigningKey};
use k256::{Scalar, SecretKey};
use rand::rngs::OsRng;
use secp256k1_gateway::crypto::nonce::{self, NonceFunction, Rfc6979};
use secp256k1_gateway::crypto::{Context, ContextFlags, ErrorKind, PublicKeyFormat, SignOptions};
use secp256k1_gateway::Gateway;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const COMPRESSED: PublicKeyFormat = PublicKeyFormat::Compressed;

fn gateway() -> Gateway {
    Gateway::with_context(Arc::new(Context::new(ContextFlags::ALL)), 2)
}

fn random_key() -> [u8; 32] {
    SecretKey::random(&mut OsRng).to_bytes().into()
}

fn digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Same (r, s) with s replaced by n - s
fn high_s(signature: &[u8; 64]) -> [u8; 64] {
    let parsed = Signature::from_slice(signature).unwrap();
    let (r, s) = parsed.split_scalars();
    let r: Scalar = *r.as_ref();
    let s: Scalar = *s.as_ref();
    let flipped = Signature::from_scalars(r.to_bytes(), (-s).to_bytes()).unwrap();
    let mut out = [0u8; 64];
    out.copy_from_slice(&flipped.to_bytes());
    out
}

#[test]
fn test_sign_verify_recover() {
    let gw = gateway();
    for i in 0..16u8 {
        let key = random_key();
        let message = digest(&[i; 7]);
        let public = gw.public_key_create(&key, COMPRESSED).unwrap();

        let signed = gw.sign(&message, &key, &SignOptions::default()).unwrap();
        assert!(signed.recovery_id <= 3);
        assert!(gw.verify(&message, &signed.signature, &public).unwrap());

        let recovered = gw
            .recover(&message, &signed.signature, signed.recovery_id as i64, COMPRESSED)
            .unwrap();
        assert_eq!(recovered, public);
    }
}

#[test]
fn test_verify_mismatch_is_false() {
    let gw = gateway();
    let key = random_key();
    let message = digest(b"original");
    let signed = gw.sign(&message, &key, &SignOptions::default()).unwrap();

    let other_message = digest(b"tampered");
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();
    assert!(!gw.verify(&other_message, &signed.signature, &public).unwrap());

    let other_public = gw.public_key_create(&random_key(), COMPRESSED).unwrap();
    assert!(!gw.verify(&message, &signed.signature, &other_public).unwrap());
}

#[test]
fn test_default_nonce_matches_k256() {
    let gw = gateway();
    let key = random_key();
    let message = digest(b"rfc6979");

    let signing_key = SigningKey::from_bytes(&key.into()).unwrap();
    let (expected, expected_id) = signing_key.sign_prehash_recoverable(&message).unwrap();

    let signed = gw.sign(&message, &key, &SignOptions::default()).unwrap();
    assert_eq!(&signed.signature[..], expected.to_bytes().as_slice());
    assert_eq!(signed.recovery_id, expected_id.to_byte());
}

#[test]
fn test_signing_is_deterministic() {
    let gw = gateway();
    let key = random_key();
    let message = digest(b"deterministic");

    let first = gw.sign(&message, &key, &SignOptions::default()).unwrap();
    let second = gw.sign(&message, &key, &SignOptions::default()).unwrap();
    assert_eq!(first, second);

    // Extra data changes the nonce, not validity
    let with_data = gw
        .sign(&message, &key, &SignOptions::with_data([7u8; 32]))
        .unwrap();
    assert_ne!(with_data.signature, first.signature);
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();
    assert!(gw.verify(&message, &with_data.signature, &public).unwrap());
}

#[test]
fn test_signatures_are_low_s() {
    let gw = gateway();
    let key = random_key();
    for i in 0..32u8 {
        let signed = gw.sign(&digest(&[i]), &key, &SignOptions::default()).unwrap();
        assert_eq!(gw.signature_normalize(&signed.signature).unwrap(), signed.signature);
    }
}

#[test]
fn test_high_s_rejected_by_verify_accepted_by_recover() {
    let gw = gateway();
    let key = random_key();
    let message = digest(b"malleable");
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();

    let signed = gw.sign(&message, &key, &SignOptions::default()).unwrap();
    let high = high_s(&signed.signature);

    assert!(!gw.verify(&message, &high, &public).unwrap());

    // Negating s negates R, so the parity bit flips
    let recovered = gw
        .recover(&message, &high, (signed.recovery_id ^ 1) as i64, COMPRESSED)
        .unwrap();
    assert_eq!(recovered, public);
}

#[test]
fn test_normalize_idempotent() {
    let gw = gateway();
    let key = random_key();
    let signed = gw.sign(&digest(b"normalize"), &key, &SignOptions::default()).unwrap();
    let high = high_s(&signed.signature);

    let once = gw.signature_normalize(&high).unwrap();
    assert_eq!(once, signed.signature);
    assert_eq!(gw.signature_normalize(&once).unwrap(), once);
}

#[test]
fn test_der_round_trip() {
    let gw = gateway();
    for i in 0..16u8 {
        let signed = gw
            .sign(&digest(&[i, i]), &random_key(), &SignOptions::default())
            .unwrap();
        let der = gw.signature_export(&signed.signature).unwrap();
        assert_eq!(der[0], 0x30);
        assert!(der.len() >= 8 && der.len() <= 72);
        assert_eq!(gw.signature_import(&der).unwrap(), signed.signature);
    }
}

#[test]
fn test_der_matches_k256_encoding() {
    let gw = gateway();
    let signed = gw
        .sign(&digest(b"der"), &random_key(), &SignOptions::default())
        .unwrap();
    let expected = Signature::from_slice(&signed.signature).unwrap().to_der();
    assert_eq!(gw.signature_export(&signed.signature).unwrap(), expected.as_bytes());
}

#[test]
fn test_strict_and_lax_import() {
    let gw = gateway();
    let signed = gw
        .sign(&digest(b"lax"), &random_key(), &SignOptions::default())
        .unwrap();
    let mut der = gw.signature_export(&signed.signature).unwrap();
    der.push(0x00);

    let err = gw.signature_import(&der).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFail);

    // Trailing bytes are tolerated in lax mode
    assert_eq!(gw.signature_import_lax(&der).unwrap(), signed.signature);

    let err = gw.signature_import_lax(&[0x30, 0x02, 0x02, 0x05]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFail);
}

#[test]
fn test_compact_overflow_is_parse_fail() {
    let gw = gateway();
    let key = random_key();
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();

    let mut overflow = [0xffu8; 64];
    overflow[63] = 0x01;
    let err = gw.verify(&[1u8; 32], &overflow, &public).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFail);

    let err = gw.signature_normalize(&overflow).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFail);
}

#[test]
fn test_zero_half_is_well_formed_but_invalid() {
    let gw = gateway();
    let public = gw.public_key_create(&random_key(), COMPRESSED).unwrap();

    // r = 1, s = 0
    let mut zero_s = [0u8; 64];
    zero_s[31] = 1;

    assert!(!gw.verify(&[1u8; 32], &zero_s, &public).unwrap());
    assert_eq!(gw.signature_normalize(&zero_s).unwrap(), zero_s);
    assert_eq!(
        hex::encode(gw.signature_export(&zero_s).unwrap()),
        "3006020101020100"
    );

    let err = gw.recover(&[1u8; 32], &zero_s, 0, COMPRESSED).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);

    // Both halves zero
    assert!(!gw.verify(&[1u8; 32], &[0u8; 64], &public).unwrap());
    assert_eq!(gw.signature_normalize(&[0u8; 64]).unwrap(), [0u8; 64]);
}

#[test]
fn test_recover_with_wrong_id_differs() {
    let gw = gateway();
    let key = random_key();
    let message = digest(b"wrong id");
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();
    let signed = gw.sign(&message, &key, &SignOptions::default()).unwrap();

    let other = gw
        .recover(&message, &signed.signature, (signed.recovery_id ^ 1) as i64, COMPRESSED)
        .unwrap();
    assert_ne!(other, public);
}

#[test]
fn test_zero_digest_with_fixed_nonce() {
    let gw = gateway();
    let key = [0x42u8; 32];
    let fixed = nonce::from_fn(|_req| Some([0x24; 32]));

    let first = gw
        .sign(&[0u8; 32], &key, &SignOptions::with_nonce_function(fixed.clone()))
        .unwrap();
    for _ in 0..4 {
        let again = gw
            .sign(&[0u8; 32], &key, &SignOptions::with_nonce_function(fixed.clone()))
            .unwrap();
        assert_eq!(again, first);
    }

    let public = gw.public_key_create(&key, COMPRESSED).unwrap();
    assert!(gw.verify(&[0u8; 32], &first.signature, &public).unwrap());
}

#[test]
fn test_custom_nonce_sees_attempts_and_data() {
    let gw = gateway();
    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();

    // First candidate is zero (rejected), second is valid
    let hook = nonce::from_fn(move |req| {
        seen.fetch_add(1, Ordering::SeqCst);
        assert_eq!(req.data, Some(&[9u8; 32]));
        assert!(req.algorithm.is_none());
        if req.attempt == 0 {
            Some([0u8; 32])
        } else {
            Rfc6979.nonce(req)
        }
    });

    let options = SignOptions {
        data: Some([9u8; 32]),
        nonce_function: Some(hook),
    };
    let key = random_key();
    let message = digest(b"retry");
    let signed = gw.sign(&message, &key, &options).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let public = gw.public_key_create(&key, COMPRESSED).unwrap();
    assert!(gw.verify(&message, &signed.signature, &public).unwrap());
}

#[test]
fn test_aborting_nonce_function() {
    let gw = gateway();
    let abort = nonce::from_fn(|_req| None);
    let err = gw
        .sign(&[1u8; 32], &random_key(), &SignOptions::with_nonce_function(abort))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFail);

    // The gateway stays usable afterwards
    assert!(gw.sign(&[1u8; 32], &random_key(), &SignOptions::default()).is_ok());
}

#[test]
fn test_sign_with_invalid_key() {
    let gw = gateway();
    for key in [[0u8; 32], [0xffu8; 32]] {
        let err = gw.sign(&[1u8; 32], &key, &SignOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationFail);
    }
}
