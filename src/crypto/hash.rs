// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hash utilities exposed alongside the curve operations.

use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}
