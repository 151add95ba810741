// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod crypto;
pub mod gateway;
pub mod version;

// Re-export main types
pub use config::GatewayConfig;
pub use crypto::{
    Context, ContextFlags, ErrorKind, GatewayError, NonceFunction, NonceRequest, PublicKeyFormat,
    Rfc6979, SignOptions,
};
pub use gateway::{Gateway, Operation, Output, SignatureOutput, Value, WorkerPool};
