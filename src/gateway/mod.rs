// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! secp256k1 Gateway
//!
//! [`Gateway`] is the entry point. It owns a shared [`Context`] and a
//! [`WorkerPool`] and offers every operation three ways:
//!
//! - **Sync**: typed methods (`gateway.sign(..)`) or `gateway.call(op, &args)`,
//!   run inline on the calling thread
//! - **Async**: `gateway.call_async(op, args).await` or typed `*_async`
//!   methods, run on the worker pool
//! - **Callback**: `gateway.call_with_callback(op, args, |result| ..)`,
//!   returns immediately and fires the callback exactly once
//!
//! All three paths go through the same validation and the same core
//! functions, so a deterministic operation produces identical bytes on each.
//!
//! ## Example
//!
//! ```ignore
//! let gateway = Gateway::new(GatewayConfig::default())?;
//! let signed = gateway.sign(&digest, &secret, &SignOptions::default())?;
//! let public = gateway.public_key_create(&secret, PublicKeyFormat::Compressed)?;
//! assert!(gateway.verify(&digest, &signed.signature, &public)?);
//! ```

pub mod bridge;
pub mod dispatch;
pub mod operations;
pub mod request;

pub use bridge::WorkerPool;
pub use operations::SignatureOutput;
pub use request::{Operation, Output, Value};

use anyhow::{anyhow, Result as AnyResult};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::crypto::codec::PublicKeyFormat;
use crate::crypto::context::Context;
use crate::crypto::error::{GatewayError, Result};
use crate::crypto::nonce::SignOptions;

/// Validated sync/async front end over the secp256k1 operations
#[derive(Debug, Clone)]
pub struct Gateway {
    context: Arc<Context>,
    pool: WorkerPool,
    default_format: PublicKeyFormat,
}

impl Gateway {
    /// Build a gateway with its own context from a validated configuration
    pub fn new(config: GatewayConfig) -> AnyResult<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid gateway configuration: {}", e))?;

        let context = Arc::new(Context::with_nonce_attempts(
            config.context,
            config.max_nonce_attempts,
        ));
        Ok(Self::with_context(context, config.worker_threads)
            .with_default_format(config.default_format()))
    }

    /// Build a gateway around an existing (possibly shared) context
    pub fn with_context(context: Arc<Context>, worker_threads: usize) -> Self {
        Self {
            context,
            pool: WorkerPool::new(worker_threads),
            default_format: PublicKeyFormat::Compressed,
        }
    }

    /// Format used when a dynamic call omits the `compressed` flag
    pub fn with_default_format(mut self, format: PublicKeyFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn default_format(&self) -> PublicKeyFormat {
        self.default_format
    }

    /// Run an operation inline
    pub fn call(&self, operation: Operation, args: &[Value]) -> Result<Output> {
        dispatch::execute(self, operation, args)
    }

    /// Run an operation on the worker pool
    pub async fn call_async(&self, operation: Operation, args: Vec<Value>) -> Result<Output> {
        let request_id = Uuid::new_v4();
        debug!("[{}] queueing {}", request_id, operation);

        let gateway = self.clone();
        let result = self
            .pool
            .run(move || dispatch::execute(&gateway, operation, &args))
            .await;

        debug!(
            "[{}] {} completed (ok: {})",
            request_id,
            operation,
            result.is_ok()
        );
        result
    }

    /// Queue an operation and deliver its result to `callback`
    ///
    /// Returns immediately. The callback runs exactly once, as a task on the
    /// caller's tokio runtime. Called outside a runtime, the callback is
    /// invoked straight away with `OperationFail`.
    pub fn call_with_callback<F>(&self, operation: Operation, args: Vec<Value>, callback: F)
    where
        F: FnOnce(Result<Output>) + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                let gateway = self.clone();
                handle.spawn(async move {
                    let result = gateway.call_async(operation, args).await;
                    callback(result);
                });
            }
            Err(_) => callback(Err(GatewayError::operation(
                operation.name(),
                "no async runtime available to deliver the result",
            ))),
        }
    }

    /// [`Gateway::sign`] on the worker pool
    pub async fn sign_async(
        &self,
        message: Vec<u8>,
        private_key: Vec<u8>,
        options: SignOptions,
    ) -> Result<SignatureOutput> {
        let gateway = self.clone();
        self.pool
            .run(move || gateway.sign(&message, &private_key, &options))
            .await
    }

    /// [`Gateway::verify`] on the worker pool
    pub async fn verify_async(
        &self,
        message: Vec<u8>,
        signature: Vec<u8>,
        public_key: Vec<u8>,
    ) -> Result<bool> {
        let gateway = self.clone();
        self.pool
            .run(move || gateway.verify(&message, &signature, &public_key))
            .await
    }

    /// [`Gateway::recover`] on the worker pool
    pub async fn recover_async(
        &self,
        message: Vec<u8>,
        signature: Vec<u8>,
        recovery_id: i64,
        format: PublicKeyFormat,
    ) -> Result<Vec<u8>> {
        let gateway = self.clone();
        self.pool
            .run(move || gateway.recover(&message, &signature, recovery_id, format))
            .await
    }

    /// [`Gateway::ecdh`] on the worker pool
    pub async fn ecdh_async(&self, public_key: Vec<u8>, private_key: Vec<u8>) -> Result<[u8; 32]> {
        let gateway = self.clone();
        self.pool
            .run(move || gateway.ecdh(&public_key, &private_key))
            .await
    }
}
