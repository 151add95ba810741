// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Concurrency Bridge
//!
//! Moves CPU-bound curve work off the async caller. A [`WorkerPool`] is a
//! semaphore with a fixed number of permits in front of tokio's blocking
//! thread pool: each job waits for a permit, runs on a blocking thread, and
//! hands its result back through the returned future.
//!
//! Jobs must be `'static`, so everything they touch is owned (inputs are
//! `Vec<u8>` / `Value`s moved in, the context is an `Arc`). Once started, a
//! job runs to completion even if the caller stops waiting for it.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::crypto::error::{GatewayError, Result};

const OP_POOL: &str = "worker pool";

/// Fixed-size pool for blocking cryptographic jobs
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool running at most `size` jobs at once
    ///
    /// `size` is clamped to `[1, Semaphore::MAX_PERMITS]`.
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, Semaphore::MAX_PERMITS);
        info!("🧵 Worker pool ready with {} workers", size);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Workers currently idle
    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a worker and wait for its result
    ///
    /// # Errors
    ///
    /// Whatever `job` returns, or `OperationFail` if the pool was closed or
    /// the job panicked.
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GatewayError::operation(OP_POOL, "pool is closed"))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                debug!("Worker job terminated abnormally: {}", e);
                Err(GatewayError::operation(
                    OP_POOL,
                    format!("worker terminated: {}", e),
                ))
            }
        }
    }

    /// Stop accepting jobs; queued and future `run` calls fail
    pub fn close(&self) {
        self.permits.close();
    }
}
