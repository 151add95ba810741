// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared Cryptographic Context
//!
//! A [`Context`] is created once with capability flags and then shared
//! read-only (behind an `Arc`) by every operation, on any thread. It never
//! changes after construction.
//!
//! Operations check the flag they need before doing any work: signing on a
//! verify-only context, or verifying on a sign-only context, fails with
//! `OperationFail`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use super::error::{GatewayError, Result};

/// Default cap on nonce attempts per signature
pub const DEFAULT_MAX_NONCE_ATTEMPTS: u32 = 1024;

static GLOBAL: OnceLock<Arc<Context>> = OnceLock::new();

/// Capability flags a context is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFlags {
    pub sign: bool,
    pub verify: bool,
}

impl ContextFlags {
    pub const SIGN: ContextFlags = ContextFlags {
        sign: true,
        verify: false,
    };
    pub const VERIFY: ContextFlags = ContextFlags {
        sign: false,
        verify: true,
    };
    pub const ALL: ContextFlags = ContextFlags {
        sign: true,
        verify: true,
    };
    pub const NONE: ContextFlags = ContextFlags {
        sign: false,
        verify: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.sign && !self.verify
    }

    /// Parse `sign`, `verify` or `all` (also `sign|verify`)
    pub fn parse(value: &str) -> Option<Self> {
        let mut flags = ContextFlags::NONE;
        for part in value.split(|c| c == '|' || c == ',') {
            match part.trim().to_ascii_lowercase().as_str() {
                "sign" => flags.sign = true,
                "verify" => flags.verify = true,
                "all" => flags = ContextFlags::ALL,
                _ => return None,
            }
        }
        Some(flags)
    }
}

impl Default for ContextFlags {
    fn default() -> Self {
        ContextFlags::ALL
    }
}

/// Capability an operation requires from the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Sign,
    Verify,
}

/// Immutable cryptographic context shared by all operations
#[derive(Debug)]
pub struct Context {
    flags: ContextFlags,
    max_nonce_attempts: u32,
}

impl Context {
    /// Create a context with the given capabilities
    pub fn new(flags: ContextFlags) -> Self {
        Self::with_nonce_attempts(flags, DEFAULT_MAX_NONCE_ATTEMPTS)
    }

    /// Create a context with a custom cap on nonce attempts per signature
    pub fn with_nonce_attempts(flags: ContextFlags, max_nonce_attempts: u32) -> Self {
        info!(
            "🔐 secp256k1 context created (sign: {}, verify: {}, max nonce attempts: {})",
            flags.sign, flags.verify, max_nonce_attempts
        );

        Self {
            flags,
            max_nonce_attempts,
        }
    }

    /// Process-wide context with every capability, created on first use
    pub fn global() -> Arc<Context> {
        GLOBAL
            .get_or_init(|| Arc::new(Context::new(ContextFlags::ALL)))
            .clone()
    }

    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    pub fn max_nonce_attempts(&self) -> u32 {
        self.max_nonce_attempts
    }

    /// Fail with `OperationFail` unless the context has `capability`
    pub fn require(&self, capability: Capability, operation: &'static str) -> Result<()> {
        let granted = match capability {
            Capability::Sign => self.flags.sign,
            Capability::Verify => self.flags.verify,
        };

        if granted {
            Ok(())
        } else {
            Err(GatewayError::operation(
                operation,
                format!("context was not created with {:?} capability", capability),
            ))
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        debug!("secp256k1 context destroyed");
    }
}
