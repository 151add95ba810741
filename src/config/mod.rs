// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration
//!
//! Settings come from defaults, a TOML file, or `SECP256K1_GATEWAY_*`
//! environment variables.

use anyhow::{anyhow, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::crypto::codec::PublicKeyFormat;
use crate::crypto::context::{ContextFlags, DEFAULT_MAX_NONCE_ATTEMPTS};

pub const ENV_WORKERS: &str = "SECP256K1_GATEWAY_WORKERS";
pub const ENV_MAX_NONCE_ATTEMPTS: &str = "SECP256K1_GATEWAY_MAX_NONCE_ATTEMPTS";
pub const ENV_CONTEXT: &str = "SECP256K1_GATEWAY_CONTEXT";
pub const ENV_COMPRESSED: &str = "SECP256K1_GATEWAY_COMPRESSED";

/// Gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Capabilities of the gateway's context (default: sign + verify)
    pub context: ContextFlags,
    /// Worker pool size (default: available parallelism)
    pub worker_threads: usize,
    /// Nonce candidates tried per signature before giving up (default: 1024)
    pub max_nonce_attempts: u32,
    /// Output compressed public keys when a call omits the flag (default: true)
    pub compressed: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            context: ContextFlags::ALL,
            worker_threads: default_worker_threads(),
            max_nonce_attempts: DEFAULT_MAX_NONCE_ATTEMPTS,
            compressed: true,
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let value = lookup(name)?;
    let parsed = parse(value.trim());
    if parsed.is_none() {
        warn!("⚠️ Ignoring invalid {}={:?}, using the default", name, value);
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl GatewayConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the defaults. A set but invalid value is
    /// logged and ignored, except the context: an unreadable capability list
    /// leaves the context empty, which `validate` rejects.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            context: match lookup(ENV_CONTEXT) {
                Some(value) => ContextFlags::parse(&value).unwrap_or_else(|| {
                    warn!(
                        "⚠️ Invalid {}={:?}, expected sign, verify or all",
                        ENV_CONTEXT, value
                    );
                    ContextFlags::NONE
                }),
                None => defaults.context,
            },
            worker_threads: parse_var(&lookup, ENV_WORKERS, |v| v.parse().ok())
                .unwrap_or(defaults.worker_threads),
            max_nonce_attempts: parse_var(&lookup, ENV_MAX_NONCE_ATTEMPTS, |v| v.parse().ok())
                .unwrap_or(defaults.max_nonce_attempts),
            compressed: parse_var(&lookup, ENV_COMPRESSED, parse_bool)
                .unwrap_or(defaults.compressed),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("Failed to parse gateway config: {}", e))
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.context.is_empty() {
            return Err("context must enable sign, verify or both".to_string());
        }
        if self.worker_threads == 0 {
            return Err("worker_threads must be at least 1".to_string());
        }
        if self.worker_threads > Semaphore::MAX_PERMITS {
            return Err(format!(
                "worker_threads must be at most {}",
                Semaphore::MAX_PERMITS
            ));
        }
        if self.max_nonce_attempts == 0 {
            return Err("max_nonce_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn default_format(&self) -> PublicKeyFormat {
        PublicKeyFormat::from_compressed(self.compressed)
    }
}
