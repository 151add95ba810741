// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway Error Types
//!
//! Every failure the gateway can report falls into one of five kinds:
//!
//! - **TypeInvalid**: an argument has the wrong shape (not bytes, not an integer, ...)
//! - **LengthInvalid**: a byte argument has the wrong size
//! - **RangeInvalid**: a numeric argument is outside its interval
//! - **ParseFail**: bytes of the right size do not decode as a point or signature
//! - **OperationFail**: the curve operation itself failed
//!
//! Validation errors carry the [`Role`] of the offending argument so callers
//! can tell *which* input was rejected; operation errors carry the operation
//! name. Match on [`GatewayError::kind`] rather than on message text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::validation::{LengthRule, Role, ValueType};

/// Result type used throughout the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error taxonomy shared by the sync path, the async path and the callback path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    TypeInvalid,
    LengthInvalid,
    RangeInvalid,
    ParseFail,
    OperationFail,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TypeInvalid => "TypeInvalid",
            ErrorKind::LengthInvalid => "LengthInvalid",
            ErrorKind::RangeInvalid => "RangeInvalid",
            ErrorKind::ParseFail => "ParseFail",
            ErrorKind::OperationFail => "OperationFail",
        };
        f.write_str(name)
    }
}

/// Errors raised by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Argument missing or of the wrong shape
    #[error("{role} should be {expected}")]
    TypeInvalid { role: Role, expected: ValueType },

    /// Byte argument with an unacceptable length
    #[error("{role} length is invalid: expected {expected}, got {actual}")]
    LengthInvalid {
        role: Role,
        expected: LengthRule,
        actual: usize,
    },

    /// Integer argument outside its closed interval
    #[error("{role} should have value in [{min}, {max}], got {value}")]
    RangeInvalid {
        role: Role,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Bytes that do not decode as a valid point, signature or key
    #[error("couldn't parse {role}: {reason}")]
    ParseFail { role: Role, reason: &'static str },

    /// The curve operation reported failure
    #[error("{operation} failed: {reason}")]
    OperationFail {
        operation: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// Kind of this error, independent of its message
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::TypeInvalid { .. } => ErrorKind::TypeInvalid,
            GatewayError::LengthInvalid { .. } => ErrorKind::LengthInvalid,
            GatewayError::RangeInvalid { .. } => ErrorKind::RangeInvalid,
            GatewayError::ParseFail { .. } => ErrorKind::ParseFail,
            GatewayError::OperationFail { .. } => ErrorKind::OperationFail,
        }
    }

    pub(crate) fn parse(role: Role, reason: &'static str) -> Self {
        GatewayError::ParseFail { role, reason }
    }

    pub(crate) fn operation(operation: &'static str, reason: impl Into<String>) -> Self {
        GatewayError::OperationFail {
            operation,
            reason: reason.into(),
        }
    }
}
