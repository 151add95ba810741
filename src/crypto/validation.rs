// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Input Validation Combinators
//!
//! Every external argument passes through the same three stages before any
//! curve arithmetic runs:
//!
//! 1. **Type**: is it bytes / an integer / a flag / a list? (see `gateway::dispatch`)
//! 2. **Length**: [`Bytes`] checks exact or one-of-N sizes
//! 3. **Range**: [`Integer`] checks a closed interval
//!
//! Each stage consumes the previous one, so a value can only reach the
//! primitive library once all of its checks have passed.
//!
//! ```ignore
//! let key: [u8; 32] = Bytes::new(Role::PrivateKey, input).exact()?;
//! let recid = Integer::new(Role::RecoveryId, 2).within(RECOVERY_ID_RANGE)?;
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use super::error::{GatewayError, Result};

/// Accepted serialized public key sizes (compressed, uncompressed)
pub const PUBLIC_KEY_LENGTHS: &[usize] = &[33, 65];

/// Accepted recovery ids
pub const RECOVERY_ID_RANGE: RangeInclusive<i64> = 0..=3;

/// Semantic role of an argument, used to label validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Message,
    PrivateKey,
    PublicKey,
    PublicKeys,
    Signature,
    Tweak,
    RecoveryId,
    Compressed,
    NonceData,
    NonceFunction,
    Data,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Message => "message",
            Role::PrivateKey => "private key",
            Role::PublicKey => "public key",
            Role::PublicKeys => "public keys",
            Role::Signature => "signature",
            Role::Tweak => "tweak",
            Role::RecoveryId => "recovery id",
            Role::Compressed => "compressed",
            Role::NonceData => "nonce data",
            Role::NonceFunction => "nonce function",
            Role::Data => "data",
        };
        f.write_str(name)
    }
}

/// Shape an argument was expected to have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bytes,
    Integer,
    Boolean,
    List,
    NonceFunction,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bytes => "a byte buffer",
            ValueType::Integer => "an integer",
            ValueType::Boolean => "a boolean",
            ValueType::List => "a list",
            ValueType::NonceFunction => "a nonce function",
        };
        f.write_str(name)
    }
}

/// Length constraint for byte buffers and lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    Exact(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
}

impl LengthRule {
    pub fn accepts(&self, len: usize) -> bool {
        match self {
            LengthRule::Exact(n) => len == *n,
            LengthRule::OneOf(lengths) => lengths.contains(&len),
            LengthRule::AtLeast(n) => len >= *n,
        }
    }
}

impl fmt::Display for LengthRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthRule::Exact(n) => write!(f, "{} bytes", n),
            LengthRule::OneOf(lengths) => {
                let joined: Vec<String> = lengths.iter().map(|n| n.to_string()).collect();
                write!(f, "one of {} bytes", joined.join(", "))
            }
            LengthRule::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Byte buffer that passed the type stage, awaiting a length check
#[derive(Debug, Clone, Copy)]
pub struct Bytes<'a> {
    role: Role,
    data: &'a [u8],
}

impl<'a> Bytes<'a> {
    pub fn new(role: Role, data: &'a [u8]) -> Self {
        Self { role, data }
    }

    /// Require exactly `N` bytes and copy them into an array
    pub fn exact<const N: usize>(self) -> Result<[u8; N]> {
        self.check(LengthRule::Exact(N))?;
        self.data.try_into().map_err(|_| self.length_error(LengthRule::Exact(N)))
    }

    /// Require one of the listed lengths
    pub fn one_of(self, lengths: &'static [usize]) -> Result<&'a [u8]> {
        self.check(LengthRule::OneOf(lengths))?;
        Ok(self.data)
    }

    /// Require a serialized public key (33 or 65 bytes)
    pub fn public_key(self) -> Result<&'a [u8]> {
        self.one_of(PUBLIC_KEY_LENGTHS)
    }

    /// Require at least one byte
    pub fn non_empty(self) -> Result<&'a [u8]> {
        self.check(LengthRule::AtLeast(1))?;
        Ok(self.data)
    }

    /// Accept any length
    pub fn any(self) -> &'a [u8] {
        self.data
    }

    fn check(&self, rule: LengthRule) -> Result<()> {
        if rule.accepts(self.data.len()) {
            Ok(())
        } else {
            Err(self.length_error(rule))
        }
    }

    fn length_error(&self, expected: LengthRule) -> GatewayError {
        GatewayError::LengthInvalid {
            role: self.role,
            expected,
            actual: self.data.len(),
        }
    }
}

/// Integer that passed the type stage, awaiting a range check
#[derive(Debug, Clone, Copy)]
pub struct Integer {
    role: Role,
    value: i64,
}

impl Integer {
    pub fn new(role: Role, value: i64) -> Self {
        Self { role, value }
    }

    /// Require the value to lie in a closed interval
    pub fn within(self, range: RangeInclusive<i64>) -> Result<i64> {
        if range.contains(&self.value) {
            Ok(self.value)
        } else {
            Err(GatewayError::RangeInvalid {
                role: self.role,
                value: self.value,
                min: *range.start(),
                max: *range.end(),
            })
        }
    }
}

/// Require a list argument to have at least one element
pub fn non_empty_list<T>(role: Role, items: &[T]) -> Result<&[T]> {
    if items.is_empty() {
        return Err(GatewayError::LengthInvalid {
            role,
            expected: LengthRule::AtLeast(1),
            actual: 0,
        });
    }
    Ok(items)
}

/// Check a recovery id and narrow it to a byte
pub fn recovery_id(value: i64) -> Result<u8> {
    let value = Integer::new(Role::RecoveryId, value).within(RECOVERY_ID_RANGE)?;
    // within [0, 3], always fits
    Ok(value as u8)
}
