// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DER Encodings
//!
//! Hand-rolled ASN.1 for the handful of fixed layouts the gateway speaks:
//!
//! - ECDSA signatures: `SEQUENCE { INTEGER r, INTEGER s }`, strict and lax
//! - SEC1 `ECPrivateKey` with explicit secp256k1 domain parameters
//!
//! Parsers return `None` on any malformation; callers map that to `ParseFail`.

use super::codec::CompactSignature;

pub(crate) const PARSE_DER_FAIL: &str = "malformed DER signature";

// SEC1 ECPrivateKey templates: BEGIN ‖ key ‖ MIDDLE ‖ public key
const PRIVKEY_COMPRESSED_BEGIN: &str = "3081d30201010420";
const PRIVKEY_COMPRESSED_MIDDLE: &str = "a08185308182020101302c06072a8648ce3d0101022100fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f300604010004010704210279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798022100fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141020101a124032200";
const PRIVKEY_UNCOMPRESSED_BEGIN: &str = "308201130201010420";
const PRIVKEY_UNCOMPRESSED_MIDDLE: &str = "a081a53081a2020101302c06072a8648ce3d0101022100fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f300604010004010704410479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8022100fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141020101a144034200";

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;
const OCTET_STRING: u8 = 0x04;

/// Cursor over untrusted DER input
struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn expect(&mut self, tag: u8) -> Option<()> {
        (self.byte()? == tag).then_some(())
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let out = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Some(out)
    }
}

/// Strip leading zeros and right-align into 32 bytes; `None` on overflow
fn left_pad(value: &[u8]) -> Option<[u8; 32]> {
    let start = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    let digits = &value[start..];
    if digits.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - digits.len()..].copy_from_slice(digits);
    Some(out)
}

/// Minimal positive INTEGER content for a 32-byte big-endian value
fn integer_content(value: &[u8]) -> Vec<u8> {
    let start = value
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(value.len().saturating_sub(1));
    let mut out = Vec::with_capacity(33);
    if value[start] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&value[start..]);
    out
}

/// Serialize a signature as minimal strict DER (at most 72 bytes)
///
/// A zero half is written as the one-byte INTEGER `0`.
pub fn serialize_signature(signature: &CompactSignature) -> Vec<u8> {
    let r = integer_content(&signature.r().to_bytes());
    let s = integer_content(&signature.s().to_bytes());

    let mut out = Vec::with_capacity(6 + r.len() + s.len());
    out.push(SEQUENCE);
    // r and s are at most 33 bytes each, so the body stays below 0x80
    out.push((4 + r.len() + s.len()) as u8);
    out.push(INTEGER);
    out.push(r.len() as u8);
    out.extend_from_slice(&r);
    out.push(INTEGER);
    out.push(s.len() as u8);
    out.extend_from_slice(&s);
    out
}

/// Strict DER: short-form lengths, minimal integers, no trailing bytes
pub fn parse_signature_strict(input: &[u8]) -> Option<([u8; 32], [u8; 32])> {
    let mut reader = Reader::new(input);
    reader.expect(SEQUENCE)?;
    let len = reader.byte()?;
    if len >= 0x80 || len as usize != reader.remaining() {
        return None;
    }

    let r = strict_integer(&mut reader)?;
    let s = strict_integer(&mut reader)?;
    if reader.remaining() != 0 {
        return None;
    }
    Some((r, s))
}

fn strict_integer(reader: &mut Reader<'_>) -> Option<[u8; 32]> {
    reader.expect(INTEGER)?;
    let len = reader.byte()?;
    if len == 0 || len >= 0x80 {
        return None;
    }
    let content = reader.take(len as usize)?;

    // Excess zero padding
    if content.len() > 1 && content[0] == 0x00 && content[1] < 0x80 {
        return None;
    }
    // Negative
    if content[0] & 0x80 != 0 {
        return None;
    }
    left_pad(content)
}

/// Lax DER, following libsecp256k1's `ecdsa_signature_parse_der_lax`:
/// the sequence length is skipped, integer lengths may be long-form with
/// any padding, integers may carry arbitrary leading zeros, and trailing
/// bytes after `s` are ignored.
pub fn parse_signature_lax(input: &[u8]) -> Option<([u8; 32], [u8; 32])> {
    let mut reader = Reader::new(input);
    reader.expect(SEQUENCE)?;
    let len = reader.byte()?;
    if len & 0x80 != 0 {
        reader.take((len - 0x80) as usize)?;
    }

    let r = lax_integer(&mut reader)?;
    let s = lax_integer(&mut reader)?;
    Some((left_pad(r)?, left_pad(s)?))
}

fn lax_integer<'a>(reader: &mut Reader<'a>) -> Option<&'a [u8]> {
    reader.expect(INTEGER)?;
    let len = reader.byte()?;
    let len = if len & 0x80 != 0 {
        let mut count = (len - 0x80) as usize;
        if count > reader.remaining() {
            return None;
        }
        while count > 0 && reader.peek()? == 0 {
            reader.pos += 1;
            count -= 1;
        }
        if count >= std::mem::size_of::<usize>() {
            return None;
        }
        let mut value = 0usize;
        for _ in 0..count {
            value = (value << 8) | reader.byte()? as usize;
        }
        value
    } else {
        len as usize
    };
    reader.take(len)
}

/// Assemble the SEC1 DER document for a private key and its serialized public key
///
/// The public key length selects the template: 33 bytes gives 214 bytes of
/// output, 65 bytes gives 279.
pub fn export_private_key(private_key: &[u8; 32], public_key: &[u8]) -> Option<Vec<u8>> {
    let (begin, middle) = match public_key.len() {
        33 => (PRIVKEY_COMPRESSED_BEGIN, PRIVKEY_COMPRESSED_MIDDLE),
        65 => (PRIVKEY_UNCOMPRESSED_BEGIN, PRIVKEY_UNCOMPRESSED_MIDDLE),
        _ => return None,
    };
    let begin = hex::decode(begin).ok()?;
    let middle = hex::decode(middle).ok()?;

    let mut out = Vec::with_capacity(begin.len() + 32 + middle.len() + public_key.len());
    out.extend_from_slice(&begin);
    out.extend_from_slice(private_key);
    out.extend_from_slice(&middle);
    out.extend_from_slice(public_key);
    Some(out)
}

/// Extract the 32-byte secret from a SEC1 `ECPrivateKey` document
///
/// Only the outer sequence, the version and the private key octet string are
/// checked; curve parameters and the embedded public key are ignored.
pub fn import_private_key(input: &[u8]) -> Option<[u8; 32]> {
    let mut reader = Reader::new(input);
    reader.expect(SEQUENCE)?;

    // Long-form sequence length with one or two length bytes
    let len_of_len = reader.byte()?;
    if len_of_len & 0x80 == 0 {
        return None;
    }
    let len_bytes = reader.take((len_of_len & 0x7f) as usize)?;
    let seq_len = match len_bytes {
        [lo] => *lo as usize,
        [hi, lo] => ((*hi as usize) << 8) | *lo as usize,
        _ => return None,
    };
    if seq_len > reader.remaining() {
        return None;
    }

    // version INTEGER 1
    if reader.take(3)? != [INTEGER, 0x01, 0x01] {
        return None;
    }

    reader.expect(OCTET_STRING)?;
    let key_len = reader.byte()?;
    if key_len > 0x20 {
        return None;
    }
    reader.take(key_len as usize)?.try_into().ok()
}
