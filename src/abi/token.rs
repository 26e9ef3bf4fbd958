//! Typed ABI values and their standard 32-byte slot encoding.

use super::ParamKind;
use crate::{canonical, serialization};
use anyhow::{bail, ensure, Context as _, Result};
use ethaddr::Address;
use ethnum::{AsU256 as _, I256, U256};
use serde_json::Value;

/// A typed ABI value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Token>),
    FixedArray(Vec<Token>),
}

impl Token {
    /// Converts a JSON parameter value into a token of the specified kind.
    ///
    /// Integers may be JSON numbers, decimal strings or `0x`-prefixed
    /// hexadecimal strings. Byte values are hexadecimal strings, with or
    /// without `0x` prefix.
    pub fn from_json(kind: &ParamKind, value: &Value) -> Result<Self> {
        Ok(match kind {
            ParamKind::Address => {
                let s = text(kind, value)?;
                Token::Address(Address::from_slice(&canonical::fixed_hex::<20>(s)?))
            }
            ParamKind::Bool => Token::Bool(match value {
                Value::Bool(value) => *value,
                Value::String(s) if s.trim() == "true" => true,
                Value::String(s) if s.trim() == "false" => false,
                _ => bail!("expected boolean for bool but got {value}"),
            }),
            ParamKind::Uint(n) => {
                let value = serialization::u256::deserialize(value.clone())
                    .with_context(|| format!("invalid uint{n} value {value}"))?;
                ensure!(
                    value.leading_zeros() + n >= 256,
                    "value {value} overflows uint{n}",
                );
                Token::Uint(value)
            }
            ParamKind::Int(n) => {
                let value = serialization::i256::deserialize(value.clone())
                    .with_context(|| format!("invalid int{n} value {value}"))?;
                let bits = if value < I256::ZERO {
                    (!value).leading_zeros()
                } else {
                    value.leading_zeros()
                };
                ensure!(bits + n > 256, "value {value} overflows int{n}");
                Token::Int(value)
            }
            ParamKind::FixedBytes(n) => {
                let bytes = canonical::hex(text(kind, value)?)?;
                ensure!(
                    bytes.len() == *n,
                    "expected {n} bytes for {kind} but got {}",
                    bytes.len(),
                );
                Token::FixedBytes(bytes)
            }
            ParamKind::Bytes => Token::Bytes(canonical::hex(text(kind, value)?)?),
            ParamKind::String => Token::String(text(kind, value)?.to_owned()),
            ParamKind::Array(inner) => Token::Array(elements(inner, value)?),
            ParamKind::FixedArray(inner, n) => {
                let elements = elements(inner, value)?;
                ensure!(
                    elements.len() == *n,
                    "expected {n} elements for {kind} but got {}",
                    elements.len(),
                );
                Token::FixedArray(elements)
            }
        })
    }

    /// Returns true if the token is encoded in the tail section.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::FixedArray(tokens) => tokens.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    /// Returns the ABI encoding of the token.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Token::Address(address) => {
                let mut word = [0; 32];
                word[12..].copy_from_slice(&**address);
                word.to_vec()
            }
            Token::Bool(value) => word(u8::from(*value).as_u256()),
            Token::Uint(value) => word(*value),
            Token::Int(value) => value.to_be_bytes().to_vec(),
            Token::FixedBytes(bytes) => padded(bytes),
            Token::Bytes(bytes) => [word(bytes.len().as_u256()), padded(bytes)].concat(),
            Token::String(s) => [word(s.len().as_u256()), padded(s.as_bytes())].concat(),
            Token::Array(tokens) => [word(tokens.len().as_u256()), encode(tokens)].concat(),
            Token::FixedArray(tokens) => encode(tokens),
        }
    }
}

/// Encodes a sequence of tokens as an ABI tuple: static values inline in
/// the head, dynamic values in the tail referenced by their byte offset
/// from the start of the tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let encoded = tokens.iter().map(Token::encode).collect::<Vec<_>>();
    let head_len = tokens
        .iter()
        .zip(&encoded)
        .map(|(token, encoded)| if token.is_dynamic() { 32 } else { encoded.len() })
        .sum::<usize>();

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (token, encoded) in tokens.iter().zip(encoded) {
        if token.is_dynamic() {
            head.extend_from_slice(&word((head_len + tail.len()).as_u256()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }
    head.extend(tail);
    head
}

fn word(value: U256) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn padded(bytes: &[u8]) -> Vec<u8> {
    let mut buffer = bytes.to_vec();
    buffer.resize(bytes.len().div_ceil(32) * 32, 0);
    buffer
}

fn text<'a>(kind: &ParamKind, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .with_context(|| format!("expected string for {kind} but got {value}"))
}

fn elements(kind: &ParamKind, value: &Value) -> Result<Vec<Token>> {
    let values = match value {
        Value::Array(values) => values,
        _ => bail!("expected JSON array of {kind} but got {value}"),
    };
    values
        .iter()
        .map(|value| Token::from_json(kind, value))
        .collect()
}
