//! Small RLP encoding and decoding implementation.

use crate::canonical;
use ethnum::U256;
use serde_json::Value;

/// Maximum list nesting accepted when decoding.
pub const MAX_DEPTH: usize = 64;

/// An RLP item: either a byte string or a list of items.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

/// RLP encoding and decoding errors.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot RLP encode {0}: only byte strings and lists are supported")]
    UnsupportedType(&'static str),
    #[error("invalid byte string: {0}")]
    InvalidBytes(String),
    #[error("input too short: needed {needed} more bytes")]
    InputTooShort { needed: usize },
    #[error("{0} unexpected trailing bytes after RLP item")]
    TrailingBytes(usize),
    #[error("non-canonical RLP encoding: {0}")]
    NonCanonical(&'static str),
    #[error("RLP lists nested deeper than {0} levels")]
    TooDeep(usize),
}

impl Item {
    /// Creates a byte string item for an unsigned integer.
    pub fn uint(value: U256) -> Self {
        Item::Bytes(canonical::uint(value))
    }

    /// Returns the RLP encoding of the item.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Item::Bytes(value) => bytes(value),
            Item::List(items) => iter(items.iter().map(Item::encode)),
        }
    }

    /// Converts a JSON value into an RLP item.
    ///
    /// JSON strings are interpreted as hexadecimal byte strings and JSON
    /// arrays as lists. Any other JSON value is rejected: numbers, booleans,
    /// `null` and objects have no RLP representation and are never coerced.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => canonical::hex(s)
                .map(Item::Bytes)
                .map_err(|err| Error::InvalidBytes(format!("{err:#}"))),
            Value::Array(items) => items
                .iter()
                .map(Item::from_json)
                .collect::<Result<_, _>>()
                .map(Item::List),
            Value::Null => Err(Error::UnsupportedType("null")),
            Value::Bool(_) => Err(Error::UnsupportedType("a boolean")),
            Value::Number(_) => Err(Error::UnsupportedType("a number")),
            Value::Object(_) => Err(Error::UnsupportedType("an object")),
        }
    }

    /// Converts the item into JSON, with byte strings as `0x`-prefixed hex.
    pub fn to_json(&self) -> Value {
        match self {
            Item::Bytes(value) => Value::String(format!("0x{}", hex::encode(value))),
            Item::List(items) => Value::Array(items.iter().map(Item::to_json).collect()),
        }
    }
}

/// RLP encode a list of already encoded items.
pub fn list(items: &[&[u8]]) -> Vec<u8> {
    let total_len = items.iter().map(|item| item.len()).sum();
    let mut buf = len(total_len, 0xc0);
    for item in items {
        buf.extend_from_slice(item);
    }
    buf
}

/// RLP encodes an iterator of already encoded items as a list.
pub fn iter<U, I>(items: I) -> Vec<u8>
where
    U: AsRef<[u8]>,
    I: IntoIterator<Item = U>,
{
    let collected = items.into_iter().collect::<Vec<_>>();
    let items = collected.iter().map(U::as_ref).collect::<Vec<_>>();
    list(&items)
}

/// RLP encode some bytes.
pub fn bytes(bytes: &[u8]) -> Vec<u8> {
    match bytes {
        [x] if *x < 0x80 => vec![*x],
        _ => {
            let mut buf = len(bytes.len(), 0x80);
            buf.extend_from_slice(bytes);
            buf
        }
    }
}

/// RLP encode a length prefix.
pub fn len(len: usize, offset: u8) -> Vec<u8> {
    if len < 56 {
        vec![len as u8 + offset]
    } else {
        let bl_buf = len.to_be_bytes();
        let bl = {
            let start = len.leading_zeros() / 8;
            &bl_buf[start as usize..]
        };
        let mut buf = vec![bl.len() as u8 + offset + 55];
        buf.extend_from_slice(bl);
        buf
    }
}

/// RLP encode an unsigned integer as its shortest big-endian byte string.
pub fn uint(value: U256) -> Vec<u8> {
    bytes(&canonical::uint(value))
}

/// Decodes a single RLP item that must span the entire input.
pub fn decode(data: &[u8]) -> Result<Item, Error> {
    let (item, rest) = decode_item(data, 0)?;
    if !rest.is_empty() {
        return Err(Error::TrailingBytes(rest.len()));
    }
    Ok(item)
}

fn decode_item(data: &[u8], depth: usize) -> Result<(Item, &[u8]), Error> {
    let (&prefix, rest) = data
        .split_first()
        .ok_or(Error::InputTooShort { needed: 1 })?;
    match prefix {
        0x00..=0x7f => Ok((Item::Bytes(vec![prefix]), rest)),
        0x80..=0xbf => {
            let (payload, rest) = payload(prefix - 0x80, rest)?;
            if let [x] = payload {
                if *x < 0x80 {
                    return Err(Error::NonCanonical("single byte below 0x80 with prefix"));
                }
            }
            Ok((Item::Bytes(payload.to_vec()), rest))
        }
        0xc0..=0xff => {
            if depth >= MAX_DEPTH {
                return Err(Error::TooDeep(MAX_DEPTH));
            }
            let (mut payload, rest) = payload(prefix - 0xc0, rest)?;
            let mut items = Vec::new();
            while !payload.is_empty() {
                let (item, remaining) = decode_item(payload, depth + 1)?;
                items.push(item);
                payload = remaining;
            }
            Ok((Item::List(items), rest))
        }
    }
}

/// Splits a payload off the input given the prefix value relative to its
/// type offset (`0x80` for strings, `0xc0` for lists).
fn payload(short: u8, data: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    let (len, data) = if short < 56 {
        (short as usize, data)
    } else {
        let len_of_len = (short - 55) as usize;
        let (len_bytes, data) = split(data, len_of_len)?;
        if len_bytes[0] == 0 {
            return Err(Error::NonCanonical("length with leading zero bytes"));
        }
        if len_of_len > std::mem::size_of::<usize>() {
            return Err(Error::InputTooShort { needed: usize::MAX });
        }
        let len = len_bytes
            .iter()
            .fold(0_usize, |len, byte| (len << 8) | *byte as usize);
        if len < 56 {
            return Err(Error::NonCanonical("long form used for a short payload"));
        }
        (len, data)
    };
    split(data, len)
}

fn split(data: &[u8], len: usize) -> Result<(&[u8], &[u8]), Error> {
    if data.len() < len {
        return Err(Error::InputTooShort {
            needed: len - data.len(),
        });
    }
    Ok(data.split_at(len))
}
