//! Solidity ABI parameter types.

use anyhow::{bail, ensure, Result};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A function parameter type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamKind {
    Address,
    Bool,
    Uint(u32),
    Int(u32),
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<ParamKind>),
    FixedArray(Box<ParamKind>, usize),
}

impl ParamKind {
    /// Returns true if values of this type are encoded in the tail section
    /// and referenced by offset from the head.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamKind::Bytes | ParamKind::String | ParamKind::Array(_) => true,
            ParamKind::FixedArray(inner, _) => inner.is_dynamic(),
            _ => false,
        }
    }
}

impl FromStr for ParamKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        match value {
            "address" => return Ok(ParamKind::Address),
            "bool" => return Ok(ParamKind::Bool),
            "bytes" => return Ok(ParamKind::Bytes),
            "string" => return Ok(ParamKind::String),
            "uint" => return Ok(ParamKind::Uint(256)),
            "int" => return Ok(ParamKind::Int(256)),
            "byte" => return Ok(ParamKind::FixedBytes(1)),
            _ => {}
        }
        ensure!(
            !value.starts_with('(') && !value.contains(')'),
            "tuple parameter types are not supported: {value}"
        );

        if let Some(prefix) = value.strip_suffix("[]") {
            return Ok(ParamKind::Array(Box::new(prefix.parse()?)));
        }
        if let Some((prefix, n)) = value.strip_suffix(']').and_then(|value| {
            let (prefix, n) = value.rsplit_once('[')?;
            Some((prefix, n.trim().parse::<usize>().ok()?))
        }) {
            return Ok(ParamKind::FixedArray(Box::new(prefix.parse()?), n));
        }

        if let Some((prefix, n)) = value.find(|c: char| c.is_ascii_digit()).and_then(|i| {
            let (prefix, n) = value.split_at(i);
            Some((prefix, n.parse::<u32>().ok()?))
        }) {
            match (prefix, n) {
                ("bytes", n) if (1..=32).contains(&n) => {
                    return Ok(ParamKind::FixedBytes(n as _))
                }
                ("uint", n) if n % 8 == 0 && (8..=256).contains(&n) => {
                    return Ok(ParamKind::Uint(n))
                }
                ("int", n) if n % 8 == 0 && (8..=256).contains(&n) => {
                    return Ok(ParamKind::Int(n))
                }
                _ => {}
            }
        }

        bail!("unsupported ABI parameter type '{value}'")
    }
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ParamKind::Address => f.write_str("address"),
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Uint(n) => write!(f, "uint{n}"),
            ParamKind::Int(n) => write!(f, "int{n}"),
            ParamKind::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamKind::Bytes => f.write_str("bytes"),
            ParamKind::String => f.write_str("string"),
            ParamKind::Array(kind) => write!(f, "{kind}[]"),
            ParamKind::FixedArray(kind, n) => write!(f, "{kind}[{n}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn parses_and_canonicalizes() {
        let kinds = hashmap! {
            "address" => "address",
            "uint" => "uint256",
            "int" => "int256",
            "uint8" => "uint8",
            "int128" => "int128",
            "byte" => "bytes1",
            "bytes32" => "bytes32",
            "bytes" => "bytes",
            "string" => "string",
            "uint[]" => "uint256[]",
            "address[2]" => "address[2]",
            "bytes4[][3]" => "bytes4[][3]",
            " bool " => "bool",
        };
        for (input, canonical) in kinds {
            assert_eq!(input.parse::<ParamKind>().unwrap().to_string(), canonical);
        }
    }

    #[test]
    fn rejects_unsupported_types() {
        for kind in [
            "uint7", "uint264", "int0", "bytes0", "bytes33", "fixed", "(uint256,bool)",
            "Person", "",
        ] {
            assert!(kind.parse::<ParamKind>().is_err(), "{kind}");
        }
    }

    #[test]
    fn dynamic_types() {
        let dynamic = |s: &str| s.parse::<ParamKind>().unwrap().is_dynamic();
        assert!(!dynamic("uint256"));
        assert!(!dynamic("address[3]"));
        assert!(dynamic("bytes"));
        assert!(dynamic("string"));
        assert!(dynamic("uint256[]"));
        assert!(dynamic("string[2]"));
    }
}
