//! Solidity ABI function call encoding.
//!
//! A function call is a 4-byte selector, the leading bytes of the Keccak-256
//! digest of the function's canonical signature, followed by the ABI encoded
//! argument tuple.

mod kind;
mod token;

pub use self::{
    kind::ParamKind,
    token::{encode, Token},
};
use crate::hash;
use anyhow::{ensure, Context as _, Result};
use serde_json::Value;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A parsed function signature, such as `transfer(address,uint256)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<ParamKind>,
}

impl Function {
    /// Returns the 4-byte function selector for the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        let digest = hash::keccak256(self.to_string());
        let mut selector = [0; 4];
        selector.copy_from_slice(&digest[..4]);
        selector
    }

    /// Encodes a call to this function with JSON parameter values.
    ///
    /// The number of parameters must match the signature exactly.
    pub fn encode(&self, parameters: &[Value]) -> Result<FunctionCall> {
        ensure!(
            parameters.len() == self.inputs.len(),
            "parameter count mismatch: expected {} parameters, got {}",
            self.inputs.len(),
            parameters.len(),
        );
        let tokens = self
            .inputs
            .iter()
            .zip(parameters)
            .enumerate()
            .map(|(i, (kind, value))| {
                Token::from_json(kind, value)
                    .with_context(|| format!("invalid parameter {i} of type {kind}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FunctionCall {
            selector: self.selector(),
            arguments: encode(&tokens),
        })
    }
}

impl FromStr for Function {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, params) = s
            .strip_suffix(')')
            .and_then(|s| s.split_once('('))
            .with_context(|| format!("invalid function signature '{s}', expected name(types)"))?;
        let name = name.trim();
        ensure!(
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
            "invalid function name '{name}'",
        );

        let inputs = if params.trim().is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(str::parse)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("invalid function signature '{s}'"))?
        };

        Ok(Self {
            name: name.to_owned(),
            inputs,
        })
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{input}")?;
        }
        f.write_str(")")
    }
}

/// An encoded function call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionCall {
    pub selector: [u8; 4],
    pub arguments: Vec<u8>,
}

impl FunctionCall {
    /// Returns the complete call data: selector followed by arguments.
    pub fn data(&self) -> Vec<u8> {
        [&self.selector[..], &self.arguments].concat()
    }
}

/// Parses a function signature and encodes a call with the specified
/// parameters.
pub fn encode_function_call(signature: &str, parameters: &[Value]) -> Result<FunctionCall> {
    signature.parse::<Function>()?.encode(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use serde_json::json;

    #[test]
    fn erc20_transfer() {
        let call = encode_function_call(
            "transfer(address,uint256)",
            &[json!("0x1111111111111111111111111111111111111111"), json!("1000")],
        )
        .unwrap();
        assert_eq!(call.selector, hex!("a9059cbb"));
        assert_eq!(call.arguments.len(), 64);
        assert_eq!(
            call.data(),
            hex!(
                "a9059cbb
                 0000000000000000000000001111111111111111111111111111111111111111
                 00000000000000000000000000000000000000000000000000000000000003e8"
            ),
        );
    }

    #[test]
    fn parameter_count_mismatch() {
        let err = encode_function_call(
            "transfer(address,uint256)",
            &[json!("0x1111111111111111111111111111111111111111")],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter count mismatch: expected 2 parameters, got 1",
        );
        assert!(encode_function_call("transfer(address,uint256)", &[]).is_err());
        assert!(encode_function_call("totalSupply()", &[json!(1)]).is_err());
    }

    #[test]
    fn selectors_use_canonical_signature() {
        let selector = |s: &str| s.parse::<Function>().unwrap().selector();
        assert_eq!(selector("balanceOf(address)"), hex!("70a08231"));
        assert_eq!(selector("setGreeting(string)"), hex!("a4136862"));
        assert_eq!(
            selector(" transfer( address , uint )"),
            selector("transfer(address,uint256)"),
        );
    }

    #[test]
    fn no_arguments() {
        let call = encode_function_call("totalSupply()", &[]).unwrap();
        assert_eq!(call.selector, hex!("18160ddd"));
        assert!(call.arguments.is_empty());
        assert_eq!(call.data(), hex!("18160ddd"));
    }

    #[test]
    fn dynamic_string_argument() {
        let call = encode_function_call("setGreeting(string)", &[json!("Hello")]).unwrap();
        assert_eq!(
            call.data(),
            hex!(
                "a4136862
                 0000000000000000000000000000000000000000000000000000000000000020
                 0000000000000000000000000000000000000000000000000000000000000005
                 48656c6c6f000000000000000000000000000000000000000000000000000000"
            ),
        );
    }

    #[test]
    fn invalid_signatures() {
        for signature in [
            "transfer",
            "transfer(address",
            "(address)",
            "1transfer(address)",
            "transfer(address,)",
            "swap((uint256,uint256))",
            "transfer(wallet)",
        ] {
            assert!(signature.parse::<Function>().is_err(), "{signature}");
        }
    }
}
