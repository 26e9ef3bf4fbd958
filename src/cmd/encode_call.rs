//! Module implementing the `encode-call` subcommand for ABI encoding
//! function calls.

use crate::cmd::{self, SessionOptions};
use anyhow::Result;
use clap::Parser;
use keylab::{
    api::{self, EncodeFunctionRequest},
    canonical,
};
use serde_json::Value;

#[derive(Debug, Parser)]
pub struct Options {
    /// The function signature, for example `transfer(address,uint256)`.
    #[clap(name = "SIGNATURE")]
    signature: String,

    /// The function parameters. Arguments that parse as JSON (numbers,
    /// booleans, arrays) are used as is, anything else is a string.
    #[clap(name = "PARAMS")]
    parameters: Vec<String>,

    /// Only output the complete call data.
    #[clap(long)]
    data_only: bool,

    #[clap(flatten)]
    session: SessionOptions,
}

pub fn run(options: Options) -> Result<()> {
    let parameters = options
        .parameters
        .iter()
        .map(|param| parameter(param))
        .collect::<Vec<_>>();
    let response = api::encode_function_call(&EncodeFunctionRequest {
        function_signature: Some(options.signature.clone()),
        parameters: Some(parameters),
    })?;

    let mut session = options.session.load()?;
    session.call_data = Some(canonical::hex(&response.data)?);
    options.session.save(&session)?;

    if options.data_only {
        println!("{}", response.data);
        Ok(())
    } else {
        cmd::print_json(&response)
    }
}

fn parameter(param: &str) -> Value {
    match serde_json::from_str::<Value>(param) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Array(_))) => value,
        _ => Value::String(param.to_owned()),
    }
}
