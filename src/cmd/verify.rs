//! Module implementing the `verify` subcommand for checking a message
//! signature against a public key.

use crate::cmd::{self, KeyOptions};
use anyhow::{bail, Result};
use clap::Parser;
use keylab::api::{self, VerifyRequest};

#[derive(Debug, Parser)]
pub struct Options {
    /// The signed message. Use `-` to read it from standard in.
    #[clap(name = "MESSAGE")]
    message: String,

    /// The hex encoded 64-byte `r || s` signature.
    #[clap(short, long)]
    signature: String,

    /// The hex encoded SEC1 public key. Defaults to the session key pair.
    #[clap(long)]
    public_key: Option<String>,

    #[clap(flatten)]
    key: KeyOptions,
}

pub fn run(options: Options) -> Result<()> {
    let response = api::verify_signature(&VerifyRequest {
        message: Some(cmd::read_text(&options.message)?),
        signature_hex: Some(options.signature.clone()),
        public_key_hex: Some(options.key.public_key(options.public_key.as_deref())?),
    })?;
    cmd::print_json(&response)?;
    if !response.is_valid {
        bail!("signature is not valid");
    }
    Ok(())
}
