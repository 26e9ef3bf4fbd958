//! Module implementing the `sign` subcommand for signing the Keccak-256
//! digest of a message.

use crate::cmd::{self, KeyOptions};
use anyhow::Result;
use clap::Parser;
use keylab::api::{self, SignRequest};

#[derive(Debug, Parser)]
pub struct Options {
    /// The message to sign. Use `-` to read it from standard in.
    #[clap(name = "MESSAGE")]
    message: String,

    /// Only output the 64-byte `r || s` signature.
    #[clap(long)]
    signature_only: bool,

    #[clap(flatten)]
    key: KeyOptions,
}

pub fn run(options: Options) -> Result<()> {
    let response = api::sign_message(&SignRequest {
        message: Some(cmd::read_text(&options.message)?),
        private_key_hex: Some(options.key.private_key()?),
    })?;
    if options.signature_only {
        println!("{}", response.signature.full);
        Ok(())
    } else {
        cmd::print_json(&response)
    }
}
