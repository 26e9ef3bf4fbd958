//! Module implementing the `encrypt` subcommand.

use crate::cmd::{self, KeyOptions};
use anyhow::Result;
use clap::Parser;
use keylab::api::{self, EncryptRequest};

#[derive(Debug, Parser)]
pub struct Options {
    /// The message to encrypt. Use `-` to read it from standard in.
    #[clap(name = "MESSAGE")]
    message: String,

    /// The recipient's hex encoded public key. Defaults to the session key
    /// pair.
    #[clap(long)]
    public_key: Option<String>,

    #[clap(flatten)]
    key: KeyOptions,
}

pub fn run(options: Options) -> Result<()> {
    let response = api::encrypt(&EncryptRequest {
        message: Some(cmd::read_text(&options.message)?),
        public_key_hex: Some(options.key.public_key(options.public_key.as_deref())?),
    })?;
    cmd::print_json(&response)
}
