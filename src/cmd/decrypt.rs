//! Module implementing the `decrypt` subcommand.

use crate::cmd::KeyOptions;
use anyhow::Result;
use clap::Parser;
use keylab::api::{self, DecryptRequest};

#[derive(Debug, Parser)]
pub struct Options {
    /// The hex encoded ciphertext.
    #[clap(name = "ENCRYPTED")]
    encrypted: String,

    /// The hex encoded 16-byte initialization vector.
    #[clap(long)]
    iv: String,

    /// The hex encoded public key the message was encrypted for. Defaults to
    /// the session key pair.
    #[clap(long)]
    public_key: Option<String>,

    #[clap(flatten)]
    key: KeyOptions,
}

pub fn run(options: Options) -> Result<()> {
    let response = api::decrypt(&DecryptRequest {
        encrypted: Some(options.encrypted.clone()),
        iv_hex: Some(options.iv.clone()),
        private_key_hex: Some(options.key.private_key()?),
        public_key_hex: Some(options.key.public_key(options.public_key.as_deref())?),
    })?;
    println!("{}", response.decrypted);
    Ok(())
}
