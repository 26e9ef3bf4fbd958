//! Module implementing the `keypair` subcommand for generating a new random
//! secp256k1 key pair.

use crate::cmd::{self, SessionOptions};
use anyhow::Result;
use clap::Parser;
use keylab::{account::KeyPair, api::KeyPairResponse};

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(flatten)]
    session: SessionOptions,
}

pub fn run(options: Options) -> Result<()> {
    let pair = KeyPair::generate()?;
    let mut session = options.session.load()?;
    session.set_key_pair(&pair);
    options.session.save(&session)?;

    log::debug!("generated key pair for {}", pair.address);
    cmd::print_json(&KeyPairResponse::from(&pair))
}
