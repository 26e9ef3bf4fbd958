//! Module implementing the `sign-transaction` subcommand for signing legacy
//! EIP-155 transactions.

use crate::cmd::{self, KeyOptions};
use anyhow::{Context as _, Result};
use clap::Parser;
use keylab::{
    account::PrivateKey,
    api,
    transaction::{Mode, Request},
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Options {
    /// Path to the transaction request in JSON format. Use `-` for standard
    /// in. Amounts are in Ether and gas prices in Gwei.
    #[clap(name = "REQUEST", default_value = "-")]
    request: PathBuf,

    /// The transaction mode. When omitted, it is inferred from the request:
    /// a `null` recipient deploys a contract and non-empty data calls one.
    #[clap(long)]
    mode: Option<Mode>,

    /// Only output the RLP encoded signed transaction.
    #[clap(long)]
    raw: bool,

    #[clap(flatten)]
    key: KeyOptions,
}

pub fn run(options: Options) -> Result<()> {
    let mut request = serde_json::from_slice::<Request>(&cmd::read_input(&options.request)?)
        .context("invalid transaction request")?;

    if options.mode.is_some() {
        request.mode = options.mode;
    }
    if request.private_key.is_none() {
        request.private_key = Some(options.key.private_key()?);
    }
    if request.from.is_none() {
        if let Some(key) = request.private_key.as_deref() {
            request.from = Some(format!("0x{}", hex::encode(*PrivateKey::from_hex(key)?.address())));
        }
    }
    let has_data = request.data.as_deref().is_some_and(|data| {
        let data = data.trim();
        !data.is_empty() && data != "0x"
    });
    if let (false, Some(mode)) = (has_data, request.mode) {
        if let Some(data) = options.key.session.load()?.data(mode) {
            log::debug!("using {} bytes of session data for {mode} transaction", data.len());
            request.data = Some(format!("0x{}", hex::encode(data)));
        }
    }

    let response = api::sign_transaction(&request)?;
    if options.raw {
        println!("{}", response.signed_transaction);
        Ok(())
    } else {
        cmd::print_json(&response)
    }
}
