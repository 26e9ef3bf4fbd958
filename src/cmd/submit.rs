//! Module implementing the `submit` subcommand for broadcasting a signed
//! transaction to a JSON-RPC node.

use crate::cmd;
use anyhow::Result;
use clap::Parser;
use keylab::api::{self, SubmitTransactionRequest};
use std::time::Duration;

#[derive(Debug, Parser)]
pub struct Options {
    /// The `0x` prefixed signed transaction. Use `-` to read it from
    /// standard in.
    #[clap(name = "TRANSACTION")]
    transaction: String,

    /// The node's JSON-RPC URL.
    #[clap(long, env = "RPC_URL")]
    rpc_url: String,

    /// Timeout in seconds for the RPC request.
    #[clap(long, default_value_t = 30)]
    rpc_timeout: u64,
}

pub async fn run(options: Options) -> Result<()> {
    let transaction = cmd::read_text(&options.transaction)?.trim().to_owned();
    let request = SubmitTransactionRequest {
        rpc_url: Some(options.rpc_url.clone()),
        signed_transaction: Some(transaction),
    };
    let response =
        api::submit_transaction(&request, Duration::from_secs(options.rpc_timeout)).await?;
    cmd::print_json(&response)
}
