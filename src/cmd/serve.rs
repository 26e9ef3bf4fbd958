//! Module implementing the `serve` subcommand for running the HTTP API.

use crate::cmd::compile::CompilerOptions;
use anyhow::Result;
use clap::Parser;
use keylab::{api::Service, server};
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Parser)]
pub struct Options {
    /// The socket address to listen on.
    #[clap(long, env = "KEYLAB_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Timeout in seconds for JSON-RPC submissions.
    #[clap(long, default_value_t = 30)]
    rpc_timeout: u64,

    #[clap(flatten)]
    compiler: CompilerOptions,
}

pub async fn run(options: Options) -> Result<()> {
    let service = Service::new(
        options.compiler.compiler(),
        Duration::from_secs(options.rpc_timeout),
    );
    server::run(options.bind, service).await?;
    Ok(())
}
