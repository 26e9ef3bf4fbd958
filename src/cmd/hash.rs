//! Module implementing the `hash` subcommand for `keccak256` hashing data.

use crate::cmd;
use anyhow::Result;
use clap::Parser;
use keylab::hash;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Options {
    /// Path to the data to hash. Use `-` for standard in.
    #[clap(name = "DATA", default_value = "-")]
    data: PathBuf,

    /// Hash with SHA-256 instead of Keccak-256.
    #[clap(long)]
    sha256: bool,
}

pub fn run(options: Options) -> Result<()> {
    let data = cmd::read_input(&options.data)?;
    let digest = if options.sha256 {
        hash::sha256(data)
    } else {
        hash::keccak256(data)
    };
    println!("0x{}", hex::encode(digest));
    Ok(())
}
