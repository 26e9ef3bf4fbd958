//! Module implementing the `rlp` subcommand for encoding and decoding
//! Recursive Length Prefix data.

use crate::cmd;
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use keylab::{canonical, rlp};
use std::{path::PathBuf, str};

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(subcommand)]
    op: Op,
}

#[derive(Debug, Subcommand)]
enum Op {
    /// Encode a JSON item, where strings are hex byte strings and arrays are
    /// lists, for example `["0x01", ["0xcafe"]]`.
    Encode {
        /// Path to the JSON item to encode. Use `-` for standard in.
        #[clap(name = "ITEM", default_value = "-")]
        item: PathBuf,
    },

    /// Decode hex encoded RLP data into a JSON item.
    Decode {
        /// Path to the data to decode. Use `-` for standard in.
        #[clap(name = "DATA", default_value = "-")]
        data: PathBuf,
    },
}

pub fn run(options: Options) -> Result<()> {
    match options.op {
        Op::Encode { item } => {
            let json = serde_json::from_slice(&cmd::read_input(&item)?)
                .context("RLP item is not valid JSON")?;
            let item = rlp::Item::from_json(&json)?;
            println!("0x{}", hex::encode(item.encode()));
        }
        Op::Decode { data } => {
            let data = cmd::read_input(&data)?;
            let bytes = canonical::hex(str::from_utf8(&data)?)?;
            let item = rlp::decode(&bytes)?;
            cmd::print_json(&item.to_json())?;
        }
    }
    Ok(())
}
