mod cmd;

use crate::cmd::*;
use clap::Parser;
use std::process;

#[derive(Debug, Parser)]
#[clap(
    name = "keylab",
    about = "Public key cryptography and Ethereum transaction signing workbench"
)]
enum Options {
    /// Generate a new random key pair.
    Keypair(keypair::Options),
    /// Sign the Keccak-256 digest of a message.
    Sign(sign::Options),
    /// Verify a message signature.
    Verify(verify::Options),
    /// Encrypt a message for a public key.
    Encrypt(encrypt::Options),
    /// Decrypt a message with a key pair.
    Decrypt(decrypt::Options),
    /// Sign a legacy EIP-155 transfer, deployment or contract call.
    SignTransaction(sign_transaction::Options),
    /// ABI encode a function call.
    EncodeCall(encode_call::Options),
    /// Hash data with Keccak-256 or SHA-256.
    Hash(hash::Options),
    /// Encode or decode RLP data.
    Rlp(rlp::Options),
    /// Submit a signed transaction to a JSON-RPC node.
    Submit(submit::Options),
    /// Compile Solidity source code.
    Compile(compile::Options),
    /// Serve the JSON API over HTTP.
    Serve(serve::Options),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = match Options::parse() {
        Options::Keypair(options) => keypair::run(options),
        Options::Sign(options) => sign::run(options),
        Options::Verify(options) => verify::run(options),
        Options::Encrypt(options) => encrypt::run(options),
        Options::Decrypt(options) => decrypt::run(options),
        Options::SignTransaction(options) => sign_transaction::run(options),
        Options::EncodeCall(options) => encode_call::run(options),
        Options::Hash(options) => hash::run(options),
        Options::Rlp(options) => rlp::run(options),
        Options::Submit(options) => submit::run(options).await,
        Options::Compile(options) => compile::run(options).await,
        Options::Serve(options) => serve::run(options).await,
    } {
        if cfg!(debug_assertions) {
            eprintln!("ERROR: {:?}", err);
        } else {
            eprintln!("ERROR: {}", err);
        }
        process::exit(-1);
    }
}
