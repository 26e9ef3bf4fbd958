//! Module containing subcommands.

pub mod compile;
pub mod decrypt;
pub mod encode_call;
pub mod encrypt;
pub mod hash;
pub mod keypair;
pub mod rlp;
pub mod serve;
pub mod sign;
pub mod sign_transaction;
pub mod submit;
pub mod verify;

use anyhow::{Context as _, Result};
use clap::Parser;
use keylab::{account::PrivateKey, session::Session};
use serde::Serialize;
use std::{
    fs,
    io::{self, Read as _},
    path::{Path, PathBuf},
};

/// Shared session options.
#[derive(Debug, Parser)]
pub struct SessionOptions {
    /// Path to a JSON session file remembering the current key pair,
    /// compiled bytecode and encoded call data between invocations.
    #[clap(long, env = "KEYLAB_SESSION")]
    session: Option<PathBuf>,
}

impl SessionOptions {
    /// Loads the session, or an empty one when no session file is used.
    pub fn load(&self) -> Result<Session> {
        match &self.session {
            Some(path) => Session::load(path),
            None => Ok(Session::default()),
        }
    }

    /// Saves the session if a session file is used.
    pub fn save(&self, session: &Session) -> Result<()> {
        match &self.session {
            Some(path) => session.save(path),
            None => Ok(()),
        }
    }
}

/// Shared signing key options.
#[derive(Debug, Parser)]
pub struct KeyOptions {
    /// The hex encoded private key. Defaults to the session key pair.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[clap(flatten)]
    pub session: SessionOptions,
}

impl KeyOptions {
    /// Returns the hex encoded private key to sign with.
    pub fn private_key(&self) -> Result<String> {
        if let Some(key) = &self.private_key {
            return Ok(key.clone());
        }
        let pair = self.session.load()?.key_pair()?.context(
            "no private key specified, use --private-key or generate one \
             with `keylab keypair --session <PATH>`",
        )?;
        Ok(hex::encode(pair.private_key.secret()))
    }

    /// Returns the hex encoded public key, either the one given or the one
    /// belonging to the signing key.
    pub fn public_key(&self, public_key: Option<&str>) -> Result<String> {
        if let Some(key) = public_key {
            return Ok(key.to_owned());
        }
        let key = PrivateKey::from_hex(&self.private_key()?)?;
        Ok(hex::encode(key.public().encode_uncompressed()))
    }
}

/// Reads the entirety of the input at the specified path, where `-` is
/// standard in.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Reads a UTF-8 text argument, where `-` reads it from standard in.
pub fn read_text(value: &str) -> Result<String> {
    if value == "-" {
        let bytes = read_input(Path::new("-"))?;
        String::from_utf8(bytes).context("input is not valid UTF-8")
    } else {
        Ok(value.to_owned())
    }
}

/// Prints a value as pretty JSON to standard out.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
