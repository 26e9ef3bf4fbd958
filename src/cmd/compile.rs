//! Module implementing the `compile` subcommand for compiling Solidity
//! source code into contract creation bytecode.

use crate::cmd::{self, SessionOptions};
use anyhow::{bail, Result};
use clap::Parser;
use keylab::{
    api::{self, CompileRequest},
    solc::Compiler,
};
use std::{path::PathBuf, time::Duration};

/// Shared compiler options.
#[derive(Debug, Parser)]
pub struct CompilerOptions {
    /// Path to the `solc` executable.
    #[clap(long, env = "SOLC", default_value = "solc")]
    pub solc: PathBuf,

    /// Timeout in seconds for a compilation.
    #[clap(long, default_value_t = 60)]
    pub compile_timeout: u64,
}

impl CompilerOptions {
    pub fn compiler(&self) -> Compiler {
        Compiler::new(&self.solc, Duration::from_secs(self.compile_timeout))
    }
}

#[derive(Debug, Parser)]
pub struct Options {
    /// Path to the Solidity source file. Use `-` for standard in.
    #[clap(name = "SOURCE", default_value = "-")]
    source: PathBuf,

    /// Only output the hex encoded bytecode.
    #[clap(long)]
    bytecode_only: bool,

    #[clap(flatten)]
    compiler: CompilerOptions,

    #[clap(flatten)]
    session: SessionOptions,
}

pub async fn run(options: Options) -> Result<()> {
    let source = String::from_utf8(cmd::read_input(&options.source)?)?;
    let compiler = options.compiler.compiler();
    let response = match api::compile_solidity(&compiler, &CompileRequest { code: Some(source) })
        .await
    {
        Ok(response) => response,
        Err(api::Error::Upstream { message, errors }) if !errors.is_empty() => {
            bail!("{message}:\n{}", errors.join("\n"))
        }
        Err(err) => return Err(err.into()),
    };

    let mut session = options.session.load()?;
    session.bytecode = Some(hex::decode(&response.bytecode)?);
    options.session.save(&session)?;

    if options.bytecode_only {
        println!("{}", response.bytecode);
        Ok(())
    } else {
        cmd::print_json(&response)
    }
}
