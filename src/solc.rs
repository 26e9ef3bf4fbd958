//! Solidity compilation through the `solc` standard JSON interface.

use serde_json::{json, Value};
use std::{
    io,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::Duration,
};
use thiserror::Error;
use tokio::{io::AsyncWriteExt as _, process::Command};

/// Name of the single source unit submitted to the compiler.
pub const SOURCE_NAME: &str = "Contract.sol";

/// Default timeout for a compiler invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A compilation error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to run solidity compiler '{path}': {source}")]
    Spawn { path: String, source: io::Error },
    #[error("solidity compilation timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("solidity compiler exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("invalid compiler output: {0}")]
    InvalidOutput(String),
    #[error("compilation errors")]
    Diagnostics(Vec<String>),
    #[error("no contracts found in the code")]
    NoContracts,
    #[error(
        "no bytecode generated for {0}, make sure your contract has a constructor or is deployable"
    )]
    EmptyBytecode(String),
}

/// A compiled contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    pub name: String,
    pub bytecode: Vec<u8>,
}

/// A `solc` executable.
#[derive(Clone, Debug)]
pub struct Compiler {
    path: PathBuf,
    timeout: Duration,
}

impl Compiler {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Compiles Solidity source code, returning the first contract it
    /// defines in name order.
    pub async fn compile(&self, source: &str) -> Result<Contract, Error> {
        let spawn_error = |source| Error::Spawn {
            path: self.path.display().to_string(),
            source,
        };
        let mut child = Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let input = serde_json::to_vec(&input(source))
            .map_err(|err| Error::InvalidOutput(err.to_string()))?;
        let run = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&input).await?;
            }
            child.wait_with_output().await
        };
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(spawn_error)?;

        let value = match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(value) => value,
            Err(_) if !output.status.success() => {
                return Err(Error::Failed {
                    status: output.status,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                })
            }
            Err(err) => return Err(Error::InvalidOutput(err.to_string())),
        };
        parse_output(&value)
    }
}

/// Returns the standard JSON input for a single source unit, selecting only
/// the creation bytecode as output.
pub fn input(source: &str) -> Value {
    json!({
        "language": "Solidity",
        "sources": {
            SOURCE_NAME: { "content": source },
        },
        "settings": {
            "outputSelection": {
                "*": { "*": ["evm.bytecode"] },
            },
        },
    })
}

/// Extracts the first contract from standard JSON output.
///
/// Only diagnostics with `error` severity fail the compilation, warnings
/// are ignored.
pub fn parse_output(output: &Value) -> Result<Contract, Error> {
    let errors = output
        .get("errors")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|error| error.get("severity").and_then(Value::as_str) == Some("error"))
        .map(|error| {
            error
                .get("formattedMessage")
                .or_else(|| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| error.to_string())
        })
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        return Err(Error::Diagnostics(errors));
    }

    let (name, contract) = output
        .get("contracts")
        .and_then(|contracts| contracts.get(SOURCE_NAME))
        .and_then(Value::as_object)
        .and_then(|contracts| contracts.iter().min_by(|a, b| a.0.cmp(b.0)))
        .ok_or(Error::NoContracts)?;

    let object = contract
        .pointer("/evm/bytecode/object")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let object = object.strip_prefix("0x").unwrap_or(object);
    if object.is_empty() {
        return Err(Error::EmptyBytecode(name.clone()));
    }
    let bytecode = hex::decode(object).map_err(|err| {
        Error::InvalidOutput(format!("bytecode for {name} is not hex: {err}"))
    })?;

    Ok(Contract {
        name: name.clone(),
        bytecode,
    })
}
