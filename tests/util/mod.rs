#![allow(dead_code)]

#[path = "../../src/testing.rs"]
mod testing;

pub use testing::*;
use std::{
    io::Write as _,
    path::PathBuf,
    process::{Command, Stdio},
    str, thread,
};

/// Utility type for building a `keylab` command for integration tests.
pub struct Keylab {
    command: Command,
    stdin: Option<Vec<u8>>,
}

impl Keylab {
    /// Create a new `keylab` command builder signing with the test key.
    pub fn new(subcommand: &str, args: &[&str]) -> Self {
        let mut command = Command::new("cargo");
        command
            .env("PRIVATE_KEY", hex::encode(testing::PRIVATE_KEY))
            .env_remove("KEYLAB_SESSION")
            .args(["run", "--quiet", "--", subcommand])
            .args(args);
        Self {
            command,
            stdin: None,
        }
    }

    /// Sets an environment variable for the command.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env(key, value);
        self
    }

    /// Removes the test key from the environment.
    pub fn without_private_key(mut self) -> Self {
        self.command.env_remove("PRIVATE_KEY");
        self
    }

    /// Sets the standard input to be used for the command.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Executes the command and returns the standard output on success and
    /// standard error on failure.
    pub fn execute(mut self) -> Result<String, String> {
        self.command.stdout(Stdio::piped()).stderr(Stdio::piped());
        if self.stdin.is_some() {
            self.command.stdin(Stdio::piped());
        }

        let mut process = self.command.spawn().unwrap();

        let input = self.stdin.map(|data| {
            let mut stdin = process.stdin.take().unwrap();
            thread::spawn(move || {
                stdin.write_all(&data).unwrap();
            })
        });

        let output = process.wait_with_output().unwrap();
        if let Some(input) = input {
            input.join().unwrap();
        }

        if output.status.success() {
            Ok(string_from_utf8(output.stdout))
        } else {
            Err(string_from_utf8(output.stderr))
        }
    }

    /// Builds and executes a `keylab` command.
    pub fn run(subcommand: &str, args: &[&str]) -> String {
        Keylab::new(subcommand, args).execute().unwrap()
    }

    /// Builds and executes a `keylab` command, parsing its output as JSON.
    pub fn json(subcommand: &str, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&Keylab::run(subcommand, args)).unwrap()
    }
}

/// Returns a fresh session file path for a test.
pub fn session_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "keylab-test-{}-{name}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn string_from_utf8(bytes: Vec<u8>) -> String {
    str::from_utf8(&bytes).unwrap().trim().to_string()
}
