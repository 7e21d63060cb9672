#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

pub fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    crate_root().join("tests/fixtures").join(name)
}

// The end-to-end example: one api resource, one auth resource, all strings.
pub fn sample_outputs() -> Value {
    let path = fixture_path("backend_outputs.json");
    let file = File::open(&path).expect("fixture present");
    serde_json::from_reader(file).expect("fixture parses")
}

// Removes a key by dotted path; panics when the path does not exist.
pub fn without(mut value: Value, path: &str) -> Value {
    let (parent, leaf) = path.rsplit_once('.').unwrap_or(("", path));
    let pointer = if parent.is_empty() {
        String::new()
    } else {
        format!("/{}", parent.replace('.', "/"))
    };
    value
        .pointer_mut(&pointer)
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.remove(leaf))
        .unwrap_or_else(|| panic!("{path} not present in fixture"));
    value
}

pub fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_outputs-shape"))
}

pub fn run_command(cmd: Command) -> Result<Output> {
    let mut cmd = cmd;
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

// Runs the CLI with `stdin` piped in and returns the raw output regardless of status.
pub fn run_with_stdin(args: &[&str], stdin: &str) -> Result<Output> {
    let mut child = Command::new(cli_binary())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning outputs-shape")?;
    child
        .stdin
        .take()
        .context("stdin handle")?
        .write_all(stdin.as_bytes())?;
    child.wait_with_output().context("waiting for outputs-shape")
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path)
}
