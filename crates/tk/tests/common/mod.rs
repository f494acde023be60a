//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the `tk` binary built for this test run
pub fn tk_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tk"))
}

/// A `tk` command running in `dir` with a predictable environment
pub fn tk_command(dir: &Path) -> Command {
    let mut command = Command::new(tk_binary());
    command
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("TK_DIR")
        .env_remove("TK_ASCII")
        .env_remove("RUST_LOG");
    command
}

/// Run the tk binary in the specified directory
pub fn run_tk_in_dir(dir: &Path, args: &[&str]) -> Output {
    tk_command(dir)
        .args(args)
        .output()
        .expect("Failed to execute tk binary")
}

/// Run tk and return stdout, failing the test if the command failed
pub fn tk_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_tk_in_dir(dir, args);
    assert!(
        output.status.success(),
        "tk {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is UTF-8")
}

/// Run tk expecting failure and return stderr
pub fn tk_err(dir: &Path, args: &[&str]) -> String {
    let output = run_tk_in_dir(dir, args);
    assert!(
        !output.status.success(),
        "tk {args:?} unexpectedly succeeded: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8(output.stderr).expect("stderr is UTF-8")
}

/// Write a record straight into `<dir>/.tickets/`
pub fn write_record(dir: &Path, id: &str, status: &str, deps: &[&str], title: &str) {
    let tickets = dir.join(".tickets");
    fs::create_dir_all(&tickets).expect("create tickets dir");
    let content = format!(
        "---\nid: {id}\nstatus: {status}\ndeps: [{}]\nlinks: []\ncreated: 2024-05-01T12:00:00Z\ntype: task\npriority: 2\n---\n# {title}\n",
        deps.join(", ")
    );
    fs::write(tickets.join(format!("{id}.md")), content).expect("write record");
}

/// Read a record from `<dir>/.tickets/`
pub fn read_record(dir: &Path, id: &str) -> String {
    fs::read_to_string(dir.join(".tickets").join(format!("{id}.md"))).expect("read record")
}
