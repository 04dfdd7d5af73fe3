//! Common test utilities for pipesh integration tests

pub use pipesh::{LineOutcome, ProcessStatus, Shell, ShellError};

/// The built binary, isolated from the user's rc file and log settings
#[allow(dead_code)]
pub fn pipesh() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("pipesh").unwrap();
    cmd.env("PIPESH_RC", "").env_remove("PIPESH_LOG").env_remove("PIPESH_BANNER");
    cmd
}

/// Run one line in a fresh in-process shell
#[allow(dead_code)]
pub fn run_line(line: &str) -> Result<LineOutcome, ShellError> {
    let mut shell = Shell::new();
    shell.execute_line(line)
}

/// Run one line and return the foreground status
#[allow(dead_code)]
pub fn status_of(line: &str) -> ProcessStatus {
    match run_line(line).unwrap() {
        LineOutcome::Foreground(status) => status,
        other => panic!("expected a foreground job, got {:?}", other),
    }
}

/// Single-quote a path for use in a pipesh line
#[allow(dead_code)]
pub fn quoted(path: &std::path::Path) -> String {
    format!("'{}'", path.display())
}
