//! Shell state that lives for the whole read loop
//!
//! Holds the environment handed to every child, the logical working
//! directory (stored as `PWD` in that environment), the background job table
//! and the status of the last foreground pipeline. Components receive it by
//! reference; nothing reads the process environment behind its back.

use crate::config::{DEFAULT_HOME, DEFAULT_PROMPT, HOME_VAR, PATH_VAR, PROMPT_VAR, PWD_VAR};
use crate::jobs::{JobTracker, ProcessStatus};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ShellState {
    env: HashMap<String, String>,
    /// Background jobs not yet reaped
    pub jobs: JobTracker,
    /// Status of the last foreground pipeline or built-in
    pub last_status: ProcessStatus,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::from_process_env()
    }
}

impl ShellState {
    /// Snapshot the process environment and work out the logical directory
    pub fn from_process_env() -> Self {
        let vars = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        let mut state = Self::with_env(vars);

        let logical = initial_logical_pwd(state.var(PWD_VAR));
        state.set_logical_pwd(&logical);
        state
    }

    /// Build a state from explicit variables, taken as-is
    pub fn with_env<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        ShellState {
            env: vars.into_iter().collect(),
            jobs: JobTracker::new(),
            last_status: ProcessStatus::Exited(0),
        }
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    pub fn prompt(&self) -> &str {
        self.var(PROMPT_VAR).unwrap_or(DEFAULT_PROMPT)
    }

    pub fn search_path(&self) -> &str {
        self.var(PATH_VAR).unwrap_or("")
    }

    pub fn home(&self) -> &str {
        self.var(HOME_VAR).unwrap_or(DEFAULT_HOME)
    }

    /// The shell's idea of the current directory, symlinks unresolved
    pub fn logical_pwd(&self) -> &Path {
        Path::new(self.var(PWD_VAR).unwrap_or("/"))
    }

    pub fn set_logical_pwd(&mut self, path: &Path) {
        self.set_var(PWD_VAR, path.to_string_lossy());
    }
}

/// Keep an inherited `PWD` when it is absolute and names the real current
/// directory; otherwise fall back to the real directory.
fn initial_logical_pwd(inherited: Option<&str>) -> PathBuf {
    let real = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!("cannot read current directory: {}", e);
            return inherited.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/"));
        }
    };

    match inherited.map(Path::new) {
        Some(pwd) if pwd.is_absolute() && same_dir(pwd, &real) => pwd.to_path_buf(),
        _ => real,
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(vars: &[(&str, &str)]) -> ShellState {
        ShellState::with_env(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn defaults_when_unset() {
        let s = state(&[]);
        assert_eq!(s.prompt(), "$ ");
        assert_eq!(s.search_path(), "");
        assert_eq!(s.home(), "/");
        assert_eq!(s.logical_pwd(), Path::new("/"));
        assert!(s.jobs.is_empty());
    }

    #[test]
    fn reads_configured_values() {
        let s = state(&[("PS1", "> "), ("PATH", "/bin"), ("HOME", "/home/me")]);
        assert_eq!(s.prompt(), "> ");
        assert_eq!(s.search_path(), "/bin");
        assert_eq!(s.home(), "/home/me");
    }

    #[test]
    fn logical_pwd_is_stored_in_env() {
        let mut s = state(&[]);
        s.set_logical_pwd(Path::new("/srv/data"));
        assert_eq!(s.var("PWD"), Some("/srv/data"));
        assert_eq!(s.logical_pwd(), Path::new("/srv/data"));
    }

    #[test]
    fn process_env_has_absolute_pwd() {
        let s = ShellState::from_process_env();
        assert!(s.logical_pwd().is_absolute());
        assert!(same_dir(s.logical_pwd(), &env::current_dir().unwrap()));
    }

    #[test]
    fn stale_pwd_is_replaced() {
        let pwd = initial_logical_pwd(Some("/definitely/not/here"));
        assert!(same_dir(&pwd, &env::current_dir().unwrap()));

        let pwd = initial_logical_pwd(Some("relative/dir"));
        assert!(pwd.is_absolute());
    }
}
