//! Environment-driven configuration
//!
//! The shell reads its settings from environment variables:
//! - `PS1` - prompt (default `$ `)
//! - `PATH` - colon-separated executable search list
//! - `HOME` - target of a bare `cd`
//! - `PWD` - logical working directory, rewritten on every `cd`
//! - `PIPESH_LOG` - log level (`off`, `error`, `warn`, `info`, `debug`, `trace`)
//! - `PIPESH_BANNER` - print a banner when the REPL starts
//! - `PIPESH_RC` - startup file (default `~/.pipeshrc`)

use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const PROMPT_VAR: &str = "PS1";
pub const DEFAULT_PROMPT: &str = "$ ";
pub const PATH_VAR: &str = "PATH";
pub const HOME_VAR: &str = "HOME";
pub const DEFAULT_HOME: &str = "/";
pub const PWD_VAR: &str = "PWD";
pub const LOG_VAR: &str = "PIPESH_LOG";
pub const BANNER_VAR: &str = "PIPESH_BANNER";
pub const RC_VAR: &str = "PIPESH_RC";
pub const RC_FILE: &str = ".pipeshrc";

/// Process-level settings, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: LevelFilter,
    pub banner: bool,
    /// Startup file run before the first prompt, if any
    pub rc_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LevelFilter::Off,
            banner: false,
            rc_path: None,
        }
    }
}

impl Config {
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup(LOG_VAR)
            .and_then(|level| LevelFilter::from_str(level.trim()).ok())
            .unwrap_or(LevelFilter::Off);

        let banner = lookup(BANNER_VAR).is_some();

        let rc_path = match lookup(RC_VAR) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            Some(_) => None,
            None => lookup(HOME_VAR).map(|home| PathBuf::from(home).join(RC_FILE)),
        };

        Config {
            log_level,
            banner,
            rc_path,
        }
    }
}
