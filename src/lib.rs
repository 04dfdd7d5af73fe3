//! pipesh - a small pipeline shell
//!
//! # Overview
//!
//! pipesh reads a line, splits it into commands connected by pipes, applies
//! `<` / `>` redirections and runs every command as a child process. A
//! trailing `&` launches the pipeline in the background.
//!
//! ```text
//! sort < names.txt | uniq -c > counts.txt
//! sleep 10 &
//! cd ../other
//! ```
//!
//! # Pipeline
//!
//! ```text
//! line ─▶ lexer ─▶ parser ─▶ resolver ─▶ executor ─▶ wait (foreground)
//!                                                 └▶ JobTracker (background)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pipesh::{LineOutcome, Shell};
//!
//! let mut shell = Shell::new();
//! let outcome = shell.execute_line("echo hello | tr a-z A-Z").unwrap();
//! assert!(matches!(outcome, LineOutcome::Foreground(_)));
//! ```

pub mod ast;
pub mod builtins;
pub mod config;
pub mod executor;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod shell;
pub mod signals;
pub mod state;

// Re-export commonly used items
pub use ast::{Command, Pipeline, Redirection};
pub use builtins::CdError;
pub use config::Config;
pub use executor::ExecError;
pub use jobs::{Job, JobTracker, ProcessStatus};
pub use lexer::{lex, LexError, Token};
pub use parser::{parse_line, ParseError};
pub use resolver::ExecutableResolver;
pub use shell::{LineOutcome, Shell, ShellError};
pub use state::ShellState;
