//! Shell - the per-line coordinator for pipesh
//!
//! The Shell owns the [`ShellState`] and runs one input line at a time:
//! 1. `exit` ends the loop (checked on the raw line, nothing is parsed)
//! 2. Parse into a pipeline (trailing `&`, quoting, pipes, redirections)
//! 3. A lone `cd` runs as a built-in
//! 4. Otherwise launch every segment
//! 5. Foreground: wait and report the status; background: hand to the tracker

use crate::builtins::{self, CdError};
use crate::executor::{self, ExecError};
use crate::jobs::{Job, ProcessStatus};
use crate::parser::{parse_line, ParseError};
use crate::state::ShellState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Cd(#[from] CdError),
}

impl ShellError {
    /// Status a non-interactive run exits with after this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Syntax(_) => 2,
            ShellError::Exec(_) | ShellError::Cd(_) => 1,
        }
    }
}

/// What happened to one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, nothing ran
    Empty,
    /// `exit` was entered
    Exit,
    /// A built-in ran in the shell process
    Builtin,
    /// A foreground pipeline finished with this status
    Foreground(ProcessStatus),
    /// A background pipeline was registered under this job id
    Background(usize),
}

/// The shell that owns all state and runs lines
#[derive(Debug, Default)]
pub struct Shell {
    pub state: ShellState,
}

impl Shell {
    /// A shell over a snapshot of the process environment
    pub fn new() -> Self {
        Shell {
            state: ShellState::from_process_env(),
        }
    }

    pub fn with_state(state: ShellState) -> Self {
        Shell { state }
    }

    /// Run one line of input
    pub fn execute_line(&mut self, line: &str) -> Result<LineOutcome, ShellError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(LineOutcome::Empty);
        }
        if trimmed == "exit" {
            return Ok(LineOutcome::Exit);
        }

        let pipeline = parse_line(trimmed)?;

        if pipeline.is_simple() && pipeline.commands[0].name() == "cd" {
            let result = builtins::cd(&mut self.state, pipeline.commands[0].args());
            self.state.last_status = match &result {
                Ok(_) => ProcessStatus::Exited(0),
                Err(_) => ProcessStatus::Exited(1),
            };
            result?;
            return Ok(LineOutcome::Builtin);
        }

        let job = executor::launch(&pipeline, &mut self.state)?;

        if pipeline.background {
            let pid = job.last_pid();
            let id = self.state.jobs.register(job);
            match pid {
                Some(pid) => eprintln!("[{}] {}", id, pid),
                None => eprintln!("[{}]", id),
            }
            return Ok(LineOutcome::Background(id));
        }

        let status = executor::wait_foreground(job, &mut self.state)?;
        self.state.last_status = status;
        if let Some(message) = executor::status_message(status) {
            println!("{}", message);
        }
        Ok(LineOutcome::Foreground(status))
    }

    /// Non-blocking sweep of background jobs; run before each prompt
    pub fn reap_jobs(&mut self) -> Vec<Job> {
        self.state.jobs.reap()
    }

    /// Last sweep before the shell exits
    pub fn shutdown(&mut self) -> Vec<Job> {
        self.state.jobs.drain()
    }
}
