//! Parsed pipeline structure

use std::fmt;
use std::path::PathBuf;

/// Input/output file substitutions attached to one pipeline segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Redirection {
    /// `< file`: read standard input from this file
    pub input: Option<PathBuf>,
    /// `> file`: create or truncate this file for standard output
    pub output: Option<PathBuf>,
}

impl Redirection {
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// One segment of a pipeline: an argument vector plus its redirections.
///
/// `argv` is never empty once the parser has produced it; `argv[0]` is the
/// program name or path as the user typed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub argv: Vec<String>,
    pub redirect: Redirection,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Commands chained left to right, stdout of each feeding stdin of the next
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    /// Launched without waiting (trailing `&`)
    pub background: bool,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// A single command with no pipe
    pub fn is_simple(&self) -> bool {
        self.commands.len() == 1
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))?;
        if let Some(input) = &self.redirect.input {
            write!(f, " < {}", input.display())?;
        }
        if let Some(output) = &self.redirect.output {
            write!(f, " > {}", output.display())?;
        }
        Ok(())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", cmd)?;
        }
        if self.background {
            write!(f, " &")?;
        }
        Ok(())
    }
}
