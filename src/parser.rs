//! Parser for pipesh
//!
//! Turns a token stream into a validated [`Pipeline`]:
//! 1. A trailing `&` marks the line as background and is removed first
//! 2. The line is tokenized and split on bare `|` words into segments
//! 3. Each segment has its `<` / `>` operators pulled out into a [`Redirection`]
//! 4. Input redirection is only allowed on the first segment, output only on the last
//!
//! Nothing is spawned until all of this succeeds.

use crate::ast::{Command, Pipeline, Redirection};
use crate::lexer::{lex, LexError, Token};
use std::path::PathBuf;
use thiserror::Error;

pub const PIPE: &str = "|";
pub const READ: &str = "<";
pub const WRITE: &str = ">";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("missing file name after {0}")]
    MissingRedirectTarget(char),
    #[error("empty command in pipeline (segment {index})")]
    EmptySegment { index: usize },
    #[error("missing command")]
    EmptyCommand,
    #[error("input redirection is only allowed on the first command (segment {index})")]
    MisplacedInput { index: usize },
    #[error("output redirection is only allowed on the last command (segment {index})")]
    MisplacedOutput { index: usize },
    #[error("empty input")]
    EmptyInput,
}

/// Remove a trailing, unescaped `&` from a line.
///
/// Returns the remaining text and whether the marker was present. The `&`
/// may be separated by whitespace or attached to the last word.
pub fn strip_background(line: &str) -> (&str, bool) {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix('&') {
        // Only an odd run of backslashes escapes the `&`
        Some(rest) if trailing_backslashes(rest) % 2 == 0 => (rest, true),
        _ => (trimmed, false),
    }
}

fn trailing_backslashes(text: &str) -> usize {
    text.chars().rev().take_while(|&c| c == '\\').count()
}

/// Number of pipes in an unquoted word made only of `|`, such as `||`
fn pipe_run(token: &Token) -> Option<usize> {
    match token {
        Token::Word(s) if !s.is_empty() && s.trim_start_matches(PIPE).is_empty() => {
            Some(s.matches(PIPE).count())
        }
        _ => None,
    }
}

/// Split tokens on bare `|` words. Every segment must be non-empty.
///
/// A bare word such as `||` counts as that many pipes, so it leaves an
/// empty segment and is rejected.
pub fn split_pipeline(tokens: Vec<Token>) -> Result<Vec<Vec<Token>>, ParseError> {
    let mut segments = vec![Vec::new()];

    for token in tokens {
        if let Some(pipes) = pipe_run(&token) {
            segments.extend((0..pipes).map(|_| Vec::new()));
        } else if let Some(current) = segments.last_mut() {
            current.push(token);
        }
    }

    if let Some(index) = segments.iter().position(|s| s.is_empty()) {
        return Err(ParseError::EmptySegment { index });
    }

    Ok(segments)
}

/// Pull `<` and `>` operators and their file names out of one segment.
///
/// The word right after `<` or `>` is taken as the file name, whatever it
/// is. When the same operator appears twice the later file name wins.
pub fn resolve_redirections(segment: Vec<Token>) -> Result<Command, ParseError> {
    let mut argv = Vec::new();
    let mut redirect = Redirection::default();
    let mut tokens = segment.into_iter();

    while let Some(token) = tokens.next() {
        let op = if token.is_operator(READ) {
            '<'
        } else if token.is_operator(WRITE) {
            '>'
        } else {
            argv.push(token.into_text());
            continue;
        };

        let Some(target) = tokens.next().map(|t| PathBuf::from(t.into_text())) else {
            return Err(ParseError::MissingRedirectTarget(op));
        };

        if op == '<' {
            redirect.input = Some(target);
        } else {
            redirect.output = Some(target);
        }
    }

    if argv.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    Ok(Command { argv, redirect })
}

/// Build a pipeline from tokens, checking redirection placement
pub fn parse(tokens: Vec<Token>, background: bool) -> Result<Pipeline, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let commands = split_pipeline(tokens)?
        .into_iter()
        .map(resolve_redirections)
        .collect::<Result<Vec<_>, _>>()?;

    let last = commands.len() - 1;
    for (index, cmd) in commands.iter().enumerate() {
        if cmd.redirect.input.is_some() && index != 0 {
            return Err(ParseError::MisplacedInput { index });
        }
        if cmd.redirect.output.is_some() && index != last {
            return Err(ParseError::MisplacedOutput { index });
        }
    }

    Ok(Pipeline {
        commands,
        background,
    })
}

/// Parse a raw input line into a pipeline
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let (body, background) = strip_background(line);
    let tokens = lex(body)?;

    if tokens.is_empty() && background {
        return Err(ParseError::EmptyCommand);
    }

    parse(tokens, background)
}
