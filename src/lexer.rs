//! Tokenization for pipesh
//!
//! A line is scanned left to right. Each token is either a quoted string
//! (`"..."` or `'...'`, where a backslash protects the character after it)
//! or a bare run of non-whitespace characters. Quote delimiters are stripped
//! and the escapes `\"`, `\'` and `\\` collapse to the literal character.
//!
//! Quoted tokens stay distinguishable from bare ones so the parser only
//! treats an unquoted `|`, `<` or `>` as an operator.

use nom::{
    bytes::complete::{escaped, take_while1},
    character::complete::{anychar, char, none_of},
    combinator::{map, opt},
    sequence::delimited,
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word (command name, argument, operator)
    Word(String),
    /// A single- or double-quoted string, delimiters removed
    Quoted(String),
}

impl Token {
    pub fn into_text(self) -> String {
        match self {
            Token::Word(s) | Token::Quoted(s) => s,
        }
    }

    /// True for an unquoted word equal to `op`
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Token::Word(s) if s == op)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated {quote} quote starting at column {position}")]
    UnterminatedQuote { quote: char, position: usize },
}

/// Parse a double-quoted string
fn double_quoted(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('"'),
            map(opt(escaped(none_of("\"\\"), '\\', anychar)), |o| {
                o.unwrap_or("")
            }),
            char('"'),
        ),
        |s: &str| Token::Quoted(unescape(s)),
    )(input)
}

/// Parse a single-quoted string
fn single_quoted(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('\''),
            map(opt(escaped(none_of("'\\"), '\\', anychar)), |o| {
                o.unwrap_or("")
            }),
            char('\''),
        ),
        |s: &str| Token::Quoted(unescape(s)),
    )(input)
}

/// Parse a bare word: everything up to the next whitespace
fn bare_word(input: &str) -> IResult<&str, Token> {
    map(take_while1(|c: char| !c.is_whitespace()), |s: &str| {
        Token::Word(unescape(s))
    })(input)
}

/// Replace `\"`, `\'` and `\\` with the literal character.
/// A backslash before anything else is kept as-is.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('"' | '\'' | '\\')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Tokenize a complete input line
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let position = input[..input.len() - rest.len()].chars().count() + 1;
        let unterminated = |quote| LexError::UnterminatedQuote { quote, position };
        let (remaining, token) = match rest.chars().next() {
            Some(quote @ '"') => double_quoted(rest).map_err(|_| unterminated(quote))?,
            Some(quote @ '\'') => single_quoted(rest).map_err(|_| unterminated(quote))?,
            // `rest` starts with a non-space character, so a bare word always matches
            _ => match bare_word(rest) {
                Ok(parsed) => parsed,
                Err(_) => break,
            },
        };

        tokens.push(token);
        rest = remaining;
    }

    Ok(tokens)
}
