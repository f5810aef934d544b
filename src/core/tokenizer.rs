use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub command: String,
    pub args: Vec<String>,
}

impl Tokens {
    fn from_words(mut words: Vec<String>) -> Self {
        if words.is_empty() {
            return Self::default();
        }
        let command = words.remove(0);
        Self {
            command,
            args: words,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("trailing backslash")]
    TrailingEscape,
}

pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn tokenize(line: &str) -> Tokens {
    tokenize_inner(line, None)
}

pub fn tokenize_with<F>(line: &str, lookup: F) -> Tokens
where
    F: Fn(&str) -> Option<String>,
{
    tokenize_inner(line, Some(&lookup))
}

fn tokenize_inner(line: &str, lookup: Option<Lookup<'_>>) -> Tokens {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Tokens::default();
    }

    match split_words(trimmed, lookup) {
        Ok(words) => Tokens::from_words(words),
        Err(e) => {
            debug!(error = %e, line = trimmed, "falling back to whitespace splitting");
            Tokens::from_words(trimmed.split_whitespace().map(String::from).collect())
        }
    }
}

pub fn split_words(line: &str, lookup: Option<Lookup<'_>>) -> Result<Vec<String>, TokenizeError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(TokenizeError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                read_double_quoted(&mut chars, &mut current, lookup)?;
            }
            '\\' => match chars.next() {
                Some(ch) => {
                    in_word = true;
                    current.push(ch);
                }
                None => return Err(TokenizeError::TrailingEscape),
            },
            '$' if lookup.is_some() => {
                let value = expand_variable(&mut chars, lookup);
                if !value.is_empty() {
                    in_word = true;
                    current.push_str(&value);
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn read_double_quoted(
    chars: &mut Peekable<Chars<'_>>,
    current: &mut String,
    lookup: Option<Lookup<'_>>,
) -> Result<(), TokenizeError> {
    loop {
        match chars.next() {
            Some('"') => return Ok(()),
            Some('\\') => match chars.next() {
                Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                Some('\n') => {}
                Some(ch) => {
                    current.push('\\');
                    current.push(ch);
                }
                None => return Err(TokenizeError::UnterminatedQuote('"')),
            },
            Some('$') if lookup.is_some() => current.push_str(&expand_variable(chars, lookup)),
            Some(ch) => current.push(ch),
            None => return Err(TokenizeError::UnterminatedQuote('"')),
        }
    }
}

/// Called just after a `$`. Unknown variables expand to nothing; a `$` that
/// does not start a name stays literal.
fn expand_variable(chars: &mut Peekable<Chars<'_>>, lookup: Option<Lookup<'_>>) -> String {
    let Some(lookup) = lookup else {
        return "$".to_string();
    };

    match chars.peek() {
        Some('{') => {
            let mut lookahead = chars.clone();
            lookahead.next();
            let mut name = String::new();
            let mut closed = false;
            for c in lookahead.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            // "${" without a closing brace stays literal
            if !closed {
                return "$".to_string();
            }
            *chars = lookahead;
            lookup(&name).unwrap_or_default()
        }
        Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
            let mut name = String::new();
            while let Some(c) = chars.peek().copied() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            lookup(&name).unwrap_or_default()
        }
        _ => "$".to_string(),
    }
}
