//! Formatter and plugin attribute tokenization
//!
//! A `format` attribute holds `;`-separated validator specs such as
//! `length: 1 10; valid-choices: {['a','b']}`. A semicolon inside a `{...}`
//! group belongs to the argument and does not separate tokens. Tokens are
//! trimmed, empty tokens are dropped, and order is never changed.
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

use crate::error::{SchemaError, SchemaResult};

/// Separator used when re-joining tokens into a single attribute value
pub const TOKEN_SEPARATOR: &str = "; ";

/// Split a raw `format` or `plugins` attribute into ordered tokens
pub fn split_tokens(raw: &str, path: &str) -> SchemaResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for ch in raw.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                if depth == 0 {
                    current.push(ch);
                    return Err(malformed(&current, path));
                }
                depth -= 1;
                current.push(ch);
            }
            ';' if depth == 0 => {
                push_token(&mut tokens, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if depth != 0 {
        return Err(malformed(&current, path));
    }
    push_token(&mut tokens, &current);

    Ok(tokens)
}

/// Join tokens back into an attribute value
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(TOKEN_SEPARATOR)
}

/// Check that a single stored token reads back unchanged from an attribute
///
/// Rejects unbalanced braces, a `;` outside braces, surrounding whitespace
/// and the empty token.
pub fn check_token(token: &str, path: &str) -> SchemaResult<()> {
    match split_tokens(token, path)?.as_slice() {
        [only] if only == token => Ok(()),
        _ => Err(SchemaError::MalformedFormatString {
            token: token.to_string(),
            path: path.to_string(),
        }),
    }
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let token = raw.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}

fn malformed(token: &str, path: &str) -> SchemaError {
    SchemaError::MalformedFormatString {
        token: token.trim().to_string(),
        path: path.to_string(),
    }
}
