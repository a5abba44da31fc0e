// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner for unfolded iCalendar content lines.
//!
//! ```text
//! Logical Line → Lexer → Token Stream → Scanner → Content Line
//! ```
//!
//! Per RFC 5545, a content line has the format:
//! ```text
//! contentline = name *(";" param) ":" value CRLF
//! ```
//!
//! The scanner is lenient: a parameter may be written without `=value`, and
//! a double quote in the middle of an unquoted parameter value is literal.

use std::iter::Peekable;

use crate::syntax::lexer::{SpannedToken, Token, tokenize};

/// A scanned content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine<'src> {
    /// Property name as written.
    pub name: &'src str,
    /// Parameters in source order.
    pub parameters: Vec<ScannedParameter<'src>>,
    /// Everything after the first unquoted colon, verbatim.
    pub value: &'src str,
}

/// A scanned parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedParameter<'src> {
    /// Parameter name as written.
    pub name: &'src str,
    /// Values, or `None` when written without `=`.
    pub values: Option<Vec<&'src str>>,
}

/// Errors that can occur when scanning a content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContentLineError {
    /// Missing colon separator.
    ///
    /// Example: `PROPNAME value` instead of `PROPNAME:value`
    #[error("missing colon in property")]
    MissingColon,

    /// Empty property name.
    ///
    /// Example: `:value`
    #[error("empty property name")]
    EmptyName,

    /// Empty parameter name.
    ///
    /// Example: `NAME;=value:x`
    #[error("empty parameter name")]
    EmptyParameterName,

    /// Unterminated quoted string.
    ///
    /// Example: `PARAM="unclosed value`
    #[error("unterminated quoted string")]
    UnterminatedQuote,
}

/// Scan one unfolded content line.
///
/// # Errors
/// Returns a [`ContentLineError`] if the line is not a property line.
pub fn scan_content_line(src: &str) -> Result<ContentLine<'_>, ContentLineError> {
    let mut tokens = tokenize(src).peekable();

    let name_end = skip_until(&mut tokens, |t| {
        matches!(t, Token::Semicolon | Token::Colon)
    });
    let Some(name_end) = name_end else {
        return Err(ContentLineError::MissingColon);
    };
    let name = src.get(..name_end).unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ContentLineError::EmptyName);
    }

    let mut parameters = Vec::new();
    loop {
        match tokens.next() {
            Some(SpannedToken(Token::Colon, span)) => {
                let value = src.get(span.end..).unwrap_or_default();
                return Ok(ContentLine {
                    name,
                    parameters,
                    value,
                });
            }
            Some(SpannedToken(Token::Semicolon, span)) => {
                parameters.push(scan_parameter(src, span.end, &mut tokens)?);
            }
            _ => return Err(ContentLineError::MissingColon),
        }
    }
}

/// Scan a parameter that starts at byte `start`, leaving the terminating
/// `;` or `:` unconsumed.
fn scan_parameter<'src>(
    src: &'src str,
    start: usize,
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<ScannedParameter<'src>, ContentLineError> {
    let name_end = skip_until(tokens, |t| {
        matches!(t, Token::Equal | Token::Semicolon | Token::Colon)
    })
    .ok_or(ContentLineError::MissingColon)?;
    let name = src.get(start..name_end).unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ContentLineError::EmptyParameterName);
    }

    if !matches!(tokens.peek(), Some(SpannedToken(Token::Equal, _))) {
        return Ok(ScannedParameter { name, values: None });
    }
    tokens.next(); // consume '='

    let mut values = Vec::new();
    loop {
        values.push(scan_parameter_value(src, tokens)?);
        match tokens.peek() {
            Some(SpannedToken(Token::Comma, _)) => {
                tokens.next();
            }
            Some(_) => break,
            None => return Err(ContentLineError::MissingColon),
        }
    }

    Ok(ScannedParameter {
        name,
        values: Some(values),
    })
}

/// Scan one member of a parameter value list, stopping before `,`, `;` or `:`.
fn scan_parameter_value<'src>(
    src: &'src str,
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<&'src str, ContentLineError> {
    if let Some(SpannedToken(Token::DQuote, open)) = tokens.peek() {
        let start = open.end;
        tokens.next();
        let end = skip_until(tokens, |t| matches!(t, Token::DQuote))
            .ok_or(ContentLineError::UnterminatedQuote)?;
        tokens.next(); // consume closing quote
        let quoted = src.get(start..end).unwrap_or_default();

        // Text glued to the closing quote is tolerated and dropped
        skip_until(tokens, is_value_delimiter);
        return Ok(quoted);
    }

    let start = tokens.peek().map_or(src.len(), |t| t.1.start);
    let end = skip_until(tokens, is_value_delimiter).unwrap_or(src.len());
    Ok(src.get(start..end).unwrap_or_default())
}

fn is_value_delimiter(token: &Token<'_>) -> bool {
    matches!(token, Token::Comma | Token::Semicolon | Token::Colon)
}

/// Advance until a token matching `stop` is next, returning its start offset.
fn skip_until<'src>(
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
    stop: impl Fn(&Token<'src>) -> bool,
) -> Option<usize> {
    loop {
        match tokens.peek() {
            Some(SpannedToken(tok, span)) if stop(tok) => return Some(span.start),
            Some(_) => {
                tokens.next();
            }
            None => return None,
        }
    }
}
