// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Text escaping (RFC 5545 Section 3.3.11) and parameter caret encoding (RFC 6868).

use std::borrow::Cow;

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
///
/// CRLF and lone CR are written as `\n` too.
#[must_use]
pub fn escape_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', ';', ',', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape_text`].
///
/// `\n` and `\N` become a newline; any other escaped character stands for
/// itself. A trailing lone backslash is kept.
#[must_use]
pub fn unescape_text(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(next) => out.push(next),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Split on a delimiter that is not preceded by a backslash, then unescape each part.
#[must_use]
pub fn split_unescaped(value: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            parts.push(unescape_text(value.get(start..i).unwrap_or_default()).into_owned());
            start = i + c.len_utf8();
        }
    }
    parts.push(unescape_text(value.get(start..).unwrap_or_default()).into_owned());
    parts
}

/// Escape each value and join them with `delimiter`.
#[must_use]
pub fn join_escaped<S: AsRef<str>>(values: &[S], delimiter: char) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&escape_text(value.as_ref()));
    }
    out
}

/// Decode RFC 6868 caret sequences in a parameter value.
///
/// `^^` is a caret, `^'` a double quote and `^n`/`^N` a newline. A caret
/// followed by anything else is kept literally.
#[must_use]
pub fn caret_decode(value: &str) -> Cow<'_, str> {
    if !value.contains('^') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('^') => {
                chars.next();
                out.push('^');
            }
            Some('\'') => {
                chars.next();
                out.push('"');
            }
            Some('n' | 'N') => {
                chars.next();
                out.push('\n');
            }
            _ => out.push('^'),
        }
    }
    Cow::Owned(out)
}

/// Encode a parameter value with RFC 6868 caret sequences.
///
/// CRLF and lone CR count as one newline.
#[must_use]
pub fn caret_encode(value: &str) -> Cow<'_, str> {
    if !value.contains(['^', '"', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 4);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '^' => out.push_str("^^"),
            '"' => out.push_str("^'"),
            '\n' => out.push_str("^n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("^n");
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Remove control characters that cannot appear in a parameter value.
///
/// Everything below U+0020 except TAB, and DEL, is dropped. Newlines survive
/// when `keep_newlines` is set, which callers use when caret encoding will
/// represent them.
#[must_use]
pub fn scrub_control_chars(value: &str, keep_newlines: bool) -> Cow<'_, str> {
    let is_banned = |c: char| {
        let banned = (c < ' ' && c != '\t') || c == '\u{7f}';
        banned && !(keep_newlines && (c == '\n' || c == '\r'))
    };
    if !value.chars().any(is_banned) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.chars().filter(|&c| !is_banned(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_specials() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
        assert_eq!(escape_text("line\r\nnext\rlast"), "line\\nnext\\nlast");
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn unescapes_text() {
        assert_eq!(unescape_text("a\\,b\\;c\\\\d\\ne\\Nf"), "a,b;c\\d\ne\nf");
        assert_eq!(unescape_text("\\:colon"), ":colon");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn escape_round_trip() {
        for s in ["", "a,b", "x;y;z", "\\", "multi\nline", "naïve, café"] {
            assert_eq!(unescape_text(&escape_text(s)), s);
        }
    }

    #[test]
    fn splits_on_unescaped_delimiters() {
        assert_eq!(split_unescaped("a,b\\,c,d", ','), ["a", "b,c", "d"]);
        assert_eq!(split_unescaped("", ','), [""]);
        assert_eq!(split_unescaped("2.0;Success;x\\;y", ';'), ["2.0", "Success", "x;y"]);
        assert_eq!(join_escaped(&["a", "b,c"], ','), "a,b\\,c");
    }

    #[test]
    fn caret_decoding() {
        assert_eq!(caret_decode("^^^'^n^N"), "^\"\n\n");
        assert_eq!(caret_decode("a^b^"), "a^b^");
        assert_eq!(caret_decode("Joe ^'Dude^' Smith"), "Joe \"Dude\" Smith");
    }

    #[test]
    fn caret_encoding_round_trip() {
        for s in ["^", "\"quoted\"", "two\nlines", "^'", "plain", "^n"] {
            assert_eq!(caret_decode(&caret_encode(s)), s);
        }
        assert_eq!(caret_encode("a\r\nb"), "a^nb");
    }

    #[test]
    fn scrubs_control_characters() {
        assert_eq!(scrub_control_chars("a\u{0}b\u{7f}c\td", false), "abc\td");
        assert_eq!(scrub_control_chars("a\nb", false), "ab");
        assert_eq!(scrub_control_chars("a\nb", true), "a\nb");
    }
}
