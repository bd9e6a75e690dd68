//! Line unfolding and content-line tokenizing (RFC 5545 §3.1, RFC 6350 §3.2).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::core::{ContentLine, Parameter};

/// One logical line after unfolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Physical line number (1-based) the logical line starts on.
    pub line: usize,
    pub text: String,
    /// Longest physical line that went into it, in octets.
    pub octets: usize,
}

/// Splits on CRLF, LF or bare CR.
fn physical_lines(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&input[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&input[start..]);
    }
    lines
}

/// Whether the parameter section of a line declares quoted-printable.
fn is_quoted_printable(text: &str) -> bool {
    let head = text.split(':').next().unwrap_or_default();
    head.to_ascii_uppercase().contains("QUOTED-PRINTABLE")
}

/// Joins folded physical lines into logical lines.
///
/// A line starting with a space or tab continues the previous one with that
/// single character removed. A quoted-printable value ending in `=` (a soft
/// break) swallows the next physical line whole. With `join_colonless`, a
/// line with no `:` at all is also treated as a continuation, which repairs
/// output from writers that fold without indenting. Blank lines are dropped.
#[must_use]
pub fn unfold(input: &str, join_colonless: bool) -> Vec<LogicalLine> {
    let mut lines: Vec<LogicalLine> = Vec::new();
    let mut soft_break = false;

    for (index, raw) in physical_lines(input).into_iter().enumerate() {
        let continuation = if soft_break {
            Some(raw)
        } else if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            Some(rest)
        } else if join_colonless && !raw.is_empty() && !raw.contains(':') {
            Some(raw)
        } else {
            None
        };

        match (continuation, lines.last_mut()) {
            (Some(rest), Some(last)) => {
                last.text.push_str(rest);
                last.octets = last.octets.max(raw.len());
            }
            _ if raw.trim().is_empty() => continue,
            _ => lines.push(LogicalLine {
                line: index + 1,
                text: raw.trim_start().to_string(),
                octets: raw.len(),
            }),
        }

        soft_break = false;
        if let Some(last) = lines.last_mut()
            && last.text.ends_with('=')
            && is_quoted_printable(&last.text)
        {
            last.text.pop();
            soft_break = true;
        }
    }

    lines
}

/// Parses one logical line: `[group "."] name *(";" param) ":" value`.
///
/// ## Errors
/// Returns a positioned error for a missing or invalid name, a malformed
/// parameter, an unclosed quote, or a missing `:`.
pub fn parse_content_line(text: &str, line: usize) -> ParseResult<ContentLine> {
    let name_end = text
        .find([';', ':'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line, text.len() + 1))?;
    let full_name = &text[..name_end];
    if full_name.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingPropertyName, line, 1));
    }
    if let Some(bad) = full_name
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
    {
        return Err(
            ParseError::new(ParseErrorKind::InvalidPropertyName, line, bad.0 + 1)
                .with_context(full_name.to_string()),
        );
    }
    let (group, name) = match full_name.rsplit_once('.') {
        Some((group, name)) if !group.is_empty() && !name.is_empty() => {
            (Some(group.to_string()), name)
        }
        Some(_) => {
            return Err(ParseError::new(ParseErrorKind::InvalidPropertyName, line, 1)
                .with_context(full_name.to_string()));
        }
        None => (None, full_name),
    };

    let mut params = Vec::new();
    let mut pos = name_end;
    while text.as_bytes().get(pos) == Some(&b';') {
        let (param, next) = parse_parameter(text, pos + 1, line)?;
        params.push(param);
        pos = next;
    }
    if text.as_bytes().get(pos) != Some(&b':') {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line, pos + 1));
    }

    Ok(ContentLine {
        group,
        name: name.to_ascii_uppercase(),
        params,
        raw_value: text[pos + 1..].to_string(),
        line,
        value_column: pos + 2,
    })
}

/// Parses a parameter starting at `start`; returns it with the position of
/// the `;` or `:` that ends it.
fn parse_parameter(text: &str, start: usize, line: usize) -> ParseResult<(Parameter, usize)> {
    let rest = &text[start..];
    let name_len = rest
        .find(['=', ';', ':'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line, text.len() + 1))?;
    let name = &rest[..name_len];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(ParseErrorKind::InvalidParameter, line, start + 1)
            .with_context(name.to_string()));
    }

    let mut pos = start + name_len;
    if text.as_bytes()[pos] != b'=' {
        // vCard 2.1 bare token: `TEL;HOME;VOICE:` or `NOTE;QUOTED-PRINTABLE:`.
        let upper = name.to_ascii_uppercase();
        let param_name = match upper.as_str() {
            "QUOTED-PRINTABLE" | "BASE64" | "8BIT" | "7BIT" => "ENCODING",
            _ => "TYPE",
        };
        return Ok((Parameter::new(param_name, name), pos));
    }
    pos += 1;

    let mut values = Vec::new();
    loop {
        let (value, next) = parse_param_value(text, pos, line)?;
        values.push(value);
        match text.as_bytes().get(next) {
            Some(b',') => pos = next + 1,
            Some(b';' | b':') => return Ok((Parameter::with_values(name, values), next)),
            Some(_) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line, next + 1)
                        .with_context(format!("unexpected character after {name} value")),
                );
            }
            None => return Err(ParseError::new(ParseErrorKind::MissingColon, line, next + 1)),
        }
    }
}

/// Parses one (possibly quoted) parameter value at `pos`; returns the decoded
/// value and the position just past it.
fn parse_param_value(text: &str, pos: usize, line: usize) -> ParseResult<(String, usize)> {
    if text.as_bytes().get(pos) == Some(&b'"') {
        let body = &text[pos + 1..];
        let close = body
            .find('"')
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnclosedQuote, line, pos + 1))?;
        return Ok((decode_caret(&body[..close]), pos + close + 2));
    }
    let len = text[pos..].find([',', ';', ':']).unwrap_or(text.len() - pos);
    Ok((decode_caret(&text[pos..pos + len]), pos + len))
}

/// RFC 6868: `^n` newline, `^'` double quote, `^^` caret. Other carets stay.
fn decode_caret(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n' | 'N') => out.push('\n'),
            Some('\'') => out.push('"'),
            Some('^') => out.push('^'),
            _ => {
                out.push('^');
                continue;
            }
        }
        chars.next();
    }
    out
}
