//! Text and parameter escaping (RFC 5545 §3.3.11, RFC 6868).

/// Escapes text for TEXT values (RFC 5545 §3.3.11).
///
/// Escapes backslash, comma, semicolon and newlines. A CR belonging to a
/// CRLF pair is dropped; the LF carries the line break.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 10);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escapes a parameter value.
///
/// Carets, newlines and double quotes use RFC 6868 caret encoding; the value
/// is quoted when it contains `:`, `;` or `,`.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '^' => encoded.push_str("^^"),
            '\n' => encoded.push_str("^n"),
            '"' => encoded.push_str("^'"),
            _ => encoded.push(c),
        }
    }
    if needs_quoting(s) {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}

/// Checks if a parameter value needs quoting.
fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ','))
}
