//! Content line folding (RFC 5545 §3.1).

use kasumi_core::constants::DEFAULT_LINE_OCTETS;

/// Folds a content line at the default 75-octet limit.
#[must_use]
pub fn fold_line(line: &str) -> String {
    fold_line_at(line, DEFAULT_LINE_OCTETS)
}

/// Folds a content line so no physical line exceeds `width` octets.
///
/// Lines are folded by inserting CRLF followed by a single space. A fold is
/// never placed inside a UTF-8 sequence or between the two characters of a
/// backslash or caret escape. The result ends with CRLF.
#[must_use]
pub fn fold_line_at(line: &str, width: usize) -> String {
    // A continuation line needs room for the leading space plus one escape pair
    let width = width.max(3);
    let bytes = line.as_bytes();

    if bytes.len() <= width {
        return format!("{line}\r\n");
    }

    let breakable = split_points(line);
    let mut result = String::with_capacity(bytes.len() + (bytes.len() / width + 1) * 3);
    let mut pos = 0;
    let mut first_line = true;

    while pos < bytes.len() {
        // Continuation lines have one octet less (the leading space)
        let max_len = if first_line { width } else { width - 1 };

        if !first_line {
            result.push(' ');
        }

        if bytes.len() - pos <= max_len {
            result.push_str(&line[pos..]);
            result.push_str("\r\n");
            break;
        }

        let mut end = pos + max_len;
        while end > pos && !breakable[end] {
            end -= 1;
        }
        if end == pos {
            // Single unit wider than the line; emit it whole
            end = pos + 1;
            while end < bytes.len() && !breakable[end] {
                end += 1;
            }
        }

        result.push_str(&line[pos..end]);
        result.push_str("\r\n");

        pos = end;
        first_line = false;
    }

    result
}

/// Marks every byte offset where a fold may be inserted.
fn split_points(line: &str) -> Vec<bool> {
    let bytes = line.as_bytes();
    let mut ok: Vec<bool> = (0..=bytes.len()).map(|i| line.is_char_boundary(i)).collect();

    let mut i = 0;
    while i < bytes.len() {
        if matches!(bytes[i], b'\\' | b'^') && i + 1 < bytes.len() {
            ok[i + 1] = false;
            i += 2;
        } else {
            i += 1;
        }
    }
    ok
}
