//! Cell-level transforms shared by the normalizer. All of them are pure
//! text-in, value-out functions; policy (fatal vs. tolerant) lives in the
//! driver.

use crate::schema::{SCALE_FACTOR, SCALE_MARKER, THOUSANDS_SEPARATOR};

/// Parses a count that may carry the thousands suffix, e.g. `"310k"` ->
/// `310000.0`, `"17"` -> `17.0`. The suffix is case-sensitive and only valid
/// in final position. `None` when the cell is not a number at all.
pub fn parse_scaled_count(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (digits, factor) = match trimmed.strip_suffix(SCALE_MARKER) {
        Some(prefix) => (prefix.trim_end(), SCALE_FACTOR),
        None => (trimmed, 1.0),
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().map(|value| value * factor)
}

/// Removes every thousands separator, `"2,189"` -> `"2189"`.
pub fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|&c| c != THOUSANDS_SEPARATOR).collect()
}

/// Best-effort count parse for the tolerant columns: separators removed,
/// anything that still fails to parse (or is not finite) becomes `None`.
pub fn parse_tolerant_count(raw: &str) -> Option<f64> {
    let cleaned = strip_separators(raw.trim());
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Decodes a Python-style list literal of quoted strings, the format the
/// tag column arrives in: `"['python', 'ml']"` -> `["python", "ml"]`.
/// Both quote styles are accepted, as are backslash escapes and a trailing
/// comma. Errors carry a byte position for the defect report.
pub fn decode_tag_list(raw: &str) -> std::result::Result<Vec<String>, String> {
    let mut chars = raw.char_indices().peekable();
    skip_whitespace(&mut chars);
    match chars.next() {
        Some((_, '[')) => {}
        other => return Err(expected("'['", other)),
    }

    let mut tags = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.peek().copied() {
            Some((_, ']')) => {
                chars.next();
                break;
            }
            Some((start, quote @ ('\'' | '"'))) => {
                chars.next();
                tags.push(read_quoted(&mut chars, quote, start)?);
                skip_whitespace(&mut chars);
                match chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, ']')) => break,
                    other => return Err(expected("',' or ']'", other)),
                }
            }
            other => return Err(expected("a quoted tag or ']'", other)),
        }
    }

    skip_whitespace(&mut chars);
    match chars.next() {
        None => Ok(tags),
        Some((pos, c)) => Err(format!("unexpected {c:?} after list at byte {pos}")),
    }
}

/// Inverse of [`decode_tag_list`], used when rendering tag cells back out.
pub fn encode_tag_list(tags: &[String]) -> String {
    let mut out = String::from("[");
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('\'');
        for c in tag.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                c => out.push(c),
            }
        }
        out.push('\'');
    }
    out.push(']');
    out
}

type CharStream<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_whitespace(chars: &mut CharStream<'_>) {
    while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
        chars.next();
    }
}

fn read_quoted(
    chars: &mut CharStream<'_>,
    quote: char,
    start: usize,
) -> std::result::Result<String, String> {
    let mut out = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(out),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '0')) => out.push('\0'),
                Some((_, escaped @ ('\\' | '\'' | '"'))) => out.push(escaped),
                // Python keeps unknown escapes verbatim
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(format!("unterminated tag starting at byte {start}"))
}

fn expected(what: &str, found: Option<(usize, char)>) -> String {
    match found {
        Some((pos, c)) => format!("expected {what}, found {c:?} at byte {pos}"),
        None => format!("expected {what}, found end of input"),
    }
}
