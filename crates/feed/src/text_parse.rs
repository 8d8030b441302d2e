// ABOUTME: Small string parsing primitives shared by the decoder and date conversion.
// ABOUTME: Strict unsigned integer, boolean, and token splitting helpers.

use std::str::FromStr;

/// Parses an unsigned decimal integer.
///
/// Surrounding whitespace is ignored, but signs, inner whitespace, and
/// non-digit characters are rejected. Returns None on overflow.
pub fn parse_unsigned<T: FromStr>(s: &str) -> Option<T> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<T>().ok()
}

/// Parses an unsigned integer made of exactly `min..=max` digits.
pub fn parse_digits<T: FromStr>(s: &str, min: usize, max: usize) -> Option<T> {
    if s.len() < min || s.len() > max {
        return None;
    }
    parse_unsigned(s)
}

/// Parses the literal booleans "true" and "false".
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Splits on ASCII whitespace, dropping empty tokens.
pub fn tokens(s: &str) -> Vec<&str> {
    s.split_ascii_whitespace().collect()
}

/// Splits `s` on `sep` and trims each field. Keeps empty fields.
pub fn split_fields(s: &str, sep: char) -> Vec<&str> {
    s.split(sep).map(str::trim).collect()
}

/// Splits off a leading `prefix<sep>` if `sep` occurs in `s`.
///
/// Returns the trimmed prefix (if any) and the trimmed remainder.
pub fn split_prefix(s: &str, sep: char) -> (Option<&str>, &str) {
    match s.split_once(sep) {
        Some((head, rest)) => (Some(head.trim()), rest.trim()),
        None => (None, s.trim()),
    }
}
