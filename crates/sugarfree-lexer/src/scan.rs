//! Hand-written scanners for tokens whose extent depends on context.
//!
//! Each scanner takes the source and the offset of the opening delimiter and
//! returns the offset just past the token.

use crate::error::LexErrorKind;
use crate::token::TemplatePart;

type ScanResult = Result<usize, LexErrorKind>;

#[inline]
fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Characters that may continue an identifier.
#[inline]
pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '$'
        || c == '\u{200C}'
        || c == '\u{200D}'
        || (!c.is_ascii() && c.is_alphanumeric())
}

/// Characters that may start an identifier.
#[inline]
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

/// Extends an identifier over non-ASCII continuation characters.
pub(crate) fn identifier_tail(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    let len = rest
        .char_indices()
        .find(|(_, c)| !is_ident_continue(*c))
        .map_or(rest.len(), |(i, _)| i);
    pos + len
}

/// Extends a JSX name, which may also contain `-`.
pub(crate) fn jsx_name_tail(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    let len = rest
        .char_indices()
        .find(|(_, c)| !(is_ident_continue(*c) || *c == '-'))
        .map_or(rest.len(), |(i, _)| i);
    pos + len
}

/// Scans a quoted string starting at its opening quote.
pub(crate) fn string(source: &str, start: usize) -> ScanResult {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                pos += 1;
                // A `\r\n` continuation counts as one escaped line break.
                if bytes.get(pos) == Some(&b'\r') && bytes.get(pos + 1) == Some(&b'\n') {
                    pos += 1;
                }
                pos += source[pos..].chars().next().map_or(0, char::len_utf8);
            }
            b'\n' | b'\r' => return Err(LexErrorKind::UnterminatedString),
            b if b == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(LexErrorKind::UnterminatedString)
}

/// Scans a JSX attribute string, which has no escapes and may span lines.
pub(crate) fn jsx_string(source: &str, start: usize) -> ScanResult {
    let quote = source.as_bytes()[start];
    source[start + 1..]
        .bytes()
        .position(|b| b == quote)
        .map(|i| start + 1 + i + 1)
        .ok_or(LexErrorKind::UnterminatedString)
}

/// Scans a block comment starting at `/*`.
pub(crate) fn block_comment(source: &str, start: usize) -> ScanResult {
    source[start + 2..]
        .find("*/")
        .map(|i| start + 2 + i + 2)
        .ok_or(LexErrorKind::UnterminatedComment)
}

/// Scans a hashbang line at the very start of the input.
pub(crate) fn hashbang(source: &str) -> Option<usize> {
    if !source.starts_with("#!") {
        return None;
    }
    Some(source.find(is_line_break).unwrap_or(source.len()))
}

/// Scans template text after a `` ` `` or the `}` closing a substitution.
///
/// `opened_by_backtick` selects between head/no-substitution and
/// middle/tail pieces.
pub(crate) fn template(
    source: &str,
    start: usize,
    opened_by_backtick: bool,
) -> Result<(usize, TemplatePart), LexErrorKind> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                pos += 1;
                pos += source[pos..].chars().next().map_or(0, char::len_utf8);
            }
            b'`' => {
                let part = if opened_by_backtick {
                    TemplatePart::NoSubstitution
                } else {
                    TemplatePart::Tail
                };
                return Ok((pos + 1, part));
            }
            b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                let part = if opened_by_backtick {
                    TemplatePart::Head
                } else {
                    TemplatePart::Middle
                };
                return Ok((pos + 2, part));
            }
            _ => pos += 1,
        }
    }
    Err(LexErrorKind::UnterminatedTemplate)
}

/// Scans a regular expression literal starting at `/`, including flags.
pub(crate) fn regex(source: &str, start: usize) -> ScanResult {
    let mut in_class = false;
    let mut chars = source[start + 1..].char_indices();
    let body_end = loop {
        let Some((i, c)) = chars.next() else {
            return Err(LexErrorKind::UnterminatedRegex);
        };
        match c {
            '\\' => match chars.next() {
                Some((_, c)) if !is_line_break(c) => {}
                _ => return Err(LexErrorKind::UnterminatedRegex),
            },
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break start + 1 + i + 1,
            c if is_line_break(c) => return Err(LexErrorKind::UnterminatedRegex),
            _ => {}
        }
    };
    Ok(identifier_tail(source, body_end))
}

/// Scans JSX text up to the next `<` or `{`. May return `start`.
pub(crate) fn jsx_text(source: &str, start: usize) -> usize {
    source[start..]
        .find(['<', '{'])
        .map_or(source.len(), |i| start + i)
}
