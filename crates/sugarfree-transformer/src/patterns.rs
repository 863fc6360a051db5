//! Binding patterns: the left side of declarations and parameter lists.

use crate::cursor::{is_runtime, TokenView};
use sugarfree_lexer::{Punct, TokenKind};

/// Tokens of one binding pattern.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Pattern {
    /// Identifiers the pattern binds.
    pub bindings: Vec<usize>,
    /// Property keys, which look like identifiers but bind nothing.
    pub keys: Vec<usize>,
}

/// Collects the pattern starting at token `start`. Type annotations and
/// default values are skipped; the caller walks defaults as expressions.
pub(crate) fn binding_pattern(view: &TokenView<'_>, start: usize) -> Pattern {
    let mut pattern = Pattern::default();
    collect(view, start, &mut pattern);
    pattern
}

fn collect(view: &TokenView<'_>, start: usize, out: &mut Pattern) {
    let Some(token) = view.get(start) else {
        return;
    };
    match token.kind {
        TokenKind::Name => out.bindings.push(start),
        TokenKind::Punct(Punct::LBrace) => {
            for (first, end) in elements(view, start) {
                object_property(view, first, end, out);
            }
        }
        TokenKind::Punct(Punct::LBracket) => {
            for (first, _) in elements(view, start) {
                let at = if view.is_punct(first, Punct::Ellipsis) {
                    view.next_runtime(first)
                } else {
                    Some(first)
                };
                if let Some(at) = at {
                    collect(view, at, out);
                }
            }
        }
        _ => {}
    }
}

fn object_property(view: &TokenView<'_>, first: usize, end: usize, out: &mut Pattern) {
    if view.is_punct(first, Punct::Ellipsis) {
        if let Some(at) = view.next_runtime(first) {
            collect(view, at, out);
        }
        return;
    }
    let depth = view.tokens[first].flags.depth;
    let colon = (first..end).find(|&j| {
        let t = &view.tokens[j];
        t.flags.depth == depth && is_runtime(t) && t.is_punct(Punct::Colon)
    });
    match colon {
        Some(colon) => {
            if view.tokens[first].is_identifier_like() {
                out.keys.push(first);
            }
            if let Some(value) = view.next_runtime(colon) {
                collect(view, value, out);
            }
        }
        None => {
            if view.tokens[first].is_name() {
                out.bindings.push(first);
            }
        }
    }
}

/// Splits the contents of the bracket at `open` into comma-separated
/// elements, returning each element's first runtime token and its end.
/// Holes in array patterns are skipped.
fn elements(view: &TokenView<'_>, open: usize) -> Vec<(usize, usize)> {
    let Some(close) = view.tokens[open].matching() else {
        return Vec::new();
    };
    let depth = view.tokens[open].flags.depth + 1;
    let mut out = Vec::new();
    let mut start = open + 1;
    for j in open + 1..=close {
        let t = &view.tokens[j];
        let boundary = j == close || (t.flags.depth == depth && t.is_punct(Punct::Comma));
        if !boundary {
            continue;
        }
        if let Some(first) = (start..j).find(|&k| is_runtime(&view.tokens[k])) {
            out.push((first, j));
        }
        start = j + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sugarfree_lexer::{tokenize, Dialect};

    fn names(source: &str, start: usize) -> (Vec<String>, Vec<String>) {
        let tokens = tokenize(source, Dialect::TS).unwrap();
        let view = TokenView::new(source, &tokens);
        let pattern = binding_pattern(&view, start);
        let texts = |v: &[usize]| v.iter().map(|&i| view.text(i).to_string()).collect();
        (texts(&pattern.bindings), texts(&pattern.keys))
    }

    #[test]
    fn test_object_pattern() {
        let (bindings, keys) = names("const {a, b: {c}, d = 1, ...rest} = x;", 1);
        assert_eq!(bindings, ["a", "c", "d", "rest"]);
        assert_eq!(keys, ["b"]);
    }

    #[test]
    fn test_array_pattern_with_holes() {
        let (bindings, keys) = names("let [, first, [second], ...others] = y;", 1);
        assert_eq!(bindings, ["first", "second", "others"]);
        assert!(keys.is_empty());
    }

    #[test]
    fn test_annotated_pattern() {
        let (bindings, _) = names("let {a}: {a: number} = z;", 1);
        assert_eq!(bindings, ["a"]);
    }
}
