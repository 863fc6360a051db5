//! Navigation helpers over a token slice.

use sugarfree_lexer::{Keyword, Punct, TemplatePart, Token, TokenKind};

/// A token slice paired with the source it was read from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenView<'a> {
    pub source: &'a str,
    pub tokens: &'a [Token],
}

impl<'a> TokenView<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self { source, tokens }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&'a Token> {
        self.tokens.get(i)
    }

    #[inline]
    pub fn text(&self, i: usize) -> &'a str {
        self.tokens.get(i).map_or("", |t| t.text(self.source))
    }

    #[inline]
    pub fn is_punct(&self, i: usize, punct: Punct) -> bool {
        self.get(i).is_some_and(|t| t.is_punct(punct))
    }

    #[inline]
    pub fn is_keyword(&self, i: usize, keyword: Keyword) -> bool {
        self.get(i).is_some_and(|t| t.is_keyword(keyword))
    }

    #[inline]
    pub fn is_name(&self, i: usize, text: &str) -> bool {
        self.get(i).is_some_and(|t| t.is_name_text(self.source, text))
    }

    /// The next non-comment token after `i`.
    pub fn next_sig(&self, i: usize) -> Option<usize> {
        (i + 1..self.len()).find(|&j| !self.tokens[j].is_comment())
    }

    /// The previous non-comment token before `i`.
    pub fn prev_sig(&self, i: usize) -> Option<usize> {
        (0..i).rev().find(|&j| !self.tokens[j].is_comment())
    }

    /// The next token after `i` that survives type stripping.
    pub fn next_runtime(&self, i: usize) -> Option<usize> {
        (i + 1..self.len()).find(|&j| is_runtime(&self.tokens[j]))
    }

    /// The previous token before `i` that survives type stripping.
    pub fn prev_runtime(&self, i: usize) -> Option<usize> {
        (0..i).rev().find(|&j| is_runtime(&self.tokens[j]))
    }

    /// Returns true if the token at `i` can end an expression.
    pub fn ends_value(&self, i: usize) -> bool {
        let Some(token) = self.get(i) else {
            return false;
        };
        match token.kind {
            TokenKind::Name
            | TokenKind::PrivateName
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Regex
            | TokenKind::Template(TemplatePart::NoSubstitution | TemplatePart::Tail) => true,
            TokenKind::Keyword(k) => k.is_value(),
            TokenKind::Punct(p) => matches!(
                p,
                Punct::RParen | Punct::RBracket | Punct::RBrace | Punct::PlusPlus | Punct::MinusMinus
            ),
            TokenKind::Jsx(_) => true,
            _ => false,
        }
    }

    /// Exclusive end of the statement that starts at `start`.
    ///
    /// A statement ends after a `;` at its own depth, before a token that
    /// closes an enclosing frame, or where automatic semicolon insertion
    /// would split it: a line break between a complete value and a token
    /// that cannot continue it.
    pub fn statement_end(&self, start: usize) -> usize {
        let Some(first) = self.get(start) else {
            return start;
        };
        let depth = first.flags.depth;
        let mut prev = start;
        for j in start + 1..self.len() {
            let token = &self.tokens[j];
            if token.is_comment() {
                continue;
            }
            if token.kind == TokenKind::Eof || token.flags.depth < depth {
                return j;
            }
            if token.flags.depth == depth {
                if token.is_punct(Punct::Semi) {
                    return j + 1;
                }
                if token.flags.preceded_by_newline && self.ends_value(prev) && starts_statement(token)
                {
                    return j;
                }
            }
            prev = j;
        }
        self.len()
    }
}

/// Returns true for tokens that survive type stripping.
#[inline]
pub(crate) fn is_runtime(token: &Token) -> bool {
    !token.is_comment() && !token.flags.in_type
}

fn starts_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Name | TokenKind::PrivateName => true,
        TokenKind::Keyword(k) => !matches!(
            k,
            Keyword::In | Keyword::Instanceof | Keyword::As | Keyword::Satisfies
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarfree_lexer::{tokenize, Dialect};

    #[test]
    fn test_statement_end_semicolon_and_asi() {
        let source = "export const a = f(1,\n2);\nexport let b = 2\nfoo()";
        let tokens = tokenize(source, Dialect::JS).unwrap();
        let view = TokenView::new(source, &tokens);
        let end = view.statement_end(0);
        assert_eq!(view.text(end - 1), ";");

        let second = end;
        let end = view.statement_end(second);
        assert_eq!(view.text(end), "foo");
    }

    #[test]
    fn test_runtime_navigation_skips_types() {
        let source = "let x: number = 1;";
        let tokens = tokenize(source, Dialect::TS).unwrap();
        let view = TokenView::new(source, &tokens);
        assert_eq!(view.next_runtime(1).map(|i| view.text(i)), Some("="));
        assert_eq!(view.prev_runtime(4).map(|i| view.text(i)), Some("x"));
    }
}
