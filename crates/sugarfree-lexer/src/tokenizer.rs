//! The tokenizer driver.
//!
//! Each step asks the context tracker what the current position looks like,
//! reads one token (through `logos` for fixed shapes, by hand otherwise) and
//! hands it back to the tracker for classification.

use crate::context::{ContextTracker, LexContext};
use crate::dialect::Dialect;
use crate::error::{LexError, LexErrorKind, TokenizeError};
use crate::raw::RawKind;
use crate::scan;
use crate::token::{CommentKind, JsxToken, Keyword, Punct, Token, TokenKind};
use logos::Logos;
use source_map::Span;

/// Tokenizes `source` in the given dialect.
///
/// The result covers the whole input (only whitespace is skipped) and always
/// ends with an [`TokenKind::Eof`] token. Every token carries the context
/// flags the tracker assigned it.
pub fn tokenize(source: &str, dialect: Dialect) -> Result<Vec<Token>, TokenizeError> {
    let tokens = Tokenizer::new(source, dialect).run()?;
    tracing::debug!(tokens = tokens.len(), ?dialect, "tokenized source");
    Ok(tokens)
}

struct Tokenizer<'src> {
    source: &'src str,
    tracker: ContextTracker<'src>,
    tokens: Vec<Token>,
    cursor: usize,
    /// End of the last significant token, for line-break detection.
    last_end: usize,
}

impl<'src> Tokenizer<'src> {
    fn new(source: &'src str, dialect: Dialect) -> Self {
        Self {
            source,
            tracker: ContextTracker::new(source, dialect),
            tokens: Vec::with_capacity(source.len() / 4),
            cursor: 0,
            last_end: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        if let Some(end) = scan::hashbang(self.source) {
            self.emit(TokenKind::Comment(CommentKind::Hashbang), 0, end)?;
        }

        loop {
            let ctx = self.tracker.lex_context();
            if ctx.jsx_children && self.jsx_child()? {
                continue;
            }
            match self.next_token(ctx)? {
                Some((kind, start, end)) => self.emit(kind, start, end)?,
                None => break,
            }
        }

        let end = self.source.len();
        self.emit(TokenKind::Eof, end, end)?;
        Ok(self.tokens)
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) -> Result<(), TokenizeError> {
        let mut token = Token::new(kind, Span::from_usize(start, end));
        token.flags.preceded_by_newline = has_line_break(&self.source[self.last_end..start]);
        if !token.is_comment() {
            self.last_end = end;
        }
        self.tokens.push(token);
        self.cursor = end;
        self.tracker.observe(&mut self.tokens)
    }

    fn lex_error(kind: LexErrorKind, start: usize, end: usize) -> TokenizeError {
        LexError::new(kind, Span::from_usize(start, end)).into()
    }

    /// Reads text or a tag opener between JSX tags. Returns false when the
    /// next token is an ordinary one (`{` or end of input).
    fn jsx_child(&mut self) -> Result<bool, TokenizeError> {
        let start = self.cursor;
        let end = scan::jsx_text(self.source, start);
        if end > start {
            self.emit(TokenKind::Jsx(JsxToken::Text), start, end)?;
            return Ok(true);
        }
        let rest = &self.source.as_bytes()[start..];
        match rest {
            [b'<', b'/', ..] => {
                self.emit(TokenKind::Jsx(JsxToken::CloseTagOpen), start, start + 2)?;
                Ok(true)
            }
            [b'<', ..] => {
                self.emit(TokenKind::Jsx(JsxToken::TagOpen), start, start + 1)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// The last significant token read so far.
    fn last_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| !t.is_comment())
    }

    fn next_token(
        &mut self,
        ctx: LexContext,
    ) -> Result<Option<(TokenKind, usize, usize)>, TokenizeError> {
        let source = self.source;
        let offset = self.cursor;
        let mut lexer = RawKind::lexer(&source[offset..]);
        let Some(raw) = lexer.next() else {
            self.cursor = source.len();
            return Ok(None);
        };
        let start = offset + lexer.span().start;
        let end = offset + lexer.span().end;

        let token = match raw {
            Ok(RawKind::Ident) => self.identifier(ctx, start, end),
            Ok(RawKind::PrivateName) => (TokenKind::PrivateName, start, scan::identifier_tail(source, end)),
            Ok(RawKind::Number) => {
                let text = &source[start..end];
                let glued = source[end..].chars().next().is_some_and(scan::is_ident_continue);
                if glued || text.ends_with('_') || text.contains("__") {
                    return Err(Self::lex_error(LexErrorKind::MalformedNumber, start, end));
                }
                (TokenKind::Number, start, end)
            }
            Ok(RawKind::LineComment) => (TokenKind::Comment(CommentKind::Line), start, end),
            Ok(RawKind::BlockCommentStart) => {
                let end = scan::block_comment(source, start)
                    .map_err(|kind| Self::lex_error(kind, start, source.len()))?;
                (TokenKind::Comment(CommentKind::Block), start, end)
            }
            Ok(RawKind::Quote) => {
                let scanned = if ctx.jsx_tag {
                    scan::jsx_string(source, start)
                } else {
                    scan::string(source, start)
                };
                let end = scanned.map_err(|kind| Self::lex_error(kind, start, line_end(source, start)))?;
                (TokenKind::String, start, end)
            }
            Ok(RawKind::Backtick) => {
                let (end, part) = scan::template(source, start, true)
                    .map_err(|kind| Self::lex_error(kind, start, source.len()))?;
                (TokenKind::Template(part), start, end)
            }
            Ok(RawKind::Punct(punct)) => self.punct(ctx, punct, start, end)?,
            Err(()) => {
                let c = source[start..].chars().next().unwrap_or('\0');
                if scan::is_ident_start(c) {
                    self.identifier(ctx, start, start + c.len_utf8())
                } else {
                    return Err(Self::lex_error(
                        LexErrorKind::UnexpectedCharacter(c),
                        start,
                        start + c.len_utf8(),
                    ));
                }
            }
        };
        Ok(Some(token))
    }

    fn identifier(&self, ctx: LexContext, start: usize, end: usize) -> (TokenKind, usize, usize) {
        if ctx.jsx_tag {
            return (TokenKind::Name, start, scan::jsx_name_tail(self.source, end));
        }
        let end = scan::identifier_tail(self.source, end);
        let after_dot = self.last_significant().is_some_and(|t| {
            t.is_punct(Punct::Dot) || t.is_punct(Punct::QuestionDot)
        });
        let kind = match Keyword::reserved(&self.source[start..end]) {
            Some(keyword) if !after_dot => TokenKind::Keyword(keyword),
            _ => TokenKind::Name,
        };
        (kind, start, end)
    }

    fn punct(
        &self,
        ctx: LexContext,
        punct: Punct,
        start: usize,
        end: usize,
    ) -> Result<(TokenKind, usize, usize), TokenizeError> {
        let source = self.source;
        let next = source[end..].chars().next();
        let single = |p: Punct| -> Result<_, TokenizeError> {
            Ok((TokenKind::Punct(p), start, start + 1))
        };

        match punct {
            Punct::RBrace if ctx.template_continue => {
                let (end, part) = scan::template(source, start, false)
                    .map_err(|kind| Self::lex_error(kind, start, source.len()))?;
                Ok((TokenKind::Template(part), start, end))
            }
            Punct::Slash if ctx.jsx_tag && next == Some('>') => {
                Ok((TokenKind::Jsx(JsxToken::SelfClose), start, end + 1))
            }
            Punct::Slash | Punct::SlashEq if ctx.regex_allowed && !ctx.jsx_tag => {
                let end = scan::regex(source, start)
                    .map_err(|kind| Self::lex_error(kind, start, line_end(source, start)))?;
                Ok((TokenKind::Regex, start, end))
            }
            p if p.starts_with_gt() && ctx.jsx_tag => {
                Ok((TokenKind::Jsx(JsxToken::TagEnd), start, start + 1))
            }
            p if p.starts_with_gt() && ctx.in_type => single(Punct::Gt),
            Punct::StarEq if ctx.in_type => single(Punct::Star),
            Punct::QuestionDot if next.is_some_and(|c| c.is_ascii_digit()) => single(Punct::Question),
            Punct::LBracePipe if !(ctx.flow && ctx.in_type) => single(Punct::LBrace),
            Punct::PipeRBrace if !(ctx.flow && ctx.in_type) => single(Punct::Pipe),
            p => Ok((TokenKind::Punct(p), start, end)),
        }
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

/// End of the line containing `pos`, for error spans.
fn line_end(source: &str, pos: usize) -> usize {
    source[pos..]
        .find(['\n', '\r'])
        .map_or(source.len(), |i| pos + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TemplatePart;

    fn kinds(source: &str, dialect: Dialect) -> Vec<TokenKind> {
        tokenize(source, dialect)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("let x = 1;", Dialect::JS),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Name,
                TokenKind::Punct(Punct::Eq),
                TokenKind::Number,
                TokenKind::Punct(Punct::Semi),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_regex_versus_division() {
        let k = kinds("a / b; x = /re/g;", Dialect::JS);
        assert_eq!(k[1], TokenKind::Punct(Punct::Slash));
        assert_eq!(k[6], TokenKind::Regex);
    }

    #[test]
    fn test_template_pieces() {
        let k = kinds("`a${b}c${d}e`", Dialect::JS);
        assert_eq!(
            k,
            vec![
                TokenKind::Template(TemplatePart::Head),
                TokenKind::Name,
                TokenKind::Template(TemplatePart::Middle),
                TokenKind::Name,
                TokenKind::Template(TemplatePart::Tail),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_object_in_template_substitution() {
        let k = kinds("`${ {a: 1}.a }`", Dialect::JS);
        assert_eq!(k[1], TokenKind::Punct(Punct::LBrace));
        assert_eq!(k[5], TokenKind::Punct(Punct::RBrace));
        assert_eq!(k[8], TokenKind::Template(TemplatePart::Tail));
    }

    #[test]
    fn test_keyword_after_dot_is_name() {
        let k = kinds("a.default.class", Dialect::JS);
        assert_eq!(k[2], TokenKind::Name);
        assert_eq!(k[4], TokenKind::Name);
    }

    #[test]
    fn test_line_breaks_recorded() {
        let tokens = tokenize("a\n/* x */ b c", Dialect::JS).unwrap();
        assert!(!tokens[0].flags.preceded_by_newline);
        assert!(tokens[2].flags.preceded_by_newline);
        assert!(!tokens[3].flags.preceded_by_newline);
    }

    #[test]
    fn test_hashbang() {
        let k = kinds("#!/usr/bin/env node\nfoo()", Dialect::JS);
        assert_eq!(k[0], TokenKind::Comment(CommentKind::Hashbang));
        assert_eq!(k[1], TokenKind::Name);
    }

    #[test]
    fn test_malformed_number() {
        let err = tokenize("let x = 3in;", Dialect::JS).unwrap_err();
        assert!(matches!(
            err,
            TokenizeError::Lex(LexError {
                kind: LexErrorKind::MalformedNumber,
                ..
            })
        ));
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = tokenize("const café = 1", Dialect::JS).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[1].text("const café = 1"), "café");
    }

    #[test]
    fn test_optional_chaining_versus_ternary_digit() {
        let k = kinds("a?.b; c?.5:1", Dialect::JS);
        assert_eq!(k[1], TokenKind::Punct(Punct::QuestionDot));
        assert_eq!(k[5], TokenKind::Punct(Punct::Question));
        assert_eq!(k[6], TokenKind::Number);
    }
}
