//! Tokenizer error types.
//!
//! Every error is terminal: the tokenizer stops at the first one and carries
//! the offending range so callers can point at it.

use source_map::Span;
use thiserror::Error;

/// A character-level scanning failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    /// The kind of error.
    pub kind: LexErrorKind,
    /// Where scanning failed. For unterminated literals this starts at the
    /// opening delimiter and runs to the end of input (or the line break).
    pub span: Span,
}

impl LexError {
    /// Creates a new lex error.
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of lex error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A string literal or JSX attribute string with no closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A template literal with no closing backtick.
    #[error("unterminated template literal")]
    UnterminatedTemplate,

    /// A `/*` comment with no closing `*/`.
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A regular expression literal with no closing `/`.
    #[error("unterminated regular expression")]
    UnterminatedRegex,

    /// A numeric literal directly followed by an identifier character or digit.
    #[error("malformed numeric literal")]
    MalformedNumber,

    /// A character that cannot start any token.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
}

/// A closing bracket with no matching opener, or an opener still open at EOF.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unbalanced brackets: {message}")]
pub struct UnbalancedBracketsError {
    /// Human readable description.
    pub message: String,
    /// The offending bracket.
    pub span: Span,
}

/// Syntax that could be read more than one way with one token of lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ambiguous syntax: {message}")]
pub struct AmbiguousSyntaxError {
    /// Human readable description.
    pub message: String,
    /// The token where the ambiguity was detected.
    pub span: Span,
}

/// Syntax that needs a runtime lowering this transpiler does not perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported construct: {construct}")]
pub struct UnsupportedConstructError {
    /// Name of the construct, e.g. `enum`.
    pub construct: &'static str,
    /// The token that introduced it.
    pub span: Span,
}

/// Any error produced while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// See [`LexError`].
    #[error(transparent)]
    Lex(#[from] LexError),
    /// See [`UnbalancedBracketsError`].
    #[error(transparent)]
    UnbalancedBrackets(#[from] UnbalancedBracketsError),
    /// See [`AmbiguousSyntaxError`].
    #[error(transparent)]
    AmbiguousSyntax(#[from] AmbiguousSyntaxError),
    /// See [`UnsupportedConstructError`].
    #[error(transparent)]
    UnsupportedConstruct(#[from] UnsupportedConstructError),
}

impl TokenizeError {
    /// The source range the error points at.
    pub fn span(&self) -> Span {
        match self {
            TokenizeError::Lex(e) => e.span,
            TokenizeError::UnbalancedBrackets(e) => e.span,
            TokenizeError::AmbiguousSyntax(e) => e.span,
            TokenizeError::UnsupportedConstruct(e) => e.span,
        }
    }

    pub(crate) fn unbalanced(message: impl Into<String>, span: Span) -> Self {
        UnbalancedBracketsError {
            message: message.into(),
            span,
        }
        .into()
    }

    pub(crate) fn ambiguous(message: impl Into<String>, span: Span) -> Self {
        AmbiguousSyntaxError {
            message: message.into(),
            span,
        }
        .into()
    }

    pub(crate) fn unsupported(construct: &'static str, span: Span) -> Self {
        UnsupportedConstructError { construct, span }.into()
    }
}
