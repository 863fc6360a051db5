//! Error types for the transformer.

use crate::modules::ModuleKind;
use source_map::{LineCol, LineIndex, Span};
use sugarfree_lexer::TokenizeError;
use thiserror::Error;

/// Two modules asked to edit overlapping token ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting edits from the {first} and {second} transforms")]
pub struct ConflictingTransformError {
    /// The module whose edit was registered first.
    pub first: ModuleKind,
    /// The module whose edit overlaps it.
    pub second: ModuleKind,
    /// Source span covered by the later edit.
    pub span: Span,
}

/// Any error a [`transform`](crate::transform) call can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The source could not be tokenized.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// Two transforms tried to rewrite the same tokens.
    #[error(transparent)]
    ConflictingTransform(#[from] ConflictingTransformError),
}

impl TransformError {
    /// Source span the error points at.
    pub fn span(&self) -> Span {
        match self {
            TransformError::Tokenize(e) => e.span(),
            TransformError::ConflictingTransform(e) => e.span,
        }
    }

    /// Line and column of the error in `source`.
    pub fn line_col(&self, source: &str) -> Option<LineCol> {
        LineIndex::new(source).line_col(self.span().start)
    }

    /// A short machine-readable name for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::Tokenize(TokenizeError::Lex(_)) => "lex",
            TransformError::Tokenize(TokenizeError::UnbalancedBrackets(_)) => "unbalanced-brackets",
            TransformError::Tokenize(TokenizeError::AmbiguousSyntax(_)) => "ambiguous-syntax",
            TransformError::Tokenize(TokenizeError::UnsupportedConstruct(_)) => {
                "unsupported-construct"
            }
            TransformError::ConflictingTransform(_) => "conflicting-transform",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_col_of_conflict() {
        let err = TransformError::from(ConflictingTransformError {
            first: ModuleKind::Types,
            second: ModuleKind::Imports,
            span: Span::from_usize(6, 9),
        });
        assert_eq!(err.line_col("a;\nb; foo"), Some(LineCol::new(1, 3)));
        assert_eq!(err.code(), "conflicting-transform");
        assert_eq!(
            err.to_string(),
            "conflicting edits from the types and imports transforms"
        );
    }
}
