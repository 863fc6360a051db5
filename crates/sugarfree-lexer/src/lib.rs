//! Context-aware tokenizer for JavaScript with TypeScript, Flow and JSX
//! syntax extensions.
//!
//! The tokenizer is a single forward pass. A context tracker rides along
//! with it and decides, with at most one token of lookahead, what each token
//! means: whether `/` starts a regex, whether `<` opens JSX or a generic
//! group, and which tokens belong to type annotations. The resulting flags
//! are all a text-editing transformer needs; no syntax tree is built.
//!
//! # Example
//!
//! ```
//! use sugarfree_lexer::{tokenize, Dialect, TokenKind};
//!
//! let source = "let x: number = 1;";
//! let tokens = tokenize(source, Dialect::TS).unwrap();
//! let types: Vec<&str> = tokens
//!     .iter()
//!     .filter(|t| t.flags.in_type)
//!     .map(|t| t.text(source))
//!     .collect();
//! assert_eq!(types, [":", "number"]);
//! assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
//! ```

mod context;
mod dialect;
mod error;
mod raw;
mod scan;
mod token;
mod tokenizer;
mod types;

pub use dialect::Dialect;
pub use error::{
    AmbiguousSyntaxError, LexError, LexErrorKind, TokenizeError, UnbalancedBracketsError,
    UnsupportedConstructError,
};
pub use source_map::Span;
pub use token::{
    CommentKind, FrameKind, JsxToken, Keyword, Punct, TemplatePart, Token, TokenFlags, TokenKind,
};
pub use tokenizer::tokenize;
