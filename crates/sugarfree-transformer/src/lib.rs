//! Source-to-source transforms for JavaScript with TypeScript, Flow and JSX.
//!
//! The transformer never builds a syntax tree. It reads the token stream from
//! `sugarfree-lexer`, lets each enabled module decide which token ranges to
//! delete, replace or insert around, and applies all edits to the original
//! text in a single pass:
//! - Type stripping for TypeScript and Flow
//! - JSX lowering to `React.createElement` calls
//! - ES module to CommonJS interop
//! - Jest mock hoisting and react-hot-loader registration
//!
//! # Example
//!
//! ```
//! use sugarfree_transformer::{transform, Transform, TransformOptions};
//!
//! let options = TransformOptions::from_transforms(&[Transform::Typescript]);
//! let result = transform("let x: number = 1;", &options).unwrap();
//! assert_eq!(result.code, "let x = 1;");
//! ```

mod cursor;
mod edit;
mod emit;
mod error;
mod modules;
mod names;
mod options;
mod patterns;
mod scope;
mod statements;
mod transform;

pub use error::{ConflictingTransformError, TransformError};
pub use modules::ModuleKind;
pub use options::{ModuleConvention, Transform, TransformOptions, UnknownTransform};
pub use source_map::{LineCol, SourceMap, Span};
pub use sugarfree_lexer::Dialect;
pub use transform::{transform, TransformResult};
