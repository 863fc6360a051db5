//! Source position tracking for sugarfree.
//!
//! The transpiler edits source text in place, so every output byte is either
//! copied from the input or synthesized by a transform. This crate records
//! which is which, letting callers map an output offset back to the input
//! (and derive line/column for diagnostics).

mod builder;
mod line_index;
mod span;

pub use builder::{Mapping, MappingKind, PositionDelta, SourceMap, SourceMapBuilder};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
