//! Position-delta tables recorded while the output buffer grows.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// How a generated range relates to the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MappingKind {
    /// Bytes copied verbatim; offsets inside map one to one.
    Copied,
    /// Replacement text standing in for an original range.
    Replaced,
}

/// A single mapping from a generated range to an original range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    /// The span in the generated output.
    pub generated: Span,
    /// The span in the original source.
    pub original: Span,
    /// Whether the generated text was copied or synthesized.
    pub kind: MappingKind,
}

/// One row of the position-delta table: a run of copied bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionDelta {
    /// Output offset where the run starts.
    pub generated: u32,
    /// Input offset where the run starts.
    pub original: u32,
    /// Run length in bytes.
    pub len: u32,
}

/// Mappings from generated output back to the original source, sorted by
/// generated offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    /// Creates a new empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source map builder.
    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::new()
    }

    /// Returns the number of mappings in this source map.
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if this source map has no mappings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns an iterator over all mappings.
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    /// The copied runs only, as `(generated, original, len)` rows.
    pub fn deltas(&self) -> Vec<PositionDelta> {
        self.mappings
            .iter()
            .filter(|m| m.kind == MappingKind::Copied)
            .map(|m| PositionDelta {
                generated: m.generated.start.into(),
                original: m.original.start.into(),
                len: m.generated.len().into(),
            })
            .collect()
    }

    /// Finds the original position corresponding to a generated position.
    ///
    /// Copied runs map byte for byte; a replacement maps every offset to the
    /// start of the original range it replaced. Synthesized text (prefixes,
    /// suffixes, kept newlines) has no mapping.
    pub fn original_position(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let mapping = self.find_mapping_for_generated(generated)?;
        match mapping.kind {
            MappingKind::Copied => {
                let offset_in_span = u32::from(generated) - u32::from(mapping.generated.start);
                Some(mapping.original.start + TextSize::from(offset_in_span))
            }
            MappingKind::Replaced => Some(mapping.original.start),
        }
    }

    /// Finds the generated position of an original position, if that byte
    /// was copied to the output.
    pub fn generated_position(&self, original: ByteOffset) -> Option<ByteOffset> {
        self.mappings
            .iter()
            .filter(|m| m.kind == MappingKind::Copied)
            .find(|m| m.original.contains(original))
            .map(|m| {
                let offset_in_span = u32::from(original) - u32::from(m.original.start);
                m.generated.start + TextSize::from(offset_in_span)
            })
    }

    fn find_mapping_for_generated(&self, generated: ByteOffset) -> Option<&Mapping> {
        let idx = match self
            .mappings
            .binary_search_by(|m| m.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(idx) => idx.checked_sub(1)?,
        };

        self.mappings
            .get(idx)
            .filter(|m| m.generated.contains(generated))
    }
}

/// Records mappings while an output buffer is appended to left to right.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    generated_offset: ByteOffset,
}

impl SourceMapBuilder {
    /// Creates a new source map builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current generated offset.
    #[inline]
    pub fn generated_offset(&self) -> ByteOffset {
        self.generated_offset
    }

    /// Records `text` copied verbatim from `original_start`.
    ///
    /// Runs that continue the previous copied run in both the output and the
    /// input are merged into it.
    pub fn add_source(&mut self, original_start: ByteOffset, text: &str) {
        if text.is_empty() {
            return;
        }
        let len = TextSize::from(text.len() as u32);
        if let Some(last) = self.mappings.last_mut() {
            if last.kind == MappingKind::Copied
                && last.generated.end == self.generated_offset
                && last.original.end == original_start
            {
                last.generated.end += len;
                last.original.end += len;
                self.generated_offset += len;
                return;
            }
        }
        self.mappings.push(Mapping {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original: Span::new(original_start, original_start + len),
            kind: MappingKind::Copied,
        });
        self.generated_offset += len;
    }

    /// Adds synthesized text with no original position.
    pub fn add_generated(&mut self, text: &str) {
        self.generated_offset += TextSize::from(text.len() as u32);
    }

    /// Records `generated_text` as the replacement of the `original` range.
    ///
    /// Empty replacements (deletions) advance nothing and record nothing.
    pub fn add_transformed(&mut self, original: Span, generated_text: &str) {
        if generated_text.is_empty() {
            return;
        }
        let gen_len = TextSize::from(generated_text.len() as u32);
        self.mappings.push(Mapping {
            generated: Span::new(self.generated_offset, self.generated_offset + gen_len),
            original,
            kind: MappingKind::Replaced,
        });
        self.generated_offset += gen_len;
    }

    /// Builds the final source map.
    pub fn build(self) -> SourceMap {
        // Appends are monotonic, so the table is already sorted.
        SourceMap {
            mappings: self.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_source_map() {
        let map = SourceMap::new();
        assert!(map.is_empty());
        assert!(map.deltas().is_empty());
    }

    #[test]
    fn test_adjacent_copies_merge() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source(TextSize::from(0), "const ");
        builder.add_source(TextSize::from(6), "x");
        let map = builder.build();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.deltas(),
            vec![PositionDelta {
                generated: 0,
                original: 0,
                len: 7
            }]
        );
    }

    #[test]
    fn test_deletion_shifts_later_copies() {
        // `const x: number = 1;` with `: number` deleted.
        let mut builder = SourceMapBuilder::new();
        builder.add_source(TextSize::from(0), "const x");
        builder.add_transformed(Span::new(7u32, 15u32), "");
        builder.add_source(TextSize::from(15), " = 1;");
        let map = builder.build();

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.original_position(TextSize::from(8)),
            Some(TextSize::from(16))
        );
        assert_eq!(
            map.generated_position(TextSize::from(16)),
            Some(TextSize::from(8))
        );
        assert_eq!(map.generated_position(TextSize::from(10)), None);
    }

    #[test]
    fn test_replacement_maps_to_range_start() {
        let mut builder = SourceMapBuilder::new();
        builder.add_generated("\"use strict\";");
        builder.add_transformed(Span::new(0u32, 18u32), "var _d = require('d');");
        let map = builder.build();

        assert_eq!(map.original_position(TextSize::from(3)), None);
        assert_eq!(
            map.original_position(TextSize::from(20)),
            Some(TextSize::from(0))
        );
        assert!(map.deltas().is_empty());
    }
}
