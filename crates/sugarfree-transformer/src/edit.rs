//! Token-range edits and overlap detection.

use crate::error::ConflictingTransformError;
use crate::modules::ModuleKind;
use source_map::{ByteOffset, Span};
use std::ops::Range;
use sugarfree_lexer::Token;

/// What happens to the whitespace before an edited range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Whitespace {
    /// Copy it unchanged.
    #[default]
    Keep,
    /// Keep only its line breaks.
    Newlines,
}

/// What an edit does to its token range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Remove the tokens, keeping the line breaks inside them.
    Delete,
    /// Replace the tokens with text, followed by the line breaks inside them.
    Replace(String),
    /// Add text after the anchoring token. The range is empty.
    Insert(String),
}

/// One edit over a half-open range of token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Token indices covered. Empty for insertions, which are emitted after
    /// token `range.start - 1`.
    pub range: Range<usize>,
    pub action: EditAction,
    pub leading: Whitespace,
    /// The module that registered the edit.
    pub module: ModuleKind,
}

/// Edits collected from one module run.
#[derive(Debug)]
pub(crate) struct Edits {
    module: ModuleKind,
    edits: Vec<Edit>,
}

impl Edits {
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            edits: Vec::new(),
        }
    }

    pub fn delete(&mut self, range: Range<usize>) {
        self.push(range, EditAction::Delete, Whitespace::Keep);
    }

    pub fn delete_trimmed(&mut self, range: Range<usize>) {
        self.push(range, EditAction::Delete, Whitespace::Newlines);
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(range, EditAction::Replace(text.into()), Whitespace::Keep);
    }

    pub fn replace_token(&mut self, index: usize, text: impl Into<String>) {
        self.replace(index..index + 1, text);
    }

    /// Inserts `text` directly after token `index`.
    pub fn insert_after(&mut self, index: usize, text: impl Into<String>) {
        self.push(
            index + 1..index + 1,
            EditAction::Insert(text.into()),
            Whitespace::Keep,
        );
    }

    fn push(&mut self, range: Range<usize>, action: EditAction, leading: Whitespace) {
        debug_assert!(range.start <= range.end);
        self.edits.push(Edit {
            range,
            action,
            leading,
            module: self.module,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn into_vec(self) -> Vec<Edit> {
        self.edits
    }
}

/// All edits of a run, checked for overlaps and sorted for emission.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
    /// Deletions and replacements, ordered by start and non-overlapping.
    pub ranges: Vec<Edit>,
    /// Insertions, ordered by anchor and then registration order.
    pub insertions: Vec<Edit>,
}

impl EditSet {
    /// Validates edits from all modules, given in module table order.
    pub fn build(edits: Vec<Edit>, tokens: &[Token]) -> Result<Self, ConflictingTransformError> {
        let (mut insertions, mut ranges): (Vec<Edit>, Vec<Edit>) =
            edits.into_iter().partition(|e| e.range.is_empty());
        ranges.sort_by_key(|e| (e.range.start, e.range.end));
        insertions.sort_by_key(|e| e.range.start);

        for pair in ranges.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.range.start < a.range.end {
                return Err(conflict(a, b, tokens));
            }
        }

        // An insertion strictly inside a replaced range has nowhere to go.
        let mut r = 0;
        for insertion in &insertions {
            let at = insertion.range.start;
            while r < ranges.len() && ranges[r].range.end <= at {
                r += 1;
            }
            if let Some(range) = ranges.get(r) {
                if range.range.start < at {
                    return Err(conflict(range, insertion, tokens));
                }
            }
        }

        Ok(Self { ranges, insertions })
    }
}

fn conflict(first: &Edit, second: &Edit, tokens: &[Token]) -> ConflictingTransformError {
    ConflictingTransformError {
        first: first.module,
        second: second.module,
        span: token_span(tokens, &second.range),
    }
}

/// Source span covered by a token range. Empty ranges map to the end of the
/// anchoring token.
pub(crate) fn token_span(tokens: &[Token], range: &Range<usize>) -> Span {
    if range.is_empty() {
        let at = range
            .start
            .checked_sub(1)
            .and_then(|i| tokens.get(i))
            .map_or(ByteOffset::default(), |t| t.span.end);
        return Span::empty(at);
    }
    let start = tokens.get(range.start).map_or(ByteOffset::default(), |t| t.span.start);
    let end = tokens
        .get(range.end - 1)
        .map_or(start, |t| t.span.end);
    Span::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sugarfree_lexer::{tokenize, Dialect};

    fn tokens() -> Vec<Token> {
        tokenize("a b c d e", Dialect::JS).unwrap()
    }

    #[test]
    fn test_disjoint_edits_are_sorted() {
        let mut types = Edits::new(ModuleKind::Types);
        types.delete(3..4);
        let mut imports = Edits::new(ModuleKind::Imports);
        imports.replace(0..2, "x");
        imports.insert_after(2, "!");

        let mut all = types.into_vec();
        all.extend(imports.into_vec());
        let set = EditSet::build(all, &tokens()).unwrap();
        assert_eq!(set.ranges[0].range, 0..2);
        assert_eq!(set.ranges[1].range, 3..4);
        assert_eq!(set.insertions[0].range, 3..3);
    }

    #[test]
    fn test_overlapping_ranges_conflict() {
        let mut types = Edits::new(ModuleKind::Types);
        types.delete(1..3);
        let mut jsx = Edits::new(ModuleKind::Jsx);
        jsx.replace(2..4, "y");

        let mut all = types.into_vec();
        all.extend(jsx.into_vec());
        let err = EditSet::build(all, &tokens()).unwrap_err();
        assert_eq!(err.first, ModuleKind::Types);
        assert_eq!(err.second, ModuleKind::Jsx);
        assert_eq!(err.span, Span::from_usize(4, 7));
    }

    #[test]
    fn test_insertion_inside_range_conflicts() {
        let mut types = Edits::new(ModuleKind::Types);
        types.delete(0..3);
        let mut jest = Edits::new(ModuleKind::Jest);
        jest.insert_after(0, "!");
        // Insertions at either edge of a range are fine.
        jest.insert_after(2, "?");

        let mut all = types.into_vec();
        all.extend(jest.into_vec());
        let err = EditSet::build(all, &tokens()).unwrap_err();
        assert_eq!(err.second, ModuleKind::Jest);
        assert_eq!(err.span, Span::from_usize(1, 1));
    }
}
