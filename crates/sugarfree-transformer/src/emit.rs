//! Applies an edit set to the source, left to right.

use crate::edit::{EditAction, EditSet, Whitespace};
use source_map::{ByteOffset, SourceMap, SourceMapBuilder, Span};
use sugarfree_lexer::{CommentKind, Token, TokenKind};

/// Output buffer that records where each piece of text came from.
struct Emitter<'a> {
    source: &'a str,
    out: String,
    map: Option<SourceMapBuilder>,
}

impl<'a> Emitter<'a> {
    /// Copies `source[start..end]` unchanged.
    fn copy(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let text = &self.source[start..end];
        if let Some(map) = &mut self.map {
            map.add_source(offset(start), text);
        }
        self.out.push_str(text);
    }

    fn generate(&mut self, text: &str) {
        if let Some(map) = &mut self.map {
            map.add_generated(text);
        }
        self.out.push_str(text);
    }

    fn replace(&mut self, original: Span, text: &str) {
        if let Some(map) = &mut self.map {
            map.add_transformed(original, text);
        }
        self.out.push_str(text);
    }
}

fn offset(n: usize) -> ByteOffset {
    ByteOffset::from(u32::try_from(n).unwrap_or(u32::MAX))
}

/// The line break characters of `text`, in order.
pub(crate) fn newlines(text: &str) -> String {
    text.chars().filter(|c| matches!(c, '\n' | '\r')).collect()
}

/// Where generated prefix text goes: after a hashbang line, else at 0.
fn prefix_offset(source: &str, tokens: &[Token]) -> Option<usize> {
    let first = tokens.first()?;
    if first.kind != TokenKind::Comment(CommentKind::Hashbang) {
        return None;
    }
    let end = first.span.end_usize();
    let rest = &source[end..];
    let line_break = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') || rest.starts_with('\r') {
        1
    } else {
        0
    };
    Some(end + line_break)
}

/// Produces the output text (and optionally its source map).
pub(crate) fn emit(
    source: &str,
    tokens: &[Token],
    edits: &EditSet,
    prefix: &str,
    suffix: &str,
    source_maps: bool,
) -> (String, Option<SourceMap>) {
    let mut e = Emitter {
        source,
        out: String::with_capacity(source.len() + prefix.len() + suffix.len()),
        map: source_maps.then(SourceMapBuilder::new),
    };

    let mut cursor = 0;
    let mut i = 0;
    if let Some(end) = prefix_offset(source, tokens) {
        e.copy(0, end);
        cursor = end;
        i = 1;
    }
    e.generate(prefix);

    let mut ranges = edits.ranges.iter().peekable();
    let mut insertions = edits.insertions.iter().peekable();
    while i < tokens.len() {
        while let Some(insertion) = insertions.next_if(|e| e.range.start <= i) {
            if let EditAction::Insert(text) = &insertion.action {
                e.generate(text);
            }
        }

        let token = &tokens[i];
        let Some(edit) = ranges.next_if(|e| e.range.start == i) else {
            e.copy(cursor, token.span.end_usize());
            cursor = cursor.max(token.span.end_usize());
            i += 1;
            continue;
        };

        let start = token.span.start_usize();
        match edit.leading {
            Whitespace::Keep => e.copy(cursor, start),
            Whitespace::Newlines => e.generate(&newlines(&source[cursor..start])),
        }
        let last = tokens[edit.range.end - 1].span.end_usize();
        let span = Span::from_usize(start, last);
        if let EditAction::Replace(text) = &edit.action {
            e.replace(span, text);
        }
        e.generate(&newlines(&source[start..last]));
        cursor = last;
        i = edit.range.end;
    }

    for insertion in insertions {
        if let EditAction::Insert(text) = &insertion.action {
            e.generate(text);
        }
    }
    e.copy(cursor, source.len());
    e.generate(suffix);

    let map = e.map.map(SourceMapBuilder::build);
    (e.out, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::Edits;
    use crate::modules::ModuleKind;
    use pretty_assertions::assert_eq;
    use sugarfree_lexer::{tokenize, Dialect};

    fn run(source: &str, build: impl FnOnce(&mut Edits)) -> String {
        let tokens = tokenize(source, Dialect::JS).unwrap();
        let mut edits = Edits::new(ModuleKind::Types);
        build(&mut edits);
        let set = EditSet::build(edits.into_vec(), &tokens).unwrap();
        emit(source, &tokens, &set, "", "", false).0
    }

    #[test]
    fn test_no_edits_is_identity() {
        let source = "#!/usr/bin/env node\n// hi\nlet a = `x${b}`;  \n";
        assert_eq!(run(source, |_| {}), source);
    }

    #[test]
    fn test_delete_keeps_inner_newlines() {
        let source = "a(b,\n  c);\nd";
        // Deletes `b , c`.
        assert_eq!(run(source, |e| e.delete(2..5)), "a(\n);\nd");
    }

    #[test]
    fn test_trimmed_delete_drops_indentation() {
        let source = "a;\n    b;\nc";
        assert_eq!(run(source, |e| e.delete_trimmed(2..4)), "a;\n\nc");
    }

    #[test]
    fn test_replace_and_insert() {
        let source = "a = b + c";
        let out = run(source, |e| {
            e.replace_token(2, "x.y");
            e.insert_after(2, " +");
            e.insert_after(4, ";");
        });
        assert_eq!(out, "a = x.y + + c;");
    }

    #[test]
    fn test_prefix_follows_hashbang() {
        let source = "#!/usr/bin/env node\nrun();";
        let tokens = tokenize(source, Dialect::JS).unwrap();
        let (out, _) = emit(source, &tokens, &EditSet::default(), "P;", "\nS", false);
        assert_eq!(out, "#!/usr/bin/env node\nP;run();\nS");
    }

    #[test]
    fn test_source_map_tracks_copied_text() {
        let source = "let x = 1;";
        let tokens = tokenize(source, Dialect::JS).unwrap();
        let mut edits = Edits::new(ModuleKind::Imports);
        edits.replace_token(1, "longer");
        let set = EditSet::build(edits.into_vec(), &tokens).unwrap();
        let (out, map) = emit(source, &tokens, &set, "P", "", true);
        let map = map.unwrap();
        assert_eq!(out, "Plet longer = 1;");
        // `=` moved from 6 to 12.
        assert_eq!(map.original_position(offset(12)), Some(offset(6)));
        assert_eq!(map.generated_position(offset(6)), Some(offset(12)));
    }
}
