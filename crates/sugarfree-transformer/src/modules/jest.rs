//! Hoists top-level `jest.mock(…)` style calls above the module's requires.
//!
//! Each call statement is wrapped in a function declaration in place, and
//! the prefix calls those functions before anything else runs.

use super::{Context, ModuleKind, ModuleOutput};
use crate::cursor::TokenView;
use crate::names::NameManager;
use sugarfree_lexer::{FrameKind, Punct};

/// `jest` methods whose calls must run before imports.
const HOISTED_METHODS: &[&str] = &[
    "mock",
    "unmock",
    "enableAutomock",
    "disableAutomock",
    "deepUnmock",
];

pub(crate) fn run(cx: &Context<'_>, names: &mut NameManager) -> ModuleOutput {
    let mut out = ModuleOutput::new(ModuleKind::Jest);
    if cx.bindings.top_level_declaration("jest").is_some() {
        return out;
    }
    let view = cx.view;
    let mut calls = Vec::new();
    let mut i = 0;
    while i < view.len() {
        if !hoistable(view, i) {
            i += 1;
            continue;
        }
        let end = view.statement_end(i);
        let name = names.claim_numbered("_hoistedJest");
        out.edits.replace_token(i, format!("function {name}() {{ jest"));
        let last = end - 1;
        let close = if view.is_punct(last, Punct::Semi) { " }" } else { "; }" };
        out.edits.insert_after(last, close);
        calls.push(format!("{name}();"));
        i = end;
    }
    tracing::trace!(hoisted = calls.len(), "jest calls hoisted");
    out.prefix = calls.join("");
    out
}

/// A top-level statement starting `jest.<method>(`.
fn hoistable(view: TokenView<'_>, i: usize) -> bool {
    let token = &view.tokens[i];
    if token.flags.depth != 0 || token.flags.frame != FrameKind::Module || !view.is_name(i, "jest") {
        return false;
    }
    let statement_start = match view.prev_sig(i) {
        None => true,
        Some(p) => {
            view.is_punct(p, Punct::Semi)
                || view.is_punct(p, Punct::RBrace)
                || (token.flags.preceded_by_newline && view.ends_value(p))
        }
    };
    if !statement_start {
        return false;
    }
    let Some(dot) = view.next_sig(i).filter(|&d| view.is_punct(d, Punct::Dot)) else {
        return false;
    };
    let Some(method) = view.next_sig(dot) else {
        return false;
    };
    HOISTED_METHODS.contains(&view.text(method))
        && view.next_sig(method).is_some_and(|p| view.is_punct(p, Punct::LParen))
}
