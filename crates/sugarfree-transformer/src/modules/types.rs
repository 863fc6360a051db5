//! Type stripping for TypeScript and Flow.
//!
//! Every maximal run of type tokens is deleted. Import and export lists are
//! pruned specifier by specifier when the import transform is off; when it
//! is on, statements it rewrites are left to it.

use super::{Context, ModuleKind, ModuleOutput};
use crate::cursor::TokenView;
use crate::options::Transform;
use crate::scope::Bindings;
use crate::statements::{ModuleStatement, Specifier, StatementKind};
use std::ops::Range;
use sugarfree_lexer::{Keyword, Punct};

pub(crate) fn run(cx: &Context<'_>) -> ModuleOutput {
    let mut out = ModuleOutput::new(ModuleKind::Types);
    let view = cx.view;
    let imports = cx.has(Transform::Imports);
    let typescript = cx.options.dialect().typescript;

    // Token ranges this module does not walk for type runs.
    let mut reserved: Vec<Range<usize>> = Vec::new();
    for statement in &cx.bindings.statements {
        if statement.type_only {
            continue;
        }
        if imports {
            if owned_by_imports(statement) {
                reserved.push(statement.range.clone());
            }
        } else if let Some(list) = prune_list(cx, statement, typescript, &mut out) {
            reserved.push(list);
        }
    }
    reserved.sort_by_key(|r| r.start);

    let mut reserved = reserved.into_iter().peekable();
    let mut i = 0;
    while i < view.len() {
        if let Some(range) = reserved.next_if(|r| r.start <= i) {
            i = i.max(range.end);
            continue;
        }
        let token = &view.tokens[i];
        if !token.flags.in_type || token.is_comment() {
            if cx.has(Transform::Flow) && token.is_comment() {
                flow_pragma(view, i, &mut out);
            }
            i += 1;
            continue;
        }
        let end = run_end(view, i);
        let statement_start =
            token.is_keyword(Keyword::Import) || token.is_keyword(Keyword::Export);
        if statement_start && !imports {
            out.edits.delete_trimmed(i..end);
        } else {
            out.edits.delete(i..end);
        }
        i = end;
    }

    tracing::trace!(edits = !out.edits.is_empty(), "type stripping done");
    out
}

/// Exclusive end of the run of type tokens starting at `start`. Comments
/// between type tokens belong to the run.
fn run_end(view: TokenView<'_>, start: usize) -> usize {
    let mut end = start + 1;
    let mut j = start + 1;
    while j < view.len() {
        let t = &view.tokens[j];
        if t.is_comment() {
            j += 1;
            continue;
        }
        if !t.flags.in_type {
            break;
        }
        j += 1;
        end = j;
    }
    end
}

/// Removes `@flow` from pragma comments.
fn flow_pragma(view: TokenView<'_>, i: usize, out: &mut ModuleOutput) {
    let text = view.text(i);
    if text.contains("@flow") {
        out.edits.replace_token(i, text.replace("@flow", ""));
    }
}

/// Statements the import transform replaces wholesale.
fn owned_by_imports(statement: &ModuleStatement) -> bool {
    matches!(
        statement.kind,
        StatementKind::Import { .. } | StatementKind::ExportNamed { .. } | StatementKind::ExportAll { .. }
    )
}

/// Prunes type-only and unused bindings from an ESM import or export list.
/// Returns the token range it took over, if any.
fn prune_list(
    cx: &Context<'_>,
    statement: &ModuleStatement,
    typescript: bool,
    out: &mut ModuleOutput,
) -> Option<Range<usize>> {
    let bindings = cx.bindings;
    match &statement.kind {
        StatementKind::Import {
            default,
            namespace,
            named,
            ..
        } => {
            if default.is_none() && namespace.is_none() && named.is_empty() {
                return None;
            }
            let elide = |token: usize| import_elided(bindings, cx.view, token, typescript);
            let mut removed = 0;
            let mut total = 0;
            if let Some(d) = *default {
                total += 1;
                if elide(d) {
                    removed += 1;
                }
            }
            if let Some(n) = *namespace {
                total += 1;
                if elide(n) {
                    removed += 1;
                }
            }
            let mut doomed = Vec::new();
            for specifier in named {
                total += 1;
                if specifier.type_only || elide(specifier.alias) {
                    removed += 1;
                    doomed.push(specifier);
                }
            }
            if removed == total {
                out.edits.delete_trimmed(statement.range.clone());
                return Some(statement.range.clone());
            }
            if let Some(d) = *default {
                if elide(d) {
                    // `a, ` before the brace or namespace.
                    let comma = cx.view.next_sig(d).filter(|&c| cx.view.is_punct(c, Punct::Comma));
                    out.edits.delete_trimmed(d..comma.unwrap_or(d) + 1);
                }
            }
            remove_specifiers(&doomed, out);
            Some(statement.range.clone())
        }
        StatementKind::ExportNamed { specifiers, source } => {
            let doomed: Vec<&Specifier> = specifiers
                .iter()
                .filter(|s| {
                    s.type_only
                        || (typescript
                            && source.is_none()
                            && export_is_type(bindings, cx.view.text(s.name)))
                })
                .collect();
            if !specifiers.is_empty() && doomed.len() == specifiers.len() {
                out.edits.delete_trimmed(statement.range.clone());
            } else {
                remove_specifiers(&doomed, out);
            }
            Some(statement.range.clone())
        }
        _ => None,
    }
}

fn remove_specifiers(doomed: &[&Specifier], out: &mut ModuleOutput) {
    for specifier in doomed {
        match specifier.comma {
            Some(comma) => out.edits.delete(specifier.range.start..comma + 1),
            None => out.edits.delete_trimmed(specifier.range.clone()),
        }
    }
}

/// Whether the import bound at `token` disappears from ESM output.
fn import_elided(bindings: &Bindings, view: TokenView<'_>, token: usize, typescript: bool) -> bool {
    let Some(binding) = bindings.import_named(view.text(token)) else {
        return false;
    };
    binding.is_type_only() || (typescript && binding.is_unused_at_runtime())
}

/// A local exported by name that only exists as a type.
pub(crate) fn export_is_type(bindings: &Bindings, local: &str) -> bool {
    if let Some(import) = bindings.import_named(local) {
        return import.is_type_only();
    }
    bindings.top_level_declaration(local).is_none() && bindings.type_declarations.contains(local)
}

#[cfg(test)]
mod tests {
    use crate::{transform, Transform, TransformOptions};
    use pretty_assertions::assert_eq;

    fn strip(code: &str, transforms: &[Transform]) -> String {
        transform(code, &TransformOptions::from_transforms(transforms))
            .unwrap()
            .code
    }

    #[test]
    fn test_comments_inside_a_type_run_go_with_it() {
        assert_eq!(
            strip("let a: /* n */ number = 1;", &[Transform::Typescript]),
            "let a = 1;"
        );
    }

    #[test]
    fn test_default_binding_is_pruned_with_its_comma() {
        assert_eq!(
            strip("import A, {b} from 'm';\nlet x: A = b;", &[Transform::Typescript]),
            "import {b} from 'm';\nlet x = b;"
        );
    }

    #[test]
    fn test_flow_keeps_unused_imports() {
        assert_eq!(
            strip("import a from 'a';", &[Transform::Flow]),
            "import a from 'a';"
        );
    }
}
