//! Top-level `import` and `export` statements.

use crate::cursor::TokenView;
use crate::patterns::binding_pattern;
use std::ops::Range;
use sugarfree_lexer::{FrameKind, Keyword, Punct, TokenKind};

/// One `import` or `export` statement at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatement {
    pub kind: StatementKind,
    /// Tokens from the keyword through the terminating `;` if any.
    pub range: Range<usize>,
    /// The statement only exists at the type level.
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `import … from '…'` or `import '…'`.
    Import {
        source: usize,
        default: Option<usize>,
        namespace: Option<usize>,
        named: Vec<Specifier>,
        /// The `{ … }` list, if present.
        braces: Option<(usize, usize)>,
    },
    /// `export { … }`, optionally re-exported `from '…'`.
    ExportNamed {
        specifiers: Vec<Specifier>,
        source: Option<usize>,
    },
    /// `export * from '…'` or `export * as ns from '…'`.
    ExportAll { alias: Option<usize>, source: usize },
    /// `export default …`.
    ExportDefault { value: DefaultValue },
    /// `export var|let|const|function|class …`.
    ExportDeclaration { declaration: Declaration },
}

/// One entry of an `import { … }` or `export { … }` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    /// Tokens of the entry, excluding the separating comma.
    pub range: Range<usize>,
    /// The name before `as` (imported name, or exported local).
    pub name: usize,
    /// The name after `as`, or `name` again.
    pub alias: usize,
    /// The comma following the entry.
    pub comma: Option<usize>,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Function {
        /// `function` or `async`.
        keyword: usize,
        name: Option<usize>,
    },
    Class {
        keyword: usize,
        name: Option<usize>,
        body_end: usize,
    },
    Expression {
        start: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Var {
        keyword: usize,
        names: Vec<usize>,
    },
    Function {
        keyword: usize,
        name: usize,
    },
    Class {
        keyword: usize,
        name: usize,
        body_end: usize,
    },
}

/// Finds every top-level module statement.
pub(crate) fn module_statements(view: &TokenView<'_>) -> Vec<ModuleStatement> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < view.len() {
        let token = &view.tokens[i];
        if token.flags.depth != 0 || token.is_comment() {
            i += 1;
            continue;
        }
        let next = view.next_sig(i).unwrap_or(i);
        let statement = if token.is_keyword(Keyword::Import)
            && !view.is_punct(next, Punct::LParen)
            && !view.is_punct(next, Punct::Dot)
        {
            import_statement(view, i)
        } else if token.is_keyword(Keyword::Export) {
            export_statement(view, i)
        } else {
            None
        };
        match statement {
            Some(statement) => {
                i = statement.range.end.max(i + 1);
                out.push(statement);
            }
            None => i += 1,
        }
    }
    out
}

fn import_statement(view: &TokenView<'_>, start: usize) -> Option<ModuleStatement> {
    let type_only = view.tokens[start].flags.in_type;
    let mut default = None;
    let mut namespace = None;
    let mut named = Vec::new();
    let mut braces = None;
    let mut j = view.next_sig(start)?;

    if type_only && is_type_modifier(view, j) {
        j = view.next_sig(j)?;
    }
    let source = loop {
        let token = view.get(j)?;
        match token.kind {
            TokenKind::String => break j,
            TokenKind::Punct(Punct::Comma) => {}
            TokenKind::Punct(Punct::Star) => {
                let alias = view.next_sig(j).and_then(|k| view.next_sig(k))?;
                namespace = Some(alias);
                j = alias;
            }
            TokenKind::Punct(Punct::LBrace) => {
                let close = token.matching()?;
                named = specifiers(view, j, close);
                braces = Some((j, close));
                j = close;
            }
            TokenKind::Name if view.text(j) == "from" && is_string(view, view.next_sig(j)) => {}
            TokenKind::Name | TokenKind::Keyword(_) => default = Some(j),
            _ => return None,
        }
        j = view.next_sig(j)?;
    };

    let end = statement_tail(view, source);
    Some(ModuleStatement {
        kind: StatementKind::Import {
            source,
            default,
            namespace,
            named,
            braces,
        },
        range: start..end,
        type_only,
    })
}

fn export_statement(view: &TokenView<'_>, start: usize) -> Option<ModuleStatement> {
    let mut next = view.next_sig(start)?;
    if view.is_keyword(next, Keyword::Abstract) {
        next = view.next_sig(next)?;
    }
    // `export default interface I {}`
    if view.is_keyword(next, Keyword::Default) && view.tokens[next].flags.in_type {
        next = view.next_sig(next)?;
    }
    let type_only = view.tokens[start].flags.in_type || view.tokens[next].flags.in_type;
    if type_only {
        // `export type …`, `export interface …`, `export declare …`.
        let end = match view.tokens[next].kind {
            TokenKind::Keyword(Keyword::Interface | Keyword::Declare) => type_block_end(view, next),
            _ => view.statement_end(start),
        };
        let kind = match view.next_sig(next) {
            Some(k) if view.is_punct(k, Punct::LBrace) || view.is_punct(k, Punct::Star) => {
                StatementKind::ExportNamed {
                    specifiers: Vec::new(),
                    source: None,
                }
            }
            _ => StatementKind::ExportDeclaration {
                declaration: Declaration::Var {
                    keyword: next,
                    names: Vec::new(),
                },
            },
        };
        return Some(ModuleStatement {
            kind,
            range: start..end,
            type_only,
        });
    }

    let token = view.tokens[next];
    let (kind, end) = match token.kind {
        TokenKind::Punct(Punct::LBrace) => {
            let close = token.matching()?;
            let specifiers = specifiers(view, next, close);
            let after = view.next_sig(close);
            let source = after
                .filter(|&k| view.is_name(k, "from"))
                .and_then(|k| view.next_sig(k))
                .filter(|&k| is_string(view, Some(k)));
            let end = statement_tail(view, source.unwrap_or(close));
            (StatementKind::ExportNamed { specifiers, source }, end)
        }
        TokenKind::Punct(Punct::Star) => {
            let mut k = view.next_sig(next)?;
            let mut alias = None;
            if view.is_keyword(k, Keyword::As) || view.is_name(k, "as") {
                alias = view.next_sig(k);
                k = view.next_sig(alias?)?;
            }
            let source = view.next_sig(k).filter(|&s| is_string(view, Some(s)))?;
            (StatementKind::ExportAll { alias, source }, statement_tail(view, source))
        }
        TokenKind::Keyword(Keyword::Default) => {
            let k = view.next_runtime(next)?;
            let value = default_value(view, k);
            let end = match &value {
                DefaultValue::Class { body_end, .. } => body_end + 1,
                DefaultValue::Function { keyword, .. } => function_end(view, *keyword)?,
                DefaultValue::Expression { .. } => view.statement_end(start),
            };
            (StatementKind::ExportDefault { value }, end)
        }
        TokenKind::Keyword(Keyword::Var | Keyword::Let | Keyword::Const) => {
            let names = declarator_names(view, next);
            (
                StatementKind::ExportDeclaration {
                    declaration: Declaration::Var {
                        keyword: next,
                        names,
                    },
                },
                view.statement_end(start),
            )
        }
        TokenKind::Keyword(Keyword::Function) => {
            let name = function_name(view, next)?;
            (
                StatementKind::ExportDeclaration {
                    declaration: Declaration::Function {
                        keyword: next,
                        name,
                    },
                },
                function_end(view, next)?,
            )
        }
        TokenKind::Name if is_async_function(view, next) => {
            let function = view.next_sig(next)?;
            let name = function_name(view, function)?;
            (
                StatementKind::ExportDeclaration {
                    declaration: Declaration::Function {
                        keyword: next,
                        name,
                    },
                },
                function_end(view, function)?,
            )
        }
        TokenKind::Keyword(Keyword::Class) => {
            let name = view.next_runtime(next).filter(|&k| view.tokens[k].is_name())?;
            let body_end = class_body_end(view, next)?;
            (
                StatementKind::ExportDeclaration {
                    declaration: Declaration::Class {
                        keyword: next,
                        name,
                        body_end,
                    },
                },
                body_end + 1,
            )
        }
        _ => return None,
    };
    Some(ModuleStatement {
        kind,
        range: start..end,
        type_only: false,
    })
}

fn default_value(view: &TokenView<'_>, k: usize) -> DefaultValue {
    let function = if view.is_keyword(k, Keyword::Function) {
        Some(k)
    } else if is_async_function(view, k) {
        view.next_sig(k)
    } else {
        None
    };
    if let Some(function) = function {
        return DefaultValue::Function {
            keyword: k,
            name: function_name(view, function),
        };
    }
    if view.is_keyword(k, Keyword::Class) {
        if let Some(body_end) = class_body_end(view, k) {
            let name = view
                .next_runtime(k)
                .filter(|&n| view.tokens[n].is_name() && !view.is_name(n, "extends"));
            return DefaultValue::Class {
                keyword: k,
                name,
                body_end,
            };
        }
    }
    DefaultValue::Expression { start: k }
}

fn specifiers(view: &TokenView<'_>, open: usize, close: usize) -> Vec<Specifier> {
    let depth = view.tokens[open].flags.depth + 1;
    let mut out = Vec::new();
    let mut start = open + 1;
    for j in open + 1..=close {
        let t = &view.tokens[j];
        let comma = t.flags.depth == depth && t.is_punct(Punct::Comma);
        if j != close && !comma {
            continue;
        }
        let parts: Vec<usize> = (start..j).filter(|&k| !view.tokens[k].is_comment()).collect();
        if let (Some(&first), Some(&last)) = (parts.first(), parts.last()) {
            let type_only = view.tokens[first].flags.in_type;
            let mut names = parts.as_slice();
            if names.len() > 1
                && is_type_modifier(view, first)
                && !(names.len() == 3 && view.text(names[1]) == "as")
            {
                names = &names[1..];
            }
            let name = names[0];
            let alias = names
                .iter()
                .position(|&k| view.text(k) == "as")
                .and_then(|p| names.get(p + 1))
                .copied()
                .unwrap_or(name);
            out.push(Specifier {
                range: first..last + 1,
                name,
                alias,
                comma: comma.then_some(j),
                type_only,
            });
        }
        start = j + 1;
    }
    out
}

fn declarator_names(view: &TokenView<'_>, keyword: usize) -> Vec<usize> {
    let depth = view.tokens[keyword].flags.depth;
    let end = view.statement_end(keyword);
    let mut names = Vec::new();
    let mut expect = true;
    for j in keyword + 1..end {
        let t = &view.tokens[j];
        if t.is_comment() || t.flags.in_type {
            continue;
        }
        if expect {
            names.extend(binding_pattern(view, j).bindings);
            expect = false;
        } else if t.flags.depth == depth && t.is_punct(Punct::Comma) {
            expect = true;
        }
    }
    names
}

fn function_name(view: &TokenView<'_>, function: usize) -> Option<usize> {
    let mut k = view.next_sig(function)?;
    if view.is_punct(k, Punct::Star) {
        k = view.next_sig(k)?;
    }
    view.tokens[k].is_name().then_some(k)
}

/// Index just past the body of the function introduced at `keyword`.
fn function_end(view: &TokenView<'_>, keyword: usize) -> Option<usize> {
    let open = (keyword..view.len()).find(|&k| view.is_punct(k, Punct::LParen))?;
    let close = view.tokens[open].matching()?;
    let body = view.next_runtime(close)?;
    let body_end = view.tokens[body].matching()?;
    Some(body_end + 1)
}

/// The closing brace of the class introduced at `keyword`.
pub(crate) fn class_body_end(view: &TokenView<'_>, keyword: usize) -> Option<usize> {
    let depth = view.tokens[keyword].flags.depth;
    let open = (keyword + 1..view.len()).find(|&k| {
        let t = &view.tokens[k];
        t.flags.depth == depth && t.flags.frame == FrameKind::ClassBody && t.is_punct(Punct::LBrace)
    })?;
    view.tokens[open].matching()
}

fn type_block_end(view: &TokenView<'_>, start: usize) -> usize {
    let depth = view.tokens[start].flags.depth;
    let brace = (start + 1..view.len()).find(|&k| {
        let t = &view.tokens[k];
        t.flags.depth == depth && t.is_punct(Punct::LBrace)
    });
    match brace.and_then(|b| view.tokens[b].matching()) {
        Some(close) if !view.tokens[start].is_keyword(Keyword::Declare) => close + 1,
        _ => view.statement_end(start),
    }
}

fn is_async_function(view: &TokenView<'_>, k: usize) -> bool {
    view.is_name(k, "async")
        && view.next_sig(k).is_some_and(|f| {
            view.is_keyword(f, Keyword::Function) && !view.tokens[f].flags.preceded_by_newline
        })
}

fn is_type_modifier(view: &TokenView<'_>, k: usize) -> bool {
    matches!(view.text(k), "type" | "typeof") && view.tokens[k].flags.in_type
}

fn is_string(view: &TokenView<'_>, k: Option<usize>) -> bool {
    k.and_then(|k| view.get(k))
        .is_some_and(|t| t.kind == TokenKind::String)
}

/// End of a statement whose last meaningful token is `last`: includes a
/// following `;` and any `with { … }` import attributes.
fn statement_tail(view: &TokenView<'_>, last: usize) -> usize {
    let mut end = last;
    if let Some(k) = view.next_sig(end) {
        if (view.is_name(k, "with") || view.is_name(k, "assert"))
            && !view.tokens[k].flags.preceded_by_newline
        {
            if let Some(close) = view.next_sig(k).and_then(|b| view.tokens[b].matching()) {
                end = close;
            }
        }
    }
    match view.next_sig(end) {
        Some(k) if view.is_punct(k, Punct::Semi) => k + 1,
        _ => end + 1,
    }
}
