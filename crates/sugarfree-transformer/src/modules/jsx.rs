//! JSX lowering to classic-runtime factory calls.
//!
//! `<div a="b" {...c}>text {d}</div>` becomes
//! `React.createElement('div', {a: "b", ...c,}, "text ", d)`. Every edit
//! touches only tag syntax, so expressions inside the element keep their
//! lines and stay available to other modules.

use super::{Context, ModuleKind, ModuleOutput};
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use sugarfree_lexer::{JsxToken, Punct, TokenKind};

pub(crate) fn run(cx: &Context<'_>) -> ModuleOutput {
    let mut lowering = Lowering {
        cx,
        out: ModuleOutput::new(ModuleKind::Jsx),
        handled: FxHashSet::default(),
        factory: with_import_access(cx, &cx.options.jsx_pragma),
        fragment: with_import_access(cx, &cx.options.jsx_fragment_pragma),
    };
    for i in 0..cx.view.len() {
        if cx.view.tokens[i].kind == TokenKind::Jsx(JsxToken::TagOpen)
            && !lowering.handled.contains(&i)
        {
            lowering.element(i, "");
        }
    }
    tracing::trace!(elements = lowering.handled.len(), "jsx lowered");
    lowering.out
}

/// `React.createElement` with `React` replaced by its import access.
fn with_import_access(cx: &Context<'_>, pragma: &str) -> String {
    let (base, rest) = pragma.find('.').map_or((pragma, ""), |i| pragma.split_at(i));
    match cx.plan.and_then(|plan| plan.access(base)) {
        Some(access) => format!("{access}{rest}"),
        None => pragma.to_string(),
    }
}

struct Lowering<'c, 'a> {
    cx: &'c Context<'a>,
    out: ModuleOutput,
    /// Tag openers already lowered as children of another element.
    handled: FxHashSet<usize>,
    factory: String,
    fragment: String,
}

impl Lowering<'_, '_> {
    /// Lowers the element opened at `open` and returns its last token.
    fn element(&mut self, open: usize, lead: &str) -> usize {
        self.handled.insert(open);
        let view = self.cx.view;
        let Some(end) = view.tokens[open].matching() else {
            return open;
        };
        let Some(name_start) = view.next_sig(open).filter(|&n| n < end) else {
            // `<>` fragment.
            let head = format!("{lead}{}({}, null", self.factory, self.fragment);
            self.out.edits.replace(open..end + 1, head);
            return self.close(end);
        };

        let (name_end, tag) = self.tag_name(name_start);
        let has_props = self.attributes(name_end + 1, end);
        let props = if has_props { ", {" } else { ", null" };
        let head = format!("{lead}{}({tag}{props}", self.factory);
        self.out.edits.replace(open..name_end + 1, head);

        if view.tokens[end].kind == TokenKind::Jsx(JsxToken::SelfClose) {
            let tail = if has_props { "})" } else { ")" };
            self.out.edits.replace_token(end, tail);
            return end;
        }
        if has_props {
            self.out.edits.replace_token(end, "}");
        } else {
            self.out.edits.delete(end..end + 1);
        }
        self.close(end)
    }

    /// Lowers the children after the opening tag's `>` and the closing tag.
    fn close(&mut self, tag_end: usize) -> usize {
        let view = self.cx.view;
        let depth = view.tokens[tag_end].flags.depth;
        let mut j = tag_end + 1;
        while j < view.len() {
            let token = &view.tokens[j];
            match token.kind {
                TokenKind::Jsx(JsxToken::CloseTagOpen) if token.flags.depth == depth => {
                    let last = token.matching().unwrap_or(j);
                    self.out.edits.replace(j..last + 1, ")");
                    return last;
                }
                TokenKind::Jsx(JsxToken::Text) => {
                    let text = clean_text(view.text(j));
                    if text.is_empty() {
                        self.out.edits.delete(j..j + 1);
                    } else {
                        let literal = js_string(&decode_entities(&text));
                        self.out.edits.replace_token(j, format!(", {literal}"));
                    }
                    j += 1;
                }
                TokenKind::Jsx(JsxToken::TagOpen) => j = self.element(j, ", ") + 1,
                TokenKind::Punct(Punct::LBrace) => {
                    let close = token.matching().unwrap_or(j);
                    let empty = (j + 1..close).all(|k| view.tokens[k].is_comment());
                    if empty {
                        self.out.edits.delete(j..close + 1);
                    } else {
                        self.out.edits.replace_token(j, ", ");
                        self.out.edits.delete(close..close + 1);
                    }
                    j = close + 1;
                }
                _ => j += 1,
            }
        }
        j
    }

    /// Reads the tag name starting at `start`. Returns its last token and
    /// the expression or string naming the element.
    fn tag_name(&self, start: usize) -> (usize, String) {
        let view = self.cx.view;
        let name = view.text(start);
        if let Some(colon) = view.next_sig(start).filter(|&c| view.is_punct(c, Punct::Colon)) {
            if let Some(local) = view.next_sig(colon).filter(|&n| view.tokens[n].is_name()) {
                return (local, format!("'{name}:{}'", view.text(local)));
            }
        }
        let mut end = start;
        while let Some(dot) = view.next_sig(end).filter(|&d| view.is_punct(d, Punct::Dot)) {
            match view.next_sig(dot).filter(|&n| view.tokens[n].is_name()) {
                Some(property) => end = property,
                None => break,
            }
        }
        if end == start && is_intrinsic(name) {
            return (end, format!("'{name}'"));
        }
        let head = self.reference(start);
        let rest = &view.source[view.tokens[start].span.end_usize()..view.tokens[end].span.end_usize()];
        (end, format!("{head}{rest}"))
    }

    /// A component reference, through its import access if it has one.
    fn reference(&self, token: usize) -> String {
        let cx = self.cx;
        let access = cx.plan.zip(cx.bindings.import_ref(token)).and_then(|(plan, binding)| plan.access(&binding.local));
        access.map_or_else(|| cx.view.text(token).to_string(), str::to_string)
    }

    /// Rewrites attributes in `start..end` into object properties. Returns
    /// whether there were any.
    fn attributes(&mut self, start: usize, end: usize) -> bool {
        let view = self.cx.view;
        let mut any = false;
        let mut k = start;
        while k < end {
            let token = &view.tokens[k];
            match token.kind {
                TokenKind::Punct(Punct::LBrace) => {
                    // `{...spread}`
                    let close = token.matching().unwrap_or(k);
                    self.out.edits.delete(k..k + 1);
                    self.out.edits.replace_token(close, ",");
                    any = true;
                    k = close + 1;
                }
                TokenKind::Name => {
                    any = true;
                    let mut name_end = k;
                    if let Some(colon) = view.next_sig(k).filter(|&c| view.is_punct(c, Punct::Colon)) {
                        if let Some(local) = view.next_sig(colon).filter(|&n| view.tokens[n].is_name()) {
                            name_end = local;
                        }
                    }
                    let name = &view.source[token.span.start_usize()..view.tokens[name_end].span.end_usize()];
                    let key = property_key(name);
                    let Some(eq) = view.next_sig(name_end).filter(|&e| view.is_punct(e, Punct::Eq)) else {
                        self.out.edits.replace(k..name_end + 1, format!("{key}: true,"));
                        k = name_end + 1;
                        continue;
                    };
                    let Some(value) = view.next_sig(eq) else {
                        break;
                    };
                    match view.tokens[value].kind {
                        TokenKind::String => {
                            let literal = attribute_string(view.text(value));
                            self.out.edits.replace(k..value + 1, format!("{key}: {literal},"));
                            k = value + 1;
                        }
                        TokenKind::Punct(Punct::LBrace) => {
                            let close = view.tokens[value].matching().unwrap_or(value);
                            self.out.edits.replace(k..value + 1, format!("{key}: "));
                            self.out.edits.replace_token(close, ",");
                            k = close + 1;
                        }
                        _ => k = value + 1,
                    }
                }
                _ => k += 1,
            }
        }
        any
    }
}

/// Lowercase and dashed names are host elements.
fn is_intrinsic(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase()) || name.contains('-')
}

fn property_key(name: &str) -> Cow<'_, str> {
    if name.contains(['-', ':']) {
        Cow::Owned(format!("'{name}'"))
    } else {
        Cow::Borrowed(name)
    }
}

fn js_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// A JSX attribute string as a JS string literal. Line breaks and the
/// indentation after them collapse to one space.
fn attribute_string(raw: &str) -> String {
    let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
    let mut collapsed = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            collapsed.push(' ');
        } else {
            collapsed.push(c);
        }
    }
    js_string(&decode_entities(&collapsed))
}

/// Applies the JSX text whitespace rules: lines are trimmed, lines holding
/// only whitespace are dropped, and the rest are joined by one space.
fn clean_text(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let last_non_empty = lines
        .iter()
        .rposition(|l| l.chars().any(|c| c != ' ' && c != '\t'));
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.replace('\t', " ");
        let mut trimmed = line.as_str();
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ');
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches(' ');
        }
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        if Some(i) != last_non_empty {
            out.push(' ');
        }
    }
    out
}

const ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("laquo", '\u{ab}'),
    ("raquo", '\u{bb}'),
    ("bull", '\u{2022}'),
    ("middot", '\u{b7}'),
    ("times", '\u{d7}'),
    ("divide", '\u{f7}'),
    ("deg", '\u{b0}'),
    ("plusmn", '\u{b1}'),
    ("para", '\u{b6}'),
    ("sect", '\u{a7}'),
    ("cent", '\u{a2}'),
    ("pound", '\u{a3}'),
    ("yen", '\u{a5}'),
    ("euro", '\u{20ac}'),
    ("larr", '\u{2190}'),
    ("rarr", '\u{2192}'),
    ("uarr", '\u{2191}'),
    ("darr", '\u{2193}'),
];

/// Decodes HTML character references. Unknown ones are left alone.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .get(1..rest.len().min(12))
            .and_then(|window| window.find(';'))
            .and_then(|semi| Some((entity(&rest[1..semi + 1])?, semi + 2)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }
    ENTITIES.iter().find(|(n, _)| *n == name).map(|&(_, c)| c)
}
