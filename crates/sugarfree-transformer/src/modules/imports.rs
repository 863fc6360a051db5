//! ES module syntax to CommonJS.
//!
//! Import statements become `require` calls bound to one interop variable
//! per source module; reads of imported names become member accesses on it.
//! Export statements become assignments to `exports`.

use super::types::export_is_type;
use super::{Context, ModuleKind, ModuleOutput};
use crate::cursor::TokenView;
use crate::names::NameManager;
use crate::options::Transform;
use crate::scope::{unquote, BindingKind, Bindings, ImportBinding, Imported};
use crate::statements::{Declaration, DefaultValue, StatementKind};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt::Write;
use sugarfree_lexer::{FrameKind, Keyword, Punct, TemplatePart, TokenKind};

const USE_STRICT: &str = "\"use strict\";";
const ES_MODULE: &str = "Object.defineProperty(exports, \"__esModule\", {value: true});";

/// Interop variables claimed for one source module.
#[derive(Debug, Clone, Default)]
struct ModuleVars {
    require: SmolStr,
    default: Option<SmolStr>,
    required: bool,
}

/// Names and replacement text for every module statement, decided before
/// any module emits edits so the JSX transform can use the same accesses.
#[derive(Debug, Default)]
pub(crate) struct ImportPlan {
    modules: FxHashMap<SmolStr, ModuleVars>,
    /// Local import name to the expression that reads it.
    access: FxHashMap<SmolStr, String>,
    /// Replacement text per statement index; empty means delete.
    statements: FxHashMap<usize, String>,
    default_helper: Option<SmolStr>,
    wildcard_helper: Option<SmolStr>,
    /// `exports.x = x;` for hoisted function declarations.
    hoisted: Vec<String>,
    /// Assignments that must run after every declaration.
    deferred: Vec<String>,
    has_exports: bool,
}

impl ImportPlan {
    /// The expression that reads the import bound to `local`, if it changes.
    pub fn access(&self, local: &str) -> Option<&str> {
        self.access.get(local).map(String::as_str)
    }

    pub fn build(
        bindings: &Bindings,
        view: TokenView<'_>,
        typescript: bool,
        names: &mut NameManager,
    ) -> Self {
        let mut builder = PlanBuilder {
            bindings,
            view,
            typescript,
            names,
            plan: ImportPlan::default(),
        };
        builder.run();
        builder.plan
    }
}

struct PlanBuilder<'a, 'n> {
    bindings: &'a Bindings,
    view: TokenView<'a>,
    typescript: bool,
    names: &'n mut NameManager,
    plan: ImportPlan,
}

impl PlanBuilder<'_, '_> {
    fn run(&mut self) {
        let bindings = self.bindings;
        for (index, statement) in bindings.statements.iter().enumerate() {
            if statement.type_only {
                continue;
            }
            let text = match &statement.kind {
                StatementKind::Import { source, .. } => {
                    self.import(index, unquote(self.view.text(*source)))
                }
                StatementKind::ExportNamed { specifiers, source } => {
                    self.plan.has_exports = true;
                    match source {
                        Some(source) => {
                            let source = unquote(self.view.text(*source));
                            let mut text = self.require(source);
                            for s in specifiers.iter().filter(|s| !s.type_only) {
                                let name = unquote(self.view.text(s.name));
                                let exported = unquote(self.view.text(s.alias));
                                let access = if name == "default" {
                                    format!("{}.default", self.default_var(source, &mut text))
                                } else {
                                    member(&self.vars(source).require, name)
                                };
                                push(&mut text, &format!(
                                    "Object.defineProperty(exports, '{exported}', {{enumerable: true, get: function () {{ return {access}; }}}});"
                                ));
                            }
                            text
                        }
                        None => {
                            let mut text = String::new();
                            for s in specifiers.iter().filter(|s| !s.type_only) {
                                let local = self.view.text(s.name);
                                if export_is_type(bindings, local) {
                                    continue;
                                }
                                let exported = unquote(self.view.text(s.alias));
                                self.export_local(&mut text, statement.range.start, exported, local);
                            }
                            text
                        }
                    }
                }
                StatementKind::ExportAll { alias, source } => {
                    self.plan.has_exports = true;
                    let source = unquote(self.view.text(*source));
                    let mut text = self.require(source);
                    let require = self.vars(source).require.clone();
                    match alias {
                        Some(alias) => {
                            let helper = self.wildcard_helper();
                            let exported = self.view.text(*alias);
                            push(&mut text, &format!("exports.{exported} = {helper}({require});"));
                        }
                        None => push(&mut text, &format!(
                            "Object.keys({require}).forEach(function (key) {{ if (key === \"default\" || key === \"__esModule\") return; Object.defineProperty(exports, key, {{enumerable: true, get: function () {{ return {require}[key]; }}}}); }});"
                        )),
                    }
                    text
                }
                StatementKind::ExportDefault { value } => {
                    self.plan.has_exports = true;
                    if let DefaultValue::Function { name: Some(name), .. } = value {
                        let name = self.view.text(*name);
                        self.plan.hoisted.push(format!("exports.default = {name};"));
                    }
                    continue;
                }
                StatementKind::ExportDeclaration { declaration } => {
                    self.plan.has_exports = true;
                    if let Declaration::Function { name, .. } = declaration {
                        let name = self.view.text(*name);
                        self.plan.hoisted.push(format!("exports.{name} = {name};"));
                    }
                    continue;
                }
            };
            self.plan.statements.insert(index, text);
        }
    }

    fn import(&mut self, index: usize, source: &str) -> String {
        let bindings = self.bindings;
        let kept: Vec<&ImportBinding> = bindings
            .imports
            .iter()
            .filter(|b| b.statement == index)
            .filter(|b| !(b.is_type_only() || (self.typescript && b.is_unused_at_runtime())))
            .collect();
        let had_bindings = bindings.imports.iter().any(|b| b.statement == index);
        if had_bindings && kept.is_empty() {
            return String::new();
        }
        if !had_bindings {
            // Side-effect import.
            let vars = self.vars(source);
            if vars.required {
                return String::new();
            }
            return format!("require({});", quote(source));
        }

        let mut text = self.require(source);
        for binding in kept {
            match &binding.imported {
                Imported::Default => {
                    let var = self.default_var(source, &mut text);
                    self.plan
                        .access
                        .insert(binding.local.clone(), format!("{var}.default"));
                }
                Imported::Namespace => {
                    let helper = self.wildcard_helper();
                    let require = self.vars(source).require.clone();
                    push(&mut text, &format!("var {} = {helper}({require});", binding.local));
                }
                Imported::Named(name) => {
                    let access = member(&self.vars(source).require, name);
                    self.plan.access.insert(binding.local.clone(), access);
                }
            }
        }
        text
    }

    fn vars(&mut self, source: &str) -> &mut ModuleVars {
        let names = &mut *self.names;
        self.plan
            .modules
            .entry(SmolStr::new(source))
            .or_insert_with(|| ModuleVars {
                require: names.claim_for_path(source),
                default: None,
                required: false,
            })
    }

    /// `var _x = require('x');` the first time `source` is needed.
    fn require(&mut self, source: &str) -> String {
        let vars = self.vars(source);
        if vars.required {
            return String::new();
        }
        vars.required = true;
        format!("var {} = require({});", vars.require, quote(source))
    }

    /// The interop default variable for `source`, declaring it into `text`
    /// on first use.
    fn default_var(&mut self, source: &str, text: &mut String) -> SmolStr {
        if let Some(var) = self.vars(source).default.clone() {
            return var;
        }
        let helper = self.default_helper();
        let var = self.names.claim_for_path(source);
        let vars = self.vars(source);
        vars.default = Some(var.clone());
        let require = vars.require.clone();
        push(text, &format!("var {var} = {helper}({require});"));
        var
    }

    fn default_helper(&mut self) -> SmolStr {
        let names = &mut *self.names;
        self.plan
            .default_helper
            .get_or_insert_with(|| names.claim("_interopRequireDefault"))
            .clone()
    }

    fn wildcard_helper(&mut self) -> SmolStr {
        let names = &mut *self.names;
        self.plan
            .wildcard_helper
            .get_or_insert_with(|| names.claim("_interopRequireWildcard"))
            .clone()
    }

    /// `exports.exported = local;`, placed where `local` is initialized.
    fn export_local(&mut self, text: &mut String, at: usize, exported: &str, local: &str) {
        let value = self
            .plan
            .access(local)
            .map_or_else(|| local.to_string(), str::to_string);
        let assignment = format!("exports.{exported} = {value};");
        let bindings = self.bindings;
        match bindings.top_level_declaration(local) {
            Some(declared) if declared.token > at => match declared.kind {
                BindingKind::Function => self.plan.hoisted.push(assignment),
                _ => self.plan.deferred.push(assignment),
            },
            _ => push(text, &assignment),
        }
    }
}

fn push(text: &mut String, part: &str) {
    if part.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(part);
}

/// `'source'`, keeping the original escapes.
fn quote(source: &str) -> String {
    if source.contains('\'') && !source.contains("\\'") {
        format!("\"{source}\"")
    } else {
        format!("'{source}'")
    }
}

fn member(object: &str, name: &str) -> String {
    let identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", serde_json::Value::from(name))
    }
}

/// Emits the edits planned for module statements and import reads.
pub(crate) fn run(cx: &Context<'_>) -> ModuleOutput {
    let mut out = ModuleOutput::new(ModuleKind::Imports);
    let Some(plan) = cx.plan else {
        return out;
    };
    let view = cx.view;
    let bindings = cx.bindings;

    let mut owned = Vec::new();
    for (index, statement) in bindings.statements.iter().enumerate() {
        if statement.type_only {
            continue;
        }
        if let Some(text) = plan.statements.get(&index) {
            if text.is_empty() {
                out.edits.delete(statement.range.clone());
            } else {
                out.edits.replace(statement.range.clone(), text.clone());
            }
            owned.push(statement.range.clone());
            continue;
        }
        let export = statement.range.start;
        match &statement.kind {
            StatementKind::ExportDefault { value } => {
                let default = view.next_sig(export).unwrap_or(export);
                match value {
                    DefaultValue::Function {
                        keyword,
                        name: Some(_),
                    } => out.edits.replace(export..keyword + 1, view.text(*keyword)),
                    DefaultValue::Class {
                        keyword,
                        name: Some(name),
                        body_end,
                    } => {
                        out.edits.replace(export..keyword + 1, view.text(*keyword));
                        let name = view.text(*name);
                        out.edits
                            .insert_after(*body_end, format!(" exports.default = {name};"));
                    }
                    _ => out.edits.replace(export..default + 1, "exports.default ="),
                }
            }
            StatementKind::ExportDeclaration { declaration } => {
                match view.next_sig(export) {
                    Some(next) if !view.tokens[next].flags.in_type => {
                        out.edits.replace(export..next + 1, view.text(next))
                    }
                    _ => out.edits.delete(export..export + 1),
                }
                match declaration {
                    Declaration::Var { names, .. } => {
                        let last = statement.range.end - 1;
                        let terminated = view.is_punct(last, Punct::Semi);
                        let mut text = String::from(if terminated { "" } else { ";" });
                        for &name in names {
                            let name = view.text(name);
                            let _ = write!(text, " exports.{name} = {name};");
                        }
                        if !names.is_empty() {
                            out.edits.insert_after(last, text);
                        }
                    }
                    Declaration::Class { name, body_end, .. } => {
                        let name = view.text(*name);
                        out.edits
                            .insert_after(*body_end, format!(" exports.{name} = {name};"));
                    }
                    Declaration::Function { .. } => {}
                }
            }
            _ => {}
        }
    }

    // Exported `var` and `let` bindings stay live.
    let mut exported: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for statement in bindings.statements.iter().filter(|s| !s.type_only) {
        match &statement.kind {
            StatementKind::ExportDeclaration {
                declaration: Declaration::Var { keyword, names },
            } if !view.is_keyword(*keyword, Keyword::Const) => {
                for &name in names {
                    let name = view.text(name);
                    exported.entry(name).or_default().push(name);
                }
            }
            StatementKind::ExportNamed {
                specifiers,
                source: None,
            } => {
                for s in specifiers.iter().filter(|s| !s.type_only) {
                    let alias = unquote(view.text(s.alias));
                    exported.entry(view.text(s.name)).or_default().push(alias);
                }
            }
            _ => {}
        }
    }
    for &token in bindings.top_level_assignments() {
        if owned.iter().any(|r| r.contains(&token)) {
            continue;
        }
        let name = view.text(token);
        let Some(aliases) = exported.get(name) else {
            continue;
        };
        let mut text = String::new();
        for alias in aliases {
            let _ = write!(text, "exports.{alias} = ");
        }
        text.push_str(name);
        out.edits.replace_token(token, text);
    }

    let jsx = cx.has(Transform::Jsx);
    for token in bindings.import_ref_tokens() {
        if owned.iter().any(|r| r.contains(&token)) {
            continue;
        }
        if jsx && view.tokens[token].flags.in_jsx_tag {
            continue;
        }
        let Some(binding) = bindings.import_ref(token) else {
            continue;
        };
        let Some(access) = plan.access(&binding.local) else {
            continue;
        };
        out.edits.replace_token(token, rewrite(view, token, access));
    }

    out.prefix = prefix(plan);
    if !plan.deferred.is_empty() {
        out.suffix = format!("\n{}", plan.deferred.join(" "));
    }
    out
}

/// The text replacing one read of an import.
fn rewrite(view: TokenView<'_>, token: usize, access: &str) -> String {
    let t = &view.tokens[token];
    let prev = view.prev_runtime(token);
    let next = view.next_runtime(token);
    let prev_is = |p: Punct| prev.is_some_and(|k| view.is_punct(k, p));
    let next_is = |p: Punct| next.is_some_and(|k| view.is_punct(k, p));

    let shorthand = t.flags.frame == FrameKind::Object
        && (prev_is(Punct::LBrace) || prev_is(Punct::Comma))
        && (next_is(Punct::RBrace) || next_is(Punct::Comma));
    if shorthand {
        return format!("{}: {access}", view.text(token));
    }
    let called = next_is(Punct::LParen)
        || next.is_some_and(|n| {
            matches!(
                view.tokens[n].kind,
                TokenKind::Template(TemplatePart::NoSubstitution | TemplatePart::Head)
            )
        });
    let constructed = prev.is_some_and(|p| view.is_keyword(p, Keyword::New));
    if called && !constructed {
        format!("(0, {access})")
    } else {
        access.to_string()
    }
}

fn prefix(plan: &ImportPlan) -> String {
    let mut prefix = String::from(USE_STRICT);
    if plan.has_exports {
        prefix.push_str(ES_MODULE);
    }
    if let Some(helper) = &plan.default_helper {
        let _ = write!(
            prefix,
            " function {helper}(obj) {{ return obj && obj.__esModule ? obj : {{ default: obj }}; }}"
        );
    }
    if let Some(helper) = &plan.wildcard_helper {
        let _ = write!(
            prefix,
            " function {helper}(obj) {{ if (obj && obj.__esModule) {{ return obj; }} else {{ var newObj = {{}}; if (obj != null) {{ for (var key in obj) {{ if (Object.prototype.hasOwnProperty.call(obj, key)) {{ newObj[key] = obj[key]; }} }} }} newObj.default = obj; return newObj; }} }}"
        );
    }
    for hoisted in &plan.hoisted {
        prefix.push(' ');
        prefix.push_str(hoisted);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_member_access() {
        assert_eq!(member("_h", "f"), "_h.f");
        assert_eq!(member("_h", "default"), "_h.default");
        assert_eq!(member("_h", "a-b"), "_h[\"a-b\"]");
    }

    #[test]
    fn test_quote_keeps_single_quotes() {
        assert_eq!(quote("./a"), "'./a'");
        assert_eq!(quote("it's"), "\"it's\"");
    }
}
