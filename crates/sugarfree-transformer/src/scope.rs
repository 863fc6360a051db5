//! Lexical scopes, declarations, and what each identifier resolves to.
//!
//! The tracker walks the token stream once. Scopes open at function
//! parameter lists, arrow heads and block braces and close at their matching
//! bracket; an expression-bodied arrow closes at the first token that leaves
//! its expression. References are queued on the innermost open scope and
//! resolved when it closes, so hoisted declarations later in the same scope
//! still bind them; unresolved references move to the parent.

use crate::cursor::TokenView;
use crate::names::NameManager;
use crate::patterns::binding_pattern;
use crate::statements::{module_statements, ModuleStatement, StatementKind};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::ops::Range;
use sugarfree_lexer::{FrameKind, JsxToken, Keyword, Punct, Token, TokenKind};

/// Everything the modules need to know about names in one source.
#[derive(Debug, Default)]
pub struct Bindings {
    pub imports: Vec<ImportBinding>,
    pub statements: Vec<ModuleStatement>,
    pub scopes: Vec<Scope>,
    pub names: NameManager,
    /// Top-level value declarations other than imports, in source order.
    pub top_level: Vec<SmolStr>,
    /// Names declared only at the type level (`type`, `interface`, …).
    pub type_declarations: FxHashSet<SmolStr>,
    /// Identifier tokens that read an import at runtime.
    import_refs: FxHashMap<usize, usize>,
    /// Identifier tokens assigned to a top-level `var` or `let`.
    assignments: Vec<usize>,
}

impl Bindings {
    /// The import an identifier token reads at runtime, if any.
    pub fn import_ref(&self, token: usize) -> Option<&ImportBinding> {
        self.import_refs.get(&token).map(|&i| &self.imports[i])
    }

    /// Tokens that read imports at runtime, in source order.
    pub fn import_ref_tokens(&self) -> Vec<usize> {
        let mut tokens: Vec<usize> = self.import_refs.keys().copied().collect();
        tokens.sort_unstable();
        tokens
    }

    /// Tokens that assign to a top-level `var` or `let`, in source order.
    pub fn top_level_assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// The top-level declaration of `name`, if any.
    pub fn top_level_declaration(&self, name: &str) -> Option<&Declared> {
        self.scopes.first().and_then(|s| s.declarations.get(name))
    }

    /// The import bound to `name` at the top level.
    pub fn import_named(&self, name: &str) -> Option<&ImportBinding> {
        match self.top_level_declaration(name)?.kind {
            BindingKind::Import(i) => self.imports.get(i),
            _ => None,
        }
    }
}

/// One local name introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Index into [`Bindings::statements`].
    pub statement: usize,
    /// Module specifier without quotes.
    pub source: SmolStr,
    pub local: SmolStr,
    pub imported: Imported,
    /// Marked `type`/`typeof` in the source.
    pub explicit_type: bool,
    pub runtime_refs: u32,
    pub type_refs: u32,
}

impl ImportBinding {
    /// Explicitly type-marked, or only ever referenced from type positions.
    pub fn is_type_only(&self) -> bool {
        self.explicit_type || (self.runtime_refs == 0 && self.type_refs > 0)
    }

    /// Nothing reads the binding when the code runs.
    pub fn is_unused_at_runtime(&self) -> bool {
        self.explicit_type || self.runtime_refs == 0
    }
}

/// What an import binding refers to in the source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    Namespace,
    Named(SmolStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Lexical,
    Function,
    Class,
    Param,
    /// Index into [`Bindings::imports`].
    Import(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    pub token: usize,
    pub kind: BindingKind,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub declarations: FxHashMap<SmolStr, Declared>,
    /// Names read before their declaration in this scope.
    pub used_before_declaration: FxHashSet<SmolStr>,
}

/// Names the JSX transform reads implicitly for each element.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JsxNames<'a> {
    pub pragma: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// Builds [`Bindings`] for a tokenized source.
pub(crate) fn analyze(view: TokenView<'_>, jsx: JsxNames<'_>) -> Bindings {
    let statements = module_statements(&view);
    let mut walker = Walker::new(view, jsx, statements);
    walker.run();
    walker.finish()
}

#[derive(Debug, Clone, Copy)]
enum ScopeEnd {
    /// Closes once the walk passes this token.
    After(usize),
    /// An arrow's expression body at this depth.
    Expression(u16),
    Never,
}

#[derive(Debug)]
struct Open {
    scope: usize,
    end: ScopeEnd,
    refs: Vec<Reference>,
}

#[derive(Debug, Clone)]
struct Reference {
    name: SmolStr,
    token: usize,
    in_type: bool,
    /// Read on behalf of generated code; no token to rewrite.
    implicit: bool,
}

#[derive(Debug, Clone, Copy)]
struct DeclList {
    kind: BindingKind,
    depth: u16,
    expect: bool,
    scope: usize,
}

struct Walker<'a> {
    view: TokenView<'a>,
    jsx: JsxNames<'a>,
    statements: Vec<ModuleStatement>,
    imports: Vec<ImportBinding>,
    import_refs: FxHashMap<usize, usize>,
    scopes: Vec<Scope>,
    open: Vec<Open>,
    decls: Vec<DeclList>,
    /// Tokens that look like identifiers but are binding sites or keys.
    skip: FxHashSet<usize>,
    /// Brace tokens already claimed as a function or loop body.
    claimed: FxHashSet<usize>,
    /// A `function` keyword waiting for its parameter list.
    function: Option<FunctionIntro>,
    top_level: Vec<SmolStr>,
    type_declarations: FxHashSet<SmolStr>,
    assignments: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FunctionIntro {
    declaration: bool,
    /// The name of a function expression, bound inside its own scope.
    inner_name: Option<usize>,
}

impl<'a> Walker<'a> {
    fn new(view: TokenView<'a>, jsx: JsxNames<'a>, statements: Vec<ModuleStatement>) -> Self {
        let module = Scope {
            kind: ScopeKind::Module,
            declarations: FxHashMap::default(),
            used_before_declaration: FxHashSet::default(),
        };
        Self {
            view,
            jsx,
            statements,
            imports: Vec::new(),
            import_refs: FxHashMap::default(),
            scopes: vec![module],
            open: vec![Open {
                scope: 0,
                end: ScopeEnd::Never,
                refs: Vec::new(),
            }],
            decls: Vec::new(),
            skip: FxHashSet::default(),
            claimed: FxHashSet::default(),
            function: None,
            top_level: Vec::new(),
            type_declarations: FxHashSet::default(),
            assignments: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.declare_imports();

        // Statements whose tokens are handled up front rather than walked.
        let mut handled: Vec<(Range<usize>, Vec<usize>)> = Vec::new();
        for statement in &self.statements {
            match &statement.kind {
                StatementKind::Import { .. } => handled.push((statement.range.clone(), Vec::new())),
                StatementKind::ExportNamed { specifiers, source } if !statement.type_only => {
                    let reads = if source.is_none() {
                        specifiers
                            .iter()
                            .filter(|s| !s.type_only)
                            .map(|s| s.name)
                            .collect()
                    } else {
                        Vec::new()
                    };
                    handled.push((statement.range.clone(), reads));
                }
                StatementKind::ExportAll { .. } => {
                    handled.push((statement.range.clone(), Vec::new()))
                }
                _ => {}
            }
        }
        let mut handled = handled.into_iter().peekable();

        let mut i = 0;
        while i < self.view.len() {
            if let Some((range, reads)) = handled.next_if(|(r, _)| r.start == i) {
                for token in reads {
                    self.reference(token, false);
                }
                i = range.end;
                continue;
            }
            let token = self.view.tokens[i];
            if token.kind == TokenKind::Eof {
                break;
            }
            if !token.is_comment() {
                self.step(i, &token);
            }
            i += 1;
        }
    }

    fn declare_imports(&mut self) {
        for (index, statement) in self.statements.iter().enumerate() {
            let StatementKind::Import {
                source,
                default,
                namespace,
                named,
                ..
            } = &statement.kind
            else {
                continue;
            };
            let source = SmolStr::new(unquote(self.view.text(*source)));
            let mut bindings = Vec::new();
            if let Some(token) = default {
                bindings.push((*token, Imported::Default, false));
            }
            if let Some(token) = namespace {
                bindings.push((*token, Imported::Namespace, false));
            }
            for specifier in named {
                let name = SmolStr::new(unquote(self.view.text(specifier.name)));
                bindings.push((specifier.alias, Imported::Named(name), specifier.type_only));
            }
            for (token, imported, type_only) in bindings {
                let local = SmolStr::new(self.view.text(token));
                let import = self.imports.len();
                self.imports.push(ImportBinding {
                    statement: index,
                    source: source.clone(),
                    local: local.clone(),
                    imported,
                    explicit_type: statement.type_only || type_only,
                    runtime_refs: 0,
                    type_refs: 0,
                });
                self.scopes[0]
                    .declarations
                    .entry(local)
                    .or_insert(Declared {
                        token,
                        kind: BindingKind::Import(import),
                    });
            }
        }
    }

    fn step(&mut self, i: usize, token: &Token) {
        self.close_scopes(i, token);
        self.end_decl_lists(i, token);

        if token.flags.in_type {
            self.type_token(i, token);
            return;
        }

        let expecting = self.decls.last_mut().filter(|d| d.expect).map(|d| {
            d.expect = false;
            (d.kind, d.scope)
        });
        if let Some((kind, scope)) = expecting {
            let pattern = binding_pattern(&self.view, i);
            self.skip.extend(pattern.keys);
            for binding in pattern.bindings {
                self.declare(scope, binding, kind);
            }
        }

        match token.kind {
            TokenKind::Keyword(Keyword::Var) => self.begin_decl_list(token, BindingKind::Var),
            TokenKind::Keyword(Keyword::Let | Keyword::Const) => {
                self.begin_decl_list(token, BindingKind::Lexical)
            }
            TokenKind::Keyword(Keyword::Function) => {
                self.function = Some(FunctionIntro {
                    declaration: self.is_statement_start(i),
                    inner_name: None,
                });
            }
            TokenKind::Keyword(Keyword::Class) => self.class_keyword(i),
            TokenKind::Punct(Punct::LParen) => self.open_paren(i, token),
            TokenKind::Punct(Punct::LBrace) => {
                if token.flags.frame == FrameKind::Block && !self.claimed.contains(&i) {
                    if let Some(close) = token.matching() {
                        self.push_scope(ScopeKind::Block, ScopeEnd::After(close));
                    }
                }
            }
            TokenKind::Punct(Punct::Comma) => {
                if let Some(top) = self.decls.last_mut() {
                    if token.flags.depth == top.depth {
                        top.expect = true;
                    }
                }
            }
            TokenKind::Name => self.name(i, token),
            TokenKind::Jsx(JsxToken::TagOpen) => {
                if let Some(pragma) = self.jsx.pragma {
                    self.implicit_reference(i, pragma);
                }
                let fragment = self
                    .view
                    .next_sig(i)
                    .is_some_and(|n| self.view.tokens[n].kind == TokenKind::Jsx(JsxToken::TagEnd));
                if fragment {
                    if let Some(base) = self.jsx.fragment {
                        self.implicit_reference(i, base);
                    }
                }
            }
            _ => {}
        }
    }

    fn close_scopes(&mut self, i: usize, token: &Token) {
        while let Some(top) = self.open.last() {
            let done = match top.end {
                ScopeEnd::Never => false,
                ScopeEnd::After(end) => i > end,
                ScopeEnd::Expression(depth) => {
                    token.flags.depth < depth
                        || (token.flags.depth == depth
                            && (token.is_punct(Punct::Comma)
                                || token.is_punct(Punct::Semi)
                                || self.asi_break(i, token)))
                }
            };
            if !done {
                break;
            }
            self.close_top();
        }
    }

    fn asi_break(&self, i: usize, token: &Token) -> bool {
        token.flags.preceded_by_newline
            && matches!(token.kind, TokenKind::Name | TokenKind::Keyword(_))
            && self.view.prev_runtime(i).is_some_and(|p| self.view.ends_value(p))
    }

    fn end_decl_lists(&mut self, i: usize, token: &Token) {
        while let Some(top) = self.decls.last() {
            let depth = token.flags.depth;
            let done = depth < top.depth
                || (depth == top.depth
                    && !token.flags.in_type
                    && (token.is_punct(Punct::Semi)
                        || token.is_keyword(Keyword::In)
                        || token.is_name_text(self.view.source, "of")
                        || (!top.expect && self.asi_break(i, token))));
            if !done {
                break;
            }
            self.decls.pop();
        }
    }

    fn begin_decl_list(&mut self, token: &Token, kind: BindingKind) {
        let scope = match kind {
            BindingKind::Var => self.function_scope(),
            _ => self.current_scope(),
        };
        self.decls.push(DeclList {
            kind,
            depth: token.flags.depth,
            expect: true,
            scope,
        });
    }

    fn open_paren(&mut self, i: usize, token: &Token) {
        let function = self.function.take();
        let Some(close) = token.matching() else {
            return;
        };
        let view = self.view;
        let prev = view.prev_runtime(i);
        let is_prev = |k: Keyword| prev.is_some_and(|p| view.is_keyword(p, k));
        let after = view.next_runtime(close);
        let body = after.filter(|&a| view.is_punct(a, Punct::LBrace));

        if is_prev(Keyword::Catch) {
            let end = body.and_then(|b| self.claim(b)).unwrap_or(close);
            let scope = self.push_scope(ScopeKind::Block, ScopeEnd::After(end));
            self.begin_params(token, scope);
            return;
        }
        if is_prev(Keyword::For) {
            let end = body.and_then(|b| self.claim(b)).unwrap_or(close);
            self.push_scope(ScopeKind::Block, ScopeEnd::After(end));
            return;
        }
        let control = [Keyword::If, Keyword::While, Keyword::Switch, Keyword::With]
            .into_iter()
            .any(is_prev);
        if control {
            return;
        }

        let arrow = after.filter(|&a| view.is_punct(a, Punct::Arrow));
        let end = if let Some(arrow) = arrow {
            self.arrow_end(arrow, token.flags.depth)
        } else if let Some(body) = body {
            match self.claim(body) {
                Some(end) => ScopeEnd::After(end),
                None => return,
            }
        } else {
            return;
        };
        let scope = self.push_scope(ScopeKind::Function, end);
        if let Some(name) = function.and_then(|f| f.inner_name) {
            self.declare(scope, name, BindingKind::Function);
        }
        self.begin_params(token, scope);
    }

    fn arrow_end(&mut self, arrow: usize, depth: u16) -> ScopeEnd {
        match self.view.next_runtime(arrow) {
            Some(b) if self.view.is_punct(b, Punct::LBrace) => match self.claim(b) {
                Some(end) => ScopeEnd::After(end),
                None => ScopeEnd::Expression(depth),
            },
            _ => ScopeEnd::Expression(depth),
        }
    }

    fn claim(&mut self, brace: usize) -> Option<usize> {
        self.claimed.insert(brace);
        self.view.tokens[brace].matching()
    }

    fn begin_params(&mut self, paren: &Token, scope: usize) {
        self.decls.push(DeclList {
            kind: BindingKind::Param,
            depth: paren.flags.depth + 1,
            expect: true,
            scope,
        });
    }

    fn class_keyword(&mut self, i: usize) {
        let Some(name) = self.view.next_runtime(i) else {
            return;
        };
        if !self.view.tokens[name].is_name() || self.view.is_name(name, "extends") {
            return;
        }
        if self.is_statement_start(i) {
            let scope = self.current_scope();
            self.declare(scope, name, BindingKind::Class);
        } else {
            self.skip.insert(name);
        }
    }

    fn name(&mut self, i: usize, token: &Token) {
        if self.skip.contains(&i) {
            return;
        }
        let view = self.view;
        let prev = view.prev_runtime(i);
        let next = view.next_runtime(i);
        let prev_is = |p: Punct| prev.is_some_and(|k| view.is_punct(k, p));
        let next_is = |p: Punct| next.is_some_and(|k| view.is_punct(k, p));

        if prev_is(Punct::Dot) || prev_is(Punct::QuestionDot) {
            return;
        }

        // Function names.
        let after_function = prev.is_some_and(|p| {
            view.is_keyword(p, Keyword::Function)
                || (view.is_punct(p, Punct::Star)
                    && view
                        .prev_runtime(p)
                        .is_some_and(|f| view.is_keyword(f, Keyword::Function)))
        });
        if after_function && next_is(Punct::LParen) {
            if let Some(intro) = self.function {
                if intro.declaration {
                    let scope = self.current_scope();
                    self.declare(scope, i, BindingKind::Function);
                } else {
                    self.function = Some(FunctionIntro {
                        inner_name: Some(i),
                        ..intro
                    });
                    self.skip.insert(i);
                }
                return;
            }
        }

        if next_is(Punct::Arrow) {
            if let Some(arrow) = next {
                let end = self.arrow_end(arrow, token.flags.depth);
                let scope = self.push_scope(ScopeKind::Function, end);
                self.declare(scope, i, BindingKind::Param);
                return;
            }
        }

        match token.flags.frame {
            FrameKind::ClassBody if self.is_member_name(i, prev) => return,
            FrameKind::Object => {
                let list_start = prev.is_none() || prev_is(Punct::LBrace) || prev_is(Punct::Comma);
                let after_modifier = prev.is_some_and(|p| {
                    matches!(view.text(p), "get" | "set" | "async") || view.is_punct(p, Punct::Star)
                });
                if (list_start || after_modifier) && (next_is(Punct::Colon) || next_is(Punct::LParen))
                {
                    return;
                }
                let modifier = list_start
                    && matches!(view.text(i), "get" | "set" | "async")
                    && next.is_some_and(|n| {
                        view.tokens[n].is_identifier_like()
                            || view.is_punct(n, Punct::LBracket)
                            || view.is_punct(n, Punct::Star)
                    });
                if modifier {
                    return;
                }
            }
            FrameKind::JsxTag => {
                let tag_name = prev.is_some_and(|p| {
                    matches!(
                        view.tokens[p].kind,
                        TokenKind::Jsx(JsxToken::TagOpen | JsxToken::CloseTagOpen)
                    )
                });
                let component = view.text(i).starts_with(|c: char| c.is_ascii_uppercase())
                    || next_is(Punct::Dot);
                if !(tag_name && component) {
                    return;
                }
            }
            FrameKind::Module | FrameKind::Block if next_is(Punct::Colon) => {
                let label = prev.is_none()
                    || prev_is(Punct::Semi)
                    || prev_is(Punct::LBrace)
                    || prev_is(Punct::RBrace)
                    || token.flags.preceded_by_newline;
                if label {
                    return;
                }
            }
            _ => {}
        }
        if prev.is_some_and(|p| {
            view.is_keyword(p, Keyword::Break) || view.is_keyword(p, Keyword::Continue)
        }) {
            return;
        }
        self.reference(i, false);
    }

    /// Member names and modifiers directly inside a class body.
    fn is_member_name(&self, i: usize, prev: Option<usize>) -> bool {
        let view = &self.view;
        let Some(p) = prev else {
            return true;
        };
        let prev_token = &view.tokens[p];
        prev_token.is_punct(Punct::LBrace)
            || prev_token.is_punct(Punct::Semi)
            || prev_token.is_punct(Punct::RBrace)
            || prev_token.is_punct(Punct::Star)
            || prev_token.is_keyword(Keyword::Static)
            || matches!(view.text(p), "get" | "set" | "async" | "accessor")
            || (view.tokens[i].flags.preceded_by_newline && view.ends_value(p))
    }

    fn type_token(&mut self, i: usize, token: &Token) {
        if token.kind != TokenKind::Name {
            return;
        }
        let view = self.view;
        let prev = view.prev_sig(i);
        if prev.is_some_and(|p| view.is_punct(p, Punct::Dot)) {
            return;
        }
        let declares = prev.is_some_and(|p| {
            let t = &view.tokens[p];
            t.flags.in_type
                && (matches!(view.text(p), "type" | "interface")
                    || matches!(
                        t.kind,
                        TokenKind::Keyword(
                            Keyword::Class
                                | Keyword::Function
                                | Keyword::Var
                                | Keyword::Let
                                | Keyword::Const
                        )
                    ))
        });
        if declares {
            self.type_declarations.insert(SmolStr::new(view.text(i)));
            return;
        }
        let key = view.next_sig(i).is_some_and(|n| view.is_punct(n, Punct::Colon))
            && prev.is_some_and(|p| {
                view.is_punct(p, Punct::LBrace)
                    || view.is_punct(p, Punct::Comma)
                    || view.is_punct(p, Punct::Semi)
                    || view.is_punct(p, Punct::LBracePipe)
            });
        if !key {
            self.reference(i, true);
        }
    }

    fn is_statement_start(&self, i: usize) -> bool {
        let view = &self.view;
        let mut p = view.prev_runtime(i);
        if let Some(a) = p.filter(|&a| view.is_name(a, "async")) {
            p = view.prev_runtime(a);
        }
        let Some(p) = p else {
            return true;
        };
        let t = &view.tokens[p];
        t.is_punct(Punct::Semi)
            || t.is_punct(Punct::LBrace)
            || t.is_punct(Punct::RBrace)
            || t.is_keyword(Keyword::Export)
            || t.is_keyword(Keyword::Default)
            || (view.tokens[i].flags.preceded_by_newline && view.ends_value(p))
    }

    fn current_scope(&self) -> usize {
        self.open.last().map_or(0, |o| o.scope)
    }

    fn function_scope(&self) -> usize {
        self.open
            .iter()
            .rev()
            .map(|o| o.scope)
            .find(|&s| self.scopes[s].kind != ScopeKind::Block)
            .unwrap_or(0)
    }

    fn push_scope(&mut self, kind: ScopeKind, end: ScopeEnd) -> usize {
        let index = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            declarations: FxHashMap::default(),
            used_before_declaration: FxHashSet::default(),
        });
        self.open.push(Open {
            scope: index,
            end,
            refs: Vec::new(),
        });
        index
    }

    fn declare(&mut self, scope: usize, token: usize, kind: BindingKind) {
        self.skip.insert(token);
        let name = SmolStr::new(self.view.text(token));
        if scope == 0 && !self.top_level.contains(&name) {
            self.top_level.push(name.clone());
        }
        self.scopes[scope]
            .declarations
            .entry(name)
            .or_insert(Declared { token, kind });
    }

    fn reference(&mut self, token: usize, in_type: bool) {
        let name = SmolStr::new(self.view.text(token));
        self.queue(Reference {
            name,
            token,
            in_type,
            implicit: false,
        });
    }

    fn implicit_reference(&mut self, token: usize, name: &str) {
        self.queue(Reference {
            name: SmolStr::new(name),
            token,
            in_type: false,
            implicit: true,
        });
    }

    fn queue(&mut self, reference: Reference) {
        if let Some(top) = self.open.last_mut() {
            top.refs.push(reference);
        }
    }

    fn close_top(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        let mut unresolved = Vec::new();
        for reference in open.refs {
            let scope = &mut self.scopes[open.scope];
            let Some(declared) = scope.declarations.get(&reference.name).copied() else {
                unresolved.push(reference);
                continue;
            };
            if declared.token > reference.token && !matches!(declared.kind, BindingKind::Import(_))
            {
                scope.used_before_declaration.insert(reference.name.clone());
            }
            let assigned = open.scope == 0
                && !reference.in_type
                && !reference.implicit
                && matches!(declared.kind, BindingKind::Var | BindingKind::Lexical)
                && self
                    .view
                    .next_sig(reference.token)
                    .is_some_and(|n| is_assignment(self.view.tokens[n].kind));
            if assigned {
                self.assignments.push(reference.token);
            }
            if let BindingKind::Import(import) = declared.kind {
                let binding = &mut self.imports[import];
                if reference.in_type {
                    binding.type_refs += 1;
                } else {
                    binding.runtime_refs += 1;
                    if !reference.implicit {
                        self.import_refs.insert(reference.token, import);
                    }
                }
            }
        }
        if let Some(parent) = self.open.last_mut() {
            parent.refs.extend(unresolved);
        }
    }

    fn finish(mut self) -> Bindings {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.assignments.sort_unstable();
        let mut names = NameManager::new();
        for token in self.view.tokens {
            if token.is_identifier_like() {
                names.insert(token.text(self.view.source));
            }
        }
        Bindings {
            imports: self.imports,
            statements: self.statements,
            scopes: self.scopes,
            names,
            top_level: self.top_level,
            type_declarations: self.type_declarations,
            import_refs: self.import_refs,
            assignments: self.assignments,
        }
    }
}

fn is_assignment(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Punct(
            Punct::Eq
                | Punct::PlusEq
                | Punct::MinusEq
                | Punct::StarEq
                | Punct::SlashEq
                | Punct::PercentEq
                | Punct::StarStarEq
                | Punct::ShlEq
                | Punct::ShrEq
                | Punct::UShrEq
                | Punct::AmpEq
                | Punct::PipeEq
                | Punct::CaretEq
                | Punct::AmpAmpEq
                | Punct::PipePipeEq
                | Punct::QuestionQuestionEq
        )
    )
}

/// Strips the quotes from a string literal token.
pub(crate) fn unquote(text: &str) -> &str {
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sugarfree_lexer::{tokenize, Dialect};

    fn analyze_source(source: &str, dialect: Dialect) -> Bindings {
        let tokens = tokenize(source, dialect).unwrap();
        analyze(TokenView::new(source, &tokens), JsxNames::default())
    }

    fn refs(bindings: &Bindings, local: &str) -> (u32, u32) {
        let import = bindings
            .imports
            .iter()
            .find(|b| b.local == local)
            .unwrap();
        (import.runtime_refs, import.type_refs)
    }

    #[test]
    fn test_import_references_resolve() {
        let source = "import a, {b as c} from 'x';\nconst y = a(c.d);\nobj.a = {a: 1};";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "a"), (1, 0));
        assert_eq!(refs(&bindings, "c"), (1, 0));
        assert_eq!(bindings.imports[1].imported, Imported::Named("b".into()));
        assert_eq!(bindings.import_ref_tokens().len(), 2);
    }

    #[test]
    fn test_shadowing_hides_imports() {
        let source = "import a from 'x';
function f(a) { return a; }
const g = (a) => a;
const h = a => a;
try {} catch (a) { a; }
{ let a = 1; a; }
a;";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "a"), (1, 0));
    }

    #[test]
    fn test_var_hoists_to_function_scope() {
        let source = "import a from 'x';\nfunction f() { { var a = 1; } return a; }";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "a"), (0, 0));
    }

    #[test]
    fn test_type_positions_count_separately() {
        let source = "import {A, B} from './t';\nlet x: A = new B();\nlet y: B;";
        let bindings = analyze_source(source, Dialect::TS);
        assert_eq!(refs(&bindings, "A"), (0, 1));
        assert_eq!(refs(&bindings, "B"), (1, 1));
        assert!(bindings.imports[0].is_type_only());
        assert!(!bindings.imports[1].is_type_only());
    }

    #[test]
    fn test_keys_labels_and_members_are_not_references() {
        let source = "import a from 'x';
const o = {a: 1, a() {}, get a() { return 1; }};
class C { a = 1; a() {} static a; }
a: for (;;) { break a; }
o.a;";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "a"), (0, 0));
    }

    #[test]
    fn test_class_field_initializer_is_a_reference() {
        let source = "import helper from 'h';\nclass C { x = helper(); }";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "helper"), (1, 0));
    }

    #[test]
    fn test_shorthand_and_export_list_are_references() {
        let source = "import a from 'x';\nconst o = {a};\nexport {a as b};";
        let bindings = analyze_source(source, Dialect::JS);
        assert_eq!(refs(&bindings, "a"), (2, 0));
    }

    #[test]
    fn test_jsx_component_names() {
        let source = "import Foo from './foo';\nimport div from './div';\nx = <Foo div={1}><div /></Foo>;";
        let bindings = analyze_source(source, Dialect::JSX);
        assert_eq!(refs(&bindings, "Foo"), (2, 0));
        assert_eq!(refs(&bindings, "div"), (0, 0));
    }

    #[test]
    fn test_jsx_pragma_is_an_implicit_reference() {
        let source = "import React from 'react';\nx = <div />;";
        let tokens = tokenize(source, Dialect::JSX).unwrap();
        let jsx = JsxNames {
            pragma: Some("React"),
            fragment: Some("React"),
        };
        let bindings = analyze(TokenView::new(source, &tokens), jsx);
        assert_eq!(refs(&bindings, "React"), (1, 0));
        assert!(bindings.import_ref_tokens().is_empty());
    }

    #[test]
    fn test_top_level_declarations() {
        let source = "import x from 'x';
const a = 1, {b} = c;
function f(p) { var inner; }
class K {}
let [d] = e;
type T = number;";
        let bindings = analyze_source(source, Dialect::TS);
        assert_eq!(bindings.top_level, ["a", "b", "f", "K", "d"]);
        assert!(bindings.type_declarations.contains("T"));
    }

    #[test]
    fn test_used_before_declaration() {
        let source = "f(); function f() {}\nlet y = z; var z = 1;";
        let bindings = analyze_source(source, Dialect::JS);
        let module = &bindings.scopes[0];
        assert!(module.used_before_declaration.contains("f"));
        assert!(module.used_before_declaration.contains("z"));
        assert!(!module.used_before_declaration.contains("y"));
    }

    #[test]
    fn test_top_level_assignments() {
        let source = "let a = 1; const b = 2;\nfunction f(a) { a = 3; }\na = 4; a == 5; b = 6;";
        let tokens = tokenize(source, Dialect::JS).unwrap();
        let bindings = analyze(TokenView::new(source, &tokens), JsxNames::default());
        let assigned: Vec<&str> = bindings
            .top_level_assignments()
            .iter()
            .map(|&t| tokens[t].text(source))
            .collect();
        assert_eq!(assigned, ["a"]);
        let token = bindings.top_level_assignments()[0];
        assert_eq!(tokens[token].span.start_usize(), source.find("a = 4").unwrap());
    }

    #[test]
    fn test_names_are_reserved() {
        let mut bindings = analyze_source("const _d = 1; let x: Foo;", Dialect::TS);
        assert_eq!(bindings.names.claim("_d"), "_d2");
        assert_eq!(bindings.names.claim("Foo"), "Foo2");
    }
}
