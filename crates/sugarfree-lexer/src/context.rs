//! Context tracking.
//!
//! The tracker owns the bracket stack and classifies each token as it
//! arrives: which frame a brace opens, whether `:` starts an annotation,
//! whether `<` opens JSX or a generic group, where type regions begin and
//! end. Decisions that need one token of lookahead are parked in
//! [`Pending`] and resolved, sometimes retroactively, when the next
//! significant token is observed.

use crate::dialect::Dialect;
use crate::error::TokenizeError;
use crate::scan;
use crate::token::{FrameKind, JsxToken, Keyword, Punct, TemplatePart, Token, TokenKind};
use crate::types::{Origin, Step, TypeScanner};

/// What kind of parenthesis a `(` opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParenRole {
    /// `if (`, `while (`, `for (`, … The `)` is followed by a statement.
    Control,
    /// A call or grouping.
    Call,
    /// Declared function or method parameters.
    Params,
    /// Constructor parameters, where TS parameter properties may appear.
    ConstructorParams,
    /// Could be arrow function parameters.
    MaybeArrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DeclState {
    #[default]
    None,
    /// Between `let` and `=`, or after a `,` in a declaration list.
    Binding,
    Initializer,
}

/// A class member being read.
#[derive(Debug, Clone, Copy)]
struct Member {
    start: usize,
    only_modifiers: bool,
    name_seen: bool,
    decorator: bool,
    annotated: bool,
    initializer: bool,
    has_params: bool,
    has_body: bool,
    declare: bool,
    is_abstract: bool,
    index_signature: bool,
    constructor: bool,
}

impl Member {
    fn new(start: usize) -> Self {
        Self {
            start,
            only_modifiers: true,
            name_seen: false,
            decorator: false,
            annotated: false,
            initializer: false,
            has_params: false,
            has_body: false,
            declare: false,
            is_abstract: false,
            index_signature: false,
            constructor: false,
        }
    }

    /// Members that only exist for the type checker.
    fn is_type_only(&self) -> bool {
        self.declare
            || self.index_signature
            || (self.is_abstract && !self.has_body)
            || (!self.has_body && !self.initializer && (self.annotated || self.has_params))
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Token index of the opener.
    open: usize,
    /// Token index reported when the frame is never closed.
    origin: usize,
    ternaries: u32,
    cases: u32,
    decl: DeclState,
    paren: ParenRole,
    specifiers: bool,
    index_signature: bool,
    closing_tag: bool,
    member: Option<Member>,
}

impl Frame {
    fn new(kind: FrameKind, open: usize) -> Self {
        Self {
            kind,
            open,
            origin: open,
            ternaries: 0,
            cases: 0,
            decl: DeclState::None,
            paren: ParenRole::Call,
            specifiers: false,
            index_signature: false,
            closing_tag: false,
            member: None,
        }
    }
}

/// Summary of the previous significant token.
#[derive(Debug, Clone, Copy, Default)]
struct Prev {
    index: Option<usize>,
    kind: Option<TokenKind>,
    ends_value: bool,
    ends_statement: bool,
    closed_paren: Option<ParenRole>,
    /// `Some(true)` when the token closed generic arrow parameters,
    /// `Some(false)` when it closed declaration type parameters.
    closed_group: Option<bool>,
}

impl Prev {
    fn is(&self, kind: TokenKind) -> bool {
        self.kind == Some(kind)
    }

    fn is_punct(&self, punct: Punct) -> bool {
        self.is(TokenKind::Punct(punct))
    }

    fn is_keyword(&self, keyword: Keyword) -> bool {
        self.is(TokenKind::Keyword(keyword))
    }
}

/// Facts about the current token gathered while classifying it.
#[derive(Debug, Clone, Copy, Default)]
struct Extra {
    ends_statement: bool,
    closed_paren: Option<ParenRole>,
    closed_frame: Option<FrameKind>,
    closed_group: Option<bool>,
    element_done: bool,
    decl_keyword: bool,
}

/// A decision waiting for the next significant token.
#[derive(Debug, Clone, Copy)]
enum Pending {
    /// `type` at statement start; `start` includes a leading `export`.
    TypeAlias { start: usize, keyword: usize },
    Opaque { start: usize },
    Interface { start: usize, keyword: usize },
    Declare { start: usize, keyword: usize },
    Abstract { index: usize },
    Namespace { index: usize },
    Import { index: usize },
    ImportType { start: usize },
    ImportName,
    Export { index: usize },
    /// `export default`, which may still introduce an interface.
    ExportDefault { index: usize },
    /// `this` opening a parameter list.
    ThisParam { index: usize },
    Specifier { index: usize },
    Modifier { index: usize },
    ParamModifier { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// The token still needs regular processing.
    Continue,
    /// The token was fully handled by the resolution.
    Consumed,
}

/// A function declaration waiting to see whether it has a body.
#[derive(Debug, Clone, Copy)]
struct FnDecl {
    start: usize,
    depth: usize,
    params: Option<usize>,
    params_closed: bool,
}

/// What the tokenizer needs to know before reading the next token.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LexContext {
    pub(crate) regex_allowed: bool,
    pub(crate) in_type: bool,
    pub(crate) flow: bool,
    pub(crate) jsx_tag: bool,
    pub(crate) jsx_children: bool,
    pub(crate) template_continue: bool,
}

pub(crate) struct ContextTracker<'src> {
    source: &'src str,
    dialect: Dialect,
    stack: Vec<Frame>,
    ty: Option<TypeScanner>,
    prev: Prev,
    prev2: Option<TokenKind>,
    extra: Extra,
    pending: Option<Pending>,
    question: Option<usize>,
    force_annotation: bool,
    angle_check: Option<(usize, u8)>,
    decl_keyword: bool,
    decl_name: Option<usize>,
    class_heads: Vec<usize>,
    module_clause: Option<usize>,
    fn_decl: Option<FnDecl>,
    statement_start: Option<usize>,
    this_param: Option<usize>,
    /// The last generic group held call or `new` type arguments.
    type_arguments: bool,
    template_depth: u16,
    paren_depth: u16,
    class_body_depth: u16,
}

impl<'src> ContextTracker<'src> {
    pub(crate) fn new(source: &'src str, dialect: Dialect) -> Self {
        Self {
            source,
            dialect,
            stack: vec![Frame::new(FrameKind::Module, 0)],
            ty: None,
            prev: Prev::default(),
            prev2: None,
            extra: Extra::default(),
            pending: None,
            question: None,
            force_annotation: false,
            angle_check: None,
            decl_keyword: false,
            decl_name: None,
            class_heads: Vec::new(),
            module_clause: None,
            fn_decl: None,
            statement_start: None,
            this_param: None,
            type_arguments: false,
            template_depth: 0,
            paren_depth: 0,
            class_body_depth: 0,
        }
    }

    pub(crate) fn lex_context(&self) -> LexContext {
        let top = self.top().kind;
        LexContext {
            regex_allowed: self.ty.is_none() && !self.prev.ends_value,
            in_type: self.ty.is_some(),
            flow: self.dialect.flow,
            jsx_tag: top == FrameKind::JsxTag,
            jsx_children: top == FrameKind::JsxChildren,
            template_continue: top == FrameKind::TemplateSubst,
        }
    }

    /// Classifies the last token in `tokens`.
    pub(crate) fn observe(&mut self, tokens: &mut [Token]) -> Result<(), TokenizeError> {
        let i = tokens.len() - 1;
        self.stamp(&mut tokens[i]);
        match tokens[i].kind {
            TokenKind::Comment(_) => return Ok(()),
            TokenKind::Eof => return self.finish(tokens),
            _ => {}
        }

        self.extra = Extra::default();
        self.resolve_question(tokens, i);
        if self.resolve_pending(tokens, i)? == Resolution::Consumed {
            self.remember(tokens, i);
            return Ok(());
        }
        self.check_angle(tokens, i)?;
        if self.ty.is_some() && self.step_type(tokens, i)? {
            self.remember(tokens, i);
            return Ok(());
        }
        self.step_value(tokens, i)?;
        self.remember(tokens, i);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stack

    fn top(&self) -> &Frame {
        // The module frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn member_mut(&mut self) -> Option<&mut Member> {
        self.top_mut().member.as_mut()
    }

    fn stamp(&self, token: &mut Token) {
        let top = self.top().kind;
        token.flags.frame = top;
        token.flags.in_jsx_tag = top == FrameKind::JsxTag;
        self.stamp_depths(token);
    }

    fn stamp_depths(&self, token: &mut Token) {
        token.flags.template_depth = self.template_depth;
        token.flags.paren_depth = self.paren_depth;
        token.flags.class_body_depth = self.class_body_depth;
        token.flags.depth = (self.stack.len() - 1) as u16;
    }

    fn count(&mut self, kind: FrameKind, delta: i32) {
        let counter = match kind {
            FrameKind::TemplateSubst => &mut self.template_depth,
            FrameKind::Paren => &mut self.paren_depth,
            FrameKind::ClassBody => &mut self.class_body_depth,
            _ => return,
        };
        *counter = (*counter as i32 + delta).max(0) as u16;
    }

    fn push(&mut self, tokens: &mut [Token], i: usize, kind: FrameKind) -> &mut Frame {
        tokens[i].flags.frame = kind;
        self.count(kind, 1);
        self.stack.push(Frame::new(kind, i));
        self.top_mut()
    }

    fn pop(
        &mut self,
        tokens: &mut [Token],
        i: usize,
        expect: impl Fn(&Frame) -> bool,
    ) -> Result<Frame, TokenizeError> {
        if self.stack.len() > 1 && expect(self.top()) {
            if let Some(frame) = self.stack.pop() {
                self.count(frame.kind, -1);
                tokens[i].flags.frame = frame.kind;
                tokens[i].flags.matching = Some(frame.open as u32);
                if frame.kind != FrameKind::JsxChildren {
                    tokens[frame.open].flags.matching = Some(i as u32);
                }
                self.stamp_depths(&mut tokens[i]);
                return Ok(frame);
            }
        }

        // A closer that matches something deeper means the frames above it
        // were never closed; otherwise the closer itself is stray.
        let deeper = self.stack.len() > 2
            && self.stack[1..self.stack.len() - 1].iter().any(|f| expect(f));
        if deeper {
            Err(self.never_closed(tokens, self.top()))
        } else {
            Err(TokenizeError::unbalanced(
                format!("unexpected `{}`", tokens[i].text(self.source)),
                tokens[i].span,
            ))
        }
    }

    fn never_closed(&self, tokens: &[Token], frame: &Frame) -> TokenizeError {
        let opener = &tokens[frame.origin];
        let message = match frame.kind {
            FrameKind::JsxTag | FrameKind::JsxChildren => "JSX element is never closed".to_string(),
            FrameKind::TemplateSubst => "template substitution is never closed".to_string(),
            _ => format!("`{}` is never closed", opener.text(self.source)),
        };
        TokenizeError::unbalanced(message, opener.span)
    }

    /// Pushes or pops for bracket tokens read inside a type.
    fn type_brackets(&mut self, tokens: &mut [Token], i: usize) -> Result<(), TokenizeError> {
        match tokens[i].kind {
            TokenKind::Punct(Punct::LParen) => {
                self.push(tokens, i, FrameKind::Paren);
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.push(tokens, i, FrameKind::Bracket);
            }
            TokenKind::Punct(Punct::LBrace) => {
                self.push(tokens, i, FrameKind::TypeBrace);
            }
            TokenKind::Punct(Punct::LBracePipe) => {
                self.push(tokens, i, FrameKind::TypeBrace).specifiers = true;
            }
            TokenKind::Punct(Punct::Lt) => {
                self.push(tokens, i, FrameKind::Angle);
            }
            TokenKind::Punct(Punct::RParen) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::Paren)?;
            }
            TokenKind::Punct(Punct::RBracket) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::Bracket)?;
            }
            // `specifiers` marks an exact `{|` brace here.
            TokenKind::Punct(Punct::RBrace) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::TypeBrace && !f.specifiers)?;
            }
            TokenKind::Punct(Punct::PipeRBrace) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::TypeBrace && f.specifiers)?;
            }
            TokenKind::Punct(Punct::Gt) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::Angle)?;
            }
            TokenKind::Template(part) => self.template(tokens, i, part)?,
            _ => {}
        }
        Ok(())
    }

    fn template(
        &mut self,
        tokens: &mut [Token],
        i: usize,
        part: TemplatePart,
    ) -> Result<(), TokenizeError> {
        match part {
            TemplatePart::NoSubstitution => {}
            TemplatePart::Head => {
                self.push(tokens, i, FrameKind::TemplateSubst);
            }
            TemplatePart::Middle => {
                self.pop(tokens, i, |f| f.kind == FrameKind::TemplateSubst)?;
                self.push(tokens, i, FrameKind::TemplateSubst);
            }
            TemplatePart::Tail => {
                self.pop(tokens, i, |f| f.kind == FrameKind::TemplateSubst)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookahead resolution

    fn resolve_question(&mut self, tokens: &mut [Token], i: usize) {
        let Some(q) = self.question.take() else {
            return;
        };
        let next = tokens[i].kind;
        let optional = match self.top().kind {
            FrameKind::Paren => matches!(
                next,
                TokenKind::Punct(Punct::Colon | Punct::Comma | Punct::RParen | Punct::Eq)
            ),
            FrameKind::ClassBody => matches!(
                next,
                TokenKind::Punct(
                    Punct::Colon
                        | Punct::LParen
                        | Punct::Semi
                        | Punct::Eq
                        | Punct::Bang
                        | Punct::RBrace
                        | Punct::Lt
                )
            ),
            _ => false,
        };
        if optional {
            tokens[q].flags.in_type = true;
            self.force_annotation = next == TokenKind::Punct(Punct::Colon);
        } else {
            self.top_mut().ternaries += 1;
        }
    }

    fn check_angle(&mut self, tokens: &[Token], i: usize) -> Result<(), TokenizeError> {
        let Some((open, stage)) = self.angle_check else {
            return Ok(());
        };
        let ok = if stage == 0 {
            self.angle_check = Some((open, 1));
            tokens[i].is_name()
        } else {
            self.angle_check = None;
            matches!(
                tokens[i].kind,
                TokenKind::Punct(Punct::Comma | Punct::Eq | Punct::Colon)
                    | TokenKind::Keyword(Keyword::Extends)
            )
        };
        if ok {
            Ok(())
        } else {
            self.angle_check = None;
            Err(TokenizeError::ambiguous(
                "`<` here could start a type assertion or generic arrow function; \
                 write `<T,>` or `<T extends …>` for a generic arrow",
                tokens[open].span,
            ))
        }
    }

    fn resolve_pending(
        &mut self,
        tokens: &mut [Token],
        i: usize,
    ) -> Result<Resolution, TokenizeError> {
        let Some(pending) = self.pending.take() else {
            return Ok(Resolution::Continue);
        };
        let next = tokens[i];
        let source = self.source;
        let depth = self.stack.len();
        let newline = next.flags.preceded_by_newline;

        match pending {
            Pending::TypeAlias { start, keyword } => {
                let alias = next.is_name() && !newline;
                // `export type {A}` and `export type * from`
                let reexport = start != keyword
                    && matches!(next.kind, TokenKind::Punct(Punct::LBrace | Punct::Star));
                if alias || reexport {
                    tokens[keyword].kind = TokenKind::Keyword(Keyword::Type);
                    mark(tokens, start, i - 1);
                    self.module_clause = None;
                    self.ty = Some(if alias {
                        TypeScanner::alias(depth)
                    } else {
                        TypeScanner::statement(depth, false)
                    });
                }
            }
            Pending::Opaque { start } => {
                if next.is_name_text(source, "type") {
                    tokens[i].kind = TokenKind::Keyword(Keyword::Type);
                    self.pending = Some(Pending::TypeAlias { start, keyword: i });
                    return Ok(Resolution::Consumed);
                }
            }
            Pending::Interface { start, keyword } => {
                if next.is_name() && !newline {
                    promote(tokens, keyword, source);
                    mark(tokens, start, i - 1);
                    self.ty = Some(TypeScanner::statement(depth, true));
                }
            }
            Pending::Declare { start, keyword } => {
                if next.is_identifier_like() && !newline {
                    promote(tokens, keyword, source);
                    mark(tokens, start, i - 1);
                    let text = next.text(source);
                    let block = matches!(
                        text,
                        "class" | "module" | "namespace" | "global" | "enum" | "interface"
                    );
                    self.module_clause = None;
                    self.ty = Some(TypeScanner::statement(depth, block));
                }
            }
            Pending::Abstract { index } => {
                if next.is_keyword(Keyword::Class) {
                    tokens[index].kind = TokenKind::Keyword(Keyword::Abstract);
                    tokens[index].flags.in_type = true;
                }
            }
            Pending::Namespace { index } => {
                if !newline && (next.is_name() || next.kind == TokenKind::String) {
                    return Err(TokenizeError::unsupported(
                        "namespace with runtime content",
                        tokens[index].span,
                    ));
                }
            }
            Pending::Import { index } => match next.kind {
                TokenKind::Punct(Punct::LParen | Punct::Dot) => {}
                TokenKind::Name | TokenKind::Keyword(Keyword::Typeof)
                    if self.dialect.has_types()
                        && (next.is_name_text(source, "type")
                            || next.is_keyword(Keyword::Typeof)) =>
                {
                    self.module_clause = Some(depth);
                    self.pending = Some(Pending::ImportType { start: index });
                    return Ok(Resolution::Consumed);
                }
                TokenKind::Name => {
                    self.module_clause = Some(depth);
                    self.pending = Some(Pending::ImportName);
                }
                _ => self.module_clause = Some(depth),
            },
            Pending::ImportType { start } => {
                let runtime = next.is_name_text(source, "from")
                    || matches!(next.kind, TokenKind::Punct(Punct::Comma | Punct::Eq));
                if runtime {
                    self.pending = Some(Pending::ImportName);
                } else {
                    if tokens[i - 1].is_name() {
                        tokens[i - 1].kind = TokenKind::Keyword(Keyword::Type);
                    }
                    mark(tokens, start, i - 1);
                    self.module_clause = None;
                    self.ty = Some(TypeScanner::statement(depth, false));
                }
            }
            Pending::ImportName => {
                if next.is_punct(Punct::Eq) && self.dialect.typescript {
                    return Err(TokenizeError::unsupported(
                        "import assignment",
                        tokens[i - 1].span,
                    ));
                }
            }
            Pending::Export { index } => {
                let types = self.dialect.has_types();
                match next.kind {
                    TokenKind::Name if types => {
                        let pending = match next.text(source) {
                            "type" => Some(Pending::TypeAlias {
                                start: index,
                                keyword: i,
                            }),
                            "interface" => Some(Pending::Interface {
                                start: index,
                                keyword: i,
                            }),
                            "declare" => Some(Pending::Declare {
                                start: index,
                                keyword: i,
                            }),
                            "opaque" if self.dialect.flow => Some(Pending::Opaque { start: index }),
                            "abstract" => Some(Pending::Abstract { index: i }),
                            _ => None,
                        };
                        if let Some(pending) = pending {
                            self.pending = Some(pending);
                            return Ok(Resolution::Consumed);
                        }
                    }
                    TokenKind::Punct(Punct::LBrace | Punct::Star) => {
                        self.module_clause = Some(depth);
                    }
                    TokenKind::Keyword(Keyword::Default) if types => {
                        self.pending = Some(Pending::ExportDefault { index });
                    }
                    TokenKind::Punct(Punct::Eq) if self.dialect.typescript => {
                        return Err(TokenizeError::unsupported(
                            "export assignment",
                            tokens[index].span,
                        ));
                    }
                    _ => {}
                }
            }
            Pending::ExportDefault { index } => {
                let pending = match next.kind {
                    TokenKind::Name if next.is_name_text(source, "interface") => {
                        Some(Pending::Interface {
                            start: index,
                            keyword: i,
                        })
                    }
                    TokenKind::Name if next.is_name_text(source, "abstract") => {
                        Some(Pending::Abstract { index: i })
                    }
                    _ => None,
                };
                if let Some(pending) = pending {
                    self.pending = Some(pending);
                    return Ok(Resolution::Consumed);
                }
            }
            Pending::ThisParam { index } => {
                if next.is_punct(Punct::Colon) {
                    tokens[index].flags.in_type = true;
                    self.this_param = Some(depth);
                }
            }
            Pending::Specifier { index } => {
                let specifier = match next.kind {
                    TokenKind::Name => !next.is_name_text(source, "as"),
                    TokenKind::Keyword(_) | TokenKind::String => true,
                    _ => false,
                };
                if specifier {
                    mark(tokens, index, index);
                    self.ty = Some(TypeScanner::specifier(depth));
                }
            }
            Pending::Modifier { index } => {
                let modifies = !newline
                    && matches!(
                        next.kind,
                        TokenKind::Name
                            | TokenKind::Keyword(_)
                            | TokenKind::String
                            | TokenKind::Number
                            | TokenKind::PrivateName
                            | TokenKind::Punct(
                                Punct::LBracket | Punct::Star | Punct::Hash | Punct::Plus | Punct::Minus
                            )
                    );
                if modifies {
                    promote(tokens, index, source);
                    tokens[index].flags.in_type = true;
                    let keyword = tokens[index].kind;
                    if let Some(member) = self.member_mut() {
                        member.declare |= keyword == TokenKind::Keyword(Keyword::Declare);
                        member.is_abstract |= keyword == TokenKind::Keyword(Keyword::Abstract);
                    }
                } else if let Some(member) = self.member_mut() {
                    // The modifier word is the member's name.
                    member.only_modifiers = false;
                    member.name_seen = true;
                }
            }
            Pending::ParamModifier { index } => {
                if !newline
                    && (next.is_identifier_like()
                        || matches!(next.kind, TokenKind::Punct(Punct::LBrace | Punct::LBracket)))
                {
                    return Err(TokenizeError::unsupported(
                        "constructor parameter property",
                        tokens[index].span,
                    ));
                }
            }
        }
        Ok(Resolution::Continue)
    }

    // ------------------------------------------------------------------
    // Types

    /// Feeds the token to the active type scanner. Returns false if the type
    /// ended before the token.
    fn step_type(&mut self, tokens: &mut [Token], i: usize) -> Result<bool, TokenizeError> {
        let Some(mut scanner) = self.ty.take() else {
            return Ok(false);
        };
        let depth = self.stack.len();
        match scanner.step(&tokens[i], self.source, depth) {
            Step::End => {
                self.end_type(&scanner, false);
                Ok(false)
            }
            step => {
                tokens[i].flags.in_type = true;
                self.type_brackets(tokens, i)?;
                if step == Step::Last {
                    self.end_type(&scanner, true);
                } else {
                    self.ty = Some(scanner);
                }
                Ok(true)
            }
        }
    }

    fn end_type(&mut self, scanner: &TypeScanner, inclusive: bool) {
        if scanner.is_statement() {
            if inclusive {
                self.extra.ends_statement = true;
            } else {
                self.prev.ends_statement = true;
                self.prev.ends_value = false;
            }
        }
        if scanner.mode == crate::types::TypeMode::Group {
            self.extra.closed_group = Some(scanner.arrow_params);
        }
        if scanner.origin == Origin::Member {
            if let Some(member) = self.member_mut() {
                member.annotated = true;
            }
        }
    }

    fn start_group(&mut self, tokens: &mut [Token], i: usize, arrow_params: bool) {
        let base = self.stack.len();
        self.type_arguments = false;
        tokens[i].flags.in_type = true;
        self.push(tokens, i, FrameKind::Angle);
        self.ty = Some(TypeScanner::group(base, arrow_params));
    }

    // ------------------------------------------------------------------
    // Values

    fn at_statement_start(&self, token: &Token) -> bool {
        matches!(self.top().kind, FrameKind::Module | FrameKind::Block)
            && (self.prev.index.is_none()
                || self.prev.ends_statement
                || (token.flags.preceded_by_newline && self.prev.ends_value))
    }

    fn step_value(&mut self, tokens: &mut [Token], i: usize) -> Result<(), TokenizeError> {
        match self.top().kind {
            FrameKind::JsxTag => return self.step_jsx_tag(tokens, i),
            FrameKind::JsxChildren => return self.step_jsx_children(tokens, i),
            _ => {}
        }

        if self.step_overload(tokens, i) {
            return Ok(());
        }

        let token = tokens[i];
        let line_break = token.flags.preceded_by_newline && self.prev.ends_value;
        if line_break {
            let depth = self.stack.len();
            let top = self.top_mut();
            if matches!(top.kind, FrameKind::Module | FrameKind::Block) {
                top.decl = DeclState::None;
            }
            if self.module_clause == Some(depth) && !token.is_name_text(self.source, "from") {
                self.module_clause = None;
            }
        }

        if self.top().kind == FrameKind::ClassBody && self.step_member(tokens, i)? {
            return Ok(());
        }

        let statement_start = self.at_statement_start(&token);
        if statement_start {
            self.statement_start = Some(i);
        }

        match token.kind {
            TokenKind::Name => self.step_name(tokens, i, statement_start),
            // `{ default: x }` and `{ class: y }` are property names.
            TokenKind::Keyword(_)
                if self.top().kind == FrameKind::Object
                    && (self.prev.is_punct(Punct::LBrace) || self.prev.is_punct(Punct::Comma)) => {}
            TokenKind::Keyword(keyword) => self.step_keyword(tokens, i, keyword, statement_start)?,
            TokenKind::Punct(punct) => self.step_punct(tokens, i, punct)?,
            TokenKind::Template(part) => self.template(tokens, i, part)?,
            TokenKind::String => {
                if self.module_clause.is_some() {
                    self.module_clause = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// A function declaration whose parameter list closed without a body is
    /// an overload signature. Returns true if the token was consumed.
    fn step_overload(&mut self, tokens: &mut [Token], i: usize) -> bool {
        let Some(decl) = self.fn_decl else {
            return false;
        };
        // A `:` starts the return type, which is read in type mode.
        if !decl.params_closed
            || decl.depth != self.stack.len()
            || tokens[i].is_punct(Punct::Colon)
        {
            return false;
        }
        self.fn_decl = None;
        if tokens[i].is_punct(Punct::LBrace) || !self.dialect.has_types() {
            return false;
        }
        if tokens[i].is_punct(Punct::Semi) {
            mark(tokens, decl.start, i);
            self.extra.ends_statement = true;
            return true;
        }
        if let Some(end) = self.prev.index {
            mark(tokens, decl.start, end);
        }
        self.prev.ends_statement = true;
        self.prev.ends_value = false;
        false
    }

    fn step_name(&mut self, tokens: &mut [Token], i: usize, statement_start: bool) {
        let token = tokens[i];
        let text = token.text(self.source);
        let depth = self.stack.len();
        let types = self.dialect.has_types();

        if self.decl_keyword {
            self.decl_name = Some(i);
        }

        if types && statement_start && self.pending.is_none() {
            self.pending = match text {
                "type" => Some(Pending::TypeAlias {
                    start: i,
                    keyword: i,
                }),
                "interface" => Some(Pending::Interface {
                    start: i,
                    keyword: i,
                }),
                "declare" => Some(Pending::Declare {
                    start: i,
                    keyword: i,
                }),
                "abstract" => Some(Pending::Abstract { index: i }),
                "opaque" if self.dialect.flow => Some(Pending::Opaque { start: i }),
                "namespace" | "module" if self.dialect.typescript => {
                    Some(Pending::Namespace { index: i })
                }
                _ => None,
            };
        }

        let top = *self.top();
        let after_list_start = self.prev.is_punct(Punct::LBrace) || self.prev.is_punct(Punct::Comma);

        if types && top.specifiers && after_list_start && text == "type" {
            self.pending = Some(Pending::Specifier { index: i });
            return;
        }

        if self.dialect.typescript
            && top.kind == FrameKind::Paren
            && top.paren == ParenRole::ConstructorParams
            && (self.prev.is_punct(Punct::LParen) || self.prev.is_punct(Punct::Comma))
            && matches!(Keyword::contextual(text), Some(k) if k.is_member_modifier())
        {
            self.pending = Some(Pending::ParamModifier { index: i });
            return;
        }

        let cast = text == "as" || (text == "satisfies" && self.dialect.typescript);
        if types
            && cast
            && self.prev.ends_value
            && !token.flags.preceded_by_newline
            && self.module_clause.is_none()
        {
            promote(tokens, i, self.source);
            tokens[i].flags.in_type = true;
            self.ty = Some(TypeScanner::annotation(depth, Origin::Other, true));
            return;
        }

        if types && text == "implements" && self.class_heads.last() == Some(&depth) {
            promote(tokens, i, self.source);
            tokens[i].flags.in_type = true;
            self.ty = Some(TypeScanner::heritage(depth));
            return;
        }

        if text == "of" && top.kind == FrameKind::Paren {
            self.top_mut().decl = DeclState::None;
        }
    }

    fn step_keyword(
        &mut self,
        tokens: &mut [Token],
        i: usize,
        keyword: Keyword,
        statement_start: bool,
    ) -> Result<(), TokenizeError> {
        let depth = self.stack.len();
        let types = self.dialect.has_types();
        match keyword {
            Keyword::Function => {
                self.extra.decl_keyword = true;
                let start = self.declaration_start(tokens, i);
                if self.statement_start == Some(start) {
                    self.fn_decl = Some(FnDecl {
                        start,
                        depth,
                        params: None,
                        params_closed: false,
                    });
                }
            }
            Keyword::Class => {
                self.extra.decl_keyword = true;
                self.class_heads.push(depth);
            }
            Keyword::Var | Keyword::Let | Keyword::Const => {
                let top = self.top_mut();
                if matches!(top.kind, FrameKind::Module | FrameKind::Block | FrameKind::Paren) {
                    top.decl = DeclState::Binding;
                }
            }
            Keyword::In => {
                let top = self.top_mut();
                if top.kind == FrameKind::Paren {
                    top.decl = DeclState::None;
                }
            }
            Keyword::Case => {
                self.top_mut().cases += 1;
            }
            Keyword::Default => {
                let member_access = self.prev.is_punct(Punct::Dot) || self.prev.is_punct(Punct::QuestionDot);
                if !member_access
                    && !self.prev.is_keyword(Keyword::Export)
                    && self.top().kind == FrameKind::Block
                {
                    self.top_mut().cases += 1;
                }
            }
            Keyword::Import if statement_start => {
                self.pending = Some(Pending::Import { index: i });
            }
            Keyword::Export if statement_start => {
                self.pending = Some(Pending::Export { index: i });
            }
            Keyword::Enum if types => {
                let declared = statement_start
                    || self.prev.is_keyword(Keyword::Export)
                    || self.prev.is_keyword(Keyword::Const);
                if declared {
                    return Err(TokenizeError::unsupported("enum", tokens[i].span));
                }
            }
            Keyword::This
                if types && self.prev.is_punct(Punct::LParen) && self.top().kind == FrameKind::Paren =>
            {
                self.pending = Some(Pending::ThisParam { index: i });
            }
            Keyword::Typeof if types => {
                let after_list_start =
                    self.prev.is_punct(Punct::LBrace) || self.prev.is_punct(Punct::Comma);
                if self.top().specifiers && after_list_start {
                    self.pending = Some(Pending::Specifier { index: i });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Walks back over `export`, `default` and `async` before a `function`.
    fn declaration_start(&self, tokens: &[Token], i: usize) -> usize {
        let mut start = i;
        let mut j = i;
        while j > 0 {
            j -= 1;
            let token = &tokens[j];
            if token.is_comment() {
                continue;
            }
            let prefix = token.is_keyword(Keyword::Export)
                || token.is_keyword(Keyword::Default)
                || token.is_name_text(self.source, "async");
            if !prefix {
                break;
            }
            start = j;
        }
        start
    }

    fn step_punct(
        &mut self,
        tokens: &mut [Token],
        i: usize,
        punct: Punct,
    ) -> Result<(), TokenizeError> {
        let types = self.dialect.has_types();
        match punct {
            Punct::LParen => {
                let type_arguments = std::mem::take(&mut self.type_arguments);
                let role = if type_arguments && self.prev.closed_group.is_some() {
                    ParenRole::Call
                } else {
                    self.paren_role(tokens)
                };
                self.push(tokens, i, FrameKind::Paren).paren = role;
                let depth = self.stack.len() - 1;
                if let Some(decl) = self.fn_decl.as_mut() {
                    if decl.depth == depth && decl.params.is_none() {
                        decl.params = Some(i);
                    }
                }
            }
            Punct::RParen => {
                let frame = self.pop(tokens, i, |f| f.kind == FrameKind::Paren)?;
                self.extra.closed_paren = Some(frame.paren);
                if self.this_param.is_some_and(|d| d > self.stack.len()) {
                    self.this_param = None;
                }
                if let Some(decl) = self.fn_decl.as_mut() {
                    if decl.params == Some(frame.open) {
                        decl.params_closed = true;
                    }
                }
            }
            Punct::LBracket => {
                self.push(tokens, i, FrameKind::Bracket);
            }
            Punct::RBracket => {
                self.pop(tokens, i, |f| f.kind == FrameKind::Bracket)?;
            }
            Punct::LBrace => self.open_brace(tokens, i),
            Punct::RBrace => {
                let frame = self.pop(tokens, i, |f| {
                    matches!(
                        f.kind,
                        FrameKind::Block | FrameKind::Object | FrameKind::ClassBody | FrameKind::JsxExpr
                    )
                })?;
                self.extra.closed_frame = Some(frame.kind);
                match frame.kind {
                    FrameKind::Block => {
                        self.extra.ends_statement = true;
                        let member_body = self
                            .top()
                            .member
                            .is_some_and(|m| m.has_body);
                        if self.top().kind == FrameKind::ClassBody && member_body {
                            self.finish_member(tokens, Some(i));
                        }
                    }
                    FrameKind::ClassBody => self.extra.ends_statement = true,
                    _ => {}
                }
            }
            Punct::Semi => {
                self.top_mut().decl = DeclState::None;
                self.module_clause = None;
                self.extra.ends_statement = true;
            }
            Punct::Comma => {
                if self.this_param == Some(self.stack.len()) {
                    // The separator after a `this` parameter goes with it.
                    tokens[i].flags.in_type = true;
                    self.this_param = None;
                }
                let top = self.top_mut();
                if top.decl == DeclState::Initializer {
                    top.decl = DeclState::Binding;
                }
            }
            Punct::Eq => {
                let top = self.top_mut();
                if top.decl == DeclState::Binding {
                    top.decl = DeclState::Initializer;
                }
            }
            Punct::Question => {
                let top = *self.top();
                let may_be_optional = match top.kind {
                    FrameKind::Paren => true,
                    FrameKind::ClassBody => top.member.is_some_and(|m| !m.initializer),
                    _ => false,
                };
                if types && may_be_optional && self.prev.ends_value {
                    self.question = Some(i);
                } else {
                    self.top_mut().ternaries += 1;
                }
            }
            Punct::Colon => self.colon(tokens, i),
            Punct::Lt => self.less_than(tokens, i),
            Punct::Bang => {
                if self.dialect.typescript
                    && self.prev.ends_value
                    && !tokens[i].flags.preceded_by_newline
                {
                    tokens[i].flags.in_type = true;
                }
            }
            Punct::Star => {
                if self.prev.is_keyword(Keyword::Function) {
                    self.extra.decl_keyword = true;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn paren_role(&self, tokens: &[Token]) -> ParenRole {
        let prev = &self.prev;
        let control = [
            Keyword::If,
            Keyword::While,
            Keyword::For,
            Keyword::With,
            Keyword::Switch,
            Keyword::Catch,
        ];
        if control.iter().any(|k| prev.is_keyword(*k)) {
            return ParenRole::Control;
        }
        if prev.is_keyword(Keyword::Function)
            || (prev.index.is_some() && prev.index == self.decl_name)
            || prev.closed_group == Some(false)
            || (prev.is_punct(Punct::Star) && self.decl_keyword)
        {
            return ParenRole::Params;
        }
        if prev.closed_group == Some(true) {
            return ParenRole::MaybeArrow;
        }
        if prev.ends_value {
            let is_async = prev
                .index
                .is_some_and(|p| tokens[p].is_name_text(self.source, "async"));
            return if is_async {
                ParenRole::MaybeArrow
            } else {
                ParenRole::Call
            };
        }
        ParenRole::MaybeArrow
    }

    fn open_brace(&mut self, tokens: &mut [Token], i: usize) {
        let depth = self.stack.len();
        let prev = self.prev;
        let block_keyword = [Keyword::Else, Keyword::Do, Keyword::Try, Keyword::Finally]
            .iter()
            .any(|k| prev.is_keyword(*k));

        if self.class_heads.last() == Some(&depth) {
            self.class_heads.pop();
            self.push(tokens, i, FrameKind::ClassBody);
            self.extra.ends_statement = true;
            return;
        }
        if self.module_clause == Some(depth) {
            self.push(tokens, i, FrameKind::Object).specifiers = true;
            return;
        }
        let block = prev.index.is_none()
            || prev.ends_statement
            || prev.is_punct(Punct::Arrow)
            || prev.closed_paren.is_some()
            || block_keyword
            || prev.ends_value;
        let kind = if block {
            FrameKind::Block
        } else {
            FrameKind::Object
        };
        self.push(tokens, i, kind);
        if kind == FrameKind::Block {
            self.extra.ends_statement = true;
        }
    }

    fn colon(&mut self, tokens: &mut [Token], i: usize) {
        let prev = self.prev;
        // Annotated parameters make the parens arrow parameters, so a colon
        // after them is a return type even inside a conditional.
        let arrow_return = self.dialect.has_types()
            && prev.closed_paren == Some(ParenRole::MaybeArrow)
            && prev
                .index
                .and_then(|close| Some((tokens[close].matching()?, close)))
                .is_some_and(|(open, close)| tokens[open + 1..close].iter().any(|t| t.flags.in_type));
        {
            let top = self.top_mut();
            if top.ternaries > 0 && !arrow_return {
                top.ternaries -= 1;
                return;
            }
            if top.cases > 0 && top.kind == FrameKind::Block {
                top.cases -= 1;
                self.extra.ends_statement = true;
                return;
            }
        }

        let forced = std::mem::take(&mut self.force_annotation);
        let top = *self.top();
        let return_type = matches!(
            prev.closed_paren,
            Some(ParenRole::Call | ParenRole::Params | ParenRole::ConstructorParams | ParenRole::MaybeArrow)
        );
        let annotation = self.dialect.has_types()
            && (forced
                || return_type
                || match top.kind {
                    FrameKind::Paren => true,
                    FrameKind::ClassBody => top.member.is_some_and(|m| !m.initializer),
                    FrameKind::Bracket => top.index_signature,
                    FrameKind::Module | FrameKind::Block => top.decl == DeclState::Binding,
                    _ => false,
                });

        if !annotation {
            let label = matches!(top.kind, FrameKind::Module | FrameKind::Block)
                && prev.is(TokenKind::Name);
            if label {
                self.extra.ends_statement = true;
            }
            return;
        }

        let origin = match top.kind {
            FrameKind::ClassBody if !return_type => Origin::Member,
            _ => Origin::Other,
        };
        if top.kind == FrameKind::Bracket && top.index_signature {
            let below = self.stack.len() - 2;
            if let Some(member) = self.stack[below].member.as_mut() {
                member.index_signature = true;
            }
        }
        if top.kind == FrameKind::ClassBody {
            if let Some(member) = self.member_mut() {
                member.annotated = true;
            }
        }
        let depth = self.stack.len();
        let allow_arrow = prev.closed_paren != Some(ParenRole::MaybeArrow);
        tokens[i].flags.in_type = true;
        self.ty = Some(TypeScanner::annotation(depth, origin, allow_arrow));
    }

    fn less_than(&mut self, tokens: &mut [Token], i: usize) {
        let depth = self.stack.len();
        let prev = self.prev;
        let top = *self.top();
        let prev_name = prev.is(TokenKind::Name);

        let after_declared_name = prev.index.is_some() && prev.index == self.decl_name;
        let class_arguments = prev_name && self.class_heads.last() == Some(&depth);
        let member_parameters = top.kind == FrameKind::ClassBody
            && prev.kind.is_some()
            && top.member.is_some_and(|m| m.name_seen && !m.initializer);
        let constructor_arguments = prev_name && self.prev2 == Some(TokenKind::Keyword(Keyword::New));
        let anonymous_function = prev.is_keyword(Keyword::Function);

        let types = self.dialect.has_types();
        if types
            && (after_declared_name
                || class_arguments
                || member_parameters
                || constructor_arguments
                || anonymous_function)
        {
            self.start_group(tokens, i, false);
            self.type_arguments = constructor_arguments;
            return;
        }

        let rest = &self.source[tokens[i].span.end_usize()..];
        if types && prev.ends_value {
            let after_async = prev
                .index
                .is_some_and(|p| tokens[p].is_name_text(self.source, "async"));
            let same_line = !tokens[i].flags.preceded_by_newline;
            if after_async && same_line && (generic_arrow_ahead(rest) || call_arguments_ahead(rest)) {
                self.start_group(tokens, i, true);
                return;
            }
            let callee = prev_name
                || prev.is_punct(Punct::RParen)
                || prev.is_punct(Punct::RBracket);
            if callee && call_arguments_ahead(rest) {
                self.start_group(tokens, i, false);
                self.type_arguments = true;
                return;
            }
        }
        if prev.ends_value {
            return;
        }

        let tag_like = rest
            .chars()
            .next()
            .is_some_and(|c| scan::is_ident_start(c) || c == '>');
        let generic = self.dialect.has_types() && generic_arrow_ahead(rest);
        if self.dialect.jsx && tag_like && !generic {
            tokens[i].kind = TokenKind::Jsx(JsxToken::TagOpen);
            self.push(tokens, i, FrameKind::JsxTag);
            tokens[i].flags.in_jsx_tag = true;
        } else if self.dialect.has_types() {
            self.start_group(tokens, i, true);
            self.angle_check = Some((i, 0));
        }
    }

    // ------------------------------------------------------------------
    // Class members

    /// Handles a token at class-body level. Returns true if it was consumed.
    fn step_member(&mut self, tokens: &mut [Token], i: usize) -> Result<bool, TokenizeError> {
        let token = tokens[i];
        let source = self.source;
        let types = self.dialect.has_types();
        let prev = self.prev;

        let current = self.top().member;
        if let Some(member) = current {
            let new_member = token.flags.preceded_by_newline
                && (prev.ends_value || prev.ends_statement)
                && !member.decorator
                && matches!(
                    token.kind,
                    TokenKind::Name
                        | TokenKind::Keyword(_)
                        | TokenKind::PrivateName
                        | TokenKind::Punct(Punct::At)
                );
            if new_member {
                self.finish_member(tokens, prev.index);
            }
        }

        match token.kind {
            TokenKind::Punct(Punct::RBrace) => {
                self.finish_member(tokens, prev.index);
                return Ok(false);
            }
            TokenKind::Punct(Punct::Semi) => {
                self.finish_member(tokens, Some(i));
                self.extra.ends_statement = true;
                return Ok(true);
            }
            _ => {}
        }

        let flow = self.dialect.flow;
        let member = self.top_mut().member.get_or_insert(Member::new(i));
        if member.decorator {
            let ends = token.flags.preceded_by_newline
                || prev.is_punct(Punct::RParen)
                || (prev.is(TokenKind::Name) && token.is_identifier_like());
            if !ends || token.is_punct(Punct::Dot) || token.is_punct(Punct::LParen) {
                return Ok(false);
            }
            member.decorator = false;
        }

        match token.kind {
            TokenKind::Punct(Punct::At) if member.only_modifiers => {
                member.decorator = true;
                Ok(false)
            }
            TokenKind::Punct(Punct::Plus | Punct::Minus) if flow && member.only_modifiers => {
                tokens[i].kind = TokenKind::Punct(Punct::Variance);
                tokens[i].flags.in_type = true;
                Ok(true)
            }
            TokenKind::Keyword(Keyword::Static) if member.only_modifiers => Ok(true),
            TokenKind::Name
                if types
                    && member.only_modifiers
                    && matches!(
                        Keyword::contextual(token.text(source)),
                        Some(k) if k.is_member_modifier()
                    ) =>
            {
                self.pending = Some(Pending::Modifier { index: i });
                Ok(true)
            }
            TokenKind::Name
            | TokenKind::Keyword(_)
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::PrivateName
                if !member.initializer && !member.has_params =>
            {
                member.only_modifiers = false;
                if token.text(source) == "constructor" {
                    member.constructor = true;
                }
                member.name_seen = true;
                Ok(false)
            }
            TokenKind::Punct(Punct::LBracket) if member.only_modifiers => {
                member.only_modifiers = false;
                self.push(tokens, i, FrameKind::Bracket).index_signature = true;
                Ok(true)
            }
            TokenKind::Punct(Punct::Eq) if !member.has_params => {
                member.initializer = true;
                Ok(true)
            }
            TokenKind::Punct(Punct::LParen) if !member.initializer => {
                member.has_params = true;
                let role = if member.constructor {
                    ParenRole::ConstructorParams
                } else {
                    ParenRole::Params
                };
                self.push(tokens, i, FrameKind::Paren).paren = role;
                Ok(true)
            }
            TokenKind::Punct(Punct::LBrace) if !member.initializer => {
                member.has_body = true;
                self.push(tokens, i, FrameKind::Block);
                self.extra.ends_statement = true;
                Ok(true)
            }
            _ => {
                member.only_modifiers = false;
                Ok(false)
            }
        }
    }

    fn finish_member(&mut self, tokens: &mut [Token], end: Option<usize>) {
        let Some(member) = self.top_mut().member.take() else {
            return;
        };
        if self.dialect.has_types() && member.is_type_only() {
            if let Some(end) = end {
                mark(tokens, member.start, end);
            }
        }
    }

    // ------------------------------------------------------------------
    // JSX

    fn step_jsx_tag(&mut self, tokens: &mut [Token], i: usize) -> Result<(), TokenizeError> {
        match tokens[i].kind {
            TokenKind::Jsx(JsxToken::TagEnd) => {
                let frame = self.pop(tokens, i, |f| f.kind == FrameKind::JsxTag)?;
                tokens[i].flags.in_jsx_tag = true;
                if frame.closing_tag {
                    self.extra.element_done = self.top().kind != FrameKind::JsxChildren;
                } else {
                    self.push(tokens, i, FrameKind::JsxChildren).origin = frame.open;
                    tokens[i].flags.frame = FrameKind::JsxTag;
                }
            }
            TokenKind::Jsx(JsxToken::SelfClose) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::JsxTag && !f.closing_tag)?;
                tokens[i].flags.in_jsx_tag = true;
                self.extra.element_done = self.top().kind != FrameKind::JsxChildren;
            }
            TokenKind::Punct(Punct::LBrace) => {
                self.push(tokens, i, FrameKind::JsxExpr);
            }
            TokenKind::Name
            | TokenKind::String
            | TokenKind::Punct(Punct::Dot | Punct::Colon | Punct::Eq) => {}
            _ => {
                return Err(TokenizeError::ambiguous(
                    format!("unexpected `{}` in JSX tag", tokens[i].text(self.source)),
                    tokens[i].span,
                ))
            }
        }
        Ok(())
    }

    fn step_jsx_children(&mut self, tokens: &mut [Token], i: usize) -> Result<(), TokenizeError> {
        match tokens[i].kind {
            TokenKind::Jsx(JsxToken::Text) => {}
            TokenKind::Jsx(JsxToken::TagOpen) => {
                self.push(tokens, i, FrameKind::JsxTag);
                tokens[i].flags.in_jsx_tag = true;
            }
            TokenKind::Jsx(JsxToken::CloseTagOpen) => {
                self.pop(tokens, i, |f| f.kind == FrameKind::JsxChildren)?;
                self.push(tokens, i, FrameKind::JsxTag).closing_tag = true;
                tokens[i].flags.in_jsx_tag = true;
            }
            TokenKind::Punct(Punct::LBrace) => {
                self.push(tokens, i, FrameKind::JsxExpr);
            }
            _ => {
                return Err(TokenizeError::ambiguous(
                    "unexpected token in JSX children",
                    tokens[i].span,
                ))
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bookkeeping

    fn remember(&mut self, tokens: &[Token], i: usize) {
        let token = &tokens[i];
        let extra = self.extra;
        let ends_value = !extra.ends_statement
            && if token.flags.in_type {
                !token.is_punct(Punct::Semi)
            } else {
                match token.kind {
                    TokenKind::Name
                    | TokenKind::PrivateName
                    | TokenKind::String
                    | TokenKind::Number
                    | TokenKind::Regex
                    | TokenKind::Template(TemplatePart::NoSubstitution | TemplatePart::Tail) => true,
                    TokenKind::Keyword(keyword) => keyword.is_value(),
                    TokenKind::Punct(Punct::RParen) => {
                        extra.closed_paren != Some(ParenRole::Control)
                    }
                    TokenKind::Punct(Punct::RBracket | Punct::PlusPlus | Punct::MinusMinus) => true,
                    TokenKind::Punct(Punct::RBrace) => matches!(
                        extra.closed_frame,
                        Some(FrameKind::Object | FrameKind::JsxExpr)
                    ),
                    TokenKind::Jsx(JsxToken::TagEnd | JsxToken::SelfClose) => extra.element_done,
                    _ => false,
                }
            };
        self.prev2 = self.prev.kind;
        self.prev = Prev {
            index: Some(i),
            kind: Some(token.kind),
            ends_value,
            ends_statement: extra.ends_statement,
            closed_paren: extra.closed_paren,
            closed_group: extra.closed_group,
        };
        self.decl_keyword = extra.decl_keyword;
    }

    fn finish(&mut self, tokens: &mut [Token]) -> Result<(), TokenizeError> {
        let i = tokens.len() - 1;
        if self.question.take().is_some() {
            self.top_mut().ternaries += 1;
        }
        self.pending = None;
        if let Some(decl) = self.fn_decl.take() {
            if decl.params_closed && self.dialect.has_types() {
                if let Some(end) = self.prev.index {
                    mark(tokens, decl.start, end);
                }
            }
        }
        self.ty = None;
        if self.stack.len() > 1 {
            return Err(self.never_closed(tokens, self.top()));
        }
        if let Some((open, _)) = self.angle_check {
            return Err(TokenizeError::ambiguous(
                "`<` here could start a type assertion or generic arrow function",
                tokens[open].span,
            ));
        }
        tokens[i].flags.frame = FrameKind::Module;
        Ok(())
    }
}

/// `<T,>` and `<T extends U>` open generic arrow parameters even where JSX
/// is enabled.
fn generic_arrow_ahead(rest: &str) -> bool {
    let name_end = scan::identifier_tail(rest, 0);
    if name_end == 0 {
        return false;
    }
    let after = rest[name_end..].trim_start();
    after.starts_with(',')
        || (after.starts_with("extends")
            && after["extends".len()..].starts_with(|c: char| c.is_whitespace()))
}

/// Whether the text after a `<` reads as type arguments closed by `>` and
/// followed by `(`, as in `f<T>(x)` or `g<A.B, C[]>()`.
fn call_arguments_ahead(rest: &str) -> bool {
    let mut depth = 1u32;
    let mut chars = rest.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return rest[at + 1..].trim_start().starts_with('(');
                }
            }
            '&' | '|' => {
                if chars.next_if(|&(_, n)| n == c).is_some() {
                    return false;
                }
            }
            ',' | '.' | '[' | ']' | '{' | '}' | ':' | ';' => {}
            c if c.is_whitespace() || c == '$' || c == '_' || c.is_alphanumeric() => {}
            _ => return false,
        }
    }
    false
}

/// Marks every significant token in `start..=end` as a type token.
fn mark(tokens: &mut [Token], start: usize, end: usize) {
    for token in tokens.iter_mut().take(end + 1).skip(start) {
        if !token.is_comment() {
            token.flags.in_type = true;
        }
    }
}

/// Promotes a contextual keyword from `Name` to `Keyword`.
fn promote(tokens: &mut [Token], i: usize, source: &str) {
    if tokens[i].is_name() {
        if let Some(keyword) = Keyword::contextual(tokens[i].text(source)) {
            tokens[i].kind = TokenKind::Keyword(keyword);
        }
    }
}
