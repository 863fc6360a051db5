//! Type-extent scanner.
//!
//! Once the tracker decides a type starts, every following token is fed
//! here until the scanner reports the type is over. Brackets opened inside
//! the type are pushed on the shared context stack, so the scanner only has
//! to reason about tokens at its own base depth.

use crate::token::{Keyword, Punct, TemplatePart, Token, TokenKind};

/// How a type region ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeMode {
    /// `: T`, `as T`, `implements A, B`: ends before the first token that
    /// cannot continue the type.
    Annotation,
    /// A `<…>` group: ends with its closing `>`.
    Group,
    /// `type X<T> = T`: ends with `;` or before an ASI break.
    Alias,
    /// `declare …`, `interface …`, `import type …`: ends with `;`, with the
    /// closing brace of a body when `block` is set, or before an ASI break.
    Statement { block: bool },
    /// `type a as b` inside import/export braces: ends before `,` or `}`.
    Specifier,
}

/// Where an annotation started, for the tracker's bookkeeping when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Class member annotation.
    Member,
    /// Anything else.
    Other,
}

/// What the scanner made of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The token is part of the type and more may follow.
    Continue,
    /// The token is the last token of the type.
    Last,
    /// The type ended before this token.
    End,
}

#[derive(Debug, Clone)]
pub(crate) struct TypeScanner {
    pub(crate) mode: TypeMode,
    /// Context stack depth when the type started.
    pub(crate) base: usize,
    pub(crate) origin: Origin,
    /// The group opens generic arrow parameters (`<T,>(x: T) => x`).
    pub(crate) arrow_params: bool,
    expect_operand: bool,
    expect_member: bool,
    /// The operand was `import`, so `('module')` follows.
    import_call: bool,
    conditional: u32,
    allow_arrow: bool,
    allow_comma: bool,
    header: bool,
    last_ends_value: bool,
}

impl TypeScanner {
    fn new(mode: TypeMode, base: usize) -> Self {
        Self {
            mode,
            base,
            origin: Origin::Other,
            arrow_params: false,
            expect_operand: true,
            expect_member: false,
            import_call: false,
            conditional: 0,
            allow_arrow: true,
            allow_comma: false,
            header: false,
            last_ends_value: false,
        }
    }

    /// A type annotation following `:` or `as`.
    pub(crate) fn annotation(base: usize, origin: Origin, allow_arrow: bool) -> Self {
        Self {
            origin,
            allow_arrow,
            ..Self::new(TypeMode::Annotation, base)
        }
    }

    /// An `implements` list.
    pub(crate) fn heritage(base: usize) -> Self {
        Self {
            allow_comma: true,
            allow_arrow: false,
            ..Self::new(TypeMode::Annotation, base)
        }
    }

    /// A generic group whose `<` has already been pushed above `base`.
    pub(crate) fn group(base: usize, arrow_params: bool) -> Self {
        Self {
            arrow_params,
            ..Self::new(TypeMode::Group, base)
        }
    }

    /// A type alias, starting at its name.
    pub(crate) fn alias(base: usize) -> Self {
        Self {
            header: true,
            ..Self::new(TypeMode::Alias, base)
        }
    }

    /// A type-only statement.
    pub(crate) fn statement(base: usize, block: bool) -> Self {
        Self::new(TypeMode::Statement { block }, base)
    }

    /// A type-only import/export specifier.
    pub(crate) fn specifier(base: usize) -> Self {
        Self::new(TypeMode::Specifier, base)
    }

    /// Returns true if ending here finishes a whole statement.
    pub(crate) fn is_statement(&self) -> bool {
        matches!(self.mode, TypeMode::Alias | TypeMode::Statement { .. })
    }

    /// Feeds one significant token. `depth` is the context stack depth
    /// before the token is applied.
    pub(crate) fn step(&mut self, token: &Token, source: &str, depth: usize) -> Step {
        let step = if depth > self.base {
            self.step_nested(token, depth)
        } else {
            self.step_base(token, source)
        };
        if step != Step::End {
            self.last_ends_value = ends_value(token);
        }
        step
    }

    fn step_nested(&mut self, token: &Token, depth: usize) -> Step {
        if depth != self.base + 1 || !is_closer(token) {
            return Step::Continue;
        }
        match self.mode {
            TypeMode::Group => Step::Last,
            TypeMode::Statement { block: true } if token.is_punct(Punct::RBrace) => Step::Last,
            _ => {
                // `<…>` after an operand are arguments; before one they are
                // the parameters of a function type.
                if !token.is_punct(Punct::Gt) {
                    self.expect_operand = false;
                }
                Step::Continue
            }
        }
    }

    fn step_base(&mut self, token: &Token, source: &str) -> Step {
        match self.mode {
            // The opener was consumed when the group started.
            TypeMode::Group => Step::End,
            TypeMode::Specifier => {
                if token.is_punct(Punct::Comma) || token.is_punct(Punct::RBrace) {
                    Step::End
                } else {
                    Step::Continue
                }
            }
            TypeMode::Statement { .. } => {
                if token.is_punct(Punct::Semi) {
                    Step::Last
                } else if self.asi_break(token, source) {
                    Step::End
                } else {
                    Step::Continue
                }
            }
            TypeMode::Alias if self.header => {
                if token.is_punct(Punct::Eq) {
                    self.header = false;
                    self.expect_operand = true;
                    Step::Continue
                } else if token.is_punct(Punct::Semi) {
                    Step::Last
                } else if self.asi_break(token, source) {
                    Step::End
                } else {
                    Step::Continue
                }
            }
            TypeMode::Alias => match self.operand_step(token, source) {
                Step::End if token.is_punct(Punct::Semi) => Step::Last,
                step => step,
            },
            TypeMode::Annotation => self.operand_step(token, source),
        }
    }

    /// A line break before something that starts a new statement.
    fn asi_break(&self, token: &Token, source: &str) -> bool {
        token.flags.preceded_by_newline
            && self.last_ends_value
            && match token.kind {
                TokenKind::Name => !matches!(token.text(source), "extends" | "implements"),
                TokenKind::Keyword(k) => k != Keyword::Extends,
                TokenKind::String
                | TokenKind::Number
                | TokenKind::PrivateName
                | TokenKind::Template(_)
                | TokenKind::Punct(Punct::At) => true,
                _ => false,
            }
    }

    fn operand_step(&mut self, token: &Token, source: &str) -> Step {
        if self.expect_member {
            if token.is_identifier_like() {
                self.expect_member = false;
                return Step::Continue;
            }
            return Step::End;
        }

        if self.expect_operand {
            return match token.kind {
                TokenKind::Punct(
                    Punct::LParen
                    | Punct::LBracket
                    | Punct::LBrace
                    | Punct::LBracePipe
                    | Punct::Lt
                    | Punct::Question
                    | Punct::Plus
                    | Punct::Minus
                    | Punct::Pipe
                    | Punct::Amp
                    | Punct::Ellipsis,
                ) => Step::Continue,
                TokenKind::Template(TemplatePart::Head) => Step::Continue,
                TokenKind::Keyword(Keyword::Typeof | Keyword::New) => Step::Continue,
                TokenKind::Name if is_type_prefix(token.text(source)) => Step::Continue,
                TokenKind::Keyword(Keyword::Import) => {
                    self.expect_operand = false;
                    self.import_call = true;
                    Step::Continue
                }
                TokenKind::Name
                | TokenKind::Keyword(_)
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::Template(TemplatePart::NoSubstitution)
                | TokenKind::Punct(Punct::Star) => {
                    self.expect_operand = false;
                    Step::Continue
                }
                _ => Step::End,
            };
        }

        if token.flags.preceded_by_newline
            && !matches!(
                token.kind,
                TokenKind::Punct(Punct::Pipe | Punct::Amp | Punct::Arrow)
            )
        {
            return Step::End;
        }

        let import_call = std::mem::take(&mut self.import_call);
        match token.kind {
            TokenKind::Punct(Punct::LParen) if import_call => Step::Continue,
            TokenKind::Punct(Punct::Dot) => {
                self.expect_member = true;
                Step::Continue
            }
            TokenKind::Punct(Punct::LBracket | Punct::Lt) => Step::Continue,
            TokenKind::Punct(Punct::Pipe | Punct::Amp) => {
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Punct(Punct::Arrow) if self.allow_arrow => {
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Punct(Punct::Comma) if self.allow_comma => {
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Keyword(Keyword::Extends) if !self.allow_comma => {
                self.conditional += 1;
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Punct(Punct::Question) if self.conditional > 0 => {
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Punct(Punct::Colon) if self.conditional > 0 => {
                self.conditional -= 1;
                self.expect_operand = true;
                Step::Continue
            }
            TokenKind::Name if token.text(source) == "is" => {
                self.expect_operand = true;
                Step::Continue
            }
            // Flow `%checks`
            TokenKind::Punct(Punct::Percent) => {
                self.expect_member = true;
                Step::Continue
            }
            _ => Step::End,
        }
    }
}

/// Words that take a following type operand.
fn is_type_prefix(text: &str) -> bool {
    matches!(
        text,
        "keyof" | "unique" | "readonly" | "infer" | "asserts" | "abstract"
    )
}

/// Tokens that close a frame.
pub(crate) fn is_closer(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Punct(
            Punct::RParen | Punct::RBracket | Punct::RBrace | Punct::PipeRBrace | Punct::Gt
        ) | TokenKind::Template(TemplatePart::Tail)
    )
}

fn ends_value(token: &Token) -> bool {
    match token.kind {
        TokenKind::Name
        | TokenKind::Keyword(_)
        | TokenKind::String
        | TokenKind::Number
        | TokenKind::PrivateName
        | TokenKind::Template(TemplatePart::NoSubstitution | TemplatePart::Tail) => true,
        TokenKind::Punct(p) => matches!(
            p,
            Punct::RParen | Punct::RBracket | Punct::RBrace | Punct::PipeRBrace | Punct::Gt
        ),
        _ => false,
    }
}
