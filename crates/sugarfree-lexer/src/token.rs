//! Token types produced by the tokenizer.

use source_map::Span;

/// A token with its kind, span and the context it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
    /// Context flags recorded when the token was read.
    pub flags: TokenFlags,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            flags: TokenFlags::default(),
        }
    }

    /// Returns the text of this token.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Returns true for comments, which carry no syntax.
    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    /// Returns true if this is the given punctuator.
    #[inline]
    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    /// Returns true if this is the given keyword.
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns true if this is a plain identifier.
    #[inline]
    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }

    /// Returns true if this is an identifier spelled `text`.
    #[inline]
    pub fn is_name_text(&self, source: &str, text: &str) -> bool {
        self.kind == TokenKind::Name && self.text(source) == text
    }

    /// Returns true for identifiers and keywords, which can both appear as
    /// property names.
    #[inline]
    pub fn is_identifier_like(&self) -> bool {
        matches!(self.kind, TokenKind::Name | TokenKind::Keyword(_))
    }

    /// The index of the matching bracket, for bracket tokens.
    #[inline]
    pub fn matching(&self) -> Option<usize> {
        self.flags.matching.map(|m| m as usize)
    }
}

/// Context flags attached to every token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenFlags {
    /// The token belongs to a type annotation or declaration.
    pub in_type: bool,
    /// The token is inside a JSX tag (between `<` and `>`).
    pub in_jsx_tag: bool,
    /// A line break separates this token from the previous one.
    pub preceded_by_newline: bool,
    /// Number of open template substitutions.
    pub template_depth: u16,
    /// Number of open parentheses.
    pub paren_depth: u16,
    /// Number of enclosing class bodies.
    pub class_body_depth: u16,
    /// Number of open frames of any kind; zero at the top level.
    pub depth: u16,
    /// The innermost frame enclosing the token. For a bracket token this is
    /// the frame the bracket itself opens or closes.
    pub frame: FrameKind,
    /// For bracket tokens, the index of the matching bracket.
    pub matching: Option<u32>,
}

/// The kind of an open bracket frame on the context stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Top level of the source.
    #[default]
    Module,
    /// `(` … `)`
    Paren,
    /// `[` … `]`
    Bracket,
    /// `{` … `}` opening a statement block or function body.
    Block,
    /// `{` … `}` opening an object literal or pattern.
    Object,
    /// `{` … `}` of a class body.
    ClassBody,
    /// `{` … `}` or `{|` … `|}` of an object type.
    TypeBrace,
    /// `<` … `>` of a generic parameter or argument list.
    Angle,
    /// `${` … `}` inside a template literal.
    TemplateSubst,
    /// `<` … `>` of a JSX tag.
    JsxTag,
    /// Children between a JSX opening and closing tag.
    JsxChildren,
    /// `{` … `}` inside JSX.
    JsxExpr,
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier, including contextual keywords the tracker did not
    /// promote.
    Name,
    /// `#name`
    PrivateName,
    /// A reserved word or a promoted contextual keyword.
    Keyword(Keyword),
    /// A punctuator.
    Punct(Punct),
    /// A string literal (or JSX attribute string).
    String,
    /// A piece of a template literal.
    Template(TemplatePart),
    /// A regular expression literal.
    Regex,
    /// A numeric literal.
    Number,
    /// A comment.
    Comment(CommentKind),
    /// JSX structure.
    Jsx(JsxToken),
    /// End of input.
    Eof,
}

/// Which piece of a template literal a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplatePart {
    /// `` `text` ``
    NoSubstitution,
    /// `` `text${ ``
    Head,
    /// `}text${`
    Middle,
    /// `` }text` ``
    Tail,
}

/// Comment flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// …`
    Line,
    /// `/* … */`
    Block,
    /// `#!…` on the first line.
    Hashbang,
}

/// JSX structural tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsxToken {
    /// `<` opening a tag.
    TagOpen,
    /// `</` opening a closing tag.
    CloseTagOpen,
    /// `>` ending a tag.
    TagEnd,
    /// `/>` ending a self-closing tag.
    SelfClose,
    /// Text between tags.
    Text,
}

macro_rules! keywords {
    (
        reserved { $($rname:ident => $rtext:literal,)* }
        contextual { $($cname:ident => $ctext:literal,)* }
    ) => {
        /// Reserved words plus the contextual keywords the tracker promotes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(#[doc = concat!("`", $rtext, "`")] $rname,)*
            $(#[doc = concat!("`", $ctext, "` (contextual)")] $cname,)*
        }

        impl Keyword {
            /// Looks up a reserved word.
            pub fn reserved(text: &str) -> Option<Keyword> {
                match text {
                    $($rtext => Some(Keyword::$rname),)*
                    _ => None,
                }
            }

            /// Looks up a contextual keyword.
            pub fn contextual(text: &str) -> Option<Keyword> {
                match text {
                    $($ctext => Some(Keyword::$cname),)*
                    _ => None,
                }
            }

            /// Returns true for keywords that are only keywords in context.
            pub fn is_contextual(self) -> bool {
                matches!(self, $(Keyword::$cname)|*)
            }

            /// The keyword's spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$rname => $rtext,)*
                    $(Keyword::$cname => $ctext,)*
                }
            }
        }
    };
}

keywords! {
    reserved {
        Await => "await",
        Break => "break",
        Case => "case",
        Catch => "catch",
        Class => "class",
        Const => "const",
        Continue => "continue",
        Debugger => "debugger",
        Default => "default",
        Delete => "delete",
        Do => "do",
        Else => "else",
        Enum => "enum",
        Export => "export",
        Extends => "extends",
        False => "false",
        Finally => "finally",
        For => "for",
        Function => "function",
        If => "if",
        Import => "import",
        In => "in",
        Instanceof => "instanceof",
        Let => "let",
        New => "new",
        Null => "null",
        Return => "return",
        Static => "static",
        Super => "super",
        Switch => "switch",
        This => "this",
        Throw => "throw",
        True => "true",
        Try => "try",
        Typeof => "typeof",
        Var => "var",
        Void => "void",
        While => "while",
        With => "with",
        Yield => "yield",
    }
    contextual {
        Abstract => "abstract",
        As => "as",
        Declare => "declare",
        Implements => "implements",
        Interface => "interface",
        Opaque => "opaque",
        Override => "override",
        Private => "private",
        Protected => "protected",
        Public => "public",
        Readonly => "readonly",
        Satisfies => "satisfies",
        Type => "type",
    }
}

impl Keyword {
    /// Keywords that end an operand: `this`, `super`, and the literals.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Keyword::This | Keyword::Super | Keyword::Null | Keyword::True | Keyword::False
        )
    }

    /// TypeScript access and member modifiers.
    pub fn is_member_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Public
                | Keyword::Private
                | Keyword::Protected
                | Keyword::Readonly
                | Keyword::Override
                | Keyword::Declare
                | Keyword::Abstract
        )
    }
}

macro_rules! puncts {
    ($($name:ident => $text:literal,)*) => {
        /// Punctuators.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Punct {
            $(#[doc = concat!("`", $text, "`")] $name,)*
            /// A Flow variance marker (`+` or `-` before a member name).
            Variance,
        }

        impl Punct {
            /// The punctuator's spelling. Variance markers report `+`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Punct::$name => $text,)*
                    Punct::Variance => "+",
                }
            }
        }
    };
}

puncts! {
    LBrace => "{",
    RBrace => "}",
    LBracePipe => "{|",
    PipeRBrace => "|}",
    LParen => "(",
    RParen => ")",
    LBracket => "[",
    RBracket => "]",
    Dot => ".",
    Ellipsis => "...",
    Semi => ";",
    Comma => ",",
    Lt => "<",
    Gt => ">",
    LtEq => "<=",
    GtEq => ">=",
    EqEq => "==",
    NotEq => "!=",
    EqEqEq => "===",
    NotEqEq => "!==",
    Plus => "+",
    Minus => "-",
    Star => "*",
    Slash => "/",
    Percent => "%",
    StarStar => "**",
    PlusPlus => "++",
    MinusMinus => "--",
    Shl => "<<",
    Shr => ">>",
    UShr => ">>>",
    Amp => "&",
    Pipe => "|",
    Caret => "^",
    Bang => "!",
    Tilde => "~",
    AmpAmp => "&&",
    PipePipe => "||",
    Question => "?",
    QuestionQuestion => "??",
    QuestionDot => "?.",
    Colon => ":",
    Eq => "=",
    PlusEq => "+=",
    MinusEq => "-=",
    StarEq => "*=",
    SlashEq => "/=",
    PercentEq => "%=",
    StarStarEq => "**=",
    ShlEq => "<<=",
    ShrEq => ">>=",
    UShrEq => ">>>=",
    AmpEq => "&=",
    PipeEq => "|=",
    CaretEq => "^=",
    AmpAmpEq => "&&=",
    PipePipeEq => "||=",
    QuestionQuestionEq => "??=",
    Arrow => "=>",
    At => "@",
    Hash => "#",
}

impl Punct {
    /// Punctuators starting with `>` that must be split inside types.
    pub(crate) fn starts_with_gt(self) -> bool {
        matches!(
            self,
            Punct::Gt | Punct::GtEq | Punct::Shr | Punct::UShr | Punct::ShrEq | Punct::UShrEq
        )
    }
}
