//! Fixed-shape tokens recognised by `logos`.
//!
//! Anything whose extent depends on context (strings, templates, regexes,
//! block comments, JSX text) only has its opening delimiter recognised here;
//! the tokenizer scans the rest by hand.

use crate::token::Punct;
use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f\x0B\u{00A0}\u{FEFF}\u{2028}\u{2029}]+")]
pub(crate) enum RawKind {
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r"#[a-zA-Z_$][a-zA-Z0-9_$]*")]
    PrivateName,

    #[regex(r"[0-9][0-9_]*n?")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+n?")]
    #[regex(r"0[oO][0-7_]+n?")]
    #[regex(r"0[bB][01_]+n?")]
    Number,

    #[regex(r"//[^\n\r\u{2028}\u{2029}]*")]
    LineComment,

    #[token("/*")]
    BlockCommentStart,

    #[token("\"")]
    #[token("'")]
    Quote,

    #[token("`")]
    Backtick,

    #[token("{", |_| Punct::LBrace)]
    #[token("}", |_| Punct::RBrace)]
    #[token("{|", |_| Punct::LBracePipe)]
    #[token("|}", |_| Punct::PipeRBrace)]
    #[token("(", |_| Punct::LParen)]
    #[token(")", |_| Punct::RParen)]
    #[token("[", |_| Punct::LBracket)]
    #[token("]", |_| Punct::RBracket)]
    #[token(".", |_| Punct::Dot)]
    #[token("...", |_| Punct::Ellipsis)]
    #[token(";", |_| Punct::Semi)]
    #[token(",", |_| Punct::Comma)]
    #[token("<", |_| Punct::Lt)]
    #[token(">", |_| Punct::Gt)]
    #[token("<=", |_| Punct::LtEq)]
    #[token(">=", |_| Punct::GtEq)]
    #[token("==", |_| Punct::EqEq)]
    #[token("!=", |_| Punct::NotEq)]
    #[token("===", |_| Punct::EqEqEq)]
    #[token("!==", |_| Punct::NotEqEq)]
    #[token("+", |_| Punct::Plus)]
    #[token("-", |_| Punct::Minus)]
    #[token("*", |_| Punct::Star)]
    #[token("/", |_| Punct::Slash)]
    #[token("%", |_| Punct::Percent)]
    #[token("**", |_| Punct::StarStar)]
    #[token("++", |_| Punct::PlusPlus)]
    #[token("--", |_| Punct::MinusMinus)]
    #[token("<<", |_| Punct::Shl)]
    #[token(">>", |_| Punct::Shr)]
    #[token(">>>", |_| Punct::UShr)]
    #[token("&", |_| Punct::Amp)]
    #[token("|", |_| Punct::Pipe)]
    #[token("^", |_| Punct::Caret)]
    #[token("!", |_| Punct::Bang)]
    #[token("~", |_| Punct::Tilde)]
    #[token("&&", |_| Punct::AmpAmp)]
    #[token("||", |_| Punct::PipePipe)]
    #[token("?", |_| Punct::Question)]
    #[token("??", |_| Punct::QuestionQuestion)]
    #[token("?.", |_| Punct::QuestionDot)]
    #[token(":", |_| Punct::Colon)]
    #[token("=", |_| Punct::Eq)]
    #[token("+=", |_| Punct::PlusEq)]
    #[token("-=", |_| Punct::MinusEq)]
    #[token("*=", |_| Punct::StarEq)]
    #[token("/=", |_| Punct::SlashEq)]
    #[token("%=", |_| Punct::PercentEq)]
    #[token("**=", |_| Punct::StarStarEq)]
    #[token("<<=", |_| Punct::ShlEq)]
    #[token(">>=", |_| Punct::ShrEq)]
    #[token(">>>=", |_| Punct::UShrEq)]
    #[token("&=", |_| Punct::AmpEq)]
    #[token("|=", |_| Punct::PipeEq)]
    #[token("^=", |_| Punct::CaretEq)]
    #[token("&&=", |_| Punct::AmpAmpEq)]
    #[token("||=", |_| Punct::PipePipeEq)]
    #[token("??=", |_| Punct::QuestionQuestionEq)]
    #[token("=>", |_| Punct::Arrow)]
    #[token("@", |_| Punct::At)]
    #[token("#", |_| Punct::Hash)]
    Punct(Punct),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str) -> Vec<RawKind> {
        RawKind::lexer(source).map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_longest_punct_wins() {
        assert_eq!(
            raw("a >>>= b"),
            vec![RawKind::Ident, RawKind::Punct(Punct::UShrEq), RawKind::Ident]
        );
        assert_eq!(
            raw("a?.b ?? c"),
            vec![
                RawKind::Ident,
                RawKind::Punct(Punct::QuestionDot),
                RawKind::Ident,
                RawKind::Punct(Punct::QuestionQuestion),
                RawKind::Ident,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        for source in ["0", "1_000", "1.5", ".5e-3", "0xFFn", "0b1010", "0o17", "2e10"] {
            assert_eq!(raw(source), vec![RawKind::Number], "{source}");
        }
    }

    #[test]
    fn test_delimiters_only() {
        assert_eq!(
            raw("'` /* //x"),
            vec![
                RawKind::Quote,
                RawKind::Backtick,
                RawKind::BlockCommentStart,
                RawKind::LineComment,
            ]
        );
    }
}
