//! Context decisions the tracker makes with one token of lookahead.

use pretty_assertions::assert_eq;
use sugarfree_lexer::{
    tokenize, Dialect, FrameKind, JsxToken, Punct, TokenKind, TokenizeError,
};

/// Texts of all tokens the tracker marked as type syntax.
fn type_tokens(source: &str, dialect: Dialect) -> Vec<&str> {
    tokenize(source, dialect)
        .unwrap()
        .iter()
        .filter(|t| t.flags.in_type)
        .map(|t| t.text(source))
        .collect()
}

fn kinds(source: &str, dialect: Dialect) -> Vec<TokenKind> {
    tokenize(source, dialect)
        .unwrap()
        .iter()
        .filter(|t| !t.is_comment())
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_variable_annotation() {
    assert_eq!(type_tokens("let x: number = 1;", Dialect::TS), vec![":", "number"]);
}

#[test]
fn test_parameter_and_return_types() {
    let source = "function f(a: string, b?: number): void {}";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec![":", "string", "?", ":", "number", ":", "void"]
    );
}

#[test]
fn test_type_alias_statement() {
    let source = "type A = string | number;\nconst x = 1;";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["type", "A", "=", "string", "|", "number", ";"]
    );
}

#[test]
fn test_type_alias_ends_at_line_break() {
    let source = "type A = string\nlet b = 1";
    assert_eq!(type_tokens(source, Dialect::TS), vec!["type", "A", "=", "string"]);
}

#[test]
fn test_type_as_identifier() {
    assert!(type_tokens("type = 5; type(1);", Dialect::TS).is_empty());
}

#[test]
fn test_interface_body() {
    let source = "interface Props { a: string; b(): void }\nlet y = 2;";
    let types = type_tokens(source, Dialect::TS);
    assert_eq!(types.first(), Some(&"interface"));
    assert_eq!(types.last(), Some(&"}"));
    assert!(!types.contains(&"let"));
}

#[test]
fn test_type_only_imports() {
    let source = "import type { A } from './a';\nimport { b, type C } from './b';";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["import", "type", "{", "A", "}", "from", "'./a'", ";", "type", "C"]
    );
}

#[test]
fn test_as_chain() {
    let source = "const y = x as unknown as string;";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["as", "unknown", "as", "string"]
    );
}

#[test]
fn test_class_members() {
    let source = "class A {
  private x: number = 1;
  y?: string;
  declare z: number;
  foo(a: number): void;
  foo(a: any) {}
}";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec![
            "private", ":", "number", //
            "y", "?", ":", "string", ";", //
            "declare", "z", ":", "number", ";", //
            "foo", "(", "a", ":", "number", ")", ":", "void", ";", //
            ":", "any",
        ]
    );
}

#[test]
fn test_class_heritage() {
    let source = "class A<T> extends B implements C, D {}";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["<", "T", ">", "implements", "C", ",", "D"]
    );
}

#[test]
fn test_optional_parameter_versus_ternary() {
    let source = "const f = (a?: number) => a ? 1 : 2;";
    assert_eq!(type_tokens(source, Dialect::TS), vec!["?", ":", "number"]);
}

#[test]
fn test_non_null_assertion() {
    let source = "x!.foo;";
    assert_eq!(type_tokens(source, Dialect::TS), vec!["!"]);
    assert!(type_tokens("!x;", Dialect::TS).is_empty());
}

#[test]
fn test_generic_arrow_needs_marker() {
    let source = "const f = <T,>(x: T) => x;";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["<", "T", ",", ">", ":", "T"]
    );

    let err = tokenize("const f = <T>(x: T) => x;", Dialect::TS).unwrap_err();
    assert!(matches!(err, TokenizeError::AmbiguousSyntax(_)));
    assert_eq!(err.span().start_usize(), 10);
}

#[test]
fn test_generic_after_async() {
    let source = "const f = async <T,>(x: T) => x;";
    assert_eq!(
        type_tokens(source, Dialect::TSX),
        vec!["<", "T", ",", ">", ":", "T"]
    );
    assert_eq!(type_tokens("async < b;", Dialect::TS), Vec::<&str>::new());
}

#[test]
fn test_call_type_arguments() {
    assert_eq!(type_tokens("f<T>(x);", Dialect::TS), vec!["<", "T", ">"]);
    assert_eq!(type_tokens("f<T>(x);", Dialect::FLOW), vec!["<", "T", ">"]);
    assert_eq!(type_tokens("a < b || c > (d);", Dialect::TS), Vec::<&str>::new());
}

#[test]
fn test_arrow_return_type_in_conditional() {
    let source = "x = a ? (b: T): U => c : d;";
    assert_eq!(type_tokens(source, Dialect::TS), vec![":", "T", ":", "U"]);
    assert_eq!(type_tokens("x = a ? (b) : c => d;", Dialect::TS), Vec::<&str>::new());
}

#[test]
fn test_this_parameter() {
    let source = "function f(this: Window, a: number) {}";
    assert_eq!(
        type_tokens(source, Dialect::TS),
        vec!["this", ":", "Window", ",", ":", "number"]
    );
}

#[test]
fn test_comparison_is_not_generic() {
    let k = kinds("a < b && c > d", Dialect::TS);
    assert_eq!(k[1], TokenKind::Punct(Punct::Lt));
    assert_eq!(k[5], TokenKind::Punct(Punct::Gt));
}

#[test]
fn test_nested_generic_closers_split() {
    let source = "let m: Map<string, Array<number>> = x;";
    let types = type_tokens(source, Dialect::TS);
    assert_eq!(&types[types.len() - 2..], &[">", ">"]);
}

#[test]
fn test_jsx_element() {
    let source = r#"const el = <div className="a">{x} text</div>;"#;
    assert_eq!(
        kinds(source, Dialect::JSX),
        vec![
            TokenKind::Keyword(sugarfree_lexer::Keyword::Const),
            TokenKind::Name,
            TokenKind::Punct(Punct::Eq),
            TokenKind::Jsx(JsxToken::TagOpen),
            TokenKind::Name,
            TokenKind::Name,
            TokenKind::Punct(Punct::Eq),
            TokenKind::String,
            TokenKind::Jsx(JsxToken::TagEnd),
            TokenKind::Punct(Punct::LBrace),
            TokenKind::Name,
            TokenKind::Punct(Punct::RBrace),
            TokenKind::Jsx(JsxToken::Text),
            TokenKind::Jsx(JsxToken::CloseTagOpen),
            TokenKind::Name,
            TokenKind::Jsx(JsxToken::TagEnd),
            TokenKind::Punct(Punct::Semi),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_jsx_tag_flags() {
    let source = "<a b={1} />";
    let tokens = tokenize(source, Dialect::JSX).unwrap();
    assert!(tokens[0].flags.in_jsx_tag);
    assert!(tokens[1].flags.in_jsx_tag);
    assert_eq!(tokens[4].flags.frame, FrameKind::JsxExpr);
    assert_eq!(tokens[7].kind, TokenKind::Jsx(JsxToken::SelfClose));
}

#[test]
fn test_flow_exact_object_and_variance() {
    let source = "type T = {| a: number |};\nclass A { +x: number; }";
    let k = kinds(source, Dialect::FLOW);
    assert!(k.contains(&TokenKind::Punct(Punct::LBracePipe)));
    assert!(k.contains(&TokenKind::Punct(Punct::PipeRBrace)));
    assert!(k.contains(&TokenKind::Punct(Punct::Variance)));
}

#[test]
fn test_flow_without_types_splits_pipes() {
    let k = kinds("x = {||}", Dialect::JS);
    assert_eq!(k[2], TokenKind::Punct(Punct::LBrace));
}

#[test]
fn test_regex_after_control_paren() {
    let k = kinds("if (x) /a/.test(y);", Dialect::JS);
    assert_eq!(k[4], TokenKind::Regex);
}

#[test]
fn test_matching_brackets() {
    let tokens = tokenize("f(a[0])", Dialect::JS).unwrap();
    assert_eq!(tokens[1].matching(), Some(6));
    assert_eq!(tokens[6].matching(), Some(1));
    assert_eq!(tokens[3].matching(), Some(5));
    assert_eq!(tokens[4].flags.paren_depth, 1);
}

#[test]
fn test_unclosed_bracket_reports_opener() {
    let err = tokenize("function f() { if (x) { }", Dialect::JS).unwrap_err();
    assert!(matches!(err, TokenizeError::UnbalancedBrackets(_)));
    assert_eq!(err.span().start_usize(), 13);
}

#[test]
fn test_stray_closer() {
    let err = tokenize("a)", Dialect::JS).unwrap_err();
    assert_eq!(err.to_string(), "unbalanced brackets: unexpected `)`");
}

#[test]
fn test_mismatched_closer_reports_unclosed_opener() {
    let err = tokenize("f([1, 2)", Dialect::JS).unwrap_err();
    assert_eq!(err.to_string(), "unbalanced brackets: `[` is never closed");
    assert_eq!(err.span().start_usize(), 2);
}

#[test]
fn test_unsupported_constructs() {
    let err = tokenize("enum Color { Red }", Dialect::TS).unwrap_err();
    assert_eq!(err.to_string(), "unsupported construct: enum");

    let err = tokenize("namespace Foo { export const a = 1; }", Dialect::TS).unwrap_err();
    assert!(matches!(err, TokenizeError::UnsupportedConstruct(_)));

    let err = tokenize("class A { constructor(private x: number) {} }", Dialect::TS).unwrap_err();
    assert!(matches!(err, TokenizeError::UnsupportedConstruct(_)));
}

#[test]
fn test_plain_javascript_has_no_types() {
    let source = "const a = b ? c : d; label: for (;;) { break label; }";
    assert!(type_tokens(source, Dialect::JS).is_empty());
}

#[test]
fn test_object_keys_named_like_keywords() {
    let source = "const o = { class: 1, default: 2 };\nclass B {}";
    let tokens = tokenize(source, Dialect::JS).unwrap();
    let brace = tokens
        .iter()
        .rfind(|t| t.is_punct(Punct::LBrace))
        .map(|t| t.flags.frame);
    assert_eq!(brace, Some(FrameKind::ClassBody));
}
