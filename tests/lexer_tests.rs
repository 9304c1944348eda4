// tests/lexer_tests.rs

use sift_lang::ast::TokenKind;
use sift_lang::lexer::Lexer;

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// ============================================================================
// Basic tokens
// ============================================================================

#[test]
fn test_dot_and_identifier() {
    assert_eq!(
        kinds(".name"),
        vec![
            TokenKind::Dot,
            TokenKind::Ident("name".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_dotdot() {
    assert_eq!(kinds(".."), vec![TokenKind::DotDot, TokenKind::Eof]);
}

#[test]
fn test_dot_positions() {
    let tokens = Lexer::tokenize(".items[0]").unwrap();
    assert_eq!(tokens[0].pos, 0); // .
    assert_eq!(tokens[1].pos, 1); // items
    assert_eq!(tokens[2].pos, 6); // [
    assert_eq!(tokens[3].pos, 7); // 0
    assert_eq!(tokens[4].pos, 8); // ]
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("42 3.14"),
        vec![
            TokenKind::Number(42.0),
            TokenKind::Number(3.14),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        kinds("| , ? + - * / %"),
        vec![
            TokenKind::Pipe,
            TokenKind::Comma,
            TokenKind::Question,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        kinds("== != > >= < <="),
        vec![
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::Gt,
            TokenKind::GtEq,
            TokenKind::Lt,
            TokenKind::LtEq,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_alternative_vs_division() {
    assert_eq!(
        kinds("a // b / c"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::SlashSlash,
            TokenKind::Ident("b".to_string()),
            TokenKind::Slash,
            TokenKind::Ident("c".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("[ ] { } ( ) : ;"),
        vec![
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("if then elif else end and or not"),
        vec![
            TokenKind::If,
            TokenKind::Then,
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::End,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_literal_keywords() {
    assert_eq!(
        kinds("true false null"),
        vec![
            TokenKind::Bool(true),
            TokenKind::Bool(false),
            TokenKind::Null,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_builtins_are_identifiers() {
    assert_eq!(
        kinds("map select"),
        vec![
            TokenKind::Ident("map".to_string()),
            TokenKind::Ident("select".to_string()),
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_double_quoted_string() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::String("hello world".to_string()), TokenKind::Eof]
    );
}

#[test]
fn test_single_quoted_string() {
    assert_eq!(
        kinds("'item #1'"),
        vec![TokenKind::String("item #1".to_string()), TokenKind::Eof]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\nb\t\"c\\""#),
        vec![
            TokenKind::String("a\nb\t\"c\\".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_unicode_escape() {
    assert_eq!(
        kinds(r#""\u0041""#),
        vec![TokenKind::String("A".to_string()), TokenKind::Eof]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string() {
    let err = Lexer::tokenize(r#"."key" == "oops"#).unwrap_err();
    assert_eq!(err.unterminated, Some('"'));
    assert_eq!(err.pos, 10);
}

#[test]
fn test_unrecognized_character() {
    let err = Lexer::tokenize(".a @ .b").unwrap_err();
    assert!(err.message.contains('@'));
    assert_eq!(err.pos, 3);
}

#[test]
fn test_lone_equals() {
    let err = Lexer::tokenize(".a = 1").unwrap_err();
    assert!(err.message.contains("=="));
}

#[test]
fn test_lone_bang() {
    assert!(Lexer::tokenize("!a").is_err());
}
