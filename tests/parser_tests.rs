// tests/parser_tests.rs

use sift_lang::ast::{BinOp, Expr, ExprKind, ObjectKey};
use sift_lang::parse;

fn must(input: &str) -> Expr {
    parse(input).unwrap_or_else(|e| panic!("parse failed for {:?}: {}", input, e))
}

// ============================================================================
// Access chains
// ============================================================================

#[test]
fn test_identity() {
    assert!(matches!(must(".").kind, ExprKind::Identity));
}

#[test]
fn test_recurse() {
    assert!(matches!(must("..").kind, ExprKind::Recurse));
}

#[test]
fn test_field() {
    match must(".name").kind {
        ExprKind::Field {
            target,
            name,
            optional,
        } => {
            assert!(target.is_none());
            assert_eq!(name, "name");
            assert!(!optional);
        }
        other => panic!("expected field access, got {:?}", other),
    }
}

#[test]
fn test_nested_field() {
    match must(".a.b").kind {
        ExprKind::Field { target, name, .. } => {
            assert_eq!(name, "b");
            let target = target.expect("chained access keeps its target");
            assert!(matches!(
                target.kind,
                ExprKind::Field { target: None, .. }
            ));
        }
        other => panic!("expected field access, got {:?}", other),
    }
}

#[test]
fn test_bracket_field() {
    match must(r#".["x-y"]"#).kind {
        ExprKind::Field { target, name, .. } => {
            assert!(target.is_none());
            assert_eq!(name, "x-y");
        }
        other => panic!("expected field access, got {:?}", other),
    }
}

#[test]
fn test_keyword_as_field_name() {
    match must(".map").kind {
        ExprKind::Field { name, .. } => assert_eq!(name, "map"),
        other => panic!("expected field access, got {:?}", other),
    }
    match must(".and").kind {
        ExprKind::Field { name, .. } => assert_eq!(name, "and"),
        other => panic!("expected field access, got {:?}", other),
    }
}

#[test]
fn test_index() {
    assert!(matches!(
        must(".[0]").kind,
        ExprKind::Index {
            target: None,
            index: 0,
            optional: false
        }
    ));
}

#[test]
fn test_negative_index() {
    match must(".items[-1]").kind {
        ExprKind::Index { target, index, .. } => {
            assert!(target.is_some());
            assert_eq!(index, -1);
        }
        other => panic!("expected index access, got {:?}", other),
    }
}

#[test]
fn test_index_list_is_stream() {
    // .items[0,2] is two index accesses on the same target, not an
    // array literal.
    match must(".items[0,2]").kind {
        ExprKind::Comma(items) => {
            assert_eq!(items.len(), 2);
            assert!(matches!(
                items[0].kind,
                ExprKind::Index { index: 0, .. }
            ));
            assert!(matches!(
                items[1].kind,
                ExprKind::Index { index: 2, .. }
            ));
        }
        other => panic!("expected stream of index accesses, got {:?}", other),
    }
}

#[test]
fn test_slices() {
    assert!(matches!(
        must(".[1:3]").kind,
        ExprKind::Slice {
            start: Some(1),
            end: Some(3),
            ..
        }
    ));
    assert!(matches!(
        must(".items[:2]").kind,
        ExprKind::Slice {
            start: None,
            end: Some(2),
            ..
        }
    ));
    assert!(matches!(
        must(".items[-3:]").kind,
        ExprKind::Slice {
            start: Some(-3),
            end: None,
            ..
        }
    ));
    assert!(matches!(
        must(".[:]").kind,
        ExprKind::Slice {
            start: None,
            end: None,
            ..
        }
    ));
}

#[test]
fn test_fractional_index_rejected() {
    assert!(parse(".[1.5]").is_err());
}

#[test]
fn test_iterate() {
    assert!(matches!(
        must(".[]").kind,
        ExprKind::Iterate { target: None }
    ));
    assert!(matches!(
        must(".users[]").kind,
        ExprKind::Iterate { target: Some(_) }
    ));
}

#[test]
fn test_optional_flags_access() {
    assert!(matches!(
        must(".a?").kind,
        ExprKind::Field { optional: true, .. }
    ));
    assert!(matches!(
        must(".[0]?").kind,
        ExprKind::Index { optional: true, .. }
    ));
}

#[test]
fn test_optional_wraps_group() {
    assert!(matches!(must("(.a | .b)?").kind, ExprKind::Optional(_)));
}

// ============================================================================
// Operator precedence
// ============================================================================

#[test]
fn test_pipe_is_loosest() {
    match must(".a, .b | .c").kind {
        ExprKind::Pipe(left, right) => {
            assert!(matches!(left.kind, ExprKind::Comma(_)));
            assert!(matches!(right.kind, ExprKind::Field { .. }));
        }
        other => panic!("expected pipe, got {:?}", other),
    }
}

#[test]
fn test_alternative_binds_tighter_than_comma() {
    match must(".a // 1, .b").kind {
        ExprKind::Comma(items) => {
            assert_eq!(items.len(), 2);
            assert!(matches!(
                items[0].kind,
                ExprKind::Binary {
                    op: BinOp::Alternative,
                    ..
                }
            ));
        }
        other => panic!("expected comma stream, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match must("1 + 2 * 3").kind {
        ExprKind::Binary {
            op: BinOp::Add,
            right,
            ..
        } => {
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::Multiply,
                    ..
                }
            ));
        }
        other => panic!("expected addition, got {:?}", other),
    }
}

#[test]
fn test_not_binds_looser_than_equality() {
    match must("not .a == .b").kind {
        ExprKind::Not(inner) => {
            assert!(matches!(
                inner.kind,
                ExprKind::Binary {
                    op: BinOp::Equal,
                    ..
                }
            ));
        }
        other => panic!("expected negation, got {:?}", other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    match must(".a or .b and .c").kind {
        ExprKind::Binary {
            op: BinOp::Or,
            right,
            ..
        } => {
            assert!(matches!(
                right.kind,
                ExprKind::Binary { op: BinOp::And, .. }
            ));
        }
        other => panic!("expected disjunction, got {:?}", other),
    }
}

#[test]
fn test_comparison_is_non_associative() {
    assert!(parse("1 < 2 < 3").is_err());
}

#[test]
fn test_unary_minus() {
    match must("-.a").kind {
        ExprKind::Neg(inner) => {
            assert!(matches!(inner.kind, ExprKind::Field { .. }));
        }
        other => panic!("expected negation, got {:?}", other),
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_empty_array() {
    match must("[]").kind {
        ExprKind::Array(items) => assert!(items.is_empty()),
        other => panic!("expected array construction, got {:?}", other),
    }
}

#[test]
fn test_array_collects_comma_elements() {
    match must("[.a, .b]").kind {
        ExprKind::Array(items) => assert_eq!(items.len(), 2),
        other => panic!("expected array construction, got {:?}", other),
    }
}

#[test]
fn test_array_with_pipe_element() {
    match must("[.users[] | .name]").kind {
        ExprKind::Array(items) => {
            assert_eq!(items.len(), 1);
            assert!(matches!(items[0].kind, ExprKind::Pipe(_, _)));
        }
        other => panic!("expected array construction, got {:?}", other),
    }
}

#[test]
fn test_object_fields() {
    match must(r#"{name: .n, "x-y": 1}"#).kind {
        ExprKind::Object(fields) => {
            assert_eq!(fields.len(), 2);
            assert!(matches!(&fields[0].key, ObjectKey::Static(k) if k == "name"));
            assert!(matches!(&fields[1].key, ObjectKey::Static(k) if k == "x-y"));
            assert!(fields[0].value.is_some());
        }
        other => panic!("expected object construction, got {:?}", other),
    }
}

#[test]
fn test_object_shorthand() {
    match must("{id}").kind {
        ExprKind::Object(fields) => {
            assert_eq!(fields.len(), 1);
            assert!(matches!(&fields[0].key, ObjectKey::Static(k) if k == "id"));
            assert!(fields[0].value.is_none());
        }
        other => panic!("expected object construction, got {:?}", other),
    }
}

#[test]
fn test_object_dynamic_key() {
    match must("{(.k): .v}").kind {
        ExprKind::Object(fields) => {
            assert!(matches!(&fields[0].key, ObjectKey::Dynamic(_)));
        }
        other => panic!("expected object construction, got {:?}", other),
    }
}

// ============================================================================
// Conditionals and builtins
// ============================================================================

#[test]
fn test_conditional() {
    match must("if .a then 1 elif .b then 2 else 3 end").kind {
        ExprKind::If {
            elifs, otherwise, ..
        } => {
            assert_eq!(elifs.len(), 1);
            assert!(otherwise.is_some());
        }
        other => panic!("expected conditional, got {:?}", other),
    }
}

#[test]
fn test_conditional_without_else() {
    match must("if .a then 1 end").kind {
        ExprKind::If { otherwise, .. } => assert!(otherwise.is_none()),
        other => panic!("expected conditional, got {:?}", other),
    }
}

#[test]
fn test_builtins() {
    assert!(matches!(must("map(.a)").kind, ExprKind::Map(_)));
    assert!(matches!(must("map_values(.a)").kind, ExprKind::MapValues(_)));
    assert!(matches!(must("select(.a)").kind, ExprKind::Select(_)));
    assert!(matches!(must("sort").kind, ExprKind::Sort));
    assert!(matches!(must("length").kind, ExprKind::Length));
    assert!(matches!(must("keys").kind, ExprKind::Keys));
    assert!(matches!(must("keys_unsorted").kind, ExprKind::KeysUnsorted));
    assert!(matches!(must("tostring").kind, ExprKind::ToString));
    assert!(matches!(must("tonumber").kind, ExprKind::ToNumber));
    assert!(matches!(must("empty").kind, ExprKind::Empty));
}

#[test]
fn test_sort_by_multiple_paths() {
    match must("sort_by(.last, .first)").kind {
        ExprKind::SortBy(paths) => assert_eq!(paths.len(), 2),
        other => panic!("expected sort_by, got {:?}", other),
    }
}

#[test]
fn test_unknown_function() {
    let err = parse("frobnicate(.a)").unwrap_err();
    assert!(err.message.contains("Unknown function 'frobnicate'"));
}

#[test]
fn test_trailing_semicolon_accepted() {
    assert!(parse(".name;").is_ok());
}

// ============================================================================
// Structured errors
// ============================================================================

#[test]
fn test_empty_input() {
    let err = parse("").unwrap_err();
    assert!(err.found_eof);
}

#[test]
fn test_trailing_tokens_rejected() {
    let err = parse(".a 5").unwrap_err();
    assert_eq!(err.expected, Some("end of input"));
    assert_eq!(err.pos, 3);
}

#[test]
fn test_unclosed_bracket_records_delimiter() {
    let err = parse(".items[").unwrap_err();
    assert!(err.found_eof);
    assert_eq!(err.unclosed, vec!['[']);
}

#[test]
fn test_unclosed_paren_records_delimiter() {
    let err = parse("(.a").unwrap_err();
    assert!(err.found_eof);
    assert_eq!(err.expected, Some("')'"));
    assert_eq!(err.unclosed, vec!['(']);
}

#[test]
fn test_nested_unclosed_delimiters() {
    let err = parse("{a: [1, 2").unwrap_err();
    assert!(err.found_eof);
    assert_eq!(err.unclosed, vec!['{', '[']);
}

#[test]
fn test_unterminated_string_propagates() {
    let err = parse(r#".a == "oops"#).unwrap_err();
    assert_eq!(err.unterminated, Some('"'));
}

#[test]
fn test_missing_comma_in_object() {
    let err = parse("{a: 1 b: 2}").unwrap_err();
    assert_eq!(err.expected, Some("','"));
    assert!(!err.found_eof);
    assert_eq!(err.unclosed, vec!['{']);
}
