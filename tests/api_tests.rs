// tests/api_tests.rs
//
// Library surface: compile entry points, the compile cache, heuristic
// repair, and the cross-type total order on values.

use sift_lang::{
    CompileCache, CompileOptions, Error, Expr, ExprKind, Value, compile, compile_cached,
    compile_from_ast, compile_with, query, safe_query,
};

fn input(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text).unwrap().into()
}

// ============================================================================
// Compile entry points
// ============================================================================

#[test]
fn test_compile_records_source() {
    let filter = compile(".name").unwrap();
    assert_eq!(filter.source(), Some(".name"));
    assert!(filter.warning().is_none());
}

#[test]
fn test_compiled_filter_is_reusable() {
    let filter = compile_with(".n + 1", &CompileOptions { cache: false }).unwrap();
    assert_eq!(
        filter.apply(&input(r#"{"n": 1}"#)).unwrap(),
        vec![Value::Number(2.0)]
    );
    assert_eq!(
        filter.apply(&input(r#"{"n": 41}"#)).unwrap(),
        vec![Value::Number(42.0)]
    );
}

#[test]
fn test_filter_is_send_and_clone() {
    let filter = compile_with(". * 2", &CompileOptions { cache: false }).unwrap();
    let clone = filter.clone();
    let handle =
        std::thread::spawn(move || clone.apply(&Value::Number(21.0)).unwrap());
    assert_eq!(handle.join().unwrap(), vec![Value::Number(42.0)]);
}

#[test]
fn test_compile_from_ast() {
    let ast = Expr::new(
        ExprKind::Field {
            target: None,
            name: "x".to_string(),
            optional: false,
        },
        0,
    );
    let filter = compile_from_ast(&ast);
    assert_eq!(
        filter.apply(&input(r#"{"x": 7}"#)).unwrap(),
        vec![Value::Number(7.0)]
    );
    assert!(filter.source().is_none());
}

#[test]
fn test_pipe_equals_manual_composition() {
    let data = input(r#"{"users": [{"name": "J"}, {"name": "K"}]}"#);

    let composed = query(".users[] | .name", &data).unwrap();

    let left = compile_with(".users[]", &CompileOptions { cache: false }).unwrap();
    let right = compile_with(".name", &CompileOptions { cache: false }).unwrap();
    let mut manual = Vec::new();
    for value in left.apply(&data).unwrap() {
        manual.extend(right.apply(&value).unwrap());
    }

    assert_eq!(composed, manual);
}

#[test]
fn test_safe_query_swallows_errors() {
    let data = input("5");
    // Parse error and type error both become an empty stream.
    assert!(safe_query(".a ||| b", &data).is_empty());
    assert!(safe_query(".a", &data).is_empty());
    assert_eq!(safe_query(". + 1", &data), vec![Value::Number(6.0)]);
}

// ============================================================================
// Compile cache
// ============================================================================

#[test]
fn test_cache_hit_reuses_filter() {
    let cache = CompileCache::new();
    assert!(cache.is_empty());

    let first = compile_cached(".a", &cache).unwrap();
    assert_eq!(cache.len(), 1);

    let second = compile_cached(".a", &cache).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(
        first.apply(&input(r#"{"a": 1}"#)).unwrap(),
        second.apply(&input(r#"{"a": 1}"#)).unwrap()
    );

    compile_cached(".b", &cache).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_clear() {
    let cache = CompileCache::new();
    compile_cached(".a", &cache).unwrap();
    compile_cached(".b", &cache).unwrap();
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_cache_disable_bypasses_lookup() {
    let cache = CompileCache::new();
    compile_cached(".a", &cache).unwrap();
    assert!(cache.get(".a").is_some());

    cache.set_enabled(false);
    assert!(!cache.is_enabled());
    // Lookups miss and inserts are dropped while disabled.
    assert!(cache.get(".a").is_none());
    cache.insert(".c", compile_cached(".c", &cache).unwrap());
    assert_eq!(cache.len(), 1);

    // Entries survive the disabled window.
    cache.set_enabled(true);
    assert!(cache.get(".a").is_some());
}

#[test]
fn test_cache_is_shared_across_threads() {
    let cache = std::sync::Arc::new(CompileCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = std::sync::Arc::clone(&cache);
            std::thread::spawn(move || {
                let filter = compile_cached(".a", &cache).unwrap();
                filter.apply(&Value::Null).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![Value::Null]);
    }

    assert_eq!(cache.len(), 1);
}

#[test]
fn test_failed_compile_is_not_cached() {
    let cache = CompileCache::new();
    assert!(compile_cached(".a ===", &cache).is_err());
    assert!(cache.is_empty());
}

// ============================================================================
// Heuristic repair
// ============================================================================

#[test]
fn test_repair_missing_comma() {
    let filter = compile_with("{a: 1 b: 2}", &CompileOptions { cache: false }).unwrap();
    let warning = filter.warning().expect("repaired compile carries a warning");
    assert!(warning.contains("inserted missing ','"));
    assert_eq!(
        filter.apply(&Value::Null).unwrap(),
        vec![input(r#"{"a": 1, "b": 2}"#)]
    );
}

#[test]
fn test_repair_unclosed_bracket() {
    let filter = compile_with("[1, 2", &CompileOptions { cache: false }).unwrap();
    assert!(filter.warning().unwrap().contains("closed unbalanced '['"));
    assert_eq!(filter.apply(&Value::Null).unwrap(), vec![input("[1, 2]")]);
}

#[test]
fn test_repair_nested_delimiters() {
    let filter = compile_with("{a: [1, 2", &CompileOptions { cache: false }).unwrap();
    assert_eq!(
        filter.apply(&Value::Null).unwrap(),
        vec![input(r#"{"a": [1, 2]}"#)]
    );
}

#[test]
fn test_repair_unterminated_string() {
    let filter =
        compile_with(r#".name == "John"#, &CompileOptions { cache: false }).unwrap();
    assert!(
        filter
            .warning()
            .unwrap()
            .contains("closed unterminated string")
    );
    assert_eq!(
        filter.apply(&input(r#"{"name": "John"}"#)).unwrap(),
        vec![Value::Bool(true)]
    );
}

#[test]
fn test_repair_keeps_original_source() {
    let filter = compile_with("[1, 2", &CompileOptions { cache: false }).unwrap();
    // source() reports what the caller wrote, not the repaired text.
    assert_eq!(filter.source(), Some("[1, 2"));
}

#[test]
fn test_failed_repair_reports_original_error() {
    match compile_with("{(.a", &CompileOptions { cache: false }) {
        Err(Error::Recovery(e)) => {
            assert_eq!(e.original().unclosed, vec!['{', '(']);
            assert!(e.original().found_eof);
        }
        other => panic!("expected a recovery error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unrepairable_error_passes_through() {
    match compile_with(".a = 1", &CompileOptions { cache: false }) {
        Err(Error::Parse(e)) => assert!(e.message.contains("==")),
        other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// Value ordering
// ============================================================================

fn ladder() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Bool(false),
        Value::Bool(true),
        Value::Number(-1.0),
        Value::Number(0.0),
        Value::Number(3.5),
        Value::String("a".to_string()),
        Value::String("ab".to_string()),
        Value::Array(vec![]),
        Value::Array(vec![Value::Number(1.0)]),
        Value::Array(vec![Value::Number(1.0), Value::Null]),
        Value::Object(indexmap::IndexMap::new()),
        input(r#"{"a": 1}"#),
        input(r#"{"a": 2}"#),
        input(r#"{"b": 0}"#),
    ]
}

#[test]
fn test_order_is_strictly_increasing_across_kinds() {
    let values = ladder();
    for window in values.windows(2) {
        assert!(
            window[0] < window[1],
            "{:?} should sort before {:?}",
            window[0],
            window[1]
        );
    }
}

#[test]
fn test_signed_zeros_are_numerically_equal() {
    assert_eq!(Value::Number(-0.0), Value::Number(0.0));
    assert_eq!(
        Value::Number(-0.0).cmp(&Value::Number(0.0)),
        std::cmp::Ordering::Equal
    );
    // Reachable from source text too: -0 is unary minus on 0.
    assert_eq!(
        query(". == 0", &Value::Number(-0.0)).unwrap(),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        query("0 > -0", &Value::Null).unwrap(),
        vec![Value::Bool(false)]
    );
}

#[test]
fn test_order_is_antisymmetric_and_transitive() {
    let values = ladder();
    for a in &values {
        for b in &values {
            assert_eq!(a.cmp(b), b.cmp(a).reverse());
            for c in &values {
                if a <= b && b <= c {
                    assert!(a <= c, "{:?} <= {:?} <= {:?} must chain", a, b, c);
                }
            }
        }
    }
}

#[test]
fn test_equality_is_strict_about_kinds() {
    assert_ne!(Value::Number(5.0), Value::String("5".to_string()));
    assert_ne!(Value::Null, Value::Bool(false));
    assert_ne!(Value::Array(vec![]), Value::Object(indexmap::IndexMap::new()));
}

#[test]
fn test_object_order_ignores_insertion_order() {
    // {"a":1,"b":2} and {"b":2,"a":1} hold the same entries; insertion
    // order affects printing, not comparison.
    let ab = input(r#"{"a": 1, "b": 2}"#);
    let ba = input(r#"{"b": 2, "a": 1}"#);
    assert_eq!(ab, ba);
}
