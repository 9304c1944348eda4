//! Primitive value operations called by generated filters.
//!
//! Each function works on a single `Value` (or a pair of operand values)
//! and returns a `Result`; multi-valued results appear only where the
//! operation is inherently a stream (`iterate`, `recurse_collect`). The
//! stream-level composition - pipes, commas, cartesian broadcasting -
//! lives in the code generator, not here.

use crate::value::Value;

/// An error raised while a filter runs: type mismatches and
/// out-of-domain operations. Carries an optional causal chain.
#[derive(Debug)]
pub struct ExecError {
    pub message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExecError {
    pub fn new(message: impl Into<String>) -> Self {
        ExecError {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExecError {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Property access.
///
/// Missing keys produce `Null` (not an error), as does any property on
/// `null` or on an array. Scalars cannot be indexed with a string; with
/// `optional` that error becomes "emit nothing" (`Ok(None)`).
pub fn field_access(input: &Value, name: &str, optional: bool) -> Result<Option<Value>, ExecError> {
    match input {
        Value::Object(map) => Ok(Some(map.get(name).cloned().unwrap_or(Value::Null))),
        Value::Null => Ok(Some(Value::Null)),
        // Arrays have no named members; treat as missing.
        Value::Array(_) => Ok(Some(Value::Null)),
        _ if optional => Ok(None),
        other => Err(ExecError::new(format!(
            "Cannot index {} with string \"{}\"",
            other.type_name(),
            name
        ))),
    }
}

/// Numeric index access; negative indices count from the end and
/// out-of-range indices produce `Null`. Objects are looked up by the
/// decimal form of the index.
pub fn index_access(input: &Value, index: i64, optional: bool) -> Result<Option<Value>, ExecError> {
    match input {
        Value::Array(arr) => {
            let len = arr.len() as i64;
            let idx = if index < 0 { len + index } else { index };
            if idx < 0 || idx >= len {
                return Ok(Some(Value::Null));
            }
            Ok(Some(arr[idx as usize].clone()))
        }
        Value::Object(map) => Ok(Some(
            map.get(index.to_string().as_str())
                .cloned()
                .unwrap_or(Value::Null),
        )),
        Value::Null => Ok(Some(Value::Null)),
        _ if optional => Ok(None),
        other => Err(ExecError::new(format!(
            "Cannot index {} with number",
            other.type_name()
        ))),
    }
}

/// Slice of an array, or of a string by codepoint. Bounds default to
/// the ends, negatives normalize against the length, and an inverted
/// range yields an empty result.
pub fn slice(input: &Value, start: Option<i64>, end: Option<i64>) -> Result<Value, ExecError> {
    fn bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
        let len = len as i64;
        let clamp = |i: i64| -> usize {
            let i = if i < 0 { len + i } else { i };
            i.clamp(0, len) as usize
        };
        let lo = clamp(start.unwrap_or(0));
        let hi = clamp(end.unwrap_or(len));
        (lo, hi.max(lo))
    }

    match input {
        Value::Array(arr) => {
            let (lo, hi) = bounds(arr.len(), start, end);
            Ok(Value::Array(arr[lo..hi].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (lo, hi) = bounds(chars.len(), start, end);
            Ok(Value::String(chars[lo..hi].iter().collect()))
        }
        Value::Null => Ok(Value::Null),
        other => Err(ExecError::new(format!(
            "Cannot slice {}",
            other.type_name()
        ))),
    }
}

/// Iteration: the elements of an array, or the values of an object, as
/// separate stream items.
pub fn iterate(input: &Value) -> Result<Vec<Value>, ExecError> {
    match input {
        Value::Array(arr) => Ok(arr.clone()),
        Value::Object(map) => Ok(map.values().cloned().collect()),
        other => Err(ExecError::new(format!(
            "Cannot iterate over {}",
            other.type_name()
        ))),
    }
}

/// Addition: numeric sum, string/array concatenation, object union
/// (right side wins on key conflicts). `null` is the identity.
pub fn add(left: &Value, right: &Value) -> Result<Value, ExecError> {
    match (left, right) {
        (Value::Null, b) => Ok(b.clone()),
        (a, Value::Null) => Ok(a.clone()),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::Array(a), Value::Array(b)) => {
            let mut out = a.clone();
            out.extend(b.iter().cloned());
            Ok(Value::Array(out))
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut out = a.clone();
            for (k, v) in b {
                out.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(out))
        }
        (a, b) => Err(ExecError::new(format!(
            "Cannot add {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Subtraction: numeric difference, or array difference (every element
/// of the right array removed from the left). A `null` operand
/// contributes nothing.
pub fn subtract(left: &Value, right: &Value) -> Result<Value, ExecError> {
    match (left, right) {
        (a, Value::Null) => Ok(a.clone()),
        (Value::Null, Value::Number(b)) => Ok(Value::Number(-b)),
        (Value::Null, Value::Array(_)) => Ok(Value::Array(Vec::new())),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (Value::Array(a), Value::Array(b)) => Ok(Value::Array(
            a.iter()
                .filter(|item| !b.contains(item))
                .cloned()
                .collect(),
        )),
        (a, b) => Err(ExecError::new(format!(
            "Cannot subtract {} from {}",
            b.type_name(),
            a.type_name()
        ))),
    }
}

/// Numeric multiplication. Division and modulo follow IEEE semantics,
/// so dividing by zero produces an infinity or NaN rather than erroring.
pub fn multiply(left: &Value, right: &Value) -> Result<Value, ExecError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (a, b) => Err(ExecError::new(format!(
            "Cannot multiply {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn divide(left: &Value, right: &Value) -> Result<Value, ExecError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (a, b) => Err(ExecError::new(format!(
            "Cannot divide {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn modulo(left: &Value, right: &Value) -> Result<Value, ExecError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a % b)),
        (a, b) => Err(ExecError::new(format!(
            "Cannot compute modulo of {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Stable sort by the cross-type total order. Only arrays sort.
pub fn sort_values(input: &Value) -> Result<Value, ExecError> {
    match input {
        Value::Array(arr) => {
            let mut out = arr.clone();
            out.sort();
            Ok(Value::Array(out))
        }
        other => Err(ExecError::new(format!(
            "Cannot sort {}",
            other.type_name()
        ))),
    }
}

/// Depth-first pre-order traversal: the value itself, then its children
/// by array position / object insertion order. Values are trees (owned,
/// no sharing), so a plain walk terminates and visits each node once.
pub fn recurse_collect(input: &Value, out: &mut Vec<Value>) {
    out.push(input.clone());
    match input {
        Value::Array(arr) => {
            for item in arr {
                recurse_collect(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                recurse_collect(item, out);
            }
        }
        _ => {}
    }
}

/// `length`: codepoint count for strings, magnitude for numbers,
/// element/key count for collections, 0 for null. Booleans have none.
pub fn length_of(input: &Value) -> Result<Value, ExecError> {
    match input {
        Value::Null => Ok(Value::Number(0.0)),
        Value::Number(n) => Ok(Value::Number(n.abs())),
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(arr) => Ok(Value::Number(arr.len() as f64)),
        Value::Object(map) => Ok(Value::Number(map.len() as f64)),
        Value::Bool(_) => Err(ExecError::new("Cannot take length of boolean")),
    }
}

/// `keys` / `keys_unsorted`: object keys (sorted or in insertion
/// order), or the index list of an array.
pub fn keys_of(input: &Value, sorted: bool) -> Result<Value, ExecError> {
    match input {
        Value::Object(map) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            if sorted {
                keys.sort();
            }
            Ok(Value::Array(keys.into_iter().map(Value::String).collect()))
        }
        Value::Array(arr) => Ok(Value::Array(
            (0..arr.len()).map(|i| Value::Number(i as f64)).collect(),
        )),
        other => Err(ExecError::new(format!(
            "{} has no keys",
            other.type_name()
        ))),
    }
}

/// `tostring`: strings pass through unquoted, everything else renders
/// as compact JSON.
pub fn to_string_value(input: &Value) -> Value {
    match input {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(crate::output::to_json(other)),
    }
}

/// `tonumber`: numbers pass through, numeric strings parse, everything
/// else is out of domain.
pub fn to_number_value(input: &Value) -> Result<Value, ExecError> {
    match input {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| ExecError::with_cause(format!("Cannot parse '{}' as number", s), e)),
        other => Err(ExecError::new(format!(
            "Cannot convert {} to number",
            other.type_name()
        ))),
    }
}
