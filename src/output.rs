//! JSON output serialization for sift values.
//!
//! Provides compact and pretty-printed JSON rendering of [`Value`].
//! Object keys print in insertion order (which `Value::Object`
//! preserves), numbers with integral values print without a fractional
//! part, and non-finite numbers print as `null` since JSON has no
//! NaN/Infinity.
//!
//! # Examples
//!
//! ```
//! use sift_lang::Value;
//! use sift_lang::output::{to_json, to_json_pretty};
//!
//! let value = Value::Number(42.0);
//!
//! // Compact output
//! assert_eq!(to_json(&value), "42");
//!
//! // Pretty output (identical for simple values)
//! assert_eq!(to_json_pretty(&value), "42");
//! ```

use crate::value::Value;
use indexmap::IndexMap;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &IndexMap<String, Value>, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let mut result = "{\n".to_string();
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => {
                    // Unicode escape for control chars
                    format!("\\u{:04x}", c as u32).chars().collect()
                }
                c => vec![c],
            })
            .collect()
    }
}

/// Render a number the way jq does: integral values without a
/// fractional part, non-finite values as `null`.
fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    n.to_string()
}

/// Converts a Value to compact JSON with no extra whitespace.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
/// use sift_lang::output::to_json;
/// use indexmap::IndexMap;
///
/// let mut obj = IndexMap::new();
/// obj.insert("name".to_string(), Value::String("Alice".to_string()));
/// obj.insert("age".to_string(), Value::Number(30.0));
///
/// assert_eq!(to_json(&Value::Object(obj)), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON with 2-space indentation,
/// one element or field per line.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
/// use sift_lang::output::to_json_pretty;
///
/// let arr = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
/// assert_eq!(to_json_pretty(&arr), "[\n  1,\n  2\n]");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
