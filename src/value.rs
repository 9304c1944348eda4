use indexmap::IndexMap;
use std::cmp::Ordering;

/// A JSON value as seen by sift filters.
///
/// All numbers are `f64` (like JSON itself) and objects preserve the
/// insertion order of their keys, which `keys_unsorted` and the JSON
/// printer rely on. Values are never mutated by a filter; evaluation
/// clones whatever it needs to emit.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
/// use indexmap::IndexMap;
///
/// let null = Value::Null;
/// let flag = Value::Bool(true);
/// let num = Value::Number(42.0);
/// let name = Value::String("hello".to_string());
/// let list = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
///
/// let mut map = IndexMap::new();
/// map.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(map);
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Bool(bool),

    /// JSON number (always floating point)
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Object with string keys, insertion order preserved
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Check if the value is truthy: everything except `null` and `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Human-readable kind name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Rank of the value kind in the cross-type total order.
    ///
    /// null < false < true < number < string < array < object. Booleans
    /// get two ranks so false sorts before true without a second pass.
    fn order_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }
}

/// The total order backing `sort`, `sort_by` and the relational operators.
///
/// Within a kind: numbers compare numerically (`total_cmp`, so NaN is
/// ordered rather than poisonous), strings by codepoint, arrays
/// lexicographically with shorter-prefix-less, objects first by their
/// sorted key sequence and only then by the values taken in that key
/// order.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.order_rank().cmp(&other.order_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            // +0.0 collapses -0.0 into 0.0 so signed zeros compare
            // equal, while NaN passes through to total_cmp unchanged.
            (Value::Number(a), Value::Number(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                let mut a_keys: Vec<&String> = a.keys().collect();
                let mut b_keys: Vec<&String> = b.keys().collect();
                a_keys.sort();
                b_keys.sort();

                let keys = a_keys.cmp(&b_keys);
                if keys != Ordering::Equal {
                    return keys;
                }
                for key in a_keys {
                    let ord = a[key.as_str()].cmp(&b[key.as_str()]);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }
            _ => unreachable!("order_rank already separated differing kinds"),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Strict same-type equality: `5` never equals `"5"`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => match serde_json::Number::from_f64(n) {
                Some(num) => serde_json::Value::Number(num),
                // JSON has no NaN/Infinity
                None => serde_json::Value::Null,
            },
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
