//! Code generation: turns an AST into a directly invocable [`Filter`].
//!
//! Each AST node becomes one closure capturing the closures of its
//! children, built once per compile; applying the filter never touches
//! the AST again. Every closure maps one input value to a *stream*
//! (`Vec<Value>`) of outputs. Streams are never themselves values:
//! `Pipe`, `Comma`, `Map` and friends compose streams, and only the
//! `Array` construction node collapses a stream into an array value.

use std::sync::Arc;

use crate::{
    ast::{BinOp, Expr, ExprKind, ObjectKey},
    runtime::{self, ExecError},
    value::Value,
};
use indexmap::IndexMap;

type FilterFn = dyn Fn(&Value) -> Result<Vec<Value>, ExecError> + Send + Sync;

/// A compiled expression: a pure function from one value to an ordered
/// stream of values.
///
/// Filters are cheap to clone (the closure tree is shared) and safe to
/// apply concurrently from multiple threads.
///
/// # Examples
///
/// ```
/// use sift_lang::{compile, Value};
///
/// let filter = compile(".name").unwrap();
/// let mut input = indexmap::IndexMap::new();
/// input.insert("name".to_string(), Value::String("John".to_string()));
///
/// let out = filter.apply(&Value::Object(input)).unwrap();
/// assert_eq!(out, vec![Value::String("John".to_string())]);
/// ```
#[derive(Clone)]
pub struct Filter {
    fun: Arc<FilterFn>,
    source: Option<String>,
    warning: Option<String>,
}

impl Filter {
    /// Run the filter against one input value.
    pub fn apply(&self, input: &Value) -> Result<Vec<Value>, ExecError> {
        (self.fun)(input)
    }

    /// The expression this filter was compiled from, when it came
    /// through the textual entry points.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The repair warning, if compilation only succeeded after a
    /// heuristic syntax repair.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub(crate) fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    pub(crate) fn with_warning(mut self, warning: String) -> Self {
        self.warning = Some(warning);
        self
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("source", &self.source)
            .field("warning", &self.warning)
            .finish_non_exhaustive()
    }
}

/// Compile an AST into a filter. Never fails: type errors surface at
/// apply time as `ExecError`.
pub fn generate(expr: &Expr) -> Filter {
    Filter {
        fun: gen_node(expr),
        source: None,
        warning: None,
    }
}

/// Evaluate an access node's target chain: absent target means the
/// node applies to the current input.
fn apply_target(target: &Option<Arc<FilterFn>>, input: &Value) -> Result<Vec<Value>, ExecError> {
    match target {
        Some(f) => f(input),
        None => Ok(vec![input.clone()]),
    }
}

fn gen_node(expr: &Expr) -> Arc<FilterFn> {
    match &expr.kind {
        ExprKind::Identity => Arc::new(|input| Ok(vec![input.clone()])),

        ExprKind::Recurse => Arc::new(|input| {
            let mut out = Vec::new();
            runtime::recurse_collect(input, &mut out);
            Ok(out)
        }),

        ExprKind::Field {
            target,
            name,
            optional,
        } => {
            let target = target.as_deref().map(gen_node);
            let name = name.clone();
            let optional = *optional;
            Arc::new(move |input| {
                let mut out = Vec::new();
                for value in apply_target(&target, input)? {
                    if let Some(v) = runtime::field_access(&value, &name, optional)? {
                        out.push(v);
                    }
                }
                Ok(out)
            })
        }

        ExprKind::Index {
            target,
            index,
            optional,
        } => {
            let target = target.as_deref().map(gen_node);
            let index = *index;
            let optional = *optional;
            Arc::new(move |input| {
                let mut out = Vec::new();
                for value in apply_target(&target, input)? {
                    if let Some(v) = runtime::index_access(&value, index, optional)? {
                        out.push(v);
                    }
                }
                Ok(out)
            })
        }

        ExprKind::Slice { target, start, end } => {
            let target = target.as_deref().map(gen_node);
            let (start, end) = (*start, *end);
            Arc::new(move |input| {
                let mut out = Vec::new();
                for value in apply_target(&target, input)? {
                    out.push(runtime::slice(&value, start, end)?);
                }
                Ok(out)
            })
        }

        ExprKind::Iterate { target } => {
            let target = target.as_deref().map(gen_node);
            Arc::new(move |input| {
                let mut out = Vec::new();
                for value in apply_target(&target, input)? {
                    out.extend(runtime::iterate(&value)?);
                }
                Ok(out)
            })
        }

        ExprKind::Pipe(left, right) => {
            let left = gen_node(left);
            let right = gen_node(right);
            Arc::new(move |input| {
                let mut out = Vec::new();
                for value in left(input)? {
                    out.extend(right(&value)?);
                }
                Ok(out)
            })
        }

        ExprKind::Comma(items) => {
            let items: Vec<Arc<FilterFn>> = items.iter().map(gen_node).collect();
            Arc::new(move |input| {
                let mut out = Vec::new();
                for item in &items {
                    out.extend(item(input)?);
                }
                Ok(out)
            })
        }

        ExprKind::Optional(inner) => {
            let inner = gen_node(inner);
            Arc::new(move |input| match inner(input) {
                Ok(out) => Ok(out),
                Err(_) => Ok(Vec::new()),
            })
        }

        ExprKind::Object(fields) => {
            enum Key {
                Static(String),
                Dynamic(Arc<FilterFn>),
            }

            let fields: Vec<(Key, Arc<FilterFn>)> = fields
                .iter()
                .map(|field| {
                    let value = match (&field.key, &field.value) {
                        (_, Some(expr)) => gen_node(expr),
                        // {key} shorthand: {key: .key}
                        (ObjectKey::Static(name), None) => {
                            let name = name.clone();
                            Arc::new(move |input: &Value| {
                                match runtime::field_access(input, &name, false)? {
                                    Some(v) => Ok(vec![v]),
                                    None => Ok(Vec::new()),
                                }
                            }) as Arc<FilterFn>
                        }
                        (ObjectKey::Dynamic(_), None) => {
                            unreachable!("parser requires a value for dynamic keys")
                        }
                    };
                    let key = match &field.key {
                        ObjectKey::Static(name) => Key::Static(name.clone()),
                        ObjectKey::Dynamic(expr) => Key::Dynamic(gen_node(expr)),
                    };
                    (key, value)
                })
                .collect();

            // One output object per combination of field-value choices,
            // composed left to right.
            Arc::new(move |input| {
                let mut partials: Vec<IndexMap<String, Value>> = vec![IndexMap::new()];

                for (key, value_fn) in &fields {
                    let keys: Vec<String> = match key {
                        Key::Static(name) => vec![name.clone()],
                        Key::Dynamic(f) => f(input)?
                            .into_iter()
                            .map(|k| match k {
                                Value::String(s) => Ok(s),
                                other => Err(ExecError::new(format!(
                                    "Object key must be a string, got {}",
                                    other.type_name()
                                ))),
                            })
                            .collect::<Result<_, _>>()?,
                    };
                    let values = value_fn(input)?;

                    let mut next = Vec::with_capacity(partials.len() * values.len());
                    for partial in &partials {
                        for k in &keys {
                            for v in &values {
                                let mut map = partial.clone();
                                map.insert(k.clone(), v.clone());
                                next.push(map);
                            }
                        }
                    }
                    partials = next;
                }

                Ok(partials.into_iter().map(Value::Object).collect())
            })
        }

        ExprKind::Array(elements) => {
            let elements: Vec<Arc<FilterFn>> = elements.iter().map(gen_node).collect();
            Arc::new(move |input| {
                let mut collected = Vec::new();
                for element in &elements {
                    collected.extend(element(input)?);
                }
                Ok(vec![Value::Array(collected)])
            })
        }

        ExprKind::Literal(value) => {
            let value = value.clone();
            Arc::new(move |_input| Ok(vec![value.clone()]))
        }

        ExprKind::Binary { op, left, right } => {
            let left = gen_node(left);
            let right = gen_node(right);

            if *op == BinOp::Alternative {
                // `//` looks at the left stream as a whole, not at
                // operand pairs.
                return Arc::new(move |input| {
                    let lvals = left(input)?;
                    if lvals.iter().any(Value::is_truthy) {
                        Ok(lvals)
                    } else {
                        right(input)
                    }
                });
            }

            let op = *op;
            Arc::new(move |input| {
                let lvals = left(input)?;
                let rvals = right(input)?;
                let mut out = Vec::with_capacity(lvals.len() * rvals.len());
                for a in &lvals {
                    for b in &rvals {
                        out.push(apply_binop(op, a, b)?);
                    }
                }
                Ok(out)
            })
        }

        ExprKind::Not(inner) => {
            let inner = gen_node(inner);
            Arc::new(move |input| {
                Ok(inner(input)?
                    .iter()
                    .map(|v| Value::Bool(!v.is_truthy()))
                    .collect())
            })
        }

        ExprKind::Neg(inner) => {
            let inner = gen_node(inner);
            Arc::new(move |input| {
                inner(input)?
                    .into_iter()
                    .map(|v| match v {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(ExecError::new(format!(
                            "Cannot negate {}",
                            other.type_name()
                        ))),
                    })
                    .collect()
            })
        }

        ExprKind::If {
            cond,
            then,
            elifs,
            otherwise,
        } => {
            // Desugar elif chains into nested conditionals; an absent
            // else is the identity filter.
            let mut else_branch: Arc<FilterFn> = match otherwise {
                Some(expr) => gen_node(expr),
                None => Arc::new(|input| Ok(vec![input.clone()])),
            };
            for (elif_cond, elif_then) in elifs.iter().rev() {
                else_branch = gen_if(gen_node(elif_cond), gen_node(elif_then), else_branch);
            }
            gen_if(gen_node(cond), gen_node(then), else_branch)
        }

        ExprKind::Map(body) => {
            let body = gen_node(body);
            Arc::new(move |input| {
                let mut collected = Vec::new();
                for item in runtime::iterate(input)? {
                    collected.extend(body(&item)?);
                }
                Ok(vec![Value::Array(collected)])
            })
        }

        ExprKind::MapValues(body) => {
            let body = gen_node(body);
            Arc::new(move |input| match input {
                Value::Array(arr) => {
                    let mut out = Vec::new();
                    for item in arr {
                        if let Some(v) = body(item)?.into_iter().next() {
                            out.push(v);
                        }
                    }
                    Ok(vec![Value::Array(out)])
                }
                Value::Object(map) => {
                    let mut out = IndexMap::new();
                    for (k, v) in map {
                        if let Some(v) = body(v)?.into_iter().next() {
                            out.insert(k.clone(), v);
                        }
                    }
                    Ok(vec![Value::Object(out)])
                }
                other => Err(ExecError::new(format!(
                    "Cannot iterate over {}",
                    other.type_name()
                ))),
            })
        }

        ExprKind::Select(cond) => {
            let cond = gen_node(cond);
            Arc::new(move |input| {
                if cond(input)?.iter().any(Value::is_truthy) {
                    Ok(vec![input.clone()])
                } else {
                    Ok(Vec::new())
                }
            })
        }

        ExprKind::Sort => Arc::new(|input| Ok(vec![runtime::sort_values(input)?])),

        ExprKind::SortBy(paths) => {
            let paths: Vec<Arc<FilterFn>> = paths.iter().map(gen_node).collect();
            Arc::new(move |input| {
                let arr = match input {
                    Value::Array(arr) => arr,
                    other => {
                        return Err(ExecError::new(format!(
                            "Cannot sort {}",
                            other.type_name()
                        )));
                    }
                };

                // One key vector per element; a path producing nothing
                // contributes null, ties keep input order.
                let mut keyed: Vec<(Vec<Value>, Value)> = Vec::with_capacity(arr.len());
                for item in arr {
                    let mut key = Vec::with_capacity(paths.len());
                    for path in &paths {
                        key.push(path(item)?.into_iter().next().unwrap_or(Value::Null));
                    }
                    keyed.push((key, item.clone()));
                }
                keyed.sort_by(|a, b| a.0.cmp(&b.0));

                Ok(vec![Value::Array(
                    keyed.into_iter().map(|(_, v)| v).collect(),
                )])
            })
        }

        ExprKind::Length => Arc::new(|input| Ok(vec![runtime::length_of(input)?])),
        ExprKind::Keys => Arc::new(|input| Ok(vec![runtime::keys_of(input, true)?])),
        ExprKind::KeysUnsorted => Arc::new(|input| Ok(vec![runtime::keys_of(input, false)?])),
        ExprKind::ToString => Arc::new(|input| Ok(vec![runtime::to_string_value(input)])),
        ExprKind::ToNumber => Arc::new(|input| Ok(vec![runtime::to_number_value(input)?])),
        ExprKind::Empty => Arc::new(|_input| Ok(Vec::new())),
    }
}

fn gen_if(cond: Arc<FilterFn>, then: Arc<FilterFn>, otherwise: Arc<FilterFn>) -> Arc<FilterFn> {
    Arc::new(move |input| {
        let mut out = Vec::new();
        for c in cond(input)? {
            if c.is_truthy() {
                out.extend(then(input)?);
            } else {
                out.extend(otherwise(input)?);
            }
        }
        Ok(out)
    })
}

/// Pairwise binary operation; called once per element of the cartesian
/// product of the operand streams.
fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, ExecError> {
    match op {
        BinOp::Add => runtime::add(left, right),
        BinOp::Subtract => runtime::subtract(left, right),
        BinOp::Multiply => runtime::multiply(left, right),
        BinOp::Divide => runtime::divide(left, right),
        BinOp::Modulo => runtime::modulo(left, right),

        // Relational operators use the cross-type total order, so they
        // never raise a type error.
        BinOp::Equal => Ok(Value::Bool(left == right)),
        BinOp::NotEqual => Ok(Value::Bool(left != right)),
        BinOp::LessThan => Ok(Value::Bool(left < right)),
        BinOp::GreaterThan => Ok(Value::Bool(left > right)),
        BinOp::LessEqual => Ok(Value::Bool(left <= right)),
        BinOp::GreaterEqual => Ok(Value::Bool(left >= right)),

        // No short-circuit: both operands may be multi-valued streams.
        BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),

        BinOp::Alternative => unreachable!("Alternative handled in gen_node"),
    }
}
