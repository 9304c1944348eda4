//! Rendering an AST back to source text.
//!
//! The output round-trips: parsing the rendered text yields a
//! structurally identical AST, modulo whitespace. The renderer is
//! precedence-aware and inserts parentheses wherever a programmatically
//! built tree would otherwise re-associate (parentheses are not AST
//! nodes, so extra ones are free).

use crate::ast::{BinOp, Expr, ExprKind, ObjectField, ObjectKey};
use crate::output;
use crate::value::Value;

/// Formatting configuration.
///
/// Compact output keeps symbols tight (`.a|.b+1`); pretty output adds
/// spaces around operators and lays object fields out one per line,
/// indented with `indent`.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub pretty: bool,
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

/// Render an expression compactly.
pub fn format(expr: &Expr) -> String {
    format_with(expr, &FormatOptions::default())
}

/// Render an expression with explicit options.
pub fn format_with(expr: &Expr, options: &FormatOptions) -> String {
    let mut fmt = Formatter {
        options,
        out: String::new(),
        depth: 0,
    };
    fmt.render(expr, 0);
    fmt.out
}

// Precedence levels, loosest first. Mirrors the parser's chain.
const PREC_PIPE: u8 = 0;
const PREC_COMMA: u8 = 1;
const PREC_ALTERNATIVE: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_NOT: u8 = 5;
const PREC_EQUALITY: u8 = 6;
const PREC_COMPARISON: u8 = 7;
const PREC_ADDITIVE: u8 = 8;
const PREC_MULTIPLICATIVE: u8 = 9;
const PREC_UNARY: u8 = 10;
const PREC_POSTFIX: u8 = 11;
const PREC_ATOM: u8 = 12;

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Pipe(..) => PREC_PIPE,
        ExprKind::Comma(_) => PREC_COMMA,
        ExprKind::Binary { op, .. } => match op {
            BinOp::Alternative => PREC_ALTERNATIVE,
            BinOp::Or => PREC_OR,
            BinOp::And => PREC_AND,
            BinOp::Equal | BinOp::NotEqual => PREC_EQUALITY,
            BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
                PREC_COMPARISON
            }
            BinOp::Add | BinOp::Subtract => PREC_ADDITIVE,
            BinOp::Multiply | BinOp::Divide | BinOp::Modulo => PREC_MULTIPLICATIVE,
        },
        ExprKind::Not(_) => PREC_NOT,
        ExprKind::Neg(_) => PREC_UNARY,
        ExprKind::Field { .. }
        | ExprKind::Index { .. }
        | ExprKind::Slice { .. }
        | ExprKind::Iterate { .. }
        | ExprKind::Optional(_) => PREC_POSTFIX,
        _ => PREC_ATOM,
    }
}

struct Formatter<'a> {
    options: &'a FormatOptions,
    out: String,
    depth: usize,
}

impl Formatter<'_> {
    fn render(&mut self, expr: &Expr, min_prec: u8) {
        if precedence(expr) < min_prec {
            self.out.push('(');
            self.render(expr, 0);
            self.out.push(')');
            return;
        }

        match &expr.kind {
            ExprKind::Identity => self.out.push('.'),
            ExprKind::Recurse => self.out.push_str(".."),

            ExprKind::Field {
                target,
                name,
                optional,
            } => {
                if is_plain_ident(name) {
                    self.render_target(target, false);
                    self.out.push('.');
                    self.out.push_str(name);
                } else {
                    self.render_target(target, true);
                    self.out.push_str("[\"");
                    self.out.push_str(&escape_string(name));
                    self.out.push_str("\"]");
                }
                if *optional {
                    self.out.push('?');
                }
            }

            ExprKind::Index {
                target,
                index,
                optional,
            } => {
                self.render_target(target, true);
                self.out.push('[');
                self.out.push_str(&index.to_string());
                self.out.push(']');
                if *optional {
                    self.out.push('?');
                }
            }

            ExprKind::Slice { target, start, end } => {
                self.render_target(target, true);
                self.out.push('[');
                if let Some(start) = start {
                    self.out.push_str(&start.to_string());
                }
                self.out.push(':');
                if let Some(end) = end {
                    self.out.push_str(&end.to_string());
                }
                self.out.push(']');
            }

            ExprKind::Iterate { target } => {
                self.render_target(target, true);
                self.out.push_str("[]");
            }

            ExprKind::Pipe(left, right) => {
                self.render(left, PREC_PIPE);
                self.op_symbol("|");
                // A pipe on the right was written with parentheses.
                self.render(right, PREC_COMMA);
            }

            ExprKind::Comma(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.render(item, PREC_ALTERNATIVE);
                }
            }

            ExprKind::Optional(inner) => {
                self.render(inner, PREC_POSTFIX);
                self.out.push('?');
            }

            ExprKind::Object(fields) => self.render_object(fields),

            ExprKind::Array(elements) => {
                self.out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.render(element, PREC_ALTERNATIVE);
                }
                self.out.push(']');
            }

            ExprKind::Literal(value) => self.out.push_str(&output::to_json(value)),

            ExprKind::Binary { op, left, right } => {
                let prec = precedence(expr);
                self.render(left, prec);
                match op {
                    BinOp::And | BinOp::Or => {
                        self.out.push(' ');
                        self.out.push_str(op.symbol());
                        self.out.push(' ');
                    }
                    _ => self.op_symbol(op.symbol()),
                }
                self.render(right, prec + 1);
            }

            ExprKind::Not(inner) => {
                self.out.push_str("not ");
                self.render(inner, PREC_NOT);
            }

            ExprKind::Neg(inner) => {
                self.out.push('-');
                self.render(inner, PREC_UNARY);
            }

            ExprKind::If {
                cond,
                then,
                elifs,
                otherwise,
            } => {
                self.out.push_str("if ");
                self.render(cond, PREC_PIPE);
                self.out.push_str(" then ");
                self.render(then, PREC_PIPE);
                for (elif_cond, elif_then) in elifs {
                    self.out.push_str(" elif ");
                    self.render(elif_cond, PREC_PIPE);
                    self.out.push_str(" then ");
                    self.render(elif_then, PREC_PIPE);
                }
                if let Some(otherwise) = otherwise {
                    self.out.push_str(" else ");
                    self.render(otherwise, PREC_PIPE);
                }
                self.out.push_str(" end");
            }

            ExprKind::Map(body) => self.render_call("map", std::slice::from_ref(body)),
            ExprKind::MapValues(body) => self.render_call("map_values", std::slice::from_ref(body)),
            ExprKind::Select(cond) => self.render_call("select", std::slice::from_ref(cond)),
            ExprKind::SortBy(paths) => {
                self.out.push_str("sort_by(");
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.render(path, PREC_ALTERNATIVE);
                }
                self.out.push(')');
            }

            ExprKind::Sort => self.out.push_str("sort"),
            ExprKind::Length => self.out.push_str("length"),
            ExprKind::Keys => self.out.push_str("keys"),
            ExprKind::KeysUnsorted => self.out.push_str("keys_unsorted"),
            ExprKind::ToString => self.out.push_str("tostring"),
            ExprKind::ToNumber => self.out.push_str("tonumber"),
            ExprKind::Empty => self.out.push_str("empty"),
        }
    }

    fn render_call(&mut self, name: &str, args: &[Box<Expr>]) {
        self.out.push_str(name);
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.render(arg, PREC_PIPE);
        }
        self.out.push(')');
    }

    /// Render an access chain's target. A bare identity target is `.`
    /// before a bracket form and empty before `.name`.
    fn render_target(&mut self, target: &Option<Box<Expr>>, bracket_form: bool) {
        match target {
            Some(target) => self.render(target, PREC_POSTFIX),
            None if bracket_form => self.out.push('.'),
            None => {}
        }
    }

    fn render_object(&mut self, fields: &[ObjectField]) {
        if fields.is_empty() {
            self.out.push_str("{}");
            return;
        }

        self.out.push('{');
        self.depth += 1;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            if self.options.pretty {
                self.out.push('\n');
                self.out.push_str(&self.options.indent.repeat(self.depth));
            }

            match &field.key {
                ObjectKey::Static(key) => {
                    if is_plain_ident(key) {
                        self.out.push_str(key);
                    } else {
                        self.out.push('"');
                        self.out.push_str(&escape_string(key));
                        self.out.push('"');
                    }
                }
                ObjectKey::Dynamic(key) => {
                    self.out.push('(');
                    self.render(key, PREC_PIPE);
                    self.out.push(')');
                }
            }

            if let Some(value) = &field.value {
                self.out.push(':');
                if self.options.pretty {
                    self.out.push(' ');
                }
                self.render(value, PREC_ALTERNATIVE);
            }
        }
        self.depth -= 1;
        if self.options.pretty {
            self.out.push('\n');
            self.out.push_str(&self.options.indent.repeat(self.depth));
        }
        self.out.push('}');
    }

    fn op_symbol(&mut self, symbol: &str) {
        if self.options.pretty {
            self.out.push(' ');
            self.out.push_str(symbol);
            self.out.push(' ');
        } else {
            self.out.push_str(symbol);
        }
    }

    fn comma(&mut self) {
        self.out.push(',');
        if self.options.pretty {
            self.out.push(' ');
        }
    }
}

fn is_plain_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}
