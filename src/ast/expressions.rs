use crate::ast::BinOp;
use crate::value::Value;

/// An AST node: an expression kind plus the char offset of the source
/// text it was parsed from.
///
/// Nodes are plain data. They may be constructed, inspected and rewritten
/// programmatically and then handed to `compile_from_ast`, independently
/// of the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: usize) -> Self {
        Expr { kind, pos }
    }
}

/// The expression kinds of the sift language.
///
/// Access nodes (`Field`, `Index`, `Slice`, `Iterate`) carry an optional
/// `target`: `None` means they apply to the current input (`.name`),
/// `Some` chains them onto another expression (`.a.b`, `.users[0]`).
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// The identity filter `.`: emits the input unchanged.
    Identity,

    /// Recursive descent `..`: the input and every nested value,
    /// depth-first in pre-order.
    Recurse,

    /// Property access
    ///
    /// # Examples
    /// ```text
    /// .name
    /// .foo["x-y"]
    /// .config.port?
    /// ```
    Field {
        target: Option<Box<Expr>>,
        name: String,
        /// `?` suffix: suppress the type error on scalar input
        optional: bool,
    },

    /// Array index access, negative counts from the end
    ///
    /// # Examples
    /// ```text
    /// .[0]
    /// .items[-1]
    /// ```
    Index {
        target: Option<Box<Expr>>,
        index: i64,
        optional: bool,
    },

    /// Array or string slice; missing bounds default to the ends
    ///
    /// # Examples
    /// ```text
    /// .[1:3]
    /// .items[:2]
    /// .name[-3:]
    /// ```
    Slice {
        target: Option<Box<Expr>>,
        start: Option<i64>,
        end: Option<i64>,
    },

    /// Array/object iteration `[]`: each element (or object value) as a
    /// separate stream item
    ///
    /// # Examples
    /// ```text
    /// .[]
    /// .users[]
    /// ```
    Iterate { target: Option<Box<Expr>> },

    /// Pipeline: every output of `left` fed through `right`, outputs
    /// concatenated in order
    Pipe(Box<Expr>, Box<Expr>),

    /// Stream concatenation (comma): each expression evaluated against
    /// the same input, outputs concatenated in declared order
    Comma(Vec<Expr>),

    /// Optional wrapper `expr?`: execution errors become an empty stream
    Optional(Box<Expr>),

    /// Object construction
    ///
    /// Produces one object per combination of field-value choices,
    /// composing fields left to right.
    ///
    /// # Examples
    /// ```text
    /// {name: .user, "x-y": 1}
    /// {(.key): .value}
    /// {id}
    /// ```
    Object(Vec<ObjectField>),

    /// Array construction: collects the concatenated streams of all
    /// element expressions into a single array value
    ///
    /// # Examples
    /// ```text
    /// [.a, .b]
    /// [.items[]]
    /// ```
    Array(Vec<Expr>),

    /// Literal value
    Literal(Value),

    /// Binary operation (arithmetic, comparison, logical, alternative)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical negation `not expr`, per-value truthiness inversion
    Not(Box<Expr>),

    /// Unary minus
    Neg(Box<Expr>),

    /// Conditional with chained `elif`s; an absent `else` passes the
    /// input through unchanged
    ///
    /// # Examples
    /// ```text
    /// if .a > 1 then "big" elif .a > 0 then "small" else "none" end
    /// ```
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        elifs: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },

    /// `map(body)`: body applied to each element, all outputs collected
    /// into one array
    Map(Box<Expr>),

    /// `map_values(body)`: first body output per element/value, shape
    /// preserved, elements producing nothing dropped
    MapValues(Box<Expr>),

    /// `select(cond)`: the input itself when the condition holds
    Select(Box<Expr>),

    /// `sort`: array sorted by the cross-type total order
    Sort,

    /// `sort_by(paths)`: array sorted by a key vector per element
    ///
    /// # Examples
    /// ```text
    /// sort_by(.age)
    /// sort_by(.last, .first)
    /// ```
    SortBy(Vec<Expr>),

    /// `length`: string codepoint count, number magnitude, element/key
    /// count, 0 for null
    Length,

    /// `keys`: sorted object keys or array index list
    Keys,

    /// `keys_unsorted`: object keys in insertion order
    KeysUnsorted,

    /// `tostring`: value rendered as a JSON string
    ToString,

    /// `tonumber`: numeric string (or number) to number
    ToNumber,

    /// `empty`: yields nothing
    Empty,
}

/// One field of an object construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub key: ObjectKey,
    /// `None` is the shorthand `{key}`, meaning `{key: .key}`.
    pub value: Option<Expr>,
}

/// Static or computed object key.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    /// Bare identifier or string literal key
    Static(String),
    /// Parenthesized key expression `{(expr): ...}`
    Dynamic(Expr),
}
