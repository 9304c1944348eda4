/// Binary operators of the expression language.
///
/// `Alternative` (`//`) is carried here for uniformity but is handled
/// specially by the code generator: it inspects the whole left stream
/// instead of combining operand pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Logical
    And,
    Or,

    /// Alternative (`//`)
    Alternative,
}

impl BinOp {
    /// Source-text spelling, used by the formatter and in error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Alternative => "//",
        }
    }
}
