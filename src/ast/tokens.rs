/// A lexical token together with the char offset where it starts.
///
/// Positions are carried from the lexer through the parser into AST
/// nodes and parse errors, so diagnostics can always point at the
/// offending spot in the source expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize) -> Self {
        Token { kind, pos }
    }
}

/// The token kinds of the sift expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Number literal (always lexed unsigned; the parser folds a
    /// preceding `-` into a negative literal where grammar allows)
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number(f64),

    /// String literal in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// Boolean literal (`true` / `false`)
    Bool(bool),

    /// Null literal
    Null,

    /// Bare identifier: field names and builtin function names
    ///
    /// Builtins (`map`, `select`, `sort`, `length`, ...) are lexed as
    /// identifiers and resolved by the parser, so they remain usable as
    /// object keys and after `.`.
    ///
    /// # Examples
    /// ```text
    /// name
    /// item_count
    /// _internal
    /// ```
    Ident(String),

    // Structure
    /// Current-input reference and property-access prefix
    ///
    /// # Examples
    /// ```text
    /// .
    /// .name
    /// .items[0]
    /// ```
    Dot,

    /// Recursive descent
    ///
    /// # Examples
    /// ```text
    /// ..
    /// .. | select(. == 2)
    /// ```
    DotDot,

    /// Pipeline operator: feeds every output of the left filter into
    /// the right filter
    ///
    /// # Examples
    /// ```text
    /// .items[] | .name
    /// ```
    Pipe,

    /// Stream concatenation
    ///
    /// # Examples
    /// ```text
    /// .a, .b
    /// .[0,2]
    /// ```
    Comma,

    /// Optional operator: turns execution errors of the preceding
    /// expression into an empty stream
    Question,

    // Arithmetic
    /// Addition, string/array concatenation, object union
    Plus,

    /// Subtraction, array difference
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    /// Alternative operator: right operand when the left stream holds
    /// no truthy value
    ///
    /// # Examples
    /// ```text
    /// .foo // 42
    /// ```
    SlashSlash,

    // Keywords
    /// Logical AND (word, not symbol; no short-circuit, operands may be
    /// multi-valued)
    And,

    /// Logical OR (word, not symbol)
    Or,

    /// Logical negation (word)
    Not,

    /// Conditional keywords: `if cond then a elif cond then b else c end`
    If,
    Then,
    Elif,
    Else,
    End,

    // Delimiters
    /// Left bracket: iteration, indexing, slicing, array construction
    LBracket,

    /// Right bracket
    RBracket,

    /// Left brace for object construction
    LBrace,

    /// Right brace
    RBrace,

    /// Left parenthesis for grouping and dynamic object keys
    LParen,

    /// Right parenthesis
    RParen,

    /// Colon for object fields and slices
    Colon,

    /// Statement separator (accepted, currently equivalent to end of
    /// expression)
    Semicolon,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description used in "expected X, got Y" diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Number(_) => "number",
            TokenKind::String(_) => "string",
            TokenKind::Bool(_) => "boolean",
            TokenKind::Null => "null",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::Pipe => "'|'",
            TokenKind::Comma => "','",
            TokenKind::Question => "'?'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::SlashSlash => "'//'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::End => "'end'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Eof => "end of input",
        }
    }

    /// The identifier-like text of the token, if it has one. Lets the
    /// parser accept keywords as field names (`.not`) and object keys.
    pub fn ident_text(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(name) => Some(name),
            TokenKind::And => Some("and"),
            TokenKind::Or => Some("or"),
            TokenKind::Not => Some("not"),
            TokenKind::If => Some("if"),
            TokenKind::Then => Some("then"),
            TokenKind::Elif => Some("elif"),
            TokenKind::Else => Some("else"),
            TokenKind::End => Some("end"),
            TokenKind::Bool(true) => Some("true"),
            TokenKind::Bool(false) => Some("false"),
            TokenKind::Null => Some("null"),
            _ => None,
        }
    }
}
