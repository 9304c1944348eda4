use crate::{
    ast::{BinOp, Expr, ExprKind, ObjectField, ObjectKey, Token, TokenKind},
    lexer::{LexError, Lexer},
    value::Value,
};
use std::mem;

/// A positioned parse error.
///
/// Beyond the message, the error carries structured fields the repair
/// pass inspects: what the parser expected, whether it ran off the end
/// of the input, the stack of delimiters still open at the point of
/// failure, and the quote character of an unterminated string literal.
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    /// Char offset of the offending token in the source expression
    pub pos: usize,
    /// Description of the expected token, if the parser knew one
    pub expected: Option<&'static str>,
    /// True when the parser hit end of input instead of a real token
    pub found_eof: bool,
    /// Open `[`/`{`/`(` delimiters, outermost first
    pub unclosed: Vec<char>,
    /// Quote char of an unterminated string literal
    pub unterminated: Option<char>,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    fn new(message: impl Into<String>, pos: usize) -> Self {
        ParseError {
            message: message.into(),
            pos,
            expected: None,
            found_eof: false,
            unclosed: Vec::new(),
            unterminated: None,
            cause: None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.message, self.pos)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message.clone(),
            pos: e.pos,
            expected: None,
            found_eof: false,
            unclosed: Vec::new(),
            unterminated: e.unterminated,
            cause: Some(Box::new(e)),
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
    delims: Vec<char>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            delims: Vec::new(),
        })
    }

    /// Parse a complete expression, requiring the whole input to be
    /// consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_pipe()?;
        if self.check(&TokenKind::Semicolon) {
            self.advance()?;
        }
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        match self.lexer.next_token() {
            Ok(token) => {
                self.current = token;
                Ok(())
            }
            Err(e) => Err(self.attach_context(ParseError::from(e))),
        }
    }

    fn attach_context(&self, mut err: ParseError) -> ParseError {
        err.unclosed = self.delims.clone();
        err
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(expected.describe()));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let mut err = ParseError::new(
            format!(
                "Expected {}, got {}",
                expected,
                self.current.kind.describe()
            ),
            self.current.pos,
        );
        err.expected = Some(expected);
        err.found_eof = self.current.kind == TokenKind::Eof;
        self.attach_context(err)
    }

    /// Consume an opening delimiter and remember it for diagnostics.
    fn open_delim(&mut self, open: char) -> Result<(), ParseError> {
        self.delims.push(open);
        self.advance()
    }

    fn close_delim(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        self.expect(expected)?;
        self.delims.pop();
        Ok(())
    }

    /// Take ownership of the current token's kind, leaving Eof behind.
    /// The caller must `advance` afterwards.
    fn take_kind(&mut self) -> TokenKind {
        mem::replace(&mut self.current.kind, TokenKind::Eof)
    }

    // ------------------------------------------------------------------
    // Precedence chain, loosest first: | < , < // < or < and < not <
    // equality < comparison < additive < multiplicative < unary minus <
    // postfix.
    // ------------------------------------------------------------------

    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comma()?;

        while self.check(&TokenKind::Pipe) {
            self.advance()?;
            let right = self.parse_comma()?;
            let pos = left.pos;
            left = Expr::new(ExprKind::Pipe(Box::new(left), Box::new(right)), pos);
        }
        Ok(left)
    }

    fn parse_comma(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_alternative()?;

        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let pos = first.pos;
        let mut items = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            items.push(self.parse_alternative()?);
        }
        Ok(Expr::new(ExprKind::Comma(items), pos))
    }

    fn parse_alternative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_or()?;

        while self.check(&TokenKind::SlashSlash) {
            self.advance()?;
            let right = self.parse_or()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op: BinOp::Alternative,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op: BinOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) {
            self.advance()?;
            let right = self.parse_not()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op: BinOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            let pos = self.current.pos;
            self.advance()?;
            let operand = self.parse_not()?;
            return Ok(Expr::new(ExprKind::Not(Box::new(operand)), pos));
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        if let Some(op) = match &self.current.kind {
            TokenKind::EqEq => Some(BinOp::Equal),
            TokenKind::NotEq => Some(BinOp::NotEqual),
            _ => None,
        } {
            self.advance()?;
            let right = self.parse_comparison()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        if let Some(op) = match &self.current.kind {
            TokenKind::Lt => Some(BinOp::LessThan),
            TokenKind::Gt => Some(BinOp::GreaterThan),
            TokenKind::LtEq => Some(BinOp::LessEqual),
            TokenKind::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        } {
            self.advance()?;
            let right = self.parse_additive()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;
            let pos = left.pos;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            let pos = self.current.pos;
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Neg(Box::new(operand)), pos));
        }
        self.parse_postfix()
    }

    // ------------------------------------------------------------------
    // Postfix chains and primaries
    // ------------------------------------------------------------------

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::Dot) {
                let pos = self.current.pos;
                self.advance()?;

                let name = match self.current.kind.ident_text() {
                    Some(name) => name.to_string(),
                    None => return Err(self.unexpected("identifier")),
                };
                self.advance()?;

                expr = Expr::new(
                    ExprKind::Field {
                        target: Self::chain_target(expr),
                        name,
                        optional: false,
                    },
                    pos,
                );
            } else if self.check(&TokenKind::LBracket) {
                let pos = self.current.pos;
                self.open_delim('[')?;
                expr = self.parse_bracket_suffix(expr, pos)?;
            } else if self.check(&TokenKind::Question) {
                self.advance()?;
                expr = Self::make_optional(expr);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// `.` chains compose through `target`; a bare identity target is
    /// stored as `None` so `.[0]` and `.foo` stay flat.
    fn chain_target(expr: Expr) -> Option<Box<Expr>> {
        match expr.kind {
            ExprKind::Identity => None,
            _ => Some(Box::new(expr)),
        }
    }

    /// `?` directly after a field or index access flags that access as
    /// optional; anywhere else it wraps the whole expression.
    fn make_optional(mut expr: Expr) -> Expr {
        let flagged = match &mut expr.kind {
            ExprKind::Field { optional, .. } | ExprKind::Index { optional, .. }
                if !*optional =>
            {
                *optional = true;
                true
            }
            _ => false,
        };

        if flagged {
            expr
        } else {
            let pos = expr.pos;
            Expr::new(ExprKind::Optional(Box::new(expr)), pos)
        }
    }

    /// Everything after a postfix `[`: iteration `[]`, quoted-key access
    /// `["key"]`, index `[1]`, index list `[1,2,3]` (a sequence of index
    /// accesses, never a literal array), and slices `[a:b]`.
    fn parse_bracket_suffix(&mut self, target: Expr, pos: usize) -> Result<Expr, ParseError> {
        let target = Self::chain_target(target);

        if self.check(&TokenKind::RBracket) {
            self.close_delim(TokenKind::RBracket)?;
            return Ok(Expr::new(ExprKind::Iterate { target }, pos));
        }

        if self.check(&TokenKind::String(String::new())) {
            let name = match self.take_kind() {
                TokenKind::String(s) => s,
                _ => unreachable!(),
            };
            self.advance()?;
            self.close_delim(TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::Field {
                    target,
                    name,
                    optional: false,
                },
                pos,
            ));
        }

        if self.check(&TokenKind::Colon) {
            // .[:n]
            self.advance()?;
            let end = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_signed_index()?)
            };
            self.close_delim(TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::Slice {
                    target,
                    start: None,
                    end,
                },
                pos,
            ));
        }

        let first = self.parse_signed_index()?;

        if self.check(&TokenKind::Colon) {
            self.advance()?;
            let end = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_signed_index()?)
            };
            self.close_delim(TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::Slice {
                    target,
                    start: Some(first),
                    end,
                },
                pos,
            ));
        }

        if self.check(&TokenKind::Comma) {
            let mut indices = vec![first];
            while self.check(&TokenKind::Comma) {
                self.advance()?;
                indices.push(self.parse_signed_index()?);
            }
            self.close_delim(TokenKind::RBracket)?;

            let accesses = indices
                .into_iter()
                .map(|index| {
                    Expr::new(
                        ExprKind::Index {
                            target: target.clone(),
                            index,
                            optional: false,
                        },
                        pos,
                    )
                })
                .collect();
            return Ok(Expr::new(ExprKind::Comma(accesses), pos));
        }

        self.close_delim(TokenKind::RBracket)?;
        Ok(Expr::new(
            ExprKind::Index {
                target,
                index: first,
                optional: false,
            },
            pos,
        ))
    }

    fn parse_signed_index(&mut self) -> Result<i64, ParseError> {
        let negative = if self.check(&TokenKind::Minus) {
            self.advance()?;
            true
        } else {
            false
        };

        let pos = self.current.pos;
        match self.current.kind {
            TokenKind::Number(n) => {
                self.advance()?;
                if n.fract() != 0.0 {
                    return Err(self
                        .attach_context(ParseError::new("Array index must be an integer", pos)));
                }
                let n = n as i64;
                Ok(if negative { -n } else { n })
            }
            _ => Err(self.unexpected("number")),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current.pos;

        match self.take_kind() {
            TokenKind::Dot => {
                self.advance()?;
                if let Some(name) = self.current.kind.ident_text() {
                    let name = name.to_string();
                    self.advance()?;
                    return Ok(Expr::new(
                        ExprKind::Field {
                            target: None,
                            name,
                            optional: false,
                        },
                        pos,
                    ));
                }
                // Bare `.`: identity, possibly followed by `[...]`
                Ok(Expr::new(ExprKind::Identity, pos))
            }
            TokenKind::DotDot => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Recurse, pos))
            }

            // Literals
            TokenKind::Number(n) => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::Number(n)), pos))
            }
            TokenKind::String(s) => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::String(s)), pos))
            }
            TokenKind::Bool(b) => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::Bool(b)), pos))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::Null), pos))
            }

            TokenKind::LParen => {
                self.delims.push('(');
                self.advance()?;
                let expr = self.parse_pipe()?;
                self.close_delim(TokenKind::RParen)?;
                Ok(expr)
            }

            TokenKind::LBracket => {
                self.delims.push('[');
                self.advance()?;
                self.parse_array_construction(pos)
            }

            TokenKind::LBrace => {
                self.delims.push('{');
                self.advance()?;
                self.parse_object_construction(pos)
            }

            TokenKind::If => {
                self.advance()?;
                self.parse_conditional(pos)
            }

            TokenKind::Ident(name) => {
                self.advance()?;
                self.parse_builtin(&name, pos)
            }

            kind => {
                // Put the token back so the error reports what we saw.
                self.current.kind = kind;
                Err(self.unexpected("expression"))
            }
        }
    }

    /// `[...]` in primary position: array construction. The element
    /// streams are concatenated into a single array value at runtime.
    fn parse_array_construction(&mut self, pos: usize) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::RBracket) {
            self.close_delim(TokenKind::RBracket)?;
            return Ok(Expr::new(ExprKind::Array(Vec::new()), pos));
        }

        let inner = self.parse_pipe()?;
        self.close_delim(TokenKind::RBracket)?;

        let elements = match inner.kind {
            ExprKind::Comma(items) => items,
            _ => vec![inner],
        };
        Ok(Expr::new(ExprKind::Array(elements), pos))
    }

    fn parse_object_construction(&mut self, pos: usize) -> Result<Expr, ParseError> {
        let mut fields = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            fields.push(self.parse_object_field()?);

            if !self.check(&TokenKind::RBrace) {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.close_delim(TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Object(fields), pos))
    }

    fn parse_object_field(&mut self) -> Result<ObjectField, ParseError> {
        // Dynamic key: {(expr): value}
        if self.check(&TokenKind::LParen) {
            self.open_delim('(')?;
            let key = self.parse_pipe()?;
            self.close_delim(TokenKind::RParen)?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_object_value()?;
            return Ok(ObjectField {
                key: ObjectKey::Dynamic(key),
                value: Some(value),
            });
        }

        // Quoted key: {"x-y": value}
        if self.check(&TokenKind::String(String::new())) {
            let key = match self.take_kind() {
                TokenKind::String(s) => s,
                _ => unreachable!(),
            };
            self.advance()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_object_value()?;
            return Ok(ObjectField {
                key: ObjectKey::Static(key),
                value: Some(value),
            });
        }

        // Bare key, with {key} shorthand for {key: .key}
        if let Some(name) = self.current.kind.ident_text() {
            let key = name.to_string();
            self.advance()?;

            let value = if self.check(&TokenKind::Colon) {
                self.advance()?;
                Some(self.parse_object_value()?)
            } else {
                None
            };
            return Ok(ObjectField {
                key: ObjectKey::Static(key),
                value,
            });
        }

        Err(self.unexpected("object key"))
    }

    /// Object field values bind tighter than `,` (which separates
    /// fields); a pipe or comma inside a value needs parentheses.
    fn parse_object_value(&mut self) -> Result<Expr, ParseError> {
        self.parse_alternative()
    }

    fn parse_conditional(&mut self, pos: usize) -> Result<Expr, ParseError> {
        let cond = self.parse_pipe()?;
        self.expect(TokenKind::Then)?;
        let then = self.parse_pipe()?;

        let mut elifs = Vec::new();
        while self.check(&TokenKind::Elif) {
            self.advance()?;
            let elif_cond = self.parse_pipe()?;
            self.expect(TokenKind::Then)?;
            let elif_then = self.parse_pipe()?;
            elifs.push((elif_cond, elif_then));
        }

        let otherwise = if self.check(&TokenKind::Else) {
            self.advance()?;
            Some(Box::new(self.parse_pipe()?))
        } else {
            None
        };

        self.expect(TokenKind::End)?;

        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then: Box::new(then),
                elifs,
                otherwise,
            },
            pos,
        ))
    }

    /// Builtin function names are plain identifiers resolved here.
    fn parse_builtin(&mut self, name: &str, pos: usize) -> Result<Expr, ParseError> {
        let kind = match name {
            "map" => ExprKind::Map(Box::new(self.parse_unary_arg()?)),
            "map_values" => ExprKind::MapValues(Box::new(self.parse_unary_arg()?)),
            "select" => ExprKind::Select(Box::new(self.parse_unary_arg()?)),
            "sort_by" => {
                let inner = self.parse_unary_arg()?;
                let paths = match inner.kind {
                    ExprKind::Comma(items) => items,
                    _ => vec![inner],
                };
                ExprKind::SortBy(paths)
            }
            "sort" => ExprKind::Sort,
            "length" => ExprKind::Length,
            "keys" => ExprKind::Keys,
            "keys_unsorted" => ExprKind::KeysUnsorted,
            "tostring" => ExprKind::ToString,
            "tonumber" => ExprKind::ToNumber,
            "empty" => ExprKind::Empty,
            _ => {
                return Err(self.attach_context(ParseError::new(
                    format!("Unknown function '{}'", name),
                    pos,
                )));
            }
        };
        Ok(Expr::new(kind, pos))
    }

    fn parse_unary_arg(&mut self) -> Result<Expr, ParseError> {
        self.delims.push('(');
        self.expect(TokenKind::LParen)?;
        let arg = self.parse_pipe()?;
        self.close_delim(TokenKind::RParen)?;
        Ok(arg)
    }
}
