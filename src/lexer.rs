use crate::ast::{Token, TokenKind};

/// A positioned lexical error.
///
/// `unterminated` records the quote character of an unterminated string
/// literal so the repair pass can close it without re-scanning the
/// source.
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub pos: usize,
    pub unterminated: Option<char>,
}

impl LexError {
    fn new(message: impl Into<String>, pos: usize) -> Self {
        LexError {
            message: message.into(),
            pos,
            unterminated: None,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.message, self.pos)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the whole input up front.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('/') => result.push('/'),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            let mut code = 0u32;
                            for _ in 0..4 {
                                self.advance();
                                let digit = self
                                    .current_char()
                                    .and_then(|c| c.to_digit(16))
                                    .ok_or_else(|| {
                                        LexError::new(
                                            "Invalid \\u escape: expected 4 hex digits",
                                            self.position,
                                        )
                                    })?;
                                code = code * 16 + digit;
                            }
                            result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        Some(ch) => {
                            return Err(LexError::new(
                                format!("Invalid escape sequence: \\{}", ch),
                                self.position,
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError {
            message: "Unterminated string: missing closing quote".to_string(),
            pos: start,
            unterminated: Some(quote),
        })
    }

    fn read_number(&mut self) -> Result<f64, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
            .parse::<f64>()
            .map_err(|_| LexError::new(format!("Invalid number '{}'", number), start))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let pos = self.position;

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('.') => {
                self.advance();
                if self.current_char() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            Some('|') => {
                self.advance();
                TokenKind::Pipe
            }
            Some(',') => {
                self.advance();
                TokenKind::Comma
            }
            Some('?') => {
                self.advance();
                TokenKind::Question
            }
            Some('+') => {
                self.advance();
                TokenKind::Plus
            }
            Some('-') => {
                self.advance();
                TokenKind::Minus
            }
            Some('*') => {
                self.advance();
                TokenKind::Star
            }
            Some('/') => {
                if self.peek_char(1) == Some('/') {
                    self.advance();
                    self.advance();
                    TokenKind::SlashSlash
                } else {
                    self.advance();
                    TokenKind::Slash
                }
            }
            Some('%') => {
                self.advance();
                TokenKind::Percent
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::EqEq
                } else {
                    return Err(LexError::new(
                        "Unexpected '=' (did you mean '=='?)",
                        pos,
                    ));
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(LexError::new(
                        "Unexpected '!' (did you mean '!='?)",
                        pos,
                    ));
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::GtEq
                } else {
                    self.advance();
                    TokenKind::Gt
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::LtEq
                } else {
                    self.advance();
                    TokenKind::Lt
                }
            }
            Some('[') => {
                self.advance();
                TokenKind::LBracket
            }
            Some(']') => {
                self.advance();
                TokenKind::RBracket
            }
            Some('{') => {
                self.advance();
                TokenKind::LBrace
            }
            Some('}') => {
                self.advance();
                TokenKind::RBrace
            }
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some(':') => {
                self.advance();
                TokenKind::Colon
            }
            Some(';') => {
                self.advance();
                TokenKind::Semicolon
            }
            Some('"') => TokenKind::String(self.read_string('"')?),
            Some('\'') => TokenKind::String(self.read_string('\'')?),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "if" => TokenKind::If,
                    "then" => TokenKind::Then,
                    "elif" => TokenKind::Elif,
                    "else" => TokenKind::Else,
                    "end" => TokenKind::End,
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    "null" => TokenKind::Null,
                    _ => TokenKind::Ident(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => TokenKind::Number(self.read_number()?),
            Some(ch) => {
                return Err(LexError::new(format!("Unexpected character '{}'", ch), pos));
            }
        };

        Ok(Token::new(kind, pos))
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not true false null");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::And);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Not);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Bool(true));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Bool(false));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Null);
}

#[test]
fn test_pipe() {
    let mut lexer = Lexer::new(".items[] | select(.x > 5)");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Ident("items".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Pipe);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Ident("select".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LParen);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Ident("x".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Gt);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number(5.0));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RParen);
}
