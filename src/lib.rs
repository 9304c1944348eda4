//! # sift - a jq-style query language
//!
//! Compiles textual expressions like `.users[] | select(.active) | .name`
//! into reusable [`Filter`]s: pure functions from one JSON [`Value`] to
//! an ordered stream of result values.
//!
//! ```
//! use sift_lang::{query, Value};
//!
//! let input: Value = serde_json::json!({"name": "John"}).into();
//! let out = query(".name", &input).unwrap();
//! assert_eq!(out, vec![Value::String("John".to_string())]);
//! ```
//!
//! The pipeline is `text -> Lexer -> tokens -> Parser -> AST -> generate
//! -> Filter`. Each stage is public: [`parse`] exposes the AST for
//! programmatic inspection or rewriting, [`compile_from_ast`] turns a
//! (possibly hand-built) AST into a filter, and [`format`] renders an
//! AST back to source text.

pub mod ast;
pub mod cache;
pub mod codegen;
#[cfg(feature = "cli")]
pub mod cli;
pub mod format;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod repair;
pub mod runtime;
pub mod value;

pub use ast::{BinOp, Expr, ExprKind, ObjectField, ObjectKey, Token, TokenKind};
pub use cache::CompileCache;
pub use codegen::{Filter, generate};
pub use format::{FormatOptions, format, format_with};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use repair::RecoveryError;
pub use runtime::ExecError;
pub use value::Value;

/// Any failure the library surfaces: a parse error, a failed
/// second-chance repair, or a runtime execution error.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Recovery(RecoveryError),
    Exec(ExecError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Recovery(e) => write!(f, "Parse error: {}", e),
            Error::Exec(e) => write!(f, "Execution error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Recovery(e) => Some(e),
            Error::Exec(e) => Some(e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<ExecError> for Error {
    fn from(e: ExecError) -> Self {
        Error::Exec(e)
    }
}

/// Options for [`compile_with`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Use the process-wide compile cache (on by default).
    pub cache: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { cache: true }
    }
}

/// Parse an expression into its AST.
pub fn parse(expression: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(expression))?.parse()
}

/// Compile an expression into a reusable [`Filter`], using the
/// process-wide cache.
///
/// On a parse error, one bounded heuristic repair attempt is made (see
/// [`repair`]); if it succeeds the filter carries a
/// [`warning`](Filter::warning) describing the repair.
pub fn compile(expression: &str) -> Result<Filter, Error> {
    compile_cached(expression, CompileCache::global())
}

/// Compile with explicit options.
pub fn compile_with(expression: &str, options: &CompileOptions) -> Result<Filter, Error> {
    if options.cache {
        compile_cached(expression, CompileCache::global())
    } else {
        compile_uncached(expression)
    }
}

/// Compile against a caller-owned cache.
pub fn compile_cached(expression: &str, cache: &CompileCache) -> Result<Filter, Error> {
    if let Some(filter) = cache.get(expression) {
        return Ok(filter);
    }
    let filter = compile_uncached(expression)?;
    cache.insert(expression, filter.clone());
    Ok(filter)
}

/// Compile an already-built AST. Cannot fail: all remaining errors are
/// runtime `ExecError`s.
pub fn compile_from_ast(ast: &Expr) -> Filter {
    generate(ast)
}

/// Compile and apply in one step, without caching the filter beyond the
/// call.
pub fn query(expression: &str, input: &Value) -> Result<Vec<Value>, Error> {
    let filter = compile_uncached(expression)?;
    filter.apply(input).map_err(Error::Exec)
}

/// Like [`query`], but never fails: any parse or execution error
/// becomes an empty result stream.
pub fn safe_query(expression: &str, input: &Value) -> Vec<Value> {
    query(expression, input).unwrap_or_default()
}

fn compile_uncached(expression: &str) -> Result<Filter, Error> {
    let original = match parse(expression) {
        Ok(ast) => return Ok(generate(&ast).with_source(expression.to_string())),
        Err(e) => e,
    };

    let Some((repaired, description)) = repair::attempt_repair(expression, &original) else {
        return Err(Error::Parse(original));
    };

    match parse(&repaired) {
        Ok(ast) => Ok(generate(&ast)
            .with_source(expression.to_string())
            .with_warning(format!("expression repaired: {}", description))),
        Err(second) => Err(Error::Recovery(RecoveryError::new(
            format!(
                "Repair ({}) did not fix the expression: {}",
                description, second
            ),
            original,
        ))),
    }
}
