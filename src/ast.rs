//! # Sift Query Language - Abstract Syntax Tree
//!
//! This module defines the AST for sift, a jq-style query language that
//! compiles textual expressions into reusable filters over JSON values.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (access, construction, operations)
//! - **[operators]** - Binary operators (arithmetic, comparison, logical)
//!
//! ## Core Concepts
//!
//! ### Filters and streams
//!
//! A compiled expression is a *filter*: a pure function from one value to
//! an ordered, finite stream of values. The stream is never itself a
//! value - `[1,2]` is one array value, while `1,2` is a stream of two
//! numbers. Only the `[...]` construction node collapses a stream into an
//! array.
//!
//! ### Pipelines
//!
//! ```text
//! .users[] | select(.active) | .name
//! ```
//!
//! Every output of a stage is fed into the next stage; the outputs are
//! concatenated in order.
//!
//! ### Access chains
//!
//! ```text
//! .config.servers[0].host
//! .items[-1]
//! .name[2:5]
//! ```
//!
//! Property, index and slice nodes chain through their optional `target`,
//! and a `?` suffix turns type errors into an empty stream.

pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, ExprKind, ObjectField, ObjectKey};
pub use operators::BinOp;
pub use tokens::{Token, TokenKind};
