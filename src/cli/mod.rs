//! CLI support for sift
//!
//! Provides programmatic access to the newline-delimited JSON driver
//! for embedding in other tools.

mod run;

pub use run::{RunOptions, RunStats, execute};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Expression failed to compile
    Compile(crate::Error),
    /// IO error on input or output channels
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Compile(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Use --file or pipe JSON lines to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Compile(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
