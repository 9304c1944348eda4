//! Apply a compiled filter to newline-delimited JSON input.
//!
//! The expression compiles once per run; the filter is applied once per
//! input line. Every produced value becomes one JSON line on the output
//! channel, and failures become `{"error", "line", "input"}` records on
//! the error channel so downstream tooling can keep the two streams
//! apart.

use super::CliError;
use crate::output::{to_json, to_json_pretty};
use crate::value::Value;
use std::io::{BufRead, Write};

/// Options for one driver run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The sift expression to compile
    pub expression: String,
    /// Pretty-print produced values
    pub pretty: bool,
    /// Stop at the first failing line instead of continuing
    pub exit_on_error: bool,
}

/// What happened during a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Input lines processed (blank lines are skipped and not counted)
    pub lines: usize,
    /// Produced output values
    pub values: usize,
    /// Lines that failed to parse or evaluate
    pub errors: usize,
}

/// Compile `options.expression` and run it over every line of `input`.
pub fn execute(
    options: &RunOptions,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
) -> Result<RunStats, CliError> {
    let filter = crate::compile(&options.expression).map_err(CliError::Compile)?;

    if let Some(warning) = filter.warning() {
        writeln!(err_out, "warning: {}", warning)?;
    }

    let mut stats = RunStats::default();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = number + 1;
        stats.lines += 1;

        let failure = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(json) => {
                let value = Value::from(json);
                match filter.apply(&value) {
                    Ok(values) => {
                        for value in values {
                            let rendered = if options.pretty {
                                to_json_pretty(&value)
                            } else {
                                to_json(&value)
                            };
                            writeln!(out, "{}", rendered)?;
                            stats.values += 1;
                        }
                        None
                    }
                    Err(e) => Some(e.to_string()),
                }
            }
            Err(e) => Some(format!("Invalid JSON: {}", e)),
        };

        if let Some(message) = failure {
            stats.errors += 1;
            let record = serde_json::json!({
                "error": message,
                "line": number,
                "input": line,
            });
            writeln!(err_out, "{}", record)?;

            if options.exit_on_error {
                break;
            }
        }
    }

    Ok(stats)
}
