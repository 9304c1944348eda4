//! Bounded heuristic repair of malformed expressions.
//!
//! When a parse fails, `compile` makes one second-chance attempt with a
//! mechanically repaired source string. The heuristics inspect only the
//! structured fields of [`ParseError`] - the recorded unterminated
//! quote, the open-delimiter stack, the expected-token description -
//! never the error message text. A successful repair is reported as a
//! warning on the compiled filter; a failed one surfaces as
//! [`RecoveryError`] chaining the original error.

use crate::parser::ParseError;

/// A failed second-chance compile. The original parse error is the
/// cause; the repaired attempt's failure is summarized in the message.
#[derive(Debug)]
pub struct RecoveryError {
    pub message: String,
    cause: ParseError,
}

impl RecoveryError {
    pub(crate) fn new(message: String, original: ParseError) -> Self {
        RecoveryError {
            message,
            cause: original,
        }
    }

    /// The parse error that triggered the repair attempt.
    pub fn original(&self) -> &ParseError {
        &self.cause
    }
}

impl std::fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RecoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Propose a repaired source string for a failed parse, together with a
/// human-readable description of what was changed. Returns `None` when
/// no heuristic applies.
pub fn attempt_repair(source: &str, error: &ParseError) -> Option<(String, String)> {
    // Missing comma between object/array entries: insert one in front
    // of the offending token.
    if error.expected == Some("','") && !error.found_eof {
        if let Some(&open) = error.unclosed.last() {
            if open == '{' || open == '[' {
                let mut chars: Vec<char> = source.chars().collect();
                if error.pos <= chars.len() {
                    chars.insert(error.pos, ',');
                    let repaired: String = chars.into_iter().collect();
                    return Some((
                        repaired,
                        format!("inserted missing ',' at position {}", error.pos),
                    ));
                }
            }
        }
    }

    let mut repaired = source.to_string();
    let mut changes = Vec::new();

    if let Some(quote) = error.unterminated {
        repaired.push(quote);
        changes.push(format!("closed unterminated string with {}", quote));
    }

    if (error.found_eof || error.unterminated.is_some()) && !error.unclosed.is_empty() {
        for &open in error.unclosed.iter().rev() {
            let close = match open {
                '[' => ']',
                '{' => '}',
                '(' => ')',
                _ => continue,
            };
            repaired.push(close);
            changes.push(format!("closed unbalanced '{}' with '{}'", open, close));
        }
    }

    if changes.is_empty() {
        return None;
    }
    Some((repaired, changes.join(", ")))
}
