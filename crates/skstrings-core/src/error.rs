//! Fatal error conditions raised by the graph model and the sk-strings engine.
//!
//! Every variant here is fatal by construction: the spec's error model draws
//! a hard line between conditions that are recoverable (CLI flag validation,
//! which resets to a default and warns — see `skstrings-cli::error`) and
//! conditions that are not (allocation/limit/overflow). This enum only ever
//! holds the latter.

use std::fmt;

/// Errors that `skstrings-core` can raise. All are fatal: the caller should
/// terminate, not retry or recover a partially built graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The symbol table has no room for another distinct label.
    SymbolTableFull {
        /// The configured capacity that was exceeded.
        limit: usize,
    },
    /// Adding another node would exceed the configured node limit.
    NodeLimitExceeded {
        /// The configured capacity that was exceeded.
        limit: usize,
    },
    /// A single state's k-string enumeration produced more entries than the
    /// configured cap allows.
    EnumeratorOverflow {
        /// The state whose enumeration overflowed.
        state: u32,
        /// The configured cap.
        cap: usize,
    },
    /// The PFSA text format was malformed.
    FormatError {
        /// 1-based line number of the offending line.
        line: usize,
        /// Human-readable description of the problem.
        detail: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::SymbolTableFull { limit } => {
                write!(f, "symbol table is full (limit {limit}); too many distinct arc labels")
            }
            CoreError::NodeLimitExceeded { limit } => {
                write!(f, "node limit exceeded (limit {limit}); the PFSA has too many states")
            }
            CoreError::EnumeratorOverflow { state, cap } => {
                write!(
                    f,
                    "k-string enumeration from state {state} exceeded the cap of {cap} entries; \
                     raise Minprob to prune more aggressively"
                )
            }
            CoreError::FormatError { line, detail } => {
                write!(f, "line {line}: {detail}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
