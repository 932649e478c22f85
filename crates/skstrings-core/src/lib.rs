//! Core graph model and algorithms for probabilistic finite-state acceptors
//! and the sk-strings state-merging induction method.
//!
//! This crate has no knowledge of files, processes, or the command line; the
//! `skstrings-cli` crate drives it. It never prints anything itself.

#![deny(clippy::print_stdout, clippy::print_stderr)]
#![warn(
    clippy::needless_pass_by_value,
    clippy::cloned_instead_of_copied,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::doc_markdown,
    clippy::manual_let_else,
    clippy::implicit_clone
)]

pub mod driver;
pub mod enumerator;
pub mod error;
pub mod format;
pub mod heuristics;
pub mod lookahead;
pub mod pfsa;
pub mod symbol;

pub use driver::{run_skstrings, DriverConfig};
pub use error::CoreError;
pub use heuristics::{Heuristic, HeuristicParams};
pub use pfsa::{Pfsa, StateId};
pub use symbol::SymbolId;
