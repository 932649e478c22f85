/// CLI error types with associated exit codes.
///
/// Unlike the teacher crate's two-tier (1 vs 2) split, every [`CliError`]
/// variant here exits `1`: the spec draws no distinction between "couldn't
/// read the input" and "the algorithm hit a fatal condition" — both mean the
/// run didn't produce a result.
use std::fmt;
use std::path::PathBuf;

use skstrings_core::CoreError;

/// All error conditions that the `skstr` binary can produce.
#[derive(Debug)]
pub enum CliError {
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },
    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },
    /// The input exceeds the configured max file size.
    FileTooLarge {
        /// A human-readable label for the source (`"-"` for stdin, or the path).
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known.
        actual: Option<u64>,
    },
    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },
    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },
    /// A generic I/O error, including failures writing output.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },
    /// `-H` named a heuristic this binary doesn't recognise. Unlike the
    /// other flag-validation failures (§10.3), this one is fatal rather
    /// than reset-to-default-with-warning.
    UnknownHeuristic {
        /// The unrecognised name as given on the command line.
        name: String,
    },
    /// A fatal condition surfaced by the core library.
    Core(CoreError),
}

impl CliError {
    /// The process exit code for this error. Always `1`.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// A human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => format!("error: file not found: {}", path.display()),
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge { source, limit, actual: Some(actual) } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge { source, limit, actual: None } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 { source, byte_offset } => {
                format!("error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}")
            }
            Self::StdinReadError { detail } => format!("error: failed to read stdin: {detail}"),
            Self::IoError { source, detail } => format!("error: I/O error on {source}: {detail}"),
            Self::UnknownHeuristic { name } => format!(
                "error: unknown heuristic {name:?} (expected one of: and, or, lax, strict, xentropic, vardist)"
            ),
            Self::Core(e) => format!("error: {e}"),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}
