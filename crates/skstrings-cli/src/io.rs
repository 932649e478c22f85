//! File and stdin/stdout I/O with size enforcement and UTF-8 validation.
//!
//! `skstrings-core` never touches the filesystem; all reading and writing
//! happens here.
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use crate::cli::{PathOrStdin, PathOrStdout};
use crate::error::CliError;

/// Reads the entire contents of `source` into a `String`, enforcing
/// `max_size` and UTF-8 validity.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

/// Writes `contents` to `target`, creating or truncating a disk file as needed.
pub fn write_output(target: &PathOrStdout, contents: &str) -> Result<(), CliError> {
    match target {
        PathOrStdout::Path(path) => std::fs::write(path, contents).map_err(|e| CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }),
        PathOrStdout::Stdout => std::io::stdout().write_all(contents.as_bytes()).map_err(|e| {
            CliError::IoError { source: "-".to_string(), detail: e.to_string() }
        }),
    }
}

fn read_file(path: &PathBuf, max_size: u64) -> Result<String, CliError> {
    let file_size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return Err(io_error_to_cli(&e, path)),
    };

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => return Err(io_error_to_cli(&e, path)),
    };

    bytes_to_string(&bytes, &path.display().to_string())
}

fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound { path: path.to_path_buf() },
        std::io::ErrorKind::PermissionDenied => {
            CliError::PermissionDenied { path: path.to_path_buf() }
        }
        _ => CliError::IoError { source: path.display().to_string(), detail: e.to_string() },
    }
}

fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let handle = stdin.lock();

    let mut limited = handle.take(max_size);
    let mut buf: Vec<u8> = Vec::new();
    limited.read_to_end(&mut buf).map_err(|e| CliError::StdinReadError { detail: e.to_string() })?;

    if buf.len() as u64 == max_size {
        let stdin2 = std::io::stdin();
        let mut handle2 = stdin2.lock();
        let mut probe = [0u8; 1];
        let extra = handle2.read(&mut probe).map_err(|e| CliError::StdinReadError { detail: e.to_string() })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge { source: "-".to_string(), limit: max_size, actual: None });
        }
    }

    bytes_to_string(&buf, "-")
}

fn bytes_to_string(bytes: &[u8], source_label: &str) -> Result<String, CliError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => Err(CliError::InvalidUtf8 { source: source_label.to_owned(), byte_offset: e.valid_up_to() }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use std::io::Write as _;

    use super::*;

    fn temp_file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents).expect("write temp file");
        f
    }

    #[test]
    fn read_valid_utf8_file() {
        let content = "0 1 a 3\n";
        let f = temp_file_with(content.as_bytes());
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let result = read_input(&source, 1024).expect("should read file");
        assert_eq!(result, content);
    }

    #[test]
    fn read_file_over_limit_returns_error() {
        let f = temp_file_with(b"0 1 a 3\n");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_input(&source, 2).expect_err("should fail over limit");
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, CliError::FileTooLarge { .. }));
    }

    #[test]
    fn read_nonexistent_file_returns_file_not_found() {
        let source = PathOrStdin::Path(PathBuf::from("/no/such/file/ever.pfsa"));
        let err = read_input(&source, 1024).expect_err("should fail");
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn write_output_roundtrips_through_a_temp_file() {
        let f = tempfile::NamedTempFile::new().expect("create temp file");
        let target = PathOrStdout::Path(f.path().to_path_buf());
        write_output(&target, "0 1 a 3\n").expect("write");
        let back = std::fs::read_to_string(f.path()).expect("read back");
        assert_eq!(back, "0 1 a 3\n");
    }
}
