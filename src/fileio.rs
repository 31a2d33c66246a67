//! File I/O helpers for automation scripts.
//!
//! Thin wrappers over `std::fs` plus the `base64` and `csv` crates:
//! plain reads and writes strip trailing newlines (shell-generated files
//! almost always end with one), [`read_base64_file`] decodes secrets stored
//! Base64-encoded on disk, and [`read_csv`] reads a whole CSV file into
//! rows of strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;

/// Errors from the file helpers.
#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    /// The file could not be read or written.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content is not valid Base64.
    #[error("invalid Base64 content: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decoded content is not valid UTF-8.
    #[error("decoded content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The file is not valid CSV.
    #[error("invalid CSV content: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a file as a string, stripping trailing newlines.
pub fn read_file(path: impl AsRef<Path>) -> Result<String, FileIoError> {
    let content = fs::read_to_string(path)?;
    Ok(content.trim_end_matches('\n').to_string())
}

/// Writes content to a file, stripping trailing newlines first.
pub fn write_file(path: impl AsRef<Path>, content: &str) -> Result<(), FileIoError> {
    fs::write(path, content.trim_end_matches('\n'))?;
    Ok(())
}

/// Reads a file holding Base64-encoded text and returns the decoded
/// content, with trailing newlines stripped.
///
/// An example file can be created with:
/// `(echo "changeme" | base64) > your_filename`
///
/// Whitespace inside the encoded content (line wraps from `base64 -w`) is
/// ignored.
pub fn read_base64_file(path: impl AsRef<Path>) -> Result<String, FileIoError> {
    let encoded: String = read_file(path)?
        .split_whitespace()
        .collect();
    let decoded = STANDARD.decode(encoded)?;
    let content = String::from_utf8(decoded)?;
    Ok(content.trim_end_matches('\n').to_string())
}

/// Reads a CSV file into rows of strings, comma-delimited with standard
/// double-quote handling. Header rows are returned like any other row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, FileIoError> {
    read_csv_with_options(path, b',', Some(b'"'))
}

/// Reads a CSV file with a custom delimiter and quote character. Passing
/// `None` for `quote` disables quote handling entirely. Rows may have
/// unequal lengths.
pub fn read_csv_with_options(
    path: impl AsRef<Path>,
    delimiter: u8,
    quote: Option<u8>,
) -> Result<Vec<Vec<String>>, FileIoError> {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).has_headers(false).flexible(true);
    match quote {
        Some(quote) => {
            builder.quote(quote);
        }
        None => {
            builder.quoting(false);
        }
    }

    let mut reader = builder.from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_file_strips_trailing_newlines() {
        let file = temp_file_with("hello world\n\n");
        assert_eq!(read_file(file.path()).unwrap(), "hello world");
    }

    #[test]
    fn write_file_strips_trailing_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_file(&path, "content\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_file(&path, "line one\nline two").unwrap();
        assert_eq!(read_file(&path).unwrap(), "line one\nline two");
    }

    #[test]
    fn read_base64_file_decodes_content() {
        // "changeme\n" encoded, as produced by `echo changeme | base64`.
        let file = temp_file_with("Y2hhbmdlbWUK\n");
        assert_eq!(read_base64_file(file.path()).unwrap(), "changeme");
    }

    #[test]
    fn read_base64_file_rejects_invalid_content() {
        let file = temp_file_with("not valid base64!!!");
        let err = read_base64_file(file.path()).unwrap_err();
        assert!(matches!(err, FileIoError::Decode(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_file("/nonexistent/file.txt").unwrap_err();
        assert!(matches!(err, FileIoError::Io(_)));
    }

    #[test]
    fn read_csv_returns_all_rows_including_header() {
        let file = temp_file_with("name,value\na,1\nb,2\n");
        let rows = read_csv(file.path()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["name".to_string(), "value".to_string()],
                vec!["a".to_string(), "1".to_string()],
                vec!["b".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn read_csv_handles_quoted_fields() {
        let file = temp_file_with("a,\"x, y\"\n");
        let rows = read_csv(file.path()).unwrap();
        assert_eq!(rows, vec![vec!["a".to_string(), "x, y".to_string()]]);
    }

    #[test]
    fn read_csv_with_custom_delimiter() {
        let file = temp_file_with("a;b;c\n1;2;3\n");
        let rows = read_csv_with_options(file.path(), b';', None).unwrap();
        assert_eq!(rows[0], vec!["a", "b", "c"]);
        assert_eq!(rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn read_csv_allows_ragged_rows() {
        let file = temp_file_with("a,b,c\nd\n");
        let rows = read_csv(file.path()).unwrap();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 1);
    }
}
