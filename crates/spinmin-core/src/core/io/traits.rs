use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Parse error in '{path}' on line {line}: {kind}")]
    Parse {
        path: String,
        line: usize,
        kind: TableParseErrorKind,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Error, PartialEq)]
pub enum TableParseErrorKind {
    #[error("Expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
    #[error("Invalid integer in column {column} (value: '{value}')")]
    InvalidInt { column: usize, value: String },
    #[error("Invalid float in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
}

impl TableError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }

    fn with_path(self, path: &Path) -> Self {
        let path = path.to_string_lossy().to_string();
        match self {
            Self::Io { source, .. } => Self::Io { path, source },
            Self::Parse { line, kind, .. } => Self::Parse { path, line, kind },
            Self::Csv { source, .. } => Self::Csv { path, source },
        }
    }
}

/// Label used in errors raised while reading from an anonymous stream.
pub const STREAM_LABEL: &str = "<stream>";

/// A whitespace-separated table with one record per line.
///
/// Blank lines and lines whose first non-blank character is `#` are skipped.
/// Implementors only describe how the columns of a single line map to a
/// record; line bookkeeping and error reporting are shared.
pub trait TableFile {
    /// The typed row produced from one line.
    type Record;

    /// Minimum number of columns a data line must carry.
    const MIN_COLUMNS: usize;

    /// Converts the columns of one data line into a record. `fields` holds at
    /// least [`Self::MIN_COLUMNS`] entries.
    fn parse_record(fields: &[&str]) -> Result<Self::Record, TableParseErrorKind>;

    /// Reads every record from a buffered reader.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, TableError> {
        let mut records = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| TableError::Io {
                path: STREAM_LABEL.to_string(),
                source: e,
            })?;
            let line_num = line_num + 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let parsed = if fields.len() < Self::MIN_COLUMNS {
                Err(TableParseErrorKind::TooFewColumns {
                    expected: Self::MIN_COLUMNS,
                    found: fields.len(),
                })
            } else {
                Self::parse_record(&fields)
            };

            records.push(parsed.map_err(|kind| TableError::Parse {
                path: STREAM_LABEL.to_string(),
                line: line_num,
                kind,
            })?);
        }
        Ok(records)
    }

    /// Reads every record from the file at `path`.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self::Record>, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TableError::io(path, e))?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader).map_err(|e| e.with_path(path))
    }
}

/// Parses a 1-based column as a non-negative integer.
///
/// Integral float spellings such as `3.0` or `1.2e1` are accepted, since
/// some writers emit every column in floating-point format.
pub(crate) fn int_column(fields: &[&str], column: usize) -> Result<usize, TableParseErrorKind> {
    let value = fields[column - 1];
    if let Ok(v) = value.parse::<usize>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < usize::MAX as f64 => {
            Ok(v as usize)
        }
        _ => Err(TableParseErrorKind::InvalidInt {
            column,
            value: value.to_string(),
        }),
    }
}

/// Parses a 1-based column as a float.
pub(crate) fn float_column(fields: &[&str], column: usize) -> Result<f64, TableParseErrorKind> {
    let value = fields[column - 1];
    value
        .parse::<f64>()
        .map_err(|_| TableParseErrorKind::InvalidFloat {
            column,
            value: value.to_string(),
        })
}
