//! Domain errors for the student record store.
//!
//! Every variant carries a stable wire code so the IPC layer can report it without
//! string matching.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The marks file is structurally malformed.
    #[error("format error{}: {message}", line_suffix(.line_no))]
    Format {
        line_no: Option<usize>,
        message: String,
    },

    /// No record matched the code or name.
    #[error("student not found: {0}")]
    NotFound(String),

    /// A caller-supplied or stored value is not acceptable for its field.
    #[error("invalid {field}{}: {message}", line_suffix(.line_no))]
    Input {
        field: String,
        message: String,
        line_no: Option<usize>,
    },

    #[error("student code already exists: {0}")]
    DuplicateCode(String),

    #[error("no student records")]
    EmptyCollection,

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn line_suffix(line_no: &Option<usize>) -> String {
    match line_no {
        Some(n) => format!(" on line {n}"),
        None => String::new(),
    }
}

impl StoreError {
    pub fn input(field: &str, message: impl Into<String>) -> Self {
        StoreError::Input {
            field: field.to_string(),
            message: message.into(),
            line_no: None,
        }
    }

    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Format { .. } => "format_error",
            StoreError::NotFound(_) => "not_found",
            StoreError::Input { .. } => "bad_input",
            StoreError::DuplicateCode(_) => "duplicate_code",
            StoreError::EmptyCollection => "empty_collection",
            StoreError::Io { .. } => "io_failed",
        }
    }
}
