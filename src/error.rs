use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssayError {
    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Insufficient data for {what}: found {found}, need at least {required}")]
    InsufficientData {
        what: &'static str,
        found: usize,
        required: usize,
    },

    #[error("Non-numeric input at {location}: '{value}'")]
    NonNumericInput { location: String, value: String },

    #[error("Baseline concentration C0 is zero; consumption undefined for well {well}")]
    DivisionByZero { well: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("Cannot write workbook {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Configuration: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Coarse classification of an [`AssayError`], for callers that report
/// failures without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingSheet,
    InsufficientData,
    NonNumericInput,
    DivisionByZero,
    Io,
    Config,
    Internal,
}

impl AssayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSheet { .. } => ErrorKind::MissingSheet,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::NonNumericInput { .. } => ErrorKind::NonNumericInput,
            Self::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            Self::Io(_) | Self::Workbook { .. } | Self::Write { .. } => ErrorKind::Io,
            Self::Config(_) | Self::ConfigParse(_) => ErrorKind::Config,
            Self::Polars(_) => ErrorKind::Internal,
        }
    }

    /// Offending plate position or well label, where the error has one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::NonNumericInput { location, .. } => Some(location),
            Self::DivisionByZero { well } => Some(well),
            Self::MissingSheet { sheet, .. } => Some(sheet),
            _ => None,
        }
    }
}

#[cfg(feature = "python")]
impl From<AssayError> for pyo3::PyErr {
    fn from(err: AssayError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyOSError, PyRuntimeError, PyValueError};

        let message = err.to_string();
        match err.kind() {
            ErrorKind::MissingSheet => PyKeyError::new_err(message),
            ErrorKind::InsufficientData
            | ErrorKind::NonNumericInput
            | ErrorKind::DivisionByZero
            | ErrorKind::Config => PyValueError::new_err(message),
            ErrorKind::Io => PyOSError::new_err(message),
            ErrorKind::Internal => PyRuntimeError::new_err(message),
        }
    }
}
