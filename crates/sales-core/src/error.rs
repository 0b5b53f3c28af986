use std::path::PathBuf;
use thiserror::Error;

/// Coarse category of a [`DashboardError`], used by the presentation layer
/// to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Schema,
    Parse,
    Export,
    Config,
    Terminal,
}

/// All errors produced by the sales dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The uploaded file contained no bytes or no header row.
    #[error("Input file is empty")]
    EmptyInput,

    /// The CSV reader rejected the input (bad quoting, ragged records, ...).
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not present in the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// An `InvoiceDate` cell did not match any recognised date format.
    #[error("Invalid invoice date on line {line}: {value:?}")]
    DateParse { line: u64, value: String },

    /// A numeric cell could not be coerced to its column type.
    #[error("Invalid {column} value on line {line}: {value:?}")]
    FieldParse {
        line: u64,
        column: String,
        value: String,
    },

    /// The spreadsheet export could not be produced.
    #[error("Export failed: {0}")]
    Export(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A JSON document could not be produced.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Map the error onto the user-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileRead { .. } | Self::EmptyInput | Self::Csv(_) | Self::Io(_) => ErrorKind::Io,
            Self::MissingColumn(_) => ErrorKind::Schema,
            Self::DateParse { .. } | Self::FieldParse { .. } => ErrorKind::Parse,
            Self::Export(_) | Self::Json(_) => ErrorKind::Export,
            Self::Config(_) => ErrorKind::Config,
            Self::Terminal(_) => ErrorKind::Terminal,
        }
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
