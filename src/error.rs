use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(
        "Ledger header is missing required column(s): {}. Check that the worksheet still has these headers in its first row.",
        .missing.join(", ")
    )]
    SchemaError { missing: Vec<String> },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Spreadsheet export failed: {0}")]
    ExportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[cfg(feature = "sheets")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[cfg(feature = "sheets")]
    #[error("Sheets API error (status {status}): {body}")]
    SheetsError { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
