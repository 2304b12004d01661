use thiserror::Error;

#[derive(Error, Debug)]
pub enum BnvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("No header line (starting with a single '#') found before the first data row")]
    MissingHeader,

    #[error("Unable to extract population from sample column '{column}'. Not set to use unidentifiable populations.")]
    UnresolvedPopulation { column: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Output file already exists: {path} (use --clobber to overwrite)")]
    OutputExists { path: String },
}

pub type Result<T> = std::result::Result<T, BnvError>;
