use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Splice error: {0}")]
    Splice(String),

    #[error("Config error: {0}")]
    Config(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, CurveError>;
