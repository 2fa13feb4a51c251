use thiserror::Error;

/// Main error type for Codetell operations
#[derive(Error, Debug)]
pub enum CodetellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Structural error: {0}")]
    Structure(String),

    #[error("Malformed declaration: {0}")]
    ArgumentShape(String),

    #[error("Rank solver error: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodetellError>;
