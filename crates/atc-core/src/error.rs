use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server configuration error: API key not found. Please contact support.")]
    MissingCredential,
}

pub type Result<T> = std::result::Result<T, AtcError>;
