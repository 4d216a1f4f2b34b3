use common::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file is missing, unreadable or not the expected JSON shape.
    #[error("Input error: {0}")]
    Input(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Username is already taken: {0}")]
    UsernameTaken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Password hash error: {0}")]
    Hash(String),

    /// A destructive operation was requested without confirmation.
    #[error("Not confirmed: {0}")]
    NotConfirmed(String),
}

impl From<argon2::password_hash::Error> for AdminError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AdminError::Hash(e.to_string())
    }
}

impl From<argon2::Error> for AdminError {
    fn from(e: argon2::Error) -> Self {
        AdminError::Hash(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AdminError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AdminError::Hash(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
