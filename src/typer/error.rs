use crate::typer::{store::StoreError, token, validate::Violation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("registration input rejected")]
    ValidationFailed(Vec<Violation>),

    #[error("user is already registered")]
    AlreadyRegistered,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("user not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("token error: {0}")]
    Token(#[from] token::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => Self::AlreadyRegistered,
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
