use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid base path: {0}")]
    InvalidBasePath(String),

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),
}

pub type AppResult<T> = Result<T, AppError>;
