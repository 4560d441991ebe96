use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid normalization config: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
