use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
