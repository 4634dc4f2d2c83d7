//! Error types for the item and template stores.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i32, reason: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i32 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
