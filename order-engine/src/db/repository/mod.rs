//! Repository Module
//!
//! SurrealDB-backed implementations of the order and history store traits.

pub mod history;
pub mod order;

// Re-exports
pub use history::HistoryRepository;
pub use order::OrderRepository;

use crate::store::StoreError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for StoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => StoreError::NotFound(msg),
            RepoError::Duplicate(msg) => StoreError::Duplicate(msg),
            RepoError::Database(msg) => StoreError::Backend(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
