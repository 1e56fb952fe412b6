//! Database Module
//!
//! Embedded SurrealDB connection handling and the order/history repositories.

pub mod repository;

use repository::{RepoError, RepoResult};
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, SurrealKv};

/// Open a file-backed database at the given data path (SurrealKV)
pub async fn connect(path: &Path) -> RepoResult<Surreal<Db>> {
    let db = Surreal::new::<SurrealKv>(path)
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;
    select_namespace(&db).await?;
    tracing::info!(path = %path.display(), "database connection established (SurrealKV)");
    Ok(db)
}

/// Open an in-memory database (tests, ephemeral deployments)
pub async fn connect_memory() -> RepoResult<Surreal<Db>> {
    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;
    select_namespace(&db).await?;
    Ok(db)
}

async fn select_namespace(db: &Surreal<Db>) -> RepoResult<()> {
    db.use_ns("storefront")
        .use_db("orders")
        .await
        .map_err(|e| RepoError::Database(format!("Failed to select namespace: {e}")))?;
    Ok(())
}
