//! SQLite-backed record store: pool lifecycle, schema bootstrap, domain
//! models, and repositories.
//!
//! The pool is capped at a single connection. The store has one logical
//! writer at a time, and a one-connection pool makes that discipline
//! structural; it also keeps `sqlite::memory:` databases coherent across
//! operations, which the tests rely on.

pub mod models;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

const CREATE_PROJECTS: &str = "CREATE TABLE IF NOT EXISTS projects ( \
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        name TEXT NOT NULL, \
        created_at TEXT NOT NULL \
    )";

const CREATE_CLIENTS: &str = "CREATE TABLE IF NOT EXISTS clients ( \
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        code TEXT NOT NULL UNIQUE, \
        first_name TEXT NOT NULL, \
        last_name TEXT NOT NULL, \
        delivered INTEGER NOT NULL DEFAULT 0, \
        delivered_at TEXT, \
        delivery_note TEXT, \
        project_id INTEGER NOT NULL REFERENCES projects(id) \
    )";

/// Open the store at `database_url`, creating the file if missing.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Create the `projects` and `clients` tables if they do not exist.
///
/// There is no migration story: a schema change drops and recreates the
/// store file.
pub async fn init_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_PROJECTS).execute(pool).await?;
    sqlx::query(CREATE_CLIENTS).execute(pool).await?;
    tracing::debug!("schema ready");
    Ok(())
}

/// Cheap liveness probe for the store connection.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// Irreversibly remove every client and project.
///
/// First step of a re-import: the old generation is gone before any row
/// of the new one is committed.
pub async fn reset_generation(pool: &DbPool) -> Result<(), sqlx::Error> {
    let clients = repositories::ClientRepo::delete_all(pool).await?;
    let projects = repositories::ProjectRepo::delete_all(pool).await?;
    tracing::debug!(clients, projects, "generation cleared");
    Ok(())
}
