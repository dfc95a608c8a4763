use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Table definition the persistence adapters expect. Applying it to a live database is left to
/// whoever provisions that database; the integration tests apply it to their throwaway databases.
pub const TODOS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id          BIGSERIAL PRIMARY KEY,
    subject     TEXT        NOT NULL CHECK (subject <> ''),
    description TEXT        NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Builds a connection pool for the database at [url]. The returned pool is the single storage
/// handle for the whole process and is shared by every request.
pub async fn connect_sqlx(url: &str, max_connections: u32) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect(url)
        .await
        .context("connecting to the database")
}
