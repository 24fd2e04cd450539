use sqlx::SqlitePool;
use tracing::info;

/// Create the schema on a fresh database. Safe to run on every startup.
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Users: `email` compares case-insensitively so "A@x.com" and "a@x.com"
    // are the same account.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id               TEXT    PRIMARY KEY,
            firstname        TEXT    NOT NULL,
            lastname         TEXT    NOT NULL,
            email            TEXT    NOT NULL UNIQUE COLLATE NOCASE,
            password_hash    TEXT    NOT NULL,
            role             TEXT    NOT NULL DEFAULT 'user',
            avatar_public_id TEXT,
            avatar_url       TEXT    NOT NULL,
            created_at       INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id              TEXT    PRIMARY KEY,
            project_title   TEXT    NOT NULL UNIQUE,
            description     TEXT    NOT NULL DEFAULT '',
            price           REAL    NOT NULL DEFAULT 0,
            product_type    TEXT    NOT NULL DEFAULT '',
            image_public_id TEXT,
            image_url       TEXT    NOT NULL,
            activation      INTEGER NOT NULL DEFAULT 1,
            created_at      INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at)")
        .execute(pool)
        .await?;

    info!("Database schema ready");
    Ok(())
}
