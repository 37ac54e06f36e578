// src/store.rs

//! Key-value blob store.
//!
//! All persisted content lives in a single `kv` table of
//! `(key TEXT PRIMARY KEY, value BLOB)`. Models are serialized to JSON
//! blobs by their handlers; keys are namespaced with a prefix such as
//! `page:` or `user:`.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;

pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<Vec<u8>>, AppError> {
    let value = sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM kv WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Inserts or overwrites the blob at `key`.
pub async fn put(pool: &SqlitePool, key: &str, value: &[u8]) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts only if `key` is absent. Returns false when the key already
/// exists, so callers can map that to a 409 without a read-then-write race.
pub async fn insert(pool: &SqlitePool, key: &str, value: &[u8]) -> Result<bool, AppError> {
    let result = sqlx::query("INSERT OR IGNORE INTO kv (key, value) VALUES (?1, ?2)")
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns false when there was nothing to delete.
pub async fn delete(pool: &SqlitePool, key: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM kv WHERE key = ?1")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Lists all blobs whose key starts with `prefix`, ordered by key.
///
/// Prefixes are internal namespace constants, never user input, so plain
/// LIKE matching is safe here.
pub async fn list_prefix(
    pool: &SqlitePool,
    prefix: &str,
) -> Result<Vec<(String, Vec<u8>)>, AppError> {
    let rows = sqlx::query("SELECT key, value FROM kv WHERE key LIKE ?1 || '%' ORDER BY key")
        .bind(prefix)
        .fetch_all(pool)
        .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        entries.push((row.try_get("key")?, row.try_get("value")?));
    }

    Ok(entries)
}
