//! Database layer: migrations and the event journal.

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, JournalEntry};

/// Establish a SQLite connection pool and run pending migrations.
///
/// In-memory databases get a single long-lived connection, since every
/// connection to `sqlite::memory:` is its own database.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let in_memory = url.contains(":memory:");

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let mut pool = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
    if in_memory {
        pool = pool.idle_timeout(None).max_lifetime(None);
    }
    let pool = pool.connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Append a batch of events in one transaction, preserving their order.
pub async fn insert_events(pool: &SqlitePool, entries: &[JournalEntry]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO events
                (event_type, campaign_id, actor, amount, data, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(entry.event_type)
        .bind(entry.campaign_id)
        .bind(&entry.actor)
        .bind(&entry.amount)
        .bind(&entry.data)
        .bind(entry.recorded_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(entries.len())
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given campaign, in commit order.
pub async fn get_events_for_campaign(
    pool: &SqlitePool,
    campaign_id: i64,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, campaign_id, actor, amount, data, recorded_at
        FROM   events
        WHERE  campaign_id = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, in commit order.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, campaign_id, actor, amount, data, recorded_at
        FROM   events
        ORDER  BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
