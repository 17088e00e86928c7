//! SQLite-backed store
//!
//! `participants.name` is the primary key, so the database itself rejects a
//! second registration of the same name. Messages carry an autoincrement
//! `seq` column that defines insertion order.

use super::{MessageFilter, MessageStore, ParticipantStore, StoreError, StoreResult};
use crate::core::models::{Message, MessageType, Participant, BROADCAST};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

type MessageRow = (String, String, String, String, String);

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the schema exists
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL {}", url))?
            .create_if_missing(true);

        // every connection to `:memory:` gets its own database
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database {}", url))?;

        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] SQLite store ready at {}", url);
        Ok(store)
    }

    async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                name TEXT PRIMARY KEY NOT NULL,
                last_status INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL,
                text TEXT NOT NULL,
                kind TEXT NOT NULL,
                time TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_participants_last_status ON participants(last_status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_message((from, to, text, kind, time): MessageRow) -> StoreResult<Message> {
    let message_type = MessageType::from_str(&kind)
        .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e)))?;
    Ok(Message {
        from,
        to,
        text,
        message_type,
        time,
    })
}

// SQLite treats a negative LIMIT as "no limit"
fn sql_limit(limit: Option<usize>) -> i64 {
    limit
        .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
        .unwrap_or(-1)
}

#[async_trait]
impl ParticipantStore for SqliteStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Participant>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, last_status FROM participants WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(name, last_status)| Participant::new(name, last_status)))
    }

    async fn insert(&self, participant: Participant) -> StoreResult<()> {
        let result = sqlx::query("INSERT INTO participants (name, last_status) VALUES (?, ?)")
            .bind(&participant.name)
            .bind(participant.last_heartbeat)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict(participant.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_heartbeat(&self, name: &str, timestamp: i64) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE participants SET last_status = MAX(last_status, ?) WHERE name = ?")
                .bind(timestamp)
                .bind(name)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn find_stale_before(&self, timestamp: i64) -> StoreResult<Vec<Participant>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, last_status FROM participants WHERE last_status < ?")
                .bind(timestamp)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(name, last_status)| Participant::new(name, last_status))
            .collect())
    }

    async fn delete_by_name(&self, name: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM participants WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Participant>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, last_status FROM participants")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name, last_status)| Participant::new(name, last_status))
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert(&self, message: Message) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO messages (sender, recipient, text, kind, time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.message_type.as_str())
        .bind(&message.time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(
        &self,
        filter: &MessageFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Message>> {
        let rows: Vec<MessageRow> = match filter {
            MessageFilter::All => {
                sqlx::query_as(
                    "SELECT sender, recipient, text, kind, time FROM messages ORDER BY seq LIMIT ?",
                )
                .bind(sql_limit(limit))
                .fetch_all(&self.pool)
                .await?
            }
            MessageFilter::VisibleTo(requester) => {
                sqlx::query_as(
                    r#"
                    SELECT sender, recipient, text, kind, time FROM messages
                    WHERE sender = ?1 OR recipient = ?1 OR recipient = ?2 OR kind = ?3
                    ORDER BY seq
                    LIMIT ?4
                    "#,
                )
                .bind(requester)
                .bind(BROADCAST)
                .bind(MessageType::Message.as_str())
                .bind(sql_limit(limit))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(row_to_message).collect()
    }
}
