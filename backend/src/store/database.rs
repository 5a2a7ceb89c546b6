use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::types::Json;
use sqlx::Row;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use shared::{render_results, validate_vote, Poll, PollAction, StoreError, Vote};
use crate::config::DbSettings;
use super::{closed_message, deleted_message, tokens_match, VOTE_RECORDED};

const SELECT_POLL: &str =
    "SELECT poll_id, question, options, voters, creator, closed FROM polls WHERE poll_id = $1";
const POLL_FIELDS: usize = 6;

/// Poll storage on PostgreSQL.
///
/// Reads are primary-key lookups decoded field by field; writes only touch
/// the columns that changed. `write_guard` closes the gap between the select
/// and the update for callers inside this process.
#[derive(Debug)]
pub struct DatabaseStore {
    pool: PgPool,
    op_timeout: Duration,
    write_guard: Mutex<()>,
}

/// A `polls` row before its fields are checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PollRow {
    pub poll_id: String,
    pub question: String,
    pub options: Value,
    pub voters: Value,
    pub creator: String,
    pub closed: bool,
}

fn field<'r, T>(row: &'r PgRow, idx: usize, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(idx)
        .map_err(|e| StoreError::decode(format!("field `{}` (#{}): {}", name, idx, e)))
}

impl PollRow {
    pub fn from_row(row: &PgRow) -> Result<Self, StoreError> {
        if row.len() != POLL_FIELDS {
            return Err(StoreError::decode(format!(
                "expected {} fields, got {}",
                POLL_FIELDS,
                row.len()
            )));
        }

        Ok(Self {
            poll_id: field(row, 0, "poll_id")?,
            question: field(row, 1, "question")?,
            options: field(row, 2, "options")?,
            voters: field(row, 3, "voters")?,
            creator: field(row, 4, "creator")?,
            closed: field(row, 5, "closed")?,
        })
    }
}

impl TryFrom<PollRow> for Poll {
    type Error = StoreError;

    fn try_from(row: PollRow) -> Result<Self, Self::Error> {
        Ok(Poll {
            options: decode_options(row.options)?,
            voters: decode_voters(row.voters)?,
            poll_id: row.poll_id,
            question: row.question,
            creator: row.creator,
            closed: row.closed,
        })
    }
}

/// `options` must be an object of non-negative integer counts.
pub fn decode_options(value: Value) -> Result<HashMap<String, u32>, StoreError> {
    let map = match value {
        Value::Object(map) => map,
        other => return Err(StoreError::decode(format!("options: expected object, got {}", other))),
    };

    map.into_iter()
        .map(|(label, count)| {
            count
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(|n| (label.clone(), n))
                .ok_or_else(|| {
                    StoreError::decode(format!("options: count for `{}` is not a vote count: {}", label, count))
                })
        })
        .collect()
}

/// `voters` must be an array of distinct user ids.
pub fn decode_voters(value: Value) -> Result<HashSet<String>, StoreError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(StoreError::decode(format!("voters: expected array, got {}", other))),
    };

    let mut voters = HashSet::with_capacity(items.len());
    for item in items {
        let user_id = match item {
            Value::String(user_id) => user_id,
            other => return Err(StoreError::decode(format!("voters: expected user id string, got {}", other))),
        };
        if !voters.insert(user_id.clone()) {
            return Err(StoreError::decode(format!("voters: `{}` listed twice", user_id)));
        }
    }
    Ok(voters)
}

/// Voters in a stable order for storage.
pub fn encode_voters(voters: &HashSet<String>) -> Vec<&str> {
    let mut sorted: Vec<&str> = voters.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

fn insert_error(err: sqlx::Error, key: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(key.to_string());
        }
    }
    StoreError::io(err)
}

impl DatabaseStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout, write_guard: Mutex::new(()) }
    }

    /// Opens the pool once, bounded by the connect timeout, and runs the
    /// embedded migrations.
    pub async fn connect(settings: &DbSettings) -> Result<Self, StoreError> {
        let connecting = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.op_timeout)
            .connect(&settings.url);

        let pool = timeout(settings.connect_timeout, connecting)
            .await
            .map_err(|_| StoreError::io(format!("connect timed out after {:?}", settings.connect_timeout)))?
            .map_err(StoreError::io)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::io)?;

        info!("📋 Database connected, migrations complete");
        Ok(Self::new(pool, settings.op_timeout))
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<Result<T, sqlx::Error>, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| StoreError::io(format!("operation timed out after {:?}", self.op_timeout)))
    }

    async fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        self.bounded(fut).await?.map_err(StoreError::io)
    }

    async fn fetch_poll(&self, poll_id: &str) -> Result<Poll, StoreError> {
        let row = self
            .run(sqlx::query(SELECT_POLL).bind(poll_id).fetch_optional(&self.pool))
            .await?
            .ok_or(StoreError::NotFound)?;

        PollRow::from_row(&row)?.try_into()
    }

    pub async fn create_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let insert = sqlx::query(
            "INSERT INTO polls (poll_id, question, options, voters, creator, closed)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&poll.poll_id)
        .bind(&poll.question)
        .bind(Json(&poll.options))
        .bind(Json(encode_voters(&poll.voters)))
        .bind(&poll.creator)
        .bind(poll.closed)
        .execute(&self.pool);

        self.bounded(insert)
            .await?
            .map_err(|e| insert_error(e, &poll.poll_id))?;

        debug!(poll_id = %poll.poll_id, "Poll inserted");
        Ok(())
    }

    pub async fn vote(&self, vote: &Vote) -> Result<String, StoreError> {
        let _guard = self.write_guard.lock().await;
        let mut poll = self.fetch_poll(&vote.poll_id).await?;

        validate_vote(&poll, vote)?;
        poll.record_vote(vote)?;

        let updated = self
            .run(
                sqlx::query("UPDATE polls SET options = $2, voters = $3 WHERE poll_id = $1")
                    .bind(&vote.poll_id)
                    .bind(Json(&poll.options))
                    .bind(Json(encode_voters(&poll.voters)))
                    .execute(&self.pool),
            )
            .await?;

        // removed by another process between select and update
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(VOTE_RECORDED.to_string())
    }

    pub async fn get_poll_result(&self, poll_id: &str) -> Result<String, StoreError> {
        let poll = self.fetch_poll(poll_id).await?;
        Ok(render_results(&poll))
    }

    pub async fn close_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        let _guard = self.write_guard.lock().await;
        let poll = self.fetch_poll(poll_id).await?;

        if poll.closed {
            return Err(StoreError::AlreadyClosed(poll_id.to_string()));
        }
        if poll.creator != user_id {
            return Err(StoreError::Permission(PollAction::Close));
        }

        let updated = self
            .run(
                sqlx::query("UPDATE polls SET closed = TRUE WHERE poll_id = $1")
                    .bind(poll_id)
                    .execute(&self.pool),
            )
            .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(closed_message(poll_id))
    }

    pub async fn delete_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        let _guard = self.write_guard.lock().await;
        let poll = self.fetch_poll(poll_id).await?;

        if poll.creator != user_id {
            return Err(StoreError::Permission(PollAction::Delete));
        }

        let deleted = self
            .run(
                sqlx::query("DELETE FROM polls WHERE poll_id = $1")
                    .bind(poll_id)
                    .execute(&self.pool),
            )
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(deleted_message(poll_id))
    }

    pub async fn add_cmd_token(&self, cmd_path: &str, token: &str) -> Result<(), StoreError> {
        let insert = sqlx::query("INSERT INTO cmd_tokens (cmd_path, token) VALUES ($1, $2)")
            .bind(cmd_path)
            .bind(token)
            .execute(&self.pool);

        self.bounded(insert)
            .await?
            .map_err(|e| insert_error(e, cmd_path))?;
        Ok(())
    }

    pub async fn validate_cmd_token(&self, cmd_path: &str, token: &str) -> bool {
        let lookup = sqlx::query("SELECT token FROM cmd_tokens WHERE cmd_path = $1")
            .bind(cmd_path)
            .fetch_optional(&self.pool);

        let row = match self.run(lookup).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                warn!(cmd_path, "No token registered for command");
                return false;
            }
            Err(e) => {
                error!(cmd_path, "Error validating token: {}", e);
                return false;
            }
        };

        match row.try_get::<String, _>(0) {
            Ok(stored) => tokens_match(&stored, token),
            Err(e) => {
                error!(cmd_path, "Malformed token record: {}", e);
                false
            }
        }
    }
}
