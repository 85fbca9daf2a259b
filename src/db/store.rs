use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::collections;
use crate::db::models::DocumentRow;
use crate::error::{AppError, Result};
use crate::types::{GiveawayRecord, NewVote, SavedGiveaway, Subscription, VoteRecord};

/// Key/value document collections persisted in SQLite.
///
/// Only push/list/remove are exposed: documents are written once and never updated.
pub struct DocumentStore {
    pool: SqlitePool,
    seq: AtomicU64,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, seq: AtomicU64::new(0) }
    }

    /// Time-ordered key: millisecond timestamp followed by a per-process counter.
    fn next_key(&self, now: DateTime<Utc>) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) & 0xff_ffff;
        format!("-{:012x}{:06x}", now.timestamp_millis().max(0), seq)
    }

    async fn insert(&self, collection: &str, key: &str, value: &Value, now: DateTime<Utc>) -> Result<()> {
        let body = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, doc_key, body, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(body)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append a document under a fresh key and return the key.
    pub async fn push(&self, collection: &str, value: &Value) -> Result<String> {
        let now = Utc::now();
        let key = self.next_key(now);
        self.insert(collection, &key, value, now).await?;
        Ok(key)
    }

    /// All documents of a collection in insertion order. Null bodies are dropped.
    pub async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT doc_key, body FROM documents
            WHERE collection = ?
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str::<Value>(&row.body) {
                Ok(Value::Null) => {}
                Ok(v) => docs.push(v),
                Err(e) => warn!("[STORE] unreadable document {collection}/{}: {e}", row.doc_key),
            }
        }
        Ok(docs)
    }

    /// Returns false when no document had that key.
    pub async fn remove(&self, collection: &str, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND doc_key = ?")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Decode every document of a collection, skipping the ones that don't fit `T`.
    async fn list_typed<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let docs = self.list(collection).await?;
        let total = docs.len();
        let items: Vec<T> = docs
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();
        if items.len() < total {
            warn!("[STORE] skipped {} malformed documents in {collection}", total - items.len());
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // votes
    // -----------------------------------------------------------------------

    pub async fn save_vote(&self, vote: &NewVote) -> Result<String> {
        let now = Utc::now();
        let key = self.next_key(now);
        let stamp = Timestamp::from(now);

        let mut doc = as_object(serde_json::to_value(vote)?)?;
        doc.insert("voteId".into(), Value::String(key.clone()));
        doc.insert("votedAt".into(), Value::String(stamp.iso));
        doc.insert("votedDate".into(), Value::String(stamp.date));
        doc.insert("votedTime".into(), Value::String(stamp.time));

        self.insert(collections::VOTES, &key, &Value::Object(doc), now).await?;
        info!("[VOTE] recorded vote {key} for game {}", vote.game_id);
        Ok(key)
    }

    pub async fn list_votes(&self) -> Result<Vec<VoteRecord>> {
        self.list_typed(collections::VOTES).await
    }

    // -----------------------------------------------------------------------
    // savedGiveaways
    // -----------------------------------------------------------------------

    pub async fn save_giveaway(&self, giveaway: &GiveawayRecord) -> Result<String> {
        let now = Utc::now();
        let key = self.next_key(now);
        let stamp = Timestamp::from(now);

        let saved = SavedGiveaway {
            giveaway: giveaway.clone(),
            firebase_id: key.clone(),
            saved_at: stamp.iso,
            saved_date: stamp.date,
            saved_time: stamp.time,
        };
        self.insert(collections::SAVED_GIVEAWAYS, &key, &serde_json::to_value(&saved)?, now)
            .await?;
        info!("[SAVED] saved giveaway {} as {key}", giveaway.id);
        Ok(key)
    }

    pub async fn list_saved(&self) -> Result<Vec<SavedGiveaway>> {
        self.list_typed(collections::SAVED_GIVEAWAYS).await
    }

    pub async fn remove_saved(&self, key: &str) -> Result<bool> {
        self.remove(collections::SAVED_GIVEAWAYS, key).await
    }

    // -----------------------------------------------------------------------
    // subscriptions
    // -----------------------------------------------------------------------

    pub async fn save_subscription(&self, email: &str, platform: &str) -> Result<String> {
        let stamp = Timestamp::from(Utc::now());
        let sub = Subscription {
            email: email.to_string(),
            platform: platform.to_string(),
            subscribed_at: stamp.iso,
            subscribed_date: stamp.date,
        };
        let key = self.push(collections::SUBSCRIPTIONS, &serde_json::to_value(&sub)?).await?;
        info!("[SUBSCRIBE] new subscription for platform {platform}");
        Ok(key)
    }
}

fn as_object(v: Value) -> Result<Map<String, Value>> {
    match v {
        Value::Object(m) => Ok(m),
        other => Err(AppError::Validation(format!("expected a JSON object, got {other}"))),
    }
}

/// Store metadata written alongside each document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// RFC 3339 UTC, millisecond precision.
    pub iso: String,
    /// `d/m/yyyy`
    pub date: String,
    /// `H:MM:SS`
    pub time: String,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(now: DateTime<Utc>) -> Self {
        Self {
            iso: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            date: now.format("%-d/%-m/%Y").to_string(),
            time: now.format("%-H:%M:%S").to_string(),
        }
    }
}
