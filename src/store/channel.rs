//! Per-conversation message channel: policy-checked bulk load and append.

use std::sync::{LazyLock, Mutex};

use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::timestamp::context::ContextV7;
use uuid::{Timestamp, Uuid};

use crate::model::{Message, MessageKind};
use crate::policy;
use crate::store::StoreError;

pub const DEFAULT_PAGE: i64 = 100;
pub const MAX_PAGE: i64 = 500;

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, content, kind, file_url, is_read, created_at";

// shared clock sequence keeps ids monotonic across same-millisecond sends,
// which is what makes ORDER BY id the creation order
static UUID_CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

fn next_message_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(&*UUID_CONTEXT.lock().unwrap()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Draft {
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Messages of one conversation in creation order. Pagination is a keyset
/// cursor on the UUIDv7 message id: `before` selects the page of messages
/// older than that id, and the page is still returned ascending.
pub async fn fetch_messages(
    pool: &SqlitePool,
    caller: &str,
    conversation_id: &str,
    before: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Message>, StoreError> {
    policy::ensure_participant(pool, caller, conversation_id).await?;

    let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);

    let mut page = match before {
        Some(cursor) => {
            sqlx::query_as::<_, Message>(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ? AND id < ?
                 ORDER BY id DESC LIMIT ?"
            ))
            .bind(conversation_id)
            .bind(cursor)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Message>(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?
                 ORDER BY id DESC LIMIT ?"
            ))
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    page.reverse();
    Ok(page)
}

/// Appends one message and returns the stored row with its server-assigned
/// id and timestamp. The participant check enforces, at write time, that
/// every message's sender is a member of its conversation; the insert also
/// fires the trigger that advances the conversation's recency.
pub async fn send_message(
    pool: &SqlitePool,
    caller: &str,
    conversation_id: &str,
    draft: Draft,
) -> Result<Message, StoreError> {
    policy::ensure_participant(pool, caller, conversation_id).await?;

    let id = next_message_id().to_string();
    sqlx::query(
        "INSERT INTO messages (id,conversation_id,sender_id,content,kind,file_url)
         VALUES (?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(caller)
    .bind(&draft.content)
    .bind(draft.kind)
    .bind(&draft.file_url)
    .execute(pool)
    .await?;

    let stored = sqlx::query_as::<_, Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"
    ))
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}
