//! The caller's conversation directory: membership-filtered, enriched,
//! sorted by recency.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::model::{Conversation, ConversationEntry, Message, Profile};
use crate::store::StoreError;

/// All conversations the caller participates in, newest activity first,
/// each with its participant profiles and at most one latest message.
/// The membership join is the read policy; rows outside it do not exist
/// as far as the caller can tell.
pub async fn fetch_conversations(
    pool: &SqlitePool,
    caller: &str,
) -> Result<Vec<ConversationEntry>, StoreError> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT c.id, c.title, c.is_group, c.created_at, c.updated_at
         FROM conversations c
         JOIN conversation_participants cp ON cp.conversation_id = c.id
         WHERE cp.profile_id = ?
         ORDER BY c.updated_at DESC, c.id DESC",
    )
    .bind(caller)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let participants = sqlx::query_as::<_, Profile>(
            "SELECT p.id, p.username, p.display_name, p.avatar_url,
                    p.status, p.last_seen, p.created_at
             FROM profiles p
             JOIN conversation_participants cp ON cp.profile_id = p.id
             WHERE cp.conversation_id = ?
             ORDER BY cp.joined_at, p.id",
        )
        .bind(&conversation.id)
        .fetch_all(pool)
        .await?;

        let last_message = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, sender_id, content, kind,
                    file_url, is_read, created_at
             FROM messages WHERE conversation_id = ?
             ORDER BY id DESC LIMIT 1",
        )
        .bind(&conversation.id)
        .fetch_optional(pool)
        .await?;

        entries.push(ConversationEntry {
            conversation,
            participants,
            last_message,
        });
    }

    Ok(entries)
}

/// Creates a conversation with the caller plus the given ids as members.
/// The conversation row and its participant rows land in one transaction:
/// a rejected member insert rolls the whole thing back, so no orphaned
/// conversation is ever reachable.
pub async fn create_conversation(
    pool: &SqlitePool,
    caller: &str,
    title: Option<&str>,
    participant_ids: &[String],
) -> Result<String, StoreError> {
    let mut members: Vec<&str> = vec![caller];
    for id in participant_ids {
        if !members.contains(&id.as_str()) {
            members.push(id);
        }
    }

    let id = Uuid::now_v7().to_string();
    let is_group = members.len() > 2;

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO conversations (id,title,is_group) VALUES (?,?,?)")
        .bind(&id)
        .bind(title)
        .bind(is_group)
        .execute(&mut *tx)
        .await?;

    for member in &members {
        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id,profile_id) VALUES (?,?)",
        )
        .bind(&id)
        .bind(member)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(conversation_id = %id, members = members.len(), is_group, "conversation created");

    Ok(id)
}
