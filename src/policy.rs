//! Row-access predicates, evaluated at the store boundary on every
//! conversation-scoped read or write. Handlers never re-derive these.
//!
//! A denial is indistinguishable from "no such conversation": both come
//! back as [`StoreError::Denied`], so existence never leaks to callers
//! outside the membership.

use sqlx::SqlitePool;

use crate::store::StoreError;

pub async fn is_participant(
    pool: &SqlitePool,
    profile_id: &str,
    conversation_id: &str,
) -> Result<bool, sqlx::Error> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM conversation_participants WHERE conversation_id=? AND profile_id=?",
    )
    .bind(conversation_id)
    .bind(profile_id)
    .fetch_optional(pool)
    .await?
    .is_some())
}

/// Read and write predicate for conversations, participants, and messages.
pub async fn ensure_participant(
    pool: &SqlitePool,
    profile_id: &str,
    conversation_id: &str,
) -> Result<(), StoreError> {
    if is_participant(pool, profile_id, conversation_id).await? {
        Ok(())
    } else {
        Err(StoreError::Denied)
    }
}

/// Write predicate for profiles: a caller may touch only their own row.
pub fn ensure_self(caller: &str, target: &str) -> Result<(), StoreError> {
    if caller == target {
        Ok(())
    } else {
        Err(StoreError::Denied)
    }
}
