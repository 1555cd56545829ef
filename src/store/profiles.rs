use rand::seq::IndexedRandom;
use sqlx::SqlitePool;

use crate::model::{Presence, Profile};
use crate::policy;
use crate::store::{map_username_conflict, StoreError};

const PROFILE_COLUMNS: &str =
    "id,username,display_name,avatar_url,status,last_seen,created_at";

pub fn validate_username(username: &str) -> Result<(), StoreError> {
    let ok = (3..=20).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUsername)
    }
}

pub fn default_display_name() -> String {
    let adjectives = [
        "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
        "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy", "Sad",
        "Eager", "Fancy", "Rusty", "Golden", "Silver", "Bright", "Dark", "Lucky",
    ];

    let nouns = [
        "Fox", "Bear", "Eagle", "Wolf", "Dragon", "Tiger", "Lion", "Owl", "Rabbit",
        "Falcon", "Hawk", "Shark", "Panda", "Kitten", "Puppy", "Phoenix", "Griffin",
        "Unicorn", "Turtle", "Dolphin", "Whale", "Elephant", "Giraffe", "Zebra",
    ];

    let mut rng = rand::rng();
    match (adjectives.choose(&mut rng), nouns.choose(&mut rng)) {
        (Some(adjective), Some(noun)) => format!("{adjective} {noun}"),
        _ => "Nameless User".to_owned(),
    }
}

/// Signup: creates the caller's profile. A case-insensitively duplicate
/// username is rejected by the trigger inside the same transaction as the
/// insert, so two racing signups cannot both win.
pub async fn claim_profile(
    pool: &SqlitePool,
    user_id: &str,
    username: &str,
    display_name: Option<&str>,
) -> Result<Profile, StoreError> {
    validate_username(username)?;

    let display_name = match display_name {
        Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
        _ => default_display_name(),
    };

    sqlx::query("INSERT INTO profiles (id,username,display_name) VALUES (?,?,?)")
        .bind(user_id)
        .bind(username)
        .bind(&display_name)
        .execute(pool)
        .await
        .map_err(map_username_conflict)?;

    tracing::info!(user_id, username, "profile claimed");

    fetch_profile(pool, user_id)
        .await?
        .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
}

pub async fn fetch_profile(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Profile>, StoreError> {
    Ok(sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id=?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Updates the target profile. Policy: own row only. A username change is
/// revalidated and goes back through the uniqueness trigger.
pub async fn update_profile(
    pool: &SqlitePool,
    caller: &str,
    target: &str,
    changes: ProfileChanges,
) -> Result<Profile, StoreError> {
    policy::ensure_self(caller, target)?;

    if let Some(ref username) = changes.username {
        validate_username(username)?;
    }

    sqlx::query(
        "UPDATE profiles SET
            username = COALESCE(?, username),
            display_name = COALESCE(?, display_name),
            avatar_url = COALESCE(?, avatar_url)
         WHERE id=?",
    )
    .bind(&changes.username)
    .bind(&changes.display_name)
    .bind(&changes.avatar_url)
    .bind(target)
    .execute(pool)
    .await
    .map_err(map_username_conflict)?;

    fetch_profile(pool, target)
        .await?
        .ok_or(StoreError::Denied)
}

/// Case-insensitive prefix lookup over usernames, bounded for the
/// new-conversation picker. LIKE wildcards in the query are escaped so
/// `ann_b` matches literally.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    limit: i64,
) -> Result<Vec<Profile>, StoreError> {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Ok(sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles
         WHERE username LIKE ? ESCAPE '\\'
         ORDER BY username LIMIT ?"
    ))
    .bind(format!("{escaped}%"))
    .bind(limit.clamp(1, 50))
    .fetch_all(pool)
    .await?)
}

pub async fn set_presence(
    pool: &SqlitePool,
    user_id: &str,
    status: Presence,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE profiles
         SET status=?, last_seen=CAST(strftime('%s','now') AS INTEGER)
         WHERE id=?",
    )
    .bind(status)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}
