#![allow(dead_code)]

use quietwire::db;
use quietwire::model::Profile;
use quietwire::store;
use sqlx::SqlitePool;

pub async fn pool() -> SqlitePool {
    db::connect_memory().await.expect("in-memory pool")
}

pub async fn claim(pool: &SqlitePool, id: &str, username: &str) -> Profile {
    store::profiles::claim_profile(pool, id, username, Some(username))
        .await
        .expect("claim profile")
}

pub async fn conversation(pool: &SqlitePool, caller: &str, others: &[&str]) -> String {
    let ids: Vec<String> = others.iter().map(|s| s.to_string()).collect();
    store::directory::create_conversation(pool, caller, None, &ids)
        .await
        .expect("create conversation")
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_as::<_, (i64,)>(sql)
        .fetch_one(pool)
        .await
        .expect("count query")
        .0
}
