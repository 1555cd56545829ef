//! Message channel: append, ordered fetch, pagination, policy denial,
//! recency trigger, cascades.

mod common;

use quietwire::model::MessageKind;
use quietwire::store::{self, channel::Draft, StoreError};

fn text(content: &str) -> Draft {
    Draft { content: content.into(), kind: MessageKind::Text, file_url: None }
}

#[tokio::test]
async fn sent_message_round_trips_exactly_once() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;

    let sent = store::channel::send_message(&pool, "a", &conv, text("hello bob"))
        .await
        .unwrap();
    assert!(!sent.id.is_empty());
    assert!(sent.created_at > 0);
    assert_eq!(sent.sender_id, "a");
    assert!(!sent.is_read);

    let fetched = store::channel::fetch_messages(&pool, "b", &conv, None, None)
        .await
        .unwrap();
    let matching: Vec<_> = fetched.iter().filter(|m| m.content == "hello bob").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, sent.id);
}

#[tokio::test]
async fn fetch_returns_creation_order() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;

    for content in ["one", "two", "three"] {
        store::channel::send_message(&pool, "a", &conv, text(content))
            .await
            .unwrap();
    }

    let fetched = store::channel::fetch_messages(&pool, "a", &conv, None, None)
        .await
        .unwrap();
    let contents: Vec<&str> = fetched.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn keyset_pagination_walks_backwards_in_ascending_pages() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;

    for i in 1..=5 {
        store::channel::send_message(&pool, "a", &conv, text(&format!("m{i}")))
            .await
            .unwrap();
    }

    let newest = store::channel::fetch_messages(&pool, "a", &conv, None, Some(2))
        .await
        .unwrap();
    assert_eq!(
        newest.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
        vec!["m4", "m5"]
    );

    let middle =
        store::channel::fetch_messages(&pool, "a", &conv, Some(&newest[0].id), Some(2))
            .await
            .unwrap();
    assert_eq!(
        middle.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
        vec!["m2", "m3"]
    );

    let oldest =
        store::channel::fetch_messages(&pool, "a", &conv, Some(&middle[0].id), Some(2))
            .await
            .unwrap();
    assert_eq!(
        oldest.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
        vec!["m1"]
    );
}

#[tokio::test]
async fn non_participants_are_denied_without_leaking_rows() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    common::claim(&pool, "x", "mallory").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;
    store::channel::send_message(&pool, "a", &conv, text("secret")).await.unwrap();

    let read = store::channel::fetch_messages(&pool, "x", &conv, None, None).await;
    assert!(matches!(read.unwrap_err(), StoreError::Denied));

    let write = store::channel::send_message(&pool, "x", &conv, text("hi")).await;
    assert!(matches!(write.unwrap_err(), StoreError::Denied));

    // a made-up conversation produces the same denial as a real one
    let missing = store::channel::fetch_messages(&pool, "x", "no-such-id", None, None).await;
    assert!(matches!(missing.unwrap_err(), StoreError::Denied));

    // the participant still reads everything
    let fetched = store::channel::fetch_messages(&pool, "b", &conv, None, None)
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);
}

#[tokio::test]
async fn appending_advances_the_conversations_recency() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;

    let first = store::channel::send_message(&pool, "a", &conv, text("first"))
        .await
        .unwrap();

    let (updated_at,): (i64,) =
        sqlx::query_as("SELECT updated_at FROM conversations WHERE id=?")
            .bind(&conv)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(updated_at >= first.created_at);

    let second = store::channel::send_message(&pool, "b", &conv, text("second"))
        .await
        .unwrap();

    let (after,): (i64,) = sqlx::query_as("SELECT updated_at FROM conversations WHERE id=?")
        .bind(&conv)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(after >= first.created_at);
    assert!(after >= second.created_at);
    assert!(after >= updated_at);
}

#[tokio::test]
async fn non_text_kinds_and_file_references_round_trip() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;

    let sent = store::channel::send_message(
        &pool,
        "a",
        &conv,
        Draft {
            content: "photo".into(),
            kind: MessageKind::Image,
            file_url: Some("/u/abc.png".into()),
        },
    )
    .await
    .unwrap();

    assert_eq!(sent.kind, MessageKind::Image);
    assert_eq!(sent.file_url.as_deref(), Some("/u/abc.png"));

    let fetched = store::channel::fetch_messages(&pool, "b", &conv, None, None)
        .await
        .unwrap();
    assert_eq!(fetched[0].kind, MessageKind::Image);
}

#[tokio::test]
async fn deleting_a_conversation_cascades_to_its_rows() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;
    store::channel::send_message(&pool, "a", &conv, text("bye")).await.unwrap();

    sqlx::query("DELETE FROM conversations WHERE id=?")
        .bind(&conv)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(common::count(&pool, "SELECT COUNT(*) FROM messages").await, 0);
    assert_eq!(
        common::count(&pool, "SELECT COUNT(*) FROM conversation_participants").await,
        0
    );
}

#[tokio::test]
async fn deleting_a_profile_cascades_to_membership_and_messages() {
    let pool = common::pool().await;
    common::claim(&pool, "a", "alice").await;
    common::claim(&pool, "b", "bob").await;
    let conv = common::conversation(&pool, "a", &["b"]).await;
    store::channel::send_message(&pool, "a", &conv, text("mine")).await.unwrap();
    store::channel::send_message(&pool, "b", &conv, text("yours")).await.unwrap();

    sqlx::query("DELETE FROM profiles WHERE id=?")
        .bind("a")
        .execute(&pool)
        .await
        .unwrap();

    let remaining = store::channel::fetch_messages(&pool, "b", &conv, None, None)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].sender_id, "b");

    assert_eq!(
        common::count(&pool, "SELECT COUNT(*) FROM conversation_participants").await,
        1
    );
}
