//! Profile store: signup, username rules, uniqueness, search, presence.

mod common;

use quietwire::model::Presence;
use quietwire::store::{self, profiles::ProfileChanges, StoreError};

#[tokio::test]
async fn claim_creates_a_complete_row() {
    let pool = common::pool().await;

    let profile = store::profiles::claim_profile(&pool, "u1", "alice", None)
        .await
        .unwrap();

    assert_eq!(profile.id, "u1");
    assert_eq!(profile.username, "alice");
    assert!(!profile.display_name.is_empty());
    assert_eq!(profile.status, Presence::Offline);
    assert!(profile.created_at > 0);
    assert!(profile.avatar_url.is_none());
}

#[tokio::test]
async fn username_rules_are_checked_before_persistence() {
    let pool = common::pool().await;

    for bad in ["ab", "", "way_too_long_username_x", "has space", "nope!", "émile"] {
        let err = store::profiles::claim_profile(&pool, "u1", bad, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUsername), "{bad:?}");
    }

    // nothing was written
    assert_eq!(common::count(&pool, "SELECT COUNT(*) FROM profiles").await, 0);

    for good in ["abc", "abc_123", "ABC_def_99", "a".repeat(20).as_str()] {
        store::profiles::claim_profile(&pool, &format!("id-{good}"), good, None)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn duplicate_username_is_a_case_insensitive_conflict() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "Alice").await;

    let err = store::profiles::claim_profile(&pool, "u2", "alice", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UsernameTaken));

    // the winner is untouched, the loser left no row behind
    let alice = store::profiles::fetch_profile(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(alice.username, "Alice");
    assert!(store::profiles::fetch_profile(&pool, "u2").await.unwrap().is_none());
}

#[tokio::test]
async fn rename_conflict_leaves_both_rows_intact() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "alice").await;
    common::claim(&pool, "u2", "bob").await;

    let err = store::profiles::update_profile(
        &pool,
        "u2",
        "u2",
        ProfileChanges { username: Some("ALICE".into()), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::UsernameTaken));

    let bob = store::profiles::fetch_profile(&pool, "u2").await.unwrap().unwrap();
    assert_eq!(bob.username, "bob");
}

#[tokio::test]
async fn changing_the_case_of_your_own_username_is_allowed() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "Alice").await;

    let updated = store::profiles::update_profile(
        &pool,
        "u1",
        "u1",
        ProfileChanges { username: Some("alice".into()), ..Default::default() },
    )
    .await
    .unwrap();

    assert_eq!(updated.username, "alice");
}

#[tokio::test]
async fn racing_signups_for_the_same_name_produce_one_winner() {
    let pool = common::pool().await;

    let (a, b) = tokio::join!(
        store::profiles::claim_profile(&pool, "u1", "Alice", None),
        store::profiles::claim_profile(&pool, "u2", "alice", None),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), StoreError::UsernameTaken));

    assert_eq!(common::count(&pool, "SELECT COUNT(*) FROM profiles").await, 1);
}

#[tokio::test]
async fn only_the_owner_may_update_a_profile() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "alice").await;
    common::claim(&pool, "u2", "bob").await;

    let err = store::profiles::update_profile(
        &pool,
        "u1",
        "u2",
        ProfileChanges { display_name: Some("Hijacked".into()), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Denied));

    let bob = store::profiles::fetch_profile(&pool, "u2").await.unwrap().unwrap();
    assert_eq!(bob.display_name, "bob");
}

#[tokio::test]
async fn partial_updates_keep_the_other_fields() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "alice").await;

    let updated = store::profiles::update_profile(
        &pool,
        "u1",
        "u1",
        ProfileChanges { avatar_url: Some("/u/pic.png".into()), ..Default::default() },
    )
    .await
    .unwrap();

    assert_eq!(updated.username, "alice");
    assert_eq!(updated.avatar_url.as_deref(), Some("/u/pic.png"));
}

#[tokio::test]
async fn search_is_a_case_insensitive_prefix_match() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "alice").await;
    common::claim(&pool, "u2", "alina").await;
    common::claim(&pool, "u3", "bob").await;

    let hits = store::profiles::search(&pool, "ali", 10).await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = store::profiles::search(&pool, "ALI", 10).await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = store::profiles::search(&pool, "zz", 10).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "ann_b").await;
    common::claim(&pool, "u2", "annab").await;

    let hits = store::profiles::search(&pool, "ann_", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].username, "ann_b");

    let hits = store::profiles::search(&pool, "%", 10).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn username_uniqueness_lookup_stays_on_its_index() {
    let pool = common::pool().await;
    common::claim(&pool, "u1", "alice").await;

    // same comparison form the uniqueness triggers use
    let plan: Vec<(i64, i64, i64, String)> = sqlx::query_as(
        "EXPLAIN QUERY PLAN SELECT 1 FROM profiles WHERE username = 'Alice' COLLATE NOCASE",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let detail: Vec<&str> = plan.iter().map(|(_, _, _, d)| d.as_str()).collect();
    assert!(
        detail.iter().any(|d| d.contains("idx_profiles_username")),
        "{detail:?}"
    );
}

#[tokio::test]
async fn presence_flips_and_stamps_last_seen() {
    let pool = common::pool().await;
    let before = common::claim(&pool, "u1", "alice").await;

    store::profiles::set_presence(&pool, "u1", Presence::Online).await.unwrap();
    let online = store::profiles::fetch_profile(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(online.status, Presence::Online);
    assert!(online.last_seen >= before.last_seen);

    store::profiles::set_presence(&pool, "u1", Presence::Offline).await.unwrap();
    let offline = store::profiles::fetch_profile(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(offline.status, Presence::Offline);
}
