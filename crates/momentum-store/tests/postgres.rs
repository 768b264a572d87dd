//! Integration tests against a real Postgres instance
//!
//! These exercise the atomic-consumption and renewal semantics end to end.
//! They need `DATABASE_URL` to point at a throwaway database and skip
//! silently when it is not set, so `cargo test` stays green on machines
//! without Postgres.

use chrono::{Duration, Utc};
use momentum_store::{CreditOutcome, MAX_CREDITS, Store, StoreConfig, UserProfile};

async fn test_store() -> Option<Store> {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping Postgres integration test");
        return None;
    }
    let config = StoreConfig::from_env().expect("store config");
    let store = Store::connect(&config).await.expect("connect");
    store.run_migrations().await.expect("migrations");
    Some(store)
}

/// Unique chat id per test invocation so runs never collide
fn fresh_chat_id() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default().abs()
}

async fn rewind_last_reset(store: &Store, chat_id: i64, hours: i64) {
    sqlx::query("UPDATE users SET last_reset = $1 WHERE chat_id = $2")
        .bind(Utc::now() - Duration::hours(hours))
        .bind(chat_id)
        .execute(store.pool())
        .await
        .expect("rewind last_reset");
}

async fn cleanup(store: &Store, chat_id: i64) {
    sqlx::query("DELETE FROM analysis_logs WHERE user_id IN (SELECT id FROM users WHERE chat_id = $1)")
        .bind(chat_id)
        .execute(store.pool())
        .await
        .expect("cleanup logs");
    sqlx::query("DELETE FROM users WHERE chat_id = $1")
        .bind(chat_id)
        .execute(store.pool())
        .await
        .expect("cleanup user");
}

#[tokio::test]
async fn new_user_consumes_down_to_zero_then_renews() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    let user = store
        .get_or_create_user(chat_id, &UserProfile::default())
        .await
        .expect("create");
    assert_eq!(user.credits, MAX_CREDITS);

    for expected_remaining in (0..MAX_CREDITS).rev() {
        let outcome = store.use_credit(chat_id).await.expect("use_credit");
        assert_eq!(outcome, CreditOutcome::granted(expected_remaining));
    }

    // Fourth attempt is denied without mutation.
    let denied = store.use_credit(chat_id).await.expect("use_credit");
    assert_eq!(denied, CreditOutcome::denied());
    assert_eq!(store.get_user_credits(chat_id).await.expect("credits"), 0);

    // After 25 simulated hours the balance renews to exactly MAX_CREDITS.
    rewind_last_reset(&store, chat_id, 25).await;
    assert_eq!(
        store.get_user_credits(chat_id).await.expect("credits"),
        MAX_CREDITS
    );

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn unknown_user_gets_synthetic_credits_info_without_a_row() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    let before = Utc::now();
    let info = store.get_credits_info(chat_id).await.expect("info");
    assert_eq!(info.credits, 0);
    assert!(info.next_reset >= before + Duration::hours(24));
    assert!(info.next_reset <= Utc::now() + Duration::hours(24));

    assert!(store.get_user(chat_id).await.expect("lookup").is_none());
    assert_eq!(store.get_user_credits(chat_id).await.expect("credits"), 0);
}

#[tokio::test]
async fn get_or_create_refreshes_profile_on_second_contact() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    let first = store
        .get_or_create_user(
            chat_id,
            &UserProfile {
                username: Some("old_name".to_string()),
                ..UserProfile::default()
            },
        )
        .await
        .expect("first contact");

    let second = store
        .get_or_create_user(
            chat_id,
            &UserProfile {
                username: Some("new_name".to_string()),
                ..UserProfile::default()
            },
        )
        .await
        .expect("second contact");

    // Same row, refreshed profile.
    assert_eq!(first.id, second.id);
    assert_eq!(second.username.as_deref(), Some("new_name"));

    let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM users WHERE chat_id = $1")
        .bind(chat_id)
        .fetch_one(store.pool())
        .await
        .expect("count");
    assert_eq!(count, 1);

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn empty_profile_update_is_a_pure_read() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    let created = store
        .get_or_create_user(
            chat_id,
            &UserProfile {
                username: Some("taylon".to_string()),
                ..UserProfile::default()
            },
        )
        .await
        .expect("create");

    let unchanged = store
        .update_user(chat_id, &UserProfile::default())
        .await
        .expect("update")
        .expect("exists");
    assert_eq!(unchanged.username, created.username);
    assert_eq!(unchanged.updated_at, created.updated_at);

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn concurrent_use_credit_never_over_spends() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    store
        .get_or_create_user(chat_id, &UserProfile::default())
        .await
        .expect("create");

    let attempts = 8;
    let tasks: Vec<_> = (0..attempts)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.use_credit(chat_id).await })
        })
        .collect();

    let mut granted = 0;
    for task in tasks {
        let outcome = task.await.expect("join").expect("use_credit");
        if outcome.granted {
            granted += 1;
            assert!(outcome.remaining >= 0);
            assert!(outcome.remaining < MAX_CREDITS);
        }
    }

    assert_eq!(granted, MAX_CREDITS);
    assert_eq!(store.get_user_credits(chat_id).await.expect("credits"), 0);

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn renewal_is_idempotent_within_a_window_and_tops_up_not_adds() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    store
        .get_or_create_user(chat_id, &UserProfile::default())
        .await
        .expect("create");
    store.use_credit(chat_id).await.expect("spend 1");
    store.use_credit(chat_id).await.expect("spend 2");

    // 25h later with credits = 1: renew to exactly MAX, never MAX + 1.
    rewind_last_reset(&store, chat_id, 25).await;
    assert_eq!(
        store.get_user_credits(chat_id).await.expect("credits"),
        MAX_CREDITS
    );

    let after_first = store
        .get_user(chat_id)
        .await
        .expect("lookup")
        .expect("exists")
        .last_reset;

    // Second evaluation inside the fresh window changes nothing.
    assert_eq!(
        store.get_user_credits(chat_id).await.expect("credits"),
        MAX_CREDITS
    );
    let after_second = store
        .get_user(chat_id)
        .await
        .expect("lookup")
        .expect("exists")
        .last_reset;
    assert_eq!(after_first, after_second);

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn renewal_refreshes_timer_even_at_max_balance() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    store
        .get_or_create_user(chat_id, &UserProfile::default())
        .await
        .expect("create");
    rewind_last_reset(&store, chat_id, 25).await;
    let stale = store
        .get_user(chat_id)
        .await
        .expect("lookup")
        .expect("exists")
        .last_reset;

    // Never spent anything: balance stays at MAX but the timer advances.
    assert_eq!(
        store.get_user_credits(chat_id).await.expect("credits"),
        MAX_CREDITS
    );
    let refreshed = store
        .get_user(chat_id)
        .await
        .expect("lookup")
        .expect("exists")
        .last_reset;
    assert!(refreshed > stale);

    cleanup(&store, chat_id).await;
}

#[tokio::test]
async fn analysis_log_links_user_ticker_and_job() {
    let Some(store) = test_store().await else { return };
    let chat_id = fresh_chat_id();

    let user = store
        .get_or_create_user(chat_id, &UserProfile::default())
        .await
        .expect("create");
    let outcome = store.use_credit(chat_id).await.expect("use_credit");
    assert!(outcome.granted);

    let log_id = store
        .log_analysis(user.id, "AAPL", "pred-abc123")
        .await
        .expect("log");
    assert!(log_id > 0);

    let sentinel_id = store
        .log_analysis(user.id, "TSLA", "error_id")
        .await
        .expect("log sentinel");
    assert!(sentinel_id > log_id);

    cleanup(&store, chat_id).await;
}
