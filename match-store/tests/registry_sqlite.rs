//! Integration test: the registry over a real (in-memory) SQLite database.
//!
//! Exercises the full create/list/detail chain
//! user ← programme ← cohort, plus tags, against the SQL schema.

use std::sync::Arc;

use chrono::Utc;
use match_core::fixtures;
use match_core::validation;
use match_core::{ProgrammeId, UserId};
use match_store::password::verify_password;
use match_store::{open_store, MemoryStore, Registry, RegistryError, StoreConfig, StoreError};
use serde_json::json;

async fn sqlite_registry() -> Registry {
    let store = match open_store(&StoreConfig::new("sqlite::memory:")).await {
        Ok(s) => s,
        Err(e) => panic!("failed to open sqlite store: {e}"),
    };
    Registry::new(store)
}

#[tokio::test]
async fn user_programme_cohort_chain_round_trips_through_sqlite() {
    let registry = sqlite_registry().await;

    let user = match registry.create_user(&fixtures::sample_user_body()).await {
        Ok(u) => u,
        Err(e) => panic!("user rejected: {e}"),
    };
    assert_eq!(user.id, UserId::new(1));

    let programme = match registry
        .create_programme(&fixtures::sample_programme_body(user.id))
        .await
    {
        Ok(p) => p,
        Err(e) => panic!("programme rejected: {e}"),
    };
    assert_eq!(programme.created_by, user.id);

    let before = Utc::now();
    let cohort = match registry
        .create_cohort(&fixtures::sample_cohort_body(programme.programme_id, user.id))
        .await
    {
        Ok(c) => c,
        Err(e) => panic!("cohort rejected: {e}"),
    };
    let after = Utc::now();
    assert!(before <= cohort.open_date && cohort.open_date <= after);

    let stored_user = match registry.get_user(user.id).await {
        Ok(u) => u,
        Err(e) => panic!("user lookup failed: {e}"),
    };
    assert_eq!(stored_user.profile, user.profile);
    assert!(verify_password("hunter2", &stored_user.password_hash));

    let stored_cohort = match registry.get_cohort(cohort.cohort_id).await {
        Ok(c) => c,
        Err(e) => panic!("cohort lookup failed: {e}"),
    };
    assert_eq!(stored_cohort.cohort_id, cohort.cohort_id);
    assert_eq!(stored_cohort.programme, programme.programme_id);
    assert_eq!(stored_cohort.cohort_size, cohort.cohort_size);
    assert_eq!(
        stored_cohort.open_date.timestamp_micros(),
        cohort.open_date.timestamp_micros(),
        "open date must survive storage"
    );

    let cohorts = match registry.list_cohorts().await {
        Ok(c) => c,
        Err(e) => panic!("list failed: {e}"),
    };
    assert_eq!(cohorts.len(), 1);
}

#[tokio::test]
async fn sqlite_duplicate_email_ignores_case() {
    let registry = sqlite_registry().await;
    if let Err(e) = registry.create_user(&fixtures::sample_user_body()).await {
        panic!("first user rejected: {e}");
    }

    let mut body = fixtures::sample_user_body();
    body["email"] = json!("TEST@example.com");
    match registry.create_user(&body).await {
        Err(RegistryError::Invalid(errors)) => {
            assert_eq!(errors.messages("email"), [validation::DUPLICATE_EMAIL]);
        }
        other => panic!("duplicate email must be rejected, got {other:?}"),
    }

    let users = match registry.list_users().await {
        Ok(u) => u,
        Err(e) => panic!("list failed: {e}"),
    };
    assert_eq!(users.len(), 1, "rejected user must not leave a profile-less row");
}

#[tokio::test]
async fn sqlite_cohort_with_unknown_programme_is_rejected() {
    let registry = sqlite_registry().await;
    let user = match registry.create_user(&fixtures::sample_user_body()).await {
        Ok(u) => u,
        Err(e) => panic!("user rejected: {e}"),
    };

    let body = fixtures::sample_cohort_body(ProgrammeId::new(12), user.id);
    match registry.create_cohort(&body).await {
        Err(RegistryError::Invalid(errors)) => {
            assert_eq!(errors.messages("programme"), [validation::missing_pk(12)]);
            assert!(errors.get("createdBy").is_none());
        }
        other => panic!("unknown programme must be rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn sqlite_lists_are_ordered_by_id() {
    let registry = sqlite_registry().await;
    for name in ["zeta", "alpha", "mu"] {
        if let Err(e) = registry.create_tag(&fixtures::sample_tag_body(name)).await {
            panic!("tag rejected: {e}");
        }
    }
    let tags = match registry.list_tags().await {
        Ok(t) => t,
        Err(e) => panic!("list failed: {e}"),
    };
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["zeta", "alpha", "mu"]);
}

#[tokio::test]
async fn zero_pool_size_is_a_config_error() {
    let config = StoreConfig::new("sqlite::memory:").with_max_connections(0);
    let result = open_store(&config).await;
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[tokio::test]
async fn memory_url_selects_memory_store() {
    let store = match open_store(&StoreConfig::memory()).await {
        Ok(s) => s,
        Err(e) => panic!("memory store must open: {e}"),
    };
    assert!(store.health_check().await.is_ok());
    let registry = Registry::new(Arc::clone(&store));
    assert!(matches!(registry.list_tags().await, Ok(tags) if tags.is_empty()));
}

#[tokio::test]
async fn sqlite_programmes_list_in_id_order_and_fetch_by_id() {
    let registry = sqlite_registry().await;
    let user = match registry.create_user(&fixtures::sample_user_body()).await {
        Ok(u) => u,
        Err(e) => panic!("user rejected: {e}"),
    };

    let mut created = Vec::new();
    for (name, size) in [("Zeta", 30), ("Alpha", 1)] {
        let mut body = fixtures::sample_programme_body(user.id);
        body["name"] = json!(name);
        body["defaultCohortSize"] = json!(size);
        match registry.create_programme(&body).await {
            Ok(p) => created.push(p),
            Err(e) => panic!("programme rejected: {e}"),
        }
    }

    let listed = match registry.list_programmes().await {
        Ok(p) => p,
        Err(e) => panic!("list failed: {e}"),
    };
    assert_eq!(listed, created);
    let sizes: Vec<u32> = listed.iter().map(|p| p.default_cohort_size.value()).collect();
    assert_eq!(sizes, [30, 1]);

    let fetched = match registry.get_programme(created[1].programme_id).await {
        Ok(p) => p,
        Err(e) => panic!("get failed: {e}"),
    };
    assert_eq!(fetched.name, "Alpha");
    assert_eq!(fetched.created_by, user.id);

    assert!(matches!(
        registry.get_programme(ProgrammeId::new(99)).await,
        Err(RegistryError::NotFound { resource: "programme", id: 99 })
    ));
}

#[tokio::test]
async fn sqlite_reports_field_and_reference_errors_together() {
    let registry = sqlite_registry().await;
    let body = json!({"programme": 999, "cohortSize": 0, "createdBy": 999});
    match registry.create_cohort(&body).await {
        Err(RegistryError::Invalid(errors)) => {
            assert_eq!(errors.messages("cohortSize"), [validation::MIN_ONE]);
            assert_eq!(errors.messages("programme"), [validation::missing_pk(999)]);
            assert_eq!(errors.messages("createdBy"), [validation::missing_pk(999)]);
        }
        other => panic!("invalid cohort must be rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn sqlite_email_case_folding_matches_memory_store() {
    let sqlite = sqlite_registry().await;
    let memory = Registry::new(Arc::new(MemoryStore::new()));

    for registry in [&sqlite, &memory] {
        let mut body = fixtures::sample_user_body();
        body["email"] = json!("\u{e9}t\u{e9}@x.io");
        if let Err(e) = registry.create_user(&body).await {
            panic!("first user rejected: {e}");
        }

        body["email"] = json!("\u{c9}t\u{e9}@x.io");
        assert!(
            registry.create_user(&body).await.is_ok(),
            "non-ASCII case differences must stay distinct"
        );

        body["email"] = json!("\u{e9}T\u{e9}@x.io");
        assert!(matches!(
            registry.create_user(&body).await,
            Err(RegistryError::Invalid(_))
        ));
    }
}
