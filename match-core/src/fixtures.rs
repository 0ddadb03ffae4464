//! Canonical request bodies for tests and local seeding.
//!
//! The three bodies form a reference chain:
//! user ← programme (`createdBy`) ← cohort (`programme`, `createdBy`).

use serde_json::{json, Value};

use crate::id::{ProgrammeId, UserId};

/// A complete, valid user create body with a nested profile.
#[must_use]
pub fn sample_user_body() -> Value {
    json!({
        "email": "test@example.com",
        "first_name": "John",
        "last_name": "Smith",
        "password": "hunter2",
        "profile": {
            "position": "Consultant",
            "department": "HR",
            "dateOfBirth": "2000-11-30",
            "joinDate": "2016-01-03",
            "bio": "I like people, places and things"
        }
    })
}

/// A valid programme create body owned by `creator`.
#[must_use]
pub fn sample_programme_body(creator: UserId) -> Value {
    json!({
        "name": "Test Programme",
        "description": "This is a test programme.",
        "defaultCohortSize": 100,
        "createdBy": creator.get()
    })
}

/// A valid cohort create body with no open date.
#[must_use]
pub fn sample_cohort_body(programme: ProgrammeId, creator: UserId) -> Value {
    json!({
        "programme": programme.get(),
        "cohortSize": 200,
        "createdBy": creator.get()
    })
}

/// A valid tag create body.
#[must_use]
pub fn sample_tag_body(name: &str) -> Value {
    json!({ "name": name })
}
