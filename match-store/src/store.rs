//! Persistence abstraction trait.
//!
//! Lets the registry run unchanged over the in-memory tables or SQLite.

use async_trait::async_trait;
use match_core::{
    Cohort, CohortId, NewCohort, NewProgramme, NewTag, NewUser, Programme, ProgrammeId, Tag,
    TagId, User, UserId,
};

use crate::StoreError;

/// Row storage for every model.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
/// List methods return rows in ascending primary-key order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user and its profile as one unit.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the email is taken (ignoring case).
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look a user up by email, ignoring case.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::MissingReference`] if `created_by` does not exist.
    async fn insert_programme(&self, programme: NewProgramme) -> Result<Programme, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn get_programme(&self, id: ProgrammeId) -> Result<Option<Programme>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn list_programmes(&self) -> Result<Vec<Programme>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::MissingReference`] if the programme or creator
    /// does not exist.
    async fn insert_cohort(&self, cohort: NewCohort) -> Result<Cohort, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn get_cohort(&self, id: CohortId) -> Result<Option<Cohort>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn insert_tag(&self, tag: NewTag) -> Result<Tag, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Database`] on backend failure.
    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] if the backend cannot serve queries.
    async fn health_check(&self) -> Result<(), StoreError>;
}
