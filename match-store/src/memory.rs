//! In-process store.
//!
//! Keeps every table in a `BTreeMap` behind one async `RwLock`. Foreign keys
//! and email uniqueness are checked under the write lock, so inserts are
//! atomic with respect to each other.

use std::collections::BTreeMap;

use async_trait::async_trait;
use match_core::{
    Cohort, CohortId, NewCohort, NewProgramme, NewTag, NewUser, Programme, ProgrammeId, Tag,
    TagId, User, UserId,
};
use tokio::sync::RwLock;

use crate::{Store, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    programmes: BTreeMap<ProgrammeId, Programme>,
    cohorts: BTreeMap<CohortId, Cohort>,
    tags: BTreeMap<TagId, Tag>,
    last_user: i64,
    last_programme: i64,
    last_cohort: i64,
    last_tag: i64,
}

impl Tables {
    fn require_user(&self, field: &'static str, id: UserId) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference { field, resource: "user", id: id.get() })
        }
    }

    fn require_programme(&self, field: &'static str, id: ProgrammeId) -> Result<(), StoreError> {
        if self.programmes.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference { field, resource: "programme", id: id.get() })
        }
    }

    /// ASCII-only case folding, the same as SQLite's `NOCASE` collation.
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }
}

/// Thread-safe, non-persistent [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict {
                resource: "user",
                field: "email",
                value: user.email,
            });
        }
        tables.last_user += 1;
        let user = user.into_user(UserId::new(tables.last_user));
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.user_by_email(email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn insert_programme(&self, programme: NewProgramme) -> Result<Programme, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user("createdBy", programme.created_by)?;
        tables.last_programme += 1;
        let programme = programme.into_programme(ProgrammeId::new(tables.last_programme));
        tables.programmes.insert(programme.programme_id, programme.clone());
        Ok(programme)
    }

    async fn get_programme(&self, id: ProgrammeId) -> Result<Option<Programme>, StoreError> {
        Ok(self.tables.read().await.programmes.get(&id).cloned())
    }

    async fn list_programmes(&self) -> Result<Vec<Programme>, StoreError> {
        Ok(self.tables.read().await.programmes.values().cloned().collect())
    }

    async fn insert_cohort(&self, cohort: NewCohort) -> Result<Cohort, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_programme("programme", cohort.programme)?;
        tables.require_user("createdBy", cohort.created_by)?;
        tables.last_cohort += 1;
        let cohort = cohort.into_cohort(CohortId::new(tables.last_cohort));
        tables.cohorts.insert(cohort.cohort_id, cohort.clone());
        Ok(cohort)
    }

    async fn get_cohort(&self, id: CohortId) -> Result<Option<Cohort>, StoreError> {
        Ok(self.tables.read().await.cohorts.get(&id).cloned())
    }

    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError> {
        Ok(self.tables.read().await.cohorts.values().cloned().collect())
    }

    async fn insert_tag(&self, tag: NewTag) -> Result<Tag, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_tag += 1;
        let tag = tag.into_tag(TagId::new(tables.last_tag));
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.tables.read().await.tags.values().cloned().collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
