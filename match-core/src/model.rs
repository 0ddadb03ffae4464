use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::headcount::HeadCount;
use crate::id::{CohortId, ProgrammeId, TagId, UserId};

/// A registered person who can create programmes and cohorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Login address, unique ignoring case.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Salted password hash. Never leaves the server.
    #[serde(skip)]
    pub password_hash: String,
    /// One-to-one profile details.
    pub profile: Profile,
}

/// Employment details attached to every [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Profile {
    /// Job title, e.g. `"Consultant"`.
    pub position: String,
    /// Department name, e.g. `"HR"`.
    pub department: String,
    pub date_of_birth: NaiveDate,
    pub join_date: NaiveDate,
    /// Free text; empty when not supplied.
    pub bio: String,
}

impl Profile {
    /// Creates a profile.
    #[must_use]
    pub fn new(
        position: String,
        department: String,
        date_of_birth: NaiveDate,
        join_date: NaiveDate,
        bio: String,
    ) -> Self {
        Self { position, department, date_of_birth, join_date, bio }
    }
}

/// A training programme that cohorts are opened against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Programme {
    pub programme_id: ProgrammeId,
    pub name: String,
    pub description: String,
    /// Size suggested for new cohorts of this programme.
    pub default_cohort_size: HeadCount,
    pub created_by: UserId,
}

/// One intake of a [`Programme`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Cohort {
    pub cohort_id: CohortId,
    pub programme: ProgrammeId,
    pub cohort_size: HeadCount,
    pub created_by: UserId,
    /// When the cohort opened; defaults to its creation time.
    pub open_date: DateTime<Utc>,
}

/// A free-form label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A user row ready to be inserted, with the password already hashed.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub profile: Profile,
}

impl NewUser {
    /// Creates an insertable user.
    #[must_use]
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        profile: Profile,
    ) -> Self {
        Self { email, first_name, last_name, password_hash, profile }
    }

    /// Attaches the assigned primary key.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            profile: self.profile,
        }
    }
}

/// A programme row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewProgramme {
    pub name: String,
    pub description: String,
    pub default_cohort_size: HeadCount,
    pub created_by: UserId,
}

impl NewProgramme {
    /// Creates an insertable programme.
    #[must_use]
    pub fn new(
        name: String,
        description: String,
        default_cohort_size: HeadCount,
        created_by: UserId,
    ) -> Self {
        Self { name, description, default_cohort_size, created_by }
    }

    /// Attaches the assigned primary key.
    #[must_use]
    pub fn into_programme(self, programme_id: ProgrammeId) -> Programme {
        Programme {
            programme_id,
            name: self.name,
            description: self.description,
            default_cohort_size: self.default_cohort_size,
            created_by: self.created_by,
        }
    }
}

/// A cohort row ready to be inserted. The open date is already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewCohort {
    pub programme: ProgrammeId,
    pub cohort_size: HeadCount,
    pub created_by: UserId,
    pub open_date: DateTime<Utc>,
}

impl NewCohort {
    /// Creates an insertable cohort.
    #[must_use]
    pub fn new(
        programme: ProgrammeId,
        cohort_size: HeadCount,
        created_by: UserId,
        open_date: DateTime<Utc>,
    ) -> Self {
        Self { programme, cohort_size, created_by, open_date }
    }

    /// Attaches the assigned primary key.
    #[must_use]
    pub fn into_cohort(self, cohort_id: CohortId) -> Cohort {
        Cohort {
            cohort_id,
            programme: self.programme,
            cohort_size: self.cohort_size,
            created_by: self.created_by,
            open_date: self.open_date,
        }
    }
}

/// A tag row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewTag {
    pub name: String,
}

impl NewTag {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self { name }
    }

    /// Attaches the assigned primary key.
    #[must_use]
    pub fn into_tag(self, id: TagId) -> Tag {
        Tag { id, name: self.name }
    }
}
