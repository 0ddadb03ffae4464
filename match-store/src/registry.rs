//! Validate-then-save service over a [`Store`].
//!
//! Runs the serializers, adds the checks that need the database (foreign
//! keys, email uniqueness), fills defaults, and persists.

use std::sync::Arc;

use chrono::Utc;
use match_core::validation::{self, ValidationErrors};
use match_core::{
    Cohort, CohortId, CohortInput, FromJson, Lookups, NewCohort, NewProgramme, NewTag, NewUser,
    Programme, ProgrammeId, Tag, TagId, User, UserId, UserInput,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::password::hash_password;
use crate::{RegistryError, Store, StoreError};

/// Entry point for every create, list and detail operation.
///
/// Cheap to share: clone the surrounding `Arc` rather than the registry.
pub struct Registry {
    store: Arc<dyn Store>,
}

impl Registry {
    /// Create a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Validate a user body, hash its password and save it with its profile.
    ///
    /// # Errors
    /// Returns [`RegistryError::Invalid`] for field errors or a taken email,
    /// reported together. Propagates other store failures as
    /// [`RegistryError::Store`].
    pub async fn create_user(&self, body: &Value) -> Result<User, RegistryError> {
        let parsed = UserInput::from_json(body);
        let found = self.check_lookups(&UserInput::lookups(body)).await?;
        let input = merge(parsed, found)?;

        let new_user = NewUser::new(
            input.email,
            input.first_name,
            input.last_name,
            hash_password(&input.password)?,
            input.profile,
        );
        let user = self.store.insert_user(new_user).await.map_err(reference_errors)?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Validate a programme body, check its creator exists, and save it.
    ///
    /// # Errors
    /// Returns [`RegistryError::Invalid`] for field errors or an unknown
    /// `createdBy`, reported together.
    pub async fn create_programme(&self, body: &Value) -> Result<Programme, RegistryError> {
        let parsed = NewProgramme::from_json(body);
        let found = self.check_lookups(&NewProgramme::lookups(body)).await?;
        let programme = merge(parsed, found)?;

        let programme = self
            .store
            .insert_programme(programme)
            .await
            .map_err(reference_errors)?;
        info!(programme_id = %programme.programme_id, "programme created");
        Ok(programme)
    }

    /// Validate a cohort body, check its references, default `openDate` to
    /// now, and save it.
    ///
    /// # Errors
    /// Returns [`RegistryError::Invalid`] for field errors or unknown
    /// `programme` / `createdBy` references, all reported at once.
    pub async fn create_cohort(&self, body: &Value) -> Result<Cohort, RegistryError> {
        let parsed = CohortInput::from_json(body);
        let found = self.check_lookups(&CohortInput::lookups(body)).await?;
        let input = merge(parsed, found)?;

        let open_date = input.open_date.unwrap_or_else(Utc::now);
        let cohort = NewCohort::new(input.programme, input.cohort_size, input.created_by, open_date);
        let cohort = self.store.insert_cohort(cohort).await.map_err(reference_errors)?;
        info!(
            cohort_id = %cohort.cohort_id,
            programme_id = %cohort.programme,
            "cohort created"
        );
        Ok(cohort)
    }

    /// Validate a tag body and save it.
    ///
    /// # Errors
    /// Returns [`RegistryError::Invalid`] if the name is missing or invalid.
    pub async fn create_tag(&self, body: &Value) -> Result<Tag, RegistryError> {
        let tag = NewTag::from_json(body)?;
        let tag = self.store.insert_tag(tag).await?;
        debug!(tag_id = %tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn list_users(&self) -> Result<Vec<User>, RegistryError> {
        Ok(self.store.list_users().await?)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no user has `id`.
    pub async fn get_user(&self, id: UserId) -> Result<User, RegistryError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(RegistryError::NotFound { resource: "user", id: id.get() })
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn list_programmes(&self) -> Result<Vec<Programme>, RegistryError> {
        Ok(self.store.list_programmes().await?)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no programme has `id`.
    pub async fn get_programme(&self, id: ProgrammeId) -> Result<Programme, RegistryError> {
        self.store
            .get_programme(id)
            .await?
            .ok_or(RegistryError::NotFound { resource: "programme", id: id.get() })
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn list_cohorts(&self) -> Result<Vec<Cohort>, RegistryError> {
        Ok(self.store.list_cohorts().await?)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no cohort has `id`.
    pub async fn get_cohort(&self, id: CohortId) -> Result<Cohort, RegistryError> {
        self.store
            .get_cohort(id)
            .await?
            .ok_or(RegistryError::NotFound { resource: "cohort", id: id.get() })
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, RegistryError> {
        Ok(self.store.list_tags().await?)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no tag has `id`.
    pub async fn get_tag(&self, id: TagId) -> Result<Tag, RegistryError> {
        self.store
            .get_tag(id)
            .await?
            .ok_or(RegistryError::NotFound { resource: "tag", id: id.get() })
    }

    /// Errors for lookup keys the store cannot vouch for.
    async fn check_lookups(&self, lookups: &Lookups) -> Result<ValidationErrors, StoreError> {
        let mut errors = ValidationErrors::new();
        if let Some(email) = &lookups.email {
            if self.store.find_user_by_email(email).await?.is_some() {
                errors.add("email", validation::DUPLICATE_EMAIL);
            }
        }
        if let Some(id) = lookups.programme {
            if self.store.get_programme(id).await?.is_none() {
                errors.add("programme", validation::missing_pk(id.get()));
            }
        }
        if let Some(id) = lookups.created_by {
            if self.store.get_user(id).await?.is_none() {
                errors.add("createdBy", validation::missing_pk(id.get()));
            }
        }
        Ok(errors)
    }
}

/// Combines serializer output with the store-backed errors in `found`.
fn merge<T>(
    parsed: Result<T, ValidationErrors>,
    found: ValidationErrors,
) -> Result<T, ValidationErrors> {
    match parsed {
        Ok(value) => found.into_result(value),
        Err(mut errors) => {
            errors.merge(found);
            Err(errors)
        }
    }
}

/// Turns a reference or uniqueness failure that raced past the lookups
/// into the same field error the lookups would have produced.
fn reference_errors(err: StoreError) -> RegistryError {
    match err {
        StoreError::MissingReference { field, id, .. } => {
            let mut errors = ValidationErrors::new();
            errors.add(field, validation::missing_pk(id));
            RegistryError::Invalid(errors)
        }
        StoreError::Conflict { field: "email", .. } => {
            let mut errors = ValidationErrors::new();
            errors.add("email", validation::DUPLICATE_EMAIL);
            RegistryError::Invalid(errors)
        }
        other => RegistryError::Store(other),
    }
}
