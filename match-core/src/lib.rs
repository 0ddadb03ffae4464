//! Core types for the match cohort backend.
//!
//! Defines the model (users, programmes, cohorts, tags), their typed
//! identifiers, and the serializers that validate JSON request bodies.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod fixtures;
pub mod headcount;
pub mod id;
pub mod model;
pub mod serializer;
pub mod validation;

pub use error::CoreError;
pub use headcount::HeadCount;
pub use id::{CohortId, ProgrammeId, TagId, UserId};
pub use model::{Cohort, NewCohort, NewProgramme, NewTag, NewUser, Profile, Programme, Tag, User};
pub use serializer::{CohortInput, FromJson, Lookups, UserInput};
pub use validation::{FieldErrors, ValidationErrors};
