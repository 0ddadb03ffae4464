//! HTTP API gateway for the match cohort backend.
//!
//! Exposes list, create and detail endpoints for users, programmes,
//! cohorts and tags on top of a [`match_store::Registry`].

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
