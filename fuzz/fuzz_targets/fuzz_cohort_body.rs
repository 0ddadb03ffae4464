//! Fuzz target: validation of `POST /cohorts` bodies.
//!
//! Accepted bodies must always carry a head count of at least one.

#![no_main]

use libfuzzer_sys::fuzz_target;
use match_core::{CohortInput, FromJson};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    match CohortInput::from_json(&value) {
        Ok(input) => assert!(input.cohort_size.value() >= 1),
        Err(errors) => assert!(!errors.is_empty()),
    }
});
