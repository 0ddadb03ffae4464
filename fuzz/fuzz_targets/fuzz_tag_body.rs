//! Fuzz target: validation of `POST /tags` bodies.

#![no_main]

use libfuzzer_sys::fuzz_target;
use match_core::{FromJson, NewTag};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    match NewTag::from_json(&value) {
        Ok(tag) => assert!(!tag.name.trim().is_empty()),
        Err(errors) => assert!(!errors.is_empty()),
    }
});
