//! Fuzz target: validation of `POST /programmes` bodies.

#![no_main]

use libfuzzer_sys::fuzz_target;
use match_core::{FromJson, NewProgramme};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Err(errors) = NewProgramme::from_json(&value) {
        assert!(!errors.is_empty());
    }
});
