//! Fuzz target: validation of `POST /users` bodies.
//!
//! Arbitrary bytes that parse as JSON must either validate or produce a
//! non-empty error tree, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use match_core::{FromJson, UserInput};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Err(errors) = UserInput::from_json(&value) {
        assert!(!errors.is_empty());
    }
});
