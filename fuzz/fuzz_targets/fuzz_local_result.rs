//! Fuzz target for local result document validation.
//!
//! Tests that validation of untrusted JSON handles arbitrary input without
//! panicking, and that accepted documents pass the typed consistency check.

#![no_main]

use cs_storage::validate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(local) = validate::local_result(&value) {
        validate::check_local_result(&local).expect("validated document is consistent");
    }
});
