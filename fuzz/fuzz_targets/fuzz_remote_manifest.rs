//! Fuzz target for remote manifest parsing.
//!
//! Manifests are stored by callers and passed back on read. Parsing must
//! reject malformed input with an error, and accepted manifests must
//! survive serialization unchanged.

#![no_main]

use cs_storage::RemoteResult;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(remote) = RemoteResult::from_json(text) {
        let json = remote.to_json().expect("manifest serializes");
        let reparsed = RemoteResult::from_json(&json).expect("serialized manifest parses");
        assert_eq!(reparsed, remote);
    }
});
