//! Fuzz target for category archive reading.
//!
//! Archives come from the blob store and may be truncated or tampered with.
//! Opening and decoding them must return errors, never panic.

#![no_main]

use cs_storage::{ArchiveReader, MediaType, RemoteOutput};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut reader) = ArchiveReader::from_bytes(data.to_vec()) else {
        return;
    };
    for media_type in MediaType::all() {
        let entry = RemoteOutput {
            id: None,
            title: "fuzz".to_string(),
            media_type: *media_type,
            filename: media_type.serializer().filename_for("fuzz"),
            screenshot: None,
        };
        let _ = reader.read_output(&entry);
    }
});
