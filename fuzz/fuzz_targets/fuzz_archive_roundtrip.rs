//! Fuzz target for building and re-reading archives.
//!
//! Every output the writer accepts must decode back to the same value.

#![no_main]

use arbitrary::Arbitrary;
use cs_storage::{reader, writer, Encoding, LocalOutput, MediaType, OutputData, StorageError};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzOutput {
    title: String,
    media_type: u8,
    payload: Vec<u8>,
}

impl FuzzOutput {
    fn into_output(self) -> Option<LocalOutput> {
        let all = MediaType::all();
        let media_type = all[self.media_type as usize % all.len()];
        let data = match media_type.encoding() {
            Encoding::Identity => OutputData::Bytes(self.payload),
            Encoding::Text => OutputData::Text(String::from_utf8(self.payload).ok()?),
            Encoding::Json => OutputData::Json(serde_json::from_slice(&self.payload).ok()?),
        };
        Some(LocalOutput::new(self.title, media_type, data))
    }
}

fuzz_target!(|items: Vec<FuzzOutput>| {
    let outputs: Vec<LocalOutput> = items
        .into_iter()
        .filter_map(FuzzOutput::into_output)
        .collect();

    match writer::build(outputs.clone()) {
        Ok((bytes, entries)) => {
            let decoded = reader::read(bytes, &entries).expect("written archive must read back");
            assert_eq!(decoded, outputs);
        }
        Err(StorageError::DuplicateFilename { .. }) => {}
        Err(err) => panic!("unexpected write error: {err}"),
    }
});
