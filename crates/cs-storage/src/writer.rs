//! Archive writer for one category's outputs.
//!
//! Encodes each output with its media type's serializer and writes it into an
//! in-memory ZIP archive, recording a manifest entry per output.

use crate::output::{LocalOutput, RemoteOutput};
use crate::{Result, StorageError};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Builder for a category archive.
///
/// Member names must be unique within an archive: an output whose filename
/// collides with an earlier one is rejected with
/// [`StorageError::DuplicateFilename`] instead of overwriting it.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<RemoteOutput>,
    titles_by_filename: HashMap<String, String>,
    total_bytes: u64,
}

impl ArchiveWriter {
    /// Create an empty in-memory archive.
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
            titles_by_filename: HashMap::new(),
            total_bytes: 0,
        }
    }

    /// Encode an output and write it as a new archive member.
    ///
    /// Returns the manifest entry recorded for it.
    pub fn add_output(&mut self, output: LocalOutput) -> Result<&RemoteOutput> {
        let serializer = output.media_type.serializer();
        let data = serializer
            .serialize(&output.data)
            .map_err(|source| StorageError::Encode {
                title: output.title.clone(),
                media_type: output.media_type,
                source,
            })?;

        let filename = serializer.filename_for(&output.title);
        if let Some(first_title) = self.titles_by_filename.get(&filename) {
            return Err(StorageError::DuplicateFilename {
                filename,
                first_title: first_title.clone(),
                title: output.title,
            });
        }

        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.zip.start_file(filename.as_str(), options)?;
        self.zip.write_all(&data)?;

        let bytes = data.len() as u64;
        self.total_bytes += bytes;
        debug!(
            filename = %filename,
            media_type = %output.media_type,
            bytes,
            "Added output to archive"
        );

        self.titles_by_filename
            .insert(filename.clone(), output.title.clone());
        self.entries.push(RemoteOutput {
            id: output.id,
            title: output.title,
            media_type: output.media_type,
            filename,
            screenshot: None,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Manifest entries recorded so far, in insertion order.
    pub fn entries(&self) -> &[RemoteOutput] {
        &self.entries
    }

    /// Number of members written.
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Total encoded size before compression.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Finalize the archive and return its bytes with the manifest entries.
    pub fn finish(self) -> Result<(Vec<u8>, Vec<RemoteOutput>)> {
        let bytes = self.zip.finish()?.into_inner();

        debug!(
            files = self.entries.len(),
            compressed_bytes = bytes.len(),
            uncompressed_bytes = self.total_bytes,
            "Archive finalized"
        );

        Ok((bytes, self.entries))
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one archive from an ordered sequence of outputs.
pub fn build(outputs: impl IntoIterator<Item = LocalOutput>) -> Result<(Vec<u8>, Vec<RemoteOutput>)> {
    let mut writer = ArchiveWriter::new();
    for output in outputs {
        writer.add_output(output)?;
    }
    writer.finish()
}
