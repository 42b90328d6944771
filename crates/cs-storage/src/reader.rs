//! Archive reader for one category's outputs.
//!
//! Members are located by the filenames recorded in the manifest. The
//! archive's own listing is never used to decide what an archive contains.

use crate::output::{LocalOutput, RemoteOutput};
use crate::{Result, StorageError};
use std::io::{Cursor, Read, Seek};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Random-access reader over a category archive.
pub struct ArchiveReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl ArchiveReader<Cursor<Vec<u8>>> {
    /// Open an archive from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Create a reader from any Read + Seek source.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Whether the archive has a member with this exact name.
    ///
    /// For diagnostics only.
    pub fn has_member(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read a member's raw bytes.
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(StorageError::MissingMember(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        debug!(member = name, bytes = data.len(), "Read archive member");

        Ok(data)
    }

    /// Read and decode the member a manifest entry points at.
    pub fn read_output(&mut self, entry: &RemoteOutput) -> Result<LocalOutput> {
        let serializer = entry.media_type.serializer();
        let raw = self.read_member(&entry.filename)?;
        let data = serializer
            .deserialize(raw)
            .map_err(|source| StorageError::Decode {
                filename: entry.filename.clone(),
                media_type: entry.media_type,
                source,
            })?;

        Ok(LocalOutput {
            id: entry.id,
            title: entry.title.clone(),
            media_type: entry.media_type,
            data,
        })
    }

    /// Read every manifest entry, in manifest order.
    pub fn read_all(&mut self, entries: &[RemoteOutput]) -> Result<Vec<LocalOutput>> {
        entries.iter().map(|entry| self.read_output(entry)).collect()
    }
}

/// Decode all outputs listed in `entries` from archive bytes.
pub fn read(bytes: Vec<u8>, entries: &[RemoteOutput]) -> Result<Vec<LocalOutput>> {
    ArchiveReader::from_bytes(bytes)?.read_all(entries)
}
