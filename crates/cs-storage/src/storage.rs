//! Write and read task results across both categories.
//!
//! Write builds one archive per category, uploads them under
//! `<task_id>_<category>.zip`, and returns the remote manifest. Read fetches
//! the archives named by a manifest and decodes every listed output.
//!
//! Both directions validate their input before doing any work, and neither
//! returns partial results: the first error aborts the call.

use crate::config::StorageConfig;
use crate::output::{Category, LocalResult, OutputData, RemoteOutputCategory, RemoteResult};
use crate::store::BlobStore;
use crate::{reader, validate, writer, Result, StorageError};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// How identity-encoded (binary) outputs are returned by a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BinaryEncoding {
    /// Raw bytes.
    #[default]
    Raw,
    /// Standard base64 text, so the whole result can be embedded in JSON.
    Base64,
}

/// Options for [`Storage::read`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub binary: BinaryEncoding,
}

impl ReadOptions {
    /// Return binary outputs as base64 strings.
    pub fn json_serializable() -> Self {
        Self {
            binary: BinaryEncoding::Base64,
        }
    }
}

/// Result storage bound to an optional blob store.
pub struct Storage {
    store: Option<Box<dyn BlobStore>>,
}

impl Storage {
    pub fn new(store: Option<Box<dyn BlobStore>>) -> Self {
        Self { store }
    }

    /// Storage backed by `store`.
    pub fn with_store(store: impl BlobStore + 'static) -> Self {
        Self::new(Some(Box::new(store)))
    }

    /// Storage with no blob store. Only writes with upload disabled succeed.
    pub fn detached() -> Self {
        Self::new(None)
    }

    /// Storage for a resolved configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.open_store())
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn BlobStore> {
        self.store.as_deref().ok_or(StorageError::StoreUnavailable)
    }

    /// Validate an untyped local result document, then [`write`](Self::write) it.
    pub fn write_value(
        &self,
        task_id: &str,
        local: &serde_json::Value,
        upload: bool,
    ) -> Result<RemoteResult> {
        let local = validate::local_result(local)?;
        self.write(task_id, local, upload)
    }

    /// Package both categories and, if `upload` is set, store the archives.
    ///
    /// Outputs without an id are assigned a fresh one. All archives are built
    /// before the first upload, so a failing output leaves the store untouched.
    pub fn write(&self, task_id: &str, mut local: LocalResult, upload: bool) -> Result<RemoteResult> {
        let start = Instant::now();

        validate::task_id(task_id)?;
        validate::check_local_result(&local)?;
        let store = if upload { Some(self.store()?) } else { None };

        let mut archives = Vec::with_capacity(Category::all().len());
        for category in Category::all() {
            let outputs = std::mem::take(local.category_mut(*category));
            let outputs = outputs.into_iter().map(|mut output| {
                if output.id.is_none() {
                    output.id = Some(Uuid::new_v4());
                }
                output
            });
            let (bytes, entries) = writer::build(outputs)?;
            let key = category.archive_key(task_id);

            debug!(
                task_id,
                category = %category,
                key = %key,
                outputs = entries.len(),
                bytes = bytes.len(),
                "Category archive built"
            );

            archives.push((*category, key, bytes, entries));
        }

        let mut remote = RemoteResult::new();
        for (category, key, bytes, entries) in archives {
            if let Some(store) = store {
                store.put(&key, &bytes)?;
                info!(task_id, category = %category, key = %key, bytes = bytes.len(), "Archive uploaded");
            }
            remote.set_category(
                category,
                RemoteOutputCategory {
                    ziplocation: key,
                    outputs: entries,
                },
            );
        }

        info!(
            task_id,
            uploaded = upload,
            duration_ms = start.elapsed().as_millis() as u64,
            "Write finished"
        );

        Ok(remote)
    }

    /// Validate an untyped remote manifest document, then [`read`](Self::read) it.
    pub fn read_value(&self, remote: &serde_json::Value, options: ReadOptions) -> Result<LocalResult> {
        let remote = validate::remote_result(remote)?;
        self.read(&remote, options)
    }

    /// Fetch and decode every output listed in the manifest.
    ///
    /// Categories absent from the manifest come back empty.
    pub fn read(&self, remote: &RemoteResult, options: ReadOptions) -> Result<LocalResult> {
        let start = Instant::now();
        let store = self.store()?;

        let mut local = LocalResult::new();
        for (category, entry) in remote.categories() {
            let bytes = store.get(&entry.ziplocation)?;
            let mut outputs = reader::read(bytes, &entry.outputs)?;

            if options.binary == BinaryEncoding::Base64 {
                for output in &mut outputs {
                    let data = std::mem::replace(&mut output.data, OutputData::Bytes(Vec::new()));
                    output.data = data.into_base64();
                }
            }

            debug!(
                category = %category,
                key = %entry.ziplocation,
                outputs = outputs.len(),
                "Category archive read"
            );
            *local.category_mut(category) = outputs;
        }

        info!(
            outputs = local.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Read finished"
        );

        Ok(local)
    }
}
