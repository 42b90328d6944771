//! Result storage for compute studio tasks.
//!
//! A task produces typed outputs (plots, tables, images, files) split into two
//! categories. Each category is packed into its own ZIP archive, uploaded to a
//! blob store under `<task_id>_<category>.zip`, and described by a remote
//! manifest that is later used to fetch and decode the outputs again.
//!
//! # Layers
//!
//! - [`media`]: media types and the serializer each one uses
//! - [`writer`] / [`reader`]: one category's archive, in and out of memory
//! - [`storage`]: write/read across both categories against a [`BlobStore`]
//! - [`validate`]: shape checks on untyped JSON input, run before any work
//!
//! # Example
//!
//! ```no_run
//! use cs_storage::{MemoryBlobStore, ReadOptions, Storage};
//! use serde_json::json;
//!
//! let storage = Storage::with_store(MemoryBlobStore::new());
//! let remote = storage
//!     .write_value(
//!         "task-1",
//!         &json!({
//!             "renderable": [{"title": "plot", "media_type": "bokeh", "data": {"a": 1}}],
//!             "downloadable": []
//!         }),
//!         true,
//!     )
//!     .unwrap();
//! let local = storage.read(&remote, ReadOptions::default()).unwrap();
//! assert_eq!(local.renderable[0].title, "plot");
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod output;
pub mod reader;
pub mod storage;
pub mod store;
pub mod validate;
pub mod writer;

pub use config::{ConfigSource, StorageConfig};
pub use error::{Result, StorageError};
pub use media::{CodecError, Encoding, MediaType, Serializer};
pub use output::{
    Category, LocalOutput, LocalResult, OutputData, RemoteOutput, RemoteOutputCategory,
    RemoteResult,
};
pub use reader::ArchiveReader;
pub use storage::{BinaryEncoding, ReadOptions, Storage};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use validate::{ValidationError, ValidationResult};
pub use writer::ArchiveWriter;
