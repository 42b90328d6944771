//! Storage configuration resolution.
//!
//! Resolution order: CLI arguments → environment variables → defaults.

use crate::store::{BlobStore, FsBlobStore};
use std::path::{Path, PathBuf};

/// Bucket location. Takes precedence over [`ENV_BUCKET_LEGACY`].
pub const ENV_BUCKET: &str = "CS_STORAGE_BUCKET";
/// Bucket variable read by earlier deployments.
pub const ENV_BUCKET_LEGACY: &str = "BUCKET";
/// Base URL of the public object endpoint, used for screenshot links.
pub const ENV_PUBLIC_URL: &str = "CS_STORAGE_PUBLIC_URL";

pub const DEFAULT_PUBLIC_URL: &str = "https://storage.googleapis.com";

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Resolved storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Bucket directory. `None` means no blob store is available.
    pub bucket: Option<PathBuf>,

    /// Source of the bucket setting (for diagnostics).
    pub bucket_source: ConfigSource,

    /// Base URL for public object links.
    pub public_url_base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            bucket_source: ConfigSource::BuiltinDefault,
            public_url_base: DEFAULT_PUBLIC_URL.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve from CLI overrides and the process environment.
    pub fn resolve(cli_bucket: Option<&Path>) -> Self {
        Self::resolve_with(cli_bucket, |name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    pub fn resolve_with(cli_bucket: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = StorageConfig::default();

        if let Some(path) = cli_bucket {
            config.bucket = Some(path.to_path_buf());
            config.bucket_source = ConfigSource::CliArgument;
        } else if let Some(path) = [ENV_BUCKET, ENV_BUCKET_LEGACY]
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
        {
            config.bucket = Some(PathBuf::from(path));
            config.bucket_source = ConfigSource::Environment;
        }

        if let Some(url) = lookup(ENV_PUBLIC_URL).filter(|v| !v.is_empty()) {
            config.public_url_base = url;
        }

        config
    }

    /// Set the bucket directory.
    pub fn with_bucket(mut self, bucket: impl Into<PathBuf>) -> Self {
        self.bucket = Some(bucket.into());
        self.bucket_source = ConfigSource::CliArgument;
        self
    }

    /// Bucket name used in public links (last path component).
    pub fn bucket_name(&self) -> Option<String> {
        let bucket = self.bucket.as_ref()?;
        bucket
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .or_else(|| Some(bucket.to_string_lossy().into_owned()))
    }

    /// Open the configured blob store, if any.
    pub fn open_store(&self) -> Option<Box<dyn BlobStore>> {
        self.bucket
            .as_ref()
            .map(|root| Box::new(FsBlobStore::new(root)) as Box<dyn BlobStore>)
    }
}
