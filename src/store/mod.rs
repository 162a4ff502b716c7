//! Durable storage for the approval set.
//!
//! Three interchangeable backends, tried in priority order on every call:
//!
//! 1. Redis over its wire protocol, when `REDIS_URL` is set
//! 2. a REST key-value service (Vercel KV / Upstash), when a URL and a token
//!    are set; a read-only token allows loading only
//! 3. a local JSON file, always available
//!
//! The set is read and written wholesale under one key. There is no
//! versioning, so concurrent saves race and the last one wins.

pub(crate) mod file;
pub(crate) mod redis;
pub(crate) mod rest;

use serde_json::Value;
use tracing::instrument;

use crate::core::config::StoreConfig;
use crate::core::error::{ConfigError, Error};
use crate::types::approval::ApprovalSet;

use self::file::FileBackend;
use self::redis::RedisBackend;
use self::rest::RestBackend;

pub(crate) trait Backend {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing is stored yet.
    async fn fetch(&self) -> Result<Option<Value>, Error>;

    async fn put(&self, value: &Value) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

#[derive(Clone, Debug)]
enum Source {
    Redis(RedisBackend),
    Rest(RestBackend),
    File(FileBackend),
}

impl Source {
    fn allows(&self, access: Access) -> bool {
        match (self, access) {
            (Source::Rest(rest), Access::Write) => rest.can_write(),
            _ => true,
        }
    }

    fn is_file(&self) -> bool {
        matches!(self, Source::File(_))
    }
}

impl Backend for Source {
    fn name(&self) -> &'static str {
        match self {
            Source::Redis(backend) => backend.name(),
            Source::Rest(backend) => backend.name(),
            Source::File(backend) => backend.name(),
        }
    }

    async fn fetch(&self) -> Result<Option<Value>, Error> {
        match self {
            Source::Redis(backend) => backend.fetch().await,
            Source::Rest(backend) => backend.fetch().await,
            Source::File(backend) => backend.fetch().await,
        }
    }

    async fn put(&self, value: &Value) -> Result<(), Error> {
        match self {
            Source::Redis(backend) => backend.put(value).await,
            Source::Rest(backend) => backend.put(value).await,
            Source::File(backend) => backend.put(value).await,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApprovalStore {
    // remote backends, highest priority first
    remotes: Vec<Source>,
    fallback: Source,
    file: FileBackend,
    production: bool,
}

impl ApprovalStore {
    pub(crate) fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let file = FileBackend::new(config.file_path.clone());
        let mut remotes = Vec::with_capacity(2);

        if let Some(url) = &config.redis_url {
            remotes.push(Source::Redis(RedisBackend::new(
                url,
                &config.key,
                config.timeout,
            )?));
        }

        if let Some(rest) = RestBackend::new(config)? {
            remotes.push(Source::Rest(rest));
        }

        tracing::info!(
            backends = ?remotes.iter().map(Backend::name).collect::<Vec<_>>(),
            production = config.production,
            "Approval store configured"
        );

        Ok(Self {
            remotes,
            fallback: Source::File(file.clone()),
            file,
            production: config.production,
        })
    }

    fn candidates(&self, access: Access) -> impl Iterator<Item = &Source> {
        self.remotes
            .iter()
            .filter(move |source| source.allows(access))
            .chain(std::iter::once(&self.fallback))
    }

    fn first(&self, access: Access) -> &Source {
        self.remotes
            .iter()
            .find(|source| source.allows(access))
            .unwrap_or(&self.fallback)
    }

    // a REST service we may read but not write
    fn is_read_only(&self) -> bool {
        self.remotes
            .iter()
            .any(|source| matches!(source, Source::Rest(rest) if !rest.can_write()))
    }

    /// Name of the backend a call with `access` would use, for diagnostics.
    pub(crate) fn selected(&self, access: Access) -> &'static str {
        let source = self.first(access);

        if access == Access::Write && source.is_file() && self.is_read_only() && self.production {
            return "none";
        }

        source.name()
    }

    /// Loads the approval set. Never fails: backend errors fall through to the
    /// next backend, and missing or malformed data reads as an empty set.
    #[instrument(skip_all)]
    pub(crate) async fn load(&self) -> ApprovalSet {
        for source in self.candidates(Access::Read) {
            match source.fetch().await {
                Ok(Some(value)) => return ApprovalSet::decode(value),
                Ok(None) if source.is_file() => return ApprovalSet::new(),
                Ok(None) => return self.seed(source).await,
                Err(e) => {
                    tracing::error!(
                        backend = source.name(),
                        "Error loading approvals, trying next backend: {}",
                        e
                    );
                }
            }
        }

        ApprovalSet::new()
    }

    /// Copies the file's approvals into an empty remote backend, so a fresh
    /// deployment starts from what was curated locally.
    async fn seed(&self, source: &Source) -> ApprovalSet {
        let local = match self.file.fetch().await {
            Ok(Some(value)) => ApprovalSet::decode(value),
            Ok(None) => return ApprovalSet::new(),
            Err(e) => {
                tracing::warn!("Could not read approvals file for seeding: {}", e);
                return ApprovalSet::new();
            }
        };

        if local.is_empty() || !source.allows(Access::Write) {
            return local;
        }

        match serde_json::to_value(&local) {
            Ok(value) => match source.put(&value).await {
                Ok(()) => tracing::info!(
                    backend = source.name(),
                    count = local.len(),
                    "Seeded approvals from file"
                ),
                Err(e) => tracing::error!(backend = source.name(), "Seeding failed: {}", e),
            },
            Err(e) => tracing::error!("Could not encode approvals for seeding: {}", e),
        }

        local
    }

    /// Writes the whole set. `Ok(false)` means only the local file was
    /// available and writing it failed. In production a remote write failure
    /// is an error rather than a silent fallback to the (ephemeral) file.
    #[instrument(skip_all, fields(count = set.len()))]
    pub(crate) async fn save(&self, set: &ApprovalSet) -> Result<bool, Error> {
        let value = serde_json::to_value(set)?;
        let source = self.first(Access::Write);

        if source.is_file() {
            if self.is_read_only() && self.production {
                return Err(Error::ReadOnlyStore);
            }

            return Ok(self.write_file(&value).await);
        }

        match source.put(&value).await {
            Ok(()) => Ok(true),
            Err(e) if self.production => Err(e),
            Err(e) => {
                tracing::warn!(
                    backend = source.name(),
                    "Error saving approvals, falling back to file: {}",
                    e
                );
                Ok(self.write_file(&value).await)
            }
        }
    }

    async fn write_file(&self, value: &Value) -> bool {
        match self.file.put(value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving approvals to file: {}", e);
                false
            }
        }
    }
}
