use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use hyper::StatusCode;
use tracing::{debug, trace};
use xml::reader::ParserConfig;

use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::metadata_xml::{metadata_parser_config, parse_snapshot_info};
use crate::maven::repository::MavenRepository;
use crate::maven::resolve_result::{ResolveError, ResolveResult};
use crate::util::expiring_cache::ExpiringCache;
use crate::util::http_client::HttpTransport;

/// Remembers the timestamped version a snapshot resolved to, keyed by the snapshot's fuzzy id.
pub trait SnapshotCache: Send {
    fn get(&mut self, fuzzy_id: &str) -> Option<String>;

    fn put(&mut self, fuzzy_id: &str, snapshot_version: &str);

    /// Caches without a notion of expiry ignore this.
    fn set_ttl(&mut self, _ttl: Duration) {}
}

impl SnapshotCache for ExpiringCache<String, String> {
    fn get(&mut self, fuzzy_id: &str) -> Option<String> {
        ExpiringCache::get(self, fuzzy_id)
    }

    fn put(&mut self, fuzzy_id: &str, snapshot_version: &str) {
        ExpiringCache::put(self, fuzzy_id.to_string(), snapshot_version.to_string());
    }

    fn set_ttl(&mut self, ttl: Duration) {
        ExpiringCache::set_ttl(self, ttl);
    }
}

/// Translates a '-SNAPSHOT' version into the timestamped version of the latest snapshot build,
///  based on the maven-metadata.xml a repository publishes next to the snapshot's files.
///
/// Results are cached by fuzzy id, so all files of a snapshot (classifier variants, checksums)
///  resolve to the same build.
pub struct SnapshotResolver {
    transport: Arc<dyn HttpTransport>,
    parser_config: ParserConfig,
    cache: Box<dyn SnapshotCache>,
}

impl SnapshotResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, cache_ttl: Duration) -> SnapshotResolver {
        SnapshotResolver::with_cache(transport, Box::new(ExpiringCache::<String, String>::new(cache_ttl)))
    }

    pub fn with_cache(transport: Arc<dyn HttpTransport>, cache: Box<dyn SnapshotCache>) -> SnapshotResolver {
        SnapshotResolver {
            transport,
            parser_config: metadata_parser_config(),
            cache,
        }
    }

    pub fn set_cache_ttl(&mut self, ttl: Duration) {
        self.cache.set_ttl(ttl);
    }

    /// `NotFound` means that the repository does not publish metadata for this snapshot
    pub fn resolve(&mut self, repository: &MavenRepository, artifact_ref: &MavenArtifactRef) -> ResolveResult<String> {
        if !artifact_ref.is_snapshot() {
            return ResolveResult::Error(anyhow!("{} is not a snapshot", artifact_ref));
        }

        let fuzzy_id = artifact_ref.fuzzy_id();
        if let Some(version) = self.cache.get(&fuzzy_id) {
            debug!("snapshot version for {} from cache: {}", fuzzy_id, version);
            return ResolveResult::Success(version);
        }

        let result: ResolveResult<String> = self.fetch_snapshot_version(repository, artifact_ref).into();
        if let ResolveResult::Success(version) = &result {
            debug!("resolved snapshot {} in {} to {}", fuzzy_id, repository.name(), version);
            self.cache.put(&fuzzy_id, version);
        }
        result
    }

    fn fetch_snapshot_version(&self, repository: &MavenRepository, artifact_ref: &MavenArtifactRef) -> anyhow::Result<Option<String>> {
        let url = repository.resolve_url(&artifact_ref.snapshot_metadata_path())?;

        let response = self.transport.get_streaming(&url)?;
        if response.status != StatusCode::OK {
            trace!("no snapshot metadata at {}: {}", url, response.status);
            return Ok(None);
        }

        let info = parse_snapshot_info(&self.parser_config, response.body)
            .with_context(|| format!("failed to parse {}", url))?;

        let timestamp = info.timestamp
            .ok_or_else(|| ResolveError::IncompleteSnapshotMetadata { url: url.to_string(), element: "timestamp" })?;
        let build_number = info.build_number
            .ok_or_else(|| ResolveError::IncompleteSnapshotMetadata { url: url.to_string(), element: "buildNumber" })?;

        Ok(Some(format!(
            "{}-{}-{}",
            artifact_ref.coordinates().version().without_snapshot_suffix(),
            timestamp,
            build_number,
        )))
    }
}
