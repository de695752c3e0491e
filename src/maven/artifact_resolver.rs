use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hyper::{StatusCode, Uri};
use tracing::{debug, trace, warn};

use crate::maven::checksum::ChecksumAlgorithm;
use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::repository::MavenRepository;
use crate::maven::resolve_result::{ResolveError, ResolveResult};
use crate::maven::snapshot_resolver::{SnapshotCache, SnapshotResolver};
use crate::util::expiring_cache::ExpiringCache;
use crate::util::http_client::{HttpTransport, HyperHttpClient};

pub const DEFAULT_SNAPSHOT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Finds the URL of an artifact by trying a list of repositories one after the other.
///
/// The repository that provided an artifact is remembered for its fuzzy id and tried first for
///  subsequent lookups, since the other files of an artifact (classifier variants, checksums) are
///  virtually always hosted in the same place.
///
/// All calls block, and repositories are queried strictly in sequence.
pub struct ArtifactResolver {
    transport: Arc<dyn HttpTransport>,
    repositories: Vec<MavenRepository>,
    /// fuzzy id -> index into `repositories`
    repository_affinity: HashMap<String, usize>,
    snapshot_resolver: SnapshotResolver,
    check_url_validity: bool,
}

impl ArtifactResolver {
    pub fn new(transport: Arc<dyn HttpTransport>) -> ArtifactResolver {
        ArtifactResolver::with_snapshot_cache_ttl(transport, DEFAULT_SNAPSHOT_CACHE_TTL)
    }

    pub fn with_snapshot_cache_ttl(transport: Arc<dyn HttpTransport>, snapshot_cache_ttl: Duration) -> ArtifactResolver {
        let cache = ExpiringCache::<String, String>::new(snapshot_cache_ttl);
        ArtifactResolver::with_snapshot_cache(transport, Box::new(cache))
    }

    /// Resolved snapshot versions go to `snapshot_cache` instead of the default in-memory cache.
    pub fn with_snapshot_cache(transport: Arc<dyn HttpTransport>, snapshot_cache: Box<dyn SnapshotCache>) -> ArtifactResolver {
        ArtifactResolver {
            snapshot_resolver: SnapshotResolver::with_cache(transport.clone(), snapshot_cache),
            transport,
            repositories: Vec::new(),
            repository_affinity: HashMap::new(),
            check_url_validity: true,
        }
    }

    /// A resolver that talks to the repositories through a [HyperHttpClient]
    pub fn with_default_client() -> anyhow::Result<ArtifactResolver> {
        Ok(ArtifactResolver::new(Arc::new(HyperHttpClient::new()?)))
    }

    /// Repositories are searched in the order they were added
    pub fn add_repository(&mut self, repository: MavenRepository) {
        debug!("adding repository {} at {}", repository.name(), repository.base_uri());
        self.repositories.push(repository);
    }

    pub fn repositories(&self) -> &[MavenRepository] {
        &self.repositories
    }

    /// Turning off the check means that the URL built for the first repository is returned without
    ///  verifying that the repository actually has the file - only sensible with a single repository.
    pub fn set_check_url_validity(&mut self, check_url_validity: bool) {
        self.check_url_validity = check_url_validity;
    }

    /// no effect on a cache passed to [ArtifactResolver::with_snapshot_cache] that has no notion of expiry
    pub fn set_snapshot_cache_ttl(&mut self, ttl: Duration) {
        self.snapshot_resolver.set_cache_ttl(ttl);
    }

    pub fn resolve(&mut self, artifact_ref: &MavenArtifactRef) -> ResolveResult<Uri> {
        if self.repositories.is_empty() {
            return ResolveResult::NotFound;
        }

        if !self.check_url_validity && self.repositories.len() > 1 {
            warn!("URL validity check is disabled: {} resolves to the first of {} repositories without checking that it has the file",
                artifact_ref, self.repositories.len());
        }

        let fuzzy_id = artifact_ref.fuzzy_id();
        let preferred = self.repository_affinity.get(&fuzzy_id).copied();

        let search_order: Vec<usize> = preferred.into_iter()
            .chain((0..self.repositories.len()).filter(|&index| Some(index) != preferred))
            .collect();

        let mut failures = Vec::new();
        for index in search_order {
            match self.resolve_in(index, artifact_ref) {
                ResolveResult::Success(url) => {
                    debug!("resolved {} in {}: {}", artifact_ref, self.repositories[index].name(), url);
                    self.repository_affinity.insert(fuzzy_id, index);
                    return ResolveResult::Success(url);
                }
                ResolveResult::NotFound => {}
                ResolveResult::Error(e) => {
                    let repository = &self.repositories[index];
                    warn!("failed to query {} for {}: {:#}", repository.name(), artifact_ref, e);
                    failures.push(e.context(format!("repository {} ({})", repository.name(), repository.base_uri())));
                }
            }
        }

        if failures.is_empty() {
            debug!("{} not found in any repository", artifact_ref);
            ResolveResult::NotFound
        }
        else {
            ResolveResult::Error(ResolveError::AllRepositoriesFailed {
                artifact: artifact_ref.to_string(),
                causes: failures,
            }.into())
        }
    }

    /// Resolves the checksum file published next to an artifact and returns the digest it
    ///  contains (lower-case hex)
    pub fn get_checksum(&mut self, artifact_ref: &MavenArtifactRef, algorithm: ChecksumAlgorithm) -> ResolveResult<String> {
        let url = match self.resolve(&artifact_ref.checksum_artifact(algorithm)) {
            ResolveResult::Success(url) => url,
            ResolveResult::NotFound => return ResolveResult::NotFound,
            ResolveResult::Error(e) => return ResolveResult::Error(e),
        };

        self.fetch_checksum(&url, algorithm).into()
    }

    fn resolve_in(&mut self, index: usize, artifact_ref: &MavenArtifactRef) -> ResolveResult<Uri> {
        let repository = &self.repositories[index];
        trace!("looking for {} in {}", artifact_ref, repository.name());

        let path = if artifact_ref.is_snapshot() {
            match self.snapshot_resolver.resolve(repository, artifact_ref) {
                ResolveResult::Success(version) => artifact_ref.path_for_version(&version),
                ResolveResult::NotFound => return ResolveResult::NotFound,
                ResolveResult::Error(e) => return ResolveResult::Error(e),
            }
        }
        else {
            artifact_ref.path()
        };

        let url = match repository.resolve_url(&path) {
            Ok(url) => url,
            Err(e) => return ResolveResult::Error(e),
        };

        if !self.check_url_validity {
            return ResolveResult::Success(url);
        }

        //TODO a 200 can also be a generic error page - check content type / length as well?
        match self.transport.head(&url) {
            Ok(StatusCode::OK) => ResolveResult::Success(url),
            Ok(status) => {
                trace!("HEAD {}: {}", url, status);
                ResolveResult::NotFound
            }
            Err(e) => ResolveResult::Error(e),
        }
    }

    fn fetch_checksum(&self, url: &Uri, algorithm: ChecksumAlgorithm) -> anyhow::Result<Option<String>> {
        let response = self.transport.get(url)?;
        if response.status != StatusCode::OK {
            trace!("GET {}: {}", url, response.status);
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&response.body);

        // some repositories append the file name after the digest
        let digest = text.lines()
            .next()
            .and_then(|line| line.split_whitespace().next())
            .ok_or_else(|| ResolveError::EmptyChecksum { url: url.to_string() })?;

        if !algorithm.is_valid_digest(digest) {
            return Err(ResolveError::InvalidChecksum {
                url: url.to_string(),
                algorithm,
                content: digest.to_string(),
            }.into());
        }

        Ok(Some(digest.to_ascii_lowercase()))
    }
}
