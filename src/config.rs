//! Declarative setup of a resolver: which repositories to search and which artifacts to resolve.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::maven::artifact_resolver::DEFAULT_SNAPSHOT_CACHE_TTL;
use crate::maven::{ArtifactResolver, ChecksumAlgorithm, MavenArtifactRef, MavenRepository};
use crate::maven::coordinates::DEFAULT_EXTENSION;
use crate::util::http_client::{HttpTransport, HyperHttpClient};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl DependencyConfig {
    pub fn to_artifact_ref(&self) -> anyhow::Result<MavenArtifactRef> {
        let artifact_ref = MavenArtifactRef::new(&self.group_id, &self.artifact_id, &self.version)?
            .with_classifier(self.classifier.as_deref().unwrap_or(""))
            .with_extension(&self.extension)?;
        Ok(artifact_ref)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// searched in this order, before the well-known repositories
    pub repositories: Vec<RepositoryConfig>,
    pub use_maven_central: bool,
    pub use_sonatype: bool,
    pub dependencies: Vec<DependencyConfig>,
    pub check_url_validity: bool,
    pub snapshot_cache_ttl_secs: u64,
    pub checksum_algorithm: ChecksumAlgorithm,
    /// if set, a dependency without a checksum file is still reported as resolved
    pub ignore_missing_checksum: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> ResolverConfig {
        ResolverConfig {
            repositories: Vec::new(),
            use_maven_central: true,
            use_sonatype: false,
            dependencies: Vec::new(),
            check_url_validity: true,
            snapshot_cache_ttl_secs: DEFAULT_SNAPSHOT_CACHE_TTL.as_secs(),
            checksum_algorithm: ChecksumAlgorithm::Sha1,
            ignore_missing_checksum: false,
            request_timeout_secs: None,
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl ResolverConfig {
    pub fn load(path: &Path) -> anyhow::Result<ResolverConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        ResolverConfig::parse(&raw)
            .with_context(|| format!("invalid resolver configuration in {}", path.display()))
    }

    pub fn parse(json: &str) -> anyhow::Result<ResolverConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// declared repositories first, then Maven Central and Sonatype if enabled
    pub fn repositories(&self) -> anyhow::Result<Vec<MavenRepository>> {
        let mut repositories = Vec::new();
        for repository in &self.repositories {
            repositories.push(MavenRepository::new(&repository.name, &repository.url)
                .with_context(|| format!("invalid repository {:?}", repository.name))?);
        }
        if self.use_maven_central {
            repositories.push(MavenRepository::maven_central());
        }
        if self.use_sonatype {
            repositories.push(MavenRepository::sonatype());
        }
        Ok(repositories)
    }

    pub fn artifacts(&self) -> anyhow::Result<Vec<MavenArtifactRef>> {
        self.dependencies.iter()
            .map(|d| d.to_artifact_ref()
                .with_context(|| format!("invalid dependency {}:{}:{}", d.group_id, d.artifact_id, d.version)))
            .collect()
    }

    pub fn build_transport(&self) -> anyhow::Result<HyperHttpClient> {
        let client = HyperHttpClient::new()?;
        Ok(match self.request_timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        })
    }

    pub fn build_resolver(&self) -> anyhow::Result<ArtifactResolver> {
        self.build_resolver_with(Arc::new(self.build_transport()?))
    }

    pub fn build_resolver_with(&self, transport: Arc<dyn HttpTransport>) -> anyhow::Result<ArtifactResolver> {
        let mut resolver = ArtifactResolver::with_snapshot_cache_ttl(
            transport,
            Duration::from_secs(self.snapshot_cache_ttl_secs),
        );
        resolver.set_check_url_validity(self.check_url_validity);

        for repository in self.repositories()? {
            resolver.add_repository(repository);
        }
        Ok(resolver)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::maven::MavenClassifier;
    use crate::util::http_client::test_support::ScriptedTransport;
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::parse("{}").unwrap();

        assert_eq!(config, ResolverConfig::default());
        assert!(config.use_maven_central);
        assert!(config.check_url_validity);
        assert_eq!(config.snapshot_cache_ttl_secs, 86400);
        assert_eq!(config.checksum_algorithm, ChecksumAlgorithm::Sha1);
        assert_eq!(config.repositories().unwrap(), vec![MavenRepository::maven_central()]);
    }

    #[test]
    fn test_full_config() {
        let config = ResolverConfig::parse(r#"{
            "repositories": [
                { "name": "internal", "url": "https://nexus.example.com/repository/public" }
            ],
            "use_maven_central": false,
            "use_sonatype": true,
            "dependencies": [
                { "group_id": "org.ex", "artifact_id": "lib", "version": "1.0.0" },
                { "group_id": "org.ex", "artifact_id": "lib", "version": "1.0.0", "classifier": "sources" },
                { "group_id": "org.ex", "artifact_id": "lib", "version": "1.0.0", "classifier": "", "extension": "pom" }
            ],
            "check_url_validity": false,
            "snapshot_cache_ttl_secs": 60,
            "checksum_algorithm": "sha256",
            "ignore_missing_checksum": true,
            "request_timeout_secs": 30
        }"#).unwrap();

        let repositories = config.repositories().unwrap();
        assert_eq!(repositories.len(), 2);
        assert_eq!(repositories[0].base_uri(), "https://nexus.example.com/repository/public/");
        assert_eq!(repositories[1], MavenRepository::sonatype());

        let artifacts = config.artifacts().unwrap();
        assert_eq!(artifacts[0].path(), "org/ex/lib/1.0.0/lib-1.0.0.jar");
        assert_eq!(artifacts[1].classifier(), &MavenClassifier::Classified("sources".to_string()));
        assert_eq!(artifacts[2].classifier(), &MavenClassifier::Unclassified);
        assert_eq!(artifacts[2].extension(), "pom");

        assert_eq!(config.checksum_algorithm, ChecksumAlgorithm::Sha256);
        assert!(config.ignore_missing_checksum);
        assert_eq!(config.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_invalid_repository_url() {
        let config = ResolverConfig::parse(r#"{ "repositories": [ { "name": "local", "url": "file:///tmp/repo" } ] }"#).unwrap();

        assert!(config.repositories().is_err());
        assert!(config.build_resolver_with(Arc::new(ScriptedTransport::new())).is_err());
    }

    #[test]
    fn test_invalid_dependency() {
        let config = ResolverConfig::parse(r#"{ "dependencies": [ { "group_id": "org.ex", "artifact_id": "", "version": "1" } ] }"#).unwrap();

        assert!(config.artifacts().is_err());
    }

    #[test]
    fn test_unknown_checksum_algorithm() {
        assert!(ResolverConfig::parse(r#"{ "checksum_algorithm": "crc32" }"#).is_err());
    }

    #[test]
    fn test_build_resolver() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = ResolverConfig::parse(r#"{
            "repositories": [ { "name": "internal", "url": "https://nexus.example.com/repository/public/" } ],
            "check_url_validity": false
        }"#).unwrap();

        let mut resolver = config.build_resolver_with(transport.clone()).unwrap();
        assert_eq!(resolver.repositories().len(), 2);

        let url = resolver.resolve(&"org.ex:lib:1.0.0".parse().unwrap());
        assert_eq!(
            url.value().unwrap().to_string(),
            "https://nexus.example.com/repository/public/org/ex/lib/1.0.0/lib-1.0.0.jar");
        assert!(transport.requests().is_empty());
    }
}
