pub mod artifact_resolver;
pub mod checksum;
pub mod coordinates;
pub mod metadata_xml;
pub mod paths;
pub mod repository;
pub mod resolve_result;
pub mod snapshot_resolver;

pub use artifact_resolver::ArtifactResolver;
pub use checksum::ChecksumAlgorithm;
pub use coordinates::{MavenArtifactId, MavenArtifactRef, MavenClassifier, MavenCoordinates, MavenGroupId, MavenVersion};
pub use repository::MavenRepository;
pub use resolve_result::{ResolveError, ResolveResult};
pub use snapshot_resolver::SnapshotResolver;
