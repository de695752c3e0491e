use crate::maven::coordinates::*;

pub const METADATA_FILE_NAME: &str = "maven-metadata.xml";

/// Paths relative to a repository's base URL. The directory always uses the nominal version, even
///  for snapshots - only the file name contains a resolved snapshot version.
impl MavenArtifactRef {
    /// e.g. "org/example/lib/1.0.0/", including the trailing '/'
    pub fn base_path(&self) -> String {
        format!(
            "{}/{}/{}/",
            self.coordinates().group_id().0.replace('.', "/"),
            self.coordinates().artifact_id().0,
            self.coordinates().version().0,
        )
    }

    pub fn file_name(&self) -> String {
        self.file_name_for_version(&self.coordinates().version().0)
    }

    /// <artifactId>-<version>[-<classifier>].<extension>
    pub fn file_name_for_version(&self, version: &str) -> String {
        let classifier_string = match self.classifier() {
            MavenClassifier::Unclassified => "".to_string(),
            MavenClassifier::Classified(c) => format!("-{}", c),
        };

        format!("{}-{}{}.{}",
                self.coordinates().artifact_id().0,
                version,
                classifier_string,
                self.extension(),
        )
    }

    pub fn path(&self) -> String {
        format!("{}{}", self.base_path(), self.file_name())
    }

    /// `resolved_version` is a snapshot's timestamped version like "1.0-20240101.120000-3"
    pub fn path_for_version(&self, resolved_version: &str) -> String {
        format!("{}{}", self.base_path(), self.file_name_for_version(resolved_version))
    }

    pub fn snapshot_metadata_path(&self) -> String {
        format!("{}{}", self.base_path(), METADATA_FILE_NAME)
    }
}
