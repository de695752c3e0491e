use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use crate::maven::checksum::ChecksumAlgorithm;

pub const DEFAULT_EXTENSION: &str = "jar";
const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

#[derive(Error, Debug, Eq, PartialEq)]
pub enum CoordinateError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("not a valid Maven coordinate (expected group:artifact:version[:classifier[:extension]]): {0:?}")]
    InvalidFormat(String),
}

/// The nominal version as declared, i.e. a snapshot version still ends in '-SNAPSHOT' (in any case)
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenVersion(pub String);

impl MavenVersion {
    pub fn is_snapshot(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() >= SNAPSHOT_SUFFIX.len()
            && bytes[bytes.len() - SNAPSHOT_SUFFIX.len()..].eq_ignore_ascii_case(SNAPSHOT_SUFFIX.as_bytes())
    }

    /// "1.0-SNAPSHOT" -> "1.0"; versions that are no snapshots are returned unchanged
    pub fn without_snapshot_suffix(&self) -> &str {
        if self.is_snapshot() {
            &self.0[..self.0.len() - SNAPSHOT_SUFFIX.len()]
        }
        else {
            &self.0
        }
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenGroupId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenCoordinates {
    group_id: MavenGroupId,
    artifact_id: MavenArtifactId,
    version: MavenVersion,
}

impl MavenCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Result<MavenCoordinates, CoordinateError> {
        if group_id.is_empty() {
            return Err(CoordinateError::EmptyField("group id"));
        }
        if artifact_id.is_empty() {
            return Err(CoordinateError::EmptyField("artifact id"));
        }
        if version.is_empty() {
            return Err(CoordinateError::EmptyField("version"));
        }

        Ok(MavenCoordinates {
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
            version: MavenVersion(version.to_string()),
        })
    }

    pub fn group_id(&self) -> &MavenGroupId {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &MavenArtifactId {
        &self.artifact_id
    }

    pub fn version(&self) -> &MavenVersion {
        &self.version
    }

    /// Identifies all files published for these coordinates - the main artifact as well as
    ///  classifier variants and checksum files.
    pub fn fuzzy_id(&self) -> String {
        format!("{}/{}/{}", self.group_id.0, self.artifact_id.0, self.version.0)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum MavenClassifier {
    Unclassified,
    Classified(String),
}

impl From<Option<&str>> for MavenClassifier {
    fn from(classifier: Option<&str>) -> MavenClassifier {
        match classifier {
            None | Some("") => MavenClassifier::Unclassified,
            Some(c) => MavenClassifier::Classified(c.to_string()),
        }
    }
}

/// A single file in a Maven repository
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenArtifactRef {
    coordinates: MavenCoordinates,
    classifier: MavenClassifier,
    extension: String, // without leading '.', e.g. "jar"
}

impl MavenArtifactRef {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Result<MavenArtifactRef, CoordinateError> {
        Ok(MavenArtifactRef {
            coordinates: MavenCoordinates::new(group_id, artifact_id, version)?,
            classifier: MavenClassifier::Unclassified,
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    /// An empty classifier is the same as no classifier
    pub fn with_classifier(mut self, classifier: &str) -> MavenArtifactRef {
        self.classifier = Some(classifier).into();
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Result<MavenArtifactRef, CoordinateError> {
        if extension.is_empty() {
            return Err(CoordinateError::EmptyField("extension"));
        }
        self.extension = extension.to_string();
        Ok(self)
    }

    pub fn coordinates(&self) -> &MavenCoordinates {
        &self.coordinates
    }

    pub fn classifier(&self) -> &MavenClassifier {
        &self.classifier
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_snapshot(&self) -> bool {
        self.coordinates.version.is_snapshot()
    }

    pub fn fuzzy_id(&self) -> String {
        self.coordinates.fuzzy_id()
    }

    /// The file holding this artifact's checksum, e.g. "lib-1.0.jar.sha1" for "lib-1.0.jar"
    pub fn checksum_artifact(&self, algorithm: ChecksumAlgorithm) -> MavenArtifactRef {
        MavenArtifactRef {
            coordinates: self.coordinates.clone(),
            classifier: self.classifier.clone(),
            extension: format!("{}.{}", self.extension, algorithm.type_suffix()),
        }
    }
}

impl FromStr for MavenArtifactRef {
    type Err = CoordinateError;

    /// group:artifact:version[:classifier[:extension]]
    fn from_str(s: &str) -> Result<MavenArtifactRef, CoordinateError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 3 || parts.len() > 5 {
            return Err(CoordinateError::InvalidFormat(s.to_string()));
        }

        let mut artifact_ref = MavenArtifactRef::new(parts[0], parts[1], parts[2])?;
        if let Some(classifier) = parts.get(3) {
            artifact_ref = artifact_ref.with_classifier(classifier);
        }
        if let Some(extension) = parts.get(4) {
            artifact_ref = artifact_ref.with_extension(extension)?;
        }
        Ok(artifact_ref)
    }
}

impl Display for MavenArtifactRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.coordinates.group_id.0, self.coordinates.artifact_id.0, self.coordinates.version.0)?;

        let classifier = match &self.classifier {
            MavenClassifier::Unclassified => "",
            MavenClassifier::Classified(c) => c.as_str(),
        };
        if self.extension != DEFAULT_EXTENSION {
            write!(f, ":{}:{}", classifier, self.extension)
        }
        else if !classifier.is_empty() {
            write!(f, ":{}", classifier)
        }
        else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::release("1.0.0", false)]
    #[case::upper("1.0.0-SNAPSHOT", true)]
    #[case::lower("1.0.0-snapshot", true)]
    #[case::mixed("1.0.0-SnapShot", true)]
    #[case::no_dash("1.0.0SNAPSHOT", false)]
    #[case::infix("1.0.0-SNAPSHOT-1", false)]
    #[case::just_suffix("-SNAPSHOT", true)]
    #[case::short("1", false)]
    #[case::multibyte("1.0-ŝnapshot", false)]
    fn test_is_snapshot(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(MavenVersion(version.to_string()).is_snapshot(), expected);
    }

    #[rstest]
    #[case("1.0-SNAPSHOT", "1.0")]
    #[case("1.0-snapshot", "1.0")]
    #[case("1.0", "1.0")]
    fn test_without_snapshot_suffix(#[case] version: &str, #[case] expected: &str) {
        assert_eq!(MavenVersion(version.to_string()).without_snapshot_suffix(), expected);
    }

    #[test]
    fn test_defaults() {
        let artifact_ref = MavenArtifactRef::new("org.ex", "lib", "1.0.0").unwrap();
        assert_eq!(artifact_ref.extension(), "jar");
        assert_eq!(artifact_ref.classifier(), &MavenClassifier::Unclassified);
    }

    #[test]
    fn test_empty_classifier_is_unclassified() {
        let plain = MavenArtifactRef::new("org.ex", "lib", "1.0.0").unwrap();
        let empty = plain.clone().with_classifier("");

        assert_eq!(empty.classifier(), &MavenClassifier::Unclassified);
        assert_eq!(plain, empty);
    }

    #[rstest]
    #[case::group("", "a", "1", "group id")]
    #[case::artifact("g", "", "1", "artifact id")]
    #[case::version("g", "a", "", "version")]
    fn test_empty_fields_are_rejected(#[case] group_id: &str, #[case] artifact_id: &str, #[case] version: &str, #[case] field: &'static str) {
        let error = MavenArtifactRef::new(group_id, artifact_id, version).unwrap_err();
        assert_eq!(error, CoordinateError::EmptyField(field));
    }

    #[test]
    fn test_empty_extension_is_rejected() {
        let artifact_ref = MavenArtifactRef::new("g", "a", "1").unwrap();
        assert!(artifact_ref.with_extension("").is_err());
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let base = MavenArtifactRef::new("g", "a", "1").unwrap();

        assert_eq!(base, MavenArtifactRef::new("g", "a", "1").unwrap());
        assert_ne!(base, base.clone().with_classifier("sources"));
        assert_ne!(base, base.clone().with_extension("pom").unwrap());
        assert_ne!(base, MavenArtifactRef::new("g", "a", "2").unwrap());
    }

    #[test]
    fn test_fuzzy_id_ignores_classifier_and_extension() {
        let base = MavenArtifactRef::new("org.ex", "lib", "1.0.0").unwrap();
        let sources = base.clone().with_classifier("sources");
        let pom = base.clone().with_extension("pom").unwrap();

        assert_eq!(base.fuzzy_id(), "org.ex/lib/1.0.0");
        assert_eq!(sources.fuzzy_id(), base.fuzzy_id());
        assert_eq!(pom.fuzzy_id(), base.fuzzy_id());
        assert_eq!(base.checksum_artifact(ChecksumAlgorithm::Sha1).fuzzy_id(), base.fuzzy_id());
    }

    #[rstest]
    #[case::md5(ChecksumAlgorithm::Md5, "jar.md5")]
    #[case::sha1(ChecksumAlgorithm::Sha1, "jar.sha1")]
    #[case::sha256(ChecksumAlgorithm::Sha256, "jar.sha256")]
    #[case::sha512(ChecksumAlgorithm::Sha512, "jar.sha512")]
    fn test_checksum_artifact(#[case] algorithm: ChecksumAlgorithm, #[case] expected_extension: &str) {
        let artifact_ref = MavenArtifactRef::new("g", "a", "1").unwrap()
            .with_classifier("sources");
        let checksum_ref = artifact_ref.checksum_artifact(algorithm);

        assert_eq!(checksum_ref.extension(), expected_extension);
        assert_eq!(checksum_ref.classifier(), artifact_ref.classifier());
        assert_eq!(checksum_ref.coordinates(), artifact_ref.coordinates());
    }

    #[rstest]
    #[case::plain("g:a:1", MavenClassifier::Unclassified, "jar")]
    #[case::classifier("g:a:1:sources", MavenClassifier::Classified("sources".to_string()), "jar")]
    #[case::extension("g:a:1::pom", MavenClassifier::Unclassified, "pom")]
    #[case::both("g:a:1:tests:zip", MavenClassifier::Classified("tests".to_string()), "zip")]
    fn test_parse(#[case] s: &str, #[case] classifier: MavenClassifier, #[case] extension: &str) {
        let artifact_ref: MavenArtifactRef = s.parse().unwrap();

        assert_eq!(artifact_ref.coordinates(), &MavenCoordinates::new("g", "a", "1").unwrap());
        assert_eq!(artifact_ref.classifier(), &classifier);
        assert_eq!(artifact_ref.extension(), extension);
        assert_eq!(artifact_ref.to_string(), s);
    }

    #[rstest]
    #[case::too_short("g:a")]
    #[case::too_long("g:a:1:c:e:x")]
    #[case::empty_version("g:a:")]
    #[case::empty_extension("g:a:1:c:")]
    fn test_parse_invalid(#[case] s: &str) {
        assert!(s.parse::<MavenArtifactRef>().is_err());
    }
}
