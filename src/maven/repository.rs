use hyper::http::uri::InvalidUri;
use hyper::Uri;
use thiserror::Error;

pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";
pub const SONATYPE_URL: &str = "https://oss.sonatype.org/content/groups/public/";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("invalid repository URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: InvalidUri,
    },
    #[error("repository URL {0:?} must use http or https")]
    UnsupportedScheme(String),
}

/// A remote Maven repository, identified by its base URL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MavenRepository {
    name: String,
    base_uri: String, // with trailing '/'
}

impl MavenRepository {
    pub fn new(name: impl Into<String>, base_uri: impl Into<String>) -> Result<MavenRepository, RepositoryError> {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        let parsed = Uri::try_from(base_uri.as_str())
            .map_err(|source| RepositoryError::InvalidUrl { url: base_uri.clone(), source })?;

        match parsed.scheme_str() {
            Some("http") | Some("https") if parsed.host().is_some() => {}
            _ => return Err(RepositoryError::UnsupportedScheme(base_uri)),
        }

        Ok(MavenRepository {
            name: name.into(),
            base_uri,
        })
    }

    pub fn maven_central() -> MavenRepository {
        MavenRepository {
            name: "central".to_string(),
            base_uri: MAVEN_CENTRAL_URL.to_string(),
        }
    }

    pub fn sonatype() -> MavenRepository {
        MavenRepository {
            name: "sonatype".to_string(),
            base_uri: SONATYPE_URL.to_string(),
        }
    }

    /// for diagnostics only
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `path` is relative to the repository root, i.e. without a leading '/'
    pub fn resolve_url(&self, path: &str) -> anyhow::Result<Uri> {
        let url = format!("{}{}", self.base_uri, path);
        Ok(Uri::try_from(url)?)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::trailing_slash("https://repo.example.com/maven2/", "https://repo.example.com/maven2/")]
    #[case::no_trailing_slash("https://repo.example.com/maven2", "https://repo.example.com/maven2/")]
    #[case::http("http://localhost:8081/repository/public", "http://localhost:8081/repository/public/")]
    #[case::root("https://repo.example.com", "https://repo.example.com/")]
    fn test_base_uri_is_normalized(#[case] url: &str, #[case] expected: &str) {
        let repo = MavenRepository::new("test", url).unwrap();
        assert_eq!(repo.base_uri(), expected);
        assert_eq!(repo.name(), "test");
    }

    #[rstest]
    #[case::ftp("ftp://repo.example.com/maven2/")]
    #[case::file("file:///home/user/.m2/repository/")]
    #[case::relative("repo/maven2")]
    #[case::garbage("http://exa mple.com/")]
    #[case::empty("")]
    fn test_invalid_url_is_rejected(#[case] url: &str) {
        assert!(MavenRepository::new("test", url).is_err());
    }

    #[test]
    fn test_resolve_url() {
        let repo = MavenRepository::new("test", "https://repo.example.com/maven2").unwrap();
        let url = repo.resolve_url("org/ex/lib/1.0/lib-1.0.jar").unwrap();
        assert_eq!(url.to_string(), "https://repo.example.com/maven2/org/ex/lib/1.0/lib-1.0.jar");
    }

    #[test]
    fn test_well_known_repositories_are_valid() {
        for repo in [MavenRepository::maven_central(), MavenRepository::sonatype()] {
            assert_eq!(MavenRepository::new(repo.name(), repo.base_uri()).unwrap(), repo);
        }
    }
}
