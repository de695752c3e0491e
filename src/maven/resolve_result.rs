use thiserror::Error;

use crate::maven::checksum::ChecksumAlgorithm;

/// Outcome of a lookup against remote repositories.
///
/// `NotFound` is a regular outcome - the repositories were queried successfully, but none of them
///  has the file. `Error` means something went wrong along the way (unreachable host, malformed
///  response) and always carries the cause.
#[derive(Debug)]
pub enum ResolveResult<T> {
    Success(T),
    NotFound,
    Error(anyhow::Error),
}

impl <T> ResolveResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolveResult::Success(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveResult::NotFound)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResolveResult::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ResolveResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            ResolveResult::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolveResult<U> {
        match self {
            ResolveResult::Success(value) => ResolveResult::Success(f(value)),
            ResolveResult::NotFound => ResolveResult::NotFound,
            ResolveResult::Error(e) => ResolveResult::Error(e),
        }
    }

    /// for code that propagates errors with `?` and treats absence as `None`
    pub fn into_result(self) -> anyhow::Result<Option<T>> {
        match self {
            ResolveResult::Success(value) => Ok(Some(value)),
            ResolveResult::NotFound => Ok(None),
            ResolveResult::Error(e) => Err(e),
        }
    }
}

impl <T> From<anyhow::Result<Option<T>>> for ResolveResult<T> {
    fn from(result: anyhow::Result<Option<T>>) -> ResolveResult<T> {
        match result {
            Ok(Some(value)) => ResolveResult::Success(value),
            Ok(None) => ResolveResult::NotFound,
            Err(e) => ResolveResult::Error(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    /// No repository has the artifact, and at least one of them could not be queried. Contains
    ///  every failure in the order the repositories were tried.
    #[error("failed to resolve {artifact}: {} repositories failed ({})", .causes.len(), format_causes(.causes))]
    AllRepositoriesFailed {
        artifact: String,
        causes: Vec<anyhow::Error>,
    },
    #[error("snapshot metadata {url} has no <{element}>")]
    IncompleteSnapshotMetadata {
        url: String,
        element: &'static str,
    },
    #[error("checksum file {url} is empty")]
    EmptyChecksum {
        url: String,
    },
    #[error("checksum file {url} does not contain a {algorithm} digest: {content:?}")]
    InvalidChecksum {
        url: String,
        algorithm: ChecksumAlgorithm,
        content: String,
    },
}

impl ResolveError {
    pub fn causes(&self) -> &[anyhow::Error] {
        match self {
            ResolveError::AllRepositoriesFailed { causes, .. } => causes,
            _ => &[],
        }
    }
}

fn format_causes(causes: &[anyhow::Error]) -> String {
    causes.iter()
        .map(|e| format!("{:#}", e))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod test {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_into_result() {
        assert_eq!(ResolveResult::Success(1).into_result().unwrap(), Some(1));
        assert_eq!(ResolveResult::<u32>::NotFound.into_result().unwrap(), None);
        assert!(ResolveResult::<u32>::Error(anyhow!("boom")).into_result().is_err());
    }

    #[test]
    fn test_map_keeps_tag() {
        assert_eq!(ResolveResult::Success(2).map(|v| v * 2).value(), Some(&4));
        assert!(ResolveResult::<u32>::NotFound.map(|v| v * 2).is_not_found());

        let mapped = ResolveResult::<u32>::Error(anyhow!("boom")).map(|v| v * 2);
        assert_eq!(mapped.error().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_aggregated_message_lists_every_cause() {
        let error = ResolveError::AllRepositoriesFailed {
            artifact: "g:a:1".to_string(),
            causes: vec![anyhow!("connection refused"), anyhow!("timed out")],
        };

        assert_eq!(error.causes().len(), 2);
        assert_eq!(error.to_string(), "failed to resolve g:a:1: 2 repositories failed (connection refused; timed out)");
    }
}
