//! Resolves Maven coordinates into verified download URLs by searching an ordered list of
//!  remote repositories, translating `-SNAPSHOT` versions through the repositories' metadata.

pub mod config;
pub mod maven;
pub mod util;
