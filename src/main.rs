use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use maven_resolver::config::{RepositoryConfig, ResolverConfig};
use maven_resolver::maven::{ArtifactResolver, ChecksumAlgorithm, MavenArtifactRef, ResolveResult};

/// Resolves Maven coordinates to the URL of a repository that has them
#[derive(Parser, Debug)]
#[command(name = "maven-resolver", version)]
struct Cli {
    /// JSON file declaring repositories and dependencies
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additional repository as name=url, searched after the configured ones
    #[arg(short, long = "repository", value_parser = parse_repository)]
    repositories: Vec<RepositoryConfig>,

    /// Coordinates as group:artifact:version[:classifier[:extension]]
    artifacts: Vec<MavenArtifactRef>,

    /// Also print the checksum published for each artifact
    #[arg(long)]
    checksum: bool,

    /// Checksum algorithm (md5, sha1, sha256, sha512), overriding the configuration
    #[arg(long)]
    algorithm: Option<ChecksumAlgorithm>,

    /// Return URLs without checking that the repository has the file
    #[arg(long)]
    no_validity_check: bool,

    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_repository(s: &str) -> Result<RepositoryConfig, String> {
    match s.split_once('=') {
        Some((name, url)) if !name.is_empty() => Ok(RepositoryConfig {
            name: name.to_string(),
            url: url.to_string(),
        }),
        _ => Err(format!("expected name=url, was {:?}", s)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "maven_resolver=warn",
        1 => "maven_resolver=info",
        2 => "maven_resolver=debug",
        _ => "maven_resolver=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// returns false if any artifact could not be resolved
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    config.repositories.extend(cli.repositories);
    if cli.no_validity_check {
        config.check_url_validity = false;
    }

    let mut artifacts = config.artifacts()?;
    artifacts.extend(cli.artifacts);
    if artifacts.is_empty() {
        anyhow::bail!("nothing to resolve - pass coordinates or a configuration with dependencies");
    }

    let mut resolver = config.build_resolver()?;
    debug!("searching {} repositories", resolver.repositories().len());

    let algorithm = cli.algorithm.unwrap_or(config.checksum_algorithm);
    let mut all_resolved = true;
    for artifact_ref in &artifacts {
        let resolved = match resolver.resolve(artifact_ref) {
            ResolveResult::Success(url) => {
                println!("{} -> {}", artifact_ref, url);
                if cli.checksum {
                    print_checksum(&mut resolver, artifact_ref, algorithm, config.ignore_missing_checksum)
                }
                else {
                    true
                }
            }
            ResolveResult::NotFound => {
                eprintln!("{}: not found", artifact_ref);
                false
            }
            ResolveResult::Error(e) => {
                eprintln!("{}: {:#}", artifact_ref, e);
                false
            }
        };
        all_resolved &= resolved;
    }
    Ok(all_resolved)
}

fn print_checksum(resolver: &mut ArtifactResolver, artifact_ref: &MavenArtifactRef, algorithm: ChecksumAlgorithm, ignore_missing: bool) -> bool {
    match resolver.get_checksum(artifact_ref, algorithm) {
        ResolveResult::Success(digest) => {
            println!("  {}: {}", algorithm, digest);
            true
        }
        ResolveResult::NotFound if ignore_missing => {
            warn!("no {} checksum published for {}", algorithm, artifact_ref);
            true
        }
        ResolveResult::NotFound => {
            eprintln!("{}: no {} checksum published", artifact_ref, algorithm);
            false
        }
        ResolveResult::Error(e) => {
            eprintln!("{}: failed to get {} checksum: {:#}", artifact_ref, algorithm, e);
            false
        }
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;
    use rstest::*;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "maven-resolver",
            "-r", "internal=https://nexus.example.com/repository/public",
            "--checksum", "--algorithm", "sha256",
            "-vv",
            "org.ex:lib:1.0.0", "org.ex:lib:1.0.0:sources",
        ]).unwrap();

        assert_eq!(cli.repositories[0].name, "internal");
        assert_eq!(cli.artifacts.len(), 2);
        assert_eq!(cli.algorithm, Some(ChecksumAlgorithm::Sha256));
        assert!(cli.checksum);
        assert_eq!(cli.verbose, 2);
    }

    #[rstest]
    #[case::no_separator("https://repo.example.com")]
    #[case::no_name("=https://repo.example.com")]
    fn test_invalid_repository_arg(#[case] arg: &str) {
        assert!(parse_repository(arg).is_err());
    }

    #[test]
    fn test_invalid_coordinate_arg() {
        assert!(Cli::try_parse_from(["maven-resolver", "org.ex:lib"]).is_err());
    }
}
