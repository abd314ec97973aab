//! QSimBench CLI entry point

use anyhow::{Context, Result};
use qsimbench::config::cli::{Cli, Command};
use qsimbench::config::toml::load_config;
use qsimbench::{OutcomesRequest, OutcomesService};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;
    init_logging(cli.debug);

    let config = load_config(&cli)?;
    let service = OutcomesService::new(config).context("Failed to initialize QSimBench client")?;

    match &cli.command {
        Command::Outcomes {
            algorithm,
            size,
            backend,
            shots,
            circuit_kind,
            strategy,
            versions,
            seed,
            no_exact,
            force,
        } => {
            let mut request = OutcomesRequest::new(algorithm.as_str(), *size, backend.as_str())
                .with_shots(*shots)
                .with_circuit_kind(*circuit_kind)
                .with_strategy(*strategy)
                .with_exact(!no_exact)
                .with_force_refresh(*force);
            if !versions.is_empty() {
                request = request.with_versions(versions.iter().cloned());
            }
            if let Some(seed) = seed {
                request = request.with_seed(*seed);
            }
            let histogram = service
                .get_outcomes(&request)
                .with_context(|| {
                    format!("Failed to get outcomes for {algorithm}_{size}_{backend}")
                })?;
            print_json(&histogram)
        }
        Command::Index {
            circuit_kind,
            by_backend,
            version,
        } => {
            let index = service
                .get_index(*circuit_kind, *by_backend, version.as_deref())
                .context("Failed to build catalog index")?;
            print_json(&index)
        }
        Command::Metadata {
            algorithm,
            size,
            backend,
            version,
        } => {
            let docs = service
                .get_metadata(algorithm, *size, backend, version.as_deref())
                .with_context(|| {
                    format!("Failed to get metadata for {algorithm}_{size}_{backend}")
                })?;
            print_json(&docs)
        }
        Command::VersionMetadata { version } => {
            let doc = service
                .get_version_metadata(version.as_deref())
                .context("Failed to get version metadata")?;
            print_json(&doc)
        }
        Command::Versions => {
            let versions = service.get_versions().context("Failed to list versions")?;
            print_json(&versions)
        }
    }
}

/// Log to stderr; RUST_LOG wins over --debug
fn init_logging(debug: bool) {
    let default = if debug { "qsimbench=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{out}");
    Ok(())
}
