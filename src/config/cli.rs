//! CLI argument parsing using clap

use crate::model::{CircuitKind, Strategy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QSimBench - replay and resample published quantum-circuit shot histories
#[derive(Parser, Debug)]
#[command(name = "qsimbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (overridden by environment and flags)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset repository URL (e.g. https://github.com/<owner>/<repo>)
    #[arg(long, global = true, env = "QSIMBENCH_DATASET")]
    pub dataset: Option<String>,

    /// Access token attached as a bearer token to every request
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Local cache directory
    #[arg(long, global = true, env = "QSIMBENCH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Cache TTL in seconds
    #[arg(long, global = true, env = "QSIMBENCH_CACHE_TIMEOUT")]
    pub cache_timeout: Option<u64>,

    /// Per-request HTTP timeout in milliseconds
    #[arg(long, global = true)]
    pub http_timeout_ms: Option<u64>,

    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample an outcome histogram for one combination
    Outcomes {
        /// Algorithm name (e.g. qft)
        algorithm: String,

        /// Problem size (> 0)
        size: u32,

        /// Backend name (e.g. aer_simulator)
        backend: String,

        /// Number of shots to reconstruct
        #[arg(short = 's', long, default_value = "1024")]
        shots: u64,

        /// Circuit variant: circuit or mirror
        #[arg(short = 'k', long, default_value = "circuit")]
        circuit_kind: CircuitKind,

        /// Aggregation strategy: sequential or random
        #[arg(long, default_value = "sequential")]
        strategy: Strategy,

        /// Dataset version to read (repeatable; defaults to the latest)
        #[arg(long = "dataset-version")]
        versions: Vec<String>,

        /// Master seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the aggregate as-is instead of trimming it to exactly --shots
        #[arg(long)]
        no_exact: bool,

        /// Ignore cached records and fetch again
        #[arg(long)]
        force: bool,
    },

    /// List available algorithms, sizes and backends
    Index {
        #[arg(short = 'k', long, default_value = "circuit")]
        circuit_kind: CircuitKind,

        /// Group as backend -> algorithm -> sizes
        #[arg(long)]
        by_backend: bool,

        /// Dataset version (defaults to the latest)
        #[arg(long = "dataset-version")]
        version: Option<String>,
    },

    /// Fetch the metadata documents of one combination
    Metadata {
        algorithm: String,
        size: u32,
        backend: String,

        #[arg(long = "dataset-version")]
        version: Option<String>,
    },

    /// Fetch a version's metadata.json
    VersionMetadata {
        #[arg(long = "dataset-version")]
        version: Option<String>,
    },

    /// List published dataset versions, oldest first
    Versions,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Command::Outcomes { size, shots, .. } = &self.command {
            if *size == 0 {
                anyhow::bail!("size must be at least 1");
            }
            if *shots == 0 {
                anyhow::bail!("shots must be at least 1");
            }
        }

        if self.http_timeout_ms == Some(0) {
            anyhow::bail!("http_timeout_ms must be positive");
        }

        Ok(())
    }
}
