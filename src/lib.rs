//! QSimBench - replay and resample published quantum-circuit shot histories
//!
//! QSimBench exposes precomputed execution histories (per-run histograms of
//! measurement outcomes) published as versioned files in a remote content
//! repository, and reconstructs reproducible outcome distributions for an
//! (algorithm, size, backend, circuit kind) combination at any shot count.
//!
//! # Architecture
//!
//! - **Remote catalog**: version list and per-version file trees
//! - **Record cache**: TTL-governed disk cache of newline-delimited run records
//! - **Sampling**: sequential (cursor-based) and random record aggregation,
//!   plus exact multinomial down-sampling
//! - **Catalog index**: algorithm/size/backend inventories derived from file names
//! - **Service**: the façade tying it all together behind one explicit object
//!
//! Nothing here simulates circuits; all outcomes are replayed from recorded counts.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod memo;
pub mod model;
pub mod sampling;
pub mod service;
pub mod util;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{Error, ErrorKind};
pub use model::{CircuitKind, OutcomeHistogram, ShotRecord, Strategy};
pub use service::{OutcomesRequest, OutcomesService};

/// Result type used throughout QSimBench
pub type Result<T> = std::result::Result<T, Error>;
