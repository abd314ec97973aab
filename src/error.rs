//! Error family for all QSimBench operations
//!
//! Every public operation fails with one [`Error`]. Callers that only care
//! about the broad family can match on [`Error::kind`].

use thiserror::Error;

/// Broad error family, independent of the payload carried by each variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Connectivity,
    RemoteFetch,
    Catalog,
    EmptyDataset,
    Io,
    Parse,
}

/// QSimBench error
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing parameters (non-positive size/shots, unknown
    /// strategy or circuit kind, empty or unknown version set)
    #[error("invalid argument: {0}")]
    Validation(String),

    /// Transport-level failure reaching the remote host
    #[error("couldn't connect to the dataset: {0}")]
    Connectivity(String),

    /// Non-2xx response other than a tolerated 404
    #[error("HTTP {status} fetching {url}")]
    RemoteFetch { url: String, status: u16 },

    /// Remote catalog could not be resolved or has no matching entry
    #[error("catalog lookup failed: {0}")]
    Catalog(String),

    /// No usable records (or no counts) to sample from
    #[error("no data to sample: {0}")]
    EmptyDataset(String),

    /// Local cache read/write failure
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON from the remote or from the cache
    #[error("malformed JSON in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::RemoteFetch { .. } => ErrorKind::RemoteFetch,
            Self::Catalog(_) => ErrorKind::Catalog,
            Self::EmptyDataset(_) => ErrorKind::EmptyDataset,
            Self::Io { .. } => ErrorKind::Io,
            Self::Parse { .. } => ErrorKind::Parse,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            origin: origin.into(),
            source,
        }
    }
}
