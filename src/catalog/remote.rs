//! Version list and per-version trees
//!
//! Both the version list and the repository's `dataset` tree are fetched on
//! first use and kept until [`RemoteCatalog::refresh`]. Per-version trees are
//! fetched on every call; the service memoizes what it derives from them.

use super::{TreeEntry, TreeListing};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::Transport;
use crate::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Name of the repository directory holding every version
const DATASET_DIR: &str = "dataset";

pub struct RemoteCatalog {
    transport: Arc<dyn Transport>,
    raw_base: String,
    tree_api: String,
    versions: Mutex<Option<Vec<String>>>,
    dataset_tree: Mutex<Option<Vec<TreeEntry>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl RemoteCatalog {
    /// Derive the endpoints from `config`; nothing is fetched yet
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            transport,
            raw_base: config.raw_base_url()?,
            tree_api: config.tree_api_url()?,
            versions: Mutex::new(None),
            dataset_tree: Mutex::new(None),
        })
    }

    /// Base URL under which `<version>/...` files are served
    pub fn raw_base(&self) -> &str {
        &self.raw_base
    }

    pub fn versions_url(&self) -> String {
        format!("{}/versions.json", self.raw_base)
    }

    /// Published versions, oldest first
    ///
    /// # Errors
    ///
    /// [`Error::Catalog`] when the published list is empty.
    pub fn versions(&self) -> Result<Vec<String>> {
        if let Some(versions) = lock(&self.versions).as_ref() {
            return Ok(versions.clone());
        }

        let url = self.versions_url();
        let versions: Vec<String> = self.transport.get(&url)?.require_success(&url)?.json(&url)?;
        if versions.is_empty() {
            return Err(Error::Catalog("no versions available".to_string()));
        }
        info!(
            count = versions.len(),
            latest = %versions[versions.len() - 1],
            "loaded dataset versions"
        );

        *lock(&self.versions) = Some(versions.clone());
        Ok(versions)
    }

    /// The last published version
    pub fn latest(&self) -> Result<String> {
        self.versions()?
            .pop()
            .ok_or_else(|| Error::Catalog("no versions available".to_string()))
    }

    /// Fail with [`Error::Validation`] unless `version` is published
    pub fn ensure_version(&self, version: &str) -> Result<()> {
        if self.versions()?.iter().any(|v| v == version) {
            Ok(())
        } else {
            Err(Error::Validation(format!("version {version} doesn't exist")))
        }
    }

    /// Children of the repository's `dataset` directory (one per version)
    pub fn dataset_tree(&self) -> Result<Vec<TreeEntry>> {
        if let Some(tree) = lock(&self.dataset_tree).as_ref() {
            return Ok(tree.clone());
        }

        let root = self.get_tree(&self.tree_api)?;
        let dataset_url = root
            .iter()
            .find(|e| e.path == DATASET_DIR)
            .and_then(|e| e.url.clone())
            .ok_or_else(|| {
                Error::Catalog(format!("repository tree has no '{DATASET_DIR}' directory"))
            })?;
        let tree = self.get_tree(&dataset_url)?;
        debug!(entries = tree.len(), "loaded dataset tree");

        *lock(&self.dataset_tree) = Some(tree.clone());
        Ok(tree)
    }

    /// File listing of one version directory
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for an unpublished version, [`Error::Catalog`]
    /// when the version has no directory in the tree.
    pub fn version_tree(&self, version: &str) -> Result<Vec<TreeEntry>> {
        self.ensure_version(version)?;
        let url = self
            .dataset_tree()?
            .into_iter()
            .find(|e| e.path == version)
            .and_then(|e| e.url)
            .ok_or_else(|| {
                Error::Catalog(format!("version {version} has no directory in the dataset tree"))
            })?;
        self.get_tree(&url)
    }

    /// Drop the cached version list and dataset tree
    pub fn refresh(&self) {
        *lock(&self.versions) = None;
        *lock(&self.dataset_tree) = None;
        debug!("catalog lists dropped");
    }

    fn get_tree(&self, url: &str) -> Result<Vec<TreeEntry>> {
        let listing: TreeListing = self.transport.get(url)?.require_success(url)?.json(url)?;
        Ok(listing.tree)
    }
}
