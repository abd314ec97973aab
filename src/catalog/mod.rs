//! Remote dataset catalog
//!
//! The dataset lives in a Git repository: a `versions.json` document lists
//! the published versions (oldest first) and the repository tree holds one
//! directory per version. [`remote::RemoteCatalog`] resolves both lazily;
//! [`index`] turns a version's file names into algorithm/size/backend
//! inventories.

pub mod index;
pub mod remote;

pub use index::{build_index, parse_entry, CatalogEntry, CatalogIndex};
pub use remote::RemoteCatalog;

use serde::{Deserialize, Serialize};

/// One node of a Git tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// API URL of the node (present for sub-trees)
    #[serde(default)]
    pub url: Option<String>,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }
}

/// Body of a Git tree API response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeListing {
    pub tree: Vec<TreeEntry>,
}
