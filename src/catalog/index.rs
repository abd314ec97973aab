//! File-name inventories
//!
//! Every non-reserved file in a version directory is named
//! `<algorithm>_<size>_<backend>.<ext>`. Algorithm and backend names may
//! themselves contain underscores; the size is the first token made only of
//! digits.

use super::TreeEntry;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Entries of a version directory that are not per-combination files
pub const RESERVED_NAMES: [&str; 3] = ["artifacts", "histories", "metadata.json"];

/// One parsed file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub algorithm: String,
    pub size: u32,
    pub backend: String,
}

/// Parse `<algorithm>_<size>_<backend>[.ext]`
///
/// The trailing extension is dropped. Returns `None` for reserved names and
/// for names without a size token or without a backend.
///
/// # Example
///
/// ```
/// use qsimbench::catalog::parse_entry;
///
/// let entry = parse_entry("quantum_volume_4_statevector.json").unwrap();
/// assert_eq!(entry.algorithm, "quantum_volume");
/// assert_eq!(entry.size, 4);
/// assert_eq!(entry.backend, "statevector");
/// ```
pub fn parse_entry(name: &str) -> Option<CatalogEntry> {
    if RESERVED_NAMES.contains(&name) {
        return None;
    }
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);

    let mut tokens = stem.split('_');
    let mut algorithm: Vec<&str> = Vec::new();
    let size = loop {
        let token = tokens.next()?;
        if !algorithm.is_empty() && !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            break token.parse::<u32>().ok()?;
        }
        algorithm.push(token);
    };
    let backend = tokens.collect::<Vec<_>>().join("_");
    if backend.is_empty() {
        return None;
    }

    Some(CatalogEntry {
        algorithm: algorithm.join("_"),
        size,
        backend,
    })
}

/// Inventory of a version, in one of two groupings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogIndex {
    /// algorithm → size → backends
    ByAlgorithm(BTreeMap<String, BTreeMap<u32, Vec<String>>>),
    /// backend → algorithm → sizes
    ByBackend(BTreeMap<String, BTreeMap<String, Vec<u32>>>),
}

impl CatalogIndex {
    pub fn is_empty(&self) -> bool {
        match self {
            CatalogIndex::ByAlgorithm(m) => m.is_empty(),
            CatalogIndex::ByBackend(m) => m.is_empty(),
        }
    }
}

/// Group the parseable entries of a version tree
///
/// Leaf lists keep tree order.
pub fn build_index(entries: &[TreeEntry], group_by_backend: bool) -> CatalogIndex {
    let parsed = entries.iter().filter_map(|entry| {
        let parsed = parse_entry(&entry.path);
        if parsed.is_none() && !RESERVED_NAMES.contains(&entry.path.as_str()) {
            debug!(path = %entry.path, "skipping unparseable catalog entry");
        }
        parsed
    });

    if group_by_backend {
        let mut index: BTreeMap<String, BTreeMap<String, Vec<u32>>> = BTreeMap::new();
        for e in parsed {
            index
                .entry(e.backend)
                .or_default()
                .entry(e.algorithm)
                .or_default()
                .push(e.size);
        }
        CatalogIndex::ByBackend(index)
    } else {
        let mut index: BTreeMap<String, BTreeMap<u32, Vec<String>>> = BTreeMap::new();
        for e in parsed {
            index
                .entry(e.algorithm)
                .or_default()
                .entry(e.size)
                .or_default()
                .push(e.backend);
        }
        CatalogIndex::ByAlgorithm(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: "blob".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_parse_simple_name() {
        let entry = parse_entry("qft_8_aer_simulator.json").unwrap();
        assert_eq!(
            entry,
            CatalogEntry {
                algorithm: "qft".to_string(),
                size: 8,
                backend: "aer_simulator".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_multi_token_algorithm() {
        let entry = parse_entry("quantum_volume_4_statevector.json").unwrap();
        assert_eq!(entry.algorithm, "quantum_volume");
        assert_eq!(entry.size, 4);
        assert_eq!(entry.backend, "statevector");
    }

    #[test]
    fn test_parse_without_extension() {
        let entry = parse_entry("ghz_12_fake_brisbane").unwrap();
        assert_eq!(entry.algorithm, "ghz");
        assert_eq!(entry.size, 12);
        assert_eq!(entry.backend, "fake_brisbane");
    }

    #[test]
    fn test_reserved_and_malformed_names() {
        for name in RESERVED_NAMES {
            assert_eq!(parse_entry(name), None);
        }
        assert_eq!(parse_entry("README.md"), None);
        assert_eq!(parse_entry("qft_8.json"), None);
        assert_eq!(parse_entry("qft_aer.json"), None);
        assert_eq!(parse_entry("12_qft_aer.json"), None);
    }

    #[test]
    fn test_group_by_algorithm() {
        let entries = vec![
            blob("artifacts"),
            blob("histories"),
            blob("metadata.json"),
            blob("qft_4_aer_simulator.json"),
            blob("qft_4_fake_kyiv.json"),
            blob("qft_8_aer_simulator.json"),
            blob("ghz_4_aer_simulator.json"),
        ];
        let CatalogIndex::ByAlgorithm(index) = build_index(&entries, false) else {
            panic!("expected algorithm grouping");
        };
        assert_eq!(index.len(), 2);
        assert_eq!(index["qft"][&4], vec!["aer_simulator", "fake_kyiv"]);
        assert_eq!(index["qft"][&8], vec!["aer_simulator"]);
        assert_eq!(index["ghz"][&4], vec!["aer_simulator"]);
    }

    #[test]
    fn test_group_by_backend() {
        let entries = vec![
            blob("qft_8_aer_simulator.json"),
            blob("qft_4_aer_simulator.json"),
            blob("ghz_4_fake_kyiv.json"),
        ];
        let CatalogIndex::ByBackend(index) = build_index(&entries, true) else {
            panic!("expected backend grouping");
        };
        assert_eq!(index["aer_simulator"]["qft"], vec![8, 4]);
        assert_eq!(index["fake_kyiv"]["ghz"], vec![4]);
    }

    #[test]
    fn test_serializes_as_nested_objects() {
        let index = build_index(&[blob("qft_4_aer_simulator.json")], false);
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json, serde_json::json!({"qft": {"4": ["aer_simulator"]}}));
        assert!(build_index(&[], true).is_empty());
    }
}
