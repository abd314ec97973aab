//! Outcomes service
//!
//! [`OutcomesService`] is the one object a host holds. It owns the shared
//! HTTP transport, the remote catalog, the record cache, the sequential
//! cursors and the lookup memos, and exposes the public operations:
//!
//! - [`OutcomesService::get_outcomes`]: fetch, aggregate and optionally trim
//! - [`OutcomesService::get_index`]: algorithm/size/backend inventory
//! - [`OutcomesService::get_metadata`]: per-combination metadata documents
//! - [`OutcomesService::get_version_metadata`]: per-version metadata
//! - [`OutcomesService::get_versions`]: published versions, oldest first
//!
//! All operations are blocking and may be called from several threads at
//! once.
//!
//! # Example
//!
//! ```no_run
//! use qsimbench::{ClientConfig, OutcomesRequest, OutcomesService, Strategy};
//!
//! let service = OutcomesService::new(ClientConfig::default())?;
//! let request = OutcomesRequest::new("qft", 4, "aer_simulator")
//!     .with_shots(2000)
//!     .with_strategy(Strategy::Random)
//!     .with_seed(42);
//! let histogram = service.get_outcomes(&request)?;
//! assert_eq!(histogram.values().sum::<u64>(), 2000);
//! # Ok::<(), qsimbench::Error>(())
//! ```

use crate::cache::RecordCache;
use crate::catalog::{build_index, CatalogIndex, RemoteCatalog};
use crate::config::validator::validate_config;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::{HttpTransport, Transport};
use crate::memo::MemoCache;
use crate::model::{CircuitKind, DatasetKey, OutcomeHistogram, ShotRecord, Strategy};
use crate::sampling::cursor::CursorRegistry;
use crate::sampling::exact::ExactSampler;
use crate::sampling::{OutcomeAggregator, SubSeeds};
use crate::util::time::Clock;
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_SHOTS: u64 = 1024;

/// Parameters of [`OutcomesService::get_outcomes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomesRequest {
    pub algorithm: String,
    pub size: u32,
    pub backend: String,
    pub shots: u64,
    pub circuit_kind: CircuitKind,
    /// Trim an overshooting aggregate to exactly `shots`
    pub exact: bool,
    pub strategy: Strategy,
    /// Versions to concatenate, in order; `None` means the latest only
    pub versions: Option<Vec<String>>,
    /// Master seed for both random streams
    pub seed: Option<u64>,
    /// Bypass fresh cache entries
    pub force_refresh: bool,
}

impl OutcomesRequest {
    pub fn new(algorithm: impl Into<String>, size: u32, backend: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            size,
            backend: backend.into(),
            shots: DEFAULT_SHOTS,
            circuit_kind: CircuitKind::default(),
            exact: true,
            strategy: Strategy::default(),
            versions: None,
            seed: None,
            force_refresh: false,
        }
    }

    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_circuit_kind(mut self, circuit_kind: CircuitKind) -> Self {
        self.circuit_kind = circuit_kind;
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = Some(versions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Parameter checks that need no network access
    pub fn validate(&self) -> Result<()> {
        if self.shots == 0 {
            return Err(Error::Validation("shots must be a positive integer".to_string()));
        }
        validate_combination(&self.algorithm, self.size, &self.backend)?;
        if matches!(&self.versions, Some(v) if v.is_empty()) {
            return Err(Error::Validation("versions must not be empty".to_string()));
        }
        Ok(())
    }

    fn dataset_key(&self, version: &str) -> DatasetKey {
        DatasetKey {
            algorithm: self.algorithm.clone(),
            size: self.size,
            backend: self.backend.clone(),
            circuit_kind: self.circuit_kind,
            version: version.to_string(),
        }
    }
}

fn validate_combination(algorithm: &str, size: u32, backend: &str) -> Result<()> {
    if algorithm.trim().is_empty() {
        return Err(Error::Validation("algorithm must not be empty".to_string()));
    }
    if size == 0 {
        return Err(Error::Validation("size must be a positive integer".to_string()));
    }
    if backend.trim().is_empty() {
        return Err(Error::Validation("backend must not be empty".to_string()));
    }
    Ok(())
}

/// Parse a metadata file: one JSON document, or one document per line
fn parse_documents(body: &str, origin: &str) -> Result<Vec<Value>> {
    if let Ok(doc) = serde_json::from_str::<Value>(body) {
        return Ok(vec![doc]);
    }
    body.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(|e| Error::parse(origin, e)))
        .collect()
}

type IndexKey = (CircuitKind, bool, String);
type MetadataKey = (String, u32, String, String);

pub struct OutcomesService {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    catalog: RemoteCatalog,
    cache: RecordCache,
    aggregator: OutcomeAggregator,
    index_memo: MemoCache<IndexKey, CatalogIndex>,
    metadata_memo: MemoCache<MetadataKey, Vec<Value>>,
    version_metadata_memo: MemoCache<String, Value>,
}

impl fmt::Debug for OutcomesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomesService")
            .field("dataset_url", &self.config.dataset_url)
            .field("cache_dir", &self.config.cache_dir)
            .field("cursors", &self.cursors().len())
            .finish_non_exhaustive()
    }
}

impl OutcomesService {
    /// Validate `config` and connect over HTTP
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_config(&config)?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Build over any transport (a mock in tests)
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        validate_config(&config)?;
        let catalog = RemoteCatalog::new(&config, Arc::clone(&transport))?;
        let cache = RecordCache::new(
            &config.cache_dir,
            config.cache_timeout(),
            Arc::clone(&transport),
        );
        let registry = Arc::new(CursorRegistry::new());
        let aggregator = OutcomeAggregator::new(registry, config.max_random_draws);
        let capacity = config.memo_capacity;

        info!(
            dataset = %config.dataset_url,
            cache_dir = %config.cache_dir.display(),
            "outcomes service ready"
        );

        Ok(Self {
            config,
            transport,
            catalog,
            cache,
            aggregator,
            index_memo: MemoCache::new("index", capacity),
            metadata_memo: MemoCache::new("metadata", capacity),
            version_metadata_memo: MemoCache::new("version_metadata", capacity),
        })
    }

    /// Replace the clock used for cache freshness
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = self.cache.with_clock(clock);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cursors(&self) -> &Arc<CursorRegistry> {
        self.aggregator.registry()
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Reconstruct an outcome histogram for one combination
    ///
    /// Every version is checked before any record is fetched. Records of all
    /// requested versions are concatenated in request order, aggregated with
    /// the chosen strategy, and trimmed to exactly `shots` when `exact` is set
    /// and the aggregate overshoots. An aggregate that falls short is
    /// returned as is.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for bad parameters or an unknown version
    /// - [`Error::EmptyDataset`] when no usable record exists in any version
    /// - [`Error::Connectivity`] / [`Error::RemoteFetch`] from the network
    pub fn get_outcomes(&self, request: &OutcomesRequest) -> Result<OutcomeHistogram> {
        request.validate()?;
        let versions = match &request.versions {
            Some(versions) => versions.clone(),
            None => vec![self.catalog.latest()?],
        };
        for version in &versions {
            self.catalog.ensure_version(version)?;
        }

        let seeds = SubSeeds::derive(request.seed);

        let mut records: Vec<ShotRecord> = Vec::new();
        for version in &versions {
            let key = request.dataset_key(version);
            let fetched = self
                .cache
                .fetch_key(&key, self.catalog.raw_base(), request.force_refresh)?;
            debug!(%version, file = %key.file_name(), records = fetched.len(), "records loaded");
            records.extend(fetched);
        }
        if records.is_empty() {
            return Err(Error::EmptyDataset(format!(
                "no records for {}_{}_{} ({}) in versions [{}]",
                request.algorithm,
                request.size,
                request.backend,
                request.circuit_kind,
                versions.join(", ")
            )));
        }

        let cursor_key = request.dataset_key(&versions[0]).cursor_key();
        let aggregate = self.aggregator.run(
            &records,
            request.shots,
            request.strategy,
            &cursor_key,
            seeds.strategy,
        )?;
        let total = aggregate.histogram_total();
        debug!(
            strategy = %request.strategy,
            records_consumed = aggregate.records_consumed,
            total,
            target = request.shots,
            "aggregated"
        );

        if request.exact && total > request.shots {
            return ExactSampler::with_seed(seeds.exact).trim(&aggregate.histogram, request.shots);
        }
        Ok(aggregate.histogram)
    }

    /// Inventory of one version (the latest when `version` is `None`)
    pub fn get_index(
        &self,
        circuit_kind: CircuitKind,
        group_by_backend: bool,
        version: Option<&str>,
    ) -> Result<CatalogIndex> {
        let version = self.resolve_version(version)?;
        self.index_memo
            .get_or_try_insert_with((circuit_kind, group_by_backend, version.clone()), || {
                let tree = self.catalog.version_tree(&version)?;
                Ok(build_index(&tree, group_by_backend))
            })
    }

    /// Metadata documents of every file named `<algorithm>_<size>_<backend>*`
    ///
    /// # Errors
    ///
    /// [`Error::Catalog`] when the version holds no such file.
    pub fn get_metadata(
        &self,
        algorithm: &str,
        size: u32,
        backend: &str,
        version: Option<&str>,
    ) -> Result<Vec<Value>> {
        validate_combination(algorithm, size, backend)?;
        let version = self.resolve_version(version)?;
        let key = (algorithm.to_string(), size, backend.to_string(), version.clone());

        self.metadata_memo.get_or_try_insert_with(key, || {
            let prefix = format!("{algorithm}_{size}_{backend}");
            let files: Vec<String> = self
                .catalog
                .version_tree(&version)?
                .into_iter()
                .filter(|e| e.path.starts_with(&prefix))
                .map(|e| e.path)
                .collect();
            if files.is_empty() {
                return Err(Error::Catalog(format!(
                    "no metadata files for {prefix} in version {version}"
                )));
            }

            let mut documents = Vec::new();
            for file in files {
                let url = format!("{}/{}/{}", self.catalog.raw_base(), version, file);
                let resp = self.transport.get(&url)?.require_success(&url)?;
                documents.extend(parse_documents(&resp.body, &url)?);
            }
            Ok(documents)
        })
    }

    /// The `metadata.json` document of a version
    pub fn get_version_metadata(&self, version: Option<&str>) -> Result<Value> {
        let version = self.resolve_version(version)?;
        self.version_metadata_memo.get_or_try_insert_with(version.clone(), || {
            let url = format!("{}/{}/metadata.json", self.catalog.raw_base(), version);
            self.transport.get(&url)?.require_success(&url)?.json(&url)
        })
    }

    /// Published versions, oldest first
    pub fn get_versions(&self) -> Result<Vec<String>> {
        self.catalog.versions()
    }

    pub fn latest_version(&self) -> Result<String> {
        self.catalog.latest()
    }

    /// Forget every memoized index and metadata lookup
    pub fn invalidate_memos(&self) {
        self.index_memo.clear();
        self.metadata_memo.clear();
        self.version_metadata_memo.clear();
        info!("lookup memos invalidated");
    }

    /// Forget memos and the cached version list and dataset tree
    pub fn refresh_catalog(&self) {
        self.invalidate_memos();
        self.catalog.refresh();
    }

    fn resolve_version(&self, version: Option<&str>) -> Result<String> {
        match version {
            Some(v) => {
                self.catalog.ensure_version(v)?;
                Ok(v.to_string())
            }
            None => self.catalog.latest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::remote::test_support::{publish, version_tree_url, DATASET_URL, RAW};
    use crate::http::mock::MockTransport;
    use crate::model::histogram_total;
    use crate::util::time::FixedClock;
    use crate::ErrorKind;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    const FILES: &[&str] = &[
        "qft_4_aer_simulator.json",
        "qft_8_aer_simulator.json",
        "ghz_4_fake_kyiv.json",
    ];

    struct Fixture {
        _dir: TempDir,
        mock: MockTransport,
        service: OutcomesService,
    }

    fn fixture(versions: &[&str]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let mock = MockTransport::new();
        publish(&mock, versions, FILES);
        let config = ClientConfig::default()
            .with_dataset_url(DATASET_URL)
            .unwrap()
            .with_cache_dir(dir.path());
        let service = OutcomesService::with_transport(config, Arc::new(mock.clone())).unwrap();
        Fixture {
            _dir: dir,
            mock,
            service,
        }
    }

    fn qft_request() -> OutcomesRequest {
        OutcomesRequest::new("qft", 4, "aer_simulator")
    }

    fn history_url(version: &str, kind: &str, file: &str) -> String {
        format!("{RAW}/{version}/histories/{kind}/{file}")
    }

    fn lines(records: &[(i64, &[(&str, u64)])]) -> String {
        let records: Vec<ShotRecord> = records
            .iter()
            .map(|(shots, counts)| {
                ShotRecord::new(*shots, counts.iter().map(|(b, c)| (b.to_string(), *c)))
            })
            .collect();
        ShotRecord::to_lines(&records).unwrap()
    }

    fn three_records() -> String {
        lines(&[
            (50, &[("00", 50)]),
            (50, &[("00", 25), ("11", 25)]),
            (50, &[("11", 50)]),
        ])
    }

    #[test]
    fn test_request_defaults() {
        let request = OutcomesRequest::new("qft", 4, "aer_simulator");
        assert_eq!(request.shots, 1024);
        assert_eq!(request.circuit_kind, CircuitKind::Circuit);
        assert_eq!(request.strategy, Strategy::Sequential);
        assert!(request.exact);
        assert_eq!(request.versions, None);
        assert_eq!(request.seed, None);
        assert!(!request.force_refresh);
    }

    #[test]
    fn test_request_validation() {
        let base = OutcomesRequest::new("qft", 4, "aer_simulator");
        assert!(base.validate().is_ok());
        for bad in [
            base.clone().with_shots(0),
            OutcomesRequest::new("", 4, "aer_simulator"),
            OutcomesRequest::new("qft", 0, "aer_simulator"),
            OutcomesRequest::new("qft", 4, " "),
            base.clone().with_versions(Vec::<String>::new()),
        ] {
            assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_validation_happens_before_network() {
        let f = fixture(&["v1"]);
        let err = f
            .service
            .get_outcomes(&OutcomesRequest::new("qft", 4, "aer_simulator").with_shots(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(f.mock.request_count(), 0);
    }

    #[test]
    fn test_sequential_scenario_with_exact_trim() {
        let f = fixture(&["v1"]);
        f.mock.set_response(
            &history_url("v1", "circuit", "qft_4_aer_simulator.jsonl"),
            200,
            three_records(),
        );

        let untrimmed = f
            .service
            .get_outcomes(&qft_request().with_shots(120).with_exact(false))
            .unwrap();
        assert_eq!(untrimmed.get("00"), Some(&75));
        assert_eq!(untrimmed.get("11"), Some(&75));

        let trimmed = f
            .service
            .get_outcomes(&qft_request().with_shots(120).with_seed(5))
            .unwrap();
        assert_eq!(histogram_total(&trimmed), 120);
        assert!(trimmed.keys().all(|k| k == "00" || k == "11"));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let f = fixture(&["v1"]);
        f.mock.set_response(
            &history_url("v1", "circuit", "qft_4_aer_simulator.jsonl"),
            200,
            three_records(),
        );
        let request = OutcomesRequest::new("qft", 4, "aer_simulator")
            .with_shots(333)
            .with_strategy(Strategy::Random)
            .with_seed(42);

        let a = f.service.get_outcomes(&request).unwrap();
        let b = f.service.get_outcomes(&request).unwrap();
        assert_eq!(a, b);
        assert_eq!(histogram_total(&a), 333);
    }

    #[test]
    fn test_short_aggregate_is_not_padded() {
        let f = fixture(&["v1"]);
        f.mock.set_response(
            &history_url("v1", "circuit", "qft_4_aer_simulator.jsonl"),
            200,
            lines(&[(10, &[("0", 4)])]),
        );
        // histogram total (4) stays below the target even though shots reach it
        let histogram = f
            .service
            .get_outcomes(&OutcomesRequest::new("qft", 4, "aer_simulator").with_shots(10))
            .unwrap();
        assert_eq!(histogram.get("0"), Some(&4));
    }

    #[test]
    fn test_missing_everywhere_is_empty_dataset() {
        let f = fixture(&["v1", "v2"]);
        let err = f
            .service
            .get_outcomes(&qft_request().with_versions(["v1", "v2"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn test_versions_concatenate_in_order() {
        let f = fixture(&["v1", "v2"]);
        f.mock.set_response(
            &history_url("v1", "mirror", "ghz_4_fake_kyiv.jsonl"),
            200,
            lines(&[(10, &[("a", 10)])]),
        );
        f.mock.set_response(
            &history_url("v2", "mirror", "ghz_4_fake_kyiv.jsonl"),
            200,
            lines(&[(10, &[("b", 10)])]),
        );
        let request = OutcomesRequest::new("ghz", 4, "fake_kyiv")
            .with_circuit_kind(CircuitKind::Mirror)
            .with_versions(["v2", "v1"])
            .with_shots(10);

        let first = f.service.get_outcomes(&request).unwrap();
        let second = f.service.get_outcomes(&request).unwrap();
        assert_eq!(first.get("b"), Some(&10));
        assert_eq!(second.get("a"), Some(&10));
    }

    #[test]
    fn test_one_missing_version_is_tolerated() {
        let f = fixture(&["v1", "v2"]);
        f.mock.set_response(
            &history_url("v2", "circuit", "qft_4_aer_simulator.jsonl"),
            200,
            lines(&[(10, &[("1", 10)])]),
        );
        let histogram = f
            .service
            .get_outcomes(&qft_request().with_versions(["v1", "v2"]).with_shots(10))
            .unwrap();
        assert_eq!(histogram.get("1"), Some(&10));
    }

    #[test]
    fn test_unknown_version_fetches_no_records() {
        let f = fixture(&["v1"]);
        let err = f
            .service
            .get_outcomes(&qft_request().with_versions(["v1", "v7"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(f.mock.requests().iter().all(|u| !u.contains("/histories/")));
    }

    #[test]
    fn test_records_are_served_from_cache() {
        let f = fixture(&["v1"]);
        let url = history_url("v1", "circuit", "qft_4_aer_simulator.jsonl");
        f.mock.set_response(&url, 200, three_records());
        let request = OutcomesRequest::new("qft", 4, "aer_simulator").with_shots(10);

        f.service.get_outcomes(&request).unwrap();
        f.service.get_outcomes(&request).unwrap();
        assert_eq!(f.mock.requests_for(&url), 1);

        f.service.get_outcomes(&request.clone().with_force_refresh(true)).unwrap();
        assert_eq!(f.mock.requests_for(&url), 2);
    }

    #[test]
    fn test_cache_expiry_through_service_clock() {
        let dir = TempDir::new().unwrap();
        let mock = MockTransport::new();
        publish(&mock, &["v1"], FILES);
        let url = history_url("v1", "circuit", "qft_4_aer_simulator.jsonl");
        mock.set_response(&url, 200, three_records());

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let config = ClientConfig::default()
            .with_dataset_url(DATASET_URL)
            .unwrap()
            .with_cache_dir(dir.path())
            .with_cache_timeout_secs(60);
        let service = OutcomesService::with_transport(config, Arc::new(mock.clone()))
            .unwrap()
            .with_clock(clock.clone());
        let request = OutcomesRequest::new("qft", 4, "aer_simulator").with_shots(10);

        service.get_outcomes(&request).unwrap();
        clock.advance(Duration::from_secs(59));
        service.get_outcomes(&request).unwrap();
        assert_eq!(mock.requests_for(&url), 1);
        clock.advance(Duration::from_secs(2));
        service.get_outcomes(&request).unwrap();
        assert_eq!(mock.requests_for(&url), 2);
    }

    #[test]
    fn test_index_groupings_and_memo() {
        let f = fixture(&["v1", "v2"]);

        let index = f.service.get_index(CircuitKind::Circuit, false, None).unwrap();
        let CatalogIndex::ByAlgorithm(by_alg) = index else {
            panic!("expected algorithm grouping");
        };
        assert_eq!(by_alg["qft"][&8], vec!["aer_simulator"]);
        assert_eq!(by_alg["ghz"][&4], vec!["fake_kyiv"]);

        let index = f.service.get_index(CircuitKind::Circuit, true, Some("v1")).unwrap();
        let CatalogIndex::ByBackend(by_be) = index else {
            panic!("expected backend grouping");
        };
        assert_eq!(by_be["aer_simulator"]["qft"], vec![4, 8]);

        f.service.get_index(CircuitKind::Circuit, false, None).unwrap();
        assert_eq!(f.mock.requests_for(&version_tree_url("v2")), 1);

        f.service.invalidate_memos();
        f.service.get_index(CircuitKind::Circuit, false, None).unwrap();
        assert_eq!(f.mock.requests_for(&version_tree_url("v2")), 2);
    }

    #[test]
    fn test_metadata_single_and_line_delimited() {
        let f = fixture(&["v1"]);
        f.mock.set_response(
            &format!("{RAW}/v1/qft_4_aer_simulator.json"),
            200,
            r#"{"depth": 12, "gates": {"h": 4}}"#,
        );
        let docs = f.service.get_metadata("qft", 4, "aer_simulator", None).unwrap();
        assert_eq!(docs, vec![serde_json::json!({"depth": 12, "gates": {"h": 4}})]);

        f.mock.set_response(
            &format!("{RAW}/v1/ghz_4_fake_kyiv.json"),
            200,
            "{\"run\": 1}\n\n{\"run\": 2}\n",
        );
        let docs = f.service.get_metadata("ghz", 4, "fake_kyiv", Some("v1")).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["run"], 2);
    }

    #[test]
    fn test_metadata_errors() {
        let f = fixture(&["v1"]);
        let err = f.service.get_metadata("bv", 4, "aer_simulator", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Catalog);

        // listed in the tree but not downloadable
        let err = f.service.get_metadata("qft", 8, "aer_simulator", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFetch);

        f.mock.set_response(&format!("{RAW}/v1/qft_4_aer_simulator.json"), 200, "not json\n");
        let err = f.service.get_metadata("qft", 4, "aer_simulator", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_version_metadata_and_versions() {
        let f = fixture(&["v1", "v2"]);
        f.mock.set_response(
            &format!("{RAW}/v1/metadata.json"),
            200,
            r#"{"created": "2025-01-01"}"#,
        );

        assert_eq!(f.service.get_versions().unwrap(), vec!["v1", "v2"]);
        assert_eq!(f.service.latest_version().unwrap(), "v2");

        let meta = f.service.get_version_metadata(Some("v1")).unwrap();
        assert_eq!(meta["created"], "2025-01-01");
        f.service.get_version_metadata(Some("v1")).unwrap();
        assert_eq!(f.mock.requests_for(&format!("{RAW}/v1/metadata.json")), 1);

        let err = f.service.get_version_metadata(Some("v3")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_refresh_catalog_reloads_versions() {
        let f = fixture(&["v1"]);
        assert_eq!(f.service.latest_version().unwrap(), "v1");
        publish(&f.mock, &["v1", "v2"], FILES);
        assert_eq!(f.service.latest_version().unwrap(), "v1");
        f.service.refresh_catalog();
        assert_eq!(f.service.latest_version().unwrap(), "v2");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClientConfig {
            memo_capacity: 0,
            ..ClientConfig::default()
        };
        let err = OutcomesService::with_transport(config, Arc::new(MockTransport::new()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_debug_output_omits_token() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::default()
            .with_dataset_url(DATASET_URL)
            .unwrap()
            .with_cache_dir(dir.path())
            .with_token("s3cr3t-token");
        let service =
            OutcomesService::with_transport(config, Arc::new(MockTransport::new())).unwrap();

        let text = format!("{service:?}");
        assert!(text.starts_with("OutcomesService"));
        assert!(text.contains(DATASET_URL));
        assert!(!text.contains("s3cr3t-token"));
    }
}
