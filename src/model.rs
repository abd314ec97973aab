//! Dataset data model
//!
//! Run records, dataset/cursor keys and the enums selecting circuit kind and
//! sampling strategy.

use crate::error::Error;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Mapping from measurement bitstring to observed count
///
/// Ordered so that iteration (and therefore any seeded draw over it) does not
/// depend on hashing.
pub type OutcomeHistogram = BTreeMap<String, u64>;

/// Sum of all counts in a histogram ("total shots represented")
pub fn histogram_total(histogram: &OutcomeHistogram) -> u64 {
    histogram.values().sum()
}

/// One historical execution run
///
/// `shots` is not guaranteed to equal the sum of `data`; consumers must not
/// assume it does. Unknown fields are kept so that a cached record set is
/// written back exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    #[serde(default, deserialize_with = "lenient_shots")]
    pub shots: i64,
    #[serde(default, deserialize_with = "lenient_counts")]
    pub data: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ShotRecord {
    pub fn new(shots: i64, data: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self {
            shots,
            data: data.into_iter().collect(),
            extra: serde_json::Map::new(),
        }
    }

    /// Whether this record contributes to an aggregate
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.shots > 0
    }

    /// Parse newline-delimited records, skipping blank lines
    pub fn parse_lines(text: &str, origin: &str) -> crate::Result<Vec<Self>> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| Error::parse(origin, e)))
            .collect()
    }

    /// Serialize records as newline-delimited JSON
    pub fn to_lines(records: &[Self]) -> crate::Result<String> {
        let lines = records
            .iter()
            .map(|r| serde_json::to_string(r).map_err(|e| Error::parse("record set", e)))
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }
}

/// Integral value of a JSON number, truncating floats toward zero
fn number_to_i64<E: de::Error>(n: &serde_json::Number) -> Result<i64, E> {
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f.trunc() as i64)
        }
        _ => Err(E::custom(format!("{n} is out of range for a shot count"))),
    }
}

/// `shots` as written by any producer: integer, float or null
fn lenient_shots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<serde_json::Number>::deserialize(deserializer)? {
        Some(n) => number_to_i64(&n),
        None => Ok(0),
    }
}

/// Non-negative integral value of a JSON number, truncating floats
fn number_to_u64<E: de::Error>(n: &serde_json::Number) -> Result<u64, E> {
    if let Some(v) = n.as_u64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Ok(f.trunc() as u64),
        _ => Err(E::custom(format!("{n} is not a valid outcome count"))),
    }
}

/// Outcome counts that may have been serialized as floats (`512.0`)
fn lenient_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u64>, D::Error> {
    let raw = Option::<BTreeMap<String, serde_json::Number>>::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(bits, n)| Ok((bits, number_to_u64(&n)?)))
        .collect()
}

/// Circuit variant a run was recorded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    Circuit,
    Mirror,
}

impl CircuitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circuit => "circuit",
            Self::Mirror => "mirror",
        }
    }
}

impl Default for CircuitKind {
    fn default() -> Self {
        Self::Circuit
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "circuit" => Ok(Self::Circuit),
            "mirror" => Ok(Self::Mirror),
            _ => Err(Error::Validation(
                "circuit_kind must be 'circuit' or 'mirror'".to_string(),
            )),
        }
    }
}

/// Record aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Round-robin from a persisted cursor
    Sequential,
    /// Uniform draws with replacement
    Random,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Sequential
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            _ => Err(Error::Validation(
                "strategy must be 'sequential' or 'random'".to_string(),
            )),
        }
    }
}

/// Identifies one cacheable record set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    pub algorithm: String,
    pub size: u32,
    pub backend: String,
    pub circuit_kind: CircuitKind,
    pub version: String,
}

impl DatasetKey {
    /// `<algorithm>_<size>_<backend>.jsonl`, lowercased
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.jsonl",
            self.algorithm.to_lowercase(),
            self.size,
            self.backend.to_lowercase()
        )
    }

    /// URL of the history file below a raw-content base
    pub fn url(&self, raw_base: &str) -> String {
        format!(
            "{}/{}/histories/{}/{}",
            raw_base.trim_end_matches('/'),
            self.version,
            self.circuit_kind,
            self.file_name()
        )
    }

    /// `<version>/<circuitKind>/<file>` relative to the cache directory
    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.version)
            .join(self.circuit_kind.as_str())
            .join(self.file_name())
    }

    /// Version-independent key used by the sequential cursor
    pub fn cursor_key(&self) -> CursorKey {
        CursorKey {
            algorithm: self.algorithm.clone(),
            size: self.size,
            backend: self.backend.clone(),
            circuit_kind: self.circuit_kind,
        }
    }
}

/// Sequential cursor key; deliberately omits the dataset version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorKey {
    pub algorithm: String,
    pub size: u32,
    pub backend: String,
    pub circuit_kind: CircuitKind,
}
