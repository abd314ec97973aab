//! Record aggregation strategies
//!
//! This module turns a list of run records into one outcome histogram. A
//! [`RecordSampler`] consumes records until the summed `shots` of the
//! consumed (usable) records reaches the requested target, merging each
//! record's counts into the histogram as it goes.
//!
//! # Strategies
//!
//! - **Sequential**: round-robin from a persisted cursor (see [`cursor`]);
//!   consecutive calls continue where the previous one stopped
//! - **Random**: uniform draws with replacement from a seeded generator
//!
//! Both may overshoot the target: the last consumed record can push the
//! total past it. [`exact::ExactSampler`] trims an overshooting aggregate
//! down to the exact target when the caller asks for it.
//!
//! Records whose `shots` is zero or negative never contribute. A record set
//! with no usable record at all is rejected up front rather than looped over.
//!
//! # Example
//!
//! ```
//! use qsimbench::sampling::{RecordSampler, random::RandomSampler};
//! use qsimbench::ShotRecord;
//!
//! let records = vec![
//!     ShotRecord::new(10, [("00".to_string(), 6), ("11".to_string(), 4)]),
//!     ShotRecord::new(10, [("00".to_string(), 5), ("11".to_string(), 5)]),
//! ];
//! let mut sampler = RandomSampler::with_seed(7);
//! let aggregate = sampler.aggregate(&records, 25).unwrap();
//! assert_eq!(aggregate.total_shots, 30);
//! ```

pub mod cursor;
pub mod exact;
pub mod random;
pub mod sequential;

use crate::error::Error;
use crate::model::{histogram_total, CursorKey, OutcomeHistogram, ShotRecord, Strategy};
use crate::Result;
use cursor::CursorRegistry;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use random::RandomSampler;
use sequential::SequentialSampler;
use std::sync::Arc;

/// Result of aggregating records (before any exact trim)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub histogram: OutcomeHistogram,
    /// Sum of the `shots` field of every usable record consumed
    pub total_shots: u64,
    /// Records read; sequential counts unusable records it stepped over,
    /// random counts only the draws that contributed
    pub records_consumed: u64,
}

impl Aggregate {
    /// Merge a record's counts if it is usable
    fn absorb(&mut self, record: &ShotRecord) -> bool {
        if !record.is_usable() {
            return false;
        }
        for (bits, count) in &record.data {
            *self.histogram.entry(bits.clone()).or_insert(0) += count;
        }
        self.total_shots += record.shots as u64;
        true
    }

    /// Sum of the histogram's counts
    pub fn histogram_total(&self) -> u64 {
        histogram_total(&self.histogram)
    }
}

/// Aggregation strategy over a record list
///
/// Implementations must be `Send` so a service can run them on whichever
/// thread the caller is on.
pub trait RecordSampler: Send {
    /// Consume records until their summed `shots` is at least `shots`
    ///
    /// # Errors
    ///
    /// [`Error::EmptyDataset`] when `records` is empty or holds no record
    /// with `shots > 0`.
    fn aggregate(&mut self, records: &[ShotRecord], shots: u64) -> Result<Aggregate>;
}

/// Reject record sets that can never reach a positive target
pub(crate) fn ensure_usable(records: &[ShotRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(Error::EmptyDataset("no records available to sample".to_string()));
    }
    if !records.iter().any(ShotRecord::is_usable) {
        return Err(Error::EmptyDataset(format!(
            "none of the {} records has a positive shot count",
            records.len()
        )));
    }
    Ok(())
}

/// Independent seeds for the strategy stream and the exact-trim stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSeeds {
    pub strategy: u64,
    pub exact: u64,
}

impl SubSeeds {
    /// Draw both sub-seeds from one master generator
    ///
    /// The same master seed always yields the same pair; no master seed draws
    /// the master generator from entropy.
    pub fn derive(master: Option<u64>) -> Self {
        let mut rng = match master {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        let strategy = u64::from(rng.gen::<u32>());
        let exact = u64::from(rng.gen::<u32>());
        Self { strategy, exact }
    }
}

/// Strategy dispatch over a shared cursor registry
pub struct OutcomeAggregator {
    registry: Arc<CursorRegistry>,
    max_random_draws: u64,
}

impl OutcomeAggregator {
    pub fn new(registry: Arc<CursorRegistry>, max_random_draws: u64) -> Self {
        Self {
            registry,
            max_random_draws,
        }
    }

    pub fn registry(&self) -> &Arc<CursorRegistry> {
        &self.registry
    }

    /// Build the sampler for `strategy`
    pub fn create_sampler(
        &self,
        strategy: Strategy,
        cursor_key: &CursorKey,
        seed: u64,
    ) -> Box<dyn RecordSampler> {
        match strategy {
            Strategy::Sequential => Box::new(SequentialSampler::new(
                Arc::clone(&self.registry),
                cursor_key.clone(),
            )),
            Strategy::Random => {
                Box::new(RandomSampler::with_seed(seed).with_max_draws(self.max_random_draws))
            }
        }
    }

    /// Aggregate `records` to at least `shots` with the chosen strategy
    pub fn run(
        &self,
        records: &[ShotRecord],
        shots: u64,
        strategy: Strategy,
        cursor_key: &CursorKey,
        seed: u64,
    ) -> Result<Aggregate> {
        self.create_sampler(strategy, cursor_key, seed)
            .aggregate(records, shots)
    }
}
