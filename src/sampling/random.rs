//! Random record aggregation
//!
//! Draws records uniformly with replacement until the target is met. Draws
//! that land on unusable records are discarded without effect. The number of
//! draws is capped so a pathological record set fails instead of spinning.
//!
//! Uses the xoshiro256++ PRNG; the same seed over the same record list
//! always yields the same aggregate.

use super::{ensure_usable, Aggregate, RecordSampler};
use crate::error::Error;
use crate::model::ShotRecord;
use crate::Result;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Default ceiling on draws per aggregation
pub const DEFAULT_MAX_DRAWS: u64 = 10_000_000;

/// With-replacement sampler
pub struct RandomSampler {
    rng: Xoshiro256PlusPlus,
    max_draws: u64,
}

impl RandomSampler {
    /// Create a sampler with a random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
            max_draws: DEFAULT_MAX_DRAWS,
        }
    }

    /// Create a sampler with a specific seed
    ///
    /// Useful for reproducible results.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            max_draws: DEFAULT_MAX_DRAWS,
        }
    }

    pub fn with_max_draws(mut self, max_draws: u64) -> Self {
        self.max_draws = max_draws;
        self
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSampler for RandomSampler {
    fn aggregate(&mut self, records: &[ShotRecord], shots: u64) -> Result<Aggregate> {
        ensure_usable(records)?;
        let n = records.len();
        let mut aggregate = Aggregate::default();
        let mut draws = 0u64;

        while aggregate.total_shots < shots {
            if draws >= self.max_draws {
                return Err(Error::EmptyDataset(format!(
                    "gave up after {} draws with {} of {} shots collected",
                    draws, aggregate.total_shots, shots
                )));
            }
            draws += 1;

            let record = &records[self.rng.gen_range(0..n)];
            if aggregate.absorb(record) {
                aggregate.records_consumed += 1;
            }
        }

        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::test_support::record;
    use crate::ErrorKind;

    fn records() -> Vec<ShotRecord> {
        vec![
            record(10, &[("00", 10)]),
            record(10, &[("00", 4), ("11", 6)]),
            record(10, &[("11", 10)]),
            record(0, &[("01", 1000)]),
        ]
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = RandomSampler::with_seed(42).aggregate(&records(), 500).unwrap();
        let b = RandomSampler::with_seed(42).aggregate(&records(), 500).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reaches_target_and_skips_unusable() {
        let agg = RandomSampler::new().aggregate(&records(), 95).unwrap();
        assert_eq!(agg.total_shots, 100);
        assert_eq!(agg.records_consumed, 10);
        assert!(!agg.histogram.contains_key("01"));
        assert_eq!(agg.histogram_total(), agg.total_shots);
    }

    #[test]
    fn test_draw_coverage() {
        let records: Vec<_> = (0..4).map(|i| record(1, &[(&i.to_string(), 1)])).collect();
        let agg = RandomSampler::with_seed(1).aggregate(&records, 4000).unwrap();
        // Each record should be drawn roughly 1000 times; allow 20% deviation
        for count in agg.histogram.values() {
            assert!(*count > 800 && *count < 1200, "count {} outside expected range", count);
        }
    }

    #[test]
    fn test_all_unusable_fails_fast() {
        let err = RandomSampler::with_seed(3)
            .aggregate(&[record(0, &[("0", 1)]), record(-1, &[])], 10)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn test_draw_ceiling() {
        let err = RandomSampler::with_seed(3)
            .with_max_draws(5)
            .aggregate(&[record(1, &[("0", 1)])], 100)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }
}
