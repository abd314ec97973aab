//! Exact multinomial trim
//!
//! Resamples a histogram to exactly `target` counts while keeping its
//! empirical proportions. The draw is multinomial with weights
//! `count / total`, realised as one conditional binomial per outcome in
//! bitstring order:
//!
//! ```text
//! n_i ~ Binomial(remaining_target, c_i / remaining_total)
//! ```
//!
//! with the last outcome taking whatever is left. This has the same
//! distribution as `target` independent categorical draws but costs one
//! binomial sample per outcome instead of one draw per shot.
//!
//! # Example
//!
//! ```
//! use qsimbench::sampling::exact::ExactSampler;
//! use qsimbench::OutcomeHistogram;
//!
//! let mut histogram = OutcomeHistogram::new();
//! histogram.insert("00".to_string(), 75);
//! histogram.insert("11".to_string(), 75);
//!
//! let trimmed = ExactSampler::with_seed(1).trim(&histogram, 120).unwrap();
//! assert_eq!(trimmed.values().sum::<u64>(), 120);
//! ```

use crate::error::Error;
use crate::model::{histogram_total, OutcomeHistogram};
use crate::Result;
use rand::SeedableRng;
use rand_distr::{Binomial, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Seeded multinomial resampler
pub struct ExactSampler {
    rng: Xoshiro256PlusPlus,
}

impl ExactSampler {
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Draw a histogram summing to exactly `target`
    ///
    /// Outcomes that receive no draws are omitted.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyDataset`] when the histogram's counts sum to zero.
    pub fn trim(&mut self, histogram: &OutcomeHistogram, target: u64) -> Result<OutcomeHistogram> {
        let total = histogram_total(histogram);
        if total == 0 {
            return Err(Error::EmptyDataset(
                "cannot resample a histogram with zero total counts".to_string(),
            ));
        }

        let mut trimmed = OutcomeHistogram::new();
        let mut remaining_target = target;
        let mut remaining_total = total;
        let outcomes: Vec<_> = histogram.iter().filter(|(_, c)| **c > 0).collect();
        let last = outcomes.len() - 1;

        for (i, (bits, count)) in outcomes.into_iter().enumerate() {
            if remaining_target == 0 {
                break;
            }
            let drawn = if i == last {
                remaining_target
            } else {
                let p = (*count as f64 / remaining_total as f64).min(1.0);
                let binomial = Binomial::new(remaining_target, p).map_err(|e| {
                    Error::Validation(format!("invalid binomial weight {p} for '{bits}': {e}"))
                })?;
                binomial.sample(&mut self.rng)
            };
            remaining_target -= drawn;
            remaining_total -= count;
            if drawn > 0 {
                trimmed.insert(bits.clone(), drawn);
            }
        }

        Ok(trimmed)
    }
}

impl Default for ExactSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot [`ExactSampler::trim`] with a fixed seed
pub fn trim(histogram: &OutcomeHistogram, target: u64, seed: u64) -> Result<OutcomeHistogram> {
    ExactSampler::with_seed(seed).trim(histogram, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn histogram(counts: &[(&str, u64)]) -> OutcomeHistogram {
        counts.iter().map(|(b, c)| (b.to_string(), *c)).collect()
    }

    #[test]
    fn test_sum_equals_target() {
        let h = histogram(&[("000", 13), ("001", 1), ("010", 400), ("111", 86)]);
        for (seed, target) in [(0, 1), (1, 7), (2, 99), (3, 250), (4, 499)] {
            let trimmed = trim(&h, target, seed).unwrap();
            assert_eq!(histogram_total(&trimmed), target);
            assert!(trimmed.keys().all(|k| h.contains_key(k)));
        }
    }

    #[test]
    fn test_balanced_scenario_proportions() {
        let h = histogram(&[("00", 75), ("11", 75)]);
        let mut sampler = ExactSampler::with_seed(9);
        let mut zeros = 0;
        let runs = 200;
        for _ in 0..runs {
            let trimmed = sampler.trim(&h, 120).unwrap();
            assert_eq!(histogram_total(&trimmed), 120);
            zeros += trimmed.get("00").copied().unwrap_or(0);
        }
        // Expected 60 per run; the mean over 200 runs is very tight
        let mean = zeros as f64 / runs as f64;
        assert!((mean - 60.0).abs() < 3.0, "mean {} too far from 60", mean);
    }

    #[test]
    fn test_same_seed_same_result() {
        let h = histogram(&[("0", 300), ("1", 200), ("2", 100)]);
        assert_eq!(trim(&h, 100, 42).unwrap(), trim(&h, 100, 42).unwrap());
    }

    #[test]
    fn test_single_outcome() {
        let h = histogram(&[("11", 500)]);
        assert_eq!(trim(&h, 10, 5).unwrap(), histogram(&[("11", 10)]));
    }

    #[test]
    fn test_zero_counts_are_never_drawn() {
        let h = histogram(&[("00", 0), ("01", 50), ("10", 0), ("11", 50)]);
        let trimmed = trim(&h, 60, 3).unwrap();
        assert!(!trimmed.contains_key("00"));
        assert!(!trimmed.contains_key("10"));
        assert_eq!(histogram_total(&trimmed), 60);
    }

    #[test]
    fn test_zero_total_is_rejected() {
        let err = trim(&histogram(&[]), 10, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
        let err = trim(&histogram(&[("0", 0)]), 10, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }
}
