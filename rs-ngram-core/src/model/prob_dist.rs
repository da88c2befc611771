use log::warn;

use super::freq_dist::FreqDist;
use crate::error::{NGramError, Result};

/// Probability of an event within one context.
pub trait ProbDist {
	/// Returns a probability in `[0, 1]`. Unseen events are not errors.
	fn probability(&self, event: &str) -> f64;
}

/// Maximum-likelihood estimate: the relative frequency of the event.
///
/// Every event of an empty table has probability 0.
#[derive(Clone, Copy, Debug)]
pub struct MleProbDist<'a> {
	table: &'a FreqDist,
}

impl<'a> MleProbDist<'a> {
	/// Wraps the counts of one context.
	pub fn new(table: &'a FreqDist) -> Self {
		Self { table }
	}
}

impl ProbDist for MleProbDist<'_> {
	fn probability(&self, event: &str) -> f64 {
		self.table.freq(event)
	}
}

/// Additive ("add-gamma") smoothing.
///
/// `P(event) = (count(event) + gamma) / (N + B * gamma)` where `N` is the
/// training total of the context and `B` is the number of distinct events
/// the context produces in the reference corpus.
///
/// A zero denominator (context unseen in both corpora) gives probability 0
/// for every event. Negative results, only reachable with `gamma < 0`,
/// are clamped to 0.
#[derive(Clone, Copy, Debug)]
pub struct AddGammaProbDist<'a> {
	table: &'a FreqDist,
	bins: usize,
	gamma: f64,
}

impl<'a> AddGammaProbDist<'a> {
	/// Wraps the training counts of one context with its reference bin count.
	///
	/// # Errors
	/// Returns [`NGramError::InvalidArgument`] if `gamma` is NaN or infinite.
	pub fn new(table: &'a FreqDist, bins: usize, gamma: f64) -> Result<Self> {
		check_gamma(gamma)?;
		Ok(Self { table, bins, gamma })
	}

	/// For callers that validated `gamma` beforehand.
	pub(crate) fn with_checked_gamma(table: &'a FreqDist, bins: usize, gamma: f64) -> Self {
		Self { table, bins, gamma }
	}
}

impl ProbDist for AddGammaProbDist<'_> {
	fn probability(&self, event: &str) -> f64 {
		let denominator = self.table.total() as f64 + self.bins as f64 * self.gamma;
		if denominator <= 0.0 {
			return 0.0;
		}
		let probability = (self.table.count(event) as f64 + self.gamma) / denominator;
		if probability < 0.0 {
			warn!("Negative smoothed probability for {:?} (gamma = {}), clamped to 0", event, self.gamma);
			return 0.0;
		}
		probability
	}
}

/// The estimator an n-gram model applies to a context.
///
/// Chosen once per model: maximum likelihood without a reference corpus,
/// additive smoothing with one.
#[derive(Clone, Copy, Debug)]
pub enum Distribution<'a> {
	Mle(MleProbDist<'a>),
	AddGamma(AddGammaProbDist<'a>),
}

impl ProbDist for Distribution<'_> {
	fn probability(&self, event: &str) -> f64 {
		match self {
			Distribution::Mle(dist) => dist.probability(event),
			Distribution::AddGamma(dist) => dist.probability(event),
		}
	}
}

/// Rejects gamma values that cannot be used as a smoothing constant.
pub(crate) fn check_gamma(gamma: f64) -> Result<()> {
	if !gamma.is_finite() {
		return Err(NGramError::InvalidArgument(format!("gamma must be a finite number, got {}", gamma)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(pairs: &[(&str, usize)]) -> FreqDist {
		let mut table = FreqDist::new();
		for (event, count) in pairs {
			for _ in 0..*count {
				table.increment(event);
			}
		}
		table
	}

	#[test]
	fn test_mle_sums_to_one() {
		let table = table(&[("a", 3), ("b", 1), ("c", 4)]);
		let dist = MleProbDist::new(&table);
		let sum: f64 = table.events().map(|e| dist.probability(e)).sum();
		assert!((sum - 1.0).abs() < 1e-9);
		assert_eq!(dist.probability("z"), 0.0);
	}

	#[test]
	fn test_mle_empty_table() {
		let table = FreqDist::new();
		assert_eq!(MleProbDist::new(&table).probability("a"), 0.0);
	}

	#[test]
	fn test_add_gamma_value() {
		// count = 2, N = 5, B = 4, gamma = 1 -> 3 / 9
		let table = table(&[("a", 2), ("b", 3)]);
		let dist = AddGammaProbDist::new(&table, 4, 1.0).unwrap();
		assert!((dist.probability("a") - 3.0 / 9.0).abs() < 1e-12);
		assert!((dist.probability("unseen") - 1.0 / 9.0).abs() < 1e-12);
	}

	#[test]
	fn test_add_gamma_sums_to_one_over_reference_vocabulary() {
		let table = table(&[("a", 2), ("b", 3)]);
		let vocabulary = ["a", "b", "c", "d"];
		let dist = AddGammaProbDist::new(&table, vocabulary.len(), 0.25).unwrap();
		let sum: f64 = vocabulary.iter().map(|e| dist.probability(e)).sum();
		assert!((sum - 1.0).abs() < 1e-9);
	}

	#[test]
	fn test_add_gamma_unseen_everywhere_is_zero() {
		let table = FreqDist::new();
		let dist = AddGammaProbDist::new(&table, 0, 1.0).unwrap();
		assert_eq!(dist.probability("a"), 0.0);
	}

	#[test]
	fn test_add_gamma_zero_gamma_matches_mle() {
		let table = table(&[("a", 1), ("b", 3)]);
		let smoothed = AddGammaProbDist::new(&table, 7, 0.0).unwrap();
		let mle = MleProbDist::new(&table);
		assert_eq!(smoothed.probability("b"), mle.probability("b"));
		assert_eq!(smoothed.probability("z"), 0.0);
	}

	#[test]
	fn test_add_gamma_rejects_nan() {
		let table = FreqDist::new();
		assert!(matches!(AddGammaProbDist::new(&table, 1, f64::NAN), Err(NGramError::InvalidArgument(_))));
		assert!(AddGammaProbDist::new(&table, 1, f64::INFINITY).is_err());
	}

	#[test]
	fn test_distribution_dispatch() {
		let table = table(&[("a", 1), ("b", 1)]);
		let mle = Distribution::Mle(MleProbDist::new(&table));
		let smoothed = Distribution::AddGamma(AddGammaProbDist::new(&table, 2, 1.0).unwrap());
		assert_eq!(mle.probability("a"), 0.5);
		assert_eq!(smoothed.probability("a"), 0.5);
		assert_eq!(smoothed.probability("c"), 0.25);
	}
}
