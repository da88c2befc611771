use log::info;
use serde::{Deserialize, Serialize};

use super::freq_dist::ConditionalFreqDist;
use super::ngram_model::NGramModel;
use crate::error::{NGramError, Result};

/// One step of a smoothing sweep.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SweepPoint {
	pub gamma: f64,
	pub divergence: f64,
}

/// Kullback-Leibler divergence `D(p || q)` in bits.
///
/// Sums `p(e|c) * log2(p(e|c) / q(e|c))` over the support of `p`
/// (every triple of [`NGramModel::items`]).
///
/// # Errors
/// Returns [`NGramError::Domain`] as soon as `q` gives zero probability to
/// an event `p` supports: the divergence would be infinite.
pub fn kl_divergence(p: &NGramModel, q: &NGramModel) -> Result<f64> {
	let mut divergence = 0.0;
	for (context, event, prob_p) in p.items() {
		let prob_q = q.probability(context, event);
		if prob_q <= 0.0 {
			return Err(NGramError::Domain { context: context.clone(), event: event.to_owned() });
		}
		divergence += prob_p * (prob_p / prob_q).log2();
	}
	Ok(divergence)
}

/// Measures how well smoothed models of `train` approximate an unsmoothed
/// model of `test`, for `gamma = 1/i` with `i` in `gamma_min..=gamma_max`.
///
/// Every smoothed model uses `full` as its reference corpus. Results are in
/// ascending `i` order, hence descending `gamma`. An empty range gives an
/// empty result.
///
/// # Errors
/// - [`NGramError::InvalidArgument`] if `n < 1` or `gamma_min == 0`.
/// - [`NGramError::Domain`] if one of the divergences is infinite.
pub fn sweep<S: AsRef<str>>(
	full: &[S],
	train: &[S],
	test: &[S],
	n: usize,
	gamma_min: usize,
	gamma_max: usize,
) -> Result<Vec<SweepPoint>> {
	let full = ConditionalFreqDist::from_samples(full, n)?;
	let train = ConditionalFreqDist::from_samples(train, n)?;
	let test = ConditionalFreqDist::from_samples(test, n)?;
	sweep_tables(&full, &train, &test, n, gamma_min, gamma_max)
}

/// Same as [`sweep`], over corpora that were already counted with order `n`
/// (ex. loaded from the binary cache).
pub fn sweep_tables(
	full: &ConditionalFreqDist,
	train: &ConditionalFreqDist,
	test: &ConditionalFreqDist,
	n: usize,
	gamma_min: usize,
	gamma_max: usize,
) -> Result<Vec<SweepPoint>> {
	if gamma_min == 0 {
		return Err(NGramError::InvalidArgument("gamma_min must be >= 1 (gamma = 1/i)".to_owned()));
	}

	let non_smoothed = NGramModel::from_tables(n, test.clone(), None, 1.0)?;
	let mut points = Vec::with_capacity((gamma_max + 1).saturating_sub(gamma_min));
	for i in gamma_min..=gamma_max {
		let gamma = 1.0 / i as f64;
		let smoothed = NGramModel::from_tables(n, train.clone(), Some(full.clone()), gamma)?;
		let divergence = kl_divergence(&non_smoothed, &smoothed)?;
		info!("Sweep step i = {}: gamma = {:.4}, divergence = {:.6}", i, gamma, divergence);
		points.push(SweepPoint { gamma, divergence });
	}

	Ok(points)
}
