use std::path::Path;

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::context::{Context, Token};
use super::freq_dist::ConditionalFreqDist;
use super::prob_dist::{check_gamma, AddGammaProbDist, Distribution, MleProbDist, ProbDist};
use crate::error::{NGramError, Result};

/// Represents an n-gram language model over word tokens.
///
/// The `NGramModel` counts, for every context of `n-1` tokens, the tokens
/// that follow it in a training corpus, and turns those counts into
/// conditional probabilities.
///
/// Without a reference corpus, probabilities are maximum-likelihood
/// estimates. With one, they use additive smoothing whose bin count is
/// taken from the reference corpus, so that smoothing mass is spread over
/// every event the context can produce rather than only the ones training saw.
///
/// # Responsibilities
/// - Count `(context, event)` pairs of the training (and reference) corpus
/// - Answer `P(event | context)` with the configured estimator
/// - Enumerate the support of the model
/// - Generate token sequences by sampling the training distribution
///
/// # Invariants
/// - `n` is always >= 1
/// - `gamma` is always finite
/// - The model is immutable once trained, except through [`NGramModel::merge`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramModel {
	/// The order of the model (context length + 1)
	n: usize,

	/// Additive smoothing constant, only used with a reference table
	gamma: f64,

	/// Counts learnt from the training corpus
	cfd: ConditionalFreqDist,

	/// Counts learnt from the reference corpus, if any
	reference: Option<ConditionalFreqDist>,
}

impl NGramModel {
	/// Trains an unsmoothed (maximum-likelihood) model of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new<S: AsRef<str>>(samples: &[S], n: usize) -> Result<Self> {
		Self::train(samples, n, None, 1.0)
	}

	/// Trains a model of order `n` smoothed against `reference` with `gamma`.
	///
	/// # Errors
	/// Returns an error if `n < 1` or if `gamma` is not a finite number.
	pub fn smoothed<S: AsRef<str>>(samples: &[S], n: usize, reference: &[S], gamma: f64) -> Result<Self> {
		Self::train(samples, n, Some(reference), gamma)
	}

	/// Trains a model of order `n` on `samples`.
	///
	/// If `reference` is supplied, its counts are learnt with the same `n`
	/// and the model uses additive smoothing with `gamma`.
	///
	/// # Errors
	/// Returns an error if `n < 1` or if `gamma` is not a finite number.
	pub fn train<S: AsRef<str>>(samples: &[S], n: usize, reference: Option<&[S]>, gamma: f64) -> Result<Self> {
		let cfd = ConditionalFreqDist::from_samples(samples, n)?;
		let reference = match reference {
			Some(reference) => Some(ConditionalFreqDist::from_samples(reference, n)?),
			None => None,
		};
		Self::from_tables(n, cfd, reference, gamma)
	}

	/// Assembles a model from already counted tables (ex. restored from disk).
	///
	/// # Errors
	/// Returns an error if `n < 1` or if `gamma` is not a finite number.
	pub fn from_tables(
		n: usize,
		cfd: ConditionalFreqDist,
		reference: Option<ConditionalFreqDist>,
		gamma: f64,
	) -> Result<Self> {
		if n < 1 {
			return Err(NGramError::InvalidArgument("n must be >= 1".to_owned()));
		}
		check_gamma(gamma)?;
		debug!(
			"Trained {}-gram model: {} contexts, smoothed = {}",
			n,
			cfd.len(),
			reference.is_some()
		);
		Ok(Self { n, gamma, cfd, reference })
	}

	/// Order `n` of the model.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Smoothing constant (ignored by unsmoothed models).
	pub fn gamma(&self) -> f64 {
		self.gamma
	}

	/// Returns `true` if the model was trained with a reference corpus.
	pub fn is_smoothed(&self) -> bool {
		self.reference.is_some()
	}

	/// Training counts.
	pub fn table(&self) -> &ConditionalFreqDist {
		&self.cfd
	}

	/// Reference counts, if the model is smoothed.
	pub fn reference_table(&self) -> Option<&ConditionalFreqDist> {
		self.reference.as_ref()
	}

	/// Estimator applied to `context`.
	///
	/// The smoothing bin count comes from the reference table only. A context
	/// absent from the reference corpus therefore has `B = 0`.
	fn distribution(&self, context: &Context) -> Distribution<'_> {
		let table = self.cfd.table_for(context);
		match &self.reference {
			None => Distribution::Mle(MleProbDist::new(table)),
			Some(reference) => {
				let bins = reference.table_for(context).bins();
				Distribution::AddGamma(AddGammaProbDist::with_checked_gamma(table, bins, self.gamma))
			}
		}
	}

	/// Probability of `event` following `context`.
	///
	/// Unseen contexts and events are not errors: they get whatever the
	/// estimator gives an empty count (0 without smoothing).
	pub fn probability(&self, context: &Context, event: &str) -> f64 {
		self.distribution(context).probability(event)
	}

	/// Lists every `(context, event, probability)` observed in training.
	///
	/// Triples with a probability of exactly 0 are left out, so the result
	/// is the support of the model. Order is deterministic (context, then event).
	pub fn items(&self) -> Vec<(&Context, &str, f64)> {
		let mut items = Vec::new();
		for (context, table) in self.cfd.iter() {
			let distribution = self.distribution(context);
			for event in table.events() {
				let probability = distribution.probability(event);
				if probability != 0.0 {
					items.push((context, event, probability));
				}
			}
		}
		items
	}

	/// Generates up to `max_length` tokens, starting from `seed`.
	///
	/// At each step the context is the last `n-1` generated tokens. A
	/// uniform value `t` in `[0, 1)` is drawn, the events observed after
	/// that context are shuffled, and their relative frequencies are
	/// accumulated until the running sum exceeds `t`. Shuffling first keeps
	/// ties at the threshold from always favouring the same event.
	///
	/// Sampling uses the training counts only, even for smoothed models.
	///
	/// Generation stops early when the context has no observed continuation.
	/// The seed itself is truncated if it is longer than `max_length`.
	pub fn generate<S, R>(&self, max_length: usize, seed: &[S], rng: &mut R) -> Vec<Token>
	where
		S: AsRef<str>,
		R: Rng,
	{
		let mut generated: Vec<Token> = seed.iter().map(|s| s.as_ref().to_owned()).collect();

		while generated.len() < max_length {
			let context = Context::trailing(&generated, self.n);
			let table = self.cfd.table_for(&context);
			if table.is_empty() {
				debug!("No continuation after {}, stopping at {} tokens", context, generated.len());
				break;
			}

			let target: f64 = rng.random();
			let total = table.total() as f64;
			let mut vocabulary: Vec<&str> = table.events().collect();
			vocabulary.shuffle(rng);

			let mut sum_to_date = 0.0;
			let mut choice = None;
			for event in vocabulary {
				sum_to_date += table.count(event) as f64 / total;
				// Rounding may keep the sum just below `target`; the last event wins then
				choice = Some(event);
				if sum_to_date > target {
					break;
				}
			}

			match choice {
				Some(event) => generated.push(event.to_owned()),
				None => break,
			}
		}

		generated.truncate(max_length);
		generated
	}

	/// Merges another model of the same order into this one.
	///
	/// # Notes
	/// - Training counts are summed.
	/// - Reference counts are summed when both models have them; a reference
	///   table present on one side only is kept as is.
	/// - `gamma` of `self` is kept.
	///
	/// # Errors
	/// Returns an error if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(NGramError::OrderMismatch { expected: self.n, found: other.n });
		}

		self.cfd.merge(&other.cfd);
		match (&mut self.reference, &other.reference) {
			(Some(existing), Some(reference)) => existing.merge(reference),
			(None, Some(reference)) => self.reference = Some(reference.clone()),
			_ => (),
		}

		Ok(())
	}

	/// Writes the model (order, gamma and every count) with `postcard`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(&path, bytes)?;
		info!("Saved {}-gram model to {}", self.n, path.as_ref().display());
		Ok(())
	}

	/// Reads a model previously written by [`NGramModel::save`].
	///
	/// # Errors
	/// Returns an error on I/O failure, undecodable bytes, or if the decoded
	/// model breaks the model invariants.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		let model: Self = postcard::from_bytes(&bytes)?;
		Self::from_tables(model.n, model.cfd, model.reference, model.gamma)
	}
}
