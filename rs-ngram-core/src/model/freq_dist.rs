use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::context::{extract, Context, Token};
use crate::error::Result;

/// Table returned for contexts that were never observed.
static EMPTY: FreqDist = FreqDist { counts: BTreeMap::new(), total: 0 };

/// Occurrence counts of the events observed after one context.
///
/// Conceptually, this is the set of outgoing edges of a node in a Markov
/// chain, weighted by their number of observations.
///
/// Only the counts are serialized; the total is rebuilt on decode.
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - `total` is the sum of all counts
/// - Events are kept in token order, so iteration is deterministic
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "BTreeMap<Token, usize>", into = "BTreeMap<Token, usize>")]
pub struct FreqDist {
	/// Example: { "rio" => 1, "dance" => 1 }
	counts: BTreeMap<Token, usize>,
	/// Cached `N`, read on every probability query
	total: usize,
}

impl From<BTreeMap<Token, usize>> for FreqDist {
	fn from(mut counts: BTreeMap<Token, usize>) -> Self {
		counts.retain(|_, count| *count > 0);
		let total = counts.values().sum();
		Self { counts, total }
	}
}

impl From<FreqDist> for BTreeMap<Token, usize> {
	fn from(table: FreqDist) -> Self {
		table.counts
	}
}

impl FreqDist {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more occurrence of `event`.
	pub fn increment(&mut self, event: &str) {
		match self.counts.get_mut(event) {
			Some(count) => *count += 1,
			None => {
				self.counts.insert(event.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	/// Number of times `event` was observed (0 if never).
	pub fn count(&self, event: &str) -> usize {
		self.counts.get(event).copied().unwrap_or(0)
	}

	/// Total number of observations `N`.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct events `B`.
	pub fn bins(&self) -> usize {
		self.counts.len()
	}

	/// Relative frequency `count / N`, or 0 when the table is empty.
	pub fn freq(&self, event: &str) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		self.count(event) as f64 / self.total as f64
	}

	/// Most frequent event. Ties go to the smallest token.
	pub fn max(&self) -> Option<&str> {
		self.counts
			.iter()
			.fold(None, |best: Option<(&Token, usize)>, (event, &count)| match best {
				Some((_, best_count)) if best_count >= count => best,
				_ => Some((event, count)),
			})
			.map(|(event, _)| event.as_str())
	}

	/// Observed events in token order.
	pub fn events(&self) -> impl Iterator<Item = &str> {
		self.counts.keys().map(String::as_str)
	}

	/// Returns `true` if no event was observed.
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Adds the counts of `other` to this table.
	pub fn merge(&mut self, other: &Self) {
		for (event, count) in &other.counts {
			*self.counts.entry(event.clone()).or_insert(0) += *count;
		}
		self.total += other.total;
	}
}

/// Frequency tables indexed by context.
///
/// Built once from `(context, event)` pairs and read-only afterwards.
///
/// ## Invariants
/// - Only contexts with at least one observed event are stored
/// - For a table built from `k` pairs, `total() == k`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionalFreqDist {
	tables: BTreeMap<Context, FreqDist>,
}

impl ConditionalFreqDist {
	/// Creates a table with no context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Counts every `(context, event)` pair.
	pub fn build<I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (Context, Token)>,
	{
		let mut cfd = Self::new();
		for (context, event) in pairs {
			cfd.tables.entry(context).or_default().increment(&event);
		}
		debug!("Built conditional frequency table: {} contexts, {} observations", cfd.len(), cfd.total());
		cfd
	}

	/// Extracts the order-`n` pairs of `samples` and counts them.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn from_samples<S: AsRef<str>>(samples: &[S], n: usize) -> Result<Self> {
		Ok(Self::build(extract(samples, n)?))
	}

	/// Frequency table of `context`; empty if the context was never observed.
	pub fn table_for(&self, context: &Context) -> &FreqDist {
		self.tables.get(context).unwrap_or(&EMPTY)
	}

	/// All observed contexts.
	pub fn contexts(&self) -> BTreeSet<&Context> {
		self.tables.keys().collect()
	}

	/// `(context, table)` pairs in context order.
	pub fn iter(&self) -> impl Iterator<Item = (&Context, &FreqDist)> {
		self.tables.iter()
	}

	/// Sum of all counts across all contexts.
	pub fn total(&self) -> usize {
		self.tables.values().map(FreqDist::total).sum()
	}

	/// Number of observed contexts.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	/// Returns `true` if no pair was counted.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	/// Returns a table holding the counts of both `self` and `other`.
	///
	/// Corpora are counted separately, so no pair spans the two of them.
	pub fn union(&self, other: &Self) -> Self {
		let mut union = self.clone();
		union.merge(other);
		union
	}

	/// Adds the counts of `other` to this table.
	///
	/// Intended for combining tables learnt from separate corpora.
	pub fn merge(&mut self, other: &Self) {
		for (context, table) in &other.tables {
			if let Some(existing) = self.tables.get_mut(context) {
				existing.merge(table);
			} else {
				self.tables.insert(context.clone(), table.clone());
			}
		}
	}

	/// Encodes the table with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes a table written by [`ConditionalFreqDist::to_bytes`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Writes the encoded table to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		std::fs::write(&path, self.to_bytes()?)?;
		info!("Saved conditional frequency table to {}", path.as_ref().display());
		Ok(())
	}

	/// Reads a table previously written by [`ConditionalFreqDist::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		Self::from_bytes(&bytes)
	}
}
