use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NGramError, Result};

/// A single unit of text (word or punctuation symbol).
///
/// Comparison is exact: lower-casing is left to the corpus loader.
pub type Token = String;

/// The `n-1` tokens preceding an event.
///
/// Order-1 models share a single context, the null context, which holds no
/// token at all. Two contexts holding the same token sequence are equal.
///
/// ## Invariants
/// - Every context produced by [`extract`] for a model of order `n` holds
///   exactly `n-1` tokens.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(Vec<Token>);

impl Context {
	/// Creates a context from a token window.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Token>,
	{
		Self(tokens.into_iter().map(Into::into).collect())
	}

	/// The context shared by every event of an order-1 model.
	pub fn null() -> Self {
		Self(Vec::new())
	}

	/// Returns `true` for the null context.
	pub fn is_null(&self) -> bool {
		self.0.is_empty()
	}

	/// Tokens of the context, oldest first.
	pub fn tokens(&self) -> &[Token] {
		&self.0
	}

	/// Builds the context an order-`n` model sees after `history`:
	/// its last `n-1` tokens (or all of them if the history is shorter).
	pub fn trailing(history: &[Token], n: usize) -> Self {
		let width = n.saturating_sub(1);
		let start = history.len().saturating_sub(width);
		Self(history[start..].to_vec())
	}
}

impl From<&[&str]> for Context {
	fn from(tokens: &[&str]) -> Self {
		Self::new(tokens.iter().copied())
	}
}

impl<const N: usize> From<[&str; N]> for Context {
	fn from(tokens: [&str; N]) -> Self {
		Self::new(tokens)
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_null() {
			return f.write_str("<null>");
		}
		write!(f, "({})", self.0.join(" "))
	}
}

/// Splits a token sequence into `(context, event)` pairs for an order-`n` model.
///
/// For every index `i` in `n-1..samples.len()`, the event is `samples[i]`
/// and the context is the window `samples[i-(n-1)..i]` (the null context
/// when `n == 1`). Exactly `max(0, len - n + 1)` pairs are produced.
///
/// # Errors
/// Returns [`NGramError::InvalidArgument`] if `n < 1`.
pub fn extract<S: AsRef<str>>(samples: &[S], n: usize) -> Result<Vec<(Context, Token)>> {
	if n < 1 {
		return Err(NGramError::InvalidArgument("n must be >= 1".to_owned()));
	}
	if samples.len() < n {
		return Ok(Vec::new());
	}

	let pairs = (n - 1..samples.len())
		.map(|i| {
			let context = if n == 1 {
				Context::null()
			} else {
				Context::new(samples[i - (n - 1)..i].iter().map(|s| s.as_ref()))
			};
			(context, samples[i].as_ref().to_owned())
		})
		.collect();

	Ok(pairs)
}
