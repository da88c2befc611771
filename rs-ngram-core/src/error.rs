//! Error type shared by every part of the crate.

use crate::model::context::Context;

/// Errors that can occur while building, querying or persisting n-gram models.
///
/// Unseen contexts and events are not errors: they have a defined
/// probability of zero. Only structurally invalid arguments, undefined
/// divergences and I/O failures are reported here.
#[derive(Debug, thiserror::Error)]
pub enum NGramError {
	/// A construction argument is outside its valid domain (`n < 1`, NaN gamma, ...).
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The candidate model gives zero probability to an event the reference supports.
	#[error("divergence is infinite: candidate assigns zero probability to {event:?} after {context}")]
	Domain { context: Context, event: String },

	/// Two tables or models of different order were combined.
	#[error("order mismatch: expected n = {expected}, found n = {found}")]
	OrderMismatch { expected: usize, found: usize },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),

	#[error("configuration error: {0}")]
	Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, NGramError>;
