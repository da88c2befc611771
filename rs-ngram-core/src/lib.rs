//! N-gram language modelling library.
//!
//! This crate provides a word-level n-gram system including:
//! - Maximum-likelihood and additive ("add-gamma") smoothed estimation
//! - Text generation by sampling the learnt distribution
//! - Model evaluation through Kullback-Leibler divergence sweeps
//! - Binary persistence of counts, TOML configuration and corpus loading

/// Core n-gram models, estimators and evaluation.
pub mod model;

/// Crate-wide error type.
pub mod error;

/// Runtime configuration (model order, smoothing, sweep range, corpora).
pub mod config;

/// Built-in demonstration corpus.
pub mod corpus;

/// I/O utilities (corpus loading, path helpers, count caching).
pub mod io;

pub use error::{NGramError, Result};
pub use model::context::{Context, Token};
pub use model::divergence::{kl_divergence, sweep, sweep_tables, SweepPoint};
pub use model::freq_dist::{ConditionalFreqDist, FreqDist};
pub use model::ngram_model::NGramModel;
pub use model::prob_dist::ProbDist;
