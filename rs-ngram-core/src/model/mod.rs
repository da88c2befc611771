//! Top-level module for the n-gram language model.
//!
//! This module provides a word-level statistical language model, including:
//! - Context extraction from token sequences (`context`)
//! - Conditional frequency counting (`freq_dist`)
//! - Maximum-likelihood and additive-smoothing estimators (`prob_dist`)
//! - The model itself: lookup, enumeration and generation (`ngram_model`)
//! - Kullback-Leibler evaluation of smoothed models (`divergence`)

/// Tokens, contexts, and the split of a corpus into `(context, event)` pairs.
pub mod context;

/// Event counts per context.
///
/// Supports merging and compact binary persistence.
pub mod freq_dist;

/// Probability estimators over one context's counts.
pub mod prob_dist;

/// Word n-gram model (`n >= 1`).
///
/// Handles training, probability lookup, enumeration of the support,
/// stochastic generation, merging and persistence.
pub mod ngram_model;

/// KL divergence between two models and the smoothing sweep built on it.
pub mod divergence;
