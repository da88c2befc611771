use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NGramError, Result};

/// Settings shared by the driver and the server.
///
/// Every field has a default, so a configuration file only lists what it changes:
///
/// ```toml
/// n = 3
/// gamma_max = 10
/// train = "data/train.txt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NGramConfig {
	/// Model order (context length + 1)
	pub n: usize,
	/// Additive smoothing constant of single smoothed models
	pub gamma: f64,
	/// Maximum number of generated tokens
	pub max_length: usize,
	/// First `i` of the sweep (`gamma = 1/i`)
	pub gamma_min: usize,
	/// Last `i` of the sweep, inclusive
	pub gamma_max: usize,
	/// Lower-case corpora before modelling
	pub lowercase: bool,
	/// Training corpus (built-in corpus if unset)
	pub train: Option<PathBuf>,
	/// Test corpus for the sweep (built-in corpus if unset)
	pub test: Option<PathBuf>,
	/// Server bind address
	pub bind: String,
}

impl Default for NGramConfig {
	fn default() -> Self {
		Self {
			n: 2,
			gamma: 1.0,
			max_length: 10,
			gamma_min: 1,
			gamma_max: 4,
			lowercase: true,
			train: None,
			test: None,
			bind: "127.0.0.1:5000".to_owned(),
		}
	}
}

impl NGramConfig {
	/// Parses a TOML document. Missing keys keep their default value.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let config: Self = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads the configuration file at `path`.
	///
	/// Falls back to the defaults if the file does not exist.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			warn!("Config file {} not found, using defaults", path.display());
			return Ok(Self::default());
		}
		let content = std::fs::read_to_string(path)?;
		let config = Self::from_toml_str(&content)?;
		debug!("Loaded config from {}: {:?}", path.display(), config);
		Ok(config)
	}

	/// Checks the values a model could not be built from.
	pub fn validate(&self) -> Result<()> {
		if self.n < 1 {
			return Err(NGramError::InvalidArgument("n must be >= 1".to_owned()));
		}
		if !self.gamma.is_finite() {
			return Err(NGramError::InvalidArgument(format!("gamma must be a finite number, got {}", self.gamma)));
		}
		if self.gamma_min == 0 {
			return Err(NGramError::InvalidArgument("gamma_min must be >= 1 (gamma = 1/i)".to_owned()));
		}
		Ok(())
	}
}
