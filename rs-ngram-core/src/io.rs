use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::io;

use log::{debug, info};

use crate::error::Result;
use crate::model::context::Token;
use crate::model::freq_dist::ConditionalFreqDist;

/// Splits `text` on whitespace, optionally lower-casing every token.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<Token> {
	text.split_whitespace()
		.map(|word| if lowercase { word.to_lowercase() } else { word.to_owned() })
		.collect()
}

/// Reads a text file and returns its whitespace-separated tokens.
///
/// - Reads the entire file into memory
/// - Line breaks are ordinary separators
pub fn read_tokens<P: AsRef<Path>>(filename: P, lowercase: bool) -> io::Result<Vec<Token>> {
	let mut contents = String::new();
	File::open(&filename)?.read_to_string(&mut contents)?;
	let tokens = tokenize(&contents, lowercase);
	debug!("Read {} tokens from {}", tokens.len(), filename.as_ref().display());
	Ok(tokens)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"2.bin"` → `data/input.2.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Cache extension for order-`n` counts: `<n>.lc.bin` when lower-cased,
/// `<n>.cs.bin` (case-sensitive) otherwise.
fn cache_extension(n: usize, lowercase: bool) -> String {
	format!("{}.{}.bin", n, if lowercase { "lc" } else { "cs" })
}

/// Loads the order-`n` counts of a corpus file, reusing a binary cache.
///
/// - The cache lives next to the corpus (`corpus.txt` → `corpus.2.lc.bin`)
/// - If the cache exists, it is decoded with `postcard`
/// - Otherwise the corpus is read, counted, and the cache is written
pub fn load_or_build_counts<P: AsRef<Path>>(corpus_path: P, n: usize, lowercase: bool) -> Result<ConditionalFreqDist> {
	let binary_data_path = build_output_path(&corpus_path, &cache_extension(n, lowercase))?;
	if binary_data_path.exists() {
		info!("Loading cached counts from {}", binary_data_path.display());
		return ConditionalFreqDist::load(&binary_data_path);
	}

	let tokens = read_tokens(&corpus_path, lowercase)?;
	let cfd = ConditionalFreqDist::from_samples(&tokens, n)?;
	cfd.save(&binary_data_path)?;
	Ok(cfd)
}

/// Order-`n` counts of a corpus file (through the cache), or of the
/// `fallback` tokens when no file is given.
pub fn load_counts(
	corpus_path: Option<&Path>,
	n: usize,
	lowercase: bool,
	fallback: fn() -> Vec<Token>,
) -> Result<ConditionalFreqDist> {
	match corpus_path {
		Some(path) => load_or_build_counts(path, n, lowercase),
		None => ConditionalFreqDist::from_samples(&fallback(), n),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::context::Context;

	#[test]
	fn test_tokenize() {
		assert_eq!(tokenize("Oh  Rio\nrio dance", true), vec!["oh", "rio", "rio", "dance"]);
		assert_eq!(tokenize("Oh Rio", false), vec!["Oh", "Rio"]);
		assert!(tokenize("   ", true).is_empty());
	}

	#[test]
	fn test_build_output_path() {
		let path = build_output_path("data/lyrics.txt", "2.bin").unwrap();
		assert_eq!(path, PathBuf::from("data/lyrics.2.bin"));
	}

	#[test]
	fn test_load_or_build_counts_writes_cache() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("lyrics.txt");
		std::fs::write(&corpus, "Oh Rio Rio dance").unwrap();

		let built = load_or_build_counts(&corpus, 2, true).unwrap();
		assert!(dir.path().join("lyrics.2.lc.bin").exists());

		// Changing the corpus does not matter once the cache exists
		std::fs::write(&corpus, "something else entirely").unwrap();
		let cached = load_or_build_counts(&corpus, 2, true).unwrap();
		assert_eq!(built, cached);
		assert_eq!(cached.total(), 3);
	}

	#[test]
	fn test_case_flag_selects_its_own_cache() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("lyrics.txt");
		std::fs::write(&corpus, "Rio rio").unwrap();

		let lower = load_or_build_counts(&corpus, 1, true).unwrap();
		let exact = load_or_build_counts(&corpus, 1, false).unwrap();
		assert!(dir.path().join("lyrics.1.lc.bin").exists());
		assert!(dir.path().join("lyrics.1.cs.bin").exists());
		assert_eq!(lower.table_for(&Context::null()).count("rio"), 2);
		assert_eq!(exact.table_for(&Context::null()).count("rio"), 1);
		assert_eq!(exact.table_for(&Context::null()).count("Rio"), 1);
	}

	#[test]
	fn test_load_counts_fallback() {
		let counts = load_counts(None, 2, true, || tokenize("oh rio rio dance", true)).unwrap();
		assert_eq!(counts.total(), 3);
	}
}
