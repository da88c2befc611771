use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_ngram_core::config::NGramConfig;
use rs_ngram_core::corpus::{rio_test, rio_train};
use rs_ngram_core::io::load_counts;
use rs_ngram_core::model::context::extract;
use rs_ngram_core::{sweep_tables, Context, NGramModel};

/// Trains n-gram models on a pair of corpora and prints what they learnt.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// TOML configuration file (missing file = defaults)
	#[arg(short, long, default_value = "ngram.toml")]
	config: PathBuf,

	/// Model order, overrides the config file
	#[arg(short)]
	n: Option<usize>,

	/// Training corpus, overrides the config file
	#[arg(long)]
	train: Option<PathBuf>,

	/// Test corpus, overrides the config file
	#[arg(long)]
	test: Option<PathBuf>,

	/// First `i` of the sweep (gamma = 1/i)
	#[arg(long)]
	gamma_min: Option<usize>,

	/// Last `i` of the sweep, inclusive
	#[arg(long)]
	gamma_max: Option<usize>,

	/// Number of sentences to generate
	#[arg(long, default_value_t = 4)]
	sentences: usize,

	/// Seed of the random generator, for reproducible output
	#[arg(long)]
	seed: Option<u64>,
}

impl Args {
	/// Applies command line overrides on top of the configuration file.
	fn into_config(self) -> Result<(NGramConfig, usize, Option<u64>), Box<dyn std::error::Error>> {
		let mut config = NGramConfig::load(&self.config)?;
		if let Some(n) = self.n { config.n = n; }
		if let Some(train) = self.train { config.train = Some(train); }
		if let Some(test) = self.test { config.test = Some(test); }
		if let Some(gamma_min) = self.gamma_min { config.gamma_min = gamma_min; }
		if let Some(gamma_max) = self.gamma_max { config.gamma_max = gamma_max; }
		config.validate()?;
		Ok((config, self.sentences, self.seed))
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	let (config, sentences, seed) = Args::parse().into_config()?;
	let mut rng = match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	// Toy corpus: extraction, lookup, enumeration and generation
	let samples = ["oh", "rio", "rio", "dance"];
	println!("{:?}", extract(&samples, 2)?);
	println!();

	let model = NGramModel::new(&samples, 2)?;
	println!("{}", model.probability(&Context::from(["rio"]), "rio"));
	for (context, event, probability) in model.items() {
		println!("{} -> {}: {}", context, event, probability);
	}
	for _ in 0..sentences {
		println!("{}", model.generate(4, &["oh"], &mut rng).join(" "));
	}
	println!();

	// Smoothing sweep: train vs test, smoothed against both
	// Corpus files go through the `.bin` count cache
	let train = load_counts(config.train.as_deref(), config.n, config.lowercase, rio_train)?;
	let test = load_counts(config.test.as_deref(), config.n, config.lowercase, rio_test)?;
	let full = train.union(&test);
	info!("Corpora: {} training pairs, {} test pairs", train.total(), test.total());

	let trained = NGramModel::from_tables(config.n, train.clone(), None, config.gamma)?;
	let seed_context = match trained.table().iter().next() {
		Some((context, _)) => context.tokens().to_vec(),
		None => Vec::new(),
	};
	println!("{}", trained.generate(config.max_length, &seed_context, &mut rng).join(" "));

	for point in sweep_tables(&full, &train, &test, config.n, config.gamma_min, config.gamma_max)? {
		println!("gamma = {:.4}\tKL = {:.6}", point.gamma, point.divergence);
	}

	Ok(())
}
