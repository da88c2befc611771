use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use rs_ngram_core::config::NGramConfig;
use rs_ngram_core::corpus::{rio_test, rio_train};
use rs_ngram_core::io::{load_counts, load_or_build_counts};
use rs_ngram_core::{sweep_tables, ConditionalFreqDist, Context, NGramModel, Token};

/// Query parameters for `/v1/probability`
#[derive(Deserialize)]
struct ProbabilityParams {
	/// Space separated context tokens (empty for order-1 models)
	context: Option<String>,
	event: String,
	smoothed: Option<bool>,
}

/// Query parameters for `/v1/items`
#[derive(Deserialize)]
struct ItemsParams {
	smoothed: Option<bool>,
}

/// Query parameters for `/v1/generate`
#[derive(Deserialize)]
struct GenerateParams {
	max_length: Option<usize>,
	/// Space separated seed tokens
	seed: Option<String>,
	/// Seed of the random generator
	rng_seed: Option<u64>,
}

/// Query parameters for `/v1/sweep`
#[derive(Deserialize)]
struct SweepParams {
	gamma_min: Option<usize>,
	gamma_max: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	train: Option<String>,
	test: Option<String>,
}

#[derive(Serialize)]
struct ItemResponse<'a> {
	context: &'a [Token],
	event: &'a str,
	probability: f64,
}

/// Corpus counts and the models built on them.
struct SharedData {
	config: NGramConfig,
	train: ConditionalFreqDist,
	test: ConditionalFreqDist,
	/// Training and test counts together, the smoothing reference
	full: ConditionalFreqDist,
	/// Maximum-likelihood model of the training corpus
	model: NGramModel,
	/// Training model smoothed against training + test
	smoothed: NGramModel,
}

impl SharedData {
	/// Builds both models from the given counts.
	fn new(config: NGramConfig, train: ConditionalFreqDist, test: ConditionalFreqDist) -> rs_ngram_core::Result<Self> {
		let full = train.union(&test);
		let model = NGramModel::from_tables(config.n, train.clone(), None, config.gamma)?;
		let smoothed = NGramModel::from_tables(config.n, train.clone(), Some(full.clone()), config.gamma)?;
		info!("Built {}-gram models from {} training pairs", config.n, train.total());
		Ok(Self { config, train, test, full, model, smoothed })
	}

	fn select(&self, smoothed: bool) -> &NGramModel {
		if smoothed { &self.smoothed } else { &self.model }
	}
}

fn split(tokens: Option<&str>) -> Vec<&str> {
	tokens.map(|s| s.split_whitespace().collect()).unwrap_or_default()
}

/// HTTP GET endpoint `/v1/probability`
///
/// Returns `P(event | context)` as plain text.
#[get("/v1/probability")]
async fn get_probability(data: web::Data<Mutex<SharedData>>, query: web::Query<ProbabilityParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let context = Context::new(split(query.context.as_deref()));
	let probability = shared_data.select(query.smoothed.unwrap_or(false)).probability(&context, &query.event);
	HttpResponse::Ok().body(probability.to_string())
}

/// HTTP GET endpoint `/v1/items`
///
/// Returns every `(context, event, probability)` of a model as JSON.
#[get("/v1/items")]
async fn get_items(data: web::Data<Mutex<SharedData>>, query: web::Query<ItemsParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let items: Vec<ItemResponse> = shared_data
		.select(query.smoothed.unwrap_or(false))
		.items()
		.into_iter()
		.map(|(context, event, probability)| ItemResponse { context: context.tokens(), event, probability })
		.collect();
	HttpResponse::Ok().json(items)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sentence from the unsmoothed model.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let max_length = query.max_length.unwrap_or(shared_data.config.max_length);
	let seed = split(query.seed.as_deref());
	let mut rng = match query.rng_seed {
		Some(rng_seed) => StdRng::seed_from_u64(rng_seed),
		None => StdRng::from_os_rng(),
	};
	let generated = shared_data.model.generate(max_length, &seed, &mut rng);
	HttpResponse::Ok().body(generated.join(" "))
}

/// HTTP GET endpoint `/v1/sweep`
///
/// Returns the KL divergence curve of the smoothing sweep as JSON.
#[get("/v1/sweep")]
async fn get_sweep(data: web::Data<Mutex<SharedData>>, query: web::Query<SweepParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let gamma_min = query.gamma_min.unwrap_or(shared_data.config.gamma_min);
	let gamma_max = query.gamma_max.unwrap_or(shared_data.config.gamma_max);
	match sweep_tables(&shared_data.full, &shared_data.train, &shared_data.test, shared_data.config.n, gamma_min, gamma_max) {
		Ok(points) => HttpResponse::Ok().json(points),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// HTTP PUT endpoint `/v1/load_corpus`
///
/// Replaces the training and/or test corpus and retrains both models.
#[put("/v1/load_corpus")]
async fn put_corpus(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let (n, lowercase) = (shared_data.config.n, shared_data.config.lowercase);

	let train = match &query.train {
		Some(path) => match load_or_build_counts(path, n, lowercase) {
			Ok(counts) => counts,
			Err(e) => return HttpResponse::BadRequest().body(format!("Failed to read corpus: {e}")),
		},
		None => shared_data.train.clone(),
	};
	let test = match &query.test {
		Some(path) => match load_or_build_counts(path, n, lowercase) {
			Ok(counts) => counts,
			Err(e) => return HttpResponse::BadRequest().body(format!("Failed to read corpus: {e}")),
		},
		None => shared_data.test.clone(),
	};

	match SharedData::new(shared_data.config.clone(), train, test) {
		Ok(new_data) => {
			*shared_data = new_data;
			HttpResponse::Ok().body("Corpus loaded successfully")
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to train model: {e}")),
	}
}

/// Main entry point for the server.
///
/// Reads `ngram.toml` (or the path given as first argument), trains the
/// models, wraps them in a `Mutex`, and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| "ngram.toml".to_owned());
	let config = NGramConfig::load(&config_path).map_err(std::io::Error::other)?;
	let train = load_counts(config.train.as_deref(), config.n, config.lowercase, rio_train).map_err(std::io::Error::other)?;
	let test = load_counts(config.test.as_deref(), config.n, config.lowercase, rio_test).map_err(std::io::Error::other)?;
	let bind = config.bind.clone();

	let shared_data = SharedData::new(config, train, test).map_err(|e| {
		error!("Failed to train models: {e}");
		std::io::Error::other(e)
	})?;
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Listening on {}", bind);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_probability)
			.service(get_items)
			.service(get_generated)
			.service(get_sweep)
			.service(put_corpus)
	})
		.bind(bind)?
		.run()
		.await
}
