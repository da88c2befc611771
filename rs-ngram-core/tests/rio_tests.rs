use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_ngram_core::corpus::{rio_full, rio_test, rio_train, RIO_TEST, RIO_TRAIN};
use rs_ngram_core::io::load_counts;
use rs_ngram_core::model::context::extract;
use rs_ngram_core::{kl_divergence, sweep, sweep_tables, ConditionalFreqDist, Context, NGramError, NGramModel};

#[test]
fn test_demo_extraction() {
	let samples = ["oh", "rio", "rio", "dance"];
	let pairs = extract(&samples, 2).unwrap();
	let expected = vec![
		(Context::from(["oh"]), "rio".to_owned()),
		(Context::from(["rio"]), "rio".to_owned()),
		(Context::from(["rio"]), "dance".to_owned()),
	];
	assert_eq!(pairs, expected);

	let model = NGramModel::new(&samples, 2).unwrap();
	assert_eq!(model.probability(&Context::from(["rio"]), "rio"), 0.5);
}

#[test]
fn test_mle_sums_to_one_per_context() {
	let model = NGramModel::new(&rio_train(), 2).unwrap();
	for (context, table) in model.table().iter() {
		let sum: f64 = table.events().map(|event| model.probability(context, event)).sum();
		assert!((sum - 1.0).abs() < 1e-9, "context {} sums to {}", context, sum);
	}
	let unseen = Context::from(["zebra"]);
	let sum: f64 = ["rio", "she", "the"].iter().map(|e| model.probability(&unseen, e)).sum();
	assert_eq!(sum, 0.0);
}

#[test]
fn test_smoothed_sums_to_one_over_reference_vocabulary() {
	let full = rio_full();
	let model = NGramModel::smoothed(&rio_train(), 2, &full, 0.5).unwrap();
	let reference = model.reference_table().unwrap();
	for (context, _) in model.table().iter() {
		let sum: f64 = reference
			.table_for(context)
			.events()
			.map(|event| model.probability(context, event))
			.sum();
		assert!((sum - 1.0).abs() < 1e-9, "context {} sums to {}", context, sum);
	}
}

#[test]
fn test_smoothed_items_are_the_training_support() {
	let model = NGramModel::smoothed(&rio_train(), 2, &rio_full(), 1.0).unwrap();
	let items = model.items();
	assert_eq!(items.len(), model.table().iter().map(|(_, table)| table.bins()).sum::<usize>());
	assert!(items.iter().all(|(_, _, probability)| *probability > 0.0 && *probability <= 1.0));
}

#[test]
fn test_rio_sweep() {
	let points = sweep(&rio_full(), &rio_train(), &rio_test(), 2, 1, 4).unwrap();
	assert_eq!(points.len(), 4);
	let gammas: Vec<f64> = points.iter().map(|p| p.gamma).collect();
	assert_eq!(gammas, vec![1.0, 0.5, 1.0 / 3.0, 0.25]);
	for point in &points {
		assert!(point.divergence.is_finite());
		assert!(point.divergence > 0.0);
	}

	// Each point is the divergence of a freshly built model
	let reference = NGramModel::new(&rio_test(), 2).unwrap();
	let smoothed = NGramModel::smoothed(&rio_train(), 2, &rio_full(), 0.5).unwrap();
	let divergence = kl_divergence(&reference, &smoothed).unwrap();
	assert!((divergence - points[1].divergence).abs() < 1e-12);
}

#[test]
fn test_unsmoothed_candidate_has_infinite_divergence() {
	let reference = NGramModel::new(&rio_test(), 2).unwrap();
	let candidate = NGramModel::new(&rio_train(), 2).unwrap();
	assert!(matches!(kl_divergence(&reference, &candidate), Err(NGramError::Domain { .. })));
}

#[test]
fn test_generate_length_bounds() {
	let model = NGramModel::new(&rio_train(), 2).unwrap();
	for seed in 0..50 {
		let mut rng = StdRng::seed_from_u64(seed);
		let generated = model.generate(8, &["oh"], &mut rng);
		assert!(generated.len() <= 8);
		assert!(!generated.is_empty());
		assert_eq!(generated[0], "oh");
		// Every step follows an observed transition
		for window in generated.windows(2) {
			let context = Context::from([window[0].as_str()]);
			assert!(model.probability(&context, &window[1]) > 0.0);
		}
		if generated.len() < 8 {
			let last = Context::from([generated[generated.len() - 1].as_str()]);
			assert!(model.table().table_for(&last).is_empty());
		}
	}
}

#[test]
fn test_trigram_generation_needs_full_context() {
	let model = NGramModel::new(&rio_train(), 3).unwrap();
	// A one-token seed is shorter than the trigram context
	let generated = model.generate(5, &["oh"], &mut StdRng::seed_from_u64(5));
	assert_eq!(generated, vec!["oh".to_owned()]);

	let generated = model.generate(5, &["oh", "rio"], &mut StdRng::seed_from_u64(5));
	assert_eq!(generated.len(), 5);
	assert_eq!(generated[2], "rio");
}

#[test]
fn test_model_persistence() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("rio.bin");

	let model = NGramModel::smoothed(&rio_train(), 2, &rio_full(), 0.25).unwrap();
	model.save(&path).unwrap();
	let restored = NGramModel::load(&path).unwrap();

	assert_eq!(model, restored);
	assert_eq!(restored.order(), 2);
	assert_eq!(restored.gamma(), 0.25);
	assert!(restored.is_smoothed());
	for (context, event, probability) in model.items() {
		assert_eq!(restored.probability(context, event), probability);
	}
}

#[test]
fn test_counts_persistence() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("counts.bin");

	let cfd = ConditionalFreqDist::from_samples(&rio_full(), 2).unwrap();
	cfd.save(&path).unwrap();
	let restored = ConditionalFreqDist::load(&path).unwrap();
	assert_eq!(cfd, restored);
	assert_eq!(restored.total(), rio_full().len() - 1);
}

#[test]
fn test_corrupted_model_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("broken.bin");
	std::fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
	assert!(matches!(NGramModel::load(&path), Err(NGramError::Serialization(_))));
	assert!(matches!(NGramModel::load(dir.path().join("missing.bin")), Err(NGramError::Io(_))));
}

#[test]
fn test_sweep_from_cached_corpus_files() {
	let dir = tempfile::tempdir().unwrap();
	let train_path = dir.path().join("train.txt");
	let test_path = dir.path().join("test.txt");
	std::fs::write(&train_path, RIO_TRAIN).unwrap();
	std::fs::write(&test_path, RIO_TEST).unwrap();

	let train = load_counts(Some(train_path.as_path()), 2, true, rio_train).unwrap();
	let test = load_counts(Some(test_path.as_path()), 2, true, rio_test).unwrap();
	assert!(dir.path().join("train.2.lc.bin").exists());
	assert!(dir.path().join("test.2.lc.bin").exists());
	assert_eq!(train, ConditionalFreqDist::from_samples(&rio_train(), 2).unwrap());

	// Second run decodes the caches instead of recounting
	let cached_train = load_counts(Some(train_path.as_path()), 2, true, rio_train).unwrap();
	assert_eq!(train, cached_train);

	let full = train.union(&test);
	let points = sweep_tables(&full, &train, &test, 2, 1, 4).unwrap();
	assert_eq!(points.len(), 4);
	assert!(points.iter().all(|p| p.divergence.is_finite() && p.divergence > 0.0));
}
