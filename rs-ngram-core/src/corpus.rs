//! Two verses of "Rio", used as a small train/test corpus pair.

use crate::io::tokenize;
use crate::model::context::Token;

pub const RIO_TRAIN: &str = "Her name is Rio and she dances on the sand
Just like that river twists across a dusty land
And when she shines she really shows you all she can
Oh Rio Rio dance across the Rio Grande";

pub const RIO_TEST: &str = "Her name is Rio she don't need to understand
I might find her if I'm looking like I can
Oh Rio Rio hear them shout across the land
From mountains in the North down to the Rio Grande";

/// Lower-cased training verse.
pub fn rio_train() -> Vec<Token> {
	tokenize(RIO_TRAIN, true)
}

/// Lower-cased test verse.
pub fn rio_test() -> Vec<Token> {
	tokenize(RIO_TEST, true)
}

/// Training verse followed by the test verse.
pub fn rio_full() -> Vec<Token> {
	let mut full = rio_train();
	full.extend(rio_test());
	full
}
