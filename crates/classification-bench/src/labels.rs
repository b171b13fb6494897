use std::fs;
use std::path::Path;
use crate::error::BenchError;

/// Reads a synset file, one label per line. The line number is the class id.
pub fn load_labels<A: AsRef<Path>>(path: A) -> Result<Vec<String>, BenchError> {
	let path = path.as_ref();
	let labels: Vec<String> = fs::read_to_string(path)?
		.lines()
		.map(|line| line.trim_end().to_string())
		.collect();

	if labels.iter().all(|label| label.is_empty()) {
		return Err(BenchError::NoLabels(path.to_path_buf()));
	}

	Ok(labels)
}
