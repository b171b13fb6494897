use std::path::{Path, PathBuf};
use log::debug;
use crate::error::BenchError;

const EXTENSIONS: [&str; 2] = [".JPG", ".JPEG"];

fn is_jpeg(path: &Path) -> bool {
	let name = path.to_string_lossy().to_uppercase();
	EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Lists the JPEG files directly inside `dir` in name order and returns the
/// window `[skip, skip + count)`, clamped to the files that exist.
pub fn list_images<A: AsRef<Path>>(dir: A, skip: usize, count: usize) -> Result<Vec<PathBuf>, BenchError> {
	let mut all_images = Vec::new();

	for entry in dir.as_ref().read_dir()? {
		let path = entry?.path();
		if path.is_file() && is_jpeg(&path) {
			all_images.push(path);
		}
	}

	all_images.sort();
	debug!("Found {} images in {:?}", all_images.len(), dir.as_ref());

	Ok(all_images.into_iter().skip(skip).take(count).collect())
}

/// Fails unless `images` holds at least `needed` files.
pub fn ensure_enough<A: AsRef<Path>>(images: &[PathBuf], needed: usize, dir: A) -> Result<(), BenchError> {
	if images.len() < needed {
		return Err(BenchError::NotEnoughImages {
			dir: dir.as_ref().to_path_buf(),
			needed,
			found: images.len(),
		});
	}

	Ok(())
}
