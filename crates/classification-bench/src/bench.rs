use std::io::Write;
use std::path::PathBuf;
use burn::prelude::Backend;
use log::debug;
use serde::Serialize;
use crate::classifier::Classifier;
use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::images::ensure_enough;
use crate::timers::{TimerKind, Timers};

/// Totals of one benchmark run. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchStats {
	/// Images whose classification time went into the average.
	pub images_processed: usize,
	pub load_total: f64,
	pub classify_total: f64,
	pub first_batch_excluded: bool,
}

impl BenchStats {
	pub fn classify_avg(&self) -> f64 {
		if self.images_processed == 0 {
			return 0.0;
		}
		self.classify_total / self.images_processed as f64
	}
}

/// Prints the files and batch layout a run is about to use.
pub fn header<W: Write>(config: &BenchConfig, out: &mut W) -> Result<(), BenchError> {
	writeln!(out, "Model file: {}", config.model_file.display())?;
	writeln!(out, "Weights file: {}", config.weights_file)?;
	writeln!(out, "Mean file: {}", config.mean_file().display())?;
	writeln!(out, "Labels file: {}", config.labels_file().display())?;
	writeln!(out, "Images dir: {}", config.images_dir.display())?;
	writeln!(out, "Batch count: {}", config.batch_count)?;
	writeln!(out, "Batch size: {}", config.batch_size)?;

	Ok(())
}

pub fn initialised<W: Write>(seconds: f64, out: &mut W) -> Result<(), BenchError> {
	writeln!(out, "Classifier initialised in {seconds:.6}s")?;

	Ok(())
}

/// Reports a failed run. The message is the error's display text.
pub fn fail<W: Write>(err: &BenchError, out: &mut W) {
	let _ = writeln!(out, "{err}");
}

/// Classifies `batch_count * batch_size` images one at a time, printing the
/// top predictions of each. With more than one batch the first one only warms up.
pub fn run<B: Backend, W: Write>(
	config: &BenchConfig,
	classifier: &Classifier<B>,
	images: &[PathBuf],
	timers: &mut Timers,
	out: &mut W,
) -> Result<BenchStats, BenchError> {
	ensure_enough(images, config.images_count(), &config.images_dir)?;

	let mut stats = BenchStats {
		first_batch_excluded: config.batch_count > 1,
		..Default::default()
	};
	let mut image_index = 0;

	for batch_index in 0..config.batch_count {
		writeln!(out, "Batch {batch_index}")?;

		for _ in 0..config.batch_size {
			let path = &images[image_index];

			timers.start(TimerKind::LoadImage);
			let img = image::open(path).map_err(|source| BenchError::Decode { path: path.clone(), source })?;
			let input = classifier.prepare_image(&img);
			stats.load_total += timers.stop(TimerKind::LoadImage).as_secs_f64();

			timers.start(TimerKind::ClassifyImage);
			let probs = classifier.predict(input)?;
			let classify_time = timers.stop(TimerKind::ClassifyImage).as_secs_f64();
			debug!("{:?}: loaded in {:.4}s, classified in {:.4}s", path, timers.get(TimerKind::LoadImage), classify_time);

			for prediction in classifier.process_predictions(&probs) {
				writeln!(out, "{:.4} - \"{}\"", prediction.probability, prediction.label)?;
			}

			if batch_index > 0 || config.batch_count == 1 {
				stats.classify_total += classify_time;
				stats.images_processed += 1;
			}

			image_index += 1;
		}
	}

	Ok(stats)
}

/// Prints the closing summary of a run.
pub fn report<W: Write>(stats: &BenchStats, out: &mut W) -> Result<(), BenchError> {
	writeln!(out)?;
	writeln!(out, "Images processed: {}", stats.images_processed)?;
	writeln!(out, "All images loaded in {:.4}s", stats.load_total)?;
	writeln!(out, "All images classified in {:.4}s", stats.classify_total)?;
	write!(out, "Average classification time: {:.4}s", stats.classify_avg())?;
	if stats.first_batch_excluded {
		write!(out, " (first batch excluded)")?;
	}
	writeln!(out)?;

	Ok(())
}
