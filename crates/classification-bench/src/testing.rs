//! Small on-disk model, mean file, labels and images for tests.

use std::fs;
use std::path::PathBuf;
use burn::backend::NdArray;
use burn::config::Config;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use image::{Rgb, RgbImage};
use log::LevelFilter;
use tempfile::TempDir;
use crate::classifier::Classifier;
use crate::config::{BenchConfig, DeviceSpec};
use crate::imagenet::MeanConfig;
use crate::model::{Architecture, NetworkConfig, ResNet};

pub type TestBackend = NdArray<f32>;

pub struct Fixture {
	dir: TempDir,
}

impl Fixture {
	/// A randomly initialised resnet18 with `num_classes` outputs and a 32x32 input.
	pub fn new(num_classes: usize) -> Self {
		let fixture = Self { dir: TempDir::new().unwrap() };
		let device = Default::default();

		let network = NetworkConfig::new(Architecture::ResNet18)
			.with_num_classes(num_classes)
			.with_input_size(32);
		network.save(fixture.model_file()).unwrap();

		ResNet::<TestBackend>::new(&network, &device)
			.save_file(fixture.weights_file(), &NamedMpkFileRecorder::<FullPrecisionSettings>::new())
			.unwrap();

		fs::create_dir(fixture.aux_dir()).unwrap();
		MeanConfig::new().save(fixture.mean_file()).unwrap();
		fixture.write_labels(num_classes);

		fs::create_dir(fixture.images_dir()).unwrap();
		fixture
	}

	pub fn model_file(&self) -> PathBuf {
		self.dir.path().join("resnet18.json")
	}

	pub fn weights_file(&self) -> String {
		self.dir.path().join("resnet18.mpk").to_string_lossy().into_owned()
	}

	pub fn aux_dir(&self) -> PathBuf {
		self.dir.path().join("aux")
	}

	pub fn mean_file(&self) -> PathBuf {
		self.aux_dir().join(crate::config::MEAN_FILE_NAME)
	}

	pub fn labels_file(&self) -> PathBuf {
		self.aux_dir().join(crate::config::LABELS_FILE_NAME)
	}

	pub fn images_dir(&self) -> PathBuf {
		self.dir.path().join("val")
	}

	pub fn write_labels(&self, count: usize) {
		let labels: String = (0..count)
			.map(|i| format!("n{i:08} class {i}\n"))
			.collect();
		fs::write(self.labels_file(), labels).unwrap();
	}

	pub fn write_images(&self, count: usize) {
		for i in 0..count {
			let shade = (i * 40 % 256) as u8;
			let img = RgbImage::from_fn(48, 40, |x, y| Rgb([shade, (x * 5) as u8, (y * 6) as u8]));
			img.save(self.images_dir().join(format!("img-{i:03}.jpg"))).unwrap();
		}
	}

	pub fn classifier(&self, top_n: usize) -> Classifier<TestBackend> {
		Classifier::new(
			&self.model_file(),
			&self.weights_file(),
			&self.mean_file(),
			&self.labels_file(),
			top_n,
			&Default::default(),
		)
		.unwrap()
	}

	pub fn bench_config(&self, batch_count: usize, batch_size: usize) -> BenchConfig {
		BenchConfig {
			batch_count,
			batch_size,
			skip_images: 0,
			images_dir: self.images_dir(),
			model_file: self.model_file(),
			weights_file: self.weights_file(),
			aux_dir: self.aux_dir(),
			top_n: 2,
			device: DeviceSpec::Cpu,
			timer_file: None,
			log_level: LevelFilter::Off,
		}
	}
}
