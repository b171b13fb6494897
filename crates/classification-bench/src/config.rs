use std::path::PathBuf;
use std::str::FromStr;
use log::LevelFilter;
use crate::error::BenchError;

pub const MEAN_FILE_NAME: &str = "imagenet_mean.json";
pub const LABELS_FILE_NAME: &str = "synset_words.txt";
const DEFAULT_TIMER_FILE: &str = "tmp-ck-timer.json";

/// Where the network runs. `Auto` picks the first CUDA device when one is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSpec {
	Auto,
	Cpu,
	Cuda(usize),
	Mps,
}

impl FromStr for DeviceSpec {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"" | "auto" => Ok(DeviceSpec::Auto),
			"cpu" => Ok(DeviceSpec::Cpu),
			"cuda" | "gpu" => Ok(DeviceSpec::Cuda(0)),
			"mps" => Ok(DeviceSpec::Mps),
			other => other
				.strip_prefix("cuda:")
				.and_then(|index| index.parse().ok())
				.map(DeviceSpec::Cuda)
				.ok_or(()),
		}
	}
}

/// Run parameters, read from the `CK_*` environment.
#[derive(Debug, Clone)]
pub struct BenchConfig {
	pub batch_count: usize,
	pub batch_size: usize,
	pub skip_images: usize,
	pub images_dir: PathBuf,
	pub model_file: PathBuf,
	/// Kept as a string since it may also be an URL.
	pub weights_file: String,
	pub aux_dir: PathBuf,
	pub top_n: usize,
	pub device: DeviceSpec,
	pub timer_file: Option<PathBuf>,
	pub log_level: LevelFilter,
}

impl BenchConfig {
	pub fn from_env() -> Result<Self, BenchError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, BenchError> {
		let timer_file = match lookup("CK_TIMER_FILE") {
			None => Some(PathBuf::from(DEFAULT_TIMER_FILE)),
			Some(path) if path.is_empty() => None,
			Some(path) => Some(PathBuf::from(path)),
		};

		let batch_count = parsed(&lookup, "CK_BATCH_COUNT", 1)?;
		let batch_size: usize = parsed(&lookup, "CK_CAFFE_BATCH_SIZE", 1)?;
		if batch_size.checked_mul(batch_count).is_none() {
			return Err(BenchError::InvalidEnv {
				name: "CK_CAFFE_BATCH_SIZE",
				value: format!("{batch_size} (times CK_BATCH_COUNT={batch_count} overflows)"),
			});
		}

		let device = match lookup("CK_DEVICE") {
			None => DeviceSpec::Auto,
			Some(value) => value.parse::<DeviceSpec>().map_err(|_| BenchError::UnknownDevice(value))?,
		};

		Ok(Self {
			batch_count,
			batch_size,
			skip_images: parsed(&lookup, "CK_SKIP_IMAGES", 0)?,
			images_dir: required(&lookup, "CK_ENV_DATASET_IMAGENET_VAL")?.into(),
			model_file: required(&lookup, "CK_CAFFE_MODEL_FILE")?.into(),
			weights_file: required(&lookup, "CK_ENV_MODEL_CAFFE_WEIGHTS")?,
			aux_dir: required(&lookup, "CK_ENV_DATASET_IMAGENET_AUX")?.into(),
			top_n: parsed(&lookup, "CK_TOP_N", 5)?,
			device,
			timer_file,
			log_level: parsed(&lookup, "CK_LOG_LEVEL", LevelFilter::Info)?,
		})
	}

	/// Checked against overflow by `from_lookup`.
	pub fn images_count(&self) -> usize {
		self.batch_count.saturating_mul(self.batch_size)
	}

	pub fn mean_file(&self) -> PathBuf {
		self.aux_dir.join(MEAN_FILE_NAME)
	}

	pub fn labels_file(&self) -> PathBuf {
		self.aux_dir.join(LABELS_FILE_NAME)
	}
}

fn required<F: Fn(&str) -> Option<String>>(lookup: &F, name: &'static str) -> Result<String, BenchError> {
	match lookup(name) {
		Some(value) if !value.is_empty() => Ok(value),
		_ => Err(BenchError::MissingEnv(name)),
	}
}

fn parsed<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, name: &'static str, default: T) -> Result<T, BenchError> {
	match lookup(name) {
		None => Ok(default),
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| BenchError::InvalidEnv { name, value }),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| vars.get(name).cloned()
	}

	const REQUIRED: [(&str, &str); 4] = [
		("CK_ENV_DATASET_IMAGENET_VAL", "/data/val"),
		("CK_CAFFE_MODEL_FILE", "/models/resnet18.json"),
		("CK_ENV_MODEL_CAFFE_WEIGHTS", "/models/resnet18.pth"),
		("CK_ENV_DATASET_IMAGENET_AUX", "/data/aux"),
	];

	#[test]
	fn defaults_apply_when_only_paths_are_set() {
		let config = BenchConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

		assert_eq!(config.batch_count, 1);
		assert_eq!(config.batch_size, 1);
		assert_eq!(config.skip_images, 0);
		assert_eq!(config.top_n, 5);
		assert_eq!(config.device, DeviceSpec::Auto);
		assert_eq!(config.log_level, LevelFilter::Info);
		assert_eq!(config.timer_file, Some(PathBuf::from("tmp-ck-timer.json")));
		assert_eq!(config.images_count(), 1);
		assert_eq!(config.mean_file(), PathBuf::from("/data/aux/imagenet_mean.json"));
		assert_eq!(config.labels_file(), PathBuf::from("/data/aux/synset_words.txt"));
	}

	#[test]
	fn numeric_settings_are_read() {
		let mut vars = REQUIRED.to_vec();
		vars.extend([
			("CK_BATCH_COUNT", "3"),
			("CK_CAFFE_BATCH_SIZE", " 4 "),
			("CK_SKIP_IMAGES", "10"),
			("CK_TOP_N", "2"),
			("CK_DEVICE", "cuda:1"),
			("CK_TIMER_FILE", ""),
			("CK_LOG_LEVEL", "debug"),
		]);
		let config = BenchConfig::from_lookup(lookup_from(&vars)).unwrap();

		assert_eq!(config.images_count(), 12);
		assert_eq!(config.skip_images, 10);
		assert_eq!(config.top_n, 2);
		assert_eq!(config.device, DeviceSpec::Cuda(1));
		assert_eq!(config.timer_file, None);
		assert_eq!(config.log_level, LevelFilter::Debug);
	}

	#[test]
	fn missing_or_empty_paths_are_rejected() {
		let vars: Vec<_> = REQUIRED
			.iter()
			.copied()
			.filter(|(name, _)| *name != "CK_CAFFE_MODEL_FILE")
			.collect();
		let err = BenchConfig::from_lookup(lookup_from(&vars)).unwrap_err();
		assert!(matches!(err, BenchError::MissingEnv("CK_CAFFE_MODEL_FILE")));

		let mut vars = REQUIRED.to_vec();
		vars.push(("CK_ENV_DATASET_IMAGENET_AUX", ""));
		let err = BenchConfig::from_lookup(lookup_from(&vars)).unwrap_err();
		assert!(matches!(err, BenchError::MissingEnv("CK_ENV_DATASET_IMAGENET_AUX")));
	}

	#[test]
	fn garbage_numbers_are_rejected() {
		let mut vars = REQUIRED.to_vec();
		vars.push(("CK_BATCH_COUNT", "many"));
		let err = BenchConfig::from_lookup(lookup_from(&vars)).unwrap_err();

		match err {
			BenchError::InvalidEnv { name, value } => {
				assert_eq!(name, "CK_BATCH_COUNT");
				assert_eq!(value, "many");
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn oversized_batches_are_rejected() {
		let mut vars = REQUIRED.to_vec();
		vars.extend([("CK_BATCH_COUNT", "2"), ("CK_CAFFE_BATCH_SIZE", "18446744073709551615")]);
		let err = BenchConfig::from_lookup(lookup_from(&vars)).unwrap_err();

		assert!(matches!(err, BenchError::InvalidEnv { name: "CK_CAFFE_BATCH_SIZE", .. }));
	}

	#[test]
	fn unknown_device_is_named() {
		let mut vars = REQUIRED.to_vec();
		vars.push(("CK_DEVICE", "tpu"));
		let err = BenchConfig::from_lookup(lookup_from(&vars)).unwrap_err();

		assert!(matches!(err, BenchError::UnknownDevice(ref device) if device == "tpu"));
		assert_eq!(err.to_string(), "Unknown device \"tpu\", expected auto, cpu, cuda, cuda:N or mps");
	}

	#[test]
	fn device_spec_parsing() {
		assert_eq!("CPU".parse(), Ok(DeviceSpec::Cpu));
		assert_eq!("cuda".parse(), Ok(DeviceSpec::Cuda(0)));
		assert_eq!("cuda:3".parse(), Ok(DeviceSpec::Cuda(3)));
		assert_eq!("mps".parse(), Ok(DeviceSpec::Mps));
		assert_eq!("auto".parse(), Ok(DeviceSpec::Auto));
		assert_eq!("cuda:x".parse::<DeviceSpec>(), Err(()));
		assert_eq!("tpu".parse::<DeviceSpec>(), Err(()));
	}
}
