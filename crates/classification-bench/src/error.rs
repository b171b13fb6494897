use std::path::PathBuf;
use burn::config::ConfigError;
use burn::record::RecorderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
	#[error("Environment variable {0} must be set to a non-empty value")]
	MissingEnv(&'static str),
	#[error("Environment variable {name} has an invalid value: {value:?}")]
	InvalidEnv {
		name: &'static str,
		value: String,
	},
	#[error("Unknown device {0:?}, expected auto, cpu, cuda, cuda:N or mps")]
	UnknownDevice(String),
	#[error("Std IO error: {0}")]
	StdIoError(#[from] std::io::Error),
	#[error("Unable to decode image {path}: {source}")]
	Decode {
		path: PathBuf,
		source: image::ImageError,
	},
	#[error("Could not load weights: {0}")]
	Recorder(RecorderError),
	#[error("Could not load config file: {0:?}")]
	Config(ConfigError),
	#[error("Could not write timer state: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Labels file {0} contains no labels")]
	NoLabels(PathBuf),
	#[error("Number of labels ({labels}) is different from the output layer dimension ({classes})")]
	LabelMismatch {
		labels: usize,
		classes: usize,
	},
	#[error("Not enough images in {dir}: need {needed}, found {found}")]
	NotEnoughImages {
		dir: PathBuf,
		needed: usize,
		found: usize,
	},
	#[error("Could not read output tensor: {0}")]
	TensorData(String),
	#[error("Could not initialise logger: {0}")]
	Logger(String),
}

impl From<RecorderError> for BenchError {
	fn from(err: RecorderError) -> Self {
		BenchError::Recorder(err)
	}
}

impl From<ConfigError> for BenchError {
	fn from(err: ConfigError) -> Self {
		BenchError::Config(err)
	}
}
