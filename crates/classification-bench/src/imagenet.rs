use burn::config::Config;
use burn::prelude::{Backend, Device, Tensor, TensorData};

/// Per-channel statistics subtracted from every input image, stored as the mean file.
#[derive(Debug, Config)]
pub struct MeanConfig {
	#[config(default = "[0.485, 0.456, 0.406]")]
	pub mean: [f32; 3],
	#[config(default = "[0.229, 0.224, 0.225]")]
	pub std: [f32; 3],
	/// Applied to raw 0..255 pixel values before the mean is subtracted.
	#[config(default = "1.0 / 255.0")]
	pub scale: f32,
}

pub struct Normalizer<B: Backend> {
	mean: Tensor<B, 4>,
	std: Tensor<B, 4>,
	scale: f32,
}

impl<B: Backend> Normalizer<B> {
	pub fn new(config: &MeanConfig, device: &Device<B>) -> Self {
		Self {
			mean: channel_tensor(config.mean, device),
			std: channel_tensor(config.std, device),
			scale: config.scale,
		}
	}

	/// Normalizes a `[B, 3, H, W]` batch of RGB pixels.
	pub fn normalize(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		(input * self.scale - self.mean.clone()) / self.std.clone()
	}
}

fn channel_tensor<B: Backend>(values: [f32; 3], device: &Device<B>) -> Tensor<B, 4> {
	Tensor::from_data(
		TensorData::new(values.to_vec(), [1, 3, 1, 1]).convert::<B::FloatElem>(),
		device,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use burn::backend::NdArray;
	use tempfile::TempDir;

	type TestBackend = NdArray<f32>;

	#[test]
	fn subtracts_mean_and_divides_by_std() {
		let device = Default::default();
		let config = MeanConfig::new()
			.with_mean([100.0, 50.0, 0.0])
			.with_std([2.0, 5.0, 10.0])
			.with_scale(1.0);
		let normalizer = Normalizer::<TestBackend>::new(&config, &device);

		let input = Tensor::<TestBackend, 4>::from_data(
			TensorData::new(vec![110.0f32, 100.0, 40.0, 60.0, 20.0, 30.0], [1, 3, 1, 2]),
			&device,
		);
		let output: Vec<f32> = normalizer.normalize(input).into_data().to_vec().unwrap();

		assert_eq!(output, vec![5.0, 0.0, -2.0, 2.0, 2.0, 3.0]);
	}

	#[test]
	fn mean_file_fills_in_defaults() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("imagenet_mean.json");
		fs::write(&path, r#"{"mean": [0.5, 0.5, 0.5]}"#).unwrap();

		let config = MeanConfig::load(&path).unwrap();

		assert_eq!(config.mean, [0.5, 0.5, 0.5]);
		assert_eq!(config.std, [0.229, 0.224, 0.225]);
		assert!((config.scale - 1.0 / 255.0).abs() < f32::EPSILON);
	}
}
