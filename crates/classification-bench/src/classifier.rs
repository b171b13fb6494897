use std::path::Path;
use burn::config::Config;
use burn::prelude::{Backend, Device, TensorData};
use burn::tensor::activation::softmax;
use burn::tensor::{Element, Tensor};
use image::DynamicImage;
use image::imageops::FilterType;
use log::info;
use crate::error::BenchError;
use crate::imagenet::{MeanConfig, Normalizer};
use crate::labels::load_labels;
use crate::model::{NetworkConfig, ResNet};

/// A class id with its label and probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
	pub class_id: usize,
	pub label: String,
	pub probability: f32,
}

/// Pretrained network plus everything needed to feed it and read its output.
pub struct Classifier<B: Backend> {
	model: ResNet<B>,
	normalizer: Normalizer<B>,
	labels: Vec<String>,
	input_size: u32,
	filter: FilterType,
	top_n: usize,
	device: Device<B>,
}

impl<B: Backend> Classifier<B> {
	pub fn new(
		model_file: &Path,
		weights_file: &str,
		mean_file: &Path,
		labels_file: &Path,
		top_n: usize,
		device: &Device<B>,
	) -> Result<Self, BenchError> {
		let network = NetworkConfig::load(model_file)?;
		let labels = load_labels(labels_file)?;
		if labels.len() != network.num_classes {
			return Err(BenchError::LabelMismatch {
				labels: labels.len(),
				classes: network.num_classes,
			});
		}

		let mean = MeanConfig::load(mean_file)?;
		let model = ResNet::pretrained(&network, weights_file, device)?;
		info!("Classifier ready: {:?}, {} classes, {}x{} input", network.architecture, network.num_classes, network.input_size, network.input_size);

		Ok(Self {
			model,
			normalizer: Normalizer::new(&mean, device),
			labels,
			input_size: network.input_size,
			filter: network.resize_filter.into(),
			top_n,
			device: device.clone(),
		})
	}

	/// Resizes and normalizes a decoded image into a `[1, 3, H, W]` network input.
	pub fn prepare_image(&self, img: &DynamicImage) -> Tensor<B, 4> {
		let side = self.input_size as usize;
		let resized = img.resize_exact(self.input_size, self.input_size, self.filter);
		let tensor = to_tensor::<B, _>(resized.into_rgb8().into_raw(), [side, side, 3], &self.device).unsqueeze::<4>();

		self.normalizer.normalize(tensor)
	}

	/// Runs the forward pass and returns the class probabilities on the host.
	pub fn predict(&self, input: Tensor<B, 4>) -> Result<Vec<f32>, BenchError> {
		let logits = self.model.forward(input);
		let probs = softmax(logits, 1);

		probs
			.into_data()
			.convert::<f32>()
			.to_vec()
			.map_err(|err| BenchError::TensorData(format!("{err:?}")))
	}

	/// Picks the `top_n` most probable classes, best first.
	pub fn process_predictions(&self, probs: &[f32]) -> Vec<Prediction> {
		top_n(probs, self.top_n)
			.into_iter()
			.map(|(class_id, probability)| Prediction {
				class_id,
				label: self.labels.get(class_id).cloned().unwrap_or_default(),
				probability,
			})
			.collect()
	}

	pub fn classify(&self, img: &DynamicImage) -> Result<Vec<Prediction>, BenchError> {
		let input = self.prepare_image(img);
		let probs = self.predict(input)?;

		Ok(self.process_predictions(&probs))
	}
}

/// Indices of the `n` largest values in descending order; ties keep the lower index first.
/// NaN sorts above every number.
fn top_n(values: &[f32], n: usize) -> Vec<(usize, f32)> {
	let mut indexed: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
	indexed.sort_by(|(_, a), (_, b)| b.total_cmp(a));
	indexed.truncate(n);
	indexed
}

fn to_tensor<B: Backend, T: Element>(data: Vec<T>, shape: [usize; 3], device: &Device<B>) -> Tensor<B, 3> {
	Tensor::<B, 3>::from_data(TensorData::new(data, shape).convert::<B::FloatElem>(), device)
		// [H, W, C] -> [C, H, W]
		.permute([2, 0, 1])
}
