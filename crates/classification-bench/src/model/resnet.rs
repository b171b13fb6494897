use burn::module::Module;
use burn::nn::conv::Conv2d;
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig};
use burn::nn::{BatchNorm, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::{Backend, Device};
use burn::tensor::Tensor;
use log::info;
use crate::error::BenchError;
use crate::model::block::{batch_norm, conv, LayerBlock};
use crate::model::{weights, NetworkConfig};

#[derive(Debug, Module)]
pub struct ResNet<B: Backend> {
	pub(crate) conv1: Conv2d<B>,
	pub(crate) bn1: BatchNorm<B, 2>,
	pub(crate) relu: Relu,
	pub(crate) maxpool: MaxPool2d,
	pub(crate) layer1: LayerBlock<B>,
	pub(crate) layer2: LayerBlock<B>,
	pub(crate) layer3: LayerBlock<B>,
	pub(crate) layer4: LayerBlock<B>,
	pub(crate) avgpool: AdaptiveAvgPool2d,
	pub(crate) fc: Linear<B>,
}

impl<B: Backend> ResNet<B> {
	/// Builds a randomly initialised network with the layout the model file describes.
	pub fn new(network: &NetworkConfig, device: &Device<B>) -> Self {
		let expansion = network.architecture.expansion();
		let bottleneck = expansion > 1;
		let [b1, b2, b3, b4] = network.architecture.blocks();

		Self {
			// 7x7 conv, 64, /2
			conv1: conv([3, 64], 7, 2, device),
			bn1: batch_norm(64, device),
			relu: Relu::new(),
			// 3x3 maxpool, /2
			maxpool: MaxPool2dConfig::new([3, 3])
				.with_strides([2, 2])
				.with_padding(PaddingConfig2d::Explicit(1, 1))
				.init(),
			layer1: LayerBlock::new(b1, 64, 64 * expansion, 1, bottleneck, device),
			layer2: LayerBlock::new(b2, 64 * expansion, 128 * expansion, 2, bottleneck, device),
			layer3: LayerBlock::new(b3, 128 * expansion, 256 * expansion, 2, bottleneck, device),
			layer4: LayerBlock::new(b4, 256 * expansion, 512 * expansion, 2, bottleneck, device),
			// [B, 512 * expansion, H, W] -> [B, 512 * expansion, 1, 1]
			avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
			fc: LinearConfig::new(512 * expansion, network.num_classes).init(device),
		}
	}

	/// Builds the network and loads its parameters from `weights`.
	pub fn pretrained(network: &NetworkConfig, weights: &str, device: &Device<B>) -> Result<Self, BenchError> {
		let record = weights::load_record(weights, device)?;
		info!("Loaded {:?} weights from {}", network.architecture, weights);

		Ok(Self::new(network, device).load_record(record))
	}

	/// Returns the raw class scores, `[B, num_classes]`.
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
		let x = self.conv1.forward(input);
		let x = self.bn1.forward(x);
		let x = self.relu.forward(x);
		let x = self.maxpool.forward(x);

		let x = self.layer1.forward(x);
		let x = self.layer2.forward(x);
		let x = self.layer3.forward(x);
		let x = self.layer4.forward(x);

		let x = self.avgpool.forward(x);
		let x = x.flatten(1, 3);

		self.fc.forward(x)
	}
}
