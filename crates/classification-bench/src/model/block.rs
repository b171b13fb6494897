use std::f64::consts::SQRT_2;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d, Relu};
use burn::prelude::{Backend, Device, Module, Tensor};

/// Bias-free square convolution with "same"-style padding, as used throughout ResNet.
pub(crate) fn conv<B: Backend>(channels: [usize; 2], kernel: usize, stride: usize, device: &Device<B>) -> Conv2d<B> {
	let padding = kernel / 2;
	Conv2dConfig::new(channels, [kernel, kernel])
		.with_stride([stride, stride])
		.with_padding(PaddingConfig2d::Explicit(padding, padding))
		.with_bias(false)
		.with_initializer(Initializer::KaimingNormal {
			gain: SQRT_2, // recommended value for ReLU
			fan_out_only: true,
		})
		.init(device)
}

pub(crate) fn batch_norm<B: Backend>(channels: usize, device: &Device<B>) -> BatchNorm<B, 2> {
	BatchNormConfig::new(channels).init(device)
}

#[derive(Debug, Module)]
pub enum ResidualBlock<B: Backend> {
	Basic(BasicBlock<B>),
	Bottleneck(Bottleneck<B>)
}

impl<B: Backend> ResidualBlock<B> {
	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		match self {
			ResidualBlock::Basic(block) => block.forward(input),
			ResidualBlock::Bottleneck(block) => block.forward(input)
		}
	}
}

#[derive(Debug, Module)]
pub struct BasicBlock<B: Backend> {
	pub(crate) conv1: Conv2d<B>,
	pub(crate) conv2: Conv2d<B>,
	pub(crate) bn1: BatchNorm<B, 2>,
	pub(crate) bn2: BatchNorm<B, 2>,
	pub(crate) relu: Relu,
	pub(crate) downsample: Option<Downsample<B>>
}

impl<B: Backend> BasicBlock<B> {
	pub fn new(in_channels: usize, out_channels: usize, stride: usize, device: &Device<B>) -> Self {
		Self {
			conv1: conv([in_channels, out_channels], 3, stride, device),
			bn1: batch_norm(out_channels, device),
			conv2: conv([out_channels, out_channels], 3, 1, device),
			bn2: batch_norm(out_channels, device),
			relu: Relu::new(),
			downsample: Downsample::when_needed(in_channels, out_channels, stride, device),
		}
	}

	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		let identity = shortcut(&self.downsample, input.clone());

		let x = self.conv1.forward(input);
		let x = self.bn1.forward(x);
		let x = self.relu.forward(x);

		let x = self.conv2.forward(x);
		let x = self.bn2.forward(x);

		self.relu.forward(x + identity)
	}
}

/// 1x1 -> 3x3 -> 1x1 block; the inner width is a quarter of the output width.
#[derive(Debug, Module)]
pub struct Bottleneck<B: Backend> {
	pub(crate) conv1: Conv2d<B>,
	pub(crate) conv2: Conv2d<B>,
	pub(crate) conv3: Conv2d<B>,
	pub(crate) bn1: BatchNorm<B, 2>,
	pub(crate) bn2: BatchNorm<B, 2>,
	pub(crate) bn3: BatchNorm<B, 2>,
	pub(crate) relu: Relu,
	pub(crate) downsample: Option<Downsample<B>>
}

impl<B: Backend> Bottleneck<B> {
	pub fn new(in_channels: usize, out_channels: usize, stride: usize, device: &Device<B>) -> Self {
		let width = out_channels / 4;

		Self {
			conv1: conv([in_channels, width], 1, 1, device),
			bn1: batch_norm(width, device),
			conv2: conv([width, width], 3, stride, device),
			bn2: batch_norm(width, device),
			conv3: conv([width, out_channels], 1, 1, device),
			bn3: batch_norm(out_channels, device),
			relu: Relu::new(),
			downsample: Downsample::when_needed(in_channels, out_channels, stride, device),
		}
	}

	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		let identity = shortcut(&self.downsample, input.clone());

		let x = self.conv1.forward(input);
		let x = self.bn1.forward(x);
		let x = self.relu.forward(x);

		let x = self.conv2.forward(x);
		let x = self.bn2.forward(x);
		let x = self.relu.forward(x);

		let x = self.conv3.forward(x);
		let x = self.bn3.forward(x);

		self.relu.forward(x + identity)
	}
}

fn shortcut<B: Backend>(downsample: &Option<Downsample<B>>, input: Tensor<B, 4>) -> Tensor<B, 4> {
	match downsample {
		Some(downsample) => downsample.forward(input),
		None => input
	}
}

#[derive(Debug, Module)]
pub struct Downsample<B: Backend> {
	pub(crate) conv: Conv2d<B>,
	pub(crate) bn: BatchNorm<B, 2>
}

impl<B: Backend> Downsample<B> {
	/// A projection is only needed when the block changes the shape of its input.
	fn when_needed(in_channels: usize, out_channels: usize, stride: usize, device: &Device<B>) -> Option<Self> {
		(stride != 1 || in_channels != out_channels).then(|| Self {
			conv: conv([in_channels, out_channels], 1, stride, device),
			bn: batch_norm(out_channels, device),
		})
	}

	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		let x = self.conv.forward(input);
		self.bn.forward(x)
	}
}

/// One ResNet stage. Only the first block strides.
#[derive(Debug, Module)]
pub struct LayerBlock<B: Backend> {
	pub(crate) blocks: Vec<ResidualBlock<B>>
}

impl<B: Backend> LayerBlock<B> {
	pub fn new(num_blocks: usize, in_channels: usize, out_channels: usize, stride: usize, bottleneck: bool, device: &Device<B>) -> Self {
		let blocks = (0..num_blocks)
			.map(|b| {
				let (in_channels, stride) = if b == 0 { (in_channels, stride) } else { (out_channels, 1) };
				if bottleneck {
					ResidualBlock::Bottleneck(Bottleneck::new(in_channels, out_channels, stride, device))
				} else {
					ResidualBlock::Basic(BasicBlock::new(in_channels, out_channels, stride, device))
				}
			})
			.collect();

		Self { blocks }
	}

	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		self.blocks.iter().fold(input, |x, block| block.forward(x))
	}
}
