//! Network definition: the model file names a ResNet variant, the weights
//! file fills it in.

mod block;
mod resnet;
pub mod weights;

use burn::config::Config;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

pub use resnet::ResNet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
	ResNet18,
	ResNet34,
	ResNet50,
	ResNet101,
	ResNet152,
}

impl Architecture {
	/// Number of residual blocks in each of the four stages.
	pub fn blocks(&self) -> [usize; 4] {
		match self {
			Architecture::ResNet18 => [2, 2, 2, 2],
			Architecture::ResNet34 | Architecture::ResNet50 => [3, 4, 6, 3],
			Architecture::ResNet101 => [3, 4, 23, 3],
			Architecture::ResNet152 => [3, 8, 36, 3],
		}
	}

	pub fn expansion(&self) -> usize {
		match self {
			Architecture::ResNet18 | Architecture::ResNet34 => 1,
			_ => 4,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
	Nearest,
	Triangle,
	CatmullRom,
	Gaussian,
	Lanczos3,
}

impl From<ResizeFilter> for FilterType {
	fn from(filter: ResizeFilter) -> Self {
		match filter {
			ResizeFilter::Nearest => FilterType::Nearest,
			ResizeFilter::Triangle => FilterType::Triangle,
			ResizeFilter::CatmullRom => FilterType::CatmullRom,
			ResizeFilter::Gaussian => FilterType::Gaussian,
			ResizeFilter::Lanczos3 => FilterType::Lanczos3,
		}
	}
}

#[derive(Debug, Config)]
pub struct NetworkConfig {
	pub architecture: Architecture,
	#[config(default = 1000)]
	pub num_classes: usize,
	/// Side of the square input the images are resized to.
	#[config(default = 224)]
	pub input_size: u32,
	#[config(default = "ResizeFilter::Triangle")]
	pub resize_filter: ResizeFilter,
}
