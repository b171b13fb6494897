use std::fs::{self, create_dir_all, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use burn::data::network::downloader;
use burn::prelude::{Backend, Device};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use log::info;
use crate::error::BenchError;
use crate::model::resnet::ResNetRecord;

const CACHE_DIR: &str = "classification-bench";

/// Where the network parameters come from, told apart by the weights location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsSource {
	/// A burn named MessagePack record (`.mpk`).
	Record(PathBuf),
	/// A PyTorch `state_dict` (`.pth`, `.pt`, ...).
	PyTorch(PathBuf),
	/// A PyTorch `state_dict` that is fetched once into the local cache.
	Remote(String),
}

impl WeightsSource {
	pub fn from_location(location: &str) -> Self {
		if location.starts_with("http://") || location.starts_with("https://") {
			return WeightsSource::Remote(location.to_string());
		}

		let path = PathBuf::from(location);
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("mpk") => WeightsSource::Record(path),
			_ => WeightsSource::PyTorch(path),
		}
	}
}

pub fn load_record<B: Backend>(location: &str, device: &Device<B>) -> Result<ResNetRecord<B>, BenchError> {
	match WeightsSource::from_location(location) {
		WeightsSource::Record(path) => {
			let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new().load(path, device)?;
			Ok(record)
		}
		WeightsSource::PyTorch(path) => load_pytorch(&path, device),
		WeightsSource::Remote(url) => load_pytorch(&download(&url)?, device),
	}
}

fn load_pytorch<B: Backend>(path: &Path, device: &Device<B>) -> Result<ResNetRecord<B>, BenchError> {
	// Load weights from torch state_dict
	let load_args = LoadArgs::new(path.to_path_buf())
		// Map *.downsample.0.* -> *.downsample.conv.*
		.with_key_remap("(.+)\\.downsample\\.0\\.(.+)", "$1.downsample.conv.$2")
		// Map *.downsample.1.* -> *.downsample.bn.*
		.with_key_remap("(.+)\\.downsample\\.1\\.(.+)", "$1.downsample.bn.$2")
		// Map layer[i].[j].* -> layer[i].blocks.[j].*
		.with_key_remap("(layer[1-4])\\.([0-9]+)\\.(.+)", "$1.blocks.$2.$3");
	let record = PyTorchFileRecorder::<FullPrecisionSettings>::new().load(load_args, device)?;

	Ok(record)
}

/// Local file a remote weights URL is cached under.
pub fn cached_file_name(cache_dir: &Path, url: &str) -> PathBuf {
	let file_base_name = url.rsplit_once('/').map_or(url, |(_, name)| name);
	cache_dir.join(file_base_name)
}

/// Downloads the weights to the local cache directory unless they are already there.
pub fn download(url: &str) -> Result<PathBuf, BenchError> {
	let model_dir = dirs::home_dir()
		.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory"))?
		.join(".cache")
		.join(CACHE_DIR);

	if !model_dir.exists() {
		create_dir_all(&model_dir)?;
	}

	let file_name = cached_file_name(&model_dir, url);
	if !file_name.exists() {
		info!("Downloading {} to {:?}", url, file_name);
		let message = file_name.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
		let bytes = downloader::download_file_as_bytes(url, &message);
		store(&file_name, &bytes)?;
	}

	Ok(file_name)
}

/// Writes to `<file_name>.part`, then renames it into place. A truncated
/// download never sits under the cached name.
fn store(file_name: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut partial = file_name.as_os_str().to_owned();
	partial.push(".part");
	let partial = PathBuf::from(partial);

	let mut output_file = File::create(&partial)?;
	output_file.write_all(bytes)?;
	output_file.sync_all()?;
	fs::rename(&partial, file_name)
}
