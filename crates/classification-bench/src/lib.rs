//! Image classification benchmark: classifies a window of a dataset one image
//! at a time with a pretrained ResNet and reports load and inference timings.

pub mod bench;
pub mod classifier;
pub mod config;
pub mod error;
pub mod imagenet;
pub mod images;
pub mod labels;
pub mod model;
pub mod timers;

#[cfg(test)]
mod testing;
