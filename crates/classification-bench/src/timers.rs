use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use serde::Serialize;
use crate::bench::BenchStats;
use crate::error::BenchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
	InitClassifier,
	LoadImage,
	ClassifyImage,
}

impl TimerKind {
	pub const ALL: [TimerKind; 3] = [TimerKind::InitClassifier, TimerKind::LoadImage, TimerKind::ClassifyImage];

	pub fn name(&self) -> &'static str {
		match self {
			TimerKind::InitClassifier => "init_classifier",
			TimerKind::LoadImage => "load_image",
			TimerKind::ClassifyImage => "classify_image",
		}
	}
}

/// Wall-clock timers, each remembering its last measured interval.
#[derive(Debug, Default)]
pub struct Timers {
	started: [Option<Instant>; 3],
	last: [Duration; 3],
}

#[derive(Serialize)]
struct TimerState<'a> {
	timers: BTreeMap<&'static str, f64>,
	run: &'a BenchStats,
	classify_avg: f64,
}

impl Timers {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start(&mut self, kind: TimerKind) {
		self.started[kind as usize] = Some(Instant::now());
	}

	/// Stops the timer and returns the interval since `start`. A timer that was
	/// never started measures nothing.
	pub fn stop(&mut self, kind: TimerKind) -> Duration {
		let elapsed = self.started[kind as usize]
			.take()
			.map(|start| start.elapsed())
			.unwrap_or_default();
		self.last[kind as usize] = elapsed;
		elapsed
	}

	/// Last measured interval, in seconds.
	pub fn get(&self, kind: TimerKind) -> f64 {
		self.last[kind as usize].as_secs_f64()
	}

	/// Dumps the state when a path is configured. Returns whether a file was written.
	pub fn dump_to(&self, path: Option<&Path>, stats: &BenchStats) -> Result<bool, BenchError> {
		match path {
			Some(path) => self.dump_state(path, stats).map(|_| true),
			None => Ok(false),
		}
	}

	/// Writes every timer's last value and the run summary as JSON.
	pub fn dump_state<A: AsRef<Path>>(&self, path: A, stats: &BenchStats) -> Result<(), BenchError> {
		let state = TimerState {
			timers: TimerKind::ALL.iter().map(|kind| (kind.name(), self.get(*kind))).collect(),
			run: stats,
			classify_avg: stats.classify_avg(),
		};
		fs::write(path, serde_json::to_string_pretty(&state)?)?;

		Ok(())
	}
}
