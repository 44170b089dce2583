use serde::Serialize;
use tracing::debug;

use crate::graph::engine::Budget;
use crate::graph::{TraversalError, TraversalPolicy, Value, ValueKind, WalkResult};

/// Summary of the numeric elements of a top-level sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ArrayStats {
	/// Sum of numeric elements.
	pub sum: f64,
	/// Number of elements, numeric or not.
	pub count: u64,
	/// `sum / count`, zero for an empty sequence.
	pub average: f64,
	/// Largest numeric element.
	pub max: Option<f64>,
	/// Smallest numeric element.
	pub min: Option<f64>,
}

/// Aggregates the direct numeric children of a sequence root.
///
/// Elements are read but never descended into, so nested composites count
/// toward `count` only and cannot raise cycle or depth errors.
#[derive(Default)]
pub struct Stats {
	stats: ArrayStats,
}

impl Stats {
	/// Create an empty aggregate.
	pub fn new() -> Self {
		Self::default()
	}

	/// Summarize the elements of `root`, charging one budget step for the
	/// root and one per element.
	pub fn summarize(root: &Value, policy: &TraversalPolicy) -> WalkResult<ArrayStats> {
		let seq = match root {
			Value::Sequence(seq) => seq,
			other => {
				return Err(TraversalError::TypeMismatch {
					expected: ValueKind::Sequence,
					found: other.kind(),
					path: String::new(),
				});
			}
		};

		let mut budget = Budget::start(policy);
		budget.charge()?;

		let mut stats = Self::new();
		for item in seq.items().iter() {
			budget.charge()?;
			stats.add(item);
		}

		debug!(steps = budget.steps(), "stats summarized");
		Ok(stats.finish())
	}

	/// Account for one top-level element.
	pub fn add(&mut self, item: &Value) {
		self.stats.count += 1;
		if let Value::Number(number) = item {
			let number = number.as_f64();
			self.stats.sum += number;
			self.stats.max = Some(self.stats.max.map_or(number, |max| max.max(number)));
			self.stats.min = Some(self.stats.min.map_or(number, |min| min.min(number)));
		}
	}

	/// Take the summary.
	pub fn finish(self) -> ArrayStats {
		let mut stats = self.stats;
		if stats.count > 0 {
			stats.average = stats.sum / stats.count as f64;
		}
		stats
	}
}
