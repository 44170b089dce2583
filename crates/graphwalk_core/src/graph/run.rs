use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::{
	ArrayStats, DeepClone, Describe, Error, Flatten, FlattenedMap, PropertyCount, PropertyCounter, Stats, StructuralAnalysis, StructuralReport,
	TraversalPolicy, Value, WalkResult, walk,
};

/// Operation applied to a walked graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
	/// Independent deep copy.
	Clone,
	/// Per-node type/path report.
	Analyze,
	/// Number of keys and indices below the root.
	Count,
	/// Dotted path to leaf map.
	Flatten,
	/// Generic per-node description.
	Describe,
	/// Numeric summary of a top-level sequence.
	Stats,
}

impl OperationMode {
	/// Every mode, in display order.
	pub const ALL: [Self; 6] = [Self::Clone, Self::Analyze, Self::Count, Self::Flatten, Self::Describe, Self::Stats];

	/// Stable lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Clone => "clone",
			Self::Analyze => "analyze",
			Self::Count => "count",
			Self::Flatten => "flatten",
			Self::Describe => "describe",
			Self::Stats => "stats",
		}
	}
}

impl fmt::Display for OperationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OperationMode {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|mode| mode.as_str() == name)
			.ok_or_else(|| Error::UnknownMode { name: name.to_owned() })
	}
}

/// Result of one operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
	/// [`OperationMode::Clone`] output.
	Cloned(Value),
	/// [`OperationMode::Analyze`] output.
	Report(StructuralReport),
	/// [`OperationMode::Count`] output.
	Count(PropertyCount),
	/// [`OperationMode::Flatten`] output.
	Flattened(FlattenedMap),
	/// [`OperationMode::Describe`] output.
	Described(Value),
	/// [`OperationMode::Stats`] output.
	Stats(ArrayStats),
}

/// Walk `root` once under `policy` and build the output of `mode`.
///
/// Stats reads only the top-level elements and does not walk below them.
#[instrument(level = "debug", skip_all, fields(mode = mode.as_str()))]
pub fn run(mode: OperationMode, root: &Value, policy: &TraversalPolicy) -> WalkResult<Outcome> {
	let outcome = match mode {
		OperationMode::Clone => {
			let mut visitor = DeepClone::new();
			walk(root, policy, &mut visitor)?;
			Outcome::Cloned(visitor.finish())
		}
		OperationMode::Analyze => {
			let mut visitor = StructuralAnalysis::new();
			walk(root, policy, &mut visitor)?;
			match visitor.finish() {
				Some(report) => Outcome::Report(report),
				None => Outcome::Cloned(Value::Null),
			}
		}
		OperationMode::Count => {
			let mut visitor = PropertyCounter::new();
			walk(root, policy, &mut visitor)?;
			Outcome::Count(visitor.finish())
		}
		OperationMode::Flatten => {
			let mut visitor = Flatten::new();
			walk(root, policy, &mut visitor)?;
			Outcome::Flattened(visitor.finish())
		}
		OperationMode::Describe => {
			let mut visitor = Describe::new();
			walk(root, policy, &mut visitor)?;
			Outcome::Described(visitor.finish())
		}
		OperationMode::Stats => Outcome::Stats(Stats::summarize(root, policy)?),
	};

	debug!("operation finished");
	Ok(outcome)
}

/// Resolve `mode_name` and run it.
pub fn run_named(mode_name: &str, root: &Value, policy: &TraversalPolicy) -> crate::graph::Result<Outcome> {
	let mode = mode_name.parse::<OperationMode>()?;
	Ok(run(mode, root, policy)?)
}
