use std::num::NonZeroUsize;

use serde::Deserialize;

/// Action taken when a composite is reached again through its own descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
	/// Abort with [`TraversalError::CycleDetected`](crate::graph::TraversalError::CycleDetected).
	Fail,
	/// Emit a cycle marker leaf and do not descend.
	#[serde(alias = "truncate")]
	TruncateWithMarker,
}

impl CyclePolicy {
	/// Render policy as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fail => "fail",
			Self::TruncateWithMarker => "truncate_with_marker",
		}
	}
}

/// Limits applied to one traversal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraversalPolicy {
	/// Maximum composite nesting depth; the root is depth 1.
	pub max_depth: NonZeroUsize,
	/// Behavior on ancestor cycles.
	pub on_cycle: CyclePolicy,
	/// Maximum number of nodes visited, `None` for unbounded.
	pub max_steps: Option<u64>,
	/// Wall-clock budget in milliseconds, `None` for unbounded.
	pub max_millis: Option<u64>,
}

/// Default depth ceiling.
pub const DEFAULT_MAX_DEPTH: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
/// Default node-visit budget.
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

impl Default for TraversalPolicy {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			on_cycle: CyclePolicy::Fail,
			max_steps: Some(DEFAULT_MAX_STEPS),
			max_millis: None,
		}
	}
}

impl TraversalPolicy {
	/// Default limits with cycle truncation instead of failure.
	pub fn truncating() -> Self {
		Self {
			on_cycle: CyclePolicy::TruncateWithMarker,
			..Self::default()
		}
	}

	/// Replace the depth ceiling; zero is clamped to one.
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = NonZeroUsize::new(max_depth).unwrap_or(NonZeroUsize::MIN);
		self
	}

	/// Replace the node-visit budget.
	pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
		self.max_steps = max_steps;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::{CyclePolicy, DEFAULT_MAX_STEPS, TraversalPolicy};

	#[test]
	fn empty_config_yields_defaults() {
		let policy: TraversalPolicy = serde_json::from_str("{}").expect("policy parses");
		assert_eq!(policy, TraversalPolicy::default());
		assert_eq!(policy.max_depth.get(), 1000);
		assert_eq!(policy.max_steps, Some(DEFAULT_MAX_STEPS));
	}

	#[test]
	fn config_overrides_fields() {
		let policy: TraversalPolicy =
			serde_json::from_str(r#"{"max_depth": 8, "on_cycle": "truncate", "max_steps": null, "max_millis": 250}"#).expect("policy parses");
		assert_eq!(policy.max_depth.get(), 8);
		assert_eq!(policy.on_cycle, CyclePolicy::TruncateWithMarker);
		assert_eq!(policy.max_steps, None);
		assert_eq!(policy.max_millis, Some(250));
	}

	#[test]
	fn config_rejects_zero_depth_and_unknown_fields() {
		assert!(serde_json::from_str::<TraversalPolicy>(r#"{"max_depth": 0}"#).is_err());
		assert!(serde_json::from_str::<TraversalPolicy>(r#"{"depth": 3}"#).is_err());
	}

	#[test]
	fn with_max_depth_clamps_zero() {
		assert_eq!(TraversalPolicy::default().with_max_depth(0).max_depth.get(), 1);
	}
}
