use std::io::Read;
use std::path::{Path, PathBuf};

use graphwalk::graph::{CyclePolicy, Result, TraversalPolicy, Value, parse_payload, select_field};
use serde::Serialize;
use tracing::debug;

/// Payload location and top-level field selection.
#[derive(clap::Args)]
pub struct InputArgs {
	/// JSON payload, plain or zstd-compressed; `-` reads stdin.
	pub payload: PathBuf,
	/// Operate on this top-level field, e.g. `data` for `{"data": ...}` bodies.
	#[arg(long)]
	pub field: Option<String>,
}

impl InputArgs {
	/// Read, decode and parse the payload, then apply `--field`.
	pub(crate) fn load(&self) -> Result<Value> {
		let raw = read_input(&self.payload)?;
		let value = parse_payload(raw)?;
		select_field(value, self.field.as_deref())
	}
}

/// Traversal limits: optional policy file plus flag overrides.
#[derive(clap::Args)]
pub struct PolicyArgs {
	/// JSON file holding a traversal policy.
	#[arg(long)]
	pub policy: Option<PathBuf>,
	/// Maximum composite nesting depth; the root is depth 1.
	#[arg(long = "max-depth")]
	pub max_depth: Option<usize>,
	/// Behavior on ancestor cycles.
	#[arg(long = "on-cycle", value_enum)]
	pub on_cycle: Option<CycleArg>,
	/// Maximum number of nodes visited.
	#[arg(long = "max-steps", conflicts_with = "unbounded_steps")]
	pub max_steps: Option<u64>,
	/// Disable the node-visit budget.
	#[arg(long = "unbounded-steps")]
	pub unbounded_steps: bool,
	/// Wall-clock budget in milliseconds.
	#[arg(long = "max-millis")]
	pub max_millis: Option<u64>,
}

/// `--on-cycle` values.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum CycleArg {
	/// Abort with `CycleDetected`.
	Fail,
	/// Replace the closing edge with a cycle marker.
	Truncate,
}

impl PolicyArgs {
	/// Policy file (or defaults) with command-line overrides applied.
	pub(crate) fn resolve(&self) -> Result<TraversalPolicy> {
		let mut policy = match &self.policy {
			Some(path) => load_policy(path)?,
			None => TraversalPolicy::default(),
		};

		if let Some(max_depth) = self.max_depth {
			policy = policy.with_max_depth(max_depth);
		}
		if let Some(on_cycle) = self.on_cycle {
			policy.on_cycle = match on_cycle {
				CycleArg::Fail => CyclePolicy::Fail,
				CycleArg::Truncate => CyclePolicy::TruncateWithMarker,
			};
		}
		if self.unbounded_steps {
			policy.max_steps = None;
		} else if let Some(max_steps) = self.max_steps {
			policy.max_steps = Some(max_steps);
		}
		if let Some(max_millis) = self.max_millis {
			policy.max_millis = Some(max_millis);
		}

		debug!(?policy, "traversal policy resolved");
		Ok(policy)
	}
}

fn load_policy(path: &Path) -> Result<TraversalPolicy> {
	let bytes = std::fs::read(path)?;
	Ok(serde_json::from_slice(&bytes)?)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
	if path.as_os_str() == "-" {
		let mut raw = Vec::new();
		std::io::stdin().read_to_end(&mut raw)?;
		return Ok(raw);
	}
	Ok(std::fs::read(path)?)
}

/// Print `payload` as one JSON document on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T, pretty: bool) -> Result<()> {
	let text = if pretty {
		serde_json::to_string_pretty(payload)?
	} else {
		serde_json::to_string(payload)?
	};
	println!("{text}");
	Ok(())
}
