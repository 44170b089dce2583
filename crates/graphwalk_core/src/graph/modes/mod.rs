//! Operation modes over a value graph.

mod analyze;
mod clone;
mod count;
mod describe;
mod flatten;
mod stats;

pub use analyze::{ReportProperties, StructuralAnalysis, StructuralReport};
pub use clone::{DeepClone, deep_clone};
pub use count::{PropertyCount, PropertyCounter};
pub use describe::Describe;
pub use flatten::{Flatten, FlattenedMap, MAX_INDEX_GAP, unflatten};
pub use stats::{ArrayStats, Stats};

use crate::graph::{Segment, TraversalError, Value, VisitCtx, WalkResult};

/// Text that stands in for a truncated cycle in value-producing modes.
pub const CYCLE_MARKER: &str = "[Circular]";

/// Output graph under construction, mirroring the input walk.
///
/// Each open container is the attachment point for the children of the input
/// composite currently being walked.
#[derive(Default)]
struct OutputStack {
	open: Vec<Value>,
	root: Option<Value>,
}

impl OutputStack {
	/// Attach `value` under the current node's key, or make it the root.
	fn attach(&mut self, ctx: &VisitCtx<'_>, value: Value) -> WalkResult<()> {
		let Some(parent) = self.open.last() else {
			self.root = Some(value);
			return Ok(());
		};

		match (parent, ctx.segment()) {
			(Value::Sequence(seq), Some(Segment::Index(_))) => {
				seq.push(value);
				Ok(())
			}
			(Value::Mapping(map), Some(Segment::Key(key))) => {
				map.insert(key.clone(), value);
				Ok(())
			}
			_ => Err(TraversalError::UnsupportedValue { path: ctx.path.to_string() }),
		}
	}

	/// Attach `value` and make `container` the target for the node's children.
	fn open(&mut self, ctx: &VisitCtx<'_>, value: Value, container: Value) -> WalkResult<()> {
		self.attach(ctx, value)?;
		self.open.push(container);
		Ok(())
	}

	fn close(&mut self) {
		self.open.pop();
	}

	fn finish(self) -> Value {
		self.root.unwrap_or(Value::Null)
	}
}
