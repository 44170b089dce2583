use crate::graph::{Composite, Leaf, Mapping, Sequence, Value, VisitCtx, Visitor, WalkResult};

use super::{CYCLE_MARKER, OutputStack};

const NULL_RESULT: &str = "null or undefined data";

/// Generic per-node description.
///
/// Scalars become `{result, type}`, null becomes `{result}`, sequences become
/// `{type: "array", length, items}` and mappings become
/// `{type: "object", keys, processed}`, with children described in place.
#[derive(Default)]
pub struct Describe {
	out: OutputStack,
}

impl Describe {
	/// Create an empty describer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take the description of the root.
	pub fn finish(self) -> Value {
		self.out.finish()
	}
}

impl Visitor for Describe {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()> {
		let (wrapper, container) = match node {
			Composite::Sequence(seq) => {
				let items = Value::Sequence(Sequence::new());
				let wrapper = Value::mapping([
					("type", Value::text("array")),
					("length", Value::from(seq.len() as u64)),
					("items", items.clone()),
				]);
				(wrapper, items)
			}
			Composite::Mapping(map) => {
				let processed = Value::Mapping(Mapping::new());
				let keys = Value::sequence(map.keys().iter().map(|key| Value::text(key)));
				let wrapper = Value::mapping([("type", Value::text("object")), ("keys", keys), ("processed", processed.clone())]);
				(wrapper, processed)
			}
		};
		self.out.open(ctx, wrapper, container)
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
		let description = match leaf {
			Leaf::Scalar(Value::Null) => Value::mapping([("result", Value::text(NULL_RESULT))]),
			Leaf::Scalar(value) => Value::mapping([("result", value.clone()), ("type", Value::text(value.kind().as_str()))]),
			Leaf::CycleMarker { .. } => Value::mapping([("result", Value::text(CYCLE_MARKER)), ("type", Value::text("circular"))]),
		};
		self.out.attach(ctx, description)
	}

	fn exit_composite(&mut self, _ctx: &VisitCtx<'_>) -> WalkResult<()> {
		self.out.close();
		Ok(())
	}
}
