use crate::graph::{Composite, Leaf, Mapping, Sequence, TraversalError, TraversalPolicy, Value, VisitCtx, Visitor, WalkResult, walk};

use super::{CYCLE_MARKER, OutputStack};

/// Builds an independent copy of the walked graph.
///
/// Every composite in the output is a fresh node, so the copy shares no
/// storage with the input. Shared input subtrees are copied once per path.
#[derive(Default)]
pub struct DeepClone {
	out: OutputStack,
}

impl DeepClone {
	/// Create an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take the finished copy.
	pub fn finish(self) -> Value {
		self.out.finish()
	}
}

impl Visitor for DeepClone {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()> {
		let container = match node {
			Composite::Sequence(_) => Value::Sequence(Sequence::new()),
			Composite::Mapping(_) => Value::Mapping(Mapping::new()),
		};
		self.out.open(ctx, container.clone(), container)
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
		let value = match leaf {
			Leaf::Scalar(Value::Text(text)) => Value::text(text),
			Leaf::Scalar(Value::Sequence(_) | Value::Mapping(_)) => {
				return Err(TraversalError::UnsupportedValue { path: ctx.path.to_string() });
			}
			Leaf::Scalar(scalar) => scalar.clone(),
			Leaf::CycleMarker { .. } => Value::text(CYCLE_MARKER),
		};
		self.out.attach(ctx, value)
	}

	fn exit_composite(&mut self, _ctx: &VisitCtx<'_>) -> WalkResult<()> {
		self.out.close();
		Ok(())
	}
}

/// Copy `root` into fresh storage under `policy`.
pub fn deep_clone(root: &Value, policy: &TraversalPolicy) -> WalkResult<Value> {
	let mut mode = DeepClone::new();
	walk(root, policy, &mut mode)?;
	Ok(mode.finish())
}
