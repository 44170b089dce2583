use serde::Serialize;

use crate::graph::{Composite, Leaf, VisitCtx, Visitor, WalkResult};

/// Number of keys and indices seen below the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropertyCount {
	/// Count of non-root nodes, cycle markers included.
	pub count: u64,
}

/// Counts every child edge the walk follows.
#[derive(Default)]
pub struct PropertyCounter {
	count: u64,
}

impl PropertyCounter {
	/// Create a zeroed counter.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take the count.
	pub fn finish(self) -> PropertyCount {
		PropertyCount { count: self.count }
	}

	fn tick(&mut self, ctx: &VisitCtx<'_>) {
		if !ctx.is_root() {
			self.count += 1;
		}
	}
}

impl Visitor for PropertyCounter {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, _node: &Composite) -> WalkResult<()> {
		self.tick(ctx);
		Ok(())
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, _leaf: Leaf<'_>) -> WalkResult<()> {
		self.tick(ctx);
		Ok(())
	}
}
