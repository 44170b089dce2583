use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::graph::{BudgetLimit, CyclePolicy, KeyPath, Mapping, NodeId, Segment, Sequence, TraversalError, TraversalPolicy, Value, ValueKind, WalkResult};

/// Composite node handed to [`Visitor::enter_composite`].
#[derive(Debug, Clone)]
pub enum Composite {
	/// Ordered list node.
	Sequence(Sequence),
	/// Mapping node.
	Mapping(Mapping),
}

impl Composite {
	/// Composite view of `value`, `None` for scalars.
	pub fn of(value: &Value) -> Option<Self> {
		match value {
			Value::Sequence(seq) => Some(Self::Sequence(seq.clone())),
			Value::Mapping(map) => Some(Self::Mapping(map.clone())),
			_ => None,
		}
	}

	/// Node identity.
	pub fn id(&self) -> NodeId {
		match self {
			Self::Sequence(seq) => seq.id(),
			Self::Mapping(map) => map.id(),
		}
	}

	/// `Sequence` or `Mapping`.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Sequence(_) => ValueKind::Sequence,
			Self::Mapping(_) => ValueKind::Mapping,
		}
	}

	/// Number of children.
	pub fn len(&self) -> usize {
		match self {
			Self::Sequence(seq) => seq.len(),
			Self::Mapping(map) => map.len(),
		}
	}

	/// Whether the node has no children.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn child(&self, cursor: usize) -> Option<(Segment, Value)> {
		match self {
			Self::Sequence(seq) => seq.get(cursor).map(|item| (Segment::Index(cursor), item)),
			Self::Mapping(map) => map
				.entries()
				.get(cursor)
				.map(|(key, value)| (Segment::Key(Rc::clone(key)), value.clone())),
		}
	}
}

/// Leaf event payload.
#[derive(Debug, Clone, Copy)]
pub enum Leaf<'a> {
	/// Scalar value (null, boolean, number or text).
	Scalar(&'a Value),
	/// Stand-in for a composite that would close an ancestor cycle.
	CycleMarker {
		/// Identity of the repeated ancestor.
		target: NodeId,
	},
}

/// Position of the node an event refers to.
#[derive(Debug, Clone, Copy)]
pub struct VisitCtx<'a> {
	/// Path from the root to the node.
	pub path: &'a KeyPath,
	/// Node depth; the root is 1.
	pub depth: usize,
}

impl VisitCtx<'_> {
	/// Key or index under which the node hangs, `None` for the root.
	pub fn segment(&self) -> Option<&Segment> {
		self.path.last()
	}

	/// Whether the node is the root.
	pub fn is_root(&self) -> bool {
		self.path.is_empty()
	}
}

/// Consumer of walk events.
pub trait Visitor {
	/// Called once before the children of a composite.
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()>;

	/// Called for each scalar and for each truncated cycle edge.
	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()>;

	/// Called once after the children of a composite.
	fn exit_composite(&mut self, ctx: &VisitCtx<'_>) -> WalkResult<()> {
		let _ = ctx;
		Ok(())
	}
}

/// Counters from a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
	/// Nodes visited, cycle markers included.
	pub steps: u64,
	/// Deepest composite entered.
	pub deepest: usize,
	/// Cycle edges replaced by markers.
	pub truncated_cycles: u64,
	/// Ancestor identities still recorded when the walk ended.
	pub open_ancestors: usize,
}

struct Frame {
	node: Composite,
	depth: usize,
	cursor: usize,
}

/// Single-use iterative traversal over one value graph.
///
/// [`Walker::walk`] consumes the walker, so an instance that completed or
/// failed cannot be driven again.
pub struct Walker<'p> {
	policy: &'p TraversalPolicy,
	frames: Vec<Frame>,
	ancestors: HashSet<NodeId>,
	path: KeyPath,
	stats: WalkStats,
	budget: Budget<'p>,
}

/// Walk `root` under `policy`, feeding events to `visitor`.
pub fn walk<V: Visitor + ?Sized>(root: &Value, policy: &TraversalPolicy, visitor: &mut V) -> WalkResult<WalkStats> {
	Walker::new(policy).walk(root, visitor)
}

impl<'p> Walker<'p> {
	/// Create an idle walker.
	pub fn new(policy: &'p TraversalPolicy) -> Self {
		Self {
			policy,
			frames: Vec::new(),
			ancestors: HashSet::new(),
			path: KeyPath::root(),
			stats: WalkStats::default(),
			budget: Budget::start(policy),
		}
	}

	/// Run the traversal to completion or to the first error.
	pub fn walk<V: Visitor + ?Sized>(mut self, root: &Value, visitor: &mut V) -> WalkResult<WalkStats> {
		debug!(
			max_depth = self.policy.max_depth.get(),
			on_cycle = self.policy.on_cycle.as_str(),
			max_steps = ?self.policy.max_steps,
			"walk started"
		);
		self.budget = Budget::start(self.policy);

		let result = self.drive(root, visitor);
		self.stats.steps = self.budget.steps();
		match result {
			Ok(()) => {
				self.stats.open_ancestors = self.ancestors.len();
				debug_assert_eq!(self.stats.open_ancestors, 0, "completed walk left ancestors behind");
				debug!(steps = self.stats.steps, deepest = self.stats.deepest, truncated = self.stats.truncated_cycles, "walk completed");
				Ok(self.stats)
			}
			Err(err) => {
				debug!(steps = self.stats.steps, error = %err, "walk failed");
				Err(err)
			}
		}
	}

	fn drive<V: Visitor + ?Sized>(&mut self, root: &Value, visitor: &mut V) -> WalkResult<()> {
		self.budget.charge()?;
		match Composite::of(root) {
			Some(node) => {
				self.enter(node, 1, visitor)?;
			}
			None => visitor.leaf(&VisitCtx { path: &self.path, depth: 1 }, Leaf::Scalar(root))?,
		}

		while let Some(frame) = self.frames.last_mut() {
			let cursor = frame.cursor;
			frame.cursor += 1;
			let depth = frame.depth;

			let Some((segment, child)) = frame.node.child(cursor) else {
				visitor.exit_composite(&VisitCtx { path: &self.path, depth })?;
				if let Some(done) = self.frames.pop() {
					self.ancestors.remove(&done.node.id());
				}
				if !self.frames.is_empty() {
					self.path.pop();
				}
				continue;
			};

			self.path.push(segment);
			self.budget.charge()?;
			match Composite::of(&child) {
				Some(node) => {
					if !self.enter(node, depth + 1, visitor)? {
						self.path.pop();
					}
				}
				None => {
					visitor.leaf(&VisitCtx { path: &self.path, depth: depth + 1 }, Leaf::Scalar(&child))?;
					self.path.pop();
				}
			}
		}

		Ok(())
	}

	/// Push a frame for `node`; `Ok(false)` when it was replaced by a cycle marker.
	fn enter<V: Visitor + ?Sized>(&mut self, node: Composite, depth: usize, visitor: &mut V) -> WalkResult<bool> {
		let id = node.id();
		if self.ancestors.contains(&id) {
			return match self.policy.on_cycle {
				CyclePolicy::Fail => Err(TraversalError::CycleDetected { path: self.path.to_string() }),
				CyclePolicy::TruncateWithMarker => {
					self.stats.truncated_cycles += 1;
					debug!(path = %self.path, target = %id, "cycle truncated");
					visitor.leaf(&VisitCtx { path: &self.path, depth }, Leaf::CycleMarker { target: id })?;
					Ok(false)
				}
			};
		}

		if depth > self.policy.max_depth.get() {
			return Err(TraversalError::DepthExceeded {
				depth,
				path: self.path.to_string(),
			});
		}

		self.ancestors.insert(id);
		visitor.enter_composite(&VisitCtx { path: &self.path, depth }, &node)?;
		self.stats.deepest = self.stats.deepest.max(depth);
		self.frames.push(Frame { node, depth, cursor: 0 });
		Ok(true)
	}
}

/// Step and time accounting for one traversal.
pub(crate) struct Budget<'p> {
	policy: &'p TraversalPolicy,
	steps: u64,
	started: Instant,
}

impl<'p> Budget<'p> {
	/// Start the clock with no steps spent.
	pub(crate) fn start(policy: &'p TraversalPolicy) -> Self {
		Self {
			policy,
			steps: 0,
			started: Instant::now(),
		}
	}

	/// Steps charged so far.
	pub(crate) fn steps(&self) -> u64 {
		self.steps
	}

	/// Account for one visited node and enforce the budgets.
	pub(crate) fn charge(&mut self) -> WalkResult<()> {
		self.steps += 1;

		if let Some(max_steps) = self.policy.max_steps
			&& self.steps > max_steps
		{
			warn!(max_steps, "traversal step budget exhausted");
			return Err(TraversalError::BudgetExceeded {
				limit: BudgetLimit::Steps(max_steps),
			});
		}

		if let Some(max_millis) = self.policy.max_millis
			&& self.started.elapsed().as_millis() > u128::from(max_millis)
		{
			warn!(max_millis, "traversal time budget exhausted");
			return Err(TraversalError::BudgetExceeded {
				limit: BudgetLimit::Millis(max_millis),
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests;
