use std::rc::Rc;

use serde::Serialize;

use crate::graph::{Composite, KeyPath, Leaf, Mapping, Segment, Sequence, TraversalError, Value, ValueKind, VisitCtx, Visitor, WalkResult};

use super::CYCLE_MARKER;

/// Largest run of missing sequence slots `unflatten` pads with null.
pub const MAX_INDEX_GAP: usize = 4096;

/// Dotted key path to scalar leaf value, in walk order.
#[derive(Debug, Clone, Default)]
pub struct FlattenedMap(Mapping);

impl FlattenedMap {
	/// Leaf stored under the dotted `path`.
	pub fn get(&self, path: &str) -> Option<Value> {
		self.0.get(path)
	}

	/// Number of leaves.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no leaf was recorded.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Dotted paths in walk order.
	pub fn paths(&self) -> Vec<Rc<str>> {
		self.0.keys()
	}

	/// Underlying mapping node.
	pub fn as_mapping(&self) -> &Mapping {
		&self.0
	}
}

impl Serialize for FlattenedMap {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		Value::Mapping(self.0.clone()).serialize(serializer)
	}
}

/// Collects `dotted.path -> leaf` pairs.
///
/// Empty containers and a scalar root contribute nothing.
#[derive(Default)]
pub struct Flatten {
	prefix: String,
	marks: Vec<usize>,
	out: FlattenedMap,
}

impl Flatten {
	/// Create an empty collector.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take the collected map.
	pub fn finish(self) -> FlattenedMap {
		self.out
	}

	fn key_for(&self, segment: &Segment) -> String {
		if self.prefix.is_empty() {
			segment.to_string()
		} else {
			format!("{}.{segment}", self.prefix)
		}
	}
}

impl Visitor for Flatten {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, _node: &Composite) -> WalkResult<()> {
		self.marks.push(self.prefix.len());
		if let Some(segment) = ctx.segment() {
			self.prefix = self.key_for(segment);
		}
		Ok(())
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
		let Some(segment) = ctx.segment() else {
			return Ok(());
		};

		let value = match leaf {
			Leaf::Scalar(value) => value.clone(),
			Leaf::CycleMarker { .. } => Value::text(CYCLE_MARKER),
		};
		self.out.0.insert(self.key_for(segment), value);
		Ok(())
	}

	fn exit_composite(&mut self, _ctx: &VisitCtx<'_>) -> WalkResult<()> {
		if let Some(mark) = self.marks.pop() {
			self.prefix.truncate(mark);
		}
		Ok(())
	}
}

/// Rebuild a nested value from `dotted.path -> leaf` pairs.
///
/// All-digit segments address sequence slots, all other segments address
/// mapping keys. Missing slots are filled with null, up to [`MAX_INDEX_GAP`].
pub fn unflatten(flat: &Mapping) -> WalkResult<Value> {
	let mut root: Option<Value> = None;

	for (key, leaf) in flat.entries().iter() {
		let path = KeyPath::parse_dotted(key);
		let Some((last, parents)) = path.segments().split_last() else {
			return Err(TraversalError::UnsupportedValue { path: String::new() });
		};

		let first = path.segments().first().unwrap_or(last);
		let mut current = root.get_or_insert_with(|| container_for(first)).clone();
		let mut walked = KeyPath::root();

		for (idx, segment) in parents.iter().enumerate() {
			let next_segment = path.segments().get(idx + 1).unwrap_or(last);
			let wanted = container_for(next_segment);
			let child = match child_at(&current, segment, &walked)? {
				Some(existing) if existing.kind() == wanted.kind() => existing,
				Some(existing) => {
					walked.push(segment.clone());
					return Err(TraversalError::TypeMismatch {
						expected: wanted.kind(),
						found: existing.kind(),
						path: walked.to_string(),
					});
				}
				None => {
					set_child(&current, segment, wanted.clone(), &walked)?;
					wanted
				}
			};
			walked.push(segment.clone());
			current = child;
		}

		set_child(&current, last, leaf.clone(), &walked)?;
	}

	Ok(root.unwrap_or_else(|| Value::Mapping(Mapping::new())))
}

fn container_for(segment: &Segment) -> Value {
	match segment {
		Segment::Index(_) => Value::Sequence(Sequence::new()),
		Segment::Key(_) => Value::Mapping(Mapping::new()),
	}
}

fn child_at(parent: &Value, segment: &Segment, at: &KeyPath) -> WalkResult<Option<Value>> {
	match (parent, segment) {
		(Value::Sequence(seq), Segment::Index(index)) => Ok(seq.get(*index)),
		(Value::Mapping(map), Segment::Key(key)) => Ok(map.get(key)),
		(other, segment) => Err(shape_mismatch(other, segment, at)),
	}
}

fn set_child(parent: &Value, segment: &Segment, value: Value, at: &KeyPath) -> WalkResult<()> {
	match (parent, segment) {
		(Value::Sequence(seq), Segment::Index(index)) => {
			if *index > seq.len().saturating_add(MAX_INDEX_GAP) {
				let mut path = at.clone();
				path.push(segment.clone());
				return Err(TraversalError::UnsupportedValue { path: path.to_string() });
			}
			while seq.len() < *index {
				seq.push(Value::Null);
			}
			if *index < seq.len() {
				seq.set(*index, value);
			} else {
				seq.push(value);
			}
			Ok(())
		}
		(Value::Mapping(map), Segment::Key(key)) => {
			map.insert(key.clone(), value);
			Ok(())
		}
		(other, segment) => Err(shape_mismatch(other, segment, at)),
	}
}

fn shape_mismatch(parent: &Value, segment: &Segment, at: &KeyPath) -> TraversalError {
	let expected = match segment {
		Segment::Index(_) => ValueKind::Sequence,
		Segment::Key(_) => ValueKind::Mapping,
	};
	TraversalError::TypeMismatch {
		expected,
		found: parent.kind(),
		path: at.to_string(),
	}
}
