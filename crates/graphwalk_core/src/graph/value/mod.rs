use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::graph::{TraversalError, WalkResult};

mod serde_impl;

pub use serde_impl::DESERIALIZE_DEPTH_LIMIT;
pub(crate) use serde_impl::with_stack_headroom;

/// Label for a value variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// [`Value::Null`].
	Null,
	/// [`Value::Bool`].
	Bool,
	/// [`Value::Number`].
	Number,
	/// [`Value::Text`].
	Text,
	/// [`Value::Sequence`].
	Sequence,
	/// [`Value::Mapping`].
	Mapping,
}

impl ValueKind {
	/// Render kind using JSON vocabulary (`array`, `object`, ...).
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool => "boolean",
			Self::Number => "number",
			Self::Text => "string",
			Self::Sequence => "array",
			Self::Mapping => "object",
		}
	}

	/// Whether values of this kind can have children.
	pub fn is_composite(self) -> bool {
		matches!(self, Self::Sequence | Self::Mapping)
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Numeric payload, keeping the JSON integer/float distinction.
#[derive(Debug, Clone, Copy)]
pub enum Number {
	/// Negative or signed integer.
	I64(i64),
	/// Non-negative integer.
	U64(u64),
	/// Floating point number.
	F64(f64),
}

impl Number {
	/// Lossy conversion used for arithmetic summaries.
	pub fn as_f64(self) -> f64 {
		match self {
			Self::I64(v) => v as f64,
			Self::U64(v) => v as f64,
			Self::F64(v) => v,
		}
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (*self, *other) {
			(Self::I64(a), Self::I64(b)) => a == b,
			(Self::U64(a), Self::U64(b)) => a == b,
			(Self::I64(a), Self::U64(b)) | (Self::U64(b), Self::I64(a)) => u64::try_from(a).is_ok_and(|a| a == b),
			(Self::F64(a), b) | (b, Self::F64(a)) => a == b.as_f64(),
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::I64(v) => write!(f, "{v}"),
			Self::U64(v) => write!(f, "{v}"),
			Self::F64(v) => write!(f, "{v}"),
		}
	}
}

/// Identity of one composite node.
///
/// Two handles share a `NodeId` exactly when they alias the same storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:016x}", self.0)
	}
}

/// In-memory form of one input data graph.
///
/// Cloning a `Value` clones scalars but only aliases composites: the clone of a
/// [`Value::Sequence`] or [`Value::Mapping`] handle refers to the same node.
#[derive(Clone)]
pub enum Value {
	/// JSON `null`.
	Null,
	/// JSON boolean.
	Bool(bool),
	/// JSON number.
	Number(Number),
	/// JSON string.
	Text(Box<str>),
	/// Ordered list of values.
	Sequence(Sequence),
	/// Ordered key/value pairs with unique keys.
	Mapping(Mapping),
}

impl Value {
	/// Build a text value.
	pub fn text(value: &str) -> Self {
		Self::Text(Box::from(value))
	}

	/// Build a fresh sequence node from items.
	pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
		Self::Sequence(Sequence::from_items(items))
	}

	/// Build a fresh mapping node from pairs; later duplicates replace earlier values.
	pub fn mapping<K: Into<Rc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
		let mapping = Mapping::new();
		for (key, value) in entries {
			mapping.insert(key, value);
		}
		Self::Mapping(mapping)
	}

	/// Variant label.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null => ValueKind::Null,
			Self::Bool(_) => ValueKind::Bool,
			Self::Number(_) => ValueKind::Number,
			Self::Text(_) => ValueKind::Text,
			Self::Sequence(_) => ValueKind::Sequence,
			Self::Mapping(_) => ValueKind::Mapping,
		}
	}

	/// Node identity for composites, `None` for scalars.
	pub fn identity(&self) -> Option<NodeId> {
		match self {
			Self::Sequence(seq) => Some(seq.id()),
			Self::Mapping(map) => Some(map.id()),
			_ => None,
		}
	}

	/// Access as a sequence.
	pub fn as_sequence(&self) -> WalkResult<&Sequence> {
		match self {
			Self::Sequence(seq) => Ok(seq),
			other => Err(other.mismatch(ValueKind::Sequence)),
		}
	}

	/// Access as a mapping.
	pub fn as_mapping(&self) -> WalkResult<&Mapping> {
		match self {
			Self::Mapping(map) => Ok(map),
			other => Err(other.mismatch(ValueKind::Mapping)),
		}
	}

	/// Numeric payload, if this is a number.
	pub fn as_number(&self) -> Option<Number> {
		match self {
			Self::Number(n) => Some(*n),
			_ => None,
		}
	}

	/// Text payload, if this is a string.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	fn mismatch(&self, expected: ValueKind) -> TraversalError {
		TraversalError::TypeMismatch {
			expected,
			found: self.kind(),
			path: String::new(),
		}
	}

	/// Compare content, ignoring node identity and mapping key order.
	///
	/// Runs without recursion and terminates on cyclic graphs: a pair of nodes
	/// already under comparison is assumed equal.
	pub fn structural_eq(&self, other: &Value) -> bool {
		let mut pending = vec![(self.clone(), other.clone())];
		let mut seen = HashSet::new();

		while let Some((left, right)) = pending.pop() {
			match (&left, &right) {
				(Self::Null, Self::Null) => {}
				(Self::Bool(a), Self::Bool(b)) if a == b => {}
				(Self::Number(a), Self::Number(b)) if a == b => {}
				(Self::Text(a), Self::Text(b)) if a == b => {}
				(Self::Sequence(a), Self::Sequence(b)) => {
					if !seen.insert((a.id(), b.id())) {
						continue;
					}
					let (a, b) = (a.items(), b.items());
					if a.len() != b.len() {
						return false;
					}
					pending.extend(a.iter().cloned().zip(b.iter().cloned()));
				}
				(Self::Mapping(a), Self::Mapping(b)) => {
					if !seen.insert((a.id(), b.id())) {
						continue;
					}
					if a.len() != b.len() {
						return false;
					}
					for (key, value) in a.entries().iter() {
						let Some(counterpart) = b.get(key) else {
							return false;
						};
						pending.push((value.clone(), counterpart));
					}
				}
				_ => return false,
			}
		}

		true
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Bool(v) => write!(f, "Bool({v})"),
			Self::Number(v) => write!(f, "Number({v})"),
			Self::Text(v) => write!(f, "Text({v:?})"),
			Self::Sequence(seq) => fmt::Debug::fmt(seq, f),
			Self::Mapping(map) => fmt::Debug::fmt(map, f),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Number(Number::I64(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::Number(Number::U64(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(Number::F64(value))
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::text(value)
	}
}

impl From<Sequence> for Value {
	fn from(value: Sequence) -> Self {
		Self::Sequence(value)
	}
}

impl From<Mapping> for Value {
	fn from(value: Mapping) -> Self {
		Self::Mapping(value)
	}
}

#[derive(Default)]
struct SequenceNode {
	items: Vec<Value>,
}

impl Drop for SequenceNode {
	fn drop(&mut self) {
		if !self.items.is_empty() {
			release(std::mem::take(&mut self.items));
		}
	}
}

#[derive(Default)]
struct MappingNode {
	entries: Vec<(Rc<str>, Value)>,
	slots: HashMap<Rc<str>, usize>,
}

impl Drop for MappingNode {
	fn drop(&mut self) {
		if !self.entries.is_empty() {
			self.slots.clear();
			release(self.entries.drain(..).map(|(_, value)| value).collect());
		}
	}
}

// Children of uniquely owned nodes are moved onto a local stack before the node
// itself goes away, so node drops never nest more than one level.
fn release(mut pending: Vec<Value>) {
	while let Some(mut value) = pending.pop() {
		match &mut value {
			Value::Sequence(seq) => {
				if let Some(node) = Rc::get_mut(&mut seq.0) {
					pending.append(&mut node.get_mut().items);
				}
			}
			Value::Mapping(map) => {
				if let Some(node) = Rc::get_mut(&mut map.0) {
					let node = node.get_mut();
					node.slots.clear();
					pending.extend(node.entries.drain(..).map(|(_, value)| value));
				}
			}
			_ => {}
		}
	}
}

/// Shared handle to an ordered list node.
#[derive(Clone, Default)]
pub struct Sequence(Rc<RefCell<SequenceNode>>);

impl Sequence {
	/// Create an empty node.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a node holding `items`.
	pub fn from_items(items: impl IntoIterator<Item = Value>) -> Self {
		Self(Rc::new(RefCell::new(SequenceNode {
			items: items.into_iter().collect(),
		})))
	}

	/// Node identity.
	pub fn id(&self) -> NodeId {
		NodeId(Rc::as_ptr(&self.0) as *const () as usize)
	}

	/// Append one item.
	pub fn push(&self, value: Value) {
		self.0.borrow_mut().items.push(value);
	}

	/// Replace the item at `index`, returning the previous one.
	pub fn set(&self, index: usize, value: Value) -> Option<Value> {
		let mut node = self.0.borrow_mut();
		let slot = node.items.get_mut(index)?;
		Some(std::mem::replace(slot, value))
	}

	/// Item handle at `index`.
	pub fn get(&self, index: usize) -> Option<Value> {
		self.0.borrow().items.get(index).cloned()
	}

	/// Number of items.
	pub fn len(&self) -> usize {
		self.0.borrow().items.len()
	}

	/// Whether the node has no items.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Borrow the items.
	pub fn items(&self) -> Ref<'_, [Value]> {
		Ref::map(self.0.borrow(), |node| node.items.as_slice())
	}

	/// Remove all items, breaking any cycle that runs through this node.
	pub fn clear(&self) {
		let items = std::mem::take(&mut self.0.borrow_mut().items);
		release(items);
	}
}

impl fmt::Debug for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Sequence({} len={})", self.id(), self.len())
	}
}

/// Shared handle to an ordered, key-unique mapping node.
#[derive(Clone, Default)]
pub struct Mapping(Rc<RefCell<MappingNode>>);

impl Mapping {
	/// Create an empty node.
	pub fn new() -> Self {
		Self::default()
	}

	/// Node identity.
	pub fn id(&self) -> NodeId {
		NodeId(Rc::as_ptr(&self.0) as *const () as usize)
	}

	/// Insert or replace; a replaced key keeps its original position.
	pub fn insert(&self, key: impl Into<Rc<str>>, value: Value) -> Option<Value> {
		let key = key.into();
		let mut node = self.0.borrow_mut();
		if let Some(&slot) = node.slots.get(&key) {
			return Some(std::mem::replace(&mut node.entries[slot].1, value));
		}

		let slot = node.entries.len();
		node.slots.insert(key.clone(), slot);
		node.entries.push((key, value));
		None
	}

	/// Value handle stored under `key`.
	pub fn get(&self, key: &str) -> Option<Value> {
		let node = self.0.borrow();
		node.slots.get(key).map(|&slot| node.entries[slot].1.clone())
	}

	/// Whether `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.borrow().slots.contains_key(key)
	}

	/// Keys in insertion order.
	pub fn keys(&self) -> Vec<Rc<str>> {
		self.0.borrow().entries.iter().map(|(key, _)| key.clone()).collect()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.borrow().entries.len()
	}

	/// Whether the node has no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Borrow the entries in insertion order.
	pub fn entries(&self) -> Ref<'_, [(Rc<str>, Value)]> {
		Ref::map(self.0.borrow(), |node| node.entries.as_slice())
	}

	/// Remove all entries, breaking any cycle that runs through this node.
	pub fn clear(&self) {
		let entries = {
			let mut node = self.0.borrow_mut();
			node.slots.clear();
			std::mem::take(&mut node.entries)
		};
		release(entries.into_iter().map(|(_, value)| value).collect());
	}
}

impl fmt::Debug for Mapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Mapping({} len={})", self.id(), self.len())
	}
}
