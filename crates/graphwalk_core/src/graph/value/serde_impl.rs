use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::graph::{Mapping, NodeId, Number, Sequence, Value};

/// Nesting ceiling for building a value tree from serialized input.
///
/// Well above any practical traversal depth; deeper input is malformed.
pub const DESERIALIZE_DEPTH_LIMIT: usize = 65_536;

const RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Run `f` with stack headroom, moving onto a heap-allocated segment when
/// the current one runs low. Recursive serde code calls this per level.
pub(crate) fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
	stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let open = RefCell::new(HashSet::new());
		Guarded { value: self, open: &open }.serialize(serializer)
	}
}

impl Serialize for Number {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match *self {
			Self::I64(v) => serializer.serialize_i64(v),
			Self::U64(v) => serializer.serialize_u64(v),
			Self::F64(v) => serializer.serialize_f64(v),
		}
	}
}

/// One node being serialized, with the composites currently open above it.
struct Guarded<'a> {
	value: &'a Value,
	open: &'a RefCell<HashSet<NodeId>>,
}

impl Serialize for Guarded<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.value {
			Value::Null => serializer.serialize_unit(),
			Value::Bool(v) => serializer.serialize_bool(*v),
			Value::Number(n) => n.serialize(serializer),
			Value::Text(text) => serializer.serialize_str(text),
			Value::Sequence(seq) => self.composite::<S>(seq.id(), || {
				let items = seq.items();
				let mut out = serializer.serialize_seq(Some(items.len()))?;
				for item in items.iter() {
					out.serialize_element(&self.child(item))?;
				}
				out.end()
			}),
			Value::Mapping(map) => self.composite::<S>(map.id(), || {
				let entries = map.entries();
				let mut out = serializer.serialize_map(Some(entries.len()))?;
				for (key, value) in entries.iter() {
					out.serialize_entry(&**key, &self.child(value))?;
				}
				out.end()
			}),
		}
	}
}

impl Guarded<'_> {
	fn child<'b>(&'b self, value: &'b Value) -> Guarded<'b> {
		Guarded { value, open: self.open }
	}

	/// Serialize a composite, refusing one that is already open above it.
	fn composite<S: Serializer>(&self, id: NodeId, body: impl FnOnce() -> Result<S::Ok, S::Error>) -> Result<S::Ok, S::Error> {
		if !self.open.borrow_mut().insert(id) {
			return Err(ser::Error::custom("value contains a reference cycle"));
		}
		let result = with_stack_headroom(body);
		self.open.borrow_mut().remove(&id);
		result
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Nested { depth: 1 }.deserialize(deserializer)
	}
}

/// Deserializes one value found at `depth` (root is 1).
#[derive(Clone, Copy)]
struct Nested {
	depth: usize,
}

impl<'de> DeserializeSeed<'de> for Nested {
	type Value = Value;

	fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
		with_stack_headroom(|| deserializer.deserialize_any(ValueVisitor { depth: self.depth }))
	}
}

struct ValueVisitor {
	depth: usize,
}

impl ValueVisitor {
	fn enter<E: de::Error>(&self) -> Result<Nested, E> {
		if self.depth > DESERIALIZE_DEPTH_LIMIT {
			return Err(E::custom(format!("input nesting exceeds {DESERIALIZE_DEPTH_LIMIT} levels")));
		}
		Ok(Nested { depth: self.depth + 1 })
	}
}

impl<'de> Visitor<'de> for ValueVisitor {
	type Value = Value;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("any JSON value")
	}

	fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_none<E: de::Error>(self) -> Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
		Nested { depth: self.depth }.deserialize(deserializer)
	}

	fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
		Ok(Value::Bool(v))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
		Ok(Value::Number(Number::I64(v)))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
		Ok(Value::Number(Number::U64(v)))
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
		Ok(Value::Number(Number::F64(v)))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
		Ok(Value::text(v))
	}

	fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
		Ok(Value::Text(v.into_boxed_str()))
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
		let child = self.enter::<A::Error>()?;
		let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
		while let Some(item) = access.next_element_seed(child)? {
			items.push(item);
		}
		Ok(Value::Sequence(Sequence::from_items(items)))
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
		let child = self.enter::<A::Error>()?;
		let mapping = Mapping::new();
		while let Some(key) = access.next_key::<String>()? {
			let value = access.next_value_seed(child)?;
			mapping.insert(key, value);
		}
		Ok(Value::Mapping(mapping))
	}
}
