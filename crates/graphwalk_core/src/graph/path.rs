use std::fmt;
use std::rc::Rc;

/// One step from a composite to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Mapping key.
	Key(Rc<str>),
	/// Zero-based sequence index.
	Index(usize),
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Key(key) => f.write_str(key),
			Self::Index(index) => write!(f, "{index}"),
		}
	}
}

/// Ordered segments from the root to a node.
///
/// Renders as a dotted path: `""` for the root, `children.0.id` below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
	segments: Vec<Segment>,
}

impl KeyPath {
	/// Empty (root) path.
	pub fn root() -> Self {
		Self::default()
	}

	/// Split a dotted path; all-digit segments become indices.
	pub fn parse_dotted(input: &str) -> Self {
		if input.is_empty() {
			return Self::root();
		}

		let segments = input
			.split('.')
			.map(|part| {
				if !part.is_empty()
					&& part.bytes().all(|byte| byte.is_ascii_digit())
					&& let Ok(index) = part.parse::<usize>()
				{
					return Segment::Index(index);
				}
				Segment::Key(Rc::from(part))
			})
			.collect();

		Self { segments }
	}

	/// Append one segment.
	pub fn push(&mut self, segment: Segment) {
		self.segments.push(segment);
	}

	/// Remove the last segment.
	pub fn pop(&mut self) -> Option<Segment> {
		self.segments.pop()
	}

	/// Last segment, `None` at the root.
	pub fn last(&self) -> Option<&Segment> {
		self.segments.last()
	}

	/// Number of segments.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Whether this is the root path.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Segments in root-to-leaf order.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, segment) in self.segments.iter().enumerate() {
			if idx > 0 {
				f.write_str(".")?;
			}
			write!(f, "{segment}")?;
		}
		Ok(())
	}
}
