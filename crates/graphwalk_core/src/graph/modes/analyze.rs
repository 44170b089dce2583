use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::graph::value::with_stack_headroom;
use crate::graph::{Composite, Leaf, VisitCtx, Visitor, WalkResult};

/// Shape of one node and, for composites, of its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralReport {
	/// `array`, `object`, a scalar kind, or `circular` for a truncated cycle.
	#[serde(rename = "type")]
	pub kind: String,
	/// Dotted path from the root.
	pub path: String,
	/// Child reports keyed by mapping key or decimal index; absent for leaves.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<ReportProperties>,
}

impl StructuralReport {
	/// Child report under `key`.
	pub fn child(&self, key: &str) -> Option<&StructuralReport> {
		self.properties.as_ref()?.get(key)
	}
}

/// Ordered child reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportProperties(Vec<(String, StructuralReport)>);

impl ReportProperties {
	/// Report stored under `key`.
	pub fn get(&self, key: &str) -> Option<&StructuralReport> {
		self.0.iter().find(|(name, _)| name == key).map(|(_, report)| report)
	}

	/// Number of child reports.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no child reports.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Child reports in input order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &StructuralReport)> {
		self.0.iter().map(|(key, report)| (key.as_str(), report))
	}
}

impl Serialize for ReportProperties {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		with_stack_headroom(|| {
			let mut map = serializer.serialize_map(Some(self.0.len()))?;
			for (key, report) in &self.0 {
				map.serialize_entry(key, report)?;
			}
			map.end()
		})
	}
}

/// Records type and path of every node.
#[derive(Default)]
pub struct StructuralAnalysis {
	open: Vec<StructuralReport>,
	root: Option<StructuralReport>,
}

impl StructuralAnalysis {
	/// Create an empty analysis.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take the root report.
	pub fn finish(self) -> Option<StructuralReport> {
		self.root
	}

	fn attach(&mut self, ctx: &VisitCtx<'_>, report: StructuralReport) {
		let parent = self.open.last_mut().and_then(|parent| parent.properties.as_mut());
		match (parent, ctx.segment()) {
			(Some(properties), Some(segment)) => properties.0.push((segment.to_string(), report)),
			_ => self.root = Some(report),
		}
	}
}

impl Visitor for StructuralAnalysis {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()> {
		self.open.push(StructuralReport {
			kind: node.kind().as_str().to_owned(),
			path: ctx.path.to_string(),
			properties: Some(ReportProperties::default()),
		});
		Ok(())
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
		let kind = match leaf {
			Leaf::Scalar(value) => value.kind().as_str(),
			Leaf::CycleMarker { .. } => "circular",
		};
		self.attach(
			ctx,
			StructuralReport {
				kind: kind.to_owned(),
				path: ctx.path.to_string(),
				properties: None,
			},
		);
		Ok(())
	}

	fn exit_composite(&mut self, ctx: &VisitCtx<'_>) -> WalkResult<()> {
		if let Some(report) = self.open.pop() {
			self.attach(ctx, report);
		}
		Ok(())
	}
}
