mod engine;
mod envelope;
mod error;
mod modes;
mod path;
mod payload;
mod policy;
mod run;
mod value;

/// Traversal engine, visitor seam, and walk counters.
pub use engine::{Composite, Leaf, VisitCtx, Visitor, WalkStats, Walker, walk};
/// Response envelope.
pub use envelope::{Envelope, ErrorDetail};
/// Error taxonomy and result aliases.
pub use error::{BudgetLimit, Error, ErrorKind, Result, TraversalError, WalkResult};
/// Operation mode visitors and their outputs.
pub use modes::{
	ArrayStats, CYCLE_MARKER, DeepClone, Describe, Flatten, FlattenedMap, MAX_INDEX_GAP, PropertyCount, PropertyCounter, ReportProperties, Stats,
	StructuralAnalysis, StructuralReport, deep_clone, unflatten,
};
/// Key path types.
pub use path::{KeyPath, Segment};
/// Payload decoding and parsing.
pub use payload::{Encoding, MAX_DECOMPRESSED_BYTES, ZSTD_MAGIC, decode_bytes, parse_payload, read_payload, select_field};
/// Traversal limits.
pub use policy::{CyclePolicy, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STEPS, TraversalPolicy};
/// Mode dispatch.
pub use run::{OperationMode, Outcome, run, run_named};
/// Value graph model.
pub use value::{DESERIALIZE_DEPTH_LIMIT, Mapping, NodeId, Number, Sequence, Value, ValueKind};
