use std::fmt;

use thiserror::Error;

use crate::graph::ValueKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for engine and mode operations.
pub type WalkResult<T> = std::result::Result<T, TraversalError>;

/// Exhausted traversal budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
	/// Configured node-visit ceiling.
	Steps(u64),
	/// Configured wall-clock ceiling in milliseconds.
	Millis(u64),
}

impl fmt::Display for BudgetLimit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Steps(steps) => write!(f, "steps={steps}"),
			Self::Millis(millis) => write!(f, "millis={millis}"),
		}
	}
}

/// Closed set of failures a traversal can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
	/// A composite was reached again through its own descendants.
	#[error("cycle detected at path {path:?}")]
	CycleDetected {
		/// Dotted path of the edge that closes the cycle.
		path: String,
	},
	/// Nesting went deeper than the policy allows.
	#[error("depth exceeded: depth={depth} at path {path:?}")]
	DepthExceeded {
		/// Depth of the offending composite (root is 1).
		depth: usize,
		/// Dotted path of the offending composite.
		path: String,
	},
	/// Step or time budget ran out.
	#[error("traversal budget exceeded ({limit})")]
	BudgetExceeded {
		/// Budget that was exhausted.
		limit: BudgetLimit,
	},
	/// A value had a different variant than the operation required.
	#[error("type mismatch at path {path:?}: expected {expected}, found {found}")]
	TypeMismatch {
		/// Required kind.
		expected: ValueKind,
		/// Actual kind.
		found: ValueKind,
		/// Dotted path of the value.
		path: String,
	},
	/// A value the active mode cannot represent.
	#[error("unsupported value at path {path:?}")]
	UnsupportedValue {
		/// Dotted path of the value.
		path: String,
	},
}

/// Fixed classification of every failure reported to a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// See [`TraversalError::CycleDetected`].
	CycleDetected,
	/// See [`TraversalError::DepthExceeded`].
	DepthExceeded,
	/// See [`TraversalError::BudgetExceeded`].
	BudgetExceeded,
	/// See [`TraversalError::TypeMismatch`].
	TypeMismatch,
	/// See [`TraversalError::UnsupportedValue`].
	UnsupportedValue,
	/// Payload could not be read, decompressed or parsed.
	InvalidPayload,
	/// Requested operation mode does not exist.
	UnknownMode,
}

impl ErrorKind {
	/// Stable label used as `errorKind` in envelopes.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::CycleDetected => "CycleDetected",
			Self::DepthExceeded => "DepthExceeded",
			Self::BudgetExceeded => "BudgetExceeded",
			Self::TypeMismatch => "TypeMismatch",
			Self::UnsupportedValue => "UnsupportedValue",
			Self::InvalidPayload => "InvalidPayload",
			Self::UnknownMode => "UnknownMode",
		}
	}

	/// HTTP-style status code a transport should answer with.
	pub fn status_code(self) -> u16 {
		match self {
			Self::CycleDetected | Self::DepthExceeded | Self::TypeMismatch | Self::UnsupportedValue => 422,
			Self::BudgetExceeded => 503,
			Self::InvalidPayload => 400,
			Self::UnknownMode => 404,
		}
	}

	/// User-visible message for this kind.
	pub fn message(self) -> &'static str {
		match self {
			Self::CycleDetected => "input contains a circular reference",
			Self::DepthExceeded => "input is nested deeper than the configured limit",
			Self::BudgetExceeded => "input exceeded the processing budget",
			Self::TypeMismatch => "input has an unexpected shape",
			Self::UnsupportedValue => "input contains a value this operation cannot represent",
			Self::InvalidPayload => "payload could not be parsed",
			Self::UnknownMode => "unknown operation mode",
		}
	}
}

impl TraversalError {
	/// Classify this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::CycleDetected { .. } => ErrorKind::CycleDetected,
			Self::DepthExceeded { .. } => ErrorKind::DepthExceeded,
			Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
			Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
			Self::UnsupportedValue { .. } => ErrorKind::UnsupportedValue,
		}
	}

	/// Dotted path carried by the error, when it has one.
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::CycleDetected { path }
			| Self::DepthExceeded { path, .. }
			| Self::TypeMismatch { path, .. }
			| Self::UnsupportedValue { path } => Some(path.as_str()),
			Self::BudgetExceeded { .. } => None,
		}
	}
}

/// Errors produced while reading payloads and running operations.
#[derive(Debug, Error)]
pub enum Error {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Payload was not well-formed JSON.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed payload exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Requested top-level payload field is absent.
	#[error("payload has no top-level field {field:?}")]
	MissingField {
		/// Requested field name.
		field: String,
	},
	/// Mode name did not match any operation.
	#[error("unknown operation mode: {name}")]
	UnknownMode {
		/// User-provided mode name.
		name: String,
	},
	/// Traversal ended with an error.
	#[error(transparent)]
	Traversal(#[from] TraversalError),
}

impl Error {
	/// Classify this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) | Self::Json(_) | Self::DecompressedTooLarge { .. } | Self::MissingField { .. } => ErrorKind::InvalidPayload,
			Self::UnknownMode { .. } => ErrorKind::UnknownMode,
			Self::Traversal(err) => err.kind(),
		}
	}
}
