use serde::Serialize;

use crate::graph::{Error, ErrorKind, OperationMode, Outcome, TraversalError};

/// JSON response wrapper shared by every transport.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
	/// Whether the operation succeeded.
	pub ok: bool,
	/// Mode that produced `result`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mode: Option<&'static str>,
	/// Operation output.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Outcome>,
	/// Failure classification.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_kind: Option<&'static str>,
	/// Failure detail.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail: Option<ErrorDetail>,
	#[serde(skip)]
	kind: Option<ErrorKind>,
}

/// Sanitized description of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
	/// Fixed message for the error kind.
	pub message: &'static str,
	/// Dotted path of the offending node.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Depth of the offending node.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub depth: Option<usize>,
	/// Exhausted budget, as `steps=N` or `millis=N`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<String>,
}

impl Envelope {
	/// Successful response for `mode`.
	pub fn success(mode: OperationMode, outcome: Outcome) -> Self {
		Self {
			ok: true,
			mode: Some(mode.as_str()),
			result: Some(outcome),
			error_kind: None,
			detail: None,
			kind: None,
		}
	}

	/// Failed response built from a crate error.
	pub fn failure(err: &Error) -> Self {
		let kind = err.kind();
		let mut detail = ErrorDetail {
			message: kind.message(),
			path: None,
			depth: None,
			limit: None,
		};

		if let Error::Traversal(traversal) = err {
			detail.path = traversal.path().map(str::to_owned);
			match traversal {
				TraversalError::DepthExceeded { depth, .. } => detail.depth = Some(*depth),
				TraversalError::BudgetExceeded { limit } => detail.limit = Some(limit.to_string()),
				_ => {}
			}
		}

		Self {
			ok: false,
			mode: None,
			result: None,
			error_kind: Some(kind.as_str()),
			detail: Some(detail),
			kind: Some(kind),
		}
	}

	/// Envelope for the outcome of one operation.
	pub fn from_result(mode: OperationMode, result: Result<Outcome, Error>) -> Self {
		match result {
			Ok(outcome) => Self::success(mode, outcome),
			Err(err) => Self::failure(&err),
		}
	}

	/// HTTP-style status code: 200 on success, else the error kind's code.
	pub fn status_code(&self) -> u16 {
		self.kind.map_or(200, ErrorKind::status_code)
	}

	/// Error classification of a failed envelope.
	pub fn kind(&self) -> Option<ErrorKind> {
		self.kind
	}
}
