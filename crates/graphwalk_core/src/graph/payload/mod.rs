//! Payload intake: raw or zstd-compressed JSON bytes to [`Value`].

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::graph::{Error, Result, Value};

/// Ceiling on decompressed payload size.
pub const MAX_DECOMPRESSED_BYTES: usize = 256 * 1024 * 1024;
/// zstd frame magic.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Encoding detected for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// Plain JSON text.
	Plain,
	/// zstd-compressed JSON text.
	Zstd,
}

impl Encoding {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "plain",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect compression, returning `(encoding, json_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Encoding, Vec<u8>)> {
	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw)?;
		return Ok((Encoding::Zstd, out));
	}
	Ok((Encoding::Plain, raw))
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(Error::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

/// Decode and parse payload bytes.
///
/// Nesting is bounded by [`DESERIALIZE_DEPTH_LIMIT`] rather than by the JSON
/// parser, so depth limits are left to the traversal policy.
///
/// [`DESERIALIZE_DEPTH_LIMIT`]: crate::graph::DESERIALIZE_DEPTH_LIMIT
pub fn parse_payload(raw: Vec<u8>) -> Result<Value> {
	let raw_len = raw.len();
	let (encoding, bytes) = decode_bytes(raw)?;
	debug!(encoding = encoding.as_str(), raw_len, decoded_len = bytes.len(), "payload decoded");

	let mut de = serde_json::Deserializer::from_slice(&bytes);
	de.disable_recursion_limit();
	let value = Value::deserialize(&mut de)?;
	de.end()?;
	Ok(value)
}

/// Read, decode and parse the payload stored at `path`.
pub fn read_payload(path: impl AsRef<Path>) -> Result<Value> {
	let raw = std::fs::read(path)?;
	parse_payload(raw)
}

/// Pick `field` out of a top-level mapping, or pass the value through when
/// `field` is `None`.
pub fn select_field(value: Value, field: Option<&str>) -> Result<Value> {
	let Some(field) = field else {
		return Ok(value);
	};

	let missing = || Error::MissingField { field: field.to_owned() };
	match &value {
		Value::Mapping(map) => map.get(field).ok_or_else(missing),
		_ => Err(missing()),
	}
}
