use graphwalk::graph::{Envelope, OperationMode, Result, run as run_mode};
use tracing::warn;

use crate::cmd::util::{InputArgs, PolicyArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	/// Operation mode; see `graphwalk modes`.
	pub mode: String,
	#[command(flatten)]
	pub input: InputArgs,
	#[command(flatten)]
	pub limits: PolicyArgs,
	#[arg(long)]
	pub pretty: bool,
}

/// Run one mode and print its envelope; returns the process exit code.
pub fn run(args: Args) -> Result<i32> {
	let Args { mode, input, limits, pretty } = args;

	let mode = match mode.parse::<OperationMode>() {
		Ok(mode) => mode,
		Err(err) => return finish(&Envelope::failure(&err), pretty),
	};
	let policy = limits.resolve()?;
	let root = input.load()?;

	let envelope = Envelope::from_result(mode, run_mode(mode, &root, &policy).map_err(Into::into));
	finish(&envelope, pretty)
}

fn finish(envelope: &Envelope, pretty: bool) -> Result<i32> {
	emit_json(envelope, pretty)?;
	match envelope.kind() {
		None => Ok(0),
		Some(kind) => {
			warn!(error_kind = kind.as_str(), status = envelope.status_code(), "operation failed");
			Ok(2)
		}
	}
}
