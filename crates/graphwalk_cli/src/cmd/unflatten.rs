use graphwalk::graph::{Result, unflatten};

use crate::cmd::util::{InputArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub input: InputArgs,
	#[arg(long)]
	pub pretty: bool,
}

/// Rebuild and print the nested value behind a flattened object.
pub fn run(args: Args) -> Result<()> {
	let Args { input, pretty } = args;

	let flat = input.load()?;
	let rebuilt = unflatten(flat.as_mapping()?)?;
	emit_json(&rebuilt, pretty)
}
