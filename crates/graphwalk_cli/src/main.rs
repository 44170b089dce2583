#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd;

#[derive(Parser)]
#[command(name = "graphwalk", about = "Cycle-safe, depth-bounded traversal of JSON value graphs")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Run one operation mode and print the response envelope.
	Run(cmd::run::Args),
	/// Rebuild a nested value from a flattened `dotted.path -> leaf` object.
	Unflatten(cmd::unflatten::Args),
	/// List operation modes.
	Modes,
}

fn main() {
	init_tracing();

	match run() {
		Ok(0) => {}
		Ok(code) => std::process::exit(code),
		Err(err) => {
			eprintln!("error: {err}");
			std::process::exit(1);
		}
	}
}

fn run() -> graphwalk::graph::Result<i32> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Run(args) => cmd::run::run(args),
		Commands::Unflatten(args) => cmd::unflatten::run(args).map(|()| 0),
		Commands::Modes => {
			cmd::modes::run();
			Ok(0)
		}
	}
}

fn init_tracing() {
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}
