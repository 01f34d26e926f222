use clap::Parser;
use provisioning_cli::{cli::Cli, commands, logging};
use tracing::error;

fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli.command, cli.config.as_deref()) {
		error!(target = "provision", error = %err, "command failed");
		std::process::exit(1);
	}
}
