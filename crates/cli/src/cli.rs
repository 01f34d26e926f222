use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(about = "Submit endorsements to a provisioning service")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Settings file (defaults to <config dir>/provision/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Submit an endorsement and wait for the provisioning session to settle
	Submit(SubmitArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SubmitArgs {
	/// Endorsement file to submit
	pub payload: PathBuf,

	/// Media type of the endorsement
	#[arg(short, long, default_value = "application/corim-unsigned+cbor")]
	pub media_type: String,

	/// URI of the /submit endpoint (overrides the settings file)
	#[arg(short, long)]
	pub uri: Option<String>,

	/// Extra CA certificate (PEM) to trust; repeatable
	#[arg(long = "ca-cert", value_name = "PATH")]
	pub ca_certs: Vec<PathBuf>,

	/// Skip TLS server certificate verification
	#[arg(long)]
	pub insecure: bool,

	/// DELETE the session resource once it settles
	#[arg(long)]
	pub delete_session: bool,

	/// HTTP Basic credentials
	#[arg(long, value_name = "USER:PASS", conflicts_with = "token")]
	pub basic: Option<String>,

	/// Bearer token
	#[arg(long)]
	pub token: Option<String>,

	/// Maximum poll attempts (at most one fewer GET is issued)
	#[arg(long)]
	pub max_attempts: Option<u32>,

	/// Delay between polls in milliseconds
	#[arg(long, value_name = "MS")]
	pub poll_period_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_submit_command() {
		let args = vec![
			"provision",
			"submit",
			"corim.cbor",
			"-u",
			"https://veraison.example/endorsement-provisioning/v1/submit",
			"--media-type",
			"application/corim+cbor",
			"--ca-cert",
			"/etc/ca/one.pem",
			"--ca-cert",
			"/etc/ca/two.pem",
			"--delete-session",
		];
		let cli = Cli::try_parse_from(args).unwrap();

		let Commands::Submit(submit) = cli.command;
		assert_eq!(submit.payload, PathBuf::from("corim.cbor"));
		assert_eq!(submit.media_type, "application/corim+cbor");
		assert_eq!(
			submit.uri.as_deref(),
			Some("https://veraison.example/endorsement-provisioning/v1/submit")
		);
		assert_eq!(submit.ca_certs, [PathBuf::from("/etc/ca/one.pem"), PathBuf::from("/etc/ca/two.pem")]);
		assert!(submit.delete_session);
		assert!(!submit.insecure);
	}

	#[test]
	fn parse_submit_defaults() {
		let cli = Cli::try_parse_from(["provision", "submit", "corim.cbor"]).unwrap();

		let Commands::Submit(submit) = cli.command;
		assert_eq!(submit.media_type, "application/corim-unsigned+cbor");
		assert!(submit.uri.is_none());
		assert!(submit.ca_certs.is_empty());
		assert!(cli.config.is_none());
	}

	#[test]
	fn basic_and_token_conflict() {
		let args = ["provision", "submit", "corim.cbor", "--basic", "u:p", "--token", "t"];
		assert!(Cli::try_parse_from(args).is_err());
	}

	#[test]
	fn verbose_flag_short_and_long() {
		let short_cli = Cli::try_parse_from(["provision", "-v", "submit", "corim.cbor"]).unwrap();
		assert_eq!(short_cli.verbose, 1);

		let long_cli = Cli::try_parse_from(["provision", "--verbose", "submit", "corim.cbor"]).unwrap();
		assert_eq!(long_cli.verbose, 1);

		let double_cli = Cli::try_parse_from(["provision", "-vv", "submit", "corim.cbor"]).unwrap();
		assert_eq!(double_cli.verbose, 2);
	}

	#[test]
	fn payload_is_required() {
		assert!(Cli::try_parse_from(["provision", "submit"]).is_err());
	}
}
