//! `provision submit`: one endorsement submission.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use provisioning::{
	Authenticator, BasicAuthenticator, BearerAuthenticator, NullAuthenticator, PollBudget, SubmitConfig,
};
use tracing::info;

use crate::cli::SubmitArgs;
use crate::error::{CliError, Result};
use crate::settings::{AuthSettings, Settings};

pub fn execute(args: &SubmitArgs, settings: Settings) -> Result<()> {
	let config = build_config(args, settings)?;
	let payload = fs::read(&args.payload).with_context(|| format!("cannot read endorsement {}", args.payload.display()))?;

	info!(
		target = "provision",
		path = %args.payload.display(),
		media_type = %args.media_type,
		size = payload.len(),
		"submitting endorsement"
	);

	let session = config.run(&payload, &args.media_type)?;

	info!(target = "provision", status = %session.status, expiry = %session.expiry, "submission complete");
	println!("{}", serde_json::to_string_pretty(&session)?);
	Ok(())
}

/// Layers command-line flags over the settings file.
///
/// The submit URI is left unset when neither source provides one, so the
/// library reports the missing endpoint.
pub fn build_config(args: &SubmitArgs, settings: Settings) -> Result<SubmitConfig> {
	let mut config = SubmitConfig::default();

	if let Some(uri) = args.uri.as_deref().or(settings.submit_uri.as_deref()) {
		config.set_submit_uri(uri)?;
	}

	if args.ca_certs.is_empty() {
		config.set_ca_certs(settings.ca_certs);
	} else {
		config.set_ca_certs(args.ca_certs.iter().cloned());
	}

	config.set_insecure(args.insecure || settings.insecure);
	config.set_delete_session(args.delete_session || settings.delete_session);

	if let Some(auth) = authenticator(args, settings.auth)? {
		config.set_auth(auth);
	}

	let stored_poll = settings.poll.unwrap_or_default();
	let mut budget = config.poll_budget();
	if let Some(max_attempts) = args.max_attempts.or(stored_poll.max_attempts) {
		budget.max_attempts = max_attempts;
	}
	if let Some(period_ms) = args.poll_period_ms.or(stored_poll.period_ms) {
		budget.period = Duration::from_millis(period_ms);
	}
	config.set_poll_budget(budget);

	Ok(config)
}

fn authenticator(args: &SubmitArgs, stored: Option<AuthSettings>) -> Result<Option<Arc<dyn Authenticator>>> {
	if let Some(credentials) = &args.basic {
		let (username, password) = credentials.split_once(':').ok_or(CliError::BasicCredentials)?;
		return Ok(Some(Arc::new(BasicAuthenticator::new(username, password))));
	}

	if let Some(token) = &args.token {
		return Ok(Some(Arc::new(BearerAuthenticator::new(token.as_str()))));
	}

	Ok(stored.map(|auth| -> Arc<dyn Authenticator> {
		match auth {
			AuthSettings::None => Arc::new(NullAuthenticator),
			AuthSettings::Basic { username, password } => Arc::new(BasicAuthenticator::new(username, password)),
			AuthSettings::Bearer { token } => Arc::new(BearerAuthenticator::new(token)),
		}
	}))
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use provisioning::HttpRequest;

	use super::*;
	use crate::settings::PollSettings;

	const SUBMIT_URI: &str = "https://veraison.example/endorsement-provisioning/v1/submit";

	fn args() -> SubmitArgs {
		SubmitArgs {
			payload: PathBuf::from("corim.cbor"),
			media_type: "application/corim+cbor".to_string(),
			..Default::default()
		}
	}

	fn authorization(config: &SubmitConfig) -> Option<String> {
		let request = HttpRequest::new(provisioning::Method::Get, config.submit_uri().unwrap().clone());
		config.auth().unwrap().authorization(&request).unwrap()
	}

	#[test]
	fn flags_override_settings_file() {
		let settings = Settings {
			submit_uri: Some("http://other.example/submit".to_string()),
			ca_certs: vec![PathBuf::from("/etc/ca/file.pem")],
			..Default::default()
		};
		let args = SubmitArgs {
			uri: Some(SUBMIT_URI.to_string()),
			ca_certs: vec![PathBuf::from("/etc/ca/flag.pem")],
			..args()
		};

		let config = build_config(&args, settings).unwrap();

		assert_eq!(config.submit_uri().unwrap().as_str(), SUBMIT_URI);
		assert!(config.use_tls());
		assert_eq!(config.ca_certs(), [PathBuf::from("/etc/ca/flag.pem")]);
	}

	#[test]
	fn settings_fill_in_missing_flags() {
		let settings = Settings {
			submit_uri: Some(SUBMIT_URI.to_string()),
			ca_certs: vec![PathBuf::from("/etc/ca/file.pem")],
			insecure: true,
			delete_session: true,
			auth: Some(AuthSettings::Bearer { token: "abc".to_string() }),
			poll: Some(PollSettings {
				max_attempts: Some(10),
				period_ms: Some(250),
			}),
		};

		let config = build_config(&args(), settings).unwrap();

		assert_eq!(config.ca_certs(), [PathBuf::from("/etc/ca/file.pem")]);
		assert!(config.is_insecure());
		assert!(config.delete_session());
		assert_eq!(config.poll_budget(), PollBudget::new(10, Duration::from_millis(250)));
		assert_eq!(authorization(&config).as_deref(), Some("Bearer abc"));
	}

	#[test]
	fn basic_flag_beats_stored_credentials() {
		let settings = Settings {
			submit_uri: Some(SUBMIT_URI.to_string()),
			auth: Some(AuthSettings::Bearer { token: "abc".to_string() }),
			..Default::default()
		};
		let args = SubmitArgs {
			basic: Some("user:pa:ss".to_string()),
			..args()
		};

		let config = build_config(&args, settings).unwrap();

		assert_eq!(authorization(&config).as_deref(), Some("Basic dXNlcjpwYTpzcw=="));
	}

	#[test]
	fn malformed_basic_flag_is_rejected() {
		let args = SubmitArgs {
			uri: Some(SUBMIT_URI.to_string()),
			basic: Some("no-colon".to_string()),
			..args()
		};

		assert!(matches!(build_config(&args, Settings::default()), Err(CliError::BasicCredentials)));
	}

	#[test]
	fn missing_uri_surfaces_at_run() {
		let config = build_config(&args(), Settings::default()).unwrap();

		assert!(config.submit_uri().is_none());
		let err = config.run(b"test corim", "application/corim+cbor").unwrap_err();
		assert!(err.is_configuration());
	}

	#[test]
	fn relative_uri_is_a_configuration_error() {
		let args = SubmitArgs {
			uri: Some("veraison.example/submit".to_string()),
			..args()
		};

		let err = build_config(&args, Settings::default()).unwrap_err();
		assert!(matches!(err, CliError::Provisioning(ref e) if e.is_configuration()));
	}

	#[test]
	fn default_poll_budget_is_kept() {
		let config = build_config(&args(), Settings::default()).unwrap();
		assert_eq!(config.poll_budget(), PollBudget::default());
	}
}
