//! Submission configuration.
//!
//! [`SubmitConfig`] is the mutable builder callers fill in. [`SubmitConfig::run`]
//! validates it, resolves the [`Client`] once and threads that client through
//! the POST, every poll and the optional cleanup. The configuration itself is
//! left untouched by a run.

use std::path::PathBuf;
use std::sync::Arc;

use provisioning_protocol::SessionRecord;
use tracing::debug;
use url::Url;

use crate::auth::Authenticator;
use crate::client::Client;
use crate::error::{Error, Result, TransportError};
use crate::poll::PollBudget;
use crate::submit::Submission;
use crate::transport::HttpTransport;

/// Context of one endorsement submission API session.
#[derive(Debug, Clone, Default)]
pub struct SubmitConfig {
	submit_uri: Option<Url>,
	client: Option<Client>,
	auth: Option<Arc<dyn Authenticator>>,
	ca_certs: Vec<PathBuf>,
	use_tls: bool,
	insecure: bool,
	delete_session: bool,
	poll_budget: PollBudget,
}

impl SubmitConfig {
	/// Creates a configuration targeting `submit_uri`.
	pub fn new(submit_uri: &str) -> Result<Self> {
		let mut config = Self::default();
		config.set_submit_uri(submit_uri)?;
		Ok(config)
	}

	/// Sets the URI of the `/submit` endpoint.
	///
	/// The URI must be absolute. `https` turns TLS on, any other scheme turns
	/// it off. On error nothing changes.
	pub fn set_submit_uri(&mut self, uri: &str) -> Result<()> {
		let parsed = Url::parse(uri).map_err(|err| match err {
			url::ParseError::RelativeUrlWithoutBase => Error::Configuration("uri is not absolute".to_string()),
			other => Error::Configuration(format!("malformed URI: {other}")),
		})?;
		self.use_tls = parsed.scheme() == "https";
		self.submit_uri = Some(parsed);
		Ok(())
	}

	/// Installs a caller-built client, injecting the configured authenticator.
	pub fn set_client(&mut self, mut client: Client) {
		if self.auth.is_some() {
			client.set_auth(self.auth.clone());
		}
		self.client = Some(client);
	}

	/// Sets the authenticator, also updating an already installed client.
	pub fn set_auth(&mut self, auth: Arc<dyn Authenticator>) {
		if let Some(client) = self.client.as_mut() {
			client.set_auth(Some(Arc::clone(&auth)));
		}
		self.auth = Some(auth);
	}

	/// Allows TLS connections without server certificate verification.
	///
	/// Ignored unless the submit URI uses `https`.
	pub fn set_insecure(&mut self, insecure: bool) {
		self.insecure = insecure;
	}

	/// CA certificates trusted in addition to the system roots.
	pub fn set_ca_certs<I, P>(&mut self, paths: I)
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.ca_certs = paths.into_iter().map(Into::into).collect();
	}

	/// DELETE the session resource once an asynchronous submission settles.
	pub fn set_delete_session(&mut self, delete_session: bool) {
		self.delete_session = delete_session;
	}

	pub fn set_poll_budget(&mut self, budget: PollBudget) {
		self.poll_budget = budget;
	}

	pub fn submit_uri(&self) -> Option<&Url> {
		self.submit_uri.as_ref()
	}

	pub fn use_tls(&self) -> bool {
		self.use_tls
	}

	pub fn is_insecure(&self) -> bool {
		self.insecure
	}

	pub fn ca_certs(&self) -> &[PathBuf] {
		&self.ca_certs
	}

	pub fn delete_session(&self) -> bool {
		self.delete_session
	}

	pub fn poll_budget(&self) -> PollBudget {
		self.poll_budget
	}

	pub fn auth(&self) -> Option<&Arc<dyn Authenticator>> {
		self.auth.as_ref()
	}

	pub fn client(&self) -> Option<&Client> {
		self.client.as_ref()
	}

	/// Fails unless a submit endpoint is configured.
	pub fn check(&self) -> Result<&Url> {
		self.submit_uri
			.as_ref()
			.ok_or_else(|| Error::Configuration("no API endpoint".to_string()))
	}

	/// Submits `endorsement` as `media_type` and waits for a terminal session.
	///
	/// Blocks the calling thread for the POST and, when the server processes
	/// the submission asynchronously, for up to
	/// `max_attempts - 1` polls spaced by the poll period.
	///
	/// # Errors
	///
	/// - [`Error::Configuration`] before any I/O if no endpoint is set
	/// - [`Error::Transport`] if a request cannot be sent or CA certificates cannot be loaded
	/// - [`Error::Protocol`] if the server breaks the session protocol
	/// - [`Error::Submission`] if the server reports the submission failed
	/// - [`Error::PollTimeout`] if the session is still processing after the last poll
	pub fn run(&self, endorsement: &[u8], media_type: &str) -> Result<SessionRecord> {
		let submit_uri = self.check()?.clone();
		let client = self.resolve_client()?;

		Submission::new(client, submit_uri, self.poll_budget, self.delete_session).run(endorsement, media_type)
	}

	/// Reuses the installed client or builds one matching the TLS settings.
	pub(crate) fn resolve_client(&self) -> Result<Client> {
		if let Some(client) = &self.client {
			return Ok(client.clone());
		}

		let mut client = Client::new(self.resolve_transport()?);
		client.set_auth(self.auth.clone());
		Ok(client)
	}

	pub(crate) fn resolve_transport(&self) -> std::result::Result<HttpTransport, TransportError> {
		if !self.use_tls {
			debug!(target = "provisioning", "using plain HTTP transport");
			return HttpTransport::plain();
		}

		if self.insecure {
			debug!(target = "provisioning", "using TLS transport without certificate verification");
			return HttpTransport::insecure_tls();
		}

		debug!(target = "provisioning", extra_ca_certs = self.ca_certs.len(), "using TLS transport");
		HttpTransport::tls(&self.ca_certs)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use provisioning_protocol::SessionStatus;

	use super::*;
	use crate::auth::{BearerAuthenticator, NullAuthenticator};
	use crate::fake_transport::{FakeTransportBuilder, session_response};
	use crate::transport::TlsMode;

	const SUBMIT_URI: &str = "http://veraison.example/endorsement-provisioning/v1/submit";

	#[test]
	fn check_accepts_configured_endpoint() {
		let config = SubmitConfig::new(SUBMIT_URI).unwrap();
		assert_eq!(config.check().unwrap().as_str(), SUBMIT_URI);
	}

	#[test]
	fn check_rejects_missing_endpoint() {
		let err = SubmitConfig::default().check().unwrap_err();
		assert!(err.is_configuration());
		assert_eq!(err.to_string(), "bad configuration: no API endpoint");
	}

	#[test]
	fn run_without_endpoint_sends_nothing() {
		let (transport, controller) = FakeTransportBuilder::new().fallback(|_| Ok(session_response(200, "{}"))).build();
		let mut config = SubmitConfig::default();
		config.set_client(Client::new(transport));

		let err = config.run(b"test corim", "application/corim+cbor").unwrap_err();

		assert!(err.is_configuration());
		assert_eq!(controller.sent_count(), 0);
	}

	#[test]
	fn relative_uri_is_rejected() {
		let mut config = SubmitConfig::default();
		let err = config.set_submit_uri("veraison.example/endorsement-provisioning/v1/submit").unwrap_err();
		assert_eq!(err.to_string(), "bad configuration: uri is not absolute");
		assert!(config.submit_uri().is_none());
	}

	#[test]
	fn malformed_uri_leaves_tls_flag_unchanged() {
		let mut config = SubmitConfig::new("https://veraison.example/submit").unwrap();
		assert!(config.use_tls());

		let err = config.set_submit_uri("http://[::1/submit").unwrap_err();

		assert!(err.to_string().starts_with("bad configuration: malformed URI: "));
		assert!(config.use_tls());
		assert_eq!(config.submit_uri().unwrap().as_str(), "https://veraison.example/submit");
	}

	#[test]
	fn scheme_drives_tls_flag() {
		let mut config = SubmitConfig::new("https://veraison.example/submit").unwrap();
		assert!(config.use_tls());

		config.set_submit_uri(SUBMIT_URI).unwrap();
		assert!(!config.use_tls());

		config.set_submit_uri("ftp://veraison.example/submit").unwrap();
		assert!(!config.use_tls());
	}

	#[test]
	fn transport_follows_tls_settings() {
		let config = SubmitConfig::new(SUBMIT_URI).unwrap();
		assert_eq!(config.resolve_transport().unwrap().mode(), TlsMode::Plain);

		let mut config = SubmitConfig::new("https://veraison.example/submit").unwrap();
		assert_eq!(config.resolve_transport().unwrap().mode(), TlsMode::Verified);

		config.set_insecure(true);
		assert_eq!(config.resolve_transport().unwrap().mode(), TlsMode::Insecure);
	}

	#[test]
	fn insecure_flag_is_ignored_without_tls() {
		let mut config = SubmitConfig::new(SUBMIT_URI).unwrap();
		config.set_insecure(true);
		assert_eq!(config.resolve_transport().unwrap().mode(), TlsMode::Plain);
	}

	#[test]
	fn unreadable_ca_cert_fails_resolution() {
		let mut config = SubmitConfig::new("https://veraison.example/submit").unwrap();
		config.set_ca_certs(["/test/path1", "/test/path2"]);

		let err = config.resolve_client().unwrap_err();

		assert!(err.is_transport());
		assert!(err.to_string().contains("/test/path1"));
	}

	#[test]
	fn unreadable_ca_cert_fails_run_before_sending() {
		let mut config = SubmitConfig::new("https://veraison.example/submit").unwrap();
		config.set_ca_certs(["/test/path1"]);

		let err = config.run(b"test corim", "application/corim+cbor").unwrap_err();

		assert!(matches!(err, Error::Transport(TransportError::ReadCertificate { .. })));
	}

	#[test]
	fn setters_store_values() {
		let mut config = SubmitConfig::new(SUBMIT_URI).unwrap();
		let (transport, _controller) = FakeTransportBuilder::new().build();
		config.set_client(Client::new(transport));

		config.set_delete_session(true);
		assert!(config.delete_session());

		let auth: Arc<dyn Authenticator> = Arc::new(NullAuthenticator);
		config.set_auth(Arc::clone(&auth));
		assert!(Arc::ptr_eq(config.auth().unwrap(), &auth));
		assert!(Arc::ptr_eq(config.client().unwrap().auth().unwrap(), &auth));

		config.set_insecure(true);
		assert!(config.is_insecure());

		config.set_ca_certs(["/test/path1", "/test/path2"]);
		assert_eq!(config.ca_certs(), [PathBuf::from("/test/path1"), PathBuf::from("/test/path2")]);

		let budget = PollBudget::new(3, Duration::from_millis(5));
		config.set_poll_budget(budget);
		assert_eq!(config.poll_budget(), budget);
	}

	#[test]
	fn set_client_picks_up_existing_authenticator() {
		let mut config = SubmitConfig::new(SUBMIT_URI).unwrap();
		let auth: Arc<dyn Authenticator> = Arc::new(BearerAuthenticator::new("t0k"));
		config.set_auth(Arc::clone(&auth));

		let (transport, _controller) = FakeTransportBuilder::new().build();
		config.set_client(Client::new(transport));

		assert!(Arc::ptr_eq(config.client().unwrap().auth().unwrap(), &auth));
	}

	#[test]
	fn installed_client_is_reused_for_every_request() {
		let (transport, controller) = FakeTransportBuilder::new()
			.respond(session_response(201, r#"{"status":"processing"}"#).with_header("Location", "/session/1"))
			.respond(session_response(200, r#"{"status":"success"}"#))
			.respond(crate::transport::HttpResponse::new(204))
			.build();
		let mut config = SubmitConfig::new(SUBMIT_URI).unwrap();
		config.set_client(Client::new(transport));
		config.set_auth(Arc::new(BearerAuthenticator::new("t0k")));
		config.set_delete_session(true);
		config.set_poll_budget(PollBudget::new(3, Duration::ZERO));

		let record = config.run(b"test corim", "application/corim+cbor").unwrap();

		assert_eq!(record.status, SessionStatus::Success);
		let sent = controller.take_sent();
		assert_eq!(sent.len(), 3);
		assert!(sent.iter().all(|r| r.header("authorization") == Some("Bearer t0k")));
		assert_eq!(sent[1].url.as_str(), "http://veraison.example/session/1");
	}

	#[test]
	fn run_example_scenario() {
		let (transport, _controller) = FakeTransportBuilder::new()
			.respond(session_response(200, r#"{"status":"success","expiry":"2030-10-12T07:20:50.52Z"}"#))
			.build();
		let mut config = SubmitConfig::new("http://host/submit").unwrap();
		config.set_client(Client::new(transport));

		let record = config.run(b"test corim", "application/corim+cbor").unwrap();

		assert_eq!(
			record,
			SessionRecord {
				status: SessionStatus::Success,
				expiry: "2030-10-12T07:20:50.52Z".to_string(),
				failure_reason: None,
			}
		);
	}
}
