//! Error types for endorsement submission.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can make [`SubmitConfig::run`](crate::SubmitConfig::run) fail.
#[derive(Debug, Error)]
pub enum Error {
	/// Bad or missing setup, detected before any request is sent.
	#[error("bad configuration: {0}")]
	Configuration(String),

	/// A request could not be sent.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The server answered but broke the session protocol.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),

	/// The server reported that the submission failed.
	#[error("submission failed{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
	Submission { reason: Option<String> },

	/// Still `processing` after the last poll attempt.
	#[error("polling attempts exhausted, session resource state still not complete")]
	PollTimeout { attempts: u32 },
}

impl Error {
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::Configuration(_))
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// True for every protocol violation, including body decode failures.
	pub fn is_protocol(&self) -> bool {
		matches!(self, Self::Protocol(_))
	}

	pub fn is_decode(&self) -> bool {
		matches!(self, Self::Protocol(ProtocolError::Decode(_)))
	}

	pub fn is_submission(&self) -> bool {
		matches!(self, Self::Submission { .. })
	}

	pub fn is_poll_timeout(&self) -> bool {
		matches!(self, Self::PollTimeout { .. })
	}
}

impl From<DecodeError> for Error {
	fn from(err: DecodeError) -> Self {
		Self::Protocol(ProtocolError::Decode(err))
	}
}

/// Failures that prevent a request from reaching the server.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("{method} {url} failed: {source}")]
	Request {
		method: String,
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("cannot read CA certificate {}: {source}", path.display())]
	ReadCertificate {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid CA certificate {}: {source}", path.display())]
	ParseCertificate {
		path: PathBuf,
		#[source]
		source: reqwest::Error,
	},

	#[error("failed to build HTTP client: {0}")]
	Build(#[source] reqwest::Error),

	#[error("cannot produce Authorization header: {0}")]
	Authorization(#[from] AuthError),

	/// Raised by non-reqwest transports.
	#[error("connection failed: {0}")]
	Connection(String),
}

/// Server responses that do not follow the session protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
	#[error("unexpected HTTP response code {0}")]
	UnexpectedStatusCode(u16),

	#[error("session resource fetch returned an unexpected status: {0}")]
	UnexpectedPollStatusCode(u16),

	#[error("unexpected session state {state:?} in {code} response")]
	UnexpectedSessionState { state: String, code: u16 },

	#[error("cannot determine URI for the session resource: {0}")]
	Location(#[from] LocationError),

	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Why the follow-up resource URI could not be derived.
#[derive(Debug, Error)]
pub enum LocationError {
	#[error("no Location header found in response")]
	Missing,

	#[error("malformed Location {location:?}: {source}")]
	Malformed {
		location: String,
		#[source]
		source: url::ParseError,
	},
}

/// Session resource body problems.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("empty body")]
	EmptyBody,

	#[error("session resource with unexpected content type: {0:?}")]
	UnexpectedContentType(String),

	#[error("failure decoding session resource: {0}")]
	Json(#[from] serde_json::Error),
}

/// Authenticator failures.
#[derive(Debug, Error)]
pub enum AuthError {
	#[error("missing credentials: {0}")]
	MissingCredentials(&'static str),
}
