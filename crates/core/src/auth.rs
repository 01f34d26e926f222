//! Authorization header suppliers.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::AuthError;
use crate::transport::HttpRequest;

/// Supplies the `Authorization` header for outgoing requests.
///
/// Returning `Ok(None)` sends the request unauthenticated.
pub trait Authenticator: Send + Sync + fmt::Debug {
	fn authorization(&self, request: &HttpRequest) -> Result<Option<String>, AuthError>;
}

/// Never authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullAuthenticator;

impl Authenticator for NullAuthenticator {
	fn authorization(&self, _request: &HttpRequest) -> Result<Option<String>, AuthError> {
		Ok(None)
	}
}

/// HTTP Basic credentials.
#[derive(Clone)]
pub struct BasicAuthenticator {
	username: String,
	password: String,
}

impl BasicAuthenticator {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}
}

impl fmt::Debug for BasicAuthenticator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BasicAuthenticator")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

impl Authenticator for BasicAuthenticator {
	fn authorization(&self, _request: &HttpRequest) -> Result<Option<String>, AuthError> {
		if self.username.is_empty() {
			return Err(AuthError::MissingCredentials("username"));
		}
		let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
		Ok(Some(format!("Basic {encoded}")))
	}
}

/// A pre-issued bearer token.
#[derive(Clone)]
pub struct BearerAuthenticator {
	token: String,
}

impl BearerAuthenticator {
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into() }
	}
}

impl fmt::Debug for BearerAuthenticator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BearerAuthenticator").field("token", &"<redacted>").finish()
	}
}

impl Authenticator for BearerAuthenticator {
	fn authorization(&self, _request: &HttpRequest) -> Result<Option<String>, AuthError> {
		let token = self.token.trim();
		if token.is_empty() {
			return Err(AuthError::MissingCredentials("bearer token"));
		}
		Ok(Some(format!("Bearer {token}")))
	}
}
