//! Authenticated request helper shared by submit, poll and cleanup.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::auth::Authenticator;
use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// One transport handle plus the optional authenticator applied to every request.
///
/// Cloning is cheap and clones share the same transport.
#[derive(Debug, Clone)]
pub struct Client {
	transport: Arc<dyn Transport>,
	auth: Option<Arc<dyn Authenticator>>,
}

impl Client {
	pub fn new<T: Transport + 'static>(transport: T) -> Self {
		Self::from_shared(Arc::new(transport))
	}

	pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
		Self { transport, auth: None }
	}

	pub fn with_auth(mut self, auth: Arc<dyn Authenticator>) -> Self {
		self.auth = Some(auth);
		self
	}

	pub fn set_auth(&mut self, auth: Option<Arc<dyn Authenticator>>) {
		self.auth = auth;
	}

	pub fn auth(&self) -> Option<&Arc<dyn Authenticator>> {
		self.auth.as_ref()
	}

	/// POSTs `body` as `content_type`, asking for `accept` back.
	pub fn post_resource(&self, body: Vec<u8>, content_type: &str, accept: &str, url: &Url) -> Result<HttpResponse, TransportError> {
		let request = HttpRequest::new(Method::Post, url.clone())
			.with_header("Content-Type", content_type)
			.with_header("Accept", accept)
			.with_body(body);
		self.send(request)
	}

	pub fn get_resource(&self, accept: &str, url: &Url) -> Result<HttpResponse, TransportError> {
		self.send(HttpRequest::new(Method::Get, url.clone()).with_header("Accept", accept))
	}

	pub fn delete_resource(&self, url: &Url) -> Result<HttpResponse, TransportError> {
		self.send(HttpRequest::new(Method::Delete, url.clone()))
	}

	fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, TransportError> {
		if let Some(auth) = &self.auth {
			if let Some(value) = auth.authorization(&request)? {
				request = request.with_header("Authorization", value);
			}
		}

		debug!(target = "provisioning", method = %request.method, url = %request.url, "sending request");
		let response = self.transport.send(request)?;
		debug!(target = "provisioning", status = response.status, "received response");
		Ok(response)
	}
}
