//! HTTP transport abstraction and the reqwest-backed implementation.
//!
//! The submission logic only needs to issue GET/POST/DELETE requests with a
//! few headers and read back status, headers and body. [`Transport`] exposes
//! exactly that, so tests can swap in
//! [`FakeTransport`](crate::fake_transport::FakeTransport) and callers can
//! bring their own stack.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// HTTP methods used by the provisioning API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Delete,
}

impl Method {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Delete => "DELETE",
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub method: Method,
	pub url: Url,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

impl HttpRequest {
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			headers: Vec::new(),
			body: Vec::new(),
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = body;
		self
	}

	/// Look up a request header by name (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	/// Response headers with lowercase names.
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

impl HttpResponse {
	pub fn new(status: u16) -> Self {
		Self {
			status,
			headers: Vec::new(),
			body: Vec::new(),
		}
	}

	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.push((name.to_lowercase(), value.into()));
		self
	}

	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();
		self
	}

	/// Look up a response header by name (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
	headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
}

/// Sends one request and returns the buffered response.
///
/// Implementations must not retry: a request either reaches the server once
/// or fails with [`TransportError`].
pub trait Transport: Send + Sync + fmt::Debug {
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// How an [`HttpTransport`] treats server certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
	/// No TLS configuration beyond reqwest defaults; used for `http` endpoints.
	Plain,
	/// System trust store plus any extra CA certificates.
	Verified,
	/// Server certificates are not verified.
	Insecure,
}

/// [`Transport`] backed by a blocking [`reqwest`] client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	inner: reqwest::blocking::Client,
	mode: TlsMode,
}

impl HttpTransport {
	/// Plain HTTP transport.
	pub fn plain() -> Result<Self, TransportError> {
		let inner = reqwest::blocking::Client::builder().build().map_err(TransportError::Build)?;
		Ok(Self { inner, mode: TlsMode::Plain })
	}

	/// TLS transport trusting the system roots and every PEM file in `ca_certs`.
	pub fn tls<P: AsRef<Path>>(ca_certs: &[P]) -> Result<Self, TransportError> {
		let mut builder = reqwest::blocking::Client::builder().tls_built_in_root_certs(true);
		for path in ca_certs {
			builder = builder.add_root_certificate(load_certificate(path.as_ref())?);
		}
		let inner = builder.build().map_err(TransportError::Build)?;
		Ok(Self { inner, mode: TlsMode::Verified })
	}

	/// TLS transport that skips server certificate verification.
	pub fn insecure_tls() -> Result<Self, TransportError> {
		let inner = reqwest::blocking::Client::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.map_err(TransportError::Build)?;
		Ok(Self { inner, mode: TlsMode::Insecure })
	}

	pub fn mode(&self) -> TlsMode {
		self.mode
	}
}

fn load_certificate(path: &Path) -> Result<reqwest::Certificate, TransportError> {
	let pem = fs::read(path).map_err(|source| TransportError::ReadCertificate {
		path: PathBuf::from(path),
		source,
	})?;
	debug!(target = "provisioning", path = %path.display(), "loaded CA certificate");
	reqwest::Certificate::from_pem(&pem).map_err(|source| TransportError::ParseCertificate {
		path: PathBuf::from(path),
		source,
	})
}

impl Transport for HttpTransport {
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let HttpRequest { method, url, headers, body } = request;
		let request_error = |source| TransportError::Request {
			method: method.to_string(),
			url: url.to_string(),
			source,
		};

		let mut builder = self.inner.request(method.into(), url.clone());
		for (name, value) in &headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if method == Method::Post || !body.is_empty() {
			builder = builder.body(body);
		}

		let response = builder.send().map_err(request_error)?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.map(|(name, value)| (name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
			.collect();
		let body = response.bytes().map_err(request_error)?.to_vec();

		Ok(HttpResponse { status, headers, body })
	}
}
