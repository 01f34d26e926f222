//! Fake transport for unit testing the submit/poll flow.
//!
//! Provides an in-memory [`Transport`] that replays scripted responses and
//! records every request it receives.
//!
//! # Example
//!
//! ```ignore
//! let (transport, controller) = FakeTransportBuilder::new()
//!     .respond(session_response(201, r#"{"status":"processing"}"#).with_header("Location", "/session/1"))
//!     .respond(session_response(200, r#"{"status":"success"}"#))
//!     .build();
//!
//! let mut config = SubmitConfig::new("http://veraison.example/submit")?;
//! config.set_client(Client::new(transport));
//! let record = config.run(b"test corim", "application/corim+cbor")?;
//! assert_eq!(controller.take_sent().len(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use provisioning_protocol::SESSION_MEDIA_TYPE;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

type Scripted = Result<HttpResponse, TransportError>;
type Fallback = Box<dyn Fn(&HttpRequest) -> Scripted + Send + Sync>;

/// Builds a response carrying a session resource body.
pub fn session_response(status: u16, body: &str) -> HttpResponse {
	HttpResponse::new(status).with_header("Content-Type", SESSION_MEDIA_TYPE).with_body(body)
}

/// Builder for creating fake transport instances.
#[derive(Default)]
pub struct FakeTransportBuilder {
	script: VecDeque<Scripted>,
	fallback: Option<Fallback>,
}

impl FakeTransportBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queue a response for the next unanswered request.
	pub fn respond(mut self, response: HttpResponse) -> Self {
		self.script.push_back(Ok(response));
		self
	}

	/// Queue a send failure for the next unanswered request.
	pub fn fail(mut self, message: &str) -> Self {
		self.script.push_back(Err(TransportError::Connection(message.to_string())));
		self
	}

	/// Answer requests with `handler` once the script runs out.
	pub fn fallback<F>(mut self, handler: F) -> Self
	where
		F: Fn(&HttpRequest) -> Scripted + Send + Sync + 'static,
	{
		self.fallback = Some(Box::new(handler));
		self
	}

	/// Build the fake transport and return it with a controller.
	///
	/// The [`FakeTransportController`] shares state with the transport, so it
	/// keeps working after the transport is moved into a [`Client`](crate::Client).
	pub fn build(self) -> (FakeTransport, FakeTransportController) {
		let state = Arc::new(Mutex::new(State {
			script: self.script,
			sent: Vec::new(),
		}));
		let transport = FakeTransport {
			state: Arc::clone(&state),
			fallback: self.fallback.map(Arc::from),
		};
		(transport, FakeTransportController { state })
	}
}

struct State {
	script: VecDeque<Scripted>,
	sent: Vec<HttpRequest>,
}

/// In-memory [`Transport`].
#[derive(Clone)]
pub struct FakeTransport {
	state: Arc<Mutex<State>>,
	fallback: Option<Arc<dyn Fn(&HttpRequest) -> Scripted + Send + Sync>>,
}

impl std::fmt::Debug for FakeTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("FakeTransport")
			.field("pending", &state.script.len())
			.field("sent", &state.sent.len())
			.finish()
	}
}

impl Transport for FakeTransport {
	fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let scripted = {
			let mut state = self.state.lock();
			state.sent.push(request.clone());
			state.script.pop_front()
		};

		match (scripted, &self.fallback) {
			(Some(next), _) => next,
			(None, Some(handler)) => handler(&request),
			(None, None) => Err(TransportError::Connection(format!(
				"no scripted response for {} {}",
				request.method, request.url
			))),
		}
	}
}

/// Controller for queueing responses and inspecting sent requests.
#[derive(Clone)]
pub struct FakeTransportController {
	state: Arc<Mutex<State>>,
}

impl FakeTransportController {
	pub fn push_response(&self, response: HttpResponse) {
		self.state.lock().script.push_back(Ok(response));
	}

	/// Take all sent requests, clearing the buffer.
	pub fn take_sent(&self) -> Vec<HttpRequest> {
		std::mem::take(&mut self.state.lock().sent)
	}

	pub fn sent_count(&self) -> usize {
		self.state.lock().sent.len()
	}

	pub fn pending(&self) -> usize {
		self.state.lock().script.len()
	}
}
