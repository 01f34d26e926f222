//! Endorsement submission state machine.
//!
//! A submission is one POST to the submit endpoint. The server either
//! completes it synchronously (`200 OK` with a terminal session) or accepts it
//! for processing (`201 Created` with a `processing` session and a `Location`
//! for the follow-up resource), in which case the session is polled until it
//! settles.

use provisioning_protocol::{SESSION_MEDIA_TYPE, SessionRecord, SessionStatus};
use tracing::{debug, info, warn};
use url::Url;

use crate::client::Client;
use crate::decode::decode_session;
use crate::error::{Error, LocationError, ProtocolError, Result};
use crate::poll::{PollBudget, poll_until_terminal};
use crate::transport::HttpResponse;

/// A validated submit target bound to the client resolved for this run.
#[derive(Debug)]
pub(crate) struct Submission {
	client: Client,
	submit_uri: Url,
	budget: PollBudget,
	delete_session: bool,
}

impl Submission {
	pub(crate) fn new(client: Client, submit_uri: Url, budget: PollBudget, delete_session: bool) -> Self {
		Self {
			client,
			submit_uri,
			budget,
			delete_session,
		}
	}

	pub(crate) fn run(&self, payload: &[u8], media_type: &str) -> Result<SessionRecord> {
		debug!(target = "provisioning", uri = %self.submit_uri, %media_type, size = payload.len(), "submitting endorsement");

		let response = self
			.client
			.post_resource(payload.to_vec(), media_type, SESSION_MEDIA_TYPE, &self.submit_uri)?;

		if response.status != 200 && response.status != 201 {
			return Err(ProtocolError::UnexpectedStatusCode(response.status).into());
		}

		let session = decode_session(&response)?;

		if response.status == 200 {
			info!(target = "provisioning", status = %session.status, "submission handled synchronously");
			return settle(session, 200);
		}

		if session.status != SessionStatus::Processing {
			return Err(unexpected_state(&session.status, 201));
		}

		let session_uri = extract_location(&response, &self.submit_uri).map_err(ProtocolError::from)?;
		info!(target = "provisioning", uri = %session_uri, "submission accepted, polling session resource");

		let outcome = poll_until_terminal(&self.client, &session_uri, self.budget);

		if self.delete_session {
			if let Err(err) = self.delete_session_resource(&session_uri) {
				warn!(target = "provisioning", uri = %session_uri, error = %err, "DELETE of session resource failed");
			}
		}

		outcome
	}

	/// Best-effort removal of the follow-up resource.
	///
	/// The caller only logs the result.
	pub(crate) fn delete_session_resource(&self, uri: &Url) -> Result<()> {
		let response = self.client.delete_resource(uri)?;
		if !response.is_success() {
			return Err(ProtocolError::UnexpectedStatusCode(response.status).into());
		}
		debug!(target = "provisioning", %uri, "session resource deleted");
		Ok(())
	}
}

/// Maps a decoded session onto the run outcome.
///
/// `code` is the HTTP status the session arrived with and only appears in
/// the error for unexpected states.
pub(crate) fn settle(session: SessionRecord, code: u16) -> Result<SessionRecord> {
	match session.status {
		SessionStatus::Success => Ok(session),
		SessionStatus::Failed => Err(Error::Submission {
			reason: session.failure_reason,
		}),
		other => Err(unexpected_state(&other, code)),
	}
}

fn unexpected_state(status: &SessionStatus, code: u16) -> Error {
	ProtocolError::UnexpectedSessionState {
		state: status.to_string(),
		code,
	}
	.into()
}

/// Resolves the `Location` header of `response` against `base`.
pub(crate) fn extract_location(response: &HttpResponse, base: &Url) -> std::result::Result<Url, LocationError> {
	let location = response.header("location").ok_or(LocationError::Missing)?;
	base.join(location).map_err(|source| LocationError::Malformed {
		location: location.to_string(),
		source,
	})
}
