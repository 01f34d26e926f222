//! Polling of the follow-up session resource.

use std::thread;
use std::time::Duration;

use provisioning_protocol::{SESSION_MEDIA_TYPE, SessionRecord, SessionStatus};
use tracing::{debug, info};
use url::Url;

use crate::client::Client;
use crate::decode::decode_session;
use crate::error::{Error, ProtocolError, Result};
use crate::submit::settle;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Bounds how long an asynchronous submission is polled.
///
/// Attempts are numbered from 1 and stop before `max_attempts`, so at most
/// `max_attempts - 1` GET requests are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
	pub max_attempts: u32,
	pub period: Duration,
}

impl PollBudget {
	pub const fn new(max_attempts: u32, period: Duration) -> Self {
		Self { max_attempts, period }
	}

	/// Number of GET requests this budget allows.
	pub fn requests(&self) -> u32 {
		self.max_attempts.saturating_sub(1)
	}
}

impl Default for PollBudget {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_PERIOD)
	}
}

/// GETs `uri` until the session leaves `processing` or the budget runs out.
///
/// Transport and protocol errors end polling immediately; only `processing`
/// is retried.
pub(crate) fn poll_until_terminal(client: &Client, uri: &Url, budget: PollBudget) -> Result<SessionRecord> {
	for attempt in 1..budget.max_attempts {
		debug!(target = "provisioning", %uri, attempt, "polling session resource");

		let response = client.get_resource(SESSION_MEDIA_TYPE, uri)?;
		if response.status != 200 {
			return Err(ProtocolError::UnexpectedPollStatusCode(response.status).into());
		}

		let session = decode_session(&response)?;
		if session.status == SessionStatus::Processing {
			thread::sleep(budget.period);
			continue;
		}

		info!(target = "provisioning", %uri, attempt, status = %session.status, "session reached terminal state");
		return settle(session, 200);
	}

	Err(Error::PollTimeout {
		attempts: budget.requests(),
	})
}
