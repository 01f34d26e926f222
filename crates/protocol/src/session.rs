//! Provisioning session resource.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Media type of the provisioning session resource.
pub const SESSION_MEDIA_TYPE: &str = "application/vnd.veraison.provisioning-session+json";

/// Lifecycle state reported by the server for a submission.
///
/// Unknown states are kept verbatim so they can be reported back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
	Success,
	Failed,
	Processing,
	Unrecognized(String),
}

impl SessionStatus {
	/// Returns the wire representation of this status.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Success => "success",
			Self::Failed => "failed",
			Self::Processing => "processing",
			Self::Unrecognized(other) => other,
		}
	}
}

impl From<String> for SessionStatus {
	fn from(value: String) -> Self {
		match value.as_str() {
			"success" => Self::Success,
			"failed" => Self::Failed,
			"processing" => Self::Processing,
			_ => Self::Unrecognized(value),
		}
	}
}

impl From<&str> for SessionStatus {
	fn from(value: &str) -> Self {
		Self::from(value.to_string())
	}
}

impl From<SessionStatus> for String {
	fn from(status: SessionStatus) -> Self {
		match status {
			SessionStatus::Unrecognized(other) => other,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Server-side state of one endorsement submission.
///
/// Decoded from a [`SESSION_MEDIA_TYPE`] body. `expiry` is an opaque
/// timestamp and is passed through unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
	pub status: SessionStatus,
	#[serde(default)]
	pub expiry: String,
	#[serde(rename = "failure-reason", default, skip_serializing_if = "Option::is_none")]
	pub failure_reason: Option<String>,
}
