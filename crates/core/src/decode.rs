//! Session resource decoding.

use provisioning_protocol::{SESSION_MEDIA_TYPE, SessionRecord};

use crate::error::DecodeError;
use crate::transport::HttpResponse;

/// Decodes a [`SESSION_MEDIA_TYPE`] response body.
///
/// The status code is not inspected. The `Content-Type` must match the
/// session media type exactly, parameters included.
pub fn decode_session(response: &HttpResponse) -> Result<SessionRecord, DecodeError> {
	if response.body.is_empty() {
		return Err(DecodeError::EmptyBody);
	}

	let content_type = response.header("content-type").unwrap_or_default();
	if content_type != SESSION_MEDIA_TYPE {
		return Err(DecodeError::UnexpectedContentType(content_type.to_string()));
	}

	Ok(serde_json::from_slice(&response.body)?)
}
