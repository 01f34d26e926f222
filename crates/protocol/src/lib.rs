//! Session resource types for the endorsement provisioning API.
//!
//! A provisioning server describes the state of a submission with a small
//! JSON document served as [`SESSION_MEDIA_TYPE`]. [`SessionRecord`] is that
//! document and [`SessionStatus`] its `status` field. Statuses the server may
//! add later are kept verbatim in [`SessionStatus::Unrecognized`] so callers
//! can report them.

pub mod session;

pub use session::*;
