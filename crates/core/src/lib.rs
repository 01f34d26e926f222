//! Blocking client for the endorsement provisioning API.
//!
//! An endorsement (for example a CoRIM) is POSTed to the provisioning
//! `/submit` endpoint. The server either settles the submission immediately or
//! accepts it and exposes a session resource that is polled until it reaches a
//! terminal state.
//!
//! # Example
//!
//! ```ignore
//! use provisioning::{BearerAuthenticator, SubmitConfig};
//! use std::sync::Arc;
//!
//! let mut config = SubmitConfig::new("https://veraison.example/endorsement-provisioning/v1/submit")?;
//! config.set_auth(Arc::new(BearerAuthenticator::new(token)));
//! config.set_delete_session(true);
//!
//! let session = config.run(&corim, "application/corim-unsigned+cbor")?;
//! println!("accepted, expires {}", session.expiry);
//! ```
//!
//! # Module Organization
//!
//! - [`config`] - [`SubmitConfig`] builder and the `run` entry point
//! - [`transport`] - [`Transport`] trait and the reqwest-backed [`HttpTransport`]
//! - [`auth`] - `Authorization` header suppliers
//! - [`decode`] - session resource decoding
//! - [`fake_transport`] - scripted in-memory transport for tests

pub mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod fake_transport;
pub mod poll;
pub mod transport;

mod submit;

pub use auth::{Authenticator, BasicAuthenticator, BearerAuthenticator, NullAuthenticator};
pub use client::Client;
pub use config::SubmitConfig;
pub use decode::decode_session;
pub use error::{AuthError, DecodeError, Error, LocationError, ProtocolError, Result, TransportError};
pub use poll::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_PERIOD, PollBudget};
pub use provisioning_protocol::{SESSION_MEDIA_TYPE, SessionRecord, SessionStatus};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TlsMode, Transport};
