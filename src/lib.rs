//! Async client for the DNSimple REST API.
//!
//! Every call goes through [`Client::talk`]: credentials from the
//! [`ClientConfig`] become authentication headers, the JSON payload is sent,
//! the status code decides between success and [`Error`], and the body is
//! normalized (empty bodies, DELETE confirmations, single-key envelopes).
//!
//! ```no_run
//! # async fn run() -> dnsimple::Result<()> {
//! use dnsimple::{Client, ClientConfig};
//! use serde_json::json;
//!
//! let client = Client::new(ClientConfig::new().with_token("me@example.com", "api-token"))?;
//! let created = client
//!     .post("domains", &json!({ "domain": { "name": "example.com" } }))
//!     .await?;
//! println!("{} {:?}", created.status(), created.data);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod validation;

pub use api::client::Client;
pub use api::envelope::Enveloped;
pub use api::status::StatusClass;
pub use api::types::{Payload, Request, Response, ResponseMeta, Verb};
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
