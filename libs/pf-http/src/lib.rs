#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! JSON REST client for the PaintFlow backend.
//!
//! A thin layer over hyper-util's pooled client:
//! - HTTPS via rustls (native roots); plain HTTP is accepted for local backends
//! - per-request timeout covering connect, send and body read
//! - optional bearer token per call, marked sensitive so it never shows up in
//!   header debug output
//! - non-2xx statuses become [`HttpError::Status`], distinct from transport
//!   failures so callers can tell "server said no" from "server unreachable"
//!
//! ```ignore
//! let client = HttpClient::new(HttpClientConfig::new("https://api.example.com/api"))?;
//! let prefs: Preferences = client.get_json("/preferences", Some(token)).await?;
//! ```

mod auth;
mod client;
mod config;
mod error;
mod tls;

pub use auth::{BearerSource, NoBearer};
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig};
pub use error::HttpError;
