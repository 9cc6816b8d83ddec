//! # drover-sf-client
//!
//! HTTP transport for the drover-sf Salesforce Bulk API client.
//!
//! This crate provides the foundational HTTP layer:
//! - Request building with bearer authentication and typed bodies
//! - Response handling with Salesforce error-document decoding
//! - Connection pooling and response compression
//! - Request/response tracing
//!
//! There is deliberately no retry machinery here: one request, one
//! response, and every failure surfaces to the caller.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  drover-sf-bulk                       │
//! │  (jobs, batches, results)                             │
//! └───────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                 SalesforceSession                     │
//! │  - Instance URL + access token + API version          │
//! │  - Authenticated request builders, Bulk API URLs      │
//! │  - Typed JSON methods (get_json, post_json, ...)      │
//! └───────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                    HttpClient                         │
//! │  - reqwest wrapper, error mapping                     │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use drover_sf_client::SalesforceSession;
//!
//! let session = SalesforceSession::new(
//!     "https://myorg.my.salesforce.com",
//!     "access_token",
//! )?;
//!
//! let job: serde_json::Value = session
//!     .get_json(&session.bulk_url("ingest/750xx000000001"))
//!     .await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod session;

pub use client::HttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;
pub use session::SalesforceSession;

/// Default Salesforce API version.
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("drover-sf/", env!("CARGO_PKG_VERSION"));
