//! # drover-sf-bulk
//!
//! Salesforce Bulk API 2.0 ingest job orchestration.
//!
//! A batch of records goes in; a job is created on the org, the batch is
//! uploaded as CSV, the job is polled to a terminal state, and the
//! per-record outcomes come back as a list of [`ResultRecord`]s — failures
//! first, then successes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use drover_sf_bulk::BulkService;
//! use drover_sf_client::SalesforceSession;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), drover_sf_bulk::Error> {
//!     let session = SalesforceSession::new(
//!         "https://myorg.my.salesforce.com",
//!         "access_token",
//!     )?;
//!
//!     let bulk = BulkService::new(session);
//!
//!     let results = bulk
//!         .insert("Account", &[
//!             json!({"Name": "Acme Corp", "Industry": "Technology"}),
//!             json!({"Name": "Global Inc", "Industry": "Finance"}),
//!         ])
//!         .await?;
//!
//!     println!("{} outcomes", results.len());
//!     Ok(())
//! }
//! ```
//!
//! Stepwise control over a single job is available through
//! [`BulkService::create_job`] and the [`IngestJob`] handle; repeated
//! operations against one sObject can go through
//! [`BulkService::object`].
//!
//! Bulk *query* jobs are out of scope: [`BulkService::select`] and
//! [`IngestJob::unprocessed_records`] return
//! [`ErrorKind::Unsupported`].

pub mod encoder;
mod error;
mod job;
mod service;
mod types;

pub use error::{Error, ErrorKind, Result};
pub use job::{IngestJob, DEFAULT_POLL_INTERVAL};
pub use service::{BulkObject, BulkService};
pub use types::*;
