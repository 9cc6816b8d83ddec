//! # drover-sf
//!
//! Salesforce Bulk API 2.0 ingest client for Rust.
//!
//! ## Crates
//!
//! - **drover-sf-client** - HTTP transport: authenticated sessions,
//!   request/response plumbing, error taxonomy
//! - **drover-sf-bulk** - Ingest jobs: CSV batch encoding, job lifecycle,
//!   result retrieval
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drover_sf::{BulkService, SalesforceSession};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SalesforceSession::new(
//!         "https://myorg.my.salesforce.com",
//!         "access_token",
//!     )?;
//!
//!     let results = BulkService::new(session)
//!         .insert("Account", &[json!({"Name": "Acme"})])
//!         .await?;
//!
//!     for record in results {
//!         println!("{record:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export the member crates for convenient access
pub use drover_sf_bulk as bulk;
pub use drover_sf_client as client;

// Re-export commonly used types at the top level
pub use drover_sf_bulk::{BulkObject, BulkService, IngestJob, ResultRecord};
pub use drover_sf_client::{ClientConfig, SalesforceSession};
