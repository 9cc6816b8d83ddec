//! High-level bulk operations.

use std::time::Duration;

use serde_json::Value;
use tracing::instrument;

use drover_sf_client::SalesforceSession;

use crate::error::{Error, ErrorKind, Result};
use crate::job::{IngestJob, DEFAULT_POLL_INTERVAL};
use crate::types::{
    BulkOperation, CreateIngestJobRequest, IngestJobInfo, IngestJobList, ResultRecord,
};

/// Entry point for Bulk API 2.0 ingest operations.
///
/// Each of [`insert`](Self::insert), [`update`](Self::update),
/// [`upsert`](Self::upsert), and [`delete`](Self::delete) runs one job
/// end to end: create, upload, wait for a terminal state, and collect the
/// per-record outcomes. For stepwise control, use
/// [`create_job`](Self::create_job) and drive the [`IngestJob`] directly.
///
/// # Example
///
/// ```rust,ignore
/// use drover_sf_bulk::BulkService;
/// use drover_sf_client::SalesforceSession;
/// use serde_json::json;
///
/// let session = SalesforceSession::new(instance_url, access_token)?;
/// let bulk = BulkService::new(session);
///
/// let results = bulk
///     .insert("Account", &[
///         json!({"Name": "Acme"}),
///         json!({"Name": "Globex"}),
///     ])
///     .await?;
///
/// for record in results.iter().filter(|r| !r.is_success()) {
///     eprintln!("rejected: {:?}", record);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BulkService {
    session: SalesforceSession,
    poll_interval: Duration,
}

impl BulkService {
    /// Create a new bulk service over an authenticated session.
    pub fn new(session: SalesforceSession) -> Self {
        Self {
            session,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the polling interval used while waiting for jobs to finish.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the underlying session.
    pub fn session(&self) -> &SalesforceSession {
        &self.session
    }

    /// Insert new records.
    pub async fn insert(&self, object: &str, entries: &[Value]) -> Result<Vec<ResultRecord>> {
        self.run(BulkOperation::Insert, object, entries, None).await
    }

    /// Update existing records. Each entry must carry an `Id` field.
    pub async fn update(&self, object: &str, entries: &[Value]) -> Result<Vec<ResultRecord>> {
        self.run(BulkOperation::Update, object, entries, None).await
    }

    /// Upsert records, matching existing ones on `external_id_field`
    /// (conventionally `"Id"`).
    pub async fn upsert(
        &self,
        object: &str,
        entries: &[Value],
        external_id_field: &str,
    ) -> Result<Vec<ResultRecord>> {
        self.run(BulkOperation::Upsert, object, entries, Some(external_id_field))
            .await
    }

    /// Delete the records with the given ids.
    pub async fn delete<S: AsRef<str>>(
        &self,
        object: &str,
        ids: &[S],
    ) -> Result<Vec<ResultRecord>> {
        let entries: Vec<Value> = ids
            .iter()
            .map(|id| serde_json::json!({"Id": id.as_ref()}))
            .collect();
        self.run(BulkOperation::Delete, object, &entries, None).await
    }

    /// Querying through the ingest pipeline is not implemented by this
    /// client.
    pub async fn select(&self, _query: &str) -> Result<Vec<ResultRecord>> {
        Err(Error::new(ErrorKind::Unsupported("select".into())))
    }

    #[instrument(skip(self, entries), fields(operation = operation.api_name(), object = %object))]
    async fn run(
        &self,
        operation: BulkOperation,
        object: &str,
        entries: &[Value],
        external_id_field: Option<&str>,
    ) -> Result<Vec<ResultRecord>> {
        let job = self.create_job(operation, object, external_id_field).await?;
        job.upload(entries).await?;
        job.wait().await
    }

    /// Create a new ingest job and return a handle to it.
    #[instrument(skip(self), fields(operation = operation.api_name(), object = %object))]
    pub async fn create_job(
        &self,
        operation: BulkOperation,
        object: &str,
        external_id_field: Option<&str>,
    ) -> Result<IngestJob> {
        let mut request = CreateIngestJobRequest::new(object, operation);
        if let Some(field) = external_id_field {
            request = request.with_external_id_field(field);
        }

        let info: IngestJobInfo = self
            .session
            .post_json(&self.session.bulk_url("ingest"), &request)
            .await?;

        Ok(IngestJob::new(self.session.clone(), info.id)
            .with_poll_interval(self.poll_interval))
    }

    /// List the org's ingest jobs.
    #[instrument(skip(self))]
    pub async fn list_jobs(&self) -> Result<IngestJobList> {
        self.session
            .get_json(&self.session.bulk_url("ingest"))
            .await
            .map_err(Into::into)
    }

    /// Bind one object name, for callers issuing several operations
    /// against the same sObject.
    pub fn object(&self, name: impl Into<String>) -> BulkObject<'_> {
        BulkObject {
            name: name.into(),
            service: self,
        }
    }
}

/// Convenience facade over a [`BulkService`] with a fixed object name.
/// No behavior of its own.
#[derive(Debug, Clone)]
pub struct BulkObject<'a> {
    name: String,
    service: &'a BulkService,
}

impl BulkObject<'_> {
    /// The bound sObject API name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert new records.
    pub async fn insert(&self, entries: &[Value]) -> Result<Vec<ResultRecord>> {
        self.service.insert(&self.name, entries).await
    }

    /// Update existing records.
    pub async fn update(&self, entries: &[Value]) -> Result<Vec<ResultRecord>> {
        self.service.update(&self.name, entries).await
    }

    /// Upsert records on `external_id_field`.
    pub async fn upsert(
        &self,
        entries: &[Value],
        external_id_field: &str,
    ) -> Result<Vec<ResultRecord>> {
        self.service
            .upsert(&self.name, entries, external_id_field)
            .await
    }

    /// Delete the records with the given ids.
    pub async fn delete<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<ResultRecord>> {
        self.service.delete(&self.name, ids).await
    }
}
