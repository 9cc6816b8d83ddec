//! Ingest job lifecycle.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, instrument};

use drover_sf_client::SalesforceSession;

use crate::encoder;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{IngestJobInfo, JobState, ResultRecord, UpdateJobStateRequest};

/// Default interval between job status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to one remote ingest job.
///
/// Owns the job id and a session; every state observation is a fresh
/// request to the org — nothing is cached locally. Handles are independent
/// of each other, so any number of jobs can run concurrently from separate
/// tasks over clones of one session.
///
/// # Example
///
/// ```rust,ignore
/// use drover_sf_bulk::{BulkOperation, BulkService};
/// use serde_json::json;
///
/// let service = BulkService::new(session);
/// let job = service
///     .create_job(BulkOperation::Insert, "Account", None)
///     .await?;
/// job.upload(&[json!({"Name": "Acme"})]).await?;
/// let results = job.wait().await?;
/// ```
#[derive(Debug, Clone)]
pub struct IngestJob {
    session: SalesforceSession,
    id: String,
    poll_interval: Duration,
}

impl IngestJob {
    /// Create a handle for an existing remote job.
    pub fn new(session: SalesforceSession, id: impl Into<String>) -> Self {
        Self {
            session,
            id: id.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the interval between status checks in [`wait`](Self::wait).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The remote-assigned job id.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn url(&self) -> String {
        self.session.bulk_url(&format!("ingest/{}", self.id))
    }

    fn sub_url(&self, sub: &str) -> String {
        format!("{}/{}", self.url(), sub)
    }

    /// Encode the batch, upload it, and mark the upload complete.
    ///
    /// The batches endpoint answers `201 Created` with an empty body on
    /// current API versions, so a response body that fails to decode as
    /// JSON is ignored; any other failure propagates. The state patch that
    /// follows is the authoritative signal that the batch is in.
    #[instrument(skip(self, entries), fields(job_id = %self.id))]
    pub async fn upload(&self, entries: &[serde_json::Value]) -> Result<()> {
        let body = encoder::encode(entries)?;
        debug!(rows = entries.len(), bytes = body.len(), "Uploading batch");

        let request = self.session.put(&self.sub_url("batches")).csv(body);
        let response = self.session.execute(request).await?;

        if let Err(err) = response.json::<serde_json::Value>().await {
            if !err.is_decode() {
                return Err(err.into());
            }
        }

        self.set_state(UpdateJobStateRequest::upload_complete())
            .await?;
        Ok(())
    }

    async fn set_state(&self, request: UpdateJobStateRequest) -> Result<IngestJobInfo> {
        self.session
            .patch_json(&self.url(), &request)
            .await
            .map_err(Into::into)
    }

    /// Transition the job to `UploadComplete`.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn close(&self) -> Result<IngestJobInfo> {
        self.set_state(UpdateJobStateRequest::upload_complete())
            .await
    }

    /// Abort the job.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn abort(&self) -> Result<IngestJobInfo> {
        self.set_state(UpdateJobStateRequest::abort()).await
    }

    /// Delete the remote job.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn delete(&self) -> Result<()> {
        self.session
            .delete_request(&self.url())
            .await
            .map_err(Into::into)
    }

    /// Fetch the full remote job descriptor.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn info(&self) -> Result<IngestJobInfo> {
        self.session.get_json(&self.url()).await.map_err(Into::into)
    }

    /// Fetch the current job state. Always a fresh request.
    pub async fn state(&self) -> Result<JobState> {
        Ok(self.info().await?.state)
    }

    /// Check whether the job has reached a terminal state.
    pub async fn is_done(&self) -> Result<bool> {
        Ok(self.state().await?.is_terminal())
    }

    /// Poll until the job reaches a terminal state, then collect results.
    ///
    /// Checks the job state, sleeping [`poll_interval`] between checks,
    /// until the state is terminal. A job that ended in `Failed` or
    /// `Aborted` becomes an [`ErrorKind::JobFailed`] error carrying the
    /// remote error message, and the result endpoints are not touched.
    /// On `JobComplete`, returns the failed results followed by the
    /// successful results.
    ///
    /// There is no timeout and no retry: the loop runs until a terminal
    /// state is observed, and any transport error aborts it.
    ///
    /// [`poll_interval`]: Self::with_poll_interval
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn wait(&self) -> Result<Vec<ResultRecord>> {
        let info = loop {
            let info = self.info().await?;
            if info.state.is_terminal() {
                break info;
            }
            debug!(state = ?info.state, "Job not done yet");
            sleep(self.poll_interval).await;
        };

        if info.state.is_failure() {
            let message = info.error_message.unwrap_or_else(|| {
                format!("job {} ended in state {:?}", self.id, info.state)
            });
            return Err(Error::new(ErrorKind::JobFailed(message)));
        }

        let mut results = self.failed_results().await?;
        results.extend(self.successful_results().await?);
        Ok(results)
    }

    /// Fetch the records the job applied successfully.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn successful_results(&self) -> Result<Vec<ResultRecord>> {
        self.results("successfulResults", ResultRecord::success_from_row)
            .await
    }

    /// Fetch the records the job rejected.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn failed_results(&self) -> Result<Vec<ResultRecord>> {
        self.results("failedResults", ResultRecord::failure_from_row)
            .await
    }

    /// Fetch one result set and map its data rows. The constructor is
    /// picked by the endpoint queried; the first (header) row is skipped.
    async fn results(
        &self,
        sub: &str,
        build: fn(&csv::StringRecord) -> ResultRecord,
    ) -> Result<Vec<ResultRecord>> {
        let request = self
            .session
            .get(&self.sub_url(sub))
            .header("Accept", "text/csv");
        let response = self.session.execute(request).await?;
        let body = response.text().await.map_err(Error::from)?;

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let mut records = Vec::new();
        for row in reader.records() {
            records.push(build(&row?));
        }
        Ok(records)
    }

    /// Record retrieval for rows the job never processed is not
    /// implemented by this client.
    pub async fn unprocessed_records(&self) -> Result<Vec<ResultRecord>> {
        Err(Error::new(ErrorKind::Unsupported(
            "unprocessed record retrieval".into(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_json(state: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "750xx000000001",
            "state": state,
            "object": "Account",
            "operation": "insert",
            "apiVersion": 62.0,
        })
    }

    async fn test_job(mock_server: &MockServer) -> IngestJob {
        let session = SalesforceSession::new(mock_server.uri(), "test-token").unwrap();
        IngestJob::new(session, "750xx000000001")
            .with_poll_interval(Duration::from_millis(1))
    }

    const JOB_PATH: &str = "/services/data/v62.0/jobs/ingest/750xx000000001";

    #[tokio::test]
    async fn upload_sends_csv_then_patches_state() {
        let mock_server = MockServer::start().await;

        // 201 with an empty body, like the real endpoint
        Mock::given(method("PUT"))
            .and(path(format!("{JOB_PATH}/batches")))
            .and(header("Content-Type", "text/csv"))
            .and(body_string("Name\nAcme\nGlobex\n"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(JOB_PATH))
            .and(body_json(serde_json::json!({"state": "UploadComplete"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_json("UploadComplete")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        job.upload(&[
            serde_json::json!({"Name": "Acme"}),
            serde_json::json!({"Name": "Globex"}),
        ])
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn upload_fails_fast_on_empty_batch() {
        let mock_server = MockServer::start().await;

        // No mocks mounted: an empty batch must not produce any request.
        let job = test_job(&mock_server).await;
        let err = job.upload(&[]).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encoding(_)));
    }

    #[tokio::test]
    async fn abort_patches_aborted_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(JOB_PATH))
            .and(body_json(serde_json::json!({"state": "Aborted"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_json("Aborted")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        let info = job.abort().await.unwrap();
        assert_eq!(info.state, JobState::Aborted);
    }

    #[tokio::test]
    async fn state_is_fetched_fresh_every_time() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_json("InProgress")))
            .expect(2)
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        assert_eq!(job.state().await.unwrap(), JobState::InProgress);
        assert!(!job.is_done().await.unwrap());
    }

    #[tokio::test]
    async fn wait_polls_until_terminal_and_returns_failures_first() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let mock_server = MockServer::start().await;
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .respond_with(move |_: &wiremock::Request| {
                let state = match call_count_clone.fetch_add(1, Ordering::SeqCst) {
                    0 => "Open",
                    1 => "UploadComplete",
                    _ => "JobComplete",
                };
                ResponseTemplate::new(200).set_body_json(job_json(state))
            })
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/failedResults")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("\"sf__Id\",\"sf__Error\"\n,REQUIRED_FIELD_MISSING\n"),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/successfulResults")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(
                    "\"sf__Id\",\"sf__Created\",\"Name\"\n001A,true,Acme\n001B,true,Globex\n",
                ),
            )
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        let results = job.wait().await.unwrap();

        assert!(call_count.load(Ordering::SeqCst) >= 2);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            ResultRecord::Failure {
                id: "".into(),
                error: "REQUIRED_FIELD_MISSING".into(),
            }
        );
        assert_eq!(results[1], ResultRecord::Success { id: "001A".into() });
        assert_eq!(results[2], ResultRecord::Success { id: "001B".into() });
    }

    #[tokio::test]
    async fn wait_surfaces_job_failure_without_fetching_results() {
        let mock_server = MockServer::start().await;

        let mut failed = job_json("Failed");
        failed["errorMessage"] = serde_json::json!("X");

        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(failed))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/failedResults")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/successfulResults")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        let err = job.wait().await.unwrap_err();
        match err.kind {
            ErrorKind::JobFailed(message) => assert_eq!(message, "X"),
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_results_maps_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/failedResults")))
            .and(header("Accept", "text/csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("sf__Id,sf__Error\n001,BAD\n"))
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        let results = job.failed_results().await.unwrap();

        assert_eq!(
            results,
            vec![ResultRecord::Failure {
                id: "001".into(),
                error: "BAD".into(),
            }]
        );
    }

    #[tokio::test]
    async fn header_only_result_set_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/successfulResults")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("sf__Id,sf__Created,Name\n"),
            )
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        assert!(job.successful_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unprocessed_records_is_unsupported() {
        let mock_server = MockServer::start().await;
        let job = test_job(&mock_server).await;

        let err = job.unprocessed_records().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Unsupported(_)));
    }

    #[tokio::test]
    async fn delete_issues_delete_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(JOB_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let job = test_job(&mock_server).await;
        job.delete().await.unwrap();
    }
}
