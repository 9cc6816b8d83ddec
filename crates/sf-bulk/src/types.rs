//! Wire types for Bulk API 2.0 ingest jobs.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an API version that can be either a float (59.0) or a string
/// ("59.0").
pub(crate) fn deserialize_api_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ApiVersion {
        Float(f64),
        String(String),
    }

    Option::<ApiVersion>::deserialize(deserializer).map(|opt| {
        opt.map(|v| match v {
            ApiVersion::Float(f) => format!("{:.1}", f),
            ApiVersion::String(s) => s,
        })
    })
}

/// Bulk API 2.0 job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Job is open and accepting data
    Open,
    /// Upload is complete, job is queued for processing
    UploadComplete,
    /// Job is processing
    InProgress,
    /// Job was aborted
    Aborted,
    /// Job completed successfully
    JobComplete,
    /// Job failed
    Failed,
}

impl JobState {
    /// Check if the job will not transition any further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Aborted | JobState::JobComplete | JobState::Failed
        )
    }

    /// Check if the job ended without completing successfully.
    pub fn is_failure(&self) -> bool {
        matches!(self, JobState::Aborted | JobState::Failed)
    }

    /// Check if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobState::JobComplete)
    }
}

/// Bulk API 2.0 ingest operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    /// Insert new records
    Insert,
    /// Update existing records
    Update,
    /// Upsert based on an external ID field
    Upsert,
    /// Delete records (soft delete)
    Delete,
}

impl BulkOperation {
    /// Get the API string for this operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            BulkOperation::Insert => "insert",
            BulkOperation::Update => "update",
            BulkOperation::Upsert => "upsert",
            BulkOperation::Delete => "delete",
        }
    }
}

/// Batch content type. The ingest protocol is CSV-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentType {
    #[default]
    #[serde(rename = "CSV")]
    Csv,
}

/// Line ending of the uploaded batch. Fixed to LF by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LineEnding {
    #[default]
    #[serde(rename = "LF")]
    Lf,
}

/// Column delimiter of the uploaded batch. Fixed to comma by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColumnDelimiter {
    #[default]
    #[serde(rename = "COMMA")]
    Comma,
}

// =============================================================================
// Request Types
// =============================================================================

/// Request to create an ingest job.
///
/// The delimiter, content type, and line ending are part of the wire
/// contract the encoder produces and are not caller options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngestJobRequest {
    /// sObject API name
    pub object: String,
    /// Operation kind
    pub operation: BulkOperation,
    /// External ID field for upsert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id_field_name: Option<String>,
    /// Batch content type
    pub content_type: ContentType,
    /// Column delimiter
    pub column_delimiter: ColumnDelimiter,
    /// Line ending
    pub line_ending: LineEnding,
}

impl CreateIngestJobRequest {
    /// Create a new ingest job request.
    pub fn new(object: impl Into<String>, operation: BulkOperation) -> Self {
        Self {
            object: object.into(),
            operation,
            external_id_field_name: None,
            content_type: ContentType::Csv,
            column_delimiter: ColumnDelimiter::Comma,
            line_ending: LineEnding::Lf,
        }
    }

    /// Set the external ID field for upsert operations.
    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field_name = Some(field.into());
        self
    }
}

/// Request to transition a job to a new state.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateJobStateRequest {
    pub state: JobState,
}

impl UpdateJobStateRequest {
    /// Mark the upload as complete, releasing the job for processing.
    pub fn upload_complete() -> Self {
        Self {
            state: JobState::UploadComplete,
        }
    }

    /// Abort the job.
    pub fn abort() -> Self {
        Self {
            state: JobState::Aborted,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Remote ingest job descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestJobInfo {
    /// Job ID
    pub id: String,
    /// Current state
    pub state: JobState,
    /// sObject API name
    pub object: String,
    /// Operation kind
    pub operation: String,
    /// External ID field (upsert jobs only)
    #[serde(default)]
    pub external_id_field_name: Option<String>,
    /// Number of records processed
    #[serde(default)]
    pub number_records_processed: i64,
    /// Number of records failed
    #[serde(default)]
    pub number_records_failed: i64,
    /// Job creation time
    #[serde(default)]
    pub created_date: Option<String>,
    /// Last modification time
    #[serde(default)]
    pub system_modstamp: Option<String>,
    /// Total processing time in milliseconds
    #[serde(default)]
    pub total_processing_time: Option<i64>,
    /// API version (can be a float like 59.0 or a string like "59.0")
    #[serde(default, deserialize_with = "deserialize_api_version")]
    pub api_version: Option<String>,
    /// Concurrency mode
    #[serde(default)]
    pub concurrency_mode: Option<String>,
    /// Error message for failed jobs
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Paged list of ingest jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestJobList {
    /// Whether all jobs are included (no more pages)
    pub done: bool,
    /// The job descriptors
    pub records: Vec<IngestJobInfo>,
    /// URL of the next page, if any
    #[serde(default)]
    pub next_records_url: Option<String>,
}

// =============================================================================
// Result Records
// =============================================================================

/// One per-record outcome of a completed ingest job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRecord {
    /// The row was applied; carries the remote-assigned record id.
    Success { id: String },
    /// The row was rejected; carries the record id (empty when none was
    /// assigned) and the error description.
    Failure { id: String, error: String },
}

impl ResultRecord {
    /// Build a success record from a `successfulResults` data row.
    /// Column 0 holds the record id.
    pub(crate) fn success_from_row(row: &csv::StringRecord) -> Self {
        ResultRecord::Success {
            id: row.get(0).unwrap_or_default().to_string(),
        }
    }

    /// Build a failure record from a `failedResults` data row.
    /// Column 0 holds the record id, column 1 the error text.
    pub(crate) fn failure_from_row(row: &csv::StringRecord) -> Self {
        ResultRecord::Failure {
            id: row.get(0).unwrap_or_default().to_string(),
            error: row.get(1).unwrap_or_default().to_string(),
        }
    }

    /// Check if this record is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, ResultRecord::Success { .. })
    }

    /// The remote-assigned record id.
    pub fn id(&self) -> &str {
        match self {
            ResultRecord::Success { id } | ResultRecord::Failure { id, .. } => id,
        }
    }

    /// The error description, for failure records.
    pub fn error(&self) -> Option<&str> {
        match self {
            ResultRecord::Success { .. } => None,
            ResultRecord::Failure { error, .. } => Some(error),
        }
    }
}
