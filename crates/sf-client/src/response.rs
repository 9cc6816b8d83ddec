//! HTTP response handling.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// One entry of a Salesforce error-document response.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "errorCode")]
    error_code: String,
    message: String,
}

/// Wrapper around an HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.inner.json().await.map_err(Into::into)
    }

    /// Turn a non-2xx response into a typed error.
    ///
    /// Salesforce reports request failures as a JSON array of error
    /// documents; when the body decodes as one, the first entry becomes an
    /// [`ErrorKind::Api`] error. Anything else becomes [`ErrorKind::Http`]
    /// with the raw body as the message.
    pub(crate) async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let body = self.inner.text().await.unwrap_or_default();

        if let Ok(errors) = serde_json::from_str::<Vec<ApiErrorBody>>(&body) {
            if let Some(first) = errors.into_iter().next() {
                return Err(Error::new(ErrorKind::Api {
                    error_code: first.error_code,
                    message: first.message,
                }));
            }
        }

        Err(Error::new(ErrorKind::Http {
            status,
            message: body,
        }))
    }
}
