//! Scan recording service client
//!
//! ## API Reference
//!
//! - `POST {base}/scans` with body `{"NumeroBL": "<code>"}`
//!   returns `{"Message": "..."}` on success, or an error status whose body
//!   may carry a `Message` / `message` field.
//! - `GET {base}/scans/all` returns the array of recorded scans.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanflow::scan_service::ScanApiClient;
//!
//! let client = ScanApiClient::new("http://localhost:5000/api", Duration::from_secs(10))?;
//! let message = client.send_scan("BL-000123").await?;
//! ```

use {
    crate::submission::{
        SubmissionFailure, SubmissionSink, DEFAULT_ERROR_MESSAGE, DEFAULT_SUCCESS_MESSAGE,
    },
    async_trait::async_trait,
    reqwest::StatusCode,
    serde::{Deserialize, Serialize},
    std::time::Duration,
    thiserror::Error,
};

/// Body of a scan submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRequest {
    #[serde(rename = "NumeroBL")]
    pub numero_bl: String,
}

/// Acknowledgement or error body returned by the service
///
/// The service has answered with both `Message` and `message` over time;
/// either is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceMessage {
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message_upper: Option<String>,
    #[serde(rename = "message", default, skip_serializing_if = "Option::is_none")]
    pub message_lower: Option<String>,
}

impl ServiceMessage {
    pub fn text(&self) -> Option<&str> {
        self.message_upper
            .as_deref()
            .or(self.message_lower.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

/// One recorded scan as listed by `GET /scans/all`
///
/// Only the scanned code is interpreted; remaining fields are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(rename = "NumeroBL", default)]
    pub numero_bl: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ScanApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service rejected request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ScanApiError {
    /// Text shown to the operator for this failure
    pub fn operator_message(&self) -> String {
        match self {
            ScanApiError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// HTTP client for the scan recording service
#[derive(Debug, Clone)]
pub struct ScanApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScanApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScanApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Record a scanned code
    ///
    /// # Returns
    /// * `Ok(message)` - acknowledgement text, or the default success message
    ///   when the body carries none
    /// * `Err(ScanApiError::Rejected)` - non-success status, with the body's
    ///   message when present
    /// * `Err(ScanApiError::Transport)` - connection error or timeout
    pub async fn send_scan(&self, code: &str) -> Result<String, ScanApiError> {
        let url = format!("{}/scans", self.base_url);
        let request = ScanRequest {
            numero_bl: code.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Bodies that are not JSON are treated as carrying no message
        let parsed: ServiceMessage = serde_json::from_slice(&body).unwrap_or_default();

        if !status.is_success() {
            return Err(ScanApiError::Rejected {
                status,
                message: parsed.text().map(str::to_string),
            });
        }

        Ok(parsed
            .text()
            .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
            .to_string())
    }

    /// List every scan recorded by the service
    pub async fn fetch_all_scans(&self) -> Result<Vec<ScanRecord>, ScanApiError> {
        let url = format!("{}/scans/all", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let parsed: ServiceMessage = serde_json::from_slice(&body).unwrap_or_default();
            return Err(ScanApiError::Rejected {
                status,
                message: parsed.text().map(str::to_string),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl SubmissionSink for ScanApiClient {
    async fn submit(&self, code: &str) -> Result<String, SubmissionFailure> {
        self.send_scan(code).await.map_err(|e| {
            log::debug!("Submission of {} failed: {}", code, e);
            SubmissionFailure::new(e.operator_message())
        })
    }

    fn sink_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_field_name() {
        let body = serde_json::to_value(ScanRequest {
            numero_bl: "BL42".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "NumeroBL": "BL42" }));
    }

    #[test]
    fn test_service_message_prefers_capitalized_field() {
        let both: ServiceMessage =
            serde_json::from_str(r#"{"Message": "upper", "message": "lower"}"#).unwrap();
        assert_eq!(both.text(), Some("upper"));

        let lower: ServiceMessage = serde_json::from_str(r#"{"message": "lower"}"#).unwrap();
        assert_eq!(lower.text(), Some("lower"));

        let blank: ServiceMessage = serde_json::from_str(r#"{"Message": "  "}"#).unwrap();
        assert_eq!(blank.text(), None);
    }

    #[test]
    fn test_operator_message_fallback() {
        let with_message = ScanApiError::Rejected {
            status: StatusCode::CONFLICT,
            message: Some("BL déjà scanné".to_string()),
        };
        assert_eq!(with_message.operator_message(), "BL déjà scanné");

        let without_message = ScanApiError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(without_message.operator_message(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ScanApiClient::new("http://localhost:5000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_scan_record_keeps_extra_fields() {
        let record: ScanRecord =
            serde_json::from_str(r#"{"NumeroBL": "BL1", "DateScan": "2024-05-01"}"#).unwrap();
        assert_eq!(record.numero_bl.as_deref(), Some("BL1"));
        assert_eq!(record.extra["DateScan"], "2024-05-01");
    }
}
