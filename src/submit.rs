//! Submission dispatcher — best-effort delivery of the completed form.
//!
//! Fired at most once per session, on first arrival at the terminal step.
//! Failures are logged and never block the user from seeing their quote.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::SubmissionError;
use crate::wizard::form::FormData;

/// Payload posted to the submission endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub session_id: Uuid,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub form: FormData,
}

/// Outbound boundary for completed quote requests.
#[async_trait]
pub trait SubmissionDispatcher: Send + Sync {
    /// Deliver one form snapshot. No retry, no backoff.
    async fn submit(&self, payload: SubmissionPayload) -> Result<(), SubmissionError>;
}

/// POSTs the snapshot as JSON to a configured endpoint.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubmissionDispatcher for HttpDispatcher {
    async fn submit(&self, payload: SubmissionPayload) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SubmissionError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(session_id = %payload.session_id, "Submission delivered");
            Ok(())
        } else {
            Err(SubmissionError::BadStatus(status.as_u16()))
        }
    }
}

/// Dispatcher used when no endpoint is configured; logs and discards.
pub struct NoopDispatcher;

#[async_trait]
impl SubmissionDispatcher for NoopDispatcher {
    async fn submit(&self, payload: SubmissionPayload) -> Result<(), SubmissionError> {
        tracing::debug!(
            session_id = %payload.session_id,
            answers = payload.form.len(),
            "Submission endpoint not configured, discarding payload"
        );
        Ok(())
    }
}
