use crate::models::{Decision, Profile, SessionId};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Header carrying the session id on every request
pub const SESSION_HEADER: &str = "user";

/// Errors that can occur when talking to the Tindev API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Server { status: StatusCode, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Remote operations the candidate deck depends on
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Full candidate list for `session`, in server order
    async fn fetch_candidates(&self, session: &SessionId) -> Result<Vec<Profile>, ApiError>;

    /// Record a like or dislike. The response body is not consumed; matches
    /// arrive over the realtime channel.
    async fn submit_decision(
        &self,
        session: &SessionId,
        candidate_id: &str,
        decision: Decision,
    ) -> Result<(), ApiError>;
}

/// HTTP client bound to a fixed base URL
#[derive(Debug, Clone)]
pub struct ProfileClient {
    base_url: String,
    client: Client,
}

impl ProfileClient {
    /// Create a client for `base_url`. Without `timeout` the transport default applies.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn decision_url(&self, candidate_id: &str, decision: Decision) -> String {
        format!(
            "{}/devs/{}/{}",
            self.base_url,
            urlencoding::encode(candidate_id),
            decision.path_segment()
        )
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        Err(ApiError::Server { status, body })
    }
}

#[async_trait]
impl ProfileApi for ProfileClient {
    async fn fetch_candidates(&self, session: &SessionId) -> Result<Vec<Profile>, ApiError> {
        let url = format!("{}/devs", self.base_url);
        tracing::debug!("Fetching candidates from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;

        let documents: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Expected an array of profiles: {}", e)))?;

        let total = documents.len();
        let profiles: Vec<Profile> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Profile>(doc) {
                Ok(profile) if profile.validate().is_ok() => Some(profile),
                Ok(profile) => {
                    tracing::warn!("Skipping candidate with invalid id {:?}", profile.id);
                    None
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed candidate: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} candidates ({} in response)", profiles.len(), total);

        Ok(profiles)
    }

    async fn submit_decision(
        &self,
        session: &SessionId,
        candidate_id: &str,
        decision: Decision,
    ) -> Result<(), ApiError> {
        let url = self.decision_url(candidate_id, decision);

        let response = self
            .client
            .post(&url)
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await?;

        Self::ensure_success(response).await?;

        tracing::debug!("Submitted {:?} for {}", decision, candidate_id);

        Ok(())
    }
}
