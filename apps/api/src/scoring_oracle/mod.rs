//! Scoring Oracle client — HTTP access to the text-similarity service.
//!
//! The oracle is optional. Callers treat every `OracleError` as "unavailable"
//! and fall back to the local heuristic; errors never reach API clients.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANALYZE_PATH: &str = "/analyze";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Oracle error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Oracle timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    resume_text: &'a str,
    job_description: &'a str,
}

/// Similarity result from the oracle. `score` is on a 0–100 scale.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleScore {
    pub score: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
}

#[derive(Clone)]
pub struct OracleClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OracleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scores `candidate_text` against `reference_text`.
    /// The wire contract names them resume text and job description.
    pub async fn score(
        &self,
        candidate_text: &str,
        reference_text: &str,
    ) -> Result<OracleScore, OracleError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, ANALYZE_PATH))
            .json(&AnalyzeRequest {
                resume_text: candidate_text,
                job_description: reference_text,
            })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let score: OracleScore = response.json().await.map_err(|e| self.classify(e))?;
        debug!(
            "Oracle scored answer: {:.2} ({} matched, {} missing)",
            score.score,
            score.matched_keywords.len(),
            score.missing_keywords.len()
        );
        Ok(score)
    }

    fn classify(&self, err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout(self.timeout)
        } else {
            OracleError::Http(err)
        }
    }
}

/// Local stand-in for the scoring service: `POST /analyze` with a fixed reply.
#[cfg(test)]
pub(crate) mod mock {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;

    /// Last request body received by the mock.
    pub type Captured = Arc<Mutex<Option<Value>>>;

    type MockState = (StatusCode, Value, Captured);

    /// Binds an ephemeral local port and returns its base URL.
    pub async fn spawn_analyze(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route("/analyze", post(analyze))
            .with_state((status, reply, captured.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    async fn analyze(
        State((status, reply, captured)): State<MockState>,
        Json(request): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        *captured.lock().unwrap() = Some(request);
        (status, Json(reply))
    }
}
