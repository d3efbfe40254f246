use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bft_core::api::{parse_transcript, ExecutorError, TranscriptLoader, TranscriptTurn};
use reqwest::Client;

/// Fetches transcript documents over HTTP.
pub struct HttpTranscriptLoader {
    http: Client,
}

impl HttpTranscriptLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl TranscriptLoader for HttpTranscriptLoader {
    async fn load(&self, url: &str) -> Result<Vec<TranscriptTurn>, ExecutorError> {
        let failed = |reason: String| ExecutorError::Transcript {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(failed(format!("unexpected status {}", status.as_u16())));
        }
        let bytes = resp.bytes().await.map_err(|e| failed(e.to_string()))?;
        let turns = parse_transcript(&bytes).map_err(|e| failed(e.to_string()))?;
        tracing::debug!(url, turns = turns.len(), "Transcript loaded");
        Ok(turns)
    }
}
