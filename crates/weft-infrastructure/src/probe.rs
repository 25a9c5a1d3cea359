//! HTTP liveness probe for provider credentials.

use async_trait::async_trait;
use std::time::Duration;
use weft_core::{LivenessProbe, Result, WeftError};

pub const DEFAULT_MODELS_URL: &str = "https://api.openai.com/v1/models";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Confirms a key by listing the provider's models with it.
#[derive(Debug, Clone)]
pub struct HttpLivenessProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpLivenessProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: DEFAULT_MODELS_URL.to_string(),
        }
    }

    /// Probes another endpoint, e.g. a proxy or a local test server.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpLivenessProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn probe(&self, api_key: &str) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(api_key)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| WeftError::validation(format!("Liveness probe failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeftError::validation(format!(
                "Provider rejected the credential ({})",
                status
            )));
        }
        Ok(())
    }
}
