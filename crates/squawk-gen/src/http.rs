use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GenerationRequest, TextGenerator};

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: Option<&'a str>,
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateReply {
    text: String,
}

/// Calls an external generation service: `POST {url}` with
/// `{"prompt": ..., "temperature": ...}`, expecting `{"text": ...}` back.
///
/// No retries and no timeout; a slow or failing service surfaces directly.
pub struct HttpGenerator {
    client: reqwest::Client,
    url: String,
}

impl HttpGenerator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GenerateBody {
            prompt: request.prompt.as_deref(),
            temperature: request.temperature_or_default(),
        };
        debug!("Requesting generation from {}", self.url);

        let reply: GenerateReply = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("generator at {} unreachable", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("generator returned malformed reply")?;

        Ok(reply.text)
    }
}
