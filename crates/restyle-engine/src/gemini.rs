use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use restyle_contracts::errors::{GenerationError, ServiceInitError};
use restyle_contracts::image::EncodedImage;
use restyle_contracts::state::GenerationResult;
use serde_json::Value;

use crate::client::{build_request_body, result_from_response, CancelToken, GenerationClient};
use crate::config::ServiceConfig;

/// Gemini `generateContent` transport. One blocking POST per call, no retries.
pub struct GeminiClient {
    config: ServiceConfig,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceInitError> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ServiceInitError::HttpClient(err.to_string()))?;
        Ok(Self { config, http })
    }

    fn round_trip(
        &self,
        input: &EncodedImage,
        concept: &EncodedImage,
        cancel: &CancelToken,
    ) -> Result<GenerationResult> {
        let endpoint = self.config.endpoint();
        let payload = build_request_body(input, concept);
        cancel.check()?;
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        let response_payload = response_json_or_error(response)?;
        cancel.check()?;
        result_from_response(&response_payload).context("Gemini response could not be read")
    }
}

impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(
        &self,
        input: &EncodedImage,
        concept: &EncodedImage,
        cancel: &CancelToken,
    ) -> Result<GenerationResult, GenerationError> {
        self.round_trip(input, concept, cancel).map_err(|err| {
            match err.downcast_ref::<GenerationError>() {
                Some(GenerationError::Cancelled) => GenerationError::Cancelled,
                _ => GenerationError::Request(error_chain_text(&err, 512)),
            }
        })
    }
}

fn response_json_or_error(response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .context("Gemini response body read failed")?;
    if !status.is_success() {
        bail!(
            "Gemini request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    serde_json::from_str(&body).context("Gemini returned invalid JSON payload")
}

fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() || parts.last().is_some_and(|last| last == trimmed) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
