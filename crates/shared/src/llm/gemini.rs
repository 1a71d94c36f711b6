use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use super::gateway::{
    ChatGateway, ChatGatewayError, ChatGatewayFuture, ChatGatewayRequest, ChatReply, UpstreamTurn,
};
use crate::config::ConfigError;
use crate::config_env::{optional_trimmed_env, parse_u64_env, require_non_empty_env};

const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_LOGGED_BODY_CHARS: usize = 256;

#[derive(Debug, Clone)]
pub struct GeminiGatewayConfig {
    pub generate_content_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl GeminiGatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_non_empty_env("GEMINI_API_KEY")?;
        let base_url = optional_trimmed_env("GEMINI_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidConfiguration(
                "GEMINI_API_BASE_URL must start with http:// or https://".to_string(),
            ));
        }
        let model = optional_trimmed_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            generate_content_url: generate_content_url(&base_url, &model),
            api_key,
            timeout_ms: parse_u64_env("GEMINI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
        })
    }
}

pub fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiGatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GeminiGatewayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn send_once(&self, request: &ChatGatewayRequest) -> Result<ChatReply, ChatGatewayError> {
        let response = self
            .client
            .post(&self.config.generate_content_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request_body(&request.contents))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let provider_status = parse_provider_error_status(&body);
            warn!(
                requester_id = request.requester_id.as_deref().unwrap_or("-"),
                status = status.as_u16(),
                provider_status = %provider_status,
                "gemini request returned an error status"
            );
            return Err(ChatGatewayError::ProviderFailure(format!(
                "status={} code={provider_status}",
                status.as_u16()
            )));
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|err| {
            warn!(
                body = %truncate_for_log(&body),
                "gemini response body was not valid json"
            );
            ChatGatewayError::ProviderFailure(format!("response_json_parse_failed: {err}"))
        })?;

        let reply = extract_reply(&parsed);
        if reply.is_fallback() {
            warn!(
                requester_id = request.requester_id.as_deref().unwrap_or("-"),
                body = %truncate_for_log(&body),
                "gemini response had no candidate text; using fallback reply"
            );
        } else {
            debug!(
                requester_id = request.requester_id.as_deref().unwrap_or("-"),
                "gemini reply received"
            );
        }

        Ok(reply)
    }
}

impl ChatGateway for GeminiGateway {
    fn generate<'a>(&'a self, request: ChatGatewayRequest) -> ChatGatewayFuture<'a> {
        Box::pin(async move { self.send_once(&request).await })
    }
}

pub fn request_body(contents: &[UpstreamTurn]) -> Value {
    let contents = contents
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role,
                "parts": [{ "text": turn.text }]
            })
        })
        .collect::<Vec<_>>();

    json!({ "contents": contents })
}

/// Takes the first candidate's first text part. Any other shape yields [`ChatReply::Fallback`].
pub fn extract_reply(response: &Value) -> ChatReply {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(|text| ChatReply::Text(text.to_string()))
        .unwrap_or(ChatReply::Fallback)
}

fn map_transport_error(err: reqwest::Error) -> ChatGatewayError {
    if err.is_timeout() {
        ChatGatewayError::Timeout
    } else {
        ChatGatewayError::ProviderFailure(err.to_string())
    }
}

fn parse_provider_error_status(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/status")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate_for_log(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY_CHARS).collect()
}
