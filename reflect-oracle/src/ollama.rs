//! Oracle adapter for an Ollama-compatible chat completion endpoint.

use std::time::Duration;

use hyper::body::to_bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Body, Request, Uri};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::http_client::{HyperClient, build_https_client};
use crate::oracle::{
    MessageRole, Oracle, OracleError, OracleRequest, OracleResponse, OracleResult, StopReason,
};

/// Configuration for the Ollama-compatible oracle adapter.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaConfig {
    /// Creates a configuration for the supplied model against the local
    /// default daemon address.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_owned(),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL of the Ollama-compatible daemon.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Calls an Ollama-compatible `/api/chat` endpoint for a single, non-streamed
/// completion per request.
pub struct OllamaOracle {
    client: HyperClient,
    endpoint: Uri,
    config: OllamaConfig,
}

impl OllamaOracle {
    /// Constructs a new adapter from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Configuration`] if the endpoint cannot be formed
    /// or the HTTPS client cannot be built.
    pub fn new(config: OllamaConfig) -> OracleResult<Self> {
        let endpoint = format!("{}/api/chat", config.base_url.trim_end_matches('/'))
            .parse::<Uri>()
            .map_err(|err| OracleError::configuration(format!("invalid ollama endpoint: {err}")))?;
        let client = build_https_client()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

#[async_trait::async_trait]
impl Oracle for OllamaOracle {
    async fn complete(
        &self,
        request: OracleRequest,
        cancellation: CancellationToken,
    ) -> OracleResult<OracleResponse> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            stream: false,
            messages: to_chat_messages(&request),
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let payload = serde_json::to_vec(&body)
            .map_err(|err| OracleError::configuration(format!("invalid request body: {err}")))?;

        let mut http_request = Request::post(self.endpoint.clone())
            .body(Body::from(payload))
            .map_err(|err| OracleError::configuration(format!("invalid http request: {err}")))?;
        http_request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let call = self.client.request(http_request);
        let response = tokio::select! {
            () = cancellation.cancelled() => return Err(OracleError::Cancelled),
            result = timeout(self.config.timeout, call) => result
                .map_err(|_| OracleError::transport("ollama request timed out"))?
                .map_err(|err| OracleError::transport(format!("ollama request failed: {err}")))?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let bytes = to_bytes(response.into_body()).await.unwrap_or_default();
            let body = String::from_utf8_lossy(&bytes);
            return Err(OracleError::response(format!("ollama returned {status}: {body}")));
        }

        let bytes = to_bytes(response.into_body())
            .await
            .map_err(|err| OracleError::response(format!("failed to read ollama body: {err}")))?;
        let chat_response: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|err| OracleError::response(format!("failed to decode ollama response: {err}")))?;

        if let Some(error) = chat_response.error {
            return Err(OracleError::response(error));
        }

        let text = chat_response
            .message
            .map(|message| message.content)
            .unwrap_or_default();

        let stop_reason = if chat_response.done_reason.as_deref() == Some("length") {
            StopReason::MaxTokens
        } else {
            StopReason::EndTurn
        };

        Ok(OracleResponse { text, stop_reason })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    stream: bool,
    messages: Vec<ChatMessage>,
    options: ChatOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn to_chat_messages(request: &OracleRequest) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage {
        role: "system".to_owned(),
        content: request.system_prompt.clone(),
    }];
    messages.extend(request.messages.iter().map(|message| ChatMessage {
        role: match message.role {
            MessageRole::User => "user".to_owned(),
            MessageRole::Assistant => "assistant".to_owned(),
        },
        content: message.content.clone(),
    }));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_messages_lead_with_system_prompt() {
        let request = OracleRequest::single_turn("you are terse", "ping", 16, 0.0);
        let messages = to_chat_messages(&request);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "ping");
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = OllamaConfig::new("gemma3").with_base_url("http://localhost:11434/");
        let oracle = OllamaOracle::new(config).expect("adapter");
        assert_eq!(oracle.endpoint, "http://localhost:11434/api/chat");
    }
}
