//! The oracle completion trait consulted once per reflection cycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result alias used by oracle implementations.
pub type OracleResult<T> = Result<T, OracleError>;

/// Error type shared by oracle adapters.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The adapter is misconfigured (missing endpoint, bad base url, ...).
    #[error("oracle not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// Transport-level failure talking to the completion endpoint.
    #[error("oracle transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider returned a malformed or error response.
    #[error("oracle response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },

    /// The call was cancelled via the supplied token before it completed.
    #[error("oracle call cancelled")]
    Cancelled,
}

impl OracleError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Roles supported in a chat-style completion request.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A user-authored turn.
    User,
    /// A prior assistant (model) turn.
    Assistant,
}

/// One turn in the conversation handed to the oracle.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OracleMessage {
    /// The speaker of this turn.
    pub role: MessageRole,
    /// The turn's textual content.
    pub content: String,
}

impl OracleMessage {
    /// Creates a user-authored turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A single completion request: one system prompt, a message history, a
/// token budget, and a sampling temperature.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OracleRequest {
    /// System prompt naming the agent and its available capabilities.
    pub system_prompt: String,
    /// Conversation turns; the reflection loop sends exactly one user turn.
    pub messages: Vec<OracleMessage>,
    /// Maximum number of tokens the oracle may generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl OracleRequest {
    /// Builds a single-turn request: one system prompt and one user prompt.
    #[must_use]
    pub fn single_turn(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: vec![OracleMessage::user(user_prompt)],
            max_tokens,
            temperature,
        }
    }
}

/// Why the oracle stopped generating.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a natural end of turn.
    EndTurn,
    /// Generation was truncated by the token budget.
    MaxTokens,
    /// The provider stopped generation for another reason.
    Other,
}

/// The oracle's reply to a single completion request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OracleResponse {
    /// The generated text, expected to be a single ASCII line.
    pub text: String,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

impl OracleResponse {
    /// Creates a response that ended on a natural turn boundary.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stop_reason: StopReason::EndTurn,
        }
    }
}

/// The language-model completion service consulted once per reflection cycle.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Requests a single completion, honoring `cancellation`.
    async fn complete(
        &self,
        request: OracleRequest,
        cancellation: CancellationToken,
    ) -> OracleResult<OracleResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_turn_request_carries_one_user_message() {
        let request = OracleRequest::single_turn("you are an agent", "what now?", 256, 0.3);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.max_tokens, 256);
    }
}
