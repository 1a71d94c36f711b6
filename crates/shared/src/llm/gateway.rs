use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply used when the provider answers successfully but without a usable text part.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that.";

pub type ChatGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChatReply, ChatGatewayError>> + Send + 'a>>;

/// Roles understood by the provider. It has no system role, so seed context travels as `Model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTurn {
    pub role: UpstreamRole,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChatGatewayRequest {
    pub requester_id: Option<String>,
    pub contents: Vec<UpstreamTurn>,
}

impl ChatGatewayRequest {
    pub fn new(contents: Vec<UpstreamTurn>) -> Self {
        Self {
            requester_id: None,
            contents,
        }
    }

    pub fn with_requester_id(mut self, requester_id: impl AsRef<str>) -> Self {
        let trimmed = requester_id.as_ref().trim();
        if !trimmed.is_empty() {
            self.requester_id = Some(trimmed.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Text(String),
    /// The provider response did not have the expected candidate/part shape.
    Fallback,
}

impl ChatReply {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Fallback => FALLBACK_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatGatewayError {
    #[error("chat provider request timed out")]
    Timeout,
    #[error("chat provider request failed: {0}")]
    ProviderFailure(String),
}

pub trait ChatGateway: Send + Sync {
    fn generate<'a>(&'a self, request: ChatGatewayRequest) -> ChatGatewayFuture<'a>;
}
