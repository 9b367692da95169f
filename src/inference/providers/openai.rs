//! OpenAI-compatible chat completions (`/chat/completions`).
//!
//! Serves both the OpenAI and DeepSeek routes of the gateway: the two share
//! the request body and the `choices[0].message.content` reply path.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_GENERATION_TIMEOUT, DEFAULT_MAX_TOKENS};
use crate::inference::http::{self, CompletionShape};
use crate::inference::{GenerationProvider, GenerationRequest, GenerationResult};

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize, Debug)]
struct ReplyMessage {
    content: Option<String>,
}

impl CompletionShape for ChatResponse {
    const PATH: &'static str = "choices[0].message.content";

    fn completion(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

fn chat_request<'a>(request: &GenerationRequest<'a>, max_tokens: u32) -> ChatRequest<'a> {
    ChatRequest {
        model: request.model,
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: request.system_prompt,
            },
            ChatMessage {
                role: Role::User,
                content: request.user_prompt,
            },
        ],
        max_tokens,
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Chat-completions provider authenticated with a bearer API key.
pub struct OpenAiProvider {
    name: &'static str,
    api_key: String,
    url: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider for the OpenAI route.
    ///
    /// # Arguments
    /// * `api_key` - gateway API key
    /// * `url` - full chat completions endpoint
    pub fn new(api_key: String, url: String) -> Self {
        Self::named("openai", api_key, url)
    }

    /// Creates a provider for the DeepSeek route (same wire format).
    pub fn deepseek(api_key: String, url: String) -> Self {
        Self::named("deepseek", api_key, url)
    }

    fn named(name: &'static str, api_key: String, url: String) -> Self {
        Self {
            name,
            api_key,
            url,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_GENERATION_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult {
        let body = chat_request(&request, self.max_tokens);

        info!(
            "{} chat completions request: model={}, max_tokens={}",
            self.name, request.model, self.max_tokens
        );

        let builder = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body);

        http::send_for_completion::<ChatResponse>(self.name, builder).await
    }
}
