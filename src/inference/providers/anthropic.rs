//! Anthropic messages API (`/v1/messages`) as exposed by the gateway.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_GENERATION_TIMEOUT, DEFAULT_MAX_TOKENS};
use crate::inference::http::{self, CompletionShape};
use crate::inference::{GenerationProvider, GenerationRequest, GenerationResult};

#[derive(Serialize, Debug)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// The system prompt is a top-level field here, not a message.
#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<UserMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    text: Option<String>,
}

impl CompletionShape for MessagesResponse {
    const PATH: &'static str = "content[0].text";

    fn completion(self) -> Option<String> {
        self.content.into_iter().next()?.text
    }
}

fn messages_request<'a>(request: &GenerationRequest<'a>, max_tokens: u32) -> MessagesRequest<'a> {
    MessagesRequest {
        model: request.model,
        system: request.system_prompt,
        messages: vec![UserMessage {
            role: "user",
            content: request.user_prompt,
        }],
        max_tokens,
    }
}

pub struct AnthropicProvider {
    api_key: String,
    url: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String, url: String) -> Self {
        Self {
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
impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult {
        let body = messages_request(&request, self.max_tokens);
        info!("anthropic messages request: model={}", request.model);

        let builder = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body);

        http::send_for_completion::<MessagesResponse>(self.name(), builder).await
    }
}
