//! YandexGPT foundation-models completion.
//!
//! Two-step flow: the long-lived OAuth token is exchanged for a short-lived
//! IAM token at the token endpoint, then the IAM token is used as the bearer
//! credential for `/foundationModels/v1/completion`. The IAM token is cached
//! for the lifetime of the provider instance; a failed exchange is not cached.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{DEFAULT_GENERATION_TIMEOUT, DEFAULT_MAX_TOKENS, DEFAULT_TOKEN_TIMEOUT};
use crate::inference::http::{self, CompletionShape};
use crate::inference::{GenerationProvider, GenerationRequest, GenerationResult, ProviderError};

pub const DEFAULT_TEMPERATURE: f32 = 0.6;

// ============================================================================
// Token Exchange Types
// ============================================================================

#[derive(Serialize, Debug)]
struct TokenRequest<'a> {
    #[serde(rename = "yandexPassportOauthToken")]
    oauth_token: &'a str,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    #[serde(rename = "iamToken", alias = "accessToken")]
    token: Option<String>,
}

// ============================================================================
// Completion API Types
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f32,
    /// int64 fields travel as strings in this API.
    max_tokens: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct Message {
    #[serde(default)]
    role: String,
    text: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<Message>,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    result: CompletionBody,
}

#[derive(Deserialize, Debug)]
struct CompletionBody {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize, Debug)]
struct Alternative {
    message: Message,
}

impl CompletionShape for CompletionResponse {
    const PATH: &'static str = "result.alternatives[0].message.text";

    fn completion(self) -> Option<String> {
        self.result.alternatives.into_iter().next()?.message.text
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Endpoints and credentials for [`YandexProvider`].
#[derive(Debug, Clone)]
pub struct YandexSettings {
    pub oauth_token: String,
    pub folder_id: String,
    pub iam_token_url: String,
    pub model_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    pub token_timeout: Duration,
    pub generation_timeout: Duration,
}

impl YandexSettings {
    pub fn new(
        oauth_token: String,
        folder_id: String,
        iam_token_url: String,
        model_url: String,
    ) -> Self {
        Self {
            oauth_token,
            folder_id,
            iam_token_url,
            model_url,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
            token_timeout: DEFAULT_TOKEN_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

pub struct YandexProvider {
    settings: YandexSettings,
    iam_token: OnceCell<String>,
    client: reqwest::Client,
}

impl YandexProvider {
    pub fn new(settings: YandexSettings) -> Self {
        Self {
            settings,
            iam_token: OnceCell::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Returns the cached IAM token, exchanging the OAuth token on first use.
    async fn iam_token(&self) -> Result<&str, ProviderError> {
        self.iam_token
            .get_or_try_init(|| self.exchange_token())
            .await
            .map(String::as_str)
    }

    async fn exchange_token(&self) -> Result<String, ProviderError> {
        info!("Exchanging OAuth token at {}", self.settings.iam_token_url);

        let response = self
            .client
            .post(&self.settings.iam_token_url)
            .timeout(self.settings.token_timeout)
            .json(&TokenRequest {
                oauth_token: &self.settings.oauth_token,
            })
            .send()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        let status = response.status();
        debug!("Token endpoint status: {}", status);

        let reply: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::TokenExchange(format!("unexpected reply (HTTP {status}): {e}"))
        })?;

        reply.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ProviderError::TokenExchange(format!("no iamToken in reply (HTTP {status})"))
        })
    }

    fn completion_request(&self, request: &GenerationRequest<'_>) -> CompletionRequest {
        CompletionRequest {
            model_uri: format!("gpt://{}/{}", self.settings.folder_id, request.model),
            completion_options: CompletionOptions {
                stream: self.settings.stream,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens.to_string(),
            },
            messages: vec![
                Message {
                    role: "system".to_string(),
                    text: Some(request.system_prompt.to_string()),
                },
                Message {
                    role: "user".to_string(),
                    text: Some(request.user_prompt.to_string()),
                },
            ],
        }
    }
}

#[async_trait]
impl GenerationProvider for YandexProvider {
    fn name(&self) -> &str {
        "yandex"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult {
        let token = match self.iam_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("yandex generation skipped: {}", e);
                return e.into();
            }
        };

        let body = self.completion_request(&request);
        info!("yandex completion request: modelUri={}", body.model_uri);

        let builder = self
            .client
            .post(&self.settings.model_url)
            .bearer_auth(token)
            .timeout(self.settings.generation_timeout)
            .json(&body);

        http::send_for_completion::<CompletionResponse>(self.name(), builder).await
    }
}
