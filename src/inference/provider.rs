use std::fmt;

use async_trait::async_trait;

use super::types::GenerationResult;

/// Errors that can occur while talking to a provider.
/// These never leave `generate`: they are folded into a failed `GenerationResult`.
#[derive(Debug)]
pub enum ProviderError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API answered without a usable completion.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response or locate the completion in it.
    Parse(String),
    /// Exchanging a long-lived credential for an access token failed.
    TokenExchange(String),
}

impl ProviderError {
    /// HTTP status attached to the error, if the provider was reached at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::TokenExchange(msg) => write!(f, "token exchange error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub model: &'a str,
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Generates a completion for the request.
    ///
    /// Infallible by contract: transport and decoding problems are reported
    /// through `GenerationResult::success == false`.
    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult;
}
