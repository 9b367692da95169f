//! Shared request/extraction path for every provider.
//!
//! Providers only describe their reply shape (a serde type implementing
//! [`CompletionShape`]); sending, status capture, decoding and the
//! conversion of every failure into a [`GenerationResult`] happen here.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::provider::ProviderError;
use super::types::GenerationResult;

/// Longest slice of a raw reply body that is copied into a diagnostic.
const MAX_DIAGNOSTIC_BODY: usize = 1000;

/// A typed provider reply that carries exactly one completion string.
pub(crate) trait CompletionShape: DeserializeOwned {
    /// JSON path of the completion, used in diagnostics.
    const PATH: &'static str;

    /// Moves the completion out of the reply, `None` if the path is empty.
    fn completion(self) -> Option<String>;
}

/// Decodes `body` as `S` and pulls the completion out of it.
pub(crate) fn extract<S: CompletionShape>(body: &str) -> Result<String, ProviderError> {
    let reply: S = serde_json::from_str(body)
        .map_err(|e| ProviderError::Parse(format!("unexpected reply shape: {e}")))?;
    reply
        .completion()
        .ok_or_else(|| ProviderError::Parse(format!("no completion at {}", S::PATH)))
}

/// Sends a prepared request and normalizes whatever comes back.
pub(crate) async fn send_for_completion<S: CompletionShape>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> GenerationResult {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return failure(provider, None, ProviderError::Network(e.to_string())),
    };

    let status = response.status();
    debug!("{} response status: {}", provider, status);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return failure(
                provider,
                Some(status.as_u16()),
                ProviderError::Network(e.to_string()),
            );
        }
    };

    match extract::<S>(&body) {
        Ok(text) => {
            info!(
                "{} completion received: status={}, {} bytes",
                provider,
                status,
                text.len()
            );
            GenerationResult::completed(status.as_u16(), text)
        }
        Err(_) if !status.is_success() => failure(
            provider,
            Some(status.as_u16()),
            ProviderError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            },
        ),
        Err(e) => {
            debug!("{} unusable reply body: {}", provider, body);
            failure(provider, Some(status.as_u16()), e)
        }
    }
}

fn failure(provider: &str, status: Option<u16>, err: ProviderError) -> GenerationResult {
    warn!("{} generation failed: {}", provider, err);
    GenerationResult::failed(status, err.to_string())
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_DIAGNOSTIC_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
