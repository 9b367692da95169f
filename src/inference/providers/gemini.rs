//! Google Gemini `:generateContent` through the gateway.
//!
//! The model name is part of the URL: `<base_url><model>:generateContent`.
//! Both prompts are sent as consecutive user turns.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::DEFAULT_GENERATION_TIMEOUT;
use crate::inference::http::{self, CompletionShape};
use crate::inference::{GenerationProvider, GenerationRequest, GenerationResult};

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    text: Option<String>,
}

#[derive(Serialize, Debug)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
struct GenerateContentRequest<'a> {
    model: &'a str,
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl CompletionShape for GenerateContentResponse {
    const PATH: &'static str = "candidates[0].content.parts[0].text";

    fn completion(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
    }
}

fn user_turn(text: &str) -> Content {
    Content {
        role: "user",
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

fn generate_content_request<'a>(request: &GenerationRequest<'a>) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        model: request.model,
        contents: vec![
            user_turn(request.system_prompt),
            user_turn(request.user_prompt),
        ],
    }
}

pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// `base_url` is the models prefix, e.g. `https://.../v1beta/models/`.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            timeout: DEFAULT_GENERATION_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationResult {
        let body = generate_content_request(&request);
        let url = self.endpoint(request.model);
        info!("gemini generateContent request: {}", url);

        let builder = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body);

        http::send_for_completion::<GenerateContentResponse>(self.name(), builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::http::extract;

    #[test]
    fn test_endpoint_appends_model_and_method() {
        let provider = GeminiProvider::new("k".into(), "https://gw/google/v1beta/models/".into());
        assert_eq!(
            provider.endpoint("gemini-1.5-pro"),
            "https://gw/google/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_prompts_become_two_user_turns() {
        let request = GenerationRequest {
            system_prompt: "sys",
            user_prompt: "usr",
            model: "gemini-1.5-pro",
        };
        let json = serde_json::to_value(generate_content_request(&request)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "sys");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "usr");
    }

    #[test]
    fn test_reply_extraction() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"deep"}]}}]}"#;
        assert_eq!(extract::<GenerateContentResponse>(body).unwrap(), "deep");
    }

    #[test]
    fn test_blocked_reply_without_parts_fails() {
        let body = r#"{"candidates":[{"content":{"role":"model"}}]}"#;
        assert!(extract::<GenerateContentResponse>(body).is_err());
        assert!(extract::<GenerateContentResponse>(r#"{"promptFeedback":{}}"#).is_err());
    }
}
