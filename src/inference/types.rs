use serde::{Deserialize, Serialize};

use super::provider::ProviderError;

/// Uniform outcome of a `generate` call, whatever backend produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// True only when a completion string was located in the reply.
    pub success: bool,
    /// HTTP status of the generation call, `None` if the provider was never reached.
    pub status: Option<u16>,
    /// The completion on success, a diagnostic on failure.
    pub text: String,
}

impl GenerationResult {
    pub fn completed(status: u16, text: String) -> Self {
        Self {
            success: true,
            status: Some(status),
            text,
        }
    }

    pub fn failed(status: Option<u16>, diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            text: diagnostic.into(),
        }
    }
}

impl From<ProviderError> for GenerationResult {
    fn from(err: ProviderError) -> Self {
        GenerationResult::failed(err.status(), err.to_string())
    }
}

/// System and user prompts for one run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptPair {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// Appends the dedup clause listing `ideas` to the user prompt.
    ///
    /// Each idea is quoted and the list is comma-separated. Empty ideas are
    /// skipped; if nothing remains the prompt is left untouched.
    pub fn exclude_ideas<S: AsRef<str>>(&mut self, lead_in: &str, ideas: &[S]) {
        let quoted: Vec<String> = ideas
            .iter()
            .map(|idea| idea.as_ref())
            .filter(|idea| !idea.is_empty())
            .map(|idea| format!("\"{idea}\""))
            .collect();

        if quoted.is_empty() {
            return;
        }

        self.user_prompt
            .push_str(&format!(" {} {}.", lead_in, quoted.join(", ")));
    }
}
