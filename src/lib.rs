//! ideabot library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod delivery;
pub mod inference;

#[cfg(test)]
pub mod test_support;

/// Which backend generates the idea.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "deepseek")]
    DeepSeek,
    Anthropic,
    Gemini,
    Yandex,
}

impl ProviderKind {
    /// Model used when neither config nor CLI names one.
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::Yandex => "yandexgpt-lite",
        }
    }
}
