pub(crate) mod http;
pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{GenerationProvider, GenerationRequest, ProviderError};
pub use providers::{AnthropicProvider, GeminiProvider, OpenAiProvider, YandexProvider, YandexSettings};
pub use types::{GenerationResult, PromptPair};
