use std::time::Duration;

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod yandex;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use yandex::{YandexProvider, YandexSettings};

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
