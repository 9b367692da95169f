//! Telegram Bot API `sendMessage`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Serialize;

use super::Messenger;

pub const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize, Debug)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

pub struct TelegramMessenger {
    bot_token: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TelegramMessenger {
    /// Creates a messenger for the given bot.
    ///
    /// # Arguments
    /// * `bot_token` - token issued by BotFather
    /// * `base_url` - Optional custom API root (defaults to `api.telegram.org`)
    pub fn new(bot_token: String, base_url: Option<String>) -> Self {
        Self {
            bot_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_TELEGRAM_BASE_URL.to_string()),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, destination_id: &str, message: &str) -> bool {
        let body = SendMessage {
            chat_id: destination_id,
            text: message,
            parse_mode: "Markdown",
        };

        let response = match self
            .client
            .post(self.send_message_url())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest includes the URL (and so the token) in its errors.
                warn!("Telegram delivery to {} failed: {}", destination_id, e.without_url());
                return false;
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            info!("Delivered {} bytes to chat {}", message.len(), destination_id);
            return true;
        }

        let err_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Telegram rejected message to {}: {} - {}", destination_id, status, err_body);
        debug!("Rejected message text: {}", message);
        false
    }
}
