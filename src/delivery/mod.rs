//! Outbound messaging.

use async_trait::async_trait;

pub mod telegram;

pub use telegram::TelegramMessenger;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Returns the name of the channel.
    fn name(&self) -> &str;

    /// Pushes `message` to `destination_id`.
    ///
    /// True only when the remote side acknowledged the message. Never errors.
    async fn send(&self, destination_id: &str, message: &str) -> bool;
}
