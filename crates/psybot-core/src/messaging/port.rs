use async_trait::async_trait;

use crate::{
    commands::CommandDescriptor,
    domain::ChatId,
    messaging::types::{MessagingCapabilities, ReplyKeyboard},
    Result,
};

/// Outbound transport port.
///
/// Calls are best-effort: the dispatcher logs failures and never retries.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send HTML text with a reply keyboard attached.
    async fn send_text(&self, chat_id: ChatId, html: &str, keyboard: &ReplyKeyboard) -> Result<()>;

    /// Send a previously uploaded audio file by its platform file reference.
    async fn send_audio(&self, chat_id: ChatId, file_ref: &str) -> Result<()>;

    /// Register the platform-visible command menu for one chat.
    async fn register_menu(&self, chat_id: ChatId, commands: &[CommandDescriptor]) -> Result<()>;
}
