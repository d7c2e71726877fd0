use async_trait::async_trait;
use tracing::{error, info};

use crate::bot::telegram::{ParseMode, TelegramApi};

/// Fire-and-forget message sink bound to one destination.
///
/// Failures are logged and reported as `false`; callers never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> bool;
}

pub struct TelegramNotifier {
    api: TelegramApi,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api: TelegramApi, chat_id: impl Into<String>) -> Self {
        Self {
            api,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> bool {
        match self
            .api
            .send_message(&self.chat_id, text, ParseMode::Html, None)
            .await
        {
            Ok(()) => {
                info!("📨 [NOTIFY] Message delivered to {}", self.chat_id);
                true
            }
            Err(e) => {
                error!("❌ [NOTIFY] Failed to send message: {}", e);
                false
            }
        }
    }
}
