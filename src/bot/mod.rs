//! Telegram front end: long-polls for updates and routes them through the
//! list editor.

pub mod editor;
pub mod keyboards;
pub mod telegram;

#[cfg(test)]
mod editor_tests;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::constants::http;
use crate::error::Result;

use editor::{Editor, Incoming, Reply, APOLOGY};
use telegram::{CallbackQuery, Message, ParseMode, TelegramApi, Update};

/// Classify an inbound message. Anything starting with '/' is a command.
pub fn classify(text: &str) -> Incoming<'_> {
    let trimmed = text.trim();
    if trimmed.starts_with('/') {
        let command = trimmed.split_whitespace().next().unwrap_or(trimmed);
        Incoming::Command(command)
    } else {
        Incoming::Text(text)
    }
}

/// Run the bot until the task is cancelled.
pub async fn run_bot(api: TelegramApi, mut editor: Editor) {
    info!("🤖 [BOT] Listening for updates");
    let mut offset = 0i64;

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("⚠️ [BOT] getUpdates failed: {}", e);
                sleep(http::POLL_ERROR_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Err(e) = dispatch(&api, &mut editor, update).await {
                error!("❌ [BOT] Failed to handle update: {}", e);
            }
        }
    }
}

async fn dispatch(api: &TelegramApi, editor: &mut Editor, update: Update) -> Result<()> {
    if let Some(query) = update.callback_query {
        return on_callback(api, editor, query).await;
    }
    if let Some(message) = update.message {
        return on_message(api, editor, message).await;
    }
    Ok(())
}

async fn on_message(api: &TelegramApi, editor: &mut Editor, message: Message) -> Result<()> {
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let reply = editor
        .handle(chat_id, classify(text))
        .unwrap_or_else(|e| apologize(chat_id, e));
    send(api, chat_id, &reply).await
}

async fn on_callback(api: &TelegramApi, editor: &mut Editor, query: CallbackQuery) -> Result<()> {
    if let Err(e) = api.answer_callback_query(&query.id).await {
        warn!("⚠️ [BOT] answerCallbackQuery failed: {}", e);
    }
    let (Some(message), Some(data)) = (query.message, query.data) else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let reply = editor
        .handle(chat_id, Incoming::Callback(&data))
        .unwrap_or_else(|e| apologize(chat_id, e));

    // Edit the menu in place; fall back to a fresh message if Telegram refuses
    match api
        .edit_message_text(chat_id, message.message_id, &reply.text, reply.keyboard.as_ref())
        .await
    {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("⚠️ [BOT] editMessageText failed, sending instead: {}", e);
            send(api, chat_id, &reply).await
        }
    }
}

fn apologize(chat_id: i64, e: crate::error::MonitorError) -> Reply {
    error!("❌ [BOT] Chat {}: {}", chat_id, e);
    Reply::text(APOLOGY)
}

async fn send(api: &TelegramApi, chat_id: i64, reply: &Reply) -> Result<()> {
    api.send_message(
        &chat_id.to_string(),
        &reply.text,
        ParseMode::Plain,
        reply.keyboard.as_ref(),
    )
    .await
}
