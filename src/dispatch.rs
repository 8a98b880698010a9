//! Notification delivery: provider seam, Telegram client and channel selection.

use crate::config::TelegramCredentials;
use crate::constants::{
    MEDIA_SEND_TIMEOUT_SECS, TELEGRAM_API_BASE, TEXT_SEND_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::DispatchError;
use crate::models::{DeliveryKind, Notification};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Outbound chat provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, body: &str) -> Result<(), DispatchError>;
    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), DispatchError>;
    async fn send_sticker(&self, path: &Path) -> Result<(), DispatchError>;
}

/// What actually reached the chat for one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Photo with caption, or sticker followed by the text
    Rich,
    /// Sticker went out but the follow-up text did not
    StickerOnly,
    /// Text only, no asset attached
    Text,
    /// Media failed, text went out instead
    FellBackToText,
    /// Nothing was delivered
    Failed,
}

/// Sends `notification`, preferring its asset and degrading to plain text.
///
/// Each send is attempted once; failures are logged and never retried.
pub async fn dispatch(notifier: &dyn Notifier, notification: &Notification) -> DispatchOutcome {
    let Some(asset) = &notification.asset else {
        return match notifier.send_text(&notification.text).await {
            Ok(()) => DispatchOutcome::Text,
            Err(e) => {
                tracing::error!("Failed to send text for {}: {}", notification.subject, e);
                DispatchOutcome::Failed
            }
        };
    };

    let rich = match asset.kind {
        DeliveryKind::Animated => notifier.send_sticker(&asset.path).await,
        DeliveryKind::Static => notifier.send_photo(&asset.path, &notification.text).await,
    };

    match rich {
        // Stickers carry no caption, so the text follows separately.
        Ok(()) if asset.kind == DeliveryKind::Animated => {
            match notifier.send_text(&notification.text).await {
                Ok(()) => DispatchOutcome::Rich,
                Err(e) => {
                    tracing::error!(
                        "Sticker sent but text failed for {}: {}",
                        notification.subject,
                        e
                    );
                    DispatchOutcome::StickerOnly
                }
            }
        }
        Ok(()) => DispatchOutcome::Rich,
        Err(e) => {
            tracing::error!(
                "Failed to send media ({}) for {}: {}",
                asset.path.display(),
                notification.subject,
                e
            );
            match notifier.send_text(&notification.text).await {
                Ok(()) => DispatchOutcome::FellBackToText,
                Err(e) => {
                    tracing::error!("Failed to send text for {}: {}", notification.subject, e);
                    DispatchOutcome::Failed
                }
            }
        }
    }
}

/// Telegram Bot API client bound to a single chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Arc<Client>,
    bot_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(credentials: &TelegramCredentials) -> Result<Self, DispatchError> {
        Self::with_api_base(credentials, TELEGRAM_API_BASE)
    }

    /// Same as [`TelegramNotifier::new`] against a different API host.
    pub fn with_api_base(
        credentials: &TelegramCredentials,
        api_base: &str,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            bot_url: format!(
                "{}/bot{}",
                api_base.trim_end_matches('/'),
                credentials.token
            ),
            chat_id: credentials.chat_id.clone(),
        })
    }

    fn method(&self, name: &str) -> String {
        format!("{}/{}", self.bot_url, name)
    }

    async fn file_part(path: &Path) -> Result<Part, DispatchError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DispatchError::Asset {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        Ok(Part::bytes(bytes).file_name(file_name))
    }

    async fn execute(request: RequestBuilder) -> Result<(), DispatchError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status,
            body: body.chars().take(500).collect(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, body: &str) -> Result<(), DispatchError> {
        let request = self
            .client
            .post(self.method("sendMessage"))
            .timeout(Duration::from_secs(TEXT_SEND_TIMEOUT_SECS))
            .json(&json!({
                "chat_id": self.chat_id,
                "text": body,
                "parse_mode": "Markdown",
            }));
        Self::execute(request).await
    }

    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), DispatchError> {
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .part("photo", Self::file_part(path).await?);
        let request = self
            .client
            .post(self.method("sendPhoto"))
            .timeout(Duration::from_secs(MEDIA_SEND_TIMEOUT_SECS))
            .multipart(form);
        Self::execute(request).await
    }

    async fn send_sticker(&self, path: &Path) -> Result<(), DispatchError> {
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("sticker", Self::file_part(path).await?);
        let request = self
            .client
            .post(self.method("sendSticker"))
            .timeout(Duration::from_secs(MEDIA_SEND_TIMEOUT_SECS))
            .multipart(form);
        Self::execute(request).await
    }
}

/// Writes notifications to the log instead of a chat. Used for dry runs and
/// when no Telegram credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_text(&self, body: &str) -> Result<(), DispatchError> {
        tracing::info!("[dry-run] text:\n{}", body);
        Ok(())
    }

    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), DispatchError> {
        tracing::info!("[dry-run] photo {}:\n{}", path.display(), caption);
        Ok(())
    }

    async fn send_sticker(&self, path: &Path) -> Result<(), DispatchError> {
        tracing::info!("[dry-run] sticker {}", path.display());
        Ok(())
    }
}
