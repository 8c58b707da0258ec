//! Outbound sends: the three message shapes the relay ever produces.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("whatsapp not configured: {0} missing")]
    NotConfigured(&'static str),
    #[error("whatsapp request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("whatsapp api error: {status} {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Sends messages to a contact. Each call is a single request; no retries.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Plain text message.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), SendError>;
    /// Main button menu (info / agendar / outros).
    async fn send_main_menu(&self, to: &str) -> Result<(), SendError>;
    /// Language button menu (ingles / espanhol / japones).
    async fn send_language_menu(&self, to: &str) -> Result<(), SendError>;
}
