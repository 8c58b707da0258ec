//! Webhook wire types for the verification handshake.

use serde::{Deserialize, Serialize};

/// Mode the platform sends when registering the webhook.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// GET /webhook query: `hub.mode`, `hub.verify_token`, `hub.challenge`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Challenge to echo when mode is "subscribe" and the token matches; None otherwise.
    pub fn accept(&self, expected_token: &str) -> Option<&str> {
        let mode_ok = self.mode.as_deref() == Some(SUBSCRIBE_MODE);
        let token_ok = self.verify_token.as_deref() == Some(expected_token);
        if mode_ok && token_ok {
            Some(self.challenge.as_deref().unwrap_or(""))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mode: &str, token: &str) -> VerifyQuery {
        VerifyQuery {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some("1158201444".to_string()),
        }
    }

    #[test]
    fn accepts_subscribe_with_matching_token() {
        assert_eq!(query("subscribe", "s3cret").accept("s3cret"), Some("1158201444"));
    }

    #[test]
    fn rejects_wrong_mode_or_token() {
        assert_eq!(query("unsubscribe", "s3cret").accept("s3cret"), None);
        assert_eq!(query("subscribe", "nope").accept("s3cret"), None);
        assert_eq!(VerifyQuery::default().accept("s3cret"), None);
    }
}
