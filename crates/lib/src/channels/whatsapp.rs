//! WhatsApp channel: Cloud API `/messages` sends and webhook payload types.

use crate::channels::inbound::InboundEvent;
use crate::channels::outbound::{Outbound, SendError};
use crate::config::Settings;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const MAIN_MENU_BODY: &str =
    "Olá, seja bem-vindo à *Narau Languages*! 👋\nComo posso te ajudar?";
const MAIN_MENU_BUTTONS: [(&str, &str); 3] = [
    ("info", "📘 informações"),
    ("agendar", "🗓️ Aula teste"),
    ("outros", "💬 Outros"),
];

const LANGUAGE_MENU_BODY: &str = "Perfeito! Qual idioma você gostaria de aprender? 🌍";
const LANGUAGE_MENU_BUTTONS: [(&str, &str); 3] = [
    ("ingles", "🇺🇸 Inglês"),
    ("espanhol", "🇪🇸 Espanhol"),
    ("japones", "🇯🇵 Japonês"),
];

/// Webhook POST body. Only `entry[0].changes[0].value.messages[0]` is read; sibling
/// entries, changes and messages are never parsed, so odd neighbours cannot hide it.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct WebhookPayload(Value);

const FIRST_MESSAGE_POINTER: &str = "/entry/0/changes/0/value/messages/0";

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub from: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub interactive: Option<InteractiveContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractiveContent {
    #[serde(default)]
    pub button_reply: Option<ButtonReply>,
}

#[derive(Debug, Deserialize)]
pub struct ButtonReply {
    pub id: String,
}

impl WebhookPayload {
    /// First message of the first change of the first entry, if any.
    /// A first message that does not have the expected shape counts as absent.
    pub fn first_message(&self) -> Option<WebhookMessage> {
        let raw = self.0.pointer(FIRST_MESSAGE_POINTER)?;
        match WebhookMessage::deserialize(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                log::warn!("ignoring malformed webhook message: {}", e);
                None
            }
        }
    }
}

impl WebhookMessage {
    /// Dispatch code: trimmed text body, or the button-reply id. Other types yield "".
    pub fn code(&self) -> String {
        match self.kind.as_str() {
            "text" => self
                .text
                .as_ref()
                .and_then(|t| t.body.as_deref())
                .map(|b| b.trim().to_string())
                .unwrap_or_default(),
            "interactive" => self
                .interactive
                .as_ref()
                .and_then(|i| i.button_reply.as_ref())
                .map(|r| r.id.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    pub fn to_event(&self) -> InboundEvent {
        InboundEvent {
            from: self.from.clone(),
            code: self.code(),
        }
    }
}

/// `type: text` message body.
pub fn text_payload(to: &str, body: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "text",
        "text": { "body": body },
    })
}

fn button_payload(to: &str, body: &str, buttons: &[(&str, &str)]) -> Value {
    let buttons: Vec<Value> = buttons
        .iter()
        .map(|(id, title)| json!({ "type": "reply", "reply": { "id": id, "title": title } }))
        .collect();
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "interactive",
        "interactive": {
            "type": "button",
            "body": { "text": body },
            "action": { "buttons": buttons },
        },
    })
}

/// Interactive payload with the main menu buttons; each button id is the code it triggers.
pub fn main_menu_payload(to: &str) -> Value {
    button_payload(to, MAIN_MENU_BODY, &MAIN_MENU_BUTTONS)
}

/// Interactive payload with the language buttons.
pub fn language_menu_payload(to: &str) -> Value {
    button_payload(to, LANGUAGE_MENU_BODY, &LANGUAGE_MENU_BUTTONS)
}

/// Cloud API client bound to one sender phone-number id.
#[derive(Clone)]
pub struct WhatsAppClient {
    messages_url: Option<String>,
    token: Option<String>,
    client: reqwest::Client,
}

impl WhatsAppClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            messages_url: settings.messages_url(),
            token: settings.access_token.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// POST one payload to `/messages` with the bearer token. Non-2xx is an error carrying the body.
    async fn post(&self, payload: &Value) -> Result<(), SendError> {
        let url = self
            .messages_url
            .as_ref()
            .ok_or(SendError::NotConfigured("PHONE_NUMBER_ID"))?;
        let token = self
            .token
            .as_ref()
            .ok_or(SendError::NotConfigured("WHATSAPP_TOKEN"))?;
        let res = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SendError::Api { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Outbound for WhatsAppClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), SendError> {
        self.post(&text_payload(to, body)).await
    }

    async fn send_main_menu(&self, to: &str) -> Result<(), SendError> {
        self.post(&main_menu_payload(to)).await
    }

    async fn send_language_menu(&self, to: &str) -> Result<(), SendError> {
        self.post(&language_menu_payload(to)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> WebhookPayload {
        serde_json::from_str(body).expect("parse webhook payload")
    }

    #[test]
    fn text_message_code_is_trimmed_body() {
        let p = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"5511999990000","type":"text","text":{"body":"  info \n"}}
            ]}}]}]}"#,
        );
        let ev = p.first_message().unwrap().to_event();
        assert_eq!(ev.from, "5511999990000");
        assert_eq!(ev.code, "info");
    }

    #[test]
    fn button_reply_code_is_reply_id() {
        let p = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"551188887777","type":"interactive",
                 "interactive":{"type":"button_reply","button_reply":{"id":"agendar","title":"🗓️ Aula teste"}}}
            ]}}]}]}"#,
        );
        assert_eq!(p.first_message().unwrap().code(), "agendar");
    }

    #[test]
    fn odd_sibling_message_does_not_hide_first() {
        let p = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"5511","type":"text","text":{"body":"info"}},
                {"type":"unsupported"}
            ]}}]},{"changes":"not-a-list"}]}"#,
        );
        let ev = p.first_message().unwrap().to_event();
        assert_eq!(ev.from, "5511");
        assert_eq!(ev.code, "info");
    }

    #[test]
    fn first_message_without_sender_is_absent() {
        let p = parse(r#"{"entry":[{"changes":[{"value":{"messages":[{"type":"text"}]}}]}]}"#);
        assert!(p.first_message().is_none());
    }

    #[test]
    fn other_message_types_yield_empty_code() {
        let p = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"1","type":"image","image":{"id":"abc"}}
            ]}}]}]}"#,
        );
        assert_eq!(p.first_message().unwrap().code(), "");
    }

    #[test]
    fn status_callback_has_no_message() {
        let p = parse(
            r#"{"object":"whatsapp_business_account","entry":[{"changes":[{"value":{
                "statuses":[{"id":"wamid.x","status":"delivered"}]
            }}]}]}"#,
        );
        assert!(p.first_message().is_none());
        assert!(parse("{}").first_message().is_none());
    }

    #[test]
    fn main_menu_buttons_carry_dispatch_codes() {
        let v = main_menu_payload("55119");
        assert_eq!(v["messaging_product"], "whatsapp");
        assert_eq!(v["to"], "55119");
        assert_eq!(v["type"], "interactive");
        assert_eq!(v["interactive"]["type"], "button");
        let ids: Vec<&str> = v["interactive"]["action"]["buttons"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["reply"]["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["info", "agendar", "outros"]);
    }

    #[test]
    fn language_menu_buttons_carry_topics() {
        let v = language_menu_payload("55119");
        let buttons = v["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0]["type"], "reply");
        assert_eq!(buttons[2]["reply"]["id"], "japones");
        assert_eq!(buttons[2]["reply"]["title"], "🇯🇵 Japonês");
    }

    #[test]
    fn text_payload_shape() {
        let v = text_payload("1", "olá");
        assert_eq!(v, json!({
            "messaging_product": "whatsapp",
            "to": "1",
            "type": "text",
            "text": { "body": "olá" },
        }));
    }
}
