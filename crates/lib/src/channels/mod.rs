//! Messaging channel: the WhatsApp Cloud API.
//!
//! `Outbound` is the seam the dispatcher sends through; `WhatsAppClient` implements it
//! against the Graph API. Webhook payload types live next to the client.

mod inbound;
mod outbound;
mod whatsapp;

pub use inbound::InboundEvent;
pub use outbound::{Outbound, SendError};
pub use whatsapp::{
    language_menu_payload, main_menu_payload, text_payload, WebhookMessage, WebhookPayload,
    WhatsAppClient,
};
