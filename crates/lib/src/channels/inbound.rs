//! Inbound event from the webhook: who wrote and which dispatch code they sent.

/// One parsed chat message or button reply, normalized for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender contact id (phone number, digits only).
    pub from: String,
    /// Trimmed text body or button-reply id; empty for any other message type.
    pub code: String,
}
