//! Inbound dispatch: map a dispatch code to exactly one reply, plus an optional coordinator notice.

use crate::channels::{InboundEvent, Outbound, SendError};
use crate::directory::{CoordinatorDirectory, Topic};
use std::sync::Arc;

const INFO_TEXT: &str = "📘 A Narau Languages oferece aulas com professores nativos, metodologia imersiva e horários flexíveis. Quer que eu envie nosso catálogo?";
const HANDOFF_TEXT: &str =
    "💬 Certo! Encaminhando para um atendente humano. Por favor, aguarde um momento.";
const TOPIC_CONFIRMATION_TEXT: &str =
    "✅ Perfeito! Vou te conectar com o coordenador do curso escolhido.";

/// Action selected by a dispatch code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// "info": informational text.
    Info,
    /// "agendar": language menu.
    Schedule,
    /// "outros": hand off to the human attendant.
    Other,
    /// "ingles" | "espanhol" | "japones": hand off to the topic coordinator.
    Language(Topic),
    /// Anything else, including "": main menu.
    Menu,
}

impl Command {
    /// Exact, case-sensitive match; unknown codes fall through to `Menu`.
    pub fn parse(code: &str) -> Command {
        match code {
            "info" => Command::Info,
            "agendar" => Command::Schedule,
            "outros" => Command::Other,
            other => Topic::from_code(other)
                .map(Command::Language)
                .unwrap_or(Command::Menu),
        }
    }
}

/// URL that opens a chat with `contact`.
pub fn deep_link(contact: &str) -> String {
    format!("https://wa.me/{}", contact)
}

fn attendant_notice(from: &str) -> String {
    format!("👋 Novo contato para atendimento: {}", deep_link(from))
}

fn topic_notice(topic: Topic, from: &str) -> String {
    format!(
        "👋 Novo aluno interessado em {}. Contato: {}",
        topic.as_str(),
        deep_link(from)
    )
}

/// Stateless dispatcher shared by all requests.
#[derive(Clone)]
pub struct Dispatcher {
    outbound: Arc<dyn Outbound>,
    directory: Arc<CoordinatorDirectory>,
}

impl Dispatcher {
    pub fn new(outbound: Arc<dyn Outbound>, directory: Arc<CoordinatorDirectory>) -> Self {
        Self {
            outbound,
            directory,
        }
    }

    pub fn directory(&self) -> &CoordinatorDirectory {
        &self.directory
    }

    pub async fn dispatch_event(&self, event: &InboundEvent) -> Result<(), SendError> {
        self.dispatch(&event.from, &event.code).await
    }

    /// Reply to `from` first; then notify the coordinator when one is configured.
    /// A missing coordinator skips the notice without error.
    pub async fn dispatch(&self, from: &str, code: &str) -> Result<(), SendError> {
        let out = self.outbound.as_ref();
        match Command::parse(code) {
            Command::Info => out.send_text(from, INFO_TEXT).await,
            Command::Schedule => out.send_language_menu(from).await,
            Command::Other => {
                out.send_text(from, HANDOFF_TEXT).await?;
                match self.directory.attendant() {
                    Some(attendant) => out.send_text(attendant, &attendant_notice(from)).await,
                    None => {
                        log::debug!("no attendant configured; handoff for {} not forwarded", from);
                        Ok(())
                    }
                }
            }
            Command::Language(topic) => {
                out.send_text(from, TOPIC_CONFIRMATION_TEXT).await?;
                match self.directory.topic(topic) {
                    Some(coordinator) => {
                        out.send_text(coordinator, &topic_notice(topic, from)).await
                    }
                    None => {
                        log::debug!(
                            "no coordinator configured for {}; handoff for {} not forwarded",
                            topic.as_str(),
                            from
                        );
                        Ok(())
                    }
                }
            }
            Command::Menu => out.send_main_menu(from).await,
        }
    }
}
