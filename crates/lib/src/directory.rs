//! Coordinator directory: which contact receives handoffs for each topic.
//!
//! Built once from settings; read-only afterwards.

use crate::config::CoordinatorsConfig;

/// Course topic chosen from the language menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Ingles,
    Espanhol,
    Japones,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Ingles, Topic::Espanhol, Topic::Japones];

    /// Dispatch code (and button id) for the topic.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Ingles => "ingles",
            Topic::Espanhol => "espanhol",
            Topic::Japones => "japones",
        }
    }

    pub fn from_code(code: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.as_str() == code)
    }
}

/// Topic coordinators plus the general human attendant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorDirectory {
    ingles: Option<String>,
    espanhol: Option<String>,
    japones: Option<String>,
    attendant: Option<String>,
}

impl CoordinatorDirectory {
    pub fn new(config: &CoordinatorsConfig) -> Self {
        Self {
            ingles: config.ingles.clone(),
            espanhol: config.espanhol.clone(),
            japones: config.japones.clone(),
            attendant: config.atendente.clone(),
        }
    }

    /// Coordinator for a topic, if configured.
    pub fn topic(&self, topic: Topic) -> Option<&str> {
        match topic {
            Topic::Ingles => self.ingles.as_deref(),
            Topic::Espanhol => self.espanhol.as_deref(),
            Topic::Japones => self.japones.as_deref(),
        }
    }

    /// Human attendant for "outros", if configured.
    pub fn attendant(&self) -> Option<&str> {
        self.attendant.as_deref()
    }

    /// Keys with no contact configured (for startup warnings and `relay check`).
    pub fn unconfigured(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Topic::ALL
            .into_iter()
            .filter(|t| self.topic(*t).is_none())
            .map(Topic::as_str)
            .collect();
        if self.attendant.is_none() {
            out.push("atendente");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_codes_round_trip() {
        for t in Topic::ALL {
            assert_eq!(Topic::from_code(t.as_str()), Some(t));
        }
        assert_eq!(Topic::from_code("Ingles"), None);
        assert_eq!(Topic::from_code(""), None);
    }

    #[test]
    fn lookup_and_unconfigured() {
        let dir = CoordinatorDirectory::new(&CoordinatorsConfig {
            espanhol: Some("5511000000002".to_string()),
            atendente: Some("5511000000009".to_string()),
            ..Default::default()
        });
        assert_eq!(dir.topic(Topic::Espanhol), Some("5511000000002"));
        assert_eq!(dir.topic(Topic::Ingles), None);
        assert_eq!(dir.attendant(), Some("5511000000009"));
        assert_eq!(dir.unconfigured(), vec!["ingles", "japones"]);
    }
}
