//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `./relay.json`) and then overridden from the
//! environment, using the same variable names the Cloud API deployment has always used
//! (`WHATSAPP_TOKEN`, `PHONE_NUMBER_ID`, `COORD_*`, ...).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_VERIFY_TOKEN: &str = "narau_token";
const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_API_VERSION: &str = "v19.0";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// WhatsApp Cloud API credentials and webhook secret.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Contacts that receive handoff notifications.
    #[serde(default)]
    pub coordinators: CoordinatorsConfig,
}

/// Listener bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook (default 3000). Overridden by PORT env.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must reach it).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Cloud API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppConfig {
    /// Shared secret echoed back by the platform during webhook registration. Overridden by VERIFY_TOKEN env.
    pub verify_token: Option<String>,
    /// Bearer token for the Graph API. Overridden by WHATSAPP_TOKEN env.
    pub access_token: Option<String>,
    /// Sender phone-number id. Overridden by PHONE_NUMBER_ID env.
    pub phone_number_id: Option<String>,
    /// Graph API host (default https://graph.facebook.com). Overridden by WHATSAPP_API_BASE env.
    pub api_base_url: Option<String>,
    /// Graph API version segment (default v19.0).
    pub api_version: Option<String>,
}

/// Coordinator contact ids (international phone numbers, digits only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorsConfig {
    pub ingles: Option<String>,
    pub espanhol: Option<String>,
    pub japones: Option<String>,
    /// Human attendant for general escalation ("outros").
    pub atendente: Option<String>,
}

/// Settings after env overrides and defaults; immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub verify_token: String,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub api_base_url: String,
    pub api_version: String,
    pub coordinators: CoordinatorsConfig,
}

impl Settings {
    /// Names of the outbound settings that are missing. Sends fail until these are set.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.access_token.is_none() {
            missing.push("WHATSAPP_TOKEN");
        }
        if self.phone_number_id.is_none() {
            missing.push("PHONE_NUMBER_ID");
        }
        missing
    }

    /// `{base}/{version}/{phone_number_id}/messages`, or None when the phone-number id is missing.
    pub fn messages_url(&self) -> Option<String> {
        self.phone_number_id
            .as_ref()
            .map(|id| format!("{}/{}/{}/messages", self.api_base_url, self.api_version, id))
    }
}

/// Trim and drop empty values.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve settings: env (via `env`) overrides config, then defaults.
/// `env` is a lookup so callers can pass `std::env::var` or a fixed map in tests.
pub fn resolve_settings<F>(config: &Config, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |key: &str, fallback: Option<&String>| {
        non_empty(env(key).as_deref()).or_else(|| non_empty(fallback.map(String::as_str)))
    };

    let port = match env("PORT").map(|p| p.trim().parse::<u16>()) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            log::warn!("ignoring invalid PORT: {}", e);
            config.server.port
        }
        None => config.server.port,
    };

    let wa = &config.whatsapp;
    let co = &config.coordinators;
    Settings {
        bind: non_empty(Some(config.server.bind.as_str())).unwrap_or_else(default_server_bind),
        port,
        verify_token: pick("VERIFY_TOKEN", wa.verify_token.as_ref())
            .unwrap_or_else(|| DEFAULT_VERIFY_TOKEN.to_string()),
        access_token: pick("WHATSAPP_TOKEN", wa.access_token.as_ref()),
        phone_number_id: pick("PHONE_NUMBER_ID", wa.phone_number_id.as_ref()),
        api_base_url: pick("WHATSAPP_API_BASE", wa.api_base_url.as_ref())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        api_version: non_empty(wa.api_version.as_deref())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        coordinators: CoordinatorsConfig {
            ingles: pick("COORD_INGLES", co.ingles.as_ref()),
            espanhol: pick("COORD_ESPANHOL", co.espanhol.as_ref()),
            japones: pick("COORD_JAPONES", co.japones.as_ref()),
            atendente: pick("COORD_ATENDENTE", co.atendente.as_ref()),
        },
    }
}

/// Resolve settings against the process environment.
pub fn resolve_settings_from_env(config: &Config) -> Settings {
    resolve_settings(config, |key| std::env::var(key).ok())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("relay.json"))
}

/// Load config from the given path (or RELAY_CONFIG_PATH, or ./relay.json). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let s = resolve_settings(&Config::default(), env_of(&[]));
        assert_eq!(s.port, 3000);
        assert_eq!(s.bind, "0.0.0.0");
        assert_eq!(s.verify_token, "narau_token");
        assert_eq!(s.api_base_url, "https://graph.facebook.com");
        assert_eq!(s.api_version, "v19.0");
        assert!(s.access_token.is_none());
        assert_eq!(s.missing_credentials(), vec!["WHATSAPP_TOKEN", "PHONE_NUMBER_ID"]);
        assert!(s.messages_url().is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 8080 },
                "whatsapp": { "accessToken": "from-file", "phoneNumberId": "111" },
                "coordinators": { "ingles": "5511000000001" }
            }"#,
        )
        .unwrap();
        let s = resolve_settings(
            &config,
            env_of(&[
                ("PORT", "9090"),
                ("WHATSAPP_TOKEN", "from-env"),
                ("COORD_JAPONES", " 5511000000003 "),
                ("COORD_ESPANHOL", "   "),
            ]),
        );
        assert_eq!(s.port, 9090);
        assert_eq!(s.access_token.as_deref(), Some("from-env"));
        assert_eq!(s.phone_number_id.as_deref(), Some("111"));
        assert_eq!(s.coordinators.ingles.as_deref(), Some("5511000000001"));
        assert_eq!(s.coordinators.japones.as_deref(), Some("5511000000003"));
        assert_eq!(s.coordinators.espanhol, None);
        assert!(s.missing_credentials().is_empty());
    }

    #[test]
    fn invalid_port_env_keeps_config_port() {
        let s = resolve_settings(&Config::default(), env_of(&[("PORT", "http")]));
        assert_eq!(s.port, 3000);
    }

    #[test]
    fn messages_url_trims_trailing_slash() {
        let s = resolve_settings(
            &Config::default(),
            env_of(&[
                ("WHATSAPP_API_BASE", "http://127.0.0.1:9999/"),
                ("PHONE_NUMBER_ID", "42"),
            ]),
        );
        assert_eq!(
            s.messages_url().as_deref(),
            Some("http://127.0.0.1:9999/v19.0/42/messages")
        );
    }
}
