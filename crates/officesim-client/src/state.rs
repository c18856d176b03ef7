//! State management for the OfficeSim client.
//!
//! Contains resource types and Bevy components used throughout the client.

use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

use bevy::prelude::*;
use serde::Deserialize;

use officesim_logic::registry::AgentRegistry;
use officesim_logic::session::Session;
use officesim_logic::zones::ZoneKey;
use officesim_proto::{AgentStatus, ClientEvent, IdleSubState, LlmConfig, Role};

// ============================================================================
// RESOURCES
// ============================================================================

/// Traffic moving over the connection thread's channels.
pub enum LinkUpdate {
    /// The TCP connection came up.
    Opened,
    Event(officesim_proto::ServerEvent),
    /// The connection is gone; the link resource must be rebuilt.
    Closed { reason: String },
}

/// Channel pair owned by the connection thread.
pub struct EventLink {
    pub tx: Sender<ClientEvent>,
    pub rx: Mutex<Receiver<LinkUpdate>>,
}

#[derive(Resource)]
pub enum ConnectionState {
    Disconnected,
    Connected(EventLink),
    Reconnecting,
}

#[derive(Resource)]
pub struct ConnectionConfig {
    pub server_addr: String,
    pub config_path: String,
    pub reconnect_delay: f32,
    pub reconnect_timer: f32,
    pub reconnect_attempts: u32,
    pub max_reconnect_delay: f32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:7878".to_string(),
            config_path: "officesim.toml".to_string(),
            reconnect_delay: 1.0,
            reconnect_timer: 0.0,
            reconnect_attempts: 0,
            max_reconnect_delay: 30.0,
        }
    }
}

impl ConnectionConfig {
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--server" | "-s" if i + 1 < args.len() => {
                    config.server_addr = args[i + 1].clone();
                    i += 2;
                }
                "--config" | "-c" if i + 1 < args.len() => {
                    config.config_path = args[i + 1].clone();
                    i += 2;
                }
                _ => i += 1,
            }
        }
        config
    }

    pub fn reset_backoff(&mut self) {
        self.reconnect_delay = 1.0;
        self.reconnect_attempts = 0;
    }

    pub fn advance_backoff(&mut self) {
        self.reconnect_attempts += 1;
        self.reconnect_delay = (self.reconnect_delay * 2.0).min(self.max_reconnect_delay);
        self.reconnect_timer = self.reconnect_delay;
    }
}

/// The engine state proper: one registry + one session per running client.
#[derive(Resource, Default)]
pub struct SimState {
    pub registry: AgentRegistry,
    pub session: Session,
}

/// Run parameters normally collected by the configuration surface.
/// Loaded from `officesim.toml` (or `--config`), with built-in defaults.
#[derive(Resource, Clone)]
pub struct RunConfig {
    pub request: String,
    pub llm_configs: BTreeMap<String, LlmConfig>,
    pub enabled_tools: Vec<ZoneKey>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let llm_configs = Role::ALL
            .iter()
            .filter(|r| r.requires_llm_config())
            .map(|r| {
                (
                    r.wire_name().to_string(),
                    LlmConfig {
                        provider: "google".to_string(),
                        model: None,
                    },
                )
            })
            .collect();
        Self {
            request: "Create a basic webpage about cars".to_string(),
            llm_configs,
            enabled_tools: vec![
                ZoneKey::SaveZone,
                ZoneKey::InternetZone,
                ZoneKey::WaterCoolerZone,
            ],
        }
    }
}

#[derive(Deserialize)]
struct RunConfigFile {
    request: Option<String>,
    #[serde(default)]
    enabled_tools: Vec<String>,
    #[serde(default)]
    llm: BTreeMap<String, LlmConfig>,
}

impl RunConfig {
    pub fn load(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
        let file: RunConfigFile = toml::from_str(&text).map_err(|e| format!("{path}: {e}"))?;

        let defaults = Self::default();
        let mut enabled_tools = Vec::new();
        for key in &file.enabled_tools {
            match ZoneKey::from_wire(key) {
                Some(zone) if zone.is_tool_zone() => enabled_tools.push(zone),
                Some(zone) => warn!("{path}: {key} ({zone:?}) is not a tool zone, ignoring"),
                None => warn!("{path}: unknown tool zone {key}, ignoring"),
            }
        }

        Ok(Self {
            request: file.request.unwrap_or(defaults.request),
            llm_configs: if file.llm.is_empty() {
                defaults.llm_configs
            } else {
                file.llm
            },
            enabled_tools,
        })
    }

    /// Load from disk, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded run configuration from {path}");
                config
            }
            Err(e) => {
                info!("Using default run configuration ({e})");
                Self::default()
            }
        }
    }
}

/// An open user-input prompt. Not modal to the engine — rendering and
/// event handling continue while it is shown.
pub struct PromptState {
    pub task_id: String,
    pub question: String,
    pub input: String,
}

#[derive(Resource, Default)]
pub struct UiState {
    pub toasts: Vec<Toast>,
    pub prompt: Option<PromptState>,
    pub hover: Option<String>,
}

pub struct Toast {
    pub message: String,
    pub color: Color,
    pub timer: f32,
}

impl UiState {
    pub fn toast(&mut self, message: impl Into<String>, color: Color, secs: f32) {
        self.toasts.push(Toast {
            message: message.into(),
            color,
            timer: secs,
        });
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.toast(message, Color::srgb(1.0, 0.9, 0.3), 5.0);
    }
}

/// Set when a run starts: the tool zones to materialize. Consumed by the
/// zone sync system, which despawns stale tool-zone visuals first.
#[derive(Resource, Default)]
pub struct ToolZoneRequest(pub Option<Vec<ZoneKey>>);

// ============================================================================
// BEVY COMPONENTS
// ============================================================================

/// Root entity of one agent's visual. Children carry the body mesh.
#[derive(Component)]
pub struct AgentVisual {
    pub agent_id: String,
    /// Status whose cue is currently committed to the material.
    pub shown_cue: Option<(AgentStatus, IdleSubState)>,
}

/// The agent's body mesh (holds the per-agent material instance).
#[derive(Component)]
pub struct AgentBody;

/// Free-floating name label, positioned and billboarded every frame.
#[derive(Component)]
pub struct AgentLabel {
    pub agent_id: String,
}

/// A materialized zone visual (floor plane, border, label, props).
#[derive(Component)]
pub struct ZoneVisual {
    pub zone: ZoneKey,
}

#[derive(Component)]
pub struct ViewCamera;

#[derive(Component)]
pub struct HudText;

#[derive(Component)]
pub struct HoverPanel;

#[derive(Component)]
pub struct ToastContainer;

#[derive(Component)]
pub struct ConfigPanel;

#[derive(Component)]
pub struct ConfigPanelText;

#[derive(Component)]
pub struct PromptPanel;

#[derive(Component)]
pub struct PromptText;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut config = ConnectionConfig::default();
        let mut delays = Vec::new();
        for _ in 0..8 {
            config.advance_backoff();
            delays.push(config.reconnect_delay);
        }
        assert_eq!(&delays[..5], &[2.0, 4.0, 8.0, 16.0, 30.0]);
        assert!(delays.iter().all(|d| *d <= config.max_reconnect_delay));
        assert_eq!(config.reconnect_attempts, 8);

        config.reset_backoff();
        assert_eq!(config.reconnect_delay, 1.0);
        assert_eq!(config.reconnect_attempts, 0);
    }

    #[test]
    fn test_run_config_file_shape() {
        let text = r#"
            request = "Build a portfolio site"
            enabled_tools = ["SAVE_ZONE", "CODE_EXEC_ZONE"]

            [llm.CEO]
            type = "openai"
            model = "gpt-4o"
        "#;
        let file: RunConfigFile = toml::from_str(text).expect("parse");
        assert_eq!(file.request.as_deref(), Some("Build a portfolio site"));
        assert_eq!(file.enabled_tools.len(), 2);
        let ceo = file.llm.get("CEO").expect("CEO entry");
        assert_eq!(ceo.provider, "openai");
        assert_eq!(ceo.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_default_run_config_covers_required_roles() {
        let config = RunConfig::default();
        for role in Role::ALL.iter().filter(|r| r.requires_llm_config()) {
            assert!(
                config.llm_configs.contains_key(role.wire_name()),
                "missing default config for {role}"
            );
        }
        assert!(config.enabled_tools.iter().all(|z| z.is_tool_zone()));
    }
}
