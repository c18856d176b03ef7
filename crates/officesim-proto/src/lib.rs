//! Wire protocol for the OfficeSim visualization client.
//!
//! The backend pushes tagged events over a long-lived connection, one JSON
//! object per line. Each inbound event carries an agent id and a *partial*
//! state record: absent fields mean "unchanged". Outbound traffic is the
//! start request and user prompt responses.
//!
//! Positions on the wire are in simulation space; the client negates the
//! depth axis when it stores them (see `officesim_logic::coords`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

/// A position in simulation space, `[x, y, z]`.
pub type SimVec3 = [f32; 3];

// ── Events ──────────────────────────────────────────────────────────────

/// Events pushed by the simulation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    UpdateAgent {
        agent_id: String,
        /// Absent state discards the whole event (no partial processing).
        #[serde(default)]
        state: Option<AgentSnapshot>,
    },
    RemoveAgent {
        agent_id: String,
    },
    SimulationComplete {
        success: bool,
        output: String,
    },
    SimulationError {
        error: String,
    },
    SimulationStatus {
        status: String,
        #[serde(default)]
        message: Option<String>,
    },
    RequestUserInput {
        task_id: String,
        question: String,
    },
}

/// Events the client sends to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    StartSimulation {
        request: String,
        llm_configs: BTreeMap<String, LlmConfig>,
        enabled_tools: Vec<String>,
    },
    UserResponse {
        task_id: String,
        response: String,
    },
}

/// Partial per-agent state. Every field is optional; only present fields
/// are merged into the registry entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SimVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_thoughts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_idle_sub_state: Option<String>,
}

/// Per-role LLM selection collected before a run starts.
/// The wire field is `type` to match the backend's naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "type")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
}

// ── Roles ───────────────────────────────────────────────────────────────

/// The closed set of agent roles. Set once at creation, never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Ceo,
    ProductManager,
    Marketer,
    Coder,
    Qa,
    HtmlSpecialist,
    CssSpecialist,
    JsSpecialist,
    Messenger,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Ceo,
        Role::ProductManager,
        Role::Marketer,
        Role::Coder,
        Role::Qa,
        Role::HtmlSpecialist,
        Role::CssSpecialist,
        Role::JsSpecialist,
        Role::Messenger,
    ];

    /// Parse the backend's role string. Unknown strings are rejected —
    /// agent creation requires a valid role.
    pub fn from_wire(s: &str) -> Option<Role> {
        match s {
            "CEO" => Some(Role::Ceo),
            "Product Manager" => Some(Role::ProductManager),
            "Marketer" => Some(Role::Marketer),
            "Coder" => Some(Role::Coder),
            "QA" => Some(Role::Qa),
            "HTML Specialist" => Some(Role::HtmlSpecialist),
            "CSS Specialist" => Some(Role::CssSpecialist),
            "JavaScript Specialist" => Some(Role::JsSpecialist),
            "Messenger" => Some(Role::Messenger),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::ProductManager => "Product Manager",
            Role::Marketer => "Marketer",
            Role::Coder => "Coder",
            Role::Qa => "QA",
            Role::HtmlSpecialist => "HTML Specialist",
            Role::CssSpecialist => "CSS Specialist",
            Role::JsSpecialist => "JavaScript Specialist",
            Role::Messenger => "Messenger",
        }
    }

    /// Whether a run cannot start without an LLM configuration for this
    /// role. Specialists are spawned on demand by the backend and the
    /// Messenger runs without a model.
    pub fn requires_llm_config(self) -> bool {
        matches!(
            self,
            Role::Ceo | Role::ProductManager | Role::Marketer | Role::Coder | Role::Qa
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ── Status ──────────────────────────────────────────────────────────────

/// Agent activity status. Unknown wire strings map to [`AgentStatus::Unknown`]
/// so newer backends can add statuses without breaking older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    #[default]
    Idle,
    Working,
    WaitingUserInput,
    WaitingResponse,
    Failed,
    MovingToZone,
    Meeting,
    UsingToolInZone,
    Unknown,
}

impl AgentStatus {
    pub fn from_wire(s: &str) -> AgentStatus {
        match s {
            "idle" => AgentStatus::Idle,
            "working" => AgentStatus::Working,
            "waiting_user_input" => AgentStatus::WaitingUserInput,
            "waiting_response" => AgentStatus::WaitingResponse,
            "failed" => AgentStatus::Failed,
            "moving_to_zone" => AgentStatus::MovingToZone,
            "meeting" => AgentStatus::Meeting,
            "using_tool_in_zone" => AgentStatus::UsingToolInZone,
            _ => AgentStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Working => "working",
            AgentStatus::WaitingUserInput => "waiting_user_input",
            AgentStatus::WaitingResponse => "waiting_response",
            AgentStatus::Failed => "failed",
            AgentStatus::MovingToZone => "moving_to_zone",
            AgentStatus::Meeting => "meeting",
            AgentStatus::UsingToolInZone => "using_tool_in_zone",
            AgentStatus::Unknown => "unknown",
        }
    }
}

/// Refinement of [`AgentStatus::Idle`]. Meaningless for any other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleSubState {
    AtWaterCooler,
    Wandering,
    #[default]
    Default,
}

impl IdleSubState {
    pub fn from_wire(s: &str) -> IdleSubState {
        match s {
            "at_water_cooler" => IdleSubState::AtWaterCooler,
            "wandering" => IdleSubState::Wandering,
            _ => IdleSubState::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_agent_round_trip() {
        let event = ServerEvent::UpdateAgent {
            agent_id: "agent-a1".to_string(),
            state: Some(AgentSnapshot {
                role: Some("Coder".to_string()),
                position: Some([10.0, 0.0, 5.0]),
                status: Some("working".to_string()),
                ..AgentSnapshot::default()
            }),
        };
        let json = serde_json::to_string(&event).expect("serialize event");
        let parsed: ServerEvent = serde_json::from_str(&json).expect("deserialize event");
        assert_eq!(parsed, event);
    }

    #[test]
    fn update_agent_without_state_parses() {
        let parsed: ServerEvent =
            serde_json::from_str(r#"{"event":"update_agent","agent_id":"a1"}"#)
                .expect("deserialize");
        assert_eq!(
            parsed,
            ServerEvent::UpdateAgent {
                agent_id: "a1".to_string(),
                state: None,
            }
        );
    }

    #[test]
    fn update_agent_with_non_object_state_is_rejected() {
        let result: Result<ServerEvent, _> =
            serde_json::from_str(r#"{"event":"update_agent","agent_id":"a1","state":"busy"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_absent_fields_stay_none() {
        let snapshot: AgentSnapshot =
            serde_json::from_str(r#"{"position":[1.0,2.0,3.0]}"#).expect("deserialize");
        assert_eq!(snapshot.position, Some([1.0, 2.0, 3.0]));
        assert_eq!(snapshot.role, None);
        assert_eq!(snapshot.status, None);
    }

    #[test]
    fn start_simulation_round_trip() {
        let mut llm_configs = BTreeMap::new();
        llm_configs.insert(
            "CEO".to_string(),
            LlmConfig {
                provider: "openai".to_string(),
                model: Some("gpt-4o".to_string()),
            },
        );
        let event = ClientEvent::StartSimulation {
            request: "Create a basic webpage about cars".to_string(),
            llm_configs,
            enabled_tools: vec!["SAVE_ZONE".to_string()],
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"openai""#), "wire field is `type`: {json}");
        let parsed: ClientEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, event);
    }

    #[test]
    fn user_response_round_trip() {
        let event = ClientEvent::UserResponse {
            task_id: "t1".to_string(),
            response: "yes".to_string(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: ClientEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, event);
    }

    #[test]
    fn role_wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_wire(role.wire_name()), Some(role));
        }
        assert_eq!(Role::from_wire("Intern"), None);
        assert_eq!(Role::from_wire(""), None);
    }

    #[test]
    fn unknown_status_is_forward_compatible() {
        assert_eq!(AgentStatus::from_wire("working"), AgentStatus::Working);
        assert_eq!(AgentStatus::from_wire("debugging"), AgentStatus::Unknown);
        assert_eq!(IdleSubState::from_wire("wandering"), IdleSubState::Wandering);
        assert_eq!(IdleSubState::from_wire("at_desk"), IdleSubState::Default);
    }
}
