//! The set of currently known agents.
//!
//! One entry per live agent id. Each entry holds the last authoritative
//! target state and the locally interpolated render state. Inbound updates
//! merge only the fields they carry; positions overwrite the *target* only
//! — the render position is moved exclusively by the interpolation tick
//! (it is seeded from the creation snapshot, since there is nothing to
//! interpolate from yet).
//!
//! A removed id may later be reused by the backend; that is a new, distinct
//! agent with no identity continuity.

use std::collections::BTreeMap;
use std::fmt;

use officesim_proto::{AgentSnapshot, AgentStatus, IdleSubState, Role};

use crate::coords::{render_from_sim, RenderVec3};

/// Spawn position for agents created without a position.
const DEFAULT_SPAWN: RenderVec3 = [0.0, 0.5, 0.0];

/// Creation requires a valid role; updates never change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingRoleError {
    Absent,
    Unrecognized(String),
}

impl fmt::Display for MissingRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRoleError::Absent => write!(f, "no role in creation snapshot"),
            MissingRoleError::Unrecognized(s) => write!(f, "unrecognized role {s:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: String,
    pub role: Role,
    /// Derived once at creation from role + id suffix, immutable.
    pub display_name: String,
    /// Last authoritative position (render space). May jump.
    pub target: RenderVec3,
    /// Locally interpolated position, moved only by the render tick.
    pub render: RenderVec3,
    pub status: AgentStatus,
    pub idle_sub: IdleSubState,
    pub thoughts: String,
}

fn display_name(role: Role, id: &str) -> String {
    let suffix = id.split('-').nth(1).unwrap_or("ID");
    format!("{role} ({suffix})")
}

/// Owned, passed-by-reference container — one per running client session.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or merge an agent from a partial snapshot.
    ///
    /// Unknown id: creates the agent only when the snapshot carries a valid
    /// role; otherwise fails with no mutation. Known id: merges only the
    /// fields present — a `role` on an update is ignored even if it names a
    /// different role.
    pub fn upsert(
        &mut self,
        id: &str,
        snapshot: &AgentSnapshot,
    ) -> Result<UpsertOutcome, MissingRoleError> {
        if let Some(agent) = self.agents.get_mut(id) {
            if let Some(p) = snapshot.position {
                agent.target = render_from_sim(p);
            }
            if let Some(thoughts) = &snapshot.current_thoughts {
                agent.thoughts = thoughts.clone();
            }
            if let Some(status) = &snapshot.status {
                agent.status = AgentStatus::from_wire(status);
            }
            if let Some(sub) = &snapshot.current_idle_sub_state {
                agent.idle_sub = IdleSubState::from_wire(sub);
            }
            return Ok(UpsertOutcome::Updated);
        }

        let role = match snapshot.role.as_deref() {
            None => return Err(MissingRoleError::Absent),
            Some(s) if s.trim().is_empty() => return Err(MissingRoleError::Absent),
            Some(s) => Role::from_wire(s)
                .ok_or_else(|| MissingRoleError::Unrecognized(s.to_string()))?,
        };

        let spawn = snapshot
            .position
            .map(render_from_sim)
            .unwrap_or(DEFAULT_SPAWN);
        self.agents.insert(
            id.to_string(),
            Agent {
                id: id.to_string(),
                role,
                display_name: display_name(role, id),
                target: spawn,
                render: spawn,
                status: snapshot
                    .status
                    .as_deref()
                    .map(AgentStatus::from_wire)
                    .unwrap_or_default(),
                idle_sub: snapshot
                    .current_idle_sub_state
                    .as_deref()
                    .map(IdleSubState::from_wire)
                    .unwrap_or_default(),
                thoughts: snapshot
                    .current_thoughts
                    .clone()
                    .unwrap_or_else(|| "...".to_string()),
            },
        );
        Ok(UpsertOutcome::Created)
    }

    /// Delete an entry. Absent ids are a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        self.agents.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Stable-order snapshot of all live agents (order not meaningful).
    pub fn all(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation(role: &str) -> AgentSnapshot {
        AgentSnapshot {
            role: Some(role.to_string()),
            position: Some([10.0, 0.0, 5.0]),
            status: Some("working".to_string()),
            ..AgentSnapshot::default()
        }
    }

    #[test]
    fn test_creation_maps_position_into_render_space() {
        let mut reg = AgentRegistry::new();
        assert_eq!(reg.upsert("a-1", &creation("Coder")), Ok(UpsertOutcome::Created));
        let agent = reg.get("a-1").unwrap();
        assert_eq!(agent.target, [10.0, 0.0, -5.0]);
        assert_eq!(agent.render, [10.0, 0.0, -5.0]);
        assert_eq!(agent.role, Role::Coder);
        assert_eq!(agent.status, AgentStatus::Working);
    }

    #[test]
    fn test_creation_without_role_is_rejected_without_mutation() {
        let mut reg = AgentRegistry::new();
        assert_eq!(
            reg.upsert("a1", &AgentSnapshot::default()),
            Err(MissingRoleError::Absent)
        );
        assert_eq!(
            reg.upsert(
                "a1",
                &AgentSnapshot {
                    role: Some("   ".to_string()),
                    ..AgentSnapshot::default()
                }
            ),
            Err(MissingRoleError::Absent)
        );
        assert_eq!(
            reg.upsert("a1", &creation("Intern")),
            Err(MissingRoleError::Unrecognized("Intern".to_string()))
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn test_update_moves_target_but_never_render() {
        let mut reg = AgentRegistry::new();
        reg.upsert("a-1", &creation("QA")).unwrap();
        let update = AgentSnapshot {
            position: Some([20.0, 0.0, 0.0]),
            ..AgentSnapshot::default()
        };
        assert_eq!(reg.upsert("a-1", &update), Ok(UpsertOutcome::Updated));
        let agent = reg.get("a-1").unwrap();
        assert_eq!(agent.target, [20.0, 0.0, 0.0]);
        assert_eq!(agent.render, [10.0, 0.0, -5.0]);
    }

    #[test]
    fn test_role_is_immutable_after_creation() {
        let mut reg = AgentRegistry::new();
        reg.upsert("a-1", &creation("QA")).unwrap();
        let update = AgentSnapshot {
            role: Some("Coder".to_string()),
            position: Some([20.0, 0.0, 0.0]),
            ..AgentSnapshot::default()
        };
        reg.upsert("a-1", &update).unwrap();
        assert_eq!(reg.get("a-1").unwrap().role, Role::Qa);
    }

    #[test]
    fn test_partial_update_retains_absent_fields() {
        let mut reg = AgentRegistry::new();
        let mut snapshot = creation("Marketer");
        snapshot.current_thoughts = Some("drafting copy".to_string());
        reg.upsert("m-7", &snapshot).unwrap();

        let update = AgentSnapshot {
            status: Some("meeting".to_string()),
            ..AgentSnapshot::default()
        };
        reg.upsert("m-7", &update).unwrap();
        let agent = reg.get("m-7").unwrap();
        assert_eq!(agent.status, AgentStatus::Meeting);
        assert_eq!(agent.thoughts, "drafting copy");
        assert_eq!(agent.target, [10.0, 0.0, -5.0]);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let mut reg = AgentRegistry::new();
        reg.upsert("a-1", &creation("CEO")).unwrap();
        reg.upsert("b-2", &creation("Coder")).unwrap();
        assert!(reg.remove("a-1"));
        assert!(!reg.remove("a-1"));
        assert!(!reg.remove("never-existed"));
        assert_eq!(reg.len(), 1);
        assert!(reg.get("b-2").is_some());
    }

    #[test]
    fn test_removed_id_may_return_as_new_agent() {
        let mut reg = AgentRegistry::new();
        reg.upsert("a-1", &creation("Coder")).unwrap();
        reg.remove("a-1");
        assert_eq!(reg.upsert("a-1", &creation("QA")), Ok(UpsertOutcome::Created));
        assert_eq!(reg.get("a-1").unwrap().role, Role::Qa);
    }

    #[test]
    fn test_display_name_derivation() {
        let mut reg = AgentRegistry::new();
        reg.upsert("coder-3f2a", &creation("Coder")).unwrap();
        assert_eq!(reg.get("coder-3f2a").unwrap().display_name, "Coder (3f2a)");

        reg.upsert("plain", &creation("Messenger")).unwrap();
        assert_eq!(reg.get("plain").unwrap().display_name, "Messenger (ID)");
    }

    #[test]
    fn test_unknown_status_string_is_tolerated() {
        let mut reg = AgentRegistry::new();
        let mut snapshot = creation("Coder");
        snapshot.status = Some("refactoring".to_string());
        reg.upsert("c-1", &snapshot).unwrap();
        assert_eq!(reg.get("c-1").unwrap().status, AgentStatus::Unknown);
    }
}
