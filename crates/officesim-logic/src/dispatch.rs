//! Inbound event reduction.
//!
//! All protocol handling funnels through [`apply`]: one pure step that
//! mutates the registry and session and reports what happened as an
//! [`Applied`] value. The client maps `Applied` to logging, toasts, and
//! prompt display; tests drive the reduction directly with no transport.

use officesim_proto::ServerEvent;

use crate::registry::{AgentRegistry, UpsertOutcome};
use crate::session::{RunOutcome, Session};

/// What applying one inbound event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    AgentCreated { agent_id: String },
    AgentUpdated { agent_id: String },
    /// Creation rejected (missing/unrecognized role). Registry unchanged.
    AgentRejected { agent_id: String, reason: String },
    AgentRemoved { agent_id: String, existed: bool },
    /// Malformed event dropped whole — no partial processing.
    EventDiscarded { reason: String },
    RunCompleted { success: bool, output: String },
    RunErrored { message: String },
    /// Informational status (e.g. "started", "already_running").
    StatusNote { status: String, message: Option<String> },
    UserInputRequested { task_id: String, question: String },
}

pub fn apply(registry: &mut AgentRegistry, session: &mut Session, event: ServerEvent) -> Applied {
    match event {
        ServerEvent::UpdateAgent { agent_id, state } => {
            let Some(snapshot) = state else {
                return Applied::EventDiscarded {
                    reason: format!("update_agent for {agent_id} without state"),
                };
            };
            match registry.upsert(&agent_id, &snapshot) {
                Ok(UpsertOutcome::Created) => Applied::AgentCreated { agent_id },
                Ok(UpsertOutcome::Updated) => Applied::AgentUpdated { agent_id },
                Err(e) => Applied::AgentRejected {
                    agent_id,
                    reason: e.to_string(),
                },
            }
        }
        ServerEvent::RemoveAgent { agent_id } => {
            let existed = registry.remove(&agent_id);
            Applied::AgentRemoved { agent_id, existed }
        }
        ServerEvent::SimulationComplete { success, output } => {
            session.finish(RunOutcome::Completed {
                success,
                output: output.clone(),
            });
            Applied::RunCompleted { success, output }
        }
        ServerEvent::SimulationError { error } => {
            session.finish(RunOutcome::Errored {
                message: error.clone(),
            });
            Applied::RunErrored { message: error }
        }
        ServerEvent::SimulationStatus { status, message } => {
            // An error status takes the same recovery path as completion.
            if status == "error" {
                let message = message.unwrap_or_else(|| "unknown error".to_string());
                session.finish(RunOutcome::Errored {
                    message: message.clone(),
                });
                return Applied::RunErrored { message };
            }
            Applied::StatusNote { status, message }
        }
        ServerEvent::RequestUserInput { task_id, question } => {
            session.open_request(&task_id, &question);
            Applied::UserInputRequested { task_id, question }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use officesim_proto::{AgentSnapshot, AgentStatus, Role};

    fn update(agent_id: &str, state: Option<AgentSnapshot>) -> ServerEvent {
        ServerEvent::UpdateAgent {
            agent_id: agent_id.to_string(),
            state,
        }
    }

    fn world() -> (AgentRegistry, Session) {
        let mut session = Session::new();
        session.activate();
        (AgentRegistry::new(), session)
    }

    #[test]
    fn test_create_then_update_then_remove() {
        let (mut reg, mut session) = world();

        let applied = apply(
            &mut reg,
            &mut session,
            update(
                "a1",
                Some(AgentSnapshot {
                    role: Some("Coder".to_string()),
                    position: Some([10.0, 0.0, 5.0]),
                    status: Some("working".to_string()),
                    ..AgentSnapshot::default()
                }),
            ),
        );
        assert_eq!(
            applied,
            Applied::AgentCreated {
                agent_id: "a1".to_string()
            }
        );
        let agent = reg.get("a1").unwrap();
        assert_eq!(agent.target, [10.0, 0.0, -5.0]);
        assert_eq!(agent.status, AgentStatus::Working);

        apply(
            &mut reg,
            &mut session,
            ServerEvent::RemoveAgent {
                agent_id: "a1".to_string(),
            },
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn test_creation_without_role_leaves_registry_empty() {
        let (mut reg, mut session) = world();
        let applied = apply(
            &mut reg,
            &mut session,
            update("a1", Some(AgentSnapshot::default())),
        );
        assert!(matches!(applied, Applied::AgentRejected { .. }));
        assert!(reg.all().next().is_none());
    }

    #[test]
    fn test_update_without_state_is_discarded_whole() {
        let (mut reg, mut session) = world();
        let applied = apply(&mut reg, &mut session, update("a1", None));
        assert!(matches!(applied, Applied::EventDiscarded { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_role_survives_roleless_retarget() {
        let (mut reg, mut session) = world();
        apply(
            &mut reg,
            &mut session,
            update(
                "a1",
                Some(AgentSnapshot {
                    role: Some("QA".to_string()),
                    position: Some([0.0, 0.0, 0.0]),
                    ..AgentSnapshot::default()
                }),
            ),
        );
        apply(
            &mut reg,
            &mut session,
            update(
                "a1",
                Some(AgentSnapshot {
                    position: Some([20.0, 0.0, 0.0]),
                    ..AgentSnapshot::default()
                }),
            ),
        );
        let agent = reg.get("a1").unwrap();
        assert_eq!(agent.role, Role::Qa);
        assert_eq!(agent.target, [20.0, 0.0, 0.0]);
    }

    #[test]
    fn test_removing_unknown_agent_twice_is_harmless() {
        let (mut reg, mut session) = world();
        for _ in 0..2 {
            let applied = apply(
                &mut reg,
                &mut session,
                ServerEvent::RemoveAgent {
                    agent_id: "ghost".to_string(),
                },
            );
            assert_eq!(
                applied,
                Applied::AgentRemoved {
                    agent_id: "ghost".to_string(),
                    existed: false
                }
            );
        }
    }

    #[test]
    fn test_completion_restores_idle_session() {
        let (mut reg, mut session) = world();
        let applied = apply(
            &mut reg,
            &mut session,
            ServerEvent::SimulationComplete {
                success: true,
                output: "index.html".to_string(),
            },
        );
        assert!(matches!(applied, Applied::RunCompleted { success: true, .. }));
        assert!(session.config_visible());
    }

    #[test]
    fn test_error_status_takes_recovery_path() {
        let (mut reg, mut session) = world();
        let applied = apply(
            &mut reg,
            &mut session,
            ServerEvent::SimulationStatus {
                status: "error".to_string(),
                message: Some("no workers".to_string()),
            },
        );
        assert_eq!(
            applied,
            Applied::RunErrored {
                message: "no workers".to_string()
            }
        );
        assert!(session.config_visible());

        // Non-error statuses are informational only.
        let applied = apply(
            &mut reg,
            &mut session,
            ServerEvent::SimulationStatus {
                status: "already_running".to_string(),
                message: None,
            },
        );
        assert!(matches!(applied, Applied::StatusNote { .. }));
    }

    #[test]
    fn test_user_input_request_is_recorded() {
        let (mut reg, mut session) = world();
        apply(
            &mut reg,
            &mut session,
            ServerEvent::RequestUserInput {
                task_id: "t1".to_string(),
                question: "Q?".to_string(),
            },
        );
        assert_eq!(session.pending_request("t1"), Some("Q?"));
    }
}
