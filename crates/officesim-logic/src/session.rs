//! Run lifecycle for one client session.
//!
//! Phase machine: Idle (configuration visible) → Active (configuration
//! hidden) → terminal outcome → Idle. Both terminal outcomes restore the
//! configuration; they differ only in the message shown. There is no
//! unilateral cancel from Active — the session leaves it only through a
//! terminal backend event.
//!
//! Pending user-input requests live here too. Answering one emits a
//! `user_response`; cancelling abandons it silently and the backend must
//! time the request out on its side (fire-and-forget boundary).

use std::collections::BTreeMap;

use officesim_proto::{ClientEvent, LlmConfig, Role};

use crate::zones::ZoneKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
}

/// Terminal result of a run, surfaced to the user on return to Idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { success: bool, output: String },
    Errored { message: String },
}

impl RunOutcome {
    pub fn summary(&self) -> String {
        match self {
            RunOutcome::Completed { success, output } => {
                format!("Simulation complete (success: {success}) — {output}")
            }
            RunOutcome::Errored { message } => format!("Simulation error: {message}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    last_outcome: Option<RunOutcome>,
    pending_requests: BTreeMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// The configuration surface is shown whenever no run is in flight.
    pub fn config_visible(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    /// Idle → Active. Only legal after `start_event` succeeded.
    pub fn activate(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Active;
        self.last_outcome = None;
        self.pending_requests.clear();
        true
    }

    /// Active → Idle via a terminal outcome. Restores configuration
    /// visibility and abandons any unanswered prompts.
    pub fn finish(&mut self, outcome: RunOutcome) -> bool {
        let was_active = self.phase == SessionPhase::Active;
        self.phase = SessionPhase::Idle;
        self.last_outcome = Some(outcome);
        self.pending_requests.clear();
        was_active
    }

    pub fn open_request(&mut self, task_id: &str, question: &str) {
        self.pending_requests
            .insert(task_id.to_string(), question.to_string());
    }

    pub fn pending_request(&self, task_id: &str) -> Option<&str> {
        self.pending_requests.get(task_id).map(String::as_str)
    }

    pub fn pending_request_count(&self) -> usize {
        self.pending_requests.len()
    }

    /// Oldest unanswered request, if any. Prompts are surfaced one at a
    /// time in task-id order.
    pub fn next_request(&self) -> Option<(&str, &str)> {
        self.pending_requests
            .iter()
            .next()
            .map(|(id, q)| (id.as_str(), q.as_str()))
    }

    /// Resolve a pending prompt. A response emits `user_response`;
    /// cancellation (`None`) emits nothing — the request is simply
    /// abandoned. Unknown task ids resolve to nothing either way.
    pub fn respond(&mut self, task_id: &str, response: Option<String>) -> Option<ClientEvent> {
        self.pending_requests.remove(task_id)?;
        let response = response?;
        Some(ClientEvent::UserResponse {
            task_id: task_id.to_string(),
            response,
        })
    }
}

/// Validate start preconditions. Empty result means the run may start.
pub fn validate_start(request: &str, llm_configs: &BTreeMap<String, LlmConfig>) -> Vec<String> {
    let mut errors = Vec::new();
    if request.trim().is_empty() {
        errors.push("project request must not be empty".to_string());
    }
    for role in Role::ALL.iter().filter(|r| r.requires_llm_config()) {
        match llm_configs.get(role.wire_name()) {
            None => errors.push(format!("no LLM configuration for {role}")),
            Some(cfg) if cfg.provider.trim().is_empty() => {
                errors.push(format!("no LLM provider selected for {role}"))
            }
            Some(_) => {}
        }
    }
    errors
}

/// Build the outbound start event, or the full list of validation errors.
/// Nothing is emitted (and no network effect happens) unless every
/// precondition holds.
pub fn start_event(
    request: &str,
    llm_configs: &BTreeMap<String, LlmConfig>,
    enabled_tools: &[ZoneKey],
) -> Result<ClientEvent, Vec<String>> {
    let errors = validate_start(request, llm_configs);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ClientEvent::StartSimulation {
        request: request.to_string(),
        llm_configs: llm_configs.clone(),
        enabled_tools: enabled_tools
            .iter()
            .map(|z| z.wire_key().to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_configs() -> BTreeMap<String, LlmConfig> {
        Role::ALL
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
            .collect()
    }

    #[test]
    fn test_phase_round_trip() {
        let mut session = Session::new();
        assert!(session.config_visible());
        assert!(session.activate());
        assert!(!session.config_visible());
        assert!(!session.activate(), "cannot re-activate while active");
        assert!(session.finish(RunOutcome::Completed {
            success: true,
            output: "site.html".to_string(),
        }));
        assert!(session.config_visible());
        assert!(session.last_outcome().is_some());
    }

    #[test]
    fn test_error_and_completion_share_recovery_path() {
        let mut session = Session::new();
        session.activate();
        session.finish(RunOutcome::Errored {
            message: "llm quota".to_string(),
        });
        assert!(session.config_visible());

        let mut other = Session::new();
        other.activate();
        other.finish(RunOutcome::Completed {
            success: false,
            output: "".to_string(),
        });
        assert_eq!(session.phase(), other.phase());
    }

    #[test]
    fn test_start_blocked_without_required_llm_config() {
        let mut configs = full_configs();
        configs.remove("Coder");
        let errors = validate_start("make a site", &configs);
        assert_eq!(errors, vec!["no LLM configuration for Coder".to_string()]);
        assert!(start_event("make a site", &configs, &[]).is_err());
    }

    #[test]
    fn test_start_blocked_on_empty_request_or_provider() {
        assert!(!validate_start("   ", &full_configs()).is_empty());

        let mut configs = full_configs();
        configs.get_mut("QA").unwrap().provider = "".to_string();
        let errors = validate_start("make a site", &configs);
        assert_eq!(errors, vec!["no LLM provider selected for QA".to_string()]);
    }

    #[test]
    fn test_optional_roles_do_not_block_start() {
        // Messenger and specialists carry no config; start must succeed.
        let event = start_event("make a site", &full_configs(), &[ZoneKey::SaveZone])
            .expect("valid start");
        match event {
            ClientEvent::StartSimulation { enabled_tools, .. } => {
                assert_eq!(enabled_tools, vec!["SAVE_ZONE".to_string()]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_prompt_emits_nothing() {
        let mut session = Session::new();
        session.activate();
        session.open_request("t1", "Q?");
        assert_eq!(session.respond("t1", None), None);
        assert_eq!(session.pending_request_count(), 0);
        // Already abandoned: a late answer emits nothing either.
        assert_eq!(session.respond("t1", Some("late".to_string())), None);
    }

    #[test]
    fn test_answered_prompt_emits_user_response() {
        let mut session = Session::new();
        session.activate();
        session.open_request("t1", "Ship it?");
        assert_eq!(session.pending_request("t1"), Some("Ship it?"));
        assert_eq!(
            session.respond("t1", Some("yes".to_string())),
            Some(ClientEvent::UserResponse {
                task_id: "t1".to_string(),
                response: "yes".to_string(),
            })
        );
    }

    #[test]
    fn test_terminal_outcome_abandons_pending_prompts() {
        let mut session = Session::new();
        session.activate();
        session.open_request("t1", "Q?");
        session.finish(RunOutcome::Errored {
            message: "backend gone".to_string(),
        });
        assert_eq!(session.pending_request_count(), 0);
    }
}
