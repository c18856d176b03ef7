//! OfficeSim Headless Validation Harness
//!
//! Replays scripted event streams through the pure engine without any
//! networking or rendering, then checks the resulting state.
//!
//! Usage:
//!   cargo run -p officesim-simtest
//!   cargo run -p officesim-simtest -- --verbose

use std::collections::BTreeMap;

use officesim_logic::dispatch::{self, Applied};
use officesim_logic::interp::{clamp_tick_delta, step_toward, ARRIVAL_EPSILON, MOVE_SPEED};
use officesim_logic::registry::AgentRegistry;
use officesim_logic::session::{start_event, validate_start, RunOutcome, Session};
use officesim_logic::status::status_cue;
use officesim_logic::zones::{zones_to_materialize, ZoneKey};
use officesim_proto::{AgentStatus, IdleSubState, LlmConfig, Role, ServerEvent};

// ── Scripted event stream (same wire format the backend emits) ──────────
const RUN_SCRIPT: &str = r#"[
    {"event": "simulation_status", "status": "started", "message": null},
    {"event": "update_agent", "agent_id": "agent-7f3a",
     "state": {"role": "CEO", "position": [0.0, 0.5, 24.0], "status": "working"}},
    {"event": "update_agent", "agent_id": "agent-9b21",
     "state": {"role": "Coder", "position": [30.0, 0.5, 15.0], "status": "idle",
               "current_idle_sub_state": "wandering",
               "current_thoughts": "waiting for a task"}},
    {"event": "update_agent", "agent_id": "agent-9b21",
     "state": {"position": [35.0, 0.5, -25.0], "status": "moving_to_zone"}},
    {"event": "update_agent", "agent_id": "agent-0000",
     "state": {"position": [1.0, 0.5, 1.0]}},
    {"event": "update_agent", "agent_id": "agent-dead"},
    {"event": "request_user_input", "task_id": "task-3",
     "question": "Which color scheme should the site use?"},
    {"event": "remove_agent", "agent_id": "agent-7f3a"},
    {"event": "simulation_complete", "success": true, "output": "site/index.html"}
]"#;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== OfficeSim Validation Harness ===\n");

    let mut results = Vec::new();

    results.extend(validate_event_replay());
    results.extend(validate_interpolation());
    results.extend(validate_status_cues());
    results.extend(validate_zone_gating());
    results.extend(validate_session_lifecycle());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Event replay ─────────────────────────────────────────────────────

fn validate_event_replay() -> Vec<TestResult> {
    println!("--- Event Replay ---");
    let mut results = Vec::new();

    let events: Vec<ServerEvent> = match serde_json::from_str(RUN_SCRIPT) {
        Ok(e) => e,
        Err(e) => {
            results.push(check("script_parse", false, format!("JSON error: {e}")));
            return results;
        }
    };
    results.push(check(
        "script_parse",
        events.len() == 9,
        format!("{} events decoded", events.len()),
    ));

    let mut registry = AgentRegistry::new();
    let mut session = Session::new();
    session.activate();

    let mut rejected = 0;
    let mut discarded = 0;
    let mut prompts = 0;
    for event in events {
        match dispatch::apply(&mut registry, &mut session, event) {
            Applied::AgentRejected { .. } => rejected += 1,
            Applied::EventDiscarded { .. } => discarded += 1,
            Applied::UserInputRequested { .. } => prompts += 1,
            _ => {}
        }
    }

    results.push(check(
        "roleless_create_rejected",
        rejected == 1 && registry.get("agent-0000").is_none(),
        format!("{rejected} rejected, agent-0000 absent"),
    ));
    results.push(check(
        "stateless_update_discarded",
        discarded == 1 && registry.get("agent-dead").is_none(),
        format!("{discarded} discarded"),
    ));
    results.push(check(
        "ceo_removed",
        registry.get("agent-7f3a").is_none(),
        "remove_agent took effect",
    ));

    let coder = registry.get("agent-9b21");
    results.push(check(
        "coder_survives_run",
        coder.is_some(),
        "agent-9b21 still present after completion",
    ));
    if let Some(coder) = coder {
        results.push(check(
            "coder_display_name",
            coder.display_name == "Coder (9b21)",
            format!("display name {:?}", coder.display_name),
        ));
        results.push(check(
            "coder_depth_negated",
            coder.target == [35.0, 0.5, 25.0],
            format!("target {:?}", coder.target),
        ));
        results.push(check(
            "coder_role_sticky",
            coder.role == Role::Coder && coder.status == AgentStatus::MovingToZone,
            format!("{} / {:?}", coder.role, coder.status),
        ));
        results.push(check(
            "coder_thoughts_merged",
            coder.thoughts == "waiting for a task",
            "thoughts kept from earlier update",
        ));
    }

    results.push(check(
        "prompt_cleared_on_completion",
        prompts == 1 && session.pending_request_count() == 0,
        "request opened then abandoned by terminal outcome",
    ));
    results.push(check(
        "session_idle_after_completion",
        session.config_visible()
            && matches!(
                session.last_outcome(),
                Some(RunOutcome::Completed { success: true, .. })
            ),
        "configuration restored with completion outcome",
    ));

    results
}

// ── 2. Interpolation ────────────────────────────────────────────────────

fn validate_interpolation() -> Vec<TestResult> {
    println!("--- Interpolation ---");
    let mut results = Vec::new();

    // Walk a full office diagonal at 60 fps; must arrive and stay.
    let target = [35.0, 0.5, 25.0];
    let mut pos = [-35.0, 0.5, -25.0];
    let mut steps = 0;
    while steps < 10_000 {
        let (next, dir) = step_toward(pos, target, MOVE_SPEED, 1.0 / 60.0);
        pos = next;
        steps += 1;
        if dir.is_none() {
            break;
        }
    }
    let dx = pos[0] - target[0];
    let dz = pos[2] - target[2];
    let dist = (dx * dx + dz * dz).sqrt();
    results.push(check(
        "walk_converges",
        dist <= ARRIVAL_EPSILON && steps < 2_000,
        format!("arrived within {dist:.4} in {steps} steps"),
    ));

    let (hold, dir) = step_toward(pos, target, MOVE_SPEED, 1.0 / 60.0);
    results.push(check(
        "arrival_is_stable",
        hold == pos && dir.is_none(),
        "no jitter once within epsilon",
    ));

    // A 5 second stall must advance at most MAX_TICK_DELTA worth.
    let (after_stall, _) = step_toward([0.0, 0.5, 0.0], [100.0, 0.5, 0.0], MOVE_SPEED, clamp_tick_delta(5.0));
    results.push(check(
        "stall_clamped",
        (after_stall[0] - 0.5).abs() < 1e-4,
        format!("moved {:.3} units after stalled frame", after_stall[0]),
    ));

    results
}

// ── 3. Status cues ──────────────────────────────────────────────────────

fn validate_status_cues() -> Vec<TestResult> {
    println!("--- Status Cues ---");
    let mut results = Vec::new();

    let statuses = [
        AgentStatus::Working,
        AgentStatus::WaitingUserInput,
        AgentStatus::Failed,
        AgentStatus::MovingToZone,
        AgentStatus::Meeting,
        AgentStatus::UsingToolInZone,
        AgentStatus::Idle,
    ];
    let mut cues: Vec<[f32; 3]> = statuses
        .iter()
        .map(|s| status_cue(*s, IdleSubState::Default))
        .collect();
    cues.push(status_cue(AgentStatus::Idle, IdleSubState::AtWaterCooler));
    cues.push(status_cue(AgentStatus::Idle, IdleSubState::Wandering));

    let mut distinct = true;
    for i in 0..cues.len() {
        for j in (i + 1)..cues.len() {
            if cues[i] == cues[j] {
                distinct = false;
            }
        }
    }
    results.push(check(
        "cues_distinct",
        distinct,
        format!("{} cue combinations, all distinct", cues.len()),
    ));

    results.push(check(
        "waiting_states_share_cue",
        status_cue(AgentStatus::WaitingUserInput, IdleSubState::Default)
            == status_cue(AgentStatus::WaitingResponse, IdleSubState::Default),
        "both waiting statuses show the amber cue",
    ));
    results.push(check(
        "sub_state_ignored_outside_idle",
        status_cue(AgentStatus::Working, IdleSubState::Wandering)
            == status_cue(AgentStatus::Working, IdleSubState::Default),
        "sub-state only refines idle",
    ));
    results.push(check(
        "unknown_status_unlit",
        status_cue(AgentStatus::Unknown, IdleSubState::Default) == [0.0, 0.0, 0.0],
        "forward-compatible statuses render unlit",
    ));

    results
}

// ── 4. Zone gating ──────────────────────────────────────────────────────

fn validate_zone_gating() -> Vec<TestResult> {
    println!("--- Zone Gating ---");
    let mut results = Vec::new();

    let none = zones_to_materialize(&[]);
    results.push(check(
        "static_zones_always_present",
        none.len() == 9 && none.iter().all(|z| !z.is_tool_zone()),
        format!("{} static zones", none.len()),
    ));

    let enabled = [ZoneKey::SaveZone, ZoneKey::ImageGenZone];
    let some = zones_to_materialize(&enabled);
    results.push(check(
        "enabled_tools_materialize",
        some.contains(&ZoneKey::SaveZone)
            && some.contains(&ZoneKey::ImageGenZone)
            && !some.contains(&ZoneKey::InternetZone),
        "only the enabled tool zones appear",
    ));

    let round_trip = ZoneKey::ALL
        .iter()
        .all(|z| ZoneKey::from_wire(z.wire_key()) == Some(*z));
    results.push(check(
        "zone_keys_round_trip",
        round_trip,
        "wire keys parse back to themselves",
    ));

    results
}

// ── 5. Session lifecycle ────────────────────────────────────────────────

fn validate_session_lifecycle() -> Vec<TestResult> {
    println!("--- Session Lifecycle ---");
    let mut results = Vec::new();

    let full: BTreeMap<String, LlmConfig> = Role::ALL
        .iter()
        .filter(|r| r.requires_llm_config())
        .map(|r| {
            (
                r.wire_name().to_string(),
                LlmConfig {
                    provider: "google".to_string(),
                    model: Some("gemini-2.0-flash".to_string()),
                },
            )
        })
        .collect();

    results.push(check(
        "full_config_starts",
        validate_start("build a landing page", &full).is_empty(),
        "all five required roles configured",
    ));

    let mut partial = full.clone();
    partial.remove("Product Manager");
    let errors = validate_start("build a landing page", &partial);
    results.push(check(
        "missing_role_blocks_start",
        errors.len() == 1 && errors[0].contains("Product Manager"),
        format!("{errors:?}"),
    ));

    match start_event("build a landing page", &full, &[ZoneKey::SaveZone]) {
        Ok(event) => {
            let json = serde_json::to_string(&event).unwrap_or_default();
            results.push(check(
                "start_event_wire_shape",
                json.contains("\"event\":\"start_simulation\"")
                    && json.contains("\"SAVE_ZONE\"")
                    && json.contains("\"type\":\"google\""),
                "start_simulation encodes tools and provider tag",
            ));
        }
        Err(e) => results.push(check("start_event_wire_shape", false, format!("{e:?}"))),
    }

    let mut session = Session::new();
    session.activate();
    session.open_request("task-1", "Proceed?");
    let reply = session.respond("task-1", Some("yes".to_string()));
    results.push(check(
        "prompt_reply_emits_event",
        reply.is_some() && session.pending_request_count() == 0,
        "user_response produced exactly once",
    ));
    let replay = session.respond("task-1", Some("yes again".to_string()));
    results.push(check(
        "prompt_reply_not_repeatable",
        replay.is_none(),
        "second answer to the same task emits nothing",
    ));

    results
}
