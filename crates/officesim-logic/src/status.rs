//! Status → visual-cue mapping.
//!
//! Each agent carries an emissive tint derived from its activity status.
//! The mapping is a pure function of `(status, idle sub-state)` — identical
//! output regardless of prior state history. Unknown statuses map to the
//! "off" cue so newer backends don't break the client.

use officesim_proto::{AgentStatus, IdleSubState};

/// sRGB components of a packed `0xRRGGBB` color.
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

/// Emissive cue for a status. The sub-state only matters when idle.
pub fn status_cue(status: AgentStatus, idle_sub: IdleSubState) -> [f32; 3] {
    match status {
        AgentStatus::Working => rgb(0x003300),
        AgentStatus::WaitingUserInput | AgentStatus::WaitingResponse => rgb(0x442200),
        AgentStatus::Failed => rgb(0x550000),
        AgentStatus::MovingToZone => rgb(0x333300),
        AgentStatus::Meeting => rgb(0x000055),
        AgentStatus::UsingToolInZone => rgb(0x005555),
        AgentStatus::Idle => match idle_sub {
            IdleSubState::AtWaterCooler => rgb(0x004488),
            IdleSubState::Wandering => rgb(0x331133),
            IdleSubState::Default => rgb(0x111111),
        },
        AgentStatus::Unknown => [0.0, 0.0, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_table_is_exhaustive_and_distinct() {
        let cues = [
            status_cue(AgentStatus::Working, IdleSubState::Default),
            status_cue(AgentStatus::Failed, IdleSubState::Default),
            status_cue(AgentStatus::MovingToZone, IdleSubState::Default),
            status_cue(AgentStatus::Meeting, IdleSubState::Default),
            status_cue(AgentStatus::UsingToolInZone, IdleSubState::Default),
            status_cue(AgentStatus::Idle, IdleSubState::AtWaterCooler),
            status_cue(AgentStatus::Idle, IdleSubState::Wandering),
            status_cue(AgentStatus::Idle, IdleSubState::Default),
        ];
        for (i, a) in cues.iter().enumerate() {
            for b in cues.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_both_waiting_statuses_share_a_cue() {
        assert_eq!(
            status_cue(AgentStatus::WaitingUserInput, IdleSubState::Default),
            status_cue(AgentStatus::WaitingResponse, IdleSubState::Default)
        );
    }

    #[test]
    fn test_sub_state_only_refines_idle() {
        assert_eq!(
            status_cue(AgentStatus::Working, IdleSubState::AtWaterCooler),
            status_cue(AgentStatus::Working, IdleSubState::Default)
        );
    }

    #[test]
    fn test_unknown_status_is_off() {
        assert_eq!(
            status_cue(AgentStatus::Unknown, IdleSubState::Default),
            [0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_cue_is_deterministic() {
        let first = status_cue(AgentStatus::Meeting, IdleSubState::Default);
        for _ in 0..3 {
            assert_eq!(status_cue(AgentStatus::Meeting, IdleSubState::Default), first);
        }
    }
}
