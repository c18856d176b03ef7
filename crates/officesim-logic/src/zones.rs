//! Static named regions of the office.
//!
//! Zone placement is fixed at build time; centers are already in render
//! space (depth negated). Desk and meeting zones always materialize. Tool
//! zones materialize only when the run configuration enabled them — a
//! disabled tool zone never gets visuals and never participates in hover
//! hit-testing. The enabled set is decided once per run start and does not
//! change mid-run.

use officesim_proto::Role;

use crate::coords::RenderVec3;
use crate::status::rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZoneKey {
    CeoOffice,
    PmDeskZone,
    MktDeskZone,
    CoderDeskZone,
    QaDeskZone,
    HtmlDeskZone,
    CssDeskZone,
    JsDeskZone,
    MeetingRoomZone,
    SaveZone,
    InternetZone,
    WaterCoolerZone,
    ImageGenZone,
    CodeExecZone,
}

/// Placement and styling for one zone.
#[derive(Debug, Clone, Copy)]
pub struct ZoneDef {
    pub center: RenderVec3,
    /// Width × depth of the floor rectangle.
    pub extents: (f32, f32),
    pub fill: [f32; 3],
    pub border: Option<[f32; 3]>,
    pub label: Option<&'static str>,
}

impl ZoneKey {
    pub const ALL: [ZoneKey; 14] = [
        ZoneKey::CeoOffice,
        ZoneKey::PmDeskZone,
        ZoneKey::MktDeskZone,
        ZoneKey::CoderDeskZone,
        ZoneKey::QaDeskZone,
        ZoneKey::HtmlDeskZone,
        ZoneKey::CssDeskZone,
        ZoneKey::JsDeskZone,
        ZoneKey::MeetingRoomZone,
        ZoneKey::SaveZone,
        ZoneKey::InternetZone,
        ZoneKey::WaterCoolerZone,
        ZoneKey::ImageGenZone,
        ZoneKey::CodeExecZone,
    ];

    pub fn def(self) -> ZoneDef {
        match self {
            ZoneKey::CeoOffice => ZoneDef {
                center: [0.0, 0.06, 24.0],
                extents: (18.0, 12.0),
                fill: rgb(0x8899AA),
                border: None,
                label: None,
            },
            ZoneKey::PmDeskZone => ZoneDef {
                center: [-30.0, 0.06, 10.0],
                extents: (10.0, 10.0),
                fill: rgb(0x8090A0),
                border: None,
                label: None,
            },
            ZoneKey::MktDeskZone => ZoneDef {
                center: [30.0, 0.06, 10.0],
                extents: (10.0, 10.0),
                fill: rgb(0x8090A0),
                border: None,
                label: None,
            },
            ZoneKey::CoderDeskZone => ZoneDef {
                center: [30.0, 0.06, -15.0],
                extents: (10.0, 10.0),
                fill: rgb(0x9088AA),
                border: None,
                label: None,
            },
            ZoneKey::QaDeskZone => ZoneDef {
                center: [35.0, 0.06, -15.0],
                extents: (5.0, 10.0),
                fill: rgb(0x9088AA),
                border: None,
                label: None,
            },
            ZoneKey::HtmlDeskZone => ZoneDef {
                center: [20.0, 0.06, -15.0],
                extents: (10.0, 10.0),
                fill: rgb(0x9088AA),
                border: None,
                label: None,
            },
            ZoneKey::CssDeskZone => ZoneDef {
                center: [25.0, 0.06, -25.0],
                extents: (10.0, 10.0),
                fill: rgb(0x9088AA),
                border: None,
                label: None,
            },
            ZoneKey::JsDeskZone => ZoneDef {
                center: [35.0, 0.06, -25.0],
                extents: (10.0, 10.0),
                fill: rgb(0x9088AA),
                border: None,
                label: None,
            },
            ZoneKey::MeetingRoomZone => ZoneDef {
                center: [0.0, 0.06, 15.0],
                extents: (15.0, 10.0),
                fill: rgb(0xAAAAAA),
                border: None,
                label: None,
            },
            ZoneKey::SaveZone => ZoneDef {
                center: [35.0, 0.1, 25.0],
                extents: (5.0, 5.0),
                fill: rgb(0x008080),
                border: Some(rgb(0x00DDDD)),
                label: Some("Save Zone"),
            },
            ZoneKey::InternetZone => ZoneDef {
                center: [-35.0, 0.1, 25.0],
                extents: (5.0, 5.0),
                fill: rgb(0xB8860B),
                border: Some(rgb(0xFFD700)),
                label: Some("Internet Zone"),
            },
            ZoneKey::WaterCoolerZone => ZoneDef {
                center: [30.0, 0.1, -20.0],
                extents: (4.0, 4.0),
                fill: rgb(0x4682B4),
                border: Some(rgb(0x5F9EA0)),
                label: Some("Water Cooler"),
            },
            ZoneKey::ImageGenZone => ZoneDef {
                center: [-20.0, 0.1, 25.0],
                extents: (5.0, 5.0),
                fill: rgb(0xFF69B4),
                border: Some(rgb(0xFF1493)),
                label: Some("Image Gen Zone"),
            },
            ZoneKey::CodeExecZone => ZoneDef {
                center: [20.0, 0.1, 25.0],
                extents: (5.0, 5.0),
                fill: rgb(0x8A2BE2),
                border: Some(rgb(0x9932CC)),
                label: Some("Code Exec Zone"),
            },
        }
    }

    /// Identifier used in configuration and in `start_simulation`'s
    /// `enabled_tools` list.
    pub fn wire_key(self) -> &'static str {
        match self {
            ZoneKey::CeoOffice => "CEO_OFFICE",
            ZoneKey::PmDeskZone => "PM_DESK_ZONE",
            ZoneKey::MktDeskZone => "MKT_DESK_ZONE",
            ZoneKey::CoderDeskZone => "CODER_DESK_ZONE",
            ZoneKey::QaDeskZone => "QA_DESK_ZONE",
            ZoneKey::HtmlDeskZone => "HTML_DESK_ZONE",
            ZoneKey::CssDeskZone => "CSS_DESK_ZONE",
            ZoneKey::JsDeskZone => "JS_DESK_ZONE",
            ZoneKey::MeetingRoomZone => "MEETING_ROOM_ZONE",
            ZoneKey::SaveZone => "SAVE_ZONE",
            ZoneKey::InternetZone => "INTERNET_ZONE",
            ZoneKey::WaterCoolerZone => "WATER_COOLER_ZONE",
            ZoneKey::ImageGenZone => "IMAGE_GEN_ZONE",
            ZoneKey::CodeExecZone => "CODE_EXEC_ZONE",
        }
    }

    pub fn from_wire(s: &str) -> Option<ZoneKey> {
        ZoneKey::ALL.iter().copied().find(|z| z.wire_key() == s)
    }

    /// Tool zones are the per-run toggleable subset.
    pub fn is_tool_zone(self) -> bool {
        matches!(
            self,
            ZoneKey::SaveZone
                | ZoneKey::InternetZone
                | ZoneKey::WaterCoolerZone
                | ZoneKey::ImageGenZone
                | ZoneKey::CodeExecZone
        )
    }

    pub fn display_label(self) -> &'static str {
        self.def().label.unwrap_or(self.wire_key())
    }
}

/// Zones to materialize for a run: every static zone, plus the enabled
/// tool zones. Disabled tool zones are absent from the result entirely.
pub fn zones_to_materialize(enabled_tools: &[ZoneKey]) -> Vec<ZoneKey> {
    ZoneKey::ALL
        .iter()
        .copied()
        .filter(|z| !z.is_tool_zone() || enabled_tools.contains(z))
        .collect()
}

/// Where each role's desk sits (render space). Used by the static scene
/// and as the spot agents return to when idle at their desk.
pub fn desk_position(role: Role) -> RenderVec3 {
    let at = |zone: ZoneKey| {
        let c = zone.def().center;
        [c[0], 0.5, c[2]]
    };
    match role {
        Role::Ceo => at(ZoneKey::CeoOffice),
        Role::ProductManager => at(ZoneKey::PmDeskZone),
        Role::Marketer => at(ZoneKey::MktDeskZone),
        Role::Coder => at(ZoneKey::CoderDeskZone),
        Role::Qa => at(ZoneKey::QaDeskZone),
        Role::HtmlSpecialist => at(ZoneKey::HtmlDeskZone),
        Role::CssSpecialist => at(ZoneKey::CssDeskZone),
        Role::JsSpecialist => at(ZoneKey::JsDeskZone),
        Role::Messenger => [5.0, 0.5, 20.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys_round_trip() {
        for zone in ZoneKey::ALL {
            assert_eq!(ZoneKey::from_wire(zone.wire_key()), Some(zone));
        }
        assert_eq!(ZoneKey::from_wire("COFFEE_ZONE"), None);
    }

    #[test]
    fn test_tool_zones_are_gated_by_enablement() {
        let none = zones_to_materialize(&[]);
        assert!(none.iter().all(|z| !z.is_tool_zone()));
        assert_eq!(none.len(), 9);

        let some = zones_to_materialize(&[ZoneKey::SaveZone, ZoneKey::WaterCoolerZone]);
        assert!(some.contains(&ZoneKey::SaveZone));
        assert!(some.contains(&ZoneKey::WaterCoolerZone));
        assert!(!some.contains(&ZoneKey::InternetZone));
        assert_eq!(some.len(), 11);
    }

    #[test]
    fn test_tool_zones_carry_labels_and_borders() {
        for zone in ZoneKey::ALL.iter().filter(|z| z.is_tool_zone()) {
            let def = zone.def();
            assert!(def.border.is_some(), "{zone:?} needs a border");
            assert!(def.label.is_some(), "{zone:?} needs a label");
        }
    }

    #[test]
    fn test_every_role_has_a_desk() {
        for role in Role::ALL {
            let desk = desk_position(role);
            assert_eq!(desk[1], 0.5);
        }
    }
}
