//! Pure presentation-engine logic for OfficeSim.
//!
//! This crate contains everything between the wire protocol and the
//! renderer that can be expressed as plain data and pure functions:
//! the agent registry, the event reduction, interpolation math, and the
//! session state machine. No networking, no engine types — functions take
//! plain data and return results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`coords`] | Simulation-space → render-space axis convention |
//! | [`dispatch`] | Single reduction applying inbound events to registry + session |
//! | [`interp`] | Per-frame movement toward authoritative targets (no overshoot) |
//! | [`registry`] | Owned set of live agents with partial-update merge semantics |
//! | [`session`] | Run lifecycle machine, start validation, pending user prompts |
//! | [`status`] | Status → emissive cue mapping (forward-compatible) |
//! | [`zones`] | Static named regions and per-run tool-zone enablement |

pub mod coords;
pub mod dispatch;
pub mod interp;
pub mod registry;
pub mod session;
pub mod status;
pub mod zones;
