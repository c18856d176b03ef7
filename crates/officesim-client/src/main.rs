//! OfficeSim Client - Bevy 3D visualization of the agent office simulation
//!
//! All simulation runs on the backend. The client mirrors agent state from
//! the event stream, renders the office, and sends run control and user
//! responses back.

use bevy::prelude::*;

mod camera;
mod networking;
mod rendering;
mod scene;
mod state;
mod ui;

use state::{ConnectionConfig, ConnectionState, RunConfig, SimState, ToolZoneRequest, UiState};

fn main() {
    let connection_config = ConnectionConfig::from_args();
    let run_config = RunConfig::load_or_default(&connection_config.config_path);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "OfficeSim - Software Company".to_string(),
                resolution: (1280, 720).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.06, 0.09)))
        .insert_resource(ConnectionState::Disconnected)
        .insert_resource(connection_config)
        .insert_resource(run_config)
        .insert_resource(SimState::default())
        .insert_resource(UiState::default())
        .insert_resource(ToolZoneRequest::default())
        .add_systems(
            Startup,
            (
                camera::setup_camera,
                scene::setup_scene,
                rendering::setup_role_visuals,
                rendering::setup_static_zones,
                ui::setup_ui,
            ),
        )
        .add_systems(
            Update,
            (
                networking::connect_to_server,
                networking::drain_events,
                networking::open_next_prompt,
                rendering::sync_agents,
                rendering::interpolate_agents,
                rendering::position_labels,
                rendering::sync_tool_zones,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                camera::pan_zoom_camera,
                ui::start_run,
                ui::prompt_input,
                ui::hover_info,
                ui::update_hud,
                ui::update_config_panel,
                ui::update_prompt_panel,
                ui::update_toasts,
                ui::render_toasts,
                ui::update_hover_panel,
            ),
        )
        .run();
}
