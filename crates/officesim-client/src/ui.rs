//! HUD, configuration panel, user-input prompt, toasts, and hover info.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use officesim_logic::session::start_event;
use officesim_logic::zones::ZoneKey;

use crate::networking::send_event;
use crate::state::{
    ConfigPanel, ConfigPanelText, ConnectionConfig, ConnectionState, HoverPanel, HudText,
    PromptPanel, PromptText, RunConfig, SimState, ToastContainer, ToolZoneRequest, UiState,
    ViewCamera, ZoneVisual,
};

const PANEL_BG: Color = Color::srgba(0.08, 0.09, 0.12, 0.92);

pub fn setup_ui(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.85, 0.9, 0.95)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));

    commands.spawn((
        HoverPanel,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.95, 0.75)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            ..default()
        },
    ));

    commands.spawn((
        ToastContainer,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.9, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(30.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));

    commands
        .spawn((
            ConfigPanel,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(50.0),
                top: Val::Px(60.0),
                padding: UiRect::all(Val::Px(16.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|parent| {
            parent.spawn((
                ConfigPanelText,
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.93, 0.98)),
            ));
        });

    commands
        .spawn((
            PromptPanel,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(25.0),
                top: Val::Percent(35.0),
                padding: UiRect::all(Val::Px(16.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(PANEL_BG),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                PromptText,
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.85, 0.5)),
            ));
        });
}

pub fn update_hud(
    sim: Res<SimState>,
    conn_state: Res<ConnectionState>,
    config: Res<ConnectionConfig>,
    mut hud: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = hud.single_mut() else {
        return;
    };
    let connection = match &*conn_state {
        ConnectionState::Disconnected => "connecting...".to_string(),
        ConnectionState::Connected(_) => format!("connected to {}", config.server_addr),
        ConnectionState::Reconnecting => format!(
            "reconnecting in {:.0}s (attempt {})",
            config.reconnect_timer.max(0.0),
            config.reconnect_attempts
        ),
    };
    let phase = if sim.session.is_active() {
        "running"
    } else {
        "idle"
    };
    text.0 = format!(
        "OfficeSim — {connection}\nsimulation: {phase} | agents: {} | pending prompts: {}\narrows: pan | wheel: zoom",
        sim.registry.len(),
        sim.session.pending_request_count(),
    );
}

/// Show the configuration surface whenever no run is in flight.
pub fn update_config_panel(
    sim: Res<SimState>,
    run_config: Res<RunConfig>,
    mut panels: Query<&mut Visibility, With<ConfigPanel>>,
    mut texts: Query<&mut Text, With<ConfigPanelText>>,
) {
    let Ok(mut visibility) = panels.single_mut() else {
        return;
    };
    if !sim.session.config_visible() {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Visible;

    let Ok(mut text) = texts.single_mut() else {
        return;
    };
    let mut lines = vec![
        "=== OfficeSim ===".to_string(),
        String::new(),
        format!("Request: {}", run_config.request),
        String::new(),
        "LLM assignments:".to_string(),
    ];
    for (role, cfg) in &run_config.llm_configs {
        let model = cfg.model.as_deref().unwrap_or("default");
        lines.push(format!("  {role}: {} ({model})", cfg.provider));
    }
    lines.push(String::new());
    let tools: Vec<&str> = run_config
        .enabled_tools
        .iter()
        .map(|z| z.display_label())
        .collect();
    lines.push(format!(
        "Tools: {}",
        if tools.is_empty() {
            "none".to_string()
        } else {
            tools.join(", ")
        }
    ));
    if let Some(outcome) = sim.session.last_outcome() {
        lines.push(String::new());
        lines.push(outcome.summary());
    }
    lines.push(String::new());
    lines.push("Press Enter to start the simulation".to_string());
    text.0 = lines.join("\n");
}

/// Start a run on Enter while the configuration surface is up. Validation
/// failures surface as toasts and nothing is sent.
pub fn start_run(
    keys: Res<ButtonInput<KeyCode>>,
    run_config: Res<RunConfig>,
    conn_state: Res<ConnectionState>,
    mut sim: ResMut<SimState>,
    mut ui: ResMut<UiState>,
    mut zone_request: ResMut<ToolZoneRequest>,
) {
    if !keys.just_pressed(KeyCode::Enter) || !sim.session.config_visible() {
        return;
    }
    match start_event(
        &run_config.request,
        &run_config.llm_configs,
        &run_config.enabled_tools,
    ) {
        Ok(event) => {
            if send_event(&conn_state, &mut ui, event) {
                sim.session.activate();
                zone_request.0 = Some(run_config.enabled_tools.clone());
                ui.toast("Simulation started", Color::srgb(0.3, 1.0, 0.4), 4.0);
            }
        }
        Err(errors) => {
            for error in errors {
                ui.toast(
                    format!("Cannot start: {error}"),
                    Color::srgb(1.0, 0.4, 0.3),
                    6.0,
                );
            }
        }
    }
}

/// Typed answer for the open prompt. Enter submits, Escape abandons the
/// request (nothing is sent either way on Escape).
pub fn prompt_input(
    keys: Res<ButtonInput<KeyCode>>,
    conn_state: Res<ConnectionState>,
    mut sim: ResMut<SimState>,
    mut ui: ResMut<UiState>,
) {
    if ui.prompt.is_none() {
        return;
    }

    if keys.just_pressed(KeyCode::Escape) {
        if let Some(prompt) = ui.prompt.take() {
            sim.session.respond(&prompt.task_id, None);
            ui.notice("Input request dismissed");
        }
        return;
    }

    if keys.just_pressed(KeyCode::Enter) {
        if let Some(prompt) = ui.prompt.take() {
            let event = sim.session.respond(&prompt.task_id, Some(prompt.input));
            if let Some(event) = event {
                send_event(&conn_state, &mut ui, event);
            }
        }
        return;
    }

    let shift = keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight);
    let pressed: Vec<KeyCode> = keys.get_just_pressed().copied().collect();
    if let Some(prompt) = &mut ui.prompt {
        for key in pressed {
            if key == KeyCode::Backspace {
                prompt.input.pop();
            } else if let Some(c) = key_to_char(key, shift) {
                prompt.input.push(c);
            }
        }
    }
}

pub fn update_prompt_panel(
    ui: Res<UiState>,
    mut panels: Query<&mut Visibility, With<PromptPanel>>,
    mut texts: Query<&mut Text, With<PromptText>>,
) {
    let Ok(mut visibility) = panels.single_mut() else {
        return;
    };
    match &ui.prompt {
        Some(prompt) => {
            *visibility = Visibility::Visible;
            if let Ok(mut text) = texts.single_mut() {
                text.0 = format!(
                    "The team needs your input:\n\n{}\n\n> {}_\n\nEnter: send | Esc: dismiss",
                    prompt.question, prompt.input
                );
            }
        }
        None => *visibility = Visibility::Hidden,
    }
}

pub fn update_toasts(time: Res<Time>, mut ui: ResMut<UiState>) {
    let dt = time.delta_secs();
    for toast in &mut ui.toasts {
        toast.timer -= dt;
    }
    ui.toasts.retain(|t| t.timer > 0.0);
}

pub fn render_toasts(
    ui: Res<UiState>,
    mut containers: Query<(&mut Text, &mut TextColor), With<ToastContainer>>,
) {
    let Ok((mut text, mut color)) = containers.single_mut() else {
        return;
    };
    if ui.toasts.is_empty() {
        text.0.clear();
        return;
    }
    let lines: Vec<&str> = ui.toasts.iter().map(|t| t.message.as_str()).collect();
    text.0 = lines.join("\n");
    if let Some(last) = ui.toasts.last() {
        color.0 = last.color;
    }
}

/// Cursor ray hit-testing: nearest agent wins, else the smallest zone
/// under the cursor. Only materialized zones participate.
pub fn hover_info(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<ViewCamera>>,
    zones: Query<&ZoneVisual>,
    sim: Res<SimState>,
    mut ui: ResMut<UiState>,
) {
    ui.hover = None;
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut best_agent: Option<(f32, String)> = None;
    for agent in sim.registry.all() {
        let p = Vec3::from_array(agent.render) + Vec3::Y * 0.8;
        let t = (p - origin).dot(dir);
        if t <= 0.0 {
            continue;
        }
        let miss = (p - (origin + dir * t)).length();
        if miss < 1.2 && best_agent.as_ref().map(|(d, _)| miss < *d).unwrap_or(true) {
            let mut info = format!(
                "{}\n{} — {}",
                agent.display_name,
                agent.role,
                agent.status.label()
            );
            if !agent.thoughts.is_empty() {
                info.push('\n');
                info.push_str(&agent.thoughts);
            }
            best_agent = Some((miss, info));
        }
    }
    if let Some((_, info)) = best_agent {
        ui.hover = Some(info);
        return;
    }

    let mut best_zone: Option<(f32, ZoneKey)> = None;
    for visual in &zones {
        let def = visual.zone.def();
        if dir.y.abs() < 1e-6 {
            continue;
        }
        let t = (def.center[1] - origin.y) / dir.y;
        if t <= 0.0 {
            continue;
        }
        let hit = origin + dir * t;
        let (w, d) = def.extents;
        if (hit.x - def.center[0]).abs() <= w / 2.0 && (hit.z - def.center[2]).abs() <= d / 2.0 {
            let area = w * d;
            if best_zone.as_ref().map(|(a, _)| area < *a).unwrap_or(true) {
                best_zone = Some((area, visual.zone));
            }
        }
    }
    if let Some((_, zone)) = best_zone {
        ui.hover = Some(zone.display_label().to_string());
    }
}

pub fn update_hover_panel(ui: Res<UiState>, mut panels: Query<&mut Text, With<HoverPanel>>) {
    let Ok(mut text) = panels.single_mut() else {
        return;
    };
    text.0 = ui.hover.clone().unwrap_or_default();
}

fn key_to_char(key: KeyCode, shift: bool) -> Option<char> {
    use KeyCode::*;
    let c = match key {
        KeyA => 'a',
        KeyB => 'b',
        KeyC => 'c',
        KeyD => 'd',
        KeyE => 'e',
        KeyF => 'f',
        KeyG => 'g',
        KeyH => 'h',
        KeyI => 'i',
        KeyJ => 'j',
        KeyK => 'k',
        KeyL => 'l',
        KeyM => 'm',
        KeyN => 'n',
        KeyO => 'o',
        KeyP => 'p',
        KeyQ => 'q',
        KeyR => 'r',
        KeyS => 's',
        KeyT => 't',
        KeyU => 'u',
        KeyV => 'v',
        KeyW => 'w',
        KeyX => 'x',
        KeyY => 'y',
        KeyZ => 'z',
        Digit0 => '0',
        Digit1 => '1',
        Digit2 => '2',
        Digit3 => '3',
        Digit4 => '4',
        Digit5 => '5',
        Digit6 => '6',
        Digit7 => '7',
        Digit8 => '8',
        Digit9 => '9',
        Space => ' ',
        Comma => ',',
        Period => '.',
        Minus => '-',
        Slash => '/',
        Semicolon => ';',
        Quote => '\'',
        _ => return None,
    };
    Some(if shift { c.to_ascii_uppercase() } else { c })
}
