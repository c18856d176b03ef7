//! Agent and zone rendering.
//!
//! `sync_agents` diffs the registry against spawned visuals each frame;
//! `interpolate_agents` moves every visual toward its target and commits
//! the status emissive cue. Name labels are free-floating entities that
//! follow their agent and face the camera.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use officesim_logic::interp::{clamp_tick_delta, step_toward, MOVE_SPEED};
use officesim_logic::status::status_cue;
use officesim_logic::zones::{zones_to_materialize, ZoneKey};
use officesim_proto::Role;

use crate::state::{
    AgentBody, AgentLabel, AgentVisual, SimState, ToolZoneRequest, ViewCamera, ZoneVisual,
};

const LABEL_HEIGHT: f32 = 2.2;
const LABEL_SCALE: f32 = 0.035;

/// Mesh, material template, and body half-height for one role.
pub struct RoleVisual {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub y_offset: f32,
}

#[derive(Resource)]
pub struct RoleVisuals {
    by_role: HashMap<Role, RoleVisual>,
}

impl RoleVisuals {
    pub fn get(&self, role: Role) -> &RoleVisual {
        // The map is total over Role::ALL; see setup_role_visuals.
        &self.by_role[&role]
    }
}

fn role_color(role: Role) -> Color {
    let hex = match role {
        Role::Ceo => 0xff4444,
        Role::ProductManager => 0x44ff44,
        Role::Coder => 0x4444ff,
        Role::Marketer => 0xffff44,
        Role::Qa => 0x44ffff,
        Role::Messenger => 0xff8844,
        _ => 0xaaaaaa,
    };
    let c = officesim_logic::status::rgb(hex);
    Color::srgb(c[0], c[1], c[2])
}

/// Build the shared per-role mesh and material handles once at startup.
pub fn setup_role_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut by_role = HashMap::new();
    for role in Role::ALL {
        let (mesh, y_offset) = match role {
            Role::Ceo => (meshes.add(Cylinder::new(0.5, 1.8)), 0.9),
            Role::Coder | Role::Qa => (meshes.add(Cuboid::new(0.8, 1.5, 0.8)), 0.75),
            Role::ProductManager => (meshes.add(Cone::new(0.7, 1.8)), 0.9),
            Role::Marketer => (
                meshes.add(ConicalFrustum {
                    radius_top: 0.5,
                    radius_bottom: 0.7,
                    height: 1.6,
                }),
                0.8,
            ),
            Role::Messenger => (meshes.add(Sphere::new(0.6)), 0.6),
            _ => (meshes.add(Sphere::new(0.7)), 0.7),
        };
        let material = materials.add(StandardMaterial {
            base_color: role_color(role),
            perceptual_roughness: 0.7,
            ..default()
        });
        by_role.insert(
            role,
            RoleVisual {
                mesh,
                material,
                y_offset,
            },
        );
    }
    commands.insert_resource(RoleVisuals { by_role });
}

/// Diff registry against spawned visuals: spawn joins, despawn leaves.
pub fn sync_agents(
    mut commands: Commands,
    sim: Res<SimState>,
    visuals: Res<RoleVisuals>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<(Entity, &AgentVisual)>,
    labels: Query<(Entity, &AgentLabel)>,
) {
    for (entity, visual) in &roots {
        if sim.registry.get(&visual.agent_id).is_none() {
            commands.entity(entity).despawn();
        }
    }
    for (entity, label) in &labels {
        if sim.registry.get(&label.agent_id).is_none() {
            commands.entity(entity).despawn();
        }
    }

    for agent in sim.registry.all() {
        if roots.iter().any(|(_, v)| v.agent_id == agent.id) {
            continue;
        }
        let role_visual = visuals.get(agent.role);
        // Each agent gets its own material so status cues don't bleed
        // across agents of the same role.
        let template = materials
            .get(&role_visual.material)
            .cloned()
            .unwrap_or_default();
        let material = materials.add(template);

        let pos = Vec3::from_array(agent.render);
        commands
            .spawn((
                AgentVisual {
                    agent_id: agent.id.clone(),
                    shown_cue: None,
                },
                Transform::from_translation(pos),
                Visibility::default(),
            ))
            .with_children(|parent| {
                parent.spawn((
                    AgentBody,
                    Mesh3d(role_visual.mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::from_xyz(0.0, role_visual.y_offset, 0.0),
                ));
            });

        commands.spawn((
            AgentLabel {
                agent_id: agent.id.clone(),
            },
            Text2d::new(agent.display_name.clone()),
            TextFont {
                font_size: 24.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Transform::from_translation(pos + Vec3::Y * LABEL_HEIGHT)
                .with_scale(Vec3::splat(LABEL_SCALE)),
        ));
    }
}

/// Advance every visual toward its target and commit the status cue.
/// The tick delta is clamped so a stalled frame cannot teleport anyone.
pub fn interpolate_agents(
    time: Res<Time>,
    mut sim: ResMut<SimState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(&mut AgentVisual, &mut Transform, &Children)>,
    bodies: Query<&MeshMaterial3d<StandardMaterial>, With<AgentBody>>,
) {
    let dt = clamp_tick_delta(time.delta_secs());

    for (mut visual, mut transform, children) in &mut roots {
        let Some(agent) = sim.registry.get_mut(&visual.agent_id) else {
            continue;
        };

        let (next, dir) = step_toward(agent.render, agent.target, MOVE_SPEED, dt);
        agent.render = next;
        transform.translation = Vec3::from_array(next);
        if let Some(dir) = dir {
            let flat = Vec3::new(dir[0], 0.0, dir[2]);
            if flat.length_squared() > 1e-6 {
                let target = transform.translation + flat;
                transform.look_at(target, Vec3::Y);
            }
        }

        let cue = (agent.status, agent.idle_sub);
        if visual.shown_cue != Some(cue) {
            let glow = status_cue(agent.status, agent.idle_sub);
            for child in children.iter() {
                if let Ok(handle) = bodies.get(child) {
                    if let Some(material) = materials.get_mut(&handle.0) {
                        material.emissive = Color::srgb(glow[0], glow[1], glow[2]).into();
                    }
                }
            }
            visual.shown_cue = Some(cue);
        }
    }
}

/// Keep each label over its agent's head, facing the camera.
pub fn position_labels(
    sim: Res<SimState>,
    cameras: Query<&Transform, (With<ViewCamera>, Without<AgentLabel>)>,
    mut labels: Query<(&AgentLabel, &mut Transform), Without<ViewCamera>>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    for (label, mut transform) in &mut labels {
        let Some(agent) = sim.registry.get(&label.agent_id) else {
            continue;
        };
        transform.translation = Vec3::from_array(agent.render) + Vec3::Y * LABEL_HEIGHT;
        transform.rotation = camera.rotation;
    }
}

/// Materialize the always-present zones at startup. Tool zones come later,
/// per run, through [`sync_tool_zones`].
pub fn setup_static_zones(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for zone in zones_to_materialize(&[]) {
        spawn_zone(&mut commands, &mut meshes, &mut materials, zone);
    }
}

/// Rebuild tool-zone visuals when a run start decided the enabled set.
pub fn sync_tool_zones(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut request: ResMut<ToolZoneRequest>,
    existing: Query<(Entity, &ZoneVisual)>,
) {
    let Some(enabled) = request.0.take() else {
        return;
    };
    for (entity, visual) in &existing {
        if visual.zone.is_tool_zone() {
            commands.entity(entity).despawn();
        }
    }
    for zone in enabled {
        info!("Materializing tool zone {}", zone.display_label());
        spawn_zone(&mut commands, &mut meshes, &mut materials, zone);
    }
}

fn spawn_zone(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    zone: ZoneKey,
) {
    let def = zone.def();
    let (w, d) = def.extents;
    let fill = Color::srgb(def.fill[0], def.fill[1], def.fill[2]);

    let floor_material = if zone.is_tool_zone() {
        materials.add(StandardMaterial {
            base_color: fill.with_alpha(0.55),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.9,
            ..default()
        })
    } else {
        materials.add(StandardMaterial {
            base_color: fill,
            perceptual_roughness: 0.9,
            ..default()
        })
    };

    commands
        .spawn((
            ZoneVisual { zone },
            Transform::from_translation(Vec3::from_array(def.center)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(w, 0.08, d))),
                MeshMaterial3d(floor_material),
            ));

            if let Some(border) = def.border {
                let color = Color::srgb(border[0], border[1], border[2]);
                let material = materials.add(StandardMaterial {
                    base_color: color,
                    emissive: color.into(),
                    ..default()
                });
                let strips = [
                    (Cuboid::new(w + 0.3, 0.14, 0.3), Vec3::new(0.0, 0.0, d / 2.0)),
                    (
                        Cuboid::new(w + 0.3, 0.14, 0.3),
                        Vec3::new(0.0, 0.0, -d / 2.0),
                    ),
                    (Cuboid::new(0.3, 0.14, d + 0.3), Vec3::new(w / 2.0, 0.0, 0.0)),
                    (
                        Cuboid::new(0.3, 0.14, d + 0.3),
                        Vec3::new(-w / 2.0, 0.0, 0.0),
                    ),
                ];
                for (cuboid, offset) in strips {
                    parent.spawn((
                        Mesh3d(meshes.add(cuboid)),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(offset),
                    ));
                }
            }

            if let Some(label) = def.label {
                let color = def.border.unwrap_or(def.fill);
                parent.spawn((
                    Text2d::new(label),
                    TextFont {
                        font_size: 30.0,
                        ..default()
                    },
                    TextColor(Color::srgb(color[0], color[1], color[2])),
                    Transform::from_xyz(0.0, 0.3, 0.0)
                        .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
                        .with_scale(Vec3::splat(LABEL_SCALE * 1.6)),
                ));
            }

            if zone == ZoneKey::WaterCoolerZone {
                parent.spawn((
                    Mesh3d(meshes.add(Cylinder::new(0.3, 1.0))),
                    MeshMaterial3d(materials.add(StandardMaterial {
                        base_color: Color::srgb(0.4, 0.7, 0.95),
                        ..default()
                    })),
                    Transform::from_xyz(0.0, 0.5, 0.0),
                ));
            }
        });
}
