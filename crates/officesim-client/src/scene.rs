//! Static office scenery: ground, floor, desks, lighting.

use bevy::prelude::*;

use officesim_logic::zones::desk_position;
use officesim_proto::Role;

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Grass well past the office so the camera never sees the void.
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(300.0, 0.1, 300.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.45, 0.22),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.06, 0.0),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(150.0, 0.1, 100.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.55, 0.55, 0.58),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    let desk_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.35, 0.17),
        perceptual_roughness: 0.8,
        ..default()
    });
    for role in Role::ALL {
        let (w, d) = if role == Role::Ceo {
            (3.5, 1.8)
        } else {
            (2.5, 1.5)
        };
        let pos = desk_position(role);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(w, 0.15, d))),
            MeshMaterial3d(desk_material.clone()),
            Transform::from_xyz(pos[0], 1.0, pos[2]),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 9_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(40.0, 70.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
