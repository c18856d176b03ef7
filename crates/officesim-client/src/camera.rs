//! Overview camera: high oblique view with keyboard pan and wheel zoom.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::state::ViewCamera;

const PAN_SPEED: f32 = 40.0;
const ZOOM_SPEED: f32 = 6.0;
const MIN_HEIGHT: f32 = 8.0;
const MAX_HEIGHT: f32 = 180.0;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        ViewCamera,
        Camera3d::default(),
        // Ambient light is a per-camera component as of Bevy 0.17.
        AmbientLight {
            color: Color::WHITE,
            brightness: 300.0,
            ..default()
        },
        Transform::from_xyz(0.0, 80.0, 100.0).looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
    ));
}

pub fn pan_zoom_camera(
    keys: Res<ButtonInput<KeyCode>>,
    mut wheel: MessageReader<MouseWheel>,
    time: Res<Time>,
    mut cameras: Query<&mut Transform, With<ViewCamera>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    let mut pan = Vec3::ZERO;
    if keys.pressed(KeyCode::ArrowUp) {
        pan.z -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        pan.z += 1.0;
    }
    if keys.pressed(KeyCode::ArrowLeft) {
        pan.x -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        pan.x += 1.0;
    }
    if pan != Vec3::ZERO {
        transform.translation += pan.normalize() * PAN_SPEED * time.delta_secs();
    }

    let mut zoom = 0.0;
    for event in wheel.read() {
        zoom += event.y;
    }
    if zoom != 0.0 {
        let forward = transform.forward().as_vec3();
        let next = transform.translation + forward * zoom * ZOOM_SPEED;
        if next.y > MIN_HEIGHT && next.y < MAX_HEIGHT {
            transform.translation = next;
        }
    }
}
