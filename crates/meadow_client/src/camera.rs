use bevy::prelude::*;
use meadow_simulation::{log, CameraRig, ControllerSet};

/// Рендер-часть камеры: CameraRig (simulation) двигает Transform, здесь Camera3d + projection
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                attach_render_camera,
                toggle_camera_mode.before(ControllerSet::Camera),
            ),
        );
    }
}

/// Perspective: vertical fov 75°, near 0.1, far 1000
fn attach_render_camera(mut commands: Commands, rigs: Query<Entity, Added<CameraRig>>) {
    for entity in &rigs {
        commands.entity(entity).insert((
            Camera3d::default(),
            Projection::from(PerspectiveProjection {
                fov: 75f32.to_radians(),
                near: 0.1,
                far: 1000.0,
                ..default()
            }),
        ));
    }
}

/// C — back / front view
fn toggle_camera_mode(keys: Res<ButtonInput<KeyCode>>, mut rigs: Query<&mut CameraRig>) {
    if !keys.just_pressed(KeyCode::KeyC) {
        return;
    }

    for mut rig in &mut rigs {
        rig.toggle_mode();
        log(&format!("📷 Camera mode: {:?}", rig.mode));
    }
}
