//! Third-person camera rig
//!
//! Камера никогда не симулируется самостоятельно — всегда функция от Character:
//! - target = character.position + rotate(offset, yaw)
//! - position += (target - position) * smoothing (каждый frame)
//! - look target = character.position + (0, look_lift, 0)
//!
//! Единственное состояние между frames — предыдущая позиция (Transform рига).

use bevy::prelude::*;

use crate::components::{Character, Facing};
use crate::config::ControllerSettings;

/// Camera mode: за спиной или перед персонажем (mirrored view)
///
/// # Toggle
/// - [C] key → Back ↔ Front
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum CameraMode {
    #[default]
    Back,
    Front,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Back => CameraMode::Front,
            CameraMode::Front => CameraMode::Back,
        }
    }
}

/// Camera rig компонент
///
/// Клиент вешает Camera3d на ту же entity, симуляция двигает только Transform.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct CameraRig {
    pub mode: CameraMode,
    pub back_offset: Vec3,
    pub front_offset: Vec3,
    /// Доля оставшегося расстояния за frame (0..=1)
    pub smoothing: f32,
    pub look_lift: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::from_settings(&ControllerSettings::default())
    }
}

impl CameraRig {
    pub fn from_settings(settings: &ControllerSettings) -> Self {
        Self {
            mode: CameraMode::Back,
            back_offset: settings.back_offset(),
            front_offset: settings.front_offset(),
            smoothing: settings.camera_smoothing.clamp(0.0, 1.0),
            look_lift: settings.look_lift,
        }
    }

    pub fn offset(&self) -> Vec3 {
        match self.mode {
            CameraMode::Back => self.back_offset,
            CameraMode::Front => self.front_offset,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }
}

/// Начальная позиция камеры (до появления персонажа)
pub const INITIAL_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 5.0, -10.0);

/// Куда камера стремится: offset, повёрнутый в ориентацию персонажа
pub fn follow_target(character_position: Vec3, rotation: Quat, offset: Vec3) -> Vec3 {
    character_position + rotation * offset
}

/// Exponential smoothing: один frame
pub fn smooth_toward(current: Vec3, target: Vec3, smoothing: f32) -> Vec3 {
    current + (target - current) * smoothing
}

/// Точка взгляда: torso, а не ноги
pub fn look_target(character_position: Vec3, look_lift: f32) -> Vec3 {
    character_position + Vec3::Y * look_lift
}

/// Spawn helper: camera rig в начальной позиции, смотрит на origin
pub fn spawn_camera_rig(commands: &mut Commands, settings: &ControllerSettings) -> Entity {
    commands
        .spawn((
            Name::new("CameraRig"),
            CameraRig::from_settings(settings),
            Transform::from_translation(INITIAL_CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        ))
        .id()
}

/// Система: camera follow
///
/// Без персонажа — no-op (камера остаётся где была).
pub fn follow_character(
    characters: Query<(&Transform, &Facing), With<Character>>,
    mut rigs: Query<(&CameraRig, &mut Transform), Without<Character>>,
) {
    let Ok((character, facing)) = characters.single() else {
        return;
    };

    for (rig, mut transform) in rigs.iter_mut() {
        let target = follow_target(character.translation, facing.rotation(), rig.offset());
        let position = smooth_toward(transform.translation, target, rig.smoothing);

        *transform = Transform::from_translation(position)
            .looking_at(look_target(character.translation, rig.look_lift), Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_back_offset_sits_behind_character() {
        let rig = CameraRig::default();
        let target = follow_target(Vec3::ZERO, Quat::IDENTITY, rig.offset());

        // Персонаж идёт в +Z → камера сзади в -Z
        assert!((target - Vec3::new(0.0, 4.2, -4.5)).length() < 1e-6);
    }

    #[test]
    fn test_offset_rotates_with_yaw() {
        let rig = CameraRig::default();
        let position = Vec3::new(3.0, 0.0, 1.0);
        let target = follow_target(position, Quat::from_rotation_y(PI), rig.offset());

        assert!((target - Vec3::new(3.0, 4.2, 5.5)).length() < 1e-4, "target = {:?}", target);
    }

    #[test]
    fn test_front_mode_mirrors_offset() {
        let mut rig = CameraRig::default();
        rig.toggle_mode();
        assert_eq!(rig.mode, CameraMode::Front);
        assert_eq!(rig.offset(), Vec3::new(0.0, 4.2, 4.5));

        rig.toggle_mode();
        assert_eq!(rig.mode, CameraMode::Back);
    }

    #[test]
    fn test_smoothing_converges_geometrically() {
        let target = Vec3::new(0.0, 4.2, -4.5);
        let smoothing = 0.1;
        let mut position = INITIAL_CAMERA_POSITION;
        let mut distance = position.distance(target);
        let initial = distance;

        for frame in 1..=200 {
            position = smooth_toward(position, target, smoothing);
            let next = position.distance(target);

            assert!(next < distance, "frame {}: {} !< {}", frame, next, distance);
            // Ratio (1 - smoothing) за frame
            let expected = initial * (1.0 - smoothing).powi(frame);
            assert!((next - expected).abs() < 1e-3, "frame {}: {} vs {}", frame, next, expected);

            distance = next;
            if distance < 1e-3 {
                return;
            }
        }

        panic!("camera did not converge: distance = {}", distance);
    }

    #[test]
    fn test_look_target_lifted() {
        assert_eq!(look_target(Vec3::new(1.0, 0.0, 2.0), 1.0), Vec3::new(1.0, 1.0, 2.0));
    }
}
