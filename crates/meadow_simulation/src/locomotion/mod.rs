//! Locomotion: held keys → world-space displacement, pointer drag → yaw
//!
//! Логика вынесена в чистые функции (тестируются без App),
//! системы только читают/пишут ECS state.
//!
//! # Coordinate System (character local space)
//! - Forward: +Z
//! - Backward: -Z
//! - Left: +X (up × forward)
//! - Right: -X

use bevy::prelude::*;

use crate::components::{Character, Facing, Locomotion};
use crate::config::ControllerSettings;
use crate::input::{InputState, MoveKey, PointerCapture, PointerMotion};

/// Вклад одной клавиши в local direction
pub fn key_axis(key: MoveKey) -> Vec3 {
    match key {
        MoveKey::Forward => Vec3::Z,
        MoveKey::Backward => Vec3::NEG_Z,
        MoveKey::Left => Vec3::X,
        MoveKey::Right => Vec3::NEG_X,
    }
}

/// Сумма вкладов нажатых клавиш (до нормализации)
pub fn local_direction(input: &InputState) -> Vec3 {
    MoveKey::ALL
        .iter()
        .filter(|key| input.is_pressed(**key))
        .map(|key| key_axis(*key))
        .sum()
}

/// Нормализованное направление в world space (None если стоим)
///
/// Противоположные клавиши (W+S) гасят друг друга → None.
pub fn world_direction(input: &InputState, yaw: f32) -> Option<Vec3> {
    let local = local_direction(input);
    if local.length_squared() == 0.0 {
        return None;
    }

    Some(Quat::from_rotation_y(yaw) * local.normalize())
}

/// Результат одного шага locomotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionStep {
    pub displacement: Vec3,
    pub is_moving: bool,
}

/// Один frame locomotion: `direction * speed * dt`
///
/// Frame-delta scaled (frame-rate independent). Fixed-step вариант не поддерживаем.
pub fn locomotion_step(input: &InputState, yaw: f32, speed: f32, dt: f32) -> LocomotionStep {
    match world_direction(input, yaw) {
        Some(direction) => LocomotionStep {
            displacement: direction * speed * dt,
            is_moving: true,
        },
        None => LocomotionStep {
            displacement: Vec3::ZERO,
            is_moving: false,
        },
    }
}

/// Новый yaw после горизонтального движения мыши (pixels)
pub fn yaw_after_pointer(yaw: f32, delta_x: f32, sensitivity: f32) -> f32 {
    yaw - delta_x * sensitivity
}

/// Система: pointer drag → yaw
///
/// Работает только при активном exclusive capture.
/// События без capture (или без персонажа) просто выбрасываются.
pub fn apply_pointer_look(
    mut motions: EventReader<PointerMotion>,
    capture: Res<PointerCapture>,
    settings: Res<ControllerSettings>,
    mut characters: Query<&mut Facing, With<Character>>,
) {
    if !capture.is_captured() {
        motions.clear();
        return;
    }

    // Guard: персонаж ещё не загружен
    let Ok(mut facing) = characters.single_mut() else {
        motions.clear();
        return;
    };

    for motion in motions.read() {
        facing.yaw = yaw_after_pointer(facing.yaw, motion.delta_x, settings.turn_sensitivity);
    }
}

/// Система: keys → position, yaw → rotation
///
/// Пишет Locomotion.is_moving для Animation State (следующая система в chain).
pub fn apply_locomotion(
    input: Res<InputState>,
    settings: Res<ControllerSettings>,
    time: Res<Time>,
    mut characters: Query<(&mut Transform, &Facing, &mut Locomotion), With<Character>>,
) {
    let Ok((mut transform, facing, mut locomotion)) = characters.single_mut() else {
        return;
    };

    let step = locomotion_step(&input, facing.yaw, settings.move_speed, time.delta_secs());

    transform.rotation = facing.rotation();
    transform.translation += step.displacement;

    locomotion.is_moving = step.is_moving;
    locomotion.last_displacement = step.displacement;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Все 16 комбинаций клавиш (bit i = MoveKey::ALL[i])
    fn all_combinations() -> impl Iterator<Item = InputState> {
        (0u8..16).map(|mask| {
            let mut input = InputState::default();
            for (bit, key) in MoveKey::ALL.iter().enumerate() {
                input.set(*key, mask & (1 << bit) != 0);
            }
            input
        })
    }

    #[test]
    fn test_direction_is_sum_of_active_keys() {
        for input in all_combinations() {
            let mut expected = Vec3::ZERO;
            if input.forward {
                expected.z += 1.0;
            }
            if input.backward {
                expected.z -= 1.0;
            }
            if input.left {
                expected.x += 1.0;
            }
            if input.right {
                expected.x -= 1.0;
            }

            assert_eq!(local_direction(&input), expected, "input = {:?}", input);
        }
    }

    #[test]
    fn test_zero_combination_does_not_move() {
        let step = locomotion_step(&InputState::default(), 0.3, 3.0, 0.016);
        assert!(!step.is_moving);
        assert_eq!(step.displacement, Vec3::ZERO);
    }

    #[test]
    fn test_opposite_keys_cancel_out() {
        let input = InputState {
            forward: true,
            backward: true,
            ..default()
        };
        let step = locomotion_step(&input, 0.0, 3.0, 0.016);
        assert!(!step.is_moving);
        assert_eq!(step.displacement, Vec3::ZERO);
    }

    #[test]
    fn test_nonzero_direction_is_unit_length() {
        for input in all_combinations() {
            let Some(direction) = world_direction(&input, 1.234) else {
                assert_eq!(local_direction(&input), Vec3::ZERO);
                continue;
            };
            assert!(
                (direction.length() - 1.0).abs() < 1e-5,
                "input = {:?}, length = {}",
                input,
                direction.length()
            );
        }
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let diagonal = InputState {
            forward: true,
            left: true,
            ..default()
        };
        let step = locomotion_step(&diagonal, 0.0, 2.0, 0.5);
        assert!((step.displacement.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_rotated_by_yaw() {
        let input = InputState {
            forward: true,
            ..default()
        };

        // yaw 0: +Z
        let step = locomotion_step(&input, 0.0, 1.0, 1.0);
        assert!((step.displacement - Vec3::Z).length() < 1e-5);

        // yaw 90°: +Z → +X
        let step = locomotion_step(&input, FRAC_PI_2, 1.0, 1.0);
        assert!((step.displacement - Vec3::X).length() < 1e-5, "{:?}", step.displacement);

        // yaw 180°: +Z → -Z
        let step = locomotion_step(&input, PI, 1.0, 1.0);
        assert!((step.displacement - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_forward_walk_end_to_end() {
        // Персонаж в (0,0,0), yaw 0, W зажата T frames
        let input = InputState {
            forward: true,
            ..default()
        };
        let (speed, dt, frames) = (3.0, 1.0 / 60.0, 120);

        let mut position = Vec3::ZERO;
        for _ in 0..frames {
            position += locomotion_step(&input, 0.0, speed, dt).displacement;
        }

        let expected = Vec3::new(0.0, 0.0, speed * dt * frames as f32);
        assert!((position - expected).length() < 1e-4, "position = {:?}", position);
    }

    #[test]
    fn test_pointer_motion_decreases_yaw() {
        let yaw = yaw_after_pointer(0.0, 100.0, 0.002);
        assert!((yaw - (-0.2)).abs() < 1e-6);

        // Движение влево поворачивает обратно
        let yaw = yaw_after_pointer(yaw, -100.0, 0.002);
        assert!(yaw.abs() < 1e-6);
    }
}
