//! Character компоненты: единственная анимированная сущность сцены

use bevy::prelude::*;

/// Управляемый персонаж (sheep, chicken, ...)
///
/// Существует только после успешной загрузки ассетов.
/// Автоматически добавляет Facing и Locomotion через Required Components.
///
/// # Single-character
/// Все per-frame системы берут `single()` и молча выходят, если персонажа нет.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Facing, Locomotion)]
pub struct Character {
    /// Ключ модели в каталоге (для логов и reload)
    pub model: String,
}

/// Yaw персонажа (вращение вокруг +Y, радианы)
///
/// Authoritative источник ориентации: Transform.rotation выводится из yaw
/// каждый frame, а не наоборот.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub yaw: f32,
}

impl Facing {
    pub fn new(yaw: f32) -> Self {
        Self { yaw }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Heading vector для compass: local -Z, повёрнутый на yaw
    pub fn heading(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Результат locomotion за последний frame
///
/// `is_moving` — единственный trigger для Animation State.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub is_moving: bool,
    /// Смещение за последний frame (world space)
    pub last_displacement: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_heading_at_zero_yaw_points_negative_z() {
        let heading = Facing::default().heading();
        assert!((heading - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_heading_quarter_turn_points_negative_x() {
        // +90° вокруг +Y: -Z → -X
        let heading = Facing::new(FRAC_PI_2).heading();
        assert!((heading - Vec3::NEG_X).length() < 1e-6, "heading = {:?}", heading);
    }
}
