//! Grass field layout: случайная (но детерминированная) раскладка травинок
//!
//! Симуляция считает только placement. Меш/материал — забота клиента
//! (одна mesh + один material на все травинки → automatic instancing).

use bevy::prelude::*;
use rand::Rng;

/// Параметры поля
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GrassFieldConfig {
    /// Сторона квадратного поля (центр в origin)
    pub plane_size: f32,
    pub blade_count: usize,
    pub blade_width: f32,
    pub blade_height: f32,
}

impl Default for GrassFieldConfig {
    fn default() -> Self {
        Self {
            plane_size: 20.0,
            blade_count: 1000,
            blade_width: 0.05,
            blade_height: 0.4,
        }
    }
}

/// Одна травинка: позиция на земле + поворот вокруг +Y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladePlacement {
    pub position: Vec3,
    /// [0, π): плоская травинка симметрична, больше не нужно
    pub yaw: f32,
}

impl BladePlacement {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(Quat::from_rotation_y(self.yaw))
    }
}

/// Разложить травинки равномерно по полю
pub fn scatter_blades(rng: &mut impl Rng, config: &GrassFieldConfig) -> Vec<BladePlacement> {
    let half = config.plane_size * 0.5;

    (0..config.blade_count)
        .map(|_| BladePlacement {
            position: Vec3::new(
                (rng.gen::<f32>() - 0.5) * config.plane_size,
                0.0,
                (rng.gen::<f32>() - 0.5) * config.plane_size,
            )
            .clamp(Vec3::new(-half, 0.0, -half), Vec3::new(half, 0.0, half)),
            yaw: rng.gen::<f32>() * std::f32::consts::PI,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_blades_stay_inside_plane() {
        let config = GrassFieldConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let blades = scatter_blades(&mut rng, &config);

        assert_eq!(blades.len(), 1000);
        for blade in &blades {
            assert!(blade.position.x.abs() <= 10.0);
            assert!(blade.position.z.abs() <= 10.0);
            assert_eq!(blade.position.y, 0.0);
            assert!((0.0..std::f32::consts::PI).contains(&blade.yaw));
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = GrassFieldConfig {
            blade_count: 50,
            ..default()
        };
        let first = scatter_blades(&mut ChaCha8Rng::seed_from_u64(42), &config);
        let second = scatter_blades(&mut ChaCha8Rng::seed_from_u64(42), &config);
        let other = scatter_blades(&mut ChaCha8Rng::seed_from_u64(43), &config);

        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
