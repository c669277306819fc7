//! ECS Components персонажа
//!
//! Организация:
//! - character: Character marker, Facing (yaw), Locomotion (is_moving)
//!
//! Анимация и камера живут в своих доменах (animation, camera).

pub mod character;

// Re-exports для удобного импорта
pub use character::*;
