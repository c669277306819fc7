//! Animation events

use bevy::prelude::*;

use super::animator::ClipTransition;
use super::clips::MotionClip;

/// Event: начат crossfade на новый клип
///
/// Генерируется: update_animation_state (один раз на реальный переход).
/// Повторный запрос текущего клипа event НЕ генерирует.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ClipTransitionStarted {
    pub entity: Entity,
    pub transition: ClipTransition,
}

/// Event: запрошен клип, которого нет среди загруженных (non-fatal warning)
///
/// Текущий клип продолжает играть.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRequestRejected {
    pub entity: Entity,
    pub clip: MotionClip,
}
