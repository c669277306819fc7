//! Animation systems: mixer advance + Idle/Moving state machine

use bevy::prelude::*;

use super::animator::{CharacterAnimator, RequestOutcome};
use super::clips::MotionClip;
use super::events::{ClipRequestRejected, ClipTransitionStarted};
use crate::components::{Character, Locomotion};
use crate::logger;

/// Система: продвинуть микшер на frame delta
///
/// Первая в frame chain (до locomotion), как mixer.update(delta).
pub fn advance_animators(time: Res<Time>, mut animators: Query<&mut CharacterAnimator, With<Character>>) {
    let delta = time.delta_secs();

    for mut animator in animators.iter_mut() {
        let report = animator.advance(delta);

        if report.loops_completed > 0 && animator.current() == Some(MotionClip::Moving) {
            if let Some(slot) = animator.current_slot() {
                logger::log(&format!("| {} animation loop completed |", slot.name));
            }
        }
    }
}

/// Система: Locomotion.is_moving → запрос Idle/Moving
///
/// Запрос отправляется только при смене желаемого state, поэтому
/// отсутствующий клип даёт ровно один warning на переход, а не спам каждый frame.
pub fn update_animation_state(
    mut characters: Query<(Entity, &Locomotion, &mut CharacterAnimator), With<Character>>,
    mut started: EventWriter<ClipTransitionStarted>,
    mut rejected: EventWriter<ClipRequestRejected>,
) {
    for (entity, locomotion, mut animator) in characters.iter_mut() {
        let desired = MotionClip::for_motion(locomotion.is_moving);
        if animator.requested() == Some(desired) {
            continue;
        }

        match animator.request(desired) {
            Ok(RequestOutcome::Started(transition)) => {
                logger::log(&format!(
                    "🎬 {:?} → {} (fade {:.2}s, start {:.2}s)",
                    transition.from, transition.to, transition.fade_secs, transition.start_time
                ));
                started.write(ClipTransitionStarted { entity, transition });
            }
            Ok(RequestOutcome::AlreadyPlaying) => {}
            Err(err) => {
                logger::log_warning(&format!("⚠️ Could not play animation for {:?}: {}", entity, err));
                rejected.write(ClipRequestRejected {
                    entity,
                    clip: desired,
                });
            }
        }
    }
}
