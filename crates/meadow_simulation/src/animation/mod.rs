//! Animation domain — Idle/Moving state machine поверх headless mixer
//!
//! Содержит:
//! - MotionClip, ClipRegistry (validated registry, строится при загрузке)
//! - CharacterAnimator (crossfade, phase preservation, loops)
//! - ClipTransitionStarted / ClipRequestRejected (events)
//! - advance_animators, update_animation_state (systems)

pub mod animator;
pub mod clips;
pub mod events;
pub mod systems;

// Re-export all components, events and systems
pub use animator::*;
pub use clips::*;
pub use events::*;
pub use systems::*;
