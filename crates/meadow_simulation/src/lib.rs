//! MEADOW Simulation Core
//!
//! Animated-Character Controller на Bevy 0.16 (headless).
//!
//! HYBRID ARCHITECTURE:
//! - Simulation = controller logic (locomotion, animation state, camera, compass)
//! - Client = rendering, glTF loading, AnimationPlayer, device input, HUD
//!
//! Frame order (Update, chained):
//! Mixer → Look → Locomotion → Animation → Camera → Heading
//!
//! Все per-frame системы — no-op пока персонаж не загружен.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod animation;
pub mod camera;
pub mod compass;
pub mod components;
pub mod config;
pub mod grass;
pub mod input;
pub mod loading;
pub mod locomotion;
pub mod logger;

// Re-export базовых типов для удобства
pub use animation::{
    AnimationError, CharacterAnimator, ClipRegistry, ClipRequestRejected, ClipSlot, ClipTransition,
    ClipTransitionStarted, MotionClip, RequestOutcome,
};
pub use camera::{CameraMode, CameraRig};
pub use compass::{CompassReadout, CompassReading};
pub use components::*;
pub use config::{CatalogError, ControllerSettings, ModelCatalog, ModelConfig};
pub use grass::{BladePlacement, GrassFieldConfig};
pub use input::{InputState, MoveKey, PointerCapture, PointerMotion};
pub use loading::{CharacterLoad, LoadError, LoadedCharacter, LoadedClip};
pub use logger::*;

/// Порядок шагов контроллера внутри frame
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Продвинуть animation mixer на frame delta
    Mixer,
    /// Pointer drag → yaw
    Look,
    /// Keys → position
    Locomotion,
    /// is_moving → Idle/Moving crossfade
    Animation,
    /// Camera follow
    Camera,
    /// Compass heading
    Heading,
}

/// Главный plugin симуляции (объединяет все подсистемы контроллера)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Settings могли быть вставлены клиентом из каталога до plugin
        let settings = app
            .world()
            .get_resource::<ControllerSettings>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<DeterministicRng>() {
            // Детерминистичный RNG (seed по умолчанию)
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(CompassReadout::new(std::time::Duration::from_millis(
            settings.compass_interval_ms,
        )))
        .insert_resource(settings)
        .init_resource::<InputState>()
        .init_resource::<PointerCapture>()
        .init_resource::<CharacterLoad>()
        .init_resource::<GrassFieldConfig>()
        .add_event::<PointerMotion>()
        .add_event::<ClipTransitionStarted>()
        .add_event::<ClipRequestRejected>()
        .configure_sets(
            Update,
            (
                ControllerSet::Mixer,
                ControllerSet::Look,
                ControllerSet::Locomotion,
                ControllerSet::Animation,
                ControllerSet::Camera,
                ControllerSet::Heading,
            )
                .chain(),
        )
        .add_systems(Startup, setup_camera_rig)
        .add_systems(
            Update,
            (
                animation::advance_animators.in_set(ControllerSet::Mixer),
                locomotion::apply_pointer_look.in_set(ControllerSet::Look),
                locomotion::apply_locomotion.in_set(ControllerSet::Locomotion),
                animation::update_animation_state.in_set(ControllerSet::Animation),
                camera::follow_character.in_set(ControllerSet::Camera),
                compass::update_compass.in_set(ControllerSet::Heading),
            ),
        );
    }
}

fn setup_camera_rig(mut commands: Commands, settings: Res<ControllerSettings>) {
    camera::spawn_camera_rig(&mut commands, &settings);
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// SimulationPlugin НЕ добавляется — тесты/бинарь решают сами.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}
