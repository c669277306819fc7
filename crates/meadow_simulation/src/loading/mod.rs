//! Character loading: poll-based load state вместо callback side effects
//!
//! Архитектура:
//! - Клиент стартует загрузку (AssetServer) → CharacterLoad::Pending
//! - Каждый frame клиент поллит asset server и резолвит загрузку в
//!   `LoadedCharacter` или `LoadError`
//! - Frame loop спрашивает только `is_ready()`, персонаж спавнится один раз
//!
//! Ошибки загрузки non-fatal: логируем, сцена остаётся без персонажа, без retry.

use std::path::Path;

use bevy::prelude::*;
use thiserror::Error;

use crate::animation::{CharacterAnimator, ClipRegistry, ClipResolution};
use crate::components::{Character, Facing};
use crate::config::{ControllerSettings, ModelConfig};
use crate::logger;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("model `{0}` not found in catalog")]
    UnknownModel(String),

    #[error("unsupported model format: {path} (expected .gltf or .glb)")]
    UnsupportedFormat { path: String },

    #[error("failed to load asset {path}: {reason}")]
    Asset { path: String, reason: String },

    #[error("animation file {path} contains no clips")]
    EmptyAnimation { path: String },

    #[error("asset loading timed out after {0:.1}s")]
    TimedOut(f32),
}

/// Проверка формата до обращения к loader'у (glTF only)
pub fn check_model_format(path: &str) -> Result<(), LoadError> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("gltf") | Some("glb") => Ok(()),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_string(),
        }),
    }
}

/// Проверка всех путей модели (контейнер + отдельные анимации)
pub fn check_model_config(config: &ModelConfig) -> Result<(), LoadError> {
    check_model_format(&config.model)?;
    for path in config.animations.values() {
        check_model_format(path)?;
    }
    Ok(())
}

/// Загруженный клип (имя + длительность)
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedClip {
    pub name: String,
    pub duration: f32,
}

/// Результат успешной загрузки: skeleton живёт в scene клиента,
/// симуляции нужны только имена и длительности клипов.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCharacter {
    pub model: String,
    pub scale: f32,
    pub clips: Vec<LoadedClip>,
    pub idle_clip: String,
    pub moving_clip: String,
}

impl LoadedCharacter {
    pub fn new(model: impl Into<String>, config: &ModelConfig, clips: Vec<LoadedClip>) -> Self {
        Self {
            model: model.into(),
            scale: config.scale,
            clips,
            idle_clip: config.idle_clip.clone(),
            moving_clip: config.moving_clip.clone(),
        }
    }

    /// Резолв имён Idle/Moving в validated registry (один раз)
    pub fn resolve_clips(&self) -> ClipResolution {
        ClipRegistry::resolve(
            &self.idle_clip,
            &self.moving_clip,
            self.clips.iter().map(|clip| (clip.name.as_str(), clip.duration)),
        )
    }
}

/// Состояние загрузки персонажа
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum CharacterLoad {
    /// Загрузка не начиналась (или сцена сброшена)
    #[default]
    Idle,
    Pending {
        model: String,
        /// Time::elapsed_secs() на момент старта
        started_at: f32,
    },
    Ready {
        model: String,
    },
    Failed {
        model: String,
        error: LoadError,
    },
}

impl CharacterLoad {
    pub fn begin(&mut self, model: impl Into<String>, now: f32) {
        let model = model.into();
        logger::log_info(&format!("📦 Loading character model `{}`", model));
        *self = CharacterLoad::Pending {
            model,
            started_at: now,
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CharacterLoad::Pending { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CharacterLoad::Ready { .. })
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            CharacterLoad::Idle => None,
            CharacterLoad::Pending { model, .. }
            | CharacterLoad::Ready { model }
            | CharacterLoad::Failed { model, .. } => Some(model),
        }
    }

    /// Pending → Ready. В другом состоянии — игнор (устаревший результат после reload).
    pub fn resolve(&mut self) -> bool {
        let CharacterLoad::Pending { model, .. } = self else {
            return false;
        };
        let model = std::mem::take(model);
        logger::log_info(&format!("✅ Character `{}` ready", model));
        *self = CharacterLoad::Ready { model };
        true
    }

    /// Pending → Failed (логируется как error, без retry)
    pub fn fail(&mut self, error: LoadError) -> bool {
        let CharacterLoad::Pending { model, .. } = self else {
            return false;
        };
        let model = std::mem::take(model);
        logger::log_error(&format!("❌ Error loading character `{}`: {}", model, error));
        *self = CharacterLoad::Failed { model, error };
        true
    }

    /// Проверка timeout. Возвращает true если загрузка только что провалилась.
    pub fn check_timeout(&mut self, now: f32, timeout: Option<f32>) -> bool {
        let (CharacterLoad::Pending { started_at, .. }, Some(timeout)) = (&*self, timeout) else {
            return false;
        };
        if now - *started_at < timeout {
            return false;
        }
        self.fail(LoadError::TimedOut(timeout))
    }

    pub fn reset(&mut self) {
        *self = CharacterLoad::Idle;
    }
}

/// Spawn helper: Character + animator из загруженных данных
///
/// Отсутствующие клипы логируются как warning (анимация будет no-op),
/// персонаж всё равно спавнится.
pub fn spawn_character(
    commands: &mut Commands,
    loaded: &LoadedCharacter,
    settings: &ControllerSettings,
) -> Entity {
    let resolution = loaded.resolve_clips();
    for missing in &resolution.missing {
        logger::log_warning(&format!(
            "⚠️ Model `{}`: clip `{}` for {} not found, {} will not animate",
            loaded.model, missing.name, missing.clip, missing.clip
        ));
    }

    commands
        .spawn((
            Name::new(format!("Character({})", loaded.model)),
            Character {
                model: loaded.model.clone(),
            },
            Facing::default(),
            Transform::from_translation(Vec3::ZERO).with_scale(Vec3::splat(loaded.scale)),
            CharacterAnimator::from_settings(resolution.registry, settings),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config() -> ModelConfig {
        ModelConfig {
            model: "models/chicken.glb".to_string(),
            scale: 0.5,
            animations: BTreeMap::from([
                ("idle".to_string(), "anim/idle.glb".to_string()),
                ("walk".to_string(), "anim/walk.GLTF".to_string()),
            ]),
            idle_clip: "idle".to_string(),
            moving_clip: "walk".to_string(),
        }
    }

    #[test]
    fn test_model_format_check() {
        assert!(check_model_format("a/b/chicken.glb").is_ok());
        assert!(check_model_format("sheep.GLTF").is_ok());
        assert_eq!(
            check_model_format("Sheep_Animations.fbx"),
            Err(LoadError::UnsupportedFormat {
                path: "Sheep_Animations.fbx".to_string()
            })
        );
        assert!(check_model_format("no_extension").is_err());
    }

    #[test]
    fn test_model_config_checks_animation_paths() {
        assert!(check_model_config(&config()).is_ok());

        let mut bad = config();
        bad.animations.insert("run".to_string(), "anim/run.fbx".to_string());
        assert!(matches!(check_model_config(&bad), Err(LoadError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_load_state_transitions() {
        let mut load = CharacterLoad::default();
        assert!(!load.resolve()); // Idle → нечего резолвить

        load.begin("chicken", 0.0);
        assert!(load.is_pending());
        assert_eq!(load.model(), Some("chicken"));

        assert!(load.resolve());
        assert!(load.is_ready());
        assert!(!load.fail(LoadError::TimedOut(1.0))); // Ready не откатывается
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut load = CharacterLoad::default();
        load.begin("sheep", 0.0);
        assert!(load.fail(LoadError::Asset {
            path: "sheep.glb".to_string(),
            reason: "not found".to_string()
        }));

        assert!(!load.is_ready());
        assert!(!load.resolve());
        assert_eq!(load.model(), Some("sheep"));
    }

    #[test]
    fn test_timeout() {
        let mut load = CharacterLoad::default();
        load.begin("chicken", 10.0);

        assert!(!load.check_timeout(100.0, None)); // без timeout ждём вечно
        assert!(!load.check_timeout(12.0, Some(5.0)));
        assert!(load.check_timeout(15.0, Some(5.0)));
        assert_eq!(
            load,
            CharacterLoad::Failed {
                model: "chicken".to_string(),
                error: LoadError::TimedOut(5.0)
            }
        );
    }

    #[test]
    fn test_loaded_character_resolves_clips() {
        let loaded = LoadedCharacter::new(
            "chicken",
            &config(),
            vec![
                LoadedClip {
                    name: "idle".to_string(),
                    duration: 2.0,
                },
                LoadedClip {
                    name: "walk".to_string(),
                    duration: 1.0,
                },
            ],
        );

        let resolution = loaded.resolve_clips();
        assert!(resolution.missing.is_empty());
        assert_eq!(loaded.scale, 0.5);
    }
}
