//! Конфигурация: tuning контроллера + каталог моделей (models_config.json)
//!
//! Формат каталога:
//! ```json
//! {
//!   "controller": { "move_speed": 3.0 },
//!   "chicken": {
//!     "model": "models/chicken.glb",
//!     "scale": 0.5,
//!     "animations": { "idle": "animations/chicken_idle.glb", "walk": "animations/chicken_walk.glb" }
//!   }
//! }
//! ```
//! Секция `controller` опциональна, все остальные ключи — модели.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Tuning контроллера персонажа
///
/// Все значения читаются из секции `controller` каталога, отсутствующие поля
/// берутся из Default.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Скорость ходьбы (units/sec)
    pub move_speed: f32,
    /// Радианы yaw на пиксель горизонтального движения мыши
    pub turn_sensitivity: f32,
    /// Длительность crossfade между клипами (секунды)
    pub crossfade_secs: f32,
    /// Сохранять фазу шага при смене клипа (seed времени нового клипа)
    pub preserve_phase: bool,
    /// Доля расстояния до target, которую камера проходит за frame
    pub camera_smoothing: f32,
    /// Offset камеры за спиной персонажа (local space)
    pub back_offset: [f32; 3],
    /// Offset камеры перед персонажем (mirrored view)
    pub front_offset: [f32; 3],
    /// Камера смотрит на torso, а не на ноги
    pub look_lift: f32,
    /// Минимальный интервал обновления compass readout (ms)
    pub compass_interval_ms: u64,
    /// Timeout загрузки ассетов (None = ждём бесконечно)
    pub load_timeout_secs: Option<f32>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_sensitivity: 0.002,
            crossfade_secs: 0.2,
            preserve_phase: true,
            camera_smoothing: 0.1,
            back_offset: [0.0, 4.2, -4.5],
            front_offset: [0.0, 4.2, 4.5],
            look_lift: 1.0,
            compass_interval_ms: 100,
            load_timeout_secs: None,
        }
    }
}

impl ControllerSettings {
    pub fn back_offset(&self) -> Vec3 {
        Vec3::from_array(self.back_offset)
    }

    pub fn front_offset(&self) -> Vec3 {
        Vec3::from_array(self.front_offset)
    }
}

/// Описание одной модели в каталоге
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Путь к glTF контейнеру (относительно assets/)
    pub model: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Отдельные файлы анимаций: имя клипа → путь (берётся первый клип файла)
    #[serde(default)]
    pub animations: BTreeMap<String, String>,
    /// Имя клипа для Idle
    #[serde(default = "default_idle_clip")]
    pub idle_clip: String,
    /// Имя клипа для Moving
    #[serde(default = "default_moving_clip")]
    pub moving_clip: String,
}

fn default_scale() -> f32 {
    1.0
}

fn default_idle_clip() -> String {
    "idle".to_string()
}

fn default_moving_clip() -> String {
    "walk".to_string()
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read model catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model catalog contains no models")]
    Empty,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    controller: ControllerSettings,
    #[serde(flatten)]
    models: BTreeMap<String, ModelConfig>,
}

/// Каталог моделей + tuning контроллера
///
/// Static input: читается один раз при старте, не валидирует пути (это забота loader'а).
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    pub controller: ControllerSettings,
    models: BTreeMap<String, ModelConfig>,
}

impl ModelCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.models.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self {
            controller: file.controller,
            models: file.models,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Имена моделей в стабильном (алфавитном) порядке
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Следующая модель после `current` (по кругу)
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let names: Vec<&str> = self.names().collect();
        let next = match names.iter().position(|name| *name == current) {
            Some(index) => (index + 1) % names.len(),
            None => 0,
        };
        names.get(next).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "chicken": {
            "model": "models/chicken.glb",
            "scale": 0.5,
            "animations": { "idle": "anim/idle.glb", "walk": "anim/walk.glb" }
        },
        "sheep": {
            "model": "models/sheep.glb",
            "scale": 0.02,
            "idle_clip": "Idle_A",
            "moving_clip": "Roll"
        }
    }"#;

    #[test]
    fn test_catalog_parses_models_with_defaults() {
        let catalog = ModelCatalog::from_json_str(CATALOG).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.controller, ControllerSettings::default());

        let chicken = catalog.get("chicken").unwrap();
        assert_eq!(chicken.scale, 0.5);
        assert_eq!(chicken.idle_clip, "idle");
        assert_eq!(chicken.moving_clip, "walk");
        assert_eq!(chicken.animations.len(), 2);

        let sheep = catalog.get("sheep").unwrap();
        assert!(sheep.animations.is_empty());
        assert_eq!(sheep.moving_clip, "Roll");
    }

    #[test]
    fn test_controller_section_overrides_defaults() {
        let json = r#"{
            "controller": { "move_speed": 5.0, "preserve_phase": false },
            "chicken": { "model": "chicken.glb" }
        }"#;
        let catalog = ModelCatalog::from_json_str(json).unwrap();

        assert_eq!(catalog.controller.move_speed, 5.0);
        assert!(!catalog.controller.preserve_phase);
        // Не указанные поля — из Default
        assert_eq!(catalog.controller.crossfade_secs, 0.2);
        assert_eq!(catalog.get("chicken").unwrap().scale, 1.0);
        assert!(catalog.get("controller").is_none());
    }

    #[test]
    fn test_empty_catalog_is_error() {
        let err = ModelCatalog::from_json_str("{}").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_malformed_catalog_is_parse_error() {
        let err = ModelCatalog::from_json_str("{ \"chicken\": 42 }").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ModelCatalog::load("/definitely/not/here/models_config.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_next_after_cycles() {
        let catalog = ModelCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.next_after("chicken"), Some("sheep"));
        assert_eq!(catalog.next_after("sheep"), Some("chicken"));
        assert_eq!(catalog.next_after("cow"), Some("chicken"));
    }
}
