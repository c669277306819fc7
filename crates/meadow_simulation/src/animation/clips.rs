//! Clip registry: закрытый набор MotionClip вместо свободных строк
//!
//! Имена клипов резолвятся ОДИН раз при загрузке модели.
//! Дальше весь код оперирует MotionClip, unknown-clip ловится на границе.

use std::fmt;

use bevy::prelude::*;

/// Логический клип персонажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum MotionClip {
    Idle,
    Moving,
}

impl MotionClip {
    pub const ALL: [MotionClip; 2] = [MotionClip::Idle, MotionClip::Moving];

    /// Клип для текущего locomotion state
    pub fn for_motion(is_moving: bool) -> Self {
        if is_moving {
            MotionClip::Moving
        } else {
            MotionClip::Idle
        }
    }
}

impl fmt::Display for MotionClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionClip::Idle => f.write_str("Idle"),
            MotionClip::Moving => f.write_str("Moving"),
        }
    }
}

/// Загруженный клип: исходное имя + длительность (секунды)
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSlot {
    pub name: String,
    pub duration: f32,
}

impl ClipSlot {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Клип из конфига, которого нет среди загруженных
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingClip {
    pub clip: MotionClip,
    pub name: String,
}

/// Результат резолва имён: registry + что не нашлось
#[derive(Debug, Clone, PartialEq)]
pub struct ClipResolution {
    pub registry: ClipRegistry,
    pub missing: Vec<MissingClip>,
}

/// Validated registry: MotionClip → загруженный клип (или ничего)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipRegistry {
    idle: Option<ClipSlot>,
    moving: Option<ClipSlot>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, clip: MotionClip, slot: ClipSlot) -> Self {
        self.bind(clip, slot);
        self
    }

    pub fn bind(&mut self, clip: MotionClip, slot: ClipSlot) {
        *self.slot_mut(clip) = Some(slot);
    }

    pub fn get(&self, clip: MotionClip) -> Option<&ClipSlot> {
        match clip {
            MotionClip::Idle => self.idle.as_ref(),
            MotionClip::Moving => self.moving.as_ref(),
        }
    }

    pub fn contains(&self, clip: MotionClip) -> bool {
        self.get(clip).is_some()
    }

    /// Только привязанные клипы
    pub fn iter(&self) -> impl Iterator<Item = (MotionClip, &ClipSlot)> {
        MotionClip::ALL
            .into_iter()
            .filter_map(|clip| self.get(clip).map(|slot| (clip, slot)))
    }

    /// Резолв имён из конфига против загруженных клипов `(name, duration)`
    ///
    /// Совпадение по точному имени. Ненайденные клипы попадают в `missing`,
    /// запросы к ним позже станут no-op с warning.
    pub fn resolve<'a>(
        idle_name: &str,
        moving_name: &str,
        available: impl IntoIterator<Item = (&'a str, f32)>,
    ) -> ClipResolution {
        let available: Vec<(&str, f32)> = available.into_iter().collect();
        let mut registry = ClipRegistry::new();
        let mut missing = Vec::new();

        for (clip, wanted) in [(MotionClip::Idle, idle_name), (MotionClip::Moving, moving_name)] {
            match available.iter().find(|(name, _)| *name == wanted) {
                Some((name, duration)) => registry.bind(clip, ClipSlot::new(*name, *duration)),
                None => missing.push(MissingClip {
                    clip,
                    name: wanted.to_string(),
                }),
            }
        }

        ClipResolution { registry, missing }
    }

    fn slot_mut(&mut self, clip: MotionClip) -> &mut Option<ClipSlot> {
        match clip {
            MotionClip::Idle => &mut self.idle,
            MotionClip::Moving => &mut self.moving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_motion() {
        assert_eq!(MotionClip::for_motion(true), MotionClip::Moving);
        assert_eq!(MotionClip::for_motion(false), MotionClip::Idle);
    }

    #[test]
    fn test_resolve_binds_by_exact_name() {
        let resolution = ClipRegistry::resolve(
            "Idle_A",
            "Roll",
            [("Idle_A", 2.0), ("Roll", 1.25), ("Eat", 3.0)],
        );

        assert!(resolution.missing.is_empty());
        assert_eq!(resolution.registry.get(MotionClip::Idle), Some(&ClipSlot::new("Idle_A", 2.0)));
        assert_eq!(resolution.registry.get(MotionClip::Moving), Some(&ClipSlot::new("Roll", 1.25)));
    }

    #[test]
    fn test_resolve_reports_missing_clip() {
        let resolution = ClipRegistry::resolve("idle", "walk", [("idle", 1.0), ("Walk", 1.0)]);

        assert!(resolution.registry.contains(MotionClip::Idle));
        assert!(!resolution.registry.contains(MotionClip::Moving));
        assert_eq!(
            resolution.missing,
            vec![MissingClip {
                clip: MotionClip::Moving,
                name: "walk".to_string()
            }]
        );
    }

    #[test]
    fn test_iter_skips_unbound_clips() {
        let registry = ClipRegistry::new().with_clip(MotionClip::Moving, ClipSlot::new("walk", 0.8));
        let bound: Vec<_> = registry.iter().map(|(clip, slot)| (clip, slot.name.as_str())).collect();
        assert_eq!(bound, vec![(MotionClip::Moving, "walk")]);
    }
}
