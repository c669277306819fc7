//! Headless animation mixer: Idle ↔ Moving с crossfade
//!
//! Модель микшера (без skeleton/curves):
//! - Track = активный клип: local time + blend weight + target weight
//! - Crossfade: outgoing weight → 0, incoming weight → 1 за crossfade_secs
//! - Оба клипа loop бесконечно, во время overlap активны оба
//!
//! Клиент зеркалит решения микшера на Bevy AnimationPlayer
//! (AnimationTransitions + seek_to(start_time)).

use bevy::prelude::*;
use thiserror::Error;

use super::clips::{ClipRegistry, ClipSlot, MotionClip};
use crate::config::ControllerSettings;

/// Float drift при накоплении fade_step
const WEIGHT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// Для MotionClip нет загруженного клипа → переход не выполняется
    #[error("no loaded clip bound to {0}")]
    UnknownClip(MotionClip),
}

/// Один активный клип в микшере
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipTrack {
    pub clip: MotionClip,
    /// Local time клипа (секунды, всегда в [0, duration))
    pub time: f32,
    pub weight: f32,
    pub target_weight: f32,
}

impl ClipTrack {
    fn is_fading(&self) -> bool {
        self.weight != self.target_weight
    }
}

/// Описание начатого перехода
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipTransition {
    pub from: Option<MotionClip>,
    pub to: MotionClip,
    pub fade_secs: f32,
    /// Стартовое local time нового клипа (phase preservation)
    pub start_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestOutcome {
    Started(ClipTransition),
    /// Клип уже текущий — crossfade не перезапускается
    AlreadyPlaying,
}

/// Итог advance за frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Сколько раз текущий клип прошёл конец loop
    pub loops_completed: u32,
}

/// Animation State персонажа
///
/// Инвариант: не более одного current клипа, не более двух tracks
/// (current + outgoing во время crossfade).
#[derive(Component, Debug, Clone)]
pub struct CharacterAnimator {
    registry: ClipRegistry,
    current: Option<MotionClip>,
    /// Последний запрошенный state (даже если запрос отклонён)
    requested: Option<MotionClip>,
    tracks: Vec<ClipTrack>,
    transition: Option<ClipTransition>,
    crossfade_secs: f32,
    preserve_phase: bool,
}

impl CharacterAnimator {
    pub fn new(registry: ClipRegistry, crossfade_secs: f32, preserve_phase: bool) -> Self {
        Self {
            registry,
            current: None,
            requested: None,
            tracks: Vec::with_capacity(2),
            transition: None,
            crossfade_secs: crossfade_secs.max(0.0),
            preserve_phase,
        }
    }

    pub fn from_settings(registry: ClipRegistry, settings: &ControllerSettings) -> Self {
        Self::new(registry, settings.crossfade_secs, settings.preserve_phase)
    }

    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<MotionClip> {
        self.current
    }

    pub fn requested(&self) -> Option<MotionClip> {
        self.requested
    }

    pub fn current_slot(&self) -> Option<&ClipSlot> {
        self.current.and_then(|clip| self.registry.get(clip))
    }

    pub fn tracks(&self) -> &[ClipTrack] {
        &self.tracks
    }

    pub fn track(&self, clip: MotionClip) -> Option<&ClipTrack> {
        self.tracks.iter().find(|track| track.clip == clip)
    }

    pub fn weight(&self, clip: MotionClip) -> f32 {
        self.track(clip).map_or(0.0, |track| track.weight)
    }

    /// Переход, crossfade которого ещё не завершён
    pub fn active_transition(&self) -> Option<&ClipTransition> {
        self.transition.as_ref()
    }

    pub fn is_crossfading(&self) -> bool {
        self.tracks.iter().any(ClipTrack::is_fading)
    }

    /// Прогресс текущего клипа в [0, 1)
    pub fn progress(&self) -> Option<f32> {
        let clip = self.current?;
        let track = self.track(clip)?;
        let duration = self.registry.get(clip)?.duration;
        Some(progress_of(track.time, duration))
    }

    /// Запросить клип
    ///
    /// - уже текущий → `AlreadyPlaying` (no-op)
    /// - нет загруженного клипа → `Err(UnknownClip)`, current продолжает играть
    /// - иначе начинается crossfade
    pub fn request(&mut self, clip: MotionClip) -> Result<RequestOutcome, AnimationError> {
        self.requested = Some(clip);

        if self.current == Some(clip) {
            return Ok(RequestOutcome::AlreadyPlaying);
        }

        let incoming_duration = self
            .registry
            .get(clip)
            .map(|slot| slot.duration)
            .ok_or(AnimationError::UnknownClip(clip))?;

        let start_time = if self.preserve_phase {
            self.progress().unwrap_or(0.0) * incoming_duration.max(0.0)
        } else {
            0.0
        };

        // Быстрое переключение туда-обратно: клип ещё затухает → продолжаем с его веса
        let start_weight = self.weight(clip);

        // Оставляем только outgoing (старые затухающие tracks выбрасываем)
        let outgoing = self.current;
        self.tracks.retain(|track| Some(track.clip) == outgoing);
        for track in &mut self.tracks {
            track.target_weight = 0.0;
        }

        self.tracks.push(ClipTrack {
            clip,
            time: start_time,
            weight: start_weight,
            target_weight: 1.0,
        });

        if self.crossfade_secs == 0.0 {
            // Crossfade выключен — hard cut
            self.tracks.retain(|track| track.clip == clip);
            for track in &mut self.tracks {
                track.weight = 1.0;
            }
        }

        let transition = ClipTransition {
            from: outgoing,
            to: clip,
            fade_secs: self.crossfade_secs,
            start_time,
        };

        self.current = Some(clip);
        self.transition = if self.is_crossfading() {
            Some(transition)
        } else {
            None
        };

        Ok(RequestOutcome::Started(transition))
    }

    /// Продвинуть микшер на dt секунд
    pub fn advance(&mut self, dt: f32) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        if dt <= 0.0 {
            return report;
        }

        let fade_step = if self.crossfade_secs > 0.0 {
            dt / self.crossfade_secs
        } else {
            1.0
        };

        for track in &mut self.tracks {
            let duration = self.registry.get(track.clip).map_or(0.0, |slot| slot.duration);

            // Статичный клип (duration 0) — время не идёт
            if duration > 0.0 {
                let time = track.time + dt;
                let loops = (time / duration).floor();
                track.time = time - loops * duration;
                if Some(track.clip) == self.current {
                    report.loops_completed += loops as u32;
                }
            }

            track.weight = if track.weight < track.target_weight {
                (track.weight + fade_step).min(track.target_weight)
            } else {
                (track.weight - fade_step).max(track.target_weight)
            };
            if (track.weight - track.target_weight).abs() < WEIGHT_EPSILON {
                track.weight = track.target_weight;
            }
        }

        // Полностью затухшие outgoing tracks больше не активны
        self.tracks
            .retain(|track| !(track.target_weight == 0.0 && track.weight <= 0.0));

        if !self.is_crossfading() {
            self.transition = None;
        }

        report
    }

    /// Сброс (reload сцены)
    pub fn reset(&mut self) {
        self.current = None;
        self.requested = None;
        self.tracks.clear();
        self.transition = None;
    }
}

/// time / duration, для duration ≤ 0 прогресс = 0
pub fn progress_of(time: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        (time / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
