//! Compass heading: 8 секторов по heading vector персонажа
//!
//! # Convention
//! - Heading = local -Z, повёрнутый на yaw, в плоскости XZ
//! - North = -Z, South = +Z, East = +X, West = -X
//! - Yaw 0 → "N"
//!
//! # Tie rule
//! Порог T = sin(22.5°). Ось "активна" только при строгом `> T` / `< -T`.
//! Компонента ровно на пороге считается неактивной (→ cardinal).
//! Ровно 45° всегда даёт диагональ (обе компоненты ≈ 0.707 > T).

use std::fmt;
use std::time::Duration;

use bevy::prelude::*;

use crate::components::{Character, Facing};
use crate::config::ControllerSettings;

/// sin(22.5°): граница между cardinal и diagonal секторами
pub const SECTOR_THRESHOLD: f32 = 0.382_683_43;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum CompassReading {
    #[default]
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassReading {
    pub const ALL: [CompassReading; 8] = [
        CompassReading::N,
        CompassReading::NE,
        CompassReading::E,
        CompassReading::SE,
        CompassReading::S,
        CompassReading::SW,
        CompassReading::W,
        CompassReading::NW,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompassReading::N => "N",
            CompassReading::NE => "NE",
            CompassReading::E => "E",
            CompassReading::SE => "SE",
            CompassReading::S => "S",
            CompassReading::SW => "SW",
            CompassReading::W => "W",
            CompassReading::NW => "NW",
        }
    }
}

impl fmt::Display for CompassReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Классификация heading vector (Y игнорируется)
pub fn classify(heading: Vec3) -> CompassReading {
    let north_south = if heading.z > SECTOR_THRESHOLD {
        Some(false) // South
    } else if heading.z < -SECTOR_THRESHOLD {
        Some(true) // North
    } else {
        None
    };

    let east_west = if heading.x > SECTOR_THRESHOLD {
        Some(true) // East
    } else if heading.x < -SECTOR_THRESHOLD {
        Some(false) // West
    } else {
        None
    };

    match (north_south, east_west) {
        (Some(true), None) => CompassReading::N,
        (Some(false), None) => CompassReading::S,
        (None, Some(true)) => CompassReading::E,
        (None, Some(false)) => CompassReading::W,
        (Some(true), Some(true)) => CompassReading::NE,
        (Some(true), Some(false)) => CompassReading::NW,
        (Some(false), Some(true)) => CompassReading::SE,
        (Some(false), Some(false)) => CompassReading::SW,
        // Только для вырожденных (коротких) векторов: квадрант по знакам
        (None, None) => match (heading.z > 0.0, heading.x > 0.0) {
            (true, true) => CompassReading::SE,
            (true, false) => CompassReading::SW,
            (false, true) => CompassReading::NE,
            (false, false) => CompassReading::NW,
        },
    }
}

/// Heading для yaw (радианы)
pub fn reading_for_yaw(yaw: f32) -> CompassReading {
    classify(Facing::new(yaw).heading())
}

/// Текст readout ("Direction: N")
pub fn readout_text(reading: CompassReading) -> String {
    format!("Direction: {}", reading)
}

/// Throttled compass readout
///
/// Пересчитывается не чаще interval, чтобы не дёргать HUD каждый frame.
/// HUD перерисовывается только когда reading реально изменился.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CompassReadout {
    reading: CompassReading,
    interval: Duration,
    last_refresh: Option<Duration>,
}

impl Default for CompassReadout {
    fn default() -> Self {
        Self::new(Duration::from_millis(ControllerSettings::default().compass_interval_ms))
    }
}

impl CompassReadout {
    pub fn new(interval: Duration) -> Self {
        Self {
            reading: CompassReading::N,
            interval,
            last_refresh: None,
        }
    }

    pub fn reading(&self) -> CompassReading {
        self.reading
    }

    pub fn text(&self) -> String {
        readout_text(self.reading)
    }

    /// Готов ли readout к обновлению в момент `now`
    pub fn is_due(&self, now: Duration) -> bool {
        match self.last_refresh {
            Some(last) => now.saturating_sub(last) >= self.interval,
            None => true,
        }
    }

    /// Попытка обновления. Возвращает true если reading изменился.
    pub fn refresh(&mut self, now: Duration, reading: CompassReading) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_refresh = Some(now);

        if self.reading == reading {
            return false;
        }
        self.reading = reading;
        true
    }

    /// Сброс к "N" (reload сцены)
    pub fn reset(&mut self) {
        self.reading = CompassReading::N;
        self.last_refresh = None;
    }
}

/// Система: heading персонажа → CompassReadout
///
/// ResMut трогаем только при реальном изменении (HUD слушает resource_changed).
pub fn update_compass(
    time: Res<Time>,
    characters: Query<&Facing, With<Character>>,
    mut readout: ResMut<CompassReadout>,
) {
    let Ok(facing) = characters.single() else {
        return;
    };

    let reading = classify(facing.heading());
    if readout.bypass_change_detection().refresh(time.elapsed(), reading) {
        readout.set_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_every_degree_gets_exactly_one_label() {
        let mut counts: HashMap<CompassReading, usize> = HashMap::new();

        for degree in 0..360 {
            let reading = reading_for_yaw((degree as f32).to_radians());
            *counts.entry(reading).or_default() += 1;
        }

        // Каждый сектор шириной 45° → 45 целых градусов
        assert_eq!(counts.len(), 8);
        for reading in CompassReading::ALL {
            assert_eq!(counts.get(&reading), Some(&45), "sector {}", reading);
        }
    }

    #[test]
    fn test_sector_boundaries_by_yaw() {
        // Yaw растёт против часовой (вид сверху): N → NW → W → SW → S → ...
        let expected = [
            (0, CompassReading::N),
            (22, CompassReading::N),
            (23, CompassReading::NW),
            (45, CompassReading::NW),
            (67, CompassReading::NW),
            (68, CompassReading::W),
            (90, CompassReading::W),
            (135, CompassReading::SW),
            (180, CompassReading::S),
            (225, CompassReading::SE),
            (270, CompassReading::E),
            (315, CompassReading::NE),
            (338, CompassReading::N),
        ];

        for (degree, reading) in expected {
            assert_eq!(
                reading_for_yaw((degree as f32).to_radians()),
                reading,
                "yaw {}°",
                degree
            );
        }
    }

    #[test]
    fn test_exact_diagonals_are_stable() {
        let d = std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(classify(Vec3::new(d, 0.0, -d)), CompassReading::NE);
        assert_eq!(classify(Vec3::new(-d, 0.0, -d)), CompassReading::NW);
        assert_eq!(classify(Vec3::new(d, 0.0, d)), CompassReading::SE);
        assert_eq!(classify(Vec3::new(-d, 0.0, d)), CompassReading::SW);
    }

    #[test]
    fn test_component_on_threshold_is_cardinal() {
        // x ровно на пороге → East/West не активна
        let heading = Vec3::new(SECTOR_THRESHOLD, 0.0, -0.9);
        assert_eq!(classify(heading), CompassReading::N);
    }

    #[test]
    fn test_degenerate_vector_falls_back_to_quadrant() {
        assert_eq!(classify(Vec3::new(0.1, 0.0, 0.1)), CompassReading::SE);
        assert_eq!(classify(Vec3::new(-0.1, 0.0, -0.1)), CompassReading::NW);
        assert_eq!(classify(Vec3::ZERO), CompassReading::NW);
    }

    #[test]
    fn test_readout_throttled() {
        let mut readout = CompassReadout::new(Duration::from_millis(100));
        assert_eq!(readout.text(), "Direction: N");

        assert!(readout.refresh(Duration::from_millis(0), CompassReading::E));
        assert_eq!(readout.reading(), CompassReading::E);

        // 50ms спустя — слишком рано
        assert!(!readout.refresh(Duration::from_millis(50), CompassReading::S));
        assert_eq!(readout.reading(), CompassReading::E);

        assert!(readout.refresh(Duration::from_millis(100), CompassReading::S));
        assert_eq!(readout.text(), "Direction: S");

        // Тот же reading — не изменение
        assert!(!readout.refresh(Duration::from_millis(300), CompassReading::S));
    }
}
