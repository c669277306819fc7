//! Input state: movement keys + exclusive pointer capture
//!
//! # Архитектура
//!
//! ```text
//! Device events (client: ButtonInput<KeyCode>, MouseMotion, cursor grab)
//!     ↓
//! InputState / PointerCapture (resources) + PointerMotion (event)
//!     ↓
//! Locomotion systems (читают один раз за frame)
//! ```
//!
//! Симуляция не знает про конкретные клавиши — только логические MoveKey.

use bevy::prelude::*;

use crate::logger;

/// Логическая клавиша движения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveKey {
    pub const ALL: [MoveKey; 4] = [
        MoveKey::Forward,
        MoveKey::Backward,
        MoveKey::Left,
        MoveKey::Right,
    ];
}

/// Pressed/released состояние четырёх клавиш движения
///
/// Мутируется device callbacks, читается locomotion раз за frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, key: MoveKey, pressed: bool) {
        match key {
            MoveKey::Forward => self.forward = pressed,
            MoveKey::Backward => self.backward = pressed,
            MoveKey::Left => self.left = pressed,
            MoveKey::Right => self.right = pressed,
        }
    }

    pub fn press(&mut self, key: MoveKey) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.set(key, false);
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Forward => self.forward,
            MoveKey::Backward => self.backward,
            MoveKey::Left => self.left,
            MoveKey::Right => self.right,
        }
    }

    pub fn any_pressed(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Отпустить всё (потеря фокуса окна, reload сцены)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Exclusive pointer capture (pointer lock)
///
/// Вход: click по render surface. Выход: платформа (Escape, потеря фокуса).
/// Пока capture не активен — движение мыши игнорируется.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct PointerCapture {
    captured: bool,
}

impl PointerCapture {
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Capture-state-changed notification. Возвращает true если состояние изменилось.
    pub fn set_captured(&mut self, captured: bool) -> bool {
        if self.captured == captured {
            return false;
        }
        self.captured = captured;
        logger::log(&format!(
            "🖱️ Pointer capture {}",
            if captured { "engaged" } else { "released" }
        ));
        true
    }
}

/// Event: относительное движение мыши (пиксели)
///
/// Генерируется клиентом на каждый MouseMotion.
/// Обрабатывается apply_pointer_look (только при активном capture).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerMotion {
    pub delta_x: f32,
}
