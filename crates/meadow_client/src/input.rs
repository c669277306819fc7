//! Device input → simulation input resources
//!
//! Keyboard → InputState, pointer lock → PointerCapture, MouseMotion → PointerMotion.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};
use meadow_simulation::{ControllerSet, InputState, MoveKey, PointerCapture, PointerMotion};

/// Клавиши движения (WASD + стрелки)
const MOVE_BINDINGS: [(KeyCode, MoveKey); 8] = [
    (KeyCode::KeyW, MoveKey::Forward),
    (KeyCode::ArrowUp, MoveKey::Forward),
    (KeyCode::KeyS, MoveKey::Backward),
    (KeyCode::ArrowDown, MoveKey::Backward),
    (KeyCode::KeyA, MoveKey::Left),
    (KeyCode::ArrowLeft, MoveKey::Left),
    (KeyCode::KeyD, MoveKey::Right),
    (KeyCode::ArrowRight, MoveKey::Right),
];

pub struct InputBridgePlugin;

impl Plugin for InputBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                read_movement_keys,
                grab_pointer,
                release_pointer_on_focus_lost,
                sync_pointer_capture,
                forward_pointer_motion,
            )
                .chain()
                .before(ControllerSet::Mixer),
        );
    }
}

fn read_movement_keys(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<InputState>) {
    let mut next = InputState::default();
    for (code, key) in MOVE_BINDINGS {
        if keys.pressed(code) {
            next.press(key);
        }
    }
    input.set_if_neq(next);
}

/// Click → lock, Escape → release
fn grab_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
    if keys.just_pressed(KeyCode::Escape) {
        release(&mut window);
    }
}

/// Потеря фокуса: отпускаем курсор и все клавиши (key-up в другое окно не придёт)
fn release_pointer_on_focus_lost(
    mut focus_events: EventReader<WindowFocused>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut input: ResMut<InputState>,
) {
    for event in focus_events.read() {
        if event.focused {
            continue;
        }
        if let Ok(mut window) = windows.get_mut(event.window) {
            release(&mut window);
        }
        input.clear();
    }
}

fn release(window: &mut Window) {
    window.cursor_options.grab_mode = CursorGrabMode::None;
    window.cursor_options.visible = true;
}

fn sync_pointer_capture(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut capture: ResMut<PointerCapture>,
) {
    let captured = windows
        .single()
        .map(|window| window.cursor_options.grab_mode != CursorGrabMode::None)
        .unwrap_or(false);

    if capture.is_captured() != captured {
        capture.set_captured(captured);
    }
}

fn forward_pointer_motion(
    mut motions: EventReader<MouseMotion>,
    mut pointer: EventWriter<PointerMotion>,
) {
    for motion in motions.read() {
        pointer.write(PointerMotion {
            delta_x: motion.delta.x,
        });
    }
}
