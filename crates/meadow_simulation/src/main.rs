//! Headless симуляция MEADOW
//!
//! Запускает контроллер без рендера: персонаж с синтетическими клипами
//! идёт вперёд, поворачивается мышью, печатаем позицию/compass/камеру.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use meadow_simulation::loading::spawn_character;
use meadow_simulation::{
    create_headless_app, log_info, CameraRig, CharacterAnimator, CompassReadout, ControllerSettings,
    InputState, LoadedCharacter, LoadedClip, ModelConfig, PointerCapture, PointerMotion, SimulationPlugin,
};

fn main() {
    let seed = 42;
    log_info(&format!("Starting MEADOW headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / 60.0)));

    let config = ModelConfig {
        model: "models/chicken.glb".to_string(),
        scale: 1.0,
        animations: Default::default(),
        idle_clip: "idle".to_string(),
        moving_clip: "walk".to_string(),
    };
    let loaded = LoadedCharacter::new(
        "chicken",
        &config,
        vec![
            LoadedClip {
                name: "idle".to_string(),
                duration: 2.0,
            },
            LoadedClip {
                name: "walk".to_string(),
                duration: 0.8,
            },
        ],
    );

    let settings = app.world().resource::<ControllerSettings>().clone();
    let character = spawn_character(&mut app.world_mut().commands(), &loaded, &settings);
    app.world_mut().flush();

    app.world_mut().resource_mut::<InputState>().forward = true;

    for tick in 0..600 {
        // Вторая половина прогона: поворачиваем мышью
        if tick == 300 {
            app.world_mut().resource_mut::<PointerCapture>().set_captured(true);
        }
        if tick >= 300 {
            app.world_mut().send_event(PointerMotion { delta_x: 5.0 });
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let position = world.get::<Transform>(character).map(|t| t.translation);
            let clip = world.get::<CharacterAnimator>(character).and_then(|a| a.current());
            let compass = world.resource::<CompassReadout>().text();
            let camera = world
                .query_filtered::<&Transform, With<CameraRig>>()
                .iter(world)
                .next()
                .map(|t| t.translation);
            log_info(&format!(
                "Tick {}: position {:?}, clip {:?}, {}, camera {:?}",
                tick, position, clip, compass, camera
            ));
        }
    }

    log_info("Simulation complete!");
}
