use std::path::PathBuf;

use bevy::prelude::*;
use meadow_simulation::{log_error, log_info, ControllerSettings, ModelCatalog, SimulationPlugin};

mod animation;
mod camera;
mod character;
mod environment;
mod hud;
mod input;
mod logger;

use animation::AnimationSyncPlugin;
use camera::CameraPlugin;
use character::{CharacterAssetsPlugin, ModelSelection};
use environment::EnvironmentPlugin;
use hud::HudPlugin;
use input::InputBridgePlugin;

const CATALOG_FILE: &str = "models_config.json";

fn main() {
    logger::install();

    // Каталог моделей + controller settings (ошибка не фатальна: сцена без персонажа)
    let catalog = match ModelCatalog::load(asset_root().join(CATALOG_FILE)) {
        Ok(catalog) => {
            log_info(&format!("📚 Model catalog: {} model(s)", catalog.len()));
            Some(catalog)
        }
        Err(err) => {
            log_error(&format!("❌ Error loading model catalog: {}", err));
            None
        }
    };

    // Первый аргумент — имя модели
    let selection = std::env::args()
        .nth(1)
        .map(|model| ModelSelection { model })
        .unwrap_or_default();

    let settings = catalog
        .as_ref()
        .map(|catalog| catalog.controller.clone())
        .unwrap_or_else(ControllerSettings::default);

    let mut app = App::new();
    app
        // Bevy defaults (rendering, input, time, assets, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "MEADOW - Character Controller".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Settings до SimulationPlugin (plugin читает их в build)
        .insert_resource(settings)
        .insert_resource(selection)
        // Simulation (headless controller logic)
        .add_plugins(SimulationPlugin)
        .add_plugins((
            EnvironmentPlugin,
            CharacterAssetsPlugin,
            AnimationSyncPlugin,
            InputBridgePlugin,
            CameraPlugin,
            HudPlugin,
        ));

    if let Some(catalog) = catalog {
        app.insert_resource(catalog);
    }

    app.run();
}

/// Та же папка, что использует AssetPlugin по умолчанию
fn asset_root() -> PathBuf {
    let base = std::env::var_os("BEVY_ASSET_ROOT")
        .or_else(|| std::env::var_os("CARGO_MANIFEST_DIR"))
        .map(PathBuf::from)
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(PathBuf::from))
        })
        .unwrap_or_default();
    base.join("assets")
}
