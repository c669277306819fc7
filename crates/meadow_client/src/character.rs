//! Character loading: glTF container + отдельные animation files → Character entity
//!
//! Flow:
//! 1. `begin_load` — валидация config, AssetServer::load для всех файлов
//! 2. `poll_character_load` — ждём recursive load state каждого handle
//! 3. Всё загружено → собираем клипы, AnimationGraph, spawn SceneRoot + Character
//!
//! R — reload текущей модели, M — следующая модель из каталога.

use std::collections::HashMap;

use bevy::asset::RecursiveDependencyLoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use meadow_simulation::loading::{check_model_config, spawn_character};
use meadow_simulation::{
    log_info, Character, CharacterLoad, CompassReadout, ControllerSet, ControllerSettings,
    InputState, LoadError, LoadedCharacter, LoadedClip, ModelCatalog, ModelConfig,
};

use crate::animation::CharacterGraph;

pub const DEFAULT_MODEL: &str = "chicken";

/// Какую модель из каталога показываем
#[derive(Resource, Debug, Clone)]
pub struct ModelSelection {
    pub model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Загрузка в процессе (resource живёт только пока ждём assets)
#[derive(Resource)]
struct PendingCharacter {
    model: String,
    config: ModelConfig,
    container: Handle<Gltf>,
    /// (имя клипа из config, путь, handle)
    animation_files: Vec<(String, String, Handle<Gltf>)>,
}

impl PendingCharacter {
    fn handles(&self) -> impl Iterator<Item = (&str, &Handle<Gltf>)> {
        std::iter::once((self.config.model.as_str(), &self.container)).chain(
            self.animation_files
                .iter()
                .map(|(_, path, handle)| (path.as_str(), handle)),
        )
    }
}

pub struct CharacterAssetsPlugin;

impl Plugin for CharacterAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelSelection>()
            .add_systems(Startup, start_initial_load)
            .add_systems(
                Update,
                (
                    handle_scene_hotkeys,
                    poll_character_load.run_if(resource_exists::<PendingCharacter>),
                )
                    .chain()
                    .before(ControllerSet::Mixer),
            );
    }
}

fn start_initial_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    catalog: Option<Res<ModelCatalog>>,
    selection: Res<ModelSelection>,
    mut load: ResMut<CharacterLoad>,
    time: Res<Time>,
) {
    let Some(catalog) = catalog else {
        // Каталог не прочитан (ошибка уже залогирована) → сцена без персонажа
        return;
    };
    begin_load(
        &mut commands,
        &asset_server,
        &catalog,
        &selection.model,
        &mut load,
        time.elapsed_secs(),
    );
}

fn begin_load(
    commands: &mut Commands,
    asset_server: &AssetServer,
    catalog: &ModelCatalog,
    model: &str,
    load: &mut CharacterLoad,
    now: f32,
) {
    load.begin(model, now);

    let Some(config) = catalog.get(model) else {
        load.fail(LoadError::UnknownModel(model.to_string()));
        return;
    };
    if let Err(err) = check_model_config(config) {
        load.fail(err);
        return;
    }

    let container = asset_server.load::<Gltf>(config.model.clone());
    let animation_files = config
        .animations
        .iter()
        .map(|(name, path)| (name.clone(), path.clone(), asset_server.load::<Gltf>(path.clone())))
        .collect();

    commands.insert_resource(PendingCharacter {
        model: model.to_string(),
        config: config.clone(),
        container,
        animation_files,
    });
}

#[allow(clippy::too_many_arguments)]
fn poll_character_load(
    mut commands: Commands,
    pending: Res<PendingCharacter>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    clips: Res<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut load: ResMut<CharacterLoad>,
    settings: Res<ControllerSettings>,
    time: Res<Time>,
) {
    if !load.is_pending() {
        commands.remove_resource::<PendingCharacter>();
        return;
    }
    if load.check_timeout(time.elapsed_secs(), settings.load_timeout_secs) {
        commands.remove_resource::<PendingCharacter>();
        return;
    }

    for (path, handle) in pending.handles() {
        match asset_server.get_recursive_dependency_load_state(handle.id()) {
            Some(RecursiveDependencyLoadState::Loaded) => {}
            Some(RecursiveDependencyLoadState::Failed(err)) => {
                load.fail(LoadError::Asset {
                    path: path.to_string(),
                    reason: err.to_string(),
                });
                commands.remove_resource::<PendingCharacter>();
                return;
            }
            // Ещё грузится
            _ => return,
        }
    }

    match assemble_character(&pending, &gltfs, &clips) {
        Ok((loaded, scene, clip_handles)) => {
            let graph = build_graph(&loaded, &clip_handles, &mut graphs);
            let entity = spawn_character(&mut commands, &loaded, &settings);
            commands.entity(entity).insert((SceneRoot(scene), graph));
            load.resolve();
        }
        Err(err) => {
            load.fail(err);
        }
    }
    commands.remove_resource::<PendingCharacter>();
}

type AssembledCharacter = (LoadedCharacter, Handle<Scene>, HashMap<String, Handle<AnimationClip>>);

/// Клипы: named_animations контейнера + первый клип каждого animation file
/// (ключ — имя из config, имя внутри файла игнорируется)
fn assemble_character(
    pending: &PendingCharacter,
    gltfs: &Assets<Gltf>,
    clips: &Assets<AnimationClip>,
) -> Result<AssembledCharacter, LoadError> {
    let container = gltfs.get(&pending.container).ok_or_else(|| LoadError::Asset {
        path: pending.config.model.clone(),
        reason: "container not in asset storage".to_string(),
    })?;

    let scene = container
        .default_scene
        .clone()
        .or_else(|| container.scenes.first().cloned())
        .ok_or_else(|| LoadError::Asset {
            path: pending.config.model.clone(),
            reason: "container has no scenes".to_string(),
        })?;

    let mut handles: HashMap<String, Handle<AnimationClip>> = container
        .named_animations
        .iter()
        .map(|(name, handle)| (name.to_string(), handle.clone()))
        .collect();

    for (name, path, handle) in &pending.animation_files {
        let first = gltfs
            .get(handle)
            .and_then(|gltf| gltf.animations.first())
            .ok_or_else(|| LoadError::EmptyAnimation { path: path.clone() })?;
        handles.insert(name.clone(), first.clone());
    }

    let loaded_clips = handles
        .iter()
        .map(|(name, handle)| LoadedClip {
            name: name.clone(),
            duration: clips.get(handle).map_or(0.0, AnimationClip::duration),
        })
        .collect();

    log_info(&format!(
        "🎞️ Model `{}`: {} clip(s) available",
        pending.model,
        handles.len()
    ));

    Ok((
        LoadedCharacter::new(pending.model.clone(), &pending.config, loaded_clips),
        scene,
        handles,
    ))
}

/// AnimationGraph: по одному node на каждый разрешённый MotionClip
fn build_graph(
    loaded: &LoadedCharacter,
    clip_handles: &HashMap<String, Handle<AnimationClip>>,
    graphs: &mut Assets<AnimationGraph>,
) -> CharacterGraph {
    let registry = loaded.resolve_clips().registry;
    let mut graph = AnimationGraph::new();
    let mut nodes = HashMap::new();

    for (clip, slot) in registry.iter() {
        if let Some(handle) = clip_handles.get(&slot.name) {
            let node = graph.add_clip(handle.clone(), 1.0, graph.root);
            nodes.insert(clip, node);
        }
    }

    CharacterGraph {
        graph: graphs.add(graph),
        nodes,
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_scene_hotkeys(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    characters: Query<Entity, With<Character>>,
    asset_server: Res<AssetServer>,
    catalog: Option<Res<ModelCatalog>>,
    mut selection: ResMut<ModelSelection>,
    mut load: ResMut<CharacterLoad>,
    mut input: ResMut<InputState>,
    mut readout: ResMut<CompassReadout>,
    time: Res<Time>,
) {
    let next_model = keys.just_pressed(KeyCode::KeyM);
    if !(next_model || keys.just_pressed(KeyCode::KeyR)) {
        return;
    }
    let Some(catalog) = catalog else {
        return;
    };

    if next_model {
        if let Some(next) = catalog.next_after(&selection.model) {
            selection.model = next.to_string();
        }
    }

    for entity in &characters {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<PendingCharacter>();
    input.clear();
    readout.reset();
    load.reset();

    log_info(&format!("🔄 Reloading scene with model `{}`", selection.model));
    begin_load(
        &mut commands,
        &asset_server,
        &catalog,
        &selection.model,
        &mut load,
        time.elapsed_secs(),
    );
}
