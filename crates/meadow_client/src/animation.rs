//! AnimationPlayer bridge
//!
//! CharacterAnimator (simulation) решает КАКОЙ клип играет и когда начинается crossfade.
//! Здесь только зеркалим это решение в Bevy AnimationPlayer + AnimationTransitions.

use std::collections::HashMap;
use std::time::Duration;

use bevy::animation::graph::AnimationNodeIndex;
use bevy::prelude::*;
use meadow_simulation::{Character, CharacterAnimator, ControllerSet, MotionClip};

/// AnimationGraph персонажа + node на каждый MotionClip
#[derive(Component)]
pub struct CharacterGraph {
    pub graph: Handle<AnimationGraph>,
    pub nodes: HashMap<MotionClip, AnimationNodeIndex>,
}

/// Entity с AnimationPlayer (где-то в иерархии glTF сцены)
#[derive(Component)]
pub struct AnimationPlayerLink(pub Entity);

/// Последний клип, отданный в AnimationPlayer
#[derive(Component, Default)]
struct AppliedClip(Option<MotionClip>);

pub struct AnimationSyncPlugin;

impl Plugin for AnimationSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (link_animation_players, sync_animation_players)
                .chain()
                .after(ControllerSet::Animation),
        );
    }
}

/// SceneRoot инстанцируется асинхронно → ловим появление AnimationPlayer
fn link_animation_players(
    mut commands: Commands,
    players: Query<Entity, Added<AnimationPlayer>>,
    parents: Query<&ChildOf>,
    characters: Query<&CharacterGraph, With<Character>>,
) {
    for player in &players {
        let Some((owner, graph)) = parents
            .iter_ancestors(player)
            .find_map(|ancestor| characters.get(ancestor).ok().map(|graph| (ancestor, graph)))
        else {
            continue;
        };

        commands.entity(player).insert((
            AnimationGraphHandle(graph.graph.clone()),
            AnimationTransitions::new(),
        ));
        commands
            .entity(owner)
            .insert((AnimationPlayerLink(player), AppliedClip::default()));
    }
}

/// animator.current изменился → crossfade в AnimationPlayer с той же фазой
fn sync_animation_players(
    mut characters: Query<(
        &CharacterAnimator,
        &CharacterGraph,
        &AnimationPlayerLink,
        &mut AppliedClip,
    )>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    for (animator, graph, link, mut applied) in &mut characters {
        let Some(clip) = animator.current() else {
            continue;
        };
        if applied.0 == Some(clip) {
            continue;
        }
        let Some(node) = graph.nodes.get(&clip) else {
            continue;
        };
        let Ok((mut player, mut transitions)) = players.get_mut(link.0) else {
            continue;
        };

        // Первый клип после spawn — без fade
        let fade = match (applied.0, animator.active_transition()) {
            (Some(_), Some(transition)) => transition.fade_secs,
            _ => 0.0,
        };
        let start_time = animator.track(clip).map_or(0.0, |track| track.time);

        transitions
            .play(&mut player, *node, Duration::from_secs_f32(fade.max(0.0)))
            .seek_to(start_time)
            .repeat();
        applied.0 = Some(clip);
    }
}
