use bevy::prelude::*;
use meadow_simulation::{CompassReadout, ControllerSet};

/// Compass label (top-right)
#[derive(Component)]
struct CompassLabel;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_compass_label).add_systems(
            Update,
            refresh_compass_label
                .run_if(resource_changed::<CompassReadout>)
                .after(ControllerSet::Heading),
        );
    }
}

fn spawn_compass_label(mut commands: Commands, readout: Res<CompassReadout>) {
    commands.spawn((
        CompassLabel,
        Text::new(readout.text()),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            padding: UiRect::all(Val::Px(10.0)),
            ..default()
        },
        BackgroundColor(Color::srgb_u8(0x33, 0x33, 0x33)),
        BorderRadius::all(Val::Px(5.0)),
    ));
}

fn refresh_compass_label(
    readout: Res<CompassReadout>,
    mut labels: Query<&mut Text, With<CompassLabel>>,
) {
    for mut text in &mut labels {
        text.0 = readout.text();
    }
}
