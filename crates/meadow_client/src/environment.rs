use bevy::pbr::{DirectionalLightShadowMap, NotShadowCaster};
use bevy::prelude::*;
use meadow_simulation::grass::scatter_blades;
use meadow_simulation::{log, DeterministicRng, GrassFieldConfig};

/// Static dressing: небо, земля, трава, свет
pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(0x87, 0xce, 0xeb)))
            .insert_resource(DirectionalLightShadowMap { size: 1024 })
            .add_systems(Startup, (setup_lights, setup_grass_field));
    }
}

/// Ground plane + травинки
///
/// Все травинки делят один mesh и один material → Bevy batch'ит их в instanced draw.
fn setup_grass_field(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    field: Res<GrassFieldConfig>,
    mut rng: ResMut<DeterministicRng>,
) {
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(field.plane_size * 0.5)))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x2d, 0x55, 0x18),
            perceptual_roughness: 1.0,
            reflectance: 0.0,
            ..default()
        })),
        Transform::default(),
    ));

    let blade_mesh = meshes.add(Rectangle::new(field.blade_width, field.blade_height));
    let blade_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x33, 0xaa, 0x33),
        perceptual_roughness: 1.0,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let blades = scatter_blades(&mut rng.rng, &field);
    log(&format!("🌱 Grass field: {} blades (seed {})", blades.len(), rng.seed));

    commands.spawn_batch(blades.into_iter().map(move |blade| {
        (
            Mesh3d(blade_mesh.clone()),
            MeshMaterial3d(blade_material.clone()),
            blade.transform(),
            NotShadowCaster,
        )
    }));
}

fn setup_lights(mut commands: Commands) {
    // Ambient light
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        affects_lightmapped_meshes: false,
    });

    // Directional light (sun)
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 8.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
