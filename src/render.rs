use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;

use crate::components::*;
use crate::game_runtime::{PendingEffects, Session};
use crate::session::ENDING_CUBES;
use crate::snapshot::EffectKind;

const EFFECT_LIFETIME: f32 = 0.6;
const MAX_LIVE_EFFECTS: usize = 64;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
        })
        .add_systems(Startup, spawn_scene)
        .add_systems(
            Update,
            (
                sync_player,
                sync_hazards,
                sync_collectibles,
                sync_boss_scene,
                spawn_effects,
                animate_effects.run_if(crate::game_runtime::world_running),
                draw_wireframes,
            ),
        );
    }
}

#[derive(Resource)]
struct EffectAssets {
    mesh: Handle<Mesh>,
    materials: Vec<(EffectKind, Handle<StandardMaterial>)>,
}

impl EffectAssets {
    fn material(&self, kind: EffectKind) -> Option<Handle<StandardMaterial>> {
        self.materials
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, h)| h.clone())
    }
}

fn effect_color(kind: EffectKind) -> Color {
    match kind {
        EffectKind::Dagger => Color::srgb(0.85, 0.85, 0.95),
        EffectKind::SonicWave => Color::srgb(0.3, 0.8, 1.0),
        EffectKind::PlayerHeal | EffectKind::BossHeal => Color::srgb(0.3, 1.0, 0.4),
        EffectKind::Laser => Color::srgb(1.0, 0.15, 0.1),
        EffectKind::Missile => Color::srgb(1.0, 0.55, 0.1),
        EffectKind::TeleportSwirl => Color::srgb(0.7, 0.3, 1.0),
        EffectKind::Sparkle => Color::srgb(1.0, 0.9, 0.2),
        EffectKind::DamageFlash => Color::srgb(1.0, 0.0, 0.0),
    }
}

fn spawn_scene(
    mut commands: Commands,
    headless: Res<HeadlessMode>,
    session: Res<Session>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if headless.0 {
        return;
    }
    let session = &session.0;
    let tuning = session.tuning();

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 30.0, 15.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let ground_extent = tuning.movement.ground_half_extent * 2.0;
    let ground_top = tuning.movement.ground_height - tuning.movement.player_half_height;
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(ground_extent, 0.2, ground_extent))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.65, 0.3))),
        Transform::from_xyz(0.0, ground_top - 0.1, 0.0),
        PlatformVisual,
    ));

    let platform_material = materials.add(Color::srgb(0.55, 0.4, 0.25));
    for platform in &session.level.platforms {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(
                platform.size.x,
                platform.thickness,
                platform.size.y,
            ))),
            MeshMaterial3d(platform_material.clone()),
            Transform::from_translation(platform.center),
            PlatformVisual,
        ));
    }

    let spike_mesh = meshes.add(Cone {
        radius: 0.4,
        height: 0.8,
    });
    let turtle_mesh = meshes.add(Sphere::new(0.4));
    let spike_material = materials.add(Color::srgb(0.6, 0.6, 0.65));
    let turtle_material = materials.add(Color::srgb(0.2, 0.55, 0.2));
    for (i, hazard) in session.level.hazards.iter().enumerate() {
        let (mesh, material) = match hazard.kind {
            HazardKind::Spike => (spike_mesh.clone(), spike_material.clone()),
            HazardKind::Enemy(_) => (turtle_mesh.clone(), turtle_material.clone()),
        };
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(hazard.position),
            HazardVisual(i),
        ));
    }

    let star_mesh = meshes.add(Sphere::new(0.3));
    let star_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.85, 0.1),
        emissive: LinearRgba::rgb(1.0, 0.8, 0.1),
        ..default()
    });
    let power_up_mesh = meshes.add(Cuboid::new(0.5, 0.5, 0.5));
    let power_up_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.2, 0.9),
        emissive: LinearRgba::rgb(0.8, 0.1, 0.8),
        ..default()
    });
    for (i, collectible) in session.level.collectibles.iter().enumerate() {
        let (mesh, material) = match collectible.kind {
            CollectibleKind::Star => (star_mesh.clone(), star_material.clone()),
            CollectibleKind::PowerUp => (power_up_mesh.clone(), power_up_material.clone()),
        };
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(collectible.position),
            CollectibleVisual(i),
        ));
    }

    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(0.3, 0.4))),
        MeshMaterial3d(materials.add(Color::srgb(0.95, 0.45, 0.6))),
        Transform::from_translation(session.player.position),
        PlayerVisual,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(2.5, 2.5, 2.5))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.05, 0.3))),
        Transform::from_translation(tuning.boss.boss_spawn()),
        Visibility::Hidden,
        BossVisual,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(30.0, 0.5, 20.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.4))),
        Transform::from_translation(tuning.boss.arena() - Vec3::new(0.0, 1.0, 0.0)),
        Visibility::Hidden,
        ArenaVisual,
    ));

    let cube_mesh = meshes.add(Cuboid::new(0.8, 0.8, 0.8));
    let cube_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.8, 0.2),
        emissive: LinearRgba::rgb(1.0, 0.6, 0.1),
        ..default()
    });
    for i in 0..ENDING_CUBES {
        commands.spawn((
            Mesh3d(cube_mesh.clone()),
            MeshMaterial3d(cube_material.clone()),
            Transform::default(),
            Visibility::Hidden,
            EndingCubeVisual(i),
        ));
    }

    let kinds = [
        EffectKind::Dagger,
        EffectKind::SonicWave,
        EffectKind::PlayerHeal,
        EffectKind::Laser,
        EffectKind::Missile,
        EffectKind::BossHeal,
        EffectKind::TeleportSwirl,
        EffectKind::Sparkle,
        EffectKind::DamageFlash,
    ];
    commands.insert_resource(EffectAssets {
        mesh: meshes.add(Sphere::new(0.15)),
        materials: kinds
            .into_iter()
            .map(|kind| (kind, materials.add(effect_color(kind))))
            .collect(),
    });
}

fn sync_player(session: Res<Session>, mut query: Query<&mut Transform, With<PlayerVisual>>) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    let frame = session.0.render_frame();
    transform.translation = frame.player_position;
    // shrink through the teleport swirl
    let form = if frame.battle_form { 1.3 } else { 1.0 };
    transform.scale = Vec3::splat(frame.player_scale * form * (1.0 - frame.teleport_fade).max(0.05));
    transform.rotation = if frame.flying {
        Quat::from_rotation_x(-0.4)
    } else {
        Quat::IDENTITY
    };
}

fn sync_hazards(session: Res<Session>, mut query: Query<(&HazardVisual, &mut Transform)>) {
    let level = &session.0.level;
    for (visual, mut transform) in query.iter_mut() {
        if let Some(hazard) = level.hazards.get(visual.0) {
            transform.translation = hazard.position;
        }
    }
}

fn sync_collectibles(
    time: Res<Time>,
    session: Res<Session>,
    mut query: Query<(&CollectibleVisual, &mut Transform, &mut Visibility)>,
) {
    let level = &session.0.level;
    for (visual, mut transform, mut visibility) in query.iter_mut() {
        let Some(collectible) = level.collectibles.get(visual.0) else {
            continue;
        };
        *visibility = if collectible.collected {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        transform.rotation = Quat::from_rotation_y(time.elapsed_secs() * 2.0);
    }
}

fn sync_boss_scene(
    session: Res<Session>,
    mut boss: Query<&mut Visibility, (With<BossVisual>, Without<ArenaVisual>, Without<EndingCubeVisual>)>,
    mut arena: Query<&mut Visibility, (With<ArenaVisual>, Without<BossVisual>, Without<EndingCubeVisual>)>,
    mut cubes: Query<(&EndingCubeVisual, &mut Transform, &mut Visibility), (Without<BossVisual>, Without<ArenaVisual>)>,
) {
    let frame = session.0.render_frame();
    let shown = |on: bool| if on { Visibility::Inherited } else { Visibility::Hidden };

    if let Ok(mut visibility) = boss.get_single_mut() {
        *visibility = shown(frame.boss_position.is_some());
    }
    if let Ok(mut visibility) = arena.get_single_mut() {
        *visibility = shown(frame.arena_center.is_some());
    }
    for (cube, mut transform, mut visibility) in cubes.iter_mut() {
        match frame.ending_cubes.get(cube.0) {
            Some(position) => {
                transform.translation = *position;
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

fn spawn_effects(
    mut commands: Commands,
    mut pending: ResMut<PendingEffects>,
    session: Res<Session>,
    assets: Option<Res<EffectAssets>>,
    live: Query<(), With<EffectVisual>>,
) {
    let drained: Vec<EffectKind> = pending.0.drain(..).collect();
    let Some(assets) = assets else {
        return;
    };
    if !session.0.settings.particles {
        return;
    }
    let frame = session.0.render_frame();
    let origin = frame.player_position;
    let target = frame.boss_position.unwrap_or(origin + Vec3::X * 5.0);
    let mut budget = MAX_LIVE_EFFECTS.saturating_sub(live.iter().count());

    for kind in drained {
        let Some(material) = assets.material(kind) else {
            continue;
        };
        // projectiles travel between the fighters, bursts scatter in place
        let (start, velocities): (Vec3, Vec<Vec3>) = match kind {
            EffectKind::Dagger | EffectKind::SonicWave => (origin, vec![(target - origin) * 2.0]),
            EffectKind::Laser | EffectKind::Missile => (target, vec![(origin - target) * 2.0]),
            EffectKind::BossHeal => (target, burst(6)),
            _ => (origin, burst(6)),
        };
        for velocity in velocities {
            if budget == 0 {
                return;
            }
            budget -= 1;
            commands.spawn((
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(start),
                EffectVisual {
                    remaining: EFFECT_LIFETIME,
                    velocity,
                },
            ));
        }
    }
}

fn burst(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / count as f32;
            Vec3::new(angle.cos() * 3.0, 2.0, angle.sin() * 3.0)
        })
        .collect()
}

fn animate_effects(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut EffectVisual, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut effect, mut transform) in query.iter_mut() {
        effect.remaining -= dt;
        if effect.remaining <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation += effect.velocity * dt;
        transform.scale = Vec3::splat((effect.remaining / EFFECT_LIFETIME).max(0.1));
    }
}

/// Outlines level geometry with gizmos and hides the solid meshes while wireframe is on.
fn draw_wireframes(
    session: Res<Session>,
    mut gizmos: Gizmos,
    mut solids: Query<(&Transform, &Mesh3d, &mut Visibility), Or<(With<PlatformVisual>, With<HazardVisual>)>>,
    meshes: Res<Assets<Mesh>>,
) {
    let wireframe = session.0.settings.wireframe;
    for (transform, mesh, mut visibility) in solids.iter_mut() {
        *visibility = if wireframe {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        if !wireframe {
            continue;
        }
        let size = meshes
            .get(&mesh.0)
            .and_then(|m| m.compute_aabb())
            .map(|aabb| Vec3::from(aabb.half_extents) * 2.0)
            .unwrap_or(Vec3::ONE);
        gizmos.cuboid(
            Transform::from_translation(transform.translation).with_scale(size),
            Color::srgb(0.2, 1.0, 0.4),
        );
    }
}
