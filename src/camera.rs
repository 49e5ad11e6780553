use bevy::prelude::*;

use crate::components::HeadlessMode;
use crate::events::GameEventBus;
use crate::game_runtime::Session;

#[derive(Resource, Clone)]
pub struct CameraConfig {
    pub follow_speed: f32,
    pub offset: Vec3,
    /// Pulled further back while the arena is up.
    pub arena_offset: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_speed: 0.08,
            offset: Vec3::new(0.0, 5.0, 12.0),
            arena_offset: Vec3::new(0.0, 8.0, 22.0),
        }
    }
}

#[derive(Resource, Clone, Default)]
pub struct CameraShakeState {
    pub intensity: f32,
    pub remaining: f32,
    pub duration: f32,
}

impl CameraShakeState {
    fn kick(&mut self, intensity: f32, duration: f32) {
        if intensity >= self.intensity || self.remaining <= 0.0 {
            self.intensity = intensity;
            self.duration = duration;
            self.remaining = duration;
        }
    }
}

#[derive(Resource, Default)]
struct CameraRuntimeState {
    base: Vec3,
    focus: Vec3,
    initialized: bool,
}

#[derive(Resource, Default)]
struct CameraEventCursor {
    last_frame: u64,
}

#[derive(Component)]
pub struct MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CameraConfig::default())
            .insert_resource(CameraShakeState::default())
            .insert_resource(CameraRuntimeState::default())
            .insert_resource(CameraEventCursor::default())
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (apply_camera_events, camera_follow, camera_shake).chain(),
            );
    }
}

fn apply_camera_events(
    bus: Res<GameEventBus>,
    mut shake: ResMut<CameraShakeState>,
    mut cursor: ResMut<CameraEventCursor>,
) {
    if bus.frame == cursor.last_frame {
        return;
    }
    for ev in bus.recent.iter().filter(|ev| ev.frame > cursor.last_frame) {
        match ev.name.as_str() {
            "death" => shake.kick(0.6, 0.4),
            "boss_attack" => {
                if ev.data.get("used").and_then(|v| v.as_str()) != Some("heal") {
                    shake.kick(0.35, 0.3);
                }
            }
            "boss_defeated" => shake.kick(0.8, 0.8),
            _ => {}
        }
    }
    cursor.last_frame = bus.frame;
}

fn spawn_camera(mut commands: Commands, headless: Res<HeadlessMode>) {
    if headless.0 {
        return;
    }
    let config = CameraConfig::default();
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_translation(config.offset).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn camera_follow(
    time: Res<Time>,
    config: Res<CameraConfig>,
    session: Res<Session>,
    mut runtime: ResMut<CameraRuntimeState>,
) {
    let frame = session.0.render_frame();
    let (focus, offset) = match frame.arena_center {
        Some(center) => {
            // frame both fighters
            let boss = frame.boss_position.unwrap_or(center);
            ((frame.player_position + boss) * 0.5, config.arena_offset)
        }
        None => (frame.player_position, config.offset),
    };
    let target = focus + offset;

    if !runtime.initialized {
        runtime.base = target;
        runtime.focus = focus;
        runtime.initialized = true;
        return;
    }

    let follow_speed = if config.follow_speed.is_finite() {
        config.follow_speed
    } else {
        1.0
    };
    let alpha = (follow_speed * time.delta_secs() * 60.0).clamp(0.0, 1.0);
    runtime.base = runtime.base.lerp(target, alpha);
    runtime.focus = runtime.focus.lerp(focus, alpha);
}

fn camera_shake(
    time: Res<Time>,
    mut shake: ResMut<CameraShakeState>,
    runtime: Res<CameraRuntimeState>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut cam_transform) = camera_query.get_single_mut() else {
        return;
    };

    let mut offset = Vec3::ZERO;
    if shake.remaining > 0.0 && shake.intensity > 0.0 {
        shake.remaining = (shake.remaining - time.delta_secs()).max(0.0);
        let t = time.elapsed_secs();
        let life = if shake.duration > 0.0 {
            (shake.remaining / shake.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let strength = shake.intensity * life * life;
        offset.x = (t * 31.0).sin() * strength;
        offset.y = (t * 43.0).cos() * strength;
    }

    *cam_transform = Transform::from_translation(runtime.base + offset)
        .looking_at(runtime.focus + offset, Vec3::Y);
}
