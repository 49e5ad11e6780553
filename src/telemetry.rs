use std::collections::HashMap;

use bevy::prelude::*;
use serde::Serialize;

use crate::config::BossTuning;
use crate::events::{GameEvent, GameEventBus};
use crate::game_runtime::Session;

#[derive(Resource, Serialize, Clone, Default)]
pub struct GameplayTelemetry {
    pub total_frames: u64,
    /// `[x, y, z, frame]` per lost life.
    pub death_locations: Vec<[f32; 4]>,
    pub deaths: u64,
    pub stars_collected: u64,
    pub power_ups: u64,
    pub boss_attempts: u64,
    pub damage_taken: f32,
    pub damage_dealt: f32,
    pub ability_uses: HashMap<String, u64>,
    pub ability_rejections: u64,
    pub victories: u64,
    pub game_overs: u64,
    pub new_games: u64,
    #[serde(skip)]
    last_frame: u64,
    #[serde(skip)]
    last_batch: u64,
}

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameplayTelemetry::default()).add_systems(
            FixedUpdate,
            update_telemetry.after(crate::game_runtime::tick_session),
        );
    }
}

fn number(event: &GameEvent, key: &str) -> f32 {
    event.data.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
}

impl GameplayTelemetry {
    pub fn record(&mut self, event: &GameEvent, boss: &BossTuning) {
        match event.name.as_str() {
            "death" => {
                self.deaths += 1;
                self.death_locations.push([
                    number(event, "x"),
                    number(event, "y"),
                    number(event, "z"),
                    event.frame as f32,
                ]);
            }
            "star_collected" => self.stars_collected += 1,
            "power_up_activated" => self.power_ups += 1,
            "boss_triggered" => self.boss_attempts += 1,
            "boss_attack" => {
                self.damage_taken += match event.data.get("used").and_then(|v| v.as_str()) {
                    Some("laser") => boss.laser_damage,
                    Some("missile") => boss.missile_damage,
                    _ => 0.0,
                };
            }
            "ability_used" => {
                let ability = event
                    .data
                    .get("ability")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                *self.ability_uses.entry(ability).or_insert(0) += 1;
                if let Some(outcome) = event.data.get("outcome") {
                    if outcome.get("result").and_then(|v| v.as_str()) == Some("boss_damaged") {
                        self.damage_dealt += outcome
                            .get("amount")
                            .and_then(|v| v.as_f64())
                            .unwrap_or(0.0) as f32;
                    }
                }
            }
            "ability_rejected" => self.ability_rejections += 1,
            "victory" => self.victories += 1,
            "game_over" => self.game_overs += 1,
            "level_reset" => self.new_games += 1,
            _ => {}
        }
    }
}

fn update_telemetry(
    mut telemetry: ResMut<GameplayTelemetry>,
    bus: Res<GameEventBus>,
    session: Res<Session>,
) {
    if bus.batches == telemetry.last_batch {
        return;
    }
    telemetry.last_batch = bus.batches;
    if bus.frame != telemetry.last_frame {
        telemetry.last_frame = bus.frame;
        telemetry.total_frames += 1;
    }

    let mut fresh: Vec<&GameEvent> = bus.latest_batch().collect();
    fresh.reverse();
    for event in fresh {
        telemetry.record(event, &session.0.tuning().boss);
    }
}
