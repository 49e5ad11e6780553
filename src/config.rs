use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Every gameplay constant the simulation reads. Loaded from the startup
/// JSON (`tuning` key) and otherwise defaulted.
#[derive(Resource, Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GameTuning {
    pub movement: MovementTuning,
    pub hazards: HazardTuning,
    pub boss: BossTuning,
    pub cheats: CheatTuning,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            movement: MovementTuning::default(),
            hazards: HazardTuning::default(),
            boss: BossTuning::default(),
            cheats: CheatTuning::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct MovementTuning {
    pub move_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub max_jumps: u32,
    pub fly_up_speed: f32,
    pub fly_down_speed: f32,
    /// Player center height when standing on the y=0 plane.
    pub ground_height: f32,
    /// Half extent (x and z) of the floor under the spawn point.
    pub ground_half_extent: f32,
    pub player_half_height: f32,
    pub platform_tolerance: f32,
    /// How far below a platform top the feet may sink and still snap up.
    pub landing_window: f32,
    pub fall_threshold: f32,
    pub respawn_point: [f32; 3],
    pub starting_lives: u32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 10.0,
            gravity: -20.0,
            max_jumps: 2,
            fly_up_speed: 8.0,
            fly_down_speed: -6.0,
            ground_height: 0.5,
            ground_half_extent: 5.0,
            player_half_height: 0.5,
            platform_tolerance: 0.5,
            landing_window: 1.0,
            fall_threshold: -10.0,
            respawn_point: [0.0, 1.0, 0.0],
            starting_lives: 3,
        }
    }
}

impl MovementTuning {
    pub fn respawn(&self) -> Vec3 {
        Vec3::from(self.respawn_point)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HazardTuning {
    pub spike_radius: f32,
    pub enemy_radius: f32,
    pub star_radius: f32,
    pub power_up_radius: f32,
    pub power_up_duration: f32,
    pub enemy_speed: f32,
    pub enemy_range: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            spike_radius: 0.8,
            enemy_radius: 0.8,
            star_radius: 0.8,
            power_up_radius: 0.8,
            power_up_duration: 5.0,
            enemy_speed: 0.5,
            enemy_range: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BossTuning {
    pub trigger_x: f32,
    pub prep_countdown: u32,
    pub arena_center: [f32; 3],
    pub boss_position: [f32; 3],
    pub return_point: [f32; 3],
    pub teleport_out_secs: f32,
    pub teleport_in_secs: f32,
    pub victory_cleanup_secs: f32,
    pub defeat_cleanup_secs: f32,
    pub boss_max_health: f32,
    pub player_max_health: f32,
    pub attack_interval: f32,
    pub laser_damage: f32,
    pub missile_damage: f32,
    pub boss_heal: f32,
    pub dagger: AbilityTuning,
    pub heal: AbilityTuning,
    pub sonic: AbilityTuning,
}

/// Cooldown plus magnitude (damage, or healing for the heal ability).
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct AbilityTuning {
    pub cooldown: f32,
    pub amount: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            trigger_x: 35.0,
            prep_countdown: 4,
            arena_center: [50.0, 15.0, 0.0],
            boss_position: [60.0, 15.0, 0.0],
            return_point: [0.0, 3.0, 0.0],
            teleport_out_secs: 1.5,
            teleport_in_secs: 0.8,
            victory_cleanup_secs: 5.0,
            defeat_cleanup_secs: 0.0,
            boss_max_health: 100.0,
            player_max_health: 100.0,
            attack_interval: 3.0,
            laser_damage: 20.0,
            missile_damage: 25.0,
            boss_heal: 30.0,
            dagger: AbilityTuning {
                cooldown: 2.0,
                amount: 25.0,
            },
            heal: AbilityTuning {
                cooldown: 8.0,
                amount: 40.0,
            },
            sonic: AbilityTuning {
                cooldown: 5.0,
                amount: 35.0,
            },
        }
    }
}

impl BossTuning {
    pub fn arena(&self) -> Vec3 {
        Vec3::from(self.arena_center)
    }

    pub fn boss_spawn(&self) -> Vec3 {
        Vec3::from(self.boss_position)
    }

    pub fn home(&self) -> Vec3 {
        Vec3::from(self.return_point)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CheatTuning {
    pub teleport_target: [f32; 3],
}

impl Default for CheatTuning {
    fn default() -> Self {
        Self {
            teleport_target: [36.0, 10.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let tuning: GameTuning =
            serde_json::from_str(r#"{"movement":{"move_speed":7.5},"boss":{"trigger_x":20}}"#)
                .expect("parse");
        assert_eq!(tuning.movement.move_speed, 7.5);
        assert_eq!(tuning.movement.jump_force, 10.0);
        assert_eq!(tuning.boss.trigger_x, 20.0);
        assert_eq!(tuning.boss.dagger.amount, 25.0);
        assert_eq!(tuning.hazards.power_up_duration, 5.0);
    }
}
