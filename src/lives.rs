use bevy::prelude::*;
use serde::Serialize;

use crate::components::PlayerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    Hazard,
    Fall,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// God mode swallowed the hit. A fall still puts the player back at the checkpoint.
    Ignored,
    Respawned { lives_left: u32 },
    GameOver,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LifePolicy {
    pub god_mode: bool,
    pub infinite_lives: bool,
}

pub fn respawn(player: &mut PlayerState, checkpoint: Vec3) {
    player.position = checkpoint;
    player.velocity = Vec3::ZERO;
    player.grounded = true;
    player.jump_count = 0;
}

pub fn apply_damage(
    player: &mut PlayerState,
    cause: DamageCause,
    policy: LifePolicy,
    checkpoint: Vec3,
) -> DamageOutcome {
    if policy.god_mode {
        if cause == DamageCause::Fall {
            respawn(player, checkpoint);
        }
        return DamageOutcome::Ignored;
    }

    player.deaths = player.deaths.saturating_add(1);
    if !policy.infinite_lives {
        player.lives = player.lives.saturating_sub(1);
        if player.lives == 0 {
            return DamageOutcome::GameOver;
        }
    }
    respawn(player, checkpoint);
    DamageOutcome::Respawned {
        lives_left: player.lives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKPOINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    fn wandering_player() -> PlayerState {
        let mut p = PlayerState::spawn_at(Vec3::new(12.0, 3.0, -1.0), 3);
        p.velocity = Vec3::new(0.0, -4.0, 0.0);
        p.grounded = false;
        p.jump_count = 2;
        p
    }

    #[test]
    fn god_mode_ignores_hazards_entirely() {
        let mut player = wandering_player();
        let before = player.clone();
        let outcome = apply_damage(
            &mut player,
            DamageCause::Hazard,
            LifePolicy {
                god_mode: true,
                infinite_lives: false,
            },
            CHECKPOINT,
        );
        assert_eq!(outcome, DamageOutcome::Ignored);
        assert_eq!(player.lives, before.lives);
        assert_eq!(player.deaths, 0);
        assert_eq!(player.position, before.position);
    }

    #[test]
    fn god_mode_fall_returns_to_checkpoint_without_cost() {
        let mut player = wandering_player();
        let outcome = apply_damage(
            &mut player,
            DamageCause::Fall,
            LifePolicy {
                god_mode: true,
                infinite_lives: false,
            },
            CHECKPOINT,
        );
        assert_eq!(outcome, DamageOutcome::Ignored);
        assert_eq!(player.lives, 3);
        assert_eq!(player.position, CHECKPOINT);
    }

    #[test]
    fn respawn_resets_motion() {
        let mut player = wandering_player();
        let outcome = apply_damage(
            &mut player,
            DamageCause::Hazard,
            LifePolicy::default(),
            CHECKPOINT,
        );
        assert_eq!(outcome, DamageOutcome::Respawned { lives_left: 2 });
        assert_eq!(player.position, CHECKPOINT);
        assert_eq!(player.velocity, Vec3::ZERO);
        assert!(player.grounded);
        assert_eq!(player.jump_count, 0);
        assert_eq!(player.deaths, 1);
    }

    #[test]
    fn last_life_ends_the_match() {
        let mut player = wandering_player();
        player.lives = 1;
        let outcome = apply_damage(
            &mut player,
            DamageCause::Hazard,
            LifePolicy::default(),
            CHECKPOINT,
        );
        assert_eq!(outcome, DamageOutcome::GameOver);
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn infinite_lives_counts_deaths_only() {
        let mut player = wandering_player();
        let policy = LifePolicy {
            god_mode: false,
            infinite_lives: true,
        };
        for _ in 0..5 {
            apply_damage(&mut player, DamageCause::Fall, policy, CHECKPOINT);
        }
        assert_eq!(player.lives, 3);
        assert_eq!(player.deaths, 5);
    }
}
