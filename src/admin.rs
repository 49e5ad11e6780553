use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::boss::BossAbility;

pub const GIANT_SCALE: f32 = 3.0;
pub const TINY_SCALE: f32 = 0.3;

/// Live admin switches. These survive a level reset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AdminSettings {
    pub god_mode: bool,
    pub infinite_lives: bool,
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
    pub physics_enabled: bool,
    pub paused: bool,
    pub time_scale: f32,
    pub player_scale: f32,
    pub wireframe: bool,
    pub particles: bool,
    pub cheats_enabled: bool,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            god_mode: false,
            infinite_lives: false,
            speed_multiplier: 1.0,
            jump_multiplier: 1.0,
            physics_enabled: true,
            paused: false,
            time_scale: 1.0,
            player_scale: 1.0,
            wireframe: false,
            particles: true,
            cheats_enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AdminAction {
    ActivatePowerUp,
    SkipBossPrep,
    ResetBossFight,
    TriggerBossAbility(BossAbility),
    ForceVictory,
    ResetLevel,
}

/// One batch of admin changes, applied as direct overwrites at the start of
/// the next tick. `None` leaves a value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminOverrides {
    pub god_mode: Option<bool>,
    pub infinite_lives: Option<bool>,
    pub speed_multiplier: Option<f32>,
    pub jump_multiplier: Option<f32>,
    pub physics_enabled: Option<bool>,
    pub paused: Option<bool>,
    pub time_scale: Option<f32>,
    pub player_scale: Option<f32>,
    pub wireframe: Option<bool>,
    pub particles: Option<bool>,
    pub cheats_enabled: Option<bool>,
    pub teleport_to: Option<Vec3>,
    pub star_count: Option<u32>,
    pub boss_health: Option<f32>,
    pub player_health: Option<f32>,
    pub actions: Vec<AdminAction>,
}

fn positive(name: &str, value: Option<f32>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(format!("{name} must be > 0, got {v}")),
        _ => Ok(()),
    }
}

fn non_negative(name: &str, value: Option<f32>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(format!("{name} must be >= 0, got {v}")),
        _ => Ok(()),
    }
}

impl AdminOverrides {
    pub fn validate(&self) -> Result<(), String> {
        positive("speed_multiplier", self.speed_multiplier)?;
        positive("jump_multiplier", self.jump_multiplier)?;
        positive("time_scale", self.time_scale)?;
        positive("player_scale", self.player_scale)?;
        non_negative("boss_health", self.boss_health)?;
        non_negative("player_health", self.player_health)?;
        if let Some(p) = self.teleport_to {
            if !p.is_finite() {
                return Err("teleport target must be finite".to_string());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Folds a later batch into this one; later values win, actions append.
    pub fn merge(&mut self, later: AdminOverrides) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if later.$field.is_some() {
                    self.$field = later.$field;
                })*
            };
        }
        take!(
            god_mode,
            infinite_lives,
            speed_multiplier,
            jump_multiplier,
            physics_enabled,
            paused,
            time_scale,
            player_scale,
            wireframe,
            particles,
            cheats_enabled,
            teleport_to,
            star_count,
            boss_health,
            player_health
        );
        self.actions.extend(later.actions);
    }

    /// Writes the setting fields; one-shot fields are left to the session.
    /// Out-of-range multipliers are dropped with a warning.
    pub fn apply_settings(&self, settings: &mut AdminSettings) {
        let keep_positive = |name: &str, value: Option<f32>, slot: &mut f32| {
            if let Some(v) = value {
                if v.is_finite() && v > 0.0 {
                    *slot = v;
                } else {
                    warn!("[Claire admin] Ignoring {name}={v}");
                }
            }
        };
        keep_positive("speed_multiplier", self.speed_multiplier, &mut settings.speed_multiplier);
        keep_positive("jump_multiplier", self.jump_multiplier, &mut settings.jump_multiplier);
        keep_positive("time_scale", self.time_scale, &mut settings.time_scale);
        keep_positive("player_scale", self.player_scale, &mut settings.player_scale);

        let flags = [
            (self.god_mode, &mut settings.god_mode),
            (self.infinite_lives, &mut settings.infinite_lives),
            (self.physics_enabled, &mut settings.physics_enabled),
            (self.paused, &mut settings.paused),
            (self.wireframe, &mut settings.wireframe),
            (self.particles, &mut settings.particles),
            (self.cheats_enabled, &mut settings.cheats_enabled),
        ];
        for (value, slot) in flags {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Anything the session can poll for pending admin changes at a tick boundary.
pub trait OverrideSource {
    fn poll_overrides(&mut self) -> Option<AdminOverrides>;
}

/// No admin surface attached.
#[cfg(test)]
pub struct NoOverrides;

#[cfg(test)]
impl OverrideSource for NoOverrides {
    fn poll_overrides(&mut self) -> Option<AdminOverrides> {
        None
    }
}

/// Batches queued from outside the tick (the HTTP API), drained once per tick.
#[derive(Resource, Default)]
pub struct PendingOverrides {
    queued: Option<AdminOverrides>,
}

impl PendingOverrides {
    pub fn push(&mut self, overrides: AdminOverrides) {
        match self.queued.as_mut() {
            Some(existing) => existing.merge(overrides),
            None => self.queued = Some(overrides),
        }
    }
}

impl From<AdminAction> for AdminOverrides {
    fn from(action: AdminAction) -> Self {
        AdminOverrides {
            actions: vec![action],
            ..Default::default()
        }
    }
}

impl OverrideSource for PendingOverrides {
    fn poll_overrides(&mut self) -> Option<AdminOverrides> {
        self.queued.take().filter(|o| !o.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_positive_multipliers() {
        let bad = AdminOverrides {
            speed_multiplier: Some(0.0),
            ..default()
        };
        assert!(bad.validate().is_err());
        let nan = AdminOverrides {
            time_scale: Some(f32::NAN),
            ..default()
        };
        assert!(nan.validate().is_err());
        let fine = AdminOverrides {
            speed_multiplier: Some(2.0),
            boss_health: Some(0.0),
            ..default()
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn later_batches_win_and_actions_accumulate() {
        let mut pending = PendingOverrides::default();
        pending.push(AdminOverrides {
            god_mode: Some(true),
            speed_multiplier: Some(2.0),
            ..default()
        });
        pending.push(AdminOverrides {
            speed_multiplier: Some(3.0),
            ..default()
        });
        pending.push(AdminOverrides {
            actions: vec![AdminAction::SkipBossPrep],
            ..default()
        });

        let merged = pending.poll_overrides().expect("queued");
        assert_eq!(merged.god_mode, Some(true));
        assert_eq!(merged.speed_multiplier, Some(3.0));
        assert_eq!(merged.actions, vec![AdminAction::SkipBossPrep]);
        assert!(pending.poll_overrides().is_none());
    }

    #[test]
    fn apply_settings_ignores_invalid_values() {
        let mut settings = AdminSettings::default();
        AdminOverrides {
            speed_multiplier: Some(-1.0),
            jump_multiplier: Some(1.5),
            paused: Some(true),
            player_scale: Some(GIANT_SCALE),
            ..default()
        }
        .apply_settings(&mut settings);
        assert_eq!(settings.speed_multiplier, 1.0);
        assert_eq!(settings.jump_multiplier, 1.5);
        assert!(settings.paused);
        assert_eq!(settings.player_scale, GIANT_SCALE);
    }
}
