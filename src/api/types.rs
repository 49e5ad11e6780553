use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::admin::{AdminAction, AdminOverrides, GIANT_SCALE, TINY_SCALE};
use crate::boss::BossAbility;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> ApiResponse<String> {
        ApiResponse {
            ok: true,
            data: Some("ok".to_string()),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> ApiResponse<String> {
        ApiResponse {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSize {
    Normal,
    Giant,
    Tiny,
}

impl PlayerSize {
    pub fn scale(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Giant => GIANT_SCALE,
            Self::Tiny => TINY_SCALE,
        }
    }
}

/// Partial settings update; absent fields stay as they are.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct SettingsRequest {
    pub god_mode: Option<bool>,
    pub infinite_lives: Option<bool>,
    pub speed_multiplier: Option<f32>,
    pub jump_multiplier: Option<f32>,
    pub physics_enabled: Option<bool>,
    pub paused: Option<bool>,
    pub time_scale: Option<f32>,
    pub player_scale: Option<f32>,
    /// Shorthand for `player_scale`; wins when both are given.
    pub size: Option<PlayerSize>,
    pub wireframe: Option<bool>,
    pub particles: Option<bool>,
    pub cheats_enabled: Option<bool>,
}

impl From<SettingsRequest> for AdminOverrides {
    fn from(req: SettingsRequest) -> Self {
        AdminOverrides {
            god_mode: req.god_mode,
            infinite_lives: req.infinite_lives,
            speed_multiplier: req.speed_multiplier,
            jump_multiplier: req.jump_multiplier,
            physics_enabled: req.physics_enabled,
            paused: req.paused,
            time_scale: req.time_scale,
            player_scale: req.size.map(PlayerSize::scale).or(req.player_scale),
            wireframe: req.wireframe,
            particles: req.particles,
            cheats_enabled: req.cheats_enabled,
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
pub struct TeleportRequest {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<TeleportRequest> for AdminOverrides {
    fn from(req: TeleportRequest) -> Self {
        AdminOverrides {
            teleport_to: Some(Vec3::new(req.x, req.y, req.z)),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
pub struct StarsRequest {
    pub count: u32,
}

#[derive(Deserialize)]
pub struct HealthRequest {
    #[serde(default)]
    pub boss: Option<f32>,
    #[serde(default)]
    pub player: Option<f32>,
}

#[derive(Deserialize)]
pub struct BossAbilityRequest {
    pub ability: String,
}

impl BossAbilityRequest {
    pub fn into_overrides(self) -> Result<AdminOverrides, String> {
        let ability = BossAbility::parse(&self.ability)?;
        Ok(AdminOverrides::from(AdminAction::TriggerBossAbility(ability)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_shorthand_overrides_scale() {
        let req: SettingsRequest =
            serde_json::from_str(r#"{"size": "giant", "player_scale": 2.0, "god_mode": true}"#)
                .expect("parse");
        let overrides = AdminOverrides::from(req);
        assert_eq!(overrides.player_scale, Some(GIANT_SCALE));
        assert_eq!(overrides.god_mode, Some(true));
        assert_eq!(overrides.paused, None);
    }

    #[test]
    fn unknown_settings_are_rejected() {
        assert!(serde_json::from_str::<SettingsRequest>(r#"{"fly_speed": 3}"#).is_err());
    }

    #[test]
    fn boss_ability_request_parses_names() {
        let overrides = BossAbilityRequest {
            ability: "Missile".into(),
        }
        .into_overrides()
        .expect("known ability");
        assert_eq!(
            overrides.actions,
            vec![AdminAction::TriggerBossAbility(BossAbility::Missile)]
        );
        assert!(BossAbilityRequest {
            ability: "tickle".into()
        }
        .into_overrides()
        .is_err());
    }
}
