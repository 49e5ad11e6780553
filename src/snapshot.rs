use std::fmt;

use bevy::prelude::*;
use serde::Serialize;
use serde_json::json;

use crate::admin::AdminSettings;
use crate::boss::{AbilityOutcome, AbilityRejection, BossAbility, BossEvent, BossPhase, PlayerAbility};
use crate::lives::DamageCause;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchState {
    Playing,
    GameOver { stars: u32 },
    Victory { stars: u32 },
}

impl MatchState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MatchState::Playing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpSource {
    Pickup,
    Cheat,
    Admin,
}

/// Everything observable that happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    Jumped { jump: u32 },
    Landed,
    HazardHit { hazard: &'static str, index: usize },
    FellOutOfWorld { position: Vec3 },
    LifeLost { cause: DamageCause, at: Vec3, lives_left: u32, deaths: u32 },
    DamageIgnored { cause: DamageCause },
    GameOver { stars: u32 },
    StarCollected { index: usize, stars: u32 },
    PowerUpActivated { source: PowerUpSource, refreshed: bool },
    PowerUpExpired,
    AbilityUsed { ability: PlayerAbility, outcome: AbilityOutcome },
    AbilityRejected { ability: PlayerAbility, reason: AbilityRejection },
    Boss(BossEvent),
    Victory { stars: u32 },
    Teleported { position: Vec3 },
    InputUnavailable,
    LevelReset,
}

impl FrameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jumped { .. } => "jump",
            Self::Landed => "landed",
            Self::HazardHit { .. } => "hazard_hit",
            Self::FellOutOfWorld { .. } => "fell_out_of_world",
            Self::LifeLost { .. } => "death",
            Self::DamageIgnored { .. } => "damage_ignored",
            Self::GameOver { .. } => "game_over",
            Self::StarCollected { .. } => "star_collected",
            Self::PowerUpActivated { .. } => "power_up_activated",
            Self::PowerUpExpired => "power_up_expired",
            Self::AbilityUsed { .. } => "ability_used",
            Self::AbilityRejected { .. } => "ability_rejected",
            Self::Boss(ev) => match ev {
                BossEvent::Triggered => "boss_triggered",
                BossEvent::TeleportStarted { .. } => "teleport_started",
                BossEvent::Relocated { .. } => "teleport_relocated",
                BossEvent::TeleportFinished { .. } => "teleport_finished",
                BossEvent::Countdown { .. } => "boss_countdown",
                BossEvent::FightStarted => "boss_fight_started",
                BossEvent::BossAttack { .. } => "boss_attack",
                BossEvent::Victory => "boss_defeated",
                BossEvent::Defeat => "player_defeated",
                BossEvent::CleanupStarted => "arena_cleanup",
                BossEvent::Returned => "arena_returned",
            },
            Self::Victory { .. } => "victory",
            Self::Teleported { .. } => "teleported",
            Self::InputUnavailable => "input_unavailable",
            Self::LevelReset => "level_reset",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::Jumped { jump } => json!({ "jump": jump }),
            Self::HazardHit { hazard, index } => json!({ "hazard": hazard, "index": index }),
            Self::FellOutOfWorld { position } | Self::Teleported { position } => {
                json!({ "x": position.x, "y": position.y, "z": position.z })
            }
            Self::LifeLost {
                cause,
                at,
                lives_left,
                deaths,
            } => json!({
                "cause": cause,
                "x": at.x,
                "y": at.y,
                "z": at.z,
                "lives_left": lives_left,
                "deaths": deaths,
            }),
            Self::DamageIgnored { cause } => json!({ "cause": cause }),
            Self::GameOver { stars } | Self::Victory { stars } => json!({ "stars": stars }),
            Self::StarCollected { index, stars } => json!({ "index": index, "stars": stars }),
            Self::PowerUpActivated { source, refreshed } => {
                json!({ "source": source, "refreshed": refreshed })
            }
            Self::AbilityUsed { ability, outcome } => {
                json!({ "ability": ability, "outcome": outcome })
            }
            Self::AbilityRejected { ability, reason } => {
                json!({ "ability": ability, "reason": reason, "message": reason.to_string() })
            }
            Self::Boss(ev) => serde_json::to_value(ev).unwrap_or(serde_json::Value::Null),
            Self::Landed | Self::PowerUpExpired | Self::InputUnavailable | Self::LevelReset => {
                json!({})
            }
        }
    }

    /// One-shot visual the renderer should play for this event, if any.
    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            Self::AbilityUsed { ability, .. } => Some(match ability {
                PlayerAbility::Dagger => EffectKind::Dagger,
                PlayerAbility::Heal => EffectKind::PlayerHeal,
                PlayerAbility::Sonic => EffectKind::SonicWave,
            }),
            Self::Boss(BossEvent::BossAttack { used, .. }) => Some(match used {
                BossAbility::Laser => EffectKind::Laser,
                BossAbility::Missile => EffectKind::Missile,
                BossAbility::Heal => EffectKind::BossHeal,
            }),
            Self::Boss(BossEvent::TeleportStarted { .. }) => Some(EffectKind::TeleportSwirl),
            Self::StarCollected { .. } => Some(EffectKind::Sparkle),
            Self::LifeLost { .. } => Some(EffectKind::DamageFlash),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Dagger,
    SonicWave,
    PlayerHeal,
    Laser,
    Missile,
    BossHeal,
    TeleportSwirl,
    Sparkle,
    DamageFlash,
}

/// Non-fatal conditions surfaced by a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimIssue {
    InputUnavailable,
    InvalidAbilityUse(AbilityRejection),
    OutOfBoundsFall,
    TerminalState(MatchState),
}

impl fmt::Display for SimIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputUnavailable => write!(f, "input unavailable, using neutral intent"),
            Self::InvalidAbilityUse(reason) => write!(f, "ability rejected: {reason}"),
            Self::OutOfBoundsFall => write!(f, "player fell out of the world"),
            Self::TerminalState(state) => write!(f, "match is over ({state:?})"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub events: Vec<FrameEvent>,
    pub effects: Vec<EffectKind>,
    pub issues: Vec<SimIssue>,
    pub paused: bool,
}

impl TickReport {
    pub fn push(&mut self, event: FrameEvent) {
        if let Some(effect) = event.effect() {
            self.effects.push(effect);
        }
        self.events.push(event);
    }
}

/// Per-tick renderer input. Static platform geometry is read once from the level.
#[derive(Clone, Debug, Default)]
pub struct RenderFrame {
    pub player_position: Vec3,
    pub player_scale: f32,
    pub battle_form: bool,
    pub flying: bool,
    pub hazard_positions: Vec<Vec3>,
    pub collectible_visible: Vec<bool>,
    pub boss_position: Option<Vec3>,
    pub arena_center: Option<Vec3>,
    pub teleport_fade: f32,
    pub ending_cubes: Vec<Vec3>,
    pub wireframe: bool,
    pub particles: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AbilityHud {
    pub ability: PlayerAbility,
    pub ready: bool,
    /// Whole seconds, rounded up.
    pub seconds_left: u32,
    pub label: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BossHud {
    pub boss_health_pct: f32,
    pub player_health_pct: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    pub abilities: Vec<AbilityHud>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HudState {
    pub stars: u32,
    pub star_total: u32,
    pub lives: u32,
    pub infinite_lives: bool,
    pub deaths: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_up_seconds: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boss: Option<BossHud>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlayerSnapshot {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub grounded: bool,
    pub jump_count: u32,
    pub flying: bool,
    pub lives: u32,
    pub deaths: u32,
    pub scale: f32,
    pub battle_form: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct BossSnapshot {
    pub phase: BossPhase,
    pub boss_health: f32,
    pub player_health: f32,
    pub countdown: u32,
    pub attack_timer: f32,
    pub cooldowns: [f32; 3],
    pub teleporting: bool,
}

/// Serializable view of the whole session for the admin API.
#[derive(Serialize, Clone, Debug)]
pub struct SessionSnapshot {
    pub frame: u64,
    pub state: MatchState,
    pub stars: u32,
    pub player: PlayerSnapshot,
    pub power_up_active: bool,
    pub power_up_remaining: f32,
    pub boss: BossSnapshot,
    pub settings: AdminSettings,
}
