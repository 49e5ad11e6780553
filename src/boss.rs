use std::collections::VecDeque;
use std::fmt;

use bevy::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::components::PlayerState;
use crate::config::{AbilityTuning, BossTuning};

/// Cooldown remaining below this counts as ready (absorbs f32 drift from dt sums).
const COOLDOWN_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BossPhase {
    Inactive,
    Preparing,
    Active,
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportTarget {
    Arena,
    Home,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportPhase {
    Idle,
    FadingOut { elapsed: f32 },
    /// Single tick in which the player is moved.
    Relocating,
    FadingIn { elapsed: f32 },
}

#[derive(Clone, Copy, Debug)]
pub struct TeleportSequence {
    pub phase: TeleportPhase,
    pub target: TeleportTarget,
}

impl TeleportSequence {
    fn idle() -> Self {
        Self {
            phase: TeleportPhase::Idle,
            target: TeleportTarget::Arena,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TeleportPhase::Idle
    }

    /// 0 is fully visible, 1 is fully faded.
    pub fn fade(&self, tuning: &BossTuning) -> f32 {
        match self.phase {
            TeleportPhase::Idle => 0.0,
            TeleportPhase::FadingOut { elapsed } => {
                (elapsed / tuning.teleport_out_secs.max(f32::EPSILON)).clamp(0.0, 1.0)
            }
            TeleportPhase::Relocating => 1.0,
            TeleportPhase::FadingIn { elapsed } => {
                1.0 - (elapsed / tuning.teleport_in_secs.max(f32::EPSILON)).clamp(0.0, 1.0)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAbility {
    Dagger,
    Heal,
    Sonic,
}

impl PlayerAbility {
    pub const ALL: [PlayerAbility; 3] = [Self::Dagger, Self::Heal, Self::Sonic];

    fn slot(self) -> usize {
        match self {
            Self::Dagger => 0,
            Self::Heal => 1,
            Self::Sonic => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dagger => "dagger",
            Self::Heal => "heal",
            Self::Sonic => "sonic",
        }
    }

    fn tuning(self, boss: &BossTuning) -> AbilityTuning {
        match self {
            Self::Dagger => boss.dagger,
            Self::Heal => boss.heal,
            Self::Sonic => boss.sonic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAbility {
    Laser,
    Missile,
    Heal,
}

impl BossAbility {
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "laser" => Ok(Self::Laser),
            "missile" => Ok(Self::Missile),
            "heal" => Ok(Self::Heal),
            other => Err(format!("Unknown boss ability '{other}'")),
        }
    }
}

/// Source of boss ability draws.
pub trait AbilityRoller: Send + Sync {
    fn roll(&mut self) -> BossAbility;
}

/// Uniform draw over the three boss abilities.
pub struct RandomRoller {
    rng: SmallRng,
}

impl RandomRoller {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl AbilityRoller for RandomRoller {
    fn roll(&mut self) -> BossAbility {
        match self.rng.gen_range(0..3) {
            0 => BossAbility::Laser,
            1 => BossAbility::Missile,
            _ => BossAbility::Heal,
        }
    }
}

/// Plays back a fixed list, then repeats `fallback`.
pub struct ScriptedRoller {
    queue: VecDeque<BossAbility>,
    fallback: BossAbility,
}

impl ScriptedRoller {
    pub fn new(draws: impl IntoIterator<Item = BossAbility>) -> Self {
        Self {
            queue: draws.into_iter().collect(),
            fallback: BossAbility::Laser,
        }
    }
}

impl AbilityRoller for ScriptedRoller {
    fn roll(&mut self) -> BossAbility {
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Cooldown {
    pub remaining: f32,
}

impl Cooldown {
    pub fn ready(&self) -> bool {
        self.remaining <= COOLDOWN_EPSILON
    }

    fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbilityRejection {
    OnCooldown { remaining: f32 },
    AlreadyFullHealth,
    NotInArena,
}

impl fmt::Display for AbilityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnCooldown { remaining } => write!(f, "on cooldown ({remaining:.1}s left)"),
            Self::AlreadyFullHealth => write!(f, "already at full health"),
            Self::NotInArena => write!(f, "abilities only work in the boss arena"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AbilityOutcome {
    BossDamaged { amount: f32, boss_health: f32 },
    /// Fired during preparation: cooldown and effect, no damage.
    Rehearsed,
    PlayerHealed { amount: f32, player_health: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BossEvent {
    Triggered,
    TeleportStarted { to: TeleportTarget },
    Relocated { to: TeleportTarget, position: [f32; 3] },
    TeleportFinished { to: TeleportTarget },
    Countdown { seconds_left: u32 },
    FightStarted,
    BossAttack {
        drawn: BossAbility,
        used: BossAbility,
        player_health: f32,
        boss_health: f32,
    },
    Victory,
    Defeat,
    CleanupStarted,
    Returned,
}

pub struct BossEncounter {
    pub phase: BossPhase,
    pub boss_health: f32,
    pub player_health: f32,
    cooldowns: [Cooldown; 3],
    pub attack_timer: f32,
    pub countdown: u32,
    countdown_accum: f32,
    pub teleport: TeleportSequence,
    resolution_timer: f32,
    cleanup_started: bool,
    pub boss_visible: bool,
    pub arena_present: bool,
    pub celebration_elapsed: Option<f32>,
    roller: Box<dyn AbilityRoller>,
}

impl BossEncounter {
    pub fn new(tuning: &BossTuning, roller: Box<dyn AbilityRoller>) -> Self {
        Self {
            phase: BossPhase::Inactive,
            boss_health: tuning.boss_max_health,
            player_health: tuning.player_max_health,
            cooldowns: [Cooldown::default(); 3],
            attack_timer: 0.0,
            countdown: 0,
            countdown_accum: 0.0,
            teleport: TeleportSequence::idle(),
            resolution_timer: 0.0,
            cleanup_started: false,
            boss_visible: false,
            arena_present: false,
            celebration_elapsed: None,
            roller,
        }
    }

    /// Back to the pre-fight state, keeping the roller.
    pub fn reset(&mut self, tuning: &BossTuning) {
        let roller = std::mem::replace(&mut self.roller, Box::new(ScriptedRoller::new([])));
        *self = Self::new(tuning, roller);
    }

    pub fn in_arena(&self) -> bool {
        matches!(self.phase, BossPhase::Preparing | BossPhase::Active)
    }

    pub fn cooldown(&self, ability: PlayerAbility) -> Cooldown {
        self.cooldowns[ability.slot()]
    }

    fn begin_teleport(&mut self, target: TeleportTarget, events: &mut Vec<BossEvent>) {
        self.teleport = TeleportSequence {
            phase: TeleportPhase::FadingOut { elapsed: 0.0 },
            target,
        };
        events.push(BossEvent::TeleportStarted { to: target });
    }

    /// Starts the encounter from `Inactive`. Any other phase is a no-op.
    pub fn trigger(&mut self, tuning: &BossTuning, player: &mut PlayerState) -> Vec<BossEvent> {
        let mut events = Vec::new();
        if self.phase != BossPhase::Inactive {
            return events;
        }
        self.phase = BossPhase::Preparing;
        self.boss_health = tuning.boss_max_health;
        self.player_health = tuning.player_max_health;
        self.cooldowns = [Cooldown::default(); 3];
        self.attack_timer = 0.0;
        self.countdown = tuning.prep_countdown;
        self.countdown_accum = 0.0;
        self.boss_visible = false;
        self.arena_present = true;
        self.cleanup_started = false;
        self.celebration_elapsed = None;
        player.battle_form = true;
        player.velocity = Vec3::ZERO;
        info!("[Claire boss] Encounter triggered at x={:.1}", player.position.x);
        events.push(BossEvent::Triggered);
        self.begin_teleport(TeleportTarget::Arena, &mut events);
        events.push(BossEvent::Countdown {
            seconds_left: self.countdown,
        });
        events
    }

    pub fn use_ability(
        &mut self,
        ability: PlayerAbility,
        tuning: &BossTuning,
    ) -> Result<AbilityOutcome, AbilityRejection> {
        if !self.in_arena() {
            return Err(AbilityRejection::NotInArena);
        }
        let cooldown = self.cooldowns[ability.slot()];
        if !cooldown.ready() {
            return Err(AbilityRejection::OnCooldown {
                remaining: cooldown.remaining,
            });
        }
        let stats = ability.tuning(tuning);
        let outcome = match ability {
            PlayerAbility::Heal => {
                if self.player_health >= tuning.player_max_health {
                    return Err(AbilityRejection::AlreadyFullHealth);
                }
                self.player_health = (self.player_health + stats.amount).min(tuning.player_max_health);
                AbilityOutcome::PlayerHealed {
                    amount: stats.amount,
                    player_health: self.player_health,
                }
            }
            PlayerAbility::Dagger | PlayerAbility::Sonic => {
                if self.phase == BossPhase::Preparing {
                    AbilityOutcome::Rehearsed
                } else {
                    self.boss_health = (self.boss_health - stats.amount).max(0.0);
                    AbilityOutcome::BossDamaged {
                        amount: stats.amount,
                        boss_health: self.boss_health,
                    }
                }
            }
        };
        self.cooldowns[ability.slot()].remaining = stats.cooldown;
        Ok(outcome)
    }

    /// Resolves one boss ability. A heal at full health turns into a laser.
    pub fn cast(&mut self, drawn: BossAbility, tuning: &BossTuning) -> BossEvent {
        let used = if drawn == BossAbility::Heal && self.boss_health >= tuning.boss_max_health {
            BossAbility::Laser
        } else {
            drawn
        };
        match used {
            BossAbility::Laser => {
                self.player_health = (self.player_health - tuning.laser_damage).max(0.0);
            }
            BossAbility::Missile => {
                self.player_health = (self.player_health - tuning.missile_damage).max(0.0);
            }
            BossAbility::Heal => {
                self.boss_health = (self.boss_health + tuning.boss_heal).min(tuning.boss_max_health);
            }
        }
        BossEvent::BossAttack {
            drawn,
            used,
            player_health: self.player_health,
            boss_health: self.boss_health,
        }
    }

    /// Jumps the countdown to zero. The fight starts on the next tick.
    pub fn skip_preparation(&mut self) -> bool {
        if self.phase != BossPhase::Preparing {
            return false;
        }
        self.countdown = 0;
        true
    }

    /// Restores both health pools and all timers mid-fight.
    pub fn restart_fight(&mut self, tuning: &BossTuning) -> bool {
        if !self.in_arena() {
            return false;
        }
        self.boss_health = tuning.boss_max_health;
        self.player_health = tuning.player_max_health;
        self.cooldowns = [Cooldown::default(); 3];
        self.attack_timer = 0.0;
        true
    }

    pub fn set_boss_health(&mut self, value: f32, tuning: &BossTuning) {
        self.boss_health = value.clamp(0.0, tuning.boss_max_health);
    }

    pub fn set_player_health(&mut self, value: f32, tuning: &BossTuning) {
        self.player_health = value.clamp(0.0, tuning.player_max_health);
    }

    fn enter_resolution(&mut self, phase: BossPhase, delay: f32, events: &mut Vec<BossEvent>) {
        self.phase = phase;
        self.resolution_timer = delay.max(0.0);
        self.cleanup_started = false;
        if phase == BossPhase::Victory {
            self.celebration_elapsed = Some(0.0);
            info!("[Claire boss] Boss defeated");
            events.push(BossEvent::Victory);
        } else {
            info!("[Claire boss] Player defeated in the arena");
            events.push(BossEvent::Defeat);
        }
    }

    fn advance_teleport(&mut self, dt: f32, tuning: &BossTuning, player: &mut PlayerState) -> Vec<BossEvent> {
        let mut events = Vec::new();
        let target = self.teleport.target;
        self.teleport.phase = match self.teleport.phase {
            TeleportPhase::Idle => TeleportPhase::Idle,
            TeleportPhase::FadingOut { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= tuning.teleport_out_secs {
                    TeleportPhase::Relocating
                } else {
                    TeleportPhase::FadingOut { elapsed }
                }
            }
            TeleportPhase::Relocating => {
                let destination = match target {
                    TeleportTarget::Arena => tuning.arena(),
                    TeleportTarget::Home => tuning.home(),
                };
                player.position = destination;
                player.velocity = Vec3::ZERO;
                player.jump_count = 0;
                events.push(BossEvent::Relocated {
                    to: target,
                    position: destination.to_array(),
                });
                TeleportPhase::FadingIn { elapsed: 0.0 }
            }
            TeleportPhase::FadingIn { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= tuning.teleport_in_secs {
                    events.push(BossEvent::TeleportFinished { to: target });
                    TeleportPhase::Idle
                } else {
                    TeleportPhase::FadingIn { elapsed }
                }
            }
        };
        events
    }

    pub fn tick(&mut self, dt: f32, tuning: &BossTuning, player: &mut PlayerState) -> Vec<BossEvent> {
        if self.phase == BossPhase::Inactive {
            return Vec::new();
        }
        let mut events = self.advance_teleport(dt, tuning, player);
        for cd in self.cooldowns.iter_mut() {
            cd.tick(dt);
        }

        match self.phase {
            BossPhase::Inactive => {}
            BossPhase::Preparing => {
                self.countdown_accum += dt;
                while self.countdown > 0 && self.countdown_accum >= 1.0 {
                    self.countdown_accum -= 1.0;
                    self.countdown -= 1;
                    events.push(BossEvent::Countdown {
                        seconds_left: self.countdown,
                    });
                }
                if self.countdown == 0 {
                    self.phase = BossPhase::Active;
                    self.boss_visible = true;
                    self.attack_timer = 0.0;
                    info!("[Claire boss] Fight started");
                    events.push(BossEvent::FightStarted);
                }
            }
            BossPhase::Active => {
                self.attack_timer += dt;
                if self.attack_timer >= tuning.attack_interval {
                    let drawn = self.roller.roll();
                    events.push(self.cast(drawn, tuning));
                    self.attack_timer = 0.0;
                }
            }
            BossPhase::Victory | BossPhase::Defeat => {
                if let Some(elapsed) = self.celebration_elapsed.as_mut() {
                    *elapsed += dt;
                }
                if !self.cleanup_started {
                    self.resolution_timer -= dt;
                    if self.resolution_timer <= 0.0 {
                        self.cleanup_started = true;
                        self.boss_visible = false;
                        self.arena_present = false;
                        self.celebration_elapsed = None;
                        player.battle_form = false;
                        events.push(BossEvent::CleanupStarted);
                        self.begin_teleport(TeleportTarget::Home, &mut events);
                    }
                } else if self.teleport.is_idle() {
                    self.phase = BossPhase::Inactive;
                    events.push(BossEvent::Returned);
                }
            }
        }

        if self.phase == BossPhase::Active {
            if self.player_health <= 0.0 {
                self.enter_resolution(BossPhase::Defeat, tuning.defeat_cleanup_secs, &mut events);
            } else if self.boss_health <= 0.0 {
                self.enter_resolution(BossPhase::Victory, tuning.victory_cleanup_secs, &mut events);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn encounter(draws: Vec<BossAbility>) -> (BossEncounter, BossTuning, PlayerState) {
        let tuning = BossTuning::default();
        let enc = BossEncounter::new(&tuning, Box::new(ScriptedRoller::new(draws)));
        let player = PlayerState::spawn_at(Vec3::new(36.0, 9.65, 0.0), 3);
        (enc, tuning, player)
    }

    fn run(enc: &mut BossEncounter, tuning: &BossTuning, player: &mut PlayerState, secs: f32) -> Vec<BossEvent> {
        let mut out = Vec::new();
        let frames = (secs / DT).round() as usize;
        for _ in 0..frames {
            out.extend(enc.tick(DT, tuning, player));
        }
        out
    }

    #[test]
    fn trigger_only_from_inactive() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        assert!(!enc.trigger(&tuning, &mut player).is_empty());
        assert_eq!(enc.phase, BossPhase::Preparing);
        assert!(player.battle_form);
        assert!(enc.arena_present);
        assert!(!enc.boss_visible);
        assert!(enc.trigger(&tuning, &mut player).is_empty());
        assert_eq!(enc.countdown, 4);
    }

    #[test]
    fn teleport_moves_player_to_arena_after_fade() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        let events = run(&mut enc, &tuning, &mut player, 1.4);
        assert!(!events.iter().any(|e| matches!(e, BossEvent::Relocated { .. })));
        let events = run(&mut enc, &tuning, &mut player, 0.2);
        assert!(events.iter().any(|e| matches!(e, BossEvent::Relocated { to: TeleportTarget::Arena, .. })));
        assert_eq!(player.position, tuning.arena());
        run(&mut enc, &tuning, &mut player, 1.0);
        assert!(enc.teleport.is_idle());
    }

    #[test]
    fn prep_counts_down_then_fight_begins() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        let events = run(&mut enc, &tuning, &mut player, 3.5);
        let ticks: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                BossEvent::Countdown { seconds_left } => Some(*seconds_left),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![3, 2, 1]);
        assert_eq!(enc.phase, BossPhase::Preparing);
        run(&mut enc, &tuning, &mut player, 0.6);
        assert_eq!(enc.phase, BossPhase::Active);
        assert!(enc.boss_visible);
    }

    #[test]
    fn abilities_during_prep_spend_cooldown_without_damage() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        assert_eq!(
            enc.use_ability(PlayerAbility::Sonic, &tuning),
            Ok(AbilityOutcome::Rehearsed)
        );
        assert_eq!(enc.boss_health, 100.0);
        assert!(!enc.cooldown(PlayerAbility::Sonic).ready());
        assert!(matches!(
            enc.use_ability(PlayerAbility::Sonic, &tuning),
            Err(AbilityRejection::OnCooldown { .. })
        ));
    }

    #[test]
    fn cooldown_only_resets_on_successful_use() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        enc.skip_preparation();
        enc.tick(DT, &tuning, &mut player);
        assert_eq!(enc.phase, BossPhase::Active);

        enc.use_ability(PlayerAbility::Dagger, &tuning).expect("dagger ready");
        let mut last = enc.cooldown(PlayerAbility::Dagger).remaining;
        for _ in 0..60 {
            assert!(enc.use_ability(PlayerAbility::Dagger, &tuning).is_err());
            enc.tick(DT, &tuning, &mut player);
            let now = enc.cooldown(PlayerAbility::Dagger).remaining;
            assert!(now <= last);
            last = now;
        }
        run(&mut enc, &tuning, &mut player, 1.0);
        assert!(enc.cooldown(PlayerAbility::Dagger).ready());
        assert!(enc.use_ability(PlayerAbility::Dagger, &tuning).is_ok());
        assert_eq!(enc.boss_health, 50.0);
    }

    #[test]
    fn heal_at_full_health_keeps_cooldown() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        assert_eq!(
            enc.use_ability(PlayerAbility::Heal, &tuning),
            Err(AbilityRejection::AlreadyFullHealth)
        );
        assert!(enc.cooldown(PlayerAbility::Heal).ready());

        enc.set_player_health(30.0, &tuning);
        assert_eq!(
            enc.use_ability(PlayerAbility::Heal, &tuning),
            Ok(AbilityOutcome::PlayerHealed {
                amount: 40.0,
                player_health: 70.0
            })
        );
        assert_eq!(enc.cooldown(PlayerAbility::Heal).remaining, 8.0);
    }

    #[test]
    fn abilities_outside_arena_are_rejected() {
        let (mut enc, tuning, _) = encounter(vec![]);
        assert_eq!(
            enc.use_ability(PlayerAbility::Dagger, &tuning),
            Err(AbilityRejection::NotInArena)
        );
    }

    #[test]
    fn boss_heal_at_full_health_becomes_laser() {
        let (mut enc, tuning, _) = encounter(vec![]);
        let event = enc.cast(BossAbility::Heal, &tuning);
        assert_eq!(
            event,
            BossEvent::BossAttack {
                drawn: BossAbility::Heal,
                used: BossAbility::Laser,
                player_health: 80.0,
                boss_health: 100.0,
            }
        );

        enc.boss_health = 50.0;
        enc.cast(BossAbility::Heal, &tuning);
        assert_eq!(enc.boss_health, 80.0);
        enc.cast(BossAbility::Heal, &tuning);
        assert_eq!(enc.boss_health, 100.0);
    }

    #[test]
    fn scripted_draws_drain_player_health() {
        let (mut enc, tuning, mut player) = encounter(vec![
            BossAbility::Laser,
            BossAbility::Missile,
            BossAbility::Laser,
        ]);
        enc.trigger(&tuning, &mut player);
        enc.skip_preparation();
        enc.tick(DT, &tuning, &mut player);

        let healths: Vec<f32> = run(&mut enc, &tuning, &mut player, 9.5)
            .into_iter()
            .filter_map(|e| match e {
                BossEvent::BossAttack { player_health, .. } => Some(player_health),
                _ => None,
            })
            .collect();
        assert_eq!(healths, vec![80.0, 55.0, 35.0]);
    }

    #[test]
    fn victory_cleans_up_after_delay_and_returns_home() {
        let (mut enc, tuning, mut player) = encounter(vec![]);
        enc.trigger(&tuning, &mut player);
        enc.skip_preparation();
        enc.tick(DT, &tuning, &mut player);
        enc.set_boss_health(0.0, &tuning);
        let events = enc.tick(DT, &tuning, &mut player);
        assert!(events.contains(&BossEvent::Victory));
        assert_eq!(enc.phase, BossPhase::Victory);
        assert!(enc.celebration_elapsed.is_some());
        assert!(matches!(
            enc.use_ability(PlayerAbility::Dagger, &tuning),
            Err(AbilityRejection::NotInArena)
        ));

        let events = run(&mut enc, &tuning, &mut player, 4.9);
        assert!(!events.contains(&BossEvent::CleanupStarted));
        assert!(player.battle_form);

        let events = run(&mut enc, &tuning, &mut player, 3.0);
        assert!(events.contains(&BossEvent::CleanupStarted));
        assert!(events.contains(&BossEvent::Returned));
        assert_eq!(enc.phase, BossPhase::Inactive);
        assert_eq!(player.position, tuning.home());
        assert!(!player.battle_form);
        assert!(!enc.arena_present);
    }

    #[test]
    fn defeat_cleans_up_immediately() {
        let (mut enc, tuning, mut player) = encounter(vec![BossAbility::Missile; 4]);
        enc.trigger(&tuning, &mut player);
        enc.skip_preparation();
        enc.tick(DT, &tuning, &mut player);
        let events = run(&mut enc, &tuning, &mut player, 12.5);
        assert!(events.contains(&BossEvent::Defeat));
        assert!(events.contains(&BossEvent::CleanupStarted));
        assert!(!player.battle_form);
    }

    #[test]
    fn random_roller_draws_every_ability() {
        let mut roller = RandomRoller::seeded(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            match roller.roll() {
                BossAbility::Laser => seen[0] = true,
                BossAbility::Missile => seen[1] = true,
                BossAbility::Heal => seen[2] = true,
            }
        }
        assert_eq!(seen, [true; 3]);
    }
}
