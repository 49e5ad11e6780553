use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::admin::{AdminAction, AdminOverrides, AdminSettings, OverrideSource};
use crate::boss::{
    AbilityRoller, BossEncounter, BossEvent, BossPhase, PlayerAbility, RandomRoller,
};
use crate::components::{CollectibleKind, PlayerState};
use crate::config::GameTuning;
use crate::hazards;
use crate::input::{FrameInput, InputEdges, PressedEdges};
use crate::level::Level;
use crate::lives::{self, DamageCause, DamageOutcome, LifePolicy};
use crate::physics_core::{self, MotionParams, MoveIntent};
use crate::power_up::PowerUpTimer;
use crate::snapshot::{
    AbilityHud, BossHud, BossSnapshot, FrameEvent, HudState, MatchState, PlayerSnapshot,
    PowerUpSource, RenderFrame, SessionSnapshot, SimIssue, TickReport,
};

pub const ENDING_CUBES: usize = 4;
const ENDING_CUBE_RADIUS: f32 = 5.0;
const ENDING_CUBE_SPIN: f32 = 1.2;

struct HudMessage {
    text: String,
    remaining: Option<f32>,
}

/// The whole game: owns every piece of simulation state and advances it one
/// tick at a time in a fixed order.
pub struct GameSession {
    tuning: GameTuning,
    pristine: Level,
    pub level: Level,
    pub player: PlayerState,
    pub power_up: PowerUpTimer,
    pub boss: BossEncounter,
    pub stars: u32,
    pub state: MatchState,
    pub settings: AdminSettings,
    edges: InputEdges,
    input_missing: bool,
    frame: u64,
    message: Option<HudMessage>,
}

impl GameSession {
    pub fn new(tuning: GameTuning) -> Self {
        Self::with_roller(tuning, Box::new(RandomRoller::from_entropy()))
    }

    pub fn with_roller(tuning: GameTuning, roller: Box<dyn AbilityRoller>) -> Self {
        let level = Level::default_course(&tuning.hazards);
        let player = PlayerState::spawn_at(
            tuning.movement.respawn(),
            tuning.movement.starting_lives,
        );
        Self {
            power_up: PowerUpTimer::new(tuning.hazards.power_up_duration),
            boss: BossEncounter::new(&tuning.boss, roller),
            pristine: level.clone(),
            level,
            player,
            stars: 0,
            state: MatchState::Playing,
            settings: AdminSettings::default(),
            edges: InputEdges::default(),
            input_missing: false,
            frame: 0,
            message: None,
            tuning,
        }
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// New game on the same course. Admin settings are kept.
    pub fn reset(&mut self) {
        self.level = self.pristine.clone();
        self.player = PlayerState::spawn_at(
            self.tuning.movement.respawn(),
            self.tuning.movement.starting_lives,
        );
        self.player.scale = self.settings.player_scale;
        self.power_up = PowerUpTimer::new(self.tuning.hazards.power_up_duration);
        self.boss.reset(&self.tuning.boss);
        self.stars = 0;
        self.state = MatchState::Playing;
        self.edges = InputEdges::default();
        self.message = None;
        info!("[Claire] Level reset");
    }

    fn show_message(&mut self, text: impl Into<String>, secs: Option<f32>) {
        self.message = Some(HudMessage {
            text: text.into(),
            remaining: secs,
        });
    }

    fn life_policy(&self) -> LifePolicy {
        LifePolicy {
            god_mode: self.settings.god_mode,
            infinite_lives: self.settings.infinite_lives,
        }
    }

    /// Advances the game by `dt` seconds. `input == None` means the input
    /// source could not be read this frame; a neutral intent is used instead.
    pub fn tick(
        &mut self,
        dt: f32,
        input: Option<FrameInput>,
        overrides: &mut dyn OverrideSource,
    ) -> TickReport {
        let mut report = TickReport::default();

        if let Some(batch) = overrides.poll_overrides() {
            self.apply_overrides(batch, &mut report);
        }
        if self.settings.paused {
            report.paused = true;
            return report;
        }

        self.frame = self.frame.saturating_add(1);
        let dt = dt.max(0.0) * self.settings.time_scale;
        self.player.scale = self.settings.player_scale;
        self.tick_message(dt);

        let (held, pressed) = match input {
            Some(input) => {
                self.input_missing = false;
                (input, self.edges.update(&input))
            }
            None => {
                if !self.input_missing {
                    self.input_missing = true;
                    report.push(FrameEvent::InputUnavailable);
                }
                report.issues.push(SimIssue::InputUnavailable);
                (FrameInput::default(), PressedEdges::default())
            }
        };

        if self.state.is_terminal() && pressed.restart {
            info!("[Claire] Restart requested");
            self.reset();
            report.push(FrameEvent::LevelReset);
            return report;
        }

        if self.state.is_terminal() {
            // arena teardown still plays out after the match ends
            let events = self.boss.tick(dt, &self.tuning.boss, &mut self.player);
            self.handle_boss_events(events, &mut report);
            report.issues.push(SimIssue::TerminalState(self.state));
            return report;
        }

        if self.settings.cheats_enabled {
            self.apply_cheats(&pressed, &mut report);
        }

        if self.boss.phase == BossPhase::Inactive {
            self.step_platforming(dt, &held, &pressed, &mut report);
        } else {
            self.step_encounter(dt, &pressed, &mut report);
        }

        if self.power_up.tick(dt, &mut self.player) {
            report.push(FrameEvent::PowerUpExpired);
        }
        report
    }

    fn tick_message(&mut self, dt: f32) {
        let expired = match self.message.as_mut() {
            Some(HudMessage {
                remaining: Some(left),
                ..
            }) => {
                *left -= dt;
                *left <= 0.0
            }
            _ => false,
        };
        if expired {
            self.message = None;
        }
    }

    fn apply_cheats(&mut self, pressed: &PressedEdges, report: &mut TickReport) {
        if pressed.cheat_power_up {
            info!("[Claire] Cheat: power-up");
            self.activate_power_up(PowerUpSource::Cheat, report);
        }
        if pressed.cheat_teleport && self.boss.phase == BossPhase::Inactive {
            let target = Vec3::from(self.tuning.cheats.teleport_target);
            info!("[Claire] Cheat: teleport to {:?}", target);
            self.teleport_player(target, report);
        }
    }

    fn teleport_player(&mut self, target: Vec3, report: &mut TickReport) {
        self.player.position = target;
        self.player.velocity = Vec3::ZERO;
        self.player.grounded = false;
        report.push(FrameEvent::Teleported { position: target });
    }

    fn activate_power_up(&mut self, source: PowerUpSource, report: &mut TickReport) {
        let refreshed = self.power_up.activate(&mut self.player);
        if !refreshed {
            self.show_message("Power-up! Claire can fly!", Some(2.0));
        }
        report.push(FrameEvent::PowerUpActivated { source, refreshed });
    }

    fn step_platforming(
        &mut self,
        dt: f32,
        held: &FrameInput,
        pressed: &PressedEdges,
        report: &mut TickReport,
    ) {
        let movement = &self.tuning.movement;
        let params = MotionParams::from_tuning(
            movement,
            self.settings.speed_multiplier,
            self.settings.jump_multiplier,
            self.settings.physics_enabled,
        );
        let intent = MoveIntent {
            move_x: held.move_x,
            move_z: held.move_z,
            jump_pressed: pressed.jump,
            fly_up: held.fly_up,
            fly_down: held.fly_down,
        };
        let was_grounded = self.player.grounded;
        let motion =
            physics_core::step_player(&mut self.player, &intent, &self.level.platforms, &params, dt);
        if let Some(jump) = motion.jumped {
            report.push(FrameEvent::Jumped { jump });
        }
        if !was_grounded && self.player.grounded {
            report.push(FrameEvent::Landed);
        }

        if motion.fell_out {
            report.issues.push(SimIssue::OutOfBoundsFall);
            report.push(FrameEvent::FellOutOfWorld {
                position: self.player.position,
            });
            self.damage(DamageCause::Fall, report);
            if self.state.is_terminal() {
                return;
            }
        }

        hazards::step_patrols(&mut self.level.hazards, dt);

        if !self.power_up.active && !self.settings.god_mode {
            if let Some(contact) = hazards::first_hazard_contact(
                self.player.position,
                &self.level.hazards,
                &self.tuning.hazards,
            ) {
                report.push(FrameEvent::HazardHit {
                    hazard: contact.label,
                    index: contact.index,
                });
                self.damage(DamageCause::Hazard, report);
                if self.state.is_terminal() {
                    return;
                }
            }
        }

        let pickups = hazards::collect_in_reach(
            self.player.position,
            &mut self.level.collectibles,
            &self.tuning.hazards,
        );
        for pickup in pickups {
            match pickup.kind {
                CollectibleKind::Star => {
                    self.stars += 1;
                    report.push(FrameEvent::StarCollected {
                        index: pickup.index,
                        stars: self.stars,
                    });
                }
                CollectibleKind::PowerUp => self.activate_power_up(PowerUpSource::Pickup, report),
            }
        }

        if self.player.position.x > self.tuning.boss.trigger_x {
            let events = self.boss.trigger(&self.tuning.boss, &mut self.player);
            if !events.is_empty() {
                self.show_message("Entering the boss arena! Teleporting...", Some(3.0));
            }
            self.handle_boss_events(events, report);
        }
    }

    fn damage(&mut self, cause: DamageCause, report: &mut TickReport) {
        let checkpoint = self.tuning.movement.respawn();
        let at = self.player.position;
        let policy = self.life_policy();
        match lives::apply_damage(&mut self.player, cause, policy, checkpoint) {
            DamageOutcome::Ignored => report.push(FrameEvent::DamageIgnored { cause }),
            DamageOutcome::Respawned { lives_left } => {
                info!("[Claire] Lost a life ({:?}), {} left", cause, lives_left);
                report.push(FrameEvent::LifeLost {
                    cause,
                    at,
                    lives_left,
                    deaths: self.player.deaths,
                });
            }
            DamageOutcome::GameOver => {
                report.push(FrameEvent::LifeLost {
                    cause,
                    at,
                    lives_left: 0,
                    deaths: self.player.deaths,
                });
                self.finish(MatchState::GameOver { stars: self.stars }, report);
            }
        }
    }

    fn finish(&mut self, state: MatchState, report: &mut TickReport) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        match state {
            MatchState::GameOver { stars } => {
                info!("[Claire] Game over with {} stars", stars);
                self.show_message(
                    format!("Game Over! Stars collected: {stars}\nPress R to play again"),
                    None,
                );
                report.push(FrameEvent::GameOver { stars });
            }
            MatchState::Victory { stars } => {
                info!("[Claire] Victory with {} stars", stars);
                self.show_message(
                    format!(
                        "VICTORY! Claire saved the day! You collected {stars} stars!\n\
                         Press R to play again"
                    ),
                    None,
                );
                report.push(FrameEvent::Victory { stars });
            }
            MatchState::Playing => {}
        }
    }

    fn step_encounter(&mut self, dt: f32, pressed: &PressedEdges, report: &mut TickReport) {
        let wanted = [
            (PlayerAbility::Dagger, pressed.abilities.dagger),
            (PlayerAbility::Heal, pressed.abilities.heal),
            (PlayerAbility::Sonic, pressed.abilities.sonic),
        ];
        for (ability, down) in wanted {
            if down {
                self.use_ability(ability, report);
            }
        }
        let events = self.boss.tick(dt, &self.tuning.boss, &mut self.player);
        self.handle_boss_events(events, report);
    }

    /// Fires one player ability against the encounter and records the result.
    pub fn use_ability(&mut self, ability: PlayerAbility, report: &mut TickReport) {
        match self.boss.use_ability(ability, &self.tuning.boss) {
            Ok(outcome) => report.push(FrameEvent::AbilityUsed { ability, outcome }),
            Err(reason) => {
                debug!("[Claire boss] {} rejected: {}", ability.label(), reason);
                report.issues.push(SimIssue::InvalidAbilityUse(reason));
                report.push(FrameEvent::AbilityRejected { ability, reason });
            }
        }
    }

    fn handle_boss_events(&mut self, events: Vec<BossEvent>, report: &mut TickReport) {
        for event in events {
            let ends_match = match &event {
                BossEvent::Countdown { seconds_left } if *seconds_left > 0 => {
                    self.show_message(
                        format!("ARENA BATTLE INCOMING! Powers ready in: {seconds_left} seconds"),
                        None,
                    );
                    None
                }
                BossEvent::FightStarted => {
                    self.show_message("BOSS BATTLE! Use your mystical abilities!", Some(2.0));
                    None
                }
                BossEvent::Victory => Some(MatchState::Victory { stars: self.stars }),
                BossEvent::Defeat => Some(MatchState::GameOver { stars: self.stars }),
                _ => None,
            };
            report.push(FrameEvent::Boss(event));
            if let Some(state) = ends_match {
                self.finish(state, report);
            }
        }
    }

    fn apply_overrides(&mut self, batch: AdminOverrides, report: &mut TickReport) {
        let physics_was_enabled = self.settings.physics_enabled;
        batch.apply_settings(&mut self.settings);
        if physics_was_enabled && !self.settings.physics_enabled {
            self.player.velocity = Vec3::ZERO;
        }
        self.player.scale = self.settings.player_scale;

        if batch.actions.contains(&AdminAction::ResetLevel) {
            self.reset();
            report.push(FrameEvent::LevelReset);
        }
        if let Some(target) = batch.teleport_to {
            self.teleport_player(target, report);
        }
        if let Some(stars) = batch.star_count {
            self.stars = stars;
        }
        if let Some(health) = batch.boss_health {
            self.boss.set_boss_health(health, &self.tuning.boss);
        }
        if let Some(health) = batch.player_health {
            self.boss.set_player_health(health, &self.tuning.boss);
        }

        for action in batch.actions {
            match action {
                AdminAction::ResetLevel => {}
                AdminAction::ActivatePowerUp => {
                    if !self.state.is_terminal() {
                        self.activate_power_up(PowerUpSource::Admin, report);
                    }
                }
                AdminAction::SkipBossPrep => {
                    self.boss.skip_preparation();
                }
                AdminAction::ResetBossFight => {
                    self.boss.restart_fight(&self.tuning.boss);
                }
                AdminAction::TriggerBossAbility(ability) => {
                    if self.boss.phase == BossPhase::Active {
                        let event = self.boss.cast(ability, &self.tuning.boss);
                        report.push(FrameEvent::Boss(event));
                    }
                }
                AdminAction::ForceVictory => {
                    if self.boss.in_arena() {
                        self.boss.skip_preparation();
                        self.boss.set_boss_health(0.0, &self.tuning.boss);
                    } else {
                        self.finish(MatchState::Victory { stars: self.stars }, report);
                    }
                }
            }
        }
        info!("[Claire admin] Applied overrides at frame {}", self.frame);
    }

    pub fn render_frame(&self) -> RenderFrame {
        let boss_position = self.tuning.boss.boss_spawn();
        let ending_cubes = match self.boss.celebration_elapsed {
            Some(elapsed) => (0..ENDING_CUBES)
                .map(|i| {
                    let angle = i as f32 * TAU / ENDING_CUBES as f32 + elapsed * ENDING_CUBE_SPIN;
                    boss_position
                        + Vec3::new(
                            angle.cos() * ENDING_CUBE_RADIUS,
                            (angle * 2.0).sin(),
                            angle.sin() * ENDING_CUBE_RADIUS,
                        )
                })
                .collect(),
            None => Vec::new(),
        };
        RenderFrame {
            player_position: self.player.position,
            player_scale: self.player.scale,
            battle_form: self.player.battle_form,
            flying: self.player.flying,
            hazard_positions: self.level.hazards.iter().map(|h| h.position).collect(),
            collectible_visible: self.level.collectibles.iter().map(|c| !c.collected).collect(),
            boss_position: self.boss.boss_visible.then_some(boss_position),
            arena_center: self.boss.arena_present.then(|| self.tuning.boss.arena()),
            teleport_fade: self.boss.teleport.fade(&self.tuning.boss),
            ending_cubes,
            wireframe: self.settings.wireframe,
            particles: self.settings.particles,
        }
    }

    pub fn hud(&self) -> HudState {
        let boss_tuning = &self.tuning.boss;
        let boss = self.boss.in_arena().then(|| BossHud {
            boss_health_pct: self.boss.boss_health * 100.0 / boss_tuning.boss_max_health,
            player_health_pct: self.boss.player_health * 100.0 / boss_tuning.player_max_health,
            countdown: (self.boss.phase == BossPhase::Preparing).then_some(self.boss.countdown),
            abilities: PlayerAbility::ALL
                .iter()
                .map(|&ability| {
                    let cd = self.boss.cooldown(ability);
                    let seconds_left = if cd.ready() { 0 } else { cd.remaining.ceil() as u32 };
                    let full = ability == PlayerAbility::Heal
                        && self.boss.player_health >= boss_tuning.player_max_health;
                    let label = if seconds_left > 0 {
                        format!("{seconds_left}s")
                    } else if full {
                        "FULL".to_string()
                    } else {
                        ability.label().to_ascii_uppercase()
                    };
                    AbilityHud {
                        ability,
                        ready: seconds_left == 0 && !full,
                        seconds_left,
                        label,
                    }
                })
                .collect(),
        });
        HudState {
            stars: self.stars,
            star_total: self.level.star_total() as u32,
            lives: self.player.lives,
            infinite_lives: self.settings.infinite_lives,
            deaths: self.player.deaths,
            power_up_seconds: self.power_up.active.then_some(self.power_up.remaining.max(0.0)),
            boss,
            message: self.message.as_ref().map(|m| m.text.clone()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            frame: self.frame,
            state: self.state,
            stars: self.stars,
            player: PlayerSnapshot {
                position: self.player.position.to_array(),
                velocity: self.player.velocity.to_array(),
                grounded: self.player.grounded,
                jump_count: self.player.jump_count,
                flying: self.player.flying,
                lives: self.player.lives,
                deaths: self.player.deaths,
                scale: self.player.scale,
                battle_form: self.player.battle_form,
            },
            power_up_active: self.power_up.active,
            power_up_remaining: self.power_up.remaining,
            boss: BossSnapshot {
                phase: self.boss.phase,
                boss_health: self.boss.boss_health,
                player_health: self.boss.player_health,
                countdown: self.boss.countdown,
                attack_timer: self.boss.attack_timer,
                cooldowns: PlayerAbility::ALL.map(|a| self.boss.cooldown(a).remaining),
                teleporting: !self.boss.teleport.is_idle(),
            },
            settings: self.settings.clone(),
        }
    }
}
