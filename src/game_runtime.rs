use bevy::prelude::*;
use serde::Serialize;

use crate::admin::PendingOverrides;
use crate::boss::{BossPhase, RandomRoller};
use crate::config::GameTuning;
use crate::events::GameEventBus;
use crate::input::VirtualInput;
use crate::session::GameSession;
use crate::snapshot::{EffectKind, FrameEvent, MatchState, SimIssue};

/// Coarse flow label mirrored from the session, for run conditions and the HUD.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize)]
pub enum SessionFlow {
    #[default]
    Playing,
    BossFight,
    Paused,
    GameOver,
    Victory,
}

impl SessionFlow {
    pub fn of(session: &GameSession) -> Self {
        if session.settings.paused {
            return Self::Paused;
        }
        match session.state {
            MatchState::GameOver { .. } => Self::GameOver,
            MatchState::Victory { .. } => Self::Victory,
            MatchState::Playing if session.boss.phase != BossPhase::Inactive => Self::BossFight,
            MatchState::Playing => Self::Playing,
        }
    }
}

/// The live game, owned by the ECS world.
#[derive(Resource)]
pub struct Session(pub GameSession);

const MAX_PENDING_EFFECTS: usize = 256;

/// Effects produced by fixed ticks since the renderer last drained them.
/// Nothing drains it when headless, so it keeps only the newest entries.
#[derive(Resource, Default)]
pub struct PendingEffects(pub Vec<EffectKind>);

impl PendingEffects {
    pub fn extend(&mut self, effects: impl IntoIterator<Item = EffectKind>) {
        self.0.extend(effects);
        if self.0.len() > MAX_PENDING_EFFECTS {
            let excess = self.0.len() - MAX_PENDING_EFFECTS;
            self.0.drain(..excess);
        }
    }
}

/// False while an admin pause holds the world still.
pub fn world_running(state: Option<Res<State<SessionFlow>>>) -> bool {
    state.is_some_and(|s| s.get() != &SessionFlow::Paused)
}

pub(crate) fn tick_session(
    time: Res<Time>,
    vinput: Res<VirtualInput>,
    mut session: ResMut<Session>,
    mut pending: ResMut<PendingOverrides>,
    mut bus: ResMut<GameEventBus>,
    mut effects: ResMut<PendingEffects>,
) {
    let report = session
        .0
        .tick(time.delta_secs(), vinput.snapshot(), &mut *pending);
    // overrides applied while paused still report what they did
    if report.paused && report.events.is_empty() {
        return;
    }
    if report.events.contains(&FrameEvent::InputUnavailable) {
        warn!("[Claire] {}", SimIssue::InputUnavailable);
    }
    bus.publish(session.0.frame(), &report.events);
    effects.extend(report.effects);
}

fn sync_flow_state(
    session: Res<Session>,
    state: Res<State<SessionFlow>>,
    mut next_state: ResMut<NextState<SessionFlow>>,
) {
    let desired = SessionFlow::of(&session.0);
    if state.get() != &desired {
        info!("[Claire] Flow {:?} -> {:?}", state.get(), desired);
        next_state.set(desired);
    }
}

/// `CLAIRE_BOSS_SEED` makes the boss's ability draws reproducible.
fn boss_seed_from_env() -> Option<u64> {
    std::env::var("CLAIRE_BOSS_SEED")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        let tuning = app
            .world()
            .get_resource::<GameTuning>()
            .cloned()
            .unwrap_or_default();
        let session = match boss_seed_from_env() {
            Some(seed) => {
                info!("[Claire boss] Using seeded ability draws ({})", seed);
                GameSession::with_roller(tuning, Box::new(RandomRoller::seeded(seed)))
            }
            None => GameSession::new(tuning),
        };
        app.insert_resource(Session(session))
            .insert_resource(PendingOverrides::default())
            .insert_resource(PendingEffects::default())
            .insert_resource(GameEventBus::default())
            .init_state::<SessionFlow>()
            .add_systems(FixedUpdate, tick_session)
            .add_systems(Update, sync_flow_state);
    }
}
