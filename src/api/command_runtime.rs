use super::*;

/// What an API command may touch on the Bevy side.
pub(super) struct ApiWorld<'a> {
    pub(super) session: &'a Session,
    pub(super) pending: &'a mut PendingOverrides,
    pub(super) bus: &'a GameEventBus,
    pub(super) telemetry: Option<&'a GameplayTelemetry>,
}

pub(super) fn handle_command(cmd: ApiCommand, world: &mut ApiWorld<'_>) {
    match cmd {
        ApiCommand::GetState(tx) => {
            let _ = tx.send(world.session.0.snapshot());
        }
        ApiCommand::GetHud(tx) => {
            let _ = tx.send(world.session.0.hud());
        }
        ApiCommand::GetEvents(tx) => {
            let _ = tx.send(world.bus.recent.iter().cloned().collect());
        }
        ApiCommand::GetTelemetry(tx) => {
            let _ = tx.send(world.telemetry.cloned());
        }
        ApiCommand::GetSettings(tx) => {
            let _ = tx.send(world.session.0.settings.clone());
        }
        ApiCommand::Override(overrides, tx) => {
            let result = overrides.validate().map(|()| {
                debug!("[Claire API] Queued overrides: {:?}", overrides);
                world.pending.push(overrides);
            });
            let _ = tx.send(result);
        }
    }
}

pub(super) fn process_api_commands(
    channels: Res<ApiChannels>,
    session: Res<Session>,
    mut pending: ResMut<PendingOverrides>,
    bus: Res<GameEventBus>,
    telemetry: Option<Res<GameplayTelemetry>>,
) {
    let mut world = ApiWorld {
        session: &*session,
        pending: &mut *pending,
        bus: &*bus,
        telemetry: telemetry.as_deref(),
    };
    while let Ok(cmd) = channels.receiver.try_recv() {
        handle_command(cmd, &mut world);
    }
}
