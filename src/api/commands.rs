use super::*;

type Reply<T> = tokio::sync::oneshot::Sender<T>;

/// Commands sent from API -> Bevy
pub enum ApiCommand {
    GetState(Reply<SessionSnapshot>),
    GetHud(Reply<HudState>),
    GetEvents(Reply<Vec<GameEvent>>),
    GetTelemetry(Reply<Option<GameplayTelemetry>>),
    GetSettings(Reply<AdminSettings>),
    /// Queued for the next fixed tick; validated before it reaches the channel.
    Override(AdminOverrides, Reply<Result<(), String>>),
}
