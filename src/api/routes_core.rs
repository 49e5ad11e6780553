use serde::Serialize;

use super::*;

pub(super) fn channel_closed<T: Serialize>() -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        ok: false,
        data: None,
        error: Some("Channel closed".into()),
    })
}

pub(super) async fn get_state(State(state): State<AppState>) -> Json<ApiResponse<SessionSnapshot>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::GetState(tx));
    match rx.await {
        Ok(snapshot) => Json(ApiResponse::success(snapshot)),
        Err(_) => channel_closed(),
    }
}

pub(super) async fn get_hud(State(state): State<AppState>) -> Json<ApiResponse<HudState>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::GetHud(tx));
    match rx.await {
        Ok(hud) => Json(ApiResponse::success(hud)),
        Err(_) => channel_closed(),
    }
}

pub(super) async fn get_events(State(state): State<AppState>) -> Json<ApiResponse<Vec<GameEvent>>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::GetEvents(tx));
    match rx.await {
        Ok(items) => Json(ApiResponse::success(items)),
        Err(_) => channel_closed(),
    }
}

pub(super) async fn get_telemetry(
    State(state): State<AppState>,
) -> Json<ApiResponse<GameplayTelemetry>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::GetTelemetry(tx));
    match rx.await {
        Ok(Some(telemetry)) => Json(ApiResponse::success(telemetry)),
        Ok(None) => Json(ApiResponse {
            ok: false,
            data: None,
            error: Some("Telemetry is not enabled".into()),
        }),
        Err(_) => channel_closed(),
    }
}

pub(super) async fn get_settings(State(state): State<AppState>) -> Json<ApiResponse<AdminSettings>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::GetSettings(tx));
    match rx.await {
        Ok(settings) => Json(ApiResponse::success(settings)),
        Err(_) => channel_closed(),
    }
}
